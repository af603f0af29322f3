pub mod transaction;

use crate::error::AppError;

pub const HEALTH_BODY: &str = "LifeOS is healthy";

/// Liveness probe. Only reachable once startup has finished, so it never
/// touches the database.
pub async fn health() -> &'static str {
    HEALTH_BODY
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}
