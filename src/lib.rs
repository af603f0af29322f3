pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod startup;
pub mod use_cases;
pub mod validation;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::ports::TransactionRepository;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn TransactionRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn TransactionRepository>) -> Self {
        Self { repository }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/transaction",
            post(handlers::transaction::ingest)
                .fallback(handlers::transaction::method_not_allowed),
        )
        // Registered before `layer` so unmatched paths are logged too
        .fallback(handlers::not_found)
        .layer(axum::middleware::from_fn(
            middleware::request_logger_middleware,
        ))
        .with_state(state)
}
