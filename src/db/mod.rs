pub mod pool_manager;
pub mod schema;

pub use pool_manager::{PoolError, PoolManager, PoolStats};
pub use schema::ensure_schema;
