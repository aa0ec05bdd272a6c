use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;

/// Shared application state injected into every handler and middleware.
///
/// The pool is the only shared resource; it is cloned per use (sqlx pools are
/// cheap handles over the same connection set).
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self { pool, config: Arc::new(config) }
    }
}
