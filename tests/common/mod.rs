// Shared across test binaries; not every binary uses every helper.
#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use gst_compliance_api::{app, config::AppConfig, state::AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

fn test_config(database_url: String) -> AppConfig {
    AppConfig {
        database_url,
        jwt_secret: TEST_SECRET.into(),
        jwt_expiry_hours: 24,
        port: 0,
        max_connections: 5,
    }
}

/// Router wired exactly like production, over a lazy pool that never
/// connects. Exercises every path that fails before touching storage
/// (routing, auth gate, request validation).
pub fn test_app() -> Router {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(1))
        .connect_lazy("postgres://127.0.0.1:9/unreachable")
        .expect("lazy pool");

    app(AppState::new(pool, test_config("postgres://127.0.0.1:9/unreachable".into())))
}

/// Router over a real database from DATABASE_URL, with migrations applied.
///
/// Returns `None` when DATABASE_URL is not set so storage-backed tests can
/// skip on machines without postgres.
pub async fn db_app() -> anyhow::Result<Option<(Router, PgPool)>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        return Ok(None);
    };

    let pool = PgPoolOptions::new().max_connections(5).connect(&url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let router = app(AppState::new(pool.clone(), test_config(url)));
    Ok(Some((router, pool)))
}
