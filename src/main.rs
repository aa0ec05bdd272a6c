use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use gst_compliance_api::{app, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL and JWT_SECRET.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| panic!("configuration error: {}", e));

    // Fail fast: no pool, no migrations, no server.
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));

    sqlx::migrate!()
        .run(&pool)
        .await
        .unwrap_or_else(|e| panic!("failed to run migrations: {}", e));

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("GST compliance API listening on http://{}", bind_addr);

    let state = AppState::new(pool, config);
    axum::serve(listener, app(state)).await.expect("server");
}
