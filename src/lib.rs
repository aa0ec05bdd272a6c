pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod response;
pub mod services;
pub mod state;

use axum::{
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{require_admin, require_auth};
use crate::state::AppState;

/// Build the full application router over the given state.
pub fn app(state: AppState) -> Router {
    use handlers::{auth as auth_handlers, clients, gst_records, periods, settings, staff};

    // Mutating staff management is admin-only; reads need only a valid login.
    let admin_routes = Router::new()
        .route("/api/staff", post(staff::create))
        .route("/api/staff/:id", put(staff::update).delete(staff::delete))
        .route_layer(axum_middleware::from_fn(require_admin));

    let protected = Router::new()
        .route("/api/staff", get(staff::list))
        .merge(admin_routes)
        .route("/api/clients", get(clients::list).post(clients::create))
        .route(
            "/api/clients/:id",
            get(clients::get_by_id).put(clients::update).delete(clients::delete),
        )
        .route("/api/periods", get(periods::list).post(periods::create))
        .route("/api/periods/:id", put(periods::update).delete(periods::delete))
        .route("/api/gst-records", get(gst_records::list).post(gst_records::create))
        .route("/api/gst-records/:id", put(gst_records::update))
        .route("/api/gst-records/generate", post(gst_records::generate))
        .route("/api/gst-records/bulk", post(gst_records::bulk))
        .route("/api/settings", get(settings::list).post(settings::create))
        .route("/api/settings/:id", delete(settings::delete))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/register", post(auth_handlers::register))
        .route("/api/auth/login", post(auth_handlers::login))
        .merge(protected)
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "data": { "status": "ok", "database": "ok", "timestamp": now }
            })),
        ),
        Err(e) => {
            tracing::error!("health check database ping failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "message": "database unavailable" })),
            )
        }
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Route not found" })))
}
