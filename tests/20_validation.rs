mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn post_json(uri: &str, body: Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn register_with_blank_fields_is_400() -> Result<()> {
    let app = common::test_app();
    let res = app
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "name": "", "email": "", "password": "", "role": "" }),
        )?)
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await?;
    assert_eq!(body["message"], "Missing required fields");
    Ok(())
}

#[tokio::test]
async fn login_with_blank_fields_is_400() -> Result<()> {
    let app = common::test_app();
    let res = app
        .oneshot(post_json("/api/auth/login", json!({ "email": "", "password": "" }))?)
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await?;
    assert_eq!(body["message"], "Email and password are required");
    Ok(())
}

#[tokio::test]
async fn login_with_missing_body_fields_is_unprocessable() -> Result<()> {
    // Serde rejects a body that lacks required keys before the handler runs.
    let app = common::test_app();
    let res = app
        .oneshot(post_json("/api/auth/login", json!({ "email": "a@b.c" }))?)
        .await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}
