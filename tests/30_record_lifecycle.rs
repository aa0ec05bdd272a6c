//! Storage-backed tests for the record lifecycle and the auth/role gates.
//! These run only when DATABASE_URL points at a reachable postgres; without
//! it they skip, so the rest of the suite stays independent of a database.

mod common;

use anyhow::{ensure, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

struct TestUser {
    token: String,
    id: String,
    email: String,
}

async fn register_user(app: &Router, role: &str) -> Result<TestUser> {
    let email = format!("{}@example.com", Uuid::new_v4());
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Test User", "email": email, "password": "pass1234", "role": role })),
    )
    .await?;
    ensure!(status == StatusCode::CREATED, "register failed: {}", body);

    Ok(TestUser {
        token: body["data"]["token"].as_str().unwrap().to_string(),
        id: body["data"]["user"]["id"].as_str().unwrap().to_string(),
        email,
    })
}

async fn create_client(app: &Router, token: &str) -> Result<(String, String)> {
    let gstin = format!("29{}", &Uuid::new_v4().simple().to_string()[..13].to_uppercase());
    let (status, body) = send(
        app,
        Method::POST,
        "/api/clients",
        Some(token),
        Some(json!({ "name": "Acme Co", "gstin": gstin })),
    )
    .await?;
    ensure!(status == StatusCode::CREATED, "client create failed: {}", body);
    ensure!(body["data"]["is_active"] == true, "new clients default to active");
    ensure!(body["data"]["filing_type"] == "Monthly", "new clients default to monthly filing");

    Ok((body["data"]["id"].as_str().unwrap().to_string(), gstin))
}

#[tokio::test]
async fn record_generation_and_bulk_reconciliation() -> Result<()> {
    let Some((app, pool)) = common::db_app().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let admin = register_user(&app, "admin").await?;

    let month = format!("M-{}", &Uuid::new_v4().simple().to_string()[..8]);
    let fy = "2025-26";
    let generate_body = json!({ "month": month, "financial_year": fy });

    // With every client inactive the generator rejects the run and writes
    // no record rows (the period itself may still be created first).
    sqlx::query("UPDATE clients SET is_active = FALSE").execute(&pool).await?;
    let (status, _) =
        send(&app, Method::POST, "/api/gst-records/generate", Some(&admin.token), Some(generate_body.clone()))
            .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (rows,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM gst_records r JOIN periods p ON r.period_id = p.id \
         WHERE p.month = $1 AND p.financial_year = $2",
    )
    .bind(&month)
    .bind(fy)
    .fetch_one(&pool)
    .await?;
    assert_eq!(rows, 0);

    let (_, gstin) = create_client(&app, &admin.token).await?;
    create_client(&app, &admin.token).await?;

    // Duplicate GSTIN is a domain 400, not a raw storage error.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/clients",
        Some(&admin.token),
        Some(json!({ "name": "Acme Clone", "gstin": gstin })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "GSTIN already exists");

    // First run creates one record per active client.
    let (status, body) =
        send(&app, Method::POST, "/api/gst-records/generate", Some(&admin.token), Some(generate_body.clone()))
            .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["created"], 2);
    assert_eq!(body["data"]["skipped"], 0);
    let period_id = body["data"]["period"]["id"].as_str().unwrap().to_string();

    // Re-run is fully idempotent and resolves the same period.
    let (status, body) =
        send(&app, Method::POST, "/api/gst-records/generate", Some(&admin.token), Some(generate_body))
            .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["created"], 0);
    assert_eq!(body["data"]["skipped"], 2);
    assert_eq!(body["data"]["period"]["id"].as_str().unwrap(), period_id);

    let list_uri = format!("/api/gst-records?period_id={}", period_id);
    let (status, body) = send(&app, Method::GET, &list_uri, Some(&admin.token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    let record_id = body["data"]["items"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["items"][0]["gstr1_status"], "pending");

    // A remarks-only item updates remarks and nothing else; an item without
    // an id is a no-op and does not count.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/gst-records/bulk",
        Some(&admin.token),
        Some(json!({ "items": [{ "id": record_id, "remarks": "call client" }, { "remarks": "no id" }] })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 1);

    let (_, body) = send(&app, Method::GET, &list_uri, Some(&admin.token), None).await?;
    let item = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["id"] == record_id.as_str())
        .unwrap();
    assert_eq!(item["remarks"], "call client");
    assert_eq!(item["gstr1_status"], "pending");
    assert_eq!(item["gstr3b_status"], "pending");

    // An explicit null clears the column; absent keys would have left it.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/gst-records/bulk",
        Some(&admin.token),
        Some(json!({ "items": [{ "id": record_id, "remarks": null }] })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 1);

    let (_, body) = send(&app, Method::GET, &list_uri, Some(&admin.token), None).await?;
    let item = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["id"] == record_id.as_str())
        .unwrap();
    assert!(item["remarks"].is_null());
    assert_eq!(item["gstr1_status"], "pending");

    Ok(())
}

#[tokio::test]
async fn deactivated_account_and_role_guard() -> Result<()> {
    let Some((app, _pool)) = common::db_app().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let admin = register_user(&app, "admin").await?;
    let staff = register_user(&app, "staff").await?;

    // Any authenticated user may list staff.
    let (status, _) = send(&app, Method::GET, "/api/staff", Some(&staff.token), None).await?;
    assert_eq!(status, StatusCode::OK);

    // Mutating staff management is admin-only.
    let new_user = json!({
        "name": "New Hire",
        "email": format!("{}@example.com", Uuid::new_v4()),
        "password": "pass1234",
        "role": "staff"
    });
    let (status, body) =
        send(&app, Method::POST, "/api/staff", Some(&staff.token), Some(new_user.clone())).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied: Requires Admin role");

    let (status, _) =
        send(&app, Method::POST, "/api/staff", Some(&admin.token), Some(new_user)).await?;
    assert_eq!(status, StatusCode::CREATED);

    // Deactivating the account invalidates a still-unexpired token with 403.
    let update_uri = format!("/api/staff/{}", staff.id);
    let (status, _) = send(
        &app,
        Method::PUT,
        &update_uri,
        Some(&admin.token),
        Some(json!({ "name": "Test User", "email": staff.email, "role": "staff", "active": false })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/staff", Some(&staff.token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Account is deactivated");

    Ok(())
}
