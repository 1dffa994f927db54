//! API integration tests.
//!
//! These drive the full router (auth middleware included) over a mock
//! database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use serde_json::Value as Json;
use tower::ServiceExt;
use tutorhub_api::{AppState, app};
use tutorhub_common::config::{
    AuthConfig, Config, DatabaseConfig, OrderConfig, ServerConfig,
};
use tutorhub_core::TokenService;
use tutorhub_db::{
    entities::{account::AccountRole, combo, post, tutor_request::TutorRequestStatus},
    test_utils::fixtures,
};

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            url: "http://localhost:3000".to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "integration-test-secret".to_string(),
            token_ttl_hours: 1,
        },
        email: None,
        orders: OrderConfig::default(),
    }
}

fn app_with(db: MockDatabase) -> Router {
    let state = AppState::new(Arc::new(db.into_connection()), &test_config());
    app(state)
}

fn empty_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

fn token_for(id: &str, role: AccountRole) -> String {
    TokenService::new(&test_config().auth).issue(id, role).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method("GET");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method(method)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Json {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let response = app_with(empty_db())
        .oneshot(get("/nonexistent/endpoint", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_me_without_token_is_unauthorized() {
    let response = app_with(empty_db())
        .oneshot(get("/auth/me", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_me_with_forged_token_is_unauthorized() {
    let forged = TokenService::new(&AuthConfig {
        jwt_secret: "someone-else".to_string(),
        token_ttl_hours: 1,
    })
    .issue("a1", AccountRole::Admin)
    .unwrap();

    let response = app_with(empty_db())
        .oneshot(get("/auth/me", Some(&forged)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_profile_without_password() {
    let db = empty_db().append_query_results([vec![fixtures::account("a1", AccountRole::Student)]]);
    let token = token_for("a1", AccountRole::Student);

    let response = app_with(db)
        .oneshot(get("/auth/me", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["id"], "a1");
    assert_eq!(body["data"]["role"], "student");
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_unknown_email_is_unauthorized() {
    let db = empty_db().append_query_results([Vec::<tutorhub_db::entities::account::Model>::new()]);

    let response = app_with(db)
        .oneshot(send_json(
            "POST",
            "/auth/login",
            None,
            r#"{"email":"nobody@example.com","password":"password123"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_invalid_email_is_bad_request() {
    let response = app_with(empty_db())
        .oneshot(send_json(
            "POST",
            "/auth/register",
            None,
            r#"{"email":"not-an-email","password":"password123","name":"Alice"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_admin_stats_forbidden_for_student() {
    let token = token_for("s1", AccountRole::Student);

    let response = app_with(empty_db())
        .oneshot(get("/admin/stats", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_stats_for_admin() {
    let rows: Vec<Vec<_>> = [40_i64, 7, 3, 2, 15, 120]
        .iter()
        .map(|n| vec![maplit::btreemap! { "num_items" => Value::BigInt(Some(*n)) }])
        .collect();
    let db = empty_db().append_query_results(rows);
    let token = token_for("admin", AccountRole::Admin);

    let response = app_with(db)
        .oneshot(get("/admin/stats", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["students"], 40);
    assert_eq!(body["data"]["pendingTutorRequests"], 3);
    assert_eq!(body["data"]["posts"], 120);
}

#[tokio::test]
async fn test_approving_processed_request_is_bad_request() {
    let db = empty_db().append_query_results([vec![fixtures::tutor_request(
        "r1",
        "s1",
        TutorRequestStatus::Approved,
    )]]);
    let token = token_for("admin", AccountRole::Admin);

    let response = app_with(db)
        .oneshot(send_json("PUT", "/admin/tutor-requests/r1/approve", Some(&token), "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("already processed")
    );
}

#[tokio::test]
async fn test_order_approval_forbidden_for_student() {
    let token = token_for("s1", AccountRole::Student);

    let response = app_with(empty_db())
        .oneshot(send_json(
            "PUT",
            "/order-combo/o1/approval",
            Some(&token),
            r#"{"approvalStatus":"approved"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_combos_is_public() {
    let db = empty_db().append_query_results([vec![
        fixtures::combo("c1", 2),
        fixtures::combo("c2", 5),
    ]]);

    let response = app_with(db).oneshot(get("/combos", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["slot"], 2);
}

#[tokio::test]
async fn test_get_missing_post_is_not_found() {
    let db = empty_db().append_query_results([Vec::<post::Model>::new()]);

    let response = app_with(db).oneshot(get("/posts/missing", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_post_requires_auth() {
    let response = app_with(empty_db())
        .oneshot(send_json("POST", "/posts", None, r#"{"content":"hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_blank_search_is_bad_request() {
    let response = app_with(empty_db())
        .oneshot(get("/posts/search?q=", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_purchase_inactive_combo_is_not_found() {
    let mut inactive = fixtures::combo("c1", 2);
    inactive.is_active = false;
    let db = empty_db().append_query_results([vec![inactive]]);
    let token = token_for("s1", AccountRole::Student);

    let response = app_with(db)
        .oneshot(send_json(
            "POST",
            "/order-combo",
            Some(&token),
            r#"{"comboId":"c1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_combo_response_uses_camel_case() {
    let db = empty_db().append_query_results([vec![combo::Model {
        description: Some("Ten lessons".to_string()),
        ..fixtures::combo("c10", 10)
    }]]);

    let response = app_with(db).oneshot(get("/combos", None)).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["isActive"], true);
}
