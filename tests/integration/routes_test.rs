use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use sea_orm::{DatabaseConnection, DbBackend, MockDatabase, Value};
use serde_json::Value as Json;
use tower::ServiceExt;
use uuid::Uuid;

use carpool_backend::entities::{role, user};
use carpool_backend::routes::create_router;
use carpool_backend::{AppState, Config};

fn state(db: DatabaseConnection) -> AppState {
    AppState {
        db: Arc::new(db),
        config: Config {
            database_url: "postgres://localhost/carpool_test".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            admin_email: None,
            admin_password: None,
        },
    }
}

async fn send(db: DatabaseConnection, request: Request<Body>) -> (StatusCode, Json) {
    let response: Response = create_router(state(db)).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Json::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Json) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap()
}

// ── Authentication guard ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_write_without_token() {
    let uri = format!("/api/vehicles/{}", Uuid::new_v4());
    let (status, body) = send(DatabaseConnection::Disconnected, request("PUT", &uri)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn should_reject_admin_route_without_token() {
    let (status, body) = send(DatabaseConnection::Disconnected, request("GET", "/api/contact")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn should_reject_malformed_token_before_lookup() {
    let uri = format!("/api/trips/planned/{}", Uuid::new_v4());
    let mut req = request("PUT", &uri);
    req.headers_mut()
        .insert("authorization", "Bearer not-a-token".parse().unwrap());

    let (status, body) = send(DatabaseConnection::Disconnected, req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "UNAUTHENTICATED");
}

// ── Public routes ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_serve_public_roles_without_token() {
    let roles = vec![
        role::Model {
            id: 1,
            title: "ROLE_ADMIN".to_string(),
            description: None,
        },
        role::Model {
            id: 3,
            title: "user".to_string(),
            description: None,
        },
    ];
    let count = |n: i64| BTreeMap::from([("num_items", Value::BigInt(Some(n)))]);
    let db = MockDatabase::new(DbBackend::Postgres)
        .append_query_results([roles])
        .append_query_results([[count(1)], [count(4)]])
        .into_connection();

    let (status, body) = send(db, request("GET", "/api/public/roles")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "ROLE_ADMIN");
    assert_eq!(body[1]["id"], 3);
    assert_eq!(body[1]["title"], "ROLE_USER");
}

#[tokio::test]
async fn should_reach_public_handler_and_hide_storage_details() {
    // No queued results: the first query fails inside the handler
    let db = MockDatabase::new(DbBackend::Postgres).into_connection();
    let uri = format!("/api/vehicles/{}/trips", Uuid::new_v4());
    let (status, body) = send(db, request("GET", &uri)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "STORAGE_ERROR");
    assert_eq!(body["message"], "storage error");
}

// ── Registration ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_admin_with_admin_grant() {
    let admin = role::Model {
        id: 1,
        title: "ROLE_ADMIN".to_string(),
        description: None,
    };
    let stored = user::Model {
        id: Uuid::new_v4(),
        email: "root@example.com".to_string(),
        password_hash: "hash".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Admin".to_string(),
        role_id: 1,
        credits: 1000,
        api_token: None,
        created_at: chrono::Utc::now().fixed_offset(),
    };
    let db = Arc::new(
        MockDatabase::new(DbBackend::Postgres)
            .append_query_results([[admin]])
            .append_query_results([[BTreeMap::from([("num_items", Value::BigInt(Some(0)))])]])
            .append_query_results([Vec::<user::Model>::new(), vec![stored]])
            .into_connection(),
    );
    let app = create_router(AppState {
        db: db.clone(),
        ..state(DatabaseConnection::Disconnected)
    });

    let body = serde_json::json!({
        "email": "root@example.com",
        "password": "correct horse",
        "first_name": "Ada",
        "last_name": "Admin",
        "role_title": "admin",
    });
    let response = app
        .oneshot(json_request("POST", "/api/registration", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["user"]["role"], "ROLE_ADMIN");

    let Ok(db) = Arc::try_unwrap(db) else {
        panic!("router still holds the connection");
    };
    let insert = db
        .into_transaction_log()
        .into_iter()
        .flat_map(|t| t.statements().to_vec())
        .map(|s| s.to_string())
        .find(|s| s.starts_with(r#"INSERT INTO "user""#))
        .expect("no user insert");
    // role_id, credits, then the API token
    assert!(insert.contains(", 1, 1000, '"), "{insert}");
}
