#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use fake::Fake;
use fake::faker::name::en::Name;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use coursebook::coursebook_config::{CorsConfig, JwtConfig};
use coursebook::coursebook_db::MemoryStore;
use coursebook::router::init_router;
use coursebook::state::AppState;

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes";
pub const TEST_PASSWORD: &str = "testpass123";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig::new(TEST_JWT_SECRET)
}

pub fn setup_test_app() -> Router {
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        test_jwt_config(),
        CorsConfig::from_list("http://localhost:5173").unwrap(),
    );
    init_router(state)
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub token: String,
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&body).unwrap()
}

/// Registers an account through the API and returns its id and token.
pub async fn register_user(app: &Router, role: &str) -> TestUser {
    let email = generate_unique_email();
    let name: String = Name().fake();

    let response = send(
        app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "name": name,
                "email": email,
                "password": TEST_PASSWORD,
                "role": role
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    TestUser {
        id: body["user"]["id"].as_i64().unwrap(),
        email,
        password: TEST_PASSWORD.to_string(),
        token: body["access_token"].as_str().unwrap().to_string(),
    }
}

pub async fn create_course(app: &Router, instructor: &TestUser, name: &str) -> Value {
    let response = send(
        app,
        json_request(
            "POST",
            "/api/courses",
            Some(&instructor.token),
            json!({
                "name": name,
                "description": "A test course",
                "duration_hours": 10,
                "instructor_id": instructor.id
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}
