#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, Response};
use axum::Router;
use fibervision_api::auth::jwt::JwtConfig;
use fibervision_api::config::ServerConfig;
use fibervision_api::router::build_app_router;
use fibervision_api::state::AppState;
use fibervision_mail::{EmailError, Mailer, OutgoingEmail};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:3001")],
        max_body_bytes: 16 * 1024,
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        app_url: "http://localhost:3001".to_string(),
        verification_token_expiry_hours: 24,
        reset_token_expiry_mins: 60,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Captures outgoing email instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    /// The `token=` query value of the last link sent to `to`.
    pub fn last_token_for(&self, to: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| m.to == to)
            .and_then(|m| {
                let (_, rest) = m.text.split_once("token=")?;
                Some(rest.split_whitespace().next()?.to_string())
            })
    }
}

/// Build the application router exactly as `main.rs` does.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_mailer(pool).0
}

/// Like [`build_test_app`], also returning the mailer that captures email.
pub fn build_test_app_with_mailer(pool: PgPool) -> (Router, Arc<RecordingMailer>) {
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        mailer: mailer.clone(),
    };
    (build_app_router(state, &config), mailer)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

pub const TEST_PASSWORD: &str = "Camera1234";

/// Sign up through the API and return the auth response JSON.
pub async fn signup(app: Router, username: &str) -> serde_json::Value {
    let body = serde_json::json!({
        "name": format!("{username} tester"),
        "username": username,
        "email": format!("{username}@example.com"),
        "password": TEST_PASSWORD,
        "confirmPassword": TEST_PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}

/// Sign up and return just the access token.
pub async fn signup_token(app: Router, username: &str) -> String {
    let json = signup(app, username).await;
    json["access_token"].as_str().unwrap().to_string()
}
