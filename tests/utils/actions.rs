use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

use super::setup::TestApp;

// ============================================================================
// Action Helpers
// ============================================================================

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    /// Sends a request through the router and collects status and JSON body
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: Value) -> TestResponse {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Sends a body as-is with no `Content-Type` header
    pub async fn send_raw(&self, method: &str, uri: &str, body: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn get_with_token(&self, uri: &str, token: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Creates a user and returns the response body
    pub async fn create_user(&self, username: &str, password: &str) -> Value {
        let response = self
            .send_json(
                "POST",
                "/users/",
                serde_json::json!({"username": username, "password": password}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.body
    }

    /// Posts credentials to the login endpoint
    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.send_json(
            "POST",
            "/token",
            serde_json::json!({"username": username, "password": password}),
        )
        .await
    }
}
