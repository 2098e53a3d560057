//! Router harness for HTTP-level tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use shared::error::ErrorCode;
use tower::ServiceExt;
use wms_server::BoxError;
use wms_server::api::create_router;
use wms_server::db::DbService;
use wms_server::email::LogMailer;
use wms_server::state::AppState;
use wms_server::stripe::{CheckoutLine, PaymentProvider};

pub const SECRET: &str = "integration-test-secret";

/// Records what the server asked the payment provider to do
#[derive(Default)]
pub struct FakePayments {
    pub accounts_created: Mutex<u32>,
    pub checkouts: Mutex<Vec<(String, Vec<CheckoutLine>)>>,
}

#[async_trait]
impl PaymentProvider for FakePayments {
    async fn create_account(&self, _email: &str) -> Result<String, BoxError> {
        let mut created = self.accounts_created.lock().unwrap();
        *created += 1;
        Ok(format!("acct_{created}"))
    }

    async fn onboarding_link(&self, account_id: &str) -> Result<String, BoxError> {
        Ok(format!("https://connect.example/{account_id}"))
    }

    async fn details_submitted(&self, _account_id: &str) -> Result<bool, BoxError> {
        Ok(true)
    }

    async fn create_checkout(&self, account_id: &str, lines: &[CheckoutLine]) -> Result<String, BoxError> {
        self.checkouts
            .lock()
            .unwrap()
            .push((account_id.to_string(), lines.to_vec()));
        Ok("https://checkout.example/session".to_string())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub payments: Arc<FakePayments>,
}

/// Who a request is sent as
pub enum As<'a> {
    Anonymous,
    Staff(&'a str),
    Customer(&'a str),
}

impl TestApp {
    pub async fn new() -> Self {
        let db = DbService::in_memory().await.unwrap();
        let payments = Arc::new(FakePayments::default());
        let state = AppState::with_parts(db.pool, SECRET.to_string(), Arc::new(LogMailer), payments.clone());
        Self {
            router: create_router(state.clone()),
            state,
            payments,
        }
    }

    pub async fn send(&self, method: &str, uri: &str, who: As<'_>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        builder = match who {
            As::Anonymous => builder,
            As::Staff(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            As::Customer(token) => builder.header("x-session-token", token),
        };
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Register a restaurant, returning (manager token, restaurant id).
    pub async fn register(&self, email: &str, name: &str) -> (String, i64) {
        let (status, body) = self
            .send(
                "POST",
                "/api/auth/register",
                As::Anonymous,
                Some(json!({
                    "email": email,
                    "password": "correct-horse",
                    "name": name,
                    "location": "Sydney",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["restaurant"]["id"].as_i64().unwrap(),
        )
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            "/api/auth/login",
            As::Anonymous,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Claim a table as a new customer, returning the session token.
    pub async fn seat(&self, restaurant_id: i64, table_number: i64) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/session",
                As::Anonymous,
                Some(json!({ "restaurant_id": restaurant_id, "table_number": table_number })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }
}

pub fn assert_error(status: StatusCode, body: &Value, code: ErrorCode) {
    assert_eq!(status, code.http_status(), "{body}");
    assert_eq!(body["code"].as_u64(), Some(u64::from(code.code())), "{body}");
}
