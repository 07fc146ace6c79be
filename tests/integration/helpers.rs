//! Shared test helpers for integration tests.
//!
//! Every test gets its own application over fresh in-memory stores.

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use carechart_api::{AppState, build_app};
use carechart_auth::password::PasswordHasher;
use carechart_core::config::AppConfig;
use carechart_database::Stores;
use carechart_entity::account::{Account, AccountRole, CreateAccount};
use carechart_entity::patient::{CreatePatient, Patient};

/// Password every seeded account starts with.
pub const PASSWORD: &str = "Ward-Round-2026!";

/// Test application context
pub struct TestApp {
    /// The Axum app, middleware included
    pub router: Router,
    /// Direct store access for seeding and assertions
    pub stores: Stores,
    pub config: AppConfig,
}

/// A decoded response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `error` code of an error body.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig::default();
        let stores = Stores::memory();
        let state = AppState::new(config.clone(), stores.clone());

        Self {
            router: build_app(state),
            stores,
            config,
        }
    }

    /// Insert an account with [`PASSWORD`].
    pub async fn seed_account(&self, username: &str, role: AccountRole) -> Account {
        let password_hash = PasswordHasher::new()
            .hash_password(PASSWORD)
            .expect("hash password");

        self.stores
            .accounts
            .create(&CreateAccount {
                username: username.to_string(),
                email: Some(format!("{username}@carechart.test")),
                password_hash,
                display_name: Some(username.to_uppercase()),
                role,
                is_admin: role == AccountRole::Admin,
                must_change_password: false,
                created_by: None,
            })
            .await
            .expect("seed account")
    }

    pub async fn seed_patient(&self, mrn: &str, full_name: &str) -> Patient {
        self.stores
            .patients
            .create(
                &CreatePatient {
                    mrn: mrn.to_string(),
                    full_name: full_name.to_string(),
                    date_of_birth: None,
                    gender: None,
                    phone: None,
                },
                None,
            )
            .await
            .expect("seed patient")
    }

    /// Log in and return the session token.
    pub async fn login(&self, username: &str) -> String {
        let resp = self
            .post(
                "/api/auth/login",
                None,
                serde_json::json!({ "username": username, "password": PASSWORD }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "login failed: {}", resp.body);

        resp.data()["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Send a request with an optional bearer token and JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", "10.0.0.7");

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.call(request).await
    }

    /// Run a prepared request through the app.
    pub async fn call(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
