//! Test utilities for API integration tests.
//!
//! Builds the full router over an in-memory SQLite database with all
//! migrations applied, plus helpers for the signup/login dance.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::Duration;
use inventory_api::{
    auth::TokenService,
    config::{AppConfig, SuperAdminConfig},
    seeds::seed_super_admin,
    server::{AppState, create_app},
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const PASSWORD: &str = "password123";
pub const SUPER_ADMIN_EMAIL: &str = "root@platform.test";

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub tokens: Arc<TokenService>,
}

/// Response status plus the decoded JSON body (`Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = setup_test_db().await.unwrap();
        let tokens = Arc::new(TokenService::new(TEST_SECRET, Duration::hours(24)).unwrap());
        let config = AppConfig {
            profile: "test".to_string(),
            jwt_secret: TEST_SECRET.to_string(),
            ..AppConfig::default()
        };
        let state = AppState {
            config: Arc::new(config),
            db: db.clone(),
            tokens: Arc::clone(&tokens),
        };

        Self {
            router: create_app(state),
            db,
            tokens,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
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
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Option<Value>) -> TestResponse {
        self.request(Method::PUT, uri, Some(token), body).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn signup(&self, username: &str, email: &str, tenant_id: Option<i32>) -> TestResponse {
        let mut body = json!({
            "username": username,
            "email": email,
            "password": PASSWORD,
        });
        if let Some(tenant_id) = tenant_id {
            body["tenant_id"] = json!(tenant_id);
        }
        self.request(Method::POST, "/signup", None, Some(body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Logs in with the shared test password and returns the bearer token.
    pub async fn token_for(&self, email: &str) -> String {
        let response = self.login(email, PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.body["token"].as_str().unwrap().to_string()
    }

    /// Signs up a new company admin; returns `(tenant_id, user_id, token)`.
    pub async fn new_company(&self, username: &str, email: &str) -> (i32, i32, String) {
        let response = self.signup(username, email, None).await;
        assert_eq!(response.status, StatusCode::CREATED, "signup failed: {}", response.body);
        let tenant_id = response.body["company"]["id"].as_i64().unwrap() as i32;
        let user_id = response.body["user"]["id"].as_i64().unwrap() as i32;
        (tenant_id, user_id, self.token_for(email).await)
    }

    /// Signs up a plain user into `tenant_id`, approves them with
    /// `admin_token` and returns `(user_id, token)`.
    pub async fn approved_member(
        &self,
        tenant_id: i32,
        username: &str,
        email: &str,
        admin_token: &str,
    ) -> (i32, String) {
        let response = self.signup(username, email, Some(tenant_id)).await;
        assert_eq!(response.status, StatusCode::CREATED, "signup failed: {}", response.body);
        let user_id = response.body["user"]["id"].as_i64().unwrap() as i32;

        let verified = self
            .put(&format!("/users/{user_id}/verify"), admin_token, None)
            .await;
        assert_eq!(verified.status, StatusCode::OK, "verify failed: {}", verified.body);

        (user_id, self.token_for(email).await)
    }

    /// Seeds the platform super admin and returns its token.
    pub async fn super_admin_token(&self) -> String {
        let config = SuperAdminConfig {
            email: SUPER_ADMIN_EMAIL.to_string(),
            username: "root".to_string(),
            password: Some(PASSWORD.to_string()),
            tenant: "Platform".to_string(),
        };
        seed_super_admin(&self.db, &config).await.unwrap();
        self.token_for(SUPER_ADMIN_EMAIL).await
    }
}

pub fn id_of(body: &Value) -> i32 {
    body["id"].as_i64().unwrap() as i32
}
