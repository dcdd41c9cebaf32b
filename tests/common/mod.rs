#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use finance_api::auth::{generate_jwt, password::hash_password, Claims};
use finance_api::config::AppConfig;
use finance_api::database::models::{NewUser, User};
use finance_api::database::{MemoryStore, Store};
use finance_api::server::app;
use finance_api::state::AppState;
use finance_api::types::Role;

pub const PASSWORD: &str = "correct horse battery staple";

/// One isolated application instance over its own in-memory store
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
    router: Router,
}

pub struct Response {
    pub status: StatusCode,
    pub body: Value,
}

impl Response {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::development())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config.clone());
        Self {
            store,
            config,
            router: app(state),
        }
    }

    /// Insert an account directly, bypassing registration
    pub async fn seed_user(&self, name: &str, email: &str, role: Role) -> Result<User> {
        let password_hash = hash_password(PASSWORD)?;
        let user = self
            .store
            .insert_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role,
            })
            .await?;
        Ok(user)
    }

    pub fn token_for(&self, user: &User) -> Result<String> {
        let claims = Claims::new(user.id, user.email.clone(), self.config.security.jwt_expiry_hours);
        Ok(generate_jwt(&claims, &self.config.security.jwt_secret)?)
    }

    pub fn expired_token_for(&self, user: &User) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            exp: now - 3600,
            iat: now - 7200,
        };
        Ok(generate_jwt(&claims, &self.config.security.jwt_secret)?)
    }

    /// Seed an account and mint a bearer token for it
    pub async fn login_as(&self, name: &str, email: &str, role: Role) -> Result<(User, String)> {
        let user = self.seed_user(name, email, role).await?;
        let token = self.token_for(&user)?;
        Ok((user, token))
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<Response> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Response> {
        let response = self.router.clone().oneshot(request).await.context("router failed")?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body ({})", status))?
        };
        Ok(Response { status, body })
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<Response> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<Response> {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Result<Response> {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<Response> {
        self.request(Method::DELETE, uri, token, None).await
    }
}

pub fn missing_id() -> String {
    Uuid::new_v4().to_string()
}
