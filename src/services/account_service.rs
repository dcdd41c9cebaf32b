use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::{generate_jwt, Claims};
use crate::config::SecurityConfig;
use crate::database::models::{NewUser, PublicUser};
use crate::database::{DatabaseError, Store};
use crate::services::validation::{normalize_email, validate_email_format, validate_name, validate_password};
use crate::services::{ServiceError, ServiceResult};
use crate::types::Role;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
    pub user: PublicUser,
}

/// Self-service registration and credential exchange
pub struct AccountService {
    store: Arc<dyn Store>,
    security: SecurityConfig,
}

fn require(field: &str, value: Option<String>, errors: &mut HashMap<String, String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => {
            errors.insert(field.to_string(), "This field is required".to_string());
            String::new()
        }
    }
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    /// The configured bootstrap email is the only address registration grants admin to
    fn is_bootstrap_admin(&self, email: &str) -> bool {
        self.security
            .bootstrap_admin_email
            .as_deref()
            .is_some_and(|bootstrap| normalize_email(bootstrap) == email)
    }

    /// Create an account. Always a regular user unless the email is the
    /// configured bootstrap admin.
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<PublicUser> {
        let mut errors = HashMap::new();
        let name = require("name", request.name, &mut errors);
        let email = normalize_email(&require("email", request.email, &mut errors));
        let password = require("password", request.password, &mut errors);
        if !errors.is_empty() {
            return Err(ServiceError::validation("Please fill in all fields", errors));
        }

        validate_name(&name).map_err(ServiceError::InvalidInput)?;
        validate_email_format(&email).map_err(ServiceError::InvalidInput)?;
        validate_password(&password).map_err(ServiceError::InvalidInput)?;

        // Cheap pre-check so duplicates don't pay for hashing; the unique
        // constraint still decides races.
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already exists".to_string()));
        }

        let password_hash = hash_password_blocking(password).await?;
        let role = if self.is_bootstrap_admin(&email) {
            Role::Admin
        } else {
            Role::User
        };

        let user = self
            .store
            .insert_user(NewUser {
                name: name.trim().to_string(),
                email,
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(msg) => ServiceError::Conflict(msg),
                other => ServiceError::Database(other),
            })?;

        if user.role.is_admin() {
            tracing::warn!("Registered bootstrap admin {} ({})", user.id, user.email);
        } else {
            tracing::info!("Registered user {} ({})", user.id, user.email);
        }
        Ok(user.to_public())
    }

    /// Exchange email/password for a bearer token
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        let mut errors = HashMap::new();
        let email = normalize_email(&require("email", request.email, &mut errors));
        let password = require("password", request.password, &mut errors);
        if !errors.is_empty() {
            return Err(ServiceError::validation("Please enter both email and password", errors));
        }

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            tracing::warn!("Login failed: unknown email {}", email);
            return Err(ServiceError::InvalidCredentials);
        };

        if !verify_password_blocking(password, user.password_hash.clone()).await? {
            tracing::warn!("Login failed: wrong password for user {}", user.id);
            return Err(ServiceError::InvalidCredentials);
        }

        let claims = Claims::new(user.id, user.email.clone(), self.security.jwt_expiry_hours);
        let token = generate_jwt(&claims, &self.security.jwt_secret)?;

        tracing::info!("User {} logged in", user.id);
        Ok(LoginResponse {
            token,
            expires_in: claims.exp.saturating_sub(claims.iat).max(0) as u64,
            user: user.to_public(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::validate_jwt;
    use crate::config::AppConfig;
    use crate::database::MemoryStore;

    fn service() -> (Arc<MemoryStore>, AccountService) {
        let store = Arc::new(MemoryStore::new());
        let service = AccountService::new(store.clone(), AppConfig::development().security);
        (store, service)
    }

    fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: Some("Grace".to_string()),
            email: Some(email.to_string()),
            password: Some("correct horse".to_string()),
        }
    }

    #[tokio::test]
    async fn registers_plain_users_with_hashed_password() {
        let (store, service) = service();
        let user = service.register(registration(" Grace@Example.com")).await.unwrap();

        assert_eq!(user.role, Role::User);
        assert_eq!(user.email, "grace@example.com");
        let stored = store.find_user(user.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "correct horse");
    }

    #[tokio::test]
    async fn bootstrap_email_registers_as_admin() {
        let store = Arc::new(MemoryStore::new());
        let mut security = AppConfig::development().security;
        security.bootstrap_admin_email = Some("Ops@Example.com".to_string());
        let service = AccountService::new(store.clone(), security);

        let ops = service.register(registration("ops@example.com")).await.unwrap();
        assert_eq!(ops.role, Role::Admin);

        let other = service.register(registration("grace@example.com")).await.unwrap();
        assert_eq!(other.role, Role::User);
        assert_eq!(store.admin_count().await, 1);
    }

    #[tokio::test]
    async fn login_reports_lifetime_without_overflow() {
        let store = Arc::new(MemoryStore::new());
        let mut security = AppConfig::development().security;
        security.jwt_expiry_hours = u64::MAX;
        let service = AccountService::new(store, security);
        service.register(registration("grace@example.com")).await.unwrap();

        let response = service
            .login(LoginRequest {
                email: Some("grace@example.com".to_string()),
                password: Some("correct horse".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(response.expires_in, crate::config::MAX_JWT_EXPIRY_HOURS * 3600);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() {
        let (_, service) = service();
        service.register(registration("grace@example.com")).await.unwrap();

        let err = service.register(registration("GRACE@example.com")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn missing_fields_are_reported() {
        let (_, service) = service();
        let err = service.register(RegisterRequest::default()).await.unwrap_err();
        let ServiceError::Validation { field_errors, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(field_errors.len(), 3);
    }

    #[tokio::test]
    async fn login_issues_token_for_the_user() {
        let (_, service) = service();
        let user = service.register(registration("grace@example.com")).await.unwrap();

        let response = service
            .login(LoginRequest {
                email: Some("grace@example.com".to_string()),
                password: Some("correct horse".to_string()),
            })
            .await
            .unwrap();

        let claims = validate_jwt(&response.token, &AppConfig::development().security.jwt_secret).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(response.user.id, user.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (_, service) = service();
        service.register(registration("grace@example.com")).await.unwrap();

        for (email, password) in [("grace@example.com", "wrong"), ("nobody@example.com", "correct horse")] {
            let err = service
                .login(LoginRequest {
                    email: Some(email.to_string()),
                    password: Some(password.to_string()),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::InvalidCredentials));
        }
    }
}
