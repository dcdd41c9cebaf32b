pub mod account_service;
pub mod admin_service;
pub mod calculation;
pub mod finance_service;
pub mod payload;
pub mod validation;

use std::collections::HashMap;

use crate::auth::password::PasswordError;
use crate::auth::JwtError;
use crate::database::DatabaseError;

pub use account_service::{AccountService, LoginRequest, LoginResponse, RegisterRequest};
pub use admin_service::{AdminService, RecordUpdateResponse};
pub use calculation::perform_calculations;
pub use finance_service::{FinanceService, SubmitRequest, SubmitResponse};

/// Domain-level failures shared by all services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The mutation would leave the system without an administrator
    #[error("{0}")]
    LastAdmin(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl ServiceError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ServiceError::InvalidInput(message.into())
    }

    pub fn validation(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            field_errors,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
