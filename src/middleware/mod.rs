pub mod auth;
pub mod require_admin;
pub mod response;

pub use auth::{authenticate, AuthUser};
pub use require_admin::{require_admin, AdminUser};
pub use response::{ApiResponse, ApiResult};
