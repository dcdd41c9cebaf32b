// handlers/mod.rs - Three-tier handler layout
//
// Public (no auth) → Protected (bearer token) → Elevated (bearer token + admin role)
pub mod elevated;
pub mod protected;
pub mod public;

use uuid::Uuid;

use crate::error::ApiError;

/// Parse a path id. An id that is not a UUID cannot name an existing
/// resource, so it is reported the same way as a missing one.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(not_found))
}
