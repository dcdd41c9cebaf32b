pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::MAX_JWT_EXPIRY_HOURS;

/// Bearer token claims. Deliberately role-free: authorization always
/// re-reads the role from the user store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Lifetimes above `MAX_JWT_EXPIRY_HOURS` are clamped to it.
    pub fn new(user_id: Uuid, email: impl Into<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let hours = expiry_hours.min(MAX_JWT_EXPIRY_HOURS) as i64;
        let exp = (now + Duration::hours(hours)).timestamp();

        Self {
            sub: user_id,
            email: email.into(),
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry, returning the decoded claims
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn round_trips_subject() {
        let user_id = Uuid::new_v4();
        let token = generate_jwt(&Claims::new(user_id, "a@example.com", 1), SECRET).unwrap();

        let claims = validate_jwt(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@example.com");
    }

    #[test]
    fn oversized_lifetimes_are_clamped() {
        let claims = Claims::new(Uuid::new_v4(), "a@example.com", u64::MAX);
        assert_eq!(claims.exp - claims.iat, MAX_JWT_EXPIRY_HOURS as i64 * 3600);
        assert!(generate_jwt(&claims, SECRET).is_ok());
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = generate_jwt(&Claims::new(Uuid::new_v4(), "a@example.com", 1), SECRET).unwrap();
        assert!(matches!(
            validate_jwt(&token, "another-secret"),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let mut claims = Claims::new(Uuid::new_v4(), "a@example.com", 1);
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = generate_jwt(&claims, SECRET).unwrap();

        assert!(matches!(validate_jwt(&token, SECRET), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn refuses_empty_secret() {
        let claims = Claims::new(Uuid::new_v4(), "a@example.com", 1);
        assert!(matches!(generate_jwt(&claims, ""), Err(JwtError::InvalidSecret)));
        assert!(matches!(validate_jwt("x.y.z", ""), Err(JwtError::InvalidSecret)));
    }
}
