//! Input normalization and format checks for account fields

/// Emails are compared case-insensitively; store them lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email format
///
/// Basic structural check, not RFC 5322.
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    if email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err("Invalid email format".to_string());
    };

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err("Invalid email format".to_string());
    }

    if domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if name.chars().count() > 200 {
        return Err("Name must be at most 200 characters".to_string());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password cannot be empty".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(validate_email_format("ada@example.com").is_ok());
        assert!(validate_email_format("a.b+c@mail.example.org").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "ada", "ada@", "@example.com", "a@b@c.com", "ada@example", "ada@.com", "a da@example.com"] {
            assert!(validate_email_format(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn names_must_have_content() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name("Ada").is_ok());
    }
}
