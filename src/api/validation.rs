//! Input validation for API requests.
//!
//! Validation functions return `Result<(), String>`; handlers map the
//! message into an `ApiError` with the field that failed.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Pragmatic email shape check; deliverability is the mail server's problem
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[\w.+-]+@[\w-]+(\.[\w-]+)+$"
    ).unwrap();
}

/// Occasions the availability matcher understands
pub const VALID_OCCASIONS: [&str; 6] = [
    "wedding",
    "corporate",
    "social",
    "celebration",
    "birthday",
    "anniversary",
];

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address".to_string());
    }

    Ok(())
}

/// Validate a password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 6 {
        return Err("Password must be at least 6 characters".to_string());
    }

    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }

    Ok(())
}

/// Validate a required name-like field (first name, business name, ...)
pub fn validate_name(value: &str, field_name: &str) -> Result<(), String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if value.len() > 50 {
        return Err(format!("{} is too long (max 50 characters)", field_name));
    }

    Ok(())
}

/// Validate an occasion against the enumerated whitelist
pub fn validate_occasion(occasion: &str) -> Result<(), String> {
    let occasion_lower = occasion.trim().to_lowercase();
    if !VALID_OCCASIONS.contains(&occasion_lower.as_str()) {
        return Err(format!(
            "Invalid occasion type. Must be one of: {}",
            VALID_OCCASIONS.join(", ")
        ));
    }
    Ok(())
}

/// Validate a directory search term
pub fn validate_search_query(query: &str) -> Result<(), String> {
    if query.trim().len() < 2 {
        return Err("Search query must be at least 2 characters long".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.co").is_ok());
        assert!(validate_email("  spaced@example.com  ").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("two@@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("abcdef").is_ok());

        assert!(validate_password("").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Ada", "First name").is_ok());
        assert!(validate_name("  Ada  ", "First name").is_ok());

        let err = validate_name("", "First name").unwrap_err();
        assert_eq!(err, "First name is required");
        assert!(validate_name("   ", "First name").is_err());
        assert!(validate_name(&"x".repeat(51), "First name").is_err());
    }

    #[test]
    fn test_validate_occasion() {
        assert!(validate_occasion("wedding").is_ok());
        assert!(validate_occasion("Corporate").is_ok());
        assert!(validate_occasion(" BIRTHDAY ").is_ok());

        assert!(validate_occasion("").is_err());
        assert!(validate_occasion("funeral").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert!(validate_search_query("ab").is_ok());
        assert!(validate_search_query("bbq masters").is_ok());

        assert!(validate_search_query("a").is_err());
        assert!(validate_search_query("  a  ").is_err());
        assert!(validate_search_query("").is_err());
    }
}
