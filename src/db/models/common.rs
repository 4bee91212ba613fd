//! Common types and utilities shared across models.

use serde::{Deserialize, Serialize};

/// Role tag stored on account rows and embedded in session tokens
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Customer,
    Admin,
    Caterer,
}

impl Default for AccountRole {
    fn default() -> Self {
        Self::Customer
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
            Self::Caterer => write!(f, "caterer"),
        }
    }
}

impl std::str::FromStr for AccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "customer" | "user" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            "caterer" => Ok(Self::Caterer),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl From<String> for AccountRole {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

/// Helper to parse a JSON tag array from the database
pub fn parse_tags(json: &str) -> Vec<String> {
    serde_json::from_str(json).unwrap_or_default()
}

/// Helper to serialize a tag list to JSON for the database
pub fn serialize_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

/// Success envelope for operations that only report a message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [AccountRole::Customer, AccountRole::Admin, AccountRole::Caterer] {
            let parsed: AccountRole = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_role_accepts_legacy_user_alias() {
        assert_eq!("user".parse::<AccountRole>().unwrap(), AccountRole::Customer);
        assert_eq!("ADMIN".parse::<AccountRole>().unwrap(), AccountRole::Admin);
        assert!("chef".parse::<AccountRole>().is_err());
    }

    #[test]
    fn test_tag_helpers() {
        let tags = vec!["Italian".to_string(), "BBQ".to_string()];
        let json = serialize_tags(&tags);
        assert_eq!(parse_tags(&json), tags);
        assert!(parse_tags("not json").is_empty());
        assert_eq!(serialize_tags(&[]), "[]");
    }
}
