//! Session token issuing and verification.
//!
//! Session tokens are stateless JWTs signed with the configured secret.
//! Claims carry the account id, its role tag, and the token epoch the
//! account held when the token was minted; comparing that epoch against
//! the stored one on each authenticated request lets logout-all
//! invalidate every outstanding token at once.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::AccountRole;

/// Claims embedded in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the account id
    pub sub: String,
    /// Role tag selecting the account table on lookup
    pub role: AccountRole,
    /// Token epoch of the account at mint time
    pub epoch: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Issue a session token. The lifetime is a per-call parameter so a
/// remember-me login never touches shared configuration.
pub fn issue_token(
    secret: &str,
    account_id: &str,
    role: AccountRole,
    epoch: i64,
    ttl: chrono::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: account_id.to_string(),
        role,
        epoch,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode a session token, checking signature and expiry
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_round_trip_preserves_claims() {
        let token = issue_token(
            SECRET,
            "account-1",
            AccountRole::Caterer,
            3,
            chrono::Duration::days(30),
        )
        .unwrap();

        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, "account-1");
        assert_eq!(claims.role, AccountRole::Caterer);
        assert_eq!(claims.epoch, 3);
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_remember_me_extends_expiry() {
        let standard = issue_token(
            SECRET,
            "account-1",
            AccountRole::Customer,
            0,
            chrono::Duration::days(30),
        )
        .unwrap();
        let extended = issue_token(
            SECRET,
            "account-1",
            AccountRole::Customer,
            0,
            chrono::Duration::days(90),
        )
        .unwrap();

        let standard = verify_token(SECRET, &standard).unwrap();
        let extended = verify_token(SECRET, &extended).unwrap();
        assert!(extended.exp > standard.exp);
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the decoder's default leeway
        let token = issue_token(
            SECRET,
            "account-1",
            AccountRole::Customer,
            0,
            chrono::Duration::seconds(-120),
        )
        .unwrap();

        let err = verify_token(SECRET, &token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(
            SECRET,
            "account-1",
            AccountRole::Admin,
            0,
            chrono::Duration::days(1),
        )
        .unwrap();

        let err = verify_token("other-secret", &token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify_token(SECRET, "not-a-token").is_err());
        assert!(verify_token(SECRET, "").is_err());
    }
}
