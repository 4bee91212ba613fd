//! Tagged credential subject spanning the two account tables.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::caterer::{find_caterer_by_email, find_caterer_by_id, Caterer, CatererResponse};
use super::common::AccountRole;
use super::user::{find_user_by_email, find_user_by_id, User, UserResponse};

/// One credential subject: a customer/admin user or a caterer. Login,
/// token checks, and password recovery work against this tagged view
/// rather than duck-typing the two row kinds.
#[derive(Debug, Clone)]
pub enum Account {
    User(User),
    Caterer(Caterer),
}

impl Account {
    pub fn id(&self) -> &str {
        match self {
            Self::User(user) => &user.id,
            Self::Caterer(caterer) => &caterer.id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Self::User(user) => &user.email,
            Self::Caterer(caterer) => &caterer.email,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Self::User(user) => format!("{} {}", user.first_name, user.last_name),
            Self::Caterer(caterer) => caterer.business_name.clone(),
        }
    }

    pub fn role(&self) -> AccountRole {
        match self {
            Self::User(user) => user.role.clone().into(),
            Self::Caterer(_) => AccountRole::Caterer,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            Self::User(user) => &user.password_hash,
            Self::Caterer(caterer) => &caterer.password_hash,
        }
    }

    pub fn token_epoch(&self) -> i64 {
        match self {
            Self::User(user) => user.token_epoch,
            Self::Caterer(caterer) => caterer.token_epoch,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Self::User(user) => user.is_active,
            Self::Caterer(caterer) => caterer.is_active,
        }
    }
}

/// Sanitized account view used as the envelope `user` field
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AccountResponse {
    User(UserResponse),
    Caterer(CatererResponse),
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        match account {
            Account::User(user) => Self::User(user.into()),
            Account::Caterer(caterer) => Self::Caterer(caterer.into()),
        }
    }
}

/// Presence of required fields is checked in the handlers so missing
/// values produce the API envelope instead of a deserialization reject.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Envelope carrying a fresh session token plus the sanitized account
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: AccountResponse,
}

impl AuthResponse {
    pub fn new(message: impl Into<String>, token: String, account: Account) -> Self {
        Self {
            success: true,
            message: message.into(),
            token,
            user: account.into(),
        }
    }
}

/// Envelope for endpoints that return only the account
#[derive(Debug, Serialize)]
pub struct AccountEnvelope {
    pub success: bool,
    pub data: AccountResponse,
}

fn table(role: AccountRole) -> &'static str {
    match role {
        AccountRole::Caterer => "caterers",
        _ => "users",
    }
}

/// Look up a credential subject by email, users first, then caterers
pub async fn find_account_by_email(
    db: &SqlitePool,
    email: &str,
) -> Result<Option<Account>, sqlx::Error> {
    if let Some(user) = find_user_by_email(db, email).await? {
        return Ok(Some(Account::User(user)));
    }
    Ok(find_caterer_by_email(db, email).await?.map(Account::Caterer))
}

/// Look up by the (role, id) pair carried in a session token
pub async fn find_account(
    db: &SqlitePool,
    role: AccountRole,
    id: &str,
) -> Result<Option<Account>, sqlx::Error> {
    match role {
        AccountRole::Caterer => Ok(find_caterer_by_id(db, id).await?.map(Account::Caterer)),
        _ => Ok(find_user_by_id(db, id).await?.map(Account::User)),
    }
}

/// True when the email is taken in either account table
pub async fn email_exists(db: &SqlitePool, email: &str) -> Result<bool, sqlx::Error> {
    Ok(find_account_by_email(db, email).await?.is_some())
}

/// Record a successful sign-in
pub async fn record_login(db: &SqlitePool, account: &Account) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();
    let sql = format!(
        "UPDATE {} SET last_login = ?, login_count = login_count + 1 WHERE id = ?",
        table(account.role())
    );
    sqlx::query(&sql)
        .bind(&now)
        .bind(account.id())
        .execute(db)
        .await?;
    Ok(())
}

pub async fn record_logout(
    db: &SqlitePool,
    role: AccountRole,
    id: &str,
) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();
    let sql = format!("UPDATE {} SET last_logout = ? WHERE id = ?", table(role));
    sqlx::query(&sql).bind(&now).bind(id).execute(db).await?;
    Ok(())
}

/// Advance the account's token epoch; tokens minted before the bump
/// fail the epoch comparison on their next authenticated request
pub async fn bump_token_epoch(
    db: &SqlitePool,
    role: AccountRole,
    id: &str,
) -> Result<(), sqlx::Error> {
    let sql = format!(
        "UPDATE {} SET token_epoch = token_epoch + 1 WHERE id = ?",
        table(role)
    );
    sqlx::query(&sql).bind(id).execute(db).await?;
    Ok(())
}

pub async fn set_password(
    db: &SqlitePool,
    role: AccountRole,
    id: &str,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();
    let sql = format!(
        "UPDATE {} SET password_hash = ?, updated_at = ? WHERE id = ?",
        table(role)
    );
    sqlx::query(&sql)
        .bind(password_hash)
        .bind(&now)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn set_reset_token(
    db: &SqlitePool,
    role: AccountRole,
    id: &str,
    token_hash: &str,
    expires: &str,
) -> Result<(), sqlx::Error> {
    let sql = format!(
        "UPDATE {} SET reset_token_hash = ?, reset_token_expires = ? WHERE id = ?",
        table(role)
    );
    sqlx::query(&sql)
        .bind(token_hash)
        .bind(expires)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn clear_reset_token(
    db: &SqlitePool,
    role: AccountRole,
    id: &str,
) -> Result<(), sqlx::Error> {
    let sql = format!(
        "UPDATE {} SET reset_token_hash = NULL, reset_token_expires = NULL WHERE id = ?",
        table(role)
    );
    sqlx::query(&sql).bind(id).execute(db).await?;
    Ok(())
}

/// Find the account holding an unexpired reset token with this hash
pub async fn find_account_by_reset_token(
    db: &SqlitePool,
    token_hash: &str,
) -> Result<Option<Account>, sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();

    let user: Option<User> =
        sqlx::query_as("SELECT * FROM users WHERE reset_token_hash = ? AND reset_token_expires > ?")
            .bind(token_hash)
            .bind(&now)
            .fetch_optional(db)
            .await?;
    if let Some(user) = user {
        return Ok(Some(Account::User(user)));
    }

    let caterer: Option<Caterer> = sqlx::query_as(
        "SELECT * FROM caterers WHERE reset_token_hash = ? AND reset_token_expires > ?",
    )
    .bind(token_hash)
    .bind(&now)
    .fetch_optional(db)
    .await?;
    Ok(caterer.map(Account::Caterer))
}
