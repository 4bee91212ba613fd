//! Customer and admin account models.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::common::AccountRole;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub token_epoch: i64,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires: Option<String>,
    pub last_login: Option<String>,
    pub last_logout: Option<String>,
    pub login_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Sanitized user view returned to clients (no credential fields)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub last_login: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            avatar: user.avatar,
            role: user.role,
            is_active: user.is_active,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

/// Presence of required fields is checked in the handler so missing
/// values produce the API envelope instead of a deserialization reject.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub phone: Option<String>,
    pub role: Option<String>,
}

/// Partial update applied by the admin user-management endpoint.
///
/// The role stays a raw string here; the handler checks it against the
/// allowed values so a bad role produces the API envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Envelope for endpoints returning a single user
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub success: bool,
    pub data: UserResponse,
}

/// Envelope for the admin user listing
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<UserResponse>,
}

pub async fn create_user(
    db: &SqlitePool,
    request: &RegisterRequest,
    password_hash: &str,
    role: AccountRole,
) -> Result<User, sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        first_name: request.first_name.trim().to_string(),
        last_name: request.last_name.trim().to_string(),
        email: request.email.trim().to_lowercase(),
        password_hash: password_hash.to_string(),
        phone: request.phone.clone(),
        avatar: None,
        role: role.to_string(),
        is_active: true,
        token_epoch: 0,
        reset_token_hash: None,
        reset_token_expires: None,
        last_login: None,
        last_logout: None,
        login_count: 0,
        created_at: now.clone(),
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO users (id, first_name, last_name, email, password_hash, phone, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.phone)
    .bind(&user.role)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(db)
    .await?;

    Ok(user)
}

pub async fn find_user_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email.trim().to_lowercase())
        .fetch_optional(db)
        .await
}

pub async fn find_user_by_id(db: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list_users(db: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(db)
        .await
}

/// Apply a partial update; unset fields keep their current value
pub async fn update_user(
    db: &SqlitePool,
    id: &str,
    request: &UpdateUserRequest,
) -> Result<Option<User>, sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query(
        r#"
        UPDATE users SET
            first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name),
            phone = COALESCE(?, phone),
            role = COALESCE(?, role),
            is_active = COALESCE(?, is_active),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&request.first_name)
    .bind(&request.last_name)
    .bind(&request.phone)
    .bind(&request.role)
    .bind(request.is_active)
    .bind(&now)
    .bind(id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_user_by_id(db, id).await
}

pub async fn delete_user(db: &SqlitePool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

/// Count admins that can still sign in; the last one must not be removed
pub async fn count_active_admins(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin' AND is_active = 1")
        .fetch_one(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            phone: None,
            role: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let db = test_pool().await;
        let created = create_user(&db, &register_request("Ada@Example.com"), "hash", AccountRole::Customer)
            .await
            .unwrap();
        assert_eq!(created.email, "ada@example.com");
        assert_eq!(created.role, "customer");

        // Lookup normalizes case the same way the insert does
        let found = find_user_by_email(&db, "ADA@example.COM").await.unwrap();
        assert_eq!(found.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = test_pool().await;
        create_user(&db, &register_request("dup@example.com"), "hash", AccountRole::Customer)
            .await
            .unwrap();
        let err = create_user(&db, &register_request("DUP@example.com"), "hash", AccountRole::Customer)
            .await
            .unwrap_err();
        match err {
            sqlx::Error::Database(db_err) => {
                assert!(db_err.message().contains("UNIQUE constraint failed"))
            }
            other => panic!("expected database error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_partial_update_keeps_unset_fields() {
        let db = test_pool().await;
        let user = create_user(&db, &register_request("upd@example.com"), "hash", AccountRole::Customer)
            .await
            .unwrap();

        let updated = update_user(
            &db,
            &user.id,
            &UpdateUserRequest {
                phone: Some("555-0100".to_string()),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.first_name, "Ada");
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));
        assert!(!updated.is_active);

        let missing = update_user(&db, "no-such-id", &UpdateUserRequest::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_count_active_admins() {
        let db = test_pool().await;
        assert_eq!(count_active_admins(&db).await.unwrap(), 0);

        let admin = create_user(&db, &register_request("admin@example.com"), "hash", AccountRole::Admin)
            .await
            .unwrap();
        assert_eq!(count_active_admins(&db).await.unwrap(), 1);

        update_user(
            &db,
            &admin.id,
            &UpdateUserRequest {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(count_active_admins(&db).await.unwrap(), 0);
    }
}
