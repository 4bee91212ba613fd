//! Admin user management endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::auth::AdminAccount;
use crate::api::error::ApiError;
use crate::api::validation;
use crate::db::{
    self, MessageResponse, UpdateUserRequest, UserEnvelope, UserListResponse,
};
use crate::AppState;

/// List every registered user, newest first
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
) -> Result<Json<UserListResponse>, ApiError> {
    let users = db::list_users(&state.db).await?;
    Ok(Json(UserListResponse {
        success: true,
        count: users.len(),
        data: users.into_iter().map(Into::into).collect(),
    }))
}

/// Fetch a single user by id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
    Path(id): Path<String>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let user = db::find_user_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserEnvelope {
        success: true,
        data: user.into(),
    }))
}

/// Update user profile fields, role, or active flag.
///
/// The last active admin can not be demoted or deactivated, so the
/// deployment always keeps at least one working admin login.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserEnvelope>, ApiError> {
    if let Some(first_name) = &request.first_name {
        validation::validate_name(first_name, "First name")
            .map_err(|msg| ApiError::validation_field("firstName", msg))?;
    }
    if let Some(last_name) = &request.last_name {
        validation::validate_name(last_name, "Last name")
            .map_err(|msg| ApiError::validation_field("lastName", msg))?;
    }
    match request.role.as_deref() {
        None | Some("customer") | Some("admin") => {}
        Some(_) => {
            return Err(ApiError::validation_field("role", "Invalid role specified"));
        }
    }

    let target = db::find_user_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let demotes = matches!(request.role.as_deref(), Some(role) if role != "admin");
    let deactivates = request.is_active == Some(false);
    if target.role == "admin" && target.is_active && (demotes || deactivates) {
        let active_admins = db::count_active_admins(&state.db).await?;
        if active_admins <= 1 {
            return Err(ApiError::bad_request(
                "Cannot demote or deactivate the last admin account",
            ));
        }
    }

    let user = db::update_user(&state.db, &id, &request)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(user_id = %id, "Updated user");

    Ok(Json(UserEnvelope {
        success: true,
        data: user.into(),
    }))
}

/// Delete a user account
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let target = db::find_user_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if target.role == "admin" && target.is_active {
        let active_admins = db::count_active_admins(&state.db).await?;
        if active_admins <= 1 {
            return Err(ApiError::bad_request("Cannot delete the last admin account"));
        }
    }

    db::delete_user(&state.db, &id).await?;

    tracing::info!(user_id = %id, "Deleted user");

    Ok(Json(MessageResponse::new("User removed")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::ensure_admin_user;
    use crate::config::Config;
    use crate::db::{test_pool, Account, AccountRole, RegisterRequest};
    use axum::http::StatusCode;

    async fn test_state() -> Arc<AppState> {
        let mut config = Config::default();
        config.auth.jwt_secret = "test-secret".to_string();
        let db = test_pool().await;
        Arc::new(AppState::new(config, db))
    }

    async fn admin(state: &Arc<AppState>) -> AdminAccount {
        ensure_admin_user(&state.db, "admin@test.local", "adminpass")
            .await
            .unwrap();
        let user = db::find_user_by_email(&state.db, "admin@test.local")
            .await
            .unwrap()
            .unwrap();
        AdminAccount(Account::User(user))
    }

    async fn create_customer(state: &Arc<AppState>, email: &str) -> String {
        let request = RegisterRequest {
            first_name: "Sam".to_string(),
            last_name: "Guest".to_string(),
            email: email.to_string(),
            password: String::new(),
            phone: None,
            role: None,
        };
        db::create_user(&state.db, &request, "hash", AccountRole::Customer)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_list_users_is_sanitized() {
        let state = test_state().await;
        let admin_account = admin(&state).await;
        create_customer(&state, "guest@example.com").await;

        let Json(listing) = list_users(State(state), admin_account).await.unwrap();
        assert_eq!(listing.count, 2);

        let json = serde_json::to_value(&listing.data[0]).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password").is_none());
    }

    #[tokio::test]
    async fn test_get_user_unknown_id_is_404() {
        let state = test_state().await;
        let admin_account = admin(&state).await;

        let err = get_user(State(state), admin_account, Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "User not found");
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_role() {
        let state = test_state().await;
        let admin_account = admin(&state).await;
        let id = create_customer(&state, "guest@example.com").await;

        let err = update_user(
            State(state),
            admin_account,
            Path(id),
            Json(UpdateUserRequest {
                role: Some("superuser".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message(), "Invalid role specified");
    }

    #[tokio::test]
    async fn test_promote_customer_to_admin() {
        let state = test_state().await;
        let admin_account = admin(&state).await;
        let id = create_customer(&state, "guest@example.com").await;

        let Json(updated) = update_user(
            State(state.clone()),
            admin_account,
            Path(id),
            Json(UpdateUserRequest {
                role: Some("admin".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.data.role, "admin");
        assert_eq!(db::count_active_admins(&state.db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_last_admin_cannot_be_demoted_or_deactivated() {
        let state = test_state().await;

        let admin_account = admin(&state).await;
        let admin_id = admin_account.0.id().to_string();

        let err = update_user(
            State(state.clone()),
            admin_account,
            Path(admin_id.clone()),
            Json(UpdateUserRequest {
                role: Some("customer".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.message(),
            "Cannot demote or deactivate the last admin account"
        );

        let admin_account = admin(&state).await;
        let err = update_user(
            State(state.clone()),
            admin_account,
            Path(admin_id.clone()),
            Json(UpdateUserRequest {
                is_active: Some(false),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        // With a second admin in place the demotion goes through
        let second = create_customer(&state, "other@example.com").await;
        db::update_user(
            &state.db,
            &second,
            &UpdateUserRequest {
                role: Some("admin".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let admin_account = admin(&state).await;
        let Json(updated) = update_user(
            State(state),
            admin_account,
            Path(admin_id),
            Json(UpdateUserRequest {
                role: Some("customer".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.data.role, "customer");
    }

    #[tokio::test]
    async fn test_last_admin_cannot_be_deleted() {
        let state = test_state().await;
        let admin_account = admin(&state).await;
        let admin_id = admin_account.0.id().to_string();

        let err = delete_user(State(state), admin_account, Path(admin_id))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Cannot delete the last admin account");
    }

    #[tokio::test]
    async fn test_delete_customer() {
        let state = test_state().await;
        let admin_account = admin(&state).await;
        let id = create_customer(&state, "guest@example.com").await;

        let Json(response) = delete_user(State(state.clone()), admin_account, Path(id.clone()))
            .await
            .unwrap();
        assert_eq!(response.message, "User removed");

        let admin_account = admin(&state).await;
        let err = delete_user(State(state), admin_account, Path(id))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
