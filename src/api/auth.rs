//! Authentication handlers and the request extractor for the current account.
//!
//! Passwords are hashed with Argon2. Session tokens are signed JWTs carrying
//! the account id, role, and token epoch; password reset tokens are random
//! values stored only as SHA-256 hashes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::{token, validation};
use crate::db::{
    self, Account, AccountEnvelope, AccountRole, AuthResponse, DbPool, ForgotPasswordRequest,
    LoginRequest, MessageResponse, RegisterRequest, ResetPasswordRequest, UpdatePasswordRequest,
};
use crate::AppState;

/// Name of the cookie carrying the session token
const TOKEN_COOKIE: &str = "token";

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Generate a random password reset token
fn generate_reset_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Hash a reset token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Build the session cookie carrying a freshly issued token.
///
/// The cookie itself is session-scoped; the expiry lives inside the JWT.
fn token_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .build()
}

fn clear_token_cookie() -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE).path("/").build()
}

/// Extract the session token from request headers or the auth cookie
fn extract_token(parts: &Parts) -> Option<String> {
    // Try Authorization header first
    if let Some(auth_header) = parts
        .headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    // Fall back to the session cookie
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }

    // Finally, the x-auth-token header
    parts
        .headers
        .get("x-auth-token")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}

/// Resolve a session token to a live account.
///
/// A token is rejected when its signature or expiry fails verification, when
/// the account no longer exists or is deactivated, or when its epoch no
/// longer matches the account's current token epoch.
pub async fn authenticate(db: &DbPool, jwt_secret: &str, raw_token: &str) -> Result<Account, ApiError> {
    let claims = token::verify_token(jwt_secret, raw_token)
        .map_err(|_| ApiError::unauthorized("Not authorized to access this route"))?;

    let account = db::find_account(db, claims.role, &claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Not authorized to access this route"))?;

    if !account.is_active() {
        return Err(ApiError::unauthorized(
            "Account is deactivated. Please contact support.",
        ));
    }

    // Tokens minted before a logout-all carry a stale epoch
    if claims.epoch != account.token_epoch() {
        return Err(ApiError::unauthorized("Not authorized to access this route"));
    }

    Ok(account)
}

/// Extractor for getting the current authenticated account from a request
#[async_trait]
impl FromRequestParts<Arc<AppState>> for Account {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let raw_token = extract_token(parts)
            .ok_or_else(|| ApiError::unauthorized("Not authorized to access this route"))?;
        authenticate(&state.db, &state.config.auth.jwt_secret, &raw_token).await
    }
}

/// Extractor that additionally requires the admin role
#[derive(Debug)]
pub struct AdminAccount(pub Account);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let account = Account::from_request_parts(parts, state).await?;
        if account.role() != AccountRole::Admin {
            return Err(ApiError::forbidden(format!(
                "Role '{}' is not authorized to access this route",
                account.role()
            )));
        }
        Ok(AdminAccount(account))
    }
}

/// Register a new customer or admin account
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    validation::validate_name(&request.first_name, "First name")
        .map_err(|msg| ApiError::validation_field("firstName", msg))?;
    validation::validate_name(&request.last_name, "Last name")
        .map_err(|msg| ApiError::validation_field("lastName", msg))?;
    validation::validate_email(&request.email)
        .map_err(|msg| ApiError::validation_field("email", msg))?;
    validation::validate_password(&request.password)
        .map_err(|msg| ApiError::validation_field("password", msg))?;

    // Caterer accounts are created through the caterer endpoints, never here
    let role = match request.role.as_deref() {
        None | Some("customer") => AccountRole::Customer,
        Some("admin") => AccountRole::Admin,
        Some(_) => return Err(ApiError::validation("Invalid role specified")),
    };

    if db::email_exists(&state.db, &request.email).await? {
        return Err(ApiError::duplicate_email());
    }

    let password_hash = hash_password(&request.password)?;
    let user = db::create_user(&state.db, &request, &password_hash, role).await?;

    tracing::info!(email = %user.email, role = %role, "Registered new account");

    // Registration succeeds whether or not the welcome email goes out
    if let Err(e) = state
        .email
        .send_welcome_email(&user.email, &user.first_name)
        .await
    {
        tracing::error!(error = %e, "Failed to send welcome email");
    }

    let account = Account::User(user);
    let session_token = token::issue_token(
        &state.config.auth.jwt_secret,
        account.id(),
        account.role(),
        account.token_epoch(),
        chrono::Duration::days(state.config.auth.token_ttl_days),
    )?;

    let cookie = token_cookie(session_token.clone(), state.config.auth.cookie_secure);
    Ok((
        StatusCode::CREATED,
        jar.add(cookie),
        Json(AuthResponse::new(
            "User registered successfully",
            session_token,
            account,
        )),
    ))
}

/// Log in with email and password, across both account kinds
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Please provide email and password"));
    }

    let account = db::find_account_by_email(&state.db, &request.email)
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;

    if !account.is_active() {
        return Err(ApiError::unauthorized(
            "Account is deactivated. Please contact support.",
        ));
    }

    if !verify_password(&request.password, account.password_hash()) {
        return Err(ApiError::invalid_credentials());
    }

    db::record_login(&state.db, &account).await?;

    // Reload so the response reflects the login bookkeeping
    let account = db::find_account(&state.db, account.role(), account.id())
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;

    let ttl_days = if request.remember_me {
        state.config.auth.remember_me_ttl_days
    } else {
        state.config.auth.token_ttl_days
    };

    let session_token = token::issue_token(
        &state.config.auth.jwt_secret,
        account.id(),
        account.role(),
        account.token_epoch(),
        chrono::Duration::days(ttl_days),
    )?;

    tracing::info!(account_id = %account.id(), role = %account.role(), "Login successful");

    let cookie = token_cookie(session_token.clone(), state.config.auth.cookie_secure);
    Ok((
        jar.add(cookie),
        Json(AuthResponse::new("Login successful", session_token, account)),
    ))
}

/// Clear the session cookie and record the logout time.
///
/// Tokens already issued stay valid until their natural expiry.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    account: Account,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    db::record_logout(&state.db, account.role(), account.id()).await?;

    tracing::info!(account_id = %account.id(), role = %account.role(), "Logged out");

    Ok((
        jar.remove(clear_token_cookie()),
        Json(MessageResponse::new("Logged out successfully")),
    ))
}

/// Invalidate every outstanding token for the account, then clear the cookie
pub async fn logout_all(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    account: Account,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    db::bump_token_epoch(&state.db, account.role(), account.id()).await?;
    db::record_logout(&state.db, account.role(), account.id()).await?;

    tracing::info!(account_id = %account.id(), role = %account.role(), "Logged out from all devices");

    Ok((
        jar.remove(clear_token_cookie()),
        Json(MessageResponse::new("Logged out from all devices successfully")),
    ))
}

/// Issue a fresh token with the standard lifetime
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    account: Account,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let session_token = token::issue_token(
        &state.config.auth.jwt_secret,
        account.id(),
        account.role(),
        account.token_epoch(),
        chrono::Duration::days(state.config.auth.token_ttl_days),
    )?;

    let cookie = token_cookie(session_token.clone(), state.config.auth.cookie_secure);
    Ok((
        jar.add(cookie),
        Json(AuthResponse::new(
            "Token refreshed successfully",
            session_token,
            account,
        )),
    ))
}

/// Return the current account
pub async fn me(account: Account) -> Json<AccountEnvelope> {
    Json(AccountEnvelope {
        success: true,
        data: account.into(),
    })
}

/// Issue a password reset token and email it as a reset link
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if request.email.trim().is_empty() {
        return Err(ApiError::bad_request("Please provide email address"));
    }

    let account = db::find_account_by_email(&state.db, &request.email)
        .await?
        .ok_or_else(|| ApiError::not_found("No account found with this email address"))?;

    let reset_token = generate_reset_token();
    let token_hash = hash_token(&reset_token);
    let ttl_minutes = state.config.auth.reset_token_ttl_minutes;
    let expires = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::minutes(ttl_minutes))
        .unwrap()
        .to_rfc3339();

    db::set_reset_token(&state.db, account.role(), account.id(), &token_hash, &expires).await?;

    let reset_url = format!(
        "{}/reset-password/{}",
        state.config.server.client_url.trim_end_matches('/'),
        reset_token
    );

    if let Err(e) = state
        .email
        .send_password_reset_email(
            account.email(),
            &account.display_name(),
            &reset_url,
            ttl_minutes,
        )
        .await
    {
        tracing::error!(error = %e, "Failed to send password reset email");

        // A token nobody received must not stay usable
        if let Err(e) = db::clear_reset_token(&state.db, account.role(), account.id()).await {
            tracing::error!(error = %e, "Failed to clear unsent reset token");
        }

        return Err(ApiError::internal("Email could not be sent"));
    }

    Ok(Json(MessageResponse::new("Password reset email sent")))
}

/// Consume a reset token and set a new password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(reset_token): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    if request.password.is_empty() {
        return Err(ApiError::bad_request("Please provide new password"));
    }
    validation::validate_password(&request.password)
        .map_err(|msg| ApiError::validation_field("password", msg))?;

    let token_hash = hash_token(&reset_token);
    let account = db::find_account_by_reset_token(&state.db, &token_hash)
        .await?
        .ok_or_else(ApiError::invalid_token)?;

    let password_hash = hash_password(&request.password)?;
    db::set_password(&state.db, account.role(), account.id(), &password_hash).await?;
    db::clear_reset_token(&state.db, account.role(), account.id()).await?;

    tracing::info!(account_id = %account.id(), "Password reset");

    let session_token = token::issue_token(
        &state.config.auth.jwt_secret,
        account.id(),
        account.role(),
        account.token_epoch(),
        chrono::Duration::days(state.config.auth.token_ttl_days),
    )?;

    let cookie = token_cookie(session_token.clone(), state.config.auth.cookie_secure);
    Ok((
        jar.add(cookie),
        Json(AuthResponse::new(
            "Password reset successful",
            session_token,
            account,
        )),
    ))
}

/// Change the password of the authenticated account
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    account: Account,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    if request.current_password.is_empty() || request.new_password.is_empty() {
        return Err(ApiError::bad_request(
            "Please provide current and new password",
        ));
    }
    validation::validate_password(&request.new_password)
        .map_err(|msg| ApiError::validation_field("newPassword", msg))?;

    if !verify_password(&request.current_password, account.password_hash()) {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    let password_hash = hash_password(&request.new_password)?;
    db::set_password(&state.db, account.role(), account.id(), &password_hash).await?;

    let session_token = token::issue_token(
        &state.config.auth.jwt_secret,
        account.id(),
        account.role(),
        account.token_epoch(),
        chrono::Duration::days(state.config.auth.token_ttl_days),
    )?;

    let cookie = token_cookie(session_token.clone(), state.config.auth.cookie_secure);
    Ok((
        jar.add(cookie),
        Json(AuthResponse::new(
            "Password updated successfully",
            session_token,
            account,
        )),
    ))
}

/// Create the default admin user on first start if no account has its email
pub async fn ensure_admin_user(db: &DbPool, email: &str, password: &str) -> anyhow::Result<()> {
    if db::find_user_by_email(db, email).await?.is_some() {
        return Ok(());
    }

    let password_hash = hash_password(password)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {}", e))?;

    let request = RegisterRequest {
        first_name: "Admin".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        password: String::new(),
        phone: None,
        role: None,
    };
    db::create_user(db, &request, &password_hash, AccountRole::Admin).await?;

    tracing::info!(email = %email, "Created default admin user");
    Ok(())
}
