pub mod auth;
pub mod caterers;
pub mod error;
pub mod rate_limit;
pub mod token;
pub mod users;
pub mod validation;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::MessageResponse;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Credential endpoints sit behind the stricter limiter tier; the
    // layer only wraps the routes registered before it
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password/:resettoken", put(auth::reset_password))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_auth,
        ))
        .route("/logout", post(auth::logout))
        .route("/logout-all", post(auth::logout_all))
        .route("/refresh", post(auth::refresh))
        .route("/me", get(auth::me))
        .route("/update-password", put(auth::update_password));

    // Public directory plus the admin mutation endpoints; the admin
    // routes authorize through the AdminAccount extractor
    let caterer_routes = Router::new()
        .route("/", get(caterers::list_caterers))
        .route("/", post(caterers::create_caterer))
        .route("/search", get(caterers::search_caterers))
        .route("/available", post(caterers::available_caterers))
        .route("/:id", get(caterers::get_caterer))
        .route("/:id", put(caterers::update_caterer))
        .route("/:id", delete(caterers::delete_caterer));

    let user_routes = Router::new()
        .route("/", get(users::list_users))
        .route("/:id", get(users::get_user))
        .route("/:id", put(users::update_user))
        .route("/:id", delete(users::delete_user));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/caterers", caterer_routes)
        .nest("/users", user_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_api,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(cors_layer(&state.config.server.client_url))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Cross-origin policy for the configured frontend origin. Credentials
/// are allowed because the session cookie rides on API requests.
fn cors_layer(client_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    match client_url.trim_end_matches('/').parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(client_url, "Invalid client URL, CORS origin not set");
            layer
        }
    }
}

/// Liveness probe that also pings the database
async fn health_check(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    let db_ok = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();
    Json(MessageResponse {
        success: db_ok,
        message: if db_ok {
            "OK".to_string()
        } else {
            "Database unreachable".to_string()
        },
    })
}
