//! Public caterer directory endpoints plus admin caterer management.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::auth::{hash_password, AdminAccount};
use crate::api::error::ApiError;
use crate::api::validation;
use crate::db::{
    self, AvailableCaterer, AvailableCaterersRequest, AvailableCaterersResponse, CatererEnvelope,
    CatererListResponse, CatererQuery, CatererSearchResponse, CreateCatererRequest,
    MessageResponse, UpdateCatererRequest,
};
use crate::AppState;

/// Query parameters for the search endpoint
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// List active, verified caterers with filtering and pagination
pub async fn list_caterers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatererQuery>,
) -> Result<Json<CatererListResponse>, ApiError> {
    let response = db::list_caterers(&state.db, &query).await?;
    Ok(Json(response))
}

/// Search caterers by name, city, state, or specialty
pub async fn search_caterers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<CatererSearchResponse>, ApiError> {
    validation::validate_search_query(&params.query).map_err(|msg| ApiError::validation(msg))?;

    let caterers = db::search_caterers(&state.db, params.query.trim()).await?;
    Ok(Json(CatererSearchResponse {
        success: true,
        count: caterers.len(),
        data: caterers.into_iter().map(Into::into).collect(),
    }))
}

/// Find caterers serving both the requested occasion and menu type
pub async fn available_caterers(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AvailableCaterersRequest>,
) -> Result<Json<AvailableCaterersResponse>, ApiError> {
    if request.occasion_type.trim().is_empty() || request.menu_type.trim().is_empty() {
        return Err(ApiError::bad_request(
            "Occasion type and menu type are required",
        ));
    }
    validation::validate_occasion(&request.occasion_type)
        .map_err(|msg| ApiError::validation(msg))?;

    let caterers =
        db::available_caterers(&state.db, &request.occasion_type, &request.menu_type).await?;
    let data: Vec<AvailableCaterer> = caterers.into_iter().map(Into::into).collect();

    Ok(Json(AvailableCaterersResponse {
        success: true,
        count: data.len(),
        message: format!("Found {} available caterers", data.len()),
        data,
    }))
}

/// Fetch a single caterer by id.
///
/// An id that matches nothing, malformed or not, is a plain 404.
pub async fn get_caterer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CatererEnvelope>, ApiError> {
    let caterer = db::find_caterer_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Caterer not found"))?;

    Ok(Json(CatererEnvelope {
        success: true,
        data: caterer.into(),
    }))
}

/// Create a caterer account (admin only)
pub async fn create_caterer(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
    Json(request): Json<CreateCatererRequest>,
) -> Result<(StatusCode, Json<CatererEnvelope>), ApiError> {
    validation::validate_name(&request.business_name, "Business name")
        .map_err(|msg| ApiError::validation_field("businessName", msg))?;
    validation::validate_name(&request.contact_person, "Contact person")
        .map_err(|msg| ApiError::validation_field("contactPerson", msg))?;
    validation::validate_email(&request.email)
        .map_err(|msg| ApiError::validation_field("email", msg))?;
    validation::validate_password(&request.password)
        .map_err(|msg| ApiError::validation_field("password", msg))?;
    if request.phone.trim().is_empty() {
        return Err(ApiError::validation_field("phone", "Phone is required"));
    }
    for occasion in &request.occasion_types {
        validation::validate_occasion(occasion).map_err(|msg| ApiError::validation(msg))?;
    }
    if let (Some(min), Some(max)) = (request.min_guests, request.max_guests) {
        if max < min {
            return Err(ApiError::validation(
                "Maximum guests must not be less than minimum guests",
            ));
        }
    }

    if db::email_exists(&state.db, &request.email).await? {
        return Err(ApiError::duplicate_email());
    }

    let password_hash = hash_password(&request.password)?;
    let caterer = db::create_caterer(&state.db, &request, &password_hash).await?;

    tracing::info!(caterer_id = %caterer.id, business_name = %caterer.business_name, "Created caterer");

    Ok((
        StatusCode::CREATED,
        Json(CatererEnvelope {
            success: true,
            data: caterer.into(),
        }),
    ))
}

/// Update caterer fields (admin only)
pub async fn update_caterer(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
    Path(id): Path<String>,
    Json(request): Json<UpdateCatererRequest>,
) -> Result<Json<CatererEnvelope>, ApiError> {
    if let Some(occasion_types) = &request.occasion_types {
        for occasion in occasion_types {
            validation::validate_occasion(occasion).map_err(|msg| ApiError::validation(msg))?;
        }
    }
    if let (Some(min), Some(max)) = (request.min_guests, request.max_guests) {
        if max < min {
            return Err(ApiError::validation(
                "Maximum guests must not be less than minimum guests",
            ));
        }
    }

    let caterer = db::update_caterer(&state.db, &id, &request)
        .await?
        .ok_or_else(|| ApiError::not_found("Caterer not found"))?;

    Ok(Json(CatererEnvelope {
        success: true,
        data: caterer.into(),
    }))
}

/// Delete a caterer (admin only)
pub async fn delete_caterer(
    State(state): State<Arc<AppState>>,
    AdminAccount(_admin): AdminAccount,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = db::delete_caterer(&state.db, &id).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("Caterer not found"));
    }

    tracing::info!(caterer_id = %id, "Deleted caterer");

    Ok(Json(MessageResponse::new("Caterer removed")))
}
