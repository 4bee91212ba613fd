//! Caterer profiles and the directory query layer.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::common::{parse_tags, serialize_tags};

#[derive(Debug, Clone, FromRow)]
pub struct Caterer {
    pub id: String,
    pub business_name: String,
    pub contact_person: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub specialties: String,
    pub occasion_types: String,
    pub menu_types: String,
    pub min_guests: i64,
    pub max_guests: i64,
    pub price_per_person: f64,
    pub rating: f64,
    pub review_count: i64,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub token_epoch: i64,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires: Option<String>,
    pub last_login: Option<String>,
    pub last_logout: Option<String>,
    pub login_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Full caterer view returned to clients (no credential fields)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatererResponse {
    pub id: String,
    pub business_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub specialties: Vec<String>,
    pub occasion_types: Vec<String>,
    pub menu_types: Vec<String>,
    pub min_guests: i64,
    pub max_guests: i64,
    pub price_per_person: f64,
    pub rating: f64,
    pub review_count: i64,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: String,
}

impl From<Caterer> for CatererResponse {
    fn from(caterer: Caterer) -> Self {
        Self {
            id: caterer.id,
            business_name: caterer.business_name,
            contact_person: caterer.contact_person,
            email: caterer.email,
            phone: caterer.phone,
            description: caterer.description,
            address: caterer.address,
            city: caterer.city,
            state: caterer.state,
            specialties: parse_tags(&caterer.specialties),
            occasion_types: parse_tags(&caterer.occasion_types),
            menu_types: parse_tags(&caterer.menu_types),
            min_guests: caterer.min_guests,
            max_guests: caterer.max_guests,
            price_per_person: caterer.price_per_person,
            rating: caterer.rating,
            review_count: caterer.review_count,
            image_url: caterer.image_url,
            is_active: caterer.is_active,
            is_verified: caterer.is_verified,
            created_at: caterer.created_at,
        }
    }
}

/// Trimmed projection returned by the availability endpoint.
///
/// The business name is exposed as `name` here, matching the shape the
/// booking flow consumes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableCaterer {
    pub id: String,
    pub name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub rating: f64,
    pub price_per_person: f64,
    pub city: String,
    pub state: String,
    pub specialties: Vec<String>,
}

impl From<Caterer> for AvailableCaterer {
    fn from(caterer: Caterer) -> Self {
        Self {
            id: caterer.id,
            name: caterer.business_name,
            contact_person: caterer.contact_person,
            email: caterer.email,
            phone: caterer.phone,
            rating: caterer.rating,
            price_per_person: caterer.price_per_person,
            city: caterer.city,
            state: caterer.state,
            specialties: parse_tags(&caterer.specialties),
        }
    }
}

/// Query parameters for the directory listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatererQuery {
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<i64>,
    /// Items per page (defaults to 10, capped at 100)
    pub limit: Option<i64>,
    /// Case-insensitive city substring
    pub location: Option<String>,
    /// Occasion tag the caterer must serve
    pub occasion_type: Option<String>,
    /// Menu tag the caterer must offer
    pub menu_type: Option<String>,
}

/// Paginated directory listing envelope
#[derive(Debug, Serialize)]
pub struct CatererListResponse {
    pub success: bool,
    pub count: usize,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub data: Vec<CatererResponse>,
}

/// Envelope for endpoints returning a single caterer
#[derive(Debug, Serialize)]
pub struct CatererEnvelope {
    pub success: bool,
    pub data: CatererResponse,
}

/// Envelope for search results
#[derive(Debug, Serialize)]
pub struct CatererSearchResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<CatererResponse>,
}

/// Criteria posted to the availability endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableCaterersRequest {
    #[serde(default)]
    pub occasion_type: String,
    #[serde(default)]
    pub menu_type: String,
}

/// Envelope for availability results
#[derive(Debug, Serialize)]
pub struct AvailableCaterersResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<AvailableCaterer>,
    pub message: String,
}

/// Presence of required fields is checked in the handler so missing
/// values produce the API envelope instead of a deserialization reject.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatererRequest {
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub occasion_types: Vec<String>,
    #[serde(default)]
    pub menu_types: Vec<String>,
    pub min_guests: Option<i64>,
    pub max_guests: Option<i64>,
    pub price_per_person: Option<f64>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

/// Partial update applied by the admin caterer endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCatererRequest {
    pub business_name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub occasion_types: Option<Vec<String>>,
    pub menu_types: Option<Vec<String>>,
    pub min_guests: Option<i64>,
    pub max_guests: Option<i64>,
    pub price_per_person: Option<f64>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

pub async fn create_caterer(
    db: &SqlitePool,
    request: &CreateCatererRequest,
    password_hash: &str,
) -> Result<Caterer, sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();
    let caterer = Caterer {
        id: uuid::Uuid::new_v4().to_string(),
        business_name: request.business_name.trim().to_string(),
        contact_person: request.contact_person.trim().to_string(),
        email: request.email.trim().to_lowercase(),
        password_hash: password_hash.to_string(),
        phone: request.phone.clone(),
        description: request.description.clone(),
        address: request.address.clone(),
        city: request.city.clone(),
        state: request.state.clone(),
        specialties: serialize_tags(&request.specialties),
        occasion_types: serialize_tags(&request.occasion_types),
        menu_types: serialize_tags(&request.menu_types),
        min_guests: request.min_guests.unwrap_or(10),
        max_guests: request.max_guests.unwrap_or(500),
        price_per_person: request.price_per_person.unwrap_or(0.0),
        rating: 0.0,
        review_count: 0,
        image_url: request.image_url.clone(),
        is_active: request.is_active.unwrap_or(true),
        is_verified: request.is_verified.unwrap_or(false),
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
        INSERT INTO caterers (
            id, business_name, contact_person, email, password_hash, phone,
            description, address, city, state, specialties, occasion_types,
            menu_types, min_guests, max_guests, price_per_person, rating,
            review_count, image_url, is_active, is_verified, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&caterer.id)
    .bind(&caterer.business_name)
    .bind(&caterer.contact_person)
    .bind(&caterer.email)
    .bind(&caterer.password_hash)
    .bind(&caterer.phone)
    .bind(&caterer.description)
    .bind(&caterer.address)
    .bind(&caterer.city)
    .bind(&caterer.state)
    .bind(&caterer.specialties)
    .bind(&caterer.occasion_types)
    .bind(&caterer.menu_types)
    .bind(caterer.min_guests)
    .bind(caterer.max_guests)
    .bind(caterer.price_per_person)
    .bind(caterer.rating)
    .bind(caterer.review_count)
    .bind(&caterer.image_url)
    .bind(caterer.is_active)
    .bind(caterer.is_verified)
    .bind(&caterer.created_at)
    .bind(&caterer.updated_at)
    .execute(db)
    .await?;

    Ok(caterer)
}

pub async fn find_caterer_by_email(
    db: &SqlitePool,
    email: &str,
) -> Result<Option<Caterer>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM caterers WHERE email = ?")
        .bind(email.trim().to_lowercase())
        .fetch_optional(db)
        .await
}

pub async fn find_caterer_by_id(db: &SqlitePool, id: &str) -> Result<Option<Caterer>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM caterers WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// List publicly visible caterers with filtering and pagination
pub async fn list_caterers(
    db: &SqlitePool,
    query: &CatererQuery,
) -> Result<CatererListResponse, sqlx::Error> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * limit;

    // Build dynamic WHERE clause; only active, verified caterers are listed
    let mut conditions = vec!["is_active = 1".to_string(), "is_verified = 1".to_string()];
    let mut bindings: Vec<String> = Vec::new();

    if let Some(location) = query.location.as_deref().map(str::trim) {
        if !location.is_empty() {
            conditions.push("LOWER(city) LIKE '%' || LOWER(?) || '%'".to_string());
            bindings.push(location.to_string());
        }
    }

    if let Some(occasion) = query.occasion_type.as_deref().map(str::trim) {
        if !occasion.is_empty() {
            // Tag membership: match the quoted element inside the JSON array
            conditions.push("LOWER(occasion_types) LIKE '%\"' || LOWER(?) || '\"%'".to_string());
            bindings.push(occasion.to_string());
        }
    }

    if let Some(menu) = query.menu_type.as_deref().map(str::trim) {
        if !menu.is_empty() {
            conditions.push("LOWER(menu_types) LIKE '%\"' || LOWER(?) || '\"%'".to_string());
            bindings.push(menu.to_string());
        }
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));

    // Build and execute count query
    let count_sql = format!("SELECT COUNT(*) as count FROM caterers {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for binding in &bindings {
        count_query = count_query.bind(binding);
    }
    let total = count_query.fetch_one(db).await?;

    // Build and execute main query
    let sql = format!(
        "SELECT * FROM caterers {} ORDER BY rating DESC, created_at DESC LIMIT ? OFFSET ?",
        where_clause
    );
    let mut query_builder = sqlx::query_as::<_, Caterer>(&sql);
    for binding in &bindings {
        query_builder = query_builder.bind(binding);
    }
    query_builder = query_builder.bind(limit).bind(offset);

    let items = query_builder.fetch_all(db).await?;
    let pages = (total as f64 / limit as f64).ceil() as i64;
    let data: Vec<CatererResponse> = items.into_iter().map(Into::into).collect();

    Ok(CatererListResponse {
        success: true,
        count: data.len(),
        total,
        page,
        pages,
        data,
    })
}

/// Case-insensitive substring search over name, location, and specialties
pub async fn search_caterers(db: &SqlitePool, term: &str) -> Result<Vec<Caterer>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM caterers
        WHERE is_active = 1 AND is_verified = 1
          AND (
            LOWER(business_name) LIKE '%' || LOWER(?) || '%'
            OR LOWER(city) LIKE '%' || LOWER(?) || '%'
            OR LOWER(state) LIKE '%' || LOWER(?) || '%'
            OR LOWER(specialties) LIKE '%' || LOWER(?) || '%'
          )
        ORDER BY rating DESC, created_at DESC
        "#,
    )
    .bind(term)
    .bind(term)
    .bind(term)
    .bind(term)
    .fetch_all(db)
    .await
}

/// Caterers serving the given occasion whose menus include the given type
pub async fn available_caterers(
    db: &SqlitePool,
    occasion_type: &str,
    menu_type: &str,
) -> Result<Vec<Caterer>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM caterers
        WHERE is_active = 1 AND is_verified = 1
          AND LOWER(occasion_types) LIKE '%"' || LOWER(?) || '"%'
          AND LOWER(menu_types) LIKE '%"' || LOWER(?) || '"%'
        ORDER BY rating DESC, created_at DESC
        "#,
    )
    .bind(occasion_type)
    .bind(menu_type)
    .fetch_all(db)
    .await
}

/// Apply a partial update; unset fields keep their current value
pub async fn update_caterer(
    db: &SqlitePool,
    id: &str,
    request: &UpdateCatererRequest,
) -> Result<Option<Caterer>, sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query(
        r#"
        UPDATE caterers SET
            business_name = COALESCE(?, business_name),
            contact_person = COALESCE(?, contact_person),
            phone = COALESCE(?, phone),
            description = COALESCE(?, description),
            address = COALESCE(?, address),
            city = COALESCE(?, city),
            state = COALESCE(?, state),
            specialties = COALESCE(?, specialties),
            occasion_types = COALESCE(?, occasion_types),
            menu_types = COALESCE(?, menu_types),
            min_guests = COALESCE(?, min_guests),
            max_guests = COALESCE(?, max_guests),
            price_per_person = COALESCE(?, price_per_person),
            image_url = COALESCE(?, image_url),
            is_active = COALESCE(?, is_active),
            is_verified = COALESCE(?, is_verified),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&request.business_name)
    .bind(&request.contact_person)
    .bind(&request.phone)
    .bind(&request.description)
    .bind(&request.address)
    .bind(&request.city)
    .bind(&request.state)
    .bind(request.specialties.as_deref().map(serialize_tags))
    .bind(request.occasion_types.as_deref().map(serialize_tags))
    .bind(request.menu_types.as_deref().map(serialize_tags))
    .bind(request.min_guests)
    .bind(request.max_guests)
    .bind(request.price_per_person)
    .bind(&request.image_url)
    .bind(request.is_active)
    .bind(request.is_verified)
    .bind(&now)
    .bind(id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_caterer_by_id(db, id).await
}

pub async fn delete_caterer(db: &SqlitePool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM caterers WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
