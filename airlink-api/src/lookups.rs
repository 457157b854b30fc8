use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/dpa/regiones", get(regions))
        .route("/api/dpa/regiones/{codigo}/provincias", get(provinces))
        .route("/api/dpa/provincias/{codigo}/comunas", get(communes))
        .route("/api/dpa/comunas", get(all_communes))
        .route("/api/airports/search", get(airport_search))
        .route("/api/countries", get(countries))
        .route("/api/countries/region/{region}", get(countries_by_region))
        .route("/api/geocoding/search", get(geocoding_search))
}

// ============================================================================
// Administrative divisions
// ============================================================================

async fn regions(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let out = state
        .dpa
        .regions()
        .await
        .map_err(|e| AppError::unavailable("Error al obtener regiones", e))?;
    Ok(Json(json!(out)))
}

async fn provinces(
    State(state): State<AppState>,
    Path(codigo): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let out = state
        .dpa
        .provinces(&codigo)
        .await
        .map_err(|e| AppError::unavailable("Error al obtener provincias", e))?;
    Ok(Json(json!(out)))
}

async fn communes(
    State(state): State<AppState>,
    Path(codigo): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let out = state
        .dpa
        .communes(&codigo)
        .await
        .map_err(|e| AppError::unavailable("Error al obtener comunas", e))?;
    Ok(Json(json!(out)))
}

async fn all_communes(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let out = state
        .dpa
        .all_communes()
        .await
        .map_err(|e| AppError::unavailable("Error al obtener comunas", e))?;
    Ok(Json(json!(out)))
}

// ============================================================================
// Airport directory
// ============================================================================

#[derive(Debug, Deserialize)]
struct AirportSearchParams {
    q: Option<String>,
    limit: Option<usize>,
}

async fn airport_search(
    State(state): State<AppState>,
    Query(params): Query<AirportSearchParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let term = params.q.unwrap_or_default();
    if term.trim().is_empty() {
        return Ok(Json(json!({ "data": [] })));
    }

    let limit = params.limit.unwrap_or(10).clamp(1, 25);
    let data = state
        .airports
        .search(&term, limit)
        .await
        .map_err(|e| AppError::unavailable("airport_search_failed", e))?;
    Ok(Json(json!({ "data": data })))
}

// ============================================================================
// Countries
// ============================================================================

async fn countries(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let out = state
        .countries
        .list()
        .await
        .map_err(|e| AppError::unavailable("Countries fetch error", e))?;
    Ok(Json(json!(out)))
}

async fn countries_by_region(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let out = state
        .countries
        .by_region(&region)
        .await
        .map_err(|e| AppError::unavailable("Countries fetch error", e))?;
    Ok(Json(json!(out)))
}

// ============================================================================
// Geocoding
// ============================================================================

#[derive(Debug, Deserialize)]
struct GeocodingParams {
    q: Option<String>,
    count: Option<u32>,
    language: Option<String>,
}

async fn geocoding_search(
    State(state): State<AppState>,
    Query(params): Query<GeocodingParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let term = params.q.unwrap_or_default();
    if term.trim().is_empty() {
        return Ok(Json(json!({ "data": [] })));
    }

    let data = state
        .geocoding
        .search(
            &term,
            params.count.unwrap_or(10),
            params.language.as_deref().unwrap_or("es"),
        )
        .await
        .map_err(|e| AppError::unavailable("geocoding error", e))?;
    Ok(Json(json!({ "data": data })))
}
