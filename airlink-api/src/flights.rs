use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::json;

use airlink_core::destination::{canonical_destination, DestinationQuery};
use airlink_core::fare::FareOffer;
use airlink_core::flight::{AvailabilityQuery, FlightSearch, TripInfo};
use airlink_core::repository::{FareRepository, FlightRepository};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vuelos/buscar", get(search_flights))
        .route("/vuelos/disponibilidad", get(daily_availability))
        .route("/vuelos/destinos", get(list_destinations))
        .route("/vuelos/destinos/{ciudad}/codigo", get(destination_code))
        .route("/vuelos/viajes/{id_viaje}/tarifas", get(fares_for_trip))
        .route("/vuelos/{id_viaje}", get(trip_detail))
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn parse_date(value: &str, error: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::invalid(error.to_string(), "Formato esperado YYYY-MM-DD"))
}

/// UTC offset of the named zone on the given day (taken at local noon),
/// or UTC when the client sends no zone.
fn resolve_offset(tz: Option<&str>, date: NaiveDate) -> Result<FixedOffset, AppError> {
    let Some(name) = tz else {
        return Ok(utc());
    };
    let zone: chrono_tz::Tz = name
        .parse()
        .map_err(|_| AppError::bad_param("Zona horaria inválida"))?;
    let noon = date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    Ok(zone.offset_from_utc_datetime(&noon).fix())
}

/// Resolve the raw `destino` parameter to a terminal code. City names go
/// through the directory; an unmatched city stays as typed, which makes
/// the search return an empty set instead of an error.
async fn resolve_destination(state: &AppState, raw: &str) -> Result<String, AppError> {
    match canonical_destination(raw) {
        DestinationQuery::Code(code) => Ok(code),
        DestinationQuery::City(city) => {
            let terminal = state
                .flights
                .terminal_by_city(&city)
                .await
                .map_err(|e| AppError::unavailable("Error al buscar vuelos", e))?;
            Ok(terminal.map_or(city, |t| t.code))
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    origen: Option<String>,
    destino: Option<String>,
    fecha: Option<String>,
    clase: Option<String>,
    tz: Option<String>,
}

/// GET /vuelos/buscar?origen=SCL&destino=PMC&fecha=2025-11-03&clase=eco[&tz=America/Santiago]
async fn search_flights(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let (Some(destino), Some(fecha)) = (params.destino, params.fecha) else {
        return Err(AppError::invalid(
            "Faltan parámetros requeridos",
            "Se requiere destino y fecha",
        ));
    };

    let date = parse_date(&fecha, "Fecha inválida")?;
    let offset = resolve_offset(params.tz.as_deref(), date)?;
    let destination = resolve_destination(&state, &destino).await?;

    let search = FlightSearch {
        origin: params.origen.unwrap_or_else(|| state.search.default_origin.clone()),
        destination,
        date,
        cabin: params.clase,
        offset,
    };

    let flights = state
        .flights
        .search(&search)
        .await
        .map_err(|e| AppError::unavailable("Error al buscar vuelos", e))?;

    Ok(Json(flights).into_response())
}

#[derive(Debug, Deserialize)]
struct AvailabilityParams {
    origen: Option<String>,
    destino: Option<String>,
    desde: Option<String>,
    dias: Option<u32>,
    tz: Option<String>,
}

/// GET /vuelos/disponibilidad?origen=SCL&destino=PMC&desde=2025-11-03&dias=7[&tz=...]
async fn daily_availability(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Response, AppError> {
    let (Some(destino), Some(desde)) = (params.destino, params.desde) else {
        return Err(AppError::bad_param(
            "Parámetros requeridos: destino, desde (YYYY-MM-DD)",
        ));
    };

    let from = parse_date(&desde, "Fecha inválida")?;
    let offset = resolve_offset(params.tz.as_deref(), from)?;
    let destination = resolve_destination(&state, &destino).await?;

    let query = AvailabilityQuery {
        origin: params.origen.unwrap_or_else(|| state.search.default_origin.clone()),
        destination,
        from,
        days: params.dias.unwrap_or(state.search.availability_days).max(1),
        offset,
    };

    let days = state
        .flights
        .daily_availability(&query)
        .await
        .map_err(|e| AppError::unavailable("Error al obtener disponibilidad", e))?;

    Ok(Json(days).into_response())
}

/// GET /vuelos/destinos
async fn list_destinations(State(state): State<AppState>) -> Result<Response, AppError> {
    let destinations = state
        .flights
        .list_destinations()
        .await
        .map_err(|e| AppError::unavailable("Error al obtener destinos", e))?;
    Ok(Json(destinations).into_response())
}

/// GET /vuelos/destinos/:ciudad/codigo
async fn destination_code(
    State(state): State<AppState>,
    Path(ciudad): Path<String>,
) -> Result<Response, AppError> {
    let terminal = state
        .flights
        .terminal_by_city(&ciudad)
        .await
        .map_err(|e| AppError::unavailable("Error del servidor", e))?;

    match terminal {
        Some(terminal) => Ok(Json(terminal).into_response()),
        None => Ok((
            axum::http::StatusCode::NOT_FOUND,
            Json(json!({ "error": "Ciudad no encontrada", "ciudad": ciudad })),
        )
            .into_response()),
    }
}

/// GET /vuelos/viajes/:idViaje/tarifas
async fn fares_for_trip(
    State(state): State<AppState>,
    Path(id_viaje): Path<i64>,
) -> Result<Json<Vec<FareOffer>>, AppError> {
    let fares = state
        .fares
        .fares_for_trip(id_viaje)
        .await
        .map_err(|e| AppError::unavailable("Error obteniendo tarifas", e))?;
    Ok(Json(fares))
}

#[derive(Debug, Serialize)]
struct TripDetailResponse {
    vuelo: TripInfo,
    tarifas: Vec<FareOffer>,
}

/// GET /vuelos/:idViaje
async fn trip_detail(
    State(state): State<AppState>,
    Path(id_viaje): Path<i64>,
) -> Result<Json<TripDetailResponse>, AppError> {
    let vuelo = state
        .flights
        .trip_detail(id_viaje)
        .await
        .map_err(|e| AppError::unavailable("Error al obtener detalles del vuelo", e))?
        .ok_or_else(|| AppError::not_found("Vuelo no encontrado"))?;

    let tarifas = state
        .fares
        .fares_for_trip(id_viaje)
        .await
        .map_err(|e| AppError::unavailable("Error al obtener detalles del vuelo", e))?;

    Ok(Json(TripDetailResponse { vuelo, tarifas }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_defaults_to_utc() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        assert_eq!(resolve_offset(None, date).unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn named_zone_resolves_to_its_offset_for_the_date() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        // Chile runs daylight time in November (UTC-3).
        let offset = resolve_offset(Some("America/Santiago"), date).unwrap();
        assert_eq!(offset.local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        assert!(resolve_offset(Some("America/Nowhere"), date).is_err());
    }
}
