use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use airlink_core::repository::SeatRepository;
use airlink_core::seat::{decorate, SeatMapEntry, SeatPick, MOCK_TRIP_PREFIX};
use airlink_core::seatmap::{mock_seat_map, SeatPlanner};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/asientos/reservar", post(reserve_seats))
        .route("/api/asientos/{id_viaje}", get(seat_map))
}

#[derive(Debug, Serialize)]
struct SeatMapResponse {
    success: bool,
    asientos: Vec<SeatMapEntry>,
}

/// GET /api/asientos/:idViaje
///
/// `mock-` identifiers short-circuit to a generated map before any
/// storage access. Real trips with no seat rows get a layout generated
/// and persisted first, so a second call reads the same inventory.
async fn seat_map(
    State(state): State<AppState>,
    Path(id_viaje): Path<String>,
) -> Result<Json<SeatMapResponse>, AppError> {
    if id_viaje.starts_with(MOCK_TRIP_PREFIX) {
        return Ok(Json(SeatMapResponse {
            success: true,
            asientos: mock_seat_map(),
        }));
    }

    let trip_id: i64 = id_viaje
        .parse()
        .map_err(|_| AppError::bad_param("Identificador de viaje inválido"))?;

    let mut records = state
        .seats
        .seats_for_trip(trip_id)
        .await
        .map_err(|e| AppError::seats("Error al obtener asientos", e))?;

    if records.is_empty() {
        let capacity = state
            .seats
            .trip_capacity(trip_id)
            .await
            .map_err(|e| AppError::seats("Error al obtener asientos", e))?
            .ok_or_else(|| AppError::not_found("Vuelo no encontrado"))?;

        let plan = state.planner.plan(u32::try_from(capacity).ok());
        state
            .seats
            .insert_layout(trip_id, &plan)
            .await
            .map_err(|e| AppError::seats("Error al obtener asientos", e))?;

        records = state
            .seats
            .seats_for_trip(trip_id)
            .await
            .map_err(|e| AppError::seats("Error al obtener asientos", e))?;
    }

    Ok(Json(SeatMapResponse {
        success: true,
        asientos: decorate(records),
    }))
}

#[derive(Debug, Deserialize)]
struct ReserveRequest {
    #[serde(rename = "idPasajero")]
    passenger_id: i64,
    asientos: Vec<SeatChoice>,
}

#[derive(Debug, Deserialize)]
struct SeatChoice {
    #[serde(rename = "idAsiento")]
    seat_id: i64,
    /// Extra charge for the seat; absent means no surcharge.
    precio: Option<i64>,
}

#[derive(Debug, Serialize)]
struct ReserveResponse {
    success: bool,
    mensaje: String,
}

/// POST /api/asientos/reservar
async fn reserve_seats(
    State(state): State<AppState>,
    Json(req): Json<ReserveRequest>,
) -> Result<Json<ReserveResponse>, AppError> {
    if req.asientos.is_empty() {
        return Err(AppError::invalid(
            "Datos incompletos",
            "Se requiere al menos un asiento",
        ));
    }

    let picks: Vec<SeatPick> = req
        .asientos
        .iter()
        .map(|choice| SeatPick {
            seat_id: choice.seat_id,
            extra_charge: choice.precio.unwrap_or(0),
        })
        .collect();

    state
        .seats
        .reserve(req.passenger_id, &picks)
        .await
        .map_err(|e| AppError::seats("Error al reservar asientos", e))?;

    Ok(Json(ReserveResponse {
        success: true,
        mensaje: "Asientos reservados correctamente".to_string(),
    }))
}
