use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use airlink_core::booking::{
    breakdown_balances, checkin_window, parse_checkin_code, AppliedCoupon, BreakdownLine,
    CheckinEligibility, ReservationRecord, SeatCharge,
};
use airlink_core::repository::ReservationRepository;

use crate::error::AppError;
use crate::middleware::auth::{require_user, CurrentUser};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let owner_scoped = Router::new()
        .route("/api/reservas/mias", get(my_reservations))
        .route("/api/reservas/{id_reserva}", get(reservation_detail))
        .route_layer(axum::middleware::from_fn_with_state(state, require_user));

    Router::new()
        .route("/api/reservas/buscar-checkin", post(find_for_checkin))
        .merge(owner_scoped)
}

fn iso(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn hhmm(dt: Option<NaiveDateTime>) -> String {
    dt.map(|d| d.format("%H:%M").to_string()).unwrap_or_default()
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| "N/A".to_string())
}

// ============================================================================
// GET /api/reservas/mias
// ============================================================================

#[derive(Debug, Serialize)]
struct ReservationSummaryResponse {
    id: i64,
    codigo: String,
    pasajero: String,
    vuelo: String,
    origen: String,
    destino: String,
    #[serde(rename = "salidaIso")]
    salida_iso: String,
    #[serde(rename = "hSalida")]
    h_salida: String,
    #[serde(rename = "hLlegada")]
    h_llegada: String,
    #[serde(rename = "permiteCheckin")]
    permite_checkin: bool,
    equipaje: Option<String>,
    tarifa: Option<String>,
    #[serde(rename = "paseUrl")]
    pase_url: Option<String>,
    estado: String,
    #[serde(rename = "montoTotal")]
    monto_total: i64,
}

fn summary_response(record: ReservationRecord, now: NaiveDateTime) -> ReservationSummaryResponse {
    let permite_checkin =
        record.status == "confirmada" && record.departure.is_some_and(|dep| dep > now);
    ReservationSummaryResponse {
        id: record.id,
        codigo: record.code.clone(),
        pasajero: record.passenger_name(),
        vuelo: record.flight_label(),
        origen: or_na(record.origin_code),
        destino: or_na(record.dest_code),
        salida_iso: record.departure.map(iso).unwrap_or_default(),
        h_salida: hhmm(record.departure),
        h_llegada: hhmm(record.arrival),
        permite_checkin,
        equipaje: None,
        tarifa: None,
        pase_url: None,
        estado: record.status,
        monto_total: record.total_amount,
    }
}

async fn my_reservations(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<Vec<ReservationSummaryResponse>>, AppError> {
    let records = state
        .reservations
        .for_user(user_id)
        .await
        .map_err(|e| AppError::unavailable("Error al obtener reservas", e))?;

    let now = chrono::Utc::now().naive_utc();
    Ok(Json(records.into_iter().map(|r| summary_response(r, now)).collect()))
}

// ============================================================================
// GET /api/reservas/:idReserva
// ============================================================================

#[derive(Debug, Serialize)]
struct ReservationDetailResponse {
    id: i64,
    codigo: String,
    estado: String,
    #[serde(rename = "montoTotal")]
    monto_total: i64,
    vuelo: String,
    origen: String,
    destino: String,
    #[serde(rename = "origenNombre")]
    origen_nombre: String,
    #[serde(rename = "destinoNombre")]
    destino_nombre: String,
    empresa: String,
    #[serde(rename = "salidaIso")]
    salida_iso: String,
    #[serde(rename = "llegadaIso")]
    llegada_iso: String,
    #[serde(rename = "hSalida")]
    h_salida: String,
    #[serde(rename = "hLlegada")]
    h_llegada: String,
    pasajero: String,
    documento: Option<String>,
    desglose: Vec<BreakdownLine>,
    asientos: Vec<SeatCharge>,
    cupon: Option<AppliedCoupon>,
}

async fn reservation_detail(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id_reserva): Path<i64>,
) -> Result<Json<ReservationDetailResponse>, AppError> {
    let detail = state
        .reservations
        .detail(id_reserva)
        .await
        .map_err(|e| AppError::unavailable("Error al obtener detalle de reserva", e))?
        .ok_or_else(|| AppError::not_found("Reserva no encontrada"))?;

    // Non-owners get the same 404 as a missing reservation.
    if detail.record.owner_id != user_id {
        return Err(AppError::not_found("Reserva no encontrada"));
    }

    if !detail.lines.is_empty() && !breakdown_balances(&detail.lines, detail.record.total_amount) {
        tracing::warn!(
            reservation_id = detail.record.id,
            total = detail.record.total_amount,
            "breakdown lines do not sum to the stored total"
        );
    }

    let record = detail.record;
    let pasajero = record.passenger_name();
    Ok(Json(ReservationDetailResponse {
        id: record.id,
        codigo: record.code.clone(),
        estado: record.status.clone(),
        monto_total: record.total_amount,
        vuelo: record.flight_label(),
        origen: or_na(record.origin_code),
        destino: or_na(record.dest_code),
        origen_nombre: or_na(record.origin_name),
        destino_nombre: or_na(record.dest_name),
        empresa: record.operator.unwrap_or_else(|| "AirLink".to_string()),
        salida_iso: record.departure.map(iso).unwrap_or_default(),
        llegada_iso: record.arrival.map(iso).unwrap_or_default(),
        h_salida: hhmm(record.departure),
        h_llegada: hhmm(record.arrival),
        pasajero,
        documento: record.document,
        desglose: detail.lines,
        asientos: detail.seats,
        cupon: detail.coupon,
    }))
}

// ============================================================================
// POST /api/reservas/buscar-checkin
// ============================================================================

#[derive(Debug, Deserialize)]
struct CheckinRequest {
    codigo: Option<String>,
    apellido: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckinPassengerResponse {
    id: Option<i64>,
    nombre: String,
    apellido: String,
    #[serde(rename = "nombreCompleto")]
    nombre_completo: String,
    documento: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckinResponse {
    id: i64,
    codigo: String,
    estado: String,
    vuelo: String,
    origen: String,
    destino: String,
    #[serde(rename = "origenNombre")]
    origen_nombre: String,
    #[serde(rename = "destinoNombre")]
    destino_nombre: String,
    empresa: String,
    #[serde(rename = "salidaIso")]
    salida_iso: String,
    #[serde(rename = "hSalida")]
    h_salida: String,
    #[serde(rename = "hLlegada")]
    h_llegada: String,
    #[serde(rename = "fechaSalida")]
    fecha_salida: String,
    pasajero: CheckinPassengerResponse,
    asientos: Vec<SeatCharge>,
    #[serde(rename = "puedeHacerCheckin")]
    puede_hacer_checkin: bool,
    #[serde(rename = "horasRestantes")]
    horas_restantes: i64,
}

async fn find_for_checkin(
    State(state): State<AppState>,
    Json(req): Json<CheckinRequest>,
) -> Result<Json<CheckinResponse>, AppError> {
    let (Some(codigo), Some(apellido)) = (req.codigo, req.apellido) else {
        return Err(AppError::invalid(
            "Datos incompletos",
            "El código de reserva y el apellido son requeridos",
        ));
    };

    let code = parse_checkin_code(&codigo);
    let (record, seats) = state
        .reservations
        .find_for_checkin(&code, &apellido)
        .await
        .map_err(|e| AppError::unavailable("Error al buscar reserva", e))?
        .ok_or_else(|| {
            AppError::invalid(
                "Reserva no encontrada",
                "No encontramos una reserva con ese código y apellido",
            )
        })?;

    let departure = record
        .departure
        .ok_or_else(|| AppError::not_found("Reserva no encontrada"))?;

    let now = chrono::Utc::now().naive_utc();
    let hours_left = match checkin_window(departure, now) {
        CheckinEligibility::Departed => {
            return Err(AppError::invalid(
                "Check-in no disponible",
                "Este vuelo ya ha partido",
            ));
        }
        CheckinEligibility::NotYetOpen { .. } => {
            return Err(AppError::invalid(
                "Check-in no disponible",
                "El check-in estará disponible 24 horas antes del vuelo",
            ));
        }
        CheckinEligibility::Open { hours_left } => hours_left,
    };

    let nombre = record.passenger_first.clone().unwrap_or_default();
    let apellido_out = record.passenger_last.clone().unwrap_or_default();
    Ok(Json(CheckinResponse {
        id: record.id,
        codigo: record.code.clone(),
        estado: record.status.clone(),
        vuelo: record.flight_label(),
        origen: or_na(record.origin_code),
        destino: or_na(record.dest_code),
        origen_nombre: or_na(record.origin_name),
        destino_nombre: or_na(record.dest_name),
        empresa: record.operator.unwrap_or_else(|| "AirLink".to_string()),
        salida_iso: iso(departure),
        h_salida: hhmm(Some(departure)),
        h_llegada: hhmm(record.arrival),
        fecha_salida: departure.format("%d-%m-%Y").to_string(),
        pasajero: CheckinPassengerResponse {
            id: record.passenger_id,
            nombre_completo: format!("{nombre} {apellido_out}").trim().to_string(),
            nombre,
            apellido: apellido_out,
            documento: record.document,
        },
        asientos: seats,
        puede_hacer_checkin: record.status == "confirmada",
        horas_restantes: hours_left,
    }))
}
