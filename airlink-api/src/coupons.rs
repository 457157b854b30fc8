use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use airlink_core::coupon::{evaluate, CouponKind};
use airlink_core::repository::CouponRepository;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/cupones/validar", post(validate_coupon))
        .route("/api/cupones/activos", get(list_active_coupons))
}

#[derive(Debug, Deserialize)]
struct ValidateRequest {
    codigo: Option<String>,
    monto: Option<i64>,
}

#[derive(Debug, Serialize)]
struct ValidateResponse {
    #[serde(rename = "idCuponDescuento")]
    coupon_id: i64,
    codigo: String,
    descripcion: String,
    #[serde(rename = "tipoCupon")]
    kind: CouponKind,
    #[serde(rename = "valorDescuento")]
    value: i64,
    #[serde(rename = "descuentoCalculado")]
    discount: i64,
}

/// POST /api/cupones/validar
async fn validate_coupon(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, AppError> {
    let (Some(codigo), Some(monto)) = (req.codigo, req.monto) else {
        return Err(AppError::invalid(
            "Datos incompletos",
            "Código y monto son requeridos",
        ));
    };

    let coupon = state
        .coupons
        .by_code(&codigo.trim().to_uppercase())
        .await
        .map_err(|e| AppError::unavailable("Error al validar el cupón", e))?
        .ok_or_else(|| AppError::not_found("Cupón inválido o no existe"))?;

    let now = chrono::Utc::now().naive_utc();
    let quote = evaluate(&coupon, monto, now, state.booking.min_total_after_discount)
        .map_err(|e| AppError::invalid("Cupón no aplicable", e.to_string()))?;

    Ok(Json(ValidateResponse {
        coupon_id: coupon.id,
        codigo: coupon.code,
        descripcion: quote.description,
        kind: coupon.kind,
        value: coupon.value,
        discount: quote.discount,
    }))
}

/// GET /api/cupones/activos
async fn list_active_coupons(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let coupons = state
        .coupons
        .list_active()
        .await
        .map_err(|e| AppError::unavailable("Error al obtener cupones", e))?;

    let cupones: Vec<serde_json::Value> = coupons
        .into_iter()
        .map(|c| {
            json!({
                "idCuponDescuento": c.id,
                "codigo": c.code,
                "tipoCupon": c.kind,
                "valor": c.value,
                "uso_maximo": c.max_uses,
                "uso_actual": c.uses,
                "fecha_inicio": c.valid_from,
                "fecha_fin": c.valid_until,
            })
        })
        .collect();

    Ok(Json(json!({ "success": true, "cupones": cupones })))
}
