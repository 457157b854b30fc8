use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Route-level error taxonomy. Every handler returns `Result<_, AppError>`
/// so no failure crosses the HTTP boundary unformatted.
#[derive(Debug)]
pub enum AppError {
    InvalidRequest { error: String, message: Option<String> },
    NotFound { error: String },
    Unauthorized { message: String },
    Unavailable { error: String, message: String },
    /// Seat-flow failures use the `{success:false, mensaje, error}` body
    /// the seat-selection client expects.
    Seats { mensaje: String, error: String },
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn invalid(error: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::InvalidRequest {
            error: error.into(),
            message: Some(message.into()),
        }
    }

    pub fn bad_param(error: impl Into<String>) -> Self {
        AppError::InvalidRequest {
            error: error.into(),
            message: None,
        }
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        AppError::NotFound { error: error.into() }
    }

    pub fn unavailable(error: impl Into<String>, source: impl ToString) -> Self {
        AppError::Unavailable {
            error: error.into(),
            message: source.to_string(),
        }
    }

    pub fn seats(mensaje: impl Into<String>, source: impl ToString) -> Self {
        AppError::Seats {
            mensaje: mensaje.into(),
            error: source.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InvalidRequest { error, message } => {
                let body = match message {
                    Some(message) => json!({ "error": error, "message": message }),
                    None => json!({ "error": error }),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            AppError::NotFound { error } => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": error }))).into_response()
            }
            AppError::Unauthorized { message } => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
            }
            AppError::Unavailable { error, message } => {
                tracing::error!("{}: {}", error, message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": error, "message": message })),
                )
                    .into_response()
            }
            AppError::Seats { mensaje, error } => {
                tracing::error!("{}: {}", mensaje, error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "success": false, "mensaje": mensaje, "error": error })),
                )
                    .into_response()
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Error interno del servidor" })),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
