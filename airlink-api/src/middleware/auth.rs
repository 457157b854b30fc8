use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

/// Token payload issued by the account service. Only the numeric user
/// id is consumed here.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    #[serde(rename = "idUsuario")]
    pub user_id: i64,
    pub exp: usize,
}

/// Authenticated user id, injected into request extensions for
/// downstream handlers.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i64);

pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Extract the bearer token
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    let token = auth_header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized {
        message: "No autorizado".to_string(),
    })?;

    // 2. Verify against the shared secret
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized {
        message: "Token inválido o expirado".to_string(),
    })?;

    // 3. Expose the user id to the handler
    req.extensions_mut().insert(CurrentUser(token_data.claims.user_id));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[test]
    fn claims_round_trip_through_a_signed_token() {
        let secret = "dev_only_change_me";
        let claims = Claims { user_id: 42, exp: usize::MAX };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.user_id, 42);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = Claims { user_id: 1, exp: usize::MAX };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret-a"),
        )
        .unwrap();

        assert!(decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret-b"),
            &Validation::default(),
        )
        .is_err());
    }
}
