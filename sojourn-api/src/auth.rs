use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, middleware::auth::CustomerClaims, state::AppState};

#[derive(Debug, Deserialize)]
struct TokenRequest {
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/auth/token", post(issue_token))
}

/// Mints a CUSTOMER token. The payer identity carried in the claims is what
/// the payment initiation handler forwards to the gateway.
async fn issue_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::ValidationError("email is required".to_string()))?;

    let my_claims = CustomerClaims {
        sub: Uuid::new_v4().to_string(),
        email,
        first_name: req.first_name,
        last_name: req.last_name,
        role: "CUSTOMER".to_owned(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &my_claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::ConfigurationError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse { token }))
}
