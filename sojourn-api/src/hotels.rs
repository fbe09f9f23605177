use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use sojourn_core::hotel::Hotel;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateHotelRequest {
    pub name: String,
    pub location: String,
    pub description: String,
    pub price_per_night: Decimal,
    pub image_url: String,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/hotels", get(list_hotels))
        .route("/v1/hotels/{id}", get(get_hotel))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/v1/admin/hotels", post(create_hotel))
}

/// GET /v1/hotels
async fn list_hotels(State(state): State<AppState>) -> Result<Json<Vec<Hotel>>, AppError> {
    let hotels = state.hotel_repo.list().await?;
    Ok(Json(hotels))
}

/// GET /v1/hotels/{id}
async fn get_hotel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Hotel>, AppError> {
    let hotel = state
        .hotel_repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Hotel not found".to_string()))?;
    Ok(Json(hotel))
}

/// POST /v1/admin/hotels
/// Catalog entry creation, outside the booking workflow.
async fn create_hotel(
    State(state): State<AppState>,
    Json(req): Json<CreateHotelRequest>,
) -> Result<(StatusCode, Json<Hotel>), AppError> {
    if req.price_per_night.is_sign_negative() {
        return Err(AppError::ValidationError(
            "price_per_night must not be negative".to_string(),
        ));
    }

    let hotel = Hotel::new(
        req.name,
        req.location,
        req.description,
        req.price_per_night,
        req.image_url,
    );
    state.hotel_repo.insert(&hotel).await?;

    info!("Hotel {} created: {}", hotel.id, hotel.name);
    Ok((StatusCode::CREATED, Json(hotel)))
}
