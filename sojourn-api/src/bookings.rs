use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use sojourn_core::booking::Booking;
use sojourn_core::pricing;

use crate::error::AppError;
use crate::middleware::auth::CustomerClaims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    hotel_id: Option<String>,
    check_in_date: Option<String>,
    check_out_date: Option<String>,
}

#[derive(Debug, Serialize)]
struct BookingCreatedResponse {
    booking_id: Uuid,
    message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/bookings", post(create_booking).get(list_bookings))
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::ValidationError(format!("{} is required", field)))
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::ValidationError(format!("{} must be a YYYY-MM-DD date", field)))
}

/// POST /v1/bookings
async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingCreatedResponse>), AppError> {
    let user_id = claims.user_id()?;

    let hotel_id = required(&req.hotel_id, "hotel_id")?;
    let hotel_id = Uuid::parse_str(hotel_id)
        .map_err(|_| AppError::ValidationError("hotel_id must be a UUID".to_string()))?;
    let check_in = parse_date(required(&req.check_in_date, "check_in_date")?, "check_in_date")?;
    let check_out = parse_date(
        required(&req.check_out_date, "check_out_date")?,
        "check_out_date",
    )?;

    // A zero or negative night count would price the stay at <= 0.
    if check_out <= check_in {
        return Err(AppError::ValidationError(
            "check_out_date must be after check_in_date".to_string(),
        ));
    }

    let hotel = state
        .hotel_repo
        .get(hotel_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Hotel not found".to_string()))?;

    let total_price = pricing::stay_total(hotel.price_per_night, check_in, check_out);
    let booking = Booking::new(user_id, hotel.id, check_in, check_out, total_price);
    state.booking_repo.insert(&booking).await?;

    info!("Booking {} created for hotel {}", booking.id, hotel.id);

    Ok((
        StatusCode::CREATED,
        Json(BookingCreatedResponse {
            booking_id: booking.id,
            message: "Booking created successfully. Please proceed to payment.".to_string(),
        }),
    ))
}

/// GET /v1/bookings
async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let user_id = claims.user_id()?;
    let bookings = state.booking_repo.list_for_user(user_id).await?;
    Ok(Json(bookings))
}
