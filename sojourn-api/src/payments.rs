use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use sojourn_core::gateway::{
    InitializeOutcome, InitializeRequest, PaymentGateway, VerifyOutcome,
};
use sojourn_core::payment::PaymentStatus;
use sojourn_core::repository::StoreError;

use crate::error::AppError;
use crate::middleware::auth::CustomerClaims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InitiatePaymentRequest {
    booking_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckoutResponse {
    checkout_url: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    tx_ref: Option<String>,
}

#[derive(Debug, Serialize)]
struct VerifyResponse {
    status: String,
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/v1/payments/initiate", post(initiate_payment))
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/v1/payments/verify", get(verify_payment))
}

fn gateway_handle(state: &AppState) -> Result<Arc<dyn PaymentGateway>, AppError> {
    state.gateway.clone().ok_or_else(|| {
        AppError::ConfigurationError("Payment gateway secret key is not configured".to_string())
    })
}

/// Settle a Pending payment as Failed. A CAS conflict means a concurrent
/// call already settled it; the terminal state on record wins.
async fn mark_failed(state: &AppState, payment_id: Uuid) {
    match state
        .payment_repo
        .transition_status(payment_id, PaymentStatus::Pending, PaymentStatus::Failed)
        .await
    {
        Ok(_) => {}
        Err(StoreError::Conflict(msg)) => {
            warn!("Payment {} already settled: {}", payment_id, msg);
        }
        Err(e) => {
            tracing::error!("Could not mark payment {} Failed: {}", payment_id, e);
        }
    }
}

/// POST /v1/payments/initiate
///
/// Gets or creates the booking's payment, stamps the transaction reference,
/// and opens a hosted checkout with the gateway. The payment stays Pending
/// until the gateway's callback hits the verify endpoint.
async fn initiate_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Json(req): Json<InitiatePaymentRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let user_id = claims.user_id()?;

    let booking_id = req
        .booking_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::ValidationError("booking_id is required".to_string()))?;
    let booking_id = Uuid::parse_str(booking_id)
        .map_err(|_| AppError::ValidationError("booking_id must be a UUID".to_string()))?;

    // Id and owner in one filter: someone else's booking 404s like a
    // nonexistent one.
    let booking = state
        .booking_repo
        .get_for_user(booking_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    let (payment, created) = state
        .payment_repo
        .get_or_create(booking.id, booking.total_price)
        .await?;
    if created {
        info!("Payment {} created for booking {}", payment.id, booking.id);
    }

    let gateway = gateway_handle(&state)?;

    let hotel = state
        .hotel_repo
        .get(booking.hotel_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Hotel not found".to_string()))?;

    // Deterministic: re-initiation rewrites the same reference string.
    let tx_ref = payment.transaction_reference();
    state
        .payment_repo
        .set_transaction_id(payment.id, &tx_ref)
        .await?;

    let request = InitializeRequest {
        amount: payment.amount,
        currency: state.checkout.currency.clone(),
        email: claims.email.clone(),
        first_name: claims.first_name.clone().unwrap_or_else(|| "User".to_string()),
        last_name: claims.last_name.clone().unwrap_or_else(|| "Name".to_string()),
        tx_ref: tx_ref.clone(),
        callback_url: state.checkout.callback_url.clone(),
        return_url: state.checkout.return_url.clone(),
        title: "Payment for Hotel Booking".to_string(),
        description: format!("Booking for {}", hotel.name),
    };

    match gateway.initialize(&request).await {
        Ok(InitializeOutcome::Accepted { checkout_url }) => {
            info!("Checkout opened for payment {} ({})", payment.id, tx_ref);
            Ok(Json(CheckoutResponse { checkout_url }))
        }
        Ok(InitializeOutcome::Declined { detail }) => {
            mark_failed(&state, payment.id).await;
            Err(AppError::GatewayDeclinedError(detail))
        }
        Err(e) => {
            mark_failed(&state, payment.id).await;
            Err(AppError::UpstreamError(e.to_string()))
        }
    }
}

/// GET /v1/payments/verify?tx_ref=...
///
/// Unauthenticated: the gateway itself redirects or calls here, so no
/// ownership check ties the caller to the booking.
async fn verify_payment(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<VerifyResponse>, AppError> {
    let tx_ref = query
        .tx_ref
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::ValidationError("Transaction reference is required".to_string()))?;

    let payment = state
        .payment_repo
        .find_by_transaction_id(&tx_ref)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Payment record not found".to_string()))?;

    let gateway = gateway_handle(&state)?;

    match gateway.verify(&tx_ref).await {
        Ok(VerifyOutcome::Confirmed) => match payment.status {
            // Gateway redelivery of a settled outcome is harmless.
            PaymentStatus::Completed => Ok(Json(VerifyResponse {
                status: "Payment successful and verified.".to_string(),
            })),
            PaymentStatus::Failed => Err(AppError::ConflictError(
                "Payment already failed; cannot complete".to_string(),
            )),
            PaymentStatus::Pending => {
                state
                    .payment_repo
                    .transition_status(payment.id, PaymentStatus::Pending, PaymentStatus::Completed)
                    .await
                    .map_err(|e| match e {
                        StoreError::Conflict(msg) => AppError::ConflictError(msg),
                        other => AppError::from(other),
                    })?;
                info!("Payment {} completed ({})", payment.id, tx_ref);
                Ok(Json(VerifyResponse {
                    status: "Payment successful and verified.".to_string(),
                }))
            }
        },
        Ok(VerifyOutcome::Declined { detail }) => match payment.status {
            PaymentStatus::Failed => Err(AppError::GatewayDeclinedError(detail)),
            PaymentStatus::Completed => Err(AppError::ConflictError(
                "Payment already completed; cannot fail".to_string(),
            )),
            PaymentStatus::Pending => {
                state
                    .payment_repo
                    .transition_status(payment.id, PaymentStatus::Pending, PaymentStatus::Failed)
                    .await
                    .map_err(|e| match e {
                        StoreError::Conflict(msg) => AppError::ConflictError(msg),
                        other => AppError::from(other),
                    })?;
                info!("Payment {} failed verification ({})", payment.id, tx_ref);
                Err(AppError::GatewayDeclinedError(detail))
            }
        },
        // Transport trouble leaves the status untouched; the gateway can
        // redeliver.
        Err(e) => Err(AppError::UpstreamError(e.to_string())),
    }
}
