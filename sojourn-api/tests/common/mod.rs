#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use sojourn_api::middleware::auth::{AdminClaims, CustomerClaims};
use sojourn_api::state::{AppState, AuthConfig, CheckoutConfig};
use sojourn_core::gateway::PaymentGateway;
use sojourn_core::hotel::Hotel;
use sojourn_core::repository::HotelRepository;
use sojourn_store::MemoryStore;

pub const TEST_SECRET: &str = "test-secret";

pub fn test_state(store: MemoryStore, gateway: Option<Arc<dyn PaymentGateway>>) -> AppState {
    let store = Arc::new(store);
    AppState {
        hotel_repo: store.clone(),
        booking_repo: store.clone(),
        payment_repo: store,
        gateway,
        auth: AuthConfig {
            secret: TEST_SECRET.to_string(),
            expiration: 3600,
        },
        checkout: CheckoutConfig {
            currency: "ETB".to_string(),
            callback_url: "http://localhost:8080/v1/payments/verify".to_string(),
            return_url: "http://localhost:8080/payment-success".to_string(),
        },
    }
}

pub fn customer_token(user_id: Uuid, email: &str) -> String {
    let claims = CustomerClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        first_name: Some("Asha".to_string()),
        last_name: Some("Bekele".to_string()),
        role: "CUSTOMER".to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn admin_token() -> String {
    let claims = AdminClaims {
        sub: Uuid::new_v4().to_string(),
        email: "ops@example.com".to_string(),
        role: "ADMIN".to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

pub async fn seed_hotel(store: &MemoryStore, price_per_night: Decimal) -> Hotel {
    let hotel = Hotel::new(
        "Sunrise Lodge".to_string(),
        "Addis Ababa".to_string(),
        "Lakeside rooms with a view".to_string(),
        price_per_night,
        "https://img.example.com/sunrise.png".to_string(),
    );
    HotelRepository::insert(store, &hotel).await.unwrap();
    hotel
}

/// Drives one request through the router and returns status plus parsed
/// JSON body (Null when the body is empty or not JSON).
pub async fn request(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
