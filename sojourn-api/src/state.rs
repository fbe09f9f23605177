use std::sync::Arc;

use sojourn_core::gateway::PaymentGateway;
use sojourn_core::repository::{BookingRepository, HotelRepository, PaymentRepository};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

/// Static fields of the gateway checkout payload: currency and the URLs the
/// gateway sends the payer back to.
#[derive(Clone)]
pub struct CheckoutConfig {
    pub currency: String,
    pub callback_url: String,
    pub return_url: String,
}

#[derive(Clone)]
pub struct AppState {
    pub hotel_repo: Arc<dyn HotelRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    /// None when no gateway secret key is configured; the payment handlers
    /// then answer with a configuration error instead of calling out.
    pub gateway: Option<Arc<dyn PaymentGateway>>,
    pub auth: AuthConfig,
    pub checkout: CheckoutConfig,
}
