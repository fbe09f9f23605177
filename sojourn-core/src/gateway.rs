use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Everything the gateway needs to open a hosted checkout for one payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeRequest {
    pub amount: Decimal,
    pub currency: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub tx_ref: String,
    pub callback_url: String,
    pub return_url: String,
    pub title: String,
    pub description: String,
}

/// Gateway verdict on an initialize call. A Declined is the gateway
/// answering with a non-success envelope; transport problems are
/// `GatewayError` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitializeOutcome {
    Accepted { checkout_url: String },
    Declined { detail: String },
}

/// Gateway verdict on a verify call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Confirmed,
    Declined { detail: String },
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Gateway unreachable: {0}")]
    Transport(String),

    #[error("Malformed gateway response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a transaction with the provider and obtain the checkout URL.
    async fn initialize(
        &self,
        request: &InitializeRequest,
    ) -> Result<InitializeOutcome, GatewayError>;

    /// Ask the provider for the final status of a transaction reference.
    async fn verify(&self, tx_ref: &str) -> Result<VerifyOutcome, GatewayError>;
}
