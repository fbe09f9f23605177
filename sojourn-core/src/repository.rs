use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::booking::Booking;
use crate::hotel::Hotel;
use crate::payment::{Payment, PaymentStatus};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Uniqueness violation, or a compare-and-swap whose expectation no
    /// longer holds.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Repository trait for hotel catalog access
#[async_trait]
pub trait HotelRepository: Send + Sync {
    async fn insert(&self, hotel: &Hotel) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Hotel>, StoreError>;

    async fn list(&self) -> Result<Vec<Hotel>, StoreError>;
}

/// Repository trait for booking access
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    /// Lookup by id AND owner in one filter, so a foreign booking is
    /// indistinguishable from a missing one.
    async fn get_for_user(&self, id: Uuid, user_id: Uuid)
        -> Result<Option<Booking>, StoreError>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError>;
}

/// Repository trait for payment access
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Fetch the booking's payment, creating a Pending one with the given
    /// amount if none exists. The bool reports whether a row was created.
    async fn get_or_create(
        &self,
        booking_id: Uuid,
        amount: Decimal,
    ) -> Result<(Payment, bool), StoreError>;

    /// Overwrite the gateway transaction reference. Every initiation call
    /// rewrites it, even if one was already set.
    async fn set_transaction_id(&self, payment_id: Uuid, tx_ref: &str)
        -> Result<(), StoreError>;

    /// Compare-and-swap status update: applies `next` only while the stored
    /// status is still `expected`, otherwise `StoreError::Conflict`.
    async fn transition_status(
        &self,
        payment_id: Uuid,
        expected: PaymentStatus,
        next: PaymentStatus,
    ) -> Result<Payment, StoreError>;

    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Payment>, StoreError>;

    async fn find_by_transaction_id(&self, tx_ref: &str) -> Result<Option<Payment>, StoreError>;
}
