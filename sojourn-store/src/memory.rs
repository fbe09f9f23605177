use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use sojourn_core::booking::Booking;
use sojourn_core::hotel::Hotel;
use sojourn_core::payment::{Payment, PaymentStatus};
use sojourn_core::repository::{BookingRepository, HotelRepository, PaymentRepository, StoreError};

/// A thread-safe in-memory store implementing all three repositories.
///
/// Uses `Arc<RwLock<HashMap>>` per entity for shared concurrent access.
/// Carries the same semantics as `PgStore`, including the one-payment-per-
/// booking uniqueness and the compare-and-swap status update. Used by the
/// integration tests and for local development without Postgres.
#[derive(Default, Clone)]
pub struct MemoryStore {
    hotels: Arc<RwLock<HashMap<Uuid, Hotel>>>,
    bookings: Arc<RwLock<HashMap<Uuid, Booking>>>,
    payments: Arc<RwLock<HashMap<Uuid, Payment>>>,
}

impl MemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HotelRepository for MemoryStore {
    async fn insert(&self, hotel: &Hotel) -> Result<(), StoreError> {
        let mut hotels = self.hotels.write().await;
        hotels.insert(hotel.id, hotel.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Hotel>, StoreError> {
        let hotels = self.hotels.read().await;
        Ok(hotels.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Hotel>, StoreError> {
        let hotels = self.hotels.read().await;
        let mut all: Vec<Hotel> = hotels.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        let mut bookings = self.bookings.write().await;
        bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let bookings = self.bookings.read().await;
        Ok(bookings.get(&id).cloned())
    }

    async fn get_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Booking>, StoreError> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .get(&id)
            .filter(|b| b.user_id == user_id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let bookings = self.bookings.read().await;
        let mut owned: Vec<Booking> = bookings
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn get_or_create(
        &self,
        booking_id: Uuid,
        amount: Decimal,
    ) -> Result<(Payment, bool), StoreError> {
        let mut payments = self.payments.write().await;
        if let Some(existing) = payments.values().find(|p| p.booking_id == booking_id) {
            return Ok((existing.clone(), false));
        }

        let payment = Payment::new(booking_id, amount);
        payments.insert(payment.id, payment.clone());
        Ok((payment, true))
    }

    async fn set_transaction_id(&self, payment_id: Uuid, tx_ref: &str) -> Result<(), StoreError> {
        let mut payments = self.payments.write().await;
        let payment = payments
            .get_mut(&payment_id)
            .ok_or_else(|| StoreError::NotFound(format!("Payment {}", payment_id)))?;

        payment.transaction_id = Some(tx_ref.to_string());
        payment.updated_at = Utc::now();
        Ok(())
    }

    async fn transition_status(
        &self,
        payment_id: Uuid,
        expected: PaymentStatus,
        next: PaymentStatus,
    ) -> Result<Payment, StoreError> {
        let mut payments = self.payments.write().await;
        let payment = payments
            .get_mut(&payment_id)
            .ok_or_else(|| StoreError::NotFound(format!("Payment {}", payment_id)))?;

        if payment.status != expected {
            return Err(StoreError::Conflict(format!(
                "Payment {} is {}, expected {}",
                payment_id, payment.status, expected
            )));
        }

        payment.status = next;
        payment.updated_at = Utc::now();
        Ok(payment.clone())
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Payment>, StoreError> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .find(|p| p.booking_id == booking_id)
            .cloned())
    }

    async fn find_by_transaction_id(&self, tx_ref: &str) -> Result<Option<Payment>, StoreError> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .find(|p| p.transaction_id.as_deref() == Some(tx_ref))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_get_or_create_reuses_the_single_payment_row() {
        let store = MemoryStore::new();
        let booking_id = Uuid::new_v4();

        let (first, created) = store.get_or_create(booking_id, dec!(300.00)).await.unwrap();
        assert!(created);
        assert_eq!(first.status, PaymentStatus::Pending);
        assert_eq!(first.amount, dec!(300.00));

        // Second call ignores the new amount and hands back the same row
        let (second, created) = store.get_or_create(booking_id, dec!(999.00)).await.unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.reference, first.reference);
        assert_eq!(second.amount, dec!(300.00));
    }

    #[tokio::test]
    async fn test_status_cas_rejects_stale_expectation() {
        let store = MemoryStore::new();
        let (payment, _) = store
            .get_or_create(Uuid::new_v4(), dec!(100.00))
            .await
            .unwrap();

        let updated = store
            .transition_status(payment.id, PaymentStatus::Pending, PaymentStatus::Completed)
            .await
            .unwrap();
        assert_eq!(updated.status, PaymentStatus::Completed);

        // A second settlement attempt expecting Pending loses
        let err = store
            .transition_status(payment.id, PaymentStatus::Pending, PaymentStatus::Failed)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let current = store.find_by_booking(payment.booking_id).await.unwrap().unwrap();
        assert_eq!(current.status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_transaction_id_overwrite_and_lookup() {
        let store = MemoryStore::new();
        let (payment, _) = store
            .get_or_create(Uuid::new_v4(), dec!(50.00))
            .await
            .unwrap();

        let tx_ref = payment.transaction_reference();
        store.set_transaction_id(payment.id, &tx_ref).await.unwrap();
        store.set_transaction_id(payment.id, &tx_ref).await.unwrap();

        let found = store.find_by_transaction_id(&tx_ref).await.unwrap().unwrap();
        assert_eq!(found.id, payment.id);

        assert!(store
            .find_by_transaction_id("booking-unknown")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_booking_lookup_hides_foreign_bookings() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let booking = Booking::new(
            owner,
            Uuid::new_v4(),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
            dec!(300.00),
        );
        BookingRepository::insert(&store, &booking).await.unwrap();

        assert!(store.get_for_user(booking.id, owner).await.unwrap().is_some());
        assert!(store.get_for_user(booking.id, stranger).await.unwrap().is_none());
    }
}
