use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use sojourn_core::booking::Booking;
use sojourn_core::hotel::Hotel;
use sojourn_core::payment::{Payment, PaymentStatus};
use sojourn_core::repository::{BookingRepository, HotelRepository, PaymentRepository, StoreError};

/// Postgres-backed implementation of the three repositories, sharing one
/// connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct HotelRow {
    id: Uuid,
    name: String,
    location: String,
    description: String,
    price_per_night: Decimal,
    image_url: String,
}

impl From<HotelRow> for Hotel {
    fn from(row: HotelRow) -> Self {
        Hotel {
            id: row.id,
            name: row.name,
            location: row.location,
            description: row.description,
            price_per_night: row.price_per_night,
            image_url: row.image_url,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    hotel_id: Uuid,
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    total_price: Decimal,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            user_id: row.user_id,
            hotel_id: row.hotel_id,
            check_in_date: row.check_in_date,
            check_out_date: row.check_out_date,
            total_price: row.total_price,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    booking_id: Uuid,
    reference: Uuid,
    status: String,
    amount: Decimal,
    transaction_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PaymentRow {
    fn into_payment(self) -> Result<Payment, StoreError> {
        let status =
            PaymentStatus::parse(&self.status).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Payment {
            id: self.id,
            booking_id: self.booking_id,
            reference: self.reference,
            status,
            amount: self.amount,
            transaction_id: self.transaction_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const PAYMENT_COLUMNS: &str =
    "id, booking_id, reference, status, amount, transaction_id, created_at, updated_at";

#[async_trait]
impl HotelRepository for PgStore {
    async fn insert(&self, hotel: &Hotel) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO hotels (id, name, location, description, price_per_night, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(hotel.id)
        .bind(&hotel.name)
        .bind(&hotel.location)
        .bind(&hotel.description)
        .bind(hotel.price_per_night)
        .bind(&hotel.image_url)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Hotel>, StoreError> {
        let row = sqlx::query_as::<_, HotelRow>(
            "SELECT id, name, location, description, price_per_night, image_url FROM hotels WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(Hotel::from))
    }

    async fn list(&self) -> Result<Vec<Hotel>, StoreError> {
        let rows = sqlx::query_as::<_, HotelRow>(
            "SELECT id, name, location, description, price_per_night, image_url FROM hotels ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Hotel::from).collect())
    }
}

#[async_trait]
impl BookingRepository for PgStore {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, hotel_id, check_in_date, check_out_date, total_price, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.hotel_id)
        .bind(booking.check_in_date)
        .bind(booking.check_out_date)
        .bind(booking.total_price)
        .bind(booking.created_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(
            "SELECT id, user_id, hotel_id, check_in_date, check_out_date, total_price, created_at FROM bookings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(Booking::from))
    }

    async fn get_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Booking>, StoreError> {
        // One combined filter: a foreign booking looks exactly like a
        // missing one.
        let row = sqlx::query_as::<_, BookingRow>(
            "SELECT id, user_id, hotel_id, check_in_date, check_out_date, total_price, created_at FROM bookings WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(Booking::from))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT id, user_id, hotel_id, check_in_date, check_out_date, total_price, created_at FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }
}

#[async_trait]
impl PaymentRepository for PgStore {
    async fn get_or_create(
        &self,
        booking_id: Uuid,
        amount: Decimal,
    ) -> Result<(Payment, bool), StoreError> {
        if let Some(existing) = self.find_by_booking(booking_id).await? {
            return Ok((existing, false));
        }

        let payment = Payment::new(booking_id, amount);
        let result = sqlx::query(
            r#"
            INSERT INTO payments (id, booking_id, reference, status, amount, transaction_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(payment.id)
        .bind(payment.booking_id)
        .bind(payment.reference)
        .bind(payment.status.as_str())
        .bind(payment.amount)
        .bind(&payment.transaction_id)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok((payment, true)),
            // Lost a create race on the booking_id uniqueness constraint;
            // the winner's row is authoritative.
            Err(e) if is_unique_violation(&e) => {
                let existing = self.find_by_booking(booking_id).await?.ok_or_else(|| {
                    StoreError::Conflict(format!(
                        "Payment for booking {} vanished after unique violation",
                        booking_id
                    ))
                })?;
                Ok((existing, false))
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn set_transaction_id(&self, payment_id: Uuid, tx_ref: &str) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE payments SET transaction_id = $1, updated_at = NOW() WHERE id = $2")
                .bind(tx_ref)
                .bind(payment_id)
                .execute(&self.pool)
                .await
                .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Payment {}", payment_id)));
        }
        Ok(())
    }

    async fn transition_status(
        &self,
        payment_id: Uuid,
        expected: PaymentStatus,
        next: PaymentStatus,
    ) -> Result<Payment, StoreError> {
        // Compare-and-swap: the status guard in the WHERE clause makes
        // concurrent settlement attempts lose cleanly instead of clobbering.
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "UPDATE payments SET status = $1, updated_at = NOW() WHERE id = $2 AND status = $3 RETURNING {}",
            PAYMENT_COLUMNS
        ))
        .bind(next.as_str())
        .bind(payment_id)
        .bind(expected.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(row) => row.into_payment(),
            None => {
                let current = sqlx::query_as::<_, PaymentRow>(&format!(
                    "SELECT {} FROM payments WHERE id = $1",
                    PAYMENT_COLUMNS
                ))
                .bind(payment_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;

                match current {
                    Some(row) => Err(StoreError::Conflict(format!(
                        "Payment {} is {}, expected {}",
                        payment_id, row.status, expected
                    ))),
                    None => Err(StoreError::NotFound(format!("Payment {}", payment_id))),
                }
            }
        }
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Payment>, StoreError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE booking_id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(PaymentRow::into_payment).transpose()
    }

    async fn find_by_transaction_id(&self, tx_ref: &str) -> Result<Option<Payment>, StoreError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE transaction_id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(tx_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(PaymentRow::into_payment).transpose()
    }
}
