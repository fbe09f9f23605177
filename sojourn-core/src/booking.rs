use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stay reserved by one user at one hotel. Overlapping date ranges for the
/// same user/hotel are allowed; nothing in the model prevents them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hotel_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        user_id: Uuid,
        hotel_id: Uuid,
        check_in_date: NaiveDate,
        check_out_date: NaiveDate,
        total_price: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            hotel_id,
            check_in_date,
            check_out_date,
            total_price,
            created_at: Utc::now(),
        }
    }
}
