use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Payment lifecycle. A payment starts Pending and settles exactly once:
/// Pending → Completed or Pending → Failed. Terminal states never revert and
/// never flip to the other terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, TransitionError> {
        match s {
            "Pending" => Ok(PaymentStatus::Pending),
            "Completed" => Ok(PaymentStatus::Completed),
            "Failed" => Ok(PaymentStatus::Failed),
            other => Err(TransitionError::UnknownStatus(other.to_string())),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    /// The only legal settlements are out of Pending.
    pub fn can_transition(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Completed)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("Invalid payment transition from {from} to {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("Unknown payment status: {0}")]
    UnknownStatus(String),
}

/// One payment per booking. `reference` is generated once at creation and
/// never changes; `transaction_id` is derived from it at initiation time and
/// overwritten on every initiation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub reference: Uuid,
    pub status: PaymentStatus,
    pub amount: Decimal,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// A fresh Pending payment with the amount snapshotted from the booking.
    pub fn new(booking_id: Uuid, amount: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            booking_id,
            reference: Uuid::new_v4(),
            status: PaymentStatus::Pending,
            amount,
            transaction_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The reference sent to the gateway: `booking-<booking_id>-<reference>`.
    /// Deterministic, so repeated initiations regenerate the same string.
    pub fn transaction_reference(&self) -> String {
        format!("booking-{}-{}", self.booking_id, self.reference)
    }

    pub fn transition(&mut self, next: PaymentStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition(next) {
            return Err(TransitionError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}
