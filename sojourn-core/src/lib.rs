pub mod booking;
pub mod gateway;
pub mod hotel;
pub mod payment;
pub mod pricing;
pub mod repository;

pub use booking::Booking;
pub use hotel::Hotel;
pub use payment::{Payment, PaymentStatus};
