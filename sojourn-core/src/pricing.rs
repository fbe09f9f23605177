use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Number of nights between check-in and check-out. Signed: a check-out on
/// or before check-in yields zero or a negative count; callers decide
/// whether that is acceptable input.
pub fn stay_nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

/// Total price for a stay: nightly rate × nights, exact decimal arithmetic.
pub fn stay_total(price_per_night: Decimal, check_in: NaiveDate, check_out: NaiveDate) -> Decimal {
    price_per_night * Decimal::from(stay_nights(check_in, check_out))
}
