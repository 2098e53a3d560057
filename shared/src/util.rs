/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Convert a decimal price to integer cents, rounding half away from zero.
pub fn to_cents(price: rust_decimal::Decimal) -> Option<i64> {
    use rust_decimal::RoundingStrategy;
    use rust_decimal::prelude::ToPrimitive;
    (price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        * rust_decimal::Decimal::ONE_HUNDRED)
        .to_i64()
}

/// Convert integer cents back to a two-place decimal.
pub fn from_cents(cents: i64) -> rust_decimal::Decimal {
    rust_decimal::Decimal::new(cents, 2)
}
