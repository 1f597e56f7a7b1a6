use rust_decimal::{Decimal, RoundingStrategy};

/// `price × (1 − percentage/100)`, rounded half-up to cents.
///
/// Percentages are validated below 100 at config load; this function does not
/// clamp, so a percentage of 100 or more yields zero or a negative price.
#[must_use]
pub fn discounted_price(price: Decimal, percentage: Decimal) -> Decimal {
    let factor = Decimal::ONE - percentage / Decimal::ONE_HUNDRED;
    (price * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
