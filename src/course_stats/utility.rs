use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds the exact decimal value of `value` to `places` digits, halves away from zero.
///
/// Works on the decimal expansion of the `f64` itself, so `10.225` (stored as
/// `10.22499999...`) becomes `10.22`, while an exact tie such as `0.125`
/// becomes `0.13`. Non-finite input is returned unchanged.
pub fn round_to(value: f64, places: u32) -> f64 {
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return value;
    };
    let rounded = exact.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);

    // Both operands are exact in f64, so the single division is correctly rounded.
    rounded.mantissa() as f64 / 10f64.powi(rounded.scale() as i32)
}

/// Computes the arithmetic mean from a running sum and count. Returns 0.0 for a zero count.
pub fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}
