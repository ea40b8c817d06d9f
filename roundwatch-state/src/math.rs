//! Exact percentage helpers over [`BigRational`].
//!
//! Voting power sums routinely exceed what an `f64` holds exactly, so shares
//! stay rational until the last moment and are only rounded for display.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

/// `part / total * 100`, defined as zero when `total` is zero.
pub fn percent_of(part: &BigInt, total: &BigInt) -> BigRational {
    if total.is_zero() {
        return BigRational::zero();
    }

    BigRational::new(part * BigInt::from(100u32), total.clone())
}

/// Render `value` with exactly `decimals` fractional digits, rounding half
/// away from zero.
pub fn format_percent(value: &BigRational, decimals: u32) -> String {
    let scale = num_traits::pow(BigInt::from(10u32), decimals as usize);
    let scaled = (value * BigRational::from_integer(scale.clone())).round().to_integer();

    let sign = if scaled.is_negative() { "-" } else { "" };
    let (whole, fraction) = scaled.abs().div_rem(&scale);

    if decimals == 0 {
        return format!("{}{}", sign, whole);
    }

    format!(
        "{}{}.{:0>width$}",
        sign,
        whole,
        fraction.to_string(),
        width = decimals as usize
    )
}

/// Lossy conversion for widgets that need a float (progress bars).
pub fn percent_to_f64(value: &BigRational) -> f64 {
    let micros = (value * BigRational::from_integer(BigInt::from(1_000_000u32)))
        .round()
        .to_integer();

    micros.to_f64().unwrap_or(0.0) / 1_000_000.0
}
