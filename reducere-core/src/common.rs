use num_rational::Ratio;
use num_traits::ToPrimitive;

/// Cents of an exact ratio: 1200 * log2(p/q).
#[inline]
pub fn ratio_to_cents(r: &Ratio<i64>) -> f64 {
    1200.0 * r.to_f64().unwrap_or(f64::NAN).log2()
}

/// Round to two decimals. Table presentation only; the harmonic arithmetic
/// itself stays on exact integers and rationals.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
