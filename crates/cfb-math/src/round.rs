//! CIE rounding rules.
//!
//! The CIE recommendation rounds half away from zero, which differs from
//! both IEEE round-to-even (`f64::round_ties_even`) and the standard
//! library's `f64::round` only at exact ties, but those ties occur
//! systematically in tabulated data, so the distinction matters for
//! reproducing published tables digit for digit.

/// Rounds to `n` decimal places, half away from zero.
///
/// # Example
///
/// ```rust
/// use cfb_math::round_dp;
///
/// assert_eq!(round_dp(0.125, 2), 0.13);
/// assert_eq!(round_dp(-0.5, 0), -1.0);
/// ```
#[inline]
pub fn round_dp(x: f64, n: i32) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    if n >= 0 {
        let scale = 10f64.powi(n);
        x.signum() * (x.abs() * scale + 0.5).floor() / scale
    } else {
        // Negative n rounds to tens/hundreds/...; dividing first keeps the
        // final multiply exact for integral results.
        let factor = 10f64.powi(-n);
        x.signum() * (x.abs() / factor + 0.5).floor() * factor
    }
}

/// Rounds to `n` significant figures.
///
/// The exponent is taken as `ceil(log10(|x|))`, matching the CIE tabulation
/// scheme: a value in `(0.1, 1]` keeps `n` digits after the decimal point.
///
/// # Example
///
/// ```rust
/// use cfb_math::round_sf;
///
/// assert_eq!(round_sf(0.0012344, 3), 0.00123);
/// assert_eq!(round_sf(987654.0, 2), 990000.0);
/// assert_eq!(round_sf(0.0, 5), 0.0);
/// ```
#[inline]
pub fn round_sf(x: f64, n: i32) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    let exponent = x.abs().log10().ceil() as i32;
    round_dp(x, n - exponent)
}

/// Sets values smaller than `epsilon` in absolute value to exactly zero.
///
/// Numerical noise at the 1e-14 level otherwise survives into published
/// tables as values like `-2.77e-17`.
#[inline]
pub fn chop(x: f64, epsilon: f64) -> f64 {
    if x.abs() < epsilon { 0.0 } else { x }
}

/// [`chop`] with the default tolerance used throughout the engine.
#[inline]
pub fn chop_default(x: f64) -> f64 {
    chop(x, 1e-14)
}
