//! Quarter-length durations
//!
//! Durations are kept as exact rationals so that converting them to
//! ticks never loses precision.

use std::fmt;

use num_rational::{Ratio, Rational64};

use crate::error::ValidationError;

/// Largest denominator accepted when approximating a float duration
const MAX_FLOAT_DENOMINATOR: i64 = 1_000_000;

/// Duration of an event in quarter-note units (always >= 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuarterLength(Rational64);

impl QuarterLength {
    pub const ZERO: QuarterLength = QuarterLength(Rational64::new_raw(0, 1));
    pub const QUARTER: QuarterLength = QuarterLength(Rational64::new_raw(1, 1));

    /// Create a duration of `numerator / denominator` quarter notes
    pub fn new(numerator: i64, denominator: i64) -> Result<Self, ValidationError> {
        if denominator == 0 || (numerator < 0) != (denominator < 0) && numerator != 0 {
            return Err(ValidationError::QuarterLength(format!(
                "{}/{}",
                numerator, denominator
            )));
        }
        Ok(QuarterLength(Rational64::new(numerator, denominator)))
    }

    /// Create a duration of a whole number of quarter notes
    pub fn whole(quarters: u32) -> Self {
        QuarterLength(Rational64::from_integer(quarters as i64))
    }

    /// Convert a float duration, e.g. `1.25`
    ///
    /// The value is replaced by the closest fraction with a bounded
    /// denominator, so `1.0 / 3.0` becomes exactly `1/3`.
    pub fn from_f64(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::QuarterLength(value.to_string()));
        }
        let ratio = limit_denominator(value, MAX_FLOAT_DENOMINATOR)
            .ok_or_else(|| ValidationError::QuarterLength(value.to_string()))?;
        Ok(QuarterLength(ratio))
    }

    pub fn numerator(&self) -> i64 {
        *self.0.numer()
    }

    /// Denominator in lowest terms (1 for whole quarter counts)
    pub fn denominator(&self) -> i64 {
        *self.0.denom()
    }

    pub fn is_zero(&self) -> bool {
        *self.0.numer() == 0
    }

    pub fn as_ratio(&self) -> Rational64 {
        self.0
    }

    /// Convert to floating point (for display)
    pub fn to_f64(&self) -> f64 {
        *self.0.numer() as f64 / *self.0.denom() as f64
    }

    /// Number of ticks this duration spans at `ticks_per_beat`, rounded to
    /// the nearest tick (half away from zero) when the product is not
    /// integral; saturates at `u64::MAX`
    pub fn to_ticks(&self, ticks_per_beat: u32) -> u64 {
        let numer = i128::from(*self.0.numer()) * i128::from(ticks_per_beat);
        let denom = i128::from(*self.0.denom());
        let ticks = (2 * numer + denom) / (2 * denom);
        u64::try_from(ticks.max(0)).unwrap_or(u64::MAX)
    }

    /// Exact sum, `None` when the reduced result does not fit in `i64` terms
    pub fn checked_add(self, other: QuarterLength) -> Option<QuarterLength> {
        let (a, b) = (i128::from(*self.0.numer()), i128::from(*self.0.denom()));
        let (c, d) = (i128::from(*other.0.numer()), i128::from(*other.0.denom()));
        narrow(Ratio::new(a * d + c * b, b * d))
    }

    /// Exact difference, `None` when `other` is larger or the result does
    /// not fit in `i64` terms
    pub fn checked_sub(self, other: QuarterLength) -> Option<QuarterLength> {
        if other > self {
            return None;
        }
        let (a, b) = (i128::from(*self.0.numer()), i128::from(*self.0.denom()));
        let (c, d) = (i128::from(*other.0.numer()), i128::from(*other.0.denom()));
        narrow(Ratio::new(a * d - c * b, b * d))
    }
}

fn narrow(ratio: Ratio<i128>) -> Option<QuarterLength> {
    let numer = i64::try_from(*ratio.numer()).ok()?;
    let denom = i64::try_from(*ratio.denom()).ok()?;
    Some(QuarterLength(Rational64::new_raw(numer, denom)))
}

impl Default for QuarterLength {
    fn default() -> Self {
        QuarterLength::QUARTER
    }
}

impl fmt::Display for QuarterLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator() == 1 {
            write!(f, "{}", self.numerator())
        } else {
            write!(f, "{}/{}", self.numerator(), self.denominator())
        }
    }
}

/// Closest fraction to `value` whose denominator does not exceed `max_den`
///
/// Walks the continued fraction expansion and keeps the best convergent or
/// semiconvergent.
fn limit_denominator(value: f64, max_den: i64) -> Option<Rational64> {
    let exact = Rational64::approximate_float(value)?;
    if *exact.denom() <= max_den {
        return Some(exact);
    }

    let (mut p0, mut q0, mut p1, mut q1) = (0i64, 1i64, 1i64, 0i64);
    let (mut n, mut d) = (*exact.numer(), *exact.denom());
    loop {
        let a = n / d;
        let q2 = q0 + a * q1;
        if q2 > max_den {
            break;
        }
        let p2 = p0 + a * p1;
        p0 = p1;
        q0 = q1;
        p1 = p2;
        q1 = q2;
        let rem = n - a * d;
        n = d;
        d = rem;
        if d == 0 {
            break;
        }
    }

    let k = (max_den - q0) / q1;
    let bound1 = Rational64::new(p0 + k * p1, q0 + k * q1);
    let bound2 = Rational64::new(p1, q1);
    let distance = |r: Rational64| {
        let diff = r - exact;
        if diff < Rational64::from_integer(0) { -diff } else { diff }
    };
    let dist1 = distance(bound1);
    let dist2 = distance(bound2);
    Some(if dist2 <= dist1 { bound2 } else { bound1 })
}
