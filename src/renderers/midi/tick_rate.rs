//! Ticks-per-beat resolution
//!
//! Picks one division for a whole file so that every duration in it maps
//! to a whole number of ticks.
//!
//! # Algorithm
//! 1. Reduce each duration to lowest terms and collect the denominators
//! 2. Take their least common multiple `l`
//! 3. Return the smallest multiple of `l` that is >= the minimum resolution
//!
//! A `gcd × max` product is not enough: for {1/3, 1/5} it gives 5, whose
//! multiple 100 leaves 100/3 ticks for a third of a beat.

use super::defaults::{MAX_TICKS_PER_BEAT, MIN_TICKS_PER_BEAT};
use crate::error::ValidationError;
use crate::models::QuarterLength;

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// `None` when the multiple does not fit in `u64`
fn lcm(a: u64, b: u64) -> Option<u64> {
    (a / gcd(a, b)).checked_mul(b)
}

/// Resolve ticks per beat with the default minimum of 96
pub fn best_ticks_per_beat<I>(durations: I) -> Result<u16, ValidationError>
where
    I: IntoIterator<Item = QuarterLength>,
{
    resolve_ticks_per_beat(durations, MIN_TICKS_PER_BEAT)
}

/// Resolve ticks per beat, never going below `min_tpb`
///
/// With no durations the minimum itself is returned.
pub fn resolve_ticks_per_beat<I>(durations: I, min_tpb: u16) -> Result<u16, ValidationError>
where
    I: IntoIterator<Item = QuarterLength>,
{
    let min_tpb = u64::from(min_tpb.max(1));
    let mut base = 1u64;
    for duration in durations {
        base = lcm(base, duration.denominator() as u64)
            .ok_or(ValidationError::TicksPerBeat(u64::MAX))?;
        if base > MAX_TICKS_PER_BEAT {
            return Err(ValidationError::TicksPerBeat(base));
        }
    }

    let k = (min_tpb + base - 1) / base;
    let tpb = base * k;
    if tpb > MAX_TICKS_PER_BEAT {
        return Err(ValidationError::TicksPerBeat(tpb));
    }
    log::debug!("Resolved {} ticks per beat (denominator lcm {})", tpb, base);
    Ok(tpb as u16)
}
