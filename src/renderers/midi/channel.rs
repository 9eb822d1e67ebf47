//! Output channel assignment
//!
//! - Percussion instruments always play on channel 9
//! - Requested channels outside 0-15 fall back to channel 15 instead of
//!   failing; channel 15 is the overflow lane for extra clefs
//! - Anything else is used as requested

use super::defaults::{OVERFLOW_CHANNEL, PERCUSSION_CHANNEL};
use crate::models::Instrument;

/// Map a requested channel and instrument to a valid MIDI channel
pub fn resolve_channel(requested: usize, instrument: &Instrument) -> u8 {
    if instrument.is_percussion() {
        PERCUSSION_CHANNEL
    } else if requested > 15 {
        log::debug!("Channel {} out of range, using {}", requested, OVERFLOW_CHANNEL);
        OVERFLOW_CHANNEL
    } else {
        requested as u8
    }
}
