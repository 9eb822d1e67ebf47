//! Default values for MIDI export
//!
//! Provides the defaults for tempo, velocity, volume, instrument and
//! channel assignment shared by the score model and the emitter.

/// Default tempo in beats per minute
pub const DEFAULT_TEMPO_BPM: u32 = 120;

/// Tempo bounds (inclusive). Tempo is stored as microseconds per beat in
/// 24 bits, so anything slower than 4 BPM cannot be written.
pub const MIN_TEMPO_BPM: u32 = 4;
pub const MAX_TEMPO_BPM: u32 = 1000;

/// Default attack (note-on) velocity
pub const DEFAULT_ATTACK_VELOCITY: u8 = 75;

/// Default release (note-off) velocity
pub const DEFAULT_RELEASE_VELOCITY: u8 = 64;

/// Default channel volume
pub const DEFAULT_VOLUME: u8 = 64;

/// Highest 7-bit MIDI data value (note, velocity, volume, controller value)
pub const MAX_DATA_VALUE: u8 = 127;

/// Default instrument name and program number (0-128 internal numbering)
pub const DEFAULT_INSTRUMENT_NAME: &str = "Acoustic Grand Piano";
pub const DEFAULT_PROGRAM: u8 = 1;

/// Highest program number in the internal numbering
pub const MAX_PROGRAM: u8 = 128;

/// Range of General MIDI percussion key numbers
pub const MIN_PERCUSSION_PROGRAM: u8 = 35;
pub const MAX_PERCUSSION_PROGRAM: u8 = 81;

/// Lowest ticks-per-beat the emitter will choose
pub const MIN_TICKS_PER_BEAT: u16 = 96;

/// Largest value the SMF division field can hold (15 bits)
pub const MAX_TICKS_PER_BEAT: u64 = 0x7FFF;

/// Channel 9 (10 in 1-indexed) is reserved for drums
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Channel used when a requested channel is outside 0-15
pub const OVERFLOW_CHANNEL: u8 = 15;

/// Values a pass-through message falls back to when a parameter is absent
pub const DEFAULT_MESSAGE_VELOCITY: u8 = 64;
pub const DEFAULT_MESSAGE_TEMPO: u32 = 500_000;
