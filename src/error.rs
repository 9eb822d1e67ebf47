//! Error types for the score model and MIDI emission
//!
//! Three kinds of failure are surfaced to callers unmodified:
//! - [`ValidationError`]: a value is out of its declared range
//! - [`StructuralError`]: the shape of the score graph is wrong
//! - [`ConfigurationError`]: a textual or configuration input is malformed
//!
//! [`ScoreError`] wraps all three for APIs that can fail in more than one way.

use thiserror::Error;

/// A value outside of its declared range, raised at construction or assignment
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid note number {0}. Note number must be between 0 and 127")]
    Pitch(i64),

    #[error("Invalid velocity number {0}. Velocity must be an integer between 0 and 127")]
    Velocity(i64),

    #[error("Invalid tempo {0}. Tempo must be between {1} and {2}")]
    Tempo(i64, u32, u32),

    #[error("Invalid volume {0}. Volume must be between 0 and 127")]
    Volume(i64),

    #[error("Invalid quarter length {0}: durations must be finite and non-negative")]
    QuarterLength(String),

    #[error("Invalid instrument number {0}")]
    Program(i64),

    #[error("Number {0} is not that of a percussion instrument in midi")]
    PercussionProgram(i64),

    #[error("Expected parameter '{parameter}' for {message_type} message")]
    MissingParameter {
        message_type: String,
        parameter: String,
    },

    #[error("Invalid value {value} for parameter '{parameter}' of {message_type} message")]
    Parameter {
        message_type: String,
        parameter: String,
        value: String,
    },

    #[error("Invalid control {0}")]
    Control(i64),

    #[error("Invalid value {value} for control {control}")]
    ControlValue { control: u8, value: i64 },

    #[error("Durations {0} and {1} cannot be combined into an exact quarter length")]
    DurationOverflow(String, String),

    #[error("Ticks per beat {0} does not fit the 15-bit MIDI division field")]
    TicksPerBeat(u64),
}

/// The score graph has the wrong shape for the requested operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    #[error("The event is already linked into a timeline")]
    AlreadyLinked,

    #[error("Cannot merge scores with {0} and {1} staves")]
    StaffCountMismatch(usize, usize),

    #[error("Cannot merge staff {index}: {left} does not match {right}")]
    StaffKindMismatch {
        index: usize,
        left: String,
        right: String,
    },

    #[error("Invalid clef name '{0}'")]
    InvalidClefName(String),

    #[error("Invalid staff name '{0}'")]
    InvalidStaffName(String),

    #[error("Chord already contains note number {0}")]
    DuplicateChordNote(u8),

    #[error("Staff has no clef at index {0}")]
    MissingClef(usize),
}

/// Malformed textual input or configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("Invalid time signature {0}")]
    TimeSignature(String),

    #[error("{0} is not a valid midi instrument name")]
    InstrumentName(String),

    #[error("Invalid key signature {0}")]
    KeySignature(String),

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("Invalid score document: {0}")]
    Document(String),
}

/// Top-level error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("midi write error: {0}")]
    Midi(String),
}

pub type Result<T> = std::result::Result<T, ScoreError>;
