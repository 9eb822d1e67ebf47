//! Score data model
//!
//! This module contains the timeline data structures consumed by the
//! MIDI emitter: events, timelines, playback context, clefs, staves and
//! the score itself.

pub mod context;
pub mod controllers;
pub mod duration;
pub mod event;
pub mod score;
pub mod staff;
pub mod timeline;

// Re-export commonly used types
pub use context::{Accidental, Context, Instrument, KeySignature, TimeSignature};
pub use duration::QuarterLength;
pub use event::{Chord, Event, EventKind, Message, Note, ParamValue, Rest};
pub use score::{Score, ScoreMetadata};
pub use staff::{Clef, ClefKind, Staff, StaffKind};
pub use timeline::{EventEditor, Timeline, TimelineId};
