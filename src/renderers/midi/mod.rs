//! Score → MIDI conversion module
//!
//! Turns the score model into a multi-track event stream and serializes it
//! as a Standard MIDI File.
//!
//! # Stages
//! - **Tick rate**: one ticks-per-beat for the whole file, exact for every duration
//! - **Channels**: percussion on channel 9, overflow clefs on channel 15
//! - **Emission**: header track plus one track per clef
//! - **Writing**: SMF Format 1 bytes via `midly`
//!
//! # Usage
//! ```rust,ignore
//! use score_midi::renderers::midi::{emit, to_bytes};
//!
//! let file = emit(&score)?;
//! let bytes = to_bytes(&file)?;
//! ```

pub mod channel;
pub mod defaults;
pub mod emitter;
pub mod model;
pub mod tick_rate;
pub mod write;

use crate::config::EmitSettings;
use crate::error::Result;

// Re-export main conversion functions
pub use channel::resolve_channel;
pub use emitter::{emit, emit_with, Emit, Emitter};
pub use model::{ChannelMessage, MetaEvent, MidiFile, ProtocolEvent, TimedEvent, Track};
pub use tick_rate::{best_ticks_per_beat, resolve_ticks_per_beat};
pub use write::{to_bytes, write_smf};

/// Emit and serialize in one step
pub fn render_smf<T: Emit + ?Sized>(item: &T, settings: &EmitSettings) -> Result<Vec<u8>> {
    let file = emit_with(item, settings)?;
    to_bytes(&file)
}
