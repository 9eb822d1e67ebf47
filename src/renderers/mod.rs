//! Renderers module
//!
//! This module contains export logic for converting a score into output
//! formats. MIDI is the only target.

pub mod midi;

// Re-export commonly used types
pub use midi::{emit, emit_with, render_smf, Emit, MidiFile};
