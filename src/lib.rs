//! Score → MIDI WASM Module
//!
//! Score/timeline model (notes, rests, chords and messages grouped into
//! clefs, staves and scores), alignment of timelines, and emission of a
//! multi-track MIDI event stream written as a Standard MIDI File.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod renderers;
pub mod structure;

// Re-export commonly used types
pub use config::EmitSettings;
pub use error::{ConfigurationError, Result, ScoreError, StructuralError, ValidationError};
pub use models::*;
pub use renderers::midi::{emit, emit_with, render_smf, to_bytes, Emit, MidiFile};
pub use structure::{merge, round_up_clef, round_up_score, round_up_staff};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    console_log::init_with_level(log::Level::Debug).expect("failed to initialize logger");

    log::info!("Score MIDI WASM module initialized");
}
