//! WASM API
//!
//! JavaScript-facing entry points. The binding is thin: it takes a JSON
//! score document, runs it through the same native path used by Rust
//! callers and hands back Standard MIDI File bytes.
//!
//! # Module Structure
//!
//! - `document`: serde score document and the native conversion path

pub mod document;

pub use document::{document_to_midi, ScoreDocument};

use wasm_bindgen::prelude::*;

/// Convert a JSON score document to MIDI
///
/// # Returns
/// MIDI file as Uint8Array (Standard MIDI File Format 1)
#[wasm_bindgen(js_name = scoreToMidi)]
pub fn score_to_midi(json: &str) -> Result<Vec<u8>, JsValue> {
    log::info!("scoreToMidi called with {} bytes of JSON", json.len());

    let bytes = document_to_midi(json).map_err(|e| {
        log::error!("MIDI conversion error: {}", e);
        JsValue::from_str(&format!("MIDI conversion error: {}", e))
    })?;

    log::info!("MIDI generated: {} bytes", bytes.len());
    Ok(bytes)
}
