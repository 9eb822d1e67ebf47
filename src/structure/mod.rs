//! Score structure operations
//!
//! Operations that reshape a score without changing its notes: padding
//! clefs so they end together and joining scores end to end.
//!
//! ## Modules
//!
//! - `align`: Round-up padding and score merging

pub mod align;

// Re-exports for convenience
pub use align::{merge, round_up_clef, round_up_score, round_up_staff};
