//! Emission settings
//!
//! Settings are plain serde structs so they can come from a YAML or JSON
//! file as well as from code. Missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::renderers::midi::defaults::{MAX_TICKS_PER_BEAT, MIN_TICKS_PER_BEAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitSettings {
    /// Lower bound for the resolved ticks per beat
    pub min_ticks_per_beat: u16,
    /// Emit the header track for scores
    pub include_header: bool,
    /// Terminate every track with an end-of-track event
    pub end_of_track: bool,
}

impl Default for EmitSettings {
    fn default() -> Self {
        EmitSettings {
            min_ticks_per_beat: MIN_TICKS_PER_BEAT,
            include_header: true,
            end_of_track: true,
        }
    }
}

impl EmitSettings {
    pub fn from_yaml(source: &str) -> Result<Self, ConfigurationError> {
        let settings: EmitSettings = serde_yaml::from_str(source)
            .map_err(|e| ConfigurationError::Settings(e.to_string()))?;
        settings.validated()
    }

    pub fn from_json(source: &str) -> Result<Self, ConfigurationError> {
        let settings: EmitSettings = serde_json::from_str(source)
            .map_err(|e| ConfigurationError::Settings(e.to_string()))?;
        settings.validated()
    }

    fn validated(self) -> Result<Self, ConfigurationError> {
        if self.min_ticks_per_beat == 0 || u64::from(self.min_ticks_per_beat) > MAX_TICKS_PER_BEAT {
            return Err(ConfigurationError::Settings(format!(
                "min_ticks_per_beat must be between 1 and {}, got {}",
                MAX_TICKS_PER_BEAT, self.min_ticks_per_beat
            )));
        }
        Ok(self)
    }
}
