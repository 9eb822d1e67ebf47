//! Top-level score: metadata, context and ordered staves

use serde::{Deserialize, Serialize};

use super::context::{Context, KeySignature};
use super::staff::Staff;

/// Descriptive fields carried into the header track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreMetadata {
    pub title: String,
    pub lyrics_by: String,
    pub music_by: String,
    pub genre: String,
    pub copyright: Option<String>,
    pub key_signature: Option<KeySignature>,
}

impl Default for ScoreMetadata {
    fn default() -> Self {
        ScoreMetadata {
            title: "Untitled".to_string(),
            lyrics_by: "Unknown".to_string(),
            music_by: "Unknown".to_string(),
            genre: "Pop".to_string(),
            copyright: None,
            key_signature: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Score {
    metadata: ScoreMetadata,
    staves: Vec<Staff>,
    context: Context,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: Context) -> Self {
        Score {
            context,
            ..Self::default()
        }
    }

    pub fn metadata(&self) -> &ScoreMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut ScoreMetadata {
        &mut self.metadata
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn staves(&self) -> &[Staff] {
        &self.staves
    }

    pub fn staves_mut(&mut self) -> &mut [Staff] {
        &mut self.staves
    }

    pub fn staff(&self, index: usize) -> Option<&Staff> {
        self.staves.get(index)
    }

    pub fn staff_mut(&mut self, index: usize) -> Option<&mut Staff> {
        self.staves.get_mut(index)
    }

    /// Append a staff, copying this score's context onto it
    pub fn add_staff(&mut self, staff: Staff) {
        let position = self.staves.len();
        self.add_staff_at(staff, position, true);
    }

    /// Insert a staff at `position` (clamped to the end)
    pub fn add_staff_at(&mut self, mut staff: Staff, position: usize, inherit: bool) {
        if inherit {
            staff.inherit_from(&self.context);
        }
        let position = position.min(self.staves.len());
        self.staves.insert(position, staff);
    }

    /// Whether any clef plays the given instrument number
    pub fn has_instrument(&self, program: u8, is_percussion: bool) -> bool {
        self.staves
            .iter()
            .flat_map(|s| s.clefs().iter())
            .any(|c| {
                c.instrument().program() == program && c.instrument().is_percussion() == is_percussion
            })
    }

    pub(crate) fn into_staves(self) -> Vec<Staff> {
        self.staves
    }
}
