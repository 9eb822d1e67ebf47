//! JSON score document
//!
//! A serde description of a score that is turned into a validated [`Score`]
//! through the public model API, so every range check of the model applies.
//!
//! ```json
//! {
//!   "metadata": { "title": "Etude", "copyright": "(c) 2024" },
//!   "context": { "tempo": 90, "time_signature": "3/4" },
//!   "staves": [
//!     { "kind": "GreatStaff",
//!       "clefs": [
//!         { "events": [ { "type": "note", "pitch": 60, "length": 1.5 },
//!                       { "type": "rest", "length": "1/2" } ] },
//!         { "instrument": { "name": "Cello", "program": 43 },
//!           "events": [ { "type": "chord", "pitches": [36, 43], "length": 2 } ] }
//!       ] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EmitSettings;
use crate::error::{ConfigurationError, Result, StructuralError, ValidationError};
use crate::models::{
    Chord, Clef, Context, Event, Instrument, Message, Note, ParamValue, QuarterLength, Rest, Score,
    ScoreMetadata, Staff, StaffKind, TimeSignature,
};
use crate::renderers::midi::render_smf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreDocument {
    pub metadata: ScoreMetadata,
    pub context: ContextDocument,
    /// Instrument announced in the header track
    pub instrument: Option<InstrumentDocument>,
    pub staves: Vec<StaffDocument>,
    pub settings: EmitSettings,
}

/// Context overrides; absent fields keep the inherited value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextDocument {
    pub tempo: Option<i64>,
    pub time_signature: Option<TimeSignature>,
    pub volume: Option<i64>,
    pub attack_velocity: Option<i64>,
    pub release_velocity: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentDocument {
    pub name: String,
    pub program: i64,
    #[serde(default)]
    pub percussion: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffDocument {
    pub kind: StaffKind,
    #[serde(default)]
    pub context: ContextDocument,
    #[serde(default)]
    pub clefs: Vec<ClefDocument>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClefDocument {
    pub instrument: Option<InstrumentDocument>,
    pub context: ContextDocument,
    pub events: Vec<EventDocument>,
}

/// Duration as a number of quarters (`1.5`) or a ratio (`"1/3"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LengthDocument {
    Quarters(f64),
    Ratio(String),
}

impl Default for LengthDocument {
    fn default() -> Self {
        LengthDocument::Quarters(1.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventDocument {
    Note {
        pitch: i64,
        #[serde(default)]
        length: LengthDocument,
        #[serde(default)]
        lyric: Option<String>,
        #[serde(default)]
        attack_velocity: Option<i64>,
        #[serde(default)]
        release_velocity: Option<i64>,
    },
    Rest {
        #[serde(default)]
        length: LengthDocument,
    },
    Chord {
        pitches: Vec<i64>,
        #[serde(default)]
        length: LengthDocument,
        #[serde(default)]
        lyric: Option<String>,
    },
    Message {
        message_type: String,
        #[serde(default)]
        parameters: BTreeMap<String, ParamValue>,
    },
}

impl ScoreDocument {
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source)
            .map_err(|e| ConfigurationError::Document(e.to_string()).into())
    }

    /// Build the score, validating every value on the way
    pub fn build(&self) -> Result<Score> {
        let mut score = Score::new();
        *score.metadata_mut() = self.metadata.clone();
        self.context.apply(score.context_mut())?;
        if let Some(instrument) = &self.instrument {
            score.context_mut().set_instrument(instrument.build()?);
        }

        for staff_doc in &self.staves {
            score.add_staff(Staff::new(staff_doc.kind));
            let index = score.staves().len() - 1;
            if let Some(staff) = score.staff_mut(index) {
                staff_doc.build_into(staff)?;
            }
        }
        log::debug!(
            "Built score '{}' with {} staves",
            score.metadata().title,
            score.staves().len()
        );
        Ok(score)
    }
}

impl ContextDocument {
    fn apply(&self, context: &mut Context) -> Result<()> {
        if let Some(tempo) = self.tempo {
            context.set_tempo(tempo)?;
        }
        if let Some(time_signature) = self.time_signature {
            context.set_time_signature(time_signature);
        }
        if let Some(volume) = self.volume {
            context.set_volume(volume)?;
        }
        if let Some(velocity) = self.attack_velocity {
            context.set_attack_velocity(velocity)?;
        }
        if let Some(velocity) = self.release_velocity {
            context.set_release_velocity(velocity)?;
        }
        Ok(())
    }
}

impl InstrumentDocument {
    fn build(&self) -> Result<Instrument> {
        let program = u8::try_from(self.program)
            .map_err(|_| ValidationError::Program(self.program))?;
        Ok(Instrument::new(self.name.clone(), program, self.percussion)?)
    }
}

impl StaffDocument {
    /// Fill an attached staff: staff overrides reach its clefs, then each
    /// clef gets its instrument, overrides and events
    fn build_into(&self, staff: &mut Staff) -> Result<()> {
        self.context.apply(staff.context_mut())?;
        for clef in staff.clefs_mut() {
            self.context.apply(clef.context_mut())?;
        }
        for (index, clef_doc) in self.clefs.iter().enumerate() {
            if let Some(instrument) = &clef_doc.instrument {
                staff.set_clef_instrument(index, instrument.build()?)?;
            }
            let clef = staff
                .clef_mut(index)
                .ok_or(StructuralError::MissingClef(index))?;
            clef_doc.context.apply(clef.context_mut())?;
            for event in &clef_doc.events {
                event.append_to(clef)?;
            }
        }
        Ok(())
    }
}

impl LengthDocument {
    fn quarter_length(&self) -> Result<QuarterLength> {
        match self {
            LengthDocument::Quarters(value) => Ok(QuarterLength::from_f64(*value)?),
            LengthDocument::Ratio(text) => {
                let invalid = || ValidationError::QuarterLength(text.clone());
                let (num, den) = text.split_once('/').unwrap_or((text.as_str(), "1"));
                let num: i64 = num.trim().parse().map_err(|_| invalid())?;
                let den: i64 = den.trim().parse().map_err(|_| invalid())?;
                Ok(QuarterLength::new(num, den)?)
            }
        }
    }
}

impl EventDocument {
    fn append_to(&self, clef: &mut Clef) -> Result<()> {
        match self {
            EventDocument::Note {
                pitch,
                length,
                lyric,
                attack_velocity,
                release_velocity,
            } => {
                let mut note = Note::new(*pitch, length.quarter_length()?)?;
                if let Some(lyric) = lyric {
                    note.set_lyric(lyric.clone());
                }
                if attack_velocity.is_none() && release_velocity.is_none() {
                    return clef.add_note(note);
                }
                let context = clef.context();
                note.set_attack_velocity(
                    attack_velocity.unwrap_or(i64::from(context.attack_velocity())),
                )?;
                note.set_release_velocity(
                    release_velocity.unwrap_or(i64::from(context.release_velocity())),
                )?;
                clef.add_note_uninherited(note)
            }
            EventDocument::Rest { length } => clef.add_note(Rest::new(length.quarter_length()?)),
            EventDocument::Chord {
                pitches,
                length,
                lyric,
            } => {
                let mut chord = Chord::from_numbers(pitches, length.quarter_length()?)?;
                if let Some(lyric) = lyric {
                    chord.set_lyric(lyric.clone());
                }
                clef.add_note(Event::from(chord))
            }
            EventDocument::Message {
                message_type,
                parameters,
            } => clef.add_message(Message::new(message_type.clone(), parameters.clone())?),
        }
    }
}

/// Parse a JSON score document and render it to SMF bytes
pub fn document_to_midi(json: &str) -> Result<Vec<u8>> {
    let document = ScoreDocument::from_json(json)?;
    let score = document.build()?;
    render_smf(&score, &document.settings)
}
