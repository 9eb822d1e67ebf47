//! Clefs and staves
//!
//! A [`Staff`] owns one or two [`Clef`]s, chosen by its [`StaffKind`]; each
//! clef owns one [`Timeline`]. Clefs hold no pointer back to their staff:
//! changes that must reach the staff (a percussion instrument relabelling
//! it) go through [`Staff::set_clef_instrument`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::context::{Context, Instrument};
use super::duration::QuarterLength;
use super::event::{Chord, Event, EventKind, Message, Note, Rest};
use super::timeline::Timeline;
use crate::error::{Result, StructuralError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClefKind {
    Treble,
    Bass,
    Percussion,
}

impl ClefKind {
    pub fn name(&self) -> &'static str {
        match self {
            ClefKind::Treble => "Treble",
            ClefKind::Bass => "Bass",
            ClefKind::Percussion => "Percussion",
        }
    }
}

impl FromStr for ClefKind {
    type Err = StructuralError;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        match name {
            "Treble" => Ok(ClefKind::Treble),
            "Bass" => Ok(ClefKind::Bass),
            "Percussion" => Ok(ClefKind::Percussion),
            _ => Err(StructuralError::InvalidClefName(name.to_string())),
        }
    }
}

impl fmt::Display for ClefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One instrumental or vocal line
#[derive(Debug)]
pub struct Clef {
    kind: ClefKind,
    timeline: Timeline,
    context: Context,
}

impl Clef {
    pub fn new(kind: ClefKind) -> Self {
        let mut context = Context::default();
        if kind == ClefKind::Percussion {
            // Acoustic Bass Drum, the lowest GM percussion key
            if let Ok(drums) = Instrument::percussion("Acoustic Bass Drum", 35) {
                context.set_instrument(drums);
            }
        }
        Clef {
            kind,
            timeline: Timeline::new(),
            context,
        }
    }

    pub fn kind(&self) -> ClefKind {
        self.kind
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub(crate) fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn instrument(&self) -> &Instrument {
        self.context.instrument()
    }

    /// Assign an instrument; a percussion instrument turns this into a
    /// percussion clef
    pub fn set_instrument(&mut self, instrument: Instrument) {
        if instrument.is_percussion() && self.kind != ClefKind::Percussion {
            log::warn!("Updating clef to a percussion clef for {}", instrument.name());
            self.kind = ClefKind::Percussion;
        }
        self.context.set_instrument(instrument);
    }

    /// Append a note, rest or chord, inheriting this clef's velocities
    pub fn add_note(&mut self, event: impl Into<Event>) -> Result<()> {
        self.add_event(event.into(), None, true)
    }

    /// Append a note, rest or chord with an explicit duration
    pub fn add_note_with_length(
        &mut self,
        event: impl Into<Event>,
        quarter_length: QuarterLength,
    ) -> Result<()> {
        self.add_event(event.into(), Some(quarter_length), true)
    }

    /// Append keeping the event's own velocities
    pub fn add_note_uninherited(&mut self, event: impl Into<Event>) -> Result<()> {
        self.add_event(event.into(), None, false)
    }

    pub fn add_message(&mut self, message: Message) -> Result<()> {
        self.timeline.append(message)?;
        Ok(())
    }

    fn add_event(
        &mut self,
        event: Event,
        quarter_length: Option<QuarterLength>,
        inherit: bool,
    ) -> Result<()> {
        if event.is_linked() {
            log::warn!("The current note/chord/message is already in use");
            return Err(StructuralError::AlreadyLinked.into());
        }
        let attack = self.context.attack_velocity() as i64;
        let release = self.context.release_velocity() as i64;
        let kind = match event.into_kind() {
            EventKind::Note(mut note) => {
                if inherit {
                    note.set_attack_velocity(attack)?;
                    note.set_release_velocity(release)?;
                }
                if let Some(ql) = quarter_length {
                    note.set_quarter_length(ql);
                }
                EventKind::Note(note)
            }
            EventKind::Chord(mut chord) => {
                if inherit {
                    chord.set_attack_velocities(attack)?;
                    chord.set_release_velocities(release)?;
                }
                if let Some(ql) = quarter_length {
                    chord.set_quarter_length(ql);
                }
                EventKind::Chord(chord)
            }
            EventKind::Rest(mut rest) => {
                if let Some(ql) = quarter_length {
                    rest.set_quarter_length(ql);
                }
                EventKind::Rest(rest)
            }
            EventKind::Message(message) => EventKind::Message(message),
        };
        self.timeline.append(Event::new(kind))?;
        Ok(())
    }

    /// Shortcut for appending a note number of a given length
    pub fn add_pitch(&mut self, number: i64, quarter_length: QuarterLength) -> Result<()> {
        self.add_note(Note::new(number, quarter_length)?)
    }

    /// Shortcut for appending a chord of note numbers
    pub fn add_chord(&mut self, numbers: &[i64], quarter_length: QuarterLength) -> Result<()> {
        self.add_note(Chord::from_numbers(numbers, quarter_length)?)
    }

    pub fn add_rest(&mut self, quarter_length: QuarterLength) -> Result<()> {
        self.add_note(Rest::new(quarter_length))
    }

    pub fn total_duration(&self) -> QuarterLength {
        self.timeline.total_duration()
    }

    pub fn unique_quarter_lengths(&self) -> Vec<QuarterLength> {
        self.timeline.unique_quarter_lengths()
    }
}

impl fmt::Display for Clef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Clef: {} | Instrument: {}", self.kind, self.instrument())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffKind {
    TrebleStaff,
    BassStaff,
    PercussionStaff,
    #[serde(alias = "GrandStaff")]
    GreatStaff,
}

impl StaffKind {
    pub fn name(&self) -> &'static str {
        match self {
            StaffKind::TrebleStaff => "TrebleStaff",
            StaffKind::BassStaff => "BassStaff",
            StaffKind::PercussionStaff => "PercussionStaff",
            StaffKind::GreatStaff => "GreatStaff",
        }
    }

    /// Clefs a new staff of this kind starts with
    pub fn clef_kinds(&self) -> &'static [ClefKind] {
        match self {
            StaffKind::TrebleStaff => &[ClefKind::Treble],
            StaffKind::BassStaff => &[ClefKind::Bass],
            StaffKind::PercussionStaff => &[ClefKind::Percussion],
            StaffKind::GreatStaff => &[ClefKind::Treble, ClefKind::Bass],
        }
    }
}

impl FromStr for StaffKind {
    type Err = StructuralError;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        match name {
            "TrebleStaff" => Ok(StaffKind::TrebleStaff),
            "BassStaff" => Ok(StaffKind::BassStaff),
            "PercussionStaff" => Ok(StaffKind::PercussionStaff),
            "GreatStaff" | "GrandStaff" => Ok(StaffKind::GreatStaff),
            _ => Err(StructuralError::InvalidStaffName(name.to_string())),
        }
    }
}

impl fmt::Display for StaffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named group of clefs
#[derive(Debug)]
pub struct Staff {
    kind: StaffKind,
    clefs: Vec<Clef>,
    context: Context,
}

impl Staff {
    pub fn new(kind: StaffKind) -> Self {
        Self::with_context(kind, Context::default())
    }

    /// Create a staff whose clefs start from a copy of `context`
    pub fn with_context(kind: StaffKind, context: Context) -> Self {
        let clefs = kind
            .clef_kinds()
            .iter()
            .map(|k| {
                let mut clef = Clef::new(*k);
                clef.context_mut().inherit_from(&context);
                clef
            })
            .collect();
        Staff {
            kind,
            clefs,
            context,
        }
    }

    pub fn kind(&self) -> StaffKind {
        self.kind
    }

    pub fn clefs(&self) -> &[Clef] {
        &self.clefs
    }

    pub fn clefs_mut(&mut self) -> &mut [Clef] {
        &mut self.clefs
    }

    pub fn clef(&self, index: usize) -> Option<&Clef> {
        self.clefs.get(index)
    }

    pub fn clef_mut(&mut self, index: usize) -> Option<&mut Clef> {
        self.clefs.get_mut(index)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Copy a parent's context onto this staff and its clefs
    pub(crate) fn inherit_from(&mut self, parent: &Context) {
        self.context.inherit_from(parent);
        for clef in &mut self.clefs {
            clef.context_mut().inherit_from(parent);
        }
    }

    /// Assign an instrument to one clef; a percussion instrument relabels
    /// the staff as a percussion staff
    pub fn set_clef_instrument(&mut self, index: usize, instrument: Instrument) -> Result<()> {
        let percussion = instrument.is_percussion();
        let clef = self
            .clefs
            .get_mut(index)
            .ok_or(StructuralError::MissingClef(index))?;
        clef.set_instrument(instrument);
        if percussion && self.kind != StaffKind::PercussionStaff {
            log::warn!("Updating {} to a percussion staff", self.kind);
            self.kind = StaffKind::PercussionStaff;
        }
        Ok(())
    }

    /// Longest clef duration on this staff
    pub fn max_duration(&self) -> QuarterLength {
        self.clefs
            .iter()
            .map(Clef::total_duration)
            .max()
            .unwrap_or(QuarterLength::ZERO)
    }
}

impl fmt::Display for Staff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.context.time_signature())
    }
}
