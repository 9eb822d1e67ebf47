//! Timeline events: notes, rests, chords and control messages
//!
//! An [`Event`] wraps one of the four [`EventKind`]s together with the
//! identity of the timeline it is linked into. Once linked, an event (or a
//! clone of it) cannot be appended to another timeline; use
//! [`Event::detached`] to make an independent copy.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::controllers::controller;
use super::context::{validate_velocity, KeySignature};
use super::duration::QuarterLength;
use super::timeline::TimelineId;
use crate::error::{StructuralError, ValidationError};
use crate::renderers::midi::defaults::{
    DEFAULT_ATTACK_VELOCITY, DEFAULT_RELEASE_VELOCITY, MAX_DATA_VALUE,
};

/// A pitched note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    number: u8,
    quarter_length: QuarterLength,
    attack_velocity: u8,
    release_velocity: u8,
    lyric: Option<String>,
}

impl Note {
    /// Create a note from a MIDI note number (0-127)
    pub fn new(number: i64, quarter_length: QuarterLength) -> Result<Self, ValidationError> {
        if !(0..=MAX_DATA_VALUE as i64).contains(&number) {
            return Err(ValidationError::Pitch(number));
        }
        Ok(Note {
            number: number as u8,
            quarter_length,
            attack_velocity: DEFAULT_ATTACK_VELOCITY,
            release_velocity: DEFAULT_RELEASE_VELOCITY,
            lyric: None,
        })
    }

    /// Quarter-note long note
    pub fn quarter(number: i64) -> Result<Self, ValidationError> {
        Self::new(number, QuarterLength::QUARTER)
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn quarter_length(&self) -> QuarterLength {
        self.quarter_length
    }

    pub fn set_quarter_length(&mut self, quarter_length: QuarterLength) {
        self.quarter_length = quarter_length;
    }

    pub fn attack_velocity(&self) -> u8 {
        self.attack_velocity
    }

    pub fn set_attack_velocity(&mut self, velocity: i64) -> Result<(), ValidationError> {
        self.attack_velocity = validate_velocity(velocity)?;
        Ok(())
    }

    pub fn release_velocity(&self) -> u8 {
        self.release_velocity
    }

    pub fn set_release_velocity(&mut self, velocity: i64) -> Result<(), ValidationError> {
        self.release_velocity = validate_velocity(velocity)?;
        Ok(())
    }

    pub fn lyric(&self) -> Option<&str> {
        self.lyric.as_deref()
    }

    pub fn set_lyric(&mut self, lyric: impl Into<String>) {
        self.lyric = Some(lyric.into());
    }
}

/// Silence of a given length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rest {
    quarter_length: QuarterLength,
}

impl Rest {
    pub fn new(quarter_length: QuarterLength) -> Self {
        Rest { quarter_length }
    }

    pub fn quarter_length(&self) -> QuarterLength {
        self.quarter_length
    }

    pub fn set_quarter_length(&mut self, quarter_length: QuarterLength) {
        self.quarter_length = quarter_length;
    }

    pub fn attack_velocity(&self) -> u8 {
        0
    }

    pub fn release_velocity(&self) -> u8 {
        0
    }
}

/// Notes sounding together, all with the chord's duration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    notes: Vec<Note>,
    quarter_length: QuarterLength,
    lyric: Option<String>,
}

impl Chord {
    pub fn new(quarter_length: QuarterLength) -> Self {
        Chord {
            notes: Vec::new(),
            quarter_length,
            lyric: None,
        }
    }

    /// Build a chord from note numbers, e.g. `[60, 64, 67]`
    pub fn from_numbers(numbers: &[i64], quarter_length: QuarterLength) -> crate::error::Result<Self> {
        let mut chord = Chord::new(quarter_length);
        for &number in numbers {
            chord.add_note(Note::new(number, quarter_length)?)?;
        }
        Ok(chord)
    }

    /// Add a note; its duration is replaced by the chord's
    pub fn add_note(&mut self, mut note: Note) -> Result<(), StructuralError> {
        if self.notes.iter().any(|n| n.number == note.number) {
            return Err(StructuralError::DuplicateChordNote(note.number));
        }
        note.quarter_length = self.quarter_length;
        self.notes.push(note);
        Ok(())
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note_numbers(&self) -> Vec<u8> {
        self.notes.iter().map(|n| n.number).collect()
    }

    pub fn quarter_length(&self) -> QuarterLength {
        self.quarter_length
    }

    pub fn set_quarter_length(&mut self, quarter_length: QuarterLength) {
        self.quarter_length = quarter_length;
        for note in &mut self.notes {
            note.quarter_length = quarter_length;
        }
    }

    pub fn set_attack_velocities(&mut self, velocity: i64) -> Result<(), ValidationError> {
        let velocity = validate_velocity(velocity)?;
        for note in &mut self.notes {
            note.attack_velocity = velocity;
        }
        Ok(())
    }

    pub fn set_release_velocities(&mut self, velocity: i64) -> Result<(), ValidationError> {
        let velocity = validate_velocity(velocity)?;
        for note in &mut self.notes {
            note.release_velocity = velocity;
        }
        Ok(())
    }

    pub fn lyric(&self) -> Option<&str> {
        self.lyric.as_deref()
    }

    pub fn set_lyric(&mut self, lyric: impl Into<String>) {
        self.lyric = Some(lyric.into());
    }
}

/// Value of a message parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl ParamValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ParamValue::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Bytes(b) => write!(f, "{:?}", b),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<u8> for ParamValue {
    fn from(v: u8) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(v: Vec<u8>) -> Self {
        ParamValue::Bytes(v)
    }
}

/// Generic control or meta message, e.g. `control_change` or `marker`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    message_type: String,
    parameters: BTreeMap<String, ParamValue>,
}

impl Message {
    /// Create a message; parameters of known channel messages are range checked
    pub fn new(
        message_type: impl Into<String>,
        parameters: BTreeMap<String, ParamValue>,
    ) -> Result<Self, ValidationError> {
        let message = Message {
            message_type: message_type.into(),
            parameters,
        };
        message.validate()?;
        Ok(message)
    }

    /// Convenience constructor taking `(name, value)` pairs
    pub fn with_params<I, K, V>(message_type: &str, params: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let parameters = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(message_type, parameters)
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn parameters(&self) -> &BTreeMap<String, ParamValue> {
        &self.parameters
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name)
    }

    /// Integer parameter, falling back to `default` when absent
    pub fn int_param(&self, name: &str, default: i64) -> i64 {
        self.param(name).and_then(ParamValue::as_int).unwrap_or(default)
    }

    /// Text parameter, empty when absent
    pub fn text_param(&self, name: &str) -> &str {
        self.param(name).and_then(ParamValue::as_text).unwrap_or("")
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.check_range("time", 0, 0x0FFF_FFFF)?;
        match self.message_type.as_str() {
            "control_change" => {
                let control = self.required_int("control")?;
                let value = self.required_int("value")?;
                let ctrl = controller(control).ok_or(ValidationError::Control(control))?;
                if !ctrl.values.accepts(value) {
                    return Err(ValidationError::ControlValue {
                        control: ctrl.number,
                        value,
                    });
                }
                self.check_range("channel", 0, 15)
            }
            "note_on" | "note_off" => {
                self.check_range("note", 0, 127)?;
                self.check_range("velocity", 0, 127)?;
                self.check_range("channel", 0, 15)
            }
            "polytouch" => {
                self.check_range("note", 0, 127)?;
                self.check_range("value", 0, 127)?;
                self.check_range("channel", 0, 15)
            }
            "program_change" => {
                self.check_range("program", 0, 127)?;
                self.check_range("channel", 0, 15)
            }
            "aftertouch" => {
                self.check_range("value", 0, 127)?;
                self.check_range("channel", 0, 15)
            }
            "pitchwheel" => {
                self.check_range("pitch", -8192, 8191)?;
                self.check_range("channel", 0, 15)
            }
            "sysex" => match self.param("data") {
                None => Ok(()),
                Some(ParamValue::Bytes(data)) if data.iter().all(|b| *b <= MAX_DATA_VALUE) => Ok(()),
                Some(other) => Err(self.invalid("data", other)),
            },
            "set_tempo" => self.check_range("tempo", 0, 0xFF_FFFF),
            "key_signature" => match self.param("key") {
                None => Ok(()),
                Some(ParamValue::Text(key)) if key.parse::<KeySignature>().is_ok() => Ok(()),
                Some(other) => Err(self.invalid("key", other)),
            },
            "time_signature" => {
                self.check_range("numerator", 1, 255)?;
                match self.param("denominator") {
                    None => Ok(()),
                    Some(ParamValue::Int(d)) if *d > 0 && *d <= 128 && (*d as u32).is_power_of_two() => Ok(()),
                    Some(other) => Err(self.invalid("denominator", other)),
                }
            }
            _ => Ok(()),
        }
    }

    fn required_int(&self, name: &str) -> Result<i64, ValidationError> {
        match self.param(name) {
            None => Err(ValidationError::MissingParameter {
                message_type: self.message_type.clone(),
                parameter: name.to_string(),
            }),
            Some(ParamValue::Int(v)) => Ok(*v),
            Some(other) => Err(self.invalid(name, other)),
        }
    }

    fn check_range(&self, name: &str, lo: i64, hi: i64) -> Result<(), ValidationError> {
        match self.param(name) {
            None => Ok(()),
            Some(ParamValue::Int(v)) if (lo..=hi).contains(v) => Ok(()),
            Some(other) => Err(self.invalid(name, other)),
        }
    }

    fn invalid(&self, name: &str, value: &ParamValue) -> ValidationError {
        ValidationError::Parameter {
            message_type: self.message_type.clone(),
            parameter: name.to_string(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message_type)?;
        for (k, v) in &self.parameters {
            write!(f, " {}={}", k, v)?;
        }
        Ok(())
    }
}

/// The four kinds of timeline unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Note(Note),
    Rest(Rest),
    Chord(Chord),
    Message(Message),
}

/// One unit of a timeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    kind: EventKind,
    owner: Option<TimelineId>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Event { kind, owner: None }
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn into_kind(self) -> EventKind {
        self.kind
    }

    /// Timeline this event is linked into, if any
    pub fn owner(&self) -> Option<TimelineId> {
        self.owner
    }

    pub fn is_linked(&self) -> bool {
        self.owner.is_some()
    }

    pub(crate) fn link(&mut self, owner: TimelineId) {
        self.owner = Some(owner);
    }

    /// Unlinked copy of this event
    pub fn detached(&self) -> Event {
        Event::new(self.kind.clone())
    }

    /// Time this event occupies; messages take no time
    pub fn quarter_length(&self) -> QuarterLength {
        match &self.kind {
            EventKind::Note(n) => n.quarter_length(),
            EventKind::Rest(r) => r.quarter_length(),
            EventKind::Chord(c) => c.quarter_length(),
            EventKind::Message(_) => QuarterLength::ZERO,
        }
    }

    /// Durations of every sounding unit, used to pick the tick rate
    pub fn durations(&self) -> Vec<QuarterLength> {
        match &self.kind {
            EventKind::Note(n) => vec![n.quarter_length()],
            EventKind::Rest(r) => vec![r.quarter_length()],
            EventKind::Chord(c) if c.notes().is_empty() => vec![c.quarter_length()],
            EventKind::Chord(c) => c.notes().iter().map(Note::quarter_length).collect(),
            EventKind::Message(_) => Vec::new(),
        }
    }

    pub fn lyric(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Note(n) => n.lyric(),
            EventKind::Chord(c) => c.lyric(),
            EventKind::Rest(_) | EventKind::Message(_) => None,
        }
    }

    /// Set the lyric of a note or chord; ignored for rests and messages
    pub fn set_lyric(&mut self, lyric: impl Into<String>) {
        match &mut self.kind {
            EventKind::Note(n) => n.set_lyric(lyric),
            EventKind::Chord(c) => c.set_lyric(lyric),
            EventKind::Rest(_) | EventKind::Message(_) => {}
        }
    }

    /// Set the attack velocity of a note or of every chord note
    ///
    /// Rest velocities are fixed at zero and messages have none.
    pub fn set_attack_velocity(&mut self, velocity: i64) -> Result<(), ValidationError> {
        match &mut self.kind {
            EventKind::Note(n) => n.set_attack_velocity(velocity),
            EventKind::Chord(c) => c.set_attack_velocities(velocity),
            EventKind::Rest(_) | EventKind::Message(_) => validate_velocity(velocity).map(|_| ()),
        }
    }

    pub fn set_release_velocity(&mut self, velocity: i64) -> Result<(), ValidationError> {
        match &mut self.kind {
            EventKind::Note(n) => n.set_release_velocity(velocity),
            EventKind::Chord(c) => c.set_release_velocities(velocity),
            EventKind::Rest(_) | EventKind::Message(_) => validate_velocity(velocity).map(|_| ()),
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self.kind, EventKind::Rest(_))
    }
}

impl From<Note> for Event {
    fn from(note: Note) -> Self {
        Event::new(EventKind::Note(note))
    }
}

impl From<Rest> for Event {
    fn from(rest: Rest) -> Self {
        Event::new(EventKind::Rest(rest))
    }
}

impl From<Chord> for Event {
    fn from(chord: Chord) -> Self {
        Event::new(EventKind::Chord(chord))
    }
}

impl From<Message> for Event {
    fn from(message: Message) -> Self {
        Event::new(EventKind::Message(message))
    }
}
