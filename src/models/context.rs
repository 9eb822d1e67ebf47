//! Playback context attached to clefs, staves and scores
//!
//! A [`Context`] is a plain value. It is copied onto a child at the moment
//! the child is attached, so later changes to the parent never reach
//! children that are already attached.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, ValidationError};
use crate::renderers::midi::defaults::{
    DEFAULT_ATTACK_VELOCITY, DEFAULT_INSTRUMENT_NAME, DEFAULT_PROGRAM, DEFAULT_RELEASE_VELOCITY,
    DEFAULT_TEMPO_BPM, DEFAULT_VOLUME, MAX_DATA_VALUE, MAX_PERCUSSION_PROGRAM, MAX_PROGRAM,
    MAX_TEMPO_BPM, MIN_PERCUSSION_PROGRAM, MIN_TEMPO_BPM,
};

/// Check a 7-bit velocity value
pub fn validate_velocity(velocity: i64) -> Result<u8, ValidationError> {
    if (0..=MAX_DATA_VALUE as i64).contains(&velocity) {
        Ok(velocity as u8)
    } else {
        Err(ValidationError::Velocity(velocity))
    }
}

/// Time signature such as 3/4 or 6/8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSignature {
    numerator: u8,
    denominator: u8,
}

impl TimeSignature {
    /// Create a time signature; the denominator must be a power of two
    pub fn new(numerator: u8, denominator: u8) -> Result<Self, ConfigurationError> {
        if numerator == 0 || denominator == 0 || !denominator.is_power_of_two() {
            return Err(ConfigurationError::TimeSignature(format!(
                "{}/{}",
                numerator, denominator
            )));
        }
        Ok(TimeSignature {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> u8 {
        self.numerator
    }

    pub fn denominator(&self) -> u8 {
        self.denominator
    }

    /// Number of quarter notes in one measure (3/4 → 3.0, 6/8 → 3.0)
    pub fn quarters_per_measure(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64 * 4.0
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature {
            numerator: 4,
            denominator: 4,
        }
    }
}

impl FromStr for TimeSignature {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigurationError::TimeSignature(value.to_string());
        let (num, den) = value.split_once('/').ok_or_else(invalid)?;
        if num.is_empty()
            || den.is_empty()
            || !num.bytes().all(|b| b.is_ascii_digit())
            || !den.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let numerator: u8 = num.parse().map_err(|_| invalid())?;
        let denominator: u8 = den.parse().map_err(|_| invalid())?;
        TimeSignature::new(numerator, denominator).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeSignature {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSignature> for String {
    fn from(ts: TimeSignature) -> String {
        ts.to_string()
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// A General MIDI instrument or percussion sound
///
/// Program numbers use the 0-128 internal numbering. Percussion instruments
/// carry their drum key number (35-81) instead of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    name: String,
    program: u8,
    is_percussion: bool,
}

impl Instrument {
    pub fn new(
        name: impl Into<String>,
        program: u8,
        is_percussion: bool,
    ) -> Result<Self, ValidationError> {
        if program > MAX_PROGRAM {
            return Err(ValidationError::Program(program as i64));
        }
        if is_percussion && !(MIN_PERCUSSION_PROGRAM..=MAX_PERCUSSION_PROGRAM).contains(&program) {
            return Err(ValidationError::PercussionProgram(program as i64));
        }
        Ok(Instrument {
            name: name.into(),
            program,
            is_percussion,
        })
    }

    /// Melodic instrument shortcut
    pub fn melodic(name: impl Into<String>, program: u8) -> Result<Self, ValidationError> {
        Self::new(name, program, false)
    }

    /// Percussion instrument shortcut
    pub fn percussion(name: impl Into<String>, key: u8) -> Result<Self, ValidationError> {
        Self::new(name, key, true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> u8 {
        self.program
    }

    pub fn is_percussion(&self) -> bool {
        self.is_percussion
    }

    /// Program number as written to a program-change event (0-127)
    ///
    /// Internal numbers are offset by one; percussion always selects kit 0.
    /// Internal 0 ("Grand Piano") is an alias of internal 1 ("Acoustic
    /// Grand Piano"), so both select General MIDI program 0.
    pub fn midi_program(&self) -> u8 {
        if self.is_percussion {
            0
        } else {
            self.program.saturating_sub(1)
        }
    }
}

impl Default for Instrument {
    fn default() -> Self {
        Instrument {
            name: DEFAULT_INSTRUMENT_NAME.to_string(),
            program: DEFAULT_PROGRAM,
            is_percussion: false,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Accidental on the tonic of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

/// Key signature as produced by the scale/key collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeySignature {
    letter: char,
    accidental: Accidental,
    minor: bool,
}

impl KeySignature {
    pub fn new(letter: char, accidental: Accidental, minor: bool) -> Result<Self, ConfigurationError> {
        let letter = letter.to_ascii_uppercase();
        if !('A'..='G').contains(&letter) {
            return Err(ConfigurationError::KeySignature(letter.to_string()));
        }
        let key = KeySignature {
            letter,
            accidental,
            minor,
        };
        if !(-7..=7).contains(&key.sharps()) {
            return Err(ConfigurationError::KeySignature(key.midi_name()));
        }
        Ok(key)
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    pub fn accidental(&self) -> Accidental {
        self.accidental
    }

    pub fn is_minor(&self) -> bool {
        self.minor
    }

    /// Key name in the "C#m" form: letter, optional '#'/'b', optional 'm'
    pub fn midi_name(&self) -> String {
        let mut name = self.letter.to_string();
        match self.accidental {
            Accidental::Sharp => name.push('#'),
            Accidental::Flat => name.push('b'),
            Accidental::Natural => {}
        }
        if self.minor {
            name.push('m');
        }
        name
    }

    /// Sharps (positive) or flats (negative) in the signature
    pub fn sharps(&self) -> i8 {
        // Position of each natural major key on the circle of fifths
        let natural: i8 = match self.letter {
            'C' => 0,
            'G' => 1,
            'D' => 2,
            'A' => 3,
            'E' => 4,
            'B' => 5,
            'F' => -1,
            _ => 0,
        };
        let shifted = match self.accidental {
            Accidental::Natural => natural,
            Accidental::Sharp => natural + 7,
            Accidental::Flat => natural - 7,
        };
        if self.minor {
            shifted - 3
        } else {
            shifted
        }
    }
}

impl FromStr for KeySignature {
    type Err = ConfigurationError;

    /// Parse "C", "F#", "Bb", "a" (lowercase = minor), "Ebm"
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigurationError::KeySignature(value.to_string());
        let mut chars = value.chars();
        let first = chars.next().ok_or_else(invalid)?;
        let mut minor = first.is_ascii_lowercase();
        let mut accidental = Accidental::Natural;
        for c in chars {
            match c {
                '#' if accidental == Accidental::Natural => accidental = Accidental::Sharp,
                'b' | '-' if accidental == Accidental::Natural => accidental = Accidental::Flat,
                'm' if !minor => minor = true,
                _ => return Err(invalid()),
            }
        }
        KeySignature::new(first, accidental, minor).map_err(|_| invalid())
    }
}

impl TryFrom<String> for KeySignature {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeySignature> for String {
    fn from(key: KeySignature) -> String {
        key.midi_name()
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.midi_name())
    }
}

/// Tempo, meter, instrument and velocity defaults for a timeline
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    time_signature: TimeSignature,
    tempo: u32,
    volume: u8,
    instrument: Instrument,
    attack_velocity: u8,
    release_velocity: u8,
}

impl Context {
    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    pub fn set_time_signature(&mut self, time_signature: TimeSignature) {
        self.time_signature = time_signature;
    }

    /// Beats per minute
    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    pub fn set_tempo(&mut self, tempo: i64) -> Result<(), ValidationError> {
        if !(MIN_TEMPO_BPM as i64..=MAX_TEMPO_BPM as i64).contains(&tempo) {
            return Err(ValidationError::Tempo(tempo, MIN_TEMPO_BPM, MAX_TEMPO_BPM));
        }
        self.tempo = tempo as u32;
        Ok(())
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: i64) -> Result<(), ValidationError> {
        if !(0..=MAX_DATA_VALUE as i64).contains(&volume) {
            return Err(ValidationError::Volume(volume));
        }
        self.volume = volume as u8;
        Ok(())
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn set_instrument(&mut self, instrument: Instrument) {
        self.instrument = instrument;
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

    /// Copy everything a child inherits from its parent
    ///
    /// The instrument is not inherited; each clef keeps its own.
    pub fn inherit_from(&mut self, parent: &Context) {
        self.time_signature = parent.time_signature;
        self.tempo = parent.tempo;
        self.volume = parent.volume;
        self.attack_velocity = parent.attack_velocity;
        self.release_velocity = parent.release_velocity;
    }

    /// Microseconds per quarter note for the tempo meta event
    pub fn microseconds_per_beat(&self) -> u32 {
        60_000_000 / self.tempo
    }
}

impl Default for Context {
    fn default() -> Self {
        Context {
            time_signature: TimeSignature::default(),
            tempo: DEFAULT_TEMPO_BPM,
            volume: DEFAULT_VOLUME,
            instrument: Instrument::default(),
            attack_velocity: DEFAULT_ATTACK_VELOCITY,
            release_velocity: DEFAULT_RELEASE_VELOCITY,
        }
    }
}
