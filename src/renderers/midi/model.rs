//! Lean output representation for score → MIDI emission
//!
//! Each track is a flat list of events with delta times in ticks. It holds
//! exactly what the SMF writer needs, with raw (unencoded) values: time
//! signatures keep their denominator, tempos are microseconds per beat.

use std::collections::BTreeMap;

use crate::models::ParamValue;

#[derive(Debug, Clone, PartialEq)]
pub struct MidiFile {
    pub ticks_per_beat: u16,    // Ticks per quarter note
    pub tracks: Vec<Track>,     // Track 0 holds the header when present
}

impl MidiFile {
    pub fn new(ticks_per_beat: u16) -> Self {
        MidiFile {
            ticks_per_beat,
            tracks: Vec::new(),
        }
    }

    /// Make sure track `index` exists, creating empty tracks up to it
    pub fn create_track_if_none(&mut self, index: usize) -> &mut Track {
        while self.tracks.len() <= index {
            self.tracks.push(Track::default());
        }
        &mut self.tracks[index]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub events: Vec<TimedEvent>,
}

impl Track {
    pub fn push(&mut self, delta: u32, kind: ProtocolEvent) {
        self.events.push(TimedEvent { delta, kind });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sum of all deltas, i.e. the track's length in ticks
    pub fn duration_ticks(&self) -> u64 {
        self.events.iter().map(|e| e.delta as u64).sum()
    }

    pub fn is_terminated(&self) -> bool {
        matches!(
            self.events.last(),
            Some(TimedEvent { kind: ProtocolEvent::Meta(MetaEvent::EndOfTrack), .. })
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    pub delta: u32,     // Ticks since the previous event on the track
    pub kind: ProtocolEvent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolEvent {
    Channel { channel: u8, message: ChannelMessage },
    Meta(MetaEvent),
    SysEx(Vec<u8>),     // Payload without the F0/F7 framing
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMessage {
    NoteOn { key: u8, vel: u8 },
    NoteOff { key: u8, vel: u8 },
    PolyTouch { key: u8, value: u8 },
    ControlChange { control: u8, value: u8 },
    ProgramChange { program: u8 },
    Aftertouch { value: u8 },
    PitchWheel { value: i16 },  // -8192..=8191
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetaEvent {
    Copyright(String),
    TrackName(String),
    InstrumentName(String),
    Lyric(String),
    Text(String),
    Marker(String),
    Tempo(u32),                 // Microseconds per quarter note
    TimeSignature { numerator: u8, denominator: u8 },
    KeySignature { sharps: i8, minor: bool, name: String },
    /// Message type the protocol has no event for, kept as free text
    FreeForm { message_type: String, parameters: BTreeMap<String, ParamValue> },
    EndOfTrack,
}

impl ProtocolEvent {
    pub fn note_on(channel: u8, key: u8, vel: u8) -> Self {
        ProtocolEvent::Channel {
            channel,
            message: ChannelMessage::NoteOn { key, vel },
        }
    }

    pub fn note_off(channel: u8, key: u8, vel: u8) -> Self {
        ProtocolEvent::Channel {
            channel,
            message: ChannelMessage::NoteOff { key, vel },
        }
    }

    pub fn program_change(channel: u8, program: u8) -> Self {
        ProtocolEvent::Channel {
            channel,
            message: ChannelMessage::ProgramChange { program },
        }
    }

    /// Protocol type name, matching the message type tags accepted on input
    pub fn type_name(&self) -> &str {
        match self {
            ProtocolEvent::Channel { message, .. } => match message {
                ChannelMessage::NoteOn { .. } => "note_on",
                ChannelMessage::NoteOff { .. } => "note_off",
                ChannelMessage::PolyTouch { .. } => "polytouch",
                ChannelMessage::ControlChange { .. } => "control_change",
                ChannelMessage::ProgramChange { .. } => "program_change",
                ChannelMessage::Aftertouch { .. } => "aftertouch",
                ChannelMessage::PitchWheel { .. } => "pitchwheel",
            },
            ProtocolEvent::SysEx(_) => "sysex",
            ProtocolEvent::Meta(meta) => match meta {
                MetaEvent::Copyright(_) => "copyright",
                MetaEvent::TrackName(_) => "track_name",
                MetaEvent::InstrumentName(_) => "instrument_name",
                MetaEvent::Lyric(_) => "lyrics",
                MetaEvent::Text(_) => "text",
                MetaEvent::Marker(_) => "marker",
                MetaEvent::Tempo(_) => "set_tempo",
                MetaEvent::TimeSignature { .. } => "time_signature",
                MetaEvent::KeySignature { .. } => "key_signature",
                MetaEvent::FreeForm { message_type, .. } => message_type,
                MetaEvent::EndOfTrack => "end_of_track",
            },
        }
    }

    /// Note number for note on/off events
    pub fn note(&self) -> Option<u8> {
        match self {
            ProtocolEvent::Channel {
                message: ChannelMessage::NoteOn { key, .. } | ChannelMessage::NoteOff { key, .. },
                ..
            } => Some(*key),
            _ => None,
        }
    }

    pub fn channel(&self) -> Option<u8> {
        match self {
            ProtocolEvent::Channel { channel, .. } => Some(*channel),
            _ => None,
        }
    }
}
