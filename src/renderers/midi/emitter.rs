//! Score → MIDI event stream
//!
//! Walks Score → Staff → Clef → Timeline and produces one track per clef,
//! preceded by a header track when a whole score is emitted.
//!
//! # Event translation
//! - Note: optional lyric, note on (delay 0), note off after the note's length
//! - Chord: optional lyric, every note on, then every note off; only the
//!   first note off carries the chord's length
//! - Rest: nothing is written, its length is added to the delay of the next
//!   event on the track (or to the end-of-track marker)
//! - Message: one protocol event, free-form meta text for unknown types
//!
//! One ticks-per-beat value is resolved per emission from every duration
//! involved, so all tracks of a file share it.

use super::channel::resolve_channel;
use super::defaults::{DEFAULT_MESSAGE_TEMPO, DEFAULT_MESSAGE_VELOCITY};
use super::model::{ChannelMessage, MetaEvent, MidiFile, ProtocolEvent, Track};
use super::tick_rate::resolve_ticks_per_beat;
use crate::config::EmitSettings;
use crate::error::Result;
use crate::models::{Clef, Event, EventKind, KeySignature, Message, QuarterLength, Score, Staff};

/// Anything that can be turned into a MIDI file on its own
pub trait Emit {
    /// Every duration that will be converted to ticks
    fn durations(&self) -> Vec<QuarterLength>;

    /// Write this object's tracks into `emitter`
    fn emit_into(&self, emitter: &mut Emitter, settings: &EmitSettings);
}

/// Emit with default settings
pub fn emit<T: Emit + ?Sized>(item: &T) -> Result<MidiFile> {
    emit_with(item, &EmitSettings::default())
}

pub fn emit_with<T: Emit + ?Sized>(item: &T, settings: &EmitSettings) -> Result<MidiFile> {
    let ticks_per_beat = resolve_ticks_per_beat(item.durations(), settings.min_ticks_per_beat)?;
    let mut emitter = Emitter::new(ticks_per_beat);
    item.emit_into(&mut emitter, settings);
    Ok(emitter.finish(settings.end_of_track))
}

/// Track builder at a fixed ticks-per-beat
///
/// Tracks are created on demand; writing to track `k` first creates any
/// missing tracks below it.
#[derive(Debug)]
pub struct Emitter {
    file: MidiFile,
    pending: Vec<u32>,  // Rest time not yet attached to an event, per track
}

impl Emitter {
    pub fn new(ticks_per_beat: u16) -> Self {
        Emitter {
            file: MidiFile::new(ticks_per_beat),
            pending: Vec::new(),
        }
    }

    pub fn ticks_per_beat(&self) -> u16 {
        self.file.ticks_per_beat
    }

    pub fn track_count(&self) -> usize {
        self.file.tracks.len()
    }

    pub fn create_track_if_none(&mut self, index: usize) -> &mut Track {
        if self.pending.len() <= index {
            self.pending.resize(index + 1, 0);
        }
        self.file.create_track_if_none(index)
    }

    /// Translate one timeline event onto `track`
    pub fn add_event(&mut self, event: &Event, track: usize, channel: u8) {
        match event.kind() {
            EventKind::Note(note) => {
                if let Some(lyric) = note.lyric() {
                    self.push(track, 0, ProtocolEvent::Meta(MetaEvent::Lyric(lyric.to_string())));
                }
                let length = self.ticks(note.quarter_length());
                self.push(
                    track,
                    0,
                    ProtocolEvent::note_on(channel, note.number(), note.attack_velocity()),
                );
                self.push(
                    track,
                    length,
                    ProtocolEvent::note_off(channel, note.number(), note.release_velocity()),
                );
            }
            EventKind::Rest(rest) => self.advance(track, rest.quarter_length()),
            EventKind::Chord(chord) if chord.notes().is_empty() => {
                self.advance(track, chord.quarter_length())
            }
            EventKind::Chord(chord) => {
                if let Some(lyric) = chord.lyric() {
                    self.push(track, 0, ProtocolEvent::Meta(MetaEvent::Lyric(lyric.to_string())));
                }
                for note in chord.notes() {
                    self.push(
                        track,
                        0,
                        ProtocolEvent::note_on(channel, note.number(), note.attack_velocity()),
                    );
                }
                let length = self.ticks(chord.quarter_length());
                for (i, note) in chord.notes().iter().enumerate() {
                    let delta = if i == 0 { length } else { 0 };
                    self.push(
                        track,
                        delta,
                        ProtocolEvent::note_off(channel, note.number(), note.release_velocity()),
                    );
                }
            }
            EventKind::Message(message) => {
                let (delta, kind) = translate_message(message, channel);
                self.push(track, delta, kind);
            }
        }
    }

    /// Pass a message through onto `track`; channel messages without a
    /// `channel` parameter go to channel 0
    pub fn add_message(&mut self, message: &Message, track: usize) {
        let (delta, kind) = translate_message(message, 0);
        self.push(track, delta, kind);
    }

    /// Program change followed by the clef's events
    pub fn add_clef(&mut self, clef: &Clef, track: usize, channel: usize) {
        let instrument = clef.instrument();
        let channel = resolve_channel(channel, instrument);
        log::debug!(
            "Clef {} ({}) → track {}, channel {}",
            clef.kind(),
            instrument.name(),
            track,
            channel
        );
        self.push(
            track,
            0,
            ProtocolEvent::program_change(channel, instrument.midi_program()),
        );
        for event in clef.timeline() {
            self.add_event(event, track, channel);
        }
    }

    /// One track per clef, starting at `initial_track`; each clef asks for
    /// the channel matching its track index
    pub fn add_staff(&mut self, staff: &Staff, initial_track: usize) {
        for (i, clef) in staff.clefs().iter().enumerate() {
            let track = initial_track + i;
            self.add_clef(clef, track, track);
        }
    }

    /// Score-level meta events, all at delay 0
    pub fn add_header(&mut self, score: &Score, track: usize) {
        let context = score.context();
        let metadata = score.metadata();

        if let Some(copyright) = &metadata.copyright {
            self.push(track, 0, ProtocolEvent::Meta(MetaEvent::Copyright(copyright.clone())));
        }
        let time_signature = context.time_signature();
        self.push(
            track,
            0,
            ProtocolEvent::Meta(MetaEvent::TimeSignature {
                numerator: time_signature.numerator(),
                denominator: time_signature.denominator(),
            }),
        );
        if let Some(key) = &metadata.key_signature {
            self.push(track, 0, ProtocolEvent::Meta(key_signature_event(key)));
        }

        let instrument = context.instrument();
        self.push(
            track,
            0,
            ProtocolEvent::Meta(MetaEvent::InstrumentName(instrument.name().to_string())),
        );
        self.push(
            track,
            0,
            ProtocolEvent::program_change(resolve_channel(0, instrument), instrument.midi_program()),
        );
        self.push(
            track,
            0,
            ProtocolEvent::Meta(MetaEvent::TrackName(instrument.name().to_string())),
        );
        self.push(track, 0, ProtocolEvent::Meta(MetaEvent::Tempo(context.microseconds_per_beat())));
    }

    /// Close every track and hand back the file
    ///
    /// Rest time still waiting on a track is carried by its marker.
    pub fn finish(mut self, end_of_track: bool) -> MidiFile {
        if end_of_track {
            for index in 0..self.file.tracks.len() {
                if !self.file.tracks[index].is_terminated() || self.pending[index] > 0 {
                    self.push(index, 0, ProtocolEvent::Meta(MetaEvent::EndOfTrack));
                }
            }
        }
        self.file
    }

    /// Append to `track`; an end-of-track marker only stays while it is
    /// the last event, so an earlier one is dropped and its delay carried
    fn push(&mut self, track: usize, delta: u32, kind: ProtocolEvent) {
        self.create_track_if_none(track);
        if self.file.tracks[track].is_terminated() {
            if let Some(marker) = self.file.tracks[track].events.pop() {
                log::debug!("Moving end of track {} past a later event", track);
                self.pending[track] = self.pending[track].saturating_add(marker.delta);
            }
        }
        let waiting = std::mem::take(&mut self.pending[track]);
        self.file.tracks[track].push(waiting.saturating_add(delta), kind);
    }

    fn advance(&mut self, track: usize, quarter_length: QuarterLength) {
        let ticks = self.ticks(quarter_length);
        self.create_track_if_none(track);
        self.pending[track] = self.pending[track].saturating_add(ticks);
    }

    fn ticks(&self, quarter_length: QuarterLength) -> u32 {
        let ticks = quarter_length.to_ticks(u32::from(self.file.ticks_per_beat));
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }
}

fn key_signature_event(key: &KeySignature) -> MetaEvent {
    MetaEvent::KeySignature {
        sharps: key.sharps(),
        minor: key.is_minor(),
        name: key.midi_name(),
    }
}

/// Map a message to a protocol event and its delay (`time` parameter)
///
/// Parameters were range checked when the message was built, so narrowing
/// casts here cannot lose data.
fn translate_message(message: &Message, default_channel: u8) -> (u32, ProtocolEvent) {
    let delay = message.int_param("time", 0) as u32;
    let channel = message.int_param("channel", i64::from(default_channel)) as u8;
    let byte = |name: &str, default: u8| message.int_param(name, i64::from(default)) as u8;
    let text = |name: &str| message.text_param(name).to_string();

    let channel_event = |message: ChannelMessage| ProtocolEvent::Channel { channel, message };
    let kind = match message.message_type() {
        "note_on" => channel_event(ChannelMessage::NoteOn {
            key: byte("note", 0),
            vel: byte("velocity", DEFAULT_MESSAGE_VELOCITY),
        }),
        "note_off" => channel_event(ChannelMessage::NoteOff {
            key: byte("note", 0),
            vel: byte("velocity", DEFAULT_MESSAGE_VELOCITY),
        }),
        "polytouch" => channel_event(ChannelMessage::PolyTouch {
            key: byte("note", 0),
            value: byte("value", 0),
        }),
        "control_change" => channel_event(ChannelMessage::ControlChange {
            control: byte("control", 0),
            value: byte("value", 0),
        }),
        "program_change" => channel_event(ChannelMessage::ProgramChange {
            program: byte("program", 0),
        }),
        "aftertouch" => channel_event(ChannelMessage::Aftertouch {
            value: byte("value", 0),
        }),
        "pitchwheel" => channel_event(ChannelMessage::PitchWheel {
            value: message.int_param("pitch", 0) as i16,
        }),
        "sysex" => ProtocolEvent::SysEx(
            message
                .param("data")
                .and_then(|data| data.as_bytes())
                .map(<[u8]>::to_vec)
                .unwrap_or_default(),
        ),
        "copyright" => ProtocolEvent::Meta(MetaEvent::Copyright(text("text"))),
        "track_name" => ProtocolEvent::Meta(MetaEvent::TrackName(text("name"))),
        "instrument_name" => ProtocolEvent::Meta(MetaEvent::InstrumentName(text("name"))),
        "lyrics" => ProtocolEvent::Meta(MetaEvent::Lyric(text("text"))),
        "text" => ProtocolEvent::Meta(MetaEvent::Text(text("text"))),
        "marker" => ProtocolEvent::Meta(MetaEvent::Marker(text("text"))),
        "set_tempo" => ProtocolEvent::Meta(MetaEvent::Tempo(
            message.int_param("tempo", i64::from(DEFAULT_MESSAGE_TEMPO)) as u32,
        )),
        "time_signature" => ProtocolEvent::Meta(MetaEvent::TimeSignature {
            numerator: byte("numerator", 4),
            denominator: byte("denominator", 4),
        }),
        "key_signature" => {
            let name = match message.text_param("key") {
                "" => "C",
                key => key,
            };
            match name.parse::<KeySignature>() {
                Ok(key) => ProtocolEvent::Meta(key_signature_event(&key)),
                Err(_) => free_form(message),
            }
        }
        "end_of_track" => ProtocolEvent::Meta(MetaEvent::EndOfTrack),
        _ => free_form(message),
    };
    (delay, kind)
}

fn free_form(message: &Message) -> ProtocolEvent {
    ProtocolEvent::Meta(MetaEvent::FreeForm {
        message_type: message.message_type().to_string(),
        parameters: message.parameters().clone(),
    })
}

fn clef_durations(clef: &Clef) -> impl Iterator<Item = QuarterLength> + '_ {
    clef.timeline().iter().flat_map(Event::durations)
}

impl Emit for Event {
    fn durations(&self) -> Vec<QuarterLength> {
        Event::durations(self)
    }

    fn emit_into(&self, emitter: &mut Emitter, _settings: &EmitSettings) {
        emitter.add_event(self, 0, 0);
    }
}

impl Emit for Clef {
    fn durations(&self) -> Vec<QuarterLength> {
        clef_durations(self).collect()
    }

    fn emit_into(&self, emitter: &mut Emitter, _settings: &EmitSettings) {
        emitter.add_clef(self, 0, 0);
    }
}

impl Emit for Staff {
    fn durations(&self) -> Vec<QuarterLength> {
        self.clefs().iter().flat_map(clef_durations).collect()
    }

    fn emit_into(&self, emitter: &mut Emitter, _settings: &EmitSettings) {
        emitter.add_staff(self, 0);
    }
}

impl Emit for Score {
    fn durations(&self) -> Vec<QuarterLength> {
        self.staves()
            .iter()
            .flat_map(|staff| staff.clefs().iter())
            .flat_map(clef_durations)
            .collect()
    }

    fn emit_into(&self, emitter: &mut Emitter, settings: &EmitSettings) {
        if settings.include_header {
            emitter.add_header(self, 0);
        }
        for staff in self.staves() {
            let initial_track = emitter.track_count();
            emitter.add_staff(staff, initial_track);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chord, ClefKind, Instrument, Note, StaffKind};

    fn ql(n: i64, d: i64) -> QuarterLength {
        QuarterLength::new(n, d).unwrap()
    }

    fn deltas(track: &Track) -> Vec<u32> {
        track.events.iter().map(|e| e.delta).collect()
    }

    fn type_names(track: &Track) -> Vec<&str> {
        track.events.iter().map(|e| e.kind.type_name()).collect()
    }

    #[test]
    fn test_chord_note_offs() {
        let mut clef = Clef::new(ClefKind::Treble);
        clef.add_chord(&[60, 64, 67], QuarterLength::QUARTER).unwrap();

        let file = emit(&clef).unwrap();
        assert_eq!(file.ticks_per_beat, 96);
        assert_eq!(file.tracks.len(), 1);

        let track = &file.tracks[0];
        assert_eq!(
            type_names(track),
            vec![
                "program_change",
                "note_on",
                "note_on",
                "note_on",
                "note_off",
                "note_off",
                "note_off",
                "end_of_track"
            ]
        );
        assert_eq!(deltas(track), vec![0, 0, 0, 0, 96, 0, 0, 0]);
        let notes: Vec<u8> = track.events[1..7].iter().filter_map(|e| e.kind.note()).collect();
        assert_eq!(notes, vec![60, 64, 67, 60, 64, 67]);
    }

    #[test]
    fn test_single_note_event() {
        let event = Event::from(Note::new(62, ql(1, 2)).unwrap());
        let file = emit(&event).unwrap();
        let track = &file.tracks[0];
        assert_eq!(type_names(track), vec!["note_on", "note_off", "end_of_track"]);
        assert_eq!(deltas(track), vec![0, 48, 0]);
        assert_eq!(track.events[0].kind, ProtocolEvent::note_on(0, 62, 75));
        assert_eq!(track.events[1].kind, ProtocolEvent::note_off(0, 62, 64));
    }

    #[test]
    fn test_rest_becomes_delay() {
        let mut clef = Clef::new(ClefKind::Treble);
        clef.add_pitch(60, QuarterLength::QUARTER).unwrap();
        clef.add_rest(QuarterLength::whole(2)).unwrap();
        clef.add_pitch(62, QuarterLength::QUARTER).unwrap();
        clef.add_rest(ql(1, 2)).unwrap();

        let file = emit(&clef).unwrap();
        let track = &file.tracks[0];
        assert_eq!(
            type_names(track),
            vec!["program_change", "note_on", "note_off", "note_on", "note_off", "end_of_track"]
        );
        assert_eq!(deltas(track), vec![0, 0, 96, 192, 96, 48]);
        assert_eq!(track.duration_ticks(), 4 * 96 + 48);
    }

    #[test]
    fn test_lyric_precedes_note() {
        let mut note = Note::quarter(60).unwrap();
        note.set_lyric("la");
        let mut chord = Chord::from_numbers(&[48, 52], QuarterLength::QUARTER).unwrap();
        chord.set_lyric("di");

        let mut clef = Clef::new(ClefKind::Treble);
        clef.add_note(note).unwrap();
        clef.add_note(chord).unwrap();

        let file = emit(&clef).unwrap();
        let track = &file.tracks[0];
        assert_eq!(
            track.events[1].kind,
            ProtocolEvent::Meta(MetaEvent::Lyric("la".to_string()))
        );
        assert_eq!(track.events[2].kind.type_name(), "note_on");
        assert_eq!(
            track.events[4].kind,
            ProtocolEvent::Meta(MetaEvent::Lyric("di".to_string()))
        );
        assert_eq!(track.events[4].delta, 0);
    }

    #[test]
    fn test_lazy_track_creation() {
        let mut emitter = Emitter::new(96);
        let note = Event::from(Note::quarter(60).unwrap());
        emitter.add_event(&note, 3, 0);
        assert_eq!(emitter.track_count(), 4);

        let file = emitter.finish(true);
        assert!(file.tracks[..3].iter().all(|t| t.len() == 1 && t.is_terminated()));
        assert_eq!(file.tracks[3].len(), 3);

        let mut emitter = Emitter::new(96);
        emitter.create_track_if_none(2);
        emitter.create_track_if_none(0);
        assert_eq!(emitter.track_count(), 3);
    }

    #[test]
    fn test_percussion_clef_channel() {
        let mut clef = Clef::new(ClefKind::Treble);
        clef.set_instrument(Instrument::percussion("Acoustic Snare", 38).unwrap());
        clef.add_pitch(38, QuarterLength::QUARTER).unwrap();

        let mut emitter = Emitter::new(96);
        emitter.add_clef(&clef, 0, 4);
        let file = emitter.finish(true);
        let track = &file.tracks[0];
        assert_eq!(track.events[0].kind, ProtocolEvent::program_change(9, 0));
        assert!(track.events.iter().filter_map(|e| e.kind.channel()).all(|c| c == 9));
    }

    #[test]
    fn test_program_offset() {
        let mut clef = Clef::new(ClefKind::Treble);
        clef.set_instrument(Instrument::melodic("Violin", 41).unwrap());
        let mut emitter = Emitter::new(96);
        emitter.add_clef(&clef, 0, 2);
        let file = emitter.finish(false);
        assert_eq!(file.tracks[0].events[0].kind, ProtocolEvent::program_change(2, 40));
        assert!(!file.tracks[0].is_terminated());
    }

    #[test]
    fn test_header_order() {
        let mut score = Score::new();
        score.metadata_mut().copyright = Some("(c) 2024".to_string());
        score.add_staff(Staff::new(StaffKind::TrebleStaff));

        let file = emit(&score).unwrap();
        let header = &file.tracks[0];
        assert_eq!(header.len(), 7);
        assert_eq!(
            type_names(header),
            vec![
                "copyright",
                "time_signature",
                "instrument_name",
                "program_change",
                "track_name",
                "set_tempo",
                "end_of_track"
            ]
        );
        assert!(deltas(header).iter().all(|d| *d == 0));
        assert_eq!(header.events[5].kind, ProtocolEvent::Meta(MetaEvent::Tempo(500_000)));
    }

    #[test]
    fn test_header_key_signature() {
        let mut score = Score::new();
        score.metadata_mut().key_signature = Some("Bb".parse().unwrap());
        score.add_staff(Staff::new(StaffKind::TrebleStaff));

        let file = emit(&score).unwrap();
        let header = &file.tracks[0];
        assert_eq!(type_names(header)[..2], ["time_signature", "key_signature"]);
        assert_eq!(
            header.events[1].kind,
            ProtocolEvent::Meta(MetaEvent::KeySignature {
                sharps: -2,
                minor: false,
                name: "Bb".to_string()
            })
        );
    }

    #[test]
    fn test_score_tracks_and_channels() {
        let mut score = Score::new();
        score.add_staff(Staff::new(StaffKind::GreatStaff));
        score.add_staff(Staff::new(StaffKind::BassStaff));

        let file = emit(&score).unwrap();
        assert_eq!(file.tracks.len(), 4);
        let channels: Vec<Option<u8>> = file.tracks[1..]
            .iter()
            .map(|t| t.events[0].kind.channel())
            .collect();
        assert_eq!(channels, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_score_without_header() {
        let mut score = Score::new();
        score.add_staff(Staff::new(StaffKind::GreatStaff));
        let settings = EmitSettings {
            include_header: false,
            ..EmitSettings::default()
        };
        let file = emit_with(&score, &settings).unwrap();
        assert_eq!(file.tracks.len(), 2);
        assert_eq!(file.tracks[0].events[0].kind, ProtocolEvent::program_change(0, 0));
    }

    #[test]
    fn test_shared_tick_rate() {
        let mut staff = Staff::new(StaffKind::GreatStaff);
        staff.clef_mut(0).unwrap().add_pitch(60, ql(1, 3)).unwrap();
        staff.clef_mut(1).unwrap().add_pitch(48, ql(1, 5)).unwrap();

        let file = emit(&staff).unwrap();
        assert_eq!(file.ticks_per_beat, 105);
        assert_eq!(file.tracks[0].duration_ticks(), 35);
        assert_eq!(file.tracks[1].duration_ticks(), 21);
    }

    #[test]
    fn test_message_translation() {
        let cc = Message::with_params("control_change", [("control", 7), ("value", 100), ("time", 12)])
            .unwrap();
        let (delay, kind) = translate_message(&cc, 3);
        assert_eq!(delay, 12);
        assert_eq!(
            kind,
            ProtocolEvent::Channel {
                channel: 3,
                message: ChannelMessage::ControlChange { control: 7, value: 100 }
            }
        );

        let tempo = Message::with_params("set_tempo", [("tempo", 600_000)]).unwrap();
        assert_eq!(
            translate_message(&tempo, 0).1,
            ProtocolEvent::Meta(MetaEvent::Tempo(600_000))
        );

        let marker = Message::with_params("marker", [("text", "Chorus")]).unwrap();
        assert_eq!(
            translate_message(&marker, 0).1,
            ProtocolEvent::Meta(MetaEvent::Marker("Chorus".to_string()))
        );

        let bytes = Message::with_params("sysex", [("data", vec![0x7Eu8, 0x7F, 0x09, 0x01])]).unwrap();
        assert_eq!(
            translate_message(&bytes, 0).1,
            ProtocolEvent::SysEx(vec![0x7E, 0x7F, 0x09, 0x01])
        );
    }

    #[test]
    fn test_unknown_message_is_free_form() {
        let cue = Message::with_params("cue_marker", [("text", "go")]).unwrap();
        let mut emitter = Emitter::new(96);
        emitter.add_message(&cue, 1);
        let file = emitter.finish(true);
        assert_eq!(file.tracks.len(), 2);
        match &file.tracks[1].events[0].kind {
            ProtocolEvent::Meta(MetaEvent::FreeForm { message_type, parameters }) => {
                assert_eq!(message_type, "cue_marker");
                assert_eq!(parameters.len(), 1);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_message_in_clef_takes_no_time() {
        let mut clef = Clef::new(ClefKind::Treble);
        clef.add_rest(QuarterLength::QUARTER).unwrap();
        let sustain =
            Message::with_params("control_change", [("control", 64), ("value", 127)]).unwrap();
        clef.add_message(sustain).unwrap();
        clef.add_pitch(60, QuarterLength::QUARTER).unwrap();

        let file = emit(&clef).unwrap();
        let track = &file.tracks[0];
        assert_eq!(type_names(track)[1], "control_change");
        assert_eq!(track.events[1].delta, 96);
        assert_eq!(track.events[1].kind.channel(), Some(0));
        assert_eq!(track.events[2].delta, 0);
    }

    #[test]
    fn test_end_of_track_message_mid_timeline() {
        let mut clef = Clef::new(ClefKind::Treble);
        clef.add_pitch(60, QuarterLength::QUARTER).unwrap();
        clef.add_message(Message::with_params("end_of_track", [("time", 10)]).unwrap())
            .unwrap();
        clef.add_pitch(62, QuarterLength::QUARTER).unwrap();

        let file = emit(&clef).unwrap();
        let track = &file.tracks[0];
        assert_eq!(
            type_names(track),
            vec!["program_change", "note_on", "note_off", "note_on", "note_off", "end_of_track"]
        );
        assert_eq!(deltas(track), vec![0, 0, 96, 10, 96, 0]);
    }

    #[test]
    fn test_trailing_end_of_track_message() {
        let marker = Message::with_params("end_of_track", [("time", 0)]).unwrap();

        let mut clef = Clef::new(ClefKind::Treble);
        clef.add_pitch(60, QuarterLength::QUARTER).unwrap();
        clef.add_message(marker.clone()).unwrap();
        let file = emit(&clef).unwrap();
        let names = type_names(&file.tracks[0]);
        assert_eq!(names.iter().filter(|n| **n == "end_of_track").count(), 1);
        assert!(file.tracks[0].is_terminated());

        // A rest after the marker still lengthens the track
        clef.add_rest(QuarterLength::QUARTER).unwrap();
        let file = emit(&clef).unwrap();
        let track = &file.tracks[0];
        assert_eq!(type_names(track).iter().filter(|n| **n == "end_of_track").count(), 1);
        assert_eq!(track.events.last().map(|e| e.delta), Some(96));
        assert_eq!(track.duration_ticks(), 2 * 96);
    }
}
