use super::model::{ChannelMessage, MetaEvent, MidiFile, ProtocolEvent, Track};
use crate::error::{Result, ScoreError};
use midly::{
    num::u14, Format, Header, MetaMessage, MidiMessage, PitchBend, Smf, Timing, TrackEvent,
    TrackEventKind,
};

/// Largest delta time a variable-length quantity can carry (28 bits)
const MAX_DELTA_TICKS: u32 = 0x0FFF_FFFF;

/// Largest tempo a set-tempo meta event can carry (24 bits)
const MAX_TEMPO_MICROSECONDS: u32 = 0xFF_FFFF;

/// Write an emitted file as a Standard MIDI File (SMF) Format 1
///
/// Delta times and tempos are checked against their field widths first;
/// a value that would be truncated fails with [`ScoreError::Midi`] and
/// nothing is written.
pub fn write_smf(file: &MidiFile, out: &mut Vec<u8>) -> Result<()> {
    check_field_widths(file)?;

    // Payloads that have no borrowed form in the model (sysex framing,
    // free-form text) are rendered up front so track events can borrow them
    let payloads: Vec<Vec<Option<Vec<u8>>>> = file
        .tracks
        .iter()
        .map(|track| track.events.iter().map(|e| owned_payload(&e.kind)).collect())
        .collect();

    let tracks = file
        .tracks
        .iter()
        .zip(&payloads)
        .map(|(track, owned)| build_track(track, owned))
        .collect();

    let header = Header {
        format: Format::Parallel,
        timing: Timing::Metrical(file.ticks_per_beat.into()),
    };

    let smf = Smf { header, tracks };

    smf.write(out)
        .map_err(|e| ScoreError::Midi(format!("Failed to write MIDI: {}", e)))?;

    Ok(())
}

/// Serialize to a fresh byte buffer
pub fn to_bytes(file: &MidiFile) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_smf(file, &mut out)?;
    Ok(out)
}

fn check_field_widths(file: &MidiFile) -> Result<()> {
    for (index, track) in file.tracks.iter().enumerate() {
        for event in &track.events {
            if event.delta > MAX_DELTA_TICKS {
                return Err(ScoreError::Midi(format!(
                    "Delta time {} on track {} exceeds {} ticks",
                    event.delta, index, MAX_DELTA_TICKS
                )));
            }
            if let ProtocolEvent::Meta(MetaEvent::Tempo(microseconds)) = &event.kind {
                if *microseconds > MAX_TEMPO_MICROSECONDS {
                    return Err(ScoreError::Midi(format!(
                        "Tempo of {} microseconds per beat on track {} exceeds {}",
                        microseconds, index, MAX_TEMPO_MICROSECONDS
                    )));
                }
            }
        }
    }
    Ok(())
}

fn owned_payload(kind: &ProtocolEvent) -> Option<Vec<u8>> {
    match kind {
        ProtocolEvent::SysEx(data) => {
            let mut framed = data.clone();
            framed.push(0xF7);
            Some(framed)
        }
        ProtocolEvent::Meta(MetaEvent::FreeForm {
            message_type,
            parameters,
        }) => {
            let mut text = message_type.clone();
            for (name, value) in parameters {
                text.push_str(&format!(" {}={}", name, value));
            }
            Some(text.into_bytes())
        }
        _ => None,
    }
}

fn build_track<'a>(track: &'a Track, owned: &'a [Option<Vec<u8>>]) -> midly::Track<'a> {
    track
        .events
        .iter()
        .zip(owned)
        .map(|(event, payload)| TrackEvent {
            delta: event.delta.into(),
            kind: event_kind(&event.kind, payload.as_deref().unwrap_or(&[])),
        })
        .collect()
}

fn event_kind<'a>(kind: &'a ProtocolEvent, payload: &'a [u8]) -> TrackEventKind<'a> {
    match kind {
        ProtocolEvent::Channel { channel, message } => TrackEventKind::Midi {
            channel: (*channel).into(),
            message: midi_message(*message),
        },
        ProtocolEvent::SysEx(_) => TrackEventKind::SysEx(payload),
        ProtocolEvent::Meta(meta) => TrackEventKind::Meta(match meta {
            MetaEvent::Copyright(text) => MetaMessage::Copyright(text.as_bytes()),
            MetaEvent::TrackName(text) => MetaMessage::TrackName(text.as_bytes()),
            MetaEvent::InstrumentName(text) => MetaMessage::InstrumentName(text.as_bytes()),
            MetaEvent::Lyric(text) => MetaMessage::Lyric(text.as_bytes()),
            MetaEvent::Text(text) => MetaMessage::Text(text.as_bytes()),
            MetaEvent::Marker(text) => MetaMessage::Marker(text.as_bytes()),
            MetaEvent::Tempo(microseconds) => MetaMessage::Tempo((*microseconds).into()),
            MetaEvent::TimeSignature {
                numerator,
                denominator,
            } => MetaMessage::TimeSignature(
                *numerator,
                // Denominator as power of 2 (e.g., 4 -> 2, 8 -> 3)
                denominator.trailing_zeros() as u8,
                24, // MIDI clocks per metronome click
                8,  // 32nd notes per quarter note
            ),
            MetaEvent::KeySignature { sharps, minor, .. } => {
                MetaMessage::KeySignature(*sharps, *minor)
            }
            MetaEvent::FreeForm { .. } => MetaMessage::Text(payload),
            MetaEvent::EndOfTrack => MetaMessage::EndOfTrack,
        }),
    }
}

fn midi_message(message: ChannelMessage) -> MidiMessage {
    match message {
        ChannelMessage::NoteOn { key, vel } => MidiMessage::NoteOn {
            key: key.into(),
            vel: vel.into(),
        },
        ChannelMessage::NoteOff { key, vel } => MidiMessage::NoteOff {
            key: key.into(),
            vel: vel.into(),
        },
        ChannelMessage::PolyTouch { key, value } => MidiMessage::Aftertouch {
            key: key.into(),
            vel: value.into(),
        },
        ChannelMessage::ControlChange { control, value } => MidiMessage::Controller {
            controller: control.into(),
            value: value.into(),
        },
        ChannelMessage::ProgramChange { program } => MidiMessage::ProgramChange {
            program: program.into(),
        },
        ChannelMessage::Aftertouch { value } => MidiMessage::ChannelAftertouch { vel: value.into() },
        ChannelMessage::PitchWheel { value } => {
            // Wire format is unsigned with 8192 as center
            let raw = (i32::from(value) + 8192).clamp(0, 0x3FFF) as u16;
            MidiMessage::PitchBend {
                bend: PitchBend(u14::from(raw)),
            }
        }
    }
}
