// Test the score model: validation, linking rules and context propagation

use score_midi::{
    Chord, Clef, ClefKind, ConfigurationError, Event, EventKind, Instrument, KeySignature, Message,
    Note, QuarterLength, Rest, Score, ScoreError, ScoreMetadata, Staff, StaffKind, StructuralError,
    TimeSignature, Timeline, ValidationError,
};

#[test]
fn test_linked_event_cannot_be_appended_again() {
    let mut first = Clef::new(ClefKind::Treble);
    first.add_note(Note::quarter(60).unwrap()).unwrap();
    let linked = first.timeline().head().cloned().expect("Clef should hold a note");
    assert!(linked.is_linked());

    let mut second = Clef::new(ClefKind::Bass);
    assert_eq!(
        second.add_note(linked.clone()),
        Err(ScoreError::Structural(StructuralError::AlreadyLinked))
    );

    let mut timeline = Timeline::new();
    assert_eq!(
        timeline.append(linked.clone()),
        Err(ScoreError::Structural(StructuralError::AlreadyLinked))
    );

    // A detached copy is independent
    second.add_note(linked.detached()).unwrap();
    assert_eq!(second.timeline().len(), 1);
}

#[test]
fn test_timeline_order_and_totals() {
    let mut timeline = Timeline::new();
    timeline.append(Note::quarter(60).unwrap()).unwrap();
    timeline.append(Rest::new(QuarterLength::new(1, 2).unwrap())).unwrap();
    timeline
        .append(Chord::from_numbers(&[60, 64], QuarterLength::whole(2)).unwrap())
        .unwrap();

    let kinds: Vec<&str> = timeline
        .iter()
        .map(|e| match e.kind() {
            EventKind::Note(_) => "note",
            EventKind::Rest(_) => "rest",
            EventKind::Chord(_) => "chord",
            EventKind::Message(_) => "message",
        })
        .collect();
    assert_eq!(kinds, vec!["note", "rest", "chord"]);
    assert_eq!(timeline.total_duration(), QuarterLength::new(7, 2).unwrap());
    // Restartable traversal
    assert_eq!(timeline.iter().count(), timeline.iter().count());
}

#[test]
fn test_values_validated_at_construction() {
    assert_eq!(Note::quarter(128), Err(ValidationError::Pitch(128)));
    assert_eq!(Note::quarter(-1), Err(ValidationError::Pitch(-1)));

    let mut note = Note::quarter(60).unwrap();
    assert_eq!(note.set_attack_velocity(200), Err(ValidationError::Velocity(200)));

    let mut score = Score::new();
    assert!(matches!(score.context_mut().set_tempo(0), Err(ValidationError::Tempo(0, _, _))));
    assert!(matches!(score.context_mut().set_tempo(1001), Err(ValidationError::Tempo(1001, _, _))));
    assert_eq!(score.context_mut().set_volume(128), Err(ValidationError::Volume(128)));

    assert!(matches!(
        Message::with_params("control_change", [("control", 7)]),
        Err(ValidationError::MissingParameter { .. })
    ));
    assert!(matches!(
        Message::with_params("note_on", [("note", 60), ("velocity", 300)]),
        Err(ValidationError::Parameter { .. })
    ));
    assert!(QuarterLength::from_f64(-0.5).is_err());
    assert!(Instrument::percussion("Not a drum", 20).is_err());
    assert!(Instrument::melodic("Too high", 129).is_err());
}

#[test]
fn test_configuration_errors() {
    for bad in ["3-4", "3/0", "0/4", "3/5", "x/4", ""] {
        assert!(
            matches!(bad.parse::<TimeSignature>(), Err(ConfigurationError::TimeSignature(_))),
            "{:?} should not parse",
            bad
        );
    }
    assert!(matches!("H".parse::<ClefKind>(), Err(StructuralError::InvalidClefName(_))));
    assert!(matches!(
        "AltoStaff".parse::<StaffKind>(),
        Err(StructuralError::InvalidStaffName(_))
    ));
    assert_eq!("GrandStaff".parse::<StaffKind>(), Ok(StaffKind::GreatStaff));
}

#[test]
fn test_context_copied_on_attach() {
    let mut score = Score::new();
    score.context_mut().set_tempo(72).unwrap();
    score.context_mut().set_attack_velocity(90).unwrap();
    score.add_staff(Staff::new(StaffKind::TrebleStaff));

    // Later changes to the score do not reach the attached staff
    score.context_mut().set_tempo(140).unwrap();

    let clef = score.staff_mut(0).and_then(|s| s.clef_mut(0)).unwrap();
    assert_eq!(clef.context().tempo(), 72);
    clef.add_pitch(60, QuarterLength::QUARTER).unwrap();
    match clef.timeline().head().map(Event::kind) {
        Some(EventKind::Note(note)) => assert_eq!(note.attack_velocity(), 90),
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_uninherited_note_keeps_velocity() {
    let mut clef = Clef::new(ClefKind::Treble);
    let mut note = Note::quarter(60).unwrap();
    note.set_attack_velocity(20).unwrap();
    clef.add_note_uninherited(note).unwrap();
    match clef.timeline().head().map(Event::kind) {
        Some(EventKind::Note(note)) => assert_eq!(note.attack_velocity(), 20),
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_percussion_instrument_relabels_staff() {
    let mut staff = Staff::new(StaffKind::GreatStaff);
    staff
        .set_clef_instrument(0, Instrument::percussion("Ride Cymbal 1", 51).unwrap())
        .unwrap();
    assert_eq!(staff.kind(), StaffKind::PercussionStaff);
    assert_eq!(staff.clefs()[0].kind(), ClefKind::Percussion);
    assert_eq!(
        staff.set_clef_instrument(5, Instrument::default()),
        Err(ScoreError::Structural(StructuralError::MissingClef(5)))
    );
}

#[test]
fn test_chord_rejects_duplicate_pitch() {
    assert_eq!(
        Chord::from_numbers(&[60, 64, 60], QuarterLength::QUARTER).unwrap_err(),
        ScoreError::Structural(StructuralError::DuplicateChordNote(60))
    );
}

#[test]
fn test_unique_quarter_lengths() {
    let mut clef = Clef::new(ClefKind::Treble);
    clef.add_pitch(60, QuarterLength::whole(2)).unwrap();
    clef.add_pitch(62, QuarterLength::QUARTER).unwrap();
    clef.add_rest(QuarterLength::whole(2)).unwrap();
    assert_eq!(
        clef.unique_quarter_lengths(),
        vec![QuarterLength::QUARTER, QuarterLength::whole(2)]
    );
}

#[test]
fn test_metadata_serde() {
    let metadata: ScoreMetadata =
        serde_json::from_str(r#"{ "title": "Nocturne", "key_signature": "Ebm" }"#).unwrap();
    assert_eq!(metadata.title, "Nocturne");
    assert_eq!(metadata.genre, "Pop");
    let key: KeySignature = "Ebm".parse().unwrap();
    assert_eq!(metadata.key_signature, Some(key));
    assert_eq!(key.sharps(), -6);

    let json = serde_json::to_string(&metadata).unwrap();
    assert!(json.contains(r#""key_signature":"Ebm""#));
}
