// Test timeline alignment: round-up padding and score merging

use score_midi::{
    merge, round_up_clef, round_up_score, Clef, ClefKind, QuarterLength, Score, ScoreError, Staff,
    StaffKind, StructuralError,
};

fn ql(n: i64, d: i64) -> QuarterLength {
    QuarterLength::new(n, d).unwrap()
}

/// Grand staff plus treble staff with uneven clef lengths
fn uneven_score(treble: &[QuarterLength], bass: &[QuarterLength], melody: &[QuarterLength]) -> Score {
    let mut score = Score::new();
    score.add_staff(Staff::new(StaffKind::GreatStaff));
    score.add_staff(Staff::new(StaffKind::TrebleStaff));
    let targets = [(0, 0, treble), (0, 1, bass), (1, 0, melody)];
    for (staff, clef, lengths) in targets {
        let clef = score.staff_mut(staff).and_then(|s| s.clef_mut(clef)).unwrap();
        for length in lengths {
            clef.add_pitch(60, *length).unwrap();
        }
    }
    score
}

fn clef_totals(score: &Score) -> Vec<QuarterLength> {
    score
        .staves()
        .iter()
        .flat_map(|s| s.clefs().iter())
        .map(Clef::total_duration)
        .collect()
}

#[test]
fn test_total_duration_is_sum_of_lengths() {
    let lengths = [ql(1, 3), ql(3, 2), QuarterLength::ZERO, ql(7, 4), QuarterLength::whole(2)];
    let mut clef = Clef::new(ClefKind::Bass);
    let mut expected = QuarterLength::ZERO;
    for length in lengths {
        clef.add_rest(length).unwrap();
        expected = expected.checked_add(length).unwrap();
        assert_eq!(clef.total_duration(), expected);
    }
}

#[test]
fn test_round_up_score_is_idempotent() {
    let mut score = uneven_score(&[QuarterLength::whole(2)], &[ql(1, 2)], &[ql(10, 3)]);
    let longest = round_up_score(&mut score).unwrap();
    assert_eq!(longest, ql(10, 3));
    assert!(clef_totals(&score).iter().all(|t| *t == longest));

    let sizes: Vec<usize> = score
        .staves()
        .iter()
        .flat_map(|s| s.clefs().iter())
        .map(|c| c.timeline().len())
        .collect();
    round_up_score(&mut score).unwrap();
    let again: Vec<usize> = score
        .staves()
        .iter()
        .flat_map(|s| s.clefs().iter())
        .map(|c| c.timeline().len())
        .collect();
    assert_eq!(sizes, again, "Second round-up should add nothing");
}

#[test]
fn test_round_up_clef_same_target_twice() {
    let mut clef = Clef::new(ClefKind::Treble);
    clef.add_pitch(67, ql(3, 4)).unwrap();
    let target = QuarterLength::whole(4);
    assert_eq!(round_up_clef(&mut clef, target).unwrap(), ql(13, 4));
    assert_eq!(round_up_clef(&mut clef, target).unwrap(), QuarterLength::ZERO);
    assert_eq!(clef.timeline().len(), 2);
}

#[test]
fn test_merge_sums_aligned_durations() {
    let mut a = uneven_score(&[QuarterLength::whole(3)], &[QuarterLength::QUARTER], &[]);
    let b = uneven_score(&[ql(1, 2)], &[QuarterLength::whole(2)], &[ql(5, 2)]);

    merge(&mut a, b).expect("Merging same-shaped scores should succeed");

    let expected = QuarterLength::whole(3).checked_add(ql(5, 2)).unwrap();
    assert!(clef_totals(&a).iter().all(|t| *t == expected));
}

#[test]
fn test_merge_into_empty_timelines() {
    let mut a = uneven_score(&[], &[], &[]);
    let b = uneven_score(&[QuarterLength::QUARTER], &[], &[]);
    merge(&mut a, b).unwrap();
    assert!(clef_totals(&a).iter().all(|t| *t == QuarterLength::QUARTER));
}

#[test]
fn test_merge_rejects_different_staff_count() {
    let mut a = uneven_score(&[], &[], &[]);
    let mut b = Score::new();
    b.add_staff(Staff::new(StaffKind::GreatStaff));
    assert_eq!(
        merge(&mut a, b),
        Err(ScoreError::Structural(StructuralError::StaffCountMismatch(2, 1)))
    );
}

#[test]
fn test_merge_rejects_different_staff_kinds() {
    let mut a = uneven_score(&[], &[], &[]);
    let mut b = Score::new();
    b.add_staff(Staff::new(StaffKind::GreatStaff));
    b.add_staff(Staff::new(StaffKind::BassStaff));
    let err = merge(&mut a, b).unwrap_err();
    assert!(matches!(
        err,
        ScoreError::Structural(StructuralError::StaffKindMismatch { index: 1, .. })
    ));
}

#[test]
fn test_merge_rejects_relabelled_percussion_staff() {
    let mut a = Score::new();
    a.add_staff(Staff::new(StaffKind::GreatStaff));
    let mut b = Score::new();
    let mut drums = Staff::new(StaffKind::GreatStaff);
    drums
        .set_clef_instrument(1, score_midi::Instrument::percussion("Bass Drum 1", 36).unwrap())
        .unwrap();
    b.add_staff(drums);
    assert!(matches!(
        merge(&mut a, b),
        Err(ScoreError::Structural(StructuralError::StaffKindMismatch { index: 0, .. }))
    ));
}
