//! Timeline alignment
//!
//! Pads clefs with trailing rests so they end together, and joins two
//! scores of the same shape end to end:
//! - `round_up_clef`: pad one clef up to an explicit target duration
//! - `round_up_staff`: pad every clef of a staff to the longest one
//! - `round_up_score`: pad every clef of a score to the longest one
//! - `merge`: append a second score after the first, clef by clef
//!
//! Padding is always a single rest equal to the deficit, so rounding up
//! twice to the same target changes nothing the second time.

use crate::error::{Result, StructuralError, ValidationError};
use crate::models::timeline::add_durations;
use crate::models::{Clef, QuarterLength, Score, Staff};

/// Pad `clef` to `target`
///
/// Returns the length of the rest that was appended, zero when the clef
/// already reached the target. A clef has no siblings of its own, so the
/// target is always explicit; [`round_up_staff`] supplies the longest
/// sibling.
pub fn round_up_clef(clef: &mut Clef, target: QuarterLength) -> Result<QuarterLength> {
    let current = clef.total_duration();
    if current >= target {
        return Ok(QuarterLength::ZERO);
    }
    let deficit = target.checked_sub(current).ok_or_else(|| {
        ValidationError::DurationOverflow(target.to_string(), current.to_string())
    })?;
    clef.add_rest(deficit)?;
    log::debug!("Padded {} clef with a rest of {}", clef.kind(), deficit);
    Ok(deficit)
}

/// Pad every clef of `staff` to `target` (its longest clef when `None`)
///
/// Returns the duration every clef now reaches.
pub fn round_up_staff(staff: &mut Staff, target: Option<QuarterLength>) -> Result<QuarterLength> {
    let target = target.unwrap_or_else(|| staff.max_duration());
    for clef in staff.clefs_mut() {
        round_up_clef(clef, target)?;
    }
    Ok(staff.max_duration())
}

/// Pad every clef of `score` to the longest clef anywhere in it
///
/// Staves are first squared off on their own, then all of them are
/// brought up to the global maximum.
pub fn round_up_score(score: &mut Score) -> Result<QuarterLength> {
    for staff in score.staves_mut() {
        round_up_staff(staff, None)?;
    }
    let longest = longest_clef(score);
    for staff in score.staves_mut() {
        round_up_staff(staff, Some(longest))?;
    }
    Ok(longest)
}

/// Append `b` after `a`, clef by clef
///
/// Both scores must have the same number of staves, and each staff pair the
/// same kind and clef count. Both are rounded up first so every clef of the
/// result ends at `aligned(a) + aligned(b)`. The events of `b` are moved
/// into `a`'s timelines.
pub fn merge(a: &mut Score, mut b: Score) -> Result<()> {
    check_same_shape(a, &b)?;
    // Aligned lengths are the longest clefs, so their sum bounds every pair
    add_durations(longest_clef(a), longest_clef(&b))?;

    round_up_score(a)?;
    round_up_score(&mut b)?;

    for (left, mut right) in a.staves_mut().iter_mut().zip(b.into_staves()) {
        for (into, from) in left.clefs_mut().iter_mut().zip(right.clefs_mut()) {
            if from.timeline().is_empty() {
                continue;
            }
            let tail = std::mem::take(from.timeline_mut());
            into.timeline_mut().splice(tail)?;
        }
    }
    Ok(())
}

fn longest_clef(score: &Score) -> QuarterLength {
    score
        .staves()
        .iter()
        .map(Staff::max_duration)
        .max()
        .unwrap_or(QuarterLength::ZERO)
}

fn check_same_shape(a: &Score, b: &Score) -> std::result::Result<(), StructuralError> {
    if a.staves().len() != b.staves().len() {
        return Err(StructuralError::StaffCountMismatch(
            a.staves().len(),
            b.staves().len(),
        ));
    }
    for (index, (left, right)) in a.staves().iter().zip(b.staves()).enumerate() {
        if left.kind() != right.kind() || left.clefs().len() != right.clefs().len() {
            return Err(StructuralError::StaffKindMismatch {
                index,
                left: describe(left),
                right: describe(right),
            });
        }
    }
    Ok(())
}

fn describe(staff: &Staff) -> String {
    format!("{} ({} clefs)", staff.kind(), staff.clefs().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoreError;
    use crate::models::{ClefKind, EventKind, StaffKind};

    fn ql(n: i64, d: i64) -> QuarterLength {
        QuarterLength::new(n, d).unwrap()
    }

    fn clef_with(lengths: &[QuarterLength]) -> Clef {
        let mut clef = Clef::new(ClefKind::Treble);
        for length in lengths {
            clef.add_pitch(60, *length).unwrap();
        }
        clef
    }

    #[test]
    fn test_round_up_clef_appends_one_rest() {
        let mut clef = clef_with(&[QuarterLength::QUARTER, ql(1, 2)]);
        let added = round_up_clef(&mut clef, QuarterLength::whole(4)).unwrap();
        assert_eq!(added, ql(5, 2));
        assert_eq!(clef.total_duration(), QuarterLength::whole(4));
        assert_eq!(clef.timeline().len(), 3);
        assert!(matches!(
            clef.timeline().current().map(|e| e.kind()),
            Some(EventKind::Rest(_))
        ));
    }

    #[test]
    fn test_round_up_clef_no_op() {
        let mut clef = clef_with(&[QuarterLength::whole(3)]);
        let added = round_up_clef(&mut clef, QuarterLength::whole(2)).unwrap();
        assert_eq!(added, QuarterLength::ZERO);
        assert_eq!(round_up_clef(&mut clef, QuarterLength::whole(3)).unwrap(), QuarterLength::ZERO);
        assert_eq!(clef.timeline().len(), 1);
    }

    #[test]
    fn test_round_up_idempotent() {
        let mut clef = clef_with(&[ql(1, 3)]);
        let target = QuarterLength::whole(2);
        round_up_clef(&mut clef, target).unwrap();
        let len = clef.timeline().len();
        round_up_clef(&mut clef, target).unwrap();
        assert_eq!(clef.timeline().len(), len);

        let mut staff = Staff::new(StaffKind::GreatStaff);
        staff.clef_mut(0).unwrap().add_pitch(60, QuarterLength::whole(3)).unwrap();
        round_up_staff(&mut staff, None).unwrap();
        let lens: Vec<usize> = staff.clefs().iter().map(|c| c.timeline().len()).collect();
        round_up_staff(&mut staff, None).unwrap();
        let again: Vec<usize> = staff.clefs().iter().map(|c| c.timeline().len()).collect();
        assert_eq!(lens, again);
    }

    #[test]
    fn test_round_up_staff_to_longest_clef() {
        let mut staff = Staff::new(StaffKind::GreatStaff);
        staff.clef_mut(0).unwrap().add_pitch(60, QuarterLength::whole(2)).unwrap();
        staff.clef_mut(1).unwrap().add_pitch(48, ql(1, 2)).unwrap();

        let reached = round_up_staff(&mut staff, None).unwrap();
        assert_eq!(reached, QuarterLength::whole(2));
        assert!(staff
            .clefs()
            .iter()
            .all(|c| c.total_duration() == QuarterLength::whole(2)));
    }

    #[test]
    fn test_round_up_staff_explicit_target() {
        let mut staff = Staff::new(StaffKind::GreatStaff);
        staff.clef_mut(0).unwrap().add_pitch(60, QuarterLength::whole(2)).unwrap();
        round_up_staff(&mut staff, Some(QuarterLength::whole(6))).unwrap();
        assert!(staff
            .clefs()
            .iter()
            .all(|c| c.total_duration() == QuarterLength::whole(6)));
    }

    #[test]
    fn test_round_up_score_global_maximum() {
        let mut score = Score::new();
        let mut short = Staff::new(StaffKind::GreatStaff);
        short.clef_mut(1).unwrap().add_pitch(48, QuarterLength::whole(1)).unwrap();
        let mut long = Staff::new(StaffKind::TrebleStaff);
        long.clef_mut(0).unwrap().add_pitch(72, QuarterLength::whole(5)).unwrap();
        score.add_staff(short);
        score.add_staff(long);

        assert_eq!(round_up_score(&mut score).unwrap(), QuarterLength::whole(5));
        for staff in score.staves() {
            for clef in staff.clefs() {
                assert_eq!(clef.total_duration(), QuarterLength::whole(5));
            }
        }
    }

    #[test]
    fn test_merge_staff_count_mismatch() {
        let mut a = Score::new();
        a.add_staff(Staff::new(StaffKind::TrebleStaff));
        let b = Score::new();
        assert_eq!(
            merge(&mut a, b),
            Err(ScoreError::from(StructuralError::StaffCountMismatch(1, 0)))
        );
    }

    #[test]
    fn test_merge_staff_kind_mismatch() {
        let mut a = Score::new();
        a.add_staff(Staff::new(StaffKind::TrebleStaff));
        let clef = a.staff_mut(0).unwrap().clef_mut(0).unwrap();
        clef.add_pitch(60, QuarterLength::QUARTER).unwrap();
        let mut b = Score::new();
        b.add_staff(Staff::new(StaffKind::BassStaff));

        let err = merge(&mut a, b).unwrap_err();
        assert!(matches!(
            err,
            ScoreError::Structural(StructuralError::StaffKindMismatch { index: 0, .. })
        ));
        // Nothing was padded or moved
        assert_eq!(a.staves()[0].clefs()[0].timeline().len(), 1);
    }

    #[test]
    fn test_merge_appends_aligned_timelines() {
        let mut a = Score::new();
        let mut grand = Staff::new(StaffKind::GreatStaff);
        grand.clef_mut(0).unwrap().add_pitch(60, QuarterLength::whole(3)).unwrap();
        grand.clef_mut(1).unwrap().add_pitch(48, QuarterLength::whole(1)).unwrap();
        a.add_staff(grand);

        let mut b = Score::new();
        let mut grand = Staff::new(StaffKind::GreatStaff);
        grand.clef_mut(0).unwrap().add_pitch(62, ql(1, 2)).unwrap();
        b.add_staff(grand);

        merge(&mut a, b).unwrap();

        let expected = QuarterLength::whole(3).checked_add(ql(1, 2)).unwrap();
        let clefs = a.staves()[0].clefs();
        assert!(clefs.iter().all(|c| c.total_duration() == expected));
        // Treble: note + note; bass: note + pad rest + pad rest from b
        assert_eq!(clefs[0].timeline().len(), 2);
        assert_eq!(clefs[1].timeline().len(), 3);
        let owner = clefs[0].timeline().id();
        assert!(clefs[0].timeline().iter().all(|e| e.owner() == Some(owner)));
    }

    #[test]
    fn test_merge_overflowing_lengths_leave_scores_untouched() {
        let mut a = Score::new();
        a.add_staff(Staff::new(StaffKind::TrebleStaff));
        a.staff_mut(0).unwrap().clef_mut(0).unwrap().add_pitch(60, ql(1, 999_983)).unwrap();
        let mut b = Score::new();
        b.add_staff(Staff::new(StaffKind::TrebleStaff));
        let clef = b.staff_mut(0).unwrap().clef_mut(0).unwrap();
        clef.add_pitch(62, ql(i64::MAX - 1, 999_979)).unwrap();

        let err = merge(&mut a, b).unwrap_err();
        assert!(matches!(
            err,
            ScoreError::Validation(ValidationError::DurationOverflow(_, _))
        ));
        assert_eq!(a.staves()[0].clefs()[0].timeline().len(), 1);
        assert_eq!(a.staves()[0].clefs()[0].total_duration(), ql(1, 999_983));
    }
}
