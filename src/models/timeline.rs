//! Ordered event sequence owned by a clef
//!
//! Events are stored by position; "previous" and "next" are neighbouring
//! indices. The running total duration is kept up to date on every append
//! so [`Timeline::total_duration`] is O(1).

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use super::duration::QuarterLength;
use super::event::Event;
use crate::error::{self, StructuralError, ValidationError};

static NEXT_TIMELINE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a timeline, recorded on every event linked into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimelineId(u64);

impl TimelineId {
    fn next() -> Self {
        TimelineId(NEXT_TIMELINE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
pub struct Timeline {
    id: TimelineId,
    events: Vec<Event>,
    total: QuarterLength,
}

impl Timeline {
    pub fn new() -> Self {
        Timeline {
            id: TimelineId::next(),
            events: Vec::new(),
            total: QuarterLength::ZERO,
        }
    }

    pub fn id(&self) -> TimelineId {
        self.id
    }

    /// Link `event` after the current tail
    ///
    /// Fails with [`StructuralError::AlreadyLinked`] when the event already
    /// belongs to a timeline (including this one), and with
    /// [`ValidationError::DurationOverflow`] when the running total would no
    /// longer be exact. Nothing is appended on failure.
    pub fn append(&mut self, event: impl Into<Event>) -> error::Result<()> {
        let mut event = event.into();
        if event.is_linked() {
            return Err(StructuralError::AlreadyLinked.into());
        }
        self.total = add_durations(self.total, event.quarter_length())?;
        event.link(self.id);
        self.events.push(event);
        Ok(())
    }

    /// Move every event of `other` after this timeline's tail
    ///
    /// The combined total is checked first, so `other` is only consumed
    /// when the splice succeeds.
    pub(crate) fn splice(&mut self, other: Timeline) -> error::Result<()> {
        self.total = add_durations(self.total, other.total)?;
        for mut event in other.events {
            event.link(self.id);
            self.events.push(event);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// First event
    pub fn head(&self) -> Option<&Event> {
        self.events.first()
    }

    /// Last appended event
    pub fn current(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    /// Velocity and lyric edits on a linked event
    pub fn get_mut(&mut self, index: usize) -> Option<EventEditor<'_>> {
        self.events.get_mut(index).map(EventEditor)
    }

    /// Events in insertion order; can be restarted by calling again
    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Sum of event durations (a chord counts once)
    pub fn total_duration(&self) -> QuarterLength {
        self.total
    }

    /// Distinct durations of every sounding unit, ascending
    pub fn unique_quarter_lengths(&self) -> Vec<QuarterLength> {
        let set: BTreeSet<QuarterLength> =
            self.events.iter().flat_map(Event::durations).collect();
        set.into_iter().collect()
    }
}

pub(crate) fn add_durations(
    left: QuarterLength,
    right: QuarterLength,
) -> Result<QuarterLength, ValidationError> {
    left.checked_add(right)
        .ok_or_else(|| ValidationError::DurationOverflow(left.to_string(), right.to_string()))
}

/// Restricted mutable handle: linked events only change velocity or lyric
pub struct EventEditor<'a>(&'a mut Event);

impl EventEditor<'_> {
    pub fn event(&self) -> &Event {
        self.0
    }

    pub fn set_lyric(&mut self, lyric: impl Into<String>) {
        self.0.set_lyric(lyric);
    }

    pub fn set_attack_velocity(&mut self, velocity: i64) -> Result<(), ValidationError> {
        self.0.set_attack_velocity(velocity)
    }

    pub fn set_release_velocity(&mut self, velocity: i64) -> Result<(), ValidationError> {
        self.0.set_release_velocity(velocity)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
