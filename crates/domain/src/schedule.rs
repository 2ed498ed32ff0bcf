//! Schedule entries: the placement of one event in a room for a time span.
//!
//! Intervals are closed-open: an entry occupies `[start, start + duration)`,
//! so an event ending at 10:00 and another starting at 10:00 do not collide.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, ValidationError};
use crate::record::Record;
use crate::time::Timestamp;

/// A committed `(event, room, interval)` assignment. One per event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub event: String,
    pub room: String,
    pub start: Timestamp,
    pub duration_minutes: u32,
}

impl ScheduleEntry {
    /// Build a validated entry.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::Validation`] when either name is blank or the
    /// duration is zero.
    pub fn new(
        event: impl Into<String>,
        room: impl Into<String>,
        start: Timestamp,
        duration_minutes: u32,
    ) -> Result<Self, AgendaError> {
        let entry = Self {
            event: event.into(),
            room: room.into(),
            start,
            duration_minutes,
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::Validation`] when either name is blank, the
    /// duration is zero, or the interval ends past [`DateTime::MAX_UTC`].
    pub fn validate(&self) -> Result<(), AgendaError> {
        if self.event.trim().is_empty() || self.room.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.duration_minutes == 0 || self.checked_end().is_none() {
            return Err(ValidationError::InvalidDuration.into());
        }
        Ok(())
    }

    fn checked_end(&self) -> Option<Timestamp> {
        self.start
            .checked_add_signed(Duration::minutes(i64::from(self.duration_minutes)))
    }

    /// Exclusive end of the occupied interval.
    ///
    /// Saturates at [`DateTime::MAX_UTC`] for an entry that skipped
    /// [`Self::validate`].
    #[must_use]
    pub fn end(&self) -> Timestamp {
        self.checked_end().unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether this entry's interval intersects `[start, end)`.
    #[must_use]
    pub fn overlaps(&self, start: Timestamp, end: Timestamp) -> bool {
        self.start < end && start < self.end()
    }

    /// Whether `instant` falls inside this entry's interval.
    #[must_use]
    pub fn covers(&self, instant: Timestamp) -> bool {
        self.start <= instant && instant < self.end()
    }

    /// Whether the event is over at `now`.
    #[must_use]
    pub fn has_occurred(&self, now: Timestamp) -> bool {
        self.end() <= now
    }
}

impl Record for ScheduleEntry {
    const COLLECTION: &'static str = "schedule_entries";

    fn key(&self) -> &str {
        &self.event
    }
}
