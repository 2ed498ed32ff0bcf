//! Event: a talk, workshop, or session that people attend.
//!
//! An event owns its membership: the set of enrolled attendees and the set of
//! speakers. Membership sets are unordered; [`BTreeSet`] only fixes the
//! encoding order, equality never depends on insertion order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, ConflictError, ValidationError};
use crate::record::Record;

/// A conference event.
///
/// Invariant: `attendees.len() <= capacity as usize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub capacity: u32,
    #[serde(default)]
    pub attendees: BTreeSet<String>,
    #[serde(default)]
    pub speakers: BTreeSet<String>,
    #[serde(default)]
    pub vip_only: bool,
    #[serde(default)]
    pub description: String,
}

impl Event {
    /// Create a builder for constructing an [`Event`].
    #[must_use]
    pub fn builder() -> EventBuilder {
        EventBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::Validation`] when `name` is empty, `capacity`
    /// is zero or a speaker name is empty, and [`AgendaError::Conflict`] when
    /// more attendees are enrolled than the capacity allows.
    pub fn validate(&self) -> Result<(), AgendaError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.capacity == 0 {
            return Err(ValidationError::InvalidCapacity(self.capacity).into());
        }
        if self.speakers.iter().any(|s| s.trim().is_empty()) {
            return Err(ValidationError::EmptyUsername.into());
        }
        if self.attendees.len() > self.capacity as usize {
            return Err(ConflictError::CapacityBelowEnrollment {
                event: self.name.clone(),
                enrolled: self.attendees.len(),
                requested: self.capacity,
            }
            .into());
        }
        Ok(())
    }

    /// Whether every seat is taken.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.attendees.len() >= self.capacity as usize
    }

    #[must_use]
    pub fn is_attendee(&self, username: &str) -> bool {
        self.attendees.contains(username)
    }

    #[must_use]
    pub fn is_speaker(&self, username: &str) -> bool {
        self.speakers.contains(username)
    }

    /// Add `username` to the attendees.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyUsername`] when `username` is blank.
    /// - [`ConflictError::EventFull`] when no seat is left.
    /// - [`ValidationError::AlreadyEnrolled`] when `username` already holds a seat.
    pub fn enroll(&mut self, username: &str) -> Result<(), AgendaError> {
        if username.trim().is_empty() {
            return Err(ValidationError::EmptyUsername.into());
        }
        if self.is_full() {
            return Err(ConflictError::EventFull {
                event: self.name.clone(),
                capacity: self.capacity,
            }
            .into());
        }
        if !self.attendees.insert(username.to_string()) {
            return Err(ValidationError::AlreadyEnrolled {
                event: self.name.clone(),
                username: username.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Remove `username` from the attendees. Returns whether a seat was freed.
    pub fn unenroll(&mut self, username: &str) -> bool {
        self.attendees.remove(username)
    }

    /// Add `username` to the speakers. Returns whether it was newly added.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyUsername`] when `username` is blank.
    pub fn add_speaker(&mut self, username: &str) -> Result<bool, AgendaError> {
        if username.trim().is_empty() {
            return Err(ValidationError::EmptyUsername.into());
        }
        Ok(self.speakers.insert(username.to_string()))
    }

    /// Change the capacity, keeping every current attendee seated.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCapacity`] for zero and
    /// [`ConflictError::CapacityBelowEnrollment`] when fewer seats than
    /// attendees are requested.
    pub fn set_capacity(&mut self, capacity: u32) -> Result<(), AgendaError> {
        if capacity == 0 {
            return Err(ValidationError::InvalidCapacity(capacity).into());
        }
        if self.attendees.len() > capacity as usize {
            return Err(ConflictError::CapacityBelowEnrollment {
                event: self.name.clone(),
                enrolled: self.attendees.len(),
                requested: capacity,
            }
            .into());
        }
        self.capacity = capacity;
        Ok(())
    }
}

impl Record for Event {
    const COLLECTION: &'static str = "events";

    fn key(&self) -> &str {
        &self.name
    }
}

/// Step-by-step builder for [`Event`].
#[derive(Debug, Default)]
pub struct EventBuilder {
    name: Option<String>,
    capacity: Option<u32>,
    speakers: BTreeSet<String>,
    vip_only: bool,
    description: String,
}

impl EventBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn speaker(mut self, username: impl Into<String>) -> Self {
        self.speakers.insert(username.into());
        self
    }

    #[must_use]
    pub fn speakers<I, S>(mut self, usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.speakers.extend(usernames.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn vip_only(mut self, vip_only: bool) -> Self {
        self.vip_only = vip_only;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Consume the builder, validate, and return an [`Event`] with no
    /// attendees.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::Validation`] if `name` is missing or empty,
    /// `capacity` is missing or zero, or a speaker name is blank.
    pub fn build(self) -> Result<Event, AgendaError> {
        let event = Event {
            name: self.name.unwrap_or_default(),
            capacity: self.capacity.unwrap_or_default(),
            attendees: BTreeSet::new(),
            speakers: self.speakers,
            vip_only: self.vip_only,
            description: self.description,
        };
        event.validate()?;
        Ok(event)
    }
}
