//! Room: a named space with a fixed number of seats.

use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, ValidationError};
use crate::record::Record;

/// A bookable room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub capacity: u32,
}

impl Room {
    /// Create a builder for constructing a [`Room`].
    #[must_use]
    pub fn builder() -> RoomBuilder {
        RoomBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::Validation`] when `name` is empty or
    /// `capacity` is zero.
    pub fn validate(&self) -> Result<(), AgendaError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.capacity == 0 {
            return Err(ValidationError::InvalidCapacity(self.capacity).into());
        }
        Ok(())
    }
}

impl Record for Room {
    const COLLECTION: &'static str = "rooms";

    fn key(&self) -> &str {
        &self.name
    }
}

/// Step-by-step builder for [`Room`].
#[derive(Debug, Default)]
pub struct RoomBuilder {
    name: Option<String>,
    capacity: Option<u32>,
}

impl RoomBuilder {
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

    /// Consume the builder, validate, and return a [`Room`].
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::Validation`] if `name` is missing or empty, or
    /// if `capacity` is missing or zero.
    pub fn build(self) -> Result<Room, AgendaError> {
        let room = Room {
            name: self.name.unwrap_or_default(),
            capacity: self.capacity.unwrap_or_default(),
        };
        room.validate()?;
        Ok(room)
    }
}
