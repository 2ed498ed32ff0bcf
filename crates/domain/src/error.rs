//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`AgendaError`]
//! via `#[from]`. Business outcomes (validation failures, missing records,
//! invariant violations) are distinct variants from [`AgendaError::Storage`],
//! which is reserved for faults of the durable medium.

/// Top-level error returned by every domain and application operation.
#[derive(Debug, thiserror::Error)]
pub enum AgendaError {
    /// Caller input was rejected.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The referenced record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The operation would break a scheduling or capacity invariant.
    #[error("conflict")]
    Conflict(#[from] ConflictError),

    /// The durable medium failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Caller-input problems. Never retried, never leave partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("capacity must be at least 1, got {0}")]
    InvalidCapacity(u32),

    #[error("duration must be at least 1 minute")]
    InvalidDuration,

    #[error("room {0:?} already exists")]
    DuplicateRoom(String),

    #[error("event {0:?} already exists")]
    DuplicateEvent(String),

    #[error("{username:?} is already enrolled in {event:?}")]
    AlreadyEnrolled { event: String, username: String },
}

/// A record addressed by name does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id:?} not found")]
pub struct NotFoundError {
    /// Kind of record that was looked up (`"Room"`, `"Event"`, …).
    pub entity: &'static str,
    /// Key that was looked up.
    pub id: String,
}

impl NotFoundError {
    #[must_use]
    pub fn room(name: impl Into<String>) -> Self {
        Self {
            entity: "Room",
            id: name.into(),
        }
    }

    #[must_use]
    pub fn event(name: impl Into<String>) -> Self {
        Self {
            entity: "Event",
            id: name.into(),
        }
    }

    #[must_use]
    pub fn schedule_entry(event: impl Into<String>) -> Self {
        Self {
            entity: "ScheduleEntry",
            id: event.into(),
        }
    }
}

/// Invariant violations, detected before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("event capacity {event_capacity} exceeds capacity {room_capacity} of room {room:?}")]
    CapacityExceeded {
        room: String,
        room_capacity: u32,
        event_capacity: u32,
    },

    #[error("room {room:?} is already booked by {existing:?} during the requested interval")]
    SchedulingConflict { room: String, existing: String },

    #[error("room {room:?} hosts {event:?} with capacity {event_capacity}, above the requested {requested}")]
    CapacityBelowUsage {
        room: String,
        event: String,
        event_capacity: u32,
        requested: u32,
    },

    #[error("event {event:?} is full ({capacity} attendees)")]
    EventFull { event: String, capacity: u32 },

    #[error("event {event:?} has {enrolled} attendees, above the requested capacity {requested}")]
    CapacityBelowEnrollment {
        event: String,
        enrolled: usize,
        requested: u32,
    },

    #[error("event {0:?} has already taken place")]
    EventOccurred(String),
}
