//! Scheduling service: the single entry point for controllers and presenters.
//!
//! Composes [`RoomRegistry`], [`EventCatalog`] and [`ScheduleEngine`] and
//! serializes every mutation with per-key locks:
//!
//! - event locks are taken before room locks;
//! - several room locks are taken in sorted order;
//! - reads take no lock.
//!
//! Creating an event validates the event *and* its placement before either
//! record is written, then writes the event followed by its entry. If the
//! second write fails the event is removed again.

use std::sync::Arc;

use agenda_domain::error::{AgendaError, ConflictError, NotFoundError};
use agenda_domain::event::Event;
use agenda_domain::room::Room;
use agenda_domain::schedule::ScheduleEntry;
use agenda_domain::time::Timestamp;

use crate::locks::KeyedLocks;
use crate::ports::EntityStore;
use crate::services::event_catalog::EventCatalog;
use crate::services::room_registry::RoomRegistry;
use crate::services::schedule_engine::ScheduleEngine;

/// Everything needed to create and place an event in one call.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub capacity: u32,
    pub description: String,
    pub vip_only: bool,
    pub speakers: Vec<String>,
    pub room: String,
    pub start: Timestamp,
    pub duration_minutes: u32,
}

/// An event together with its placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub event: Event,
    pub entry: ScheduleEntry,
}

/// Application facade over rooms, events, and the schedule.
pub struct SchedulingService<RS, ES, SS> {
    rooms: Arc<RoomRegistry<RS>>,
    events: Arc<EventCatalog<ES>>,
    schedule: ScheduleEngine<RS, ES, SS>,
    event_locks: KeyedLocks,
    room_locks: KeyedLocks,
}

impl<RS, ES, SS> SchedulingService<RS, ES, SS>
where
    RS: EntityStore<Room>,
    ES: EntityStore<Event>,
    SS: EntityStore<ScheduleEntry>,
{
    /// Create a new service over one store per record type.
    pub fn new(room_store: RS, event_store: ES, schedule_store: SS) -> Self {
        let rooms = Arc::new(RoomRegistry::new(room_store));
        let events = Arc::new(EventCatalog::new(event_store));
        let schedule = ScheduleEngine::new(Arc::clone(&rooms), Arc::clone(&events), schedule_store);
        Self {
            rooms,
            events,
            schedule,
            event_locks: KeyedLocks::new(),
            room_locks: KeyedLocks::new(),
        }
    }

    // -- rooms ---------------------------------------------------------------

    /// Register a room.
    ///
    /// # Errors
    ///
    /// See [`RoomRegistry::create_room`].
    #[tracing::instrument(skip(self))]
    pub async fn create_room(&self, name: &str, capacity: u32) -> Result<Room, AgendaError> {
        let _room = self.room_locks.lock(name).await;
        self.rooms.create_room(name, capacity).await
    }

    /// Change a room's seat count without evicting any booked event.
    ///
    /// # Errors
    ///
    /// See [`RoomRegistry::set_capacity`].
    #[tracing::instrument(skip(self))]
    pub async fn set_room_capacity(&self, name: &str, capacity: u32) -> Result<Room, AgendaError> {
        let _room = self.room_locks.lock(name).await;
        self.rooms.set_capacity(name, capacity, &self.schedule).await
    }

    /// # Errors
    ///
    /// See [`RoomRegistry::get_room`].
    pub async fn get_room(&self, name: &str) -> Result<Room, AgendaError> {
        self.rooms.get_room(name).await
    }

    /// # Errors
    ///
    /// See [`RoomRegistry::capacity_of`].
    pub async fn capacity_of(&self, name: &str) -> Result<u32, AgendaError> {
        self.rooms.capacity_of(name).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list_rooms(&self) -> Result<Vec<Room>, AgendaError> {
        self.rooms.list_rooms().await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn room_names(&self) -> Result<Vec<String>, AgendaError> {
        self.rooms.room_names().await
    }

    // -- events --------------------------------------------------------------

    /// Create an event and place it in a room, all or nothing.
    ///
    /// # Errors
    ///
    /// - [`AgendaError::Validation`] for a blank name, zero capacity or
    ///   duration, a blank speaker, or a name already taken.
    /// - [`AgendaError::NotFound`] if the room does not exist.
    /// - [`ConflictError::CapacityExceeded`] if the event has more seats than the room.
    /// - [`ConflictError::SchedulingConflict`] if the interval is taken.
    /// - A storage error; nothing stays registered in that case.
    #[tracing::instrument(skip(self, new), fields(event = %new.name, room = %new.room))]
    pub async fn create_event(&self, new: NewEvent) -> Result<ScheduledEvent, AgendaError> {
        let _event = self.event_locks.lock(&new.name).await;
        let _room = self.room_locks.lock(&new.room).await;

        let event = Event::builder()
            .name(new.name)
            .capacity(new.capacity)
            .description(new.description)
            .vip_only(new.vip_only)
            .speakers(new.speakers)
            .build()?;
        let event = self.events.prepare(event).await?;
        let entry = self
            .schedule
            .check_slot(
                &event.name,
                event.capacity,
                &new.room,
                new.start,
                new.duration_minutes,
            )
            .await?;

        let event = self.events.insert(event).await?;
        match self.schedule.commit(entry).await {
            Ok(entry) => Ok(ScheduledEvent { event, entry }),
            Err(err) => {
                tracing::warn!(error = %err, "schedule write failed, removing event");
                if let Err(rollback) = self.events.discard(&event.name).await {
                    tracing::error!(error = %rollback, "failed to remove orphaned event");
                }
                Err(err)
            }
        }
    }

    /// Move an event to another room and/or time.
    ///
    /// # Errors
    ///
    /// See [`ScheduleEngine::schedule`]. On error the previous placement is kept.
    #[tracing::instrument(skip(self))]
    pub async fn reschedule_event(
        &self,
        event: &str,
        room: &str,
        start: Timestamp,
        duration_minutes: u32,
    ) -> Result<ScheduleEntry, AgendaError> {
        let _event = self.event_locks.lock(event).await;
        let previous = self.placement(event).await?;
        let mut rooms = vec![room];
        if let Some(previous) = previous.as_ref() {
            rooms.push(&previous.room);
        }
        let _rooms = self.room_locks.lock_many(&rooms).await;

        self.schedule
            .schedule(event, room, start, duration_minutes)
            .await
    }

    /// Change an event's seat count. It must keep every attendee seated and
    /// still fit the room it is placed in.
    ///
    /// # Errors
    ///
    /// - [`AgendaError::NotFound`] if the event does not exist.
    /// - [`ConflictError::CapacityExceeded`] if the room is too small.
    /// - See [`EventCatalog::set_capacity`] for the remaining cases.
    #[tracing::instrument(skip(self))]
    pub async fn set_event_capacity(
        &self,
        event: &str,
        capacity: u32,
    ) -> Result<Event, AgendaError> {
        let _event = self.event_locks.lock(event).await;
        self.events.get_event(event).await?;

        let placement = self.placement(event).await?;
        let _room = match placement.as_ref() {
            Some(entry) => Some(self.room_locks.lock(&entry.room).await),
            None => None,
        };
        if let Some(entry) = placement {
            let room = self.rooms.get_room(&entry.room).await?;
            if capacity > room.capacity {
                return Err(ConflictError::CapacityExceeded {
                    room: room.name,
                    room_capacity: room.capacity,
                    event_capacity: capacity,
                }
                .into());
            }
        }
        self.events.set_capacity(event, capacity).await
    }

    /// # Errors
    ///
    /// See [`EventCatalog::set_description`].
    #[tracing::instrument(skip(self, description))]
    pub async fn set_event_description(
        &self,
        event: &str,
        description: &str,
    ) -> Result<Event, AgendaError> {
        let _event = self.event_locks.lock(event).await;
        self.events.set_description(event, description).await
    }

    /// Sign `username` up for `event`.
    ///
    /// # Errors
    ///
    /// - [`AgendaError::NotFound`] if the event does not exist.
    /// - [`ConflictError::EventOccurred`] if the event is already over at `now`.
    /// - See [`EventCatalog::enroll`] for the remaining cases.
    #[tracing::instrument(skip(self))]
    pub async fn enroll(
        &self,
        event: &str,
        username: &str,
        now: Timestamp,
    ) -> Result<Event, AgendaError> {
        let _event = self.event_locks.lock(event).await;
        self.events.get_event(event).await?;
        if self.placement(event).await?.is_some_and(|e| e.has_occurred(now)) {
            return Err(ConflictError::EventOccurred(event.to_string()).into());
        }
        self.events.enroll(event, username).await
    }

    /// Cancel `username`'s enrolment. Cancelling twice is not an error.
    ///
    /// # Errors
    ///
    /// See [`EventCatalog::unenroll`].
    #[tracing::instrument(skip(self))]
    pub async fn cancel_enrolment(
        &self,
        event: &str,
        username: &str,
    ) -> Result<Event, AgendaError> {
        let _event = self.event_locks.lock(event).await;
        self.events.unenroll(event, username).await
    }

    /// # Errors
    ///
    /// See [`EventCatalog::assign_speaker`].
    #[tracing::instrument(skip(self))]
    pub async fn assign_speaker(&self, event: &str, username: &str) -> Result<Event, AgendaError> {
        let _event = self.event_locks.lock(event).await;
        self.events.assign_speaker(event, username).await
    }

    /// Add a speaker to whichever event occupies `room` at `instant`.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::NotFound`] when the room is free at `instant`,
    /// otherwise see [`EventCatalog::assign_speaker`].
    #[tracing::instrument(skip(self))]
    pub async fn assign_speaker_at(
        &self,
        room: &str,
        instant: Timestamp,
        username: &str,
    ) -> Result<Event, AgendaError> {
        let entry = self
            .schedule
            .entry_at(room, instant)
            .await?
            .ok_or_else(|| NotFoundError {
                entity: "ScheduleEntry",
                id: format!("{room} at {instant}"),
            })?;
        self.assign_speaker(&entry.event, username).await
    }

    // -- queries -------------------------------------------------------------

    /// # Errors
    ///
    /// See [`EventCatalog::get_event`].
    pub async fn get_event(&self, name: &str) -> Result<Event, AgendaError> {
        self.events.get_event(name).await
    }

    /// An event and its placement.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::NotFound`] if either record is missing,
    /// or a storage error.
    pub async fn event_details(&self, name: &str) -> Result<ScheduledEvent, AgendaError> {
        let event = self.events.get_event(name).await?;
        let entry = self.schedule.entry_for(name).await?;
        Ok(ScheduledEvent { event, entry })
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list_events(&self) -> Result<Vec<Event>, AgendaError> {
        self.events.list_events().await
    }

    /// # Errors
    ///
    /// See [`EventCatalog::event_names`].
    pub async fn event_names(&self, include_vip: bool) -> Result<Vec<String>, AgendaError> {
        self.events.event_names(include_vip).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn vip_event_names(&self) -> Result<Vec<String>, AgendaError> {
        self.events.vip_event_names().await
    }

    /// # Errors
    ///
    /// See [`EventCatalog::is_full`].
    pub async fn is_full(&self, event: &str) -> Result<bool, AgendaError> {
        self.events.is_full(event).await
    }

    /// # Errors
    ///
    /// See [`EventCatalog::is_vip_only`].
    pub async fn is_vip_only(&self, event: &str) -> Result<bool, AgendaError> {
        self.events.is_vip_only(event).await
    }

    /// # Errors
    ///
    /// See [`EventCatalog::is_enrolled`].
    pub async fn is_enrolled(&self, event: &str, username: &str) -> Result<bool, AgendaError> {
        self.events.is_enrolled(event, username).await
    }

    /// Whether a sign-up would currently be accepted: the event exists, is
    /// not over at `now`, and has a free seat.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the stores.
    pub async fn can_sign_up(&self, event: &str, now: Timestamp) -> Result<bool, AgendaError> {
        let record = match self.events.get_event(event).await {
            Ok(record) => record,
            Err(AgendaError::NotFound(_)) => return Ok(false),
            Err(err) => return Err(err),
        };
        let occurred = self
            .placement(event)
            .await?
            .is_some_and(|e| e.has_occurred(now));
        Ok(!occurred && !record.is_full())
    }

    /// # Errors
    ///
    /// See [`ScheduleEngine::has_occurred`].
    pub async fn has_occurred(&self, event: &str, now: Timestamp) -> Result<bool, AgendaError> {
        self.schedule.has_occurred(event, now).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn room_schedule(&self, room: &str) -> Result<Vec<ScheduleEntry>, AgendaError> {
        self.schedule.entries_for_room(room).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the stores.
    pub async fn attendee_schedule(
        &self,
        username: &str,
    ) -> Result<Vec<ScheduleEntry>, AgendaError> {
        self.schedule.attendee_schedule(username).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the stores.
    pub async fn speaker_schedule(
        &self,
        username: &str,
    ) -> Result<Vec<ScheduleEntry>, AgendaError> {
        self.schedule.speaker_schedule(username).await
    }

    async fn placement(&self, event: &str) -> Result<Option<ScheduleEntry>, AgendaError> {
        match self.schedule.entry_for(event).await {
            Ok(entry) => Ok(Some(entry)),
            Err(AgendaError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
