//! Event catalog: event identity, membership, and capacity.

use agenda_domain::error::{AgendaError, NotFoundError, ValidationError};
use agenda_domain::event::Event;

use crate::ports::EntityStore;

/// Application service for events and their attendee/speaker sets.
///
/// Events are never deleted through this service; only membership shrinks.
pub struct EventCatalog<S> {
    store: S,
}

impl<S: EntityStore<Event>> EventCatalog<S> {
    /// Create a new catalog backed by the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Build an unsaved event after checking its name is free.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::DuplicateEvent`] if `name` is taken.
    /// - [`ValidationError::InvalidCapacity`] if `capacity` is zero.
    /// - A storage error from the store.
    pub(crate) async fn prepare(&self, event: Event) -> Result<Event, AgendaError> {
        event.validate()?;
        if self.store.get(&event.name).await?.is_some() {
            return Err(ValidationError::DuplicateEvent(event.name).into());
        }
        Ok(event)
    }

    /// Persist an event produced by [`Self::prepare`].
    pub(crate) async fn insert(&self, event: Event) -> Result<Event, AgendaError> {
        self.store.put(&event.name, event.clone()).await?;
        Ok(event)
    }

    /// Undo an [`Self::insert`] whose companion write failed.
    pub(crate) async fn discard(&self, name: &str) -> Result<(), AgendaError> {
        self.store.delete(name).await
    }

    /// Register a new event with no attendees and no speakers.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::DuplicateEvent`] if `name` is taken.
    /// - [`ValidationError::InvalidCapacity`] if `capacity` is zero.
    /// - A storage error from the store.
    #[tracing::instrument(skip(self, description))]
    pub async fn create_event(
        &self,
        name: &str,
        capacity: u32,
        description: &str,
        vip_only: bool,
    ) -> Result<Event, AgendaError> {
        let event = Event::builder()
            .name(name)
            .capacity(capacity)
            .description(description)
            .vip_only(vip_only)
            .build()?;
        let event = self.prepare(event).await?;
        self.insert(event).await
    }

    /// Look up an event by name.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::NotFound`] when no event is called `name`,
    /// or a storage error from the store.
    pub async fn get_event(&self, name: &str) -> Result<Event, AgendaError> {
        self.store
            .get(name)
            .await?
            .ok_or_else(|| NotFoundError::event(name).into())
    }

    /// Give `username` a seat at `event`.
    ///
    /// # Errors
    ///
    /// - [`AgendaError::NotFound`] if the event does not exist.
    /// - [`ConflictError::EventFull`](agenda_domain::error::ConflictError::EventFull)
    ///   if every seat is taken.
    /// - [`ValidationError::AlreadyEnrolled`] if `username` already has a seat.
    /// - A storage error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn enroll(&self, event: &str, username: &str) -> Result<Event, AgendaError> {
        let mut record = self.get_event(event).await?;
        record.enroll(username)?;
        self.store.put(event, record.clone()).await?;
        Ok(record)
    }

    /// Release `username`'s seat at `event`. Succeeds without writing when the
    /// user held no seat.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::NotFound`] if the event does not exist,
    /// or a storage error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn unenroll(&self, event: &str, username: &str) -> Result<Event, AgendaError> {
        let mut record = self.get_event(event).await?;
        if record.unenroll(username) {
            self.store.put(event, record.clone()).await?;
        }
        Ok(record)
    }

    /// Add `username` to the speakers of `event`. Adding an existing speaker
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::NotFound`] if the event does not exist,
    /// [`ValidationError::EmptyUsername`] for a blank name, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn assign_speaker(&self, event: &str, username: &str) -> Result<Event, AgendaError> {
        let mut record = self.get_event(event).await?;
        if record.add_speaker(username)? {
            self.store.put(event, record.clone()).await?;
        }
        Ok(record)
    }

    /// Change the seat count of `event`.
    ///
    /// Only the event's own invariant is checked; fitting the room is the
    /// caller's concern.
    ///
    /// # Errors
    ///
    /// - [`AgendaError::NotFound`] if the event does not exist.
    /// - [`ValidationError::InvalidCapacity`] if `capacity` is zero.
    /// - [`ConflictError::CapacityBelowEnrollment`](agenda_domain::error::ConflictError::CapacityBelowEnrollment)
    ///   if more attendees are enrolled.
    /// - A storage error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn set_capacity(&self, event: &str, capacity: u32) -> Result<Event, AgendaError> {
        let mut record = self.get_event(event).await?;
        record.set_capacity(capacity)?;
        self.store.put(event, record.clone()).await?;
        Ok(record)
    }

    /// Replace the free-text description of `event`.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::NotFound`] if the event does not exist,
    /// or a storage error from the store.
    #[tracing::instrument(skip(self, description))]
    pub async fn set_description(
        &self,
        event: &str,
        description: &str,
    ) -> Result<Event, AgendaError> {
        let mut record = self.get_event(event).await?;
        description.clone_into(&mut record.description);
        self.store.put(event, record.clone()).await?;
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns [`AgendaError::NotFound`] if the event does not exist,
    /// or a storage error from the store.
    pub async fn is_full(&self, event: &str) -> Result<bool, AgendaError> {
        Ok(self.get_event(event).await?.is_full())
    }

    /// # Errors
    ///
    /// Returns [`AgendaError::NotFound`] if the event does not exist,
    /// or a storage error from the store.
    pub async fn is_vip_only(&self, event: &str) -> Result<bool, AgendaError> {
        Ok(self.get_event(event).await?.vip_only)
    }

    /// # Errors
    ///
    /// Returns [`AgendaError::NotFound`] if the event does not exist,
    /// or a storage error from the store.
    pub async fn is_enrolled(&self, event: &str, username: &str) -> Result<bool, AgendaError> {
        Ok(self.get_event(event).await?.is_attendee(username))
    }

    /// Events satisfying `predicate`, from a fresh snapshot.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn find<P>(&self, predicate: P) -> Result<Vec<Event>, AgendaError>
    where
        P: FnMut(&Event) -> bool + Send,
    {
        Ok(self.store.filter(predicate).await?.collect())
    }

    /// List all events, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list_events(&self) -> Result<Vec<Event>, AgendaError> {
        let mut events = self.store.all().await?;
        events.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(events)
    }

    /// Sorted event names. VIP-only events are left out unless `include_vip`
    /// is set (the viewer is a VIP or an organizer).
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn event_names(&self, include_vip: bool) -> Result<Vec<String>, AgendaError> {
        let mut names: Vec<String> = self
            .store
            .filter(|e: &Event| include_vip || !e.vip_only)
            .await?
            .map(|e| e.name)
            .collect();
        names.sort();
        Ok(names)
    }

    /// Sorted names of VIP-only events.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn vip_event_names(&self) -> Result<Vec<String>, AgendaError> {
        let mut names: Vec<String> = self
            .store
            .filter(|e: &Event| e.vip_only)
            .await?
            .map(|e| e.name)
            .collect();
        names.sort();
        Ok(names)
    }
}
