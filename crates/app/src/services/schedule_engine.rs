//! Schedule engine: room/time allocation and conflict detection.
//!
//! Entries are kept as a flat list keyed by event name; a room's timetable is
//! derived by filtering that list. Two entries in the same room conflict iff
//! their closed-open intervals intersect.

use std::collections::HashSet;
use std::sync::Arc;

use agenda_domain::error::{AgendaError, ConflictError, NotFoundError};
use agenda_domain::event::Event;
use agenda_domain::room::Room;
use agenda_domain::schedule::ScheduleEntry;
use agenda_domain::time::Timestamp;

use crate::ports::occupancy::Occupant;
use crate::ports::{EntityStore, RoomOccupancy};
use crate::services::event_catalog::EventCatalog;
use crate::services::room_registry::RoomRegistry;

/// Application service mapping `(room, interval)` to events.
///
/// Holds no cached state: every check reads the stores. Callers that need
/// check-then-write atomicity hold the room lock in
/// [`SchedulingService`](crate::services::scheduling_service::SchedulingService).
pub struct ScheduleEngine<RS, ES, SS> {
    rooms: Arc<RoomRegistry<RS>>,
    events: Arc<EventCatalog<ES>>,
    store: SS,
}

impl<RS, ES, SS> ScheduleEngine<RS, ES, SS>
where
    RS: EntityStore<Room>,
    ES: EntityStore<Event>,
    SS: EntityStore<ScheduleEntry>,
{
    /// Create a new engine validating against the given registry and catalog.
    pub fn new(rooms: Arc<RoomRegistry<RS>>, events: Arc<EventCatalog<ES>>, store: SS) -> Self {
        Self {
            rooms,
            events,
            store,
        }
    }

    /// Place `event` in `room` for `[start, start + duration_minutes)`.
    ///
    /// Checks run in this order: room exists, event exists, the interval is
    /// well formed, event fits the room, no other entry in the room
    /// intersects the interval. The event's
    /// own previous entry is ignored and replaced, so rescheduling never
    /// collides with itself.
    ///
    /// # Errors
    ///
    /// - [`AgendaError::NotFound`] for an unknown room or event.
    /// - [`AgendaError::Validation`] for a zero duration, or an interval
    ///   ending past the latest representable timestamp.
    /// - [`ConflictError::CapacityExceeded`] if the event has more seats than the room.
    /// - [`ConflictError::SchedulingConflict`] if the interval is taken.
    /// - A storage error from any store.
    #[tracing::instrument(skip(self))]
    pub async fn schedule(
        &self,
        event: &str,
        room: &str,
        start: Timestamp,
        duration_minutes: u32,
    ) -> Result<ScheduleEntry, AgendaError> {
        let room = self.rooms.get_room(room).await?;
        let event = self.events.get_event(event).await?;
        let entry = ScheduleEntry::new(&event.name, &room.name, start, duration_minutes)?;
        self.admit(&room, &entry, event.capacity).await?;
        self.commit(entry).await
    }

    /// Validate a placement for an event that is not stored yet.
    ///
    /// Same checks as [`Self::schedule`] minus the event lookup.
    pub(crate) async fn check_slot(
        &self,
        event: &str,
        event_capacity: u32,
        room: &str,
        start: Timestamp,
        duration_minutes: u32,
    ) -> Result<ScheduleEntry, AgendaError> {
        let room = self.rooms.get_room(room).await?;
        let entry = ScheduleEntry::new(event, &room.name, start, duration_minutes)?;
        self.admit(&room, &entry, event_capacity).await?;
        Ok(entry)
    }

    /// Persist an entry already accepted by [`Self::check_slot`].
    pub(crate) async fn commit(&self, entry: ScheduleEntry) -> Result<ScheduleEntry, AgendaError> {
        self.store.put(&entry.event, entry.clone()).await?;
        Ok(entry)
    }

    async fn admit(
        &self,
        room: &Room,
        entry: &ScheduleEntry,
        event_capacity: u32,
    ) -> Result<(), AgendaError> {
        if event_capacity > room.capacity {
            tracing::debug!(event = %entry.event, room = %room.name, "event does not fit room");
            return Err(ConflictError::CapacityExceeded {
                room: room.name.clone(),
                room_capacity: room.capacity,
                event_capacity,
            }
            .into());
        }

        let (start, end) = (entry.start, entry.end());
        let clash = self
            .store
            .filter(|other: &ScheduleEntry| {
                other.room == entry.room && other.event != entry.event && other.overlaps(start, end)
            })
            .await?
            .next();
        if let Some(existing) = clash {
            tracing::debug!(
                event = %entry.event,
                room = %room.name,
                existing = %existing.event,
                "interval already booked"
            );
            return Err(ConflictError::SchedulingConflict {
                room: room.name.clone(),
                existing: existing.event,
            }
            .into());
        }
        Ok(())
    }

    /// The entry placing `event`.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::NotFound`] when the event is not scheduled,
    /// or a storage error from the store.
    pub async fn entry_for(&self, event: &str) -> Result<ScheduleEntry, AgendaError> {
        self.store
            .get(event)
            .await?
            .ok_or_else(|| NotFoundError::schedule_entry(event).into())
    }

    /// Every entry in `room`, earliest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn entries_for_room(&self, room: &str) -> Result<Vec<ScheduleEntry>, AgendaError> {
        let entries = self
            .store
            .filter(|e: &ScheduleEntry| e.room == room)
            .await?
            .collect();
        Ok(chronological(entries))
    }

    /// The entry occupying `room` at `instant`, if any.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn entry_at(
        &self,
        room: &str,
        instant: Timestamp,
    ) -> Result<Option<ScheduleEntry>, AgendaError> {
        Ok(self
            .store
            .filter(|e: &ScheduleEntry| e.room == room && e.covers(instant))
            .await?
            .next())
    }

    /// Entries of every event matching `predicate`, earliest first.
    ///
    /// Joins the schedule against the catalog, typically on membership.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from either store.
    pub async fn entries_matching<P>(&self, predicate: P) -> Result<Vec<ScheduleEntry>, AgendaError>
    where
        P: FnMut(&Event) -> bool + Send,
    {
        let names: HashSet<String> = self
            .events
            .find(predicate)
            .await?
            .into_iter()
            .map(|e| e.name)
            .collect();
        let entries = self
            .store
            .filter(move |e: &ScheduleEntry| names.contains(&e.event))
            .await?
            .collect();
        Ok(chronological(entries))
    }

    /// Personal schedule of an attendee.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from either store.
    pub async fn attendee_schedule(
        &self,
        username: &str,
    ) -> Result<Vec<ScheduleEntry>, AgendaError> {
        self.entries_matching(|e| e.is_attendee(username)).await
    }

    /// Personal schedule of a speaker.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from either store.
    pub async fn speaker_schedule(
        &self,
        username: &str,
    ) -> Result<Vec<ScheduleEntry>, AgendaError> {
        self.entries_matching(|e| e.is_speaker(username)).await
    }

    /// Whether `event` finished at or before `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::NotFound`] when the event is not scheduled,
    /// or a storage error from the store.
    pub async fn has_occurred(&self, event: &str, now: Timestamp) -> Result<bool, AgendaError> {
        Ok(self.entry_for(event).await?.has_occurred(now))
    }
}

impl<RS, ES, SS> RoomOccupancy for ScheduleEngine<RS, ES, SS>
where
    RS: EntityStore<Room>,
    ES: EntityStore<Event>,
    SS: EntityStore<ScheduleEntry>,
{
    async fn occupants(&self, room: &str) -> Result<Vec<Occupant>, AgendaError> {
        let mut occupants = Vec::new();
        for entry in self.entries_for_room(room).await? {
            match self.events.get_event(&entry.event).await {
                Ok(event) => occupants.push(Occupant {
                    event: event.name,
                    capacity: event.capacity,
                }),
                Err(AgendaError::NotFound(_)) => {
                    tracing::warn!(event = %entry.event, %room, "schedule entry without event");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(occupants)
    }
}

fn chronological(mut entries: Vec<ScheduleEntry>) -> Vec<ScheduleEntry> {
    entries.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.event.cmp(&b.event)));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryStore;
    use agenda_domain::error::ValidationError;
    use chrono::{TimeZone, Utc};

    type Engine =
        ScheduleEngine<InMemoryStore<Room>, InMemoryStore<Event>, InMemoryStore<ScheduleEntry>>;

    fn at(hour: u32, minute: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, minute, 0).unwrap()
    }

    type Rooms = Arc<RoomRegistry<InMemoryStore<Room>>>;
    type Events = Arc<EventCatalog<InMemoryStore<Event>>>;

    async fn setup() -> (Engine, Rooms, Events) {
        let rooms = Arc::new(RoomRegistry::new(InMemoryStore::default()));
        let events = Arc::new(EventCatalog::new(InMemoryStore::default()));
        rooms.create_room("A", 10).await.unwrap();
        rooms.create_room("B", 50).await.unwrap();
        let engine = ScheduleEngine::new(
            Arc::clone(&rooms),
            Arc::clone(&events),
            InMemoryStore::default(),
        );
        (engine, rooms, events)
    }

    #[tokio::test]
    async fn should_accept_adjacent_and_reject_overlapping_entries() {
        let (engine, _, events) = setup().await;
        events.create_event("Keynote", 10, "", false).await.unwrap();
        events.create_event("Workshop", 5, "", false).await.unwrap();
        events.create_event("Overlap", 1, "", false).await.unwrap();

        engine.schedule("Keynote", "A", at(9, 0), 60).await.unwrap();
        engine.schedule("Workshop", "A", at(10, 0), 60).await.unwrap();

        let result = engine.schedule("Overlap", "A", at(9, 30), 15).await;
        assert!(matches!(
            result,
            Err(AgendaError::Conflict(ConflictError::SchedulingConflict {
                ref existing,
                ..
            })) if existing == "Keynote"
        ));
        assert!(matches!(
            engine.entry_for("Overlap").await,
            Err(AgendaError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_report_capacity_before_conflict() {
        let (engine, _, events) = setup().await;
        events.create_event("Keynote", 10, "", false).await.unwrap();
        events.create_event("TooBig", 11, "", false).await.unwrap();
        engine.schedule("Keynote", "A", at(9, 0), 60).await.unwrap();

        let result = engine.schedule("TooBig", "A", at(9, 0), 60).await;
        assert!(matches!(
            result,
            Err(AgendaError::Conflict(ConflictError::CapacityExceeded {
                room_capacity: 10,
                event_capacity: 11,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn should_check_room_before_event() {
        let (engine, _, _) = setup().await;
        let result = engine.schedule("Ghost", "Nowhere", at(9, 0), 60).await;
        assert!(matches!(
            result,
            Err(AgendaError::NotFound(NotFoundError { entity: "Room", .. }))
        ));

        let result = engine.schedule("Ghost", "A", at(9, 0), 60).await;
        assert!(matches!(
            result,
            Err(AgendaError::NotFound(NotFoundError { entity: "Event", .. }))
        ));
    }

    #[tokio::test]
    async fn should_reject_zero_duration() {
        let (engine, _, events) = setup().await;
        events.create_event("Keynote", 10, "", false).await.unwrap();
        let result = engine.schedule("Keynote", "A", at(9, 0), 0).await;
        assert!(matches!(
            result,
            Err(AgendaError::Validation(ValidationError::InvalidDuration))
        ));
    }

    #[tokio::test]
    async fn should_report_missing_room_before_invalid_duration() {
        let (engine, _, events) = setup().await;
        events.create_event("Keynote", 10, "", false).await.unwrap();

        let result = engine.schedule("Keynote", "Nowhere", at(9, 0), 0).await;
        assert!(matches!(
            result,
            Err(AgendaError::NotFound(NotFoundError { entity: "Room", .. }))
        ));
    }

    #[tokio::test]
    async fn should_reject_interval_past_max_timestamp() {
        let (engine, _, events) = setup().await;
        events.create_event("Keynote", 10, "", false).await.unwrap();
        let start = chrono::DateTime::<Utc>::MAX_UTC - chrono::Duration::minutes(5);

        let result = engine.schedule("Keynote", "A", start, 60).await;
        assert!(matches!(
            result,
            Err(AgendaError::Validation(ValidationError::InvalidDuration))
        ));
        assert!(engine.entries_for_room("A").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_allow_same_interval_in_different_rooms() {
        let (engine, _, events) = setup().await;
        events.create_event("Keynote", 10, "", false).await.unwrap();
        events.create_event("Parallel", 10, "", false).await.unwrap();

        engine.schedule("Keynote", "A", at(9, 0), 60).await.unwrap();
        engine.schedule("Parallel", "B", at(9, 0), 60).await.unwrap();
    }

    #[tokio::test]
    async fn should_replace_entry_when_rescheduling() {
        let (engine, _, events) = setup().await;
        events.create_event("Keynote", 10, "", false).await.unwrap();

        engine.schedule("Keynote", "A", at(9, 0), 60).await.unwrap();
        engine.schedule("Keynote", "A", at(9, 30), 60).await.unwrap();
        engine.schedule("Keynote", "B", at(14, 0), 30).await.unwrap();

        assert!(engine.entries_for_room("A").await.unwrap().is_empty());
        let b = engine.entries_for_room("B").await.unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].start, at(14, 0));
        assert_eq!(engine.entry_for("Keynote").await.unwrap().room, "B");
    }

    #[tokio::test]
    async fn should_reject_third_entry_intersecting_either_neighbour_in_any_order() {
        let placements = [(at(9, 0), 60), (at(11, 0), 60)];
        let probes = [(at(9, 45), 30), (at(10, 30), 60), (at(8, 0), 240)];

        for reversed in [false, true] {
            let (engine, _, events) = setup().await;
            for name in ["First", "Second", "Third"] {
                events.create_event(name, 1, "", false).await.unwrap();
            }
            let mut order = placements.to_vec();
            if reversed {
                order.reverse();
            }
            engine.schedule("First", "A", order[0].0, order[0].1).await.unwrap();
            engine.schedule("Second", "A", order[1].0, order[1].1).await.unwrap();

            for (start, minutes) in probes {
                let result = engine.schedule("Third", "A", start, minutes).await;
                assert!(matches!(
                    result,
                    Err(AgendaError::Conflict(ConflictError::SchedulingConflict { .. }))
                ));
            }
            engine.schedule("Third", "A", at(10, 0), 60).await.unwrap();
        }
    }

    #[tokio::test]
    async fn should_list_room_entries_chronologically() {
        let (engine, _, events) = setup().await;
        for name in ["Late", "Early", "Mid"] {
            events.create_event(name, 1, "", false).await.unwrap();
        }
        engine.schedule("Late", "A", at(15, 0), 30).await.unwrap();
        engine.schedule("Early", "A", at(8, 0), 30).await.unwrap();
        engine.schedule("Mid", "A", at(12, 0), 30).await.unwrap();

        let names: Vec<String> = engine
            .entries_for_room("A")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.event)
            .collect();
        assert_eq!(names, vec!["Early", "Mid", "Late"]);
    }

    #[tokio::test]
    async fn should_build_personal_schedules_from_membership() {
        let (engine, _, events) = setup().await;
        events.create_event("Keynote", 10, "", false).await.unwrap();
        events.create_event("Workshop", 5, "", false).await.unwrap();
        events.enroll("Keynote", "alice").await.unwrap();
        events.enroll("Workshop", "alice").await.unwrap();
        events.assign_speaker("Workshop", "bob").await.unwrap();
        engine.schedule("Workshop", "A", at(10, 0), 60).await.unwrap();
        engine.schedule("Keynote", "B", at(9, 0), 60).await.unwrap();

        let alice = engine.attendee_schedule("alice").await.unwrap();
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].event, "Keynote");

        let bob = engine.speaker_schedule("bob").await.unwrap();
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].event, "Workshop");
        assert!(engine.attendee_schedule("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_find_entry_covering_instant() {
        let (engine, _, events) = setup().await;
        events.create_event("Keynote", 10, "", false).await.unwrap();
        engine.schedule("Keynote", "A", at(9, 0), 60).await.unwrap();

        let hit = engine.entry_at("A", at(9, 59)).await.unwrap();
        assert_eq!(hit.map(|e| e.event).as_deref(), Some("Keynote"));
        assert!(engine.entry_at("A", at(10, 0)).await.unwrap().is_none());
        assert!(engine.entry_at("B", at(9, 30)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_report_occurrence_at_end_of_interval() {
        let (engine, _, events) = setup().await;
        events.create_event("Keynote", 10, "", false).await.unwrap();
        engine.schedule("Keynote", "A", at(9, 0), 60).await.unwrap();

        assert!(!engine.has_occurred("Keynote", at(9, 30)).await.unwrap());
        assert!(engine.has_occurred("Keynote", at(10, 0)).await.unwrap());
        assert!(matches!(
            engine.has_occurred("Ghost", at(10, 0)).await,
            Err(AgendaError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_report_occupants_with_event_capacity() {
        let (engine, rooms, events) = setup().await;
        events.create_event("Keynote", 8, "", false).await.unwrap();
        engine.schedule("Keynote", "A", at(9, 0), 60).await.unwrap();

        let occupants = engine.occupants("A").await.unwrap();
        assert_eq!(
            occupants,
            vec![Occupant {
                event: "Keynote".to_string(),
                capacity: 8
            }]
        );

        let result = rooms.set_capacity("A", 7, &engine).await;
        assert!(matches!(
            result,
            Err(AgendaError::Conflict(ConflictError::CapacityBelowUsage { .. }))
        ));
        rooms.set_capacity("A", 8, &engine).await.unwrap();
    }
}
