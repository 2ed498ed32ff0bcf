//! Room registry: room identity and capacity.

use agenda_domain::error::{AgendaError, ConflictError, NotFoundError, ValidationError};
use agenda_domain::room::Room;

use crate::ports::{EntityStore, RoomOccupancy};

/// Application service for rooms.
///
/// Mutations are not serialized here; concurrent callers go through
/// [`SchedulingService`](crate::services::scheduling_service::SchedulingService),
/// which holds the per-room locks.
pub struct RoomRegistry<S> {
    store: S,
}

impl<S: EntityStore<Room>> RoomRegistry<S> {
    /// Create a new registry backed by the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Register a new room.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::DuplicateRoom`] if `name` is taken.
    /// - [`ValidationError::InvalidCapacity`] if `capacity` is zero.
    /// - A storage error propagated from the store.
    #[tracing::instrument(skip(self))]
    pub async fn create_room(&self, name: &str, capacity: u32) -> Result<Room, AgendaError> {
        let room = Room::builder().name(name).capacity(capacity).build()?;
        if self.store.get(&room.name).await?.is_some() {
            return Err(ValidationError::DuplicateRoom(room.name).into());
        }
        self.store.put(&room.name, room.clone()).await?;
        Ok(room)
    }

    /// Look up a room by name.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::NotFound`] when no room is called `name`,
    /// or a storage error from the store.
    pub async fn get_room(&self, name: &str) -> Result<Room, AgendaError> {
        self.store
            .get(name)
            .await?
            .ok_or_else(|| NotFoundError::room(name).into())
    }

    /// Seat count of the room called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::NotFound`] when no room is called `name`,
    /// or a storage error from the store.
    pub async fn capacity_of(&self, name: &str) -> Result<u32, AgendaError> {
        Ok(self.get_room(name).await?.capacity)
    }

    /// Change a room's seat count.
    ///
    /// Every event booked into the room must still fit afterwards.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvalidCapacity`] if `capacity` is zero.
    /// - [`AgendaError::NotFound`] if the room does not exist.
    /// - [`ConflictError::CapacityBelowUsage`] if a booked event claims more seats.
    /// - A storage error from the store or the occupancy lookup.
    #[tracing::instrument(skip(self, occupancy))]
    pub async fn set_capacity<O: RoomOccupancy>(
        &self,
        name: &str,
        capacity: u32,
        occupancy: &O,
    ) -> Result<Room, AgendaError> {
        if capacity == 0 {
            return Err(ValidationError::InvalidCapacity(capacity).into());
        }
        let mut room = self.get_room(name).await?;

        let occupants = occupancy.occupants(name).await?;
        if let Some(widest) = occupants.into_iter().max_by_key(|o| o.capacity)
            && widest.capacity > capacity
        {
            return Err(ConflictError::CapacityBelowUsage {
                room: room.name,
                event: widest.event,
                event_capacity: widest.capacity,
                requested: capacity,
            }
            .into());
        }

        room.capacity = capacity;
        self.store.put(name, room.clone()).await?;
        Ok(room)
    }

    /// List all rooms, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list_rooms(&self) -> Result<Vec<Room>, AgendaError> {
        let mut rooms = self.store.all().await?;
        rooms.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rooms)
    }

    /// Names of all rooms, sorted.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn room_names(&self) -> Result<Vec<String>, AgendaError> {
        let mut names: Vec<String> = self.store.keys().await?.into_iter().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::occupancy::Occupant;
    use crate::test_support::InMemoryStore;
    use std::future::Future;

    struct FixedOccupancy(Vec<Occupant>);

    impl RoomOccupancy for FixedOccupancy {
        fn occupants(
            &self,
            _room: &str,
        ) -> impl Future<Output = Result<Vec<Occupant>, AgendaError>> + Send {
            let result = self.0.clone();
            async { Ok(result) }
        }
    }

    fn make_registry() -> RoomRegistry<InMemoryStore<Room>> {
        RoomRegistry::new(InMemoryStore::default())
    }

    #[tokio::test]
    async fn should_return_same_capacity_after_create() {
        let registry = make_registry();
        for (name, capacity) in [("A", 1), ("B", 10), ("C", u32::MAX)] {
            registry.create_room(name, capacity).await.unwrap();
            assert_eq!(registry.capacity_of(name).await.unwrap(), capacity);
        }
    }

    #[tokio::test]
    async fn should_reject_duplicate_room() {
        let registry = make_registry();
        registry.create_room("A", 10).await.unwrap();

        let result = registry.create_room("A", 20).await;
        assert!(matches!(
            result,
            Err(AgendaError::Validation(ValidationError::DuplicateRoom(ref name))) if name == "A"
        ));
        assert_eq!(registry.capacity_of("A").await.unwrap(), 10);
    }

    #[tokio::test]
    async fn should_reject_zero_capacity() {
        let registry = make_registry();
        let result = registry.create_room("A", 0).await;
        assert!(matches!(
            result,
            Err(AgendaError::Validation(ValidationError::InvalidCapacity(0)))
        ));
        assert!(registry.room_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_room() {
        let registry = make_registry();
        let result = registry.capacity_of("nowhere").await;
        assert!(matches!(
            result,
            Err(AgendaError::NotFound(NotFoundError { entity: "Room", .. }))
        ));
    }

    #[tokio::test]
    async fn should_shrink_capacity_down_to_widest_occupant() {
        let registry = make_registry();
        registry.create_room("A", 10).await.unwrap();
        let occupancy = FixedOccupancy(vec![
            Occupant {
                event: "Keynote".to_string(),
                capacity: 8,
            },
            Occupant {
                event: "Workshop".to_string(),
                capacity: 5,
            },
        ]);

        let room = registry.set_capacity("A", 8, &occupancy).await.unwrap();
        assert_eq!(room.capacity, 8);
        assert_eq!(registry.capacity_of("A").await.unwrap(), 8);
    }

    #[tokio::test]
    async fn should_refuse_capacity_below_usage() {
        let registry = make_registry();
        registry.create_room("A", 10).await.unwrap();
        let occupancy = FixedOccupancy(vec![Occupant {
            event: "Keynote".to_string(),
            capacity: 8,
        }]);

        let result = registry.set_capacity("A", 7, &occupancy).await;
        assert!(matches!(
            result,
            Err(AgendaError::Conflict(ConflictError::CapacityBelowUsage {
                event_capacity: 8,
                requested: 7,
                ..
            }))
        ));
        assert_eq!(registry.capacity_of("A").await.unwrap(), 10);
    }

    #[tokio::test]
    async fn should_reject_zero_when_setting_capacity() {
        let registry = make_registry();
        registry.create_room("A", 10).await.unwrap();
        let result = registry.set_capacity("A", 0, &FixedOccupancy(vec![])).await;
        assert!(matches!(
            result,
            Err(AgendaError::Validation(ValidationError::InvalidCapacity(0)))
        ));
    }

    #[tokio::test]
    async fn should_list_rooms_sorted_by_name() {
        let registry = make_registry();
        registry.create_room("B", 2).await.unwrap();
        registry.create_room("A", 1).await.unwrap();

        let names = registry.room_names().await.unwrap();
        assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
        let rooms = registry.list_rooms().await.unwrap();
        assert_eq!(rooms[0].name, "A");
        assert_eq!(rooms[1].capacity, 2);
    }
}
