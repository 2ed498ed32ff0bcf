//! Occupancy port: what the room registry needs to know about bookings.

use std::future::Future;

use agenda_domain::error::AgendaError;

/// An event currently booked into a room, with the seats it claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupant {
    pub event: String,
    pub capacity: u32,
}

/// Reports which events occupy a room.
///
/// Lets [`RoomRegistry`](crate::services::room_registry::RoomRegistry) check
/// a capacity change against current bookings without owning the schedule.
pub trait RoomOccupancy {
    /// Every event scheduled in `room`, with its capacity.
    fn occupants(&self, room: &str)
    -> impl Future<Output = Result<Vec<Occupant>, AgendaError>> + Send;
}
