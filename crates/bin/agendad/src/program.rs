//! Startup seeding: register the configured rooms and events.

use agenda_app::ports::EntityStore;
use agenda_app::services::scheduling_service::{NewEvent, SchedulingService};
use agenda_domain::error::AgendaError;
use agenda_domain::event::Event;
use agenda_domain::room::Room;
use agenda_domain::schedule::ScheduleEntry;

use crate::config::ProgramConfig;

/// What a seeding pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub rooms: usize,
    pub events: usize,
    pub rejected: usize,
}

/// Create every room, then every event, of `program`.
///
/// Entries the service rejects (duplicates, overbooked rooms, overlaps, ...)
/// are logged and skipped so one bad line does not block the rest.
///
/// # Errors
///
/// Stops at the first [`AgendaError::Storage`], since later writes would
/// fail the same way.
pub async fn seed<RS, ES, SS>(
    service: &SchedulingService<RS, ES, SS>,
    program: ProgramConfig,
) -> Result<SeedReport, AgendaError>
where
    RS: EntityStore<Room>,
    ES: EntityStore<Event>,
    SS: EntityStore<ScheduleEntry>,
{
    let mut report = SeedReport::default();

    for room in program.rooms {
        match service.create_room(&room.name, room.capacity).await {
            Ok(_) => report.rooms += 1,
            Err(err @ AgendaError::Storage(_)) => return Err(err),
            Err(err) => {
                tracing::warn!(room = %room.name, error = ?err, "skipping room");
                report.rejected += 1;
            }
        }
    }

    for event in program.events {
        let name = event.name.clone();
        let new = NewEvent {
            name: event.name,
            capacity: event.capacity,
            description: event.description,
            vip_only: event.vip_only,
            speakers: event.speakers,
            room: event.room,
            start: event.start,
            duration_minutes: event.duration_minutes,
        };
        match service.create_event(new).await {
            Ok(_) => report.events += 1,
            Err(err @ AgendaError::Storage(_)) => return Err(err),
            Err(err) => {
                tracing::warn!(event = %name, error = ?err, "skipping event");
                report.rejected += 1;
            }
        }
    }

    Ok(report)
}
