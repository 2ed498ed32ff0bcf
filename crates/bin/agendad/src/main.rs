//! # agendad: agenda daemon
//!
//! Composition root that wires the storage adapter into the scheduling
//! service.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct store implementations (adapters)
//! - Construct the scheduling service, injecting stores via port traits
//! - Seed the configured program and report the resulting schedule
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;
mod program;

use agenda_adapter_storage_sqlite_sqlx::{
    SqliteEventStore, SqliteRoomStore, SqliteScheduleStore,
};
use agenda_app::services::scheduling_service::SchedulingService;
use agenda_domain::time;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Database
    let db = agenda_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Stores
    let rooms = SqliteRoomStore::new(pool.clone());
    let events = SqliteEventStore::new(pool.clone());
    let entries = SqliteScheduleStore::new(pool);

    // Service
    let service = SchedulingService::new(rooms, events, entries);

    let report = program::seed(&service, config.program).await?;
    tracing::info!(
        rooms = report.rooms,
        events = report.events,
        rejected = report.rejected,
        "program loaded"
    );

    let now = time::now();
    for room in service.list_rooms().await? {
        let entries = service.room_schedule(&room.name).await?;
        let upcoming = entries.iter().filter(|e| !e.has_occurred(now)).count();
        tracing::info!(
            room = %room.name,
            capacity = room.capacity,
            events = entries.len(),
            upcoming,
            "room schedule"
        );
    }

    Ok(())
}
