//! # agenda-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `EntityStore<T>`: keyed durable storage for one record type
//!   - `RoomOccupancy`: which events a room currently hosts
//! - Define the use-case services:
//!   - `RoomRegistry`: room identity and capacity
//!   - `EventCatalog`: event identity and attendee/speaker membership
//!   - `ScheduleEngine`: room/time allocation and conflict detection
//!   - `SchedulingService`: the facade callers use; serializes mutations per key
//! - Orchestrate domain objects without knowing *how* persistence works
//!
//! ## Dependency rule
//! Depends on `agenda-domain` only (plus `tokio::sync` for locks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod locks;
pub mod ports;
pub mod services;

#[cfg(test)]
mod test_support;
