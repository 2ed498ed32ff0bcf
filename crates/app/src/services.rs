//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod event_catalog;
pub mod room_registry;
pub mod schedule_engine;
pub mod scheduling_service;
