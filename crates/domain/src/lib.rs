//! # agenda-domain
//!
//! Pure domain model for the agenda conference scheduler.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps, the [`record::Record`] contract
//! - Define **Rooms** (named spaces with a seat count)
//! - Define **Events** (capacity, attendee and speaker sets, VIP flag, description)
//! - Define **Schedule entries** (an event placed in a room for a closed-open interval)
//! - Contain all per-record invariant enforcement
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod record;
pub mod time;

pub mod event;
pub mod room;
pub mod schedule;
