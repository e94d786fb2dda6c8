//! Zone system for object locations.
//!
//! ## Key Types
//!
//! - `ZoneKind`: Library, hand, battlefield, graveyard, stack, exile
//! - `ZoneId`: A kind plus its owner (shared zones have none)
//! - `ZoneManager`: Location tracking and movement
//! - `ZonePosition`: Where in an ordered zone to insert

pub mod manager;

pub use manager::{ZoneId, ZoneKind, ZoneManager, ZonePosition};
