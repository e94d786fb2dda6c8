//! Entity identification and timestamps.
//!
//! Every game object (player, card, token, stack ability) has a unique `EntityId`.
//!
//! ## ID Layout
//!
//! - `0..player_count`: Reserved for players
//! - `player_count..`: Cards, tokens and ability objects
//!
//! ## Usage
//!
//! ```
//! use ccg_rules::core::EntityId;
//!
//! let player_count = 2;
//!
//! let player_1 = EntityId::player_id(1);
//! assert!(player_1.is_player(player_count));
//!
//! let card = EntityId(10);
//! assert!(!card.is_player(player_count));
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for any game entity.
///
/// Ordered so that it can key the persistent `im::OrdMap` stores, which
/// keeps iteration and serialization deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create an entity ID for a player by index.
    #[must_use]
    pub const fn player_id(index: u8) -> Self {
        Self(index as u32)
    }

    /// First entity ID available for non-player entities.
    #[must_use]
    pub const fn first_non_player(player_count: usize) -> u32 {
        player_count as u32
    }

    /// Check if this entity ID refers to a player.
    #[must_use]
    pub const fn is_player(self, player_count: usize) -> bool {
        self.0 < player_count as u32
    }

    /// Convert to PlayerId if this is a player entity.
    ///
    /// ```
    /// use ccg_rules::core::{EntityId, PlayerId};
    ///
    /// assert_eq!(EntityId(1).as_player(2), Some(PlayerId::new(1)));
    /// assert_eq!(EntityId(5).as_player(2), None);
    /// ```
    #[must_use]
    pub fn as_player(self, player_count: usize) -> Option<super::PlayerId> {
        if self.is_player(player_count) {
            Some(super::PlayerId::new(self.0 as u8))
        } else {
            None
        }
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Monotonic game timestamp.
///
/// Assigned when a permanent enters the battlefield or a floating effect is
/// created. Later timestamps apply later within a layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Create a new timestamp.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T{}", self.0)
    }
}
