//! Zone manager for card locations and movement.
//!
//! The `ZoneManager` tracks which zone every object is in and keeps each
//! zone's contents in order. Index 0 is the bottom; the last element is the
//! top (top of library, top of stack, most recent arrival on the battlefield).
//!
//! Both maps are persistent `im` structures, so cloning a manager as part of
//! a state snapshot is O(1).

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, GameRng, PlayerId};

/// The six zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Stack,
    Exile,
}

impl ZoneKind {
    /// Shared zones have no owner.
    #[must_use]
    pub const fn is_shared(self) -> bool {
        matches!(self, ZoneKind::Battlefield | ZoneKind::Stack)
    }
}

/// A concrete zone: kind plus owning player for per-player zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId {
    pub kind: ZoneKind,
    pub owner: Option<PlayerId>,
}

impl ZoneId {
    /// The shared battlefield.
    pub const BATTLEFIELD: ZoneId = ZoneId {
        kind: ZoneKind::Battlefield,
        owner: None,
    };

    /// The shared stack.
    pub const STACK: ZoneId = ZoneId {
        kind: ZoneKind::Stack,
        owner: None,
    };

    /// A player's zone of the given kind; shared kinds ignore the player.
    #[must_use]
    pub const fn of(kind: ZoneKind, player: PlayerId) -> Self {
        if kind.is_shared() {
            Self { kind, owner: None }
        } else {
            Self {
                kind,
                owner: Some(player),
            }
        }
    }

    #[must_use]
    pub const fn hand(player: PlayerId) -> Self {
        Self::of(ZoneKind::Hand, player)
    }

    #[must_use]
    pub const fn library(player: PlayerId) -> Self {
        Self::of(ZoneKind::Library, player)
    }

    #[must_use]
    pub const fn graveyard(player: PlayerId) -> Self {
        Self::of(ZoneKind::Graveyard, player)
    }

    #[must_use]
    pub const fn exile(player: PlayerId) -> Self {
        Self::of(ZoneKind::Exile, player)
    }

    #[must_use]
    pub fn is_battlefield(self) -> bool {
        self.kind == ZoneKind::Battlefield
    }

    #[must_use]
    pub fn is_stack(self) -> bool {
        self.kind == ZoneKind::Stack
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            ZoneKind::Library => "library",
            ZoneKind::Hand => "hand",
            ZoneKind::Battlefield => "battlefield",
            ZoneKind::Graveyard => "graveyard",
            ZoneKind::Stack => "stack",
            ZoneKind::Exile => "exile",
        };
        match self.owner {
            Some(owner) => write!(f, "{owner}'s {kind}"),
            None => write!(f, "the {kind}"),
        }
    }
}

/// Position for inserting an object into a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Add to top of zone (e.g., top of library).
    Top,
    /// Add to bottom of zone.
    Bottom,
    /// Insert at specific index (0 = bottom).
    Index(usize),
}

/// Tracks object locations across zones.
///
/// ## Usage
///
/// ```
/// use ccg_rules::core::{EntityId, PlayerId};
/// use ccg_rules::zones::{ZoneId, ZoneManager, ZonePosition};
///
/// let mut zones = ZoneManager::new();
/// let library = ZoneId::library(PlayerId::new(0));
///
/// zones.add_to_zone(EntityId(10), library, ZonePosition::Top);
/// zones.add_to_zone(EntityId(11), library, ZonePosition::Bottom);
///
/// assert_eq!(zones.top(library), Some(EntityId(10)));
/// zones.move_to_zone(EntityId(10), ZoneId::hand(PlayerId::new(0)), ZonePosition::Top);
/// assert_eq!(zones.size(library), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneManager {
    /// Object locations: entity_id -> zone_id
    locations: OrdMap<EntityId, ZoneId>,

    /// Ordered contents of every non-empty zone.
    contents: OrdMap<ZoneId, Vector<EntityId>>,
}

impl ZoneManager {
    /// Create a new empty zone manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_ordered(&mut self, entity: EntityId, zone: ZoneId, position: ZonePosition) {
        let order = self.contents.entry(zone).or_default();
        match position {
            ZonePosition::Top => order.push_back(entity),
            ZonePosition::Bottom => order.push_front(entity),
            ZonePosition::Index(i) => {
                let idx = i.min(order.len());
                order.insert(idx, entity);
            }
        }
    }

    fn remove_ordered(&mut self, entity: EntityId, zone: ZoneId) {
        if let Some(order) = self.contents.get_mut(&zone) {
            order.retain(|&e| e != entity);
        }
    }

    /// Put an object into a zone.
    ///
    /// An object already tracked elsewhere is moved instead, so an entity is
    /// never in two zones.
    pub fn add_to_zone(&mut self, entity: EntityId, zone: ZoneId, position: ZonePosition) {
        if let Some(old) = self.locations.get(&entity).copied() {
            self.remove_ordered(entity, old);
        }
        self.locations.insert(entity, zone);
        self.insert_ordered(entity, zone, position);
    }

    /// Move an object to another zone.
    ///
    /// Returns the old zone, or `None` if the object wasn't tracked (it is
    /// then simply added).
    pub fn move_to_zone(
        &mut self,
        entity: EntityId,
        new_zone: ZoneId,
        position: ZonePosition,
    ) -> Option<ZoneId> {
        let old_zone = self.locations.get(&entity).copied();
        if let Some(old) = old_zone {
            self.remove_ordered(entity, old);
        }
        self.locations.insert(entity, new_zone);
        self.insert_ordered(entity, new_zone, position);
        old_zone
    }

    /// Stop tracking an object. Returns the zone it was in.
    pub fn remove(&mut self, entity: EntityId) -> Option<ZoneId> {
        let zone = self.locations.remove(&entity)?;
        self.remove_ordered(entity, zone);
        Some(zone)
    }

    /// Zone an object is in.
    #[must_use]
    pub fn zone_of(&self, entity: EntityId) -> Option<ZoneId> {
        self.locations.get(&entity).copied()
    }

    /// Is an object in a specific zone?
    #[must_use]
    pub fn is_in_zone(&self, entity: EntityId, zone: ZoneId) -> bool {
        self.locations.get(&entity) == Some(&zone)
    }

    /// Objects in a zone, bottom to top.
    pub fn cards(&self, zone: ZoneId) -> impl Iterator<Item = EntityId> + '_ {
        self.contents.get(&zone).into_iter().flat_map(|v| v.iter().copied())
    }

    /// Objects in a zone as an owned list, bottom to top.
    #[must_use]
    pub fn cards_vec(&self, zone: ZoneId) -> Vec<EntityId> {
        self.cards(zone).collect()
    }

    /// Number of objects in a zone.
    #[must_use]
    pub fn size(&self, zone: ZoneId) -> usize {
        self.contents.get(&zone).map_or(0, Vector::len)
    }

    /// Top object of a zone.
    #[must_use]
    pub fn top(&self, zone: ZoneId) -> Option<EntityId> {
        self.contents.get(&zone)?.last().copied()
    }

    /// Shuffle a zone.
    pub fn shuffle(&mut self, zone: ZoneId, rng: &mut GameRng) {
        if let Some(order) = self.contents.get_mut(&zone) {
            let mut cards: Vec<EntityId> = order.iter().copied().collect();
            rng.shuffle(&mut cards);
            *order = cards.into_iter().collect();
        }
    }

    /// Total number of objects tracked.
    #[must_use]
    pub fn total(&self) -> usize {
        self.locations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P0: PlayerId = PlayerId(0);

    #[test]
    fn test_zone_ids() {
        assert_eq!(ZoneId::of(ZoneKind::Battlefield, P0), ZoneId::BATTLEFIELD);
        assert_eq!(ZoneId::hand(P0).owner, Some(P0));
        assert_eq!(format!("{}", ZoneId::graveyard(P0)), "Player 0's graveyard");
        assert_eq!(format!("{}", ZoneId::STACK), "the stack");
    }

    #[test]
    fn test_ordered_insertion() {
        let mut zones = ZoneManager::new();
        let library = ZoneId::library(P0);

        zones.add_to_zone(EntityId(10), library, ZonePosition::Top);
        zones.add_to_zone(EntityId(11), library, ZonePosition::Bottom);
        zones.add_to_zone(EntityId(12), library, ZonePosition::Top);
        zones.add_to_zone(EntityId(13), library, ZonePosition::Index(1));

        assert_eq!(
            zones.cards_vec(library),
            vec![EntityId(11), EntityId(13), EntityId(10), EntityId(12)]
        );
        assert_eq!(zones.top(library), Some(EntityId(12)));
    }

    #[test]
    fn test_move_between_zones() {
        let mut zones = ZoneManager::new();
        zones.add_to_zone(EntityId(10), ZoneId::hand(P0), ZonePosition::Top);

        let old = zones.move_to_zone(EntityId(10), ZoneId::BATTLEFIELD, ZonePosition::Top);

        assert_eq!(old, Some(ZoneId::hand(P0)));
        assert!(zones.is_in_zone(EntityId(10), ZoneId::BATTLEFIELD));
        assert_eq!(zones.size(ZoneId::hand(P0)), 0);
    }

    #[test]
    fn test_add_existing_entity_moves_it() {
        let mut zones = ZoneManager::new();
        zones.add_to_zone(EntityId(10), ZoneId::hand(P0), ZonePosition::Top);
        zones.add_to_zone(EntityId(10), ZoneId::graveyard(P0), ZonePosition::Top);

        assert_eq!(zones.total(), 1);
        assert_eq!(zones.size(ZoneId::hand(P0)), 0);
        assert_eq!(zones.zone_of(EntityId(10)), Some(ZoneId::graveyard(P0)));
    }

    #[test]
    fn test_remove() {
        let mut zones = ZoneManager::new();
        zones.add_to_zone(EntityId(10), ZoneId::STACK, ZonePosition::Top);

        assert_eq!(zones.remove(EntityId(10)), Some(ZoneId::STACK));
        assert_eq!(zones.zone_of(EntityId(10)), None);
        assert_eq!(zones.top(ZoneId::STACK), None);
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let library = ZoneId::library(P0);
        let mut a = ZoneManager::new();
        for i in 0..20 {
            a.add_to_zone(EntityId(i), library, ZonePosition::Top);
        }
        let mut b = a.clone();
        let before = a.cards_vec(library);

        a.shuffle(library, &mut GameRng::new(42));
        b.shuffle(library, &mut GameRng::new(42));

        assert_ne!(before, a.cards_vec(library));
        assert_eq!(a.cards_vec(library), b.cards_vec(library));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut zones = ZoneManager::new();
        zones.add_to_zone(EntityId(1), ZoneId::BATTLEFIELD, ZonePosition::Top);
        let snapshot = zones.clone();

        zones.remove(EntityId(1));

        assert!(snapshot.is_in_zone(EntityId(1), ZoneId::BATTLEFIELD));
        assert!(!zones.is_in_zone(EntityId(1), ZoneId::BATTLEFIELD));
    }
}
