//! Combat bookkeeping stored in `GameState`.

use im::{OrdMap, OrdSet, Vector};
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

/// Where combat is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CombatStep {
    Beginning,
    AttackersDeclared,
    BlockersDeclared,
    /// First-strike damage has been dealt.
    FirstStrikeDamage,
    /// Regular damage has been dealt.
    CombatDamage,
}

/// What an attacker is attacking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttackTarget {
    Player(PlayerId),
    Planeswalker(EntityId),
}

/// Attackers, blockers and progress through the damage steps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    pub step: CombatStep,
    pub attacking_player: PlayerId,
    /// Attackers in declaration order.
    pub attackers: Vector<(EntityId, AttackTarget)>,
    /// Blocker -> attacker it blocks.
    pub blocks: OrdMap<EntityId, EntityId>,
    /// Attacker -> blockers in declaration (damage assignment) order.
    pub blocked_by: OrdMap<EntityId, Vector<EntityId>>,
    /// Attackers that became blocked. They stay blocked if every blocker
    /// leaves combat.
    pub blocked: OrdSet<EntityId>,
    /// Defending players who have declared blockers.
    pub defenders_declared: OrdSet<PlayerId>,
}

impl CombatState {
    #[must_use]
    pub fn new(attacking_player: PlayerId) -> Self {
        Self {
            step: CombatStep::Beginning,
            attacking_player,
            attackers: Vector::new(),
            blocks: OrdMap::new(),
            blocked_by: OrdMap::new(),
            blocked: OrdSet::new(),
            defenders_declared: OrdSet::new(),
        }
    }

    #[must_use]
    pub fn is_attacking(&self, id: EntityId) -> bool {
        self.attackers.iter().any(|(a, _)| *a == id)
    }

    #[must_use]
    pub fn is_blocking(&self, id: EntityId) -> bool {
        self.blocks.contains_key(&id)
    }

    #[must_use]
    pub fn attack_target(&self, attacker: EntityId) -> Option<AttackTarget> {
        self.attackers
            .iter()
            .find(|(a, _)| *a == attacker)
            .map(|(_, t)| *t)
    }

    /// Blockers of `attacker` still in combat, in order.
    #[must_use]
    pub fn blockers_of(&self, attacker: EntityId) -> Vec<EntityId> {
        self.blocked_by
            .get(&attacker)
            .map(|b| b.iter().copied().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_blocked(&self, attacker: EntityId) -> bool {
        self.blocked.contains(&attacker)
    }

    /// Record a block.
    pub fn add_block(&mut self, blocker: EntityId, attacker: EntityId) {
        self.blocks.insert(blocker, attacker);
        self.blocked_by
            .entry(attacker)
            .or_insert_with(Vector::new)
            .push_back(blocker);
        self.blocked.insert(attacker);
    }

    /// Take an object out of combat (it left the battlefield).
    pub fn remove(&mut self, id: EntityId) {
        self.attackers.retain(|(a, _)| *a != id);
        self.blocked_by.remove(&id);
        if let Some(attacker) = self.blocks.remove(&id) {
            if let Some(blockers) = self.blocked_by.get_mut(&attacker) {
                blockers.retain(|b| *b != id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_bookkeeping() {
        let mut combat = CombatState::new(PlayerId::new(0));
        combat
            .attackers
            .push_back((EntityId(10), AttackTarget::Player(PlayerId::new(1))));
        combat.add_block(EntityId(20), EntityId(10));
        combat.add_block(EntityId(21), EntityId(10));

        assert!(combat.is_attacking(EntityId(10)));
        assert!(combat.is_blocking(EntityId(21)));
        assert_eq!(combat.blockers_of(EntityId(10)), vec![EntityId(20), EntityId(21)]);
    }

    #[test]
    fn test_removed_blocker_leaves_attacker_blocked() {
        let mut combat = CombatState::new(PlayerId::new(0));
        combat
            .attackers
            .push_back((EntityId(10), AttackTarget::Player(PlayerId::new(1))));
        combat.add_block(EntityId(20), EntityId(10));

        combat.remove(EntityId(20));
        assert!(combat.blockers_of(EntityId(10)).is_empty());
        assert!(combat.is_blocked(EntityId(10)));
        assert!(!combat.is_blocking(EntityId(20)));
    }
}
