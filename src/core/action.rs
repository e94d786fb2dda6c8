//! Player actions.
//!
//! An `Action` is everything a player can ask the engine to do outside of
//! answering a pending decision. Every action names the acting player so the
//! engine can check priority and turn ownership.

use serde::{Deserialize, Serialize};

use crate::combat::{AttackTarget, DamageAssignment};
use crate::effects::Target;
use crate::mana::ManaType;

use super::entity::EntityId;
use super::player::PlayerId;

/// A player action.
///
/// ## Example
///
/// ```
/// use ccg_rules::core::{Action, EntityId, PlayerId};
/// use ccg_rules::effects::Target;
///
/// let bolt_face = Action::CastSpell {
///     player: PlayerId::new(0),
///     card: EntityId(12),
///     targets: vec![Target::Player(PlayerId::new(1))],
///     x: 0,
/// };
/// assert_eq!(bolt_face.player(), PlayerId::new(0));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    PlayLand {
        player: PlayerId,
        card: EntityId,
    },
    CastSpell {
        player: PlayerId,
        card: EntityId,
        targets: Vec<Target>,
        /// Value chosen for X, paid as extra generic mana.
        x: u32,
    },
    /// Activate the non-mana ability at `index` on `source`.
    ActivateAbility {
        player: PlayerId,
        source: EntityId,
        index: usize,
        targets: Vec<Target>,
    },
    /// Tap a mana source. `mana` picks the type for multi-type sources.
    TapForMana {
        player: PlayerId,
        source: EntityId,
        mana: Option<ManaType>,
    },
    PassPriority {
        player: PlayerId,
    },
    BeginCombat {
        player: PlayerId,
    },
    DeclareAttackers {
        player: PlayerId,
        attackers: Vec<(EntityId, AttackTarget)>,
    },
    /// `(blocker, attacker)` pairs.
    DeclareBlockers {
        player: PlayerId,
        blocks: Vec<(EntityId, EntityId)>,
    },
    /// Deal the next combat damage step. Attackers without a manual
    /// assignment use the automatic one.
    CombatDamage {
        player: PlayerId,
        assignments: Vec<DamageAssignment>,
    },
    EndCombat {
        player: PlayerId,
    },
    EndTurn {
        player: PlayerId,
    },
}

impl Action {
    /// The player taking the action.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        match self {
            Action::PlayLand { player, .. }
            | Action::CastSpell { player, .. }
            | Action::ActivateAbility { player, .. }
            | Action::TapForMana { player, .. }
            | Action::PassPriority { player }
            | Action::BeginCombat { player }
            | Action::DeclareAttackers { player, .. }
            | Action::DeclareBlockers { player, .. }
            | Action::CombatDamage { player, .. }
            | Action::EndCombat { player }
            | Action::EndTurn { player } => *player,
        }
    }
}

/// A recorded action with metadata for history tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Turn number when the action was taken.
    pub turn: u32,

    /// Sequence number across the game (for ordering).
    pub sequence: u32,

    pub action: Action,
}

impl ActionRecord {
    #[must_use]
    pub fn new(turn: u32, sequence: u32, action: Action) -> Self {
        Self {
            turn,
            sequence,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_player() {
        let action = Action::DeclareBlockers {
            player: PlayerId::new(1),
            blocks: vec![(EntityId(5), EntityId(6))],
        };
        assert_eq!(action.player(), PlayerId::new(1));
        assert_eq!(
            Action::EndTurn {
                player: PlayerId::new(0)
            }
            .player(),
            PlayerId::new(0)
        );
    }

    #[test]
    fn test_action_record_serialization() {
        let record = ActionRecord::new(
            3,
            17,
            Action::PassPriority {
                player: PlayerId::new(0),
            },
        );
        let bytes = bincode::serialize(&record).unwrap();
        let back: ActionRecord = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, record);
    }
}
