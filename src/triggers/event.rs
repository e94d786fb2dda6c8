//! Game events.
//!
//! Every state change the engine makes is reported as a typed `GameEvent`,
//! appended to an `EventLog` in the order it happened. Hosts consume the log
//! for UI and replay; the engine itself reads it only to detect triggers.

use serde::{Deserialize, Serialize};

use crate::combat::{AttackTarget, DamageRecipient};
use crate::core::{CounterKind, EntityId, PlayerId};
use crate::effects::ActiveFloatingEffect;
use crate::mana::ManaType;
use crate::stack::DecisionId;
use crate::zones::ZoneId;

/// Something that happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    // === Zones ===
    ZoneChanged {
        entity: EntityId,
        from: Option<ZoneId>,
        to: ZoneId,
    },
    EnteredBattlefield {
        entity: EntityId,
        controller: PlayerId,
    },
    /// A permanent went from the battlefield to a graveyard.
    Died {
        entity: EntityId,
        controller: PlayerId,
        was_creature: bool,
    },
    Discarded {
        entity: EntityId,
        player: PlayerId,
    },
    CardDrawn {
        entity: EntityId,
        player: PlayerId,
    },
    TokenCreated {
        entity: EntityId,
        controller: PlayerId,
    },
    /// An object stopped existing (token off the battlefield, resolved ability).
    Ceased {
        entity: EntityId,
    },
    LibrarySearched {
        player: PlayerId,
        found: Option<EntityId>,
    },
    LibraryShuffled {
        player: PlayerId,
    },

    // === Players ===
    LifeChanged {
        player: PlayerId,
        from: i32,
        to: i32,
    },
    PlayerLost {
        player: PlayerId,
    },

    // === Damage and permanents ===
    DamageDealt {
        source: EntityId,
        recipient: DamageRecipient,
        amount: u32,
        combat: bool,
    },
    Tapped {
        entity: EntityId,
    },
    Untapped {
        entity: EntityId,
    },
    CountersChanged {
        entity: EntityId,
        counter: CounterKind,
        delta: i32,
    },
    ManaAdded {
        player: PlayerId,
        mana: ManaType,
        amount: u32,
    },
    ContinuousEffectCreated {
        effect: ActiveFloatingEffect,
    },

    // === Stack ===
    SpellCast {
        spell: EntityId,
        controller: PlayerId,
    },
    AbilityActivated {
        ability: EntityId,
        source: EntityId,
        controller: PlayerId,
    },
    TriggerPutOnStack {
        ability: EntityId,
        source: EntityId,
        controller: PlayerId,
    },
    /// A trigger with no legal targets was removed.
    TriggerRemoved {
        source: EntityId,
        controller: PlayerId,
    },
    Resolved {
        item: EntityId,
    },
    Fizzled {
        item: EntityId,
    },
    Countered {
        item: EntityId,
    },
    SpellCopied {
        original: EntityId,
        copy: EntityId,
    },

    // === Combat ===
    AttackerDeclared {
        attacker: EntityId,
        target: AttackTarget,
    },
    BlockerDeclared {
        blocker: EntityId,
        attacker: EntityId,
    },

    // === Turn and priority ===
    PriorityPassed {
        player: PlayerId,
    },
    TurnBegan {
        player: PlayerId,
        turn: u32,
    },
    DecisionRequested {
        id: DecisionId,
        player: PlayerId,
    },
}

/// Append-only event log with a trigger-scan cursor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<GameEvent>,
    scanned: usize,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events not yet checked for triggers; advances the cursor.
    pub fn take_unscanned(&mut self) -> &[GameEvent] {
        let start = self.scanned;
        self.scanned = self.events.len();
        &self.events[start..]
    }

    #[must_use]
    pub fn has_unscanned(&self) -> bool {
        self.scanned < self.events.len()
    }

    #[must_use]
    pub fn into_events(self) -> Vec<GameEvent> {
        self.events
    }
}

impl Extend<GameEvent> for EventLog {
    fn extend<I: IntoIterator<Item = GameEvent>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}
