//! Trigger conditions and triggered abilities.
//!
//! A condition is matched against one event. "Self" conditions watch the
//! object carrying the ability wherever it is (a card that just died or was
//! discarded still sees its own event); the rest watch the battlefield.

use serde::{Deserialize, Serialize};

use crate::combat::DamageRecipient;
use crate::core::{EntityId, PlayerId};
use crate::effects::{Effect, ProjectedState, TargetRequirement};

use super::event::GameEvent;

/// When a triggered ability fires.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerCondition {
    // === About the source itself ===
    SelfEntersBattlefield,
    SelfDies,
    SelfDiscarded,
    SelfCast,
    SelfAttacks,
    SelfDealsCombatDamageToPlayer,

    // === About other objects ===
    /// Another creature enters under the source controller's control.
    CreatureYouControlEnters,
    AnyCreatureDies,
    /// The source's controller casts another spell.
    YouCastSpell,
}

impl TriggerCondition {
    /// Watches its own object rather than the battlefield.
    #[must_use]
    pub const fn is_self_trigger(&self) -> bool {
        matches!(
            self,
            TriggerCondition::SelfEntersBattlefield
                | TriggerCondition::SelfDies
                | TriggerCondition::SelfDiscarded
                | TriggerCondition::SelfCast
                | TriggerCondition::SelfAttacks
                | TriggerCondition::SelfDealsCombatDamageToPlayer
        )
    }

    /// Does `event` fire this condition for an ability on `source`
    /// controlled by `controller`?
    #[must_use]
    pub fn matches(
        &self,
        event: &GameEvent,
        source: EntityId,
        controller: PlayerId,
        projected: &ProjectedState,
    ) -> bool {
        match (self, event) {
            (TriggerCondition::SelfEntersBattlefield, GameEvent::EnteredBattlefield { entity, .. }) => {
                *entity == source
            }
            (TriggerCondition::SelfDies, GameEvent::Died { entity, .. }) => *entity == source,
            (TriggerCondition::SelfDiscarded, GameEvent::Discarded { entity, .. }) => *entity == source,
            (TriggerCondition::SelfCast, GameEvent::SpellCast { spell, .. }) => *spell == source,
            (TriggerCondition::SelfAttacks, GameEvent::AttackerDeclared { attacker, .. }) => {
                *attacker == source
            }
            (
                TriggerCondition::SelfDealsCombatDamageToPlayer,
                GameEvent::DamageDealt {
                    source: dealer,
                    recipient: DamageRecipient::Player(_),
                    combat: true,
                    ..
                },
            ) => *dealer == source,
            (
                TriggerCondition::CreatureYouControlEnters,
                GameEvent::EnteredBattlefield {
                    entity,
                    controller: entered_under,
                },
            ) => {
                *entity != source
                    && *entered_under == controller
                    && projected.get(*entity).is_some_and(|o| o.is_creature())
            }
            (TriggerCondition::AnyCreatureDies, GameEvent::Died { was_creature, .. }) => *was_creature,
            (
                TriggerCondition::YouCastSpell,
                GameEvent::SpellCast {
                    spell,
                    controller: caster,
                },
            ) => *spell != source && *caster == controller,
            _ => false,
        }
    }
}

/// A triggered ability printed on a card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredAbility {
    pub condition: TriggerCondition,
    pub effect: Effect,
    pub targets: Vec<TargetRequirement>,
    pub description: String,
}

impl TriggeredAbility {
    #[must_use]
    pub fn new(condition: TriggerCondition, effect: Effect) -> Self {
        Self {
            condition,
            effect,
            targets: Vec::new(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn with_target(mut self, requirement: TargetRequirement) -> Self {
        self.targets.push(requirement);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// The object an event is about, for self-trigger lookup.
pub(crate) fn event_subject(event: &GameEvent) -> Option<EntityId> {
    match event {
        GameEvent::EnteredBattlefield { entity, .. }
        | GameEvent::Died { entity, .. }
        | GameEvent::Discarded { entity, .. } => Some(*entity),
        GameEvent::SpellCast { spell, .. } => Some(*spell),
        GameEvent::AttackerDeclared { attacker, .. } => Some(*attacker),
        GameEvent::DamageDealt { source, .. } => Some(*source),
        _ => None,
    }
}
