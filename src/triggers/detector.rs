//! Trigger detection.
//!
//! After each step of an action the engine hands the new events to the
//! `TriggerDetector`, which matches them against the triggered abilities of
//! permanents on the battlefield and of each event's own object. Matches
//! become `PendingTrigger`s, put on the stack in APNAP order once the current
//! step completes.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::cards::CardLookup;
use crate::core::{EntityId, GameState, PlayerId, Result};
use crate::effects::{Effect, ProjectedState, Projector, TargetRequirement};
use crate::zones::ZoneId;

use super::condition::{event_subject, TriggeredAbility};
use super::event::{EventLog, GameEvent};

/// A triggered ability waiting to be put on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTrigger {
    pub source: EntityId,
    pub controller: PlayerId,
    pub effect: Effect,
    pub requirements: Vec<TargetRequirement>,
    pub description: String,
    /// The event that fired it.
    pub event: GameEvent,
}

/// Matches events against triggered abilities.
pub struct TriggerDetector<'a> {
    cards: &'a dyn CardLookup,
}

impl<'a> TriggerDetector<'a> {
    #[must_use]
    pub fn new(cards: &'a dyn CardLookup) -> Self {
        Self { cards }
    }

    /// Detect triggers for the log's unscanned events and mark them scanned.
    pub fn collect(&self, state: &GameState, log: &mut EventLog) -> Result<Vec<PendingTrigger>> {
        if !log.has_unscanned() {
            return Ok(Vec::new());
        }
        let fresh = log.take_unscanned().to_vec();
        self.detect(state, &fresh)
    }

    /// Triggers fired by `events`, in event order.
    ///
    /// A card on the battlefield or named by an event must have a
    /// definition; tokens without a card have no triggers.
    pub fn detect(&self, state: &GameState, events: &[GameEvent]) -> Result<Vec<PendingTrigger>> {
        if events.is_empty() {
            return Ok(Vec::new());
        }
        let projected = Projector::project(state);
        let mut watchers: Vec<(EntityId, PlayerId, &[TriggeredAbility])> = Vec::new();
        for id in state.zones.cards(ZoneId::BATTLEFIELD) {
            let abilities = self.abilities_of(state, id)?;
            if abilities.is_empty() {
                continue;
            }
            if let Some(controller) = projected.get_controller(id) {
                watchers.push((id, controller, abilities));
            }
        }

        let mut found = Vec::new();
        for event in events {
            if let Some(subject) = event_subject(event) {
                let abilities = self.abilities_of(state, subject)?;
                if let Some(controller) = Self::controller_of(state, &projected, subject, event) {
                    for ability in abilities.iter().filter(|a| a.condition.is_self_trigger()) {
                        if ability.condition.matches(event, subject, controller, &projected) {
                            found.push(Self::pending(subject, controller, ability, event));
                        }
                    }
                }
            }

            for (source, controller, abilities) in &watchers {
                for ability in abilities.iter().filter(|a| !a.condition.is_self_trigger()) {
                    if ability.condition.matches(event, *source, *controller, &projected) {
                        found.push(Self::pending(*source, *controller, ability, event));
                    }
                }
            }
        }

        if !found.is_empty() {
            debug!("{} triggers from {} events", found.len(), events.len());
        }
        Ok(found)
    }

    /// Triggered abilities printed on `id`'s card. Gone entities and tokens
    /// have none.
    fn abilities_of<'s>(&'s self, state: &GameState, id: EntityId) -> Result<&'s [TriggeredAbility]> {
        let Some(card) = state.entity(id).and_then(|c| c.card) else {
            return Ok(&[]);
        };
        Ok(self.cards.require_card(card)?.triggers.as_slice())
    }

    fn controller_of(
        state: &GameState,
        projected: &ProjectedState,
        id: EntityId,
        event: &GameEvent,
    ) -> Option<PlayerId> {
        if let GameEvent::Died { controller, .. } = event {
            return Some(*controller);
        }
        projected.get_controller(id).or_else(|| {
            let components = state.entity(id)?;
            components
                .stack_item
                .as_ref()
                .map(|item| item.controller)
                .or(components.controller)
                .or(components.owner)
        })
    }

    fn pending(
        source: EntityId,
        controller: PlayerId,
        ability: &TriggeredAbility,
        event: &GameEvent,
    ) -> PendingTrigger {
        PendingTrigger {
            source,
            controller,
            effect: ability.effect.clone(),
            requirements: ability.targets.clone(),
            description: ability.description.clone(),
            event: event.clone(),
        }
    }
}

/// Sort triggers so the active player's come first, then each other player
/// in turn order. Detection order is kept within one controller.
pub fn apnap_sort(state: &GameState, triggers: &mut [PendingTrigger]) {
    let order = state.apnap_order();
    let rank = |p: PlayerId| order.iter().position(|q| *q == p).unwrap_or(order.len());
    triggers.sort_by_key(|t| rank(t.controller));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardId, CardRegistry, CardType, Characteristics};
    use crate::core::{EngineError, RulesConfig};
    use crate::effects::{Amount, EffectTarget};

    fn trigger(controller: u8, life: u32) -> PendingTrigger {
        PendingTrigger {
            source: EntityId(10 + life),
            controller: PlayerId::new(controller),
            effect: Effect::GainLife {
                amount: Amount::Fixed(life),
                player: EffectTarget::Controller,
            },
            requirements: Vec::new(),
            description: String::new(),
            event: GameEvent::PlayerLost {
                player: PlayerId::new(0),
            },
        }
    }

    #[test]
    fn test_apnap_sort_active_player_first() {
        let mut state = GameState::new(RulesConfig::new(3));
        state.turn.active_player = PlayerId::new(1);

        let mut triggers = vec![trigger(0, 1), trigger(2, 2), trigger(1, 3), trigger(0, 4)];
        apnap_sort(&state, &mut triggers);

        let controllers: Vec<u8> = triggers.iter().map(|t| t.controller.0).collect();
        assert_eq!(controllers, vec![1, 2, 0, 0]);
        // Stable within a controller.
        assert_eq!(triggers[2].source, EntityId(11));
        assert_eq!(triggers[3].source, EntityId(14));
    }

    fn bear(id: u32) -> CardDefinition {
        CardDefinition::new(
            CardId::new(id),
            Characteristics::new("Bear").with_type(CardType::Creature).with_pt(2, 2),
        )
    }

    #[test]
    fn test_card_without_definition_is_invariant_error() {
        let registry = CardRegistry::new();
        let mut state = GameState::new(RulesConfig::new(2));
        let p0 = PlayerId::new(0);
        state.create_card(&bear(7), p0, ZoneId::BATTLEFIELD);
        let event = GameEvent::PlayerLost { player: p0 };

        let err = TriggerDetector::new(&registry).detect(&state, &[event]).unwrap_err();
        assert_eq!(err, EngineError::UnknownCard(CardId::new(7)));
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_tokens_have_no_triggers() {
        let mut registry = CardRegistry::new();
        registry.register(bear(7));
        let mut state = GameState::new(RulesConfig::new(2));
        let p0 = PlayerId::new(0);
        state.create_card(&bear(7), p0, ZoneId::BATTLEFIELD);
        let mut log = EventLog::new();
        state
            .create_token(
                Characteristics::new("Soldier").with_type(CardType::Creature).with_pt(1, 1),
                p0,
                &mut log,
            )
            .unwrap();

        let found = TriggerDetector::new(&registry).collect(&state, &mut log).unwrap();
        assert!(found.is_empty());
        assert!(!log.has_unscanned());
    }
}
