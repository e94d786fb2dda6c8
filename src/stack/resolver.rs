//! Resolving the top of the stack.
//!
//! ## Fizzling
//!
//! Targets are checked again on resolution. An item whose targets are all
//! illegal is removed without effect; so is one with any illegal target that
//! requires all of them. Otherwise it resolves against the legal ones.
//!
//! ## Where the item goes
//!
//! - Permanent spells enter the battlefield under their controller (auras
//!   attach to their target, copies become tokens).
//! - Other spells leave the stack while their effect runs, then go to their
//!   owner's graveyard.
//! - Abilities and copies cease to exist.

use log::debug;

use crate::cards::CardLookup;
use crate::core::{EngineError, EntityId, GameState, Result, Timestamp};
use crate::effects::{ActiveFloatingEffect, EffectExecutor, ExecutionContext, Target, TargetValidator};
use crate::triggers::{EventLog, GameEvent};
use crate::zones::ZoneId;

use super::{Continuation, DecisionAnswer, DecisionId, PendingDecision, StackItem};

/// How a resolution attempt ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackResolution {
    EmptyStack,
    Fizzled {
        item: EntityId,
    },
    Resolved {
        item: EntityId,
        /// Floating effects the resolution created.
        created_effects: Vec<ActiveFloatingEffect>,
    },
    /// The item's effect is waiting on a decision.
    Paused {
        decision: PendingDecision,
    },
}

/// New state, the events produced, and the outcome.
#[derive(Clone, Debug)]
pub struct ResolutionResult {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    pub outcome: StackResolution,
}

/// Resolves stack items.
pub struct StackResolver<'a> {
    cards: &'a dyn CardLookup,
}

impl<'a> StackResolver<'a> {
    #[must_use]
    pub fn new(cards: &'a dyn CardLookup) -> Self {
        Self { cards }
    }

    /// Resolve the top item of `state`'s stack, leaving `state` untouched.
    ///
    /// ## Example
    ///
    /// ```
    /// use ccg_rules::cards::CardRegistry;
    /// use ccg_rules::core::{GameState, RulesConfig};
    /// use ccg_rules::stack::{StackResolution, StackResolver};
    ///
    /// let registry = CardRegistry::new();
    /// let state = GameState::new(RulesConfig::new(2));
    ///
    /// let result = StackResolver::new(&registry).resolve_top_of_stack(&state).unwrap();
    /// assert_eq!(result.outcome, StackResolution::EmptyStack);
    /// assert!(result.events.is_empty());
    /// ```
    pub fn resolve_top_of_stack(&self, state: &GameState) -> Result<ResolutionResult> {
        let mut working = state.clone();
        let mut events = EventLog::new();
        let outcome = self.resolve_top(&mut working, &mut events)?;
        Ok(ResolutionResult {
            state: working,
            events: events.into_events(),
            outcome,
        })
    }

    /// Resolve the top item in place.
    pub fn resolve_top(&self, state: &mut GameState, events: &mut EventLog) -> Result<StackResolution> {
        let Some(id) = state.zones.top(ZoneId::STACK) else {
            return Ok(StackResolution::EmptyStack);
        };
        let components = state.require_entity(id)?;
        let item = components
            .stack_item
            .clone()
            .ok_or_else(|| EngineError::missing(id, "stack item"))?;
        let is_permanent = item.is_spell()
            && components
                .characteristics
                .as_ref()
                .is_some_and(|c| c.is_permanent());

        let targets = TargetValidator::new(state).revalidate(
            &item.requirements,
            &item.targets,
            item.controller,
            item.source,
        );
        let illegal = targets.iter().filter(|t| t.is_none()).count();
        let fizzles = !item.targets.is_empty()
            && (illegal == item.targets.len() || (illegal > 0 && item.requires_all_targets));
        if fizzles {
            Self::fizzle(state, id, &item, events)?;
            return Ok(StackResolution::Fizzled { item: id });
        }

        debug!("resolving {id} ({:?}) for {}", item.kind, item.controller);
        let since = state.peek_timestamp();

        if is_permanent {
            Self::resolve_permanent(state, id, &item, &targets, events)?;
            return Ok(StackResolution::Resolved {
                item: id,
                created_effects: Vec::new(),
            });
        }

        state.zones.remove(id);
        state
            .continuations
            .push_deferred(Continuation::FinishResolution { item: id, since });
        if let Some(effect) = &item.effect {
            let context = ExecutionContext::new(item.controller, item.source)
                .with_targets(targets)
                .with_x(item.x);
            state.continuations.push_deferred(Continuation::RunEffects {
                effects: effect.flatten().into_iter().collect(),
                context,
            });
        }

        match EffectExecutor::new(self.cards).drive(state, events)? {
            Some(decision) => Ok(StackResolution::Paused { decision }),
            None => Ok(StackResolution::Resolved {
                item: id,
                created_effects: Self::created_since(state, since),
            }),
        }
    }

    /// Answer decision `id` and carry on.
    ///
    /// When the decision belonged to a paused resolution, the outcome is
    /// that resolution's: `Paused` again, or `Resolved` with every floating
    /// effect it created, before and after the pause. Other decisions (such
    /// as trigger targets) give `None` once nothing is left waiting.
    pub fn resume(
        &self,
        state: &mut GameState,
        id: DecisionId,
        answer: DecisionAnswer,
        events: &mut EventLog,
    ) -> Result<Option<StackResolution>> {
        let resolving = state.continuations.resolving();
        if let Some(decision) = EffectExecutor::new(self.cards).resume(state, id, answer, events)? {
            return Ok(Some(StackResolution::Paused { decision }));
        }
        Ok(resolving.map(|(item, since)| StackResolution::Resolved {
            item,
            created_effects: Self::created_since(state, since),
        }))
    }

    fn created_since(state: &GameState, since: Timestamp) -> Vec<ActiveFloatingEffect> {
        state
            .floating_effects
            .iter()
            .filter(|floating| floating.effect.timestamp >= since)
            .cloned()
            .collect()
    }

    fn fizzle(state: &mut GameState, id: EntityId, item: &StackItem, events: &mut EventLog) -> Result<()> {
        debug!("{id} fizzles: targets are illegal");
        if item.is_ephemeral() {
            state.remove_entity(id);
            events.push(GameEvent::Ceased { entity: id });
        } else {
            let owner = state.owner_of(id)?;
            state.move_entity(id, ZoneId::graveyard(owner), events)?;
        }
        events.push(GameEvent::Fizzled { item: id });
        Ok(())
    }

    fn resolve_permanent(
        state: &mut GameState,
        id: EntityId,
        item: &StackItem,
        targets: &[Option<Target>],
        events: &mut EventLog,
    ) -> Result<()> {
        let controller = item.controller;
        let is_copy = item.is_copy;
        state.update_entity(id, |c| {
            c.controller = Some(controller);
            c.is_token |= is_copy;
        })?;
        state.move_entity(id, ZoneId::BATTLEFIELD, events)?;

        let attach_to = targets.iter().flatten().find_map(Target::entity);
        let is_aura = state
            .entity(id)
            .and_then(|c| c.characteristics.as_ref())
            .is_some_and(|c| c.is_aura());
        if is_aura {
            state.update_entity(id, |c| c.attached_to = attach_to)?;
        }
        events.push(GameEvent::Resolved { item: id });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardId, CardRegistry, CardType, Characteristics};
    use crate::core::{Components, PlayerId, RulesConfig};
    use crate::effects::{Amount, Effect, EffectTarget, TargetRequirement};
    use crate::stack::StackItemKind;

    fn put_spell(state: &mut GameState, definition: &CardDefinition, controller: PlayerId, targets: Vec<Target>) -> EntityId {
        let id = state.create_card(definition, controller, ZoneId::hand(controller));
        let item = StackItem::new(StackItemKind::Spell, controller, id)
            .with_effect(definition.spell.effect.clone())
            .with_targets(definition.spell.targets.clone(), targets);
        state
            .update_entity(id, |c| {
                c.stack_item = Some(item);
                c.controller = Some(controller);
            })
            .unwrap();
        state.zones.move_to_zone(id, ZoneId::STACK, crate::zones::ZonePosition::Top);
        id
    }

    fn shock() -> CardDefinition {
        CardDefinition::new(CardId::new(1), Characteristics::new("Shock").with_type(CardType::Instant))
            .with_spell_effect(Effect::DealDamage {
                amount: Amount::Fixed(2),
                to: EffectTarget::Target(0),
            })
            .with_spell_target(TargetRequirement::any())
    }

    #[test]
    fn test_resolve_spell_to_graveyard() {
        let registry = CardRegistry::new();
        let mut state = GameState::new(RulesConfig::new(2));
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        let spell = put_spell(&mut state, &shock(), p0, vec![Target::Player(p1)]);

        let result = StackResolver::new(&registry).resolve_top_of_stack(&state).unwrap();
        assert!(matches!(result.outcome, StackResolution::Resolved { item, .. } if item == spell));
        assert_eq!(result.state.players[p1].life, 18);
        assert!(result.state.zones.is_in_zone(spell, ZoneId::graveyard(p0)));
        assert!(result.state.stack_is_empty());
        // Input untouched.
        assert_eq!(state.players[p1].life, 20);
    }

    #[test]
    fn test_fizzle_when_target_gone() {
        let registry = CardRegistry::new();
        let mut state = GameState::new(RulesConfig::new(2));
        let p0 = PlayerId::new(0);
        let bear = CardDefinition::new(
            CardId::new(2),
            Characteristics::new("Bear").with_type(CardType::Creature).with_pt(2, 2),
        );
        let target = state.create_card(&bear, PlayerId::new(1), ZoneId::BATTLEFIELD);
        let spell = put_spell(&mut state, &shock(), p0, vec![Target::permanent(target)]);
        let mut events = EventLog::new();
        state
            .move_entity(target, ZoneId::graveyard(PlayerId::new(1)), &mut events)
            .unwrap();

        let result = StackResolver::new(&registry).resolve_top_of_stack(&state).unwrap();
        assert_eq!(result.outcome, StackResolution::Fizzled { item: spell });
        assert!(result.state.zones.is_in_zone(spell, ZoneId::graveyard(p0)));
        assert!(result
            .events
            .iter()
            .all(|e| !matches!(e, GameEvent::DamageDealt { .. })));
    }

    #[test]
    fn test_ability_ceases_after_resolution() {
        let registry = CardRegistry::new();
        let mut state = GameState::new(RulesConfig::new(2));
        let p0 = PlayerId::new(0);
        let item = StackItem::new(StackItemKind::ActivatedAbility, p0, EntityId(50)).with_effect(Some(
            Effect::GainLife {
                amount: Amount::Fixed(1),
                player: EffectTarget::Controller,
            },
        ));
        let id = state.insert_entity(Components::new().with_controller(p0).with_stack_item(item));
        state.zones.add_to_zone(id, ZoneId::STACK, crate::zones::ZonePosition::Top);

        let result = StackResolver::new(&registry).resolve_top_of_stack(&state).unwrap();
        assert!(matches!(result.outcome, StackResolution::Resolved { .. }));
        assert!(result.state.entity(id).is_none());
        assert_eq!(result.state.players[p0].life, 21);
    }

    #[test]
    fn test_missing_stack_item_is_invariant_error() {
        let registry = CardRegistry::new();
        let mut state = GameState::new(RulesConfig::new(2));
        let id = state.insert_entity(Components::new());
        state.zones.add_to_zone(id, ZoneId::STACK, crate::zones::ZonePosition::Top);

        let err = StackResolver::new(&registry).resolve_top_of_stack(&state).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_resume_reports_effects_from_before_the_pause() {
        let registry = CardRegistry::new();
        let mut state = GameState::new(RulesConfig::new(2));
        let p0 = PlayerId::new(0);
        let bear = CardDefinition::new(
            CardId::new(2),
            Characteristics::new("Bear").with_type(CardType::Creature).with_pt(2, 2),
        );
        let target = state.create_card(&bear, p0, ZoneId::BATTLEFIELD);
        let kept = state.create_card(&bear, p0, ZoneId::hand(p0));
        let tossed = state.create_card(&bear, p0, ZoneId::hand(p0));
        let surge = CardDefinition::new(CardId::new(3), Characteristics::new("Surge").with_type(CardType::Instant))
            .with_spell_effect(Effect::sequence([
                Effect::pump(EffectTarget::Target(0), 3, 3),
                Effect::Discard {
                    count: 1,
                    player: EffectTarget::Controller,
                },
            ]))
            .with_spell_target(TargetRequirement::creature());
        let spell = put_spell(&mut state, &surge, p0, vec![Target::permanent(target)]);

        let resolver = StackResolver::new(&registry);
        let mut events = EventLog::new();
        let decision = match resolver.resolve_top(&mut state, &mut events).unwrap() {
            StackResolution::Paused { decision } => decision,
            other => panic!("expected a discard choice, got {other:?}"),
        };

        let mut events = EventLog::new();
        let outcome = resolver
            .resume(&mut state, decision.id, DecisionAnswer::Entities(vec![tossed]), &mut events)
            .unwrap();
        let Some(StackResolution::Resolved { item, created_effects }) = outcome else {
            panic!("expected the spell to finish, got {outcome:?}");
        };
        assert_eq!(item, spell);
        assert_eq!(created_effects.len(), 1);
        assert!(created_effects[0].effect.affected.contains(&target));
        assert!(state.zones.is_in_zone(kept, ZoneId::hand(p0)));
        assert!(state.zones.is_in_zone(spell, ZoneId::graveyard(p0)));
        assert!(state.continuations.is_empty());
    }
}
