//! The rules engine entry points.
//!
//! `Engine::execute` applies one player action to a game state and
//! `Engine::resume` answers a pending decision. Both are pure with respect
//! to their input: they work on a clone and hand back a new state.
//!
//! ## Settling
//!
//! After the action itself, the engine settles the game before anyone gets
//! priority:
//!
//! 1. State-based actions run until nothing applies
//! 2. New events are scanned for triggers, which join the pending queue
//! 3. Pending triggers go on the stack in APNAP order; a trigger that needs
//!    targets pauses the engine until its controller chooses them
//!
//! These repeat until nothing changes or a decision is needed.

use log::{debug, error, warn};

use crate::cards::{CardLookup, CardType, Keyword};
use crate::combat::CombatManager;
use crate::core::{Action, Components, EngineError, EntityId, GameState, PlayerId, Result};
use crate::effects::{created_effects, ActiveFloatingEffect, EffectExecutor, Projector, Target, TargetValidator};
use crate::mana::{ManaSolver, ManaType};
use crate::stack::{
    DecisionAnswer, DecisionId, PassOutcome, PendingDecision, PriorityManager, StackItem,
    StackItemKind, StackResolution, StackResolver,
};
use crate::triggers::{apnap_sort, EventLog, GameEvent, TriggerDetector};
use crate::zones::{ZoneId, ZoneKind, ZonePosition};

use super::state_based::StateBasedActions;
use super::turn::TurnManager;

/// The outcome of `Engine::execute` or `Engine::resume`.
#[derive(Clone, Debug)]
pub enum ExecutionResult {
    Success {
        state: GameState,
        events: Vec<GameEvent>,
    },
    /// Rejected. `state` is the caller's state, unchanged.
    Error { state: GameState, error: EngineError },
    /// Waiting on `decision`; answer it with `Engine::resume`.
    Paused {
        state: GameState,
        decision: PendingDecision,
        events: Vec<GameEvent>,
    },
}

impl ExecutionResult {
    #[must_use]
    pub fn state(&self) -> &GameState {
        match self {
            ExecutionResult::Success { state, .. }
            | ExecutionResult::Error { state, .. }
            | ExecutionResult::Paused { state, .. } => state,
        }
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        match self {
            ExecutionResult::Success { state, .. }
            | ExecutionResult::Error { state, .. }
            | ExecutionResult::Paused { state, .. } => state,
        }
    }

    /// Events produced; empty for a rejection.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        match self {
            ExecutionResult::Success { events, .. } | ExecutionResult::Paused { events, .. } => events,
            ExecutionResult::Error { .. } => &[],
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&EngineError> {
        match self {
            ExecutionResult::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn decision(&self) -> Option<&PendingDecision> {
        match self {
            ExecutionResult::Paused { decision, .. } => Some(decision),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    /// Floating effects created during this call.
    #[must_use]
    pub fn created_effects(&self) -> Vec<ActiveFloatingEffect> {
        created_effects(self.events())
    }
}

/// Applies actions and decision answers to game states.
///
/// ## Example
///
/// ```
/// use ccg_rules::cards::CardRegistry;
/// use ccg_rules::core::{Action, GameState, PlayerId, RulesConfig};
/// use ccg_rules::rules::Engine;
///
/// let registry = CardRegistry::new();
/// let engine = Engine::new(&registry);
/// let state = GameState::new(RulesConfig::new(2));
///
/// let result = engine.execute(&state, Action::PassPriority { player: PlayerId::new(0) });
/// assert!(result.is_success());
/// assert_eq!(result.state().turn.priority_player, PlayerId::new(1));
///
/// let rejected = engine.execute(&state, Action::PassPriority { player: PlayerId::new(1) });
/// assert!(rejected.error().is_some());
/// assert_eq!(rejected.state(), &state);
/// ```
pub struct Engine<'a> {
    cards: &'a dyn CardLookup,
}

impl<'a> Engine<'a> {
    #[must_use]
    pub fn new(cards: &'a dyn CardLookup) -> Self {
        Self { cards }
    }

    /// Apply `action` to a copy of `state`.
    pub fn execute(&self, state: &GameState, action: Action) -> ExecutionResult {
        if state.is_game_over() {
            return Self::reject(state, &action, EngineError::GameOver);
        }
        if let Some(decision) = &state.pending_decision {
            return Self::reject(state, &action, EngineError::DecisionPending(decision.id));
        }

        let mut working = state.clone();
        let mut events = EventLog::new();
        let outcome = self
            .apply(&mut working, &action, &mut events)
            .and_then(|paused| match paused {
                Some(decision) => Ok(Some(decision)),
                None => self.settle(&mut working, &mut events),
            });

        match outcome {
            Ok(decision) => {
                working.record_action(action);
                Self::finish(working, events, decision)
            }
            Err(error) => Self::reject(state, &action, error),
        }
    }

    /// Answer the pending decision `id` on a copy of `state`.
    ///
    /// # Panics
    ///
    /// If nothing in `state` is waiting on `id`.
    pub fn resume(&self, state: &GameState, id: DecisionId, answer: DecisionAnswer) -> ExecutionResult {
        let mut working = state.clone();
        let mut events = EventLog::new();
        let outcome = StackResolver::new(self.cards)
            .resume(&mut working, id, answer, &mut events)
            .and_then(|resolution| match resolution {
                Some(StackResolution::Paused { decision }) => Ok(Some(decision)),
                Some(StackResolution::Resolved { item, created_effects: created }) => {
                    debug!("{item} resolved after {id} with {} new effects", created.len());
                    self.settle(&mut working, &mut events)
                }
                _ => self.settle(&mut working, &mut events),
            });

        match outcome {
            Ok(decision) => Self::finish(working, events, decision),
            Err(error) => {
                Self::log_error(&format!("answer to {id}"), &error);
                ExecutionResult::Error {
                    state: state.clone(),
                    error,
                }
            }
        }
    }

    fn finish(state: GameState, events: EventLog, decision: Option<PendingDecision>) -> ExecutionResult {
        let events = events.into_events();
        match decision {
            Some(decision) => ExecutionResult::Paused {
                state,
                decision,
                events,
            },
            None => ExecutionResult::Success { state, events },
        }
    }

    fn reject(state: &GameState, action: &Action, error: EngineError) -> ExecutionResult {
        Self::log_error(&format!("{action:?}"), &error);
        ExecutionResult::Error {
            state: state.clone(),
            error,
        }
    }

    fn log_error(what: &str, error: &EngineError) {
        if error.is_invariant_violation() {
            error!("invariant violated by {what}: {error}");
        } else {
            warn!("rejected {what}: {error}");
        }
    }

    /// State-based actions and triggers until the game is stable or a
    /// trigger needs a decision.
    fn settle(&self, state: &mut GameState, events: &mut EventLog) -> Result<Option<PendingDecision>> {
        let detector = TriggerDetector::new(self.cards);
        let executor = EffectExecutor::new(self.cards);
        loop {
            if let Some(decision) = &state.pending_decision {
                return Ok(Some(decision.clone()));
            }
            StateBasedActions::run(state, events)?;

            let fresh = detector.collect(state, events)?;
            if !fresh.is_empty() {
                let mut queued: Vec<_> = state.pending_triggers.iter().cloned().collect();
                queued.extend(fresh);
                apnap_sort(state, &mut queued);
                state.pending_triggers = queued.into_iter().collect();
            }
            if state.is_game_over() {
                state.pending_triggers.clear();
                return Ok(None);
            }

            let Some(trigger) = state.pending_triggers.pop_front() else {
                return Ok(None);
            };
            executor.begin_trigger(state, trigger, false, events);
        }
    }

    fn apply(&self, state: &mut GameState, action: &Action, events: &mut EventLog) -> Result<Option<PendingDecision>> {
        debug!("{action:?}");
        match action {
            Action::PlayLand { player, card } => self.play_land(state, *player, *card, events)?,
            Action::CastSpell {
                player,
                card,
                targets,
                x,
            } => self.cast_spell(state, *player, *card, targets, *x, events)?,
            Action::ActivateAbility {
                player,
                source,
                index,
                targets,
            } => self.activate_ability(state, *player, *source, *index, targets, events)?,
            Action::TapForMana {
                player,
                source,
                mana,
            } => Self::tap_for_mana(state, *player, *source, *mana, events)?,
            Action::PassPriority { player } => return self.pass_priority(state, *player, events),
            Action::BeginCombat { player } => {
                CombatManager::begin(state, *player)?;
                PriorityManager::reset(state);
            }
            Action::DeclareAttackers { player, attackers } => {
                CombatManager::declare_attackers(state, *player, attackers, events)?;
                PriorityManager::reset(state);
            }
            Action::DeclareBlockers { player, blocks } => {
                CombatManager::declare_blockers(state, *player, blocks, events)?;
                PriorityManager::reset(state);
            }
            Action::CombatDamage {
                player,
                assignments,
            } => {
                CombatManager::combat_damage(state, *player, assignments, events)?;
                PriorityManager::reset(state);
            }
            Action::EndCombat { player } => {
                CombatManager::end(state, *player)?;
                PriorityManager::reset(state);
            }
            Action::EndTurn { player } => {
                if !state.pending_triggers.is_empty() {
                    return Err(EngineError::Timing("triggers are waiting for the stack".into()));
                }
                TurnManager::end_turn(state, *player, events)?;
            }
        }
        Ok(None)
    }

    // === Timing ===

    /// Sorcery timing: active player, main phase, empty stack.
    fn require_sorcery_timing(state: &GameState, player: PlayerId) -> Result<()> {
        if state.turn.active_player != player {
            return Err(EngineError::NotActivePlayer(player));
        }
        if !state.turn.phase.is_main() {
            return Err(EngineError::Timing("only during a main phase".into()));
        }
        if !state.stack_is_empty() {
            return Err(EngineError::Timing("only while the stack is empty".into()));
        }
        Ok(())
    }

    fn require_in_zone(state: &GameState, entity: EntityId, zone: ZoneId) -> Result<()> {
        if !state.zones.is_in_zone(entity, zone) {
            return Err(EngineError::WrongZone {
                entity,
                expected: zone,
            });
        }
        Ok(())
    }

    // === Actions ===

    fn play_land(&self, state: &mut GameState, player: PlayerId, card: EntityId, events: &mut EventLog) -> Result<()> {
        PriorityManager::require(state, player)?;
        Self::require_sorcery_timing(state, player)?;
        Self::require_in_zone(state, card, ZoneId::hand(player))?;
        let is_land = state
            .require_entity(card)?
            .characteristics
            .as_ref()
            .is_some_and(|c| c.has_type(CardType::Land));
        if !is_land {
            return Err(EngineError::InvalidAction(format!("{card} is not a land")));
        }
        if state.players[player].lands_played >= state.config.lands_per_turn {
            return Err(EngineError::InvalidAction("no land plays left this turn".into()));
        }

        state.move_entity(card, ZoneId::BATTLEFIELD, events)?;
        state.players[player].lands_played += 1;
        PriorityManager::give(state, player);
        Ok(())
    }

    fn cast_spell(
        &self,
        state: &mut GameState,
        player: PlayerId,
        card: EntityId,
        targets: &[Target],
        x: u32,
        events: &mut EventLog,
    ) -> Result<()> {
        PriorityManager::require(state, player)?;
        Self::require_in_zone(state, card, ZoneId::hand(player))?;
        let card_id = state
            .require_entity(card)?
            .card
            .ok_or_else(|| EngineError::missing(card, "card"))?;
        let definition = self.cards.require_card(card_id)?;
        let characteristics = &definition.characteristics;
        if characteristics.has_type(CardType::Land) {
            return Err(EngineError::InvalidAction("lands are played, not cast".into()));
        }
        let instant_speed = characteristics.has_type(CardType::Instant)
            || characteristics.keywords.contains(&Keyword::Flash);
        if !instant_speed {
            Self::require_sorcery_timing(state, player)?;
        }

        TargetValidator::new(state).validate(&definition.spell.targets, targets, player, card)?;
        let solution = ManaSolver::solve(state, player, &definition.mana_cost, x).ok_or_else(|| {
            EngineError::CannotPay(definition.mana_cost.with_generic(x))
        })?;
        ManaSolver::apply(state, player, &solution, events)?;

        let mut item = StackItem::new(StackItemKind::Spell, player, card)
            .with_effect(definition.spell.effect.clone())
            .with_targets(definition.spell.targets.clone(), targets.iter().copied());
        item.requires_all_targets = definition.spell.requires_all_targets;
        item.x = x;
        state.update_entity(card, |c| {
            c.stack_item = Some(item);
            c.controller = Some(player);
        })?;
        state.move_entity(card, ZoneId::STACK, events)?;

        state.turn.spells_cast_this_turn += 1;
        events.push(GameEvent::SpellCast {
            spell: card,
            controller: player,
        });
        debug!("{player} casts {} ({card})", definition.name());
        PriorityManager::give(state, player);
        Ok(())
    }

    fn activate_ability(
        &self,
        state: &mut GameState,
        player: PlayerId,
        source: EntityId,
        index: usize,
        targets: &[Target],
        events: &mut EventLog,
    ) -> Result<()> {
        PriorityManager::require(state, player)?;
        let components = state.require_entity(source)?;
        let card_id = components.card.ok_or_else(|| EngineError::missing(source, "card"))?;
        let definition = self.cards.require_card(card_id)?;
        let ability = definition
            .activated
            .get(index)
            .ok_or_else(|| EngineError::InvalidAction(format!("{source} has no ability {index}")))?;

        match ability.zone {
            ZoneKind::Battlefield => {
                Self::require_in_zone(state, source, ZoneId::BATTLEFIELD)?;
                let controller = Projector::project(state).get_controller(source);
                if controller != Some(player) {
                    return Err(EngineError::NotController(player, source));
                }
            }
            kind => Self::require_in_zone(state, source, ZoneId::of(kind, player))?,
        }
        if ability.sorcery_speed {
            Self::require_sorcery_timing(state, player)?;
        }
        if ability.cost.tap && !TurnManager::can_tap(state, source) {
            return Err(EngineError::InvalidAction(format!("{source} can't be tapped")));
        }
        if ability.cost.discard_self {
            Self::require_in_zone(state, source, ZoneId::hand(player))?;
        }
        TargetValidator::new(state).validate(&ability.targets, targets, player, source)?;
        let solution = ManaSolver::solve(state, player, &ability.cost.mana, 0)
            .ok_or_else(|| EngineError::CannotPay(ability.cost.mana))?;
        if ability.cost.tap && solution.taps.iter().any(|(id, _)| *id == source) {
            return Err(EngineError::CannotPay(ability.cost.mana));
        }

        ManaSolver::apply(state, player, &solution, events)?;
        if ability.cost.tap {
            state.update_entity(source, |c| c.tapped = true)?;
            events.push(GameEvent::Tapped { entity: source });
        }
        if ability.cost.discard_self {
            state.discard(player, source, events)?;
        }

        let item = StackItem::new(StackItemKind::ActivatedAbility, player, source)
            .with_effect(Some(ability.effect.clone()))
            .with_targets(ability.targets.clone(), targets.iter().copied());
        let id = state.insert_entity(Components::new().with_controller(player).with_stack_item(item));
        state.zones.add_to_zone(id, ZoneId::STACK, ZonePosition::Top);
        events.push(GameEvent::AbilityActivated {
            ability: id,
            source,
            controller: player,
        });
        PriorityManager::give(state, player);
        Ok(())
    }

    fn tap_for_mana(
        state: &mut GameState,
        player: PlayerId,
        source: EntityId,
        mana: Option<ManaType>,
        events: &mut EventLog,
    ) -> Result<()> {
        PriorityManager::require(state, player)?;
        Self::require_in_zone(state, source, ZoneId::BATTLEFIELD)?;
        if Projector::project(state).get_controller(source) != Some(player) {
            return Err(EngineError::NotController(player, source));
        }
        let production = state
            .require_entity(source)?
            .mana_ability
            .clone()
            .ok_or_else(|| EngineError::InvalidAction(format!("{source} has no mana ability")))?;
        let mana = mana.unwrap_or_else(|| production.default_type());
        if !production.can_produce(mana) {
            return Err(EngineError::InvalidAction(format!("{source} can't produce {mana:?}")));
        }
        if !TurnManager::can_tap(state, source) {
            return Err(EngineError::InvalidAction(format!("{source} can't be tapped")));
        }

        state.update_entity(source, |c| c.tapped = true)?;
        state.players[player].mana_pool.add(mana, 1);
        events.push(GameEvent::Tapped { entity: source });
        events.push(GameEvent::ManaAdded {
            player,
            mana,
            amount: 1,
        });
        PriorityManager::give(state, player);
        Ok(())
    }

    fn pass_priority(&self, state: &mut GameState, player: PlayerId, events: &mut EventLog) -> Result<Option<PendingDecision>> {
        let outcome = PriorityManager::pass(state, player)?;
        events.push(GameEvent::PriorityPassed { player });
        if outcome != PassOutcome::AllPassed {
            return Ok(None);
        }

        PriorityManager::reset(state);
        match StackResolver::new(self.cards).resolve_top(state, events)? {
            StackResolution::Paused { decision } => Ok(Some(decision)),
            StackResolution::EmptyStack
            | StackResolution::Fizzled { .. }
            | StackResolution::Resolved { .. } => Ok(None),
        }
    }
}
