//! Effect execution.
//!
//! The `EffectExecutor` runs effect trees against a mutable working copy of
//! the game state. Work is expressed as continuation frames and run by a
//! trampoline (`drive`): a frame is popped, executed, and may push further
//! frames, which run before anything below them.
//!
//! ## Pausing
//!
//! A leaf that needs a player's choice pushes an awaiting frame, records a
//! `PendingDecision` on the state and returns. The driver stops as soon as an
//! awaiting frame is on top, leaving every frame below it suspended. `resume`
//! feeds the answer to that frame and drives again.
//!
//! ## Inline triggers
//!
//! A rummage discards before it draws, and triggers from the discard resolve
//! in between without using the stack. Triggers that were already waiting
//! are moved to `pending_triggers` first, so only the discard's triggers run
//! inline.

use im::OrdSet;
use log::debug;

use crate::cards::{CardLookup, Keyword};
use crate::combat::{deal_damage, DamageRecipient, DamageSource};
use crate::core::{Components, CounterKind, EngineError, EntityId, GameState, PlayerId, Result};
use crate::mana::{ManaCost, ManaSolver};
use crate::stack::{
    Continuation, DecisionAnswer, DecisionId, DecisionKind, PendingDecision, StackItem,
    StackItemKind,
};
use crate::triggers::{apnap_sort, EventLog, GameEvent, PendingTrigger, TriggerDetector};
use crate::zones::{ZoneId, ZoneKind, ZonePosition};

use super::effect::{CardFilter, CopyCount, Effect, EffectTarget, ExecutionContext};
use super::layers::{ActiveFloatingEffect, ContinuousEffect, Duration, Modification};
use super::projector::Projector;
use super::targeting::{Target, TargetValidator};

/// Runs effects and continuation frames.
pub struct EffectExecutor<'a> {
    cards: &'a dyn CardLookup,
}

impl<'a> EffectExecutor<'a> {
    #[must_use]
    pub fn new(cards: &'a dyn CardLookup) -> Self {
        Self { cards }
    }

    /// Run `effect` to completion or until it needs a decision.
    pub fn execute(
        &self,
        state: &mut GameState,
        effect: &Effect,
        context: ExecutionContext,
        events: &mut EventLog,
    ) -> Result<Option<PendingDecision>> {
        state.continuations.push_deferred(Continuation::RunEffects {
            effects: effect.flatten().into_iter().collect(),
            context,
        });
        self.drive(state, events)
    }

    /// Run deferred frames until the continuation stack is empty or an
    /// awaiting frame reaches the top.
    pub fn drive(&self, state: &mut GameState, events: &mut EventLog) -> Result<Option<PendingDecision>> {
        loop {
            match state.continuations.peek() {
                None => return Ok(None),
                Some(frame) if frame.awaiting.is_some() => return Ok(state.pending_decision.clone()),
                Some(_) => {}
            }
            let Some(frame) = state.continuations.pop() else {
                return Ok(None);
            };
            self.run_deferred(state, frame.continuation, events)?;
        }
    }

    /// Answer the pending decision and continue.
    ///
    /// An invalid answer is rejected before anything changes.
    ///
    /// # Panics
    ///
    /// If no continuation is waiting on `id`.
    pub fn resume(
        &self,
        state: &mut GameState,
        id: DecisionId,
        answer: DecisionAnswer,
        events: &mut EventLog,
    ) -> Result<Option<PendingDecision>> {
        if let Some(decision) = state.pending_decision.as_ref().filter(|d| d.id == id) {
            decision.validate(&answer)?;
        }
        let continuation = state.continuations.take_awaiting(id);
        state.pending_decision = None;
        debug!("decision {id} answered: {answer:?}");
        self.run_awaiting(state, id, continuation, answer, events)?;
        self.drive(state, events)
    }

    /// Record a decision and the frame that waits for it.
    fn pause(
        &self,
        state: &mut GameState,
        player: PlayerId,
        prompt: impl Into<String>,
        kind: DecisionKind,
        continuation: Continuation,
        events: &mut EventLog,
    ) -> DecisionId {
        let id = state.next_decision_id();
        state.continuations.push_awaiting(id, continuation);
        state.pending_decision = Some(PendingDecision {
            id,
            player,
            prompt: prompt.into(),
            kind,
        });
        events.push(GameEvent::DecisionRequested { id, player });
        debug!("paused on decision {id} for {player}");
        id
    }

    // === Deferred frames ===

    fn run_deferred(&self, state: &mut GameState, continuation: Continuation, events: &mut EventLog) -> Result<()> {
        match continuation {
            Continuation::RunEffects { mut effects, context } => {
                let Some(first) = effects.pop_front() else {
                    return Ok(());
                };
                if !effects.is_empty() {
                    state.continuations.push_deferred(Continuation::RunEffects {
                        effects,
                        context: context.clone(),
                    });
                }
                self.run_leaf(state, &first, &context, events)
            }
            Continuation::FinishResolution { item, .. } => Self::finish_resolution(state, item, events),
            Continuation::ResolveTriggersInline { mut triggers } => {
                let Some(trigger) = triggers.pop_front() else {
                    return Ok(());
                };
                if !triggers.is_empty() {
                    state
                        .continuations
                        .push_deferred(Continuation::ResolveTriggersInline { triggers });
                }
                self.run_trigger_inline(state, trigger, events)
            }
            Continuation::DrawCards { player, count } => {
                state.draw_cards(player, count, events)?;
                Ok(())
            }
            Continuation::Discard { player, count } => self.start_discard(state, player, count, false, events),
            Continuation::MakeCopies {
                original,
                controller,
                remaining,
            } => self.make_copy(state, original, controller, remaining, events),
            Continuation::CounterUnlessPaid { .. }
            | Continuation::SearchLibrary { .. }
            | Continuation::ChooseDiscard { .. }
            | Continuation::StormCopy { .. }
            | Continuation::TriggerTarget { .. } => {
                Err(EngineError::InvalidAction(format!(
                    "{continuation:?} was run without its decision"
                )))
            }
        }
    }

    // === Awaiting frames ===

    fn run_awaiting(
        &self,
        state: &mut GameState,
        id: DecisionId,
        continuation: Continuation,
        answer: DecisionAnswer,
        events: &mut EventLog,
    ) -> Result<()> {
        match (continuation, answer) {
            (Continuation::CounterUnlessPaid { spell, payer, cost }, answer) => {
                let paid = answer == DecisionAnswer::Yes && Self::pay(state, payer, &cost, events)?;
                if paid {
                    debug!("{payer} paid {cost}");
                    Ok(())
                } else {
                    Self::counter(state, spell, events)
                }
            }
            (Continuation::SearchLibrary { player, destination }, DecisionAnswer::Entities(chosen)) => {
                let found = chosen.first().copied();
                if let Some(card) = found {
                    state.move_entity(card, ZoneId::of(destination, player), events)?;
                }
                events.push(GameEvent::LibrarySearched { player, found });
                state.shuffle_library(player, events);
                Ok(())
            }
            (
                Continuation::ChooseDiscard {
                    player,
                    inline_triggers,
                },
                DecisionAnswer::Entities(chosen),
            ) => self.finish_discard(state, player, &chosen, inline_triggers, events),
            (
                Continuation::StormCopy {
                    copy,
                    original,
                    remaining,
                },
                DecisionAnswer::Targets(targets),
            ) => {
                let mut controller = None;
                state.update_entity(copy, |c| {
                    if let Some(item) = c.stack_item.as_mut() {
                        item.targets = targets.into_iter().collect();
                        controller = Some(item.controller);
                    }
                })?;
                let controller = controller.ok_or_else(|| EngineError::missing(copy, "stack item"))?;
                state.continuations.push_deferred(Continuation::MakeCopies {
                    original,
                    controller,
                    remaining,
                });
                Ok(())
            }
            (Continuation::TriggerTarget { trigger, inline }, DecisionAnswer::Targets(targets)) => {
                if inline {
                    let context = ExecutionContext::new(trigger.controller, trigger.source)
                        .with_targets(targets.into_iter().map(Some));
                    state.continuations.push_deferred(Continuation::RunEffects {
                        effects: trigger.effect.flatten().into_iter().collect(),
                        context,
                    });
                } else {
                    Self::stack_trigger(state, &trigger, targets, events);
                }
                Ok(())
            }
            (continuation, answer) => Err(EngineError::InvalidAnswer {
                id,
                reason: format!("{answer:?} does not fit {continuation:?}"),
            }),
        }
    }

    // === Stack helpers ===

    /// Put a triggered ability on the stack with chosen targets.
    pub fn stack_trigger(
        state: &mut GameState,
        trigger: &PendingTrigger,
        targets: Vec<Target>,
        events: &mut EventLog,
    ) -> EntityId {
        let item = StackItem::new(StackItemKind::TriggeredAbility, trigger.controller, trigger.source)
            .with_effect(Some(trigger.effect.clone()))
            .with_targets(trigger.requirements.clone(), targets);
        let id = state.insert_entity(
            Components::new()
                .with_controller(trigger.controller)
                .with_stack_item(item),
        );
        state.zones.add_to_zone(id, ZoneId::STACK, ZonePosition::Top);
        events.push(GameEvent::TriggerPutOnStack {
            ability: id,
            source: trigger.source,
            controller: trigger.controller,
        });
        debug!("trigger {} from {} on the stack as {id}", trigger.description, trigger.source);
        id
    }

    /// Legal choices for each of a trigger's requirements, or `None` if some
    /// requirement has none.
    #[must_use]
    pub fn trigger_target_options(state: &GameState, trigger: &PendingTrigger) -> Option<Vec<Vec<Target>>> {
        let validator = TargetValidator::new(state);
        let options: Vec<Vec<Target>> = trigger
            .requirements
            .iter()
            .map(|req| validator.legal_targets(req, trigger.controller, trigger.source))
            .collect();
        options.iter().all(|o| !o.is_empty()).then_some(options)
    }

    /// Start putting a trigger on the stack (or running it inline). Targeted
    /// triggers pause; triggers without legal targets are removed.
    pub fn begin_trigger(&self, state: &mut GameState, trigger: PendingTrigger, inline: bool, events: &mut EventLog) {
        if trigger.requirements.is_empty() {
            if inline {
                state.continuations.push_deferred(Continuation::RunEffects {
                    effects: trigger.effect.flatten().into_iter().collect(),
                    context: ExecutionContext::new(trigger.controller, trigger.source),
                });
            } else {
                Self::stack_trigger(state, &trigger, Vec::new(), events);
            }
            return;
        }

        let Some(options) = Self::trigger_target_options(state, &trigger) else {
            debug!("trigger {} from {} has no legal targets", trigger.description, trigger.source);
            events.push(GameEvent::TriggerRemoved {
                source: trigger.source,
                controller: trigger.controller,
            });
            return;
        };
        let player = trigger.controller;
        let prompt = format!("choose targets for {}", trigger.description);
        let kind = DecisionKind::ChooseTargets {
            requirements: trigger.requirements.clone(),
            options,
        };
        self.pause(
            state,
            player,
            prompt,
            kind,
            Continuation::TriggerTarget { trigger, inline },
            events,
        );
    }

    fn run_trigger_inline(&self, state: &mut GameState, trigger: PendingTrigger, events: &mut EventLog) -> Result<()> {
        self.begin_trigger(state, trigger, true, events);
        Ok(())
    }

    /// Move a resolved item to where it belongs after resolution.
    fn finish_resolution(state: &mut GameState, item: EntityId, events: &mut EventLog) -> Result<()> {
        let Some(components) = state.entity(item) else {
            return Ok(());
        };
        let ephemeral = components.stack_item.as_ref().map_or(true, StackItem::is_ephemeral);
        let in_limbo = state.zones.zone_of(item).is_none();
        events.push(GameEvent::Resolved { item });
        if !in_limbo {
            // Moved by its own effect; leave it there.
            return Ok(());
        }
        if ephemeral {
            state.remove_entity(item);
            events.push(GameEvent::Ceased { entity: item });
        } else {
            let owner = state.owner_of(item)?;
            state.move_entity(item, ZoneId::graveyard(owner), events)?;
        }
        Ok(())
    }

    /// Counter a spell or ability on the stack.
    pub fn counter(state: &mut GameState, item: EntityId, events: &mut EventLog) -> Result<()> {
        if !state.zones.is_in_zone(item, ZoneId::STACK) {
            return Ok(());
        }
        let stack_item = state
            .require_entity(item)?
            .stack_item
            .clone()
            .ok_or_else(|| EngineError::missing(item, "stack item"))?;
        if stack_item.is_ephemeral() {
            state.remove_entity(item);
            events.push(GameEvent::Ceased { entity: item });
        } else {
            let owner = state.owner_of(item)?;
            state.move_entity(item, ZoneId::graveyard(owner), events)?;
        }
        events.push(GameEvent::Countered { item });
        debug!("{item} countered");
        Ok(())
    }

    fn pay(state: &mut GameState, player: PlayerId, cost: &ManaCost, events: &mut EventLog) -> Result<bool> {
        match ManaSolver::solve(state, player, cost, 0) {
            Some(solution) => {
                ManaSolver::apply(state, player, &solution, events)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Put one copy of `original` on the stack, then pause for its targets
    /// if it has any.
    fn make_copy(
        &self,
        state: &mut GameState,
        original: EntityId,
        controller: PlayerId,
        remaining: u32,
        events: &mut EventLog,
    ) -> Result<()> {
        if remaining == 0 {
            return Ok(());
        }
        let Some(source) = state.entity(original) else {
            return Ok(());
        };
        let Some(mut item) = source.stack_item.clone() else {
            return Ok(());
        };
        item.is_copy = true;
        item.controller = controller;
        let mut components = Components::new()
            .with_owner(controller)
            .with_controller(controller)
            .with_stack_item(item.clone());
        components.card = source.card;
        components.characteristics = source.characteristics.clone();

        let copy = state.insert_entity(components);
        state.move_entity(copy, ZoneId::STACK, events)?;
        events.push(GameEvent::SpellCopied { original, copy });
        debug!("{original} copied as {copy}, {} more", remaining - 1);

        if item.requirements.is_empty() {
            state.continuations.push_deferred(Continuation::MakeCopies {
                original,
                controller,
                remaining: remaining - 1,
            });
            return Ok(());
        }

        let validator = TargetValidator::new(state);
        let options: Vec<Vec<Target>> = item
            .requirements
            .iter()
            .map(|req| validator.legal_targets(req, controller, copy))
            .collect();
        if options.iter().any(Vec::is_empty) {
            // Keeps the original's targets.
            state.continuations.push_deferred(Continuation::MakeCopies {
                original,
                controller,
                remaining: remaining - 1,
            });
            return Ok(());
        }
        self.pause(
            state,
            controller,
            format!("choose new targets for the copy of {original}"),
            DecisionKind::ChooseTargets {
                requirements: item.requirements.clone(),
                options,
            },
            Continuation::StormCopy {
                copy,
                original,
                remaining: remaining - 1,
            },
            events,
        );
        Ok(())
    }

    // === Discard ===

    fn start_discard(
        &self,
        state: &mut GameState,
        player: PlayerId,
        count: u32,
        inline_triggers: bool,
        events: &mut EventLog,
    ) -> Result<()> {
        let hand = state.zones.cards_vec(ZoneId::hand(player));
        let count = count as usize;
        if count == 0 || hand.is_empty() {
            return Ok(());
        }
        if hand.len() <= count {
            return self.finish_discard(state, player, &hand, inline_triggers, events);
        }
        self.pause(
            state,
            player,
            format!("discard {count} cards"),
            DecisionKind::ChooseEntities {
                options: hand,
                min: count,
                max: count,
            },
            Continuation::ChooseDiscard {
                player,
                inline_triggers,
            },
            events,
        );
        Ok(())
    }

    fn finish_discard(
        &self,
        state: &mut GameState,
        player: PlayerId,
        cards: &[EntityId],
        inline_triggers: bool,
        events: &mut EventLog,
    ) -> Result<()> {
        for card in cards {
            state.discard(player, *card, events)?;
        }
        if inline_triggers {
            let detector = TriggerDetector::new(self.cards);
            let mut triggers = detector.collect(state, events)?;
            apnap_sort(state, &mut triggers);
            if !triggers.is_empty() {
                debug!("{} discard triggers resolve inline", triggers.len());
                state.continuations.push_deferred(Continuation::ResolveTriggersInline {
                    triggers: triggers.into_iter().collect(),
                });
            }
        }
        Ok(())
    }

    /// Move triggers from events not yet scanned into `pending_triggers`.
    fn flush_triggers(&self, state: &mut GameState, events: &mut EventLog) -> Result<()> {
        let detector = TriggerDetector::new(self.cards);
        let triggers = detector.collect(state, events)?;
        state.pending_triggers.extend(triggers);
        Ok(())
    }

    // === Addressing ===

    fn players(state: &GameState, what: EffectTarget, context: &ExecutionContext) -> Vec<PlayerId> {
        match what {
            EffectTarget::Target(i) => context
                .target(i)
                .and_then(|t| t.player())
                .filter(|p| state.in_game(*p))
                .into_iter()
                .collect(),
            EffectTarget::Controller => vec![context.controller],
            EffectTarget::EachOpponent => state.opponents(context.controller),
            EffectTarget::EachPlayer => state.apnap_order().into_iter().filter(|p| state.in_game(*p)).collect(),
            EffectTarget::Source | EffectTarget::AllCreatures => Vec::new(),
        }
    }

    /// Objects `what` names that are still where they were chosen.
    fn objects(state: &GameState, what: EffectTarget, context: &ExecutionContext) -> Vec<EntityId> {
        match what {
            EffectTarget::Target(i) => match context.target(i) {
                Some(Target::Object { id, zone }) if state.zones.is_in_zone(id, zone) => vec![id],
                _ => Vec::new(),
            },
            EffectTarget::Source => state
                .entity(context.source)
                .map(|_| context.source)
                .into_iter()
                .collect(),
            EffectTarget::AllCreatures => Projector::project(state).creatures(None).collect(),
            EffectTarget::Controller | EffectTarget::EachOpponent | EffectTarget::EachPlayer => Vec::new(),
        }
    }

    fn permanents(state: &GameState, what: EffectTarget, context: &ExecutionContext) -> Vec<EntityId> {
        Self::objects(state, what, context)
            .into_iter()
            .filter(|id| state.zones.is_in_zone(*id, ZoneId::BATTLEFIELD))
            .collect()
    }

    fn damage_recipients(state: &GameState, what: EffectTarget, context: &ExecutionContext) -> Vec<DamageRecipient> {
        let players = Self::players(state, what, context)
            .into_iter()
            .map(DamageRecipient::Player);
        let permanents = Self::permanents(state, what, context)
            .into_iter()
            .map(DamageRecipient::Permanent);
        players.chain(permanents).collect()
    }

    // === Leaves ===

    fn run_leaf(
        &self,
        state: &mut GameState,
        effect: &Effect,
        context: &ExecutionContext,
        events: &mut EventLog,
    ) -> Result<()> {
        let x = context.x;
        match effect {
            Effect::DealDamage { amount, to } => {
                let projected = Projector::project(state);
                let source = DamageSource::new(state, &projected, context.source, context.controller);
                for recipient in Self::damage_recipients(state, *to, context) {
                    deal_damage(state, &projected, &source, recipient, amount.resolve(x), false, events)?;
                }
            }
            Effect::GainLife { amount, player } => {
                for p in Self::players(state, *player, context) {
                    state.adjust_life(p, amount.resolve(x) as i32, events);
                }
            }
            Effect::LoseLife { amount, player } => {
                for p in Self::players(state, *player, context) {
                    state.adjust_life(p, -(amount.resolve(x) as i32), events);
                }
            }
            Effect::DrawCards { count, player } => {
                for p in Self::players(state, *player, context) {
                    state.draw_cards(p, count.resolve(x), events)?;
                }
            }
            Effect::Discard { count, player } => {
                for p in Self::players(state, *player, context).into_iter().rev() {
                    state.continuations.push_deferred(Continuation::Discard {
                        player: p,
                        count: *count,
                    });
                }
            }
            Effect::Rummage { discard, draw } => {
                let player = context.controller;
                self.flush_triggers(state, events)?;
                state.continuations.push_deferred(Continuation::DrawCards { player, count: *draw });
                self.start_discard(state, player, *discard, true, events)?;
            }
            Effect::SearchLibrary { filter, destination } => {
                self.search_library(state, context.controller, filter, *destination, events)?;
            }
            Effect::Destroy { what } => {
                let projected = Projector::project(state);
                for id in Self::permanents(state, *what, context) {
                    if projected.has_keyword(id, Keyword::Indestructible) {
                        continue;
                    }
                    let owner = state.owner_of(id)?;
                    state.move_entity(id, ZoneId::graveyard(owner), events)?;
                }
            }
            Effect::Exile { what } => {
                for id in Self::objects(state, *what, context) {
                    let owner = state.owner_of(id)?;
                    state.move_entity(id, ZoneId::exile(owner), events)?;
                }
            }
            Effect::ReturnToHand { what } => {
                for id in Self::permanents(state, *what, context) {
                    let owner = state.owner_of(id)?;
                    state.move_entity(id, ZoneId::hand(owner), events)?;
                }
            }
            Effect::Tap { what } => {
                for id in Self::permanents(state, *what, context) {
                    if !state.require_entity(id)?.tapped {
                        state.update_entity(id, |c| c.tapped = true)?;
                        events.push(GameEvent::Tapped { entity: id });
                    }
                }
            }
            Effect::Untap { what } => {
                for id in Self::permanents(state, *what, context) {
                    if state.require_entity(id)?.tapped {
                        state.update_entity(id, |c| c.tapped = false)?;
                        events.push(GameEvent::Untapped { entity: id });
                    }
                }
            }
            Effect::AddCounters { what, counter, count } => {
                for id in Self::permanents(state, *what, context) {
                    state.update_entity(id, |c| match counter {
                        CounterKind::PlusOne => c.counters.plus_one += count,
                        CounterKind::MinusOne => c.counters.minus_one += count,
                        CounterKind::Loyalty => c.counters.loyalty += *count as i32,
                    })?;
                    events.push(GameEvent::CountersChanged {
                        entity: id,
                        counter: *counter,
                        delta: *count as i32,
                    });
                }
            }
            Effect::CreateToken { characteristics, count } => {
                for _ in 0..*count {
                    state.create_token(characteristics.clone(), context.controller, events)?;
                }
            }
            Effect::ApplyContinuous {
                what,
                modification,
                duration,
            } => Self::apply_continuous(state, *what, modification, *duration, context, events),
            Effect::AddMana { mana, count } => {
                state.players[context.controller].mana_pool.add(*mana, *count);
                events.push(GameEvent::ManaAdded {
                    player: context.controller,
                    mana: *mana,
                    amount: *count,
                });
            }
            Effect::CounterSpell { what } => {
                for id in Self::objects(state, *what, context) {
                    Self::counter(state, id, events)?;
                }
            }
            Effect::CounterUnlessPays { what, cost } => {
                for spell in Self::objects(state, *what, context) {
                    let Some(payer) = state
                        .entity(spell)
                        .and_then(|c| c.stack_item.as_ref())
                        .map(|item| item.controller)
                    else {
                        continue;
                    };
                    if ManaSolver::can_pay(state, payer, cost) {
                        self.pause(
                            state,
                            payer,
                            format!("pay {cost} or {spell} is countered"),
                            DecisionKind::YesNo,
                            Continuation::CounterUnlessPaid {
                                spell,
                                payer,
                                cost: *cost,
                            },
                            events,
                        );
                        // One decision per effect.
                        break;
                    }
                    Self::counter(state, spell, events)?;
                }
            }
            Effect::CopySpell { what, copies } => {
                let remaining = match copies {
                    CopyCount::Fixed(n) => *n,
                    CopyCount::Storm => state.turn.spells_cast_this_turn.saturating_sub(1),
                };
                for original in Self::objects(state, *what, context) {
                    let is_spell = state
                        .entity(original)
                        .and_then(|c| c.stack_item.as_ref())
                        .is_some_and(StackItem::is_spell);
                    if is_spell {
                        state.continuations.push_deferred(Continuation::MakeCopies {
                            original,
                            controller: context.controller,
                            remaining,
                        });
                    }
                }
            }
            Effect::Sequence(effects) => {
                state.continuations.push_deferred(Continuation::RunEffects {
                    effects: effects.iter().flat_map(Effect::flatten).collect(),
                    context: context.clone(),
                });
            }
        }
        Ok(())
    }

    fn apply_continuous(
        state: &mut GameState,
        what: EffectTarget,
        modification: &Modification,
        duration: Duration,
        context: &ExecutionContext,
        events: &mut EventLog,
    ) {
        let affected: OrdSet<EntityId> = Self::permanents(state, what, context).into_iter().collect();
        if affected.is_empty() {
            return;
        }
        let timestamp = state.next_timestamp();
        let floating = ActiveFloatingEffect {
            effect: ContinuousEffect::new(context.source, timestamp, modification.clone(), affected),
            duration,
        };
        state.floating_effects.push_back(floating.clone());
        events.push(GameEvent::ContinuousEffectCreated { effect: floating });
    }

    fn search_library(
        &self,
        state: &mut GameState,
        player: PlayerId,
        filter: &CardFilter,
        destination: ZoneKind,
        events: &mut EventLog,
    ) -> Result<()> {
        let options: Vec<EntityId> = state
            .zones
            .cards(ZoneId::library(player))
            .filter(|id| {
                state
                    .entity(*id)
                    .and_then(|c| c.characteristics.as_ref())
                    .is_some_and(|c| filter.matches(c))
            })
            .collect();
        if options.is_empty() {
            events.push(GameEvent::LibrarySearched { player, found: None });
            state.shuffle_library(player, events);
            return Ok(());
        }
        self.pause(
            state,
            player,
            "search your library",
            DecisionKind::ChooseEntities {
                options,
                min: 0,
                max: 1,
            },
            Continuation::SearchLibrary { player, destination },
            events,
        );
        Ok(())
    }
}

/// Floating effects a batch of events created.
#[must_use]
pub fn created_effects(events: &[GameEvent]) -> Vec<ActiveFloatingEffect> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::ContinuousEffectCreated { effect } => Some(effect.clone()),
            _ => None,
        })
        .collect()
}
