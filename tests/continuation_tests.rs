//! Pause/resume integration tests.
//!
//! These drive effects that need player decisions through the engine and
//! check that the remaining work runs exactly once, in order, after each
//! answer.

mod common;

use ccg_rules::cards::CardRegistry;
use ccg_rules::core::{Action, EngineError, EntityId, GameState};
use ccg_rules::effects::Target;
use ccg_rules::rules::{Engine, ExecutionResult};
use ccg_rules::stack::{DecisionAnswer, DecisionId, DecisionKind};
use ccg_rules::triggers::GameEvent;
use ccg_rules::zones::ZoneId;

use common::*;

fn drawn(events: &[GameEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, GameEvent::CardDrawn { .. }))
        .count()
}

// =============================================================================
// Rummage
// =============================================================================

/// Test that a discard trigger pauses mid-rummage and the draw happens once,
/// after the trigger is done.
#[test]
fn test_rummage_discard_trigger_pauses_before_draw() {
    let registry = registry();
    let engine = Engine::new(&registry);
    let mut state = two_player_game();
    lands(&mut state, &registry, MOUNTAIN, p(0), 1);
    let rummage = put(&mut state, &registry, TAVERN_RUMMAGE, p(0), ZoneId::hand(p(0)));
    let hound = put(&mut state, &registry, CINDER_HOUND, p(0), ZoneId::hand(p(0)));
    let bears = put(&mut state, &registry, GRIZZLY_BEARS, p(0), ZoneId::hand(p(0)));
    let top_card = put(&mut state, &registry, ISLAND, p(0), ZoneId::library(p(0)));

    let state = ok(&engine, &state, cast(p(0), rummage, vec![]));

    // Resolving asks which card to discard.
    let ExecutionResult::Paused { state, decision, events } = pass_all(&engine, &state) else {
        panic!("rummage should ask for a discard");
    };
    assert_eq!(decision.player, p(0));
    assert!(matches!(
        &decision.kind,
        DecisionKind::ChooseEntities { options, min: 1, max: 1 } if options.contains(&hound) && options.contains(&bears)
    ));
    assert_eq!(drawn(&events), 0);

    // Discarding the hound fires its trigger, which needs a target.
    let ExecutionResult::Paused { state, decision, events } =
        engine.resume(&state, decision.id, DecisionAnswer::Entities(vec![hound]))
    else {
        panic!("the discard trigger should ask for a target");
    };
    assert!(matches!(decision.kind, DecisionKind::ChooseTargets { .. }));
    assert!(state.zones.is_in_zone(hound, ZoneId::graveyard(p(0))));
    assert!(state.zones.is_in_zone(top_card, ZoneId::library(p(0))));
    assert_eq!(drawn(&events), 0);

    // Answering finishes the trigger, then the draw, then the spell.
    let result = engine.resume(
        &state,
        decision.id,
        DecisionAnswer::Targets(vec![Target::Player(p(1))]),
    );
    let (state, events) = match result {
        ExecutionResult::Success { state, events } => (state, events),
        other => panic!("rummage should finish: {:?}", other.error()),
    };
    assert_eq!(state.players[p(1)].life, 17);
    assert!(state.zones.is_in_zone(top_card, ZoneId::hand(p(0))));
    assert!(state.zones.is_in_zone(rummage, ZoneId::graveyard(p(0))));
    assert_eq!(drawn(&events), 1);
    assert!(state.stack_is_empty());
    assert!(state.continuations.is_empty());
    assert!(state.pending_decision.is_none());

    let damage = events
        .iter()
        .position(|e| matches!(e, GameEvent::DamageDealt { .. }))
        .unwrap();
    let draw = events
        .iter()
        .position(|e| matches!(e, GameEvent::CardDrawn { .. }))
        .unwrap();
    assert!(damage < draw);
}

/// Test that an answer outside the offered options is rejected without
/// changing anything.
#[test]
fn test_invalid_answer_keeps_paused_state() {
    let registry = registry();
    let engine = Engine::new(&registry);
    let mut state = two_player_game();
    lands(&mut state, &registry, MOUNTAIN, p(0), 1);
    let rummage = put(&mut state, &registry, TAVERN_RUMMAGE, p(0), ZoneId::hand(p(0)));
    put(&mut state, &registry, GRIZZLY_BEARS, p(0), ZoneId::hand(p(0)));
    put(&mut state, &registry, GRIZZLY_BEARS, p(0), ZoneId::hand(p(0)));
    let library = put(&mut state, &registry, ISLAND, p(0), ZoneId::library(p(0)));

    let state = ok(&engine, &state, cast(p(0), rummage, vec![]));
    let paused = pass_all(&engine, &state);
    let decision = paused.decision().unwrap().clone();
    let paused_state = paused.into_state();

    let result = engine.resume(&paused_state, decision.id, DecisionAnswer::Entities(vec![library]));
    assert!(matches!(result.error(), Some(EngineError::InvalidAnswer { .. })));
    assert_eq!(result.state(), &paused_state);
}

/// Test that actions are refused while a decision is outstanding.
#[test]
fn test_actions_rejected_while_paused() {
    let registry = registry();
    let engine = Engine::new(&registry);
    let mut state = two_player_game();
    lands(&mut state, &registry, MOUNTAIN, p(0), 1);
    let rummage = put(&mut state, &registry, TAVERN_RUMMAGE, p(0), ZoneId::hand(p(0)));
    put(&mut state, &registry, GRIZZLY_BEARS, p(0), ZoneId::hand(p(0)));
    put(&mut state, &registry, GRIZZLY_BEARS, p(0), ZoneId::hand(p(0)));

    let state = ok(&engine, &state, cast(p(0), rummage, vec![]));
    let paused = pass_all(&engine, &state);
    let id = paused.decision().unwrap().id;

    let result = engine.execute(paused.state(), Action::PassPriority { player: p(0) });
    assert_eq!(result.error(), Some(&EngineError::DecisionPending(id)));
}

/// Test that answering a decision nobody is waiting on panics.
#[test]
#[should_panic]
fn test_unknown_decision_panics() {
    let registry = registry();
    let engine = Engine::new(&registry);
    let state = two_player_game();
    let _ = engine.resume(&state, DecisionId::new(999), DecisionAnswer::Yes);
}

// =============================================================================
// Counter Unless Pays
// =============================================================================

fn shock_then_leak() -> (CardRegistry, GameState, EntityId) {
    let registry = registry();
    let mut state = two_player_game();
    lands(&mut state, &registry, MOUNTAIN, p(0), 4);
    lands(&mut state, &registry, ISLAND, p(1), 2);
    let shock = put(&mut state, &registry, SHOCK, p(0), ZoneId::hand(p(0)));
    let leak = put(&mut state, &registry, MANA_LEAK, p(1), ZoneId::hand(p(1)));

    let engine = Engine::new(&registry);
    let state = ok(&engine, &state, cast(p(0), shock, vec![Target::Player(p(1))]));
    let state = ok(&engine, &state, Action::PassPriority { player: p(0) });
    let state = ok(&engine, &state, cast(p(1), leak, vec![Target::on_stack(shock)]));
    (registry, state, shock)
}

/// Test that declining to pay counters the spell.
#[test]
fn test_counter_unless_pays_declined() {
    let (registry, state, shock) = shock_then_leak();
    let engine = Engine::new(&registry);

    let paused = pass_all(&engine, &state);
    let decision = paused.decision().cloned().expect("the payer should be asked");
    assert_eq!(decision.player, p(0));
    assert_eq!(decision.kind, DecisionKind::YesNo);

    let result = engine.resume(paused.state(), decision.id, DecisionAnswer::No);
    assert!(result.is_success());
    let state = result.into_state();
    assert!(state.zones.is_in_zone(shock, ZoneId::graveyard(p(0))));
    assert!(state.stack_is_empty());
    assert_eq!(state.players[p(1)].life, 20);
}

/// Test that paying keeps the spell on the stack and it later resolves.
#[test]
fn test_counter_unless_pays_paid() {
    let (registry, state, shock) = shock_then_leak();
    let engine = Engine::new(&registry);

    let paused = pass_all(&engine, &state);
    let id = paused.decision().unwrap().id;
    let state = match engine.resume(paused.state(), id, DecisionAnswer::Yes) {
        ExecutionResult::Success { state, .. } => state,
        other => panic!("payment failed: {:?}", other.error()),
    };
    assert_eq!(state.stack(), vec![shock]);

    let result = pass_all(&engine, &state);
    let state = result.into_state();
    assert_eq!(state.players[p(1)].life, 18);
}

// =============================================================================
// Storm
// =============================================================================

fn copies_made(events: &[GameEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, GameEvent::SpellCopied { .. }))
        .count()
}

/// Cast each card at the opponent, resolving it before the next.
fn cast_and_resolve(engine: &Engine, state: &GameState, cards: &[EntityId]) -> GameState {
    let mut state = state.clone();
    for card in cards {
        state = ok(engine, &state, cast(p(0), *card, vec![Target::Player(p(1))]));
        state = pass_all(engine, &state).into_state();
    }
    state
}

/// Test that one earlier spell gives one storm copy, which pauses for a new
/// target and resumes exactly once.
#[test]
fn test_storm_copy_chooses_new_target() {
    let registry = registry();
    let engine = Engine::new(&registry);
    let mut state = two_player_game();
    lands(&mut state, &registry, MOUNTAIN, p(0), 3);
    let shock = put(&mut state, &registry, SHOCK, p(0), ZoneId::hand(p(0)));
    let grapeshot = put(&mut state, &registry, GRAPESHOT, p(0), ZoneId::hand(p(0)));
    let sprite = put(&mut state, &registry, CLOUD_SPRITE, p(1), ZoneId::BATTLEFIELD);

    let state = cast_and_resolve(&engine, &state, &[shock]);
    assert_eq!(state.players[p(1)].life, 18);
    let state = ok(&engine, &state, cast(p(0), grapeshot, vec![Target::Player(p(1))]));
    // Grapeshot and its storm trigger.
    assert_eq!(state.stack().len(), 2);

    let paused = pass_all(&engine, &state);
    let decision = paused.decision().cloned().expect("the copy should ask for targets");
    assert_eq!(decision.player, p(0));
    assert!(matches!(decision.kind, DecisionKind::ChooseTargets { .. }));
    assert_eq!(copies_made(paused.events()), 1);

    let resumed = engine.resume(
        paused.state(),
        decision.id,
        DecisionAnswer::Targets(vec![Target::permanent(sprite)]),
    );
    assert!(resumed.is_success());
    assert_eq!(copies_made(resumed.events()), 0);
    let state = resumed.into_state();
    assert!(state.pending_decision.is_none());
    assert!(state.continuations.is_empty());
    // Grapeshot and the copy; the trigger is gone.
    assert_eq!(state.stack().len(), 2);

    // The copy kills the sprite, then Grapeshot hits the player.
    let state = pass_all(&engine, &state).into_state();
    assert!(state.zones.is_in_zone(sprite, ZoneId::graveyard(p(1))));
    let state = pass_all(&engine, &state).into_state();
    assert!(state.stack_is_empty());
    assert_eq!(state.players[p(1)].life, 17);
}

/// Test that two storm copies ask for their targets one after the other.
#[test]
fn test_storm_copies_ask_in_sequence() {
    let registry = registry();
    let engine = Engine::new(&registry);
    let mut state = two_player_game();
    lands(&mut state, &registry, MOUNTAIN, p(0), 4);
    let first = put(&mut state, &registry, SHOCK, p(0), ZoneId::hand(p(0)));
    let second = put(&mut state, &registry, SHOCK, p(0), ZoneId::hand(p(0)));
    let grapeshot = put(&mut state, &registry, GRAPESHOT, p(0), ZoneId::hand(p(0)));
    let sprite = put(&mut state, &registry, CLOUD_SPRITE, p(1), ZoneId::BATTLEFIELD);

    let state = cast_and_resolve(&engine, &state, &[first, second]);
    assert_eq!(state.players[p(1)].life, 16);
    let state = ok(&engine, &state, cast(p(0), grapeshot, vec![Target::Player(p(1))]));

    let paused = pass_all(&engine, &state);
    let first_decision = paused.decision().cloned().expect("first copy asks for targets");
    assert_eq!(copies_made(paused.events()), 1);

    let paused = engine.resume(
        paused.state(),
        first_decision.id,
        DecisionAnswer::Targets(vec![Target::Player(p(1))]),
    );
    let second_decision = paused.decision().cloned().expect("second copy asks for targets");
    assert_ne!(second_decision.id, first_decision.id);
    assert_eq!(copies_made(paused.events()), 1);

    let resumed = engine.resume(
        paused.state(),
        second_decision.id,
        DecisionAnswer::Targets(vec![Target::permanent(sprite)]),
    );
    assert!(resumed.is_success());
    let mut state = resumed.into_state();
    assert_eq!(state.stack().len(), 3);

    for _ in 0..3 {
        state = pass_all(&engine, &state).into_state();
    }
    assert!(state.stack_is_empty());
    assert!(state.zones.is_in_zone(sprite, ZoneId::graveyard(p(1))));
    assert_eq!(state.players[p(1)].life, 14);
}
