//! Property tests for the pure rules helpers and for determinism.

mod common;

use proptest::prelude::*;

use ccg_rules::combat::lethal_damage;
use ccg_rules::core::{GameState, RulesConfig};
use ccg_rules::effects::{ActiveFloatingEffect, ContinuousEffect, Duration, Modification, Projector};
use ccg_rules::mana::{ManaCost, ManaPool, ManaSolver, ManaType};
use ccg_rules::triggers::EventLog;
use ccg_rules::zones::ZoneId;

use common::*;

fn cost_units(cost: &ManaCost) -> u32 {
    cost.specific_units().len() as u32 + cost.generic
}

proptest! {
    /// Lethal damage plus what is already marked always reaches toughness.
    #[test]
    fn lethal_damage_reaches_toughness(toughness in 1i32..20, marked in 0u32..25) {
        let lethal = lethal_damage(toughness, marked, false);
        prop_assert!(marked + lethal >= toughness as u32);
        if marked < toughness as u32 {
            prop_assert_eq!(marked + lethal, toughness as u32);
        }
    }

    /// With deathtouch, one damage is always enough.
    #[test]
    fn deathtouch_lethal_is_at_most_one(toughness in 1i32..20, marked in 0u32..25) {
        prop_assert!(lethal_damage(toughness, marked, true) <= 1);
    }

    /// Paying from a pool never creates or loses mana.
    #[test]
    fn pay_partial_conserves_mana(
        red in 0u32..5,
        green in 0u32..5,
        generic in 0u32..6,
        red_cost in 0u32..4,
    ) {
        let pool = ManaPool::new().with(ManaType::Red, red).with(ManaType::Green, green);
        let cost = ManaCost::new().with_generic(generic).with(ManaType::Red, red_cost);

        let paid = ManaSolver::pay_partial(&pool, &cost);
        prop_assert_eq!(paid.spent.total() + paid.remaining_pool.total(), pool.total());
        prop_assert_eq!(paid.spent.total() + cost_units(&paid.remaining_cost), cost_units(&cost));
        // Anything left owed means the pool ran dry of usable mana.
        if !paid.remaining_cost.is_empty() {
            prop_assert!(paid.remaining_cost.generic == 0 || paid.remaining_pool.is_empty());
        }
    }

    /// Stacked power/toughness modifications add up in any order.
    #[test]
    fn modifications_sum(deltas in prop::collection::vec((-3i32..4, -1i32..4), 0..6)) {
        let registry = registry();
        let mut state = two_player_game();
        let bears = put(&mut state, &registry, GRIZZLY_BEARS, p(0), ZoneId::BATTLEFIELD);
        for (power, toughness) in &deltas {
            let timestamp = state.next_timestamp();
            state.floating_effects.push_back(ActiveFloatingEffect {
                effect: ContinuousEffect::new(
                    bears,
                    timestamp,
                    Modification::ModifyPowerToughness { power: *power, toughness: *toughness },
                    [bears].into_iter().collect(),
                ),
                duration: Duration::EndOfTurn,
            });
        }

        let projected = Projector::project(&state);
        let power: i32 = 2 + deltas.iter().map(|(power, _)| power).sum::<i32>();
        let toughness: i32 = 2 + deltas.iter().map(|(_, toughness)| toughness).sum::<i32>();
        prop_assert_eq!(projected.get_power(bears), Some(power));
        prop_assert_eq!(projected.get_toughness(bears), Some(toughness));
    }

    /// The same seed shuffles a library the same way.
    #[test]
    fn shuffle_is_deterministic(seed in any::<u64>()) {
        let registry = registry();
        let build = || {
            let mut state = GameState::new(RulesConfig::new(2).with_seed(seed));
            for card in [MOUNTAIN, FOREST, ISLAND, SHOCK, GRIZZLY_BEARS, DIVINATION] {
                put(&mut state, &registry, card, p(0), ZoneId::library(p(0)));
            }
            state.shuffle_library(p(0), &mut EventLog::new());
            state
        };
        let first = build();
        let second = build();
        prop_assert_eq!(
            first.zones.cards_vec(ZoneId::library(p(0))),
            second.zones.cards_vec(ZoneId::library(p(0)))
        );
    }
}

/// Test that a snapshot restores the exact state.
#[test]
fn test_snapshot_restores_state() {
    let registry = registry();
    let mut state = two_player_game();
    put(&mut state, &registry, GLORIOUS_ANTHEM, p(0), ZoneId::BATTLEFIELD);
    put(&mut state, &registry, COLOSSAL_WURM, p(1), ZoneId::BATTLEFIELD);
    put(&mut state, &registry, SHOCK, p(0), ZoneId::hand(p(0)));

    let bytes = state.snapshot_bytes().unwrap();
    let restored = GameState::from_snapshot(&bytes).unwrap();
    assert_eq!(restored, state);
    assert_eq!(
        Projector::project(&restored).fingerprint().unwrap(),
        Projector::project(&state).fingerprint().unwrap()
    );
}
