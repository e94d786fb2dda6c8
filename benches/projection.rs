//! Benchmarks for layered projection and state cloning.
//!
//! Run with: `cargo bench`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use ccg_rules::cards::{CardDefinition, CardId, CardType, Characteristics, Keyword};
use ccg_rules::core::{GameState, PlayerId, RulesConfig};
use ccg_rules::effects::{
    ActiveFloatingEffect, AffectedFilter, ContinuousEffect, Duration, Modification, Projector, StaticAbility,
};
use ccg_rules::zones::ZoneId;

fn bear() -> CardDefinition {
    CardDefinition::new(
        CardId::new(1),
        Characteristics::new("Bear").with_type(CardType::Creature).with_pt(2, 2),
    )
}

fn anthem() -> CardDefinition {
    CardDefinition::new(
        CardId::new(2),
        Characteristics::new("Anthem").with_type(CardType::Enchantment),
    )
    .with_static(StaticAbility::new(
        Modification::ModifyPowerToughness { power: 1, toughness: 1 },
        AffectedFilter::CreaturesYouControl,
    ))
}

/// A board with `creatures` creatures per player, one anthem each and a
/// floating effect on every other creature.
fn board(creatures: usize) -> GameState {
    let mut state = GameState::new(RulesConfig::new(2).with_seed(1));
    for seat in 0..2 {
        let player = PlayerId::new(seat);
        state.create_card(&anthem(), player, ZoneId::BATTLEFIELD);
        for i in 0..creatures {
            let id = state.create_card(&bear(), player, ZoneId::BATTLEFIELD);
            if i % 2 == 0 {
                let timestamp = state.next_timestamp();
                state.floating_effects.push_back(ActiveFloatingEffect {
                    effect: ContinuousEffect::new(
                        id,
                        timestamp,
                        Modification::AddKeyword(Keyword::Flying),
                        [id].into_iter().collect(),
                    ),
                    duration: Duration::EndOfTurn,
                });
            }
        }
    }
    state
}

fn benchmark_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("Projection");
    for creatures in [4, 16, 64] {
        let state = board(creatures);
        group.bench_with_input(BenchmarkId::new("project", creatures), &state, |b, state| {
            b.iter(|| black_box(Projector::project(black_box(state))));
        });
    }
    group.finish();
}

fn benchmark_state_clone(c: &mut Criterion) {
    let state = board(64);
    c.bench_function("clone_64_per_player", |b| {
        b.iter(|| black_box(state.clone()));
    });
}

criterion_group!(benches, benchmark_projection, benchmark_state_clone);
criterion_main!(benches);
