//! Mana payment.
//!
//! Payment spends floating mana first, then taps untapped mana sources for
//! whatever is left, one unit per source.
//!
//! ## Floating mana
//!
//! `pay_partial` matches colored and `{C}` symbols exactly, then lets the
//! remaining pool absorb generic mana, colorless before colored so colored
//! mana stays available for later costs.
//!
//! ## Sources
//!
//! The remaining colored symbols are matched against sources by a small
//! backtracking search. Sources that can only make one type are tried before
//! flexible ones, so a dual land is not burned on a symbol a basic could pay.
//! Generic mana is then paid by the least flexible sources left over.

use log::trace;

use crate::core::{EntityId, GameState, PlayerId, Result};
use crate::effects::Projector;
use crate::cards::Keyword;
use crate::triggers::{EventLog, GameEvent};
use crate::zones::ZoneId;

use super::cost::{ManaCost, ManaPool, ManaProduction, ManaType};

/// Outcome of spending a pool against a cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartialPayment {
    pub remaining_pool: ManaPool,
    pub remaining_cost: ManaCost,
    pub spent: ManaPool,
}

/// A complete way to pay a cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManaSolution {
    /// Floating mana used.
    pub pool_spent: ManaPool,
    /// Pool after payment.
    pub remaining_pool: ManaPool,
    /// Sources to tap and the type each produces.
    pub taps: Vec<(EntityId, ManaType)>,
}

/// An untapped source a player could tap right now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManaSource {
    pub id: EntityId,
    pub production: ManaProduction,
}

/// Mana payment solver.
pub struct ManaSolver;

impl ManaSolver {
    /// Spend `pool` against `cost` as far as it goes.
    ///
    /// ```
    /// use ccg_rules::mana::{ManaCost, ManaPool, ManaSolver, ManaType};
    ///
    /// let cost = ManaCost::parse("{2}{R}").unwrap();
    /// let pool = ManaPool::new().with(ManaType::Red, 2);
    ///
    /// let paid = ManaSolver::pay_partial(&pool, &cost);
    /// assert!(paid.remaining_pool.is_empty());
    /// assert_eq!(paid.remaining_cost, ManaCost::new().with_generic(1));
    /// ```
    #[must_use]
    pub fn pay_partial(pool: &ManaPool, cost: &ManaCost) -> PartialPayment {
        let mut remaining_pool = *pool;
        let mut remaining_cost = *cost;
        let mut spent = ManaPool::new();

        for mana in ManaType::GENERIC_ORDER {
            let take = remaining_pool.amount(mana).min(remaining_cost.amount(mana));
            if take > 0 {
                remaining_pool.remove(mana, take);
                remaining_cost.reduce(mana, take);
                spent.add(mana, take);
            }
        }

        for mana in ManaType::GENERIC_ORDER {
            let take = remaining_pool.amount(mana).min(remaining_cost.generic);
            if take > 0 {
                remaining_pool.remove(mana, take);
                remaining_cost.generic -= take;
                spent.add(mana, take);
            }
        }

        PartialPayment {
            remaining_pool,
            remaining_cost,
            spent,
        }
    }

    /// Untapped sources `player` controls that can be tapped for mana now.
    ///
    /// Creatures with summoning sickness and no haste are excluded.
    #[must_use]
    pub fn available_sources(state: &GameState, player: PlayerId) -> Vec<ManaSource> {
        let projected = Projector::project(state);
        let mut sources: Vec<ManaSource> = state
            .zones
            .cards(ZoneId::BATTLEFIELD)
            .filter_map(|id| {
                let components = state.entity(id)?;
                let production = components.mana_ability.clone()?;
                let obj = projected.get(id)?;
                let sick = obj.is_creature()
                    && components.summoning_sick
                    && !obj.keywords.contains(&Keyword::Haste);
                (obj.controller == player && !components.tapped && !sick)
                    .then_some(ManaSource { id, production })
            })
            .collect();
        sources.sort_by_key(|s| (s.production.flexibility(), s.id));
        sources
    }

    /// Can `player` pay `cost` from their pool and sources?
    #[must_use]
    pub fn can_pay(state: &GameState, player: PlayerId, cost: &ManaCost) -> bool {
        Self::solve(state, player, cost, 0).is_some()
    }

    /// Find a payment for `cost` plus `extra_generic`, or `None`.
    #[must_use]
    pub fn solve(
        state: &GameState,
        player: PlayerId,
        cost: &ManaCost,
        extra_generic: u32,
    ) -> Option<ManaSolution> {
        let total = cost.with_generic(extra_generic);
        let partial = Self::pay_partial(&state.players[player].mana_pool, &total);
        if partial.remaining_cost.is_empty() {
            return Some(ManaSolution {
                pool_spent: partial.spent,
                remaining_pool: partial.remaining_pool,
                taps: Vec::new(),
            });
        }

        let sources = Self::available_sources(state, player);
        let taps = Self::assign_sources(&sources, &partial.remaining_cost)?;
        trace!(
            "{player} pays {total}: {} floating, {} taps",
            partial.spent.total(),
            taps.len()
        );
        Some(ManaSolution {
            pool_spent: partial.spent,
            remaining_pool: partial.remaining_pool,
            taps,
        })
    }

    /// Cover `cost` with `sources` (already in preference order).
    #[must_use]
    pub fn assign_sources(sources: &[ManaSource], cost: &ManaCost) -> Option<Vec<(EntityId, ManaType)>> {
        let units = cost.specific_units();
        if units.len() + cost.generic as usize > sources.len() {
            return None;
        }

        let mut used = vec![false; sources.len()];
        let mut taps = Vec::with_capacity(units.len() + cost.generic as usize);
        if !Self::assign_units(sources, &units, &mut used, &mut taps) {
            return None;
        }

        for (i, source) in sources.iter().enumerate() {
            if taps.len() == units.len() + cost.generic as usize {
                break;
            }
            if !used[i] {
                used[i] = true;
                taps.push((source.id, source.production.default_type()));
            }
        }
        (taps.len() == units.len() + cost.generic as usize).then_some(taps)
    }

    fn assign_units(
        sources: &[ManaSource],
        units: &[ManaType],
        used: &mut [bool],
        taps: &mut Vec<(EntityId, ManaType)>,
    ) -> bool {
        let Some((&unit, rest)) = units.split_first() else {
            return true;
        };
        for (i, source) in sources.iter().enumerate() {
            if used[i] || !source.production.can_produce(unit) {
                continue;
            }
            used[i] = true;
            taps.push((source.id, unit));
            if Self::assign_units(sources, rest, used, taps) {
                return true;
            }
            taps.pop();
            used[i] = false;
        }
        false
    }

    /// Carry out a solution: set the pool and tap the sources.
    pub fn apply(
        state: &mut GameState,
        player: PlayerId,
        solution: &ManaSolution,
        events: &mut EventLog,
    ) -> Result<()> {
        state.players[player].mana_pool = solution.remaining_pool;
        for (source, mana) in &solution.taps {
            state.update_entity(*source, |c| c.tapped = true)?;
            events.push(GameEvent::Tapped { entity: *source });
            events.push(GameEvent::ManaAdded {
                player,
                mana: *mana,
                amount: 1,
            });
        }
        Ok(())
    }
}
