//! Turn structure.
//!
//! Only the parts of the turn the rules core needs are modelled: the first
//! main phase, combat, the second main phase, and the cleanup that hands the
//! turn to the next player.

use log::debug;

use crate::cards::Keyword;
use crate::core::{EngineError, EntityId, GameState, Phase, PlayerId, Result};
use crate::effects::{Duration, Projector};
use crate::stack::PriorityManager;
use crate::triggers::{EventLog, GameEvent};
use crate::zones::ZoneId;

/// Moves the game from one turn to the next.
pub struct TurnManager;

impl TurnManager {
    /// End `player`'s turn: clean up, then start the next player's turn.
    pub fn end_turn(state: &mut GameState, player: PlayerId, events: &mut EventLog) -> Result<()> {
        if state.turn.active_player != player {
            return Err(EngineError::NotActivePlayer(player));
        }
        if !state.stack_is_empty() {
            return Err(EngineError::Timing("the stack must be empty to end the turn".into()));
        }
        if state.combat.is_some() {
            return Err(EngineError::Timing("combat must end before the turn does".into()));
        }

        Self::cleanup(state)?;
        let next = Self::next_player(state, player).ok_or(EngineError::GameOver)?;
        Self::begin_turn(state, next, events)
    }

    /// Remove damage, expire "until end of turn" effects and empty mana pools.
    pub fn cleanup(state: &mut GameState) -> Result<()> {
        for id in state.zones.cards_vec(ZoneId::BATTLEFIELD) {
            state.update_entity(id, |c| {
                c.damage = 0;
                c.deathtouch_damage = false;
            })?;
        }
        state.expire_effects(&[Duration::EndOfTurn, Duration::EndOfCombat]);
        for (_, facts) in state.players.iter_mut() {
            facts.mana_pool.clear();
        }
        Ok(())
    }

    /// The next player in seat order who is still in the game.
    #[must_use]
    pub fn next_player(state: &GameState, from: PlayerId) -> Option<PlayerId> {
        let count = state.player_count();
        let mut next = from.next(count);
        while next != from {
            if state.in_game(next) {
                return Some(next);
            }
            next = next.next(count);
        }
        None
    }

    /// Untap, remove summoning sickness and draw for `player`'s new turn.
    pub fn begin_turn(state: &mut GameState, player: PlayerId, events: &mut EventLog) -> Result<()> {
        state.turn.number += 1;
        state.turn.active_player = player;
        state.turn.phase = Phase::Main1;
        state.turn.spells_cast_this_turn = 0;
        for (_, facts) in state.players.iter_mut() {
            facts.lands_played = 0;
        }
        PriorityManager::reset(state);

        let projected = Projector::project(state);
        let theirs: Vec<_> = state
            .zones
            .cards(ZoneId::BATTLEFIELD)
            .filter(|id| projected.get_controller(*id) == Some(player))
            .collect();
        for id in theirs {
            let tapped = state.require_entity(id)?.tapped;
            state.update_entity(id, |c| {
                c.tapped = false;
                c.summoning_sick = false;
            })?;
            if tapped {
                events.push(GameEvent::Untapped { entity: id });
            }
        }

        events.push(GameEvent::TurnBegan {
            player,
            turn: state.turn.number,
        });
        debug!("turn {} begins for {player}", state.turn.number);
        state.draw_cards(player, 1, events)?;
        Ok(())
    }

    /// Whether a permanent can attack or use a tap ability this turn.
    #[must_use]
    pub fn can_tap(state: &GameState, id: EntityId) -> bool {
        let Some(components) = state.entity(id) else {
            return false;
        };
        if components.tapped {
            return false;
        }
        let projected = Projector::project(state);
        let creature = projected.get(id).is_some_and(|o| o.is_creature());
        !creature || !components.summoning_sick || projected.has_keyword(id, Keyword::Haste)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardId, CardType, Characteristics};
    use crate::core::RulesConfig;
    use crate::effects::{ActiveFloatingEffect, ContinuousEffect, Modification};
    use crate::mana::ManaType;

    fn bear() -> CardDefinition {
        CardDefinition::new(
            CardId::new(1),
            Characteristics::new("Bear").with_type(CardType::Creature).with_pt(2, 2),
        )
    }

    #[test]
    fn test_end_turn_passes_to_next_player() {
        let mut state = GameState::new(RulesConfig::new(2));
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        let library_card = state.create_card(&bear(), p1, ZoneId::library(p1));
        let tapped = state.create_card(&bear(), p1, ZoneId::BATTLEFIELD);
        state.update_entity(tapped, |c| c.tapped = true).unwrap();
        state.players[p0].mana_pool.add(ManaType::Red, 2);

        let mut events = EventLog::new();
        TurnManager::end_turn(&mut state, p0, &mut events).unwrap();

        assert_eq!(state.turn.active_player, p1);
        assert_eq!(state.turn.priority_player, p1);
        assert_eq!(state.turn.number, 2);
        assert!(!state.entity(tapped).unwrap().tapped);
        assert!(state.zones.is_in_zone(library_card, ZoneId::hand(p1)));
        assert!(state.players[p0].mana_pool.is_empty());
        assert!(events.events().contains(&GameEvent::TurnBegan { player: p1, turn: 2 }));
    }

    #[test]
    fn test_cleanup_removes_damage_and_pump() {
        let mut state = GameState::new(RulesConfig::new(2));
        let p0 = PlayerId::new(0);
        let bear = state.create_card(&bear(), p0, ZoneId::BATTLEFIELD);
        state.update_entity(bear, |c| c.damage = 1).unwrap();
        let timestamp = state.next_timestamp();
        state.floating_effects.push_back(ActiveFloatingEffect {
            effect: ContinuousEffect::new(
                bear,
                timestamp,
                Modification::ModifyPowerToughness { power: 3, toughness: 3 },
                [bear].into_iter().collect(),
            ),
            duration: Duration::EndOfTurn,
        });

        TurnManager::cleanup(&mut state).unwrap();
        assert_eq!(state.entity(bear).unwrap().damage, 0);
        assert!(state.floating_effects.is_empty());
    }

    #[test]
    fn test_only_active_player_ends_turn() {
        let mut state = GameState::new(RulesConfig::new(2));
        let mut events = EventLog::new();
        assert_eq!(
            TurnManager::end_turn(&mut state, PlayerId::new(1), &mut events),
            Err(EngineError::NotActivePlayer(PlayerId::new(1)))
        );
    }

    #[test]
    fn test_next_player_skips_losers() {
        let mut state = GameState::new(RulesConfig::new(3));
        state.players[PlayerId::new(1)].has_lost = true;
        assert_eq!(TurnManager::next_player(&state, PlayerId::new(0)), Some(PlayerId::new(2)));
        assert_eq!(TurnManager::next_player(&state, PlayerId::new(2)), Some(PlayerId::new(0)));
    }
}
