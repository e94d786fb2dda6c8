//! State-based actions.
//!
//! Checked whenever a player would receive priority. Every applicable action
//! is found first against one projection and then all of them happen
//! together; the check repeats until nothing applies.

use log::debug;

use crate::cards::{CardType, Keyword};
use crate::core::{EntityId, GameState, PlayerId, Result};
use crate::effects::{ProjectedState, Projector};
use crate::triggers::{EventLog, GameEvent};
use crate::zones::ZoneId;

/// A state-based action that needs to be performed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateBasedAction {
    PlayerLoses {
        player: PlayerId,
        reason: LoseReason,
    },
    /// Toughness 0 or less. Indestructible doesn't help.
    ZeroToughness(EntityId),
    /// Lethal damage or any deathtouch damage.
    Destroyed(EntityId),
    PlaneswalkerDies(EntityId),
    AuraFallsOff(EntityId),
    TokenCeasesToExist(EntityId),
}

/// Reason why a player loses the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoseReason {
    ZeroLife,
    DrewFromEmptyLibrary,
}

/// Finds and performs state-based actions.
pub struct StateBasedActions;

impl StateBasedActions {
    /// Every state-based action that currently applies.
    #[must_use]
    pub fn find(state: &GameState) -> Vec<StateBasedAction> {
        let mut actions = Vec::new();

        for player in state.players_in_game() {
            let facts = &state.players[player];
            if facts.life <= 0 {
                actions.push(StateBasedAction::PlayerLoses {
                    player,
                    reason: LoseReason::ZeroLife,
                });
            } else if facts.drew_from_empty_library {
                actions.push(StateBasedAction::PlayerLoses {
                    player,
                    reason: LoseReason::DrewFromEmptyLibrary,
                });
            }
        }

        let projected = Projector::project(state);
        for id in state.zones.cards(ZoneId::BATTLEFIELD) {
            if let Some(action) = Self::permanent_action(state, &projected, id) {
                actions.push(action);
            }
        }

        for (id, components) in &state.entities {
            if components.is_token && state.zones.zone_of(*id) != Some(ZoneId::BATTLEFIELD) {
                actions.push(StateBasedAction::TokenCeasesToExist(*id));
            }
        }
        actions
    }

    fn permanent_action(
        state: &GameState,
        projected: &ProjectedState,
        id: EntityId,
    ) -> Option<StateBasedAction> {
        let object = projected.get(id)?;
        let components = state.entity(id)?;

        if object.is_creature() {
            let toughness = object.toughness.unwrap_or(0);
            if toughness <= 0 {
                return Some(StateBasedAction::ZeroToughness(id));
            }
            let lethal = components.damage >= toughness as u32
                || (components.deathtouch_damage && components.damage > 0);
            if lethal && !object.keywords.contains(&Keyword::Indestructible) {
                return Some(StateBasedAction::Destroyed(id));
            }
        }

        if object.types.contains(&CardType::Planeswalker) && components.counters.loyalty <= 0 {
            return Some(StateBasedAction::PlaneswalkerDies(id));
        }

        if object.types.contains(&CardType::Enchantment) && object.subtypes.contains("Aura") {
            let attached = components
                .attached_to
                .is_some_and(|host| state.zones.is_in_zone(host, ZoneId::BATTLEFIELD));
            if !attached {
                return Some(StateBasedAction::AuraFallsOff(id));
            }
        }
        None
    }

    /// Perform one round of state-based actions. Returns whether anything
    /// happened.
    pub fn check(state: &mut GameState, events: &mut EventLog) -> Result<bool> {
        let actions = Self::find(state);
        if actions.is_empty() {
            return Ok(false);
        }
        for action in actions {
            debug!("state-based action: {action:?}");
            Self::perform(state, action, events)?;
        }
        Ok(true)
    }

    /// Repeat `check` until nothing applies.
    pub fn run(state: &mut GameState, events: &mut EventLog) -> Result<()> {
        while Self::check(state, events)? {}
        Ok(())
    }

    fn perform(state: &mut GameState, action: StateBasedAction, events: &mut EventLog) -> Result<()> {
        match action {
            StateBasedAction::PlayerLoses { player, .. } => {
                state.players[player].has_lost = true;
                events.push(GameEvent::PlayerLost { player });
            }
            StateBasedAction::ZeroToughness(id)
            | StateBasedAction::Destroyed(id)
            | StateBasedAction::PlaneswalkerDies(id)
            | StateBasedAction::AuraFallsOff(id) => {
                // An earlier action in the same batch may have moved it.
                if state.zones.is_in_zone(id, ZoneId::BATTLEFIELD) {
                    let owner = state.owner_of(id)?;
                    state.move_entity(id, ZoneId::graveyard(owner), events)?;
                }
            }
            StateBasedAction::TokenCeasesToExist(id) => {
                state.remove_entity(id);
                events.push(GameEvent::Ceased { entity: id });
            }
        }
        Ok(())
    }
}
