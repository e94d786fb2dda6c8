//! Game state.
//!
//! `GameState` is one immutable-by-convention value holding everything the
//! rules need: turn and priority, per-player facts, every entity's
//! components, zone contents, floating effects, combat, and the suspended
//! work of a paused resolution.
//!
//! All collections are `im` persistent structures, so `clone()` is O(1) and
//! shares structure with the original. The engine clones the caller's state,
//! mutates the copy, and returns it; the caller's snapshot never changes.
//!
//! The mutation helpers here (`move_entity`, `draw_cards`, ...) keep zone
//! membership and components in step and report what they did as events.

use im::{OrdMap, Vector};
use log::trace;
use serde::{Deserialize, Serialize};

use super::action::{Action, ActionRecord};
use super::components::Components;
use super::config::RulesConfig;
use super::entity::{EntityId, Timestamp};
use super::error::{EngineError, Result};
use super::player::{PlayerId, PlayerMap, PlayerState};
use super::rng::{GameRng, GameRngState};
use crate::cards::{CardDefinition, Characteristics};
use crate::combat::CombatState;
use crate::effects::{ActiveFloatingEffect, Duration, Projector};
use crate::stack::{ContinuationStack, DecisionId, PendingDecision};
use crate::triggers::{EventLog, GameEvent, PendingTrigger};
use crate::zones::{ZoneId, ZoneKind, ZoneManager, ZonePosition};

/// Phases the engine distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Main1,
    Combat,
    Main2,
}

impl Phase {
    #[must_use]
    pub const fn is_main(self) -> bool {
        matches!(self, Phase::Main1 | Phase::Main2)
    }
}

/// Turn, phase and priority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Turn number (starts at 1).
    pub number: u32,
    pub active_player: PlayerId,
    pub phase: Phase,
    pub priority_player: PlayerId,
    /// Players who passed in succession since the last action or resolution.
    pub consecutive_passes: usize,
    /// Storm count.
    pub spells_cast_this_turn: u32,
}

/// Complete game state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub config: RulesConfig,
    pub turn: TurnState,
    pub players: PlayerMap<PlayerState>,

    /// Component record per entity.
    pub entities: OrdMap<EntityId, Components>,

    /// Zone manager for object locations.
    pub zones: ZoneManager,

    /// Effects created by resolved spells and abilities.
    pub floating_effects: Vector<ActiveFloatingEffect>,

    /// Present between `BeginCombat` and `EndCombat`.
    pub combat: Option<CombatState>,

    /// Work remaining in a paused resolution.
    pub continuations: ContinuationStack,

    /// The decision the engine is waiting on, if any.
    pub pending_decision: Option<PendingDecision>,

    /// Fired triggers not yet on the stack.
    pub pending_triggers: Vector<PendingTrigger>,

    /// Deterministic RNG position.
    pub rng: GameRngState,

    /// Action history for replay and debugging.
    pub history: Vector<ActionRecord>,

    next_entity_id: u32,
    next_timestamp: u64,
    next_decision_id: u32,
}

impl GameState {
    /// Create an empty game for `config`.
    ///
    /// ```
    /// use ccg_rules::core::{GameState, PlayerId, RulesConfig};
    ///
    /// let state = GameState::new(RulesConfig::new(2).with_starting_life(30));
    /// assert_eq!(state.players[PlayerId::new(1)].life, 30);
    /// assert_eq!(state.turn.active_player, PlayerId::new(0));
    /// ```
    #[must_use]
    pub fn new(config: RulesConfig) -> Self {
        let first = config.first_player;
        Self {
            turn: TurnState {
                number: 1,
                active_player: first,
                phase: Phase::Main1,
                priority_player: first,
                consecutive_passes: 0,
                spells_cast_this_turn: 0,
            },
            players: PlayerMap::new(config.player_count, |_| {
                PlayerState::new(config.starting_life)
            }),
            entities: OrdMap::new(),
            zones: ZoneManager::new(),
            floating_effects: Vector::new(),
            combat: None,
            continuations: ContinuationStack::new(),
            pending_decision: None,
            pending_triggers: Vector::new(),
            rng: GameRngState::seeded(config.seed),
            history: Vector::new(),
            next_entity_id: EntityId::first_non_player(config.player_count),
            next_timestamp: 1,
            next_decision_id: 1,
            config,
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.config.player_count
    }

    /// Seated and has not lost.
    #[must_use]
    pub fn in_game(&self, player: PlayerId) -> bool {
        player.index() < self.player_count() && !self.players[player].has_lost
    }

    /// Players still in the game, in seat order.
    pub fn players_in_game(&self) -> impl Iterator<Item = PlayerId> + '_ {
        PlayerId::all(self.player_count()).filter(|p| self.in_game(*p))
    }

    /// Opponents of `player` still in the game.
    #[must_use]
    pub fn opponents(&self, player: PlayerId) -> Vec<PlayerId> {
        self.players_in_game().filter(|p| *p != player).collect()
    }

    /// Active player first, then the others in turn order.
    #[must_use]
    pub fn apnap_order(&self) -> Vec<PlayerId> {
        let count = self.player_count();
        let mut order = Vec::with_capacity(count);
        let mut player = self.turn.active_player;
        for _ in 0..count {
            order.push(player);
            player = player.next(count);
        }
        order
    }

    /// At most one player left.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.players_in_game().count() <= 1
    }

    // === Identifiers ===

    pub fn allocate_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    pub fn next_timestamp(&mut self) -> Timestamp {
        let ts = Timestamp(self.next_timestamp);
        self.next_timestamp += 1;
        ts
    }

    /// The timestamp `next_timestamp` will hand out, without taking it.
    #[must_use]
    pub fn peek_timestamp(&self) -> Timestamp {
        Timestamp(self.next_timestamp)
    }

    pub fn next_decision_id(&mut self) -> DecisionId {
        let id = DecisionId(self.next_decision_id);
        self.next_decision_id += 1;
        id
    }

    // === Entities ===

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Components> {
        self.entities.get(&id)
    }

    /// Components of an entity the engine expects to exist.
    pub fn require_entity(&self, id: EntityId) -> Result<&Components> {
        self.entities.get(&id).ok_or(EngineError::MissingEntity(id))
    }

    /// Apply `f` to an entity's components.
    pub fn update_entity(&mut self, id: EntityId, f: impl FnOnce(&mut Components)) -> Result<()> {
        let components = self
            .entities
            .get_mut(&id)
            .ok_or(EngineError::MissingEntity(id))?;
        f(components);
        Ok(())
    }

    /// Register a new entity that is not yet in any zone.
    pub fn insert_entity(&mut self, components: Components) -> EntityId {
        let id = self.allocate_entity_id();
        self.entities.insert(id, components);
        id
    }

    /// Delete an entity and its zone entry.
    pub fn remove_entity(&mut self, id: EntityId) {
        if self.zones.is_in_zone(id, ZoneId::BATTLEFIELD) {
            self.forget_permanent(id);
        }
        self.zones.remove(id);
        self.entities.remove(&id);
    }

    /// Create a card from its definition directly in `zone`.
    ///
    /// Used for game setup. A card created on the battlefield is treated as
    /// having been there since the start of the turn.
    pub fn create_card(&mut self, definition: &CardDefinition, owner: PlayerId, zone: ZoneId) -> EntityId {
        let mut components = Components::new()
            .with_card(definition.id)
            .with_owner(owner)
            .with_characteristics(definition.characteristics.clone());
        components.statics = definition.statics.iter().cloned().collect();
        components.mana_ability = definition.mana_ability.clone();

        if zone.is_battlefield() {
            components.controller = Some(owner);
            components.entered_at = Some(self.next_timestamp());
            components.counters.loyalty = definition.characteristics.loyalty.unwrap_or(0);
        }

        let id = self.insert_entity(components);
        self.zones.add_to_zone(id, zone, ZonePosition::Top);
        id
    }

    /// Create a token on the battlefield.
    pub fn create_token(
        &mut self,
        characteristics: Characteristics,
        controller: PlayerId,
        events: &mut EventLog,
    ) -> Result<EntityId> {
        let id = self.insert_entity(
            Components::new()
                .with_owner(controller)
                .with_controller(controller)
                .with_characteristics(characteristics)
                .as_token(),
        );
        events.push(GameEvent::TokenCreated {
            entity: id,
            controller,
        });
        self.move_entity(id, ZoneId::BATTLEFIELD, events)?;
        Ok(id)
    }

    // === Zone changes ===

    /// Move an object to the top of `to`.
    pub fn move_entity(&mut self, id: EntityId, to: ZoneId, events: &mut EventLog) -> Result<()> {
        self.move_entity_to(id, to, ZonePosition::Top, events)
    }

    /// Move an object, keeping its components consistent with the new zone.
    ///
    /// Leaving the battlefield resets everything the permanent knew about
    /// being there and drops effects that were locked onto it. Entering the
    /// battlefield stamps a new timestamp and summoning sickness.
    pub fn move_entity_to(
        &mut self,
        id: EntityId,
        to: ZoneId,
        position: ZonePosition,
        events: &mut EventLog,
    ) -> Result<()> {
        let components = self.require_entity(id)?;
        let owner = components.owner;
        let loyalty = components
            .characteristics
            .as_ref()
            .and_then(|c| c.loyalty)
            .unwrap_or(0);
        let from = self.zones.zone_of(id);
        let leaving = from == Some(ZoneId::BATTLEFIELD) && !to.is_battlefield();
        let entering = to.is_battlefield() && from != Some(ZoneId::BATTLEFIELD);

        let mut died = None;
        if leaving {
            let projected = Projector::project(self);
            let controller = projected
                .get_controller(id)
                .or(components.controller)
                .or(owner)
                .ok_or_else(|| EngineError::missing(id, "owner"))?;
            if to.kind == ZoneKind::Graveyard {
                died = Some(GameEvent::Died {
                    entity: id,
                    controller,
                    was_creature: projected.get(id).is_some_and(|o| o.is_creature()),
                });
            }
            self.forget_permanent(id);
        }

        let timestamp = entering.then(|| self.next_timestamp());
        self.zones.move_to_zone(id, to, position);
        self.update_entity(id, |c| {
            if leaving {
                c.reset_battlefield_state();
            }
            if !to.is_stack() {
                c.stack_item = None;
            }
            if !to.is_battlefield() && !to.is_stack() {
                c.controller = None;
            }
            if entering {
                c.entered_at = timestamp;
                c.controller = c.controller.or(owner);
                c.summoning_sick = true;
                c.counters.loyalty = loyalty;
            }
        })?;

        trace!("{id} moved from {from:?} to {to}");
        events.push(GameEvent::ZoneChanged { entity: id, from, to });
        if entering {
            let controller = self
                .entity(id)
                .and_then(|c| c.controller)
                .ok_or_else(|| EngineError::missing(id, "controller"))?;
            events.push(GameEvent::EnteredBattlefield {
                entity: id,
                controller,
            });
        }
        if let Some(event) = died {
            events.push(event);
        }
        Ok(())
    }

    /// Drop everything that referred to a permanent now leaving the battlefield.
    fn forget_permanent(&mut self, id: EntityId) {
        self.floating_effects = self
            .floating_effects
            .iter()
            .filter(|f| !(f.duration == Duration::WhileSourceOnBattlefield && f.effect.source == id))
            .filter_map(|f| {
                let mut f = f.clone();
                f.effect.affected.remove(&id);
                (!f.effect.affected.is_empty()).then_some(f)
            })
            .collect();
        if let Some(combat) = self.combat.as_mut() {
            combat.remove(id);
        }
    }

    /// Owner of an object.
    pub fn owner_of(&self, id: EntityId) -> Result<PlayerId> {
        self.require_entity(id)?
            .owner
            .ok_or_else(|| EngineError::missing(id, "owner"))
    }

    // === Player helpers ===

    /// Draw `count` cards. Drawing from an empty library marks the player
    /// for state-based loss. Returns the number actually drawn.
    pub fn draw_cards(&mut self, player: PlayerId, count: u32, events: &mut EventLog) -> Result<u32> {
        let mut drawn = 0;
        for _ in 0..count {
            let Some(card) = self.zones.top(ZoneId::library(player)) else {
                self.players[player].drew_from_empty_library = true;
                break;
            };
            self.move_entity(card, ZoneId::hand(player), events)?;
            events.push(GameEvent::CardDrawn {
                entity: card,
                player,
            });
            drawn += 1;
        }
        Ok(drawn)
    }

    /// Discard a card from `player`'s hand.
    pub fn discard(&mut self, player: PlayerId, card: EntityId, events: &mut EventLog) -> Result<()> {
        if !self.zones.is_in_zone(card, ZoneId::hand(player)) {
            return Err(EngineError::WrongZone {
                entity: card,
                expected: ZoneId::hand(player),
            });
        }
        self.move_entity(card, ZoneId::graveyard(player), events)?;
        events.push(GameEvent::Discarded {
            entity: card,
            player,
        });
        Ok(())
    }

    /// Change a life total by `delta`.
    pub fn adjust_life(&mut self, player: PlayerId, delta: i32, events: &mut EventLog) {
        if delta == 0 {
            return;
        }
        let from = self.players[player].life;
        let to = from + delta;
        self.players[player].life = to;
        events.push(GameEvent::LifeChanged { player, from, to });
    }

    /// Shuffle a player's library with the game RNG.
    pub fn shuffle_library(&mut self, player: PlayerId, events: &mut EventLog) {
        let mut rng = GameRng::from_state(&self.rng);
        self.zones.shuffle(ZoneId::library(player), &mut rng);
        self.rng = rng.state();
        events.push(GameEvent::LibraryShuffled { player });
    }

    /// Remove floating effects with any of the given durations.
    pub fn expire_effects(&mut self, durations: &[Duration]) {
        let before = self.floating_effects.len();
        self.floating_effects.retain(|f| !durations.contains(&f.duration));
        let expired = before - self.floating_effects.len();
        if expired > 0 {
            trace!("{expired} floating effects expired ({durations:?})");
        }
    }

    // === Stack ===

    #[must_use]
    pub fn stack_is_empty(&self) -> bool {
        self.zones.size(ZoneId::STACK) == 0
    }

    /// Stack contents, bottom to top.
    #[must_use]
    pub fn stack(&self) -> Vec<EntityId> {
        self.zones.cards_vec(ZoneId::STACK)
    }

    // === History and snapshots ===

    /// Record an action in history.
    pub fn record_action(&mut self, action: Action) {
        let sequence = self.history.len() as u32;
        self.history
            .push_back(ActionRecord::new(self.turn.number, sequence, action));
    }

    /// Canonical byte encoding of the whole state.
    pub fn snapshot_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a state produced by `snapshot_bytes`.
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardId, CardType};

    fn bear() -> CardDefinition {
        CardDefinition::new(
            CardId::new(1),
            Characteristics::new("Bear")
                .with_type(CardType::Creature)
                .with_pt(2, 2),
        )
    }

    #[test]
    fn test_new_state() {
        let state = GameState::new(RulesConfig::new(4));
        assert_eq!(state.player_count(), 4);
        assert_eq!(state.turn.number, 1);
        assert_eq!(state.players_in_game().count(), 4);
        assert!(state.stack_is_empty());
    }

    #[test]
    fn test_allocate_entity_after_players() {
        let mut state = GameState::new(RulesConfig::new(4));
        assert_eq!(state.allocate_entity_id(), EntityId(4));
        assert_eq!(state.allocate_entity_id(), EntityId(5));
    }

    #[test]
    fn test_apnap_order_starts_with_active() {
        let mut state = GameState::new(RulesConfig::new(3));
        state.turn.active_player = PlayerId::new(2);
        assert_eq!(
            state.apnap_order(),
            vec![PlayerId::new(2), PlayerId::new(0), PlayerId::new(1)]
        );
    }

    #[test]
    fn test_draw_from_empty_library_marks_player() {
        let mut state = GameState::new(RulesConfig::new(2));
        let mut events = EventLog::new();
        let p0 = PlayerId::new(0);
        state.create_card(&bear(), p0, ZoneId::library(p0));

        assert_eq!(state.draw_cards(p0, 2, &mut events).unwrap(), 1);
        assert!(state.players[p0].drew_from_empty_library);
        assert_eq!(state.zones.size(ZoneId::hand(p0)), 1);
    }

    #[test]
    fn test_enter_and_leave_battlefield() {
        let mut state = GameState::new(RulesConfig::new(2));
        let mut events = EventLog::new();
        let p0 = PlayerId::new(0);
        let id = state.create_card(&bear(), p0, ZoneId::hand(p0));

        state.move_entity(id, ZoneId::BATTLEFIELD, &mut events).unwrap();
        let c = state.entity(id).unwrap();
        assert_eq!(c.controller, Some(p0));
        assert!(c.summoning_sick);
        assert!(c.entered_at.is_some());

        state.move_entity(id, ZoneId::graveyard(p0), &mut events).unwrap();
        let c = state.entity(id).unwrap();
        assert_eq!(c.controller, None);
        assert_eq!(c.entered_at, None);
        assert!(events.events().iter().any(|e| matches!(
            e,
            GameEvent::Died { entity, was_creature: true, .. } if *entity == id
        )));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut state = GameState::new(RulesConfig::new(2));
        let snapshot = state.clone();
        state.players[PlayerId::new(0)].life = 3;
        assert_eq!(snapshot.players[PlayerId::new(0)].life, 20);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut state = GameState::new(RulesConfig::new(2).with_seed(9));
        state.create_card(&bear(), PlayerId::new(1), ZoneId::BATTLEFIELD);
        let bytes = state.snapshot_bytes().unwrap();
        assert_eq!(GameState::from_snapshot(&bytes).unwrap(), state);
    }
}
