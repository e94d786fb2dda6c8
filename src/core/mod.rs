//! Core engine types: entities, players, components, state, actions, RNG,
//! configuration and errors.

pub mod action;
pub mod components;
pub mod config;
pub mod entity;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, ActionRecord};
pub use components::{Components, CounterKind, Counters};
pub use config::RulesConfig;
pub use entity::{EntityId, Timestamp};
pub use error::{EngineError, Result};
pub use player::{PlayerId, PlayerMap, PlayerState};
pub use rng::{GameRng, GameRngState};
pub use state::{GameState, Phase, TurnState};
