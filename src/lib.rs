//! # ccg-rules
//!
//! Rules evaluation core for a Magic-style trading card game.
//!
//! ## Design Principles
//!
//! 1. **Immutable In, Immutable Out**: `Engine::execute(&state, action)`
//!    never touches its input. It works on an O(1) clone (`im` persistent
//!    structures) and returns the new state, or the old one on rejection.
//!
//! 2. **Printed Values Stored, Everything Else Projected**: Components hold
//!    what the card says. Continuous effects are applied on demand by the
//!    `Projector` in layer order.
//!
//! 3. **Decisions Are Data**: When an effect needs a player choice, the
//!    engine stores the rest of the work as continuation frames inside the
//!    state and returns `Paused`. `Engine::resume` picks it up again.
//!
//! 4. **N-Player First**: Priority, APNAP trigger order and turn order work
//!    for any number of players.
//!
//! ## Modules
//!
//! - `core`: Entity IDs, players, components, state, actions, RNG, config, errors
//! - `zones`: Zone membership and ordering
//! - `cards`: Characteristics, definitions and the card registry
//! - `mana`: Costs, pools and the mana payment solver
//! - `effects`: Effects, the executor, layers, projection and targeting
//! - `triggers`: Events and triggered abilities
//! - `stack`: Stack items, priority, continuations and resolution
//! - `combat`: Attacks, blocks and damage
//! - `rules`: The engine, state-based actions and turn structure

pub mod cards;
pub mod combat;
pub mod core;
pub mod effects;
pub mod mana;
pub mod rules;
pub mod stack;
pub mod triggers;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionRecord, Components, EngineError, EntityId, GameRng, GameState, Phase, PlayerId,
    PlayerMap, Result, RulesConfig,
};

pub use crate::zones::{ZoneId, ZoneKind, ZoneManager, ZonePosition};

pub use crate::cards::{
    CardDefinition, CardId, CardLookup, CardRegistry, CardType, Characteristics, Color, Keyword,
};

pub use crate::mana::{ManaCost, ManaPool, ManaSolver, ManaType};

pub use crate::effects::{
    ContinuousEffect, Effect, EffectExecutor, Modification, ProjectedState, Projector, Target,
    TargetRequirement, TargetValidator,
};

pub use crate::triggers::{GameEvent, TriggerCondition, TriggeredAbility};

pub use crate::stack::{DecisionAnswer, DecisionId, PendingDecision, StackResolution, StackResolver};

pub use crate::combat::{AttackTarget, CombatManager, DamageAssignment, DamageRecipient};

pub use crate::rules::{Engine, ExecutionResult};
