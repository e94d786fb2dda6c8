//! Engine error types.
//!
//! Errors fall into two groups:
//!
//! - **Validation rejections**: the action is illegal right now (wrong timing,
//!   unpaid cost, illegal target or block). The caller's state is untouched.
//! - **Invariant violations**: the engine found its own data inconsistent (an
//!   entity without a required component, an unknown card definition). These
//!   point at a wiring bug rather than a player mistake.
//!
//! Rule-defined outcomes such as a spell fizzling are events, never errors.

use thiserror::Error;

use crate::cards::CardId;
use crate::core::{EntityId, PlayerId};
use crate::mana::ManaCost;
use crate::stack::DecisionId;
use crate::zones::ZoneId;

/// Everything that can go wrong while executing an action or answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{0} does not have priority")]
    NoPriority(PlayerId),

    #[error("{0} is not the active player")]
    NotActivePlayer(PlayerId),

    #[error("{0} is not in the game")]
    PlayerNotInGame(PlayerId),

    #[error("{entity} is not in {expected}")]
    WrongZone { entity: EntityId, expected: ZoneId },

    #[error("{0} does not control {1}")]
    NotController(PlayerId, EntityId),

    #[error("timing violation: {0}")]
    Timing(String),

    #[error("cannot pay {0}")]
    CannotPay(ManaCost),

    #[error("illegal target: {0}")]
    IllegalTarget(String),

    #[error("illegal attack: {0}")]
    IllegalAttack(String),

    #[error("illegal block: {0}")]
    IllegalBlock(String),

    #[error("illegal damage assignment: {0}")]
    IllegalDamageAssignment(String),

    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error("invalid answer to decision {id}: {reason}")]
    InvalidAnswer { id: DecisionId, reason: String },

    #[error("decision {0} must be answered first")]
    DecisionPending(DecisionId),

    #[error("the game is over")]
    GameOver,

    #[error("entity {0} does not exist")]
    MissingEntity(EntityId),

    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        entity: EntityId,
        component: &'static str,
    },

    #[error("no card definition for {0}")]
    UnknownCard(CardId),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl EngineError {
    /// True for errors that indicate inconsistent engine data.
    #[must_use]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            EngineError::MissingEntity(_)
                | EngineError::MissingComponent { .. }
                | EngineError::UnknownCard(_)
                | EngineError::Serialization(_)
        )
    }

    pub(crate) fn missing(entity: EntityId, component: &'static str) -> Self {
        EngineError::MissingComponent { entity, component }
    }
}

impl From<bincode::Error> for EngineError {
    fn from(err: bincode::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EngineError>;
