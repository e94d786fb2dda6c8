//! Rules engine entry points.
//!
//! - `Engine`: Applies actions and decision answers, then settles state-based
//!   actions and triggers
//! - `StateBasedActions`: Checks the game applies without using the stack
//! - `TurnManager`: Cleanup and the move to the next player's turn
//!
//! Everything else (projection, the stack, combat, mana) lives in its own
//! module; the engine wires those services together per action.

pub mod engine;
pub mod state_based;
pub mod turn;

pub use engine::{Engine, ExecutionResult};
pub use state_based::{LoseReason, StateBasedAction, StateBasedActions};
pub use turn::TurnManager;
