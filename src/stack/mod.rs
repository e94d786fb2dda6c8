//! The stack, priority, and suspended resolution.
//!
//! Two LIFO structures live in the game state:
//!
//! - **The stack zone** holds spells and abilities waiting to resolve. Each
//!   object there carries a `StackItem` component.
//! - **The continuation stack** holds the remaining work of an effect that
//!   is waiting on a player decision.
//!
//! ## Example Usage
//!
//! ```
//! use ccg_rules::cards::CardRegistry;
//! use ccg_rules::core::{GameState, PlayerId, RulesConfig};
//! use ccg_rules::stack::{PassOutcome, PriorityManager, StackResolution, StackResolver};
//!
//! let registry = CardRegistry::new();
//! let mut state = GameState::new(RulesConfig::new(2));
//!
//! assert_eq!(
//!     PriorityManager::pass(&mut state, PlayerId::new(0)).unwrap(),
//!     PassOutcome::Passed(PlayerId::new(1))
//! );
//! let result = StackResolver::new(&registry).resolve_top_of_stack(&state).unwrap();
//! assert_eq!(result.outcome, StackResolution::EmptyStack);
//! ```

mod continuation;
mod decision;
mod item;
mod priority;
mod resolver;

pub use continuation::{Continuation, ContinuationFrame, ContinuationStack};
pub use decision::{DecisionAnswer, DecisionId, DecisionKind, PendingDecision};
pub use item::{StackItem, StackItemKind};
pub use priority::{PassOutcome, PriorityManager};
pub use resolver::{ResolutionResult, StackResolution, StackResolver};
