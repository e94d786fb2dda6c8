//! Events and triggered abilities.
//!
//! ## Key Components
//!
//! - [`GameEvent`]: A typed fact about something that happened
//! - [`EventLog`]: Ordered event list with a trigger-scan cursor
//! - [`TriggerCondition`] / [`TriggeredAbility`]: When an ability fires and what it does
//! - [`TriggerDetector`]: Matches new events against abilities in play
//! - [`PendingTrigger`]: A fired ability waiting for the stack
//!
//! ## Ordering
//!
//! Triggers fired during one step are collected first and put on the stack
//! afterwards in APNAP order: the active player's triggers go on the stack
//! first (and so resolve last), then each other player's in turn order.

mod condition;
mod detector;
mod event;

pub use condition::{TriggerCondition, TriggeredAbility};
pub use detector::{apnap_sort, PendingTrigger, TriggerDetector};
pub use event::{EventLog, GameEvent};
