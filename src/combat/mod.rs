//! Combat: attackers, blockers and combat damage.
//!
//! ## Key Types
//!
//! - `CombatState`: Who attacks what, who blocks whom, and the current step
//! - `CombatManager`: Validates and applies each combat action
//! - `DamageCalculator`: Lethal damage and assignment order
//! - `deal_damage`: The single path all damage takes, combat or not

pub mod damage;
pub mod manager;
pub mod state;

pub use damage::{
    deal_damage, lethal_damage, DamageAssignment, DamageCalculator, DamageRecipient, DamageSource,
    DamageStep,
};
pub use manager::{can_block, minimum_blockers, CombatManager};
pub use state::{AttackTarget, CombatState, CombatStep};
