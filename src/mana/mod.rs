//! Mana: costs, pools, sources and payment.
//!
//! ## Key Types
//!
//! - `ManaType`: The five colors plus colorless
//! - `ManaCost`: Generic plus per-type symbols
//! - `ManaPool`: Floating mana
//! - `ManaProduction`: What a mana ability can make
//! - `ManaSolver`: Pays costs from the pool and untapped sources

pub mod cost;
pub mod solver;

pub use cost::{ManaCost, ManaPool, ManaProduction, ManaType};
pub use solver::{ManaSolution, ManaSolver, ManaSource, PartialPayment};
