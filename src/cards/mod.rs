//! Card system: characteristics, definitions and the registry.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card definitions
//! - `Characteristics`: Name, types, colors, keywords, power/toughness
//! - `CardDefinition`: Static card data (cost, spell, abilities)
//! - `CardLookup`: Read-only definition lookup used by the engine
//! - `CardRegistry`: In-memory `CardLookup`

pub mod characteristics;
pub mod definition;
pub mod registry;

pub use characteristics::{CardType, Characteristics, Color, Keyword};
pub use definition::{AbilityCost, ActivatedAbility, CardDefinition, CardId, SpellAbility};
pub use registry::{CardLookup, CardRegistry};
