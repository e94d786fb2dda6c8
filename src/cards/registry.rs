//! Card registry for definition lookup.
//!
//! The rules core never owns card content; it reads definitions through the
//! [`CardLookup`] trait. `CardRegistry` is the in-memory implementation used
//! by hosts and tests.

use rustc_hash::FxHashMap;

use crate::core::{EngineError, Result};

use super::definition::{CardDefinition, CardId};

/// Read access to card definitions.
pub trait CardLookup {
    /// Look up a definition. `None` when the id is unknown.
    fn get_card(&self, id: CardId) -> Option<&CardDefinition>;

    /// Look up a definition, reporting an unknown id as an engine error.
    fn require_card(&self, id: CardId) -> Result<&CardDefinition> {
        self.get_card(id).ok_or(EngineError::UnknownCard(id))
    }
}

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use ccg_rules::cards::{CardDefinition, CardId, CardLookup, CardRegistry, CardType, Characteristics};
///
/// let mut registry = CardRegistry::new();
/// registry.register(CardDefinition::new(
///     CardId::new(1),
///     Characteristics::new("Forest").with_type(CardType::Land),
/// ));
///
/// assert_eq!(registry.get_card(CardId::new(1)).unwrap().name(), "Forest");
/// assert!(registry.get_card(CardId::new(2)).is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, CardDefinition>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition.
    ///
    /// Panics if a card with the same ID already exists.
    pub fn register(&mut self, card: CardDefinition) {
        if self.cards.contains_key(&card.id) {
            panic!("Card with ID {:?} already registered", card.id);
        }
        self.cards.insert(card.id, card);
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Find a card by name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&CardDefinition> {
        self.cards.values().find(|c| c.name() == name)
    }
}

impl CardLookup for CardRegistry {
    fn get_card(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }
}
