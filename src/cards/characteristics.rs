//! Printed characteristics: colors, card types, keywords, power/toughness.
//!
//! `Characteristics` is both the base value stored on an entity and the
//! copiable value a copy effect takes over. The projector starts from these
//! and layers continuous effects on top.

use im::OrdSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The five colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::White => "white",
            Color::Blue => "blue",
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
        };
        f.write_str(name)
    }
}

/// Card types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardType {
    Artifact,
    Creature,
    Enchantment,
    Instant,
    Land,
    Planeswalker,
    Sorcery,
}

impl CardType {
    /// Types that make a card a permanent.
    #[must_use]
    pub const fn is_permanent_type(self) -> bool {
        !matches!(self, CardType::Instant | CardType::Sorcery)
    }
}

/// Keyword abilities the rules core knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Deathtouch,
    Defender,
    DoubleStrike,
    FirstStrike,
    Flash,
    Flying,
    Haste,
    Hexproof,
    Horsemanship,
    Indestructible,
    Lifelink,
    Menace,
    Reach,
    Shadow,
    Shroud,
    Trample,
    Vigilance,
    /// Protection from a color: can't be targeted, blocked or damaged by sources of that color.
    Protection(Color),
}

/// A complete set of characteristics for one object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Characteristics {
    pub name: String,
    pub types: OrdSet<CardType>,
    pub subtypes: OrdSet<String>,
    pub colors: OrdSet<Color>,
    pub keywords: OrdSet<Keyword>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    /// Starting loyalty for planeswalkers.
    pub loyalty: Option<i32>,
}

impl Characteristics {
    /// Create named, typeless characteristics.
    ///
    /// ```
    /// use ccg_rules::cards::{CardType, Characteristics, Color, Keyword};
    ///
    /// let bears = Characteristics::new("Grizzly Bears")
    ///     .with_type(CardType::Creature)
    ///     .with_subtype("Bear")
    ///     .with_color(Color::Green)
    ///     .with_pt(2, 2);
    ///
    /// assert!(bears.is_creature());
    /// assert!(!bears.keywords.contains(&Keyword::Flying));
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, card_type: CardType) -> Self {
        self.types.insert(card_type);
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtypes.insert(subtype.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.colors.insert(color);
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.insert(keyword);
        self
    }

    #[must_use]
    pub fn with_pt(mut self, power: i32, toughness: i32) -> Self {
        self.power = Some(power);
        self.toughness = Some(toughness);
        self
    }

    #[must_use]
    pub fn with_loyalty(mut self, loyalty: i32) -> Self {
        self.loyalty = Some(loyalty);
        self
    }

    #[must_use]
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.types.contains(&card_type)
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.has_type(CardType::Creature)
    }

    /// A card with any permanent type resolves onto the battlefield.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        self.types.iter().any(|t| t.is_permanent_type())
    }

    #[must_use]
    pub fn is_aura(&self) -> bool {
        self.has_type(CardType::Enchantment) && self.subtypes.contains("Aura")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_detection() {
        let bolt = Characteristics::new("Bolt").with_type(CardType::Instant);
        assert!(!bolt.is_permanent());

        let land = Characteristics::new("Mountain").with_type(CardType::Land);
        assert!(land.is_permanent());
    }

    #[test]
    fn test_aura_detection() {
        let aura = Characteristics::new("Rancor")
            .with_type(CardType::Enchantment)
            .with_subtype("Aura");
        assert!(aura.is_aura());

        let anthem = Characteristics::new("Anthem").with_type(CardType::Enchantment);
        assert!(!anthem.is_aura());
    }

    #[test]
    fn test_protection_keyword_ordering_is_stable() {
        let chars = Characteristics::new("Knight")
            .with_keyword(Keyword::Protection(Color::Red))
            .with_keyword(Keyword::Flying)
            .with_keyword(Keyword::Protection(Color::Black));
        let collected: Vec<_> = chars.keywords.iter().copied().collect();
        assert_eq!(
            collected,
            vec![
                Keyword::Flying,
                Keyword::Protection(Color::Black),
                Keyword::Protection(Color::Red),
            ]
        );
    }
}
