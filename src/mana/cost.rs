//! Mana types, costs, pools and what sources produce.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cards::Color;
use crate::core::{EngineError, Result};

/// One unit of mana is one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ManaType {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
}

impl ManaType {
    /// The five colored types, in WUBRG order.
    pub const COLORS: [ManaType; 5] = [
        ManaType::White,
        ManaType::Blue,
        ManaType::Black,
        ManaType::Red,
        ManaType::Green,
    ];

    /// Every mana type; colorless first, matching the order generic costs are paid in.
    pub const GENERIC_ORDER: [ManaType; 6] = [
        ManaType::Colorless,
        ManaType::White,
        ManaType::Blue,
        ManaType::Black,
        ManaType::Red,
        ManaType::Green,
    ];

    /// Cost/pool symbol.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            ManaType::White => 'W',
            ManaType::Blue => 'U',
            ManaType::Black => 'B',
            ManaType::Red => 'R',
            ManaType::Green => 'G',
            ManaType::Colorless => 'C',
        }
    }

    /// Parse a symbol character.
    #[must_use]
    pub fn from_symbol(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'W' => Some(ManaType::White),
            'U' => Some(ManaType::Blue),
            'B' => Some(ManaType::Black),
            'R' => Some(ManaType::Red),
            'G' => Some(ManaType::Green),
            'C' => Some(ManaType::Colorless),
            _ => None,
        }
    }
}

impl From<Color> for ManaType {
    fn from(color: Color) -> Self {
        match color {
            Color::White => ManaType::White,
            Color::Blue => ManaType::Blue,
            Color::Black => ManaType::Black,
            Color::Red => ManaType::Red,
            Color::Green => ManaType::Green,
        }
    }
}

impl fmt::Display for ManaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.symbol())
    }
}

/// A mana cost such as `{2}{R}`.
///
/// `colorless` counts `{C}` symbols, which only colorless mana can pay;
/// `generic` is payable by anything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaCost {
    pub generic: u32,
    pub white: u32,
    pub blue: u32,
    pub black: u32,
    pub red: u32,
    pub green: u32,
    pub colorless: u32,
}

impl ManaCost {
    /// The empty cost.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            generic: 0,
            white: 0,
            blue: 0,
            black: 0,
            red: 0,
            green: 0,
            colorless: 0,
        }
    }

    /// Parse `{2}{R}{R}`, `2RR` or a mix of both.
    ///
    /// ```
    /// use ccg_rules::mana::ManaCost;
    ///
    /// let cost = ManaCost::parse("{2}{R}").unwrap();
    /// assert_eq!(cost.generic, 2);
    /// assert_eq!(cost.red, 1);
    /// assert_eq!(cost.to_string(), "{2}{R}");
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut cost = ManaCost::new();
        let mut digits = String::new();

        let flush = |digits: &mut String, cost: &mut ManaCost| -> Result<()> {
            if !digits.is_empty() {
                let n: u32 = digits
                    .parse()
                    .map_err(|_| EngineError::InvalidAction(format!("bad mana cost {digits}")))?;
                cost.generic += n;
                digits.clear();
            }
            Ok(())
        };

        for c in text.chars() {
            match c {
                '0'..='9' => digits.push(c),
                '{' | '}' | ' ' => flush(&mut digits, &mut cost)?,
                other => {
                    flush(&mut digits, &mut cost)?;
                    let mana = ManaType::from_symbol(other).ok_or_else(|| {
                        EngineError::InvalidAction(format!("unknown mana symbol {other}"))
                    })?;
                    cost.add(mana, 1);
                }
            }
        }
        flush(&mut digits, &mut cost)?;
        Ok(cost)
    }

    /// Builder: add generic mana.
    #[must_use]
    pub const fn with_generic(mut self, amount: u32) -> Self {
        self.generic += amount;
        self
    }

    /// Builder: add symbols of a specific type.
    #[must_use]
    pub fn with(mut self, mana: ManaType, amount: u32) -> Self {
        self.add(mana, amount);
        self
    }

    /// Number of symbols of the given type.
    #[must_use]
    pub const fn amount(&self, mana: ManaType) -> u32 {
        match mana {
            ManaType::White => self.white,
            ManaType::Blue => self.blue,
            ManaType::Black => self.black,
            ManaType::Red => self.red,
            ManaType::Green => self.green,
            ManaType::Colorless => self.colorless,
        }
    }

    fn slot(&mut self, mana: ManaType) -> &mut u32 {
        match mana {
            ManaType::White => &mut self.white,
            ManaType::Blue => &mut self.blue,
            ManaType::Black => &mut self.black,
            ManaType::Red => &mut self.red,
            ManaType::Green => &mut self.green,
            ManaType::Colorless => &mut self.colorless,
        }
    }

    /// Add symbols of a type.
    pub fn add(&mut self, mana: ManaType, amount: u32) {
        *self.slot(mana) += amount;
    }

    /// Remove up to `amount` symbols of a type.
    pub fn reduce(&mut self, mana: ManaType, amount: u32) {
        let slot = self.slot(mana);
        *slot = slot.saturating_sub(amount);
    }

    /// Total mana value.
    #[must_use]
    pub const fn cmc(&self) -> u32 {
        self.generic
            + self.white
            + self.blue
            + self.black
            + self.red
            + self.green
            + self.colorless
    }

    /// True when nothing is left to pay.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cmc() == 0
    }

    /// The colored and `{C}` symbols, one entry per unit, in WUBRG-then-C order.
    #[must_use]
    pub fn specific_units(&self) -> Vec<ManaType> {
        ManaType::COLORS
            .iter()
            .chain(std::iter::once(&ManaType::Colorless))
            .flat_map(|&mana| std::iter::repeat(mana).take(self.amount(mana) as usize))
            .collect()
    }
}

impl fmt::Display for ManaCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "{{0}}");
        }
        if self.generic > 0 {
            write!(f, "{{{}}}", self.generic)?;
        }
        for mana in self.specific_units() {
            write!(f, "{mana}")?;
        }
        Ok(())
    }
}

/// Floating mana owned by one player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaPool {
    pub white: u32,
    pub blue: u32,
    pub black: u32,
    pub red: u32,
    pub green: u32,
    pub colorless: u32,
}

impl ManaPool {
    /// An empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            white: 0,
            blue: 0,
            black: 0,
            red: 0,
            green: 0,
            colorless: 0,
        }
    }

    /// Builder: add mana.
    #[must_use]
    pub fn with(mut self, mana: ManaType, amount: u32) -> Self {
        self.add(mana, amount);
        self
    }

    /// Amount of one type.
    #[must_use]
    pub const fn amount(&self, mana: ManaType) -> u32 {
        match mana {
            ManaType::White => self.white,
            ManaType::Blue => self.blue,
            ManaType::Black => self.black,
            ManaType::Red => self.red,
            ManaType::Green => self.green,
            ManaType::Colorless => self.colorless,
        }
    }

    fn slot(&mut self, mana: ManaType) -> &mut u32 {
        match mana {
            ManaType::White => &mut self.white,
            ManaType::Blue => &mut self.blue,
            ManaType::Black => &mut self.black,
            ManaType::Red => &mut self.red,
            ManaType::Green => &mut self.green,
            ManaType::Colorless => &mut self.colorless,
        }
    }

    /// Add mana of one type.
    pub fn add(&mut self, mana: ManaType, amount: u32) {
        *self.slot(mana) += amount;
    }

    /// Remove up to `amount`; returns how much was actually removed.
    pub fn remove(&mut self, mana: ManaType, amount: u32) -> u32 {
        let slot = self.slot(mana);
        let taken = (*slot).min(amount);
        *slot -= taken;
        taken
    }

    /// Total units floating.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.white + self.blue + self.black + self.red + self.green + self.colorless
    }

    /// True when no mana is floating.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Empty the pool.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl fmt::Display for ManaPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(empty)");
        }
        for mana in ManaType::COLORS
            .iter()
            .chain(std::iter::once(&ManaType::Colorless))
        {
            for _ in 0..self.amount(*mana) {
                write!(f, "{mana}")?;
            }
        }
        Ok(())
    }
}

/// What a mana ability can produce when tapped.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManaProduction {
    /// Exactly one colored type (Mountain → `{R}`).
    Fixed(ManaType),
    /// One of several types (Taiga → `{R}` or `{G}`).
    Choice(Vec<ManaType>),
    /// Any color.
    AnyColor,
    /// Only colorless.
    Colorless,
}

impl ManaProduction {
    /// Can this source make `mana`?
    #[must_use]
    pub fn can_produce(&self, mana: ManaType) -> bool {
        match self {
            ManaProduction::Fixed(fixed) => *fixed == mana,
            ManaProduction::Choice(options) => options.contains(&mana),
            ManaProduction::AnyColor => mana != ManaType::Colorless,
            ManaProduction::Colorless => mana == ManaType::Colorless,
        }
    }

    /// The type produced when no specific type is requested.
    #[must_use]
    pub fn default_type(&self) -> ManaType {
        match self {
            ManaProduction::Fixed(mana) => *mana,
            ManaProduction::Choice(options) => {
                options.first().copied().unwrap_or(ManaType::Colorless)
            }
            ManaProduction::AnyColor => ManaType::White,
            ManaProduction::Colorless => ManaType::Colorless,
        }
    }

    /// Search preference: single-output sources first, flexible ones last.
    #[must_use]
    pub(crate) fn flexibility(&self) -> u8 {
        match self {
            ManaProduction::Colorless | ManaProduction::Fixed(_) => 0,
            ManaProduction::Choice(options) => options.len().min(5) as u8,
            ManaProduction::AnyColor => 6,
        }
    }
}
