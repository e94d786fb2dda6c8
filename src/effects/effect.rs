//! Effect definitions.
//!
//! Effects are the instructions a resolving spell or ability runs. They are a
//! closed sum type: adding a variant forces the executor to handle it.
//!
//! ## Addressing
//!
//! Effects name what they act on through `EffectTarget`, resolved against an
//! `ExecutionContext` at run time: a chosen target slot, the source, the
//! controller, or a group such as each opponent.
//!
//! ## Pausing effects
//!
//! `Discard`, `CounterUnlessPays`, `SearchLibrary`, `CopySpell` and `Rummage`
//! may need a player decision. The executor records the remaining work as a
//! continuation and returns `Paused`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{CardType, Characteristics};
use crate::core::{CounterKind, EntityId, PlayerId};
use crate::mana::{ManaCost, ManaType};
use crate::zones::ZoneKind;

use super::layers::{Duration, Modification};
use super::targeting::Target;

/// A number in an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Amount {
    Fixed(u32),
    /// The X chosen on cast.
    X,
}

impl Amount {
    #[must_use]
    pub const fn resolve(self, x: u32) -> u32 {
        match self {
            Amount::Fixed(n) => n,
            Amount::X => x,
        }
    }
}

/// What an effect acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectTarget {
    /// The chosen target in slot `n`.
    Target(usize),
    /// The object the ability came from.
    Source,
    Controller,
    EachOpponent,
    EachPlayer,
    /// Every creature on the battlefield.
    AllCreatures,
}

/// Library search filter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardFilter {
    Any,
    Type(CardType),
    /// Basic land: a land with the "Basic" subtype.
    BasicLand,
    Named(String),
}

impl CardFilter {
    #[must_use]
    pub fn matches(&self, characteristics: &Characteristics) -> bool {
        match self {
            CardFilter::Any => true,
            CardFilter::Type(card_type) => characteristics.has_type(*card_type),
            CardFilter::BasicLand => {
                characteristics.has_type(CardType::Land)
                    && characteristics.subtypes.contains("Basic")
            }
            CardFilter::Named(name) => &characteristics.name == name,
        }
    }
}

/// How many copies `CopySpell` makes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CopyCount {
    Fixed(u32),
    /// One for each other spell cast this turn.
    Storm,
}

/// An effect tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    // === Life and damage ===
    DealDamage { amount: Amount, to: EffectTarget },
    GainLife { amount: Amount, player: EffectTarget },
    LoseLife { amount: Amount, player: EffectTarget },

    // === Cards ===
    DrawCards { count: Amount, player: EffectTarget },
    /// The player chooses `count` cards to discard.
    Discard { count: u32, player: EffectTarget },
    /// Controller discards, the discard triggers resolve, then they draw.
    Rummage { discard: u32, draw: u32 },
    /// Controller searches their library, puts a match into `destination`,
    /// then shuffles.
    SearchLibrary {
        filter: CardFilter,
        destination: ZoneKind,
    },

    // === Permanents ===
    Destroy { what: EffectTarget },
    Exile { what: EffectTarget },
    ReturnToHand { what: EffectTarget },
    Tap { what: EffectTarget },
    Untap { what: EffectTarget },
    AddCounters {
        what: EffectTarget,
        counter: CounterKind,
        count: u32,
    },
    CreateToken {
        characteristics: Characteristics,
        count: u32,
    },
    /// Floating continuous effect locked to the objects `what` names now.
    ApplyContinuous {
        what: EffectTarget,
        modification: Modification,
        duration: Duration,
    },

    // === Mana ===
    AddMana { mana: ManaType, count: u32 },

    // === Stack ===
    CounterSpell { what: EffectTarget },
    /// Counter the spell unless its controller pays `cost`.
    CounterUnlessPays { what: EffectTarget, cost: ManaCost },
    CopySpell { what: EffectTarget, copies: CopyCount },

    // === Composite ===
    /// Run effects in order.
    Sequence(Vec<Effect>),
}

impl Effect {
    /// `what` gets +power/+toughness until end of turn.
    #[must_use]
    pub fn pump(what: EffectTarget, power: i32, toughness: i32) -> Self {
        Effect::ApplyContinuous {
            what,
            modification: Modification::ModifyPowerToughness { power, toughness },
            duration: Duration::EndOfTurn,
        }
    }

    /// Run `effects` one after another.
    #[must_use]
    pub fn sequence(effects: impl IntoIterator<Item = Effect>) -> Self {
        Effect::Sequence(effects.into_iter().collect())
    }

    /// Flatten nested sequences into the list of leaf effects.
    #[must_use]
    pub fn flatten(&self) -> Vec<Effect> {
        match self {
            Effect::Sequence(effects) => effects.iter().flat_map(Effect::flatten).collect(),
            other => vec![other.clone()],
        }
    }
}

/// Who is running an effect, from where, and with which targets.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub controller: PlayerId,
    pub source: EntityId,
    /// Chosen targets by slot; `None` where the target became illegal.
    pub targets: SmallVec<[Option<Target>; 2]>,
    pub x: u32,
}

impl ExecutionContext {
    #[must_use]
    pub fn new(controller: PlayerId, source: EntityId) -> Self {
        Self {
            controller,
            source,
            targets: SmallVec::new(),
            x: 0,
        }
    }

    #[must_use]
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = Option<Target>>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_x(mut self, x: u32) -> Self {
        self.x = x;
        self
    }

    /// The target in slot `index`, if it is still legal.
    #[must_use]
    pub fn target(&self, index: usize) -> Option<Target> {
        self.targets.get(index).copied().flatten()
    }
}
