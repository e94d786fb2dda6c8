//! Continuous effects and the layer they apply in.
//!
//! A `ContinuousEffect` never touches stored components. It is consumed only
//! by the [`Projector`](super::Projector), which applies effects layer by
//! layer in the fixed order of [`Layer`].
//!
//! ## Sources
//!
//! - **Static**: a permanent's `StaticAbility`, alive while the permanent is
//!   on the battlefield. Its affected set is recomputed each projection.
//! - **Floating**: an `ActiveFloatingEffect` created by a resolving spell or
//!   ability. Its affected set is locked in at creation and it expires with
//!   its `Duration`.

use im::OrdSet;
use serde::{Deserialize, Serialize};

use crate::cards::{CardType, Color, Keyword};
use crate::core::{EntityId, PlayerId, Timestamp};

/// Application layers, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    Copy,
    Control,
    Text,
    Type,
    Color,
    Ability,
    PowerToughness,
}

impl Layer {
    /// All layers in application order.
    pub const ALL: [Layer; 7] = [
        Layer::Copy,
        Layer::Control,
        Layer::Text,
        Layer::Type,
        Layer::Color,
        Layer::Ability,
        Layer::PowerToughness,
    ];
}

/// Power/toughness sublayers, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PtSublayer {
    CharacteristicDefining,
    SetValues,
    Modify,
    Counters,
    Switch,
}

impl PtSublayer {
    /// All sublayers in application order.
    pub const ALL: [PtSublayer; 5] = [
        PtSublayer::CharacteristicDefining,
        PtSublayer::SetValues,
        PtSublayer::Modify,
        PtSublayer::Counters,
        PtSublayer::Switch,
    ];
}

/// A value computed at projection time (characteristic-defining abilities).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DynamicValue {
    Fixed(i32),
    /// Cards in the controller's hand.
    CardsInControllerHand,
    /// Cards in the controller's graveyard.
    CardsInControllerGraveyard,
    /// Creatures the controller controls (as of the type layer).
    CreaturesControllerControls,
}

/// What a continuous effect does.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modification {
    /// Become a copy of another permanent's copiable values.
    CopyOf(EntityId),
    ChangeController(PlayerId),
    /// Rewrite a color word in rules text (protection keywords).
    ChangeColorWord { from: Color, to: Color },
    AddCardType(CardType),
    RemoveCardType(CardType),
    AddSubtype(String),
    AddColor(Color),
    SetColors(Vec<Color>),
    AddKeyword(Keyword),
    RemoveKeyword(Keyword),
    RemoveAllKeywords,
    CharacteristicDefining {
        power: DynamicValue,
        toughness: DynamicValue,
    },
    SetPowerToughness { power: i32, toughness: i32 },
    ModifyPowerToughness { power: i32, toughness: i32 },
    SwitchPowerToughness,
}

impl Modification {
    /// Layer this modification applies in.
    #[must_use]
    pub const fn layer(&self) -> Layer {
        match self {
            Modification::CopyOf(_) => Layer::Copy,
            Modification::ChangeController(_) => Layer::Control,
            Modification::ChangeColorWord { .. } => Layer::Text,
            Modification::AddCardType(_)
            | Modification::RemoveCardType(_)
            | Modification::AddSubtype(_) => Layer::Type,
            Modification::AddColor(_) | Modification::SetColors(_) => Layer::Color,
            Modification::AddKeyword(_)
            | Modification::RemoveKeyword(_)
            | Modification::RemoveAllKeywords => Layer::Ability,
            Modification::CharacteristicDefining { .. }
            | Modification::SetPowerToughness { .. }
            | Modification::ModifyPowerToughness { .. }
            | Modification::SwitchPowerToughness => Layer::PowerToughness,
        }
    }

    /// Sublayer within power/toughness; `None` for other layers.
    #[must_use]
    pub const fn sublayer(&self) -> Option<PtSublayer> {
        match self {
            Modification::CharacteristicDefining { .. } => {
                Some(PtSublayer::CharacteristicDefining)
            }
            Modification::SetPowerToughness { .. } => Some(PtSublayer::SetValues),
            Modification::ModifyPowerToughness { .. } => Some(PtSublayer::Modify),
            Modification::SwitchPowerToughness => Some(PtSublayer::Switch),
            _ => None,
        }
    }

    /// Adds or removes a card type or subtype.
    #[must_use]
    pub const fn is_type_changing(&self) -> bool {
        matches!(
            self,
            Modification::AddCardType(_)
                | Modification::RemoveCardType(_)
                | Modification::AddSubtype(_)
        )
    }
}

/// A modification bound to a source, a timestamp and the objects it affects.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContinuousEffect {
    pub source: EntityId,
    pub layer: Layer,
    pub sublayer: Option<PtSublayer>,
    pub timestamp: Timestamp,
    pub modification: Modification,
    pub affected: OrdSet<EntityId>,
}

impl ContinuousEffect {
    /// Build an effect; layer and sublayer follow from the modification.
    #[must_use]
    pub fn new(
        source: EntityId,
        timestamp: Timestamp,
        modification: Modification,
        affected: OrdSet<EntityId>,
    ) -> Self {
        Self {
            source,
            layer: modification.layer(),
            sublayer: modification.sublayer(),
            timestamp,
            modification,
            affected,
        }
    }
}

/// Which permanents a static ability affects, evaluated during projection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AffectedFilter {
    /// The permanent with the ability.
    SelfOnly,
    /// The permanent an aura is attached to.
    EnchantedPermanent,
    /// Creatures the source's controller controls.
    CreaturesYouControl,
    /// Creatures the source's controller controls, except the source.
    OtherCreaturesYouControl,
    AllCreatures,
    CreaturesOpponentsControl,
    CreaturesWithSubtype(String),
}

/// A static ability printed on a card.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaticAbility {
    pub modification: Modification,
    pub affected: AffectedFilter,
}

impl StaticAbility {
    #[must_use]
    pub fn new(modification: Modification, affected: AffectedFilter) -> Self {
        Self {
            modification,
            affected,
        }
    }
}

/// How long a floating effect lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Duration {
    EndOfTurn,
    EndOfCombat,
    /// Until the source leaves the battlefield.
    WhileSourceOnBattlefield,
    Indefinite,
}

/// A floating continuous effect created by a resolved spell or ability.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveFloatingEffect {
    pub effect: ContinuousEffect,
    pub duration: Duration,
}
