//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable rules text of a card: its cost,
//! printed characteristics and abilities. Per-object state (tapped, damage,
//! counters, zone) lives in the entity's `Components`.

use serde::{Deserialize, Serialize};

use crate::effects::{Effect, StaticAbility, TargetRequirement};
use crate::mana::{ManaCost, ManaProduction};
use crate::triggers::TriggeredAbility;
use crate::zones::ZoneKind;

use super::characteristics::Characteristics;

/// Unique identifier for a card definition.
///
/// This identifies the "type" of card (e.g., "Lightning Bolt"),
/// not a specific object in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// What happens when the card itself resolves as a spell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellAbility {
    /// Effect of an instant or sorcery. Permanent spells usually have none.
    pub effect: Option<Effect>,

    /// Targets chosen on cast. For an aura, the first target is what it enchants.
    pub targets: Vec<TargetRequirement>,

    /// Fizzle if any target becomes illegal, not only all of them.
    pub requires_all_targets: bool,
}

/// Costs of an activated ability beyond mana.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityCost {
    pub mana: ManaCost,
    /// `{T}` in the cost.
    pub tap: bool,
    /// Discard this card (cycling).
    pub discard_self: bool,
}

/// A non-mana activated ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedAbility {
    pub cost: AbilityCost,
    pub effect: Effect,
    pub targets: Vec<TargetRequirement>,
    /// Zone the card must be in to activate (battlefield, or hand for cycling).
    pub zone: ZoneKind,
    /// Restricted to sorcery timing.
    pub sorcery_speed: bool,
}

impl ActivatedAbility {
    /// Ability activated from the battlefield at instant speed.
    #[must_use]
    pub fn new(cost: AbilityCost, effect: Effect) -> Self {
        Self {
            cost,
            effect,
            targets: Vec::new(),
            zone: ZoneKind::Battlefield,
            sorcery_speed: false,
        }
    }

    /// Cycling-style ability: pay mana, discard this card from hand, run the effect.
    #[must_use]
    pub fn cycling(mana: ManaCost, effect: Effect) -> Self {
        Self {
            cost: AbilityCost {
                mana,
                tap: false,
                discard_self: true,
            },
            effect,
            targets: Vec::new(),
            zone: ZoneKind::Hand,
            sorcery_speed: false,
        }
    }

    #[must_use]
    pub fn with_target(mut self, requirement: TargetRequirement) -> Self {
        self.targets.push(requirement);
        self
    }

    #[must_use]
    pub fn sorcery_speed(mut self) -> Self {
        self.sorcery_speed = true;
        self
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use ccg_rules::cards::{CardDefinition, CardId, CardType, Characteristics, Color};
/// use ccg_rules::effects::{Amount, Effect, EffectTarget, TargetRequirement};
/// use ccg_rules::mana::ManaCost;
///
/// let bolt = CardDefinition::new(
///     CardId::new(1),
///     Characteristics::new("Lightning Bolt")
///         .with_type(CardType::Instant)
///         .with_color(Color::Red),
/// )
/// .with_cost(ManaCost::parse("{R}").unwrap())
/// .with_spell_effect(Effect::DealDamage {
///     amount: Amount::Fixed(3),
///     to: EffectTarget::Target(0),
/// })
/// .with_spell_target(TargetRequirement::any());
///
/// assert_eq!(bolt.name(), "Lightning Bolt");
/// assert_eq!(bolt.mana_cost.cmc(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier for this card definition.
    pub id: CardId,

    /// Printed mana cost.
    pub mana_cost: ManaCost,

    /// Printed characteristics.
    pub characteristics: Characteristics,

    /// Spell behaviour (effect and targets when cast).
    pub spell: SpellAbility,

    /// Static abilities generating continuous effects while on the battlefield.
    pub statics: Vec<StaticAbility>,

    /// Triggered abilities.
    pub triggers: Vec<TriggeredAbility>,

    /// Activated (non-mana) abilities, addressed by index.
    pub activated: Vec<ActivatedAbility>,

    /// `{T}: Add mana` ability, if any.
    pub mana_ability: Option<ManaProduction>,
}

impl CardDefinition {
    /// Create a new card definition.
    #[must_use]
    pub fn new(id: CardId, characteristics: Characteristics) -> Self {
        Self {
            id,
            mana_cost: ManaCost::new(),
            characteristics,
            spell: SpellAbility {
                effect: None,
                targets: Vec::new(),
                requires_all_targets: false,
            },
            statics: Vec::new(),
            triggers: Vec::new(),
            activated: Vec::new(),
            mana_ability: None,
        }
    }

    /// Card name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.characteristics.name
    }

    #[must_use]
    pub fn with_cost(mut self, cost: ManaCost) -> Self {
        self.mana_cost = cost;
        self
    }

    #[must_use]
    pub fn with_spell_effect(mut self, effect: Effect) -> Self {
        self.spell.effect = Some(effect);
        self
    }

    #[must_use]
    pub fn with_spell_target(mut self, requirement: TargetRequirement) -> Self {
        self.spell.targets.push(requirement);
        self
    }

    #[must_use]
    pub fn requiring_all_targets(mut self) -> Self {
        self.spell.requires_all_targets = true;
        self
    }

    #[must_use]
    pub fn with_static(mut self, ability: StaticAbility) -> Self {
        self.statics.push(ability);
        self
    }

    #[must_use]
    pub fn with_trigger(mut self, ability: TriggeredAbility) -> Self {
        self.triggers.push(ability);
        self
    }

    #[must_use]
    pub fn with_activated(mut self, ability: ActivatedAbility) -> Self {
        self.activated.push(ability);
        self
    }

    #[must_use]
    pub fn with_mana_ability(mut self, production: ManaProduction) -> Self {
        self.mana_ability = Some(production);
        self
    }
}
