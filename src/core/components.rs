//! Per-entity components.
//!
//! Every object is an `EntityId` with one `Components` record. The set of
//! components is closed and small, so it is a struct of optional fields
//! rather than a type-indexed map. Updates go through the `with_*` /
//! `without_*` builders or `GameState::update_entity`, both of which produce
//! a new record and leave earlier state snapshots untouched.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::cards::{CardId, Characteristics};
use crate::effects::StaticAbility;
use crate::mana::ManaProduction;
use crate::stack::StackItem;

use super::entity::{EntityId, Timestamp};
use super::player::PlayerId;

/// Counters that matter to the rules core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Counters {
    pub plus_one: u32,
    pub minus_one: u32,
    pub loyalty: i32,
}

impl Counters {
    /// Net power/toughness modification: +1/+1 count minus -1/-1 count.
    #[must_use]
    pub fn net_pt(&self) -> i32 {
        let net = i64::from(self.plus_one) - i64::from(self.minus_one);
        net.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

/// Counter kinds placed by effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounterKind {
    PlusOne,
    MinusOne,
    Loyalty,
}

/// Component record for one entity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components {
    /// Card definition this object was created from. Tokens and ability objects have none.
    pub card: Option<CardId>,

    /// Owner. Every card and token has one.
    pub owner: Option<PlayerId>,

    /// Controller while on the battlefield or stack.
    pub controller: Option<PlayerId>,

    /// Base (printed or token-defined) characteristics.
    pub characteristics: Option<Characteristics>,

    /// Static abilities this object grants while on the battlefield.
    pub statics: Vector<StaticAbility>,

    /// `{T}: Add mana` ability.
    pub mana_ability: Option<ManaProduction>,

    pub tapped: bool,

    /// Entered under its controller's control this turn.
    pub summoning_sick: bool,

    /// Damage marked this turn.
    pub damage: u32,

    /// Damage from a deathtouch source was marked this turn.
    pub deathtouch_damage: bool,

    pub counters: Counters,

    /// Aura attachment.
    pub attached_to: Option<EntityId>,

    /// Present while the object is a spell or ability on the stack.
    pub stack_item: Option<StackItem>,

    /// When the object entered the battlefield.
    pub entered_at: Option<Timestamp>,

    pub is_token: bool,
}

impl Components {
    /// Empty component record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_card(mut self, card: CardId) -> Self {
        self.card = Some(card);
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: PlayerId) -> Self {
        self.owner = Some(owner);
        self
    }

    #[must_use]
    pub fn with_controller(mut self, controller: PlayerId) -> Self {
        self.controller = Some(controller);
        self
    }

    #[must_use]
    pub fn without_controller(mut self) -> Self {
        self.controller = None;
        self
    }

    #[must_use]
    pub fn with_characteristics(mut self, characteristics: Characteristics) -> Self {
        self.characteristics = Some(characteristics);
        self
    }

    #[must_use]
    pub fn with_static(mut self, ability: StaticAbility) -> Self {
        self.statics.push_back(ability);
        self
    }

    #[must_use]
    pub fn with_mana_ability(mut self, production: ManaProduction) -> Self {
        self.mana_ability = Some(production);
        self
    }

    #[must_use]
    pub fn with_stack_item(mut self, item: StackItem) -> Self {
        self.stack_item = Some(item);
        self
    }

    #[must_use]
    pub fn without_stack_item(mut self) -> Self {
        self.stack_item = None;
        self
    }

    #[must_use]
    pub fn with_counters(mut self, counters: Counters) -> Self {
        self.counters = counters;
        self
    }

    #[must_use]
    pub fn as_token(mut self) -> Self {
        self.is_token = true;
        self
    }

    /// Characteristics name, or a placeholder for ability objects.
    #[must_use]
    pub fn name(&self) -> &str {
        self.characteristics
            .as_ref()
            .map_or("<ability>", |c| c.name.as_str())
    }

    /// Forget everything an object knew about being on the battlefield.
    ///
    /// A permanent that changes zones becomes a new object.
    pub(crate) fn reset_battlefield_state(&mut self) {
        self.tapped = false;
        self.summoning_sick = false;
        self.damage = 0;
        self.deathtouch_damage = false;
        self.counters = Counters::default();
        self.attached_to = None;
        self.entered_at = None;
        self.controller = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardType;

    #[test]
    fn test_net_counters() {
        let counters = Counters {
            plus_one: 3,
            minus_one: 1,
            loyalty: 0,
        };
        assert_eq!(counters.net_pt(), 2);
    }

    #[test]
    fn test_builders_leave_original_untouched() {
        let base = Components::new()
            .with_owner(PlayerId::new(0))
            .with_characteristics(Characteristics::new("Bear").with_type(CardType::Creature));
        let controlled = base.clone().with_controller(PlayerId::new(1));

        assert_eq!(base.controller, None);
        assert_eq!(controlled.controller, Some(PlayerId::new(1)));
        assert_eq!(controlled.without_controller().controller, None);
    }

    #[test]
    fn test_reset_battlefield_state() {
        let mut components = Components::new()
            .with_owner(PlayerId::new(0))
            .with_controller(PlayerId::new(1));
        components.tapped = true;
        components.damage = 3;
        components.counters.plus_one = 2;
        components.attached_to = Some(EntityId(9));
        components.entered_at = Some(Timestamp(4));

        components.reset_battlefield_state();

        assert!(!components.tapped);
        assert_eq!(components.damage, 0);
        assert_eq!(components.counters, Counters::default());
        assert_eq!(components.attached_to, None);
        assert_eq!(components.entered_at, None);
        assert_eq!(components.controller, None);
        assert_eq!(components.owner, Some(PlayerId::new(0)));
    }

    #[test]
    fn test_name_placeholder() {
        assert_eq!(Components::new().name(), "<ability>");
    }
}
