//! Stack item payload.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EntityId, PlayerId};
use crate::effects::{Effect, Target, TargetRequirement};

/// What kind of object is on the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackItemKind {
    Spell,
    TriggeredAbility,
    ActivatedAbility,
}

/// Component carried by every object on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackItem {
    pub kind: StackItemKind,
    pub controller: PlayerId,
    /// The spell itself, or the permanent/card an ability came from.
    pub source: EntityId,
    pub targets: SmallVec<[Target; 2]>,
    pub requirements: Vec<TargetRequirement>,
    pub effect: Option<Effect>,
    pub requires_all_targets: bool,
    /// Copies are not cards; they cease to exist instead of going to a graveyard.
    pub is_copy: bool,
    pub x: u32,
}

impl StackItem {
    #[must_use]
    pub fn new(kind: StackItemKind, controller: PlayerId, source: EntityId) -> Self {
        Self {
            kind,
            controller,
            source,
            targets: SmallVec::new(),
            requirements: Vec::new(),
            effect: None,
            requires_all_targets: false,
            is_copy: false,
            x: 0,
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Option<Effect>) -> Self {
        self.effect = effect;
        self
    }

    #[must_use]
    pub fn with_targets(
        mut self,
        requirements: Vec<TargetRequirement>,
        targets: impl IntoIterator<Item = Target>,
    ) -> Self {
        self.requirements = requirements;
        self.targets = targets.into_iter().collect();
        self
    }

    #[must_use]
    pub fn is_spell(&self) -> bool {
        self.kind == StackItemKind::Spell
    }

    /// Abilities and copies leave no card behind.
    #[must_use]
    pub fn is_ephemeral(&self) -> bool {
        self.is_copy || !self.is_spell()
    }
}
