//! Targeting.
//!
//! - `Target`: a chosen player, or an object together with the zone it was
//!   chosen in
//! - `TargetRequirement`: what a spell or ability may target
//! - `TargetValidator`: legality checks against the projected battlefield
//!
//! An object target remembers its zone. If the object has moved since, it is
//! a new object and the target is illegal.

use im::OrdSet;
use serde::{Deserialize, Serialize};

use crate::cards::{CardType, Color, Keyword};
use crate::core::{EngineError, EntityId, GameState, PlayerId, Result};
use crate::stack::StackItemKind;
use crate::zones::{ZoneId, ZoneKind};

use super::projector::{ProjectedState, Projector};

/// A chosen target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Target {
    Player(PlayerId),
    Object { id: EntityId, zone: ZoneId },
}

impl Target {
    /// A permanent on the battlefield.
    #[must_use]
    pub const fn permanent(id: EntityId) -> Self {
        Target::Object {
            id,
            zone: ZoneId::BATTLEFIELD,
        }
    }

    /// A spell or ability on the stack.
    #[must_use]
    pub const fn on_stack(id: EntityId) -> Self {
        Target::Object {
            id,
            zone: ZoneId::STACK,
        }
    }

    #[must_use]
    pub const fn entity(&self) -> Option<EntityId> {
        match self {
            Target::Player(_) => None,
            Target::Object { id, .. } => Some(*id),
        }
    }

    #[must_use]
    pub const fn player(&self) -> Option<PlayerId> {
        match self {
            Target::Player(p) => Some(*p),
            Target::Object { .. } => None,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Player(p) => write!(f, "{p}"),
            Target::Object { id, zone } => write!(f, "{id} in {zone}"),
        }
    }
}

/// What kind of thing may be targeted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// A player, creature or planeswalker.
    Any,
    Player,
    Creature,
    Permanent,
    Planeswalker,
    CreatureOrPlaneswalker,
    /// A spell on the stack.
    Spell,
    CardInGraveyard,
}

/// Whose thing may be targeted, relative to the ability's controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerFilter {
    #[default]
    Any,
    You,
    Opponent,
}

impl ControllerFilter {
    fn accepts(self, you: PlayerId, other: PlayerId) -> bool {
        match self {
            ControllerFilter::Any => true,
            ControllerFilter::You => you == other,
            ControllerFilter::Opponent => you != other,
        }
    }
}

/// One target slot of a spell or ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRequirement {
    pub kind: TargetKind,
    pub controller: ControllerFilter,
}

impl TargetRequirement {
    #[must_use]
    pub const fn new(kind: TargetKind) -> Self {
        Self {
            kind,
            controller: ControllerFilter::Any,
        }
    }

    /// "Any target".
    #[must_use]
    pub const fn any() -> Self {
        Self::new(TargetKind::Any)
    }

    #[must_use]
    pub const fn player() -> Self {
        Self::new(TargetKind::Player)
    }

    #[must_use]
    pub const fn opponent() -> Self {
        Self::new(TargetKind::Player).controlled_by(ControllerFilter::Opponent)
    }

    #[must_use]
    pub const fn creature() -> Self {
        Self::new(TargetKind::Creature)
    }

    #[must_use]
    pub const fn permanent() -> Self {
        Self::new(TargetKind::Permanent)
    }

    #[must_use]
    pub const fn planeswalker() -> Self {
        Self::new(TargetKind::Planeswalker)
    }

    #[must_use]
    pub const fn creature_or_planeswalker() -> Self {
        Self::new(TargetKind::CreatureOrPlaneswalker)
    }

    #[must_use]
    pub const fn spell() -> Self {
        Self::new(TargetKind::Spell)
    }

    #[must_use]
    pub const fn card_in_graveyard() -> Self {
        Self::new(TargetKind::CardInGraveyard)
    }

    /// Restrict by controller (or owner, for cards in graveyards).
    #[must_use]
    pub const fn controlled_by(mut self, filter: ControllerFilter) -> Self {
        self.controller = filter;
        self
    }
}

/// Checks target legality against one state.
///
/// The battlefield is projected once at construction, so hexproof or
/// protection granted by continuous effects is honored.
pub struct TargetValidator<'a> {
    state: &'a GameState,
    projected: ProjectedState,
}

impl<'a> TargetValidator<'a> {
    #[must_use]
    pub fn new(state: &'a GameState) -> Self {
        Self {
            state,
            projected: Projector::project(state),
        }
    }

    /// Reuse an existing projection of `state`.
    #[must_use]
    pub fn with_projection(state: &'a GameState, projected: ProjectedState) -> Self {
        Self { state, projected }
    }

    #[must_use]
    pub fn projected(&self) -> &ProjectedState {
        &self.projected
    }

    /// Can `controller`'s ability from `source` target `target`?
    #[must_use]
    pub fn is_legal(
        &self,
        requirement: &TargetRequirement,
        target: &Target,
        controller: PlayerId,
        source: EntityId,
    ) -> bool {
        self.check(requirement, target, controller, source).is_ok()
    }

    /// Like `is_legal`, with the reason on failure.
    pub fn check(
        &self,
        requirement: &TargetRequirement,
        target: &Target,
        controller: PlayerId,
        source: EntityId,
    ) -> Result<()> {
        let illegal = |reason: String| Err(EngineError::IllegalTarget(reason));

        match *target {
            Target::Player(player) => {
                if !matches!(requirement.kind, TargetKind::Any | TargetKind::Player) {
                    return illegal(format!("{player} is not a legal {:?} target", requirement.kind));
                }
                if !self.state.in_game(player) {
                    return illegal(format!("{player} is not in the game"));
                }
                if !requirement.controller.accepts(controller, player) {
                    return illegal(format!("{player} does not match {:?}", requirement.controller));
                }
                Ok(())
            }
            Target::Object { id, zone } => {
                if !self.state.zones.is_in_zone(id, zone) {
                    return illegal(format!("{id} is no longer in {zone}"));
                }
                match zone.kind {
                    ZoneKind::Battlefield => self.check_permanent(requirement, id, controller, source),
                    ZoneKind::Stack => self.check_spell(requirement, id, controller),
                    ZoneKind::Graveyard => self.check_graveyard_card(requirement, id, zone, controller),
                    _ => illegal(format!("{id} in {zone} cannot be targeted")),
                }
            }
        }
    }

    fn check_permanent(
        &self,
        requirement: &TargetRequirement,
        id: EntityId,
        controller: PlayerId,
        source: EntityId,
    ) -> Result<()> {
        let illegal = |reason: String| Err(EngineError::IllegalTarget(reason));
        let Some(obj) = self.projected.get(id) else {
            return illegal(format!("{id} is not a permanent"));
        };

        let type_ok = match requirement.kind {
            TargetKind::Permanent => true,
            TargetKind::Creature => obj.is_creature(),
            TargetKind::Planeswalker => obj.types.contains(&CardType::Planeswalker),
            TargetKind::Any | TargetKind::CreatureOrPlaneswalker => {
                obj.is_creature() || obj.types.contains(&CardType::Planeswalker)
            }
            TargetKind::Player | TargetKind::Spell | TargetKind::CardInGraveyard => false,
        };
        if !type_ok {
            return illegal(format!("{} is not a legal {:?} target", obj.name, requirement.kind));
        }
        if !requirement.controller.accepts(controller, obj.controller) {
            return illegal(format!("{} does not match {:?}", obj.name, requirement.controller));
        }
        if obj.keywords.contains(&Keyword::Shroud) {
            return illegal(format!("{} has shroud", obj.name));
        }
        if obj.keywords.contains(&Keyword::Hexproof) && obj.controller != controller {
            return illegal(format!("{} has hexproof", obj.name));
        }
        if let Some(color) = self
            .source_colors(source)
            .into_iter()
            .find(|c| obj.keywords.contains(&Keyword::Protection(*c)))
        {
            return illegal(format!("{} has protection from {color}", obj.name));
        }
        Ok(())
    }

    fn check_spell(&self, requirement: &TargetRequirement, id: EntityId, controller: PlayerId) -> Result<()> {
        let item = self
            .state
            .entity(id)
            .and_then(|c| c.stack_item.as_ref())
            .filter(|item| item.kind == StackItemKind::Spell);
        match item {
            Some(item) if requirement.kind == TargetKind::Spell => {
                if requirement.controller.accepts(controller, item.controller) {
                    Ok(())
                } else {
                    Err(EngineError::IllegalTarget(format!(
                        "spell {id} does not match {:?}",
                        requirement.controller
                    )))
                }
            }
            _ => Err(EngineError::IllegalTarget(format!("{id} is not a targetable spell"))),
        }
    }

    fn check_graveyard_card(
        &self,
        requirement: &TargetRequirement,
        id: EntityId,
        zone: ZoneId,
        controller: PlayerId,
    ) -> Result<()> {
        if requirement.kind != TargetKind::CardInGraveyard {
            return Err(EngineError::IllegalTarget(format!("{id} is in a graveyard")));
        }
        match zone.owner {
            Some(owner) if requirement.controller.accepts(controller, owner) => Ok(()),
            _ => Err(EngineError::IllegalTarget(format!(
                "{id} is not in a matching graveyard"
            ))),
        }
    }

    /// Colors of a source: projected if it is a permanent, printed otherwise.
    fn source_colors(&self, source: EntityId) -> OrdSet<Color> {
        if let Some(obj) = self.projected.get(source) {
            return obj.colors.clone();
        }
        self.state
            .entity(source)
            .and_then(|c| c.characteristics.as_ref())
            .map(|chars| chars.colors.clone())
            .unwrap_or_default()
    }

    /// Check a full set of chosen targets at cast or activation time.
    pub fn validate(
        &self,
        requirements: &[TargetRequirement],
        targets: &[Target],
        controller: PlayerId,
        source: EntityId,
    ) -> Result<()> {
        if requirements.len() != targets.len() {
            return Err(EngineError::IllegalTarget(format!(
                "expected {} targets, got {}",
                requirements.len(),
                targets.len()
            )));
        }
        for (requirement, target) in requirements.iter().zip(targets) {
            self.check(requirement, target, controller, source)?;
        }
        Ok(())
    }

    /// Every legal choice for one requirement.
    #[must_use]
    pub fn legal_targets(
        &self,
        requirement: &TargetRequirement,
        controller: PlayerId,
        source: EntityId,
    ) -> Vec<Target> {
        let state = self.state;
        let players = PlayerId::all(state.player_count()).map(Target::Player);
        let permanents = state.zones.cards(ZoneId::BATTLEFIELD).map(Target::permanent);
        let stack = state.zones.cards(ZoneId::STACK).map(Target::on_stack);
        let graveyards = PlayerId::all(state.player_count()).flat_map(|p| {
            let zone = ZoneId::graveyard(p);
            state.zones.cards(zone).map(move |id| Target::Object { id, zone })
        });

        players
            .chain(permanents)
            .chain(stack)
            .chain(graveyards)
            .filter(|t| self.is_legal(requirement, t, controller, source))
            .collect()
    }

    /// Recheck targets at resolution; illegal ones become `None`.
    #[must_use]
    pub fn revalidate(
        &self,
        requirements: &[TargetRequirement],
        targets: &[Target],
        controller: PlayerId,
        source: EntityId,
    ) -> Vec<Option<Target>> {
        targets
            .iter()
            .enumerate()
            .map(|(i, target)| {
                let legal = requirements
                    .get(i)
                    .map_or(true, |req| self.is_legal(req, target, controller, source));
                legal.then_some(*target)
            })
            .collect()
    }
}
