//! Damage: lethal damage, combat assignment and dealing damage.
//!
//! ## Assignment order
//!
//! A blocked attacker assigns damage to its blockers in the order they were
//! declared. Each blocker must be assigned lethal damage before anything is
//! assigned past it. With trample the rest may go to the player or
//! planeswalker being attacked; without it the rest stays on the last blocker.

use im::OrdSet;
use serde::{Deserialize, Serialize};

use crate::cards::{CardType, Color, Keyword};
use crate::core::{CounterKind, EngineError, EntityId, GameState, PlayerId, Result};
use crate::effects::ProjectedState;
use crate::triggers::{EventLog, GameEvent};

use super::state::{AttackTarget, CombatState};

/// Something that can be dealt damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DamageRecipient {
    Player(PlayerId),
    Permanent(EntityId),
}

impl From<AttackTarget> for DamageRecipient {
    fn from(target: AttackTarget) -> Self {
        match target {
            AttackTarget::Player(p) => DamageRecipient::Player(p),
            AttackTarget::Planeswalker(id) => DamageRecipient::Permanent(id),
        }
    }
}

/// How one attacker splits its combat damage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageAssignment {
    pub attacker: EntityId,
    pub assignments: Vec<(DamageRecipient, u32)>,
}

impl DamageAssignment {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.assignments.iter().map(|(_, n)| n).sum()
    }

    /// Damage assigned to `recipient`.
    #[must_use]
    pub fn to(&self, recipient: DamageRecipient) -> u32 {
        self.assignments
            .iter()
            .filter(|(r, _)| *r == recipient)
            .map(|(_, n)| n)
            .sum()
    }
}

/// Which combat damage step is being dealt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageStep {
    FirstStrike,
    Regular,
}

/// Damage still needed to destroy a creature.
///
/// ```
/// use ccg_rules::combat::lethal_damage;
///
/// assert_eq!(lethal_damage(4, 1, false), 3);
/// assert_eq!(lethal_damage(4, 6, false), 1);
/// assert_eq!(lethal_damage(10, 0, true), 1);
/// ```
#[must_use]
pub fn lethal_damage(toughness: i32, marked: u32, deathtouch: bool) -> u32 {
    if deathtouch {
        return 1;
    }
    let remaining = i64::from(toughness) - i64::from(marked);
    remaining.max(1) as u32
}

/// The characteristics of a damage source that change how damage lands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageSource {
    pub id: EntityId,
    pub controller: PlayerId,
    pub colors: OrdSet<Color>,
    pub lifelink: bool,
    pub deathtouch: bool,
}

impl DamageSource {
    /// Read a source from the projection, or from its base characteristics
    /// when it is not on the battlefield (a resolving spell).
    #[must_use]
    pub fn new(state: &GameState, projected: &ProjectedState, id: EntityId, controller: PlayerId) -> Self {
        if let Some(obj) = projected.get(id) {
            return Self {
                id,
                controller: obj.controller,
                colors: obj.colors.clone(),
                lifelink: obj.keywords.contains(&Keyword::Lifelink),
                deathtouch: obj.keywords.contains(&Keyword::Deathtouch),
            };
        }
        let chars = state.entity(id).and_then(|c| c.characteristics.as_ref());
        Self {
            id,
            controller,
            colors: chars.map(|c| c.colors.clone()).unwrap_or_default(),
            lifelink: chars.is_some_and(|c| c.keywords.contains(&Keyword::Lifelink)),
            deathtouch: chars.is_some_and(|c| c.keywords.contains(&Keyword::Deathtouch)),
        }
    }
}

/// Deal `amount` damage from `source`. Returns the damage actually dealt.
///
/// Damage to a player reduces life. Damage to a planeswalker removes loyalty.
/// Damage to a creature is marked on it. Protection from one of the source's
/// colors prevents it all. A lifelink source's controller gains that much life.
pub fn deal_damage(
    state: &mut GameState,
    projected: &ProjectedState,
    source: &DamageSource,
    recipient: DamageRecipient,
    amount: u32,
    combat: bool,
    events: &mut EventLog,
) -> Result<u32> {
    if amount == 0 {
        return Ok(0);
    }
    match recipient {
        DamageRecipient::Player(player) => {
            if !state.in_game(player) {
                return Ok(0);
            }
            state.adjust_life(player, -(amount as i32), events);
        }
        DamageRecipient::Permanent(id) => {
            let Some(obj) = projected.get(id) else {
                return Ok(0);
            };
            let protected = source
                .colors
                .iter()
                .any(|color| obj.keywords.contains(&Keyword::Protection(*color)));
            if protected {
                return Ok(0);
            }
            let planeswalker = obj.types.contains(&CardType::Planeswalker);
            let creature = obj.is_creature();
            let deathtouch = source.deathtouch;
            state.update_entity(id, |c| {
                if planeswalker {
                    c.counters.loyalty -= amount as i32;
                }
                if creature {
                    c.damage += amount;
                    c.deathtouch_damage |= deathtouch;
                }
            })?;
            if planeswalker {
                events.push(GameEvent::CountersChanged {
                    entity: id,
                    counter: CounterKind::Loyalty,
                    delta: -(amount as i32),
                });
            }
        }
    }

    events.push(GameEvent::DamageDealt {
        source: source.id,
        recipient,
        amount,
        combat,
    });
    if source.lifelink {
        state.adjust_life(source.controller, amount as i32, events);
    }
    Ok(amount)
}

/// Combat damage assignment rules.
pub struct DamageCalculator;

impl DamageCalculator {
    /// Does `id` deal damage in `step`?
    #[must_use]
    pub fn deals_damage_in_step(projected: &ProjectedState, id: EntityId, step: DamageStep) -> bool {
        let first = projected.has_keyword(id, Keyword::FirstStrike);
        let double = projected.has_keyword(id, Keyword::DoubleStrike);
        match step {
            DamageStep::FirstStrike => first || double,
            DamageStep::Regular => !first || double,
        }
    }

    /// Does any creature in combat have first or double strike?
    #[must_use]
    pub fn has_first_strike_step(projected: &ProjectedState, combat: &CombatState) -> bool {
        combat
            .attackers
            .iter()
            .map(|(a, _)| *a)
            .chain(combat.blocks.keys().copied())
            .any(|id| Self::deals_damage_in_step(projected, id, DamageStep::FirstStrike))
    }

    /// Where the attacker's damage goes past its blockers, if anywhere.
    fn attack_recipient(projected: &ProjectedState, combat: &CombatState, attacker: EntityId) -> Option<DamageRecipient> {
        match combat.attack_target(attacker)? {
            AttackTarget::Player(p) => Some(DamageRecipient::Player(p)),
            AttackTarget::Planeswalker(id) => projected
                .get(id)
                .is_some()
                .then_some(DamageRecipient::Permanent(id)),
        }
    }

    fn lethal_for(state: &GameState, projected: &ProjectedState, blocker: EntityId, deathtouch: bool) -> u32 {
        let toughness = projected.get_toughness(blocker).unwrap_or(0);
        let marked = state.entity(blocker).map_or(0, |c| c.damage);
        lethal_damage(toughness, marked, deathtouch)
    }

    /// Default assignment for an attacker.
    #[must_use]
    pub fn auto_assign(
        state: &GameState,
        projected: &ProjectedState,
        combat: &CombatState,
        attacker: EntityId,
    ) -> DamageAssignment {
        let power = projected.get_power(attacker).unwrap_or(0).max(0) as u32;
        let trample = projected.has_keyword(attacker, Keyword::Trample);
        let deathtouch = projected.has_keyword(attacker, Keyword::Deathtouch);
        let past_blockers = Self::attack_recipient(projected, combat, attacker);
        let mut assignments = Vec::new();

        if power == 0 {
            return DamageAssignment { attacker, assignments };
        }

        let blockers: Vec<EntityId> = combat
            .blockers_of(attacker)
            .into_iter()
            .filter(|b| projected.get(*b).is_some())
            .collect();

        if !combat.is_blocked(attacker) || (blockers.is_empty() && trample) {
            if let Some(recipient) = past_blockers {
                assignments.push((recipient, power));
            }
            return DamageAssignment { attacker, assignments };
        }

        let mut remaining = power;
        for blocker in &blockers {
            if remaining == 0 {
                break;
            }
            let share = remaining.min(Self::lethal_for(state, projected, *blocker, deathtouch));
            assignments.push((DamageRecipient::Permanent(*blocker), share));
            remaining -= share;
        }

        if remaining > 0 {
            match (trample, past_blockers, assignments.last_mut()) {
                (true, Some(recipient), _) => assignments.push((recipient, remaining)),
                (_, _, Some((_, last))) => *last += remaining,
                _ => {}
            }
        }
        DamageAssignment { attacker, assignments }
    }

    /// Check a player-chosen assignment.
    pub fn validate_manual(
        state: &GameState,
        projected: &ProjectedState,
        combat: &CombatState,
        assignment: &DamageAssignment,
    ) -> Result<()> {
        let attacker = assignment.attacker;
        let reject = |reason: String| Err(EngineError::IllegalDamageAssignment(reason));

        if !combat.is_attacking(attacker) {
            return reject(format!("{attacker} is not attacking"));
        }
        let power = projected.get_power(attacker).unwrap_or(0).max(0) as u32;
        if assignment.total() != power {
            return reject(format!(
                "{attacker} must assign exactly {power} damage, assigned {}",
                assignment.total()
            ));
        }

        let blockers: Vec<EntityId> = combat
            .blockers_of(attacker)
            .into_iter()
            .filter(|b| projected.get(*b).is_some())
            .collect();
        let past_blockers = Self::attack_recipient(projected, combat, attacker);
        let trample = projected.has_keyword(attacker, Keyword::Trample);
        let deathtouch = projected.has_keyword(attacker, Keyword::Deathtouch);

        for (recipient, _) in &assignment.assignments {
            let known = match recipient {
                DamageRecipient::Permanent(id) => blockers.contains(id) || past_blockers == Some(*recipient),
                DamageRecipient::Player(_) => past_blockers == Some(*recipient),
            };
            if !known {
                return reject(format!("{attacker} cannot assign damage to {recipient:?}"));
            }
        }

        if !combat.is_blocked(attacker) {
            return Ok(());
        }

        let past = past_blockers.map_or(0, |r| assignment.to(r));
        if past > 0 && !trample {
            return reject(format!("{attacker} is blocked and has no trample"));
        }

        let mut short = None;
        for blocker in &blockers {
            let assigned = assignment.to(DamageRecipient::Permanent(*blocker));
            if let Some(earlier) = short {
                if assigned > 0 {
                    return reject(format!("{earlier} must be assigned lethal damage before {blocker}"));
                }
            }
            if short.is_none() && assigned < Self::lethal_for(state, projected, *blocker, deathtouch) {
                short = Some(*blocker);
            }
        }
        if let Some(earlier) = short {
            if past > 0 {
                return reject(format!("{earlier} must be assigned lethal damage before trampling over"));
            }
        }
        Ok(())
    }
}
