//! Combat steps.
//!
//! Begin combat, declare attackers, declare blockers, deal damage (a
//! first-strike step first if any creature in combat has first or double
//! strike), end combat. Every step validates the whole declaration before
//! changing anything.

use log::debug;
use rustc_hash::FxHashMap;

use crate::cards::{CardType, Keyword};
use crate::core::{EngineError, EntityId, GameState, Phase, PlayerId, Result};
use crate::effects::{Duration, ProjectedObject, ProjectedState, Projector};
use crate::triggers::{EventLog, GameEvent};

use super::damage::{deal_damage, DamageAssignment, DamageCalculator, DamageRecipient, DamageSource, DamageStep};
use super::state::{AttackTarget, CombatState, CombatStep};

/// Can `blocker` block `attacker`, considering evasion and protection?
#[must_use]
pub fn can_block(attacker: &ProjectedObject, blocker: &ProjectedObject) -> bool {
    let attacker_has = |k: Keyword| attacker.keywords.contains(&k);
    let blocker_has = |k: Keyword| blocker.keywords.contains(&k);

    if attacker_has(Keyword::Flying) && !blocker_has(Keyword::Flying) && !blocker_has(Keyword::Reach) {
        return false;
    }
    if attacker_has(Keyword::Shadow) != blocker_has(Keyword::Shadow) {
        return false;
    }
    if attacker_has(Keyword::Horsemanship) && !blocker_has(Keyword::Horsemanship) {
        return false;
    }
    !blocker
        .colors
        .iter()
        .any(|color| attacker_has(Keyword::Protection(*color)))
}

/// Fewest blockers that may block `attacker`.
#[must_use]
pub fn minimum_blockers(attacker: &ProjectedObject) -> usize {
    if attacker.keywords.contains(&Keyword::Menace) {
        2
    } else {
        1
    }
}

/// Combat actions.
pub struct CombatManager;

impl CombatManager {
    fn combat(state: &GameState) -> Result<&CombatState> {
        state
            .combat
            .as_ref()
            .ok_or_else(|| EngineError::Timing("not in combat".into()))
    }

    fn require_active(state: &GameState, player: PlayerId) -> Result<()> {
        if state.turn.active_player != player {
            return Err(EngineError::NotActivePlayer(player));
        }
        Ok(())
    }

    fn require_empty_stack(state: &GameState) -> Result<()> {
        if !state.stack_is_empty() {
            return Err(EngineError::Timing("the stack must be empty".into()));
        }
        Ok(())
    }

    /// Move from the first main phase into combat.
    pub fn begin(state: &mut GameState, player: PlayerId) -> Result<()> {
        Self::require_active(state, player)?;
        Self::require_empty_stack(state)?;
        if state.turn.phase != Phase::Main1 {
            return Err(EngineError::Timing("combat begins from the first main phase".into()));
        }
        state.turn.phase = Phase::Combat;
        state.combat = Some(CombatState::new(player));
        debug!("{player} begins combat");
        Ok(())
    }

    /// Declare every attacker at once.
    pub fn declare_attackers(
        state: &mut GameState,
        player: PlayerId,
        attackers: &[(EntityId, AttackTarget)],
        events: &mut EventLog,
    ) -> Result<()> {
        Self::require_active(state, player)?;
        Self::require_empty_stack(state)?;
        if Self::combat(state)?.step != CombatStep::Beginning {
            return Err(EngineError::Timing("attackers were already declared".into()));
        }

        let projected = Projector::project(state);
        let mut seen = Vec::with_capacity(attackers.len());
        for (attacker, target) in attackers {
            if seen.contains(attacker) {
                return Err(EngineError::IllegalAttack(format!("{attacker} declared twice")));
            }
            Self::check_attacker(state, &projected, player, *attacker)?;
            Self::check_attack_target(state, &projected, player, *target)?;
            seen.push(*attacker);
        }

        for (attacker, target) in attackers {
            if !projected.has_keyword(*attacker, Keyword::Vigilance) {
                state.update_entity(*attacker, |c| c.tapped = true)?;
                events.push(GameEvent::Tapped { entity: *attacker });
            }
            events.push(GameEvent::AttackerDeclared {
                attacker: *attacker,
                target: *target,
            });
        }

        let combat = state
            .combat
            .as_mut()
            .ok_or_else(|| EngineError::Timing("not in combat".into()))?;
        combat.attackers.extend(attackers.iter().copied());
        combat.step = CombatStep::AttackersDeclared;
        debug!("{player} attacks with {} creatures", attackers.len());
        Ok(())
    }

    fn check_attacker(state: &GameState, projected: &ProjectedState, player: PlayerId, id: EntityId) -> Result<()> {
        let reject = |reason: &str| Err(EngineError::IllegalAttack(format!("{id} {reason}")));
        let Some(obj) = projected.get(id) else {
            return reject("is not on the battlefield");
        };
        let components = state.require_entity(id)?;
        if !obj.is_creature() {
            return reject("is not a creature");
        }
        if obj.controller != player {
            return Err(EngineError::NotController(player, id));
        }
        if components.tapped {
            return reject("is tapped");
        }
        if components.summoning_sick && !obj.keywords.contains(&Keyword::Haste) {
            return reject("has summoning sickness");
        }
        if obj.keywords.contains(&Keyword::Defender) {
            return reject("has defender");
        }
        Ok(())
    }

    fn check_attack_target(
        state: &GameState,
        projected: &ProjectedState,
        player: PlayerId,
        target: AttackTarget,
    ) -> Result<()> {
        match target {
            AttackTarget::Player(defender) => {
                if defender == player || !state.in_game(defender) {
                    return Err(EngineError::IllegalAttack(format!("cannot attack {defender}")));
                }
            }
            AttackTarget::Planeswalker(id) => {
                let legal = projected.get(id).is_some_and(|o| {
                    o.types.contains(&CardType::Planeswalker) && o.controller != player
                });
                if !legal {
                    return Err(EngineError::IllegalAttack(format!("{id} is not an opposing planeswalker")));
                }
            }
        }
        Ok(())
    }

    /// The player an attack is ultimately against.
    fn defending_player(projected: &ProjectedState, target: AttackTarget) -> Option<PlayerId> {
        match target {
            AttackTarget::Player(p) => Some(p),
            AttackTarget::Planeswalker(id) => projected.get_controller(id),
        }
    }

    /// Declare all of one defending player's blocks.
    pub fn declare_blockers(
        state: &mut GameState,
        player: PlayerId,
        blocks: &[(EntityId, EntityId)],
        events: &mut EventLog,
    ) -> Result<()> {
        Self::require_empty_stack(state)?;
        let combat = Self::combat(state)?;
        if !matches!(combat.step, CombatStep::AttackersDeclared | CombatStep::BlockersDeclared) {
            return Err(EngineError::Timing("blockers are declared after attackers".into()));
        }
        if player == combat.attacking_player || !state.in_game(player) {
            return Err(EngineError::IllegalBlock(format!("{player} is not defending")));
        }
        if combat.defenders_declared.contains(&player) {
            return Err(EngineError::IllegalBlock(format!("{player} already declared blockers")));
        }

        let projected = Projector::project(state);
        let mut blockers_seen = Vec::with_capacity(blocks.len());
        let mut per_attacker: FxHashMap<EntityId, usize> = FxHashMap::default();
        for (blocker, attacker) in blocks {
            let reject = |reason: String| Err(EngineError::IllegalBlock(reason));
            if blockers_seen.contains(blocker) || combat.is_blocking(*blocker) {
                return reject(format!("{blocker} is already blocking"));
            }
            let Some(blocker_obj) = projected.get(*blocker) else {
                return reject(format!("{blocker} is not on the battlefield"));
            };
            if !blocker_obj.is_creature() {
                return reject(format!("{blocker} is not a creature"));
            }
            if blocker_obj.controller != player {
                return Err(EngineError::NotController(player, *blocker));
            }
            if state.require_entity(*blocker)?.tapped {
                return reject(format!("{blocker} is tapped"));
            }
            let attacked = combat
                .attack_target(*attacker)
                .and_then(|t| Self::defending_player(&projected, t));
            if attacked != Some(player) {
                return reject(format!("{attacker} is not attacking {player}"));
            }
            let Some(attacker_obj) = projected.get(*attacker) else {
                return reject(format!("{attacker} is not on the battlefield"));
            };
            if !can_block(attacker_obj, blocker_obj) {
                return reject(format!("{blocker} cannot block {attacker}"));
            }
            blockers_seen.push(*blocker);
            *per_attacker.entry(*attacker).or_default() += 1;
        }

        for (attacker, count) in &per_attacker {
            let needed = projected.get(*attacker).map_or(1, minimum_blockers);
            if *count < needed {
                return Err(EngineError::IllegalBlock(format!(
                    "{attacker} needs at least {needed} blockers"
                )));
            }
        }

        let combat = state
            .combat
            .as_mut()
            .ok_or_else(|| EngineError::Timing("not in combat".into()))?;
        for (blocker, attacker) in blocks {
            combat.add_block(*blocker, *attacker);
            events.push(GameEvent::BlockerDeclared {
                blocker: *blocker,
                attacker: *attacker,
            });
        }
        combat.defenders_declared.insert(player);
        combat.step = CombatStep::BlockersDeclared;
        debug!("{player} declares {} blockers", blocks.len());
        Ok(())
    }

    /// Which damage step comes next, or `None` once regular damage is done.
    #[must_use]
    pub fn next_damage_step(projected: &ProjectedState, combat: &CombatState) -> Option<DamageStep> {
        match combat.step {
            CombatStep::Beginning | CombatStep::CombatDamage => None,
            CombatStep::AttackersDeclared | CombatStep::BlockersDeclared => {
                if DamageCalculator::has_first_strike_step(projected, combat) {
                    Some(DamageStep::FirstStrike)
                } else {
                    Some(DamageStep::Regular)
                }
            }
            CombatStep::FirstStrikeDamage => Some(DamageStep::Regular),
        }
    }

    /// Deal the next combat damage step.
    ///
    /// `manual` overrides the automatic assignment for the attackers it names.
    /// All damage in a step is dealt simultaneously.
    pub fn combat_damage(
        state: &mut GameState,
        player: PlayerId,
        manual: &[DamageAssignment],
        events: &mut EventLog,
    ) -> Result<DamageStep> {
        Self::require_active(state, player)?;
        Self::require_empty_stack(state)?;
        let projected = Projector::project(state);
        let combat = Self::combat(state)?.clone();
        let step = Self::next_damage_step(&projected, &combat)
            .ok_or_else(|| EngineError::Timing("no combat damage step is due".into()))?;

        for assignment in manual {
            if !DamageCalculator::deals_damage_in_step(&projected, assignment.attacker, step) {
                return Err(EngineError::IllegalDamageAssignment(format!(
                    "{} deals no damage in this step",
                    assignment.attacker
                )));
            }
            DamageCalculator::validate_manual(state, &projected, &combat, assignment)?;
        }

        let mut dealt: Vec<(EntityId, DamageRecipient, u32)> = Vec::new();
        for (attacker, _) in &combat.attackers {
            if projected.get(*attacker).is_none()
                || !DamageCalculator::deals_damage_in_step(&projected, *attacker, step)
            {
                continue;
            }
            let assignment = manual
                .iter()
                .find(|a| a.attacker == *attacker)
                .cloned()
                .unwrap_or_else(|| DamageCalculator::auto_assign(state, &projected, &combat, *attacker));
            dealt.extend(assignment.assignments.into_iter().map(|(r, n)| (*attacker, r, n)));
        }
        for (blocker, attacker) in &combat.blocks {
            if projected.get(*attacker).is_none()
                || !DamageCalculator::deals_damage_in_step(&projected, *blocker, step)
            {
                continue;
            }
            let power = projected.get_power(*blocker).unwrap_or(0).max(0) as u32;
            dealt.push((*blocker, DamageRecipient::Permanent(*attacker), power));
        }

        for (source, recipient, amount) in dealt {
            let controller = projected.get_controller(source).unwrap_or(player);
            let source = DamageSource::new(state, &projected, source, controller);
            deal_damage(state, &projected, &source, recipient, amount, true, events)?;
        }

        if let Some(combat) = state.combat.as_mut() {
            combat.step = match step {
                DamageStep::FirstStrike => CombatStep::FirstStrikeDamage,
                DamageStep::Regular => CombatStep::CombatDamage,
            };
        }
        debug!("combat damage dealt ({step:?})");
        Ok(step)
    }

    /// Leave combat for the second main phase.
    pub fn end(state: &mut GameState, player: PlayerId) -> Result<()> {
        Self::require_active(state, player)?;
        Self::require_empty_stack(state)?;
        Self::combat(state)?;
        state.combat = None;
        state.turn.phase = Phase::Main2;
        state.expire_effects(&[Duration::EndOfCombat]);
        debug!("{player} ends combat");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im::OrdSet;

    fn object(keywords: &[Keyword]) -> ProjectedObject {
        ProjectedObject {
            name: "Test".into(),
            owner: PlayerId::new(0),
            controller: PlayerId::new(0),
            types: OrdSet::unit(CardType::Creature),
            subtypes: OrdSet::new(),
            colors: OrdSet::new(),
            keywords: keywords.iter().copied().collect(),
            power: Some(2),
            toughness: Some(2),
        }
    }

    #[test]
    fn test_flying_needs_flying_or_reach() {
        let flyer = object(&[Keyword::Flying]);
        assert!(!can_block(&flyer, &object(&[])));
        assert!(can_block(&flyer, &object(&[Keyword::Reach])));
        assert!(can_block(&flyer, &object(&[Keyword::Flying])));
    }

    #[test]
    fn test_shadow_only_with_shadow() {
        let shade = object(&[Keyword::Shadow]);
        assert!(!can_block(&shade, &object(&[])));
        assert!(!can_block(&object(&[]), &shade));
        assert!(can_block(&shade, &object(&[Keyword::Shadow])));
    }

    #[test]
    fn test_horsemanship() {
        let rider = object(&[Keyword::Horsemanship]);
        assert!(!can_block(&rider, &object(&[Keyword::Flying])));
        assert!(can_block(&rider, &object(&[Keyword::Horsemanship])));
    }

    #[test]
    fn test_menace_needs_two() {
        assert_eq!(minimum_blockers(&object(&[Keyword::Menace])), 2);
        assert_eq!(minimum_blockers(&object(&[])), 1);
    }
}
