//! Player decisions requested mid-resolution.

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, EntityId, PlayerId, Result};
use crate::effects::{Target, TargetRequirement};

/// Correlates a `PendingDecision` with the continuation waiting on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub u32);

impl DecisionId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DecisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape of the choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionKind {
    /// Pick between `min` and `max` distinct entities from `options`.
    ChooseEntities {
        options: Vec<EntityId>,
        min: usize,
        max: usize,
    },
    /// Pick one target per requirement; `options[i]` lists the legal picks
    /// for requirement `i`.
    ChooseTargets {
        requirements: Vec<TargetRequirement>,
        options: Vec<Vec<Target>>,
    },
    YesNo,
}

/// A choice a player must make before the engine can continue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecision {
    pub id: DecisionId,
    pub player: PlayerId,
    /// Human-readable hint for the UI.
    pub prompt: String,
    pub kind: DecisionKind,
}

/// A player's answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionAnswer {
    Entities(Vec<EntityId>),
    Targets(Vec<Target>),
    Yes,
    No,
}

impl PendingDecision {
    /// Check that `answer` fits this decision's shape and options.
    pub fn validate(&self, answer: &DecisionAnswer) -> Result<()> {
        let invalid = |reason: String| {
            Err(EngineError::InvalidAnswer {
                id: self.id,
                reason,
            })
        };

        match (&self.kind, answer) {
            (DecisionKind::ChooseEntities { options, min, max }, DecisionAnswer::Entities(chosen)) => {
                if chosen.len() < *min || chosen.len() > *max {
                    return invalid(format!(
                        "chose {} entities, expected {min} to {max}",
                        chosen.len()
                    ));
                }
                if let Some(bad) = chosen.iter().find(|e| !options.contains(e)) {
                    return invalid(format!("{bad} is not an option"));
                }
                let mut sorted = chosen.clone();
                sorted.sort();
                sorted.dedup();
                if sorted.len() != chosen.len() {
                    return invalid("the same entity was chosen twice".to_string());
                }
                Ok(())
            }
            (DecisionKind::ChooseTargets { options, .. }, DecisionAnswer::Targets(chosen)) => {
                if chosen.len() != options.len() {
                    return invalid(format!(
                        "chose {} targets, expected {}",
                        chosen.len(),
                        options.len()
                    ));
                }
                for (i, (target, legal)) in chosen.iter().zip(options).enumerate() {
                    if !legal.contains(target) {
                        return invalid(format!("{target} is not legal for target {i}"));
                    }
                }
                Ok(())
            }
            (DecisionKind::YesNo, DecisionAnswer::Yes | DecisionAnswer::No) => Ok(()),
            (kind, answer) => invalid(format!("{answer:?} does not answer {kind:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choose(options: &[u32], min: usize, max: usize) -> PendingDecision {
        PendingDecision {
            id: DecisionId(1),
            player: PlayerId::new(0),
            prompt: "choose".into(),
            kind: DecisionKind::ChooseEntities {
                options: options.iter().map(|&i| EntityId(i)).collect(),
                min,
                max,
            },
        }
    }

    #[test]
    fn test_choose_entities_bounds() {
        let decision = choose(&[10, 11, 12], 1, 1);
        assert!(decision.validate(&DecisionAnswer::Entities(vec![EntityId(11)])).is_ok());
        assert!(decision.validate(&DecisionAnswer::Entities(vec![])).is_err());
        assert!(decision
            .validate(&DecisionAnswer::Entities(vec![EntityId(10), EntityId(11)]))
            .is_err());
        assert!(decision.validate(&DecisionAnswer::Entities(vec![EntityId(99)])).is_err());
    }

    #[test]
    fn test_duplicates_rejected() {
        let decision = choose(&[10, 11], 2, 2);
        let result = decision.validate(&DecisionAnswer::Entities(vec![EntityId(10), EntityId(10)]));
        assert!(matches!(result, Err(EngineError::InvalidAnswer { .. })));
    }

    #[test]
    fn test_wrong_answer_shape() {
        let decision = choose(&[10], 0, 1);
        assert!(decision.validate(&DecisionAnswer::Yes).is_err());

        let yes_no = PendingDecision {
            kind: DecisionKind::YesNo,
            ..decision
        };
        assert!(yes_no.validate(&DecisionAnswer::No).is_ok());
    }

    #[test]
    fn test_target_answer_checked_per_slot() {
        let legal = Target::Player(PlayerId::new(1));
        let decision = PendingDecision {
            id: DecisionId(2),
            player: PlayerId::new(0),
            prompt: "target".into(),
            kind: DecisionKind::ChooseTargets {
                requirements: vec![TargetRequirement::player()],
                options: vec![vec![legal]],
            },
        };
        assert!(decision.validate(&DecisionAnswer::Targets(vec![legal])).is_ok());
        assert!(decision
            .validate(&DecisionAnswer::Targets(vec![Target::Player(PlayerId::new(0))]))
            .is_err());
    }
}
