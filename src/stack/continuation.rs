//! Continuation stack for pause/resume.
//!
//! Multi-step effects record the work they still owe as `ContinuationFrame`s
//! on a LIFO stored in the game state. A frame is either deferred (run as soon
//! as it reaches the top) or awaiting a specific decision (the driver stops
//! there until the host answers).
//!
//! ```text
//! rummage:   push Deferred(DrawCards)          <- runs last
//!            push Awaiting(D1, ChooseDiscard)  <- stops the driver
//! answer D1: discard, push Deferred(ResolveTriggersInline)
//!            drive: triggers run, then DrawCards
//! ```
//!
//! Because everything lives in the state, a paused game is a plain value: it
//! can be serialized, inspected, or dropped to cancel.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId, Timestamp};
use crate::effects::{Effect, ExecutionContext};
use crate::mana::ManaCost;
use crate::triggers::PendingTrigger;
use crate::zones::ZoneKind;

use super::decision::DecisionId;

/// Remaining work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Continuation {
    // === Deferred ===
    /// Run `effects` in order with `context`.
    RunEffects {
        effects: Vector<Effect>,
        context: ExecutionContext,
    },
    /// Move a resolved spell to its graveyard, or delete an ability or copy.
    /// Floating effects stamped `since` or later came from this resolution.
    FinishResolution { item: EntityId, since: Timestamp },
    /// Resolve triggers detected mid-effect, without using the stack.
    ResolveTriggersInline { triggers: Vector<PendingTrigger> },
    DrawCards { player: PlayerId, count: u32 },
    /// A player discards `count` cards of their choice.
    Discard { player: PlayerId, count: u32 },
    /// Put `remaining` more copies of `original` on the stack.
    MakeCopies {
        original: EntityId,
        controller: PlayerId,
        remaining: u32,
    },

    // === Awaiting a decision ===
    /// Yes pays `cost`; no counters `spell`.
    CounterUnlessPaid {
        spell: EntityId,
        payer: PlayerId,
        cost: ManaCost,
    },
    /// Chosen card goes to `destination`, then the library is shuffled.
    SearchLibrary {
        player: PlayerId,
        destination: ZoneKind,
    },
    /// Chosen cards are discarded. With `inline_triggers`, the discard
    /// triggers resolve immediately.
    ChooseDiscard {
        player: PlayerId,
        inline_triggers: bool,
    },
    /// New targets for `copy`; then `remaining` more copies of `original`.
    StormCopy {
        copy: EntityId,
        original: EntityId,
        remaining: u32,
    },
    /// Targets for a triggered ability. Inline triggers run at once; others
    /// go on the stack.
    TriggerTarget { trigger: PendingTrigger, inline: bool },
}

/// One entry of the continuation stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationFrame {
    /// `Some` while the frame waits for that decision.
    pub awaiting: Option<DecisionId>,
    pub continuation: Continuation,
}

/// LIFO of continuation frames. Index 0 is the bottom.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationStack {
    frames: Vector<ContinuationFrame>,
}

impl ContinuationStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push work that runs as soon as it reaches the top.
    pub fn push_deferred(&mut self, continuation: Continuation) {
        self.frames.push_back(ContinuationFrame {
            awaiting: None,
            continuation,
        });
    }

    /// Push work that waits for `decision`.
    pub fn push_awaiting(&mut self, decision: DecisionId, continuation: Continuation) {
        self.frames.push_back(ContinuationFrame {
            awaiting: Some(decision),
            continuation,
        });
    }

    pub fn pop(&mut self) -> Option<ContinuationFrame> {
        self.frames.pop_back()
    }

    #[must_use]
    pub fn peek(&self) -> Option<&ContinuationFrame> {
        self.frames.last()
    }

    /// Pop the frame waiting on `decision`.
    ///
    /// # Panics
    ///
    /// If the top frame is not waiting on `decision`. That means a decision
    /// id and its continuation have come apart, which is an engine bug.
    pub fn take_awaiting(&mut self, decision: DecisionId) -> Continuation {
        match self.frames.last() {
            Some(frame) if frame.awaiting == Some(decision) => {}
            Some(frame) => panic!(
                "decision {decision} answered but the top continuation awaits {:?}",
                frame.awaiting
            ),
            None => panic!("decision {decision} answered but no continuation is waiting"),
        }
        match self.frames.pop_back() {
            Some(frame) => frame.continuation,
            None => unreachable!("checked non-empty above"),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &ContinuationFrame> {
        self.frames.iter()
    }

    /// The stack item whose resolution is suspended here, and the first
    /// timestamp it could have given out.
    #[must_use]
    pub fn resolving(&self) -> Option<(EntityId, Timestamp)> {
        self.frames.iter().find_map(|frame| match frame.continuation {
            Continuation::FinishResolution { item, since } => Some((item, since)),
            _ => None,
        })
    }
}
