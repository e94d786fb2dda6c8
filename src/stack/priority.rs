//! Priority passing.
//!
//! Priority passes in seat order among players still in the game. When every
//! such player passes in succession, the top of the stack resolves (or, with
//! an empty stack, nothing happens and the active player gets priority back).
//! Any other action by the priority holder resets the pass count.

use crate::core::{EngineError, GameState, PlayerId, Result};

/// What a pass led to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// Priority moved to the given player.
    Passed(PlayerId),
    /// Everyone passed in succession.
    AllPassed,
}

/// Priority bookkeeping on `TurnState`.
pub struct PriorityManager;

impl PriorityManager {
    /// Fail unless `player` holds priority.
    pub fn require(state: &GameState, player: PlayerId) -> Result<()> {
        if !state.in_game(player) {
            return Err(EngineError::PlayerNotInGame(player));
        }
        if state.turn.priority_player != player {
            return Err(EngineError::NoPriority(player));
        }
        Ok(())
    }

    /// Record a pass by the priority holder.
    pub fn pass(state: &mut GameState, player: PlayerId) -> Result<PassOutcome> {
        Self::require(state, player)?;

        state.turn.consecutive_passes += 1;
        let in_game = PlayerId::all(state.player_count())
            .filter(|p| state.in_game(*p))
            .count();
        if state.turn.consecutive_passes >= in_game {
            return Ok(PassOutcome::AllPassed);
        }

        let next = Self::next_in_game(state, player);
        state.turn.priority_player = next;
        Ok(PassOutcome::Passed(next))
    }

    /// Give priority to `player` and clear the pass count.
    pub fn give(state: &mut GameState, player: PlayerId) {
        state.turn.priority_player = player;
        state.turn.consecutive_passes = 0;
    }

    /// The active player receives priority (after resolution or a new turn).
    pub fn reset(state: &mut GameState) {
        let active = state.turn.active_player;
        Self::give(state, active);
    }

    fn next_in_game(state: &GameState, from: PlayerId) -> PlayerId {
        let count = state.player_count();
        let mut next = from.next(count);
        while next != from && !state.in_game(next) {
            next = next.next(count);
        }
        next
    }
}
