//! Rules configuration.
//!
//! `RulesConfig` fixes the table setup at game creation: seat count,
//! starting life, hand sizes, the RNG seed and who goes first. Zones are not
//! configurable; the rules always use the six zones of `ZoneKind`.

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Game setup options.
///
/// ## Example
///
/// ```
/// use ccg_rules::core::{PlayerId, RulesConfig};
///
/// let config = RulesConfig::new(2)
///     .with_starting_life(30)
///     .with_seed(7)
///     .with_first_player(PlayerId::new(1));
///
/// assert_eq!(config.starting_life, 30);
/// assert_eq!(config.first_player, PlayerId::new(1));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Number of players (1-255).
    pub player_count: usize,

    /// Life total each player starts with.
    pub starting_life: i32,

    /// Cards drawn by each player when the game is set up.
    pub starting_hand_size: usize,

    /// Lands a player may play each turn.
    pub lands_per_turn: u32,

    /// Seed for the deterministic RNG.
    pub seed: u64,

    /// Player who takes the first turn.
    pub first_player: PlayerId,
}

impl RulesConfig {
    /// Create a configuration with standard defaults for `player_count` seats.
    pub fn new(player_count: usize) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        Self {
            player_count,
            starting_life: 20,
            starting_hand_size: 7,
            lands_per_turn: 1,
            seed: 0,
            first_player: PlayerId::new(0),
        }
    }

    /// Set the starting life total.
    #[must_use]
    pub fn with_starting_life(mut self, life: i32) -> Self {
        self.starting_life = life;
        self
    }

    /// Set the opening hand size.
    #[must_use]
    pub fn with_starting_hand_size(mut self, size: usize) -> Self {
        self.starting_hand_size = size;
        self
    }

    /// Set how many lands may be played per turn.
    #[must_use]
    pub fn with_lands_per_turn(mut self, lands: u32) -> Self {
        self.lands_per_turn = lands;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the first player.
    #[must_use]
    pub fn with_first_player(mut self, player: PlayerId) -> Self {
        assert!(
            player.index() < self.player_count,
            "First player must be seated"
        );
        self.first_player = player;
        self
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::new(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RulesConfig::default();
        assert_eq!(config.player_count, 2);
        assert_eq!(config.starting_life, 20);
        assert_eq!(config.starting_hand_size, 7);
        assert_eq!(config.lands_per_turn, 1);
        assert_eq!(config.first_player, PlayerId::new(0));
    }

    #[test]
    fn test_builder() {
        let config = RulesConfig::new(4)
            .with_starting_life(40)
            .with_starting_hand_size(0)
            .with_lands_per_turn(2)
            .with_seed(99);

        assert_eq!(config.player_count, 4);
        assert_eq!(config.starting_life, 40);
        assert_eq!(config.starting_hand_size, 0);
        assert_eq!(config.lands_per_turn, 2);
        assert_eq!(config.seed, 99);
    }

    #[test]
    fn test_serde() {
        let config = RulesConfig::new(3).with_seed(5);
        let json = serde_json::to_string(&config).unwrap();
        let restored: RulesConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_zero_players() {
        RulesConfig::new(0);
    }

    #[test]
    #[should_panic(expected = "First player must be seated")]
    fn test_first_player_out_of_range() {
        let _ = RulesConfig::new(2).with_first_player(PlayerId::new(2));
    }
}
