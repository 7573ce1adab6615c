//! Game configuration: the record an external loader hands to the table.
//!
//! The shape matches the JSON config file; `validate` is the fatal startup
//! check, so the core never plays with an out-of-range config.

use serde::{Deserialize, Serialize};

/// What the dealer does holding a soft 17 (an ace counted as 11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Soft17Rule {
    /// Dealer hits a soft 17.
    #[serde(alias = "H")]
    Hit,
    /// Dealer stands on every 17.
    #[serde(alias = "S")]
    Stand,
}

/// Which bundled decision policy the players use. Illustrative policies,
/// not optimal play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Uniform random pick from the legal-action set.
    #[default]
    Random,
    /// Play the fixed dealer rule (hit to 17, then stand).
    Dealer,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("num_players must be at least 1, got {0}")]
    NumPlayers(usize),
    #[error("num_decks must be at least 1, got {0}")]
    NumDecks(usize),
    #[error("min_bet must be positive, got {0}")]
    MinBet(f64),
    #[error("blackjack_payout must be non-negative, got {0}")]
    BlackjackPayout(f64),
    #[error("default_init_money must be positive, got {0}")]
    InitMoney(f64),
}

/// Table configuration. Serde round-trips the original JSON layout.
///
/// ```
/// use blackjack_rs::config::{GameConfig, Soft17Rule};
///
/// let cfg: GameConfig = serde_json::from_str(
///     r#"{
///         "num_players": 3,
///         "num_decks": 6,
///         "min_bet": 5.0,
///         "dealer_soft_17": "stand",
///         "blackjack_payout": 1.5,
///         "seed": 42,
///         "default_init_money": 500.0
///     }"#,
/// ).unwrap();
/// assert_eq!(cfg.dealer_soft_17, Soft17Rule::Stand);
/// cfg.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub num_players: usize,
    pub num_decks: usize,
    pub min_bet: f64,
    pub dealer_soft_17: Soft17Rule,
    /// Bonus ratio for a natural, as a fraction of the wager (1.5 = 3:2).
    pub blackjack_payout: f64,
    pub seed: u64,
    pub default_init_money: f64,
    #[serde(default)]
    pub player_strategy: StrategyKind,
}

impl GameConfig {
    /// Reject out-of-range fields. Missing fields are already a serde
    /// error at the loading boundary.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_players < 1 {
            return Err(ConfigError::NumPlayers(self.num_players));
        }
        if self.num_decks < 1 {
            return Err(ConfigError::NumDecks(self.num_decks));
        }
        if !(self.min_bet > 0.0) {
            return Err(ConfigError::MinBet(self.min_bet));
        }
        if !(self.blackjack_payout >= 0.0) {
            return Err(ConfigError::BlackjackPayout(self.blackjack_payout));
        }
        if !(self.default_init_money > 0.0) {
            return Err(ConfigError::InitMoney(self.default_init_money));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    /// A conventional six-deck table: 3:2 naturals, dealer stands on all 17s.
    fn default() -> Self {
        Self {
            num_players: 1,
            num_decks: 6,
            min_bet: 5.0,
            dealer_soft_17: Soft17Rule::Stand,
            blackjack_payout: 1.5,
            seed: 0,
            default_init_money: 500.0,
            player_strategy: StrategyKind::Random,
        }
    }
}
