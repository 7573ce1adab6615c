//! blackjack-rs: a multi-player blackjack table simulator.
//!
//! Goals:
//! - A faithful hand state machine: value sets with soft aces, legal-action
//!   sets recomputed after every mutation, splits as owned-hand replacement
//! - Deterministic rounds: one seeded RNG drives the shuffle and every
//!   random strategy decision
//! - No panics on bad input; `Result` for structural errors, local fallback
//!   for policy-level ones
//!
//! ## Quick start: play one seeded round
//! ```
//! use blackjack_rs::config::GameConfig;
//! use blackjack_rs::game::Game;
//!
//! let cfg = GameConfig { num_players: 2, seed: 42, ..GameConfig::default() };
//! let mut game = Game::new(cfg).unwrap();
//! let summary = game.play_round().unwrap();
//! assert_eq!(summary.players.len(), 2);
//! ```
//!
//! ## CLI
//! Run rounds from a JSON config with:
//! ```sh
//! cargo run --bin blackjack-rs -- --config game_config.json --rounds 10
//! ```

pub mod cards;
pub mod config;
pub mod game;
pub mod hand;
pub mod player;
pub mod shoe;
pub mod strategy;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
