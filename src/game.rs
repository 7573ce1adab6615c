//! The round orchestrator: builds the shoe, deals, drives every player
//! hand to closure through its strategy, plays the dealer by the fixed
//! house rule, and resolves payouts.
//!
//! Error policy: structural failures (an exhausted shoe) abort the round
//! and surface to the caller. Policy-level failures (an action outside the
//! legal set, an unaffordable double or split) are absorbed locally with a
//! fallback action so a misbehaving strategy cannot crash the simulation.

use crate::cards::Card;
use crate::config::{ConfigError, GameConfig};
use crate::hand::{Action, Hand, HandOutcome};
use crate::player::Player;
use crate::shoe::{Shoe, ShoeError};
use crate::strategy::{build_strategy, DealerStrategy, Strategy};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

/// Substituted whenever a strategy answers with an action outside the
/// hand's legal set, or a legal wagering action cannot be funded.
pub const DEFAULT_ACTION: Action = Action::Hit;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GameError {
    #[error(transparent)]
    Shoe(#[from] ShoeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("round has not been dealt; call reset first")]
    NotDealt,
}

/// The dealer: a distinguished seat outside the player collection, with
/// no bankroll accounting and a fixed, non-pluggable strategy.
#[derive(Debug)]
struct DealerSeat {
    hand: Option<Hand>,
    strategy: DealerStrategy,
}

/// Settlement for one closed hand: per-hand outcome, the wager it closed
/// with, and the credit that came back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandResult {
    pub outcome: HandOutcome,
    pub wager: f64,
    pub credit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSummary {
    pub name: String,
    pub bankroll: f64,
    pub hands: Vec<HandResult>,
}

/// What a completed round looked like, for callers and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub dealer: HandOutcome,
    pub players: Vec<PlayerSummary>,
}

/// Credit returned to the player for one closed hand, given the dealer's
/// final outcome. The wager was already debited at placement, so a push
/// credits the wager back and a loss credits nothing.
pub fn settle(outcome: HandOutcome, wager: f64, dealer: HandOutcome, blackjack_payout: f64) -> f64 {
    match outcome {
        // Half the wager comes back regardless of the dealer.
        HandOutcome::Surrendered => wager * 0.5,
        // A bust loses even when the dealer also busts.
        HandOutcome::Bust => 0.0,
        HandOutcome::Blackjack => match dealer {
            HandOutcome::Blackjack => wager,
            _ => wager * (1.0 + blackjack_payout),
        },
        HandOutcome::Stood(total) => match dealer {
            // A natural outranks any built 21.
            HandOutcome::Blackjack => 0.0,
            // The dealer never surrenders; a dead dealer hand pays like a bust.
            HandOutcome::Bust | HandOutcome::Surrendered => wager * 2.0,
            HandOutcome::Stood(d) => {
                if total > d {
                    wager * 2.0
                } else if total == d {
                    wager
                } else {
                    0.0
                }
            }
        },
    }
}

/// A blackjack table playing one ephemeral round at a time: `reset` deals
/// it, `play_round` drives it to completion.
///
/// ```no_run
/// use blackjack_rs::config::GameConfig;
/// use blackjack_rs::game::Game;
///
/// let mut game = Game::new(GameConfig::default()).unwrap();
/// let summary = game.play_round().unwrap();
/// println!("dealer finished {:?}", summary.dealer);
/// ```
pub struct Game {
    config: GameConfig,
    rng: ChaCha8Rng,
    shoe: Shoe,
    players: Vec<Player>,
    strategies: Vec<Box<dyn Strategy>>,
    dealer: DealerSeat,
}

impl Game {
    /// Validate the config, seed the RNG, and deal the first round.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let dealer =
            DealerSeat { hand: None, strategy: DealerStrategy::new(config.dealer_soft_17) };
        let mut game = Self {
            config,
            rng,
            shoe: Shoe::stacked(Vec::new()),
            players: Vec::new(),
            strategies: Vec::new(),
            dealer,
        };
        game.reset()?;
        Ok(game)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn dealer_hand(&self) -> Option<&Hand> {
        self.dealer.hand.as_ref()
    }

    /// Cards left in the shoe.
    pub fn shoe_len(&self) -> usize {
        self.shoe.len()
    }

    /// Construct a fresh round: new shuffled shoe, new players at the
    /// configured bankroll, minimum bets debited, two cards each plus the
    /// dealer. Naturals close at deal time.
    pub fn reset(&mut self) -> Result<(), GameError> {
        let mut shoe = Shoe::multi(self.config.num_decks);
        shoe.shuffle_with(&mut self.rng);
        self.deal_from(shoe)
    }

    /// Like [`reset`](Self::reset) but dealing from a caller-supplied shoe,
    /// unshuffled. The seam for deterministic replays and tests.
    pub fn reset_with_shoe(&mut self, shoe: Shoe) -> Result<(), GameError> {
        self.deal_from(shoe)
    }

    fn deal_from(&mut self, shoe: Shoe) -> Result<(), GameError> {
        self.shoe = shoe;
        self.players = (1..=self.config.num_players)
            .map(|i| Player::new(format!("P{i}"), self.config.default_init_money))
            .collect();
        self.strategies = (0..self.config.num_players)
            .map(|_| build_strategy(self.config.player_strategy, self.config.dealer_soft_17))
            .collect();
        self.dealer.hand = None;

        info!(
            players = self.config.num_players,
            decks = self.config.num_decks,
            min_bet = self.config.min_bet,
            seed = self.config.seed,
            shoe = self.shoe.len(),
            "round start"
        );

        // Seats that can cover the minimum bet play; the rest sit out.
        let min_bet = self.config.min_bet;
        let seats: Vec<usize> = (0..self.players.len())
            .filter(|&i| {
                if self.players[i].can_afford(min_bet) {
                    true
                } else {
                    warn!(player = %self.players[i].name(), min_bet, "cannot cover minimum bet, sitting out");
                    self.players[i].sit_out();
                    false
                }
            })
            .collect();

        // One pass of first cards (players in table order, dealer last),
        // then a pass of second cards.
        let mut firsts: Vec<Card> = Vec::with_capacity(seats.len());
        for _ in &seats {
            firsts.push(self.shoe.draw()?);
        }
        let dealer_first = self.shoe.draw()?;
        for (slot, &seat) in seats.iter().enumerate() {
            let second = self.shoe.draw()?;
            if let Err(err) = self.players[seat].begin_round([firsts[slot], second], min_bet) {
                // can_afford was checked above; refuse and sit out rather than abort.
                warn!(player = %self.players[seat].name(), %err, "wager refused at deal");
                self.players[seat].sit_out();
            }
        }
        let dealer_second = self.shoe.draw()?;
        self.dealer.hand = Some(Hand::deal([dealer_first, dealer_second], 0.0));

        for player in &self.players {
            for hand in player.hands() {
                info!(player = %player.name(), hand = %hand, "dealt");
            }
        }
        if let Some(hand) = &self.dealer.hand {
            info!(dealer = %hand, "dealt");
        }
        Ok(())
    }

    /// Drive the round to completion and resolve payouts, then return the
    /// per-player settlement. The round must have been dealt.
    pub fn play_round(&mut self) -> Result<RoundSummary, GameError> {
        if self.dealer.hand.is_none() {
            return Err(GameError::NotDealt);
        }

        for seat in 0..self.players.len() {
            // Splits insert children in place of the parent, so the index
            // walk naturally picks up freshly split hands.
            let mut idx = 0;
            while idx < self.players[seat].hands().len() {
                self.play_hand(seat, idx)?;
                idx += 1;
            }
        }

        self.play_dealer()?;
        self.resolve()
    }

    /// Drive one player hand to closure.
    fn play_hand(&mut self, seat: usize, idx: usize) -> Result<(), GameError> {
        loop {
            let legal = {
                let hand = &self.players[seat].hands()[idx];
                if hand.is_closed() {
                    return Ok(());
                }
                hand.legal_actions().to_vec()
            };

            let mut action = self.strategies[seat].select_action(
                &self.players[seat].hands()[idx],
                &legal,
                &mut self.rng,
            );
            if !legal.contains(&action) {
                warn!(
                    player = %self.players[seat].name(),
                    %action,
                    "action outside the legal set, substituting default"
                );
                action = DEFAULT_ACTION;
            }

            match action {
                Action::Hit => {
                    let card = self.shoe.draw()?;
                    self.apply_hit(seat, idx, card);
                }
                Action::Double => {
                    let wager = self.players[seat].hands()[idx].bet();
                    match self.players[seat].place_wager(wager) {
                        Ok(()) => {
                            let card = self.shoe.draw()?;
                            if let Err(err) = self.players[seat].hands_mut()[idx].double(card) {
                                warn!(player = %self.players[seat].name(), %err, "double rejected");
                                self.players[seat].hands_mut()[idx].stand();
                            }
                        }
                        Err(err) => {
                            // Wager refused; fall back to the default action.
                            warn!(player = %self.players[seat].name(), %err, "double refused");
                            let card = self.shoe.draw()?;
                            self.apply_hit(seat, idx, card);
                        }
                    }
                }
                Action::Split => {
                    let wager = self.players[seat].hands()[idx].bet();
                    if !self.players[seat].can_afford(wager) {
                        warn!(
                            player = %self.players[seat].name(),
                            wager,
                            "split refused: cannot fund the second wager"
                        );
                        let card = self.shoe.draw()?;
                        self.apply_hit(seat, idx, card);
                    } else {
                        let first = self.shoe.draw()?;
                        let second = self.shoe.draw()?;
                        if let Err(err) = self.players[seat].split_hand(idx, first, second) {
                            warn!(player = %self.players[seat].name(), %err, "split rejected");
                            self.players[seat].hands_mut()[idx].stand();
                        }
                    }
                }
                Action::Stand => self.players[seat].hands_mut()[idx].stand(),
                Action::Surrender => {
                    if let Err(err) = self.players[seat].hands_mut()[idx].surrender() {
                        warn!(player = %self.players[seat].name(), %err, "surrender rejected");
                        self.players[seat].hands_mut()[idx].stand();
                    }
                }
            }

            info!(
                player = %self.players[seat].name(),
                hand = %self.players[seat].hands()[idx],
                %action,
                "applied"
            );
        }
    }

    /// Whether any player hand stood on a total the dealer must beat.
    /// Naturals, busts, and surrenders settle without dealer cards.
    fn dealer_must_play(&self) -> bool {
        self.players
            .iter()
            .flat_map(|p| p.hands())
            .any(|h| matches!(h.outcome(), Some(HandOutcome::Stood(_))))
    }

    /// Drive the dealer hand by the fixed house rule. Skipped entirely
    /// when no stood player hand is left to compare against.
    fn play_dealer(&mut self) -> Result<(), GameError> {
        if !self.dealer_must_play() {
            if let Some(hand) = self.dealer.hand.as_mut() {
                hand.stand();
            }
            return Ok(());
        }
        loop {
            let action = {
                let hand = self.dealer.hand.as_ref().ok_or(GameError::NotDealt)?;
                if hand.is_closed() {
                    return Ok(());
                }
                self.dealer.strategy.select_action(hand, hand.legal_actions(), &mut self.rng)
            };
            match action {
                Action::Hit => {
                    let card = self.shoe.draw()?;
                    let hand = self.dealer.hand.as_mut().ok_or(GameError::NotDealt)?;
                    if hand.hit(card).is_err() {
                        hand.stand();
                    }
                }
                // The dealer strategy only ever answers hit or stand.
                _ => {
                    let hand = self.dealer.hand.as_mut().ok_or(GameError::NotDealt)?;
                    hand.stand();
                }
            }
            if let Some(hand) = &self.dealer.hand {
                info!(dealer = %hand, %action, "applied");
            }
        }
    }

    /// Compare every player hand to the dealer's final outcome, credit
    /// bankrolls, and emit the round-end event.
    fn resolve(&mut self) -> Result<RoundSummary, GameError> {
        let dealer_outcome = self
            .dealer
            .hand
            .as_ref()
            .and_then(Hand::outcome)
            .ok_or(GameError::NotDealt)?;

        let payout = self.config.blackjack_payout;
        let mut summaries = Vec::with_capacity(self.players.len());
        for player in &mut self.players {
            let mut hands = Vec::with_capacity(player.hands().len());
            for hand in player.hands() {
                // Every hand is closed once play_hand returns.
                let outcome = hand.outcome().unwrap_or(HandOutcome::Bust);
                let credit = settle(outcome, hand.bet(), dealer_outcome, payout);
                hands.push(HandResult { outcome, wager: hand.bet(), credit });
            }
            for result in &hands {
                player.apply_outcome(result.credit);
            }
            info!(
                player = %player.name(),
                bankroll = player.bankroll(),
                hands = hands.len(),
                "round end"
            );
            summaries.push(PlayerSummary {
                name: player.name().to_string(),
                bankroll: player.bankroll(),
                hands,
            });
        }
        info!(dealer = ?dealer_outcome, "round end");
        Ok(RoundSummary { dealer: dealer_outcome, players: summaries })
    }

    fn apply_hit(&mut self, seat: usize, idx: usize, card: Card) {
        if let Err(err) = self.players[seat].hands_mut()[idx].hit(card) {
            warn!(player = %self.players[seat].name(), %err, "hit rejected");
            self.players[seat].hands_mut()[idx].stand();
        }
    }
}
