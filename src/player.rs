//! Players: a bankroll plus the ordered hands it is backing.
//!
//! Wagers are debited the moment they are placed; resolution credits flow
//! back through [`Player::apply_outcome`] exactly once per hand. The dealer
//! is not a `Player`: it lives as a distinguished seat inside the game
//! with no bankroll accounting.

use crate::cards::Card;
use crate::hand::{Hand, HandError};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PlayerError {
    #[error("insufficient funds: wager {wager:.2} exceeds bankroll {bankroll:.2}")]
    InsufficientFunds { wager: f64, bankroll: f64 },
    #[error("no hand at index {0}")]
    NoSuchHand(usize),
    #[error(transparent)]
    Hand(#[from] HandError),
}

/// A seated player: bankroll, hands (one unless a split occurred), name for
/// the event log.
#[derive(Debug, Clone)]
pub struct Player {
    name: String,
    bankroll: f64,
    hands: Vec<Hand>,
}

impl Player {
    pub fn new(name: impl Into<String>, bankroll: f64) -> Self {
        Self { name: name.into(), bankroll, hands: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bankroll(&self) -> f64 {
        self.bankroll
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub(crate) fn hands_mut(&mut self) -> &mut [Hand] {
        &mut self.hands
    }

    pub fn can_afford(&self, wager: f64) -> bool {
        wager <= self.bankroll
    }

    /// Debit a wager. No credit: an unaffordable wager is refused, the
    /// bankroll untouched.
    pub fn place_wager(&mut self, wager: f64) -> Result<(), PlayerError> {
        if !self.can_afford(wager) {
            return Err(PlayerError::InsufficientFunds { wager, bankroll: self.bankroll });
        }
        self.bankroll -= wager;
        Ok(())
    }

    /// Credit the resolved payout for one hand. Called exactly once per
    /// hand at round resolution, never mid-round.
    pub fn apply_outcome(&mut self, credit: f64) {
        self.bankroll += credit;
    }

    /// Replace whatever hands the player held with a single fresh hand,
    /// debiting its wager.
    pub(crate) fn begin_round(&mut self, cards: [Card; 2], wager: f64) -> Result<(), PlayerError> {
        self.place_wager(wager)?;
        self.hands = vec![Hand::deal(cards, wager)];
        Ok(())
    }

    /// Sit the round out (no affordable wager): the player keeps an empty
    /// hand list and is skipped by the orchestrator.
    pub(crate) fn sit_out(&mut self) {
        self.hands.clear();
    }

    /// Split the hand at `idx`: debit the duplicate wager, consume the
    /// parent, insert its two children in place. On refusal the parent is
    /// reinstated untouched.
    pub fn split_hand(
        &mut self,
        idx: usize,
        first_draw: Card,
        second_draw: Card,
    ) -> Result<(), PlayerError> {
        let Some(hand) = self.hands.get(idx) else {
            return Err(PlayerError::NoSuchHand(idx));
        };
        let wager = hand.bet();
        if !self.can_afford(wager) {
            return Err(PlayerError::InsufficientFunds { wager, bankroll: self.bankroll });
        }
        let parent = self.hands.remove(idx);
        match parent.split(first_draw, second_draw) {
            Ok((first, second)) => {
                self.bankroll -= wager;
                self.hands.insert(idx, second);
                self.hands.insert(idx, first);
                Ok(())
            }
            Err((parent, err)) => {
                self.hands.insert(idx, parent);
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};
    use crate::hand::HandOutcome;

    fn pair(a: Rank, b: Rank) -> [Card; 2] {
        [Card::new(a, Suit::Spades), Card::new(b, Suit::Hearts)]
    }

    #[test]
    fn wager_is_debited_immediately() {
        let mut p = Player::new("P1", 100.0);
        p.begin_round(pair(Rank::Five, Rank::Nine), 10.0).unwrap();
        assert_eq!(p.bankroll(), 90.0);
        assert_eq!(p.hands().len(), 1);
    }

    #[test]
    fn unaffordable_wager_is_refused() {
        let mut p = Player::new("P1", 5.0);
        let err = p.place_wager(10.0).unwrap_err();
        assert!(matches!(err, PlayerError::InsufficientFunds { .. }));
        assert_eq!(p.bankroll(), 5.0);
    }

    #[test]
    fn split_debits_the_duplicate_wager_and_replaces_the_parent() {
        let mut p = Player::new("P1", 100.0);
        p.begin_round(pair(Rank::Eight, Rank::Eight), 10.0).unwrap();
        assert_eq!(p.bankroll(), 90.0);

        p.split_hand(0, Card::new(Rank::Two, Suit::Clubs), Card::new(Rank::Three, Suit::Clubs))
            .unwrap();
        assert_eq!(p.bankroll(), 80.0);
        assert_eq!(p.hands().len(), 2);
        assert_eq!(p.hands()[0].bet(), 10.0);
        assert_eq!(p.hands()[1].bet(), 10.0);
    }

    #[test]
    fn refused_split_reinstates_the_parent() {
        let mut p = Player::new("P1", 100.0);
        p.begin_round(pair(Rank::Eight, Rank::Nine), 10.0).unwrap();
        let err = p
            .split_hand(0, Card::new(Rank::Two, Suit::Clubs), Card::new(Rank::Three, Suit::Clubs))
            .unwrap_err();
        assert!(matches!(err, PlayerError::Hand(HandError::InvalidSplit)));
        assert_eq!(p.hands().len(), 1);
        assert_eq!(p.bankroll(), 90.0);
    }

    #[test]
    fn split_requires_funds_for_the_second_wager() {
        let mut p = Player::new("P1", 10.0);
        p.begin_round(pair(Rank::Eight, Rank::Eight), 10.0).unwrap();
        assert_eq!(p.bankroll(), 0.0);
        let err = p
            .split_hand(0, Card::new(Rank::Two, Suit::Clubs), Card::new(Rank::Three, Suit::Clubs))
            .unwrap_err();
        assert!(matches!(err, PlayerError::InsufficientFunds { .. }));
        assert_eq!(p.hands().len(), 1);
    }

    #[test]
    fn outcome_credit_lands_once() {
        let mut p = Player::new("P1", 100.0);
        p.begin_round(pair(Rank::Ten, Rank::Nine), 10.0).unwrap();
        p.hands_mut()[0].stand();
        assert_eq!(p.hands()[0].outcome(), Some(HandOutcome::Stood(19)));
        p.apply_outcome(20.0);
        assert_eq!(p.bankroll(), 110.0);
    }
}
