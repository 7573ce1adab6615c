//! The hand state machine: cards, the derived value set, the legal-action
//! set, and the transitions that close a hand.
//!
//! A hand is `Open` until an action (or a dealt natural) closes it; a closed
//! hand accepts no further mutation. The value set is every distinct total
//! reachable by choosing one value per ace; the best total is the largest
//! member not exceeding 21.

use crate::cards::Card;
use std::collections::BTreeSet;
use std::fmt;

/// The closed set of table actions. Dispatch is an exhaustive match, so a
/// new action cannot be added without handling it everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Hit,
    Double,
    Split,
    Stand,
    Surrender,
}

impl Action {
    pub const fn label(self) -> &'static str {
        match self {
            Action::Hit => "hit",
            Action::Double => "double",
            Action::Split => "split",
            Action::Stand => "stand",
            Action::Surrender => "surrender",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How a closed hand finished. A natural two-card 21 is its own variant,
/// never a numeric sentinel, because it settles at the bonus ratio while a
/// drawn 21 settles at even money.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandOutcome {
    /// Closed with a valid total (stand, double, or hitting to exactly 21).
    Stood(u32),
    /// Every total in the value set exceeds 21; loses to any live dealer hand.
    Bust,
    /// Natural: ace + ten-value card as the original two cards.
    Blackjack,
    /// Forfeited; half the wager comes back at resolution.
    Surrendered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandState {
    Open,
    Closed(HandOutcome),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HandError {
    #[error("action '{0}' is not in the hand's legal-action set")]
    IllegalAction(Action),
    #[error("split unavailable: requires an unmutated two-card hand of equal rank")]
    InvalidSplit,
}

/// One playing hand: its cards, wager, derived value set, and current
/// legal-action set. Created with exactly two cards; destroyed by a split
/// or by the round ending.
///
/// ```
/// use blackjack_rs::cards::{Card, Rank, Suit};
/// use blackjack_rs::hand::{Action, Hand};
///
/// let hand = Hand::deal(
///     [Card::new(Rank::Six, Suit::Clubs), Card::new(Rank::Ace, Suit::Hearts)],
///     10.0,
/// );
/// assert_eq!(hand.value_set(), &[7, 17]);
/// assert_eq!(hand.best_total(), Some(17));
/// assert!(hand.is_allowed(Action::Hit));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    cards: Vec<Card>,
    values: Vec<u32>,
    bet: f64,
    state: HandState,
    actions: Vec<Action>,
    mutated: bool,
    original: bool,
}

/// All distinct totals reachable by choosing one value per ace.
/// Never empty: every card contributes at least one value.
fn compute_values(cards: &[Card]) -> Vec<u32> {
    let mut totals = vec![0u32];
    for card in cards {
        let mut next = BTreeSet::new();
        for &cv in card.blackjack_values() {
            for &t in &totals {
                next.insert(t + cv);
            }
        }
        totals = next.into_iter().collect();
    }
    totals
}

impl Hand {
    /// Create a hand from its two dealt cards and a wager. A natural 21
    /// closes immediately as `Blackjack`, overriding every other action.
    pub fn deal(cards: [Card; 2], bet: f64) -> Self {
        Self::new(cards, bet, true)
    }

    fn new(cards: [Card; 2], bet: f64, original: bool) -> Self {
        let mut hand = Self {
            cards: cards.to_vec(),
            values: compute_values(&cards),
            bet,
            state: HandState::Open,
            actions: Vec::new(),
            mutated: false,
            original,
        };
        if hand.best_total() == Some(21) {
            hand.close(HandOutcome::Blackjack);
        } else {
            hand.refresh_actions();
        }
        hand
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn bet(&self) -> f64 {
        self.bet
    }

    /// The sorted, deduplicated value set. Never empty.
    pub fn value_set(&self) -> &[u32] {
        &self.values
    }

    /// Largest total not exceeding 21, or `None` when every total busts.
    pub fn best_total(&self) -> Option<u32> {
        self.values.iter().rev().find(|&&v| v <= 21).copied()
    }

    /// Whether the best total counts an ace as 11.
    pub fn is_soft(&self) -> bool {
        match self.best_total() {
            Some(b) if b >= 11 => self.values.contains(&(b - 10)),
            _ => false,
        }
    }

    pub fn state(&self) -> HandState {
        self.state
    }

    pub fn outcome(&self) -> Option<HandOutcome> {
        match self.state {
            HandState::Open => None,
            HandState::Closed(o) => Some(o),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, HandState::Closed(_))
    }

    /// The current legal-action set, recomputed after every mutation and
    /// stable between mutations. A closed hand reports `{stand}`.
    pub fn legal_actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn is_allowed(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    /// Append one drawn card; no wager change. Closes the hand on exactly
    /// 21 or on bust, otherwise narrows the legal set to hit/double/stand.
    pub fn hit(&mut self, card: Card) -> Result<(), HandError> {
        if !self.is_allowed(Action::Hit) || self.is_closed() {
            return Err(HandError::IllegalAction(Action::Hit));
        }
        self.push_card(card);
        match self.best_total() {
            None => self.close(HandOutcome::Bust),
            Some(21) => self.close(HandOutcome::Stood(21)),
            Some(_) => self.refresh_actions(),
        }
        Ok(())
    }

    /// Append one drawn card and double the wager; the hand is forced
    /// closed regardless of the resulting total.
    pub fn double(&mut self, card: Card) -> Result<(), HandError> {
        if !self.is_allowed(Action::Double) || self.is_closed() {
            return Err(HandError::IllegalAction(Action::Double));
        }
        self.push_card(card);
        self.bet *= 2.0;
        match self.best_total() {
            None => self.close(HandOutcome::Bust),
            Some(t) => self.close(HandOutcome::Stood(t)),
        }
        Ok(())
    }

    /// Force the hand closed with its best total. Always legal while open;
    /// a no-op on an already closed hand.
    pub fn stand(&mut self) {
        if self.is_closed() {
            return;
        }
        match self.best_total() {
            Some(t) => self.close(HandOutcome::Stood(t)),
            None => self.close(HandOutcome::Bust),
        }
    }

    /// Forfeit the original two-card hand for half the wager. Only legal
    /// before any other action.
    pub fn surrender(&mut self) -> Result<(), HandError> {
        if !self.is_allowed(Action::Surrender) || self.is_closed() {
            return Err(HandError::IllegalAction(Action::Surrender));
        }
        self.close(HandOutcome::Surrendered);
        Ok(())
    }

    /// Consume the parent and produce two new two-card hands, one fresh
    /// card each, both carrying the parent's wager. Each child is
    /// independently re-evaluated for natural-21 closure. On refusal the
    /// untouched parent comes back inside the error, so the caller can
    /// reinstate it and fall back to another action.
    pub fn split(
        self,
        first_draw: Card,
        second_draw: Card,
    ) -> Result<(Hand, Hand), (Hand, HandError)> {
        if !self.is_allowed(Action::Split) {
            return Err((self, HandError::InvalidSplit));
        }
        let first = Hand::new([self.cards[0], first_draw], self.bet, false);
        let second = Hand::new([self.cards[1], second_draw], self.bet, false);
        Ok((first, second))
    }

    fn push_card(&mut self, card: Card) {
        self.cards.push(card);
        self.values = compute_values(&self.cards);
        self.mutated = true;
    }

    fn close(&mut self, outcome: HandOutcome) {
        self.state = HandState::Closed(outcome);
        self.actions = vec![Action::Stand];
    }

    fn refresh_actions(&mut self) {
        if self.is_closed() {
            self.actions = vec![Action::Stand];
            return;
        }
        if self.mutated {
            // Split and surrender are only offered on the original two cards.
            self.actions = vec![Action::Hit, Action::Double, Action::Stand];
            return;
        }
        let mut actions = vec![Action::Hit, Action::Double];
        if self.cards.len() == 2 && self.cards[0].matches_rank(self.cards[1]) {
            actions.push(Action::Split);
        }
        actions.push(Action::Stand);
        // Only the original dealt hand may surrender; split children cannot.
        if self.original {
            actions.push(Action::Surrender);
        }
        self.actions = actions;
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.cards.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{c}")?;
        }
        match self.state {
            HandState::Open => match self.best_total() {
                Some(t) => write!(f, " ({t})"),
                None => write!(f, " (bust)"),
            },
            HandState::Closed(HandOutcome::Stood(t)) => write!(f, " (stood {t})"),
            HandState::Closed(HandOutcome::Bust) => write!(f, " (bust)"),
            HandState::Closed(HandOutcome::Blackjack) => write!(f, " (blackjack)"),
            HandState::Closed(HandOutcome::Surrendered) => write!(f, " (surrendered)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    fn card(rank: Rank) -> Card {
        Card::new(rank, Suit::Spades)
    }

    fn pair(a: Rank, b: Rank) -> [Card; 2] {
        [Card::new(a, Suit::Spades), Card::new(b, Suit::Hearts)]
    }

    #[test]
    fn value_set_crosses_ace_choices() {
        let hand = Hand::deal(pair(Rank::Ace, Rank::Ace), 5.0);
        assert_eq!(hand.value_set(), &[2, 12, 22]);
        assert_eq!(hand.best_total(), Some(12));
        assert!(hand.is_soft());
    }

    #[test]
    fn fresh_hand_offers_full_action_set() {
        let hand = Hand::deal(pair(Rank::Six, Rank::Nine), 5.0);
        assert_eq!(
            hand.legal_actions(),
            &[Action::Hit, Action::Double, Action::Stand, Action::Surrender]
        );
        // Idempotent between mutations.
        assert_eq!(hand.legal_actions(), hand.legal_actions());
    }

    #[test]
    fn matching_ranks_unlock_split() {
        let hand = Hand::deal(pair(Rank::Eight, Rank::Eight), 5.0);
        assert!(hand.is_allowed(Action::Split));
        let (a, b) = hand.split(card(Rank::Two), card(Rank::Three)).unwrap();
        assert_eq!(a.cards().len(), 2);
        assert_eq!(b.cards().len(), 2);
        assert_eq!(a.value_set(), &[10]);
        assert_eq!(b.value_set(), &[11]);
        assert_eq!(a.bet(), 5.0);
        assert_eq!(b.bet(), 5.0);
    }

    #[test]
    fn mismatched_ranks_refuse_split_and_return_the_hand() {
        let hand = Hand::deal(pair(Rank::Eight, Rank::Nine), 5.0);
        assert!(!hand.is_allowed(Action::Split));
        let (back, err) = hand.split(card(Rank::Two), card(Rank::Three)).unwrap_err();
        assert_eq!(err, HandError::InvalidSplit);
        assert_eq!(back.cards().len(), 2);
        assert!(!back.is_closed());
    }

    #[test]
    fn natural_two_card_21_closes_immediately() {
        let hand = Hand::deal(pair(Rank::Ace, Rank::King), 10.0);
        assert_eq!(hand.outcome(), Some(HandOutcome::Blackjack));
        assert_eq!(hand.legal_actions(), &[Action::Stand]);
    }

    #[test]
    fn split_child_natural_closes_as_blackjack() {
        let hand = Hand::deal(pair(Rank::Ace, Rank::Ace), 5.0);
        let (a, b) = hand.split(card(Rank::King), card(Rank::Four)).unwrap();
        assert_eq!(a.outcome(), Some(HandOutcome::Blackjack));
        assert!(!b.is_closed());
    }

    #[test]
    fn split_children_cannot_surrender_but_may_resplit() {
        let hand = Hand::deal(pair(Rank::Eight, Rank::Eight), 5.0);
        let (mut a, b) = hand
            .split(Card::new(Rank::Two, Suit::Clubs), Card::new(Rank::Eight, Suit::Diamonds))
            .unwrap();
        assert!(!a.is_allowed(Action::Surrender));
        assert_eq!(a.surrender(), Err(HandError::IllegalAction(Action::Surrender)));
        // Second child is another 8-8 pair and stays splittable.
        assert!(b.is_allowed(Action::Split));
    }

    #[test]
    fn hit_narrows_actions_and_drops_surrender() {
        let mut hand = Hand::deal(pair(Rank::Two, Rank::Three), 5.0);
        hand.hit(card(Rank::Four)).unwrap();
        assert!(!hand.is_closed());
        assert_eq!(hand.legal_actions(), &[Action::Hit, Action::Double, Action::Stand]);
        assert!(hand.hit(card(Rank::Five)).is_ok());
    }

    #[test]
    fn hitting_to_exactly_21_closes_stood() {
        let mut hand = Hand::deal(pair(Rank::Seven, Rank::Eight), 5.0);
        hand.hit(card(Rank::Six)).unwrap();
        assert_eq!(hand.outcome(), Some(HandOutcome::Stood(21)));
    }

    #[test]
    fn hitting_past_21_busts() {
        let mut hand = Hand::deal(pair(Rank::Seven, Rank::Eight), 5.0);
        hand.hit(card(Rank::King)).unwrap();
        assert_eq!(hand.value_set(), &[25]);
        assert_eq!(hand.outcome(), Some(HandOutcome::Bust));
        assert_eq!(hand.best_total(), None);
        assert_eq!(hand.hit(card(Rank::Two)), Err(HandError::IllegalAction(Action::Hit)));
    }

    #[test]
    fn soft_hand_survives_a_big_hit() {
        let mut hand = Hand::deal(pair(Rank::Ace, Rank::Six), 5.0);
        assert_eq!(hand.best_total(), Some(17));
        hand.hit(card(Rank::Nine)).unwrap();
        // Ace falls back to 1: 1+6+9 = 16.
        assert_eq!(hand.best_total(), Some(16));
        assert!(!hand.is_soft());
        assert!(!hand.is_closed());
    }

    #[test]
    fn double_forces_closed_and_doubles_the_wager() {
        let mut hand = Hand::deal(pair(Rank::Five, Rank::Six), 10.0);
        hand.double(card(Rank::Four)).unwrap();
        assert_eq!(hand.bet(), 20.0);
        assert_eq!(hand.outcome(), Some(HandOutcome::Stood(15)));
        assert_eq!(hand.legal_actions(), &[Action::Stand]);
    }

    #[test]
    fn double_that_busts_still_keeps_the_doubled_wager() {
        let mut hand = Hand::deal(pair(Rank::Ten, Rank::Six), 10.0);
        hand.double(card(Rank::King)).unwrap();
        assert_eq!(hand.bet(), 20.0);
        assert_eq!(hand.outcome(), Some(HandOutcome::Bust));
    }

    #[test]
    fn stand_is_idempotent() {
        let mut hand = Hand::deal(pair(Rank::Ten, Rank::Nine), 5.0);
        hand.stand();
        assert_eq!(hand.outcome(), Some(HandOutcome::Stood(19)));
        hand.stand();
        assert_eq!(hand.outcome(), Some(HandOutcome::Stood(19)));
    }

    #[test]
    fn surrender_only_on_the_original_two_cards() {
        let mut hand = Hand::deal(pair(Rank::Ten, Rank::Six), 5.0);
        hand.hit(card(Rank::Two)).unwrap();
        assert_eq!(
            hand.surrender(),
            Err(HandError::IllegalAction(Action::Surrender))
        );

        let mut fresh = Hand::deal(pair(Rank::Ten, Rank::Six), 5.0);
        fresh.surrender().unwrap();
        assert_eq!(fresh.outcome(), Some(HandOutcome::Surrendered));
    }

    #[test]
    fn closed_hand_rejects_everything_else() {
        let mut hand = Hand::deal(pair(Rank::Ten, Rank::Nine), 5.0);
        hand.stand();
        assert_eq!(hand.hit(card(Rank::Two)), Err(HandError::IllegalAction(Action::Hit)));
        assert_eq!(hand.double(card(Rank::Two)), Err(HandError::IllegalAction(Action::Double)));
        assert_eq!(hand.surrender(), Err(HandError::IllegalAction(Action::Surrender)));
    }
}
