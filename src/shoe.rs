use crate::cards::{Card, Rank, Suit};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Drawing from an empty shoe is a structural failure: the round must
/// abort rather than invent a card.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ShoeError {
    #[error("shoe exhausted: no cards left to draw")]
    Exhausted,
}

/// The shoe: one or more standard 52-card decks, shuffled once per round,
/// drawn from the front.
///
/// ```
/// use blackjack_rs::shoe::Shoe;
///
/// let shoe = Shoe::multi(6);
/// assert_eq!(shoe.len(), 312);
/// ```
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: VecDeque<Card>,
}

impl Shoe {
    /// One unshuffled 52-card deck in canonical order (rank-major,
    /// suit-minor), so shuffling is the only source of randomness.
    pub fn standard() -> Self {
        Self::multi(1)
    }

    /// `num_decks` concatenated standard decks, unshuffled.
    pub fn multi(num_decks: usize) -> Self {
        let mut cards = VecDeque::with_capacity(52 * num_decks);
        for _ in 0..num_decks {
            for &r in &Rank::ALL {
                for &s in &Suit::ALL {
                    cards.push_back(Card::new(r, s));
                }
            }
        }
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Shuffle using a seeded RNG for reproducibility.
    pub fn shuffle_seeded(&mut self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.shuffle_with(&mut rng);
    }

    /// Uniform in-place permutation using the provided RNG.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.make_contiguous().shuffle(rng);
    }

    /// Remove and return the front card.
    pub fn draw(&mut self) -> Result<Card, ShoeError> {
        self.cards.pop_front().ok_or(ShoeError::Exhausted)
    }

    /// Draw exactly two cards, front first.
    pub fn draw_pair(&mut self) -> Result<[Card; 2], ShoeError> {
        let a = self.draw()?;
        let b = self.draw()?;
        Ok([a, b])
    }

    /// A shoe with a fixed card order, for deterministic replays and tests.
    pub fn stacked(cards: Vec<Card>) -> Self {
        Self { cards: cards.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_shoe_has_52_per_deck() {
        assert_eq!(Shoe::standard().len(), 52);
        assert_eq!(Shoe::multi(4).len(), 208);
    }

    #[test]
    fn canonical_order_is_rank_major() {
        let mut shoe = Shoe::standard();
        let first = shoe.draw().unwrap();
        let second = shoe.draw().unwrap();
        assert_eq!(first, Card::new(Rank::Two, Suit::Clubs));
        assert_eq!(second, Card::new(Rank::Two, Suit::Diamonds));
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let mut a = Shoe::multi(2);
        let mut b = Shoe::multi(2);
        a.shuffle_seeded(42);
        b.shuffle_seeded(42);
        assert_eq!(a.cards, b.cards);
    }

    #[test]
    fn draw_reduces_length_by_exactly_one() {
        let mut shoe = Shoe::standard();
        shoe.shuffle_seeded(7);
        let before = shoe.len();
        shoe.draw().unwrap();
        assert_eq!(shoe.len(), before - 1);
        let pair = shoe.draw_pair().unwrap();
        assert_ne!(pair[0], pair[1]);
        assert_eq!(shoe.len(), before - 3);
    }

    #[test]
    fn empty_shoe_fails_explicitly() {
        let mut shoe = Shoe::stacked(Vec::new());
        assert_eq!(shoe.draw(), Err(ShoeError::Exhausted));
    }
}
