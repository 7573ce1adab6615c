//! Strategies: pluggable decision policies at the seam between the
//! orchestrator and a hand.
//!
//! A strategy only ever reads the hand and picks from the offered
//! legal-action set; it holds no per-round state and never mutates the
//! hand. Randomness comes in through the threaded RNG handle so seeded
//! rounds stay reproducible.

use crate::config::{Soft17Rule, StrategyKind};
use crate::hand::{Action, Hand};
use rand::seq::IndexedRandom;
use rand::RngCore;

/// A decision policy: given a hand and its legal actions, pick one.
pub trait Strategy {
    /// Select one action from `legal`. Returning an action outside the set
    /// is a policy bug the orchestrator absorbs with its default action.
    fn select_action(&self, hand: &Hand, legal: &[Action], rng: &mut dyn RngCore) -> Action;

    /// Short name for the event log.
    fn name(&self) -> &'static str;
}

/// The fixed house rule: hit until the best total clears the stand
/// threshold, then stand. Never doubles, splits, or surrenders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DealerStrategy {
    stand_threshold: u32,
    soft_17: Soft17Rule,
}

impl DealerStrategy {
    pub const DEFAULT_STAND_THRESHOLD: u32 = 16;

    /// Standard table rule: stand on hard totals of threshold+1 and up;
    /// the soft-17 rule decides whether a soft 17 is still hit.
    pub fn new(soft_17: Soft17Rule) -> Self {
        Self { stand_threshold: Self::DEFAULT_STAND_THRESHOLD, soft_17 }
    }

    pub fn with_threshold(stand_threshold: u32, soft_17: Soft17Rule) -> Self {
        Self { stand_threshold, soft_17 }
    }
}

impl Default for DealerStrategy {
    fn default() -> Self {
        Self::new(Soft17Rule::Stand)
    }
}

impl Strategy for DealerStrategy {
    fn select_action(&self, hand: &Hand, _legal: &[Action], _rng: &mut dyn RngCore) -> Action {
        let Some(best) = hand.best_total() else {
            return Action::Stand;
        };
        if best <= self.stand_threshold {
            return Action::Hit;
        }
        // A soft threshold+1 (the classic soft 17) still counts as "under"
        // when the house rule says hit.
        if best == self.stand_threshold + 1
            && hand.is_soft()
            && self.soft_17 == Soft17Rule::Hit
        {
            return Action::Hit;
        }
        Action::Stand
    }

    fn name(&self) -> &'static str {
        "dealer"
    }
}

/// Uniform random pick from the legal-action set. A baseline for
/// simulation and testing, not competitive play.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomStrategy;

impl Strategy for RandomStrategy {
    fn select_action(&self, _hand: &Hand, legal: &[Action], rng: &mut dyn RngCore) -> Action {
        legal.choose(rng).copied().unwrap_or(Action::Stand)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Instantiate a strategy by its configured kind.
pub fn build_strategy(kind: StrategyKind, soft_17: Soft17Rule) -> Box<dyn Strategy> {
    match kind {
        StrategyKind::Random => Box::new(RandomStrategy),
        StrategyKind::Dealer => Box::new(DealerStrategy::new(soft_17)),
    }
}
