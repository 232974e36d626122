//! Proof selection strategies
//!
//! A [`SelectionStrategy`] chooses a subset of held proofs covering a target
//! amount. Strategies never mutate their input and return `None` only when no
//! covering subset exists under the strategy's contract:
//!
//! - [`SelectionStrategy::SmallestFirst`] spends small proofs first and may
//!   overshoot, producing change.
//! - [`SelectionStrategy::LargestFirst`] minimizes the number of proofs
//!   handed over.
//! - [`SelectionStrategy::ExactMatch`] only succeeds when some subset sums
//!   exactly to the amount (see [`subset_sum`]).
//! - [`SelectionStrategy::Random`] avoids amount-ordering bias so spending
//!   patterns reveal less about wallet composition.

use rand::seq::SliceRandom;

use crate::data_structures::{proofs_total, Proof};

pub mod subset_sum;

pub use subset_sum::{find_exact_subset, MAX_SUBSET_SEARCH};

/// Closed set of proof selection strategies, injected at wallet construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionStrategy {
    /// Sort ascending by amount and accumulate until the target is covered
    #[default]
    SmallestFirst,
    /// Sort descending by amount and accumulate until the target is covered
    LargestFirst,
    /// Subset-sum search for a zero-change selection
    ExactMatch,
    /// Accumulate in shuffled order
    Random,
}

impl SelectionStrategy {
    /// Short name for diagnostics and logs
    pub fn name(&self) -> &'static str {
        match self {
            SelectionStrategy::SmallestFirst => "smallest-first",
            SelectionStrategy::LargestFirst => "largest-first",
            SelectionStrategy::ExactMatch => "exact-match",
            SelectionStrategy::Random => "random",
        }
    }

    /// Select a subset of `proofs` covering `amount`
    ///
    /// Returns `None` when `amount` is zero, when the total balance is below
    /// `amount`, or (for [`SelectionStrategy::ExactMatch`]) when no exact
    /// subset exists.
    pub fn select(&self, proofs: &[Proof], amount: u64) -> Option<Vec<Proof>> {
        if amount == 0 || proofs_total(proofs) < amount {
            return None;
        }
        match self {
            SelectionStrategy::SmallestFirst => {
                let mut ordered: Vec<&Proof> = proofs.iter().collect();
                ordered.sort_by(|a, b| a.amount.cmp(&b.amount));
                accumulate(&ordered, amount)
            }
            SelectionStrategy::LargestFirst => {
                let mut ordered: Vec<&Proof> = proofs.iter().collect();
                ordered.sort_by(|a, b| b.amount.cmp(&a.amount));
                accumulate(&ordered, amount)
            }
            SelectionStrategy::ExactMatch => find_exact_subset(proofs, amount),
            SelectionStrategy::Random => {
                let mut ordered: Vec<&Proof> = proofs.iter().collect();
                ordered.shuffle(&mut rand::thread_rng());
                accumulate(&ordered, amount)
            }
        }
    }
}

/// Accumulate proofs in the given order until the running total covers
/// `amount`. The caller has already verified the total balance is sufficient.
fn accumulate(ordered: &[&Proof], amount: u64) -> Option<Vec<Proof>> {
    let mut selected = Vec::new();
    let mut total = 0u64;
    for proof in ordered {
        total += proof.amount;
        selected.push((*proof).clone());
        if total >= amount {
            return Some(selected);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proofs(amounts: &[u64]) -> Vec<Proof> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, a)| Proof::new("ks1", *a, format!("secret-{i}"), format!("sig-{i}")))
            .collect()
    }

    fn amounts(selected: &[Proof]) -> Vec<u64> {
        selected.iter().map(|p| p.amount).collect()
    }

    #[test]
    fn test_smallest_first_accumulates_in_ascending_order() {
        let held = proofs(&[1, 5, 10, 50]);
        let selected = SelectionStrategy::SmallestFirst.select(&held, 12).unwrap();
        assert_eq!(amounts(&selected), vec![1, 5, 10]);
    }

    #[test]
    fn test_largest_first_minimizes_proof_count() {
        let held = proofs(&[1, 2, 4, 8, 16]);
        let selected = SelectionStrategy::LargestFirst.select(&held, 20).unwrap();
        assert_eq!(amounts(&selected), vec![16, 8]);
    }

    #[test]
    fn test_selection_returns_none_when_balance_insufficient() {
        let held = proofs(&[1, 2]);
        assert!(SelectionStrategy::SmallestFirst.select(&held, 4).is_none());
        assert!(SelectionStrategy::LargestFirst.select(&held, 4).is_none());
        assert!(SelectionStrategy::Random.select(&held, 4).is_none());
    }

    #[test]
    fn test_zero_amount_is_never_selectable() {
        let held = proofs(&[1, 2]);
        assert!(SelectionStrategy::SmallestFirst.select(&held, 0).is_none());
    }

    #[test]
    fn test_random_selection_covers_amount_without_mutating_input() {
        let held = proofs(&[1, 2, 4, 8, 16]);
        let before = held.clone();
        for _ in 0..10 {
            let selected = SelectionStrategy::Random.select(&held, 9).unwrap();
            assert!(proofs_total(&selected) >= 9);
        }
        assert_eq!(held, before);
    }

    #[test]
    fn test_exact_match_strategy_rejects_inexact_targets() {
        let held = proofs(&[4, 8]);
        assert!(SelectionStrategy::ExactMatch.select(&held, 5).is_none());
        let selected = SelectionStrategy::ExactMatch.select(&held, 12).unwrap();
        assert_eq!(proofs_total(&selected), 12);
    }
}
