//! Bounded subset-sum search for exact payments
//!
//! Finding a zero-change selection is a subset-sum problem. Two cheap
//! shortcuts cover the overwhelmingly common cases (a single proof of the
//! right denomination, or a pair), before a bounded dynamic-programming pass
//! over at most [`MAX_SUBSET_SEARCH`] proofs.
//!
//! The DP maintains a map from achievable sum to the proof indices used to
//! reach it. Each proof extends every previously achievable sum exactly once,
//! so a proof is used at most once per path. An already achievable sum is
//! never overwritten, which fixes the tie-break among equal solutions to
//! "first in original array order": within one proof's round all newly
//! produced sums are distinct, so insertion order cannot affect the outcome.

use std::collections::HashMap;

use crate::data_structures::Proof;

/// Maximum number of proofs considered by the dynamic-programming search
pub const MAX_SUBSET_SEARCH: usize = 50;

/// Find a subset of `proofs` summing exactly to `amount`
///
/// Returns `None` when `amount` is zero or no exact subset exists among the
/// first [`MAX_SUBSET_SEARCH`] proofs.
pub fn find_exact_subset(proofs: &[Proof], amount: u64) -> Option<Vec<Proof>> {
    if amount == 0 {
        return None;
    }

    // Tier 1: a single proof of exactly the right denomination.
    if let Some(proof) = proofs.iter().find(|p| p.amount == amount) {
        return Some(vec![proof.clone()]);
    }

    // Tier 2: any pair summing exactly to the amount, earliest pair first.
    for i in 0..proofs.len() {
        for j in (i + 1)..proofs.len() {
            if proofs[i].amount + proofs[j].amount == amount {
                return Some(vec![proofs[i].clone(), proofs[j].clone()]);
            }
        }
    }

    // Tier 3: bounded DP over sum -> path of proof indices.
    let bounded = &proofs[..proofs.len().min(MAX_SUBSET_SEARCH)];
    let mut reachable: HashMap<u64, Vec<usize>> = HashMap::new();

    for (index, proof) in bounded.iter().enumerate() {
        if proof.amount > amount {
            continue;
        }

        // Snapshot so this proof extends each pre-existing sum exactly once.
        let existing: Vec<(u64, Vec<usize>)> = reachable
            .iter()
            .map(|(sum, path)| (*sum, path.clone()))
            .collect();

        for (sum, path) in existing {
            let next = sum + proof.amount;
            if next == amount {
                let mut indices = path;
                indices.push(index);
                return Some(indices.iter().map(|i| bounded[*i].clone()).collect());
            }
            if next < amount {
                reachable.entry(next).or_insert_with(|| {
                    let mut indices = path.clone();
                    indices.push(index);
                    indices
                });
            }
        }

        // The proof on its own; equality was already handled by tier 1.
        if proof.amount < amount {
            reachable.entry(proof.amount).or_insert_with(|| vec![index]);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::proofs_total;

    fn proofs(amounts: &[u64]) -> Vec<Proof> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, a)| Proof::new("ks1", *a, format!("secret-{i}"), format!("sig-{i}")))
            .collect()
    }

    #[test]
    fn test_single_proof_shortcut() {
        let held = proofs(&[1, 8, 4]);
        let subset = find_exact_subset(&held, 8).unwrap();
        assert_eq!(subset.len(), 1);
        assert_eq!(subset[0].amount, 8);
    }

    #[test]
    fn test_pair_shortcut_prefers_earliest_pair() {
        let held = proofs(&[2, 3, 5, 4]);
        let subset = find_exact_subset(&held, 7).unwrap();
        // (2, 5) comes before (3, 4) in array order.
        assert_eq!(
            subset.iter().map(|p| p.amount).collect::<Vec<_>>(),
            vec![2, 5]
        );
    }

    #[test]
    fn test_dp_finds_three_proof_subset() {
        let held = proofs(&[1, 2, 4, 8]);
        let subset = find_exact_subset(&held, 11).unwrap();
        assert_eq!(proofs_total(&subset), 11);
        let mut picked: Vec<u64> = subset.iter().map(|p| p.amount).collect();
        picked.sort_unstable();
        assert_eq!(picked, vec![1, 2, 8]);
    }

    #[test]
    fn test_no_exact_subset() {
        let held = proofs(&[4, 8, 16]);
        assert!(find_exact_subset(&held, 5).is_none());
        assert!(find_exact_subset(&held, 0).is_none());
    }

    #[test]
    fn test_each_proof_used_at_most_once() {
        let held = proofs(&[4, 4, 4]);
        // 8 is reachable with two distinct proofs, 16 is not reachable.
        assert!(find_exact_subset(&held, 8).is_some());
        assert!(find_exact_subset(&held, 16).is_none());
    }

    #[test]
    fn test_search_bound_is_respected() {
        // The only exact subset requires a proof past the search bound; the
        // pair shortcut is also out of reach because the target needs three.
        let mut amounts = vec![2u64; MAX_SUBSET_SEARCH];
        amounts.push(3);
        amounts.push(3);
        amounts.push(3);
        let held = proofs(&amounts);
        assert!(find_exact_subset(&held, 9).is_none());
    }

    #[test]
    fn test_tie_break_is_first_in_array_order() {
        // 7 is reachable as {1, 2, 4} using either copy of 2 and 4; the DP
        // keeps the path through the earliest copies.
        let held = proofs(&[1, 2, 4, 2, 4]);
        let subset = find_exact_subset(&held, 7).unwrap();
        let secrets: Vec<&str> = subset.iter().map(|p| p.secret.as_str()).collect();
        assert_eq!(secrets, vec!["secret-0", "secret-1", "secret-2"]);
    }
}
