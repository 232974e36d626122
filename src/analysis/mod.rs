//! Denomination and payment-feasibility analysis
//!
//! Pure functions over a proof snapshot: whether an amount is payable with
//! zero change, how efficient an inexact payment would be, and how healthy
//! the wallet's denomination mix is. Results are transient and recomputed on
//! demand; nothing here touches wallet state or the network.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data_structures::{proofs_total, Proof};
use crate::selection::{find_exact_subset, SelectionStrategy};

/// Denomination ladder used for greedy decomposition, largest first
const DENOMINATION_LADDER: [u64; 11] = [1024, 512, 256, 128, 64, 32, 16, 8, 4, 2, 1];

/// Proofs of more than this value are considered "large" for health scoring
const LARGE_PROOF_THRESHOLD: u64 = 100;

/// Proofs of this value or less are considered "tiny" for health scoring
const TINY_PROOF_THRESHOLD: u64 = 1;

/// Result of checking whether an amount is payable with zero change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExactPaymentAnalysis {
    pub can_pay_exact: bool,
    /// The exact subset when one exists
    pub exact_proofs: Option<Vec<Proof>>,
    pub total_balance: u64,
    pub has_sufficient_balance: bool,
}

/// Full payment feasibility result, including the inexact fallback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAnalysis {
    pub can_afford: bool,
    pub can_pay_exact: bool,
    pub selected_proofs: Vec<Proof>,
    pub selected_total: u64,
    pub change_amount: u64,
    /// `amount / selected_total`; 1.0 for an exact payment, 0.0 when
    /// unaffordable
    pub efficiency: f64,
    /// Whether paying this amount requires a mint swap to make change
    pub requires_swap: bool,
}

/// Snapshot of the wallet's denomination mix with a 0-100 health score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenominationHealth {
    /// 0-100; 0 for an empty wallet
    pub score: u8,
    /// Histogram of denomination -> proof count
    pub denomination_counts: BTreeMap<u64, usize>,
    pub average_proof_size: f64,
    /// Common amounts (up to the balance) that are exactly payable
    pub exact_payable_amounts: Vec<u64>,
    /// One actionable recommendation per triggered penalty
    pub recommendations: Vec<String>,
}

/// Check whether `amount` is payable with zero change from `proofs`
///
/// A zero amount or insufficient balance yields `can_pay_exact = false`
/// without running the subset search.
pub fn analyze_exact_payment(proofs: &[Proof], amount: u64) -> ExactPaymentAnalysis {
    let total_balance = proofs_total(proofs);
    let has_sufficient_balance = amount > 0 && total_balance >= amount;

    if !has_sufficient_balance {
        return ExactPaymentAnalysis {
            can_pay_exact: false,
            exact_proofs: None,
            total_balance,
            has_sufficient_balance,
        };
    }

    let exact_proofs = find_exact_subset(proofs, amount);
    ExactPaymentAnalysis {
        can_pay_exact: exact_proofs.is_some(),
        exact_proofs,
        total_balance,
        has_sufficient_balance,
    }
}

/// Analyze how `amount` would be paid, falling back to smallest-first
/// selection when no exact subset exists
pub fn analyze_payment(proofs: &[Proof], amount: u64) -> PaymentAnalysis {
    let exact = analyze_exact_payment(proofs, amount);

    if !exact.has_sufficient_balance {
        return PaymentAnalysis {
            can_afford: false,
            can_pay_exact: false,
            selected_proofs: Vec::new(),
            selected_total: 0,
            change_amount: 0,
            efficiency: 0.0,
            requires_swap: false,
        };
    }

    if let Some(selected) = exact.exact_proofs {
        let selected_total = proofs_total(&selected);
        return PaymentAnalysis {
            can_afford: true,
            can_pay_exact: true,
            selected_proofs: selected,
            selected_total,
            change_amount: 0,
            efficiency: 1.0,
            requires_swap: false,
        };
    }

    // Balance is sufficient, so smallest-first cannot fail here.
    let selected = SelectionStrategy::SmallestFirst
        .select(proofs, amount)
        .unwrap_or_default();
    let selected_total = proofs_total(&selected);
    PaymentAnalysis {
        can_afford: true,
        can_pay_exact: false,
        selected_total,
        change_amount: selected_total - amount,
        efficiency: amount as f64 / selected_total as f64,
        requires_swap: true,
        selected_proofs: selected,
    }
}

/// Score the wallet's denomination mix
///
/// The score starts at 100 and drops for concentration in one denomination,
/// oversized proofs, dust accumulation and poor coverage of `common_amounts`.
/// An empty wallet scores 0.
pub fn analyze_denomination_health(proofs: &[Proof], common_amounts: &[u64]) -> DenominationHealth {
    if proofs.is_empty() {
        return DenominationHealth {
            score: 0,
            denomination_counts: BTreeMap::new(),
            average_proof_size: 0.0,
            exact_payable_amounts: Vec::new(),
            recommendations: vec![
                "Wallet is empty; mint or receive proofs before sending payments".to_string(),
            ],
        };
    }

    let total_balance = proofs_total(proofs);
    let mut denomination_counts: BTreeMap<u64, usize> = BTreeMap::new();
    for proof in proofs {
        *denomination_counts.entry(proof.amount).or_insert(0) += 1;
    }
    let average_proof_size = total_balance as f64 / proofs.len() as f64;

    let reachable_common: Vec<u64> = common_amounts
        .iter()
        .copied()
        .filter(|amount| *amount <= total_balance)
        .collect();
    let payable = batch_check_exact_payments(proofs, &reachable_common);
    let exact_payable_amounts: Vec<u64> = reachable_common
        .iter()
        .zip(payable.iter())
        .filter(|(_, ok)| **ok)
        .map(|(amount, _)| *amount)
        .collect();
    let unpayable_common = reachable_common.len() - exact_payable_amounts.len();

    let mut score: i32 = 100;
    let mut recommendations = Vec::new();

    if denomination_counts.len() == 1 && proofs.len() > 3 {
        score -= 15;
        recommendations.push(format!(
            "All {} proofs share one denomination; swap for a mixed set to enable exact payments",
            proofs.len()
        ));
    }

    let has_large_proof = proofs.iter().any(|p| p.amount > LARGE_PROOF_THRESHOLD);
    let largest = proofs.iter().map(|p| p.amount).max().unwrap_or(0);
    if has_large_proof && total_balance > largest {
        score -= 10;
        recommendations.push(
            "A large proof is held alongside other balance; break it into smaller denominations"
                .to_string(),
        );
    }

    let tiny_count = proofs
        .iter()
        .filter(|p| p.amount <= TINY_PROOF_THRESHOLD)
        .count();
    if proofs.len() > 10 && tiny_count * 2 > proofs.len() {
        score -= 10;
        recommendations.push(format!(
            "{tiny_count} of {} proofs are dust-sized; defragment to consolidate them",
            proofs.len()
        ));
    }

    if unpayable_common > 3 {
        score -= 5;
        recommendations.push(format!(
            "{unpayable_common} common amounts cannot be paid exactly; swap for denominations that cover them"
        ));
    }

    DenominationHealth {
        score: score.clamp(0, 100) as u8,
        denomination_counts,
        average_proof_size,
        exact_payable_amounts,
        recommendations,
    }
}

/// Greedy decomposition of `balance` into the canonical denomination ladder
///
/// Returns a map of denomination -> count; empty for a zero balance.
pub fn suggest_denominations(balance: u64) -> BTreeMap<u64, u64> {
    let mut remaining = balance;
    let mut suggestion = BTreeMap::new();
    for denomination in DENOMINATION_LADDER {
        let count = remaining / denomination;
        if count > 0 {
            suggestion.insert(denomination, count);
            remaining -= count * denomination;
        }
    }
    suggestion
}

/// Check each amount in `amounts` for exact payability
///
/// Amounts above the total balance short-circuit to `false` without running
/// the subset search. Results are aligned with the input order.
pub fn batch_check_exact_payments(proofs: &[Proof], amounts: &[u64]) -> Vec<bool> {
    let total_balance = proofs_total(proofs);
    amounts
        .iter()
        .map(|amount| {
            if *amount == 0 || *amount > total_balance {
                false
            } else {
                find_exact_subset(proofs, *amount).is_some()
            }
        })
        .collect()
}
