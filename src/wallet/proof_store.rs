//! In-memory proof collection
//!
//! [`ProofStore`] holds the wallet's current proof set. The balance is
//! always derived by summing, never cached, so there is no invalidation
//! surface. Secrets are unique within a store; duplicate insertions and
//! zero-denomination proofs are rejected.

use std::collections::HashSet;

use crate::data_structures::Proof;
use crate::errors::{WalletError, WalletResult};

/// The current set of proofs held by one wallet instance
#[derive(Debug, Clone, Default)]
pub struct ProofStore {
    proofs: Vec<Proof>,
}

impl ProofStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a proof set, rejecting duplicates and zero amounts
    pub fn from_proofs(proofs: Vec<Proof>) -> WalletResult<Self> {
        let mut store = Self::new();
        store.add(proofs)?;
        Ok(store)
    }

    /// Add proofs to the store
    ///
    /// Fails without modifying the store if any proof has a zero amount or
    /// a secret already present (in the store or within `proofs` itself).
    pub fn add(&mut self, proofs: Vec<Proof>) -> WalletResult<()> {
        let mut seen: HashSet<&str> = self.proofs.iter().map(|p| p.secret.as_str()).collect();
        for proof in &proofs {
            if proof.amount == 0 {
                return Err(WalletError::InvalidAmount { requested: 0 });
            }
            if !seen.insert(proof.secret.as_str()) {
                return Err(WalletError::StorageError(format!(
                    "duplicate proof secret {}",
                    proof.secret
                )));
            }
        }
        self.proofs.extend(proofs);
        Ok(())
    }

    /// Remove and return the proofs whose secrets appear in `secrets`
    pub fn remove_secrets(&mut self, secrets: &HashSet<String>) -> Vec<Proof> {
        let mut removed = Vec::new();
        self.proofs.retain(|proof| {
            if secrets.contains(&proof.secret) {
                removed.push(proof.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Replace the full proof set
    pub fn replace_all(&mut self, proofs: Vec<Proof>) {
        self.proofs = proofs;
    }

    /// Remove every proof
    pub fn clear(&mut self) {
        self.proofs.clear();
    }

    /// Derived balance: the sum of all held denominations
    pub fn balance(&self) -> u64 {
        self.proofs.iter().map(|p| p.amount).sum()
    }

    /// Defensive copy of the held proofs
    pub fn snapshot(&self) -> Vec<Proof> {
        self.proofs.clone()
    }

    pub fn len(&self) -> usize {
        self.proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proofs.is_empty()
    }

    pub fn contains_secret(&self, secret: &str) -> bool {
        self.proofs.iter().any(|p| p.secret == secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proof(amount: u64, secret: &str) -> Proof {
        Proof::new("ks1", amount, secret, "sig")
    }

    #[test]
    fn test_balance_is_derived() {
        let mut store = ProofStore::new();
        assert_eq!(store.balance(), 0);
        store.add(vec![proof(4, "a"), proof(2, "b")]).unwrap();
        assert_eq!(store.balance(), 6);
        store.clear();
        assert_eq!(store.balance(), 0);
    }

    #[test]
    fn test_duplicate_secret_rejected_atomically() {
        let mut store = ProofStore::from_proofs(vec![proof(4, "a")]).unwrap();
        let result = store.add(vec![proof(2, "b"), proof(1, "a")]);
        assert!(result.is_err());
        // The non-duplicate proof was not added either.
        assert_eq!(store.len(), 1);
        assert!(!store.contains_secret("b"));
    }

    #[test]
    fn test_duplicate_within_batch_rejected() {
        let mut store = ProofStore::new();
        assert!(store.add(vec![proof(2, "x"), proof(4, "x")]).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut store = ProofStore::new();
        assert!(store.add(vec![proof(0, "a")]).is_err());
    }

    #[test]
    fn test_remove_secrets() {
        let mut store =
            ProofStore::from_proofs(vec![proof(1, "a"), proof(2, "b"), proof(4, "c")]).unwrap();
        let removed = store.remove_secrets(&HashSet::from(["a".to_string(), "c".to_string()]));
        assert_eq!(removed.len(), 2);
        assert_eq!(store.balance(), 2);
    }

    #[test]
    fn test_snapshot_is_defensive() {
        let mut store = ProofStore::from_proofs(vec![proof(1, "a")]).unwrap();
        let mut snapshot = store.snapshot();
        snapshot.push(proof(8, "z"));
        assert_eq!(store.len(), 1);
        store.add(vec![proof(2, "b")]).unwrap();
        assert_eq!(snapshot.len(), 2);
    }
}
