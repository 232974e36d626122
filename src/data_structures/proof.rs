//! Ecash proof data structure
//!
//! A [`Proof`] is a single bearer credential of a fixed denomination, blind
//! signed by a mint under one of its keysets. The cryptographic material is
//! opaque to this crate: the `secret` and `signature` fields are carried as
//! strings and only ever compared or forwarded to a mint collaborator.

use serde::{Deserialize, Serialize};

/// A single ecash bearer credential of a fixed denomination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Identifier of the mint keyset this proof was signed under
    #[serde(rename = "id")]
    pub keyset_id: String,
    /// Denomination in the wallet unit; always positive, conventionally a
    /// power of two
    pub amount: u64,
    /// Unique opaque secret; no two proofs in a store may share one
    pub secret: String,
    /// The mint's blind signature over the secret
    #[serde(rename = "C")]
    pub signature: String,
}

impl Proof {
    /// Create a new proof
    pub fn new(
        keyset_id: impl Into<String>,
        amount: u64,
        secret: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            keyset_id: keyset_id.into(),
            amount,
            secret: secret.into(),
            signature: signature.into(),
        }
    }
}

/// Sum of the denominations of a proof slice
pub fn proofs_total(proofs: &[Proof]) -> u64 {
    proofs.iter().map(|p| p.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proofs_total() {
        let proofs = vec![
            Proof::new("ks1", 1, "s1", "c1"),
            Proof::new("ks1", 8, "s2", "c2"),
        ];
        assert_eq!(proofs_total(&proofs), 9);
        assert_eq!(proofs_total(&[]), 0);
    }

    #[test]
    fn test_proof_serde_field_names() {
        let proof = Proof::new("ks1", 4, "s1", "c1");
        let json = serde_json::to_string(&proof).unwrap();
        assert!(json.contains("\"id\":\"ks1\""));
        assert!(json.contains("\"C\":\"c1\""));
        let back: Proof = serde_json::from_str(&json).unwrap();
        assert_eq!(back, proof);
    }
}
