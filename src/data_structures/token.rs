//! Transferable token bundle
//!
//! A [`Token`] packages a set of proofs together with the mint they were
//! issued by. Ownership of the contained proofs transfers to whoever decodes
//! and redeems the token, which is why receiving wallets must immediately
//! swap the proofs for freshly signed ones.

use serde::{Deserialize, Serialize};

use super::proof::{proofs_total, Proof};

/// An encoded bundle of proofs plus mint metadata, transferable as a single
/// payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// URL of the issuing mint
    pub mint_url: String,
    /// Currency unit of the contained proofs (e.g. "sat")
    pub unit: String,
    /// The bearer proofs being transferred
    pub proofs: Vec<Proof>,
    /// Optional human-readable note from the sender
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl Token {
    /// Create a token from a set of proofs
    pub fn new(
        mint_url: impl Into<String>,
        unit: impl Into<String>,
        proofs: Vec<Proof>,
        memo: Option<String>,
    ) -> Self {
        Self {
            mint_url: mint_url.into(),
            unit: unit.into(),
            proofs,
            memo,
        }
    }

    /// Total value carried by this token
    pub fn total_amount(&self) -> u64 {
        proofs_total(&self.proofs)
    }

    /// Whether the token carries no proofs
    pub fn is_empty(&self) -> bool {
        self.proofs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_total_amount() {
        let token = Token::new(
            "https://mint.example.com",
            "sat",
            vec![
                Proof::new("ks1", 2, "s1", "c1"),
                Proof::new("ks1", 4, "s2", "c2"),
            ],
            Some("lunch".to_string()),
        );
        assert_eq!(token.total_amount(), 6);
        assert!(!token.is_empty());
    }

    #[test]
    fn test_memo_omitted_when_absent() {
        let token = Token::new("https://mint.example.com", "sat", vec![], None);
        let json = serde_json::to_string(&token).unwrap();
        assert!(!json.contains("memo"));
    }
}
