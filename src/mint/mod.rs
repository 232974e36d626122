//! Mint collaborator contract
//!
//! The actual Cashu cryptography (blind signing, DLEQ verification, key
//! derivation) and its network transport live behind [`MintConnector`]. This
//! crate only decides *when* to call the mint and what to do with the
//! results; retry policy belongs to the connector's implementor or the
//! caller above it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::data_structures::{Proof, Token};
use crate::errors::WalletResult;

pub mod mocks;

pub use mocks::{MockMintConnector, MockMintFailures};

/// Information reported by a reachable mint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintInfo {
    /// Mint display name, when advertised
    pub name: Option<String>,
    /// Identifiers of the keysets the mint currently recognizes
    pub keyset_ids: Vec<String>,
}

/// Result of swapping proofs with the mint
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    /// Freshly signed proofs summing exactly to the requested amount
    pub send: Vec<Proof>,
    /// Change proofs covering the remainder of the input value
    pub keep: Vec<Proof>,
}

/// Partition of proofs by their state at the mint
#[derive(Debug, Clone, Default)]
pub struct ProofStates {
    pub valid: Vec<Proof>,
    pub spent: Vec<Proof>,
}

/// Payment state of a mint quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MintQuoteState {
    Unpaid,
    Paid,
    Issued,
}

/// A quote for minting new proofs against an external payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintQuote {
    pub id: String,
    pub amount: u64,
    /// The payment request the caller must settle (e.g. a Lightning invoice)
    pub request: String,
    pub state: MintQuoteState,
}

/// Protocol operations performed against a mint
#[async_trait]
pub trait MintConnector: Send + Sync {
    /// Probe the mint and return its advertised info
    async fn ping(&self, mint_url: &str) -> WalletResult<MintInfo>;

    /// Exchange `proofs` for a fresh set split into exactly `amount` to send
    /// and the remainder to keep
    ///
    /// Either fully succeeds or fully fails; the input proofs stay valid
    /// when an error is returned.
    async fn swap(&self, amount: u64, proofs: &[Proof]) -> WalletResult<SwapOutcome>;

    /// Redeem a received token for freshly signed wallet-owned proofs
    async fn receive(&self, token: &Token) -> WalletResult<Vec<Proof>>;

    /// Request a quote for minting `amount` new units
    async fn create_mint_quote(&self, amount: u64) -> WalletResult<MintQuote>;

    /// Check the payment state of an existing quote
    async fn check_mint_quote(&self, quote_id: &str) -> WalletResult<MintQuoteState>;

    /// Mint proofs against a paid quote
    async fn mint_proofs(&self, quote_id: &str, amount: u64) -> WalletResult<Vec<Proof>>;

    /// Partition `proofs` into valid and spent according to the mint
    async fn check_proof_state(&self, mint_url: &str, proofs: &[Proof])
        -> WalletResult<ProofStates>;
}
