//! Storage adapter trait for wallet proof persistence
//!
//! The wallet persists its full proof set through this contract after every
//! mutation. The design assumes a single writer per backend: running two
//! wallet instances over the same backend concurrently is unsupported.

use async_trait::async_trait;

use crate::data_structures::Proof;
use crate::errors::WalletResult;

/// Trait for proof storage backends
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Load the persisted proof set
    async fn load(&self) -> WalletResult<Vec<Proof>>;

    /// Persist the full proof set, replacing whatever was stored before
    async fn save(&self, proofs: &[Proof]) -> WalletResult<()>;

    /// Remove all persisted proofs
    async fn clear(&self) -> WalletResult<()>;
}
