//! Fluent wallet construction
//!
//! A [`Wallet`] needs a mint URL plus its storage and mint collaborators;
//! everything else has sensible defaults. The builder validates the
//! configuration up front, registers any event listeners and (unless
//! disabled) loads the proof set from storage before handing the wallet
//! back.

use std::sync::Arc;

use thiserror::Error;

use crate::errors::WalletError;
use crate::events::{EventDispatchError, EventListener};
use crate::mint::MintConnector;
use crate::selection::SelectionStrategy;
use crate::storage::StorageAdapter;
use crate::tokens::{Bs58TokenCodec, TokenCodec};
use crate::transactions::TransactionStore;
use crate::wallet::Wallet;

/// Errors raised while building a wallet
#[derive(Debug, Error)]
pub enum WalletBuildError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Event listener registration failed: {0}")]
    Listener(#[from] EventDispatchError),
    #[error("Initial load from storage failed: {0}")]
    Load(#[from] WalletError),
}

/// Fluent builder for [`Wallet`]
#[derive(Default)]
pub struct WalletBuilder {
    mint_url: Option<String>,
    unit: Option<String>,
    strategy: Option<SelectionStrategy>,
    storage: Option<Arc<dyn StorageAdapter>>,
    connector: Option<Arc<dyn MintConnector>>,
    codec: Option<Arc<dyn TokenCodec>>,
    ledger: Option<Arc<TransactionStore>>,
    listeners: Vec<Box<dyn EventListener>>,
    skip_load: bool,
}

impl WalletBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mint this wallet is bound to (required)
    pub fn with_mint_url(mut self, mint_url: impl Into<String>) -> Self {
        self.mint_url = Some(mint_url.into());
        self
    }

    /// Currency unit; defaults to `"sat"`
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Proof selection strategy; defaults to [`SelectionStrategy::SmallestFirst`]
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Persistence backend (required)
    pub fn with_storage(mut self, storage: Arc<dyn StorageAdapter>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Mint protocol implementation (required)
    pub fn with_connector(mut self, connector: Arc<dyn MintConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Token wire format; defaults to [`Bs58TokenCodec`]
    pub fn with_codec(mut self, codec: Arc<dyn TokenCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Transaction ledger; defaults to a fresh empty store
    pub fn with_ledger(mut self, ledger: Arc<TransactionStore>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Register an event listener on the built wallet
    pub fn with_event_listener(mut self, listener: Box<dyn EventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Skip the initial load from storage
    ///
    /// The wallet then rejects operations until [`Wallet::load`] is called.
    pub fn skip_initial_load(mut self) -> Self {
        self.skip_load = true;
        self
    }

    /// Validate the configuration and construct the wallet
    pub async fn build_async(self) -> Result<Wallet, WalletBuildError> {
        let mint_url = self
            .mint_url
            .ok_or(WalletBuildError::MissingParameter("mint_url"))?;
        let storage = self
            .storage
            .ok_or(WalletBuildError::MissingParameter("storage"))?;
        let connector = self
            .connector
            .ok_or(WalletBuildError::MissingParameter("connector"))?;

        let wallet = Wallet::new(
            mint_url,
            self.unit.unwrap_or_else(|| "sat".to_string()),
            self.strategy.unwrap_or_default(),
            storage,
            connector,
            self.codec.unwrap_or_else(|| Arc::new(Bs58TokenCodec::new())),
            self.ledger.unwrap_or_default(),
        );

        for listener in self.listeners {
            wallet.add_event_listener(listener).await?;
        }

        if !self.skip_load {
            wallet.load().await?;
        }
        Ok(wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mint::MockMintConnector;
    use crate::storage::MemoryStorage;

    fn mock_parts() -> (Arc<MemoryStorage>, Arc<MockMintConnector>) {
        (
            Arc::new(MemoryStorage::new()),
            Arc::new(MockMintConnector::new()),
        )
    }

    #[tokio::test]
    async fn test_build_with_defaults() {
        let (storage, connector) = mock_parts();
        let wallet = WalletBuilder::new()
            .with_mint_url("https://mint.example.com")
            .with_storage(storage)
            .with_connector(connector)
            .build_async()
            .await
            .unwrap();
        assert!(wallet.is_loaded());
        assert_eq!(wallet.unit(), "sat");
        assert_eq!(wallet.strategy(), SelectionStrategy::SmallestFirst);
        assert_eq!(wallet.balance(), 0);
    }

    #[tokio::test]
    async fn test_missing_mint_url_fails() {
        let (storage, connector) = mock_parts();
        let result = WalletBuilder::new()
            .with_storage(storage)
            .with_connector(connector)
            .build_async()
            .await;
        assert!(matches!(
            result,
            Err(WalletBuildError::MissingParameter("mint_url"))
        ));
    }

    #[tokio::test]
    async fn test_missing_storage_fails() {
        let (_, connector) = mock_parts();
        let result = WalletBuilder::new()
            .with_mint_url("https://mint.example.com")
            .with_connector(connector)
            .build_async()
            .await;
        assert!(matches!(
            result,
            Err(WalletBuildError::MissingParameter("storage"))
        ));
    }

    #[tokio::test]
    async fn test_skip_initial_load_leaves_wallet_unloaded() {
        let (storage, connector) = mock_parts();
        let wallet = WalletBuilder::new()
            .with_mint_url("https://mint.example.com")
            .with_storage(storage)
            .with_connector(connector)
            .skip_initial_load()
            .build_async()
            .await
            .unwrap();
        assert!(!wallet.is_loaded());
        assert!(wallet.create_token(1, None).await.is_err());
    }

    #[tokio::test]
    async fn test_preloaded_storage_is_picked_up() {
        let connector = Arc::new(MockMintConnector::new());
        let storage = Arc::new(MemoryStorage::with_proofs(connector.issue(21)));
        let wallet = WalletBuilder::new()
            .with_mint_url("https://mint.example.com")
            .with_storage(storage)
            .with_connector(connector)
            .build_async()
            .await
            .unwrap();
        assert_eq!(wallet.balance(), 21);
    }
}
