//! Ecash wallet core
//!
//! This crate provides the mint-agnostic core of a Cashu-style ecash wallet:
//! proof management with strategy-driven selection, a swap-based token
//! lifecycle, denomination analysis, health scoring, an append-only
//! transaction ledger and an async event system.
//!
//! ## Architecture
//!
//! The [`wallet::Wallet`] orchestrates everything. Its collaborators sit
//! behind traits so callers choose the concrete pieces:
//!
//! - [`storage::StorageAdapter`]: where the proof set persists
//! - [`mint::MintConnector`]: the Cashu protocol operations (blind signing,
//!   swaps, quotes) and their transport
//! - [`tokens::TokenCodec`]: the transferable token wire format
//! - [`events::EventListener`]: observers of balance, proof and error events
//!
//! Every mutating wallet operation is serialized through a FIFO mutex,
//! persists before committing in memory, appends to the ledger and emits
//! events. Reads work on snapshots and never block behind mutations.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ecash_wallet_libs::mint::MockMintConnector;
//! use ecash_wallet_libs::storage::MemoryStorage;
//! use ecash_wallet_libs::wallet::WalletBuilder;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let wallet = WalletBuilder::new()
//!     .with_mint_url("https://mint.example.com")
//!     .with_storage(Arc::new(MemoryStorage::new()))
//!     .with_connector(Arc::new(MockMintConnector::new()))
//!     .build_async()
//!     .await?;
//!
//! let token = wallet.create_token(21, Some("coffee".to_string())).await?;
//! println!("send this: {token}");
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod concurrency;
pub mod data_structures;
pub mod errors;
pub mod events;
pub mod health;
pub mod mint;
pub mod selection;
pub mod storage;
pub mod tokens;
pub mod transactions;
pub mod wallet;

pub use data_structures::{Proof, Token, TransactionKind, TransactionRecord, TransactionStatus};
pub use errors::{WalletError, WalletResult};
pub use selection::SelectionStrategy;
pub use wallet::{Wallet, WalletBuilder};
