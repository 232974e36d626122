//! Error types for ecash wallet operations
//!
//! All fallible wallet operations return [`WalletResult`]. Errors carry the
//! diagnostic context needed to act on them (requested amount, available
//! balance, held denominations) and can produce an actionable suggestion via
//! [`WalletError::suggestion`].

use thiserror::Error;

/// Result type alias used throughout the crate
pub type WalletResult<T> = Result<T, WalletError>;

/// Errors produced by wallet, ledger and mint-facing operations
#[derive(Debug, Clone, Error)]
pub enum WalletError {
    /// The requested amount is zero or otherwise unusable
    #[error("Invalid amount: {requested}")]
    InvalidAmount { requested: u64 },

    /// The wallet does not hold enough value for the request
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    /// The selection strategy could not produce a proof subset despite
    /// sufficient balance
    #[error(
        "Proof selection failed for amount {requested} (balance {available}, {proof_count} proofs held)"
    )]
    SelectionFailed {
        requested: u64,
        available: u64,
        proof_count: usize,
        /// Distinct denominations held, ascending
        denominations: Vec<u64>,
    },

    /// A received token was issued by a different mint than this wallet uses
    #[error("Token mint '{actual}' does not match wallet mint '{expected}'")]
    MintMismatch { expected: String, actual: String },

    /// A received token contains no proofs
    #[error("Token contains no proofs")]
    EmptyToken,

    /// The wallet has not loaded its proofs from storage yet
    #[error("Wallet is not loaded")]
    WalletNotLoaded,

    /// A storage backend operation failed
    #[error("Storage error: {0}")]
    StorageError(String),

    /// A mint operation failed (quote, minting, connectivity, proof state)
    #[error("Mint error: {0}")]
    MintError(String),

    /// A mint swap failed; wallet state was left untouched
    #[error("Swap failed: {0}")]
    SwapFailed(String),

    /// A token string could not be encoded or decoded
    #[error("Token encoding error: {0}")]
    TokenEncoding(String),
}

impl WalletError {
    /// Stable machine-readable kind for logging and event payloads
    pub fn kind(&self) -> &'static str {
        match self {
            WalletError::InvalidAmount { .. } => "INVALID_AMOUNT",
            WalletError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            WalletError::SelectionFailed { .. } => "SELECTION_FAILED",
            WalletError::MintMismatch { .. } => "MINT_MISMATCH",
            WalletError::EmptyToken => "EMPTY_TOKEN",
            WalletError::WalletNotLoaded => "WALLET_NOT_LOADED",
            WalletError::StorageError(_) => "STORAGE_ERROR",
            WalletError::MintError(_) => "MINT_ERROR",
            WalletError::SwapFailed(_) => "SWAP_FAILED",
            WalletError::TokenEncoding(_) => "TOKEN_ENCODING",
        }
    }

    /// Actionable suggestion for resolving this error
    pub fn suggestion(&self) -> String {
        match self {
            WalletError::InvalidAmount { .. } => {
                "Use a positive amount greater than zero".to_string()
            }
            WalletError::InsufficientBalance {
                requested,
                available,
            } => format!(
                "Receive or mint at least {} more units before retrying",
                requested.saturating_sub(*available)
            ),
            WalletError::SelectionFailed { denominations, .. } => format!(
                "Held denominations {denominations:?} cannot satisfy this amount with the configured strategy; try defragmenting the wallet or a different strategy"
            ),
            WalletError::MintMismatch { expected, .. } => format!(
                "Redeem this token with a wallet configured for its mint, or configure this wallet for '{expected}'"
            ),
            WalletError::EmptyToken => {
                "Ask the sender for a token that contains proofs".to_string()
            }
            WalletError::WalletNotLoaded => {
                "Call load() before performing wallet operations".to_string()
            }
            WalletError::StorageError(_) => {
                "Check the storage backend and retry the operation".to_string()
            }
            WalletError::MintError(_) => {
                "Verify the mint is reachable and retry the operation".to_string()
            }
            WalletError::SwapFailed(_) => {
                "The wallet state is unchanged; retry the swap when the mint recovers".to_string()
            }
            WalletError::TokenEncoding(_) => {
                "Verify the token string was copied completely and without modification".to_string()
            }
        }
    }
}
