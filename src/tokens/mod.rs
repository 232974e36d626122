//! Token text encoding
//!
//! Tokens travel between wallets as a single copyable string. The codec is a
//! seam: [`TokenCodec`] abstracts the wire format so alternative encodings
//! can be swapped in, and [`Bs58TokenCodec`] provides the default format of
//! a version prefix over Base58-encoded JSON.

use crate::data_structures::Token;
use crate::errors::{WalletError, WalletResult};

/// Version prefix of the default token format
const TOKEN_PREFIX: &str = "ecashA";

/// Encoding seam between [`Token`] values and their transferable text form
pub trait TokenCodec: Send + Sync {
    /// Encode a token into its transferable string form
    fn encode(&self, token: &Token) -> WalletResult<String>;

    /// Decode a transferable string back into a token
    fn decode(&self, raw: &str) -> WalletResult<Token>;
}

/// Default codec: `"ecashA"` + Base58(JSON)
#[derive(Debug, Default, Clone)]
pub struct Bs58TokenCodec;

impl Bs58TokenCodec {
    pub fn new() -> Self {
        Self
    }
}

impl TokenCodec for Bs58TokenCodec {
    fn encode(&self, token: &Token) -> WalletResult<String> {
        let json = serde_json::to_vec(token)
            .map_err(|e| WalletError::TokenEncoding(format!("serialization failed: {e}")))?;
        Ok(format!("{TOKEN_PREFIX}{}", bs58::encode(json).into_string()))
    }

    fn decode(&self, raw: &str) -> WalletResult<Token> {
        let trimmed = raw.trim();
        let payload = trimmed.strip_prefix(TOKEN_PREFIX).ok_or_else(|| {
            WalletError::TokenEncoding(format!(
                "missing '{TOKEN_PREFIX}' prefix in token string"
            ))
        })?;
        let json = bs58::decode(payload)
            .into_vec()
            .map_err(|e| WalletError::TokenEncoding(format!("invalid base58 payload: {e}")))?;
        serde_json::from_slice(&json)
            .map_err(|e| WalletError::TokenEncoding(format!("invalid token payload: {e}")))
    }
}
