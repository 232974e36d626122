//! Transaction ledger records
//!
//! A [`TransactionRecord`] describes one wallet-affecting operation. Records
//! are append-only: once added to the ledger only their status, memo and
//! metadata may change. Amounts are signed, with negative values denoting
//! outflows.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of wallet operation a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Outgoing token creation
    Send,
    /// Incoming token redemption
    Receive,
    /// Proofs minted against a paid quote
    Mint,
    /// Proof set exchanged with the mint (defragmentation, reissue)
    Swap,
}

/// Lifecycle status of a transaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// A single entry in the append-only transaction ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Generated unique identifier
    pub id: String,
    pub kind: TransactionKind,
    /// Signed amount; negative values are outflows
    pub amount: i64,
    /// Assigned when the record is appended; ISO-8601 in serialized form
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl TransactionRecord {
    /// Whether this record counts toward balance summaries
    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}
