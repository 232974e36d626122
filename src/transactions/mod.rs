//! Append-only transaction ledger
//!
//! [`TransactionStore`] records wallet operations independently of wallet
//! state: clearing or reloading the proof set never touches the ledger.
//! Records are append-only; after insertion only status, memo and metadata
//! may change. Queries filter by kind, status and inclusive date range with
//! pagination, and summaries aggregate completed records only.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::RngCore;

use crate::data_structures::{TransactionKind, TransactionRecord, TransactionStatus};
use crate::errors::{WalletError, WalletResult};

/// A transaction about to be appended to the ledger
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    /// Signed amount; negative values are outflows
    pub amount: i64,
    /// Defaults to [`TransactionStatus::Completed`] when unset
    pub status: Option<TransactionStatus>,
    pub memo: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl NewTransaction {
    pub fn new(kind: TransactionKind, amount: i64) -> Self {
        Self {
            kind,
            amount,
            status: None,
            memo: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Mutable fields of an appended record
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub status: Option<TransactionStatus>,
    pub memo: Option<String>,
    /// Entries merged into the record's metadata
    pub metadata: Option<HashMap<String, String>>,
}

impl TransactionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Sort order for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Query filters for retrieving ledger records
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    /// Match any of these kinds; `None` matches all
    pub kinds: Option<Vec<TransactionKind>>,
    pub status: Option<TransactionStatus>,
    /// Inclusive lower timestamp bound
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper timestamp bound
    pub until: Option<DateTime<Utc>>,
    /// Sort by timestamp; newest first by default
    pub order: SortOrder,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl TransactionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kinds(mut self, kinds: Vec<TransactionKind>) -> Self {
        self.kinds = Some(kinds);
        self
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn ascending(mut self) -> Self {
        self.order = SortOrder::Ascending;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    fn matches(&self, record: &TransactionRecord) -> bool {
        if let Some(kinds) = &self.kinds {
            if !kinds.contains(&record.kind) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(since) = self.since {
            if record.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if record.timestamp > until {
                return false;
            }
        }
        true
    }
}

/// A page of query results
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub records: Vec<TransactionRecord>,
    /// Total records matching the filters, before pagination
    pub total_matched: usize,
    /// Whether records beyond this page matched the filters
    pub has_more: bool,
}

/// Signed-amount aggregation over completed records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionSummary {
    /// Absolute sum of completed outflows
    pub total_sent: u64,
    /// Sum of completed inflows
    pub total_received: u64,
    /// `total_received - total_sent`
    pub net_change: i64,
    /// Number of completed records aggregated
    pub completed_count: usize,
}

/// Append-only in-memory ledger of wallet transactions
#[derive(Debug, Default)]
pub struct TransactionStore {
    records: Mutex<Vec<TransactionRecord>>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, assigning a generated id and the current timestamp
    ///
    /// Status defaults to [`TransactionStatus::Completed`] when the entry
    /// does not set one. Returns the appended record.
    pub fn add(&self, entry: NewTransaction) -> TransactionRecord {
        let mut id = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut id);
        let record = TransactionRecord {
            id: hex::encode(id),
            kind: entry.kind,
            amount: entry.amount,
            timestamp: Utc::now(),
            status: entry.status.unwrap_or(TransactionStatus::Completed),
            memo: entry.memo,
            metadata: entry.metadata,
        };
        self.records.lock().unwrap().push(record.clone());
        record
    }

    /// Update the mutable fields of an appended record
    ///
    /// Only status, memo and metadata may change; metadata entries are
    /// merged into the existing map. Unknown ids return an error.
    pub fn update(&self, id: &str, update: TransactionUpdate) -> WalletResult<TransactionRecord> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| WalletError::StorageError(format!("unknown transaction id {id}")))?;
        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(memo) = update.memo {
            record.memo = Some(memo);
        }
        if let Some(metadata) = update.metadata {
            record.metadata.extend(metadata);
        }
        Ok(record.clone())
    }

    /// Fetch a record by id
    pub fn get(&self, id: &str) -> Option<TransactionRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    /// Number of records in the ledger
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }

    /// Query records with filtering, sorting and pagination
    pub fn query(&self, query: &TransactionQuery) -> QueryResult {
        let records = self.records.lock().unwrap();
        let mut matched: Vec<TransactionRecord> = records
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();
        drop(records);

        // Stable sort keeps insertion order among equal timestamps.
        match query.order {
            SortOrder::Ascending => matched.sort_by_key(|record| record.timestamp),
            SortOrder::Descending => {
                matched.sort_by_key(|record| std::cmp::Reverse(record.timestamp))
            }
        }

        let total_matched = matched.len();
        let offset = query.offset.unwrap_or(0).min(total_matched);
        let remaining = total_matched - offset;
        let limit = query.limit.unwrap_or(remaining).min(remaining);
        let page: Vec<TransactionRecord> =
            matched.into_iter().skip(offset).take(limit).collect();
        let has_more = offset + page.len() < total_matched;

        QueryResult {
            records: page,
            total_matched,
            has_more,
        }
    }

    /// Aggregate signed amounts over completed records only
    pub fn summary(&self) -> TransactionSummary {
        let records = self.records.lock().unwrap();
        let mut summary = TransactionSummary::default();
        for record in records.iter().filter(|record| record.is_completed()) {
            summary.completed_count += 1;
            if record.amount < 0 {
                summary.total_sent += record.amount.unsigned_abs();
            } else {
                summary.total_received += record.amount as u64;
            }
            summary.net_change += record.amount;
        }
        summary
    }

    /// Serialize the full ledger to JSON with ISO-8601 timestamps
    pub fn serialize(&self) -> WalletResult<String> {
        let records = self.records.lock().unwrap();
        serde_json::to_string(&*records)
            .map_err(|e| WalletError::StorageError(format!("ledger serialization failed: {e}")))
    }

    /// Rebuild a ledger from its serialized form
    pub fn deserialize(raw: &str) -> WalletResult<Self> {
        let records: Vec<TransactionRecord> = serde_json::from_str(raw)
            .map_err(|e| WalletError::StorageError(format!("ledger deserialization failed: {e}")))?;
        Ok(Self {
            records: Mutex::new(records),
        })
    }
}
