//! In-memory storage backend
//!
//! Keeps the persisted proof set in process memory. Used as the default
//! backend for ephemeral wallets and as the deterministic test double:
//! failure modes can be armed to exercise error paths, and a save counter
//! lets tests verify that every mutation was persisted.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::data_structures::Proof;
use crate::errors::{WalletError, WalletResult};
use crate::storage::StorageAdapter;

/// Simulated failure modes for testing error conditions
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageFailures {
    /// Fail the next load call
    pub fail_load: bool,
    /// Fail every save call
    pub fail_save: bool,
    /// Fail every clear call
    pub fail_clear: bool,
}

/// Proof storage held in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    proofs: Arc<Mutex<Vec<Proof>>>,
    failures: Arc<Mutex<MemoryStorageFailures>>,
    save_calls: Arc<Mutex<usize>>,
}

impl MemoryStorage {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-seeded with proofs
    pub fn with_proofs(proofs: Vec<Proof>) -> Self {
        Self {
            proofs: Arc::new(Mutex::new(proofs)),
            ..Self::default()
        }
    }

    /// Arm failure modes for subsequent operations
    pub fn set_failures(&self, failures: MemoryStorageFailures) {
        *self.failures.lock().unwrap() = failures;
    }

    /// Number of successful save calls so far
    pub fn save_calls(&self) -> usize {
        *self.save_calls.lock().unwrap()
    }

    /// Snapshot of the currently persisted proofs
    pub fn stored(&self) -> Vec<Proof> {
        self.proofs.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn load(&self) -> WalletResult<Vec<Proof>> {
        let mut failures = self.failures.lock().unwrap();
        if failures.fail_load {
            failures.fail_load = false;
            return Err(WalletError::StorageError(
                "simulated load failure".to_string(),
            ));
        }
        drop(failures);
        Ok(self.proofs.lock().unwrap().clone())
    }

    async fn save(&self, proofs: &[Proof]) -> WalletResult<()> {
        if self.failures.lock().unwrap().fail_save {
            return Err(WalletError::StorageError(
                "simulated save failure".to_string(),
            ));
        }
        *self.proofs.lock().unwrap() = proofs.to_vec();
        *self.save_calls.lock().unwrap() += 1;
        Ok(())
    }

    async fn clear(&self) -> WalletResult<()> {
        if self.failures.lock().unwrap().fail_clear {
            return Err(WalletError::StorageError(
                "simulated clear failure".to_string(),
            ));
        }
        self.proofs.lock().unwrap().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let storage = MemoryStorage::new();
        let proofs = vec![Proof::new("ks1", 4, "s1", "c1")];
        storage.save(&proofs).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), proofs);
        assert_eq!(storage.save_calls(), 1);

        storage.clear().await.unwrap();
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let storage = MemoryStorage::with_proofs(vec![Proof::new("ks1", 2, "s1", "c1")]);
        storage.set_failures(MemoryStorageFailures {
            fail_save: true,
            ..Default::default()
        });

        let result = storage.save(&[]).await;
        assert!(matches!(result, Err(WalletError::StorageError(_))));
        // The stored set is untouched by the failed save.
        assert_eq!(storage.stored().len(), 1);
    }

    #[tokio::test]
    async fn test_load_failure_is_one_shot() {
        let storage = MemoryStorage::new();
        storage.set_failures(MemoryStorageFailures {
            fail_load: true,
            ..Default::default()
        });
        assert!(storage.load().await.is_err());
        assert!(storage.load().await.is_ok());
    }
}
