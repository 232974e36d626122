//! Ecash wallet: the token lifecycle orchestrator
//!
//! [`Wallet`] ties the proof store, selection strategy, mint connector,
//! storage adapter and event dispatcher together. Every mutating operation
//! runs inside the wallet's FIFO mutex, persists the full proof set through
//! the storage adapter, appends a ledger record and emits balance/proof
//! events. External calls follow a strict commit discipline: the in-memory
//! proof set is only replaced after the mint call and the persistence write
//! both succeeded, so a failure at any point leaves the wallet exactly as it
//! was.
//!
//! Read-only accessors (`balance`, `proofs`, `preview_token`, analysis)
//! operate on an immutable snapshot taken at call time and never take the
//! lock.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use crate::concurrency::FifoMutex;
use crate::data_structures::{proofs_total, Proof, Token, TransactionKind, TransactionStatus};
use crate::errors::{WalletError, WalletResult};
use crate::events::{EventDispatchError, EventDispatcher, EventListener, WalletEvent};
use crate::mint::{MintConnector, MintQuoteState};
use crate::selection::SelectionStrategy;
use crate::storage::StorageAdapter;
use crate::tokens::TokenCodec;
use crate::transactions::{NewTransaction, TransactionStore};

pub mod builder;
pub mod proof_store;

pub use builder::{WalletBuildError, WalletBuilder};
pub use proof_store::ProofStore;

/// Read-only preview of what creating a token would do
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPreview {
    pub amount: u64,
    pub selected_total: u64,
    pub change_amount: u64,
    /// Whether committing would require a mint swap to make change
    pub requires_swap: bool,
    /// Number of proofs the selection would hand over
    pub proof_count: usize,
}

/// Outcome of a defragmentation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefragStats {
    pub proofs_before: usize,
    pub proofs_after: usize,
    pub balance: u64,
}

/// An ecash wallet bound to a single mint
pub struct Wallet {
    mint_url: String,
    unit: String,
    strategy: SelectionStrategy,
    store: StdMutex<ProofStore>,
    lock: FifoMutex,
    storage: Arc<dyn StorageAdapter>,
    connector: Arc<dyn MintConnector>,
    codec: Arc<dyn TokenCodec>,
    ledger: Arc<TransactionStore>,
    events: AsyncMutex<EventDispatcher>,
    loaded: AtomicBool,
}

impl Wallet {
    pub(crate) fn new(
        mint_url: String,
        unit: String,
        strategy: SelectionStrategy,
        storage: Arc<dyn StorageAdapter>,
        connector: Arc<dyn MintConnector>,
        codec: Arc<dyn TokenCodec>,
        ledger: Arc<TransactionStore>,
    ) -> Self {
        Self {
            mint_url,
            unit,
            strategy,
            store: StdMutex::new(ProofStore::new()),
            lock: FifoMutex::new(),
            storage,
            connector,
            codec,
            ledger,
            events: AsyncMutex::new(EventDispatcher::new()),
            loaded: AtomicBool::new(false),
        }
    }

    // === Read-only accessors (lock-free) ===

    /// Derived balance of the current proof set
    pub fn balance(&self) -> u64 {
        self.store.lock().unwrap().balance()
    }

    /// Defensive copy of the current proof set
    pub fn proofs(&self) -> Vec<Proof> {
        self.store.lock().unwrap().snapshot()
    }

    pub fn mint_url(&self) -> &str {
        &self.mint_url
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    /// Whether proofs have been loaded from storage
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// The ledger this wallet appends to
    pub fn ledger(&self) -> &TransactionStore {
        &self.ledger
    }

    /// Preview the outcome of `create_token` without mutating anything
    ///
    /// Pure read: no lock, no network, no state change.
    pub fn preview_token(&self, amount: u64) -> WalletResult<TokenPreview> {
        self.ensure_loaded()?;
        if amount == 0 {
            return Err(WalletError::InvalidAmount { requested: amount });
        }
        let snapshot = self.proofs();
        let balance = proofs_total(&snapshot);
        if balance < amount {
            return Err(WalletError::InsufficientBalance {
                requested: amount,
                available: balance,
            });
        }
        let selected = self
            .strategy
            .select(&snapshot, amount)
            .ok_or_else(|| self.selection_failed(amount, &snapshot))?;
        let selected_total = proofs_total(&selected);
        Ok(TokenPreview {
            amount,
            selected_total,
            change_amount: selected_total - amount,
            requires_swap: selected_total != amount,
            proof_count: selected.len(),
        })
    }

    // === Event system ===

    /// Register an event listener
    pub async fn add_event_listener(
        &self,
        listener: Box<dyn EventListener>,
    ) -> Result<(), EventDispatchError> {
        self.events.lock().await.register(listener)
    }

    /// Remove an event listener by name
    pub async fn remove_event_listener(&self, name: &str) -> bool {
        self.events.lock().await.remove(name)
    }

    /// Number of registered event listeners
    pub async fn event_listener_count(&self) -> usize {
        self.events.lock().await.listener_count()
    }

    // === Mutating operations (serialized by the FIFO mutex) ===

    /// Load the proof set from storage
    ///
    /// Must be called before any other operation; returns the loaded
    /// balance.
    pub async fn load(&self) -> WalletResult<u64> {
        let result = self
            .lock
            .run_exclusive(|| async {
                let proofs = self.storage.load().await?;
                let store = ProofStore::from_proofs(proofs)?;
                let balance = store.balance();
                *self.store.lock().unwrap() = store;
                self.loaded.store(true, Ordering::SeqCst);
                debug!(balance, "wallet loaded from storage");
                self.emit_state_events().await;
                Ok(balance)
            })
            .await;
        self.finish("load", result).await
    }

    /// Create a transferable token worth exactly `amount`
    ///
    /// Selects proofs with the configured strategy. An exact selection is
    /// removed and encoded directly with no mint round trip; an overshooting
    /// selection is swapped at the mint for an exact send set plus change.
    /// Fully succeeds or leaves the wallet untouched.
    pub async fn create_token(
        &self,
        amount: u64,
        memo: Option<String>,
    ) -> WalletResult<String> {
        let result = self
            .lock
            .run_exclusive(|| async { self.create_token_locked(amount, memo).await })
            .await;
        self.finish("create_token", result).await
    }

    async fn create_token_locked(
        &self,
        amount: u64,
        memo: Option<String>,
    ) -> WalletResult<String> {
        self.ensure_loaded()?;
        if amount == 0 {
            return Err(WalletError::InvalidAmount { requested: amount });
        }
        let snapshot = self.proofs();
        let balance = proofs_total(&snapshot);
        if balance < amount {
            return Err(WalletError::InsufficientBalance {
                requested: amount,
                available: balance,
            });
        }
        let selected = self
            .strategy
            .select(&snapshot, amount)
            .ok_or_else(|| self.selection_failed(amount, &snapshot))?;
        let selected_total = proofs_total(&selected);
        let selected_secrets: HashSet<String> =
            selected.iter().map(|p| p.secret.clone()).collect();

        let (send_proofs, keep_proofs) = if selected_total == amount {
            // Exact selection: no mint round trip needed.
            (selected, Vec::new())
        } else {
            debug!(
                amount,
                selected_total,
                change = selected_total - amount,
                "swapping selection at mint to make change"
            );
            match self.connector.swap(amount, &selected).await {
                Ok(outcome) => (outcome.send, outcome.keep),
                Err(error) => {
                    self.ledger.add(
                        NewTransaction::new(TransactionKind::Send, -(amount as i64))
                            .with_status(TransactionStatus::Failed)
                            .with_memo(error.to_string()),
                    );
                    return Err(error);
                }
            }
        };

        // After a swap the fresh proofs are the only valid form of the
        // selected value; if persisting them fails they must not vanish.
        let at_risk: Option<Vec<Proof>> = if selected_total == amount {
            None
        } else {
            let mut fresh = send_proofs.clone();
            fresh.extend(keep_proofs.iter().cloned());
            Some(fresh)
        };

        let token = Token::new(
            self.mint_url.clone(),
            self.unit.clone(),
            send_proofs,
            memo.clone(),
        );
        let encoded = self.codec.encode(&token)?;

        let mut next = ProofStore::from_proofs(
            snapshot
                .into_iter()
                .filter(|p| !selected_secrets.contains(&p.secret))
                .collect(),
        )?;
        next.add(keep_proofs)?;
        if let Err(error) = self.commit(next).await {
            if let Some(fresh) = at_risk {
                self.record_unpersisted_proofs(
                    TransactionKind::Send,
                    -(amount as i64),
                    &fresh,
                    &error,
                );
            }
            return Err(error);
        }

        let mut record = NewTransaction::new(TransactionKind::Send, -(amount as i64));
        if let Some(memo) = memo {
            record = record.with_memo(memo);
        }
        self.ledger.add(record);
        self.emit_state_events().await;
        Ok(encoded)
    }

    /// Redeem a received token into this wallet
    ///
    /// The token's proofs are always swapped at the mint for freshly signed
    /// wallet-owned proofs; skipping that swap would let the issuer replay
    /// the same proofs elsewhere. Returns the received amount.
    pub async fn receive_token(&self, encoded: &str) -> WalletResult<u64> {
        let result = self
            .lock
            .run_exclusive(|| async { self.receive_token_locked(encoded).await })
            .await;
        self.finish("receive_token", result).await
    }

    async fn receive_token_locked(&self, encoded: &str) -> WalletResult<u64> {
        self.ensure_loaded()?;
        let token = self.codec.decode(encoded)?;
        if token.mint_url != self.mint_url {
            return Err(WalletError::MintMismatch {
                expected: self.mint_url.clone(),
                actual: token.mint_url,
            });
        }
        if token.is_empty() {
            return Err(WalletError::EmptyToken);
        }

        let fresh = match self.connector.receive(&token).await {
            Ok(fresh) => fresh,
            Err(error) => {
                self.ledger.add(
                    NewTransaction::new(
                        TransactionKind::Receive,
                        token.total_amount() as i64,
                    )
                    .with_status(TransactionStatus::Failed)
                    .with_memo(error.to_string()),
                );
                return Err(error);
            }
        };
        let amount = proofs_total(&fresh);

        let mut next = self.store.lock().unwrap().clone();
        next.add(fresh.clone())?;
        if let Err(error) = self.commit(next).await {
            self.record_unpersisted_proofs(
                TransactionKind::Receive,
                amount as i64,
                &fresh,
                &error,
            );
            return Err(error);
        }

        let mut record = NewTransaction::new(TransactionKind::Receive, amount as i64);
        if let Some(memo) = token.memo {
            record = record.with_memo(memo);
        }
        self.ledger.add(record);
        self.emit_state_events().await;
        Ok(amount)
    }

    /// Consolidate the whole balance into a denomination-minimal proof set
    ///
    /// No-op on an empty wallet. On swap failure the prior proof set is left
    /// untouched.
    pub async fn defragment(&self) -> WalletResult<DefragStats> {
        let result = self
            .lock
            .run_exclusive(|| async {
                self.ensure_loaded()?;
                let snapshot = self.proofs();
                if snapshot.is_empty() {
                    return Ok(DefragStats::default());
                }
                let balance = proofs_total(&snapshot);
                let proofs_before = snapshot.len();

                let outcome = self.connector.swap(balance, &snapshot).await?;
                let mut replacement = outcome.send;
                replacement.extend(outcome.keep);
                let next = ProofStore::from_proofs(replacement)?;
                let proofs_after = next.len();
                let fresh = next.snapshot();
                if let Err(error) = self.commit(next).await {
                    self.record_unpersisted_proofs(TransactionKind::Swap, 0, &fresh, &error);
                    return Err(error);
                }

                self.ledger.add(
                    NewTransaction::new(TransactionKind::Swap, 0)
                        .with_metadata("proofs_before", proofs_before.to_string())
                        .with_metadata("proofs_after", proofs_after.to_string()),
                );
                self.emit_state_events().await;
                debug!(proofs_before, proofs_after, balance, "wallet defragmented");
                Ok(DefragStats {
                    proofs_before,
                    proofs_after,
                    balance,
                })
            })
            .await;
        self.finish("defragment", result).await
    }

    /// Mint new proofs worth `amount` against a quote
    ///
    /// Creates a quote, verifies it is paid and mints against it. Payment
    /// settlement and retry policy belong to the caller.
    pub async fn mint_tokens(&self, amount: u64) -> WalletResult<Vec<Proof>> {
        let result = self
            .lock
            .run_exclusive(|| async {
                self.ensure_loaded()?;
                if amount == 0 {
                    return Err(WalletError::InvalidAmount { requested: amount });
                }
                let quote = self.connector.create_mint_quote(amount).await?;
                let state = self.connector.check_mint_quote(&quote.id).await?;
                if state != MintQuoteState::Paid {
                    return Err(WalletError::MintError(format!(
                        "mint quote {} is not paid",
                        quote.id
                    )));
                }
                let minted = self.connector.mint_proofs(&quote.id, amount).await?;

                let mut next = self.store.lock().unwrap().clone();
                next.add(minted.clone())?;
                if let Err(error) = self.commit(next).await {
                    self.record_unpersisted_proofs(
                        TransactionKind::Mint,
                        amount as i64,
                        &minted,
                        &error,
                    );
                    return Err(error);
                }

                self.ledger.add(
                    NewTransaction::new(TransactionKind::Mint, amount as i64)
                        .with_metadata("quote_id", quote.id),
                );
                self.emit_state_events().await;
                Ok(minted)
            })
            .await;
        self.finish("mint_tokens", result).await
    }

    /// Add externally obtained proofs to the store; returns the added value
    pub async fn add_proofs(&self, proofs: Vec<Proof>) -> WalletResult<u64> {
        let result = self
            .lock
            .run_exclusive(|| async {
                self.ensure_loaded()?;
                let amount = proofs_total(&proofs);
                let mut next = self.store.lock().unwrap().clone();
                next.add(proofs)?;
                self.commit(next).await?;
                self.emit_state_events().await;
                Ok(amount)
            })
            .await;
        self.finish("add_proofs", result).await
    }

    /// Remove the proofs with the given secrets; returns the removed proofs
    pub async fn remove_proofs(&self, secrets: &[String]) -> WalletResult<Vec<Proof>> {
        let result = self
            .lock
            .run_exclusive(|| async {
                self.ensure_loaded()?;
                let wanted: HashSet<String> = secrets.iter().cloned().collect();
                let mut next = self.store.lock().unwrap().clone();
                let removed = next.remove_secrets(&wanted);
                self.commit(next).await?;
                self.emit_state_events().await;
                Ok(removed)
            })
            .await;
        self.finish("remove_proofs", result).await
    }

    /// Drop every proof the mint reports as already spent
    ///
    /// Returns the number of proofs pruned.
    pub async fn prune_spent(&self) -> WalletResult<usize> {
        let result = self
            .lock
            .run_exclusive(|| async {
                self.ensure_loaded()?;
                let snapshot = self.proofs();
                if snapshot.is_empty() {
                    return Ok(0);
                }
                let states = self
                    .connector
                    .check_proof_state(&self.mint_url, &snapshot)
                    .await?;
                if states.spent.is_empty() {
                    return Ok(0);
                }
                let pruned = states.spent.len();
                let next = ProofStore::from_proofs(states.valid)?;
                self.commit(next).await?;
                self.emit_state_events().await;
                debug!(pruned, "pruned spent proofs");
                Ok(pruned)
            })
            .await;
        self.finish("prune_spent", result).await
    }

    /// Empty the wallet and its storage
    pub async fn clear(&self) -> WalletResult<()> {
        let result = self
            .lock
            .run_exclusive(|| async {
                self.ensure_loaded()?;
                self.storage.clear().await?;
                self.store.lock().unwrap().clear();
                self.emit_state_events().await;
                Ok(())
            })
            .await;
        self.finish("clear", result).await
    }

    // === Internals ===

    fn ensure_loaded(&self) -> WalletResult<()> {
        if self.is_loaded() {
            Ok(())
        } else {
            Err(WalletError::WalletNotLoaded)
        }
    }

    fn selection_failed(&self, amount: u64, snapshot: &[Proof]) -> WalletError {
        let mut denominations: Vec<u64> = snapshot.iter().map(|p| p.amount).collect();
        denominations.sort_unstable();
        denominations.dedup();
        WalletError::SelectionFailed {
            requested: amount,
            available: proofs_total(snapshot),
            proof_count: snapshot.len(),
            denominations,
        }
    }

    /// Persist a candidate store, then make it current
    ///
    /// Persisting first keeps the in-memory set untouched when the storage
    /// write fails.
    async fn commit(&self, next: ProofStore) -> WalletResult<()> {
        self.storage.save(&next.snapshot()).await?;
        *self.store.lock().unwrap() = next;
        Ok(())
    }

    /// Ledger a failed persist of freshly signed proofs
    ///
    /// Called when a mint call already consumed the old proofs but the
    /// replacement set could not be saved. The fresh proofs go into the
    /// record's metadata so their value stays recoverable.
    fn record_unpersisted_proofs(
        &self,
        kind: TransactionKind,
        amount: i64,
        fresh: &[Proof],
        error: &WalletError,
    ) {
        warn!(
            %error,
            fresh_value = proofs_total(fresh),
            "failed to persist freshly signed proofs; recording them on the ledger"
        );
        let mut record = NewTransaction::new(kind, amount)
            .with_status(TransactionStatus::Failed)
            .with_memo(format!("failed to persist freshly signed proofs: {error}"));
        if let Ok(json) = serde_json::to_string(fresh) {
            record = record.with_metadata("recovered_proofs", json);
        }
        self.ledger.add(record);
    }

    async fn emit_state_events(&self) {
        let (balance, proofs) = {
            let store = self.store.lock().unwrap();
            (store.balance(), store.snapshot())
        };
        let mut events = self.events.lock().await;
        events.dispatch(WalletEvent::BalanceChanged { balance }).await;
        events.dispatch(WalletEvent::ProofsChanged { proofs }).await;
    }

    /// Emit an error event for failed operations and pass the result on
    async fn finish<T>(&self, operation: &'static str, result: WalletResult<T>) -> WalletResult<T> {
        if let Err(error) = &result {
            let mut events = self.events.lock().await;
            events
                .dispatch(WalletEvent::Error {
                    operation: operation.to_string(),
                    kind: error.kind(),
                    message: error.to_string(),
                })
                .await;
        }
        result
    }
}
