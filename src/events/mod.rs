//! Event system for wallet state changes
//!
//! The wallet emits a typed [`WalletEvent`] whenever its balance or proof
//! set changes, or when an operation fails. Listeners implement
//! [`EventListener`] and are driven by an [`EventDispatcher`] that delivers
//! events in registration order with per-listener error isolation: one
//! subscriber failing never prevents the others from being notified, and
//! never interrupts the wallet operation that emitted the event.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::data_structures::Proof;

pub mod listeners;

/// A wallet state-change notification
#[derive(Debug, Clone)]
pub enum WalletEvent {
    /// The derived balance changed; carries the new balance
    BalanceChanged { balance: u64 },
    /// The proof set changed; carries a snapshot of the new set
    ProofsChanged { proofs: Vec<Proof> },
    /// A wallet operation failed
    Error {
        /// The operation that failed (e.g. "create_token")
        operation: String,
        /// Machine-readable error kind
        kind: &'static str,
        message: String,
    },
}

impl WalletEvent {
    /// Stable name of this event's type
    pub fn kind(&self) -> &'static str {
        match self {
            WalletEvent::BalanceChanged { .. } => "balance-change",
            WalletEvent::ProofsChanged { .. } => "proofs-change",
            WalletEvent::Error { .. } => "error",
        }
    }
}

/// Errors that can occur when registering listeners
#[derive(Debug, Clone, Error)]
pub enum EventDispatchError {
    #[error("Listener with name '{0}' is already registered")]
    DuplicateListener(String),
    #[error("Cannot register listener: maximum of {max} listeners allowed")]
    TooManyListeners { max: usize },
    #[error("Invalid listener name: '{0}'")]
    InvalidListenerName(String),
}

/// Trait for handling wallet events asynchronously
///
/// Implementations should handle errors internally where possible; returned
/// errors are logged and counted but never interrupt other listeners or the
/// emitting operation.
#[async_trait]
pub trait EventListener: Send + Sync {
    /// Handle a wallet event
    async fn handle_event(
        &mut self,
        event: &WalletEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Name for this listener, used for registration and diagnostics
    fn name(&self) -> &'static str {
        "UnnamedListener"
    }

    /// Whether this listener wants events of the given type
    fn wants_event(&self, _event: &WalletEvent) -> bool {
        true
    }
}

/// Counters describing dispatcher activity
#[derive(Debug, Default, Clone)]
pub struct DispatchStats {
    pub events_dispatched: usize,
    pub listener_calls: usize,
    pub listener_errors: usize,
    pub errors_by_listener: HashMap<String, usize>,
}

/// Delivers events to registered listeners in registration order
pub struct EventDispatcher {
    listeners: Vec<Box<dyn EventListener>>,
    registered_names: HashSet<String>,
    max_listeners: Option<usize>,
    stats: DispatchStats,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    /// Create a new dispatcher with no listener limit
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            registered_names: HashSet::new(),
            max_listeners: None,
            stats: DispatchStats::default(),
        }
    }

    /// Create a dispatcher that refuses registrations beyond `max_listeners`
    pub fn with_limit(max_listeners: usize) -> Self {
        Self {
            max_listeners: Some(max_listeners),
            ..Self::new()
        }
    }

    /// Register a listener; listeners are notified in registration order
    pub fn register(&mut self, listener: Box<dyn EventListener>) -> Result<(), EventDispatchError> {
        let name = listener.name().to_string();
        if name.trim().is_empty() {
            return Err(EventDispatchError::InvalidListenerName(name));
        }
        if self.registered_names.contains(&name) {
            return Err(EventDispatchError::DuplicateListener(name));
        }
        if let Some(max) = self.max_listeners {
            if self.listeners.len() >= max {
                return Err(EventDispatchError::TooManyListeners { max });
            }
        }
        self.registered_names.insert(name);
        self.listeners.push(listener);
        Ok(())
    }

    /// Remove a listener by name; returns whether one was removed
    pub fn remove(&mut self, name: &str) -> bool {
        if !self.registered_names.remove(name) {
            return false;
        }
        self.listeners.retain(|listener| listener.name() != name);
        true
    }

    /// Dispatch an event to every registered listener
    ///
    /// Listener failures are logged and counted but do not stop delivery to
    /// the remaining listeners.
    pub async fn dispatch(&mut self, event: WalletEvent) {
        self.stats.events_dispatched += 1;
        for listener in &mut self.listeners {
            if !listener.wants_event(&event) {
                continue;
            }
            self.stats.listener_calls += 1;
            if let Err(error) = listener.handle_event(&event).await {
                self.stats.listener_errors += 1;
                *self
                    .stats
                    .errors_by_listener
                    .entry(listener.name().to_string())
                    .or_insert(0) += 1;
                warn!(
                    listener = listener.name(),
                    event = event.kind(),
                    %error,
                    "event listener failed"
                );
            }
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether a listener with this name is registered
    pub fn has_listener(&self, name: &str) -> bool {
        self.registered_names.contains(name)
    }

    /// Snapshot of dispatch counters
    pub fn stats(&self) -> DispatchStats {
        self.stats.clone()
    }
}
