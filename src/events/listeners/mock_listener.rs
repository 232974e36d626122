//! Mock event listener for testing
//!
//! Captures every received event behind an `Arc<Mutex<_>>` handle so tests
//! can assert on event sequences after the wallet operation completes. A
//! failing variant exercises the dispatcher's error isolation.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::events::{EventListener, WalletEvent};

/// Test listener that records every event it receives
pub struct MockEventListener {
    captured: Arc<Mutex<Vec<WalletEvent>>>,
    name: &'static str,
    should_fail: bool,
}

impl Default for MockEventListener {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEventListener {
    /// Create a capturing listener with the default name
    pub fn new() -> Self {
        Self::named("MockEventListener")
    }

    /// Create a capturing listener with a specific name
    pub fn named(name: &'static str) -> Self {
        Self {
            captured: Arc::new(Mutex::new(Vec::new())),
            name,
            should_fail: false,
        }
    }

    /// Create a listener that fails every event, for isolation tests
    pub fn failing(name: &'static str) -> Self {
        Self {
            should_fail: true,
            ..Self::named(name)
        }
    }

    /// Handle to the captured events; clone before registering the listener
    pub fn captured(&self) -> Arc<Mutex<Vec<WalletEvent>>> {
        self.captured.clone()
    }

    /// Kinds of the captured events, in delivery order
    pub fn captured_kinds(&self) -> Vec<&'static str> {
        self.captured
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.kind())
            .collect()
    }

    /// Number of captured events of the given kind
    pub fn count_of(&self, kind: &str) -> usize {
        self.captured
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.kind() == kind)
            .count()
    }
}

#[async_trait]
impl EventListener for MockEventListener {
    async fn handle_event(
        &mut self,
        event: &WalletEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.should_fail {
            return Err("mock listener failure".into());
        }
        self.captured.lock().unwrap().push(event.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_listener_captures_in_order() {
        let mut listener = MockEventListener::new();
        let captured = listener.captured();

        listener
            .handle_event(&WalletEvent::BalanceChanged { balance: 1 })
            .await
            .unwrap();
        listener
            .handle_event(&WalletEvent::ProofsChanged { proofs: vec![] })
            .await
            .unwrap();

        assert_eq!(captured.lock().unwrap().len(), 2);
        assert_eq!(listener.captured_kinds(), vec!["balance-change", "proofs-change"]);
        assert_eq!(listener.count_of("balance-change"), 1);
    }
}
