//! Logging listener emitting wallet events through `tracing`
//!
//! Balance and proof changes log at info level, operation failures at error
//! level. Attach a `tracing-subscriber` in the host application to surface
//! the output.

use async_trait::async_trait;
use tracing::{error, info};

use crate::events::{EventListener, WalletEvent};

/// Listener that forwards wallet events to the `tracing` ecosystem
#[derive(Debug, Default, Clone)]
pub struct TracingEventListener;

impl TracingEventListener {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventListener for TracingEventListener {
    async fn handle_event(
        &mut self,
        event: &WalletEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match event {
            WalletEvent::BalanceChanged { balance } => {
                info!(balance, "wallet balance changed");
            }
            WalletEvent::ProofsChanged { proofs } => {
                info!(proof_count = proofs.len(), "wallet proof set changed");
            }
            WalletEvent::Error {
                operation,
                kind,
                message,
            } => {
                error!(%operation, kind, %message, "wallet operation failed");
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "TracingEventListener"
    }
}
