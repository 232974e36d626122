//! Mock mint connector for deterministic testing
//!
//! Reissues proofs along the canonical power-of-two ladder without any real
//! cryptography, tracks which secrets have been marked spent, and supports
//! configurable failure modes and simulated latency so wallet error paths
//! and health scoring can be exercised without a network.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::RngCore;

use crate::analysis::suggest_denominations;
use crate::data_structures::{proofs_total, Proof, Token};
use crate::errors::{WalletError, WalletResult};
use crate::mint::{MintConnector, MintInfo, MintQuote, MintQuoteState, ProofStates, SwapOutcome};

/// Simulated failure modes for testing error conditions
#[derive(Debug, Clone, Default)]
pub struct MockMintFailures {
    /// Fail ping calls, making the mint appear unreachable
    pub unreachable: bool,
    /// Fail every swap call
    pub fail_swap: bool,
    /// Fail every receive call
    pub fail_receive: bool,
    /// Fail quote and minting calls
    pub fail_mint: bool,
    /// Fail proof state checks
    pub fail_proof_state: bool,
    /// Artificial delay applied to ping, for latency scoring tests
    pub ping_latency: Option<Duration>,
}

/// In-memory mint double issuing deterministic power-of-two proof sets
#[derive(Debug, Clone)]
pub struct MockMintConnector {
    keyset_id: String,
    failures: Arc<Mutex<MockMintFailures>>,
    spent_secrets: Arc<Mutex<HashSet<String>>>,
    quotes: Arc<Mutex<HashMap<String, MintQuote>>>,
    swap_calls: Arc<Mutex<usize>>,
}

impl Default for MockMintConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMintConnector {
    pub fn new() -> Self {
        Self {
            keyset_id: "00mockkeyset01".to_string(),
            failures: Arc::new(Mutex::new(MockMintFailures::default())),
            spent_secrets: Arc::new(Mutex::new(HashSet::new())),
            quotes: Arc::new(Mutex::new(HashMap::new())),
            swap_calls: Arc::new(Mutex::new(0)),
        }
    }

    /// The single keyset this mock signs under
    pub fn keyset_id(&self) -> &str {
        &self.keyset_id
    }

    /// Arm failure modes for subsequent calls
    pub fn set_failures(&self, failures: MockMintFailures) {
        *self.failures.lock().unwrap() = failures;
    }

    /// Mark a secret as spent for subsequent proof state checks
    pub fn mark_spent(&self, secret: &str) {
        self.spent_secrets.lock().unwrap().insert(secret.to_string());
    }

    /// Number of swap calls performed
    pub fn swap_calls(&self) -> usize {
        *self.swap_calls.lock().unwrap()
    }

    /// Issue a proof set summing to `amount` along the denomination ladder
    pub fn issue(&self, amount: u64) -> Vec<Proof> {
        let mut proofs = Vec::new();
        for (denomination, count) in suggest_denominations(amount) {
            for _ in 0..count {
                proofs.push(self.make_proof(denomination));
            }
        }
        proofs
    }

    fn make_proof(&self, amount: u64) -> Proof {
        let mut secret = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut secret);
        let mut signature = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut signature);
        Proof::new(
            self.keyset_id.clone(),
            amount,
            hex::encode(secret),
            hex::encode(signature),
        )
    }

    fn failures(&self) -> MockMintFailures {
        self.failures.lock().unwrap().clone()
    }
}

#[async_trait]
impl MintConnector for MockMintConnector {
    async fn ping(&self, mint_url: &str) -> WalletResult<MintInfo> {
        let failures = self.failures();
        if let Some(latency) = failures.ping_latency {
            tokio::time::sleep(latency).await;
        }
        if failures.unreachable {
            return Err(WalletError::MintError(format!(
                "mint {mint_url} is unreachable"
            )));
        }
        Ok(MintInfo {
            name: Some("mock mint".to_string()),
            keyset_ids: vec![self.keyset_id.clone()],
        })
    }

    async fn swap(&self, amount: u64, proofs: &[Proof]) -> WalletResult<SwapOutcome> {
        *self.swap_calls.lock().unwrap() += 1;
        if self.failures().fail_swap {
            return Err(WalletError::SwapFailed(
                "simulated swap failure".to_string(),
            ));
        }
        let total = proofs_total(proofs);
        if total < amount {
            return Err(WalletError::SwapFailed(format!(
                "swap inputs total {total}, below requested {amount}"
            )));
        }
        // Inputs are consumed by the swap.
        let mut spent = self.spent_secrets.lock().unwrap();
        for proof in proofs {
            spent.insert(proof.secret.clone());
        }
        drop(spent);
        Ok(SwapOutcome {
            send: self.issue(amount),
            keep: self.issue(total - amount),
        })
    }

    async fn receive(&self, token: &Token) -> WalletResult<Vec<Proof>> {
        if self.failures().fail_receive {
            return Err(WalletError::MintError(
                "simulated receive failure".to_string(),
            ));
        }
        let mut spent = self.spent_secrets.lock().unwrap();
        for proof in &token.proofs {
            if !spent.insert(proof.secret.clone()) {
                return Err(WalletError::MintError(format!(
                    "proof secret {} already spent",
                    proof.secret
                )));
            }
        }
        drop(spent);
        Ok(self.issue(token.total_amount()))
    }

    async fn create_mint_quote(&self, amount: u64) -> WalletResult<MintQuote> {
        if self.failures().fail_mint {
            return Err(WalletError::MintError(
                "simulated quote failure".to_string(),
            ));
        }
        let mut id = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut id);
        let quote = MintQuote {
            id: hex::encode(id),
            amount,
            request: format!("mock:invoice:{amount}"),
            // The mock treats every quote as instantly settled.
            state: MintQuoteState::Paid,
        };
        self.quotes
            .lock()
            .unwrap()
            .insert(quote.id.clone(), quote.clone());
        Ok(quote)
    }

    async fn check_mint_quote(&self, quote_id: &str) -> WalletResult<MintQuoteState> {
        if self.failures().fail_mint {
            return Err(WalletError::MintError(
                "simulated quote check failure".to_string(),
            ));
        }
        self.quotes
            .lock()
            .unwrap()
            .get(quote_id)
            .map(|quote| quote.state)
            .ok_or_else(|| WalletError::MintError(format!("unknown quote {quote_id}")))
    }

    async fn mint_proofs(&self, quote_id: &str, amount: u64) -> WalletResult<Vec<Proof>> {
        if self.failures().fail_mint {
            return Err(WalletError::MintError(
                "simulated minting failure".to_string(),
            ));
        }
        let mut quotes = self.quotes.lock().unwrap();
        let quote = quotes
            .get_mut(quote_id)
            .ok_or_else(|| WalletError::MintError(format!("unknown quote {quote_id}")))?;
        if quote.state != MintQuoteState::Paid {
            return Err(WalletError::MintError(format!(
                "quote {quote_id} is not paid"
            )));
        }
        quote.state = MintQuoteState::Issued;
        drop(quotes);
        Ok(self.issue(amount))
    }

    async fn check_proof_state(
        &self,
        _mint_url: &str,
        proofs: &[Proof],
    ) -> WalletResult<ProofStates> {
        if self.failures().fail_proof_state {
            return Err(WalletError::MintError(
                "simulated proof state failure".to_string(),
            ));
        }
        let spent_secrets = self.spent_secrets.lock().unwrap();
        let mut states = ProofStates::default();
        for proof in proofs {
            if spent_secrets.contains(&proof.secret) {
                states.spent.push(proof.clone());
            } else {
                states.valid.push(proof.clone());
            }
        }
        Ok(states)
    }
}
