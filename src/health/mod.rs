//! Wallet and mint health scoring
//!
//! Unlike the rest of the crate, health checks never fail fast: a health
//! report must always be producible, so mint and network errors are folded
//! into a degraded score and issue list instead of being returned. Scores
//! start at 100 and drop for unreachability, latency, spent proofs, unknown
//! keysets and failed proof-state checks.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout, Instant};
use tracing::debug;

use crate::data_structures::Proof;
use crate::mint::MintConnector;

/// Probe latency above this is penalized as slow
const SLOW_MINT_THRESHOLD: Duration = Duration::from_millis(2000);

/// Scores at or above this are considered healthy
const HEALTHY_SCORE_THRESHOLD: u8 = 70;

/// Options controlling a health check
#[derive(Debug, Clone)]
pub struct HealthCheckOptions {
    /// Upper bound on the mint connectivity probe
    pub timeout: Duration,
    /// Skip the proof-state partition (connectivity only)
    pub skip_proof_check: bool,
}

impl Default for HealthCheckOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(5000),
            skip_proof_check: false,
        }
    }
}

/// Full health report
#[derive(Debug, Clone)]
pub struct WalletHealth {
    /// 0-100 composite score
    pub score: u8,
    pub mint_reachable: bool,
    /// Probe round-trip time when the mint answered
    pub latency: Option<Duration>,
    pub valid_proofs: usize,
    pub spent_proofs: usize,
    /// Human-readable issues in the order penalties were applied
    pub issues: Vec<String>,
}

impl WalletHealth {
    pub fn is_healthy(&self) -> bool {
        self.score >= HEALTHY_SCORE_THRESHOLD
    }
}

/// Condensed result of a quick check
#[derive(Debug, Clone)]
pub struct QuickHealth {
    pub score: u8,
    pub healthy: bool,
    pub top_issue: Option<String>,
}

/// Composes mint connectivity probing and proof-state verification into a
/// score
pub struct HealthChecker {
    connector: Arc<dyn MintConnector>,
}

impl HealthChecker {
    pub fn new(connector: Arc<dyn MintConnector>) -> Self {
        Self { connector }
    }

    /// Produce a health report for the given mint and proof snapshot
    ///
    /// Never returns an error; every failure is reflected in the score and
    /// issue list instead.
    pub async fn check_wallet_health(
        &self,
        mint_url: &str,
        proofs: &[Proof],
        options: &HealthCheckOptions,
    ) -> WalletHealth {
        let mut score: i32 = 100;
        let mut issues = Vec::new();

        let probe_start = Instant::now();
        let ping = timeout(options.timeout, self.connector.ping(mint_url)).await;
        let (mint_reachable, latency, keyset_ids) = match ping {
            Ok(Ok(info)) => {
                let latency = probe_start.elapsed();
                (true, Some(latency), Some(info.keyset_ids))
            }
            Ok(Err(error)) => {
                issues.push(format!("Mint {mint_url} is unreachable: {error}"));
                score -= 40;
                (false, None, None)
            }
            Err(_) => {
                issues.push(format!(
                    "Mint {mint_url} is unreachable: probe timed out after {:?}",
                    options.timeout
                ));
                score -= 40;
                (false, None, None)
            }
        };

        if let Some(latency) = latency {
            if latency > SLOW_MINT_THRESHOLD {
                issues.push(format!("Mint responded slowly ({latency:?})"));
                score -= 10;
            }
        }

        if proofs.is_empty() {
            // Reported but not penalized; an empty wallet is not broken.
            issues.push("Wallet holds no proofs".to_string());
        }

        let mut valid_proofs = proofs.len();
        let mut spent_proofs = 0usize;
        let mut proof_check_failed = false;

        if !options.skip_proof_check && !proofs.is_empty() {
            match self.connector.check_proof_state(mint_url, proofs).await {
                Ok(states) => {
                    valid_proofs = states.valid.len();
                    spent_proofs = states.spent.len();
                    if spent_proofs > 0 {
                        let spent_ratio = spent_proofs as f64 / proofs.len() as f64;
                        let penalty = if spent_ratio > 0.5 {
                            30
                        } else if spent_ratio > 0.1 {
                            15
                        } else {
                            5
                        };
                        issues.push(format!(
                            "{spent_proofs} of {} proofs are already spent",
                            proofs.len()
                        ));
                        score -= penalty;
                    }
                }
                Err(error) => {
                    proof_check_failed = true;
                    debug!(%error, "proof state check failed during health check");
                }
            }
        }

        if let Some(keyset_ids) = &keyset_ids {
            let known: HashSet<&str> = keyset_ids.iter().map(|id| id.as_str()).collect();
            if proofs.iter().any(|p| !known.contains(p.keyset_id.as_str())) {
                issues.push(
                    "Some proofs use a keyset the mint no longer reports".to_string(),
                );
                score -= 15;
            }
        }

        if proof_check_failed {
            issues.push("Proof state check failed; spent proofs may be present".to_string());
            score -= 20;
        }

        WalletHealth {
            score: score.clamp(0, 100) as u8,
            mint_reachable,
            latency,
            valid_proofs,
            spent_proofs,
            issues,
        }
    }

    /// Same routine with a short timeout, condensed to score / healthy /
    /// top issue
    pub async fn quick_health_check(&self, mint_url: &str, proofs: &[Proof]) -> QuickHealth {
        let options = HealthCheckOptions {
            timeout: Duration::from_millis(1500),
            skip_proof_check: false,
        };
        let health = self.check_wallet_health(mint_url, proofs, &options).await;
        QuickHealth {
            score: health.score,
            healthy: health.is_healthy(),
            top_issue: health.issues.first().cloned(),
        }
    }
}
