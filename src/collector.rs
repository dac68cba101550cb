//! Per-host sample collection.
//!
//! One collection batch issues a fixed number of sequential probe attempts
//! against a single host and condenses them into one [`Sample`]: success if
//! at least one attempt got a reply, with the median latency of the
//! successful attempts. The median makes the per-cycle figure robust to a
//! single slow outlier; failed attempts are excluded from it entirely
//! rather than counted as zero or infinity.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::prober::{ProbeOutcome, Prober};
use crate::storage::Sample;

/// Default probe attempts per batch.
const DEFAULT_ATTEMPTS: usize = 20;

/// Default per-attempt timeout (2 seconds).
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Default delay after each attempt (1 second).
const DEFAULT_ATTEMPT_DELAY: Duration = Duration::from_secs(1);

fn default_attempts() -> usize {
    DEFAULT_ATTEMPTS
}

fn default_probe_timeout() -> Duration {
    DEFAULT_PROBE_TIMEOUT
}

fn default_attempt_delay() -> Duration {
    DEFAULT_ATTEMPT_DELAY
}

/// Sampling policy for one collection batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplePolicy {
    /// Probe attempts per batch (default: 20). All attempts are always made.
    #[serde(default = "default_attempts")]
    pub attempts: usize,
    /// Timeout for each attempt (default: 2s).
    #[serde(default = "default_probe_timeout", with = "humantime_serde")]
    pub probe_timeout: Duration,
    /// Delay after each attempt (default: 1s).
    #[serde(default = "default_attempt_delay", with = "humantime_serde")]
    pub attempt_delay: Duration,
}

impl Default for SamplePolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            attempt_delay: DEFAULT_ATTEMPT_DELAY,
        }
    }
}

/// Collects one summarized sample per host per scheduling cycle.
///
/// Holds no storage handle: persistence is the scheduler's responsibility,
/// which keeps the collector testable against a scripted prober.
pub struct SampleCollector {
    prober: Arc<dyn Prober>,
    policy: SamplePolicy,
}

impl SampleCollector {
    /// Create a new collector with the given prober and policy.
    pub fn new(prober: Arc<dyn Prober>, policy: SamplePolicy) -> Self {
        Self { prober, policy }
    }

    /// Run one full probe batch against `address` and classify the outcome.
    ///
    /// No attempt failure aborts the batch; all attempts are made. One call
    /// takes at least `attempts * attempt_delay` plus the per-attempt
    /// response or timeout times.
    pub async fn collect(&self, address: &str) -> Sample {
        let mut latencies = Vec::with_capacity(self.policy.attempts);

        for attempt in 0..self.policy.attempts {
            match self.prober.probe(address, self.policy.probe_timeout).await {
                ProbeOutcome::Reply { rtt_ms } => {
                    tracing::trace!(
                        host = %address,
                        attempt = attempt + 1,
                        total = self.policy.attempts,
                        rtt_ms,
                        "Probe attempt succeeded"
                    );
                    latencies.push(rtt_ms);
                }
                ProbeOutcome::Timeout => {
                    tracing::trace!(
                        host = %address,
                        attempt = attempt + 1,
                        total = self.policy.attempts,
                        "Probe attempt timed out"
                    );
                }
            }
            sleep(self.policy.attempt_delay).await;
        }

        let sample = classify(latencies);
        match sample.latency_ms {
            Some(median) => {
                tracing::debug!(host = %address, median_ms = median, "Batch succeeded")
            }
            None => tracing::debug!(host = %address, "All probe attempts failed"),
        }
        sample
    }
}

impl std::fmt::Debug for SampleCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleCollector")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Classify a batch from the latencies of its successful attempts.
///
/// At least one success makes the sample successful, with latency the
/// element at index `count / 2` of the sorted successes. No successes yield
/// a failed sample with no latency.
fn classify(mut latencies: Vec<f64>) -> Sample {
    if latencies.is_empty() {
        return Sample {
            latency_ms: None,
            success: false,
        };
    }

    latencies.sort_by(f64::total_cmp);
    Sample {
        latency_ms: Some(latencies[latencies.len() / 2]),
        success: true,
    }
}
