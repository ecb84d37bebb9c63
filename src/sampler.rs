use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ProbeError;
use crate::prober::Prober;

/// Outcome of sampling one endpoint for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleResult {
    pub endpoint: String,
    /// Mean over all attempts; failed attempts count as the full timeout.
    pub mean: Duration,
    /// Error of the last failed attempt, if any attempt failed.
    pub error: Option<ProbeError>,
    pub failed_attempts: u32,
}

impl SampleResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Run `count` sequential attempts against `endpoint`.
///
/// `count` must be non-zero; the config layer rejects zero before we get here.
/// `cancel` only bounds each attempt: once it fires the remaining attempts
/// fail straight away, but all `count` of them are still made and penalized.
pub async fn sample<P: Prober>(
    prober: &P,
    endpoint: &str,
    count: u32,
    timeout: Duration,
    cancel: &CancellationToken,
) -> SampleResult {
    let mut sum = Duration::ZERO;
    let mut last_error = None;
    let mut failed_attempts = 0;

    for attempt in 0..count {
        match prober.probe(endpoint, timeout, cancel).await {
            Ok(d) => {
                debug!("{} attempt {} took {:?}", endpoint, attempt, d);
                sum += d;
            }
            Err(e) => {
                warn!("{} attempt {} failed: {}", endpoint, attempt, e);
                // penalize with the timeout so failing endpoints rank behind slow ones
                sum += timeout;
                failed_attempts += 1;
                last_error = Some(e);
            }
        }
    }

    SampleResult {
        endpoint: endpoint.to_string(),
        mean: sum / count.max(1),
        error: last_error,
        failed_attempts,
    }
}
