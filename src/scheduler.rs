use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::PingConfig;
use crate::prober::Prober;
use crate::sampler::{sample, SampleResult};

/// Fans the sampler out over all configured endpoints, at most
/// `concurrency` at a time, admitted in configuration order.
pub struct ProbeScheduler<P> {
    endpoints: Arc<[String]>,
    sample_count: u32,
    concurrency: usize,
    timeout: Duration,
    prober: Arc<P>,
}

impl<P: Prober> ProbeScheduler<P> {
    pub fn new(config: &PingConfig, prober: P) -> Result<Self> {
        config.validate_sampling()?;
        Ok(Self {
            endpoints: config.endpoints.iter().cloned().collect(),
            sample_count: config.sample_count,
            concurrency: config.concurrency,
            timeout: config.per_attempt_timeout(),
            prober: Arc::new(prober),
        })
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Sample every endpoint and return results in completion order.
    ///
    /// Once `cancel` fires no further endpoints are admitted. Endpoints
    /// already being sampled still make all their attempts, each failing
    /// as soon as it starts, and are included in the result.
    pub async fn run(&self, cancel: CancellationToken) -> Vec<SampleResult> {
        let gate = Arc::new(Semaphore::new(self.concurrency));
        let (tx, mut rx) = mpsc::channel(self.endpoints.len().max(1));

        let mut admitted = 0usize;
        for endpoint in self.endpoints.iter() {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                permit = gate.clone().acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                warn!(
                    "invocation cancelled, skipping {} of {} endpoints",
                    self.endpoints.len() - admitted,
                    self.endpoints.len()
                );
                break;
            };
            admitted += 1;

            let tx = tx.clone();
            let prober = Arc::clone(&self.prober);
            let endpoint = endpoint.clone();
            let cancel = cancel.clone();
            let (count, timeout) = (self.sample_count, self.timeout);
            tokio::spawn(async move {
                let _permit = permit;
                let result = sample(prober.as_ref(), &endpoint, count, timeout, &cancel).await;
                info!(
                    "{} sampled: mean {:?}, {} of {} attempts failed",
                    result.endpoint, result.mean, result.failed_attempts, count
                );
                // receiver outlives every sender
                let _ = tx.send(result).await;
            });
        }
        drop(tx);

        // Collector: sole owner of the result collection.
        let mut results = Vec::with_capacity(admitted);
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        results
    }
}
