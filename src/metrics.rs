use prometheus::{Encoder, TextEncoder, HistogramOpts, HistogramVec, IntCounterVec, GaugeVec, Opts, Registry};
use once_cell::sync::{Lazy, OnceCell};

use crate::sampler::SampleResult;

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static LATENCY_GAUGE: Lazy<GaugeVec> = Lazy::new(|| {
    let opts = Opts::new("ping_latency_milliseconds_current", "Mean connect latency of the last invocation in milliseconds");
    let gauge = GaugeVec::new(opts, &["endpoint"]).expect("creating latency gauge");
    REGISTRY.register(Box::new(gauge.clone())).expect("registering latency gauge");
    gauge
});

static FAILED_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    let opts = Opts::new("ping_failed_attempts_total", "Total number of failed resolve+connect attempts");
    let ctr = IntCounterVec::new(opts, &["endpoint"]).expect("creating failure counter");
    REGISTRY.register(Box::new(ctr.clone())).expect("registering failure counter");
    ctr
});

// Only set when latency history is enabled.
static LATENCY_HIST: OnceCell<HistogramVec> = OnceCell::new();

pub fn initialize_metrics(enable_latency_history: bool) {
    Lazy::force(&LATENCY_GAUGE);
    Lazy::force(&FAILED_ATTEMPTS);

    if enable_latency_history {
        LATENCY_HIST.get_or_init(|| {
            let opts = HistogramOpts::new("ping_latency_milliseconds", "Mean connect latency per invocation in milliseconds")
                .buckets(vec![
                    0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0,
                    100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0,
                ]);
            let hist = HistogramVec::new(opts, &["endpoint"]).expect("creating histogram");
            REGISTRY.register(Box::new(hist.clone())).expect("registering histogram");
            hist
        });
    }
}

pub fn observe_sample(result: &SampleResult) {
    let latency_ms = result.mean.as_micros() as f64 / 1000.0;
    LATENCY_GAUGE
        .with_label_values(&[result.endpoint.as_str()])
        .set(latency_ms);

    if let Some(hist) = LATENCY_HIST.get() {
        hist.with_label_values(&[result.endpoint.as_str()])
            .observe(latency_ms);
    }

    if result.failed_attempts > 0 {
        FAILED_ATTEMPTS
            .with_label_values(&[result.endpoint.as_str()])
            .inc_by(u64::from(result.failed_attempts));
    }
}

/// Prometheus text exposition of the registry, with its content type.
pub fn encode_metrics() -> anyhow::Result<(Vec<u8>, String)> {
    let encoder = TextEncoder::new();
    let mf = REGISTRY.gather();
    let mut buf = Vec::new();
    encoder.encode(&mf, &mut buf)?;
    Ok((buf, encoder.format_type().to_string()))
}
