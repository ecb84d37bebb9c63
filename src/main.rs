mod config;
mod error;
mod metrics;
mod prober;
mod report;
mod sampler;
mod scheduler;
mod server;
mod util;

use config::PingConfig;
use prober::tcp_connect::TcpConnectProber;
use scheduler::ProbeScheduler;
use server::AppState;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> anyhow::Result<()> {
    // Load config first to get log level
    let config = PingConfig::load().await?;
    let log_level = config.get_tracing_level()?;

    println!("Starting ping_probe");

    initialize_tracing(log_level)?;
    metrics::initialize_metrics(config.enable_latency_history);

    info!(
        "{} endpoints, {} samples each, concurrency {}, timeout {:?}, port {}",
        config.endpoints.len(),
        config.sample_count,
        config.concurrency,
        config.per_attempt_timeout(),
        config.target_port
    );

    let prober = TcpConnectProber::new(config.target_port);
    let state = Arc::new(AppState {
        scheduler: ProbeScheduler::new(&config, prober)?,
        invocation_deadline: config.invocation_deadline(),
    });

    let addr: SocketAddr = config.listen_addr.parse()?;
    server::serve(addr, state).await;

    Ok(())
}

fn initialize_tracing(level: tracing::Level) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()
                         .add_directive(format!("ping_probe={}", level.as_str().to_lowercase()).parse()?))
        .init();
    Ok(())
}
