use std::future::Future;
use std::net::{IpAddr, SocketAddr};

use tokio::net::TcpStream;
use tokio::time::{timeout_at, Duration, Instant};
use tokio_util::sync::CancellationToken;
use trust_dns_resolver::TokioAsyncResolver;

use super::Prober;
use crate::error::{ProbeError, CANCELED, TIMED_OUT};
use crate::util::{parse_ip_literal, system_resolver, to_fqdn};

/// Times the TCP handshake to the first resolved address of a host.
#[derive(Clone)]
pub struct TcpConnectProber {
    resolver: TokioAsyncResolver,
    port: u16,
}

/// Run `fut` until it finishes, `deadline` passes or `cancel` fires.
async fn bounded<F: Future>(
    fut: F,
    deadline: Instant,
    cancel: &CancellationToken,
) -> Result<F::Output, &'static str> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CANCELED),
        res = timeout_at(deadline, fut) => res.map_err(|_| TIMED_OUT),
    }
}

impl TcpConnectProber {
    pub fn new(port: u16) -> Self {
        Self::with_resolver(system_resolver(), port)
    }

    pub fn with_resolver(resolver: TokioAsyncResolver, port: u16) -> Self {
        Self { resolver, port }
    }

    async fn resolve(
        &self,
        host: &str,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> Result<IpAddr, ProbeError> {
        if let Some(ip) = parse_ip_literal(host) {
            return Ok(ip);
        }

        let fqdn = to_fqdn(host);
        let lookup = match bounded(self.resolver.lookup_ip(fqdn.as_str()), deadline, cancel).await {
            Ok(Ok(lookup)) => lookup,
            Ok(Err(e)) => return Err(ProbeError::resolution(&fqdn, e.to_string())),
            Err(reason) => return Err(ProbeError::resolution(&fqdn, reason)),
        };

        // First address wins; no preference beyond resolver order.
        lookup
            .iter()
            .next()
            .ok_or_else(|| ProbeError::resolution(&fqdn, "no such host"))
    }
}

impl Prober for TcpConnectProber {
    async fn probe(
        &self,
        host: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Duration, ProbeError> {
        let deadline = Instant::now() + timeout;
        let ip = self.resolve(host, deadline, cancel).await?;
        let addr = SocketAddr::new(ip, self.port);

        let start = Instant::now();
        let conn = match bounded(TcpStream::connect(addr), deadline, cancel).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(ProbeError::connect(addr, format!("connect: {}", e))),
            Err(reason) => return Err(ProbeError::connect(addr, reason)),
        };
        let elapsed = start.elapsed();
        drop(conn);

        tracing::trace!("tcp connect {} ({}) in {:?}", host, addr, elapsed);
        Ok(elapsed)
    }
}
