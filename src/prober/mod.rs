use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::ProbeError;

pub mod tcp_connect;

/// One timed attempt against one endpoint.
///
/// Implementations must bound the whole attempt (resolution included) by
/// `timeout` and by `cancel`, and report only the connection phase in the
/// returned duration. A fired `cancel` fails the attempt with
/// [`crate::error::CANCELED`] as the reason.
pub trait Prober: Send + Sync + 'static {
    fn probe(
        &self,
        host: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Duration, ProbeError>> + Send;
}
