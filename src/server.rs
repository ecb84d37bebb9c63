use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::metrics::{encode_metrics, observe_sample};
use crate::prober::Prober;
use crate::report::format_report;
use crate::scheduler::ProbeScheduler;

pub struct AppState<P> {
    pub scheduler: ProbeScheduler<P>,
    pub invocation_deadline: Option<Duration>,
}

/// One full request/response cycle: sample every endpoint and render the report.
pub async fn invoke<P: Prober>(state: &AppState<P>) -> String {
    let cancel = CancellationToken::new();
    let deadline_timer = state.invocation_deadline.map(|deadline| {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            cancel.cancel();
        })
    });

    let results = state.scheduler.run(cancel).await;
    if let Some(timer) = deadline_timer {
        timer.abort();
    }

    info!(
        "invocation finished: {} of {} endpoints sampled, {} with errors",
        results.len(),
        state.scheduler.endpoints().len(),
        results.iter().filter(|r| !r.is_success()).count()
    );
    for r in &results {
        observe_sample(r);
    }
    format_report(&results)
}

fn with_state<P: Prober>(
    state: Arc<AppState<P>>,
) -> impl Filter<Extract = (Arc<AppState<P>>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

pub fn routes<P: Prober>(
    state: Arc<AppState<P>>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let ping = warp::path!("ping")
        .and(warp::get())
        .and(with_state(state))
        .then(|state: Arc<AppState<P>>| async move {
            let report = invoke(&state).await;
            warp::reply::with_header(report, "Content-Type", "text/plain; charset=utf-8")
        });

    let metrics_route = warp::path!("metrics").and(warp::get()).map(|| match encode_metrics() {
        Ok((buf, content_type)) => {
            warp::reply::with_header(buf, "Content-Type", content_type).into_response()
        }
        Err(e) => {
            error!("encoding metrics failed: {:?}", e);
            warp::reply::with_status(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
    });

    ping.or(metrics_route)
}

pub async fn serve<P: Prober>(addr: SocketAddr, state: Arc<AppState<P>>) {
    info!("listening on {}", addr);
    warp::serve(routes(state)).run(addr).await;
}
