use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use crawlmap_core::{Edge, EngineError};
use crawlmap_fetcher::Fetcher;

use crate::worker::{self, JobResult};

/// Channel capacity for every internal and public channel, keyed off
/// `concurrency` the way §5 specifies — large enough that one BFS level
/// doesn't serialize behind a single slot, small enough that a runaway
/// frontier doesn't buffer unboundedly.
fn channel_capacity(concurrency: usize) -> usize {
    concurrency.max(1)
}

/// Starts one crawl rooted at `seed`. Spawns the scheduler and `concurrency`
/// worker tasks and returns immediately with the two receivers the caller
/// drains; all crawling happens on the spawned tasks.
///
/// `concurrency == 0` is a configuration error (§4.5's initial-condition
/// guard): no scheduler or worker is spawned, `errs` receives a single
/// `EngineError::Config` and both channels close immediately.
pub fn start(
    seed: Url,
    concurrency: usize,
    per_request_timeout: Duration,
    cancel: CancellationToken,
    fetcher: Fetcher,
) -> (mpsc::Receiver<Edge>, mpsc::Receiver<EngineError>) {
    let _ = per_request_timeout; // baked into `fetcher` by the caller, not re-applied here.

    let cap = channel_capacity(concurrency);
    let (results_tx, results_rx) = mpsc::channel(cap);
    let (errs_tx, errs_rx) = mpsc::channel(cap);

    if concurrency == 0 {
        tokio::spawn(async move {
            let _ = errs_tx
                .send(EngineError::Config(
                    "concurrency must be > 0".to_string(),
                ))
                .await;
            // Dropping `errs_tx` and `results_tx` here (end of scope) closes
            // both channels after the one diagnostic, exactly per §4.5.
        });
        return (results_rx, errs_rx);
    }

    tokio::spawn(run_scheduler(
        seed, concurrency, cancel, fetcher, results_tx, errs_tx,
    ));

    (results_rx, errs_rx)
}

async fn run_scheduler(
    seed: Url,
    concurrency: usize,
    cancel: CancellationToken,
    fetcher: Fetcher,
    results_out: mpsc::Sender<Edge>,
    errs: mpsc::Sender<EngineError>,
) {
    let cap = channel_capacity(concurrency);
    let (jobs_tx, jobs_rx) = mpsc::channel::<Url>(cap);
    let (crawl_results_tx, mut crawl_results_rx) = mpsc::channel::<JobResult>(cap);

    // `mpsc::Receiver` can't be cloned, so `concurrency` peer workers share
    // one behind a `Mutex` the way `darkscraper`'s `crawl.rs` wraps its
    // shared probe state — each worker locks it only for the instant it
    // takes to pull the next job, never across the fetch itself.
    let jobs_rx = Arc::new(Mutex::new(jobs_rx));
    let mut worker_handles = Vec::with_capacity(concurrency);
    for _ in 0..concurrency {
        let handle = tokio::spawn(worker::run(
            jobs_rx.clone(),
            crawl_results_tx.clone(),
            fetcher.clone(),
            cancel.clone(),
        ));
        worker_handles.push(handle);
    }
    drop(crawl_results_tx);

    let mut frontier: VecDeque<Url> = VecDeque::new();
    frontier.push_back(seed.clone());
    let mut seen_url: HashSet<String> = HashSet::new();
    seen_url.insert(seed.to_string());
    let mut seen_edge: HashSet<String> = HashSet::new();
    let mut pending: usize = 0;

    'main: while !frontier.is_empty() || pending > 0 {
        if !frontier.is_empty() {
            let batch: Vec<Url> = frontier.drain(..).collect();
            pending += batch.len();
            dispatch(batch, jobs_tx.clone());
        }

        if pending == 0 {
            continue;
        }

        let job_result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("crawl cancelled, beginning shutdown");
                break 'main;
            }
            result = crawl_results_rx.recv() => result,
        };

        let Some(job_result) = job_result else {
            // Every worker exited (shouldn't happen while `jobs_tx` is held,
            // but treat it the same as cancellation: nothing more to await).
            break 'main;
        };
        pending -= 1;

        if let Some(err) = job_result.error {
            let _ = errs.send(err).await;
        }

        for edge in job_result.edges {
            if !edge.is_same_domain() {
                continue;
            }
            if edge.is_self_reference() {
                continue;
            }
            let key = edge.key();
            if seen_edge.contains(&key) {
                continue;
            }
            seen_edge.insert(key);

            let link_str = edge.link.to_string();
            let is_new = seen_url.insert(link_str);
            let link = edge.link.clone();

            if results_out.send(edge).await.is_err() {
                // Caller dropped `results_out` (e.g. a formatter bailed on a
                // sink error). Nothing more to forward; finish draining
                // in-flight jobs so the scheduler still closes cleanly.
                continue;
            }

            if is_new {
                frontier.push_back(link);
            }
        }
    }

    if cancel.is_cancelled() {
        // Release any workers currently blocked sending their in-flight
        // batch before we drop `jobs_tx` and await their handles below —
        // forward whatever errors those batches carry (edges are discarded:
        // a cancelled crawl reports zero edges, per spec §8). Bounded by
        // `pending` so a worker that never responds can't hang this loop.
        let mut remaining = pending;
        while remaining > 0 {
            match crawl_results_rx.try_recv() {
                Ok(result) => {
                    remaining -= 1;
                    if let Some(err) = result.error {
                        let _ = errs.send(err).await;
                    }
                }
                Err(_) => break,
            }
        }
    }

    drop(jobs_tx);
    let grace = Duration::from_secs(2);
    for handle in worker_handles {
        if tokio::time::timeout(grace, handle).await.is_err() {
            warn!("worker task did not exit within the cancellation grace period");
        }
    }

    info!("crawl finished");
    drop(results_out);
    drop(errs);
}

/// Sends every URL in `batch` onto `jobs` from a separate task so the
/// scheduler's own loop can keep draining `crawl_results` concurrently.
/// Doing this synchronously in the main loop deadlocks as soon as a BFS
/// level is larger than the channel's capacity and workers fill
/// `crawl_results`' buffer before the scheduler starts receiving from it
/// (§4.5, §9).
fn dispatch(batch: Vec<Url>, jobs_tx: mpsc::Sender<Url>) {
    tokio::spawn(async move {
        for url in batch {
            if jobs_tx.send(url).await.is_err() {
                break;
            }
        }
    });
}
