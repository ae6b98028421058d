use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crawlmap_core::{Edge, EngineError};
use crawlmap_fetcher::Fetcher;

/// What a worker produces for one job: zero or more edges discovered on
/// that page, and at most one error describing why the page contributed
/// nothing. The scheduler receives exactly one `JobResult` per URL it
/// dispatches — that one-in-one-out invariant is what lets it track
/// `pending` with a plain counter instead of per-job bookkeeping.
pub struct JobResult {
    pub edges: Vec<Edge>,
    pub error: Option<EngineError>,
}

/// Runs one worker: pull URLs off `jobs` until the channel closes, fetch
/// each one, extract and resolve its links, and publish exactly one
/// `JobResult` per URL received onto `crawl_results`.
///
/// A worker applies no policy — same-domain filtering, self-reference
/// dropping, and de-duplication are the scheduler's job (§4.5). This
/// mirrors the split in `darkscraper`'s `crawl.rs`, where fetch/parse and
/// frontier bookkeeping are separate concerns, but collapses the
/// teacher's per-network dispatch and storage hand-off since neither
/// applies here.
pub async fn run(
    jobs: Arc<Mutex<mpsc::Receiver<Url>>>,
    crawl_results: mpsc::Sender<JobResult>,
    fetcher: Fetcher,
    cancel: CancellationToken,
) {
    loop {
        // Hold the lock only long enough to pull the next job; the fetch
        // itself runs with the receiver unlocked so peer workers aren't
        // blocked on one slow page.
        let job = {
            let mut jobs = jobs.lock().await;
            jobs.recv().await
        };
        let Some(job) = job else {
            return;
        };

        let result = fetch_and_extract(&job, &fetcher, &cancel).await;
        if crawl_results.send(result).await.is_err() {
            // Scheduler has already gone away (terminal close or cancellation
            // drain finished); nothing left to report to.
            return;
        }
    }
}

async fn fetch_and_extract(job: &Url, fetcher: &Fetcher, cancel: &CancellationToken) -> JobResult {
    debug!(url = %job, "dispatching job");

    let body = match fetcher.fetch(job, cancel).await {
        Ok(body) => body,
        Err(e) => {
            return JobResult {
                edges: Vec::new(),
                error: Some(EngineError::fetch(job.to_string(), e)),
            }
        }
    };

    let html = match String::from_utf8(body) {
        Ok(html) => html,
        Err(e) => {
            return JobResult {
                edges: Vec::new(),
                error: Some(EngineError::extract(job.to_string(), e.to_string())),
            }
        }
    };

    let hrefs = crawlmap_parser::extract_links(&html);
    let edges = hrefs
        .into_iter()
        .filter_map(|href| super::resolver::resolve(job, &href))
        .map(|link| Edge::new(job.clone(), link))
        .collect();

    JobResult { edges, error: None }
}
