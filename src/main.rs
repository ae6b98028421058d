mod cli;

use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use url::Url;

use crawlmap_core::EngineConfig;
use crawlmap_fetcher::Fetcher;
use crawlmap_format::Format;

use crate::cli::Cli;

// High-concurrency HTTP fan-out allocates and frees many short-lived
// response buffers; mimalloc handles that churn better than glibc's
// allocator, which is why the teacher pins it too.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let seed = match parse_seed(&cli.url) {
        Ok(seed) => seed,
        Err(e) => {
            eprintln!("invalid --url {:?}: {e}", cli.url);
            std::process::exit(1);
        }
    };

    let format = match Format::from_str(&cli.format) {
        Ok(format) => format,
        Err(e) => {
            eprintln!("invalid --format: {e}");
            std::process::exit(1);
        }
    };

    if cli.concurrency == 0 {
        eprintln!("invalid --concurrency: must be > 0");
        std::process::exit(1);
    }

    let config = EngineConfig {
        concurrency: cli.concurrency,
        request_timeout: cli.request_timeout,
    };

    let cancel = CancellationToken::new();
    if !cli.timeout.is_zero() {
        let cancel = cancel.clone();
        let timeout = cli.timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            cancel.cancel();
        });
    }

    let fetcher = Fetcher::new(config.request_timeout).context("building HTTP client")?;
    let (mut results, mut errs) = crawlmap_engine::start(
        seed,
        config.concurrency,
        config.request_timeout,
        cancel,
        fetcher,
    );

    let errs_task = tokio::spawn(async move {
        while let Some(err) = errs.recv().await {
            warn!(%err, "crawl error");
        }
    });

    let mut stdout = tokio::io::stdout();
    let format_result = match format {
        Format::Text => crawlmap_format::text::format(&mut results, &mut stdout).await,
        Format::Graphviz => crawlmap_format::graphviz::format(&mut results, &mut stdout).await,
    };

    if let Err(e) = format_result {
        // The sink (stdout) failed mid-stream. Drain the rest of `results`
        // in a discard loop so the scheduler isn't left blocked trying to
        // send into a channel nobody is reading (DESIGN.md, Open Question
        // 3) before surfacing the write failure to the caller.
        while results.recv().await.is_some() {}
        let _ = errs_task.await;
        eprintln!("format error: {e}");
        std::process::exit(1);
    }

    let _ = errs_task.await;
    Ok(())
}

/// Parses `--url` into an absolute URL with a non-empty host, matching
/// §6: a bare value with no scheme is treated as an `http://` host
/// entirely, and anything that still fails to parse or has no host is a
/// `ConfigError` raised here rather than forwarded into the engine.
fn parse_seed(raw: &str) -> Result<Url> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    let url = Url::parse(&candidate).context("parsing seed URL")?;
    if url.host_str().is_none() {
        bail!("seed URL has no host");
    }
    Ok(url)
}
