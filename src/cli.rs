use std::time::Duration;

use clap::Parser;

/// A single-host, same-domain web crawler that renders what it finds as a
/// sitemap. Unlike the teacher's `darkscraper` (a `Cli` with a `Commands`
/// subcommand for crawl/search/status/auto-register/export, each backed by
/// Postgres), this binary does one thing, so the subcommand enum collapses
/// to one flat flag set (DESIGN.md).
#[derive(Parser)]
#[command(name = "crawlmap", about = "Same-domain web crawler and sitemap renderer")]
pub struct Cli {
    /// Seed URL to start crawling from. If no scheme is given, `http://` is
    /// assumed and the whole value is treated as a bare host.
    #[arg(long)]
    pub url: String,

    /// Number of concurrent fetch workers.
    #[arg(long, default_value_t = 10)]
    pub concurrency: usize,

    /// Overall crawl deadline (e.g. "30s", "5m"). Zero means unbounded.
    #[arg(long, default_value = "0s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Per-request fetch deadline (e.g. "30s", "5m").
    #[arg(long, default_value = "60s", value_parser = parse_duration)]
    pub request_timeout: Duration,

    /// Output rendering: "text" (sitemap) or "graphviz" (DOT).
    #[arg(long, default_value = "text")]
    pub format: String,
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s).map_err(|e| e.to_string())
}
