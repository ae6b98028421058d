use std::collections::HashSet;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use url::Url;

use crawlmap_core::Edge;

use crate::FormatError;

/// Renders the edge stream as a Graphviz `digraph`, one `"origin" -> "target"`
/// line per unique edge, deduplicated on the rendered line itself (not on
/// the `Edge`, so two edges that render identically after node-label
/// shortening still collapse to one line) — built from spec §4.6 directly,
/// in the same `AsyncWrite`-sink style as `crawlmap-format::text`.
pub async fn format(
    results: &mut mpsc::Receiver<Edge>,
    sink: &mut (impl AsyncWrite + Unpin),
) -> Result<(), FormatError> {
    let mut seen: HashSet<String> = HashSet::new();

    sink.write_all(b"digraph {\n").await?;

    while let Some(edge) = results.recv().await {
        let line = format!(
            "\"{}\" -> \"{}\"\n",
            node_label(&edge.parent),
            node_label(&edge.link)
        );
        if seen.insert(line.clone()) {
            sink.write_all(line.as_bytes()).await?;
        }
    }

    sink.write_all(b"}").await?;
    Ok(())
}

/// Derives a Graphviz node label from a URL: strip the scheme prefix, then
/// collapse to the bare authority if nothing but the root path follows it,
/// otherwise keep the path (and any query/fragment) with its leading `/`.
fn node_label(url: &Url) -> String {
    let s = url.as_str();
    let stripped = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"))
        .unwrap_or(s);

    let auth = authority(url);
    if stripped == auth || stripped == format!("{auth}/") {
        return auth;
    }

    match stripped.strip_prefix(&auth) {
        Some(rest) => rest.to_string(),
        None => stripped.to_string(),
    }
}

fn authority(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}
