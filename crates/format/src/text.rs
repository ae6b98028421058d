use std::collections::HashSet;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crawlmap_core::Edge;

use crate::FormatError;

/// Renders the edge stream as a plain-text sitemap: every unique URL
/// string seen as either a `parent` or a `link`, one per line, with no
/// separator before the first entry and no trailing newline — ported
/// directly from `FormatAsTextSitemap` in the original crawler, which
/// writes `"\n" + s` before every entry but the first rather than
/// appending `"\n"` after each one.
///
/// Stops and returns `FormatError` the moment a write to `sink` fails,
/// without draining the rest of `results` — takes the receiver by `&mut`
/// rather than by value so the caller still holds it afterward and can
/// drain the remainder itself (DESIGN.md, Open Question 3).
pub async fn format(
    results: &mut mpsc::Receiver<Edge>,
    sink: &mut (impl AsyncWrite + Unpin),
) -> Result<(), FormatError> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut first = true;

    while let Some(edge) = results.recv().await {
        write_once(sink, &mut seen, &mut first, edge.parent.to_string()).await?;
        write_once(sink, &mut seen, &mut first, edge.link.to_string()).await?;
    }

    Ok(())
}

async fn write_once(
    sink: &mut (impl AsyncWrite + Unpin),
    seen: &mut HashSet<String>,
    first: &mut bool,
    url: String,
) -> Result<(), FormatError> {
    if seen.contains(&url) {
        return Ok(());
    }
    seen.insert(url.clone());

    if *first {
        *first = false;
        sink.write_all(url.as_bytes()).await?;
    } else {
        sink.write_all(b"\n").await?;
        sink.write_all(url.as_bytes()).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    async fn run(edges: Vec<(&str, &str)>) -> String {
        let (tx, mut rx) = mpsc::channel(8);
        for (parent, link) in edges {
            tx.send(Edge::new(Url::parse(parent).unwrap(), Url::parse(link).unwrap()))
                .await
                .unwrap();
        }
        drop(tx);

        let mut buf = Vec::new();
        format(&mut rx, &mut buf).await.unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn empty_stream_yields_empty_output() {
        assert_eq!(run(vec![]).await, "");
    }

    #[tokio::test]
    async fn two_edges_sharing_a_node() {
        let got = run(vec![
            ("http://test/", "https://test/link"),
            ("https://test/link", "http://test:8888/"),
        ])
        .await;
        assert_eq!(got, "http://test/\nhttps://test/link\nhttp://test:8888/");
    }

    #[tokio::test]
    async fn duplicate_urls_are_written_once() {
        let got = run(vec![
            ("http://test/", "http://test/a"),
            ("http://test/", "http://test/a"),
        ])
        .await;
        assert_eq!(got, "http://test/\nhttp://test/a");
    }
}
