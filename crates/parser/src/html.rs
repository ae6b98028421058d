use scraper::{Html, Selector};

/// Extract the `href` of every `<a>` element in `html`, in document order.
///
/// Mirrors `darkscraper-parser`'s `extract_links` helper (select `a[href]`,
/// read the attribute) but drops every signal that crate collects beyond
/// the bare href — form/CAPTCHA/forum detection, Hyphanet key rewriting,
/// `is_external`/`is_onion` flags — since those serve a discovery pipeline
/// this crawler doesn't have. Filtering by domain, self-reference, and
/// resolvability against the parent is the scheduler's job (see
/// `crawlmap-engine::resolver`), not this extractor's: an empty href is the
/// only thing dropped here.
///
/// `scraper`'s underlying `html5ever` parser never fails on malformed
/// markup — it recovers the way a browser would — so this function has no
/// error return. The only failure mode named in the spec is an I/O error
/// reading the byte stream into `html`, which happens one layer up, in the
/// worker that reads the fetch response body.
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}
