use url::Url;

/// Resolves a possibly-relative `href` found on `parent`'s page into an
/// absolute URL.
///
/// This is deliberately not `parent.join(href)`, which normalizes
/// percent-encoding and `.`/`..` segments differently than the source
/// crawler this crate preserves behavior from. The source resolver
/// additionally collapses a root-referencing link's path to the empty
/// string; `url::Url` enforces the WHATWG invariant that a special-scheme
/// URL's path always starts with `/`, so that exact representation isn't
/// reachable through this type — the closest attainable equivalent is the
/// bare `"/"` path, which is what this resolver produces instead (see
/// DESIGN.md's Open Question 2). Formatters that need to recognize a
/// root-referencing edge check for `path() == "/"` or `path().is_empty()`
/// interchangeably.
///
/// Returns `None` only when `href` cannot be resolved into any kind of URL
/// reference at all (disallowed characters, empty scheme with no path,
/// a relative-path reference whose first segment would be mistaken for a
/// scheme name, etc); the caller treats `None` as "drop this href", not as
/// an error.
pub fn resolve(parent: &Url, href: &str) -> Option<Url> {
    if href.is_empty() {
        return None;
    }

    // An href that parses on its own as an absolute URL carries its own
    // scheme and host, which win outright over the parent's.
    if let Ok(link) = Url::parse(href) {
        return Some(link);
    }

    // A protocol-relative reference ("//host/path") carries its own
    // authority but inherits the parent's scheme (RFC 3986 §4.2). It has
    // no scheme of its own, so the absolute-parse attempt above always
    // fails on it; resolve its authority explicitly instead of falling
    // through to path-relative joining, which would otherwise swallow the
    // host into the path.
    if let Some(rest) = href.strip_prefix("//") {
        let candidate = format!("{}://{}", parent.scheme(), rest);
        return Url::parse(&candidate).ok();
    }

    let (path_and_rest, fragment) = match href.split_once('#') {
        Some((p, f)) => (p, Some(f)),
        None => (href, None),
    };
    let (path, query) = match path_and_rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_and_rest, None),
    };

    // A relative-path reference (no leading `/`) whose first segment
    // contains a `:` is indistinguishable from `scheme:rest` and must be
    // rejected per RFC 3986 §4.2/§3.3, not lexically joined onto the
    // parent's path: e.g. `:/invalid` has an empty scheme before the `:`,
    // which is not a legal scheme, so the whole href is unparseable.
    if !path.is_empty() && !path.starts_with('/') {
        let first_segment = path.split('/').next().unwrap_or("");
        if first_segment.contains(':') {
            return None;
        }
    }

    let resolved_path = if path.is_empty() {
        parent.path().to_string()
    } else if path.starts_with('/') {
        lexical_clean(path)
    } else {
        lexical_clean(&format!("{}/{}", parent_dir(parent), path))
    };

    let mut built = format!("{}://{}{}", parent.scheme(), authority(parent), resolved_path);
    if let Some(q) = query {
        built.push('?');
        built.push_str(q);
    }
    if let Some(f) = fragment {
        built.push('#');
        built.push_str(f);
    }

    Url::parse(&built).ok()
}

fn authority(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

fn parent_dir(parent: &Url) -> String {
    match parent.path().rfind('/') {
        Some(idx) => parent.path()[..idx].to_string(),
        None => String::new(),
    }
}

/// Resolves `.` and `..` segments and collapses repeated `/`, the way
/// `path/filepath.Clean` does in the source implementation.
fn lexical_clean(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn resolve_relative_path() {
        let p = parent("http://example.com/dir/page.html");
        let resolved = resolve(&p, "other.html").unwrap();
        assert_eq!(resolved.as_str(), "http://example.com/dir/other.html");
    }

    #[test]
    fn resolve_absolute_path_inherits_scheme_and_host() {
        let p = parent("http://example.com/dir/page.html");
        let resolved = resolve(&p, "/elsewhere").unwrap();
        assert_eq!(resolved.as_str(), "http://example.com/elsewhere");
    }

    #[test]
    fn resolve_absolute_url_with_own_host_wins() {
        let p = parent("http://example.com/dir/page.html");
        let resolved = resolve(&p, "https://other.example/page").unwrap();
        assert_eq!(resolved.host_str(), Some("other.example"));
        assert_eq!(resolved.scheme(), "https");
    }

    #[test]
    fn resolve_root_path_is_bare_slash() {
        let p = parent("http://example.com/dir/page.html");
        let resolved = resolve(&p, "/").unwrap();
        assert_eq!(resolved.path(), "/");
        assert_eq!(resolved.as_str(), "http://example.com/");
    }

    #[test]
    fn resolve_dot_dot_cleans_lexically() {
        let p = parent("http://example.com/a/b/page.html");
        let resolved = resolve(&p, "../sibling.html").unwrap();
        assert_eq!(resolved.path(), "/a/sibling.html");
    }

    #[test]
    fn resolve_empty_href_preserves_parent_path() {
        let p = parent("http://example.com/dir/page.html?x=1");
        let resolved = resolve(&p, "#frag").unwrap();
        assert_eq!(resolved.path(), "/dir/page.html");
        assert_eq!(resolved.fragment(), Some("frag"));
    }

    #[test]
    fn resolve_preserves_query_and_fragment() {
        let p = parent("http://example.com/dir/");
        let resolved = resolve(&p, "page.html?x=1#y").unwrap();
        assert_eq!(resolved.query(), Some("x=1"));
        assert_eq!(resolved.fragment(), Some("y"));
    }

    #[test]
    fn resolve_inherits_parent_port() {
        let p = parent("http://example.com:8080/dir/page.html");
        let resolved = resolve(&p, "/x").unwrap();
        assert_eq!(resolved.port(), Some(8080));
    }

    #[test]
    fn resolve_rejects_href_with_colon_in_first_segment() {
        let p = parent("http://example.com/dir/page.html");
        assert!(resolve(&p, ":/invalid").is_none());
    }

    #[test]
    fn resolve_protocol_relative_href_keeps_its_own_host() {
        let p = parent("http://example.com/dir/page.html");
        let resolved = resolve(&p, "//cdn.example.com/a.js").unwrap();
        assert_eq!(resolved.scheme(), "http");
        assert_eq!(resolved.host_str(), Some("cdn.example.com"));
        assert_eq!(resolved.path(), "/a.js");
    }

    #[test]
    fn resolve_protocol_relative_href_inherits_parent_scheme() {
        let p = parent("https://example.com/dir/page.html");
        let resolved = resolve(&p, "//cdn.example.com/a.js").unwrap();
        assert_eq!(resolved.scheme(), "https");
    }
}
