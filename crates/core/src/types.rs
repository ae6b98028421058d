use url::Url;

/// A single parent→link discovery made while crawling `parent`'s page.
///
/// Identity and equality of an `Edge` is by the string form of its two
/// URLs, not by `url::Url`'s own `PartialEq` — two URLs that serialize
/// identically are the same URL everywhere in this crate.
#[derive(Debug, Clone)]
pub struct Edge {
    pub parent: Url,
    pub link: Url,
}

impl Edge {
    pub fn new(parent: Url, link: Url) -> Self {
        Self { parent, link }
    }

    /// String form `"<parent>-><link>"`, the uniqueness key for the
    /// scheduler's seen-edge set.
    pub fn key(&self) -> String {
        format!("{}->{}", self.parent, self.link)
    }

    pub fn is_self_reference(&self) -> bool {
        self.parent.as_str() == self.link.as_str()
    }

    /// Same-domain means equal host *and* port (the glossary's "host
    /// component, including port"), so a link to the same host on a
    /// different port counts as cross-domain.
    pub fn is_same_domain(&self) -> bool {
        self.parent.host_str() == self.link.host_str()
            && self.parent.port_or_known_default() == self.link.port_or_known_default()
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
