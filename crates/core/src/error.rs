use thiserror::Error;

/// A failed fetch, classified the way §4.3 of the spec requires: a
/// transport-level failure (unreachable host, timeout, cancellation) versus
/// a clean non-2xx response.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status: {0}")]
    Status(u16),
}

/// Everything the engine can report on its `errs` side channel, plus the
/// one fatal condition (`Config`) that prevents the engine from starting
/// at all.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("fetch {url}: {source}")]
    Fetch { url: String, source: FetchError },

    #[error("extract {url}: {message}")]
    Extract { url: String, message: String },
}

impl EngineError {
    pub fn fetch(url: impl Into<String>, source: FetchError) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }

    pub fn extract(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extract {
            url: url.into(),
            message: message.into(),
        }
    }
}
