use thiserror::Error;

/// The one way a formatter can fail: its output sink rejected a write.
/// A formatter stops draining its input the moment this happens — the
/// caller is responsible for discarding whatever is left on the channel
/// so the engine producing it doesn't block forever (DESIGN.md, Open
/// Question 3).
#[derive(Error, Debug)]
#[error("write failed: {0}")]
pub struct FormatError(#[from] pub std::io::Error);
