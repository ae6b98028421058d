mod error;
pub mod graphviz;
pub mod text;

pub use error::FormatError;

/// Which rendering a caller picked via `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Graphviz,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Format::Text),
            "graphviz" => Ok(Format::Graphviz),
            other => Err(format!("unknown format {other:?}, expected \"text\" or \"graphviz\"")),
        }
    }
}
