//! Facade error type.

use std::error::Error as StdError;
use std::fmt;

use wld_ascii::ExportError;
use wld_core::ConfigError;
use wld_graph::GraphError;
use wld_raw::WldError;

use crate::archive::ArchiveError;

/// Any failure from the facade's entry points.
#[derive(Debug)]
pub enum Error {
    /// The file bytes could not be decoded or encoded.
    Codec(WldError),
    /// References could not be resolved, or the graph could not be encoded.
    Graph(GraphError),
    /// Text export failed.
    Export(ExportError),
    /// The archive could not supply or accept an entry.
    Archive(ArchiveError),
    /// The configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Graph(e) => write!(f, "graph: {e}"),
            Self::Export(e) => write!(f, "export: {e}"),
            Self::Archive(e) => write!(f, "archive: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Codec(e) => Some(e),
            Self::Graph(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Archive(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

impl From<WldError> for Error {
    fn from(e: WldError) -> Self {
        Self::Codec(e)
    }
}

impl From<GraphError> for Error {
    fn from(e: GraphError) -> Self {
        Self::Graph(e)
    }
}

impl From<ExportError> for Error {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

impl From<ArchiveError> for Error {
    fn from(e: ArchiveError) -> Self {
        Self::Archive(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
