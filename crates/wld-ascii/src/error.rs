//! Error types for text export.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use wld_core::{ConfigError, FragKind};

/// Errors from exporting a graph as text.
#[derive(Debug)]
pub enum ExportError {
    /// An entry references a tag the graph does not define.
    UnknownTag {
        /// Kind the reference expects.
        kind: FragKind,
        /// The missing tag.
        tag: String,
    },
    /// Writing an exported file failed.
    Io {
        /// File or directory being written.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// Formatting an entry failed.
    Fmt(fmt::Error),
    /// The export configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTag { kind, tag } => {
                write!(f, "no {} is tagged {tag:?}", kind.name())
            }
            Self::Io { path, source } => write!(f, "writing {}: {source}", path.display()),
            Self::Fmt(_) => write!(f, "formatting failed"),
            Self::Config(e) => write!(f, "invalid export config: {e}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Fmt(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::UnknownTag { .. } => None,
        }
    }
}

impl From<fmt::Error> for ExportError {
    fn from(e: fmt::Error) -> Self {
        Self::Fmt(e)
    }
}

impl From<ConfigError> for ExportError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_names_the_kind() {
        let err = ExportError::UnknownTag {
            kind: FragKind::MaterialPalette,
            tag: "ZONE_MP".into(),
        };
        assert_eq!(err.to_string(), "no MaterialPalette is tagged \"ZONE_MP\"");
        assert!(err.source().is_none());
    }
}
