//! Error types for graph assembly and encoding.

use std::error::Error;
use std::fmt;

use wld_core::{FragKind, NameError, RecordIndex};
use wld_raw::WldError;

/// Errors from building a [`SemanticGraph`](crate::SemanticGraph) or
/// encoding one back to records.
#[derive(Debug)]
pub enum GraphError {
    /// Envelope or record codec failure.
    Codec(WldError),
    /// A self-name offset does not address the string pool.
    Name {
        /// Record whose name failed to resolve.
        index: RecordIndex,
        /// Its kind.
        kind: FragKind,
        /// Pool lookup failure.
        source: NameError,
    },
    /// A reference field addresses a record past the end of the array.
    ReferenceOutOfBounds {
        /// Record holding the reference.
        index: RecordIndex,
        /// Its kind.
        kind: FragKind,
        /// Field holding the reference.
        field: &'static str,
        /// Raw referenced index.
        target: u32,
        /// Number of records in the file.
        record_count: usize,
    },
    /// A reference field addresses a record of the wrong kind.
    TypeMismatch {
        /// Record holding the reference.
        index: RecordIndex,
        /// Its kind.
        kind: FragKind,
        /// Field holding the reference.
        field: &'static str,
        /// Referenced record.
        target: RecordIndex,
        /// Kinds the field may reference.
        expected: &'static [FragKind],
        /// Kind actually found there.
        found: FragKind,
    },
    /// A record kind the graph does not model.
    UnsupportedKind {
        /// Offending record.
        index: RecordIndex,
        /// Its kind.
        kind: FragKind,
    },
    /// Two entries of one kind share a tag.
    DuplicateTag {
        /// Entry kind.
        kind: FragKind,
        /// Shared tag.
        tag: String,
    },
    /// A tag reference names no entry of the expected kind.
    UnknownTag {
        /// Kind the tag was looked up in.
        kind: FragKind,
        /// Missing tag.
        tag: String,
    },
    /// The graph cannot be represented in the binary format.
    InvalidGraph {
        /// What is wrong.
        detail: String,
    },
}

impl GraphError {
    pub(crate) fn invalid(detail: impl Into<String>) -> Self {
        Self::InvalidGraph {
            detail: detail.into(),
        }
    }
}

struct KindList(&'static [FragKind]);

impl fmt::Display for KindList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" or ")?;
            }
            write!(f, "{kind}")?;
        }
        Ok(())
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Name { index, kind, source } => {
                write!(f, "record {index} ({kind}): name: {source}")
            }
            Self::ReferenceOutOfBounds {
                index,
                kind,
                field,
                target,
                record_count,
            } => write!(
                f,
                "record {index} ({kind}): {field} references #{target} \
                 but the file has {record_count} records"
            ),
            Self::TypeMismatch {
                index,
                kind,
                field,
                target,
                expected,
                found,
            } => write!(
                f,
                "record {index} ({kind}): {field} references {target} which is {found}, \
                 expected {}",
                KindList(expected)
            ),
            Self::UnsupportedKind { index, kind } => {
                write!(f, "record {index}: unsupported kind {kind}")
            }
            Self::DuplicateTag { kind, tag } => {
                write!(f, "duplicate {} tag {tag:?}", kind.name())
            }
            Self::UnknownTag { kind, tag } => {
                write!(f, "no {} tagged {tag:?}", kind.name())
            }
            Self::InvalidGraph { detail } => write!(f, "invalid graph: {detail}"),
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec(e) => Some(e),
            Self::Name { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<WldError> for GraphError {
    fn from(e: WldError) -> Self {
        Self::Codec(e)
    }
}
