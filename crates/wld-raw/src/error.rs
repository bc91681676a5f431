//! Error types for the envelope and record codecs.

use std::error::Error;
use std::fmt;
use std::io;

use wld_core::{ConfigError, FragKind, NameError, RecordIndex};

/// A failure decoding or encoding one record payload, before the envelope
/// attaches the record index.
#[derive(Clone, Debug, PartialEq)]
pub enum PayloadError {
    /// The layout needs more bytes than the payload has left.
    Truncated {
        /// Bytes the next field needs.
        needed: usize,
        /// Bytes left in the payload.
        remaining: usize,
    },
    /// A field holds a value the layout cannot represent.
    Invalid {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        detail: String,
    },
    /// A hashed string field could not be encoded.
    Name(NameError),
}

impl PayloadError {
    pub(crate) fn invalid(field: &'static str, detail: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { needed, remaining } => {
                write!(f, "needs {needed} more bytes, {remaining} remaining")
            }
            Self::Invalid { field, detail } => write!(f, "field {field}: {detail}"),
            Self::Name(e) => write!(f, "name: {e}"),
        }
    }
}

impl Error for PayloadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Name(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NameError> for PayloadError {
    fn from(e: NameError) -> Self {
        Self::Name(e)
    }
}

/// Errors from reading or writing a WLD file.
#[derive(Debug)]
pub enum WldError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The file does not start with the WLD magic bytes.
    InvalidMagic {
        /// The four bytes found instead.
        found: [u8; 4],
    },
    /// The header declares a format version this build does not handle.
    UnsupportedVersion {
        /// The version found in the file.
        found: u32,
    },
    /// A record's layout needs more bytes than its declared length.
    TruncatedRecord {
        /// 1-based record index.
        index: RecordIndex,
        /// Record kind.
        kind: FragKind,
        /// Bytes the next field needs.
        needed: usize,
        /// Bytes left in the record.
        remaining: usize,
    },
    /// A record decoded cleanly but left bytes unconsumed.
    SizeMismatch {
        /// 1-based record index.
        index: RecordIndex,
        /// Record kind.
        kind: FragKind,
        /// Payload length declared by the envelope.
        declared: usize,
        /// Bytes the decoder consumed.
        consumed: usize,
    },
    /// A record field holds a value its layout cannot represent.
    InvalidRecord {
        /// 1-based record index.
        index: RecordIndex,
        /// Record kind.
        kind: FragKind,
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        detail: String,
    },
    /// A header or record size exceeds the configured decode limit.
    LimitExceeded {
        /// What was being sized.
        what: &'static str,
        /// The declared size.
        value: usize,
        /// The configured limit.
        limit: usize,
    },
    /// The writer was finished with a different number of records than
    /// the header declared.
    RecordCountMismatch {
        /// Count written into the header.
        declared: u32,
        /// Records actually written.
        written: u32,
    },
    /// A name or hashed string could not be resolved or encoded.
    Name(NameError),
    /// The decode configuration is invalid.
    Config(ConfigError),
}

impl WldError {
    /// Attach a record position and kind to a payload failure.
    pub fn in_record(index: RecordIndex, kind: FragKind, err: PayloadError) -> Self {
        match err {
            PayloadError::Truncated { needed, remaining } => Self::TruncatedRecord {
                index,
                kind,
                needed,
                remaining,
            },
            PayloadError::Invalid { field, detail } => Self::InvalidRecord {
                index,
                kind,
                field,
                detail,
            },
            PayloadError::Name(e) => Self::InvalidRecord {
                index,
                kind,
                field: "name",
                detail: e.to_string(),
            },
        }
    }
}

impl fmt::Display for WldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic { found } => {
                write!(f, "invalid magic bytes {found:02X?} (expected [02, 3D, 50, 54])")
            }
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found:#010x}")
            }
            Self::TruncatedRecord {
                index,
                kind,
                needed,
                remaining,
            } => write!(
                f,
                "record {index} ({kind}) truncated: needs {needed} more bytes, {remaining} remaining"
            ),
            Self::SizeMismatch {
                index,
                kind,
                declared,
                consumed,
            } => write!(
                f,
                "record {index} ({kind}) declares {declared} bytes but decodes {consumed}"
            ),
            Self::InvalidRecord {
                index,
                kind,
                field,
                detail,
            } => write!(f, "record {index} ({kind}) field {field}: {detail}"),
            Self::LimitExceeded { what, value, limit } => {
                write!(f, "{what} of {value} exceeds the limit of {limit}")
            }
            Self::RecordCountMismatch { declared, written } => {
                write!(f, "header declares {declared} records but {written} were written")
            }
            Self::Name(e) => write!(f, "name: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl Error for WldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Name(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WldError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<NameError> for WldError {
    fn from(e: NameError) -> Self {
        Self::Name(e)
    }
}

impl From<ConfigError> for WldError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
