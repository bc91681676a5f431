//! Error types shared across the WLD crates.

use std::error::Error;
use std::fmt;

/// Errors from [`NamePool`](crate::NamePool) lookups and name encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameError {
    /// A name reference points past the end of the pool.
    OffsetOutOfRange {
        /// Byte offset the reference decoded to.
        offset: usize,
        /// Length of the pool in bytes.
        pool_len: usize,
    },
    /// No NUL terminator between the offset and the end of the pool.
    Unterminated {
        /// Byte offset the string starts at.
        offset: usize,
    },
    /// A character cannot be stored as a single pool byte.
    Unencodable {
        /// The offending character.
        ch: char,
    },
    /// The string contains an interior NUL, which would truncate it on decode.
    EmbeddedNul,
    /// The pool has grown past what a negative `i32` offset can address.
    PoolOverflow {
        /// Pool length at the point of failure.
        len: usize,
    },
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OffsetOutOfRange { offset, pool_len } => {
                write!(f, "name offset {offset} is outside the {pool_len}-byte pool")
            }
            Self::Unterminated { offset } => {
                write!(f, "name at offset {offset} has no NUL terminator")
            }
            Self::Unencodable { ch } => {
                write!(f, "character {ch:?} cannot be stored in a single byte")
            }
            Self::EmbeddedNul => write!(f, "name contains an embedded NUL"),
            Self::PoolOverflow { len } => {
                write!(f, "string pool of {len} bytes exceeds the addressable range")
            }
        }
    }
}

impl Error for NameError {}

/// Errors detected by the `validate()` methods of the decode and export
/// configuration structs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A size or count limit is zero, which would reject every file.
    ZeroLimit {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A configured file name cannot be used as a file name.
    InvalidFileName {
        /// Name of the offending field.
        field: &'static str,
        /// The configured value.
        name: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroLimit { field } => write!(f, "{field} must be at least 1"),
            Self::InvalidFileName { field, name } => {
                write!(f, "{field} {name:?} is not a plain file name")
            }
        }
    }
}

impl Error for ConfigError {}
