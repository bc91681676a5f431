//! Core types for the WLD world format.
//!
//! This is the leaf crate in the WLD dependency graph. It defines the
//! vocabulary every other crate speaks:
//!
//! - [`FragKind`]: the closed table of record type tags
//! - [`RecordIndex`] / [`RecordRef`]: 1-based positions into the record
//!   array, with `0` decoded as an explicit absent reference
//! - [`NameRef`]: a self-name reference into the string pool
//! - [`NamePool`] / [`NameTable`]: decode-side lookup and encode-side
//!   interning of pool strings
//! - [`hash`]: the cyclic XOR scramble applied to pool and string fields

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod hash;
pub mod id;
pub mod kind;
pub mod names;

pub use error::{ConfigError, NameError};
pub use id::{NameRef, RecordIndex, RecordRef};
pub use kind::FragKind;
pub use names::{NamePool, NameTable};
