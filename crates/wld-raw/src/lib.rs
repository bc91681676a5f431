//! Binary envelope and per-kind record codecs for the WLD world format.
//!
//! This crate reads and writes the container byte-for-byte: header, string
//! pool, then a flat sequence of typed records. Record payloads are decoded
//! into [`Fragment`] variants whose cross-record references stay as raw
//! 1-based indices ([`RecordRef`](wld_core::RecordRef)).
//!
//! # Format
//!
//! ```text
//! Header (28 bytes):
//!   magic:        [u8; 4]   = 02 3D 50 54
//!   version:      u32 LE    (1, 0x00015500 or 0x1000C800)
//!   record_count: u32 LE
//!   reserved0:    u32 LE
//!   reserved1:    u32 LE
//!   pool_len:     u32 LE
//!   reserved2:    u32 LE
//!
//! String pool: pool_len bytes, scrambled unless version == 1
//!
//! Records (record_count times):
//!   payload_len:  u32 LE
//!   kind:         i32 LE
//!   payload:      [u8; payload_len]
//! ```
//!
//! All multi-byte values are little-endian.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod config;
pub mod error;
pub mod frag;
pub mod header;
pub mod raw;
pub mod reader;
pub mod writer;

pub use config::DecodeConfig;
pub use error::{PayloadError, WldError};
pub use frag::{Fragment, Payload};
pub use header::{FormatVersion, WldHeader};
pub use raw::RawWld;
pub use reader::{RecordIter, WldReader};
pub use writer::WldWriter;

/// File magic: the first four bytes of every WLD file.
pub const MAGIC: [u8; 4] = [0x02, 0x3D, 0x50, 0x54];
