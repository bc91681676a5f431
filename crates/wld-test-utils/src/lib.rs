//! Test fixtures for WLD codec development.
//!
//! Byte-level builders for hand-assembled files, plus ready-made graphs
//! that touch every modeled kind. See [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{character_graph, material_file, zone_graph};

/// Builds a file byte by byte, bypassing the codecs under test.
///
/// Record payload lengths are filled in automatically; the header's pool
/// length and record count are whatever the caller declares.
pub struct WldBytes {
    out: Vec<u8>,
}

impl WldBytes {
    /// Start a file with the given header words.
    pub fn new(version: u32, record_count: u32, pool_len: u32) -> Self {
        let mut out = vec![0x02, 0x3D, 0x50, 0x54];
        for word in [version, record_count, 0, 0, pool_len, 0] {
            out.extend_from_slice(&word.to_le_bytes());
        }
        Self { out }
    }

    /// Append raw pool bytes.
    pub fn pool(mut self, bytes: &[u8]) -> Self {
        self.out.extend_from_slice(bytes);
        self
    }

    /// Append one record.
    pub fn record(mut self, code: i32, payload: &[u8]) -> Self {
        self.out
            .extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.out.extend_from_slice(&code.to_le_bytes());
        self.out.extend_from_slice(payload);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.out
    }
}

/// Little-endian payload builder.
#[derive(Default)]
pub struct Payload {
    bytes: Vec<u8>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32(mut self, v: f32) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn bytes(mut self, v: &[u8]) -> Self {
        self.bytes.extend_from_slice(v);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
