//! A fully decoded file held in memory.

use std::io::{Read, Write};

use indexmap::IndexMap;
use wld_core::{FragKind, NamePool, RecordIndex};

use crate::config::DecodeConfig;
use crate::error::WldError;
use crate::frag::Fragment;
use crate::header::{FormatVersion, WldHeader};
use crate::reader::WldReader;
use crate::writer::WldWriter;

/// Header, string pool and every record of one file, in file order.
///
/// Record `i` (1-based) is `fragments[i - 1]`. When written back, the
/// header's record count and pool length are recomputed from the contents;
/// the version and reserved words are kept.
#[derive(Clone, Debug, PartialEq)]
pub struct RawWld {
    /// Header as read, or as it will be written.
    pub header: WldHeader,
    /// Decoded string pool.
    pub pool: NamePool,
    /// Records in file order.
    pub fragments: Vec<Fragment>,
}

impl RawWld {
    /// An in-memory file with zeroed reserved header words.
    pub fn new(version: FormatVersion, pool: NamePool, fragments: Vec<Fragment>) -> Self {
        let header = WldHeader::new(version, fragments.len() as u32, pool.len() as u32);
        Self {
            header,
            pool,
            fragments,
        }
    }

    /// Decode a whole stream with the default limits.
    pub fn read_from(reader: impl Read) -> Result<Self, WldError> {
        WldReader::open(reader)?.read_all()
    }

    /// Decode a whole stream with explicit limits.
    pub fn read_with_config(reader: impl Read, config: DecodeConfig) -> Result<Self, WldError> {
        WldReader::with_config(reader, config)?.read_all()
    }

    /// Decode an in-memory file.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WldError> {
        Self::read_from(bytes)
    }

    /// Encode to a stream.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<W, WldError> {
        let record_count =
            u32::try_from(self.fragments.len()).map_err(|_| WldError::LimitExceeded {
                what: "record count",
                value: self.fragments.len(),
                limit: u32::MAX as usize,
            })?;
        let header = WldHeader {
            record_count,
            ..self.header
        };
        let mut writer = WldWriter::new(writer, header, &self.pool)?;
        for frag in &self.fragments {
            writer.write_fragment(frag)?;
        }
        writer.finish()
    }

    /// Encode to a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WldError> {
        self.write_to(Vec::new())
    }

    /// Format version.
    pub fn version(&self) -> FormatVersion {
        self.header.version
    }

    /// Record at a 1-based index.
    pub fn get(&self, index: RecordIndex) -> Option<&Fragment> {
        self.fragments.get(index.position())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the file has no records.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Records paired with their 1-based indices.
    pub fn iter(&self) -> impl Iterator<Item = (RecordIndex, &Fragment)> {
        self.fragments
            .iter()
            .enumerate()
            .filter_map(|(pos, frag)| RecordIndex::from_position(pos).map(|i| (i, frag)))
    }

    /// Record counts per kind, in order of first appearance.
    pub fn kind_histogram(&self) -> IndexMap<FragKind, usize> {
        let mut counts = IndexMap::new();
        for frag in &self.fragments {
            *counts.entry(frag.kind()).or_insert(0) += 1;
        }
        counts
    }
}
