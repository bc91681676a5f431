//! Streaming WLD writer.
//!
//! [`WldWriter`] writes the header and string pool on construction, then
//! appends one record per call. The header's record count is a promise:
//! [`WldWriter::finish`] fails if a different number of records was written.

use std::io::Write;

use tracing::debug;
use wld_core::{NamePool, RecordIndex};

use crate::codec::{encode_header, write_i32_le, write_u32_le};
use crate::error::WldError;
use crate::frag::Fragment;
use crate::header::{FormatVersion, WldHeader};

/// Writes a WLD file to a byte stream.
///
/// # Examples
///
/// ```
/// use wld_core::{NameRef, NamePool};
/// use wld_raw::frag::{Fragment, Sphere};
/// use wld_raw::{FormatVersion, WldHeader, WldReader, WldWriter};
///
/// let pool = NamePool::new(b"BALL\0\0\0\0".to_vec());
/// let header = WldHeader::new(FormatVersion::Plain, 1, 0);
///
/// let mut writer = WldWriter::new(Vec::new(), header, &pool).unwrap();
/// writer
///     .write_fragment(&Fragment::Sphere(Sphere { name: NameRef(0), radius: 2.0 }))
///     .unwrap();
/// let bytes = writer.finish().unwrap();
///
/// let mut reader = WldReader::open(bytes.as_slice()).unwrap();
/// let (_, frag) = reader.next_record().unwrap().unwrap();
/// assert_eq!(reader.pool().name(frag.name_ref().unwrap()).unwrap(), "BALL");
/// assert!(reader.next_record().unwrap().is_none());
/// ```
pub struct WldWriter<W: Write> {
    writer: W,
    version: FormatVersion,
    declared: u32,
    written: u32,
}

impl<W: Write> WldWriter<W> {
    /// Create a writer, immediately writing the header and pool.
    ///
    /// `header.pool_len` is replaced by the actual pool length.
    pub fn new(mut writer: W, mut header: WldHeader, pool: &NamePool) -> Result<Self, WldError> {
        header.pool_len = u32::try_from(pool.len()).map_err(|_| WldError::LimitExceeded {
            what: "string pool length",
            value: pool.len(),
            limit: u32::MAX as usize,
        })?;
        encode_header(&mut writer, &header)?;
        if header.version.scrambles_pool() {
            writer.write_all(&pool.to_scrambled())?;
        } else {
            writer.write_all(pool.as_bytes())?;
        }
        debug!(
            version = %header.version,
            records = header.record_count,
            pool_len = header.pool_len,
            "started wld stream"
        );
        Ok(Self {
            writer,
            version: header.version,
            declared: header.record_count,
            written: 0,
        })
    }

    /// Encode and append one record, returning its index.
    pub fn write_fragment(&mut self, frag: &Fragment) -> Result<RecordIndex, WldError> {
        let next = self.written + 1;
        let index = match RecordIndex::new(next) {
            Some(index) if self.written < self.declared => index,
            _ => {
                return Err(WldError::RecordCountMismatch {
                    declared: self.declared,
                    written: next,
                })
            }
        };
        let kind = frag.kind();
        let payload = frag
            .encode(self.version)
            .map_err(|e| WldError::in_record(index, kind, e))?;
        let len = u32::try_from(payload.len()).map_err(|_| WldError::LimitExceeded {
            what: "record length",
            value: payload.len(),
            limit: u32::MAX as usize,
        })?;
        write_u32_le(&mut self.writer, len)?;
        write_i32_le(&mut self.writer, kind.code())?;
        self.writer.write_all(&payload)?;
        self.written = next;
        Ok(index)
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> u32 {
        self.written
    }

    /// Check the record count, flush, and return the sink.
    pub fn finish(mut self) -> Result<W, WldError> {
        if self.written != self.declared {
            return Err(WldError::RecordCountMismatch {
                declared: self.declared,
                written: self.written,
            });
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}
