//! Streaming WLD reader.
//!
//! [`WldReader`] validates the header and loads the string pool on
//! construction, then decodes one record per call. Cross-record indices are
//! left as-is; resolving them is the graph builder's job.

use std::io::{self, Read};

use tracing::{debug, trace, warn};
use wld_core::{FragKind, NamePool, RecordIndex};

use crate::codec::{decode_header, read_i32_le, read_u32_le, read_up_to};
use crate::config::DecodeConfig;
use crate::error::WldError;
use crate::frag::Fragment;
use crate::header::WldHeader;
use crate::raw::RawWld;

/// Reads a WLD file from a byte stream.
///
/// Generic over `R: Read` so tests can use `&[u8]` and production
/// code can use `BufReader<File>`.
pub struct WldReader<R: Read> {
    reader: R,
    header: WldHeader,
    pool: NamePool,
    config: DecodeConfig,
    records_read: u32,
}

impl<R: Read> WldReader<R> {
    /// Open a stream with the default limits.
    pub fn open(reader: R) -> Result<Self, WldError> {
        Self::with_config(reader, DecodeConfig::default())
    }

    /// Open a stream, reading and validating the header and string pool.
    pub fn with_config(mut reader: R, config: DecodeConfig) -> Result<Self, WldError> {
        config.validate()?;
        let header = decode_header(&mut reader)?;
        if header.record_count > config.max_record_count {
            return Err(WldError::LimitExceeded {
                what: "record count",
                value: header.record_count as usize,
                limit: config.max_record_count as usize,
            });
        }
        if header.reserved != [0; 3] {
            warn!(reserved = ?header.reserved, "non-zero reserved header words");
        }
        let pool_len = header.pool_len as usize;
        if pool_len > config.max_pool_len {
            return Err(WldError::LimitExceeded {
                what: "string pool length",
                value: pool_len,
                limit: config.max_pool_len,
            });
        }
        let bytes = read_up_to(&mut reader, pool_len)?;
        if bytes.len() < pool_len {
            return Err(WldError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("string pool truncated: {} of {pool_len} bytes", bytes.len()),
            )));
        }
        let pool = if header.version.scrambles_pool() {
            NamePool::from_scrambled(bytes)
        } else {
            NamePool::new(bytes)
        };
        debug!(
            version = %header.version,
            records = header.record_count,
            pool_len,
            "opened wld stream"
        );
        Ok(Self {
            reader,
            header,
            pool,
            config,
            records_read: 0,
        })
    }

    /// The validated header.
    pub fn header(&self) -> &WldHeader {
        &self.header
    }

    /// The decoded string pool.
    pub fn pool(&self) -> &NamePool {
        &self.pool
    }

    /// Number of records decoded so far.
    pub fn records_read(&self) -> u32 {
        self.records_read
    }

    /// Decode the next record, or `None` once the declared count is reached.
    pub fn next_record(&mut self) -> Result<Option<(RecordIndex, Fragment)>, WldError> {
        if self.records_read >= self.header.record_count {
            return Ok(None);
        }
        let Some(index) = RecordIndex::new(self.records_read + 1) else {
            return Ok(None);
        };

        let len = read_u32_le(&mut self.reader)? as usize;
        let kind = FragKind::from_code(read_i32_le(&mut self.reader)?);
        if len > self.config.max_record_len {
            return Err(WldError::LimitExceeded {
                what: "record length",
                value: len,
                limit: self.config.max_record_len,
            });
        }
        let payload = read_up_to(&mut self.reader, len)?;
        if payload.len() < len {
            return Err(WldError::TruncatedRecord {
                index,
                kind,
                needed: len,
                remaining: payload.len(),
            });
        }

        let frag = Fragment::decode_record(index, kind, &payload, self.header.version)?;
        trace!(%index, kind = kind.name(), len, "decoded record");
        self.records_read += 1;
        Ok(Some((index, frag)))
    }

    /// Convert into a record iterator.
    pub fn records(self) -> RecordIter<R> {
        RecordIter {
            inner: self,
            done: false,
        }
    }

    /// Decode every remaining record.
    pub fn read_all(mut self) -> Result<RawWld, WldError> {
        let remaining = (self.header.record_count - self.records_read) as usize;
        let mut fragments = Vec::with_capacity(remaining.min(1 << 16));
        while let Some((_, frag)) = self.next_record()? {
            fragments.push(frag);
        }
        Ok(RawWld {
            header: self.header,
            pool: self.pool,
            fragments,
        })
    }
}

/// Iterator adapter over decoded records.
pub struct RecordIter<R: Read> {
    inner: WldReader<R>,
    done: bool,
}

impl<R: Read> Iterator for RecordIter<R> {
    type Item = Result<(RecordIndex, Fragment), WldError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.inner.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
