//! String pool lookup (decode) and interning (encode).
//!
//! A [`NamePool`] is the descrambled pool of one file. A [`NameTable`] is
//! the caller-owned context used while encoding one file: it is created per
//! call and consumed into the pool bytes, so no name state outlives the
//! operation that produced it.

use indexmap::IndexMap;

use crate::error::NameError;
use crate::hash::{from_latin1, scramble, to_latin1};
use crate::id::NameRef;

/// The decoded string pool of one file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamePool {
    bytes: Vec<u8>,
}

impl NamePool {
    /// Wrap plain (already descrambled) pool bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Wrap pool bytes as stored on disk by a scrambling format version.
    pub fn from_scrambled(mut bytes: Vec<u8>) -> Self {
        scramble(&mut bytes);
        Self { bytes }
    }

    /// The plain pool bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The pool bytes scrambled for storage.
    pub fn to_scrambled(&self) -> Vec<u8> {
        let mut out = self.bytes.clone();
        scramble(&mut out);
        out
    }

    /// Pool length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Resolve a name reference.
    ///
    /// References that do not address the pool (positive values) resolve
    /// to the empty string.
    pub fn name(&self, name: NameRef) -> Result<String, NameError> {
        let Some(offset) = name.offset() else {
            return Ok(String::new());
        };
        let tail = self
            .bytes
            .get(offset..)
            .filter(|t| !t.is_empty())
            .ok_or(NameError::OffsetOutOfRange {
                offset,
                pool_len: self.bytes.len(),
            })?;
        let end = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(NameError::Unterminated { offset })?;
        Ok(from_latin1(&tail[..end]))
    }
}

/// Encode-side name interning.
///
/// Offset 0 always holds the empty string, so an empty or absent name
/// encodes as `NameRef(0)`. Repeated names share one pool entry.
#[derive(Clone, Debug)]
pub struct NameTable {
    bytes: Vec<u8>,
    offsets: IndexMap<String, NameRef>,
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NameTable {
    /// A table holding only the empty string at offset 0.
    pub fn new() -> Self {
        let mut offsets = IndexMap::new();
        offsets.insert(String::new(), NameRef(0));
        Self {
            bytes: vec![0],
            offsets,
        }
    }

    /// Intern `name`, returning its reference.
    pub fn intern(&mut self, name: &str) -> Result<NameRef, NameError> {
        if let Some(&existing) = self.offsets.get(name) {
            return Ok(existing);
        }
        let encoded = to_latin1(name)?;
        let offset = self.bytes.len();
        let name_ref = NameRef::from_offset(offset).ok_or(NameError::PoolOverflow { len: offset })?;
        self.bytes.extend_from_slice(&encoded);
        self.bytes.push(0);
        self.offsets.insert(name.to_owned(), name_ref);
        Ok(name_ref)
    }

    /// Number of distinct names interned, including the empty string.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Always false: the empty string is present from construction.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Finish the table, zero-padding the pool to a 4-byte boundary.
    pub fn into_pool(mut self) -> NamePool {
        let padded = self.bytes.len().next_multiple_of(4);
        self.bytes.resize(padded, 0);
        NamePool::new(self.bytes)
    }
}
