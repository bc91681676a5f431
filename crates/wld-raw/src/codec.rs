//! Binary primitives for the WLD envelope and record payloads.
//!
//! All integers are little-endian. The envelope reads and writes through
//! `&mut dyn Read` / `&mut dyn Write`; record payloads are decoded from a
//! bounded [`FragReader`] over the record's own bytes, so a payload decoder
//! can never run into the next record, and encoded into a [`FragWriter`]
//! whose 4-byte alignment is measured from the start of the payload.

use std::io::{Read, Write};

use wld_core::{NameRef, RecordRef};

use crate::error::{PayloadError, WldError};
use crate::header::{FormatVersion, WldHeader};
use crate::MAGIC;

// ── Stream writers ─────────────────────────────────────────────

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), WldError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i32.
pub fn write_i32_le(w: &mut dyn Write, v: i32) -> Result<(), WldError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

// ── Stream readers ─────────────────────────────────────────────

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, WldError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian i32.
pub fn read_i32_le(r: &mut dyn Read) -> Result<i32, WldError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Read exactly `len` bytes, returning however many arrived if the stream
/// ends first.
pub fn read_up_to(r: &mut dyn Read, len: usize) -> Result<Vec<u8>, WldError> {
    let mut buf = Vec::with_capacity(len);
    r.take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

// ── Header encode/decode ───────────────────────────────────────

/// Encode the 28-byte file header.
pub fn encode_header(w: &mut dyn Write, header: &WldHeader) -> Result<(), WldError> {
    w.write_all(&MAGIC)?;
    write_u32_le(w, header.version.code())?;
    write_u32_le(w, header.record_count)?;
    write_u32_le(w, header.reserved[0])?;
    write_u32_le(w, header.reserved[1])?;
    write_u32_le(w, header.pool_len)?;
    write_u32_le(w, header.reserved[2])?;
    Ok(())
}

/// Decode and validate the file header.
pub fn decode_header(r: &mut dyn Read) -> Result<WldHeader, WldError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(WldError::InvalidMagic { found: magic });
    }

    let version = FormatVersion::from_code(read_u32_le(r)?)?;
    let record_count = read_u32_le(r)?;
    let reserved0 = read_u32_le(r)?;
    let reserved1 = read_u32_le(r)?;
    let pool_len = read_u32_le(r)?;
    let reserved2 = read_u32_le(r)?;

    Ok(WldHeader {
        version,
        record_count,
        reserved: [reserved0, reserved1, reserved2],
        pool_len,
    })
}

// ── Payload reader ─────────────────────────────────────────────

/// Bounded little-endian cursor over one record payload.
#[derive(Debug)]
pub struct FragReader<'a> {
    buf: &'a [u8],
    pos: usize,
    version: FormatVersion,
}

impl<'a> FragReader<'a> {
    /// Start reading `buf` as a payload of a `version` file.
    pub fn new(buf: &'a [u8], version: FormatVersion) -> Self {
        Self {
            buf,
            pos: 0,
            version,
        }
    }

    /// Format version of the enclosing file.
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], PayloadError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(PayloadError::Truncated {
                needed: n,
                remaining,
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], PayloadError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read a byte.
    pub fn u8(&mut self) -> Result<u8, PayloadError> {
        Ok(self.array::<1>()?[0])
    }

    /// Read a signed byte.
    pub fn i8(&mut self) -> Result<i8, PayloadError> {
        Ok(i8::from_le_bytes(self.array()?))
    }

    /// Read a little-endian u16.
    pub fn u16(&mut self) -> Result<u16, PayloadError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    /// Read a little-endian i16.
    pub fn i16(&mut self) -> Result<i16, PayloadError> {
        Ok(i16::from_le_bytes(self.array()?))
    }

    /// Read a little-endian u32.
    pub fn u32(&mut self) -> Result<u32, PayloadError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    /// Read a little-endian i32.
    pub fn i32(&mut self) -> Result<i32, PayloadError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    /// Read a little-endian f32.
    pub fn f32(&mut self) -> Result<f32, PayloadError> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    /// Read three f32s.
    pub fn vec3(&mut self) -> Result<[f32; 3], PayloadError> {
        Ok([self.f32()?, self.f32()?, self.f32()?])
    }

    /// Read four f32s.
    pub fn vec4(&mut self) -> Result<[f32; 4], PayloadError> {
        Ok([self.f32()?, self.f32()?, self.f32()?, self.f32()?])
    }

    /// Read a self-name or name-valued field.
    pub fn name(&mut self) -> Result<NameRef, PayloadError> {
        Ok(NameRef(self.i32()?))
    }

    /// Read a record reference field.
    pub fn record_ref(&mut self) -> Result<RecordRef, PayloadError> {
        Ok(RecordRef::from_raw(self.u32()?))
    }

    /// Read `n` raw bytes.
    pub fn bytes(&mut self, n: usize) -> Result<Vec<u8>, PayloadError> {
        Ok(self.take(n)?.to_vec())
    }

    /// Read everything that is left.
    pub fn rest(&mut self) -> Vec<u8> {
        let out = self.buf[self.pos..].to_vec();
        self.pos = self.buf.len();
        out
    }

    /// Check that `count` elements of at least `elem_size` bytes each can
    /// fit in what is left, so a corrupt count fails before allocating.
    pub fn check_count(&self, count: usize, elem_size: usize) -> Result<usize, PayloadError> {
        let needed = count.saturating_mul(elem_size);
        let remaining = self.remaining();
        if needed > remaining {
            return Err(PayloadError::Truncated { needed, remaining });
        }
        Ok(count)
    }

    /// Read a u32 element count and check it against the remaining bytes.
    pub fn count(&mut self, elem_size: usize) -> Result<usize, PayloadError> {
        let count = self.u32()? as usize;
        self.check_count(count, elem_size)
    }

    /// Skip zero padding up to the next 4-byte boundary.
    pub fn skip_pad4(&mut self) -> Result<(), PayloadError> {
        let pad = self.pos.next_multiple_of(4) - self.pos;
        self.take(pad)?;
        Ok(())
    }
}

// ── Payload writer ─────────────────────────────────────────────

/// Little-endian payload builder.
#[derive(Debug)]
pub struct FragWriter {
    buf: Vec<u8>,
    version: FormatVersion,
}

impl FragWriter {
    /// Start a payload for a `version` file.
    pub fn new(version: FormatVersion) -> Self {
        Self {
            buf: Vec::new(),
            version,
        }
    }

    /// Format version of the enclosing file.
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write a byte.
    pub fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    /// Write a signed byte.
    pub fn i8(&mut self, v: i8) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Write a little-endian u16.
    pub fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Write a little-endian i16.
    pub fn i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Write a little-endian u32.
    pub fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Write a little-endian i32.
    pub fn i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Write a little-endian f32.
    pub fn f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Write three f32s.
    pub fn vec3(&mut self, v: [f32; 3]) {
        v.into_iter().for_each(|c| self.f32(c));
    }

    /// Write four f32s.
    pub fn vec4(&mut self, v: [f32; 4]) {
        v.into_iter().for_each(|c| self.f32(c));
    }

    /// Write a name-valued field.
    pub fn name(&mut self, v: NameRef) {
        self.i32(v.0);
    }

    /// Write a record reference field.
    pub fn record_ref(&mut self, v: RecordRef) {
        self.u32(v.raw());
    }

    /// Write raw bytes.
    pub fn bytes(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(v);
    }

    /// Write a u32 element count.
    pub fn count(&mut self, len: usize, field: &'static str) -> Result<(), PayloadError> {
        let n = u32::try_from(len)
            .map_err(|_| PayloadError::invalid(field, format!("{len} elements exceed u32")))?;
        self.u32(n);
        Ok(())
    }

    /// Write a u16 element count.
    pub fn count_u16(&mut self, len: usize, field: &'static str) -> Result<(), PayloadError> {
        let n = u16::try_from(len)
            .map_err(|_| PayloadError::invalid(field, format!("{len} elements exceed u16")))?;
        self.u16(n);
        Ok(())
    }

    /// Zero-pad to the next 4-byte boundary.
    pub fn pad4(&mut self) {
        let padded = self.buf.len().next_multiple_of(4);
        self.buf.resize(padded, 0);
    }

    /// Finish the payload.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_header() -> WldHeader {
        WldHeader {
            version: FormatVersion::Legacy,
            record_count: 3,
            reserved: [7, 8, 9],
            pool_len: 20,
        }
    }

    #[test]
    fn header_layout_is_bit_exact() {
        let mut buf = Vec::new();
        encode_header(&mut buf, &sample_header()).unwrap();
        assert_eq!(buf.len(), WldHeader::SIZE);
        assert_eq!(&buf[0..4], &[0x02, 0x3D, 0x50, 0x54]);
        assert_eq!(&buf[4..8], &0x0001_5500u32.to_le_bytes());
        assert_eq!(&buf[8..12], &3u32.to_le_bytes());
        assert_eq!(&buf[12..16], &7u32.to_le_bytes());
        assert_eq!(&buf[16..20], &8u32.to_le_bytes());
        assert_eq!(&buf[20..24], &20u32.to_le_bytes());
        assert_eq!(&buf[24..28], &9u32.to_le_bytes());
        assert_eq!(decode_header(&mut buf.as_slice()).unwrap(), sample_header());
    }

    #[test]
    fn bad_magic() {
        let mut buf = vec![0x02, 0x3D, 0x50, 0x55];
        buf.extend_from_slice(&[0; 24]);
        let result = decode_header(&mut buf.as_slice());
        assert!(matches!(
            result,
            Err(WldError::InvalidMagic {
                found: [0x02, 0x3D, 0x50, 0x55]
            })
        ));
    }

    #[test]
    fn bad_version() {
        let mut buf = MAGIC.to_vec();
        buf.extend_from_slice(&99u32.to_le_bytes());
        buf.extend_from_slice(&[0; 20]);
        let result = decode_header(&mut buf.as_slice());
        assert!(matches!(result, Err(WldError::UnsupportedVersion { found: 99 })));
    }

    #[test]
    fn short_header_is_an_io_error() {
        let buf = MAGIC.to_vec();
        assert!(matches!(decode_header(&mut buf.as_slice()), Err(WldError::Io(_))));
    }

    #[test]
    fn reader_refuses_to_overrun() {
        let bytes = [1u8, 0, 0];
        let mut r = FragReader::new(&bytes, FormatVersion::Plain);
        assert_eq!(
            r.u32(),
            Err(PayloadError::Truncated {
                needed: 4,
                remaining: 3
            })
        );
        assert_eq!(r.u16().unwrap(), 1);
        assert_eq!(r.remaining(), 1);
    }

    #[test]
    fn corrupt_count_fails_before_allocating() {
        let bytes = u32::MAX.to_le_bytes();
        let mut r = FragReader::new(&bytes, FormatVersion::Plain);
        assert!(matches!(r.count(4), Err(PayloadError::Truncated { .. })));
    }

    #[test]
    fn padding_is_relative_to_payload_start() {
        let mut w = FragWriter::new(FormatVersion::Plain);
        w.u16(5);
        w.u8(1);
        w.pad4();
        assert_eq!(w.len(), 4);
        w.pad4();
        assert_eq!(w.len(), 4);

        let bytes = w.into_bytes();
        let mut r = FragReader::new(&bytes, FormatVersion::Plain);
        r.u16().unwrap();
        r.u8().unwrap();
        r.skip_pad4().unwrap();
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn u16_count_overflow_is_reported() {
        let mut w = FragWriter::new(FormatVersion::Plain);
        assert!(matches!(
            w.count_u16(70_000, "vertices"),
            Err(PayloadError::Invalid { field: "vertices", .. })
        ));
    }

    proptest! {
        #[test]
        fn primitive_roundtrip(a in any::<u32>(), b in any::<i16>(), c in any::<f32>(), d in any::<i8>()) {
            let mut w = FragWriter::new(FormatVersion::Plain);
            w.u32(a);
            w.i16(b);
            w.f32(c);
            w.i8(d);
            let bytes = w.into_bytes();
            let mut r = FragReader::new(&bytes, FormatVersion::Plain);
            prop_assert_eq!(r.u32().unwrap(), a);
            prop_assert_eq!(r.i16().unwrap(), b);
            prop_assert_eq!(r.f32().unwrap().to_bits(), c.to_bits());
            prop_assert_eq!(r.i8().unwrap(), d);
            prop_assert_eq!(r.remaining(), 0);
        }
    }
}
