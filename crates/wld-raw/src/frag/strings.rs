//! Kinds whose payload is one or more hashed strings.

use wld_core::hash::{decode_hashed, encode_hashed};
use wld_core::NameRef;

use super::Payload;
use crate::codec::{FragReader, FragWriter};
use crate::error::PayloadError;

/// 0x01: path of the default palette bitmap.
///
/// Layout: `u16` length, scrambled string plus NUL, zero pad to 4.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefaultPaletteFile {
    /// Palette file path.
    pub path: String,
}

impl Payload for DefaultPaletteFile {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let len = r.u16()? as usize;
        let path = decode_hashed(&r.bytes(len)?);
        r.skip_pad4()?;
        Ok(Self { path })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        let bytes = encode_hashed(&self.path)?;
        w.count_u16(bytes.len(), "path")?;
        w.bytes(&bytes);
        w.pad4();
        Ok(())
    }
}

/// 0x02: free-form user data string.
///
/// Layout: `u32` length, scrambled string plus NUL, zero pad to 4.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserData {
    /// The string.
    pub data: String,
}

impl Payload for UserData {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let len = r.count(1)?;
        let data = decode_hashed(&r.bytes(len)?);
        r.skip_pad4()?;
        Ok(Self { data })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        let bytes = encode_hashed(&self.data)?;
        w.count(bytes.len(), "data")?;
        w.bytes(&bytes);
        w.pad4();
        Ok(())
    }
}

/// 0x03: bitmap file names.
///
/// The stored count is one less than the number of names, so a record
/// always names at least one bitmap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BmInfo {
    /// Self-name.
    pub name: NameRef,
    /// Bitmap file names, in frame order.
    pub textures: Vec<String>,
}

impl Payload for BmInfo {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let stored = r.u32()?;
        let count = stored
            .checked_add(1)
            .ok_or_else(|| PayloadError::invalid("textures", "texture count overflows u32"))?;
        let count = r.check_count(count as usize, 2)?;
        let mut textures = Vec::with_capacity(count);
        for _ in 0..count {
            let len = r.u16()? as usize;
            textures.push(decode_hashed(&r.bytes(len)?));
        }
        r.skip_pad4()?;
        Ok(Self { name, textures })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        if self.textures.is_empty() {
            return Err(PayloadError::invalid(
                "textures",
                "at least one texture is required",
            ));
        }
        w.name(self.name);
        w.count(self.textures.len() - 1, "textures")?;
        for texture in &self.textures {
            let bytes = encode_hashed(texture)?;
            w.count_u16(bytes.len(), "textures")?;
            w.bytes(&bytes);
        }
        w.pad4();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frag::tests::roundtrip;
    use crate::frag::Fragment;
    use crate::header::FormatVersion;
    use proptest::prelude::*;

    #[test]
    fn palette_file_is_padded() {
        let frag = Fragment::DefaultPaletteFile(DefaultPaletteFile {
            path: "palette.bmp".into(),
        });
        let bytes = frag.encode(FormatVersion::Plain).unwrap();
        // u16 len + 12 bytes (11 chars + NUL) = 14, padded to 16.
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..2], &12u16.to_le_bytes());
        assert_eq!(roundtrip(&frag, FormatVersion::Plain), frag);
    }

    #[test]
    fn bm_info_stores_count_minus_one() {
        let frag = Fragment::BmInfo(BmInfo {
            name: NameRef(-4),
            textures: vec!["a.bmp".into(), "b.bmp".into()],
        });
        let bytes = frag.encode(FormatVersion::Plain).unwrap();
        assert_eq!(&bytes[4..8], &1u32.to_le_bytes());
        assert_eq!(roundtrip(&frag, FormatVersion::Plain), frag);
    }

    #[test]
    fn empty_bm_info_is_rejected() {
        let frag = Fragment::BmInfo(BmInfo::default());
        assert!(matches!(
            frag.encode(FormatVersion::Plain),
            Err(PayloadError::Invalid { field: "textures", .. })
        ));
    }

    proptest! {
        #[test]
        fn user_data_roundtrip(data in "[ -~]{0,200}") {
            let frag = Fragment::UserData(UserData { data });
            prop_assert_eq!(roundtrip(&frag, FormatVersion::Legacy), frag);
        }
    }
}
