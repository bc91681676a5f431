//! Materials and material palettes.

use wld_core::{NameRef, RecordRef};

use super::{bit_if, gated, Payload};
use crate::codec::{FragReader, FragWriter};
use crate::error::PayloadError;

/// 0x30: a material.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MaterialDef {
    /// Self-name.
    pub name: NameRef,
    /// Flags other than [`MaterialDef::HAS_PAIR`].
    pub flags: u32,
    /// Render method bit field.
    pub render_method: u32,
    /// Packed RGBA pen color.
    pub rgb_pen: u32,
    /// Brightness.
    pub brightness: f32,
    /// Scaled ambient term.
    pub scaled_ambient: f32,
    /// Simple sprite instance supplying the texture.
    pub sprite: RecordRef,
    /// Trailing pair, uninterpreted.
    pub pair: Option<(u32, f32)>,
}

impl MaterialDef {
    /// Flag bit gating [`MaterialDef::pair`].
    pub const HAS_PAIR: u32 = 0x02;
}

impl Payload for MaterialDef {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let flags = r.u32()?;
        let render_method = r.u32()?;
        let rgb_pen = r.u32()?;
        let brightness = r.f32()?;
        let scaled_ambient = r.f32()?;
        let sprite = r.record_ref()?;
        let pair = gated(flags, Self::HAS_PAIR, || Ok((r.u32()?, r.f32()?)))?;
        Ok(Self {
            name,
            flags: flags & !Self::HAS_PAIR,
            render_method,
            rgb_pen,
            brightness,
            scaled_ambient,
            sprite,
            pair,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.u32(self.flags & !Self::HAS_PAIR | bit_if(&self.pair, Self::HAS_PAIR));
        w.u32(self.render_method);
        w.u32(self.rgb_pen);
        w.f32(self.brightness);
        w.f32(self.scaled_ambient);
        w.record_ref(self.sprite);
        if let Some((a, b)) = self.pair {
            w.u32(a);
            w.f32(b);
        }
        Ok(())
    }
}

/// 0x31: an ordered list of materials.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialPalette {
    /// Self-name.
    pub name: NameRef,
    /// Flags, uninterpreted.
    pub flags: u32,
    /// Material definitions in palette order.
    pub materials: Vec<RecordRef>,
}

impl Payload for MaterialPalette {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let flags = r.u32()?;
        let n = r.count(4)?;
        let materials = (0..n).map(|_| r.record_ref()).collect::<Result<_, _>>()?;
        Ok(Self {
            name,
            flags,
            materials,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.u32(self.flags);
        w.count(self.materials.len(), "materials")?;
        self.materials.iter().for_each(|&m| w.record_ref(m));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frag::tests::roundtrip;
    use crate::frag::Fragment;
    use crate::header::FormatVersion;

    #[test]
    fn material_layout() {
        let mat = MaterialDef {
            name: NameRef(-6),
            flags: 0x01,
            render_method: 0x8000_0001,
            rgb_pen: 0xB2B2_B2FF,
            brightness: 0.0,
            scaled_ambient: 0.75,
            sprite: RecordRef::from_raw(3),
            pair: None,
        };
        let bytes = Fragment::MaterialDef(mat).encode(FormatVersion::Plain).unwrap();
        assert_eq!(bytes.len(), 28);
        assert_eq!(&bytes[24..28], &3u32.to_le_bytes());

        let with_pair = MaterialDef {
            pair: Some((7, 0.5)),
            ..mat
        };
        let frag = Fragment::MaterialDef(with_pair);
        let bytes = frag.encode(FormatVersion::Plain).unwrap();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[4..8], &0x03u32.to_le_bytes());
        assert_eq!(roundtrip(&frag, FormatVersion::Plain), frag);
    }

    #[test]
    fn palette_roundtrip() {
        let frag = Fragment::MaterialPalette(MaterialPalette {
            name: NameRef(-1),
            flags: 0,
            materials: vec![RecordRef::from_raw(2), RecordRef::from_raw(3)],
        });
        assert_eq!(roundtrip(&frag, FormatVersion::Legacy), frag);
    }
}
