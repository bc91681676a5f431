//! Sprite definitions and the shared name/ref/flags wrapper layout.

use wld_core::{NameRef, RecordRef};

use super::{bit_if, gated, Payload};
use crate::codec::{FragReader, FragWriter};
use crate::error::PayloadError;

/// The layout shared by instance records that wrap one definition:
/// self-name, definition reference, one flags or params word.
///
/// Used by simple sprites, 2D and 3D sprites, hierarchical sprites,
/// lights, mesh instances and baked-color track instances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reference {
    /// Self-name.
    pub name: NameRef,
    /// The wrapped definition.
    pub target: RecordRef,
    /// Flags or params word, uninterpreted.
    pub flags: u32,
}

impl Payload for Reference {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        Ok(Self {
            name: r.name()?,
            target: r.record_ref()?,
            flags: r.u32()?,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.record_ref(self.target);
        w.u32(self.flags);
        Ok(())
    }
}

/// 0x04: an animated sprite built from bitmap records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimpleSpriteDef {
    /// Self-name.
    pub name: NameRef,
    /// Flags other than the field-presence bits.
    pub flags: u32,
    /// Frame to start on.
    pub current_frame: Option<u32>,
    /// Delay between frames, in milliseconds.
    pub sleep: Option<u32>,
    /// One bitmap record per frame.
    pub frames: Vec<RecordRef>,
}

impl SimpleSpriteDef {
    /// Flag bit gating [`SimpleSpriteDef::current_frame`].
    pub const HAS_CURRENT_FRAME: u32 = 0x04;
    /// Flag bit gating [`SimpleSpriteDef::sleep`].
    pub const HAS_SLEEP: u32 = 0x08;
    const DERIVED: u32 = Self::HAS_CURRENT_FRAME | Self::HAS_SLEEP;
}

impl Payload for SimpleSpriteDef {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let flags = r.u32()?;
        let count = r.u32()? as usize;
        let current_frame = gated(flags, Self::HAS_CURRENT_FRAME, || r.u32())?;
        let sleep = gated(flags, Self::HAS_SLEEP, || r.u32())?;
        let count = r.check_count(count, 4)?;
        let frames = (0..count)
            .map(|_| r.record_ref())
            .collect::<Result<_, _>>()?;
        Ok(Self {
            name,
            flags: flags & !Self::DERIVED,
            current_frame,
            sleep,
            frames,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.u32(
            self.flags & !Self::DERIVED
                | bit_if(&self.current_frame, Self::HAS_CURRENT_FRAME)
                | bit_if(&self.sleep, Self::HAS_SLEEP),
        );
        w.count(self.frames.len(), "frames")?;
        if let Some(frame) = self.current_frame {
            w.u32(frame);
        }
        if let Some(sleep) = self.sleep {
            w.u32(sleep);
        }
        for &frame in &self.frames {
            w.record_ref(frame);
        }
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
    fn sprite_flags_follow_optional_fields() {
        let def = SimpleSpriteDef {
            name: NameRef(-1),
            flags: 0x10,
            current_frame: None,
            sleep: Some(100),
            frames: vec![RecordRef::from_raw(1), RecordRef::from_raw(2)],
        };
        let bytes = Fragment::SimpleSpriteDef(def.clone())
            .encode(FormatVersion::Plain)
            .unwrap();
        assert_eq!(&bytes[4..8], &0x18u32.to_le_bytes());
        // name + flags + count + sleep + 2 refs
        assert_eq!(bytes.len(), 24);

        let back = roundtrip(&Fragment::SimpleSpriteDef(def.clone()), FormatVersion::Plain);
        assert_eq!(back, Fragment::SimpleSpriteDef(def));
    }

    #[test]
    fn stray_presence_bits_are_not_trusted_on_encode() {
        let def = SimpleSpriteDef {
            flags: SimpleSpriteDef::HAS_CURRENT_FRAME,
            ..SimpleSpriteDef::default()
        };
        let bytes = Fragment::SimpleSpriteDef(def).encode(FormatVersion::Plain).unwrap();
        assert_eq!(&bytes[4..8], &0u32.to_le_bytes());
    }
}
