//! Light definitions and placed lights.

use wld_core::{NameRef, RecordRef};

use super::{bit_if, gated, Payload};
use crate::codec::{FragReader, FragWriter};
use crate::error::PayloadError;

/// 0x1B: per-frame light levels and colors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LightDef {
    /// Self-name.
    pub name: NameRef,
    /// Flags other than the field-presence bits.
    pub flags: u32,
    /// Number of frames. Levels and colors, when present, hold one entry
    /// per frame.
    pub frame_count: u32,
    /// Frame to start on.
    pub current_frame: Option<u32>,
    /// Delay between frames, in milliseconds.
    pub sleep: Option<u32>,
    /// Intensity per frame.
    pub levels: Option<Vec<f32>>,
    /// RGB color per frame.
    pub colors: Option<Vec<[f32; 3]>>,
}

impl LightDef {
    /// Flag bit gating [`LightDef::current_frame`].
    pub const HAS_CURRENT_FRAME: u32 = 0x01;
    /// Flag bit gating [`LightDef::sleep`].
    pub const HAS_SLEEP: u32 = 0x02;
    /// Flag bit gating [`LightDef::levels`].
    pub const HAS_LEVELS: u32 = 0x04;
    /// Flag bit gating [`LightDef::colors`].
    pub const HAS_COLORS: u32 = 0x10;
    const DERIVED: u32 =
        Self::HAS_CURRENT_FRAME | Self::HAS_SLEEP | Self::HAS_LEVELS | Self::HAS_COLORS;
}

impl Payload for LightDef {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let flags = r.u32()?;
        let frame_count = r.u32()?;
        let current_frame = gated(flags, Self::HAS_CURRENT_FRAME, || r.u32())?;
        let sleep = gated(flags, Self::HAS_SLEEP, || r.u32())?;
        let levels = gated(flags, Self::HAS_LEVELS, || {
            let n = r.check_count(frame_count as usize, 4)?;
            (0..n).map(|_| r.f32()).collect::<Result<Vec<_>, _>>()
        })?;
        let colors = gated(flags, Self::HAS_COLORS, || {
            let n = r.check_count(frame_count as usize, 12)?;
            (0..n).map(|_| r.vec3()).collect::<Result<Vec<_>, _>>()
        })?;
        Ok(Self {
            name,
            flags: flags & !Self::DERIVED,
            frame_count,
            current_frame,
            sleep,
            levels,
            colors,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        let frames = self.frame_count as usize;
        if self.levels.as_ref().is_some_and(|l| l.len() != frames) {
            return Err(PayloadError::invalid("levels", "length differs from frame_count"));
        }
        if self.colors.as_ref().is_some_and(|c| c.len() != frames) {
            return Err(PayloadError::invalid("colors", "length differs from frame_count"));
        }
        w.name(self.name);
        w.u32(
            self.flags & !Self::DERIVED
                | bit_if(&self.current_frame, Self::HAS_CURRENT_FRAME)
                | bit_if(&self.sleep, Self::HAS_SLEEP)
                | bit_if(&self.levels, Self::HAS_LEVELS)
                | bit_if(&self.colors, Self::HAS_COLORS),
        );
        w.u32(self.frame_count);
        if let Some(frame) = self.current_frame {
            w.u32(frame);
        }
        if let Some(sleep) = self.sleep {
            w.u32(sleep);
        }
        if let Some(levels) = &self.levels {
            levels.iter().for_each(|&l| w.f32(l));
        }
        if let Some(colors) = &self.colors {
            colors.iter().for_each(|&c| w.vec3(c));
        }
        Ok(())
    }
}

/// 0x28: a placed point light.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointLight {
    /// Self-name.
    pub name: NameRef,
    /// Light definition.
    pub light: RecordRef,
    /// Flags, uninterpreted.
    pub flags: u32,
    /// World position.
    pub location: [f32; 3],
    /// Falloff radius.
    pub radius: f32,
}

impl Payload for PointLight {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        Ok(Self {
            name: r.name()?,
            light: r.record_ref()?,
            flags: r.u32()?,
            location: r.vec3()?,
            radius: r.f32()?,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.record_ref(self.light);
        w.u32(self.flags);
        w.vec3(self.location);
        w.f32(self.radius);
        Ok(())
    }
}

fn read_regions(r: &mut FragReader<'_>) -> Result<Vec<u32>, PayloadError> {
    let n = r.count(4)?;
    (0..n).map(|_| r.u32()).collect()
}

fn write_regions(w: &mut FragWriter, regions: &[u32]) -> Result<(), PayloadError> {
    w.count(regions.len(), "regions")?;
    regions.iter().for_each(|&id| w.u32(id));
    Ok(())
}

/// 0x2A: an ambient light applied to a set of regions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AmbientLight {
    /// Self-name.
    pub name: NameRef,
    /// Light instance.
    pub light: RecordRef,
    /// Flags, uninterpreted.
    pub flags: u32,
    /// Region numbers lit.
    pub regions: Vec<u32>,
}

impl Payload for AmbientLight {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        Ok(Self {
            name: r.name()?,
            light: r.record_ref()?,
            flags: r.u32()?,
            regions: read_regions(r)?,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.record_ref(self.light);
        w.u32(self.flags);
        write_regions(w, &self.regions)
    }
}

/// 0x2B: a directional light applied to a set of regions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DirectionalLight {
    /// Self-name.
    pub name: NameRef,
    /// Light instance.
    pub light: RecordRef,
    /// Flags, uninterpreted.
    pub flags: u32,
    /// Light direction.
    pub normal: [f32; 3],
    /// Region numbers lit.
    pub regions: Vec<u32>,
}

impl Payload for DirectionalLight {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        Ok(Self {
            name: r.name()?,
            light: r.record_ref()?,
            flags: r.u32()?,
            normal: r.vec3()?,
            regions: read_regions(r)?,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.record_ref(self.light);
        w.u32(self.flags);
        w.vec3(self.normal);
        write_regions(w, &self.regions)
    }
}

/// 0x35: the world's global ambient light. Only a name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlobalAmbientLightDef {
    /// Self-name.
    pub name: NameRef,
}

impl Payload for GlobalAmbientLightDef {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        Ok(Self { name: r.name()? })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
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
    fn light_def_optional_arrays() {
        let def = LightDef {
            name: NameRef(-1),
            flags: 0,
            frame_count: 2,
            current_frame: None,
            sleep: Some(50),
            levels: Some(vec![0.5, 1.0]),
            colors: None,
        };
        let frag = Fragment::LightDef(def);
        let bytes = frag.encode(FormatVersion::Plain).unwrap();
        assert_eq!(&bytes[4..8], &0x06u32.to_le_bytes());
        assert_eq!(roundtrip(&frag, FormatVersion::Plain), frag);
    }

    #[test]
    fn light_def_rejects_short_arrays() {
        let def = LightDef {
            frame_count: 3,
            colors: Some(vec![[1.0, 1.0, 1.0]]),
            ..LightDef::default()
        };
        assert!(matches!(
            Fragment::LightDef(def).encode(FormatVersion::Plain),
            Err(PayloadError::Invalid { field: "colors", .. })
        ));
    }

    #[test]
    fn directional_light_roundtrip() {
        let frag = Fragment::DirectionalLight(DirectionalLight {
            name: NameRef(-2),
            light: RecordRef::from_raw(4),
            flags: 0,
            normal: [0.0, 0.0, -1.0],
            regions: vec![1, 2, 3],
        });
        assert_eq!(roundtrip(&frag, FormatVersion::Plain), frag);
    }
}
