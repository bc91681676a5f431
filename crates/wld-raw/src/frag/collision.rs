//! Bounding spheres, sphere lists and convex collision volumes.

use smallvec::SmallVec;
use wld_core::{NameRef, RecordRef};

use super::{bit_if, gated, Payload};
use crate::codec::{FragReader, FragWriter};
use crate::error::PayloadError;

/// 0x16: a bounding sphere.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sphere {
    /// Self-name.
    pub name: NameRef,
    /// Radius.
    pub radius: f32,
}

impl Payload for Sphere {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        Ok(Self {
            name: r.name()?,
            radius: r.f32()?,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.f32(self.radius);
        Ok(())
    }
}

/// 0x17: a convex collision volume.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolyhedronDef {
    /// Self-name.
    pub name: NameRef,
    /// Flags other than [`PolyhedronDef::HAS_SCALE`].
    pub flags: u32,
    /// Bounding radius.
    pub bounding_radius: f32,
    /// Scale factor.
    pub scale: Option<f32>,
    /// Vertex positions.
    pub vertices: Vec<[f32; 3]>,
    /// Faces as vertex index lists.
    pub faces: Vec<SmallVec<[u32; 4]>>,
}

impl PolyhedronDef {
    /// Flag bit gating [`PolyhedronDef::scale`].
    pub const HAS_SCALE: u32 = 0x01;
}

impl Payload for PolyhedronDef {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let flags = r.u32()?;
        let vertex_count = r.u32()? as usize;
        let face_count = r.u32()? as usize;
        let bounding_radius = r.f32()?;
        let scale = gated(flags, Self::HAS_SCALE, || r.f32())?;
        let vertex_count = r.check_count(vertex_count, 12)?;
        let vertices = (0..vertex_count)
            .map(|_| r.vec3())
            .collect::<Result<_, _>>()?;
        let face_count = r.check_count(face_count, 4)?;
        let mut faces = Vec::with_capacity(face_count);
        for _ in 0..face_count {
            let n = r.count(4)?;
            faces.push((0..n).map(|_| r.u32()).collect::<Result<_, _>>()?);
        }
        Ok(Self {
            name,
            flags: flags & !Self::HAS_SCALE,
            bounding_radius,
            scale,
            vertices,
            faces,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.u32(self.flags & !Self::HAS_SCALE | bit_if(&self.scale, Self::HAS_SCALE));
        w.count(self.vertices.len(), "vertices")?;
        w.count(self.faces.len(), "faces")?;
        w.f32(self.bounding_radius);
        if let Some(scale) = self.scale {
            w.f32(scale);
        }
        self.vertices.iter().for_each(|&v| w.vec3(v));
        for face in &self.faces {
            w.count(face.len(), "faces")?;
            face.iter().for_each(|&i| w.u32(i));
        }
        Ok(())
    }
}

/// 0x18: instance of a collision volume.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Polyhedron {
    /// Self-name.
    pub name: NameRef,
    /// Collision volume definition.
    pub def: RecordRef,
    /// Flags other than [`Polyhedron::HAS_SCALE`].
    pub flags: u32,
    /// Scale factor.
    pub scale: Option<f32>,
}

impl Polyhedron {
    /// Flag bit gating [`Polyhedron::scale`].
    pub const HAS_SCALE: u32 = 0x01;
}

impl Payload for Polyhedron {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let def = r.record_ref()?;
        let flags = r.u32()?;
        let scale = gated(flags, Self::HAS_SCALE, || r.f32())?;
        Ok(Self {
            name,
            def,
            flags: flags & !Self::HAS_SCALE,
            scale,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.record_ref(self.def);
        w.u32(self.flags & !Self::HAS_SCALE | bit_if(&self.scale, Self::HAS_SCALE));
        if let Some(scale) = self.scale {
            w.f32(scale);
        }
        Ok(())
    }
}

/// 0x19: a list of spheres, each `[x, y, z, radius]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SphereListDef {
    /// Self-name.
    pub name: NameRef,
    /// Flags other than [`SphereListDef::HAS_SCALE`].
    pub flags: u32,
    /// Enclosing radius.
    pub radius: f32,
    /// Scale factor.
    pub scale: Option<f32>,
    /// Spheres as center plus radius.
    pub spheres: Vec<[f32; 4]>,
}

impl SphereListDef {
    /// Flag bit gating [`SphereListDef::scale`].
    pub const HAS_SCALE: u32 = 0x01;
}

impl Payload for SphereListDef {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let flags = r.u32()?;
        let count = r.u32()? as usize;
        let radius = r.f32()?;
        let scale = gated(flags, Self::HAS_SCALE, || r.f32())?;
        let count = r.check_count(count, 16)?;
        let spheres = (0..count).map(|_| r.vec4()).collect::<Result<_, _>>()?;
        Ok(Self {
            name,
            flags: flags & !Self::HAS_SCALE,
            radius,
            scale,
            spheres,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.u32(self.flags & !Self::HAS_SCALE | bit_if(&self.scale, Self::HAS_SCALE));
        w.count(self.spheres.len(), "spheres")?;
        w.f32(self.radius);
        if let Some(scale) = self.scale {
            w.f32(scale);
        }
        self.spheres.iter().for_each(|&s| w.vec4(s));
        Ok(())
    }
}

/// 0x1A: instance of a sphere list.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SphereList {
    /// Self-name.
    pub name: NameRef,
    /// Sphere list definition.
    pub def: RecordRef,
    /// Flags other than [`SphereList::HAS_SCALE`].
    pub flags: u32,
    /// Scale factor.
    pub scale: Option<f32>,
}

impl SphereList {
    /// Flag bit gating [`SphereList::scale`].
    pub const HAS_SCALE: u32 = 0x01;
}

impl Payload for SphereList {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let def = r.record_ref()?;
        let flags = r.u32()?;
        let scale = gated(flags, Self::HAS_SCALE, || r.f32())?;
        Ok(Self {
            name,
            def,
            flags: flags & !Self::HAS_SCALE,
            scale,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.record_ref(self.def);
        w.u32(self.flags & !Self::HAS_SCALE | bit_if(&self.scale, Self::HAS_SCALE));
        if let Some(scale) = self.scale {
            w.f32(scale);
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
    use wld_core::{FragKind, RecordIndex};

    fn sphere_list_payload(flags: u32, tail: &[u8]) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&0i32.to_le_bytes());
        payload.extend_from_slice(&7u32.to_le_bytes());
        payload.extend_from_slice(&flags.to_le_bytes());
        payload.extend_from_slice(tail);
        payload
    }

    fn decode_sphere_list(payload: &[u8]) -> SphereList {
        let frag = Fragment::decode_record(
            RecordIndex::FIRST,
            FragKind::SphereList,
            payload,
            FormatVersion::Plain,
        )
        .unwrap();
        match frag {
            Fragment::SphereList(list) => list,
            other => panic!("decoded {other:?}"),
        }
    }

    #[test]
    fn sphere_list_without_scale() {
        let list = decode_sphere_list(&sphere_list_payload(0x00, &[]));
        assert_eq!(list.scale, None);
        assert_eq!(list.def, RecordRef::from_raw(7));
    }

    #[test]
    fn sphere_list_with_scale() {
        let list = decode_sphere_list(&sphere_list_payload(0x01, &[0x00, 0x00, 0x80, 0x3F]));
        assert_eq!(list.scale, Some(1.0));
        assert_eq!(list.flags, 0);
    }

    #[test]
    fn sphere_list_scale_flag_without_bytes_is_truncated() {
        let payload = sphere_list_payload(0x01, &[]);
        let err = Fragment::decode_record(
            RecordIndex::FIRST,
            FragKind::SphereList,
            &payload,
            FormatVersion::Plain,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::WldError::TruncatedRecord {
                needed: 4,
                remaining: 0,
                ..
            }
        ));
    }

    #[test]
    fn sphere_list_encode_sets_bit_from_presence() {
        for (scale, bit) in [(None, 0u32), (Some(2.0f32), 1u32)] {
            let list = SphereList {
                name: NameRef(0),
                def: RecordRef::from_raw(1),
                flags: 0,
                scale,
            };
            let bytes = Fragment::SphereList(list).encode(FormatVersion::Plain).unwrap();
            assert_eq!(&bytes[8..12], &bit.to_le_bytes());
            assert_eq!(decode_sphere_list(&bytes), list);
        }
    }

    #[test]
    fn sphere_list_def_roundtrip() {
        let def = SphereListDef {
            name: NameRef(-4),
            flags: 0,
            radius: 3.0,
            scale: Some(0.5),
            spheres: vec![[0.0, 1.0, 2.0, 0.25], [3.0, 4.0, 5.0, 0.75]],
        };
        let frag = Fragment::SphereListDef(def);
        let bytes = frag.encode(FormatVersion::Plain).unwrap();
        assert_eq!(bytes.len(), 4 + 4 + 4 + 4 + 4 + 32);
        assert_eq!(roundtrip(&frag, FormatVersion::Plain), frag);
    }

    #[test]
    fn polyhedron_roundtrip() {
        let def = PolyhedronDef {
            name: NameRef(-1),
            flags: 0,
            bounding_radius: 2.0,
            scale: None,
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            faces: vec![SmallVec::from_slice(&[0, 1, 2])],
        };
        let frag = Fragment::PolyhedronDef(def);
        assert_eq!(roundtrip(&frag, FormatVersion::Plain), frag);

        let inst = Fragment::Polyhedron(Polyhedron {
            name: NameRef(-8),
            def: RecordRef::from_raw(1),
            flags: 0,
            scale: Some(1.5),
        });
        assert_eq!(roundtrip(&inst, FormatVersion::Plain), inst);
    }
}
