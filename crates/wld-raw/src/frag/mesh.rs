//! Mesh definitions and baked vertex color tracks.

use wld_core::{NameRef, RecordRef};

use super::{bit_if, gated, Payload};
use crate::codec::{FragReader, FragWriter};
use crate::error::PayloadError;

/// 0x32: baked per-vertex colors over time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DmRgbTrackDef {
    /// Self-name.
    pub name: NameRef,
    /// Flags, uninterpreted (usually 1).
    pub flags: u32,
    /// Colors in every frame.
    pub colors_per_frame: u32,
    /// Delay between frames, in milliseconds.
    pub sleep: u32,
    /// Vertex-count word that observed files leave at zero.
    pub data4: u32,
    /// RGBA colors, one inner list per frame.
    pub frames: Vec<Vec<[u8; 4]>>,
}

impl Payload for DmRgbTrackDef {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let flags = r.u32()?;
        let colors_per_frame = r.u32()?;
        let frame_count = r.u32()? as usize;
        let sleep = r.u32()?;
        let data4 = r.u32()?;
        if data4 != 0 {
            tracing::warn!(data4, "rgb track definition has a non-zero vertex count word");
        }
        let per_frame = colors_per_frame as usize;
        if per_frame == 0 && frame_count > 0 {
            return Err(PayloadError::invalid("frames", "frames declared without colors"));
        }
        let frame_count = r.check_count(frame_count, per_frame.saturating_mul(4))?;
        let mut frames = Vec::with_capacity(frame_count);
        for _ in 0..frame_count {
            let frame = (0..per_frame)
                .map(|_| Ok([r.u8()?, r.u8()?, r.u8()?, r.u8()?]))
                .collect::<Result<Vec<_>, PayloadError>>()?;
            frames.push(frame);
        }
        Ok(Self {
            name,
            flags,
            colors_per_frame,
            sleep,
            data4,
            frames,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        let per_frame = self.colors_per_frame as usize;
        if self.frames.iter().any(|f| f.len() != per_frame) {
            return Err(PayloadError::invalid(
                "frames",
                "every frame must hold colors_per_frame colors",
            ));
        }
        w.name(self.name);
        w.u32(self.flags);
        w.u32(self.colors_per_frame);
        w.count(self.frames.len(), "frames")?;
        w.u32(self.sleep);
        w.u32(self.data4);
        for rgba in self.frames.iter().flatten() {
            w.bytes(rgba);
        }
        Ok(())
    }
}

/// A polygon of a first-generation mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Polygon {
    /// Polygon flags.
    pub flags: u16,
    /// Uninterpreted words.
    pub unk: [u16; 4],
    /// Vertex indices.
    pub indices: [u16; 3],
}

/// A run of vertices bound to one bone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VertexPiece {
    /// Number of vertices in the run.
    pub count: u16,
    /// Bone index.
    pub offset: u16,
}

/// A run of polygons drawn with one material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderGroup {
    /// Number of polygons in the run.
    pub polygon_count: u16,
    /// Material index within the palette.
    pub material: u16,
}

/// 0x2C: a first-generation mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DmSpriteDef {
    /// Self-name.
    pub name: NameRef,
    /// Flags other than the field-presence bits.
    pub flags: u32,
    /// Uninterpreted header word.
    pub fragment1: i16,
    /// Material palette.
    pub palette: RecordRef,
    /// Uninterpreted header word.
    pub fragment3: u32,
    /// Mesh center.
    pub center: [f32; 3],
    /// Uninterpreted header words.
    pub params: [u32; 3],
    /// Vertex positions.
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates.
    pub uvs: Vec<[f32; 2]>,
    /// Vertex normals.
    pub normals: Vec<[f32; 3]>,
    /// Packed vertex colors.
    pub colors: Vec<u32>,
    /// Polygons.
    pub polygons: Vec<Polygon>,
    /// Uninterpreted 20-byte entries.
    pub size6: Vec<[u32; 5]>,
    /// Vertex-to-bone runs.
    pub vertex_pieces: Vec<VertexPiece>,
    /// Per-material polygon runs.
    pub render_groups: Option<Vec<RenderGroup>>,
    /// Extra texture coordinates.
    pub vertex_tex: Option<Vec<[f32; 2]>>,
}

impl DmSpriteDef {
    /// Flag bit gating [`DmSpriteDef::render_groups`].
    pub const HAS_RENDER_GROUPS: u32 = 0x200;
    /// Flag bit gating [`DmSpriteDef::vertex_tex`].
    pub const HAS_VERTEX_TEX: u32 = 0x400;
    const DERIVED: u32 = Self::HAS_RENDER_GROUPS | Self::HAS_VERTEX_TEX;
}

fn read_vec2(r: &mut FragReader<'_>) -> Result<[f32; 2], PayloadError> {
    Ok([r.f32()?, r.f32()?])
}

impl Payload for DmSpriteDef {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let flags = r.u32()?;
        let vertex_count = r.u32()? as usize;
        let uv_count = r.u32()? as usize;
        let normal_count = r.u32()? as usize;
        let color_count = r.u32()? as usize;
        let polygon_count = r.u32()? as usize;
        let size6_count = r.u16()? as usize;
        let fragment1 = r.i16()?;
        let piece_count = r.u32()? as usize;
        let palette = r.record_ref()?;
        let fragment3 = r.u32()?;
        let center = r.vec3()?;
        let params = [r.u32()?, r.u32()?, r.u32()?];

        let n = r.check_count(vertex_count, 12)?;
        let vertices = (0..n).map(|_| r.vec3()).collect::<Result<_, _>>()?;
        let n = r.check_count(uv_count, 8)?;
        let uvs = (0..n).map(|_| read_vec2(r)).collect::<Result<_, _>>()?;
        let n = r.check_count(normal_count, 12)?;
        let normals = (0..n).map(|_| r.vec3()).collect::<Result<_, _>>()?;
        let n = r.check_count(color_count, 4)?;
        let colors = (0..n).map(|_| r.u32()).collect::<Result<_, _>>()?;
        let n = r.check_count(polygon_count, 16)?;
        let polygons = (0..n)
            .map(|_| {
                Ok(Polygon {
                    flags: r.u16()?,
                    unk: [r.u16()?, r.u16()?, r.u16()?, r.u16()?],
                    indices: [r.u16()?, r.u16()?, r.u16()?],
                })
            })
            .collect::<Result<_, PayloadError>>()?;
        let n = r.check_count(size6_count, 20)?;
        let size6 = (0..n)
            .map(|_| Ok([r.u32()?, r.u32()?, r.u32()?, r.u32()?, r.u32()?]))
            .collect::<Result<_, PayloadError>>()?;
        let n = r.check_count(piece_count, 4)?;
        let vertex_pieces = (0..n)
            .map(|_| {
                Ok(VertexPiece {
                    count: r.u16()?,
                    offset: r.u16()?,
                })
            })
            .collect::<Result<_, PayloadError>>()?;
        let render_groups = gated(flags, Self::HAS_RENDER_GROUPS, || {
            let n = r.count(4)?;
            (0..n)
                .map(|_| {
                    Ok(RenderGroup {
                        polygon_count: r.u16()?,
                        material: r.u16()?,
                    })
                })
                .collect::<Result<Vec<_>, PayloadError>>()
        })?;
        let vertex_tex = gated(flags, Self::HAS_VERTEX_TEX, || {
            let n = r.count(8)?;
            (0..n).map(|_| read_vec2(r)).collect::<Result<Vec<_>, _>>()
        })?;

        Ok(Self {
            name,
            flags: flags & !Self::DERIVED,
            fragment1,
            palette,
            fragment3,
            center,
            params,
            vertices,
            uvs,
            normals,
            colors,
            polygons,
            size6,
            vertex_pieces,
            render_groups,
            vertex_tex,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.u32(
            self.flags & !Self::DERIVED
                | bit_if(&self.render_groups, Self::HAS_RENDER_GROUPS)
                | bit_if(&self.vertex_tex, Self::HAS_VERTEX_TEX),
        );
        w.count(self.vertices.len(), "vertices")?;
        w.count(self.uvs.len(), "uvs")?;
        w.count(self.normals.len(), "normals")?;
        w.count(self.colors.len(), "colors")?;
        w.count(self.polygons.len(), "polygons")?;
        w.count_u16(self.size6.len(), "size6")?;
        w.i16(self.fragment1);
        w.count(self.vertex_pieces.len(), "vertex_pieces")?;
        w.record_ref(self.palette);
        w.u32(self.fragment3);
        w.vec3(self.center);
        self.params.iter().for_each(|&p| w.u32(p));

        self.vertices.iter().for_each(|&v| w.vec3(v));
        for uv in &self.uvs {
            w.f32(uv[0]);
            w.f32(uv[1]);
        }
        self.normals.iter().for_each(|&n| w.vec3(n));
        self.colors.iter().for_each(|&c| w.u32(c));
        for p in &self.polygons {
            w.u16(p.flags);
            p.unk.iter().for_each(|&u| w.u16(u));
            p.indices.iter().for_each(|&i| w.u16(i));
        }
        for entry in &self.size6 {
            entry.iter().for_each(|&v| w.u32(v));
        }
        for piece in &self.vertex_pieces {
            w.u16(piece.count);
            w.u16(piece.offset);
        }
        if let Some(groups) = &self.render_groups {
            w.count(groups.len(), "render_groups")?;
            for g in groups {
                w.u16(g.polygon_count);
                w.u16(g.material);
            }
        }
        if let Some(tex) = &self.vertex_tex {
            w.count(tex.len(), "vertex_tex")?;
            for uv in tex {
                w.f32(uv[0]);
                w.f32(uv[1]);
            }
        }
        Ok(())
    }
}

/// Texture coordinates of a second-generation mesh.
///
/// The storage width depends on the file's format version, so the variant
/// must match the version the mesh is encoded for.
#[derive(Clone, Debug, PartialEq)]
pub enum MeshUvs {
    /// 16-bit pairs, used by plain and legacy files.
    Short(Vec<[i16; 2]>),
    /// 32-bit float pairs, used by new-world files.
    Float(Vec<[f32; 2]>),
}

impl Default for MeshUvs {
    fn default() -> Self {
        Self::Short(Vec::new())
    }
}

impl MeshUvs {
    /// Number of coordinate pairs.
    pub fn len(&self) -> usize {
        match self {
            Self::Short(v) => v.len(),
            Self::Float(v) => v.len(),
        }
    }

    /// Whether there are no coordinates.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A triangle of a second-generation mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshFace {
    /// Face flags (bit 0x10 marks a passable face).
    pub flags: u16,
    /// Vertex indices.
    pub indices: [u16; 3],
}

/// A mesh operation entry.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshOp {
    /// First index operand.
    pub index1: u16,
    /// Second index operand.
    pub index2: u16,
    /// Offset operand.
    pub offset: f32,
    /// Parameter byte.
    pub param: u8,
    /// Operation type code.
    pub type_code: u8,
}

/// 0x36: a second-generation mesh.
///
/// Vertex positions are fixed point, scaled by `1 / (1 << scale)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DmSpriteDef2 {
    /// Self-name.
    pub name: NameRef,
    /// Flags, uninterpreted.
    pub flags: u32,
    /// Material palette.
    pub palette: RecordRef,
    /// Vertex animation reference, uninterpreted.
    pub dm_track_ref: u32,
    /// Uninterpreted header word.
    pub fragment3: u32,
    /// Uninterpreted header word.
    pub fragment4: u32,
    /// Mesh center.
    pub center: [f32; 3],
    /// Uninterpreted header words.
    pub params2: [u32; 3],
    /// Maximum view distance.
    pub max_distance: f32,
    /// Bounding box minimum.
    pub min: [f32; 3],
    /// Bounding box maximum.
    pub max: [f32; 3],
    /// Fixed-point scale exponent.
    pub scale: u16,
    /// Fixed-point vertex positions.
    pub vertices: Vec<[i16; 3]>,
    /// Texture coordinates.
    pub uvs: MeshUvs,
    /// Vertex normals scaled to `i8`.
    pub normals: Vec<[i8; 3]>,
    /// RGBA vertex colors.
    pub colors: Vec<[u8; 4]>,
    /// Triangles.
    pub faces: Vec<MeshFace>,
    /// Vertex-to-bone runs: (vertex count, bone index).
    pub skin_groups: Vec<(u16, u16)>,
    /// Face-to-material runs: (face count, material index).
    pub face_material_groups: Vec<(u16, u16)>,
    /// Vertex-to-material runs: (vertex count, material index).
    pub vertex_material_groups: Vec<(u16, u16)>,
    /// Mesh operations.
    pub mesh_ops: Vec<MeshOp>,
}

fn read_pairs(r: &mut FragReader<'_>, n: usize) -> Result<Vec<(u16, u16)>, PayloadError> {
    let n = r.check_count(n, 4)?;
    (0..n).map(|_| Ok((r.u16()?, r.u16()?))).collect()
}

fn write_pairs(w: &mut FragWriter, pairs: &[(u16, u16)]) {
    for &(a, b) in pairs {
        w.u16(a);
        w.u16(b);
    }
}

impl Payload for DmSpriteDef2 {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let flags = r.u32()?;
        let palette = r.record_ref()?;
        let dm_track_ref = r.u32()?;
        let fragment3 = r.u32()?;
        let fragment4 = r.u32()?;
        let center = r.vec3()?;
        let params2 = [r.u32()?, r.u32()?, r.u32()?];
        let max_distance = r.f32()?;
        let min = r.vec3()?;
        let max = r.vec3()?;

        let vertex_count = r.u16()? as usize;
        let uv_count = r.u16()? as usize;
        let normal_count = r.u16()? as usize;
        let color_count = r.u16()? as usize;
        let face_count = r.u16()? as usize;
        let skin_count = r.u16()? as usize;
        let face_material_count = r.u16()? as usize;
        let vertex_material_count = r.u16()? as usize;
        let mesh_op_count = r.u16()? as usize;
        let scale = r.u16()?;

        let n = r.check_count(vertex_count, 6)?;
        let vertices = (0..n)
            .map(|_| Ok([r.i16()?, r.i16()?, r.i16()?]))
            .collect::<Result<_, PayloadError>>()?;
        let uvs = if r.version().is_new_world() {
            let n = r.check_count(uv_count, 8)?;
            MeshUvs::Float((0..n).map(|_| Ok([r.f32()?, r.f32()?])).collect::<Result<_, PayloadError>>()?)
        } else {
            let n = r.check_count(uv_count, 4)?;
            MeshUvs::Short((0..n).map(|_| Ok([r.i16()?, r.i16()?])).collect::<Result<_, PayloadError>>()?)
        };
        let n = r.check_count(normal_count, 3)?;
        let normals = (0..n)
            .map(|_| Ok([r.i8()?, r.i8()?, r.i8()?]))
            .collect::<Result<_, PayloadError>>()?;
        let n = r.check_count(color_count, 4)?;
        let colors = (0..n)
            .map(|_| Ok([r.u8()?, r.u8()?, r.u8()?, r.u8()?]))
            .collect::<Result<_, PayloadError>>()?;
        let n = r.check_count(face_count, 8)?;
        let faces = (0..n)
            .map(|_| {
                Ok(MeshFace {
                    flags: r.u16()?,
                    indices: [r.u16()?, r.u16()?, r.u16()?],
                })
            })
            .collect::<Result<_, PayloadError>>()?;
        let skin_groups = read_pairs(r, skin_count)?;
        let face_material_groups = read_pairs(r, face_material_count)?;
        let vertex_material_groups = read_pairs(r, vertex_material_count)?;
        let n = r.check_count(mesh_op_count, 10)?;
        let mesh_ops = (0..n)
            .map(|_| {
                Ok(MeshOp {
                    index1: r.u16()?,
                    index2: r.u16()?,
                    offset: r.f32()?,
                    param: r.u8()?,
                    type_code: r.u8()?,
                })
            })
            .collect::<Result<_, PayloadError>>()?;
        r.skip_pad4()?;

        Ok(Self {
            name,
            flags,
            palette,
            dm_track_ref,
            fragment3,
            fragment4,
            center,
            params2,
            max_distance,
            min,
            max,
            scale,
            vertices,
            uvs,
            normals,
            colors,
            faces,
            skin_groups,
            face_material_groups,
            vertex_material_groups,
            mesh_ops,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        let new_world = w.version().is_new_world();
        if new_world != matches!(self.uvs, MeshUvs::Float(_)) {
            return Err(PayloadError::invalid(
                "uvs",
                "coordinate width does not match the format version",
            ));
        }
        w.name(self.name);
        w.u32(self.flags);
        w.record_ref(self.palette);
        w.u32(self.dm_track_ref);
        w.u32(self.fragment3);
        w.u32(self.fragment4);
        w.vec3(self.center);
        self.params2.iter().for_each(|&p| w.u32(p));
        w.f32(self.max_distance);
        w.vec3(self.min);
        w.vec3(self.max);

        w.count_u16(self.vertices.len(), "vertices")?;
        w.count_u16(self.uvs.len(), "uvs")?;
        w.count_u16(self.normals.len(), "normals")?;
        w.count_u16(self.colors.len(), "colors")?;
        w.count_u16(self.faces.len(), "faces")?;
        w.count_u16(self.skin_groups.len(), "skin_groups")?;
        w.count_u16(self.face_material_groups.len(), "face_material_groups")?;
        w.count_u16(self.vertex_material_groups.len(), "vertex_material_groups")?;
        w.count_u16(self.mesh_ops.len(), "mesh_ops")?;
        w.u16(self.scale);

        for v in &self.vertices {
            v.iter().for_each(|&c| w.i16(c));
        }
        match &self.uvs {
            MeshUvs::Short(uvs) => uvs.iter().flatten().for_each(|&c| w.i16(c)),
            MeshUvs::Float(uvs) => uvs.iter().flatten().for_each(|&c| w.f32(c)),
        }
        for n in &self.normals {
            n.iter().for_each(|&c| w.i8(c));
        }
        for c in &self.colors {
            w.bytes(c);
        }
        for f in &self.faces {
            w.u16(f.flags);
            f.indices.iter().for_each(|&i| w.u16(i));
        }
        write_pairs(w, &self.skin_groups);
        write_pairs(w, &self.face_material_groups);
        write_pairs(w, &self.vertex_material_groups);
        for op in &self.mesh_ops {
            w.u16(op.index1);
            w.u16(op.index2);
            w.f32(op.offset);
            w.u8(op.param);
            w.u8(op.type_code);
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

    fn triangle(uvs: MeshUvs) -> DmSpriteDef2 {
        DmSpriteDef2 {
            name: NameRef(-1),
            palette: RecordRef::from_raw(2),
            scale: 8,
            vertices: vec![[0, 0, 0], [256, 0, 0], [0, 256, 0]],
            uvs,
            normals: vec![[0, 0, 127]; 3],
            colors: vec![[255, 255, 255, 255]; 3],
            faces: vec![MeshFace {
                flags: 0,
                indices: [0, 1, 2],
            }],
            skin_groups: vec![(3, 0)],
            face_material_groups: vec![(1, 0)],
            vertex_material_groups: vec![(3, 0)],
            mesh_ops: vec![MeshOp {
                index1: 1,
                index2: 2,
                offset: 0.5,
                param: 0,
                type_code: 4,
            }],
            ..DmSpriteDef2::default()
        }
    }

    #[test]
    fn legacy_mesh_uses_short_uvs() {
        let frag = Fragment::DmSpriteDef2(triangle(MeshUvs::Short(vec![[0, 0], [256, 0], [0, 256]])));
        let bytes = frag.encode(FormatVersion::Legacy).unwrap();
        assert_eq!(bytes.len() % 4, 0);
        assert_eq!(roundtrip(&frag, FormatVersion::Legacy), frag);
    }

    #[test]
    fn new_world_mesh_uses_float_uvs() {
        let frag = Fragment::DmSpriteDef2(triangle(MeshUvs::Float(vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
        ])));
        assert_eq!(roundtrip(&frag, FormatVersion::NewWorld), frag);
    }

    #[test]
    fn uv_width_must_match_version() {
        let frag = Fragment::DmSpriteDef2(triangle(MeshUvs::Float(vec![[0.0, 0.0]; 3])));
        assert!(matches!(
            frag.encode(FormatVersion::Legacy),
            Err(PayloadError::Invalid { field: "uvs", .. })
        ));
    }

    #[test]
    fn first_generation_mesh_roundtrip() {
        let def = DmSpriteDef {
            name: NameRef(-3),
            palette: RecordRef::from_raw(1),
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            uvs: vec![[0.0, 0.0]; 3],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            colors: vec![0xFFFF_FFFF; 3],
            polygons: vec![Polygon {
                flags: 0,
                unk: [0; 4],
                indices: [0, 1, 2],
            }],
            size6: vec![[1, 2, 3, 4, 5]],
            vertex_pieces: vec![VertexPiece { count: 3, offset: 0 }],
            render_groups: Some(vec![RenderGroup {
                polygon_count: 1,
                material: 0,
            }]),
            vertex_tex: None,
            ..DmSpriteDef::default()
        };
        let frag = Fragment::DmSpriteDef(def);
        let bytes = frag.encode(FormatVersion::Plain).unwrap();
        assert_eq!(&bytes[4..8], &DmSpriteDef::HAS_RENDER_GROUPS.to_le_bytes());
        assert_eq!(roundtrip(&frag, FormatVersion::Plain), frag);
    }

    #[test]
    fn rgb_track_roundtrip() {
        let frag = Fragment::DmRgbTrackDef(DmRgbTrackDef {
            name: NameRef(-1),
            flags: 1,
            colors_per_frame: 2,
            sleep: 200,
            data4: 0,
            frames: vec![vec![[1, 2, 3, 4], [5, 6, 7, 8]]],
        });
        assert_eq!(roundtrip(&frag, FormatVersion::Plain), frag);
    }
}
