//! Typed record payloads.
//!
//! One struct per record layout, each with a `decode` / `encode` pair over
//! the bounded payload cursor. [`Fragment`] is the closed union the
//! envelope produces: every known kind decodes to its own variant, and
//! everything else becomes [`Fragment::Opaque`] with its bytes untouched.
//!
//! Fields gated by a flag bit are modeled as `Option`s. The stored `flags`
//! word never carries those bits: decode strips them and encode derives
//! them from which options are present, so the two cannot disagree.

mod actor;
mod collision;
mod light;
mod material;
mod mesh;
mod skeleton;
mod spatial;
mod sprite;
mod strings;

pub use actor::{Action, Actor, ActorDef, Location};
pub use collision::{Polyhedron, PolyhedronDef, Sphere, SphereList, SphereListDef};
pub use light::{AmbientLight, DirectionalLight, GlobalAmbientLightDef, LightDef, PointLight};
pub use material::{MaterialDef, MaterialPalette};
pub use mesh::{
    DmRgbTrackDef, DmSpriteDef, DmSpriteDef2, MeshFace, MeshOp, MeshUvs, Polygon, RenderGroup,
    VertexPiece,
};
pub use skeleton::{
    AttachedSkin, BoneTransform, Dag, HierarchicalSpriteDef, Track, TrackDef, TrackFrames,
};
pub use spatial::{Region, WorldNode, WorldTree, Zone};
pub use sprite::{Reference, SimpleSpriteDef};
pub use strings::{BmInfo, DefaultPaletteFile, UserData};

use wld_core::{FragKind, NameRef, RecordIndex};

use crate::codec::{FragReader, FragWriter};
use crate::error::{PayloadError, WldError};
use crate::header::FormatVersion;

/// Decode/encode pair for one payload layout.
pub trait Payload: Sized {
    /// Decode from the payload cursor.
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError>;

    /// Encode into the payload builder.
    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError>;
}

/// Read a flag-gated field.
pub(crate) fn gated<T>(
    flags: u32,
    bit: u32,
    read: impl FnOnce() -> Result<T, PayloadError>,
) -> Result<Option<T>, PayloadError> {
    (flags & bit != 0).then(read).transpose()
}

/// The bit for a flag-gated field, set iff the field is present.
pub(crate) fn bit_if<T>(field: &Option<T>, bit: u32) -> u32 {
    if field.is_some() {
        bit
    } else {
        0
    }
}

/// A record of a kind this crate does not interpret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Opaque {
    /// Record kind.
    pub kind: FragKind,
    /// Verbatim payload.
    pub bytes: Vec<u8>,
}

impl Opaque {
    /// The self-name reference, if the kind declares one and the payload
    /// is long enough to hold it.
    pub fn name_ref(&self) -> Option<NameRef> {
        if !self.kind.has_name() {
            return None;
        }
        let head: [u8; 4] = self.bytes.get(..4)?.try_into().ok()?;
        Some(NameRef(i32::from_le_bytes(head)))
    }
}

/// One decoded record.
#[derive(Clone, Debug, PartialEq)]
pub enum Fragment {
    /// 0x01
    DefaultPaletteFile(DefaultPaletteFile),
    /// 0x02
    UserData(UserData),
    /// 0x03
    BmInfo(BmInfo),
    /// 0x04
    SimpleSpriteDef(SimpleSpriteDef),
    /// 0x05
    SimpleSprite(Reference),
    /// 0x07
    Sprite2D(Reference),
    /// 0x09
    Sprite3D(Reference),
    /// 0x10
    HierarchicalSpriteDef(HierarchicalSpriteDef),
    /// 0x11
    HierarchicalSprite(Reference),
    /// 0x12
    TrackDef(TrackDef),
    /// 0x13
    Track(Track),
    /// 0x14
    ActorDef(ActorDef),
    /// 0x15
    Actor(Actor),
    /// 0x16
    Sphere(Sphere),
    /// 0x17
    PolyhedronDef(PolyhedronDef),
    /// 0x18
    Polyhedron(Polyhedron),
    /// 0x19
    SphereListDef(SphereListDef),
    /// 0x1A
    SphereList(SphereList),
    /// 0x1B
    LightDef(LightDef),
    /// 0x1C
    Light(Reference),
    /// 0x21
    WorldTree(WorldTree),
    /// 0x22
    Region(Region),
    /// 0x28
    PointLight(PointLight),
    /// 0x29
    Zone(Zone),
    /// 0x2A
    AmbientLight(AmbientLight),
    /// 0x2B
    DirectionalLight(DirectionalLight),
    /// 0x2C
    DmSpriteDef(DmSpriteDef),
    /// 0x2D
    DmSprite(Reference),
    /// 0x30
    MaterialDef(MaterialDef),
    /// 0x31
    MaterialPalette(MaterialPalette),
    /// 0x32
    DmRgbTrackDef(DmRgbTrackDef),
    /// 0x33
    DmRgbTrack(Reference),
    /// 0x35
    GlobalAmbientLightDef(GlobalAmbientLightDef),
    /// 0x36
    DmSpriteDef2(DmSpriteDef2),
    /// Any other kind, preserved verbatim.
    Opaque(Opaque),
}

macro_rules! dispatch {
    ($self:expr, $inner:ident => $body:expr, $op:ident => $opaque:expr) => {
        match $self {
            Fragment::DefaultPaletteFile($inner) => $body,
            Fragment::UserData($inner) => $body,
            Fragment::BmInfo($inner) => $body,
            Fragment::SimpleSpriteDef($inner) => $body,
            Fragment::SimpleSprite($inner) => $body,
            Fragment::Sprite2D($inner) => $body,
            Fragment::Sprite3D($inner) => $body,
            Fragment::HierarchicalSpriteDef($inner) => $body,
            Fragment::HierarchicalSprite($inner) => $body,
            Fragment::TrackDef($inner) => $body,
            Fragment::Track($inner) => $body,
            Fragment::ActorDef($inner) => $body,
            Fragment::Actor($inner) => $body,
            Fragment::Sphere($inner) => $body,
            Fragment::PolyhedronDef($inner) => $body,
            Fragment::Polyhedron($inner) => $body,
            Fragment::SphereListDef($inner) => $body,
            Fragment::SphereList($inner) => $body,
            Fragment::LightDef($inner) => $body,
            Fragment::Light($inner) => $body,
            Fragment::WorldTree($inner) => $body,
            Fragment::Region($inner) => $body,
            Fragment::PointLight($inner) => $body,
            Fragment::Zone($inner) => $body,
            Fragment::AmbientLight($inner) => $body,
            Fragment::DirectionalLight($inner) => $body,
            Fragment::DmSpriteDef($inner) => $body,
            Fragment::DmSprite($inner) => $body,
            Fragment::MaterialDef($inner) => $body,
            Fragment::MaterialPalette($inner) => $body,
            Fragment::DmRgbTrackDef($inner) => $body,
            Fragment::DmRgbTrack($inner) => $body,
            Fragment::GlobalAmbientLightDef($inner) => $body,
            Fragment::DmSpriteDef2($inner) => $body,
            Fragment::Opaque($op) => $opaque,
        }
    };
}

impl Fragment {
    /// The record kind.
    pub fn kind(&self) -> FragKind {
        match self {
            Self::DefaultPaletteFile(_) => FragKind::DefaultPaletteFile,
            Self::UserData(_) => FragKind::UserData,
            Self::BmInfo(_) => FragKind::BmInfo,
            Self::SimpleSpriteDef(_) => FragKind::SimpleSpriteDef,
            Self::SimpleSprite(_) => FragKind::SimpleSprite,
            Self::Sprite2D(_) => FragKind::Sprite2D,
            Self::Sprite3D(_) => FragKind::Sprite3D,
            Self::HierarchicalSpriteDef(_) => FragKind::HierarchicalSpriteDef,
            Self::HierarchicalSprite(_) => FragKind::HierarchicalSprite,
            Self::TrackDef(_) => FragKind::TrackDef,
            Self::Track(_) => FragKind::Track,
            Self::ActorDef(_) => FragKind::ActorDef,
            Self::Actor(_) => FragKind::Actor,
            Self::Sphere(_) => FragKind::Sphere,
            Self::PolyhedronDef(_) => FragKind::PolyhedronDef,
            Self::Polyhedron(_) => FragKind::Polyhedron,
            Self::SphereListDef(_) => FragKind::SphereListDef,
            Self::SphereList(_) => FragKind::SphereList,
            Self::LightDef(_) => FragKind::LightDef,
            Self::Light(_) => FragKind::Light,
            Self::WorldTree(_) => FragKind::WorldTree,
            Self::Region(_) => FragKind::Region,
            Self::PointLight(_) => FragKind::PointLight,
            Self::Zone(_) => FragKind::Zone,
            Self::AmbientLight(_) => FragKind::AmbientLight,
            Self::DirectionalLight(_) => FragKind::DirectionalLight,
            Self::DmSpriteDef(_) => FragKind::DmSpriteDef,
            Self::DmSprite(_) => FragKind::DmSprite,
            Self::MaterialDef(_) => FragKind::MaterialDef,
            Self::MaterialPalette(_) => FragKind::MaterialPalette,
            Self::DmRgbTrackDef(_) => FragKind::DmRgbTrackDef,
            Self::DmRgbTrack(_) => FragKind::DmRgbTrack,
            Self::GlobalAmbientLightDef(_) => FragKind::GlobalAmbientLightDef,
            Self::DmSpriteDef2(_) => FragKind::DmSpriteDef2,
            Self::Opaque(o) => o.kind,
        }
    }

    /// The self-name reference, for kinds that carry one.
    pub fn name_ref(&self) -> Option<NameRef> {
        match self {
            Self::DefaultPaletteFile(_) | Self::UserData(_) => None,
            Self::BmInfo(f) => Some(f.name),
            Self::SimpleSpriteDef(f) => Some(f.name),
            Self::SimpleSprite(f)
            | Self::Sprite2D(f)
            | Self::Sprite3D(f)
            | Self::HierarchicalSprite(f)
            | Self::Light(f)
            | Self::DmSprite(f)
            | Self::DmRgbTrack(f) => Some(f.name),
            Self::HierarchicalSpriteDef(f) => Some(f.name),
            Self::TrackDef(f) => Some(f.name),
            Self::Track(f) => Some(f.name),
            Self::ActorDef(f) => Some(f.name),
            Self::Actor(f) => Some(f.name),
            Self::Sphere(f) => Some(f.name),
            Self::PolyhedronDef(f) => Some(f.name),
            Self::Polyhedron(f) => Some(f.name),
            Self::SphereListDef(f) => Some(f.name),
            Self::SphereList(f) => Some(f.name),
            Self::LightDef(f) => Some(f.name),
            Self::WorldTree(f) => Some(f.name),
            Self::Region(f) => Some(f.name),
            Self::PointLight(f) => Some(f.name),
            Self::Zone(f) => Some(f.name),
            Self::AmbientLight(f) => Some(f.name),
            Self::DirectionalLight(f) => Some(f.name),
            Self::DmSpriteDef(f) => Some(f.name),
            Self::MaterialDef(f) => Some(f.name),
            Self::MaterialPalette(f) => Some(f.name),
            Self::DmRgbTrackDef(f) => Some(f.name),
            Self::GlobalAmbientLightDef(f) => Some(f.name),
            Self::DmSpriteDef2(f) => Some(f.name),
            Self::Opaque(o) => o.name_ref(),
        }
    }

    /// Decode a payload of the given kind from the cursor.
    ///
    /// Does not check that the whole payload was consumed; see
    /// [`Fragment::decode_record`].
    pub fn decode(kind: FragKind, r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        Ok(match kind {
            FragKind::DefaultPaletteFile => Self::DefaultPaletteFile(Payload::decode(r)?),
            FragKind::UserData => Self::UserData(Payload::decode(r)?),
            FragKind::BmInfo => Self::BmInfo(Payload::decode(r)?),
            FragKind::SimpleSpriteDef => Self::SimpleSpriteDef(Payload::decode(r)?),
            FragKind::SimpleSprite => Self::SimpleSprite(Payload::decode(r)?),
            FragKind::Sprite2D => Self::Sprite2D(Payload::decode(r)?),
            FragKind::Sprite3D => Self::Sprite3D(Payload::decode(r)?),
            FragKind::HierarchicalSpriteDef => Self::HierarchicalSpriteDef(Payload::decode(r)?),
            FragKind::HierarchicalSprite => Self::HierarchicalSprite(Payload::decode(r)?),
            FragKind::TrackDef => Self::TrackDef(Payload::decode(r)?),
            FragKind::Track => Self::Track(Payload::decode(r)?),
            FragKind::ActorDef => Self::ActorDef(Payload::decode(r)?),
            FragKind::Actor => Self::Actor(Payload::decode(r)?),
            FragKind::Sphere => Self::Sphere(Payload::decode(r)?),
            FragKind::PolyhedronDef => Self::PolyhedronDef(Payload::decode(r)?),
            FragKind::Polyhedron => Self::Polyhedron(Payload::decode(r)?),
            FragKind::SphereListDef => Self::SphereListDef(Payload::decode(r)?),
            FragKind::SphereList => Self::SphereList(Payload::decode(r)?),
            FragKind::LightDef => Self::LightDef(Payload::decode(r)?),
            FragKind::Light => Self::Light(Payload::decode(r)?),
            FragKind::WorldTree => Self::WorldTree(Payload::decode(r)?),
            FragKind::Region => Self::Region(Payload::decode(r)?),
            FragKind::PointLight => Self::PointLight(Payload::decode(r)?),
            FragKind::Zone => Self::Zone(Payload::decode(r)?),
            FragKind::AmbientLight => Self::AmbientLight(Payload::decode(r)?),
            FragKind::DirectionalLight => Self::DirectionalLight(Payload::decode(r)?),
            FragKind::DmSpriteDef => Self::DmSpriteDef(Payload::decode(r)?),
            FragKind::DmSprite => Self::DmSprite(Payload::decode(r)?),
            FragKind::MaterialDef => Self::MaterialDef(Payload::decode(r)?),
            FragKind::MaterialPalette => Self::MaterialPalette(Payload::decode(r)?),
            FragKind::DmRgbTrackDef => Self::DmRgbTrackDef(Payload::decode(r)?),
            FragKind::DmRgbTrack => Self::DmRgbTrack(Payload::decode(r)?),
            FragKind::GlobalAmbientLightDef => Self::GlobalAmbientLightDef(Payload::decode(r)?),
            FragKind::DmSpriteDef2 => Self::DmSpriteDef2(Payload::decode(r)?),
            other => Self::Opaque(Opaque {
                kind: other,
                bytes: r.rest(),
            }),
        })
    }

    /// Decode one whole record, requiring the layout to consume exactly
    /// the declared payload.
    pub fn decode_record(
        index: RecordIndex,
        kind: FragKind,
        payload: &[u8],
        version: FormatVersion,
    ) -> Result<Self, WldError> {
        let mut r = FragReader::new(payload, version);
        let frag =
            Self::decode(kind, &mut r).map_err(|e| WldError::in_record(index, kind, e))?;
        if r.remaining() != 0 {
            return Err(WldError::SizeMismatch {
                index,
                kind,
                declared: payload.len(),
                consumed: r.position(),
            });
        }
        Ok(frag)
    }

    /// Encode the payload for a `version` file.
    pub fn encode(&self, version: FormatVersion) -> Result<Vec<u8>, PayloadError> {
        let mut w = FragWriter::new(version);
        dispatch!(self, f => f.encode(&mut w)?, o => w.bytes(&o.bytes));
        Ok(w.into_bytes())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encode then decode through the full record path.
    pub(crate) fn roundtrip(frag: &Fragment, version: FormatVersion) -> Fragment {
        let bytes = frag.encode(version).unwrap();
        Fragment::decode_record(RecordIndex::FIRST, frag.kind(), &bytes, version).unwrap()
    }

    #[test]
    fn unknown_kind_is_preserved_verbatim() {
        let payload = [0xF6, 0xFF, 0xFF, 0xFF, 1, 2, 3];
        let kind = FragKind::from_code(0x1E);
        let frag =
            Fragment::decode_record(RecordIndex::FIRST, kind, &payload, FormatVersion::Plain)
                .unwrap();
        assert_eq!(frag.kind(), kind);
        assert_eq!(frag.encode(FormatVersion::Plain).unwrap(), payload);
    }

    #[test]
    fn opaque_named_kind_exposes_its_name() {
        let frag = Fragment::Opaque(Opaque {
            kind: FragKind::BlitSpriteDef,
            bytes: (-12i32).to_le_bytes().to_vec(),
        });
        assert_eq!(frag.name_ref(), Some(NameRef(-12)));
    }

    #[test]
    fn trailing_bytes_are_a_size_mismatch() {
        let mut payload = 0i32.to_le_bytes().to_vec();
        payload.extend_from_slice(&1.5f32.to_le_bytes());
        payload.push(0);
        let err = Fragment::decode_record(
            RecordIndex::FIRST,
            FragKind::Sphere,
            &payload,
            FormatVersion::Plain,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WldError::SizeMismatch {
                declared: 9,
                consumed: 8,
                ..
            }
        ));
    }

    #[test]
    fn short_payload_is_truncated() {
        let payload = 0i32.to_le_bytes();
        let err = Fragment::decode_record(
            RecordIndex::FIRST,
            FragKind::Sphere,
            &payload,
            FormatVersion::Plain,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WldError::TruncatedRecord {
                kind: FragKind::Sphere,
                needed: 4,
                remaining: 0,
                ..
            }
        ));
    }
}
