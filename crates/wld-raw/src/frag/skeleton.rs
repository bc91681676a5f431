//! Skeletons and bone animation.

use smallvec::SmallVec;
use wld_core::{NameRef, RecordRef};

use super::{bit_if, gated, Payload};
use crate::codec::{FragReader, FragWriter};
use crate::error::PayloadError;

/// One bone node of a skeleton.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dag {
    /// Bone name.
    pub name: NameRef,
    /// Bone flags, uninterpreted.
    pub flags: u32,
    /// Track instance animating this bone.
    pub track: RecordRef,
    /// Mesh instance attached to this bone.
    pub mesh: RecordRef,
    /// Indices of child bones within the same skeleton.
    pub sub_dags: SmallVec<[u32; 4]>,
}

/// A skin mesh attached to a skeleton as a whole.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttachedSkin {
    /// Mesh instance record.
    pub mesh: RecordRef,
    /// Bone whose updates drive this skin. Carried through unresolved.
    pub link_to_dag: u32,
}

/// 0x10: a skeleton.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HierarchicalSpriteDef {
    /// Self-name.
    pub name: NameRef,
    /// Flags other than the field-presence bits.
    pub flags: u32,
    /// Collision volume reference. Kept raw because it may hold
    /// [`HierarchicalSpriteDef::COLLISION_UNSET`].
    pub collision_ref: u32,
    /// Offset of the model center.
    pub center_offset: Option<[f32; 3]>,
    /// Bounding sphere radius.
    pub bounding_radius: Option<f32>,
    /// Bone tree, parent before child.
    pub dags: Vec<Dag>,
    /// Skins attached to the whole skeleton.
    pub skins: Option<Vec<AttachedSkin>>,
}

impl HierarchicalSpriteDef {
    /// Flag bit gating [`HierarchicalSpriteDef::center_offset`].
    pub const HAS_CENTER_OFFSET: u32 = 0x01;
    /// Flag bit gating [`HierarchicalSpriteDef::bounding_radius`].
    pub const HAS_BOUNDING_RADIUS: u32 = 0x02;
    /// Flag bit gating [`HierarchicalSpriteDef::skins`].
    pub const HAS_SKINS: u32 = 0x200;
    /// Collision reference value meaning "no collision volume".
    pub const COLLISION_UNSET: u32 = 0xFFFF_FFFD;
    const DERIVED: u32 = Self::HAS_CENTER_OFFSET | Self::HAS_BOUNDING_RADIUS | Self::HAS_SKINS;
}

impl Payload for HierarchicalSpriteDef {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let flags = r.u32()?;
        let dag_count = r.u32()? as usize;
        let collision_ref = r.u32()?;
        let center_offset = gated(flags, Self::HAS_CENTER_OFFSET, || r.vec3())?;
        let bounding_radius = gated(flags, Self::HAS_BOUNDING_RADIUS, || r.f32())?;

        let dag_count = r.check_count(dag_count, 20)?;
        let mut dags = Vec::with_capacity(dag_count);
        for _ in 0..dag_count {
            let name = r.name()?;
            let flags = r.u32()?;
            let track = r.record_ref()?;
            let mesh = r.record_ref()?;
            let sub_count = r.count(4)?;
            let sub_dags = (0..sub_count)
                .map(|_| r.u32())
                .collect::<Result<_, _>>()?;
            dags.push(Dag {
                name,
                flags,
                track,
                mesh,
                sub_dags,
            });
        }

        let skins = gated(flags, Self::HAS_SKINS, || {
            let count = r.count(8)?;
            let meshes = (0..count)
                .map(|_| r.record_ref())
                .collect::<Result<Vec<_>, _>>()?;
            meshes
                .into_iter()
                .map(|mesh| {
                    Ok(AttachedSkin {
                        mesh,
                        link_to_dag: r.u32()?,
                    })
                })
                .collect::<Result<Vec<_>, PayloadError>>()
        })?;

        Ok(Self {
            name,
            flags: flags & !Self::DERIVED,
            collision_ref,
            center_offset,
            bounding_radius,
            dags,
            skins,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.u32(
            self.flags & !Self::DERIVED
                | bit_if(&self.center_offset, Self::HAS_CENTER_OFFSET)
                | bit_if(&self.bounding_radius, Self::HAS_BOUNDING_RADIUS)
                | bit_if(&self.skins, Self::HAS_SKINS),
        );
        w.count(self.dags.len(), "dags")?;
        w.u32(self.collision_ref);
        if let Some(offset) = self.center_offset {
            w.vec3(offset);
        }
        if let Some(radius) = self.bounding_radius {
            w.f32(radius);
        }
        for dag in &self.dags {
            w.name(dag.name);
            w.u32(dag.flags);
            w.record_ref(dag.track);
            w.record_ref(dag.mesh);
            w.count(dag.sub_dags.len(), "sub_dags")?;
            for &sub in &dag.sub_dags {
                w.u32(sub);
            }
        }
        if let Some(skins) = &self.skins {
            w.count(skins.len(), "skins")?;
            for skin in skins {
                w.record_ref(skin.mesh);
            }
            for skin in skins {
                w.u32(skin.link_to_dag);
            }
        }
        Ok(())
    }
}

/// One keyframe of a bone transform.
///
/// Rotation is a quaternion-like `rotate / rotate_denom`; translation is
/// `shift / shift_denom`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoneTransform<T> {
    /// Rotation denominator.
    pub rotate_denom: T,
    /// Rotation numerators.
    pub rotate: [T; 3],
    /// Translation denominator.
    pub shift_denom: T,
    /// Translation numerators.
    pub shift: [T; 3],
}

/// Keyframes at one of the two stored precisions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackFrames {
    /// 8-bit components, ordered rotation then shift.
    Narrow(Vec<BoneTransform<i8>>),
    /// 16-bit components, ordered shift then rotation, selected by
    /// [`TrackDef::WIDE_FRAMES`].
    Wide(Vec<BoneTransform<i16>>),
}

impl Default for TrackFrames {
    fn default() -> Self {
        Self::Narrow(Vec::new())
    }
}

impl TrackFrames {
    /// Number of keyframes.
    pub fn len(&self) -> usize {
        match self {
            Self::Narrow(f) => f.len(),
            Self::Wide(f) => f.len(),
        }
    }

    /// Whether there are no keyframes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 0x12: bone transform keyframes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackDef {
    /// Self-name.
    pub name: NameRef,
    /// Flags other than [`TrackDef::WIDE_FRAMES`].
    pub flags: u32,
    /// Keyframes; the variant decides the precision bit.
    pub frames: TrackFrames,
}

impl TrackDef {
    /// Flag bit selecting 16-bit keyframes.
    pub const WIDE_FRAMES: u32 = 0x08;
}

impl Payload for TrackDef {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let flags = r.u32()?;
        let frames = if flags & Self::WIDE_FRAMES != 0 {
            let count = r.count(16)?;
            let mut frames = Vec::with_capacity(count);
            for _ in 0..count {
                let shift_denom = r.i16()?;
                let shift = [r.i16()?, r.i16()?, r.i16()?];
                let rotate = [r.i16()?, r.i16()?, r.i16()?];
                let rotate_denom = r.i16()?;
                frames.push(BoneTransform {
                    rotate_denom,
                    rotate,
                    shift_denom,
                    shift,
                });
            }
            TrackFrames::Wide(frames)
        } else {
            let count = r.count(8)?;
            let mut frames = Vec::with_capacity(count);
            for _ in 0..count {
                let rotate_denom = r.i8()?;
                let rotate = [r.i8()?, r.i8()?, r.i8()?];
                let shift_denom = r.i8()?;
                let shift = [r.i8()?, r.i8()?, r.i8()?];
                frames.push(BoneTransform {
                    rotate_denom,
                    rotate,
                    shift_denom,
                    shift,
                });
            }
            TrackFrames::Narrow(frames)
        };
        Ok(Self {
            name,
            flags: flags & !Self::WIDE_FRAMES,
            frames,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        let base = self.flags & !Self::WIDE_FRAMES;
        match &self.frames {
            TrackFrames::Wide(frames) => {
                w.u32(base | Self::WIDE_FRAMES);
                w.count(frames.len(), "frames")?;
                for f in frames {
                    w.i16(f.shift_denom);
                    f.shift.iter().for_each(|&v| w.i16(v));
                    f.rotate.iter().for_each(|&v| w.i16(v));
                    w.i16(f.rotate_denom);
                }
            }
            TrackFrames::Narrow(frames) => {
                w.u32(base);
                w.count(frames.len(), "frames")?;
                for f in frames {
                    w.i8(f.rotate_denom);
                    f.rotate.iter().for_each(|&v| w.i8(v));
                    w.i8(f.shift_denom);
                    f.shift.iter().for_each(|&v| w.i8(v));
                }
            }
        }
        Ok(())
    }
}

/// 0x13: playback of a track definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Track {
    /// Self-name.
    pub name: NameRef,
    /// Track definition played.
    pub def: RecordRef,
    /// Playback flags other than [`Track::HAS_SLEEP`].
    pub flags: u32,
    /// Delay between frames, in milliseconds.
    pub sleep: Option<u32>,
}

impl Track {
    /// Flag bit gating [`Track::sleep`].
    pub const HAS_SLEEP: u32 = 0x01;
    /// Play the frames backwards.
    pub const REVERSE: u32 = 0x02;
    /// Interpolate between frames.
    pub const INTERPOLATE: u32 = 0x04;

    /// Whether playback runs backwards.
    pub fn reverse(&self) -> bool {
        self.flags & Self::REVERSE != 0
    }

    /// Whether playback interpolates.
    pub fn interpolate(&self) -> bool {
        self.flags & Self::INTERPOLATE != 0
    }
}

impl Payload for Track {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let def = r.record_ref()?;
        let flags = r.u32()?;
        let sleep = gated(flags, Self::HAS_SLEEP, || r.u32())?;
        Ok(Self {
            name,
            def,
            flags: flags & !Self::HAS_SLEEP,
            sleep,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.record_ref(self.def);
        w.u32(self.flags & !Self::HAS_SLEEP | bit_if(&self.sleep, Self::HAS_SLEEP));
        if let Some(sleep) = self.sleep {
            w.u32(sleep);
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
    use proptest::prelude::*;
    use smallvec::smallvec;

    fn wide_frame() -> BoneTransform<i16> {
        BoneTransform {
            rotate_denom: 16384,
            rotate: [1, -2, 3],
            shift_denom: 256,
            shift: [-300, 400, 500],
        }
    }

    #[test]
    fn wide_frames_use_shift_first_order() {
        let def = TrackDef {
            name: NameRef(-3),
            flags: 0,
            frames: TrackFrames::Wide(vec![wide_frame()]),
        };
        let bytes = Fragment::TrackDef(def.clone()).encode(FormatVersion::Plain).unwrap();
        assert_eq!(&bytes[4..8], &TrackDef::WIDE_FRAMES.to_le_bytes());
        assert_eq!(bytes.len(), 12 + 16);
        assert_eq!(&bytes[12..14], &256i16.to_le_bytes());
        assert_eq!(&bytes[26..28], &16384i16.to_le_bytes());
        assert_eq!(roundtrip(&Fragment::TrackDef(def.clone()), FormatVersion::Plain), Fragment::TrackDef(def));
    }

    #[test]
    fn narrow_frames_use_rotate_first_order() {
        let def = TrackDef {
            name: NameRef(-3),
            flags: 0x20,
            frames: TrackFrames::Narrow(vec![BoneTransform {
                rotate_denom: 64,
                rotate: [1, 2, 3],
                shift_denom: 8,
                shift: [-1, -2, -3],
            }]),
        };
        let bytes = Fragment::TrackDef(def.clone()).encode(FormatVersion::Plain).unwrap();
        assert_eq!(&bytes[4..8], &0x20u32.to_le_bytes());
        assert_eq!(bytes.len(), 12 + 8);
        assert_eq!(bytes[12], 64);
        assert_eq!(bytes[16], 8);
        assert_eq!(roundtrip(&Fragment::TrackDef(def.clone()), FormatVersion::Plain), Fragment::TrackDef(def));
    }

    #[test]
    fn skeleton_with_skins_roundtrips() {
        let def = HierarchicalSpriteDef {
            name: NameRef(-1),
            flags: 0,
            collision_ref: HierarchicalSpriteDef::COLLISION_UNSET,
            center_offset: None,
            bounding_radius: Some(4.5),
            dags: vec![
                Dag {
                    name: NameRef(-10),
                    flags: 0,
                    track: RecordRef::from_raw(3),
                    mesh: RecordRef::NONE,
                    sub_dags: smallvec![1],
                },
                Dag {
                    name: NameRef(-20),
                    flags: 0,
                    track: RecordRef::from_raw(4),
                    mesh: RecordRef::from_raw(5),
                    sub_dags: SmallVec::new(),
                },
            ],
            skins: Some(vec![AttachedSkin {
                mesh: RecordRef::from_raw(5),
                link_to_dag: 1,
            }]),
        };
        let frag = Fragment::HierarchicalSpriteDef(def);
        let bytes = frag.encode(FormatVersion::Plain).unwrap();
        assert_eq!(&bytes[4..8], &0x202u32.to_le_bytes());
        assert_eq!(roundtrip(&frag, FormatVersion::Plain), frag);
    }

    #[test]
    fn empty_skin_list_keeps_its_flag() {
        let def = HierarchicalSpriteDef {
            skins: Some(Vec::new()),
            ..HierarchicalSpriteDef::default()
        };
        let frag = Fragment::HierarchicalSpriteDef(def);
        assert_eq!(roundtrip(&frag, FormatVersion::Plain), frag);
    }

    proptest! {
        #[test]
        fn track_sleep_flag_duality(flags in any::<u32>(), sleep in proptest::option::of(any::<u32>())) {
            let track = Track {
                name: NameRef(0),
                def: RecordRef::from_raw(2),
                flags: flags & !Track::HAS_SLEEP,
                sleep,
            };
            let bytes = Fragment::Track(track).encode(FormatVersion::Plain).unwrap();
            let stored = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            prop_assert_eq!(stored & Track::HAS_SLEEP != 0, sleep.is_some());
            prop_assert_eq!(roundtrip(&Fragment::Track(track), FormatVersion::Plain), Fragment::Track(track));
        }
    }
}
