//! BSP tree, regions and zones.

use wld_core::{NameRef, RecordRef};

use super::Payload;
use crate::codec::{FragReader, FragWriter};
use crate::error::PayloadError;

/// One node of the world BSP tree.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldNode {
    /// Split plane as normal plus distance.
    pub plane: [f32; 4],
    /// Region number for leaf nodes, 0 otherwise.
    pub region: u32,
    /// 1-based node index in front of the plane, 0 for none.
    pub front: i32,
    /// 1-based node index behind the plane, 0 for none.
    pub back: i32,
}

/// 0x21: the world BSP tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldTree {
    /// Self-name.
    pub name: NameRef,
    /// Nodes, root first.
    pub nodes: Vec<WorldNode>,
}

impl Payload for WorldTree {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let n = r.count(28)?;
        let nodes = (0..n)
            .map(|_| {
                Ok(WorldNode {
                    plane: r.vec4()?,
                    region: r.u32()?,
                    front: r.i32()?,
                    back: r.i32()?,
                })
            })
            .collect::<Result<_, PayloadError>>()?;
        Ok(Self { name, nodes })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.count(self.nodes.len(), "nodes")?;
        for node in &self.nodes {
            w.vec4(node.plane);
            w.u32(node.region);
            w.i32(node.front);
            w.i32(node.back);
        }
        Ok(())
    }
}

/// 0x22: one BSP leaf region.
///
/// Only the header and the region vertex list are interpreted; walls,
/// obstacles, visibility data and the rest of the record are kept as a
/// verbatim tail.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Region {
    /// Self-name.
    pub name: NameRef,
    /// Flags, uninterpreted.
    pub flags: u32,
    /// Global ambient light definition.
    pub ambient_light: RecordRef,
    /// The eight header counts that follow the region vertex count.
    pub counts: [u32; 8],
    /// Region vertices.
    pub vertices: Vec<[f32; 3]>,
    /// Everything after the vertex list.
    pub tail: Vec<u8>,
}

impl Payload for Region {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let flags = r.u32()?;
        let ambient_light = r.record_ref()?;
        let vertex_count = r.u32()? as usize;
        let mut counts = [0u32; 8];
        for c in &mut counts {
            *c = r.u32()?;
        }
        let n = r.check_count(vertex_count, 12)?;
        let vertices = (0..n).map(|_| r.vec3()).collect::<Result<_, _>>()?;
        let tail = r.rest();
        Ok(Self {
            name,
            flags,
            ambient_light,
            counts,
            vertices,
            tail,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.u32(self.flags);
        w.record_ref(self.ambient_light);
        w.count(self.vertices.len(), "vertices")?;
        self.counts.iter().for_each(|&c| w.u32(c));
        self.vertices.iter().for_each(|&v| w.vec3(v));
        w.bytes(&self.tail);
        Ok(())
    }
}

/// 0x29: a named group of regions.
///
/// The trailing user data is kept as raw bytes rather than decoded as a
/// string, so records written by tools that mis-encode it survive a
/// round trip unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Zone {
    /// Self-name.
    pub name: NameRef,
    /// Flags, uninterpreted.
    pub flags: u32,
    /// Region numbers in the zone.
    pub regions: Vec<u32>,
    /// Trailing user data.
    pub user_data: Vec<u8>,
}

impl Payload for Zone {
    fn decode(r: &mut FragReader<'_>) -> Result<Self, PayloadError> {
        let name = r.name()?;
        let flags = r.u32()?;
        let n = r.count(4)?;
        let regions = (0..n).map(|_| r.u32()).collect::<Result<_, _>>()?;
        let len = r.count(1)?;
        let user_data = r.bytes(len)?;
        r.skip_pad4()?;
        Ok(Self {
            name,
            flags,
            regions,
            user_data,
        })
    }

    fn encode(&self, w: &mut FragWriter) -> Result<(), PayloadError> {
        w.name(self.name);
        w.u32(self.flags);
        w.count(self.regions.len(), "regions")?;
        self.regions.iter().for_each(|&id| w.u32(id));
        w.count(self.user_data.len(), "user_data")?;
        w.bytes(&self.user_data);
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

    #[test]
    fn region_tail_is_preserved() {
        let frag = Fragment::Region(Region {
            name: NameRef(-1),
            flags: 0x81,
            ambient_light: RecordRef::NONE,
            counts: [0, 0, 0, 0, 0, 0, 1, 1],
            vertices: vec![[1.0, 2.0, 3.0]],
            tail: vec![0xDE, 0xAD, 0xBE, 0xEF, 0x01],
        });
        assert_eq!(roundtrip(&frag, FormatVersion::Plain), frag);
    }

    #[test]
    fn zone_user_data_is_padded() {
        let frag = Fragment::Zone(Zone {
            name: NameRef(-1),
            flags: 0,
            regions: vec![4, 5],
            user_data: b"WT_ZONE".to_vec(),
        });
        let bytes = frag.encode(FormatVersion::Plain).unwrap();
        assert_eq!(bytes.len(), 4 + 4 + 4 + 8 + 4 + 8);
        assert_eq!(roundtrip(&frag, FormatVersion::Plain), frag);
    }

    #[test]
    fn world_tree_roundtrip() {
        let frag = Fragment::WorldTree(WorldTree {
            name: NameRef(0),
            nodes: vec![
                WorldNode {
                    plane: [0.0, 0.0, 1.0, -5.0],
                    region: 0,
                    front: 2,
                    back: 3,
                },
                WorldNode {
                    region: 1,
                    ..WorldNode::default()
                },
                WorldNode {
                    region: 2,
                    ..WorldNode::default()
                },
            ],
        });
        assert_eq!(roundtrip(&frag, FormatVersion::Plain), frag);
    }
}
