//! Benchmark profiles for the WLD codec crates.
//!
//! - [`zone_profile`]: a synthetic zone with `chunks` geometry chunks, one
//!   region per chunk and a balanced BSP tree over them
//! - [`zone_bytes`]: the same profile encoded to file bytes

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use wld_graph::model::{
    Material, MaterialPalette, Mesh, Region, SemanticGraph, WorldTree, Zone,
};
use wld_graph::GraphEncoder;
use wld_raw::frag::{Polygon, RenderGroup, VertexPiece, WorldNode};
use wld_raw::FormatVersion;

/// Vertices per chunk; every consecutive triple forms one polygon.
pub const CHUNK_VERTICES: usize = 96;

fn chunk(index: usize) -> Mesh {
    let x = index as f32 * 10.0;
    let vertices: Vec<[f32; 3]> = (0..CHUNK_VERTICES)
        .map(|v| [x + (v % 8) as f32, (v / 8) as f32, 0.0])
        .collect();
    let polygons: Vec<Polygon> = (0..CHUNK_VERTICES / 3)
        .map(|p| {
            let base = (p * 3) as u16;
            Polygon {
                flags: 0,
                unk: [0; 4],
                indices: [base, base + 1, base + 2],
            }
        })
        .collect();
    Mesh {
        flags: 0,
        palette: Some("ZONE_MP".into()),
        center: [x, 0.0, 0.0],
        uvs: vertices.iter().map(|v| [v[0] / 8.0, v[1] / 12.0]).collect(),
        normals: vec![[0.0, 0.0, 1.0]; CHUNK_VERTICES],
        colors: vec![0xFF80_8080; CHUNK_VERTICES],
        render_groups: Some(vec![RenderGroup {
            polygon_count: polygons.len() as u16,
            material: 0,
        }]),
        vertex_pieces: vec![VertexPiece {
            count: CHUNK_VERTICES as u16,
            offset: 0,
        }],
        vertices,
        polygons,
        ..Mesh::default()
    }
}

/// Balanced BSP tree over regions `1..=count`, as 1-based node indices.
fn bsp(count: usize) -> Vec<WorldNode> {
    fn split(nodes: &mut Vec<WorldNode>, lo: usize, hi: usize) -> i32 {
        nodes.push(WorldNode::default());
        let at = nodes.len() - 1;
        if lo == hi {
            nodes[at].region = lo as u32;
        } else {
            let mid = (lo + hi) / 2;
            nodes[at].plane = [1.0, 0.0, 0.0, -(mid as f32) * 10.0];
            nodes[at].front = split(nodes, lo, mid);
            nodes[at].back = split(nodes, mid + 1, hi);
        }
        at as i32 + 1
    }
    let mut nodes = Vec::with_capacity(2 * count);
    if count > 0 {
        split(&mut nodes, 1, count);
    }
    nodes
}

/// A zone with `chunks` geometry chunks sharing one palette.
pub fn zone_profile(version: FormatVersion, chunks: usize) -> SemanticGraph {
    let mut g = SemanticGraph::new(version);
    g.global_ambient_light = Some("DEFAULT_AMBIENTLIGHT".into());
    g.materials.insert(
        "FLOOR_MDF".into(),
        Material {
            render_method: 0x8000_0001,
            brightness: 0.5,
            ..Material::default()
        },
    );
    g.palettes.insert(
        "ZONE_MP".into(),
        MaterialPalette {
            flags: 0,
            materials: vec![Some("FLOOR_MDF".into())],
        },
    );
    for i in 1..=chunks {
        g.meshes.insert(format!("R{i}_DMSPRITEDEF"), chunk(i));
        g.regions.insert(
            format!("R{i:06}"),
            Region {
                flags: 0x81,
                ambient_light: Some("DEFAULT_AMBIENTLIGHT".into()),
                vertices: vec![[i as f32 * 10.0, 0.0, 0.0]],
                ..Region::default()
            },
        );
    }
    g.world_trees.push(WorldTree {
        tag: "ZONE_WORLDTREE".into(),
        nodes: bsp(chunks),
    });
    g.zones.insert(
        "ZONE_ZONE".into(),
        Zone {
            flags: 0,
            regions: (0..chunks as u32).collect(),
            user_data: Vec::new(),
        },
    );
    g
}

/// [`zone_profile`] encoded to file bytes.
pub fn zone_bytes(version: FormatVersion, chunks: usize) -> Vec<u8> {
    GraphEncoder::encode(&zone_profile(version, chunks))
        .and_then(|raw| raw.to_bytes().map_err(Into::into))
        .unwrap_or_else(|e| panic!("benchmark profile failed to encode: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bsp_leaves_cover_every_region() {
        let nodes = bsp(5);
        let mut leaves: Vec<u32> = nodes.iter().map(|n| n.region).filter(|&r| r > 0).collect();
        leaves.sort_unstable();
        assert_eq!(leaves, [1, 2, 3, 4, 5]);
        assert_eq!(nodes.len(), 9);
    }

    #[test]
    fn profile_encodes() {
        let bytes = zone_bytes(FormatVersion::Legacy, 4);
        assert_eq!(&bytes[..4], &[0x02, 0x3D, 0x50, 0x54]);
    }
}
