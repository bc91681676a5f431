//! Graph round trips through records and bytes.

use proptest::prelude::*;
use wld_graph::model::{Material, MaterialPalette};
use wld_graph::{GraphBuilder, GraphEncoder, SemanticGraph};
use wld_raw::{FormatVersion, RawWld};
use wld_test_utils::{character_graph, material_file, zone_graph};

fn through_bytes(graph: &SemanticGraph) -> SemanticGraph {
    let raw = GraphEncoder::encode(graph).unwrap();
    let bytes = raw.to_bytes().unwrap();
    let back = RawWld::from_bytes(&bytes).unwrap();
    GraphBuilder::build(&back).unwrap()
}

#[test]
fn character_roundtrips_in_every_version() {
    for version in [
        FormatVersion::Plain,
        FormatVersion::Legacy,
        FormatVersion::NewWorld,
    ] {
        let graph = character_graph(version);
        assert_eq!(through_bytes(&graph), graph, "version {version}");
    }
}

#[test]
fn zone_roundtrips() {
    let graph = zone_graph(FormatVersion::Legacy);
    assert_eq!(through_bytes(&graph), graph);
}

#[test]
fn materials_decode_in_file_order() {
    let raw = RawWld::from_bytes(&material_file()).unwrap();
    let graph = GraphBuilder::build(&raw).unwrap();
    let tags: Vec<&str> = graph.materials.keys().map(String::as_str).collect();
    assert_eq!(tags, ["Steel", "Wood", "Iron"]);
    assert_eq!(graph.materials["Wood"].brightness, 0.75);
}

#[test]
fn decoded_file_reencodes_to_equal_graph() {
    let raw = RawWld::from_bytes(&material_file()).unwrap();
    let graph = GraphBuilder::build(&raw).unwrap();
    assert_eq!(through_bytes(&graph), graph);
}

#[test]
fn encoding_is_deterministic() {
    let graph = character_graph(FormatVersion::NewWorld);
    let first = GraphEncoder::encode(&graph).unwrap().to_bytes().unwrap();
    let again = GraphEncoder::encode(&through_bytes(&graph))
        .unwrap()
        .to_bytes()
        .unwrap();
    assert_eq!(first, again);
}

#[test]
fn record_count_matches_encoded_records() {
    let graph = zone_graph(FormatVersion::Plain);
    let raw = GraphEncoder::encode(&graph).unwrap();
    assert_eq!(raw.len(), graph.record_count());
}

#[test]
fn attachments_resolve_to_mesh_definition() {
    let graph = through_bytes(&character_graph(FormatVersion::Legacy));
    let skeleton = &graph.skeleton_defs["HUM_HS_DEF"];
    let head = &skeleton.dags[1];
    let attached = head.mesh.as_ref().unwrap();
    assert_eq!(attached.instance, "HUM_DMSPRITE");
    assert_eq!(
        attached.definition.as_ref().map(|d| d.tag.as_str()),
        Some("HUM_DMSPRITEDEF")
    );
}

fn tag() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9_]{0,11}"
}

proptest! {
    #[test]
    fn material_graphs_roundtrip(
        tags in prop::collection::btree_set(tag(), 1..8),
        brightness in -100.0f32..100.0,
        pen in any::<u32>(),
        with_pair in any::<bool>(),
    ) {
        let mut graph = SemanticGraph::new(FormatVersion::Legacy);
        for (i, t) in tags.iter().enumerate() {
            graph.materials.insert(
                format!("{t}_MDF"),
                Material {
                    flags: 0x01,
                    render_method: i as u32,
                    rgb_pen: pen,
                    brightness,
                    scaled_ambient: 1.0,
                    sprite: None,
                    pair: with_pair.then_some((i as u32, 0.25)),
                },
            );
        }
        let materials = graph.materials.keys().rev().cloned().map(Some).collect();
        graph.palettes.insert("ALL_MP".into(), MaterialPalette { flags: 0, materials });
        prop_assert_eq!(through_bytes(&graph), graph);
    }
}
