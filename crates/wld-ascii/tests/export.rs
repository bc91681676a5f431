//! Text export of the shared fixture graphs.

use proptest::prelude::*;
use wld_ascii::{AsciiExporter, AsciiTree, ExportConfig, ExportError};
use wld_core::FragKind;
use wld_graph::model::{Material, MaterialPalette, Mesh};
use wld_graph::SemanticGraph;
use wld_raw::FormatVersion;
use wld_test_utils::{character_graph, zone_graph};

const ROOT: &str = "_root.wce";

fn export(graph: &SemanticGraph) -> AsciiTree {
    AsciiExporter::new(graph, &ExportConfig::default())
        .export()
        .expect("export succeeds")
}

/// Number of blocks declaring `tag` across the whole tree.
fn declarations(tree: &AsciiTree, tag: &str) -> usize {
    let needle = format!(" \"{tag}\"");
    tree.files()
        .flat_map(|(_, text)| text.lines())
        .filter(|line| !line.starts_with('\t') && line.ends_with(&needle))
        .count()
}

#[test]
fn every_file_starts_with_banner() {
    let tree = export(&character_graph(FormatVersion::NewWorld));
    assert_eq!(tree.names().next(), Some(ROOT));
    for (name, text) in tree.files() {
        assert!(text.starts_with("// wcemu v0.0.1\n"), "{name}");
    }
}

#[test]
fn banner_can_be_disabled() {
    let graph = zone_graph(FormatVersion::Legacy);
    let config = ExportConfig {
        write_header: false,
        ..ExportConfig::default()
    };
    let tree = AsciiExporter::new(&graph, &config).export().unwrap();
    let root = tree.get(ROOT).unwrap();
    assert!(root.starts_with("DEFAULTPALETTEFILE \"palette.bmp\"\n"));
}

#[test]
fn character_meshes_and_tracks_get_satellites() {
    let tree = export(&character_graph(FormatVersion::Legacy));
    let names: Vec<&str> = tree.names().collect();
    assert_eq!(names, [ROOT, "hum.mod", "hum.ani"]);

    let root = tree.get(ROOT).unwrap();
    assert!(root.contains("INCLUDE \"HUM.MOD\"\n"));
    assert!(root.contains("INCLUDE \"HUM.ANI\"\n"));

    let model = tree.get("hum.mod").unwrap();
    for block in [
        "BMINFO \"HUMCH0001\"",
        "MATERIALPALETTE \"HUM_MP\"",
        "DMSPRITEDEF2 \"HUM_DMSPRITEDEF\"",
        "DMSPRITEINSTANCE \"HUM_DMSPRITE\"",
        "POLYHEDRONDEFINITION \"HUM_POLYHDEF\"",
        "HIERARCHICALSPRITEDEF \"HUM_HS_DEF\"",
        "HIERARCHICALSPRITEINST \"HUM_HS\"",
    ] {
        assert!(model.contains(block), "{block} missing from hum.mod");
    }

    let anim = tree.get("hum.ani").unwrap();
    for block in [
        "TRACKDEFINITION \"HUM_ROOT_TRACKDEF\"",
        "TRACKINSTANCE \"HUM_ROOT_TRACK\"",
        "TRACKINSTANCE \"HUM_HEAD_TRACK\"",
    ] {
        assert!(anim.contains(block), "{block} missing from hum.ani");
    }
    assert!(anim.contains("\tPRECISION WIDE\n"));
    assert!(anim.contains("\tINTERPOLATE 1\n"));

    for block in [
        "ACTORDEF \"HUM_ACTORDEF\"",
        "ACTORINST \"HUM_ACTOR\"",
        "POINTLIGHT \"TORCH_POINTLIGHT\"",
        "RGBDEFORMATIONTRACKINST \"HUM_DMTI\"",
    ] {
        assert!(root.contains(block), "{block} missing from root");
    }
}

#[test]
fn definitions_precede_their_users() {
    let tree = export(&character_graph(FormatVersion::Legacy));
    let model = tree.get("hum.mod").unwrap();
    let at = |block: &str| model.find(block).expect(block);
    assert!(at("BMINFO \"HUMCH0001\"") < at("SIMPLESPRITEDEF \"HUMCH0001_SPRITE\""));
    assert!(at("MATERIALDEFINITION \"HUMCH0001_MDF\"") < at("MATERIALPALETTE \"HUM_MP\""));
    assert!(at("MATERIALPALETTE \"HUM_MP\"") < at("DMSPRITEDEF2 \"HUM_DMSPRITEDEF\""));
    assert!(at("DMSPRITEINSTANCE \"HUM_DMSPRITE\"") < at("HIERARCHICALSPRITEDEF \"HUM_HS_DEF\""));

    let root = tree.get(ROOT).unwrap();
    let at = |block: &str| root.find(block).expect(block);
    assert!(at("SPHERE \"HUM_SPHERE\"") < at("ACTORINST \"HUM_ACTOR\""));
    assert!(at("LIGHTDEFINITION \"TORCH_LDEF\"") < at("POINTLIGHT \"TORCH_POINTLIGHT\""));
}

#[test]
fn shared_palette_is_written_once() {
    let tree = export(&zone_graph(FormatVersion::Legacy));
    assert_eq!(declarations(&tree, "ZONE_MP"), 1);
    assert_eq!(declarations(&tree, "FLOOR_MDF"), 1);
    assert_eq!(declarations(&tree, "FLOOR"), 1);
}

#[test]
fn region_chunks_stay_in_root() {
    let tree = export(&zone_graph(FormatVersion::Legacy));
    let names: Vec<&str> = tree.names().collect();
    assert_eq!(names, [ROOT, "crate.mod"]);

    let root = tree.get(ROOT).unwrap();
    assert!(root.contains("DMSPRITEDEFINITION \"R1_DMSPRITEDEF\""));
    assert!(root.contains("DMSPRITEDEFINITION \"R2_DMSPRITEDEF\""));
    assert!(root.contains("INCLUDE \"CRATE.MOD\"\n"));
    assert!(root.contains("WORLDTREE \"ZONE_WORLDTREE\""));
    assert!(root.contains("GLOBALAMBIENTLIGHTDEF \"DEFAULT_AMBIENTLIGHT\""));

    let prop = tree.get("crate.mod").unwrap();
    assert!(prop.contains("DMSPRITEDEFINITION \"CRATE_DMSPRITEDEF\""));
    assert!(prop.contains("DMSPRITEINSTANCE \"CRATE_DMSPRITE\""));
    assert!(prop.contains("\tMATERIALPALETTE \"ZONE_MP\"\n"));
    assert!(!prop.contains("\nMATERIALPALETTE \"ZONE_MP\"\n"));
    assert!(root.contains("\nMATERIALPALETTE \"ZONE_MP\"\n\tFLAGS"));
}

#[test]
fn region_chunks_can_be_split() {
    let graph = zone_graph(FormatVersion::Legacy);
    let config = ExportConfig {
        inline_region_chunks: false,
        ..ExportConfig::default()
    };
    let tree = AsciiExporter::new(&graph, &config).export().unwrap();
    let names: Vec<&str> = tree.names().collect();
    assert_eq!(names, [ROOT, "r1.mod", "r2.mod", "crate.mod"]);
    assert_eq!(declarations(&tree, "ZONE_MP"), 1);
}

#[test]
fn undefined_reference_fails_export() {
    let mut graph = SemanticGraph::new(FormatVersion::Plain);
    graph.meshes.insert(
        "PROP_DMSPRITEDEF".into(),
        Mesh {
            palette: Some("MISSING_MP".into()),
            ..Mesh::default()
        },
    );
    let err = AsciiExporter::new(&graph, &ExportConfig::default())
        .export()
        .unwrap_err();
    match err {
        ExportError::UnknownTag { kind, tag } => {
            assert_eq!(kind, FragKind::MaterialPalette);
            assert_eq!(tag, "MISSING_MP");
        }
        other => panic!("expected UnknownTag, got {other:?}"),
    }
}

#[test]
fn invalid_config_is_rejected() {
    let graph = SemanticGraph::new(FormatVersion::Plain);
    let config = ExportConfig {
        root_file_name: "../escape.wce".into(),
        ..ExportConfig::default()
    };
    let err = AsciiExporter::new(&graph, &config).export().unwrap_err();
    assert!(matches!(err, ExportError::Config(_)));
}

#[test]
fn export_is_deterministic() {
    let graph = character_graph(FormatVersion::NewWorld);
    assert_eq!(export(&graph), export(&graph));
}

#[test]
fn write_to_dir_creates_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("export");
    let tree = export(&character_graph(FormatVersion::Legacy));
    tree.write_to_dir(&out).unwrap();
    for (name, text) in tree.files() {
        let written = std::fs::read_to_string(out.join(name)).unwrap();
        assert_eq!(written, text, "{name}");
    }
}

#[test]
fn write_to_dir_reports_the_failing_path() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"x").unwrap();
    let tree = export(&zone_graph(FormatVersion::Legacy));
    match tree.write_to_dir(&blocker) {
        Err(ExportError::Io { path, .. }) => assert_eq!(path, blocker),
        other => panic!("expected Io error, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn palette_shared_by_many_meshes_is_declared_once(mesh_count in 1usize..8) {
        let mut graph = SemanticGraph::new(FormatVersion::Plain);
        graph.materials.insert("M".into(), Material::default());
        graph.palettes.insert(
            "SHARED_MP".into(),
            MaterialPalette { flags: 0, materials: vec![Some("M".into())] },
        );
        for i in 0..mesh_count {
            graph.meshes.insert(
                format!("PART{i}_DMSPRITEDEF"),
                Mesh { palette: Some("SHARED_MP".into()), ..Mesh::default() },
            );
        }
        let tree = export(&graph);
        prop_assert_eq!(declarations(&tree, "SHARED_MP"), 1);
        prop_assert_eq!(declarations(&tree, "M"), 1);
        prop_assert_eq!(tree.len(), mesh_count + 1);
    }
}
