//! End-to-end load and save through archives.

use std::sync::Once;

use wld::archive::{ArchiveError, DirArchive, EntrySink, EntrySource, MemArchive};
use wld::graph::GraphError;
use wld::prelude::*;
use wld::raw::WldError;
use wld_test_utils::{character_graph, material_file, zone_graph, Payload, WldBytes};

static TRACING: Once = Once::new();

/// Route events to the test writer, filtered by `RUST_LOG`.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[test]
fn graphs_survive_a_directory_archive() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let mut archive = DirArchive::open(dir.path()).unwrap();
    let config = WldConfig::default();

    for version in [FormatVersion::Plain, FormatVersion::Legacy, FormatVersion::NewWorld] {
        for (name, graph) in [
            ("character.wld", character_graph(version)),
            ("zone.wld", zone_graph(version)),
        ] {
            save(&mut archive, name, &graph).unwrap();
            let loaded = load(&archive, name, &config).unwrap();
            assert_eq!(loaded, graph, "{name} {version:?}");
        }
    }
    assert_eq!(
        archive.entry_names().unwrap(),
        ["character.wld", "zone.wld"]
    );
}

#[test]
fn hand_built_file_loads() {
    init_tracing();
    let mut archive = MemArchive::new();
    archive.write_entry("gequip.wld", &material_file()).unwrap();
    let graph = load(&archive, "gequip.wld", &WldConfig::default()).unwrap();
    let tags: Vec<&str> = graph.materials.keys().map(String::as_str).collect();
    assert_eq!(tags, ["Steel", "Wood", "Iron"]);
}

#[test]
fn opaque_records_load_raw_but_not_as_graph() {
    init_tracing();
    let bytes = WldBytes::new(1, 1, 4)
        .pool(b"\0\0\0\0")
        .record(0x26, &Payload::new().i32(0).u32(7).build())
        .finish();
    let mut archive = MemArchive::new();
    archive.write_entry("fx.wld", &bytes).unwrap();
    let config = WldConfig::default();

    let raw = load_raw(&archive, "fx.wld", &config).unwrap();
    assert_eq!(raw.kind_histogram()[&FragKind::BlitSpriteDef], 1);

    match load(&archive, "fx.wld", &config) {
        Err(Error::Graph(GraphError::UnsupportedKind { kind, .. })) => {
            assert_eq!(kind, FragKind::BlitSpriteDef);
        }
        other => panic!("expected UnsupportedKind, got {other:?}"),
    }
}

#[test]
fn failures_keep_their_layer() {
    init_tracing();
    let mut archive = MemArchive::new();
    archive.write_entry("junk.wld", b"not a world file at all....").unwrap();
    let config = WldConfig::default();

    assert!(matches!(
        load(&archive, "missing.wld", &config),
        Err(Error::Archive(ArchiveError::NotFound { .. }))
    ));
    assert!(matches!(
        load(&archive, "junk.wld", &config),
        Err(Error::Codec(WldError::InvalidMagic { .. }))
    ));

    let strict = WldConfig {
        decode: DecodeConfig {
            max_record_count: 0,
            ..DecodeConfig::default()
        },
        ..WldConfig::default()
    };
    assert!(matches!(
        load(&archive, "junk.wld", &strict),
        Err(Error::Config(_))
    ));
}

#[test]
fn export_writes_text_tree() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let graph = character_graph(FormatVersion::Legacy);
    let tree = wld::export_ascii(&graph, dir.path(), &WldConfig::default()).unwrap();
    for name in tree.names() {
        assert!(dir.path().join(name).is_file(), "{name}");
    }
    assert!(dir.path().join("_root.wce").is_file());
}
