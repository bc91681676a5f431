//! Whole-file decode/encode through the public reader and writer.

use wld_core::{FragKind, NameRef, NamePool, NameTable, RecordIndex, RecordRef};
use wld_raw::frag::{Actor, Fragment, MaterialDef, Opaque, Sphere, SphereListDef};
use wld_raw::{DecodeConfig, FormatVersion, RawWld, WldError, WldHeader, WldReader, WldWriter};

fn header_bytes(version: u32, count: u32, pool_len: u32) -> Vec<u8> {
    let mut out = vec![0x02, 0x3D, 0x50, 0x54];
    for word in [version, count, 0, 0, pool_len, 0] {
        out.extend_from_slice(&word.to_le_bytes());
    }
    out
}

fn record(out: &mut Vec<u8>, code: i32, payload: &[u8]) {
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&code.to_le_bytes());
    out.extend_from_slice(payload);
}

fn material_payload(name: i32) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&name.to_le_bytes());
    p.extend_from_slice(&0u32.to_le_bytes()); // flags
    p.extend_from_slice(&0x8000_0001u32.to_le_bytes()); // render method
    p.extend_from_slice(&0xFFB2_B2B2u32.to_le_bytes()); // rgb pen
    p.extend_from_slice(&0.75f32.to_le_bytes());
    p.extend_from_slice(&1.0f32.to_le_bytes());
    p.extend_from_slice(&0u32.to_le_bytes()); // sprite
    p
}

fn three_materials() -> Vec<u8> {
    let mut out = header_bytes(1, 3, 20);
    out.extend_from_slice(b"Steel\0Wood\0Iron\0\0\0\0\0");
    for offset in [0, 6, 11] {
        record(&mut out, 0x30, &material_payload(-offset));
    }
    out
}

#[test]
fn plain_file_names_resolve_in_order() {
    let raw = RawWld::from_bytes(&three_materials()).unwrap();
    assert_eq!(raw.version(), FormatVersion::Plain);
    assert_eq!(raw.len(), 3);
    let names: Vec<String> = raw
        .fragments
        .iter()
        .map(|f| raw.pool.name(f.name_ref().unwrap()).unwrap())
        .collect();
    assert_eq!(names, ["Steel", "Wood", "Iron"]);
    match &raw.fragments[1] {
        Fragment::MaterialDef(m) => {
            assert_eq!(m.brightness, 0.75);
            assert!(m.sprite.is_none());
            assert_eq!(m.pair, None);
        }
        other => panic!("expected material, got {:?}", other.kind()),
    }
}

#[test]
fn plain_file_reencodes_byte_for_byte() {
    let bytes = three_materials();
    let raw = RawWld::from_bytes(&bytes).unwrap();
    assert_eq!(raw.to_bytes().unwrap(), bytes);
}

#[test]
fn scrambled_pool_roundtrips() {
    let mut table = NameTable::new();
    let ball = table.intern("BALL").unwrap();
    let pool = table.into_pool();
    let frags = vec![Fragment::Sphere(Sphere {
        name: ball,
        radius: 3.5,
    })];
    let raw = RawWld::new(FormatVersion::Legacy, pool.clone(), frags);
    let bytes = raw.to_bytes().unwrap();

    // The stored pool is not plaintext.
    let stored = &bytes[WldHeader::SIZE..WldHeader::SIZE + pool.len()];
    assert_ne!(stored, pool.as_bytes());

    let back = RawWld::from_bytes(&bytes).unwrap();
    assert_eq!(back, raw);
    assert_eq!(back.pool.name(ball).unwrap(), "BALL");
}

#[test]
fn reserved_header_words_survive() {
    let mut bytes = three_materials();
    bytes[12..16].copy_from_slice(&7u32.to_le_bytes());
    bytes[24..28].copy_from_slice(&9u32.to_le_bytes());
    let raw = RawWld::from_bytes(&bytes).unwrap();
    assert_eq!(raw.header.reserved, [7, 0, 9]);
    assert_eq!(raw.to_bytes().unwrap(), bytes);
}

#[test]
fn sphere_list_scale_follows_flag() {
    let mut base = Vec::new();
    base.extend_from_slice(&0i32.to_le_bytes());
    base.extend_from_slice(&0u32.to_le_bytes()); // flags
    base.extend_from_slice(&0u32.to_le_bytes()); // sphere count
    base.extend_from_slice(&2.0f32.to_le_bytes());

    let mut out = header_bytes(1, 2, 4);
    out.extend_from_slice(&[0; 4]);
    record(&mut out, 0x19, &base);
    let mut scaled = base.clone();
    scaled[4] = 0x01;
    scaled.extend_from_slice(&[0x00, 0x00, 0x80, 0x3F]);
    record(&mut out, 0x19, &scaled);

    let raw = RawWld::from_bytes(&out).unwrap();
    let scales: Vec<Option<f32>> = raw
        .fragments
        .iter()
        .map(|f| match f {
            Fragment::SphereListDef(SphereListDef { scale, .. }) => *scale,
            other => panic!("unexpected {:?}", other.kind()),
        })
        .collect();
    assert_eq!(scales, [None, Some(1.0)]);
}

#[test]
fn actor_with_zero_definition_decodes() {
    let mut p = Vec::new();
    p.extend_from_slice(&0i32.to_le_bytes()); // name
    p.extend_from_slice(&0u32.to_le_bytes()); // def
    p.extend_from_slice(&0u32.to_le_bytes()); // flags
    p.extend_from_slice(&0u32.to_le_bytes()); // sphere
    p.extend_from_slice(&0u32.to_le_bytes()); // user data len

    let mut out = header_bytes(1, 1, 4);
    out.extend_from_slice(&[0; 4]);
    record(&mut out, 0x15, &p);

    let raw = RawWld::from_bytes(&out).unwrap();
    match &raw.fragments[0] {
        Fragment::Actor(Actor { def, .. }) => assert_eq!(*def, RecordRef::NONE),
        other => panic!("unexpected {:?}", other.kind()),
    }
}

#[test]
fn unknown_kind_is_preserved_verbatim() {
    let mut out = header_bytes(1, 1, 4);
    out.extend_from_slice(&[0; 4]);
    record(&mut out, 0x7F, &[1, 2, 3, 4, 5]);
    let raw = RawWld::from_bytes(&out).unwrap();
    assert_eq!(
        raw.fragments[0],
        Fragment::Opaque(Opaque {
            kind: FragKind::Unknown(0x7F),
            bytes: vec![1, 2, 3, 4, 5],
        })
    );
    assert_eq!(raw.to_bytes().unwrap(), out);
}

#[test]
fn bad_magic_is_rejected() {
    let mut bytes = three_materials();
    bytes[0] = 0xFF;
    assert!(matches!(
        RawWld::from_bytes(&bytes),
        Err(WldError::InvalidMagic { .. })
    ));
}

#[test]
fn unsupported_version_is_rejected() {
    let mut bytes = three_materials();
    bytes[4..8].copy_from_slice(&2u32.to_le_bytes());
    assert!(matches!(
        RawWld::from_bytes(&bytes),
        Err(WldError::UnsupportedVersion { found: 2 })
    ));
}

#[test]
fn short_payload_is_truncated_record() {
    let mut bytes = three_materials();
    bytes.truncate(bytes.len() - 3);
    let err = RawWld::from_bytes(&bytes).unwrap_err();
    match err {
        WldError::TruncatedRecord {
            index,
            kind,
            needed,
            remaining,
        } => {
            assert_eq!(index.get(), 3);
            assert_eq!(kind, FragKind::MaterialDef);
            assert_eq!(needed, 28);
            assert_eq!(remaining, 25);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn payload_shorter_than_layout_is_truncated_record() {
    let mut out = header_bytes(1, 1, 4);
    out.extend_from_slice(&[0; 4]);
    record(&mut out, 0x30, &material_payload(0)[..20]);
    assert!(matches!(
        RawWld::from_bytes(&out),
        Err(WldError::TruncatedRecord { .. })
    ));
}

#[test]
fn unread_payload_bytes_are_size_mismatch() {
    let mut payload = material_payload(0);
    payload.extend_from_slice(&[0; 4]);
    let mut out = header_bytes(1, 1, 4);
    out.extend_from_slice(&[0; 4]);
    record(&mut out, 0x30, &payload);
    match RawWld::from_bytes(&out).unwrap_err() {
        WldError::SizeMismatch {
            declared, consumed, ..
        } => {
            assert_eq!(declared, 32);
            assert_eq!(consumed, 28);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn limits_reject_before_allocation() {
    let mut out = header_bytes(1, 5_000_000, 4);
    out.extend_from_slice(&[0; 4]);
    assert!(matches!(
        RawWld::from_bytes(&out),
        Err(WldError::LimitExceeded { what: "record count", .. })
    ));

    let mut out = header_bytes(1, 1, 4);
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&u32::MAX.to_le_bytes());
    out.extend_from_slice(&0x30i32.to_le_bytes());
    let cfg = DecodeConfig {
        max_record_len: 1024,
        ..DecodeConfig::default()
    };
    assert!(matches!(
        RawWld::read_with_config(out.as_slice(), cfg),
        Err(WldError::LimitExceeded { what: "record length", .. })
    ));
}

#[test]
fn reader_iterates_with_indices() {
    let bytes = three_materials();
    let reader = WldReader::open(bytes.as_slice()).unwrap();
    let indices: Vec<u32> = reader
        .records()
        .map(|r| r.unwrap().0.get())
        .collect();
    assert_eq!(indices, [1, 2, 3]);
}

#[test]
fn writer_enforces_declared_count() {
    let pool = NamePool::new(vec![0; 4]);
    let header = WldHeader::new(FormatVersion::Plain, 1, 0);
    let frag = Fragment::MaterialDef(MaterialDef::default());

    let writer = WldWriter::new(Vec::new(), header, &pool).unwrap();
    assert!(matches!(
        writer.finish(),
        Err(WldError::RecordCountMismatch {
            declared: 1,
            written: 0
        })
    ));

    let mut writer = WldWriter::new(Vec::new(), header, &pool).unwrap();
    assert_eq!(writer.write_fragment(&frag).unwrap(), RecordIndex::FIRST);
    assert!(matches!(
        writer.write_fragment(&frag),
        Err(WldError::RecordCountMismatch {
            declared: 1,
            written: 2
        })
    ));
}

#[test]
fn histogram_counts_kinds_in_first_seen_order() {
    let frags = vec![
        Fragment::Sphere(Sphere {
            name: NameRef(0),
            radius: 1.0,
        }),
        Fragment::MaterialDef(MaterialDef::default()),
        Fragment::Sphere(Sphere {
            name: NameRef(0),
            radius: 2.0,
        }),
    ];
    let raw = RawWld::new(FormatVersion::Plain, NamePool::new(vec![0; 4]), frags);
    let hist: Vec<(FragKind, usize)> = raw.kind_histogram().into_iter().collect();
    assert_eq!(
        hist,
        [(FragKind::Sphere, 2), (FragKind::MaterialDef, 1)]
    );
}
