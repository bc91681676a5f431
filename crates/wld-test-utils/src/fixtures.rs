//! Ready-made files and graphs.
//!
//! - [`material_file`]: three materials over a plain pool, byte for byte.
//! - [`character_graph`]: a skinned, animated character with every
//!   sprite, material, collision, animation and actor kind.
//! - [`zone_graph`]: zone geometry chunks, regions, lights and a BSP tree.

use smallvec::smallvec;
use wld_core::FragKind;
use wld_graph::attach_meshes;
use wld_graph::model::{
    Actor, ActorDef, AmbientLight, Attachment, Bitmap, Collision, Dag, DirectionalLight,
    ExtendedMesh, Instance, KindRef, LightDef, Material, MaterialPalette, Mesh, MeshInstance,
    PointLight, PolyhedronDef, Region, RgbTrackDef, ScaledInstance, SemanticGraph, SkeletonDef,
    Skin, Sphere, SphereListDef, SpriteDef, Track, TrackDef, WorldTree, Zone,
};
use wld_raw::frag::{
    Action, BoneTransform, Location, MeshFace, MeshOp, MeshUvs, Polygon, RenderGroup,
    TrackFrames, VertexPiece, WorldNode,
};
use wld_raw::FormatVersion;

use crate::{Payload, WldBytes};

/// Version 1 file: pool `"Steel\0Wood\0Iron\0"` padded to 20 bytes and three
/// material records naming offsets 0, 6 and 11.
pub fn material_file() -> Vec<u8> {
    let mut file = WldBytes::new(1, 3, 20).pool(b"Steel\0Wood\0Iron\0\0\0\0\0");
    for offset in [0, 6, 11] {
        let payload = Payload::new()
            .i32(-offset)
            .u32(0)
            .u32(0x8000_0001)
            .u32(0xFFB2_B2B2)
            .f32(0.75)
            .f32(1.0)
            .u32(0)
            .build();
        file = file.record(0x30, &payload);
    }
    file.finish()
}

fn bone(rotate_z: i16, shift_y: i16) -> BoneTransform<i16> {
    BoneTransform {
        rotate_denom: 16384,
        rotate: [0, 0, rotate_z],
        shift_denom: 256,
        shift: [0, shift_y, 0],
    }
}

/// A character model: textured extended mesh, two-bone skeleton with a
/// skin, collision volume, baked-color track, and a placed actor.
pub fn character_graph(version: FormatVersion) -> SemanticGraph {
    let mut g = SemanticGraph::new(version);

    g.bitmaps.insert(
        "HUMCH0001".into(),
        Bitmap {
            textures: vec!["humch0001.bmp".into()],
        },
    );
    g.sprite_defs.insert(
        "HUMCH0001_SPRITE".into(),
        SpriteDef {
            flags: 0x10,
            current_frame: None,
            sleep: Some(100),
            frames: vec![Some("HUMCH0001".into())],
        },
    );
    g.sprites
        .insert("HUMCH0001_SPRITEINST".into(), Instance::of("HUMCH0001_SPRITE"));
    g.materials.insert(
        "HUMCH0001_MDF".into(),
        Material {
            flags: 0,
            render_method: 0x8000_0001,
            rgb_pen: 0xFFB2_B2B2,
            brightness: 0.0,
            scaled_ambient: 0.75,
            sprite: Some("HUMCH0001_SPRITEINST".into()),
            pair: Some((0, 0.5)),
        },
    );
    g.materials.insert(
        "HUM_BLANK_MDF".into(),
        Material {
            render_method: 0,
            brightness: 1.0,
            ..Material::default()
        },
    );
    g.palettes.insert(
        "HUM_MP".into(),
        MaterialPalette {
            flags: 0,
            materials: vec![Some("HUMCH0001_MDF".into()), Some("HUM_BLANK_MDF".into())],
        },
    );

    g.rgb_track_defs.insert(
        "HUM_DMT".into(),
        RgbTrackDef {
            flags: 1,
            colors_per_frame: 2,
            sleep: 200,
            data4: 0,
            frames: vec![vec![[10, 20, 30, 255], [40, 50, 60, 255]]],
        },
    );
    g.rgb_tracks.insert("HUM_DMTI".into(), Instance::of("HUM_DMT"));

    g.polyhedron_defs.insert(
        "HUM_POLYHDEF".into(),
        PolyhedronDef {
            flags: 0,
            bounding_radius: 3.0,
            scale: Some(1.0),
            vertices: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            faces: vec![smallvec![0, 1, 2], smallvec![0, 2, 3]],
        },
    );
    g.polyhedra.insert(
        "HUM_POLYH".into(),
        ScaledInstance {
            definition: Some("HUM_POLYHDEF".into()),
            flags: 0,
            scale: None,
        },
    );

    g.track_defs.insert(
        "HUM_ROOT_TRACKDEF".into(),
        TrackDef {
            flags: 0,
            frames: TrackFrames::Wide(vec![bone(0, 0), bone(512, 64)]),
        },
    );
    g.track_defs.insert(
        "HUM_HEAD_TRACKDEF".into(),
        TrackDef {
            flags: 0,
            frames: TrackFrames::Narrow(vec![BoneTransform {
                rotate_denom: 64,
                rotate: [1, -2, 3],
                shift_denom: 8,
                shift: [0, 4, -4],
            }]),
        },
    );
    g.tracks.insert(
        "HUM_ROOT_TRACK".into(),
        Track {
            definition: Some("HUM_ROOT_TRACKDEF".into()),
            flags: wld_raw::frag::Track::INTERPOLATE,
            sleep: Some(100),
        },
    );
    g.tracks.insert(
        "HUM_HEAD_TRACK".into(),
        Track {
            definition: Some("HUM_HEAD_TRACKDEF".into()),
            flags: 0,
            sleep: None,
        },
    );

    let uvs = if version.is_new_world() {
        MeshUvs::Float(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]])
    } else {
        MeshUvs::Short(vec![[0, 0], [256, 0], [0, 256]])
    };
    g.extended_meshes.insert(
        "HUM_DMSPRITEDEF".into(),
        ExtendedMesh {
            flags: 0x0001_8003,
            palette: Some("HUM_MP".into()),
            dm_track_ref: 0,
            fragment3: 0,
            fragment4: 0,
            center: [0.0, 0.0, 2.5],
            params2: [0, 0, 0],
            max_distance: 4.0,
            min: [-1.0, -1.0, 0.0],
            max: [1.0, 1.0, 5.0],
            scale: 8,
            vertices: vec![[0, 0, 0], [256, 0, 0], [0, 256, 0]],
            uvs,
            normals: vec![[0, 0, 127]; 3],
            colors: vec![[255, 255, 255, 255]; 3],
            faces: vec![MeshFace {
                flags: 0,
                indices: [0, 1, 2],
            }],
            skin_groups: vec![(2, 0), (1, 1)],
            face_material_groups: vec![(1, 0)],
            vertex_material_groups: vec![(3, 0)],
            mesh_ops: vec![MeshOp {
                index1: 0,
                index2: 1,
                offset: 0.5,
                param: 0,
                type_code: 1,
            }],
        },
    );
    g.mesh_instances.insert(
        "HUM_DMSPRITE".into(),
        MeshInstance {
            definition: Some(KindRef::new(FragKind::DmSpriteDef2, "HUM_DMSPRITEDEF")),
            flags: 0,
        },
    );

    g.skeleton_defs.insert(
        "HUM_HS_DEF".into(),
        SkeletonDef {
            flags: 0,
            collision: Collision::Polyhedron("HUM_POLYH".into()),
            center_offset: Some([0.0, 0.0, 2.5]),
            bounding_radius: Some(3.0),
            dags: vec![
                Dag {
                    tag: "HUM_ROOT_DAG".into(),
                    flags: 0,
                    track: Some("HUM_ROOT_TRACK".into()),
                    mesh: None,
                    sub_dags: smallvec![1],
                },
                Dag {
                    tag: "HUM_HEAD_DAG".into(),
                    flags: 0,
                    track: Some("HUM_HEAD_TRACK".into()),
                    mesh: Some(Attachment::to_instance("HUM_DMSPRITE")),
                    sub_dags: smallvec![],
                },
            ],
            skins: Some(vec![Skin {
                mesh: Some(Attachment::to_instance("HUM_DMSPRITE")),
                link_to_dag: 0,
            }]),
        },
    );
    g.skeletons.insert("HUM_HS".into(), Instance::of("HUM_HS_DEF"));

    g.sphere_list_defs.insert(
        "HUM_SPHERELISTDEF".into(),
        SphereListDef {
            flags: 0,
            radius: 2.0,
            scale: Some(1.0),
            spheres: vec![[0.0, 0.0, 1.0, 1.0], [0.0, 0.0, 3.0, 0.5]],
        },
    );
    g.sphere_lists.insert(
        "HUM_SPHERELIST".into(),
        ScaledInstance {
            definition: Some("HUM_SPHERELISTDEF".into()),
            flags: 0,
            scale: None,
        },
    );
    g.spheres
        .insert("HUM_SPHERE".into(), Sphere { radius: 2.5 });

    g.light_defs.insert(
        "TORCH_LDEF".into(),
        LightDef {
            flags: 0,
            frame_count: 1,
            current_frame: Some(0),
            sleep: None,
            levels: Some(vec![0.75]),
            colors: Some(vec![[1.0, 0.5, 0.25]]),
        },
    );
    g.point_lights.insert(
        "TORCH_POINTLIGHT".into(),
        PointLight {
            light: Some("TORCH_LDEF".into()),
            flags: 0,
            location: [10.0, -4.0, 2.0],
            radius: 30.0,
        },
    );

    g.actor_defs.insert(
        "HUM_ACTORDEF".into(),
        ActorDef {
            flags: 0,
            callback: Some("SPRITECALLBACK".into()),
            bounds_ref: 0,
            current_action: None,
            location: Some(Location {
                position: [0.0, 0.0, 0.0],
                rotation: [0.0, 0.0, 0.0],
                unk: 0,
            }),
            actions: vec![Action {
                unk: 0,
                lods: vec![1.0e30],
            }],
            sprites: vec![Some(KindRef::new(FragKind::HierarchicalSprite, "HUM_HS"))],
            unk: 0,
        },
    );
    g.actors.insert(
        "HUM_ACTOR".into(),
        Actor {
            definition: Some("HUM_ACTORDEF".into()),
            flags: 0x20,
            sphere: Some("HUM_SPHERE".into()),
            current_action: Some(0),
            location: Some(Location {
                position: [1.0, 2.0, 3.0],
                rotation: [0.0, 0.0, 90.0],
                unk: 0,
            }),
            bounding_radius: Some(3.0),
            scale: Some(1.5),
            sound: Some("hum_idle".into()),
            rgb_track: Some("HUM_DMTI".into()),
            user_data: b"spawn=1".to_vec(),
        },
    );
    g.actors.insert("HUM_UNBOUND_ACTOR".into(), Actor::default());

    attach_meshes(&mut g).expect("fixture attachments resolve");
    g
}

fn chunk(palette: &str, x: f32) -> Mesh {
    Mesh {
        flags: 0x0001_8003,
        palette: Some(palette.into()),
        center: [x, 0.0, 0.0],
        vertices: vec![[x, 0.0, 0.0], [x + 1.0, 0.0, 0.0], [x, 1.0, 0.0]],
        uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
        normals: vec![[0.0, 0.0, 1.0]; 3],
        colors: vec![0xFF80_8080; 3],
        polygons: vec![Polygon {
            flags: 0,
            unk: [0; 4],
            indices: [0, 1, 2],
        }],
        vertex_pieces: vec![VertexPiece {
            count: 3,
            offset: 0,
        }],
        render_groups: Some(vec![RenderGroup {
            polygon_count: 1,
            material: 0,
        }]),
        ..Mesh::default()
    }
}

/// Zone geometry: two region chunks and a prop mesh sharing one palette,
/// regions with a BSP tree, global ambient, sun and ambient lights.
pub fn zone_graph(version: FormatVersion) -> SemanticGraph {
    let mut g = SemanticGraph::new(version);
    g.default_palette_file = Some("palette.bmp".into());
    g.user_data.push("zone fixture".into());
    g.global_ambient_light = Some("DEFAULT_AMBIENTLIGHT".into());

    g.bitmaps.insert(
        "FLOOR".into(),
        Bitmap {
            textures: vec!["floor.bmp".into()],
        },
    );
    g.sprite_defs.insert(
        "FLOOR_SPRITE".into(),
        SpriteDef {
            frames: vec![Some("FLOOR".into())],
            ..SpriteDef::default()
        },
    );
    g.sprites
        .insert("FLOOR_SPRITEINST".into(), Instance::of("FLOOR_SPRITE"));
    g.materials.insert(
        "FLOOR_MDF".into(),
        Material {
            render_method: 0x8000_0001,
            brightness: 0.5,
            sprite: Some("FLOOR_SPRITEINST".into()),
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

    g.meshes.insert("R1_DMSPRITEDEF".into(), chunk("ZONE_MP", 0.0));
    g.meshes.insert("R2_DMSPRITEDEF".into(), chunk("ZONE_MP", 1.0));
    g.meshes.insert("CRATE_DMSPRITEDEF".into(), chunk("ZONE_MP", 5.0));
    g.mesh_instances.insert(
        "CRATE_DMSPRITE".into(),
        MeshInstance {
            definition: Some(KindRef::new(FragKind::DmSpriteDef, "CRATE_DMSPRITEDEF")),
            flags: 0,
        },
    );

    g.light_defs.insert(
        "SUN_LDEF".into(),
        LightDef {
            frame_count: 1,
            levels: Some(vec![1.0]),
            ..LightDef::default()
        },
    );
    g.lights.insert("SUN_L".into(), Instance::of("SUN_LDEF"));
    g.directional_lights.insert(
        "SUN".into(),
        DirectionalLight {
            light: Some("SUN_L".into()),
            flags: 0,
            normal: [0.0, 0.0, -1.0],
            regions: vec![1, 2],
        },
    );
    g.ambient_lights.insert(
        "ZONE_AMBIENT".into(),
        AmbientLight {
            light: Some("SUN_L".into()),
            flags: 0,
            regions: vec![1, 2],
        },
    );

    for (i, tag) in ["R000001", "R000002"].into_iter().enumerate() {
        g.regions.insert(
            tag.into(),
            Region {
                flags: 0x81,
                ambient_light: Some("DEFAULT_AMBIENTLIGHT".into()),
                counts: [0; 8],
                vertices: vec![[i as f32, 0.0, 0.0]],
                tail: vec![0xAA, 0xBB, 0xCC, 0xDD],
            },
        );
    }
    g.world_trees.push(WorldTree {
        tag: "ZONE_WORLDTREE".into(),
        nodes: vec![
            WorldNode {
                plane: [1.0, 0.0, 0.0, -1.0],
                region: 0,
                front: 2,
                back: 3,
            },
            WorldNode {
                plane: [0.0; 4],
                region: 1,
                front: 0,
                back: 0,
            },
            WorldNode {
                plane: [0.0; 4],
                region: 2,
                front: 0,
                back: 0,
            },
        ],
    });
    g.zones.insert(
        "ZONE_ZONE".into(),
        Zone {
            flags: 0,
            regions: vec![0, 1],
            user_data: Vec::new(),
        },
    );
    g
}
