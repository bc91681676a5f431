//! First build pass: records to graph entries.

use indexmap::IndexMap;
use tracing::{debug, trace};
use wld_core::{FragKind, RecordIndex, RecordRef};
use wld_raw::frag::{self, Fragment, Reference};
use wld_raw::RawWld;

use crate::attach::attach_meshes;
use crate::error::GraphError;
use crate::model::{
    Actor, ActorDef, AmbientLight, Attachment, Bitmap, Collision, Dag, DirectionalLight, ExtendedMesh,
    Instance, LightDef, Material, MaterialPalette, Mesh, MeshInstance, PointLight,
    PolyhedronDef, Region, RgbTrackDef, ScaledInstance, SemanticGraph, SkeletonDef, Skin, Sphere,
    SphereListDef, SpriteDef, Track, TrackDef, WorldTree, Zone,
};
use crate::resolve::RecordResolver;

const BITMAP: &[FragKind] = &[FragKind::BmInfo];
const SPRITE_DEF: &[FragKind] = &[FragKind::SimpleSpriteDef];
const SPRITE: &[FragKind] = &[FragKind::SimpleSprite];
const MATERIAL: &[FragKind] = &[FragKind::MaterialDef];
const PALETTE: &[FragKind] = &[FragKind::MaterialPalette];
const RGB_TRACK_DEF: &[FragKind] = &[FragKind::DmRgbTrackDef];
const RGB_TRACK: &[FragKind] = &[FragKind::DmRgbTrack];
const POLYHEDRON_DEF: &[FragKind] = &[FragKind::PolyhedronDef];
const POLYHEDRON: &[FragKind] = &[FragKind::Polyhedron];
const TRACK_DEF: &[FragKind] = &[FragKind::TrackDef];
const TRACK: &[FragKind] = &[FragKind::Track];
const MESH_INSTANCE: &[FragKind] = &[FragKind::DmSprite];
const SKELETON_DEF: &[FragKind] = &[FragKind::HierarchicalSpriteDef];
const SPHERE_LIST_DEF: &[FragKind] = &[FragKind::SphereListDef];
const SPHERE: &[FragKind] = &[FragKind::Sphere];
const LIGHT_DEF: &[FragKind] = &[FragKind::LightDef];
const LIGHT: &[FragKind] = &[FragKind::Light];
const GLOBAL_AMBIENT: &[FragKind] = &[FragKind::GlobalAmbientLightDef];
const ACTOR_DEF: &[FragKind] = &[FragKind::ActorDef];

/// Builds a [`SemanticGraph`] from a decoded file.
///
/// # Examples
///
/// ```
/// use wld_core::NameTable;
/// use wld_raw::frag::{Fragment, MaterialDef, MaterialPalette};
/// use wld_raw::{FormatVersion, RawWld};
/// use wld_core::RecordRef;
/// use wld_graph::GraphBuilder;
///
/// let mut names = NameTable::new();
/// let steel = names.intern("Steel").unwrap();
/// let palette = names.intern("HUM_MP").unwrap();
/// let raw = RawWld::new(
///     FormatVersion::Plain,
///     names.into_pool(),
///     vec![
///         Fragment::MaterialDef(MaterialDef { name: steel, ..Default::default() }),
///         Fragment::MaterialPalette(MaterialPalette {
///             name: palette,
///             flags: 0,
///             materials: vec![RecordRef::from_raw(1)],
///         }),
///     ],
/// );
///
/// let graph = GraphBuilder::build(&raw).unwrap();
/// assert_eq!(graph.palettes["HUM_MP"].materials, [Some("Steel".to_string())]);
/// ```
pub struct GraphBuilder<'a> {
    resolver: RecordResolver<'a>,
    graph: SemanticGraph,
}

impl<'a> GraphBuilder<'a> {
    /// Resolve every record of `raw` into a graph.
    pub fn build(raw: &'a RawWld) -> Result<SemanticGraph, GraphError> {
        let mut builder = Self {
            resolver: RecordResolver::new(raw)?,
            graph: SemanticGraph::new(raw.version()),
        };
        for (index, frag) in raw.iter() {
            builder.add(index, frag)?;
        }
        let mut graph = builder.graph;
        attach_meshes(&mut graph)?;
        debug!(
            version = %graph.version,
            records = raw.len(),
            materials = graph.materials.len(),
            meshes = graph.meshes.len() + graph.extended_meshes.len(),
            skeletons = graph.skeleton_defs.len(),
            actors = graph.actors.len(),
            regions = graph.regions.len(),
            "built semantic graph"
        );
        Ok(graph)
    }

    fn add(&mut self, index: RecordIndex, frag: &Fragment) -> Result<(), GraphError> {
        let r = &self.resolver;
        let g = &mut self.graph;
        let kind = frag.kind();
        let tag = r.tag(index).to_owned();
        trace!(%index, kind = kind.name(), %tag, "resolving record");

        match frag {
            Fragment::DefaultPaletteFile(f) => {
                if g.default_palette_file.is_some() {
                    return Err(GraphError::DuplicateTag {
                        kind,
                        tag: f.path.clone(),
                    });
                }
                g.default_palette_file = Some(f.path.clone());
            }
            Fragment::UserData(f) => g.user_data.push(f.data.clone()),
            Fragment::GlobalAmbientLightDef(_) => {
                if g.global_ambient_light.is_some() {
                    return Err(GraphError::DuplicateTag { kind, tag });
                }
                g.global_ambient_light = Some(tag);
            }
            Fragment::BmInfo(f) => {
                let bitmap = Bitmap {
                    textures: f.textures.clone(),
                };
                insert(&mut g.bitmaps, kind, tag, bitmap)?;
            }
            Fragment::SimpleSpriteDef(f) => {
                let frames = f
                    .frames
                    .iter()
                    .map(|&frame| r.tag_of(index, "frames", frame, BITMAP))
                    .collect::<Result<_, _>>()?;
                let def = SpriteDef {
                    flags: f.flags,
                    current_frame: f.current_frame,
                    sleep: f.sleep,
                    frames,
                };
                insert(&mut g.sprite_defs, kind, tag, def)?;
            }
            Fragment::SimpleSprite(f) => {
                insert(&mut g.sprites, kind, tag, instance(r, index, f, SPRITE_DEF)?)?;
            }
            Fragment::MaterialDef(f) => {
                let material = Material {
                    flags: f.flags,
                    render_method: f.render_method,
                    rgb_pen: f.rgb_pen,
                    brightness: f.brightness,
                    scaled_ambient: f.scaled_ambient,
                    sprite: r.tag_of(index, "sprite", f.sprite, SPRITE)?,
                    pair: f.pair,
                };
                insert(&mut g.materials, kind, tag, material)?;
            }
            Fragment::MaterialPalette(f) => {
                let materials = f
                    .materials
                    .iter()
                    .map(|&m| r.tag_of(index, "materials", m, MATERIAL))
                    .collect::<Result<_, _>>()?;
                let palette = MaterialPalette {
                    flags: f.flags,
                    materials,
                };
                insert(&mut g.palettes, kind, tag, palette)?;
            }
            Fragment::DmRgbTrackDef(f) => {
                let def = RgbTrackDef {
                    flags: f.flags,
                    colors_per_frame: f.colors_per_frame,
                    sleep: f.sleep,
                    data4: f.data4,
                    frames: f.frames.clone(),
                };
                insert(&mut g.rgb_track_defs, kind, tag, def)?;
            }
            Fragment::DmRgbTrack(f) => {
                insert(&mut g.rgb_tracks, kind, tag, instance(r, index, f, RGB_TRACK_DEF)?)?;
            }
            Fragment::PolyhedronDef(f) => {
                let def = PolyhedronDef {
                    flags: f.flags,
                    bounding_radius: f.bounding_radius,
                    scale: f.scale,
                    vertices: f.vertices.clone(),
                    faces: f.faces.clone(),
                };
                insert(&mut g.polyhedron_defs, kind, tag, def)?;
            }
            Fragment::Polyhedron(f) => {
                let inst = ScaledInstance {
                    definition: r.tag_of(index, "def", f.def, POLYHEDRON_DEF)?,
                    flags: f.flags,
                    scale: f.scale,
                };
                insert(&mut g.polyhedra, kind, tag, inst)?;
            }
            Fragment::TrackDef(f) => {
                let def = TrackDef {
                    flags: f.flags,
                    frames: f.frames.clone(),
                };
                insert(&mut g.track_defs, kind, tag, def)?;
            }
            Fragment::Track(f) => {
                let track = Track {
                    definition: r.tag_of(index, "def", f.def, TRACK_DEF)?,
                    flags: f.flags,
                    sleep: f.sleep,
                };
                insert(&mut g.tracks, kind, tag, track)?;
            }
            Fragment::DmSpriteDef(f) => {
                let mesh = Mesh {
                    flags: f.flags,
                    fragment1: f.fragment1,
                    palette: r.tag_of(index, "palette", f.palette, PALETTE)?,
                    fragment3: f.fragment3,
                    center: f.center,
                    params: f.params,
                    vertices: f.vertices.clone(),
                    uvs: f.uvs.clone(),
                    normals: f.normals.clone(),
                    colors: f.colors.clone(),
                    polygons: f.polygons.clone(),
                    size6: f.size6.clone(),
                    vertex_pieces: f.vertex_pieces.clone(),
                    render_groups: f.render_groups.clone(),
                    vertex_tex: f.vertex_tex.clone(),
                };
                insert(&mut g.meshes, kind, tag, mesh)?;
            }
            Fragment::DmSpriteDef2(f) => {
                insert(&mut g.extended_meshes, kind, tag, extended_mesh(r, index, f)?)?;
            }
            Fragment::DmSprite(f) => {
                let inst = MeshInstance {
                    definition: r.resolve(index, "def", f.target, MeshInstance::TARGETS)?,
                    flags: f.flags,
                };
                insert(&mut g.mesh_instances, kind, tag, inst)?;
            }
            Fragment::HierarchicalSpriteDef(f) => {
                insert(&mut g.skeleton_defs, kind, tag, skeleton_def(r, index, f)?)?;
            }
            Fragment::HierarchicalSprite(f) => {
                insert(&mut g.skeletons, kind, tag, instance(r, index, f, SKELETON_DEF)?)?;
            }
            Fragment::SphereListDef(f) => {
                let def = SphereListDef {
                    flags: f.flags,
                    radius: f.radius,
                    scale: f.scale,
                    spheres: f.spheres.clone(),
                };
                insert(&mut g.sphere_list_defs, kind, tag, def)?;
            }
            Fragment::SphereList(f) => {
                let inst = ScaledInstance {
                    definition: r.tag_of(index, "def", f.def, SPHERE_LIST_DEF)?,
                    flags: f.flags,
                    scale: f.scale,
                };
                insert(&mut g.sphere_lists, kind, tag, inst)?;
            }
            Fragment::Sphere(f) => {
                insert(&mut g.spheres, kind, tag, Sphere { radius: f.radius })?;
            }
            Fragment::LightDef(f) => {
                let def = LightDef {
                    flags: f.flags,
                    frame_count: f.frame_count,
                    current_frame: f.current_frame,
                    sleep: f.sleep,
                    levels: f.levels.clone(),
                    colors: f.colors.clone(),
                };
                insert(&mut g.light_defs, kind, tag, def)?;
            }
            Fragment::Light(f) => {
                insert(&mut g.lights, kind, tag, instance(r, index, f, LIGHT_DEF)?)?;
            }
            Fragment::PointLight(f) => {
                let light = PointLight {
                    light: r.tag_of(index, "light", f.light, LIGHT_DEF)?,
                    flags: f.flags,
                    location: f.location,
                    radius: f.radius,
                };
                insert(&mut g.point_lights, kind, tag, light)?;
            }
            Fragment::DirectionalLight(f) => {
                let light = DirectionalLight {
                    light: r.tag_of(index, "light", f.light, LIGHT)?,
                    flags: f.flags,
                    normal: f.normal,
                    regions: f.regions.clone(),
                };
                insert(&mut g.directional_lights, kind, tag, light)?;
            }
            Fragment::AmbientLight(f) => {
                let light = AmbientLight {
                    light: r.tag_of(index, "light", f.light, LIGHT)?,
                    flags: f.flags,
                    regions: f.regions.clone(),
                };
                insert(&mut g.ambient_lights, kind, tag, light)?;
            }
            Fragment::Region(f) => {
                let region = Region {
                    flags: f.flags,
                    ambient_light: r.tag_of(index, "ambient_light", f.ambient_light, GLOBAL_AMBIENT)?,
                    counts: f.counts,
                    vertices: f.vertices.clone(),
                    tail: f.tail.clone(),
                };
                insert(&mut g.regions, kind, tag, region)?;
            }
            Fragment::WorldTree(f) => {
                if g.world_trees.iter().any(|t| t.tag == tag) {
                    return Err(GraphError::DuplicateTag { kind, tag });
                }
                g.world_trees.push(WorldTree {
                    tag,
                    nodes: f.nodes.clone(),
                });
            }
            Fragment::ActorDef(f) => {
                let sprites = f
                    .sprites
                    .iter()
                    .map(|&s| r.resolve(index, "sprites", s, ActorDef::SPRITE_KINDS))
                    .collect::<Result<_, _>>()?;
                let def = ActorDef {
                    flags: f.flags,
                    callback: r.optional_name(index, f.callback)?,
                    bounds_ref: f.bounds_ref,
                    current_action: f.current_action,
                    location: f.location,
                    actions: f.actions.clone(),
                    sprites,
                    unk: f.unk,
                };
                insert(&mut g.actor_defs, kind, tag, def)?;
            }
            Fragment::Actor(f) => {
                let sound = match f.sound {
                    Some(name) => r.optional_name(index, name)?,
                    None => None,
                };
                let rgb_track = match f.rgb_track {
                    Some(track) => r.tag_of(index, "rgb_track", track, RGB_TRACK)?,
                    None => None,
                };
                let actor = Actor {
                    definition: r.tag_of(index, "def", f.def, ACTOR_DEF)?,
                    flags: f.flags,
                    sphere: r.tag_of(index, "sphere", f.sphere, SPHERE)?,
                    current_action: f.current_action,
                    location: f.location,
                    bounding_radius: f.bounding_radius,
                    scale: f.scale,
                    sound,
                    rgb_track,
                    user_data: f.user_data.clone(),
                };
                insert(&mut g.actors, kind, tag, actor)?;
            }
            Fragment::Zone(f) => {
                let zone = Zone {
                    flags: f.flags,
                    regions: f.regions.clone(),
                    user_data: f.user_data.clone(),
                };
                insert(&mut g.zones, kind, tag, zone)?;
            }
            Fragment::Sprite2D(_) | Fragment::Sprite3D(_) | Fragment::Opaque(_) => {
                return Err(GraphError::UnsupportedKind { index, kind });
            }
        }
        Ok(())
    }
}

fn insert<T>(
    map: &mut IndexMap<String, T>,
    kind: FragKind,
    tag: String,
    value: T,
) -> Result<(), GraphError> {
    if map.contains_key(&tag) {
        return Err(GraphError::DuplicateTag { kind, tag });
    }
    map.insert(tag, value);
    Ok(())
}

fn instance(
    r: &RecordResolver<'_>,
    index: RecordIndex,
    f: &Reference,
    expected: &'static [FragKind],
) -> Result<Instance, GraphError> {
    Ok(Instance {
        definition: r.tag_of(index, "def", f.target, expected)?,
        flags: f.flags,
    })
}

fn attachment(
    r: &RecordResolver<'_>,
    index: RecordIndex,
    field: &'static str,
    mesh: RecordRef,
) -> Result<Option<Attachment>, GraphError> {
    Ok(r
        .tag_of(index, field, mesh, MESH_INSTANCE)?
        .map(Attachment::to_instance))
}

fn skeleton_def(
    r: &RecordResolver<'_>,
    index: RecordIndex,
    f: &frag::HierarchicalSpriteDef,
) -> Result<SkeletonDef, GraphError> {
    let collision = match f.collision_ref {
        0 => Collision::Absent,
        frag::HierarchicalSpriteDef::COLLISION_UNSET => Collision::Unset,
        raw => r
            .tag_of(index, "collision", RecordRef::from_raw(raw), POLYHEDRON)?
            .map_or(Collision::Absent, Collision::Polyhedron),
    };
    let dags = f
        .dags
        .iter()
        .map(|dag| -> Result<Dag, GraphError> {
            Ok(Dag {
                tag: r.name(index, dag.name)?,
                flags: dag.flags,
                track: r.tag_of(index, "dag track", dag.track, TRACK)?,
                mesh: attachment(r, index, "dag mesh", dag.mesh)?,
                sub_dags: dag.sub_dags.clone(),
            })
        })
        .collect::<Result<_, _>>()?;
    let skins = match &f.skins {
        Some(skins) => Some(
            skins
                .iter()
                .map(|skin| -> Result<Skin, GraphError> {
                    Ok(Skin {
                        mesh: attachment(r, index, "skin mesh", skin.mesh)?,
                        link_to_dag: skin.link_to_dag,
                    })
                })
                .collect::<Result<_, _>>()?,
        ),
        None => None,
    };
    Ok(SkeletonDef {
        flags: f.flags,
        collision,
        center_offset: f.center_offset,
        bounding_radius: f.bounding_radius,
        dags,
        skins,
    })
}

fn extended_mesh(
    r: &RecordResolver<'_>,
    index: RecordIndex,
    f: &frag::DmSpriteDef2,
) -> Result<ExtendedMesh, GraphError> {
    Ok(ExtendedMesh {
        flags: f.flags,
        palette: r.tag_of(index, "palette", f.palette, PALETTE)?,
        dm_track_ref: f.dm_track_ref,
        fragment3: f.fragment3,
        fragment4: f.fragment4,
        center: f.center,
        params2: f.params2,
        max_distance: f.max_distance,
        min: f.min,
        max: f.max,
        scale: f.scale,
        vertices: f.vertices.clone(),
        uvs: f.uvs.clone(),
        normals: f.normals.clone(),
        colors: f.colors.clone(),
        faces: f.faces.clone(),
        skin_groups: f.skin_groups.clone(),
        face_material_groups: f.face_material_groups.clone(),
        vertex_material_groups: f.vertex_material_groups.clone(),
        mesh_ops: f.mesh_ops.clone(),
    })
}
