//! The tag-addressed graph.
//!
//! Every map is keyed by tag and keeps decode order. References between
//! entries are tags of the expected kind; an absent reference is `None`.
//! Layout-only values with no references (bone transforms, polygons, mesh
//! vertex data) reuse the record codec types directly.

use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;
use wld_core::FragKind;
use wld_raw::frag::{
    Action, Location, MeshFace, MeshOp, MeshUvs, Polygon, RenderGroup, TrackFrames, VertexPiece,
    WorldNode,
};
use wld_raw::FormatVersion;

/// A reference whose target may be one of several kinds.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KindRef {
    /// Kind of the target.
    pub kind: FragKind,
    /// Tag of the target within that kind.
    pub tag: String,
}

impl KindRef {
    /// Reference `tag` in the entries of `kind`.
    pub fn new(kind: FragKind, tag: impl Into<String>) -> Self {
        Self {
            kind,
            tag: tag.into(),
        }
    }
}

impl fmt::Display for KindRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.name(), self.tag)
    }
}

// ── Sprites and materials ──────────────────────────────────────

/// Texture file names of one bitmap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bitmap {
    /// File names, one per texture.
    pub textures: Vec<String>,
}

/// Animated sprite built from bitmaps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpriteDef {
    /// Flags other than the ones gating optional fields.
    pub flags: u32,
    /// Starting frame.
    pub current_frame: Option<u32>,
    /// Delay between frames, in milliseconds.
    pub sleep: Option<u32>,
    /// Bitmap tag per frame.
    pub frames: Vec<Option<String>>,
}

/// Instance of a definition with its placement flags. Used for simple
/// sprites, lights, baked-color tracks and skeletons.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Instance {
    /// Definition tag.
    pub definition: Option<String>,
    /// Flags or parameter word, uninterpreted.
    pub flags: u32,
}

impl Instance {
    /// Instance of `definition` with zero flags.
    pub fn of(definition: impl Into<String>) -> Self {
        Self {
            definition: Some(definition.into()),
            flags: 0,
        }
    }
}

/// Surface material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    /// Flags other than the ones gating optional fields.
    pub flags: u32,
    /// Render method bit field.
    pub render_method: u32,
    /// Packed RGBA pen color.
    pub rgb_pen: u32,
    /// Brightness.
    pub brightness: f32,
    /// Scaled ambient term.
    pub scaled_ambient: f32,
    /// Simple sprite tag supplying the texture.
    pub sprite: Option<String>,
    /// Trailing pair, uninterpreted.
    pub pair: Option<(u32, f32)>,
}

/// Ordered list of materials applied to a mesh's face groups.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialPalette {
    /// Flags, uninterpreted.
    pub flags: u32,
    /// Material tags in palette order.
    pub materials: Vec<Option<String>>,
}

/// Baked per-vertex colors over time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RgbTrackDef {
    /// Flags, uninterpreted.
    pub flags: u32,
    /// Colors in each frame.
    pub colors_per_frame: u32,
    /// Delay between frames.
    pub sleep: u32,
    /// Uninterpreted word, normally zero.
    pub data4: u32,
    /// RGBA colors per frame.
    pub frames: Vec<Vec<[u8; 4]>>,
}

// ── Collision ──────────────────────────────────────────────────

/// Convex collision volume.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolyhedronDef {
    /// Flags other than the scale bit.
    pub flags: u32,
    /// Enclosing radius.
    pub bounding_radius: f32,
    /// Scale factor.
    pub scale: Option<f32>,
    /// Vertex positions.
    pub vertices: Vec<[f32; 3]>,
    /// Faces as vertex index lists.
    pub faces: Vec<SmallVec<[u32; 4]>>,
}

/// Instance of a collision volume or sphere list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScaledInstance {
    /// Definition tag.
    pub definition: Option<String>,
    /// Flags other than the scale bit.
    pub flags: u32,
    /// Scale factor.
    pub scale: Option<f32>,
}

/// List of spheres.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SphereListDef {
    /// Flags other than the scale bit.
    pub flags: u32,
    /// Enclosing radius.
    pub radius: f32,
    /// Scale factor.
    pub scale: Option<f32>,
    /// Spheres as center xyz plus radius.
    pub spheres: Vec<[f32; 4]>,
}

/// Bounding sphere.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sphere {
    /// Radius.
    pub radius: f32,
}

// ── Animation ──────────────────────────────────────────────────

/// Bone transform keyframes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackDef {
    /// Flags other than the frame-width bit.
    pub flags: u32,
    /// Keyframes; the variant selects the stored precision.
    pub frames: TrackFrames,
}

/// Playback of a track definition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Track {
    /// Track definition tag.
    pub definition: Option<String>,
    /// Flags other than the sleep bit; carries reverse and interpolate.
    pub flags: u32,
    /// Delay between frames.
    pub sleep: Option<u32>,
}

impl Track {
    /// Whether playback runs backwards.
    pub fn reverse(&self) -> bool {
        self.flags & wld_raw::frag::Track::REVERSE != 0
    }

    /// Whether frames are interpolated.
    pub fn interpolate(&self) -> bool {
        self.flags & wld_raw::frag::Track::INTERPOLATE != 0
    }
}

// ── Meshes ─────────────────────────────────────────────────────

/// First-generation mesh definition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Flags other than the ones gating optional fields.
    pub flags: u32,
    /// Uninterpreted.
    pub fragment1: i16,
    /// Material palette tag.
    pub palette: Option<String>,
    /// Uninterpreted.
    pub fragment3: u32,
    /// Mesh center.
    pub center: [f32; 3],
    /// Uninterpreted parameter words.
    pub params: [u32; 3],
    /// Vertex positions.
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates.
    pub uvs: Vec<[f32; 2]>,
    /// Vertex normals.
    pub normals: Vec<[f32; 3]>,
    /// Packed vertex colors.
    pub colors: Vec<u32>,
    /// Triangles.
    pub polygons: Vec<Polygon>,
    /// Uninterpreted five-word entries.
    pub size6: Vec<[u32; 5]>,
    /// Vertex ranges bound to bones.
    pub vertex_pieces: Vec<VertexPiece>,
    /// Polygon ranges per material.
    pub render_groups: Option<Vec<RenderGroup>>,
    /// Extra texture coordinates.
    pub vertex_tex: Option<Vec<[f32; 2]>>,
}

/// Second-generation mesh definition.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtendedMesh {
    /// Flags, uninterpreted.
    pub flags: u32,
    /// Material palette tag.
    pub palette: Option<String>,
    /// Vertex animation record index, carried verbatim.
    pub dm_track_ref: u32,
    /// Uninterpreted.
    pub fragment3: u32,
    /// Uninterpreted.
    pub fragment4: u32,
    /// Mesh center.
    pub center: [f32; 3],
    /// Uninterpreted parameter words.
    pub params2: [u32; 3],
    /// Draw distance.
    pub max_distance: f32,
    /// Bounding box minimum.
    pub min: [f32; 3],
    /// Bounding box maximum.
    pub max: [f32; 3],
    /// Fixed-point vertex scale shift.
    pub scale: u16,
    /// Fixed-point vertex positions.
    pub vertices: Vec<[i16; 3]>,
    /// Texture coordinates, width depending on the format version.
    pub uvs: MeshUvs,
    /// Fixed-point normals.
    pub normals: Vec<[i8; 3]>,
    /// RGBA vertex colors.
    pub colors: Vec<[u8; 4]>,
    /// Triangles.
    pub faces: Vec<MeshFace>,
    /// (vertex count, bone index) runs.
    pub skin_groups: Vec<(u16, u16)>,
    /// (face count, material index) runs.
    pub face_material_groups: Vec<(u16, u16)>,
    /// (vertex count, material index) runs.
    pub vertex_material_groups: Vec<(u16, u16)>,
    /// Mesh operations.
    pub mesh_ops: Vec<MeshOp>,
}

/// Instance of a mesh, skeleton or sprite definition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MeshInstance {
    /// Definition; one of [`MeshInstance::TARGETS`].
    pub definition: Option<KindRef>,
    /// Parameter word, uninterpreted.
    pub flags: u32,
}

impl MeshInstance {
    /// Kinds a mesh instance may reference.
    pub const TARGETS: &'static [FragKind] = &[
        FragKind::DmSpriteDef,
        FragKind::DmSpriteDef2,
        FragKind::HierarchicalSpriteDef,
        FragKind::SimpleSpriteDef,
    ];
}

// ── Skeletons ──────────────────────────────────────────────────

/// A mesh attached to a bone or skin slot.
///
/// Only `instance` is stored in the file; `definition` is filled in by the
/// second build pass and ignored on encode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attachment {
    /// Mesh instance tag.
    pub instance: String,
    /// Definition behind the instance.
    pub definition: Option<KindRef>,
}

impl Attachment {
    /// An attachment not yet resolved past its instance.
    pub fn to_instance(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            definition: None,
        }
    }
}

/// One bone node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dag {
    /// Bone name; may be empty.
    pub tag: String,
    /// Flags, uninterpreted.
    pub flags: u32,
    /// Track tag animating this bone.
    pub track: Option<String>,
    /// Attached mesh.
    pub mesh: Option<Attachment>,
    /// Child bone indices.
    pub sub_dags: SmallVec<[u32; 4]>,
}

/// A skin mesh deformed by the skeleton.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Skin {
    /// Attached mesh.
    pub mesh: Option<Attachment>,
    /// Bone link, consumed by the renderer.
    pub link_to_dag: u32,
}

/// Collision volume of a skeleton.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Collision {
    /// Stored as index 0.
    #[default]
    Absent,
    /// Stored as the "unset" sentinel.
    Unset,
    /// A polyhedron instance tag.
    Polyhedron(String),
}

/// Skeleton: a bone tree plus attached skins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkeletonDef {
    /// Flags other than the ones gating optional fields.
    pub flags: u32,
    /// Collision volume.
    pub collision: Collision,
    /// Center offset.
    pub center_offset: Option<[f32; 3]>,
    /// Bounding radius.
    pub bounding_radius: Option<f32>,
    /// Bones in file order.
    pub dags: Vec<Dag>,
    /// Attached skins.
    pub skins: Option<Vec<Skin>>,
}

// ── Lights ─────────────────────────────────────────────────────

/// Light levels and colors over time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LightDef {
    /// Flags other than the ones gating optional fields.
    pub flags: u32,
    /// Number of frames.
    pub frame_count: u32,
    /// Starting frame.
    pub current_frame: Option<u32>,
    /// Delay between frames.
    pub sleep: Option<u32>,
    /// Per-frame level.
    pub levels: Option<Vec<f32>>,
    /// Per-frame color.
    pub colors: Option<Vec<[f32; 3]>>,
}

/// Placed point light.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointLight {
    /// Light definition tag.
    pub light: Option<String>,
    /// Flags, uninterpreted.
    pub flags: u32,
    /// Position.
    pub location: [f32; 3],
    /// Radius.
    pub radius: f32,
}

/// Directional light applied to regions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DirectionalLight {
    /// Light instance tag.
    pub light: Option<String>,
    /// Flags, uninterpreted.
    pub flags: u32,
    /// Light direction.
    pub normal: [f32; 3],
    /// Region numbers.
    pub regions: Vec<u32>,
}

/// Ambient light applied to regions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AmbientLight {
    /// Light instance tag.
    pub light: Option<String>,
    /// Flags, uninterpreted.
    pub flags: u32,
    /// Region numbers.
    pub regions: Vec<u32>,
}

// ── World ──────────────────────────────────────────────────────

/// One BSP leaf region.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Region {
    /// Flags, uninterpreted.
    pub flags: u32,
    /// Global ambient light tag.
    pub ambient_light: Option<String>,
    /// Counts of the uninterpreted sections in `tail`.
    pub counts: [u32; 8],
    /// Region vertices.
    pub vertices: Vec<[f32; 3]>,
    /// Walls, obstacles, visibility and user data, verbatim.
    pub tail: Vec<u8>,
}

/// BSP tree over the zone's regions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldTree {
    /// Tag.
    pub tag: String,
    /// Nodes; region numbers are carried verbatim.
    pub nodes: Vec<WorldNode>,
}

/// Named group of regions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Zone {
    /// Flags, uninterpreted.
    pub flags: u32,
    /// Region numbers.
    pub regions: Vec<u32>,
    /// User data bytes.
    pub user_data: Vec<u8>,
}

// ── Actors ─────────────────────────────────────────────────────

/// Actor definition with level-of-detail actions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActorDef {
    /// Flags other than the ones gating optional fields.
    pub flags: u32,
    /// Callback name.
    pub callback: Option<String>,
    /// Bounds record index, carried verbatim.
    pub bounds_ref: u32,
    /// Starting action.
    pub current_action: Option<u32>,
    /// Default placement.
    pub location: Option<Location>,
    /// Actions with per-LOD minimum distances.
    pub actions: Vec<Action>,
    /// One sprite per LOD across all actions; one of [`ActorDef::SPRITE_KINDS`].
    pub sprites: Vec<Option<KindRef>>,
    /// Uninterpreted trailing word.
    pub unk: u32,
}

impl ActorDef {
    /// Kinds an actor LOD may reference.
    pub const SPRITE_KINDS: &'static [FragKind] = &[
        FragKind::DmSprite,
        FragKind::HierarchicalSprite,
        FragKind::SimpleSprite,
    ];
}

/// Placed actor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Actor {
    /// Actor definition tag; `None` for an actor with no definition attached.
    pub definition: Option<String>,
    /// Flags other than the ones gating optional fields.
    pub flags: u32,
    /// Bounding sphere tag.
    pub sphere: Option<String>,
    /// Starting action.
    pub current_action: Option<u32>,
    /// Placement.
    pub location: Option<Location>,
    /// Bounding radius.
    pub bounding_radius: Option<f32>,
    /// Scale factor.
    pub scale: Option<f32>,
    /// Sound name.
    pub sound: Option<String>,
    /// Baked-color track instance tag.
    pub rgb_track: Option<String>,
    /// User data bytes.
    pub user_data: Vec<u8>,
}

// ── Graph ──────────────────────────────────────────────────────

/// A resolved world file.
#[derive(Clone, Debug, PartialEq)]
pub struct SemanticGraph {
    /// Format version the graph was read from or will be written as.
    pub version: FormatVersion,
    /// Default palette bitmap path.
    pub default_palette_file: Option<String>,
    /// Free-form user data strings, in file order.
    pub user_data: Vec<String>,
    /// Tag of the global ambient light.
    pub global_ambient_light: Option<String>,
    /// Bitmaps.
    pub bitmaps: IndexMap<String, Bitmap>,
    /// Simple sprite definitions.
    pub sprite_defs: IndexMap<String, SpriteDef>,
    /// Simple sprite instances.
    pub sprites: IndexMap<String, Instance>,
    /// Materials.
    pub materials: IndexMap<String, Material>,
    /// Material palettes.
    pub palettes: IndexMap<String, MaterialPalette>,
    /// Baked-color track definitions.
    pub rgb_track_defs: IndexMap<String, RgbTrackDef>,
    /// Baked-color track instances.
    pub rgb_tracks: IndexMap<String, Instance>,
    /// Collision volume definitions.
    pub polyhedron_defs: IndexMap<String, PolyhedronDef>,
    /// Collision volume instances.
    pub polyhedra: IndexMap<String, ScaledInstance>,
    /// Bone transform track definitions.
    pub track_defs: IndexMap<String, TrackDef>,
    /// Track instances.
    pub tracks: IndexMap<String, Track>,
    /// First-generation meshes.
    pub meshes: IndexMap<String, Mesh>,
    /// Second-generation meshes.
    pub extended_meshes: IndexMap<String, ExtendedMesh>,
    /// Mesh instances.
    pub mesh_instances: IndexMap<String, MeshInstance>,
    /// Skeleton definitions.
    pub skeleton_defs: IndexMap<String, SkeletonDef>,
    /// Skeleton instances.
    pub skeletons: IndexMap<String, Instance>,
    /// Sphere list definitions.
    pub sphere_list_defs: IndexMap<String, SphereListDef>,
    /// Sphere list instances.
    pub sphere_lists: IndexMap<String, ScaledInstance>,
    /// Bounding spheres.
    pub spheres: IndexMap<String, Sphere>,
    /// Light definitions.
    pub light_defs: IndexMap<String, LightDef>,
    /// Light instances.
    pub lights: IndexMap<String, Instance>,
    /// Point lights.
    pub point_lights: IndexMap<String, PointLight>,
    /// Directional lights.
    pub directional_lights: IndexMap<String, DirectionalLight>,
    /// Ambient lights.
    pub ambient_lights: IndexMap<String, AmbientLight>,
    /// Regions.
    pub regions: IndexMap<String, Region>,
    /// BSP trees, in file order.
    pub world_trees: Vec<WorldTree>,
    /// Actor definitions.
    pub actor_defs: IndexMap<String, ActorDef>,
    /// Placed actors.
    pub actors: IndexMap<String, Actor>,
    /// Zones.
    pub zones: IndexMap<String, Zone>,
}

impl SemanticGraph {
    /// An empty graph for `version`.
    pub fn new(version: FormatVersion) -> Self {
        Self {
            version,
            default_palette_file: None,
            user_data: Vec::new(),
            global_ambient_light: None,
            bitmaps: IndexMap::new(),
            sprite_defs: IndexMap::new(),
            sprites: IndexMap::new(),
            materials: IndexMap::new(),
            palettes: IndexMap::new(),
            rgb_track_defs: IndexMap::new(),
            rgb_tracks: IndexMap::new(),
            polyhedron_defs: IndexMap::new(),
            polyhedra: IndexMap::new(),
            track_defs: IndexMap::new(),
            tracks: IndexMap::new(),
            meshes: IndexMap::new(),
            extended_meshes: IndexMap::new(),
            mesh_instances: IndexMap::new(),
            skeleton_defs: IndexMap::new(),
            skeletons: IndexMap::new(),
            sphere_list_defs: IndexMap::new(),
            sphere_lists: IndexMap::new(),
            spheres: IndexMap::new(),
            light_defs: IndexMap::new(),
            lights: IndexMap::new(),
            point_lights: IndexMap::new(),
            directional_lights: IndexMap::new(),
            ambient_lights: IndexMap::new(),
            regions: IndexMap::new(),
            world_trees: Vec::new(),
            actor_defs: IndexMap::new(),
            actors: IndexMap::new(),
            zones: IndexMap::new(),
        }
    }

    /// Position of `tag` among the entries of `kind`, if the graph models
    /// that kind and holds such an entry.
    pub fn position_of(&self, kind: FragKind, tag: &str) -> Option<usize> {
        match kind {
            FragKind::GlobalAmbientLightDef => {
                (self.global_ambient_light.as_deref() == Some(tag)).then_some(0)
            }
            FragKind::BmInfo => self.bitmaps.get_index_of(tag),
            FragKind::SimpleSpriteDef => self.sprite_defs.get_index_of(tag),
            FragKind::SimpleSprite => self.sprites.get_index_of(tag),
            FragKind::MaterialDef => self.materials.get_index_of(tag),
            FragKind::MaterialPalette => self.palettes.get_index_of(tag),
            FragKind::DmRgbTrackDef => self.rgb_track_defs.get_index_of(tag),
            FragKind::DmRgbTrack => self.rgb_tracks.get_index_of(tag),
            FragKind::PolyhedronDef => self.polyhedron_defs.get_index_of(tag),
            FragKind::Polyhedron => self.polyhedra.get_index_of(tag),
            FragKind::TrackDef => self.track_defs.get_index_of(tag),
            FragKind::Track => self.tracks.get_index_of(tag),
            FragKind::DmSpriteDef => self.meshes.get_index_of(tag),
            FragKind::DmSpriteDef2 => self.extended_meshes.get_index_of(tag),
            FragKind::DmSprite => self.mesh_instances.get_index_of(tag),
            FragKind::HierarchicalSpriteDef => self.skeleton_defs.get_index_of(tag),
            FragKind::HierarchicalSprite => self.skeletons.get_index_of(tag),
            FragKind::SphereListDef => self.sphere_list_defs.get_index_of(tag),
            FragKind::SphereList => self.sphere_lists.get_index_of(tag),
            FragKind::Sphere => self.spheres.get_index_of(tag),
            FragKind::LightDef => self.light_defs.get_index_of(tag),
            FragKind::Light => self.lights.get_index_of(tag),
            FragKind::PointLight => self.point_lights.get_index_of(tag),
            FragKind::DirectionalLight => self.directional_lights.get_index_of(tag),
            FragKind::AmbientLight => self.ambient_lights.get_index_of(tag),
            FragKind::Region => self.regions.get_index_of(tag),
            FragKind::WorldTree => self.world_trees.iter().position(|t| t.tag == tag),
            FragKind::ActorDef => self.actor_defs.get_index_of(tag),
            FragKind::Actor => self.actors.get_index_of(tag),
            FragKind::Zone => self.zones.get_index_of(tag),
            _ => None,
        }
    }

    /// Whether an entry of `kind` is tagged `tag`.
    pub fn contains(&self, kind: FragKind, tag: &str) -> bool {
        self.position_of(kind, tag).is_some()
    }

    /// Number of entries of `kind`, counting the singleton and list fields.
    pub fn count(&self, kind: FragKind) -> usize {
        match kind {
            FragKind::DefaultPaletteFile => usize::from(self.default_palette_file.is_some()),
            FragKind::UserData => self.user_data.len(),
            FragKind::GlobalAmbientLightDef => usize::from(self.global_ambient_light.is_some()),
            FragKind::BmInfo => self.bitmaps.len(),
            FragKind::SimpleSpriteDef => self.sprite_defs.len(),
            FragKind::SimpleSprite => self.sprites.len(),
            FragKind::MaterialDef => self.materials.len(),
            FragKind::MaterialPalette => self.palettes.len(),
            FragKind::DmRgbTrackDef => self.rgb_track_defs.len(),
            FragKind::DmRgbTrack => self.rgb_tracks.len(),
            FragKind::PolyhedronDef => self.polyhedron_defs.len(),
            FragKind::Polyhedron => self.polyhedra.len(),
            FragKind::TrackDef => self.track_defs.len(),
            FragKind::Track => self.tracks.len(),
            FragKind::DmSpriteDef => self.meshes.len(),
            FragKind::DmSpriteDef2 => self.extended_meshes.len(),
            FragKind::DmSprite => self.mesh_instances.len(),
            FragKind::HierarchicalSpriteDef => self.skeleton_defs.len(),
            FragKind::HierarchicalSprite => self.skeletons.len(),
            FragKind::SphereListDef => self.sphere_list_defs.len(),
            FragKind::SphereList => self.sphere_lists.len(),
            FragKind::Sphere => self.spheres.len(),
            FragKind::LightDef => self.light_defs.len(),
            FragKind::Light => self.lights.len(),
            FragKind::PointLight => self.point_lights.len(),
            FragKind::DirectionalLight => self.directional_lights.len(),
            FragKind::AmbientLight => self.ambient_lights.len(),
            FragKind::Region => self.regions.len(),
            FragKind::WorldTree => self.world_trees.len(),
            FragKind::ActorDef => self.actor_defs.len(),
            FragKind::Actor => self.actors.len(),
            FragKind::Zone => self.zones.len(),
            _ => 0,
        }
    }

    /// Tags of every entry of `kind`, in insertion order.
    ///
    /// Kinds without tagged entries (palette file, user data, anything the
    /// graph does not model) yield nothing.
    pub fn tags(&self, kind: FragKind) -> Vec<&str> {
        fn keys<T>(map: &IndexMap<String, T>) -> Vec<&str> {
            map.keys().map(String::as_str).collect()
        }
        match kind {
            FragKind::GlobalAmbientLightDef => {
                self.global_ambient_light.as_deref().into_iter().collect()
            }
            FragKind::BmInfo => keys(&self.bitmaps),
            FragKind::SimpleSpriteDef => keys(&self.sprite_defs),
            FragKind::SimpleSprite => keys(&self.sprites),
            FragKind::MaterialDef => keys(&self.materials),
            FragKind::MaterialPalette => keys(&self.palettes),
            FragKind::DmRgbTrackDef => keys(&self.rgb_track_defs),
            FragKind::DmRgbTrack => keys(&self.rgb_tracks),
            FragKind::PolyhedronDef => keys(&self.polyhedron_defs),
            FragKind::Polyhedron => keys(&self.polyhedra),
            FragKind::TrackDef => keys(&self.track_defs),
            FragKind::Track => keys(&self.tracks),
            FragKind::DmSpriteDef => keys(&self.meshes),
            FragKind::DmSpriteDef2 => keys(&self.extended_meshes),
            FragKind::DmSprite => keys(&self.mesh_instances),
            FragKind::HierarchicalSpriteDef => keys(&self.skeleton_defs),
            FragKind::HierarchicalSprite => keys(&self.skeletons),
            FragKind::SphereListDef => keys(&self.sphere_list_defs),
            FragKind::SphereList => keys(&self.sphere_lists),
            FragKind::Sphere => keys(&self.spheres),
            FragKind::LightDef => keys(&self.light_defs),
            FragKind::Light => keys(&self.lights),
            FragKind::PointLight => keys(&self.point_lights),
            FragKind::DirectionalLight => keys(&self.directional_lights),
            FragKind::AmbientLight => keys(&self.ambient_lights),
            FragKind::Region => keys(&self.regions),
            FragKind::WorldTree => self.world_trees.iter().map(|t| t.tag.as_str()).collect(),
            FragKind::ActorDef => keys(&self.actor_defs),
            FragKind::Actor => keys(&self.actors),
            FragKind::Zone => keys(&self.zones),
            _ => Vec::new(),
        }
    }

    /// Total number of records the graph encodes to.
    pub fn record_count(&self) -> usize {
        crate::encode::EMIT_ORDER
            .iter()
            .map(|&kind| self.count(kind))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_follows_insertion_order() {
        let mut g = SemanticGraph::new(FormatVersion::Plain);
        g.materials.insert("Steel".into(), Material::default());
        g.materials.insert("Wood".into(), Material::default());
        assert_eq!(g.position_of(FragKind::MaterialDef, "Wood"), Some(1));
        assert_eq!(g.position_of(FragKind::MaterialPalette, "Wood"), None);
        assert_eq!(g.position_of(FragKind::Sprite3D, "Wood"), None);
    }

    #[test]
    fn tags_cover_singletons_and_lists() {
        let mut g = SemanticGraph::new(FormatVersion::Plain);
        g.global_ambient_light = Some("AMB".into());
        g.world_trees.push(WorldTree {
            tag: "TREE".into(),
            nodes: Vec::new(),
        });
        g.lights.insert("L1".into(), Instance::of("LDEF"));
        assert_eq!(g.tags(FragKind::GlobalAmbientLightDef), ["AMB"]);
        assert_eq!(g.tags(FragKind::WorldTree), ["TREE"]);
        assert_eq!(g.tags(FragKind::Light), ["L1"]);
        assert!(g.tags(FragKind::UserData).is_empty());
    }

    #[test]
    fn counts_include_singletons() {
        let mut g = SemanticGraph::new(FormatVersion::Plain);
        g.default_palette_file = Some("palette.bmp".into());
        g.user_data.push("a".into());
        g.user_data.push("b".into());
        g.spheres.insert("S".into(), Sphere { radius: 1.0 });
        assert_eq!(g.count(FragKind::UserData), 2);
        assert_eq!(g.record_count(), 4);
    }
}
