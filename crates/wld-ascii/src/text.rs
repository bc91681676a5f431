//! Text blocks for each entry kind.
//!
//! Every entry is written as
//!
//! ```text
//! KEYWORD "TAG"
//! 	FIELD value...
//! ENDKEYWORD
//! ```
//!
//! followed by a blank line. Floats use eight-digit scientific notation so
//! values survive a text round trip bit for bit. Absent optional fields and
//! absent references are written as `NULL`.

use std::fmt::{self, Display, Write};

use wld_core::FragKind;
use wld_graph::model::{
    Actor, ActorDef, AmbientLight, Bitmap, Collision, DirectionalLight, ExtendedMesh, Instance,
    KindRef, LightDef, Material, MaterialPalette, Mesh, MeshInstance, PointLight, PolyhedronDef,
    Region, RgbTrackDef, ScaledInstance, SkeletonDef, Sphere, SphereListDef, SpriteDef, Track,
    TrackDef, WorldTree, Zone,
};
use wld_raw::frag::{BoneTransform, Location, MeshUvs, TrackFrames};

/// Block keyword for `kind`.
pub(crate) fn keyword(kind: FragKind) -> &'static str {
    match kind {
        FragKind::BmInfo => "BMINFO",
        FragKind::SimpleSpriteDef => "SIMPLESPRITEDEF",
        FragKind::SimpleSprite => "SIMPLESPRITEINST",
        FragKind::MaterialDef => "MATERIALDEFINITION",
        FragKind::MaterialPalette => "MATERIALPALETTE",
        FragKind::DmRgbTrackDef => "RGBDEFORMATIONTRACKDEF",
        FragKind::DmRgbTrack => "RGBDEFORMATIONTRACKINST",
        FragKind::PolyhedronDef => "POLYHEDRONDEFINITION",
        FragKind::Polyhedron => "POLYHEDRONINSTANCE",
        FragKind::TrackDef => "TRACKDEFINITION",
        FragKind::Track => "TRACKINSTANCE",
        FragKind::DmSpriteDef => "DMSPRITEDEFINITION",
        FragKind::DmSpriteDef2 => "DMSPRITEDEF2",
        FragKind::DmSprite => "DMSPRITEINSTANCE",
        FragKind::HierarchicalSpriteDef => "HIERARCHICALSPRITEDEF",
        FragKind::HierarchicalSprite => "HIERARCHICALSPRITEINST",
        FragKind::SphereListDef => "SPHERELISTDEFINITION",
        FragKind::SphereList => "SPHERELISTINSTANCE",
        FragKind::Sphere => "SPHERE",
        FragKind::LightDef => "LIGHTDEFINITION",
        FragKind::Light => "LIGHTINSTANCE",
        FragKind::PointLight => "POINTLIGHT",
        FragKind::DirectionalLight => "DIRECTIONALLIGHT",
        FragKind::AmbientLight => "AMBIENTLIGHT",
        FragKind::GlobalAmbientLightDef => "GLOBALAMBIENTLIGHTDEF",
        FragKind::Region => "REGION",
        FragKind::WorldTree => "WORLDTREE",
        FragKind::ActorDef => "ACTORDEF",
        FragKind::Actor => "ACTORINST",
        FragKind::Zone => "ZONE",
        _ => "UNKNOWN",
    }
}

// ── Value formatting ───────────────────────────────────────────

struct Sci(f32);

impl Display for Sci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.8e}", self.0)
    }
}

/// Space-separated list.
struct List<'a, T>(&'a [T]);

impl<T: Display> Display for List<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            v.fmt(f)?;
        }
        Ok(())
    }
}

struct Floats<'a>(&'a [f32]);

impl Display for Floats<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sci: Vec<Sci> = self.0.iter().map(|&v| Sci(v)).collect();
        List(&sci).fmt(f)
    }
}

/// A tag in quotes, or `NULL`.
struct Quoted<'a>(Option<&'a str>);

impl Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(tag) => write!(f, "\"{tag}\""),
            None => f.write_str("NULL"),
        }
    }
}

fn quoted(tag: &Option<String>) -> Quoted<'_> {
    Quoted(tag.as_deref())
}

/// A value, or `NULL`.
struct Opt<T>(Option<T>);

impl<T: Display> Display for Opt<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(v) => v.fmt(f),
            None => f.write_str("NULL"),
        }
    }
}

struct Hex<'a>(&'a [u8]);

impl Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for b in self.0 {
            write!(f, "{b:02X}")?;
        }
        f.write_str("\"")
    }
}

struct KindTag<'a>(Option<&'a KindRef>);

impl Display for KindTag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(r) => write!(f, "{} \"{}\"", keyword(r.kind), r.tag),
            None => f.write_str("NULL"),
        }
    }
}

struct Place<'a>(&'a Location);

impl Display for Place<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            Floats(&self.0.position),
            Floats(&self.0.rotation),
            self.0.unk
        )
    }
}

fn flag(on: bool) -> u8 {
    u8::from(on)
}

// ── Block writer ───────────────────────────────────────────────

/// One open `KEYWORD "TAG"` block.
struct Block<'o> {
    out: &'o mut String,
    keyword: &'static str,
}

impl<'o> Block<'o> {
    fn open(out: &'o mut String, kind: FragKind, tag: &str) -> Result<Self, fmt::Error> {
        let keyword = keyword(kind);
        writeln!(out, "{keyword} \"{tag}\"")?;
        Ok(Self { out, keyword })
    }

    fn field(&mut self, key: &str, value: impl Display) -> fmt::Result {
        writeln!(self.out, "\t{key} {value}")
    }

    /// A field nested one level below the previous one.
    fn sub(&mut self, key: &str, value: impl Display) -> fmt::Result {
        writeln!(self.out, "\t\t{key} {value}")
    }

    /// A counted list of rows, each formatted by `row`.
    fn rows<T>(
        &mut self,
        count_key: &str,
        key: &str,
        items: &[T],
        mut row: impl FnMut(&T) -> String,
    ) -> fmt::Result {
        self.field(count_key, items.len())?;
        for item in items {
            self.sub(key, row(item))?;
        }
        Ok(())
    }

    fn close(self) -> fmt::Result {
        writeln!(self.out, "END{}\n", self.keyword)
    }
}

// ── Sprites and materials ──────────────────────────────────────

pub(crate) fn bitmap(out: &mut String, tag: &str, e: &Bitmap) -> fmt::Result {
    let mut b = Block::open(out, FragKind::BmInfo, tag)?;
    b.rows("NUMTEXTURES", "TEXTURE", &e.textures, |t| format!("\"{t}\""))?;
    b.close()
}

pub(crate) fn sprite_def(out: &mut String, tag: &str, e: &SpriteDef) -> fmt::Result {
    let mut b = Block::open(out, FragKind::SimpleSpriteDef, tag)?;
    b.field("FLAGS", e.flags)?;
    b.field("CURRENTFRAME", Opt(e.current_frame))?;
    b.field("SLEEP", Opt(e.sleep))?;
    b.rows("NUMFRAMES", "FRAME", &e.frames, |f| quoted(f).to_string())?;
    b.close()
}

/// Simple sprites, lights, baked-color tracks and skeletons.
pub(crate) fn instance(out: &mut String, kind: FragKind, tag: &str, e: &Instance) -> fmt::Result {
    let mut b = Block::open(out, kind, tag)?;
    b.field("DEFINITION", quoted(&e.definition))?;
    b.field("FLAGS", e.flags)?;
    b.close()
}

pub(crate) fn material(out: &mut String, tag: &str, e: &Material) -> fmt::Result {
    let mut b = Block::open(out, FragKind::MaterialDef, tag)?;
    b.field("FLAGS", e.flags)?;
    b.field("RENDERMETHOD", format_args!("0x{:08X}", e.render_method))?;
    b.field("RGBPEN", format_args!("0x{:08X}", e.rgb_pen))?;
    b.field("BRIGHTNESS", Sci(e.brightness))?;
    b.field("SCALEDAMBIENT", Sci(e.scaled_ambient))?;
    b.field("SIMPLESPRITEINST", quoted(&e.sprite))?;
    b.field(
        "PAIR",
        Opt(e.pair.map(|(a, c)| format!("{a} {}", Sci(c)))),
    )?;
    b.close()
}

pub(crate) fn palette(out: &mut String, tag: &str, e: &MaterialPalette) -> fmt::Result {
    let mut b = Block::open(out, FragKind::MaterialPalette, tag)?;
    b.field("FLAGS", e.flags)?;
    b.rows("NUMMATERIALS", "MATERIAL", &e.materials, |m| {
        quoted(m).to_string()
    })?;
    b.close()
}

pub(crate) fn rgb_track_def(out: &mut String, tag: &str, e: &RgbTrackDef) -> fmt::Result {
    let mut b = Block::open(out, FragKind::DmRgbTrackDef, tag)?;
    b.field("FLAGS", e.flags)?;
    b.field("COLORSPERFRAME", e.colors_per_frame)?;
    b.field("SLEEP", e.sleep)?;
    b.field("DATA4", e.data4)?;
    b.rows("NUMFRAMES", "FRAME", &e.frames, |colors| {
        let rgba: Vec<String> = colors
            .iter()
            .map(|c| format!("{} {} {} {}", c[0], c[1], c[2], c[3]))
            .collect();
        rgba.join("  ")
    })?;
    b.close()
}

// ── Collision ──────────────────────────────────────────────────

pub(crate) fn polyhedron_def(out: &mut String, tag: &str, e: &PolyhedronDef) -> fmt::Result {
    let mut b = Block::open(out, FragKind::PolyhedronDef, tag)?;
    b.field("FLAGS", e.flags)?;
    b.field("BOUNDINGRADIUS", Sci(e.bounding_radius))?;
    b.field("SCALEFACTOR", Opt(e.scale.map(Sci)))?;
    b.rows("NUMVERTICES", "XYZ", &e.vertices, |v| Floats(v).to_string())?;
    b.rows("NUMFACES", "FACE", &e.faces, |f| {
        format!("{} {}", f.len(), List(f.as_slice()))
    })?;
    b.close()
}

/// Polyhedron and sphere list instances.
pub(crate) fn scaled(
    out: &mut String,
    kind: FragKind,
    tag: &str,
    e: &ScaledInstance,
) -> fmt::Result {
    let mut b = Block::open(out, kind, tag)?;
    b.field("DEFINITION", quoted(&e.definition))?;
    b.field("FLAGS", e.flags)?;
    b.field("SCALE", Opt(e.scale.map(Sci)))?;
    b.close()
}

pub(crate) fn sphere_list_def(out: &mut String, tag: &str, e: &SphereListDef) -> fmt::Result {
    let mut b = Block::open(out, FragKind::SphereListDef, tag)?;
    b.field("FLAGS", e.flags)?;
    b.field("RADIUS", Sci(e.radius))?;
    b.field("SCALE", Opt(e.scale.map(Sci)))?;
    b.rows("NUMSPHERES", "SPHERE", &e.spheres, |s| Floats(s).to_string())?;
    b.close()
}

pub(crate) fn sphere(out: &mut String, tag: &str, e: &Sphere) -> fmt::Result {
    let mut b = Block::open(out, FragKind::Sphere, tag)?;
    b.field("RADIUS", Sci(e.radius))?;
    b.close()
}

// ── Animation ──────────────────────────────────────────────────

fn frame<T: Display>(t: &BoneTransform<T>) -> String {
    format!(
        "{} {}  {} {}",
        t.rotate_denom,
        List(&t.rotate),
        t.shift_denom,
        List(&t.shift)
    )
}

pub(crate) fn track_def(out: &mut String, tag: &str, e: &TrackDef) -> fmt::Result {
    let mut b = Block::open(out, FragKind::TrackDef, tag)?;
    b.field("FLAGS", e.flags)?;
    match &e.frames {
        TrackFrames::Narrow(frames) => {
            b.field("PRECISION", "NARROW")?;
            b.rows("NUMFRAMES", "FRAME", frames, frame)?;
        }
        TrackFrames::Wide(frames) => {
            b.field("PRECISION", "WIDE")?;
            b.rows("NUMFRAMES", "FRAME", frames, frame)?;
        }
    }
    b.close()
}

pub(crate) fn track(out: &mut String, tag: &str, e: &Track) -> fmt::Result {
    let mut b = Block::open(out, FragKind::Track, tag)?;
    b.field("DEFINITION", quoted(&e.definition))?;
    b.field("FLAGS", e.flags)?;
    b.field("SLEEP", Opt(e.sleep))?;
    b.field("REVERSE", flag(e.reverse()))?;
    b.field("INTERPOLATE", flag(e.interpolate()))?;
    b.close()
}

// ── Meshes ─────────────────────────────────────────────────────

pub(crate) fn mesh(out: &mut String, tag: &str, e: &Mesh) -> fmt::Result {
    let mut b = Block::open(out, FragKind::DmSpriteDef, tag)?;
    b.field("FLAGS", e.flags)?;
    b.field("FRAGMENT1", e.fragment1)?;
    b.field("MATERIALPALETTE", quoted(&e.palette))?;
    b.field("FRAGMENT3", e.fragment3)?;
    b.field("CENTER", Floats(&e.center))?;
    b.field("PARAMS", List(&e.params))?;
    b.rows("NUMVERTICES", "XYZ", &e.vertices, |v| Floats(v).to_string())?;
    b.rows("NUMUVS", "UV", &e.uvs, |v| Floats(v).to_string())?;
    b.rows("NUMNORMALS", "XYZ", &e.normals, |v| Floats(v).to_string())?;
    b.rows("NUMCOLORS", "RGBA", &e.colors, |c| format!("0x{c:08X}"))?;
    b.rows("NUMPOLYGONS", "POLYGON", &e.polygons, |p| {
        format!("{} {}  {}", p.flags, List(&p.unk), List(&p.indices))
    })?;
    b.rows("NUMSIZE6", "ENTRY", &e.size6, |s| List(s).to_string())?;
    b.rows("NUMVERTEXPIECES", "PIECE", &e.vertex_pieces, |p| {
        format!("{} {}", p.count, p.offset)
    })?;
    match &e.render_groups {
        Some(groups) => b.rows("NUMRENDERGROUPS", "GROUP", groups, |g| {
            format!("{} {}", g.polygon_count, g.material)
        })?,
        None => b.field("NUMRENDERGROUPS", "NULL")?,
    }
    match &e.vertex_tex {
        Some(tex) => b.rows("NUMVERTEXTEX", "UV", tex, |v| Floats(v).to_string())?,
        None => b.field("NUMVERTEXTEX", "NULL")?,
    }
    b.close()
}

fn pairs(pairs: &[(u16, u16)]) -> Vec<String> {
    pairs.iter().map(|(a, c)| format!("{a} {c}")).collect()
}

pub(crate) fn extended_mesh(out: &mut String, tag: &str, e: &ExtendedMesh) -> fmt::Result {
    let mut b = Block::open(out, FragKind::DmSpriteDef2, tag)?;
    b.field("FLAGS", e.flags)?;
    b.field("MATERIALPALETTE", quoted(&e.palette))?;
    b.field("DMTRACKREF", e.dm_track_ref)?;
    b.field("FRAGMENT3", e.fragment3)?;
    b.field("FRAGMENT4", e.fragment4)?;
    b.field("CENTER", Floats(&e.center))?;
    b.field("PARAMS2", List(&e.params2))?;
    b.field("MAXDISTANCE", Sci(e.max_distance))?;
    b.field("MIN", Floats(&e.min))?;
    b.field("MAX", Floats(&e.max))?;
    b.field("SCALE", e.scale)?;
    b.rows("NUMVERTICES", "XYZ", &e.vertices, |v| List(v).to_string())?;
    match &e.uvs {
        MeshUvs::Short(uvs) => b.rows("NUMUVS", "UV", uvs, |v| List(v).to_string())?,
        MeshUvs::Float(uvs) => b.rows("NUMUVS", "UV", uvs, |v| Floats(v).to_string())?,
    }
    b.rows("NUMNORMALS", "XYZ", &e.normals, |v| List(v).to_string())?;
    b.rows("NUMCOLORS", "RGBA", &e.colors, |c| List(c).to_string())?;
    b.rows("NUMFACES", "FACE", &e.faces, |f| {
        format!("{} {}", f.flags, List(&f.indices))
    })?;
    b.rows("NUMSKINGROUPS", "GROUP", &pairs(&e.skin_groups), String::clone)?;
    b.rows(
        "NUMFACEMATERIALGROUPS",
        "GROUP",
        &pairs(&e.face_material_groups),
        String::clone,
    )?;
    b.rows(
        "NUMVERTEXMATERIALGROUPS",
        "GROUP",
        &pairs(&e.vertex_material_groups),
        String::clone,
    )?;
    b.rows("NUMMESHOPS", "OP", &e.mesh_ops, |op| {
        format!(
            "{} {} {} {} {}",
            op.index1,
            op.index2,
            Sci(op.offset),
            op.param,
            op.type_code
        )
    })?;
    b.close()
}

pub(crate) fn mesh_instance(out: &mut String, tag: &str, e: &MeshInstance) -> fmt::Result {
    let mut b = Block::open(out, FragKind::DmSprite, tag)?;
    b.field("DEFINITION", KindTag(e.definition.as_ref()))?;
    b.field("FLAGS", e.flags)?;
    b.close()
}

// ── Skeletons ──────────────────────────────────────────────────

pub(crate) fn skeleton_def(out: &mut String, tag: &str, e: &SkeletonDef) -> fmt::Result {
    let mut b = Block::open(out, FragKind::HierarchicalSpriteDef, tag)?;
    b.field("FLAGS", e.flags)?;
    match &e.collision {
        Collision::Absent => b.field("COLLISIONVOLUME", "NULL")?,
        Collision::Unset => b.field("COLLISIONVOLUME", "UNSET")?,
        Collision::Polyhedron(p) => b.field("COLLISIONVOLUME", format_args!("\"{p}\""))?,
    }
    b.field("CENTEROFFSET", Opt(e.center_offset.as_ref().map(|c| Floats(c))))?;
    b.field("BOUNDINGRADIUS", Opt(e.bounding_radius.map(Sci)))?;
    b.field("NUMDAGS", e.dags.len())?;
    for dag in &e.dags {
        b.field("DAG", format_args!("\"{}\"", dag.tag))?;
        b.sub("FLAGS", dag.flags)?;
        b.sub("TRACK", quoted(&dag.track))?;
        b.sub(
            "DMSPRITE",
            Quoted(dag.mesh.as_ref().map(|m| m.instance.as_str())),
        )?;
        b.sub(
            "SUBDAGS",
            format_args!("{} {}", dag.sub_dags.len(), List(dag.sub_dags.as_slice())),
        )?;
    }
    match &e.skins {
        Some(skins) => b.rows("NUMATTACHEDSKINS", "SKIN", skins, |s| {
            format!(
                "{} {}",
                Quoted(s.mesh.as_ref().map(|m| m.instance.as_str())),
                s.link_to_dag
            )
        })?,
        None => b.field("NUMATTACHEDSKINS", "NULL")?,
    }
    b.close()
}

// ── Lights ─────────────────────────────────────────────────────

pub(crate) fn light_def(out: &mut String, tag: &str, e: &LightDef) -> fmt::Result {
    let mut b = Block::open(out, FragKind::LightDef, tag)?;
    b.field("FLAGS", e.flags)?;
    b.field("NUMFRAMES", e.frame_count)?;
    b.field("CURRENTFRAME", Opt(e.current_frame))?;
    b.field("SLEEP", Opt(e.sleep))?;
    b.field("LEVELS", Opt(e.levels.as_deref().map(Floats)))?;
    match &e.colors {
        Some(colors) => b.rows("NUMCOLORS", "RGB", colors, |c| Floats(c).to_string())?,
        None => b.field("NUMCOLORS", "NULL")?,
    }
    b.close()
}

pub(crate) fn point_light(out: &mut String, tag: &str, e: &PointLight) -> fmt::Result {
    let mut b = Block::open(out, FragKind::PointLight, tag)?;
    b.field("LIGHT", quoted(&e.light))?;
    b.field("FLAGS", e.flags)?;
    b.field("XYZ", Floats(&e.location))?;
    b.field("RADIUS", Sci(e.radius))?;
    b.close()
}

fn regions(regions: &[u32]) -> String {
    format!("{} {}", regions.len(), List(regions))
}

pub(crate) fn directional_light(
    out: &mut String,
    tag: &str,
    e: &DirectionalLight,
) -> fmt::Result {
    let mut b = Block::open(out, FragKind::DirectionalLight, tag)?;
    b.field("LIGHT", quoted(&e.light))?;
    b.field("FLAGS", e.flags)?;
    b.field("NORMAL", Floats(&e.normal))?;
    b.field("REGIONS", regions(&e.regions))?;
    b.close()
}

pub(crate) fn ambient_light(out: &mut String, tag: &str, e: &AmbientLight) -> fmt::Result {
    let mut b = Block::open(out, FragKind::AmbientLight, tag)?;
    b.field("LIGHT", quoted(&e.light))?;
    b.field("FLAGS", e.flags)?;
    b.field("REGIONS", regions(&e.regions))?;
    b.close()
}

pub(crate) fn global_ambient_light(out: &mut String, tag: &str) -> fmt::Result {
    Block::open(out, FragKind::GlobalAmbientLightDef, tag)?.close()
}

// ── World ──────────────────────────────────────────────────────

pub(crate) fn region(out: &mut String, tag: &str, e: &Region) -> fmt::Result {
    let mut b = Block::open(out, FragKind::Region, tag)?;
    b.field("FLAGS", e.flags)?;
    b.field("AMBIENTLIGHT", quoted(&e.ambient_light))?;
    b.field("COUNTS", List(&e.counts))?;
    b.rows("NUMVERTICES", "XYZ", &e.vertices, |v| Floats(v).to_string())?;
    b.field("DATA", Hex(&e.tail))?;
    b.close()
}

pub(crate) fn world_tree(out: &mut String, e: &WorldTree) -> fmt::Result {
    let mut b = Block::open(out, FragKind::WorldTree, &e.tag)?;
    b.rows("NUMWORLDNODES", "WORLDNODE", &e.nodes, |n| {
        format!("{}  {} {} {}", Floats(&n.plane), n.region, n.front, n.back)
    })?;
    b.close()
}

pub(crate) fn zone(out: &mut String, tag: &str, e: &Zone) -> fmt::Result {
    let mut b = Block::open(out, FragKind::Zone, tag)?;
    b.field("FLAGS", e.flags)?;
    b.field("REGIONS", regions(&e.regions))?;
    b.field("USERDATA", Hex(&e.user_data))?;
    b.close()
}

// ── Actors ─────────────────────────────────────────────────────

pub(crate) fn actor_def(out: &mut String, tag: &str, e: &ActorDef) -> fmt::Result {
    let mut b = Block::open(out, FragKind::ActorDef, tag)?;
    b.field("FLAGS", e.flags)?;
    b.field("CALLBACK", quoted(&e.callback))?;
    b.field("BOUNDSREF", e.bounds_ref)?;
    b.field("CURRENTACTION", Opt(e.current_action))?;
    b.field("LOCATION", Opt(e.location.as_ref().map(Place)))?;
    b.field("NUMACTIONS", e.actions.len())?;
    let mut sprites = e.sprites.iter();
    for action in &e.actions {
        b.field("ACTION", format_args!("{} {}", action.unk, action.lods.len()))?;
        for &distance in &action.lods {
            let sprite = sprites.next().and_then(Option::as_ref);
            b.sub("LOD", format_args!("{} {}", KindTag(sprite), Sci(distance)))?;
        }
    }
    b.field("UNK", e.unk)?;
    b.close()
}

pub(crate) fn actor(out: &mut String, tag: &str, e: &Actor) -> fmt::Result {
    let mut b = Block::open(out, FragKind::Actor, tag)?;
    b.field("DEFINITION", quoted(&e.definition))?;
    b.field("FLAGS", e.flags)?;
    b.field("SPHERE", quoted(&e.sphere))?;
    b.field("CURRENTACTION", Opt(e.current_action))?;
    b.field("LOCATION", Opt(e.location.as_ref().map(Place)))?;
    b.field("BOUNDINGRADIUS", Opt(e.bounding_radius.map(Sci)))?;
    b.field("SCALEFACTOR", Opt(e.scale.map(Sci)))?;
    b.field("SOUND", quoted(&e.sound))?;
    b.field("DMRGBTRACK", quoted(&e.rgb_track))?;
    b.field("USERDATA", Hex(&e.user_data))?;
    b.close()
}

// ── File-level entries ─────────────────────────────────────────

pub(crate) fn default_palette_file(out: &mut String, path: &str) -> fmt::Result {
    writeln!(out, "DEFAULTPALETTEFILE \"{path}\"\n")
}

pub(crate) fn user_data(out: &mut String, text: &str) -> fmt::Result {
    writeln!(out, "USERDATA {text:?}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_layout() {
        let mut out = String::new();
        sphere(&mut out, "BALL", &Sphere { radius: 0.5 }).unwrap();
        assert_eq!(out, "SPHERE \"BALL\"\n\tRADIUS 5.00000000e-1\nENDSPHERE\n\n");
    }

    #[test]
    fn absent_values_are_null() {
        let mut out = String::new();
        let m = Material::default();
        material(&mut out, "BLANK", &m).unwrap();
        assert!(out.contains("\tSIMPLESPRITEINST NULL\n"));
        assert!(out.contains("\tPAIR NULL\n"));
        assert!(out.contains("\tRENDERMETHOD 0x00000000\n"));
    }

    #[test]
    fn actor_lods_pair_sprites_with_distances() {
        let mut out = String::new();
        let def = ActorDef {
            actions: vec![wld_raw::frag::Action {
                unk: 0,
                lods: vec![10.0, 100.0],
            }],
            sprites: vec![Some(KindRef::new(FragKind::DmSprite, "NEAR")), None],
            ..ActorDef::default()
        };
        actor_def(&mut out, "A", &def).unwrap();
        assert!(out.contains("\t\tLOD DMSPRITEINSTANCE \"NEAR\" 1.00000000e1\n"));
        assert!(out.contains("\t\tLOD NULL 1.00000000e2\n"));
    }
}
