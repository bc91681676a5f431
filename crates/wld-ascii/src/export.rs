//! Graph to text tree.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, trace};
use wld_core::FragKind;
use wld_graph::model::{Attachment, Collision, KindRef, SkeletonDef};
use wld_graph::{SemanticGraph, EMIT_ORDER};

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::state::ExportState;
use crate::text;

/// Version written in the banner of every file.
pub const ASCII_VERSION: &str = "v0.0.1";

/// Exported files by name, in creation order. The root file comes first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AsciiTree {
    files: IndexMap<String, String>,
}

impl AsciiTree {
    /// Text of the file called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    /// File names, root first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// `(name, text)` pairs, root first.
    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(n, t)| (n.as_str(), t.as_str()))
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the tree holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file into `dir`, creating it if needed. Existing files
    /// with the same names are overwritten.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<(), ExportError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        for (name, text) in &self.files {
            let path = dir.join(name);
            fs::write(&path, text).map_err(|source| ExportError::Io { path, source })?;
        }
        debug!(dir = %dir.display(), files = self.files.len(), "wrote text export");
        Ok(())
    }

    fn file_mut(&mut self, name: &str) -> &mut String {
        self.files.entry(name.to_owned()).or_default()
    }
}

/// Single-use exporter of one graph.
///
/// ```
/// use wld_ascii::{AsciiExporter, ExportConfig};
/// use wld_graph::model::Sphere;
/// use wld_graph::SemanticGraph;
/// use wld_raw::FormatVersion;
///
/// let mut graph = SemanticGraph::new(FormatVersion::Plain);
/// graph.spheres.insert("BALL".into(), Sphere { radius: 1.0 });
///
/// let tree = AsciiExporter::new(&graph, &ExportConfig::default())
///     .export()
///     .unwrap();
/// let root = tree.get("_root.wce").unwrap();
/// assert!(root.starts_with("// wcemu v0.0.1\n"));
/// assert!(root.contains("SPHERE \"BALL\""));
/// ```
#[derive(Debug)]
pub struct AsciiExporter<'g> {
    graph: &'g SemanticGraph,
    config: ExportConfig,
    state: ExportState<'g>,
    tree: AsciiTree,
}

/// An entry the one being written refers to.
type Dep<'g> = (FragKind, &'g str);

impl<'g> AsciiExporter<'g> {
    /// Exporter for `graph`.
    pub fn new(graph: &'g SemanticGraph, config: &ExportConfig) -> Self {
        Self {
            graph,
            config: config.clone(),
            state: ExportState::new(graph),
            tree: AsciiTree::default(),
        }
    }

    /// Render the whole graph.
    ///
    /// Meshes go first, each into its own `.mod` satellite together with
    /// the palette, materials and sprites it uses and the skeletons that
    /// attach it. Everything not yet written then goes to the root file in
    /// dependency order. Each entry is written once, after everything it
    /// references.
    pub fn export(mut self) -> Result<AsciiTree, ExportError> {
        self.config.validate()?;
        let graph = self.graph;
        let root = self.config.root_file_name.clone();
        self.open_file(&root)?;

        if let Some(path) = &graph.default_palette_file {
            text::default_palette_file(self.tree.file_mut(&root), path)?;
        }
        for data in &graph.user_data {
            text::user_data(self.tree.file_mut(&root), data)?;
        }

        for tag in graph.meshes.keys() {
            self.export_mesh(FragKind::DmSpriteDef, tag)?;
        }
        for tag in graph.extended_meshes.keys() {
            self.export_mesh(FragKind::DmSpriteDef2, tag)?;
        }
        for tag in graph.skeleton_defs.keys() {
            self.export_skeleton(tag, &root)?;
        }
        for &kind in EMIT_ORDER {
            for tag in graph.tags(kind) {
                self.ensure(kind, tag, &root)?;
            }
        }

        debug!(
            files = self.tree.len(),
            entries = self.state.written().count(),
            "exported graph as text"
        );
        Ok(self.tree)
    }

    /// Create `name` with the banner. Returns `false` if it already existed.
    fn open_file(&mut self, name: &str) -> Result<bool, ExportError> {
        if self.tree.files.contains_key(name) {
            return Ok(false);
        }
        let file = self.tree.file_mut(name);
        if self.config.write_header {
            writeln!(file, "// wcemu {ASCII_VERSION}")?;
            writeln!(
                file,
                "// This file was created by wld-ascii v{}\n",
                env!("CARGO_PKG_VERSION")
            )?;
        }
        Ok(true)
    }

    /// Satellite `<base>.<ext>`, included from the root on first use.
    fn satellite(&mut self, base: &str, ext: &str) -> Result<String, ExportError> {
        let name = format!("{base}.{ext}");
        if self.open_file(&name)? {
            let root = self.config.root_file_name.clone();
            writeln!(
                self.tree.file_mut(&root),
                "INCLUDE \"{}\"",
                name.to_uppercase()
            )?;
        }
        Ok(name)
    }

    fn export_mesh(&mut self, kind: FragKind, tag: &'g str) -> Result<(), ExportError> {
        if self.state.is_written(kind, tag) {
            return Ok(());
        }
        let base = file_base(tag, "_DMSPRITEDEF");
        let file = if self.config.inline_region_chunks && is_region_chunk(&base) {
            self.config.root_file_name.clone()
        } else {
            self.satellite(&base, "mod")?
        };
        self.ensure(kind, tag, &file)?;

        let graph = self.graph;
        let target = KindRef::new(kind, tag);
        for (instance, mesh) in &graph.mesh_instances {
            if mesh.definition.as_ref() == Some(&target) {
                self.ensure(FragKind::DmSprite, instance, &file)?;
            }
        }
        for (skeleton, def) in &graph.skeleton_defs {
            if self.attaches(def, &target) {
                self.export_skeleton(skeleton, &file)?;
            }
        }
        Ok(())
    }

    /// A skeleton into `file` with its tracks in `<base>.ani`, followed by
    /// its instances.
    fn export_skeleton(&mut self, tag: &'g str, file: &str) -> Result<(), ExportError> {
        if self.state.is_written(FragKind::HierarchicalSpriteDef, tag) {
            return Ok(());
        }
        let graph = self.graph;
        let Some(def) = graph.skeleton_defs.get(tag) else {
            return Err(ExportError::UnknownTag {
                kind: FragKind::HierarchicalSpriteDef,
                tag: tag.to_owned(),
            });
        };

        let tracks: Vec<&str> = def
            .dags
            .iter()
            .filter_map(|dag| dag.track.as_deref())
            .filter(|track| !self.state.is_written(FragKind::Track, track))
            .collect();
        if !tracks.is_empty() {
            let ani = self.satellite(&file_base(tag, "_HS_DEF"), "ani")?;
            for track in tracks {
                self.ensure(FragKind::Track, track, &ani)?;
            }
        }

        self.ensure(FragKind::HierarchicalSpriteDef, tag, file)?;
        for (instance, skeleton) in &graph.skeletons {
            if skeleton.definition.as_deref() == Some(tag) {
                self.ensure(FragKind::HierarchicalSprite, instance, file)?;
            }
        }
        Ok(())
    }

    /// Whether any bone or skin of `def` carries the mesh `target`.
    fn attaches(&self, def: &SkeletonDef, target: &KindRef) -> bool {
        let dag_meshes = def.dags.iter().filter_map(|dag| dag.mesh.as_ref());
        let skin_meshes = def
            .skins
            .iter()
            .flatten()
            .filter_map(|skin| skin.mesh.as_ref());
        dag_meshes
            .chain(skin_meshes)
            .any(|a| self.attached_definition(a) == Some(target))
    }

    /// Definition behind an attachment, looked up through the mesh instance
    /// when the graph has not been through [`wld_graph::attach_meshes`].
    fn attached_definition<'a>(&'a self, a: &'a Attachment) -> Option<&'a KindRef> {
        a.definition.as_ref().or_else(|| {
            self.graph
                .mesh_instances
                .get(&a.instance)
                .and_then(|m| m.definition.as_ref())
        })
    }

    /// Write an entry into `file` unless it has been written already,
    /// writing everything it references first.
    fn ensure(&mut self, kind: FragKind, tag: &str, file: &str) -> Result<(), ExportError> {
        if !self.state.claim(kind, tag)? {
            return Ok(());
        }
        let (deps, block) = self.render(kind, tag)?;
        for (dep_kind, dep_tag) in deps {
            self.ensure(dep_kind, dep_tag, file)?;
        }
        self.tree.file_mut(file).push_str(&block);
        trace!(kind = kind.name(), tag, file, "wrote entry");
        Ok(())
    }

    /// Text of one entry plus the entries it references.
    fn render(&self, kind: FragKind, tag: &str) -> Result<(Vec<Dep<'g>>, String), ExportError> {
        let g = self.graph;
        let mut out = String::new();
        let mut deps: Vec<Dep<'g>> = Vec::new();

        match kind {
            FragKind::BmInfo => text::bitmap(&mut out, tag, lookup(&g.bitmaps, kind, tag)?)?,
            FragKind::SimpleSpriteDef => {
                let e = lookup(&g.sprite_defs, kind, tag)?;
                e.frames.iter().for_each(|f| dep(&mut deps, FragKind::BmInfo, f));
                text::sprite_def(&mut out, tag, e)?;
            }
            FragKind::SimpleSprite => {
                let e = lookup(&g.sprites, kind, tag)?;
                dep(&mut deps, FragKind::SimpleSpriteDef, &e.definition);
                text::instance(&mut out, kind, tag, e)?;
            }
            FragKind::MaterialDef => {
                let e = lookup(&g.materials, kind, tag)?;
                dep(&mut deps, FragKind::SimpleSprite, &e.sprite);
                text::material(&mut out, tag, e)?;
            }
            FragKind::MaterialPalette => {
                let e = lookup(&g.palettes, kind, tag)?;
                e.materials.iter().for_each(|m| dep(&mut deps, FragKind::MaterialDef, m));
                text::palette(&mut out, tag, e)?;
            }
            FragKind::DmRgbTrackDef => {
                text::rgb_track_def(&mut out, tag, lookup(&g.rgb_track_defs, kind, tag)?)?
            }
            FragKind::DmRgbTrack => {
                let e = lookup(&g.rgb_tracks, kind, tag)?;
                dep(&mut deps, FragKind::DmRgbTrackDef, &e.definition);
                text::instance(&mut out, kind, tag, e)?;
            }
            FragKind::PolyhedronDef => {
                text::polyhedron_def(&mut out, tag, lookup(&g.polyhedron_defs, kind, tag)?)?
            }
            FragKind::Polyhedron => {
                let e = lookup(&g.polyhedra, kind, tag)?;
                dep(&mut deps, FragKind::PolyhedronDef, &e.definition);
                text::scaled(&mut out, kind, tag, e)?;
            }
            FragKind::TrackDef => {
                text::track_def(&mut out, tag, lookup(&g.track_defs, kind, tag)?)?
            }
            FragKind::Track => {
                let e = lookup(&g.tracks, kind, tag)?;
                dep(&mut deps, FragKind::TrackDef, &e.definition);
                text::track(&mut out, tag, e)?;
            }
            FragKind::DmSpriteDef => {
                let e = lookup(&g.meshes, kind, tag)?;
                dep(&mut deps, FragKind::MaterialPalette, &e.palette);
                text::mesh(&mut out, tag, e)?;
            }
            FragKind::DmSpriteDef2 => {
                let e = lookup(&g.extended_meshes, kind, tag)?;
                dep(&mut deps, FragKind::MaterialPalette, &e.palette);
                text::extended_mesh(&mut out, tag, e)?;
            }
            FragKind::DmSprite => {
                let e = lookup(&g.mesh_instances, kind, tag)?;
                if let Some(def) = &e.definition {
                    deps.push((def.kind, def.tag.as_str()));
                }
                text::mesh_instance(&mut out, tag, e)?;
            }
            FragKind::HierarchicalSpriteDef => {
                let e = lookup(&g.skeleton_defs, kind, tag)?;
                if let Collision::Polyhedron(p) = &e.collision {
                    deps.push((FragKind::Polyhedron, p.as_str()));
                }
                for dag in &e.dags {
                    dep(&mut deps, FragKind::Track, &dag.track);
                    if let Some(mesh) = &dag.mesh {
                        deps.push((FragKind::DmSprite, mesh.instance.as_str()));
                    }
                }
                for skin in e.skins.iter().flatten() {
                    if let Some(mesh) = &skin.mesh {
                        deps.push((FragKind::DmSprite, mesh.instance.as_str()));
                    }
                }
                text::skeleton_def(&mut out, tag, e)?;
            }
            FragKind::HierarchicalSprite => {
                let e = lookup(&g.skeletons, kind, tag)?;
                dep(&mut deps, FragKind::HierarchicalSpriteDef, &e.definition);
                text::instance(&mut out, kind, tag, e)?;
            }
            FragKind::SphereListDef => {
                text::sphere_list_def(&mut out, tag, lookup(&g.sphere_list_defs, kind, tag)?)?
            }
            FragKind::SphereList => {
                let e = lookup(&g.sphere_lists, kind, tag)?;
                dep(&mut deps, FragKind::SphereListDef, &e.definition);
                text::scaled(&mut out, kind, tag, e)?;
            }
            FragKind::Sphere => text::sphere(&mut out, tag, lookup(&g.spheres, kind, tag)?)?,
            FragKind::LightDef => {
                text::light_def(&mut out, tag, lookup(&g.light_defs, kind, tag)?)?
            }
            FragKind::Light => {
                let e = lookup(&g.lights, kind, tag)?;
                dep(&mut deps, FragKind::LightDef, &e.definition);
                text::instance(&mut out, kind, tag, e)?;
            }
            FragKind::PointLight => {
                let e = lookup(&g.point_lights, kind, tag)?;
                dep(&mut deps, FragKind::LightDef, &e.light);
                text::point_light(&mut out, tag, e)?;
            }
            FragKind::DirectionalLight => {
                let e = lookup(&g.directional_lights, kind, tag)?;
                dep(&mut deps, FragKind::Light, &e.light);
                text::directional_light(&mut out, tag, e)?;
            }
            FragKind::AmbientLight => {
                let e = lookup(&g.ambient_lights, kind, tag)?;
                dep(&mut deps, FragKind::Light, &e.light);
                text::ambient_light(&mut out, tag, e)?;
            }
            FragKind::GlobalAmbientLightDef => text::global_ambient_light(&mut out, tag)?,
            FragKind::Region => {
                let e = lookup(&g.regions, kind, tag)?;
                dep(&mut deps, FragKind::GlobalAmbientLightDef, &e.ambient_light);
                text::region(&mut out, tag, e)?;
            }
            FragKind::WorldTree => {
                let tree = g
                    .world_trees
                    .iter()
                    .find(|t| t.tag == tag)
                    .ok_or_else(|| unknown(kind, tag))?;
                text::world_tree(&mut out, tree)?;
            }
            FragKind::ActorDef => {
                let e = lookup(&g.actor_defs, kind, tag)?;
                deps.extend(
                    e.sprites
                        .iter()
                        .flatten()
                        .map(|s| (s.kind, s.tag.as_str())),
                );
                text::actor_def(&mut out, tag, e)?;
            }
            FragKind::Actor => {
                let e = lookup(&g.actors, kind, tag)?;
                dep(&mut deps, FragKind::ActorDef, &e.definition);
                dep(&mut deps, FragKind::Sphere, &e.sphere);
                dep(&mut deps, FragKind::DmRgbTrack, &e.rgb_track);
                text::actor(&mut out, tag, e)?;
            }
            FragKind::Zone => text::zone(&mut out, tag, lookup(&g.zones, kind, tag)?)?,
            _ => return Err(unknown(kind, tag)),
        }
        Ok((deps, out))
    }
}

fn dep<'g>(deps: &mut Vec<Dep<'g>>, kind: FragKind, tag: &'g Option<String>) {
    if let Some(tag) = tag {
        deps.push((kind, tag.as_str()));
    }
}

fn unknown(kind: FragKind, tag: &str) -> ExportError {
    ExportError::UnknownTag {
        kind,
        tag: tag.to_owned(),
    }
}

fn lookup<'m, T>(
    map: &'m IndexMap<String, T>,
    kind: FragKind,
    tag: &str,
) -> Result<&'m T, ExportError> {
    map.get(tag).ok_or_else(|| unknown(kind, tag))
}

/// Lowercased file stem for `tag`: the kind suffix dropped, and anything
/// that is not safe in a file name replaced by `_`.
fn file_base(tag: &str, suffix: &str) -> String {
    let stem = tag.strip_suffix(suffix).unwrap_or(tag);
    let stem = if stem.is_empty() { tag } else { stem };
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Zone geometry chunk stems look like `r12`.
fn is_region_chunk(base: &str) -> bool {
    base.strip_prefix('r')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_base_drops_suffix_and_lowercases() {
        assert_eq!(file_base("HUM_DMSPRITEDEF", "_DMSPRITEDEF"), "hum");
        assert_eq!(file_base("HUM_HS_DEF", "_HS_DEF"), "hum");
        assert_eq!(file_base("PROP", "_DMSPRITEDEF"), "prop");
        assert_eq!(file_base("_DMSPRITEDEF", "_DMSPRITEDEF"), "_dmspritedef");
        assert_eq!(file_base("A/B C", "_DMSPRITEDEF"), "a_b_c");
    }

    #[test]
    fn region_chunks() {
        assert!(is_region_chunk("r1"));
        assert!(is_region_chunk("r000123"));
        assert!(!is_region_chunk("r"));
        assert!(!is_region_chunk("rat"));
        assert!(!is_region_chunk("crate"));
    }
}
