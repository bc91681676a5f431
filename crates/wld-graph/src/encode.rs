//! Graph to records.
//!
//! Records are emitted kind by kind in [`EMIT_ORDER`], each kind's entries
//! in map order. Because of that, the record index of any entry is known
//! before anything is encoded: the number of records of earlier kinds plus
//! the entry's position in its map. Forward references need no fixups.

use indexmap::IndexMap;
use tracing::debug;
use wld_core::{FragKind, NameRef, NameTable, RecordRef};
use wld_raw::frag::{self, Fragment, MeshUvs, Reference};
use wld_raw::{RawWld, WldError};

use crate::error::GraphError;
use crate::model::{
    ActorDef, Collision, Instance, KindRef, MeshInstance, ScaledInstance, SemanticGraph, SkeletonDef,
};

/// Kinds in the order their records are written.
pub const EMIT_ORDER: &[FragKind] = &[
    FragKind::DefaultPaletteFile,
    FragKind::UserData,
    FragKind::GlobalAmbientLightDef,
    FragKind::BmInfo,
    FragKind::SimpleSpriteDef,
    FragKind::SimpleSprite,
    FragKind::MaterialDef,
    FragKind::MaterialPalette,
    FragKind::DmRgbTrackDef,
    FragKind::DmRgbTrack,
    FragKind::PolyhedronDef,
    FragKind::Polyhedron,
    FragKind::TrackDef,
    FragKind::Track,
    FragKind::DmSpriteDef,
    FragKind::DmSpriteDef2,
    FragKind::DmSprite,
    FragKind::HierarchicalSpriteDef,
    FragKind::HierarchicalSprite,
    FragKind::SphereListDef,
    FragKind::SphereList,
    FragKind::Sphere,
    FragKind::LightDef,
    FragKind::Light,
    FragKind::PointLight,
    FragKind::DirectionalLight,
    FragKind::AmbientLight,
    FragKind::Region,
    FragKind::WorldTree,
    FragKind::ActorDef,
    FragKind::Actor,
    FragKind::Zone,
];

/// Encodes a [`SemanticGraph`] to records and a fresh string pool.
pub struct GraphEncoder<'g> {
    graph: &'g SemanticGraph,
    names: NameTable,
    first_index: IndexMap<FragKind, usize>,
    fragments: Vec<Fragment>,
}

impl<'g> GraphEncoder<'g> {
    /// Encode `graph`.
    ///
    /// Fails with [`GraphError::UnknownTag`] if a reference names no entry
    /// of its kind, with [`GraphError::DuplicateTag`] if two world trees
    /// share a tag, and with [`GraphError::InvalidGraph`] for entries the
    /// binary format cannot hold, such as an empty tag.
    pub fn encode(graph: &'g SemanticGraph) -> Result<RawWld, GraphError> {
        let mut first_index = IndexMap::new();
        let mut next = 1;
        for &kind in EMIT_ORDER {
            first_index.insert(kind, next);
            next += graph.count(kind);
        }
        if next - 1 > u32::MAX as usize {
            return Err(GraphError::invalid(format!("{} records", next - 1)));
        }

        let mut enc = Self {
            graph,
            names: NameTable::new(),
            first_index,
            fragments: Vec::with_capacity(next - 1),
        };
        for &kind in EMIT_ORDER {
            enc.emit(kind)?;
        }

        let pool = enc.names.into_pool();
        debug!(
            version = %graph.version,
            records = enc.fragments.len(),
            pool_len = pool.len(),
            "encoded semantic graph"
        );
        Ok(RawWld::new(graph.version, pool, enc.fragments))
    }

    // ── Lookups ────────────────────────────────────────────────

    fn index_of(&self, kind: FragKind, tag: &str) -> Result<RecordRef, GraphError> {
        let unknown = || GraphError::UnknownTag {
            kind,
            tag: tag.to_owned(),
        };
        let position = self.graph.position_of(kind, tag).ok_or_else(unknown)?;
        let first = self.first_index.get(&kind).copied().ok_or_else(unknown)?;
        // Bounded by the record count checked in `encode`.
        Ok(RecordRef::from_raw((first + position) as u32))
    }

    fn reference(&self, kind: FragKind, tag: Option<&String>) -> Result<RecordRef, GraphError> {
        match tag {
            Some(tag) => self.index_of(kind, tag),
            None => Ok(RecordRef::NONE),
        }
    }

    fn kind_ref(
        &self,
        target: Option<&KindRef>,
        allowed: &[FragKind],
    ) -> Result<RecordRef, GraphError> {
        match target {
            Some(target) if !allowed.contains(&target.kind) => Err(GraphError::invalid(format!(
                "reference to {target} where a {} is not allowed",
                target.kind.name()
            ))),
            Some(target) => self.index_of(target.kind, &target.tag),
            None => Ok(RecordRef::NONE),
        }
    }

    fn name(&mut self, name: &str) -> Result<NameRef, GraphError> {
        self.names
            .intern(name)
            .map_err(|e| GraphError::Codec(WldError::from(e)))
    }

    fn tag(&mut self, kind: FragKind, tag: &str) -> Result<NameRef, GraphError> {
        if tag.is_empty() {
            return Err(GraphError::invalid(format!(
                "{} with an empty tag",
                kind.name()
            )));
        }
        self.name(tag)
    }

    fn optional_name(&mut self, name: Option<&String>) -> Result<NameRef, GraphError> {
        self.name(name.map_or("", String::as_str))
    }

    fn instance(
        &mut self,
        kind: FragKind,
        tag: &str,
        inst: &Instance,
        def_kind: FragKind,
    ) -> Result<Reference, GraphError> {
        Ok(Reference {
            name: self.tag(kind, tag)?,
            target: self.reference(def_kind, inst.definition.as_ref())?,
            flags: inst.flags,
        })
    }

    fn scaled(
        &mut self,
        kind: FragKind,
        tag: &str,
        inst: &ScaledInstance,
        def_kind: FragKind,
    ) -> Result<(NameRef, RecordRef), GraphError> {
        Ok((
            self.tag(kind, tag)?,
            self.reference(def_kind, inst.definition.as_ref())?,
        ))
    }

    // ── Emission ───────────────────────────────────────────────

    fn emit(&mut self, kind: FragKind) -> Result<(), GraphError> {
        let g = self.graph;
        match kind {
            FragKind::DefaultPaletteFile => {
                if let Some(path) = &g.default_palette_file {
                    self.push(Fragment::DefaultPaletteFile(frag::DefaultPaletteFile {
                        path: path.clone(),
                    }));
                }
            }
            FragKind::UserData => {
                for data in &g.user_data {
                    self.push(Fragment::UserData(frag::UserData { data: data.clone() }));
                }
            }
            FragKind::GlobalAmbientLightDef => {
                if let Some(tag) = &g.global_ambient_light {
                    let name = self.tag(kind, tag)?;
                    self.push(Fragment::GlobalAmbientLightDef(frag::GlobalAmbientLightDef {
                        name,
                    }));
                }
            }
            FragKind::BmInfo => {
                for (tag, bitmap) in &g.bitmaps {
                    let name = self.tag(kind, tag)?;
                    self.push(Fragment::BmInfo(frag::BmInfo {
                        name,
                        textures: bitmap.textures.clone(),
                    }));
                }
            }
            FragKind::SimpleSpriteDef => {
                for (tag, def) in &g.sprite_defs {
                    let frames = def
                        .frames
                        .iter()
                        .map(|f| self.reference(FragKind::BmInfo, f.as_ref()))
                        .collect::<Result<_, _>>()?;
                    let name = self.tag(kind, tag)?;
                    self.push(Fragment::SimpleSpriteDef(frag::SimpleSpriteDef {
                        name,
                        flags: def.flags,
                        current_frame: def.current_frame,
                        sleep: def.sleep,
                        frames,
                    }));
                }
            }
            FragKind::SimpleSprite => {
                for (tag, inst) in &g.sprites {
                    let r = self.instance(kind, tag, inst, FragKind::SimpleSpriteDef)?;
                    self.push(Fragment::SimpleSprite(r));
                }
            }
            FragKind::MaterialDef => {
                for (tag, m) in &g.materials {
                    let name = self.tag(kind, tag)?;
                    let sprite = self.reference(FragKind::SimpleSprite, m.sprite.as_ref())?;
                    self.push(Fragment::MaterialDef(frag::MaterialDef {
                        name,
                        flags: m.flags,
                        render_method: m.render_method,
                        rgb_pen: m.rgb_pen,
                        brightness: m.brightness,
                        scaled_ambient: m.scaled_ambient,
                        sprite,
                        pair: m.pair,
                    }));
                }
            }
            FragKind::MaterialPalette => {
                for (tag, p) in &g.palettes {
                    let materials = p
                        .materials
                        .iter()
                        .map(|m| self.reference(FragKind::MaterialDef, m.as_ref()))
                        .collect::<Result<_, _>>()?;
                    let name = self.tag(kind, tag)?;
                    self.push(Fragment::MaterialPalette(frag::MaterialPalette {
                        name,
                        flags: p.flags,
                        materials,
                    }));
                }
            }
            FragKind::DmRgbTrackDef => {
                for (tag, def) in &g.rgb_track_defs {
                    let name = self.tag(kind, tag)?;
                    self.push(Fragment::DmRgbTrackDef(frag::DmRgbTrackDef {
                        name,
                        flags: def.flags,
                        colors_per_frame: def.colors_per_frame,
                        sleep: def.sleep,
                        data4: def.data4,
                        frames: def.frames.clone(),
                    }));
                }
            }
            FragKind::DmRgbTrack => {
                for (tag, inst) in &g.rgb_tracks {
                    let r = self.instance(kind, tag, inst, FragKind::DmRgbTrackDef)?;
                    self.push(Fragment::DmRgbTrack(r));
                }
            }
            FragKind::PolyhedronDef => {
                for (tag, def) in &g.polyhedron_defs {
                    let name = self.tag(kind, tag)?;
                    self.push(Fragment::PolyhedronDef(frag::PolyhedronDef {
                        name,
                        flags: def.flags,
                        bounding_radius: def.bounding_radius,
                        scale: def.scale,
                        vertices: def.vertices.clone(),
                        faces: def.faces.clone(),
                    }));
                }
            }
            FragKind::Polyhedron => {
                for (tag, inst) in &g.polyhedra {
                    let (name, def) = self.scaled(kind, tag, inst, FragKind::PolyhedronDef)?;
                    self.push(Fragment::Polyhedron(frag::Polyhedron {
                        name,
                        def,
                        flags: inst.flags,
                        scale: inst.scale,
                    }));
                }
            }
            FragKind::TrackDef => {
                for (tag, def) in &g.track_defs {
                    let name = self.tag(kind, tag)?;
                    self.push(Fragment::TrackDef(frag::TrackDef {
                        name,
                        flags: def.flags,
                        frames: def.frames.clone(),
                    }));
                }
            }
            FragKind::Track => {
                for (tag, track) in &g.tracks {
                    let name = self.tag(kind, tag)?;
                    let def = self.reference(FragKind::TrackDef, track.definition.as_ref())?;
                    self.push(Fragment::Track(frag::Track {
                        name,
                        def,
                        flags: track.flags,
                        sleep: track.sleep,
                    }));
                }
            }
            FragKind::DmSpriteDef => {
                for (tag, m) in &g.meshes {
                    let name = self.tag(kind, tag)?;
                    let palette = self.reference(FragKind::MaterialPalette, m.palette.as_ref())?;
                    self.push(Fragment::DmSpriteDef(frag::DmSpriteDef {
                        name,
                        flags: m.flags,
                        fragment1: m.fragment1,
                        palette,
                        fragment3: m.fragment3,
                        center: m.center,
                        params: m.params,
                        vertices: m.vertices.clone(),
                        uvs: m.uvs.clone(),
                        normals: m.normals.clone(),
                        colors: m.colors.clone(),
                        polygons: m.polygons.clone(),
                        size6: m.size6.clone(),
                        vertex_pieces: m.vertex_pieces.clone(),
                        render_groups: m.render_groups.clone(),
                        vertex_tex: m.vertex_tex.clone(),
                    }));
                }
            }
            FragKind::DmSpriteDef2 => {
                for (tag, m) in &g.extended_meshes {
                    if matches!(m.uvs, MeshUvs::Float(_)) != g.version.is_new_world() {
                        return Err(GraphError::invalid(format!(
                            "mesh {tag:?} has texture coordinates of the wrong width \
                             for version {}",
                            g.version
                        )));
                    }
                    let name = self.tag(kind, tag)?;
                    let palette = self.reference(FragKind::MaterialPalette, m.palette.as_ref())?;
                    self.push(Fragment::DmSpriteDef2(frag::DmSpriteDef2 {
                        name,
                        flags: m.flags,
                        palette,
                        dm_track_ref: m.dm_track_ref,
                        fragment3: m.fragment3,
                        fragment4: m.fragment4,
                        center: m.center,
                        params2: m.params2,
                        max_distance: m.max_distance,
                        min: m.min,
                        max: m.max,
                        scale: m.scale,
                        vertices: m.vertices.clone(),
                        uvs: m.uvs.clone(),
                        normals: m.normals.clone(),
                        colors: m.colors.clone(),
                        faces: m.faces.clone(),
                        skin_groups: m.skin_groups.clone(),
                        face_material_groups: m.face_material_groups.clone(),
                        vertex_material_groups: m.vertex_material_groups.clone(),
                        mesh_ops: m.mesh_ops.clone(),
                    }));
                }
            }
            FragKind::DmSprite => {
                for (tag, inst) in &g.mesh_instances {
                    let name = self.tag(kind, tag)?;
                    let target = self.kind_ref(
                        inst.definition.as_ref(),
                        MeshInstance::TARGETS,
                    )?;
                    self.push(Fragment::DmSprite(Reference {
                        name,
                        target,
                        flags: inst.flags,
                    }));
                }
            }
            FragKind::HierarchicalSpriteDef => {
                for (tag, def) in &g.skeleton_defs {
                    let f = self.skeleton_def(tag, def)?;
                    self.push(Fragment::HierarchicalSpriteDef(f));
                }
            }
            FragKind::HierarchicalSprite => {
                for (tag, inst) in &g.skeletons {
                    let r = self.instance(kind, tag, inst, FragKind::HierarchicalSpriteDef)?;
                    self.push(Fragment::HierarchicalSprite(r));
                }
            }
            FragKind::SphereListDef => {
                for (tag, def) in &g.sphere_list_defs {
                    let name = self.tag(kind, tag)?;
                    self.push(Fragment::SphereListDef(frag::SphereListDef {
                        name,
                        flags: def.flags,
                        radius: def.radius,
                        scale: def.scale,
                        spheres: def.spheres.clone(),
                    }));
                }
            }
            FragKind::SphereList => {
                for (tag, inst) in &g.sphere_lists {
                    let (name, def) = self.scaled(kind, tag, inst, FragKind::SphereListDef)?;
                    self.push(Fragment::SphereList(frag::SphereList {
                        name,
                        def,
                        flags: inst.flags,
                        scale: inst.scale,
                    }));
                }
            }
            FragKind::Sphere => {
                for (tag, sphere) in &g.spheres {
                    let name = self.tag(kind, tag)?;
                    self.push(Fragment::Sphere(frag::Sphere {
                        name,
                        radius: sphere.radius,
                    }));
                }
            }
            FragKind::LightDef => {
                for (tag, def) in &g.light_defs {
                    let name = self.tag(kind, tag)?;
                    self.push(Fragment::LightDef(frag::LightDef {
                        name,
                        flags: def.flags,
                        frame_count: def.frame_count,
                        current_frame: def.current_frame,
                        sleep: def.sleep,
                        levels: def.levels.clone(),
                        colors: def.colors.clone(),
                    }));
                }
            }
            FragKind::Light => {
                for (tag, inst) in &g.lights {
                    let r = self.instance(kind, tag, inst, FragKind::LightDef)?;
                    self.push(Fragment::Light(r));
                }
            }
            FragKind::PointLight => {
                for (tag, l) in &g.point_lights {
                    let name = self.tag(kind, tag)?;
                    let light = self.reference(FragKind::LightDef, l.light.as_ref())?;
                    self.push(Fragment::PointLight(frag::PointLight {
                        name,
                        light,
                        flags: l.flags,
                        location: l.location,
                        radius: l.radius,
                    }));
                }
            }
            FragKind::DirectionalLight => {
                for (tag, l) in &g.directional_lights {
                    let name = self.tag(kind, tag)?;
                    let light = self.reference(FragKind::Light, l.light.as_ref())?;
                    self.push(Fragment::DirectionalLight(frag::DirectionalLight {
                        name,
                        light,
                        flags: l.flags,
                        normal: l.normal,
                        regions: l.regions.clone(),
                    }));
                }
            }
            FragKind::AmbientLight => {
                for (tag, l) in &g.ambient_lights {
                    let name = self.tag(kind, tag)?;
                    let light = self.reference(FragKind::Light, l.light.as_ref())?;
                    self.push(Fragment::AmbientLight(frag::AmbientLight {
                        name,
                        light,
                        flags: l.flags,
                        regions: l.regions.clone(),
                    }));
                }
            }
            FragKind::Region => {
                for (tag, region) in &g.regions {
                    let name = self.tag(kind, tag)?;
                    let ambient_light = self.reference(
                        FragKind::GlobalAmbientLightDef,
                        region.ambient_light.as_ref(),
                    )?;
                    self.push(Fragment::Region(frag::Region {
                        name,
                        flags: region.flags,
                        ambient_light,
                        counts: region.counts,
                        vertices: region.vertices.clone(),
                        tail: region.tail.clone(),
                    }));
                }
            }
            FragKind::WorldTree => {
                for (i, tree) in g.world_trees.iter().enumerate() {
                    if g.world_trees[..i].iter().any(|t| t.tag == tree.tag) {
                        return Err(GraphError::DuplicateTag {
                            kind,
                            tag: tree.tag.clone(),
                        });
                    }
                    let name = self.tag(kind, &tree.tag)?;
                    self.push(Fragment::WorldTree(frag::WorldTree {
                        name,
                        nodes: tree.nodes.clone(),
                    }));
                }
            }
            FragKind::ActorDef => {
                for (tag, def) in &g.actor_defs {
                    let f = self.actor_def(tag, def)?;
                    self.push(Fragment::ActorDef(f));
                }
            }
            FragKind::Actor => {
                for (tag, a) in &g.actors {
                    let name = self.tag(kind, tag)?;
                    let def = self.reference(FragKind::ActorDef, a.definition.as_ref())?;
                    let sphere = self.reference(FragKind::Sphere, a.sphere.as_ref())?;
                    let sound = match &a.sound {
                        Some(sound) => Some(self.name(sound)?),
                        None => None,
                    };
                    let rgb_track = match &a.rgb_track {
                        Some(track) => Some(self.index_of(FragKind::DmRgbTrack, track)?),
                        None => None,
                    };
                    self.push(Fragment::Actor(frag::Actor {
                        name,
                        def,
                        flags: a.flags,
                        sphere,
                        current_action: a.current_action,
                        location: a.location,
                        bounding_radius: a.bounding_radius,
                        scale: a.scale,
                        sound,
                        rgb_track,
                        user_data: a.user_data.clone(),
                    }));
                }
            }
            FragKind::Zone => {
                for (tag, zone) in &g.zones {
                    let name = self.tag(kind, tag)?;
                    self.push(Fragment::Zone(frag::Zone {
                        name,
                        flags: zone.flags,
                        regions: zone.regions.clone(),
                        user_data: zone.user_data.clone(),
                    }));
                }
            }
            other => {
                return Err(GraphError::invalid(format!(
                    "{} is not emitted from a graph",
                    other.name()
                )))
            }
        }
        Ok(())
    }

    fn skeleton_def(
        &mut self,
        tag: &str,
        def: &SkeletonDef,
    ) -> Result<frag::HierarchicalSpriteDef, GraphError> {
        let name = self.tag(FragKind::HierarchicalSpriteDef, tag)?;
        let collision_ref = match &def.collision {
            Collision::Absent => 0,
            Collision::Unset => frag::HierarchicalSpriteDef::COLLISION_UNSET,
            Collision::Polyhedron(poly) => self.index_of(FragKind::Polyhedron, poly)?.raw(),
        };
        let mut dags = Vec::with_capacity(def.dags.len());
        for dag in &def.dags {
            let mesh = dag.mesh.as_ref().map(|a| &a.instance);
            dags.push(frag::Dag {
                name: self.name(&dag.tag)?,
                flags: dag.flags,
                track: self.reference(FragKind::Track, dag.track.as_ref())?,
                mesh: self.reference(FragKind::DmSprite, mesh)?,
                sub_dags: dag.sub_dags.clone(),
            });
        }
        let skins = match &def.skins {
            Some(skins) => Some(
                skins
                    .iter()
                    .map(|skin| -> Result<frag::AttachedSkin, GraphError> {
                        let mesh = skin.mesh.as_ref().map(|a| &a.instance);
                        Ok(frag::AttachedSkin {
                            mesh: self.reference(FragKind::DmSprite, mesh)?,
                            link_to_dag: skin.link_to_dag,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };
        Ok(frag::HierarchicalSpriteDef {
            name,
            flags: def.flags,
            collision_ref,
            center_offset: def.center_offset,
            bounding_radius: def.bounding_radius,
            dags,
            skins,
        })
    }

    fn actor_def(
        &mut self,
        tag: &str,
        def: &ActorDef,
    ) -> Result<frag::ActorDef, GraphError> {
        let lods: usize = def.actions.iter().map(|a| a.lods.len()).sum();
        if lods != def.sprites.len() {
            return Err(GraphError::invalid(format!(
                "actor definition {tag:?} has {lods} LODs but {} sprites",
                def.sprites.len()
            )));
        }
        let name = self.tag(FragKind::ActorDef, tag)?;
        let callback = self.optional_name(def.callback.as_ref())?;
        let sprites = def
            .sprites
            .iter()
            .map(|s| self.kind_ref(s.as_ref(), ActorDef::SPRITE_KINDS))
            .collect::<Result<_, _>>()?;
        Ok(frag::ActorDef {
            name,
            flags: def.flags,
            callback,
            bounds_ref: def.bounds_ref,
            current_action: def.current_action,
            location: def.location,
            actions: def.actions.clone(),
            sprites,
            unk: def.unk,
        })
    }

    fn push(&mut self, frag: Fragment) {
        self.fragments.push(frag);
    }
}
