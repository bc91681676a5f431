//! Second build pass: mesh attachments.
//!
//! Bones and skins store only the mesh instance they attach. Once every
//! instance is in the graph, this pass fills in the definition behind each
//! one. It reads `mesh_instances` and writes only the attachment slots.

use wld_core::FragKind;

use crate::error::GraphError;
use crate::model::SemanticGraph;

/// Fill [`Attachment::definition`](crate::model::Attachment::definition)
/// for every bone and skin of every skeleton.
///
/// Run automatically by [`GraphBuilder::build`](crate::GraphBuilder::build);
/// call it again after editing attachments by hand.
pub fn attach_meshes(graph: &mut SemanticGraph) -> Result<(), GraphError> {
    let instances = &graph.mesh_instances;
    for def in graph.skeleton_defs.values_mut() {
        let dags = def.dags.iter_mut().filter_map(|dag| dag.mesh.as_mut());
        let skins = def
            .skins
            .iter_mut()
            .flatten()
            .filter_map(|skin| skin.mesh.as_mut());
        for attachment in dags.chain(skins) {
            let instance =
                instances
                    .get(&attachment.instance)
                    .ok_or_else(|| GraphError::UnknownTag {
                        kind: FragKind::DmSprite,
                        tag: attachment.instance.clone(),
                    })?;
            attachment.definition = instance.definition.clone();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attachment, Dag, KindRef, MeshInstance, SkeletonDef, Skin};
    use wld_raw::FormatVersion;

    fn graph() -> SemanticGraph {
        let mut g = SemanticGraph::new(FormatVersion::Plain);
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
                dags: vec![
                    Dag {
                        tag: "ROOT".into(),
                        ..Dag::default()
                    },
                    Dag {
                        tag: "HEAD".into(),
                        mesh: Some(Attachment::to_instance("HUM_DMSPRITE")),
                        ..Dag::default()
                    },
                ],
                skins: Some(vec![Skin {
                    mesh: Some(Attachment::to_instance("HUM_DMSPRITE")),
                    link_to_dag: 1,
                }]),
                ..SkeletonDef::default()
            },
        );
        g
    }

    #[test]
    fn fills_bone_and_skin_definitions() {
        let mut g = graph();
        attach_meshes(&mut g).unwrap();
        let def = &g.skeleton_defs["HUM_HS_DEF"];
        let expected = Some(KindRef::new(FragKind::DmSpriteDef2, "HUM_DMSPRITEDEF"));
        assert_eq!(def.dags[0].mesh, None);
        assert_eq!(def.dags[1].mesh.as_ref().unwrap().definition, expected);
        let skins = def.skins.as_ref().unwrap();
        assert_eq!(skins[0].mesh.as_ref().unwrap().definition, expected);
        assert_eq!(skins[0].link_to_dag, 1);
    }

    #[test]
    fn missing_instance_is_unknown_tag() {
        let mut g = graph();
        g.mesh_instances.clear();
        match attach_meshes(&mut g).unwrap_err() {
            GraphError::UnknownTag { kind, tag } => {
                assert_eq!(kind, FragKind::DmSprite);
                assert_eq!(tag, "HUM_DMSPRITE");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
