//! Per-export bookkeeping.

use indexmap::IndexSet;
use wld_core::FragKind;
use wld_graph::SemanticGraph;

use crate::error::ExportError;

/// The set of entries already written by one export, keyed by kind and tag.
///
/// Kinds are part of the key because tags are only unique within a kind:
/// a mesh and its instance may legitimately share a name.
#[derive(Debug)]
pub struct ExportState<'g> {
    graph: &'g SemanticGraph,
    written: IndexSet<(FragKind, String)>,
}

impl<'g> ExportState<'g> {
    /// Empty state over `graph`.
    pub fn new(graph: &'g SemanticGraph) -> Self {
        Self {
            graph,
            written: IndexSet::new(),
        }
    }

    /// Fail with [`ExportError::UnknownTag`] unless `graph` defines `tag`
    /// among the entries of `kind`.
    pub fn require(&self, kind: FragKind, tag: &str) -> Result<(), ExportError> {
        if self.graph.contains(kind, tag) {
            Ok(())
        } else {
            Err(ExportError::UnknownTag {
                kind,
                tag: tag.to_owned(),
            })
        }
    }

    /// Mark an entry as written. Returns `false` if it already was, in which
    /// case the caller must not write it again.
    pub fn claim(&mut self, kind: FragKind, tag: &str) -> Result<bool, ExportError> {
        self.require(kind, tag)?;
        if self.is_written(kind, tag) {
            return Ok(false);
        }
        self.written.insert((kind, tag.to_owned()));
        Ok(true)
    }

    /// Whether the entry has been claimed.
    pub fn is_written(&self, kind: FragKind, tag: &str) -> bool {
        self.written.contains(&(kind, tag.to_owned()))
    }

    /// Claimed entries in claim order.
    pub fn written(&self) -> impl Iterator<Item = (FragKind, &str)> {
        self.written.iter().map(|(kind, tag)| (*kind, tag.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wld_graph::model::Sphere;
    use wld_raw::FormatVersion;

    fn graph() -> SemanticGraph {
        let mut g = SemanticGraph::new(FormatVersion::Plain);
        g.spheres.insert("BALL".into(), Sphere { radius: 1.0 });
        g
    }

    #[test]
    fn claim_succeeds_once() {
        let g = graph();
        let mut state = ExportState::new(&g);
        assert!(state.claim(FragKind::Sphere, "BALL").unwrap());
        assert!(!state.claim(FragKind::Sphere, "BALL").unwrap());
        assert_eq!(state.written().collect::<Vec<_>>(), [(FragKind::Sphere, "BALL")]);
    }

    #[test]
    fn undefined_tag_is_an_error() {
        let g = graph();
        let mut state = ExportState::new(&g);
        match state.claim(FragKind::Sphere, "GHOST") {
            Err(ExportError::UnknownTag { kind, tag }) => {
                assert_eq!(kind, FragKind::Sphere);
                assert_eq!(tag, "GHOST");
            }
            other => panic!("expected UnknownTag, got {other:?}"),
        }
        assert!(state.require(FragKind::SphereList, "BALL").is_err());
        assert!(!state.is_written(FragKind::Sphere, "GHOST"));
    }
}
