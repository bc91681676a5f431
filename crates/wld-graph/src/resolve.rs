//! Index-to-tag resolution over one decoded file.
//!
//! The resolver computes every record's tag up front, so references are
//! resolved the same way whether they point backwards or forwards.

use std::collections::HashSet;

use tracing::warn;
use wld_core::{FragKind, NameRef, RecordIndex, RecordRef};
use wld_raw::RawWld;

use crate::error::GraphError;
use crate::model::KindRef;

/// Name reference that tags a global ambient light with its fixed name.
pub const GLOBAL_AMBIENT_NAME: NameRef = NameRef(0x00FF_0000);

/// Resolves record references in one [`RawWld`] to the tags of their
/// targets, checking bounds and kinds.
pub struct RecordResolver<'a> {
    raw: &'a RawWld,
    tags: Vec<String>,
}

impl<'a> RecordResolver<'a> {
    /// Compute the tag of every record.
    ///
    /// A record whose name is empty gets the placeholder
    /// `"{index}_{suffix}"`, for example `7_MPL` for an unnamed palette. If
    /// a named record of the same kind already uses that tag, `_2`, `_3`
    /// and so on are appended until it is free. A global ambient light
    /// whose name is [`GLOBAL_AMBIENT_NAME`] is tagged
    /// `GLOBALAMBIENT_LIGHTDEF`.
    pub fn new(raw: &'a RawWld) -> Result<Self, GraphError> {
        let mut names = Vec::with_capacity(raw.len());
        let mut taken = HashSet::new();
        for (index, frag) in raw.iter() {
            let kind = frag.kind();
            let name = match frag.name_ref() {
                Some(GLOBAL_AMBIENT_NAME) if kind == FragKind::GlobalAmbientLightDef => {
                    Some(kind.placeholder_suffix().to_owned())
                }
                Some(name) => Some(raw.pool.name(name).map_err(|source| GraphError::Name {
                    index,
                    kind,
                    source,
                })?),
                None => None,
            };
            if let Some(name) = name.as_ref().filter(|n| !n.is_empty()) {
                taken.insert((kind, name.clone()));
            }
            names.push(name);
        }

        let mut tags = Vec::with_capacity(raw.len());
        for ((index, frag), name) in raw.iter().zip(names) {
            let tag = match name {
                Some(name) if name.is_empty() => {
                    let kind = frag.kind();
                    let base = format!("{index}_{}", kind.placeholder_suffix());
                    let mut placeholder = base.clone();
                    let mut n = 2;
                    while taken.contains(&(kind, placeholder.clone())) {
                        placeholder = format!("{base}_{n}");
                        n += 1;
                    }
                    warn!(%index, kind = kind.name(), tag = %placeholder, "unnamed record");
                    taken.insert((kind, placeholder.clone()));
                    placeholder
                }
                Some(name) => name,
                None => String::new(),
            };
            tags.push(tag);
        }
        Ok(Self { raw, tags })
    }

    /// The file being resolved.
    pub fn raw(&self) -> &'a RawWld {
        self.raw
    }

    /// Tag of the record at `index`.
    pub fn tag(&self, index: RecordIndex) -> &str {
        self.tags
            .get(index.position())
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Resolve a reference held by record `from` in `field`.
    ///
    /// Index 0 yields `Ok(None)`. An index past the last record yields
    /// [`GraphError::ReferenceOutOfBounds`]; a target whose kind is not in
    /// `expected` yields [`GraphError::TypeMismatch`].
    pub fn resolve(
        &self,
        from: RecordIndex,
        field: &'static str,
        target: RecordRef,
        expected: &'static [FragKind],
    ) -> Result<Option<KindRef>, GraphError> {
        let Some(target_index) = target.index() else {
            return Ok(None);
        };
        let kind = self.kind_at(from);
        let Some(frag) = self.raw.get(target_index) else {
            return Err(GraphError::ReferenceOutOfBounds {
                index: from,
                kind,
                field,
                target: target.raw(),
                record_count: self.raw.len(),
            });
        };
        let found = frag.kind();
        if !expected.contains(&found) {
            return Err(GraphError::TypeMismatch {
                index: from,
                kind,
                field,
                target: target_index,
                expected,
                found,
            });
        }
        Ok(Some(KindRef::new(found, self.tag(target_index))))
    }

    /// Resolve a reference that has exactly one possible target kind.
    pub fn tag_of(
        &self,
        from: RecordIndex,
        field: &'static str,
        target: RecordRef,
        expected: &'static [FragKind],
    ) -> Result<Option<String>, GraphError> {
        Ok(self.resolve(from, field, target, expected)?.map(|r| r.tag))
    }

    /// Look up an optional name held by record `from`; an empty name is
    /// `None`.
    pub fn optional_name(
        &self,
        from: RecordIndex,
        name: NameRef,
    ) -> Result<Option<String>, GraphError> {
        let s = self.raw.pool.name(name).map_err(|source| GraphError::Name {
            index: from,
            kind: self.kind_at(from),
            source,
        })?;
        Ok((!s.is_empty()).then_some(s))
    }

    /// Look up a name that may be empty, such as a bone name.
    pub fn name(&self, from: RecordIndex, name: NameRef) -> Result<String, GraphError> {
        Ok(self.optional_name(from, name)?.unwrap_or_default())
    }

    fn kind_at(&self, index: RecordIndex) -> FragKind {
        self.raw
            .get(index)
            .map(|f| f.kind())
            .unwrap_or(FragKind::Unknown(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wld_core::NameTable;
    use wld_raw::frag::{Fragment, MaterialDef, Reference, Sphere};
    use wld_raw::FormatVersion;

    fn file() -> RawWld {
        let mut names = NameTable::new();
        let steel = names.intern("Steel").unwrap();
        let ball = names.intern("BALL").unwrap();
        let frags = vec![
            Fragment::MaterialDef(MaterialDef {
                name: steel,
                ..MaterialDef::default()
            }),
            Fragment::Sphere(Sphere {
                name: ball,
                radius: 1.0,
            }),
            Fragment::SimpleSprite(Reference::default()),
        ];
        RawWld::new(FormatVersion::Plain, names.into_pool(), frags)
    }

    const MATERIAL: &[FragKind] = &[FragKind::MaterialDef];

    #[test]
    fn zero_is_absent() {
        let raw = file();
        let r = RecordResolver::new(&raw).unwrap();
        let got = r
            .resolve(RecordIndex::FIRST, "sprite", RecordRef::NONE, MATERIAL)
            .unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn resolves_to_target_tag() {
        let raw = file();
        let r = RecordResolver::new(&raw).unwrap();
        let got = r
            .tag_of(RecordIndex::FIRST, "materials", RecordRef::from_raw(1), MATERIAL)
            .unwrap();
        assert_eq!(got.as_deref(), Some("Steel"));
    }

    #[test]
    fn unnamed_record_gets_placeholder() {
        let raw = file();
        let r = RecordResolver::new(&raw).unwrap();
        let third = RecordIndex::new(3).unwrap();
        assert_eq!(r.tag(third), "3_SPRITEINST");
    }

    #[test]
    fn wrong_kind_names_both_kinds() {
        let raw = file();
        let r = RecordResolver::new(&raw).unwrap();
        let err = r
            .resolve(RecordIndex::FIRST, "materials", RecordRef::from_raw(2), MATERIAL)
            .unwrap_err();
        match err {
            GraphError::TypeMismatch {
                expected, found, ..
            } => {
                assert_eq!(expected, MATERIAL);
                assert_eq!(found, FragKind::Sphere);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_index_is_out_of_bounds() {
        let raw = file();
        let r = RecordResolver::new(&raw).unwrap();
        let err = r
            .resolve(RecordIndex::FIRST, "def", RecordRef::from_raw_i32(-1), MATERIAL)
            .unwrap_err();
        assert!(matches!(err, GraphError::ReferenceOutOfBounds { .. }));
    }

    proptest! {
        #[test]
        fn past_the_end_is_out_of_bounds(extra in 1u32..1000) {
            let raw = file();
            let r = RecordResolver::new(&raw).unwrap();
            let target = raw.len() as u32 + extra;
            let err = r
                .resolve(RecordIndex::FIRST, "def", RecordRef::from_raw(target), MATERIAL)
                .unwrap_err();
            match err {
                GraphError::ReferenceOutOfBounds { target: t, record_count, .. } => {
                    prop_assert_eq!(t, target);
                    prop_assert_eq!(record_count, 3);
                }
                other => prop_assert!(false, "unexpected error: {}", other),
            }
        }
    }
}
