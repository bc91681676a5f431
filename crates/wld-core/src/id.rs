//! Strongly-typed record positions and name references.

use std::fmt;
use std::num::NonZeroU32;

/// A 1-based position in the record array.
///
/// Index 0 is reserved by the format to mean "absent", so it is not a
/// valid `RecordIndex`; see [`RecordRef`] for the optional form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordIndex(NonZeroU32);

impl RecordIndex {
    /// The first record in a file.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Wrap a raw 1-based index. Returns `None` for 0.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Build the index for the record at 0-based slice position `pos`.
    ///
    /// Returns `None` if `pos + 1` does not fit in a `u32`.
    pub fn from_position(pos: usize) -> Option<Self> {
        u32::try_from(pos)
            .ok()
            .and_then(|p| p.checked_add(1))
            .and_then(Self::new)
    }

    /// The raw 1-based value.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// The 0-based slice position of this record.
    pub fn position(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Display for RecordIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An optional reference to another record, as stored in a payload.
///
/// The raw field value 0 decodes to [`RecordRef::NONE`]. Any other value is
/// kept as-is, including values that turn out to be out of range for the
/// file they came from: range checks belong to the resolver, which knows the
/// record count. Signed fields are stored through their `u32` bit pattern, so
/// a negative value resolves as out of range rather than being lost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RecordRef(Option<RecordIndex>);

impl RecordRef {
    /// The absent reference.
    pub const NONE: Self = Self(None);

    /// Decode an unsigned reference field.
    pub fn from_raw(raw: u32) -> Self {
        Self(RecordIndex::new(raw))
    }

    /// Decode a signed reference field.
    pub fn from_raw_i32(raw: i32) -> Self {
        Self::from_raw(raw as u32)
    }

    /// A reference to `index`.
    pub fn to(index: RecordIndex) -> Self {
        Self(Some(index))
    }

    /// The referenced index, if any.
    pub fn index(self) -> Option<RecordIndex> {
        self.0
    }

    /// Whether this reference is absent.
    pub fn is_none(self) -> bool {
        self.0.is_none()
    }

    /// The raw field value (0 when absent).
    pub fn raw(self) -> u32 {
        self.0.map_or(0, RecordIndex::get)
    }

    /// The raw field value for signed reference fields.
    pub fn raw_i32(self) -> i32 {
        self.raw() as i32
    }
}

impl From<RecordIndex> for RecordRef {
    fn from(index: RecordIndex) -> Self {
        Self::to(index)
    }
}

impl From<Option<RecordIndex>> for RecordRef {
    fn from(index: Option<RecordIndex>) -> Self {
        Self(index)
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(index) => write!(f, "#{index}"),
            None => write!(f, "none"),
        }
    }
}

/// A self-name reference into the string pool.
///
/// Values `<= 0` address the pool at byte offset `-value`. Positive values
/// carry no name and resolve to the empty string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NameRef(pub i32);

impl NameRef {
    /// The pool byte offset this reference addresses, if it addresses one.
    pub fn offset(self) -> Option<usize> {
        if self.0 <= 0 {
            Some(self.0.unsigned_abs() as usize)
        } else {
            None
        }
    }

    /// The reference for pool byte offset `offset`.
    ///
    /// Returns `None` if the offset cannot be negated into an `i32`.
    pub fn from_offset(offset: usize) -> Option<Self> {
        i32::try_from(offset).ok().map(|o| Self(-o))
    }
}

impl fmt::Display for NameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for NameRef {
    fn from(v: i32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_reference_is_absent() {
        assert!(RecordRef::from_raw(0).is_none());
        assert_eq!(RecordRef::from_raw(0), RecordRef::NONE);
        assert_eq!(RecordRef::NONE.raw(), 0);
    }

    #[test]
    fn negative_signed_reference_keeps_its_bits() {
        let r = RecordRef::from_raw_i32(-3);
        assert_eq!(r.raw(), 0xFFFF_FFFD);
        assert_eq!(r.raw_i32(), -3);
    }

    #[test]
    fn index_position_is_zero_based() {
        assert_eq!(RecordIndex::FIRST.position(), 0);
        assert_eq!(RecordIndex::from_position(4).map(RecordIndex::get), Some(5));
        assert!(RecordIndex::new(0).is_none());
    }

    #[test]
    fn name_ref_offsets() {
        assert_eq!(NameRef(0).offset(), Some(0));
        assert_eq!(NameRef(-11).offset(), Some(11));
        assert_eq!(NameRef(4).offset(), None);
        assert_eq!(NameRef::from_offset(6), Some(NameRef(-6)));
    }
}
