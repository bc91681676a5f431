//! File header and format versions.

use std::fmt;

use crate::error::WldError;

/// A supported format version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatVersion {
    /// Version 1: the string pool is stored unscrambled.
    Plain,
    /// Original world files: scrambled pool, 16-bit extended-mesh UVs.
    Legacy,
    /// Later world files: scrambled pool, 32-bit float extended-mesh UVs.
    NewWorld,
}

impl FormatVersion {
    /// Raw header value for [`FormatVersion::Plain`].
    pub const PLAIN_CODE: u32 = 1;
    /// Raw header value for [`FormatVersion::Legacy`].
    pub const LEGACY_CODE: u32 = 0x0001_5500;
    /// Raw header value for [`FormatVersion::NewWorld`].
    pub const NEW_WORLD_CODE: u32 = 0x1000_C800;

    /// Map a raw header value to a version.
    pub fn from_code(code: u32) -> Result<Self, WldError> {
        match code {
            Self::PLAIN_CODE => Ok(Self::Plain),
            Self::LEGACY_CODE => Ok(Self::Legacy),
            Self::NEW_WORLD_CODE => Ok(Self::NewWorld),
            found => Err(WldError::UnsupportedVersion { found }),
        }
    }

    /// The raw header value.
    pub fn code(self) -> u32 {
        match self {
            Self::Plain => Self::PLAIN_CODE,
            Self::Legacy => Self::LEGACY_CODE,
            Self::NewWorld => Self::NEW_WORLD_CODE,
        }
    }

    /// Whether the string pool is stored scrambled.
    pub fn scrambles_pool(self) -> bool {
        !matches!(self, Self::Plain)
    }

    /// Whether version-dependent layouts use their later form.
    pub fn is_new_world(self) -> bool {
        matches!(self, Self::NewWorld)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.code())
    }
}

/// The fixed 28-byte file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WldHeader {
    /// Format version.
    pub version: FormatVersion,
    /// Number of records following the pool.
    pub record_count: u32,
    /// Uninterpreted header words at offsets 12, 16 and 24, written back
    /// verbatim.
    pub reserved: [u32; 3],
    /// String pool length in bytes.
    pub pool_len: u32,
}

impl WldHeader {
    /// Size of the encoded header in bytes.
    pub const SIZE: usize = 28;

    /// A header with zeroed reserved words.
    pub fn new(version: FormatVersion, record_count: u32, pool_len: u32) -> Self {
        Self {
            version,
            record_count,
            reserved: [0; 3],
            pool_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_codes() {
        for v in [FormatVersion::Plain, FormatVersion::Legacy, FormatVersion::NewWorld] {
            assert_eq!(FormatVersion::from_code(v.code()).unwrap(), v);
        }
        assert!(!FormatVersion::Plain.scrambles_pool());
        assert!(FormatVersion::Legacy.scrambles_pool());
        assert!(FormatVersion::NewWorld.is_new_world());
    }

    #[test]
    fn unknown_version_is_rejected() {
        assert!(matches!(
            FormatVersion::from_code(2),
            Err(WldError::UnsupportedVersion { found: 2 })
        ));
    }
}
