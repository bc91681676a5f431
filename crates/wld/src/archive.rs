//! Named-blob containers that world files are loaded from and saved to.
//!
//! [`EntrySource`] and [`EntrySink`] are the seam: anything that can hand
//! out and accept bytes by entry name works with [`load`](crate::load) and
//! [`save`](crate::save). Two implementations ship here:
//!
//! - [`DirArchive`]: one file per entry in a directory.
//! - [`MemArchive`]: an in-memory map, for tests and for staging edits.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::debug;

/// Errors from reading or writing archive entries.
#[derive(Debug)]
pub enum ArchiveError {
    /// No entry has this name.
    NotFound {
        /// Requested entry name.
        name: String,
    },
    /// The name cannot address an entry: empty, `.`/`..`, or containing a
    /// path separator or NUL.
    InvalidName {
        /// Offending name.
        name: String,
    },
    /// The backing store failed.
    Io {
        /// Entry or directory being accessed.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { name } => write!(f, "archive has no entry {name:?}"),
            Self::InvalidName { name } => write!(f, "{name:?} is not a valid entry name"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl Error for ArchiveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Read access to named entries.
pub trait EntrySource {
    /// Bytes of entry `name`.
    fn read_entry(&self, name: &str) -> Result<Vec<u8>, ArchiveError>;

    /// Names of every entry, sorted.
    fn entry_names(&self) -> Result<Vec<String>, ArchiveError>;
}

/// Write access to named entries.
pub trait EntrySink {
    /// Create or replace entry `name`.
    fn write_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), ArchiveError>;
}

fn check_name(name: &str) -> Result<(), ArchiveError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(ArchiveError::InvalidName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

// ── DirArchive ─────────────────────────────────────────────────

/// A directory whose regular files are the entries.
#[derive(Clone, Debug)]
pub struct DirArchive {
    root: PathBuf,
}

impl DirArchive {
    /// Use the existing directory `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let root = root.into();
        match fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => Ok(Self { root }),
            Ok(_) => Err(ArchiveError::Io {
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
                path: root,
            }),
            Err(source) => Err(ArchiveError::Io { path: root, source }),
        }
    }

    /// Use `root`, creating it and any missing parents.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| ArchiveError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// The backing directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy the file at `path` in as entry `name`.
    pub fn add(&mut self, name: &str, path: impl AsRef<Path>) -> Result<(), ArchiveError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_entry(name, &bytes)
    }

    /// Copy entry `name` out to `path`.
    pub fn extract(&self, name: &str, path: impl AsRef<Path>) -> Result<(), ArchiveError> {
        let bytes = self.read_entry(name)?;
        let path = path.as_ref();
        fs::write(path, bytes).map_err(|source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl EntrySource for DirArchive {
    fn read_entry(&self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        check_name(name)?;
        let path = self.root.join(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ArchiveError::NotFound {
                name: name.to_owned(),
            }),
            Err(source) => Err(ArchiveError::Io { path, source }),
        }
    }

    fn entry_names(&self) -> Result<Vec<String>, ArchiveError> {
        let io_err = |source| ArchiveError::Io {
            path: self.root.clone(),
            source,
        };
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if entry.file_type().map_err(io_err)?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

impl EntrySink for DirArchive {
    fn write_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), ArchiveError> {
        check_name(name)?;
        let path = self.root.join(name);
        fs::write(&path, bytes).map_err(|source| ArchiveError::Io { path, source })?;
        debug!(entry = name, len = bytes.len(), "wrote archive entry");
        Ok(())
    }
}

// ── MemArchive ─────────────────────────────────────────────────

/// Entries held in memory, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemArchive {
    entries: IndexMap<String, Vec<u8>>,
}

impl MemArchive {
    /// An empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove entry `name`, returning its bytes.
    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.entries.shift_remove(name)
    }
}

impl EntrySource for MemArchive {
    fn read_entry(&self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| ArchiveError::NotFound {
                name: name.to_owned(),
            })
    }

    fn entry_names(&self) -> Result<Vec<String>, ArchiveError> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl EntrySink for MemArchive {
    fn write_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), ArchiveError> {
        check_name(name)?;
        self.entries.insert(name.to_owned(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_archive_overwrites_in_place() {
        let mut archive = MemArchive::new();
        archive.write_entry("b.wld", b"one").unwrap();
        archive.write_entry("a.wld", b"two").unwrap();
        archive.write_entry("b.wld", b"three").unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.read_entry("b.wld").unwrap(), b"three");
        assert_eq!(archive.entry_names().unwrap(), ["a.wld", "b.wld"]);
        assert_eq!(archive.remove("a.wld").as_deref(), Some(&b"two"[..]));
        assert!(matches!(
            archive.read_entry("a.wld"),
            Err(ArchiveError::NotFound { .. })
        ));
    }

    #[test]
    fn names_with_separators_are_rejected() {
        let mut archive = MemArchive::new();
        for name in ["", "..", "sub/zone.wld", "sub\\zone.wld"] {
            assert!(
                matches!(
                    archive.write_entry(name, b""),
                    Err(ArchiveError::InvalidName { .. })
                ),
                "{name:?}"
            );
        }
        assert!(archive.is_empty());
    }

    #[test]
    fn dir_archive_round_trips_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = DirArchive::open(dir.path()).unwrap();
        archive.write_entry("zone.wld", b"\x02\x3dPT").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        assert_eq!(archive.read_entry("zone.wld").unwrap(), b"\x02\x3dPT");
        assert_eq!(archive.entry_names().unwrap(), ["zone.wld"]);
        assert!(matches!(
            archive.read_entry("missing.wld"),
            Err(ArchiveError::NotFound { .. })
        ));
        assert!(matches!(
            archive.read_entry("../zone.wld"),
            Err(ArchiveError::InvalidName { .. })
        ));
    }

    #[test]
    fn dir_archive_add_and_extract() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("loose.wld");
        std::fs::write(&outside, b"bytes").unwrap();

        let mut archive = DirArchive::create(dir.path().join("archive")).unwrap();
        archive.add("packed.wld", &outside).unwrap();
        let copy = dir.path().join("copy.wld");
        archive.extract("packed.wld", &copy).unwrap();
        assert_eq!(std::fs::read(copy).unwrap(), b"bytes");
    }

    #[test]
    fn open_requires_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, b"").unwrap();
        assert!(DirArchive::open(&file).is_err());
        assert!(DirArchive::open(dir.path().join("absent")).is_err());
    }
}
