//! WLD: decode, edit and re-encode legacy binary world files.
//!
//! This facade re-exports the layered crates and adds archive-backed entry
//! points. For most users, adding `wld` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use wld::archive::MemArchive;
//! use wld::graph::model::Material;
//! use wld::prelude::*;
//!
//! let mut graph = SemanticGraph::new(FormatVersion::Plain);
//! graph.materials.insert(
//!     "Steel".into(),
//!     Material { brightness: 0.75, ..Material::default() },
//! );
//!
//! let mut archive = MemArchive::new();
//! save(&mut archive, "demo.wld", &graph).unwrap();
//! let loaded = load(&archive, "demo.wld", &WldConfig::default()).unwrap();
//! assert_eq!(loaded, graph);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `wld-core` | Kind table, record indices, name pool |
//! | [`raw`] | `wld-raw` | Envelope reader/writer, typed record payloads |
//! | [`graph`] | `wld-graph` | Tag-addressed graph, builder and encoder |
//! | [`ascii`] | `wld-ascii` | Text export |
//! | [`archive`] | this crate | Entry source/sink traits, directory and memory archives |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod archive;
pub mod config;
pub mod error;
mod io;

pub use config::WldConfig;
pub use error::Error;
pub use io::{export_ascii, load, load_raw, save};
pub use wld_core::ConfigError;

/// Kind table, record indices and the name pool (`wld-core`).
pub use wld_core as types;

/// Envelope reader/writer and typed record payloads (`wld-raw`).
///
/// [`raw::RawWld`] is the whole file as decoded records;
/// [`raw::WldReader`] streams them.
pub use wld_raw as raw;

/// Tag-addressed semantic graph (`wld-graph`).
///
/// [`graph::GraphBuilder`] resolves a [`raw::RawWld`] into a
/// [`graph::SemanticGraph`]; [`graph::GraphEncoder`] writes one back.
pub use wld_graph as graph;

/// Text export (`wld-ascii`).
pub use wld_ascii as ascii;

/// Common imports for typical WLD usage.
///
/// ```rust
/// use wld::prelude::*;
/// ```
pub mod prelude {
    // Entry points
    pub use crate::archive::{DirArchive, EntrySink, EntrySource, MemArchive};
    pub use crate::{load, load_raw, save, Error, WldConfig};

    // Core types
    pub use wld_core::{FragKind, RecordIndex, RecordRef};

    // Raw layer
    pub use wld_raw::{DecodeConfig, FormatVersion, Fragment, RawWld};

    // Graph
    pub use wld_graph::{GraphBuilder, GraphEncoder, KindRef, SemanticGraph};

    // Text export
    pub use wld_ascii::{AsciiExporter, ExportConfig};
}
