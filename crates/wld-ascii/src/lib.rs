//! Text export of WLD semantic graphs.
//!
//! [`AsciiExporter`] walks a [`SemanticGraph`](wld_graph::SemanticGraph)
//! and renders it as an [`AsciiTree`]: a root index file plus satellites,
//! linked with `INCLUDE` directives.
//!
//! ```text
//! _root.wce     banner, palette file, user data, INCLUDE lines, zone
//!               chunks, lights, regions, BSP tree, actors, zones
//! <mesh>.mod    palette, materials, sprites, bitmaps, the mesh, its
//!               instances, attaching skeletons and their collision
//! <skel>.ani    track definitions and tracks of one skeleton
//! ```
//!
//! [`ExportState`] guarantees each entry is written at most once per
//! export, so the output never re-declares a tag. Following a reference to
//! a tag the graph does not define is [`ExportError::UnknownTag`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod export;
pub mod state;
mod text;

pub use config::ExportConfig;
pub use error::ExportError;
pub use export::{AsciiExporter, AsciiTree, ASCII_VERSION};
pub use state::ExportState;
