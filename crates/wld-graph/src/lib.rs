//! Semantic graph for WLD world files.
//!
//! [`GraphBuilder`] turns a decoded [`RawWld`](wld_raw::RawWld) into a
//! [`SemanticGraph`]: one tag-keyed map per entry kind, with every record
//! index replaced by the tag of the entry it points at. [`GraphEncoder`]
//! is the inverse, writing the graph back as records in dependency order
//! with a fresh string pool.
//!
//! Every reference is bounds- and kind-checked during the build. Index 0
//! always means "absent"; anything past the last record is
//! [`GraphError::ReferenceOutOfBounds`], and a record of the wrong kind is
//! [`GraphError::TypeMismatch`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod attach;
pub mod build;
pub mod encode;
pub mod error;
pub mod model;
pub mod resolve;

pub use attach::attach_meshes;
pub use build::GraphBuilder;
pub use encode::{GraphEncoder, EMIT_ORDER};
pub use error::GraphError;
pub use model::{KindRef, SemanticGraph};
pub use resolve::{RecordResolver, GLOBAL_AMBIENT_NAME};
