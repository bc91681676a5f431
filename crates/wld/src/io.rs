//! Archive-backed load and save.

use std::path::Path;

use tracing::debug;
use wld_ascii::{AsciiExporter, AsciiTree};
use wld_graph::{GraphBuilder, GraphEncoder, SemanticGraph};
use wld_raw::RawWld;

use crate::archive::{EntrySink, EntrySource};
use crate::config::WldConfig;
use crate::error::Error;

/// Decode entry `name` of `source` into a graph.
pub fn load(
    source: &dyn EntrySource,
    name: &str,
    config: &WldConfig,
) -> Result<SemanticGraph, Error> {
    config.validate()?;
    let bytes = source.read_entry(name)?;
    let raw = RawWld::read_with_config(bytes.as_slice(), config.decode.clone())?;
    let graph = GraphBuilder::build(&raw)?;
    debug!(
        entry = name,
        len = bytes.len(),
        records = raw.len(),
        "loaded world"
    );
    Ok(graph)
}

/// Decode entry `name` of `source` without resolving references.
///
/// Works on every file the codec accepts, including ones holding record
/// kinds the graph does not model.
pub fn load_raw(
    source: &dyn EntrySource,
    name: &str,
    config: &WldConfig,
) -> Result<RawWld, Error> {
    config.validate()?;
    let bytes = source.read_entry(name)?;
    Ok(RawWld::read_with_config(bytes.as_slice(), config.decode.clone())?)
}

/// Encode `graph` and store it as entry `name` of `sink`.
pub fn save(sink: &mut dyn EntrySink, name: &str, graph: &SemanticGraph) -> Result<(), Error> {
    let raw = GraphEncoder::encode(graph)?;
    let bytes = raw.to_bytes()?;
    sink.write_entry(name, &bytes)?;
    debug!(entry = name, len = bytes.len(), records = raw.len(), "saved world");
    Ok(())
}

/// Export `graph` as text into `dir`.
pub fn export_ascii(
    graph: &SemanticGraph,
    dir: impl AsRef<Path>,
    config: &WldConfig,
) -> Result<AsciiTree, Error> {
    let tree = AsciiExporter::new(graph, &config.export).export()?;
    tree.write_to_dir(dir)?;
    Ok(tree)
}
