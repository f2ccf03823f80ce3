//! End-to-end mapping runs.
//!
//! [map_trees] runs the engine on trees and events already in memory:
//! label internal nodes, index both trees, map every event. [run] does the
//! same starting from files (summary JSON, source and target Newick), and
//! [MappingRun::write_outputs] writes the labeled target tree, the node-data
//! JSON and the mapping table.

use crate::config::MapperConfig;
use crate::error::{MappingError, TreeRole};
use crate::index::IndexedTree;
use crate::mapper::{EventMapper, EventRecord, MappingSummary, MappingTable};
use crate::model::{LabelResolver, LeafLabelMap, PhyloTree};
use crate::newick::{NewickParser, NewickStyle, to_newick, write_newick_file};
use crate::parser::ParsingError;
use crate::parser::byte_parser::ByteParser;
use crate::summary::{self, SummaryError, node_data::build_node_data};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors of a file-based run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to read {role} tree {}", .path.display())]
    ReadTree {
        role: TreeRole,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {role} tree {}", .path.display())]
    ParseTree {
        role: TreeRole,
        path: PathBuf,
        #[source]
        source: ParsingError,
    },

    #[error(transparent)]
    Summary(#[from] SummaryError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Input files of a run.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub summary: PathBuf,
    pub source_tree: PathBuf,
    pub target_tree: PathBuf,
}

/// Output files of a run; `None` skips an output.
#[derive(Debug, Clone, Default)]
pub struct OutputPaths {
    pub labeled_tree: Option<PathBuf>,
    pub node_data: Option<PathBuf>,
    pub mapping_json: Option<PathBuf>,
    pub mapping_tsv: Option<PathBuf>,
}

/// Everything a run produced: the shared labels, both indexed (and labeled)
/// trees, and the mapping table.
#[derive(Debug, Clone)]
pub struct MappingRun {
    pub labels: LeafLabelMap,
    pub source: IndexedTree,
    pub target: IndexedTree,
    pub table: MappingTable,
}

impl MappingRun {
    pub fn summary(&self) -> MappingSummary {
        self.table.summary()
    }

    /// Returns the target tree as Newick, with all internal nodes labeled.
    pub fn labeled_target_newick(&self) -> String {
        to_newick(NewickStyle::Labeled, self.target.tree(), &self.labels)
    }

    /// Returns the node-data JSON of the mapped events.
    pub fn node_data(&self) -> Value {
        build_node_data(&self.table)
    }

    /// Writes the requested outputs.
    pub fn write_outputs(&self, outputs: &OutputPaths) -> Result<(), PipelineError> {
        if let Some(path) = &outputs.labeled_tree {
            let file = create(path)?;
            write_newick_file(file, self.target.tree(), &self.labels, NewickStyle::Labeled)
                .map_err(|source| write_error(path, source))?;
            info!(path = %path.display(), "wrote labeled target tree");
        }
        if let Some(path) = &outputs.node_data {
            write_json(path, &self.node_data())?;
            info!(path = %path.display(), "wrote node data");
        }
        if let Some(path) = &outputs.mapping_json {
            write_json(path, self.table.entries())?;
            info!(path = %path.display(), "wrote mapping table");
        }
        if let Some(path) = &outputs.mapping_tsv {
            let file = create(path)?;
            self.table
                .write_tsv(BufWriter::new(file))
                .map_err(|source| write_error(path, source))?;
            info!(path = %path.display(), "wrote mapping table");
        }
        Ok(())
    }
}

/// Maps `events` from `source` onto `target`, both parsed against `labels`.
///
/// Internal nodes lacking a label are labeled first, each tree with a fresh
/// counter, so repeated runs on the same input give identical results.
///
/// # Errors
/// [MappingError::MalformedTree] if a tree cannot be indexed,
/// [MappingError::AmbiguousMatch] if the verified strategy sees disagreement.
pub fn map_trees(
    config: &MapperConfig,
    mut source: PhyloTree,
    mut target: PhyloTree,
    labels: LeafLabelMap,
    events: &[EventRecord],
) -> Result<MappingRun, MappingError> {
    info!(
        strategy = %config.strategy,
        threshold = config.confidence_threshold,
        parallel = config.parallel,
        events = events.len(),
        "starting mapping run"
    );

    let mut labeler = config.labeler();
    let source_labeled = labeler.label_tree(&mut source, &labels);
    labeler.reset();
    let target_labeled = labeler
        .with_overwrite(config.relabel_target)
        .label_tree(&mut target, &labels);
    info!(source_labeled, target_labeled, "labeled internal nodes");

    let source = IndexedTree::new(source, &labels, TreeRole::Source)?;
    let target = IndexedTree::new(target, &labels, TreeRole::Target)?;
    warn_on_universe_mismatch(&source, &target);

    let table = EventMapper::new(&source, &target, &labels, config.strategy)
        .with_parallel(config.parallel)
        .map_events(events)?;
    info!(summary = %table.summary(), "mapping finished");

    Ok(MappingRun {
        labels,
        source,
        target,
        table,
    })
}

/// Reads the inputs and maps the selected events.
pub fn run(config: &MapperConfig, inputs: &PipelineInputs) -> Result<MappingRun, PipelineError> {
    let events = summary::load_events(&inputs.summary, config.confidence_threshold)?;

    let mut newick_parser =
        NewickParser::new().with_resolver(LabelResolver::new(config.normalization));
    let source = read_tree(&mut newick_parser, &inputs.source_tree, TreeRole::Source)?;
    let target = read_tree(&mut newick_parser, &inputs.target_tree, TreeRole::Target)?;
    let labels = newick_parser.into_leaf_label_map();
    info!(
        source_leaves = source.num_leaves(),
        target_leaves = target.num_leaves(),
        taxa = labels.num_labels(),
        "parsed trees"
    );

    Ok(map_trees(config, source, target, labels, &events)?)
}

fn read_tree(
    newick_parser: &mut NewickParser,
    path: &Path,
    role: TreeRole,
) -> Result<PhyloTree, PipelineError> {
    let bytes = fs::read(path).map_err(|source| PipelineError::ReadTree {
        role,
        path: path.to_path_buf(),
        source,
    })?;
    newick_parser
        .parse_single(ByteParser::from_bytes(bytes))
        .map_err(|source| PipelineError::ParseTree {
            role,
            path: path.to_path_buf(),
            source,
        })
}

fn warn_on_universe_mismatch(source: &IndexedTree, target: &IndexedTree) {
    let universe = source.index().universe();
    let missing_in_target = universe - target.index().num_present_leaves();
    let missing_in_source = universe - source.index().num_present_leaves();
    if missing_in_target > 0 {
        warn!(count = missing_in_target, "taxa only present in the source tree");
    }
    if missing_in_source > 0 {
        warn!(count = missing_in_source, "taxa only present in the target tree");
    }
}

fn create(path: &Path) -> Result<File, PipelineError> {
    File::create(path).map_err(|source| write_error(path, source))
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PipelineError> {
    let mut writer = BufWriter::new(create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|err| write_error(path, err.into()))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|source| write_error(path, source))
}

fn write_error(path: &Path, source: io::Error) -> PipelineError {
    PipelineError::Write {
        path: path.to_path_buf(),
        source,
    }
}
