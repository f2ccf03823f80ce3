//! clademap - transfer reassortment annotations onto a differently resolved tree
//!
//! Reads a reassortment summary computed on a source tree, maps every
//! confident event onto the target tree, and writes:
//! - the target tree with all internal nodes labeled (Newick)
//! - node-data JSON for `augur export --node-data`
//! - optionally the mapping table as JSON and TSV

use anyhow::{Context, Result};
use clap::Parser;
use clademap::config::{DEFAULT_CONFIDENCE_THRESHOLD, MapperConfig};
use clademap::labeler::{DEFAULT_LABEL_PREFIX, DEFAULT_LABEL_WIDTH};
use clademap::matcher::MatchStrategy;
use clademap::model::TaxonNormalization;
use clademap::pipeline::{self, OutputPaths, PipelineInputs};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// clademap CLI
#[derive(Parser, Debug)]
#[command(name = "clademap")]
#[command(about = "Map reassortment events between differently resolved trees", long_about = None)]
#[command(version)]
struct Cli {
    /// Reassortment summary JSON, keyed by source node id
    summary_json: PathBuf,

    /// Tree the summary was computed on (Newick)
    source_tree: PathBuf,

    /// Tree to transfer the events to (Newick)
    target_tree: PathBuf,

    /// Output path of the labeled target tree
    output_labeled_tree: PathBuf,

    /// Output path of the node-data JSON
    output_node_data: PathBuf,

    /// Also write the mapping table as JSON
    #[arg(long)]
    mapping_json: Option<PathBuf>,

    /// Also write the mapping table as TSV
    #[arg(long)]
    mapping_tsv: Option<PathBuf>,

    /// Matching strategy
    #[arg(long, value_enum, env = "CLADEMAP_STRATEGY", default_value_t = MatchStrategy::AncestralWalk)]
    strategy: MatchStrategy,

    /// Minimum confidence of a reassortment call
    #[arg(long, env = "CLADEMAP_THRESHOLD", default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    threshold: f64,

    /// Normalization of taxon names in both trees
    #[arg(long, value_enum, env = "CLADEMAP_NORMALIZATION", default_value_t = TaxonNormalization::StrainDate)]
    normalization: TaxonNormalization,

    /// Prefix of generated internal node labels
    #[arg(long, default_value = DEFAULT_LABEL_PREFIX)]
    label_prefix: String,

    /// Digits of generated internal node labels
    #[arg(long, default_value_t = DEFAULT_LABEL_WIDTH)]
    label_width: usize,

    /// Replace existing internal labels of the target tree (e.g. support values)
    #[arg(long)]
    relabel_target: bool,

    /// Resolve events in parallel
    #[arg(long, env = "CLADEMAP_PARALLEL")]
    parallel: bool,

    /// Log level, overrides RUST_LOG
    #[arg(long, env = "CLADEMAP_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "CLADEMAP_LOG_JSON")]
    log_json: bool,
}

impl Cli {
    fn config(&self) -> MapperConfig {
        MapperConfig::default()
            .with_strategy(self.strategy)
            .with_confidence_threshold(self.threshold)
            .with_normalization(self.normalization)
            .with_label_prefix(self.label_prefix.clone())
            .with_label_width(self.label_width)
            .with_relabel_target(self.relabel_target)
            .with_parallel(self.parallel)
    }
}

fn init_tracing(cli: &Cli) {
    let env_filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    if cli.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = cli.config();
    info!(config = %serde_json::to_string(&config)?, "configuration");

    let inputs = PipelineInputs {
        summary: cli.summary_json.clone(),
        source_tree: cli.source_tree.clone(),
        target_tree: cli.target_tree.clone(),
    };
    let run = pipeline::run(&config, &inputs).context("mapping run failed")?;

    let outputs = OutputPaths {
        labeled_tree: Some(cli.output_labeled_tree.clone()),
        node_data: Some(cli.output_node_data.clone()),
        mapping_json: cli.mapping_json.clone(),
        mapping_tsv: cli.mapping_tsv.clone(),
    };
    run.write_outputs(&outputs).context("writing outputs failed")?;

    let summary = run.summary();
    let rate = if summary.total > 0 {
        100.0 * summary.mapped() as f64 / summary.total as f64
    } else {
        0.0
    };
    println!("{summary} ({rate:.1}% mapped)");
    Ok(())
}
