//! Settings of a mapping run.

use crate::labeler::{DEFAULT_LABEL_PREFIX, DEFAULT_LABEL_WIDTH, NodeLabeler};
use crate::matcher::MatchStrategy;
use crate::model::TaxonNormalization;
use serde::{Deserialize, Serialize};

/// Minimum confidence of a reassortment call for it to become an event.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.95;

/// Configuration of a mapping run, built with `with_*` methods.
///
/// # Example
/// ```
/// use clademap::config::MapperConfig;
/// use clademap::matcher::MatchStrategy;
///
/// let config = MapperConfig::default()
///     .with_strategy(MatchStrategy::Verified)
///     .with_confidence_threshold(0.9)
///     .with_parallel(true);
/// assert_eq!(config.strategy, MatchStrategy::Verified);
/// assert_eq!(config.label_prefix, "NODE_");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub strategy: MatchStrategy,
    pub confidence_threshold: f64,
    pub label_prefix: String,
    pub label_width: usize,
    /// Replace existing internal labels of the target tree.
    pub relabel_target: bool,
    pub normalization: TaxonNormalization,
    pub parallel: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        MapperConfig {
            strategy: MatchStrategy::default(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
            label_width: DEFAULT_LABEL_WIDTH,
            relabel_target: false,
            normalization: TaxonNormalization::default(),
            parallel: false,
        }
    }
}

impl MapperConfig {
    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    pub fn with_label_width(mut self, width: usize) -> Self {
        self.label_width = width;
        self
    }

    pub fn with_relabel_target(mut self, relabel: bool) -> Self {
        self.relabel_target = relabel;
        self
    }

    pub fn with_normalization(mut self, normalization: TaxonNormalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns a fresh labeler with the configured prefix and width.
    pub fn labeler(&self) -> NodeLabeler {
        NodeLabeler::new()
            .with_prefix(self.label_prefix.clone())
            .with_width(self.label_width)
    }
}
