//! Isolation Forest: training-domain ingestion and parallel tree construction.

use std::collections::BTreeMap;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{info, instrument};

use crate::config::IsolationForestConfig;
use crate::node::NodeLink;
use crate::sample::Sample;
use crate::tree::build_tree;

/// Feature name mapped to the ascending multiset of values observed during
/// training. Duplicates are retained.
pub type FeatureValuesMap = BTreeMap<String, Vec<f64>>;

/// An Isolation Forest over named-feature samples.
///
/// Lifecycle: feed training samples with [`add_sample`](Self::add_sample),
/// build the ensemble once with [`create`](Self::create), then score
/// arbitrary samples any number of times. The forest stores only the
/// observed value domains, never the samples themselves.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    pub(crate) trees: Vec<NodeLink>,
    pub(crate) feature_values: FeatureValuesMap,
    pub(crate) num_trees: usize,
    pub(crate) sub_sampling_size: Option<usize>,
    pub(crate) seed: u64,
}

impl IsolationForest {
    pub(crate) fn from_config(config: IsolationForestConfig) -> Self {
        Self {
            trees: Vec::new(),
            feature_values: FeatureValuesMap::new(),
            num_trees: config.num_trees,
            sub_sampling_size: config.sub_sampling_size,
            seed: config.seed,
        }
    }

    /// Record each of the sample's feature values in the training registry.
    ///
    /// Values are appended to the per-feature list, which is re-sorted
    /// ascending after every addition; duplicates are retained. A sample
    /// with no features is a no-op. The sample itself is not stored.
    pub fn add_sample(&mut self, sample: &Sample) {
        for feature in sample.features() {
            let values = self
                .feature_values
                .entry(feature.name().to_string())
                .or_default();
            values.push(feature.value());
            values.sort_by(f64::total_cmp);
        }
    }

    /// Build the configured number of trees from the observed value domains.
    ///
    /// Every tree grows from its own seed, derived from the forest seed
    /// before the parallel region, over a read-only view of the registry;
    /// the resulting structure depends only on the seed and the training
    /// data, never on scheduling. Calling this again rebuilds the ensemble
    /// from scratch. With no training data every tree is degenerate.
    #[instrument(skip(self), fields(num_trees = self.num_trees, n_features = self.feature_values.len()))]
    pub fn create(&mut self) {
        let mut master_rng = ChaCha8Rng::seed_from_u64(self.seed);
        let tree_seeds: Vec<u64> = (0..self.num_trees).map(|_| master_rng.r#gen()).collect();

        let feature_values = &self.feature_values;
        let max_depth = self.sub_sampling_size;

        let trees: Vec<NodeLink> = tree_seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                build_tree(feature_values, 0, max_depth, &mut rng)
            })
            .collect();
        self.trees = trees;

        info!(
            n_trees = self.trees.len(),
            n_degenerate = self.trees.iter().filter(|tree| tree.is_none()).count(),
            "isolation forest created"
        );
    }

    // --- Getters ---

    /// Return the configured ensemble size.
    #[must_use]
    pub fn num_trees(&self) -> usize {
        self.num_trees
    }

    /// Return the per-tree depth limit, if any.
    #[must_use]
    pub fn sub_sampling_size(&self) -> Option<usize> {
        self.sub_sampling_size
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the training registry.
    #[must_use]
    pub fn feature_values(&self) -> &FeatureValuesMap {
        &self.feature_values
    }

    /// Return the built trees; a `None` entry is a degenerate tree.
    #[must_use]
    pub fn trees(&self) -> &[NodeLink] {
        &self.trees
    }

    /// Return the number of distinct feature names observed in training.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_values.len()
    }
}
