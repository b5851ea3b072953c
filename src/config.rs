//! Configuration builder for Isolation Forest construction.

use crate::error::ForestError;
use crate::forest::IsolationForest;

/// Configuration for an Isolation Forest.
///
/// Construct via [`IsolationForestConfig::new`], chain `with_*` methods,
/// then finish with [`build`](IsolationForestConfig::build).
///
/// # Defaults
///
/// | Parameter           | Default            |
/// |---------------------|--------------------|
/// | `sub_sampling_size` | `None` (unbounded) |
/// | `seed`              | 42                 |
#[derive(Debug, Clone)]
pub struct IsolationForestConfig {
    pub(crate) num_trees: usize,
    pub(crate) sub_sampling_size: Option<usize>,
    pub(crate) seed: u64,
}

impl IsolationForestConfig {
    /// Create a new config with the given ensemble size.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidTreeCount`] if `num_trees` is zero.
    pub fn new(num_trees: usize) -> Result<Self, ForestError> {
        if num_trees == 0 {
            return Err(ForestError::InvalidTreeCount { num_trees });
        }
        Ok(Self {
            num_trees,
            sub_sampling_size: None,
            seed: 42,
        })
    }

    /// Set the maximum recursion depth per tree.
    ///
    /// `None` means depth is bounded only by the shrinking value domains.
    #[must_use]
    pub fn with_sub_sampling_size(mut self, sub_sampling_size: Option<usize>) -> Self {
        self.sub_sampling_size = sub_sampling_size;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
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

    /// Build an empty forest, ready for sample ingestion.
    #[must_use]
    pub fn build(self) -> IsolationForest {
        IsolationForest::from_config(self)
    }
}
