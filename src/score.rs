//! Path-length scoring and normalization for built forests.

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::forest::IsolationForest;
use crate::node::NodeLink;
use crate::sample::Sample;

/// Euler-Mascheroni constant, used to approximate harmonic numbers.
const EULER_MASCHERONI: f64 = 0.577_215_664_9;

/// Approximate the `i`-th harmonic number as `ln(i) + γ`.
fn harmonic(i: f64) -> f64 {
    i.ln() + EULER_MASCHERONI
}

/// Expected path length of an unsuccessful search in a binary search tree
/// over `n` points; the normalization denominator from the original paper.
fn expected_path_length(n: f64) -> f64 {
    2.0 * harmonic(n - 1.0) - 2.0 * (n - 1.0) / n
}

/// Score one sample against one tree, returning the traversed path length.
///
/// Descends from the root: values strictly below a node's split go left,
/// all others right, one depth unit per decision; reaching an absent child
/// ends the descent. A node testing a feature the sample does not carry
/// ends the descent differently: both subtrees are scored from a fresh
/// depth and the depth-offset results are averaged.
pub(crate) fn score_tree(sample: &Sample, tree: &NodeLink) -> f64 {
    let mut depth = 0.0;
    let mut current = tree;
    while let Some(node) = current {
        match sample.feature_value(&node.feature_name) {
            Some(value) => {
                current = if value < node.split_value {
                    &node.left
                } else {
                    &node.right
                };
                depth += 1.0;
            }
            None => {
                let left_depth = depth + score_tree(sample, &node.left);
                let right_depth = depth + score_tree(sample, &node.right);
                return (left_depth + right_depth) / 2.0;
            }
        }
    }
    depth
}

impl IsolationForest {
    /// Mean path length over qualifying trees, with the qualifying count.
    ///
    /// A tree qualifies when its path length for the sample is strictly
    /// positive; degenerate trees never qualify.
    fn qualifying_path_length(&self, sample: &Sample) -> (f64, usize) {
        let mut total = 0.0;
        let mut count = 0usize;
        for tree in &self.trees {
            let path_len = score_tree(sample, tree);
            if path_len > 0.0 {
                total += path_len;
                count += 1;
            }
        }
        if count > 0 {
            (total / count as f64, count)
        } else {
            (0.0, 0)
        }
    }

    /// Score the sample against the whole forest.
    ///
    /// Returns the mean path length over qualifying trees, or 0 when no
    /// tree qualifies. This is an unnormalized average depth: its scale
    /// shifts with the ensemble size and depth limit, so treat it as
    /// relative between samples scored against the same forest. Lower
    /// values mean the sample isolates faster.
    #[must_use]
    pub fn score(&self, sample: &Sample) -> f64 {
        self.qualifying_path_length(sample).0
    }

    /// Score the sample and map the result onto the unit interval.
    ///
    /// Applies `2^(-avg / C(n))`, where `C(n)` is the expected-path-length
    /// correction from the original paper and `n` is the count of
    /// qualifying trees. Values close to 1 indicate anomalies, values near
    /// 0 normal points. Returns 0 when fewer than two trees qualify.
    #[must_use]
    pub fn normalized_score(&self, sample: &Sample) -> f64 {
        let (avg_path_len, count) = self.qualifying_path_length(sample);
        if count > 1 {
            let exponent = -(avg_path_len / expected_path_length(count as f64));
            exponent.exp2()
        } else {
            0.0
        }
    }

    /// Score a batch of samples in parallel.
    #[must_use]
    pub fn score_batch(&self, samples: &[Sample]) -> Vec<f64> {
        samples.par_iter().map(|sample| self.score(sample)).collect()
    }

    /// Normalized-score a batch of samples in parallel.
    #[must_use]
    pub fn normalized_score_batch(&self, samples: &[Sample]) -> Vec<f64> {
        samples
            .par_iter()
            .map(|sample| self.normalized_score(sample))
            .collect()
    }
}
