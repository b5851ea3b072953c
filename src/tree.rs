//! Randomized domain-partitioning construction of isolation trees.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::forest::FeatureValuesMap;
use crate::node::{Node, NodeLink};

/// Recursively build one isolation tree over `domain`.
///
/// Each node halves the distinct observed values of one randomly chosen
/// feature rather than subsampling training rows: the left branch keeps the
/// values strictly below the split, the right branch the values above it.
/// Returns `None` (a degenerate tree) when the domain has at most one
/// feature, the chosen feature has at most one value, or `max_depth` is
/// reached.
pub(crate) fn build_tree(
    domain: &FeatureValuesMap,
    depth: usize,
    max_depth: Option<usize>,
    rng: &mut ChaCha8Rng,
) -> NodeLink {
    // A subspace with at most one splittable feature is fully isolated.
    if domain.len() <= 1 {
        return None;
    }
    if max_depth.is_some_and(|limit| depth >= limit) {
        return None;
    }

    // BTreeMap keys iterate in a fixed order, so the selection depends only
    // on the RNG stream.
    let feature_index = rng.gen_range(0..domain.len());
    let (feature_name, values) = domain
        .iter()
        .nth(feature_index)
        .expect("feature index drawn from the key range");

    if values.len() <= 1 {
        return None;
    }

    let split_index = rng.gen_range(0..values.len());
    let split_value = values[split_index];

    let mut node = Node::new(feature_name.clone(), split_value);

    // Each branch narrows only the chosen feature, on its own copy of the
    // domain, so sibling construction stays isolated.
    let mut left_domain = domain.clone();
    left_domain.insert(feature_name.clone(), values[..split_index].to_vec());
    node.left = build_tree(&left_domain, depth + 1, max_depth, rng);

    if split_index + 1 < values.len() {
        let mut right_domain = domain.clone();
        right_domain.insert(feature_name.clone(), values[split_index + 1..].to_vec());
        node.right = build_tree(&right_domain, depth + 1, max_depth, rng);
    }

    Some(Box::new(node))
}
