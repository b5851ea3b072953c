//! Forest serialization: the labeled nested-mapping contract and JSON files.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::error::ForestError;
use crate::forest::IsolationForest;
use crate::node::{Node, NodeLink};

/// Mapping key for a node's feature name.
const FEATURE_NAME_KEY: &str = "Feature Name";
/// Mapping key for a node's split threshold.
const SPLIT_VALUE_KEY: &str = "Split Value";
/// Mapping key for the left child rendering.
const LEFT_KEY: &str = "Left";
/// Mapping key for the right child rendering.
const RIGHT_KEY: &str = "Right";
/// Prefix for per-tree labels in the dumped mapping.
const TREE_LABEL_PREFIX: &str = "Tree ";

/// Render one subtree as a nested mapping; an absent node is `{}`.
fn dump_node(link: &NodeLink) -> Value {
    let mut data = Map::new();
    if let Some(node) = link {
        data.insert(FEATURE_NAME_KEY.to_string(), Value::from(node.feature_name()));
        data.insert(SPLIT_VALUE_KEY.to_string(), Value::from(node.split_value()));
        data.insert(LEFT_KEY.to_string(), dump_node(&node.left));
        data.insert(RIGHT_KEY.to_string(), dump_node(&node.right));
    }
    Value::Object(data)
}

/// Rebuild one subtree from its mapping.
///
/// An empty mapping, a mapping without a feature name, or an absent child
/// key is the null-child sentinel.
fn load_node(data: &Value) -> Result<NodeLink, ForestError> {
    let object = data.as_object().ok_or(ForestError::NonObjectNode)?;
    if !object.contains_key(FEATURE_NAME_KEY) {
        return Ok(None);
    }
    let feature_name = object
        .get(FEATURE_NAME_KEY)
        .and_then(Value::as_str)
        .ok_or(ForestError::InvalidNodeField {
            field: FEATURE_NAME_KEY,
        })?;
    let split_value = object
        .get(SPLIT_VALUE_KEY)
        .and_then(Value::as_f64)
        .ok_or(ForestError::InvalidNodeField {
            field: SPLIT_VALUE_KEY,
        })?;

    let mut node = Node::new(feature_name, split_value);
    if let Some(left) = object.get(LEFT_KEY) {
        node.left = load_node(left)?;
    }
    if let Some(right) = object.get(RIGHT_KEY) {
        node.right = load_node(right)?;
    }
    Ok(Some(Box::new(node)))
}

/// Parse a `Tree <index>` label into its index.
fn parse_tree_label(label: &str) -> Result<usize, ForestError> {
    label
        .strip_prefix(TREE_LABEL_PREFIX)
        .and_then(|index| index.parse().ok())
        .ok_or_else(|| ForestError::InvalidTreeLabel {
            label: label.to_string(),
        })
}

impl IsolationForest {
    /// Render the built forest as a nested mapping keyed by per-tree labels.
    ///
    /// Each `Tree <index>` entry holds the recursive
    /// `{"Feature Name", "Split Value", "Left", "Right"}` rendering of that
    /// tree; an empty mapping denotes an absent child or a degenerate tree.
    /// A pure read of the built forest, with no metadata attached.
    #[must_use]
    pub fn dump(&self) -> Map<String, Value> {
        let mut data = Map::new();
        for (index, tree) in self.trees.iter().enumerate() {
            data.insert(format!("{TREE_LABEL_PREFIX}{index}"), dump_node(tree));
        }
        data
    }

    /// Reconstruct the tree ensemble from a mapping produced by
    /// [`dump`](Self::dump).
    ///
    /// Trees are restored in label-index order and replace the current
    /// ensemble wholesale; `num_trees` is synced to the restored count.
    /// Neither the training registry nor [`create`](Self::create) is
    /// needed before scoring a loaded forest.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::NonObjectDump`] | `data` is not a JSON object |
    /// | [`ForestError::InvalidTreeLabel`] | a key is not a `Tree <index>` label |
    /// | [`ForestError::NonObjectNode`] | a node rendering is not a JSON object |
    /// | [`ForestError::InvalidNodeField`] | a node field is missing or mistyped |
    pub fn load(&mut self, data: &Value) -> Result<(), ForestError> {
        let object = data.as_object().ok_or(ForestError::NonObjectDump)?;

        let mut indexed: Vec<(usize, &Value)> = Vec::with_capacity(object.len());
        for (label, tree_data) in object {
            indexed.push((parse_tree_label(label)?, tree_data));
        }
        indexed.sort_by_key(|&(index, _)| index);

        let mut trees = Vec::with_capacity(indexed.len());
        for (_, tree_data) in indexed {
            trees.push(load_node(tree_data)?);
        }

        debug!(n_trees = trees.len(), "forest loaded");
        self.num_trees = trees.len();
        self.trees = trees;
        Ok(())
    }

    /// Save the dumped forest to a pretty-printed JSON file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::SerializeModel`] | JSON encoding failed |
    /// | [`ForestError::WriteModel`] | file write failed |
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ForestError> {
        let path = path.as_ref();

        let bytes = serde_json::to_vec_pretty(&Value::Object(self.dump()))
            .map_err(|e| ForestError::SerializeModel { source: e })?;

        std::fs::write(path, &bytes).map_err(|e| ForestError::WriteModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(
            size_bytes = bytes.len(),
            n_trees = self.trees.len(),
            "forest saved"
        );

        Ok(())
    }

    /// Load the tree ensemble from a JSON file written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::ReadModel`] | file read failed |
    /// | [`ForestError::DeserializeModel`] | the file is not valid JSON |
    /// | others | see [`load`](Self::load) |
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), ForestError> {
        let path = path.as_ref();

        let bytes = std::fs::read(path).map_err(|e| ForestError::ReadModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        let data: Value =
            serde_json::from_slice(&bytes).map_err(|e| ForestError::DeserializeModel {
                path: path.to_path_buf(),
                source: e,
            })?;

        self.load(&data)
    }
}

impl Serialize for IsolationForest {
    /// Serialize as the [`dump`](IsolationForest::dump) mapping.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.dump().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use tempfile::TempDir;

    use crate::config::IsolationForestConfig;
    use crate::error::ForestError;
    use crate::forest::IsolationForest;
    use crate::sample::{Feature, Sample};

    fn sample_xy(x: f64, y: f64) -> Sample {
        let mut sample = Sample::new("s");
        sample.add_features(vec![Feature::new("x", x), Feature::new("y", y)]);
        sample
    }

    fn trained_forest() -> IsolationForest {
        let mut forest = IsolationForestConfig::new(5)
            .unwrap()
            .with_sub_sampling_size(Some(6))
            .with_seed(42)
            .build();
        for i in 0..15 {
            forest.add_sample(&sample_xy(f64::from(i), f64::from(15 - i)));
        }
        forest.create();
        forest
    }

    #[test]
    fn dump_labels_every_tree() {
        let forest = trained_forest();
        let data = forest.dump();
        assert_eq!(data.len(), 5);
        for index in 0..5 {
            assert!(data.contains_key(&format!("Tree {index}")));
        }
    }

    #[test]
    fn dump_renders_node_fields() {
        let forest = trained_forest();
        let data = forest.dump();
        let root = data["Tree 0"].as_object().unwrap();
        assert!(root["Feature Name"].is_string());
        assert!(root["Split Value"].is_number());
        assert!(root["Left"].is_object());
        assert!(root["Right"].is_object());
    }

    #[test]
    fn dump_before_create_is_empty() {
        let forest = IsolationForestConfig::new(3).unwrap().build();
        assert!(forest.dump().is_empty());
    }

    #[test]
    fn round_trip_preserves_scores() {
        let forest = trained_forest();
        let dumped = Value::Object(forest.dump());

        let mut restored = IsolationForestConfig::new(1).unwrap().build();
        restored.load(&dumped).unwrap();
        assert_eq!(restored.num_trees(), forest.num_trees());

        for i in -5..25 {
            let sample = sample_xy(f64::from(i), f64::from(i) * 0.4);
            assert!((forest.score(&sample) - restored.score(&sample)).abs() < 1e-12);
            assert!(
                (forest.normalized_score(&sample) - restored.normalized_score(&sample)).abs()
                    < 1e-12
            );
        }
    }

    #[test]
    fn round_trip_preserves_structure() {
        let forest = trained_forest();
        let dumped = Value::Object(forest.dump());
        let mut restored = IsolationForestConfig::new(1).unwrap().build();
        restored.load(&dumped).unwrap();
        assert_eq!(restored.trees(), forest.trees());
    }

    #[test]
    fn load_handcrafted_mapping() {
        let data = json!({
            "Tree 0": {
                "Feature Name": "x",
                "Split Value": 5.0,
                "Left": {},
                "Right": {
                    "Feature Name": "x",
                    "Split Value": 8.0,
                    "Left": {},
                    "Right": {}
                }
            },
            "Tree 1": {}
        });
        let mut forest = IsolationForestConfig::new(1).unwrap().build();
        forest.load(&data).unwrap();

        assert_eq!(forest.trees().len(), 2);
        assert!(forest.trees()[1].is_none());

        // 7.0 goes right at x@5, left at x@8: two decisions in the one
        // qualifying tree.
        let sample = sample_xy(7.0, 0.0);
        assert!((forest.score(&sample) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn load_treats_missing_child_keys_as_absent() {
        let data = json!({
            "Tree 0": { "Feature Name": "x", "Split Value": 1.5 }
        });
        let mut forest = IsolationForestConfig::new(1).unwrap().build();
        forest.load(&data).unwrap();
        let root = forest.trees()[0].as_ref().unwrap();
        assert!(root.is_leaf());
    }

    #[test]
    fn load_accepts_integer_split_values() {
        let data = json!({
            "Tree 0": { "Feature Name": "x", "Split Value": 3, "Left": {}, "Right": {} }
        });
        let mut forest = IsolationForestConfig::new(1).unwrap().build();
        forest.load(&data).unwrap();
        let root = forest.trees()[0].as_ref().unwrap();
        assert!((root.split_value() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn load_orders_trees_by_label_index() {
        let data = json!({
            "Tree 1": {},
            "Tree 0": { "Feature Name": "x", "Split Value": 1.0 }
        });
        let mut forest = IsolationForestConfig::new(1).unwrap().build();
        forest.load(&data).unwrap();
        assert!(forest.trees()[0].is_some());
        assert!(forest.trees()[1].is_none());
    }

    // --- malformed payloads ---

    #[test]
    fn load_rejects_non_object_payload() {
        let mut forest = IsolationForestConfig::new(1).unwrap().build();
        let err = forest.load(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ForestError::NonObjectDump));
    }

    #[test]
    fn load_rejects_unrecognized_label() {
        let mut forest = IsolationForestConfig::new(1).unwrap().build();
        let err = forest.load(&json!({ "Arbre 0": {} })).unwrap_err();
        assert!(matches!(err, ForestError::InvalidTreeLabel { .. }));
    }

    #[test]
    fn load_rejects_non_object_node() {
        let mut forest = IsolationForestConfig::new(1).unwrap().build();
        let err = forest.load(&json!({ "Tree 0": 3 })).unwrap_err();
        assert!(matches!(err, ForestError::NonObjectNode));
    }

    #[test]
    fn load_rejects_missing_split_value() {
        let mut forest = IsolationForestConfig::new(1).unwrap().build();
        let err = forest
            .load(&json!({ "Tree 0": { "Feature Name": "x" } }))
            .unwrap_err();
        assert!(matches!(
            err,
            ForestError::InvalidNodeField {
                field: "Split Value"
            }
        ));
    }

    #[test]
    fn load_rejects_mistyped_feature_name() {
        let mut forest = IsolationForestConfig::new(1).unwrap().build();
        let err = forest
            .load(&json!({ "Tree 0": { "Feature Name": 4, "Split Value": 1.0 } }))
            .unwrap_err();
        assert!(matches!(
            err,
            ForestError::InvalidNodeField {
                field: "Feature Name"
            }
        ));
    }

    // --- file persistence ---

    #[test]
    fn file_round_trip_identical_scores() {
        let dir = TempDir::new().unwrap();
        let model_path = dir.path().join("forest.json");

        let forest = trained_forest();
        forest.save(&model_path).unwrap();

        let mut restored = IsolationForestConfig::new(1).unwrap().build();
        restored.load_file(&model_path).unwrap();

        for i in 0..20 {
            let sample = sample_xy(f64::from(i), f64::from(i));
            assert!(
                (forest.normalized_score(&sample) - restored.normalized_score(&sample)).abs()
                    < 1e-12
            );
        }
    }

    #[test]
    fn load_nonexistent_file_error() {
        let mut forest = IsolationForestConfig::new(1).unwrap().build();
        let err = forest
            .load_file("/tmp/nonexistent_forest_abc123.json")
            .unwrap_err();
        assert!(matches!(err, ForestError::ReadModel { .. }));
    }

    #[test]
    fn load_corrupt_file_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.json");
        std::fs::write(&path, b"not valid json").unwrap();

        let mut forest = IsolationForestConfig::new(1).unwrap().build();
        let err = forest.load_file(&path).unwrap_err();
        assert!(matches!(err, ForestError::DeserializeModel { .. }));
    }

    #[test]
    fn serde_serialize_matches_dump() {
        let forest = trained_forest();
        let serialized = serde_json::to_value(&forest).unwrap();
        assert_eq!(serialized, Value::Object(forest.dump()));
    }
}
