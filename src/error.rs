use std::path::PathBuf;

/// Errors from Isolation Forest operations.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when num_trees is zero.
    #[error("num_trees must be at least 1, got {num_trees}")]
    InvalidTreeCount {
        /// The invalid num_trees value provided.
        num_trees: usize,
    },

    /// Returned when a forest rendering is not a JSON object.
    #[error("forest data must be a JSON object")]
    NonObjectDump,

    /// Returned when a key in a forest rendering is not a `Tree <index>` label.
    #[error("unrecognized tree label {label:?}")]
    InvalidTreeLabel {
        /// The offending label.
        label: String,
    },

    /// Returned when a tree node rendering is not a JSON object.
    #[error("tree node must be a JSON object")]
    NonObjectNode,

    /// Returned when a node field is missing or has the wrong type.
    #[error("tree node field {field:?} is missing or mistyped")]
    InvalidNodeField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// Returned when forest serialization fails.
    #[error("failed to serialize forest")]
    SerializeModel {
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when forest deserialization fails.
    #[error("failed to deserialize forest from {path}")]
    DeserializeModel {
        /// Path to the forest file that could not be parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when writing the forest file fails.
    #[error("failed to write forest to {path}")]
    WriteModel {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when reading the forest file fails.
    #[error("failed to read forest from {path}")]
    ReadModel {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
