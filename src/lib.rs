//! Isolation Forest anomaly detection: ingest, build, score.
//!
//! Provides an Isolation Forest over named-feature samples, with randomized
//! value-domain partitioning, path-length scoring (including a fallback for
//! samples missing a feature a tree splits on), score normalization per the
//! original paper's formula, parallel tree construction via rayon, and a
//! JSON-serializable forest representation.
//!
//! ```
//! use isoforest::{Feature, IsolationForestConfig, Sample};
//!
//! let mut forest = IsolationForestConfig::new(10)?
//!     .with_sub_sampling_size(Some(10))
//!     .with_seed(42)
//!     .build();
//!
//! for i in 0..50 {
//!     let mut sample = Sample::new(format!("training {i}"));
//!     sample.add_feature(Feature::new("x", f64::from(i % 25)));
//!     sample.add_feature(Feature::new("y", f64::from((i * 7) % 25)));
//!     forest.add_sample(&sample);
//! }
//! forest.create();
//!
//! let mut outlier = Sample::new("outlier");
//! outlier.add_features(vec![Feature::new("x", 40.0), Feature::new("y", 40.0)]);
//! let score = forest.normalized_score(&outlier);
//! assert!((0.0..=1.0).contains(&score));
//! # Ok::<(), isoforest::ForestError>(())
//! ```

mod config;
mod error;
mod forest;
mod node;
mod sample;
mod score;
mod serialize;
mod tree;

pub use config::IsolationForestConfig;
pub use error::ForestError;
pub use forest::{FeatureValuesMap, IsolationForest};
pub use node::{Node, NodeLink};
pub use sample::{Feature, FeatureList, Sample};
