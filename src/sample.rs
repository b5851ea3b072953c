/// A named numeric feature attached to a [`Sample`].
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    name: String,
    value: f64,
}

impl Feature {
    /// Create a new named feature.
    #[must_use]
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Return the feature name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the feature value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// An ordered list of features.
pub type FeatureList = Vec<Feature>;

/// An identified bag of named numeric features.
///
/// The name is diagnostic only and plays no part in scoring. Features keep
/// their insertion order; a well-formed sample supplies each feature name at
/// most once, and lookup by name returns the first match.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    name: String,
    features: FeatureList,
}

impl Sample {
    /// Create a new, featureless sample.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: FeatureList::new(),
        }
    }

    /// Append one feature to the sample.
    pub fn add_feature(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    /// Append several features, preserving their order.
    pub fn add_features(&mut self, features: FeatureList) {
        self.features.extend(features);
    }

    /// Look up a feature value by name (first match).
    #[must_use]
    pub fn feature_value(&self, name: &str) -> Option<f64> {
        self.features
            .iter()
            .find(|feature| feature.name() == name)
            .map(Feature::value)
    }

    /// Return the sample's features in insertion order.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Return the sample's diagnostic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
