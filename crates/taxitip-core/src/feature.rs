//! Feature and target descriptions.
//!
//! - [`FeatureRole`]: how a feature is consumed by the model.
//! - [`FeatureSpec`]: one input column with its role and, for embedding
//!   features, the encoding width.
//! - [`TargetSpec`]: the label column and its ordered class labels.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaInconsistency};

/// How a feature is fed into the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureRole {
    /// A raw real-valued scalar.
    Numerical,
    /// A category id expanded to an indicator vector (or used as a raw index).
    OnehotCategorical,
    /// A category id looked up in a learned embedding table.
    EmbeddingCategorical,
}

impl FeatureRole {
    /// Returns the snake_case name of this role.
    pub fn name(&self) -> &'static str {
        match self {
            FeatureRole::Numerical => "numerical",
            FeatureRole::OnehotCategorical => "onehot_categorical",
            FeatureRole::EmbeddingCategorical => "embedding_categorical",
        }
    }

    /// Returns whether features of this role are category ids.
    #[inline]
    pub fn is_categorical(&self) -> bool {
        !matches!(self, FeatureRole::Numerical)
    }
}

impl fmt::Display for FeatureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single input feature.
///
/// # Examples
///
/// ```
/// use taxitip_core::feature::{FeatureRole, FeatureSpec};
///
/// let spec = FeatureSpec::embedding("loc_cross", 10);
/// assert_eq!(spec.role(), FeatureRole::EmbeddingCategorical);
/// assert_eq!(spec.encoding_width(), Some(10));
/// assert_eq!(FeatureSpec::numerical("trip_miles").encoding_width(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    name: String,
    role: FeatureRole,
    encoding_width: Option<usize>,
}

impl FeatureSpec {
    /// Creates a numerical feature.
    pub fn numerical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: FeatureRole::Numerical,
            encoding_width: None,
        }
    }

    /// Creates a one-hot categorical feature.
    pub fn onehot(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: FeatureRole::OnehotCategorical,
            encoding_width: None,
        }
    }

    /// Creates an embedding categorical feature with its encoding width.
    pub fn embedding(name: impl Into<String>, encoding_width: usize) -> Self {
        Self {
            name: name.into(),
            role: FeatureRole::EmbeddingCategorical,
            encoding_width: Some(encoding_width),
        }
    }

    /// Returns the feature name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the feature role.
    #[inline]
    pub fn role(&self) -> FeatureRole {
        self.role
    }

    /// Returns the encoding width; only embedding features have one.
    #[inline]
    pub fn encoding_width(&self) -> Option<usize> {
        self.encoding_width
    }
}

/// The label column of a classification task.
///
/// The position of a label in [`labels`](TargetSpec::labels) is its class
/// index.
///
/// # Examples
///
/// ```
/// use taxitip_core::feature::TargetSpec;
///
/// let target = TargetSpec::new("tip_bin", ["tip<20%", "tip>=20%"]);
/// assert_eq!(target.label_index("tip>=20%"), Some(1));
/// assert_eq!(target.label_at(0), Some("tip<20%"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSpec {
    name: String,
    labels: Vec<String>,
}

impl TargetSpec {
    /// Creates a target spec. Call [`validate`](Self::validate) before use;
    /// [`FeatureSchemaBuilder::build`](crate::schema::FeatureSchemaBuilder::build)
    /// does so.
    pub fn new<I, S>(name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the label column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the class labels in index order.
    #[inline]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the number of classes.
    #[inline]
    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }

    /// Returns the class index of `label`.
    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Returns the label at class index `index`.
    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Checks the name is set and the labels are at least two, non-empty and
    /// distinct.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(invalid_target("target name must not be empty").into());
        }
        if self.labels.len() < 2 {
            return Err(invalid_target(format!(
                "target '{}' needs at least 2 labels, got {}",
                self.name,
                self.labels.len()
            ))
            .into());
        }

        let mut seen = HashSet::with_capacity(self.labels.len());
        for label in &self.labels {
            if label.is_empty() {
                return Err(invalid_target(format!(
                    "target '{}' has an empty label",
                    self.name
                ))
                .into());
            }
            if !seen.insert(label.as_str()) {
                return Err(invalid_target(format!(
                    "target '{}' repeats label '{}'",
                    self.name, label
                ))
                .into());
            }
        }
        Ok(())
    }
}

fn invalid_target(message: impl Into<String>) -> SchemaInconsistency {
    SchemaInconsistency::InvalidTarget {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaxitipError;

    #[test]
    fn test_feature_role() {
        assert_eq!(FeatureRole::Numerical.to_string(), "numerical");
        assert!(!FeatureRole::Numerical.is_categorical());
        assert!(FeatureRole::OnehotCategorical.is_categorical());
        assert!(FeatureRole::EmbeddingCategorical.is_categorical());

        let role: FeatureRole = serde_json::from_str("\"onehot_categorical\"").unwrap();
        assert_eq!(role, FeatureRole::OnehotCategorical);
    }

    #[test]
    fn test_feature_spec_constructors() {
        let numerical = FeatureSpec::numerical("trip_seconds");
        assert_eq!(numerical.name(), "trip_seconds");
        assert_eq!(numerical.role(), FeatureRole::Numerical);
        assert!(numerical.encoding_width().is_none());

        let onehot = FeatureSpec::onehot("payment_type");
        assert_eq!(onehot.role(), FeatureRole::OnehotCategorical);
        assert!(onehot.encoding_width().is_none());

        let embedding = FeatureSpec::embedding("trip_day", 4);
        assert_eq!(embedding.role(), FeatureRole::EmbeddingCategorical);
        assert_eq!(embedding.encoding_width(), Some(4));
    }

    #[test]
    fn test_target_label_mapping() {
        let target = TargetSpec::new("tip_bin", ["tip<20%", "tip>=20%"]);
        assert_eq!(target.name(), "tip_bin");
        assert_eq!(target.num_classes(), 2);
        assert_eq!(target.label_index("tip<20%"), Some(0));
        assert_eq!(target.label_index("tip>=20%"), Some(1));
        assert_eq!(target.label_index("tip=0"), None);
        assert_eq!(target.label_at(1), Some("tip>=20%"));
        assert_eq!(target.label_at(2), None);
        assert!(target.validate().is_ok());
    }

    #[test]
    fn test_target_rejects_unknown_fields() {
        let json = r#"{"name": "tip_bin", "labels": ["a", "b"], "lables": ["c"]}"#;
        assert!(serde_json::from_str::<TargetSpec>(json).is_err());

        let json = r#"{"name": "tip_bin", "labels": ["a", "b"]}"#;
        let target: TargetSpec = serde_json::from_str(json).unwrap();
        assert_eq!(target.num_classes(), 2);
    }

    #[test]
    fn test_target_validate_rejects_bad_labels() {
        let cases = [
            TargetSpec::new("", ["a", "b"]),
            TargetSpec::new("tip_bin", ["only"]),
            TargetSpec::new("tip_bin", ["a", ""]),
            TargetSpec::new("tip_bin", ["a", "a"]),
        ];
        for target in cases {
            let err = target.validate().unwrap_err();
            assert!(
                matches!(
                    err,
                    TaxitipError::SchemaInconsistency(SchemaInconsistency::InvalidTarget { .. })
                ),
                "unexpected error for {:?}: {}",
                target,
                err
            );
        }
    }
}
