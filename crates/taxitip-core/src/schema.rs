//! The feature schema registry.
//!
//! A [`FeatureSchema`] is the authoritative, immutable description of the
//! model's input contract: which columns are numerical, which are categorical
//! ids routed through an embedding or a one-hot encoding, and which column is
//! the label. Every invariant is checked when the schema is built, so a
//! `FeatureSchema` value is always consistent.
//!
//! # Example
//!
//! ```
//! use taxitip_core::feature::TargetSpec;
//! use taxitip_core::schema::FeatureSchema;
//!
//! let schema = FeatureSchema::builder()
//!     .numerical("trip_miles")
//!     .embedding("pickup_grid", 3)
//!     .onehot("payment_type")
//!     .target(TargetSpec::new("tip_bin", ["tip<20%", "tip>=20%"]))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.num_features(), 3);
//! assert_eq!(schema.encoding_width("pickup_grid"), Some(3));
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SchemaInconsistency, TaxitipError};
use crate::feature::{FeatureRole, FeatureSpec, TargetSpec};

const TAXI_NUMERICAL: [&str; 3] = ["trip_seconds", "trip_miles", "euclidean"];

const TAXI_EMBEDDING: [(&str, usize); 6] = [
    ("trip_month", 2),
    ("trip_day", 4),
    ("trip_hour", 3),
    ("pickup_grid", 3),
    ("dropoff_grid", 3),
    ("loc_cross", 10),
];

const TAXI_ONEHOT: [&str; 2] = ["payment_type", "trip_day_of_week"];

const TAXI_FEATURE_ORDER: [&str; 11] = [
    "trip_month",
    "trip_day",
    "trip_day_of_week",
    "trip_hour",
    "trip_seconds",
    "trip_miles",
    "payment_type",
    "pickup_grid",
    "dropoff_grid",
    "euclidean",
    "loc_cross",
];

const TAXI_TARGET: &str = "tip_bin";
const TAXI_LABELS: [&str; 2] = ["tip<20%", "tip>=20%"];

/// Immutable description of every model input and the label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    numerical: Vec<String>,
    embedding: Vec<(String, usize)>,
    onehot: Vec<String>,
    target: TargetSpec,
    /// Column order of the raw input, a permutation of all features.
    feature_order: Vec<String>,
    roles: HashMap<String, FeatureRole>,
}

impl FeatureSchema {
    /// Creates a builder for a custom schema.
    pub fn builder() -> FeatureSchemaBuilder {
        FeatureSchemaBuilder::new()
    }

    /// The built-in schema of the taxi tip classifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use taxitip_core::schema::FeatureSchema;
    ///
    /// let schema = FeatureSchema::taxi_tips();
    /// assert_eq!(schema.num_features(), 11);
    /// assert_eq!(schema.target_spec().name(), "tip_bin");
    /// ```
    pub fn taxi_tips() -> Self {
        let numerical: Vec<String> = TAXI_NUMERICAL.iter().map(|s| s.to_string()).collect();
        let embedding: Vec<(String, usize)> = TAXI_EMBEDDING
            .iter()
            .map(|(name, width)| (name.to_string(), *width))
            .collect();
        let onehot: Vec<String> = TAXI_ONEHOT.iter().map(|s| s.to_string()).collect();
        let feature_order: Vec<String> =
            TAXI_FEATURE_ORDER.iter().map(|s| s.to_string()).collect();

        // The tables above are consistent; `validate` re-checks them in tests.
        let roles = role_table(&numerical, &embedding, &onehot);
        Self {
            numerical,
            embedding,
            onehot,
            target: TargetSpec::new(TAXI_TARGET, TAXI_LABELS),
            feature_order,
            roles,
        }
    }

    /// Returns the numerical feature names in declaration order.
    #[inline]
    pub fn numerical_features(&self) -> &[String] {
        &self.numerical
    }

    /// Returns the embedding features as `(name, encoding width)` pairs in
    /// declaration order.
    #[inline]
    pub fn embedding_categorical_features(&self) -> &[(String, usize)] {
        &self.embedding
    }

    /// Returns the one-hot categorical feature names in declaration order.
    #[inline]
    pub fn onehot_categorical_features(&self) -> &[String] {
        &self.onehot
    }

    /// Returns the label column and its ordered class labels.
    #[inline]
    pub fn target_spec(&self) -> &TargetSpec {
        &self.target
    }

    /// Returns the column order of the raw input.
    #[inline]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_order
    }

    /// Returns the total number of input features (the target excluded).
    #[inline]
    pub fn num_features(&self) -> usize {
        self.numerical.len() + self.embedding.len() + self.onehot.len()
    }

    /// Returns the role of `name`, or `None` if it is not an input feature.
    pub fn role_of(&self, name: &str) -> Option<FeatureRole> {
        self.roles.get(name).copied()
    }

    /// Returns the encoding width of an embedding feature.
    pub fn encoding_width(&self, name: &str) -> Option<usize> {
        self.embedding
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, width)| *width)
    }

    /// Iterates over all features: numerical, then embedding, then one-hot.
    pub fn feature_specs(&self) -> impl Iterator<Item = FeatureSpec> + '_ {
        let numerical = self.numerical.iter().map(FeatureSpec::numerical);
        let embedding = self
            .embedding
            .iter()
            .map(|(name, width)| FeatureSpec::embedding(name, *width));
        let onehot = self.onehot.iter().map(FeatureSpec::onehot);
        numerical.chain(embedding).chain(onehot)
    }

    /// Re-checks every schema invariant.
    pub fn validate(&self) -> Result<()> {
        check_parts(
            &self.numerical,
            &self.embedding,
            &self.onehot,
            &self.target,
            &self.feature_order,
        )
        .map(|_| ())
    }

    /// Parses and validates a schema from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SchemaConfig = serde_json::from_str(json)?;
        config.into_schema()
    }

    /// Reads, parses and validates a schema file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading feature schema from {:?}", path);
        let json = std::fs::read_to_string(path).map_err(|source| TaxitipError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Serializes the schema as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&SchemaConfig::from(self))?)
    }
}

/// Builder for [`FeatureSchema`].
#[derive(Debug, Default)]
pub struct FeatureSchemaBuilder {
    numerical: Vec<String>,
    embedding: Vec<(String, Option<usize>)>,
    onehot: Vec<String>,
    target: Option<TargetSpec>,
    feature_order: Option<Vec<String>>,
    /// Widths given to numerical or one-hot specs, rejected by `build`.
    stray_widths: Vec<(String, FeatureRole, usize)>,
}

impl FeatureSchemaBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a numerical feature.
    pub fn numerical(mut self, name: impl Into<String>) -> Self {
        self.numerical.push(name.into());
        self
    }

    /// Declares an embedding categorical feature.
    pub fn embedding(mut self, name: impl Into<String>, encoding_width: usize) -> Self {
        self.embedding.push((name.into(), Some(encoding_width)));
        self
    }

    /// Declares an embedding feature whose width may be absent, as in a
    /// config file.
    fn embedding_with_optional_width(
        mut self,
        name: impl Into<String>,
        encoding_width: Option<usize>,
    ) -> Self {
        self.embedding.push((name.into(), encoding_width));
        self
    }

    /// Declares a one-hot categorical feature.
    pub fn onehot(mut self, name: impl Into<String>) -> Self {
        self.onehot.push(name.into());
        self
    }

    /// Declares any feature from its spec.
    pub fn feature(mut self, spec: FeatureSpec) -> Self {
        if spec.role() != FeatureRole::EmbeddingCategorical {
            if let Some(width) = spec.encoding_width() {
                self.stray_widths
                    .push((spec.name().to_string(), spec.role(), width));
            }
        }
        match spec.role() {
            FeatureRole::Numerical => self.numerical(spec.name()),
            FeatureRole::OnehotCategorical => self.onehot(spec.name()),
            FeatureRole::EmbeddingCategorical => {
                self.embedding_with_optional_width(spec.name(), spec.encoding_width())
            }
        }
    }

    /// Sets the label column.
    pub fn target(mut self, target: TargetSpec) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the raw column order. Defaults to numerical, embedding, one-hot.
    pub fn feature_order<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_order = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Builds the schema, failing on the first inconsistency found.
    pub fn build(self) -> Result<FeatureSchema> {
        let target = self.target.ok_or_else(|| SchemaInconsistency::InvalidTarget {
            message: "no target declared".to_string(),
        })?;

        if let Some((name, role, width)) = self.stray_widths.into_iter().next() {
            return Err(SchemaInconsistency::UnexpectedEncodingWidth { name, role, width }.into());
        }

        let mut embedding = Vec::with_capacity(self.embedding.len());
        for (name, width) in self.embedding {
            match width {
                Some(width) => embedding.push((name, width)),
                None => return Err(SchemaInconsistency::MissingEncodingWidth { name }.into()),
            }
        }

        let feature_order = self.feature_order.unwrap_or_else(|| {
            self.numerical
                .iter()
                .chain(embedding.iter().map(|(name, _)| name))
                .chain(self.onehot.iter())
                .cloned()
                .collect()
        });

        let roles = check_parts(
            &self.numerical,
            &embedding,
            &self.onehot,
            &target,
            &feature_order,
        )?;

        debug!(
            numerical = self.numerical.len(),
            embedding = embedding.len(),
            onehot = self.onehot.len(),
            "Built feature schema"
        );

        Ok(FeatureSchema {
            numerical: self.numerical,
            embedding,
            onehot: self.onehot,
            target,
            feature_order,
            roles,
        })
    }
}

fn role_table(
    numerical: &[String],
    embedding: &[(String, usize)],
    onehot: &[String],
) -> HashMap<String, FeatureRole> {
    numerical
        .iter()
        .map(|n| (n.clone(), FeatureRole::Numerical))
        .chain(
            embedding
                .iter()
                .map(|(n, _)| (n.clone(), FeatureRole::EmbeddingCategorical)),
        )
        .chain(
            onehot
                .iter()
                .map(|n| (n.clone(), FeatureRole::OnehotCategorical)),
        )
        .collect()
}

/// Checks all invariants and returns the name to role table.
fn check_parts(
    numerical: &[String],
    embedding: &[(String, usize)],
    onehot: &[String],
    target: &TargetSpec,
    feature_order: &[String],
) -> Result<HashMap<String, FeatureRole>> {
    target.validate()?;

    let declared = numerical
        .iter()
        .map(|n| (n.as_str(), FeatureRole::Numerical))
        .chain(
            embedding
                .iter()
                .map(|(n, _)| (n.as_str(), FeatureRole::EmbeddingCategorical)),
        )
        .chain(
            onehot
                .iter()
                .map(|n| (n.as_str(), FeatureRole::OnehotCategorical)),
        );

    let mut roles: HashMap<String, FeatureRole> = HashMap::new();
    for (name, role) in declared {
        if name.is_empty() {
            return Err(SchemaInconsistency::EmptyFeatureName { role }.into());
        }
        if let Some(&first) = roles.get(name) {
            return Err(SchemaInconsistency::DuplicateFeature {
                name: name.to_string(),
                first,
                second: role,
            }
            .into());
        }
        roles.insert(name.to_string(), role);
    }

    if roles.is_empty() {
        return Err(SchemaInconsistency::EmptySchema.into());
    }

    for (name, width) in embedding {
        if *width == 0 {
            return Err(SchemaInconsistency::InvalidEncodingWidth {
                name: name.clone(),
                width: *width,
            }
            .into());
        }
    }

    if let Some(&role) = roles.get(target.name()) {
        return Err(SchemaInconsistency::TargetIsFeature {
            name: target.name().to_string(),
            role,
        }
        .into());
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(feature_order.len());
    let mut unexpected = Vec::new();
    for name in feature_order {
        if !roles.contains_key(name.as_str()) || !seen.insert(name.as_str()) {
            unexpected.push(name.clone());
        }
    }
    let mut missing: Vec<String> = roles
        .keys()
        .filter(|name| !seen.contains(name.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() || !unexpected.is_empty() {
        missing.sort();
        return Err(SchemaInconsistency::FeatureOrderMismatch {
            missing,
            unexpected,
        }
        .into());
    }

    Ok(roles)
}

/// On-disk JSON form of a [`FeatureSchema`].
///
/// Embedding features are a list rather than an object so their declaration
/// order survives a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Numerical feature names.
    #[serde(default)]
    pub numerical_features: Vec<String>,

    /// Embedding features with their encoding widths.
    #[serde(default)]
    pub embedding_categorical_features: Vec<EmbeddingFeatureConfig>,

    /// One-hot categorical feature names.
    #[serde(default)]
    pub onehot_categorical_features: Vec<String>,

    /// The label column.
    pub target: TargetSpec,

    /// Raw column order; defaults to the declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_order: Option<Vec<String>>,
}

/// One embedding feature in a [`SchemaConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingFeatureConfig {
    /// Feature name.
    pub name: String,
    /// Encoding width; required, but optional here so its absence is
    /// reported as a schema inconsistency rather than a parse error.
    #[serde(default)]
    pub encoding_width: Option<usize>,
}

impl SchemaConfig {
    /// Validates the config and turns it into a schema.
    pub fn into_schema(self) -> Result<FeatureSchema> {
        let mut builder = FeatureSchema::builder().target(self.target);
        for name in self.numerical_features {
            builder = builder.numerical(name);
        }
        for feature in self.embedding_categorical_features {
            builder = builder.embedding_with_optional_width(feature.name, feature.encoding_width);
        }
        for name in self.onehot_categorical_features {
            builder = builder.onehot(name);
        }
        if let Some(order) = self.feature_order {
            builder = builder.feature_order(order);
        }
        builder.build()
    }
}

impl From<&FeatureSchema> for SchemaConfig {
    fn from(schema: &FeatureSchema) -> Self {
        Self {
            numerical_features: schema.numerical.clone(),
            embedding_categorical_features: schema
                .embedding
                .iter()
                .map(|(name, width)| EmbeddingFeatureConfig {
                    name: name.clone(),
                    encoding_width: Some(*width),
                })
                .collect(),
            onehot_categorical_features: schema.onehot.clone(),
            target: schema.target.clone(),
            feature_order: Some(schema.feature_order.clone()),
        }
    }
}
