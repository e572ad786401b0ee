//! Error types for the taxitip core library.
//!
//! Schema problems are detected eagerly when a [`FeatureSchema`] is built or
//! loaded, and surface as [`TaxitipError::SchemaInconsistency`].
//!
//! [`FeatureSchema`]: crate::schema::FeatureSchema

use thiserror::Error;

use crate::feature::FeatureRole;

/// The ways a feature schema can contradict itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaInconsistency {
    /// A feature name is declared more than once, within one role table or
    /// across two of them.
    #[error("feature '{name}' declared as {first} and again as {second}")]
    DuplicateFeature {
        /// The repeated feature name.
        name: String,
        /// The role of the first declaration.
        first: FeatureRole,
        /// The role of the conflicting declaration.
        second: FeatureRole,
    },

    /// An embedding feature has no encoding width.
    #[error("embedding feature '{name}' is missing its encoding width")]
    MissingEncodingWidth {
        /// The embedding feature name.
        name: String,
    },

    /// A numerical or one-hot feature was given an encoding width.
    #[error("{role} feature '{name}' must not have an encoding width (got {width})")]
    UnexpectedEncodingWidth {
        /// The feature name.
        name: String,
        /// The feature's role.
        role: FeatureRole,
        /// The stray width.
        width: usize,
    },

    /// An embedding feature has a zero encoding width.
    #[error("embedding feature '{name}' has invalid encoding width {width}")]
    InvalidEncodingWidth {
        /// The embedding feature name.
        name: String,
        /// The rejected width.
        width: usize,
    },

    /// A feature was declared with an empty name.
    #[error("feature name must not be empty ({role})")]
    EmptyFeatureName {
        /// The role table holding the empty name.
        role: FeatureRole,
    },

    /// The target column is also declared as an input feature.
    #[error("target '{name}' is also declared as a {role} feature")]
    TargetIsFeature {
        /// The target name.
        name: String,
        /// The role it was declared with.
        role: FeatureRole,
    },

    /// The explicit column order does not list exactly the declared features.
    #[error("feature order mismatch: missing {missing:?}, unexpected {unexpected:?}")]
    FeatureOrderMismatch {
        /// Declared features absent from the order.
        missing: Vec<String>,
        /// Names in the order that are not declared features (or repeats).
        unexpected: Vec<String>,
    },

    /// The schema declares no input features at all.
    #[error("schema declares no input features")]
    EmptySchema,

    /// The target spec is malformed.
    #[error("invalid target: {message}")]
    InvalidTarget {
        /// A description of the problem.
        message: String,
    },
}

/// The main error type for taxitip-core operations.
#[derive(Debug, Error)]
pub enum TaxitipError {
    /// The schema violates one of its invariants.
    #[error("Schema inconsistency: {0}")]
    SchemaInconsistency(#[from] SchemaInconsistency),

    /// Well-formed JSON whose fields do not match the schema config layout.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// A description of the configuration error.
        message: String,
    },

    /// Error when serialization or deserialization fails.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// A description of the serialization error.
        message: String,
    },

    /// Error reading or writing a schema file.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file being accessed.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl From<serde_json::Error> for TaxitipError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Data => TaxitipError::ConfigError {
                message: err.to_string(),
            },
            _ => TaxitipError::SerializationError {
                message: err.to_string(),
            },
        }
    }
}

/// A specialized Result type for taxitip-core operations.
pub type Result<T> = std::result::Result<T, TaxitipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TaxitipError::from(SchemaInconsistency::DuplicateFeature {
            name: "trip_day".to_string(),
            first: FeatureRole::EmbeddingCategorical,
            second: FeatureRole::OnehotCategorical,
        });
        assert_eq!(
            err.to_string(),
            "Schema inconsistency: feature 'trip_day' declared as embedding_categorical \
             and again as onehot_categorical"
        );

        let err = TaxitipError::from(SchemaInconsistency::MissingEncodingWidth {
            name: "loc_cross".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Schema inconsistency: embedding feature 'loc_cross' is missing its encoding width"
        );

        let err = TaxitipError::ConfigError {
            message: "missing field".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: TaxitipError = parse.unwrap_err().into();
        assert!(matches!(err, TaxitipError::SerializationError { .. }));

        let parse: std::result::Result<Vec<String>, _> = serde_json::from_str("{}");
        let err: TaxitipError = parse.unwrap_err().into();
        assert!(matches!(err, TaxitipError::ConfigError { .. }));
    }
}
