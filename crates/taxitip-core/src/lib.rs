//! Feature schema and model input declarations for the taxi tip classifier.
//!
//! This crate describes the input contract of a tabular binary classifier and
//! turns it into symbolic model inputs. It includes:
//!
//! - **Feature schema**: an immutable, validated registry of numerical,
//!   one-hot categorical and embedding categorical features plus the label.
//! - **Input builder**: maps the schema to an ordered map of typed, scalar
//!   placeholders keyed by feature name.
//! - **Error types**: structured schema inconsistencies, reported when the
//!   schema is built.
//!
//! # Example
//!
//! ```
//! use taxitip_core::{build_inputs, DType, FeatureSchema};
//!
//! let schema = FeatureSchema::taxi_tips();
//! let inputs = build_inputs(&schema);
//!
//! assert_eq!(inputs.len(), 11);
//! assert_eq!(inputs.numeric().count(), 3);
//! assert!(inputs.categorical().all(|p| p.dtype() == DType::I64));
//! assert_eq!(schema.target_spec().label_index("tip>=20%"), Some(1));
//! ```
//!
//! # Modules
//!
//! - [`dtype`]: Element types and per-example shapes.
//! - [`feature`]: Feature roles, feature specs and the target spec.
//! - [`schema`]: The feature schema registry and its JSON config form.
//! - [`input`]: Placeholders and the input builder.
//! - [`error`]: Error types for the library.

pub mod dtype;
pub mod error;
pub mod feature;
pub mod input;
pub mod schema;

pub use dtype::{DType, Shape};
pub use error::{Result, SchemaInconsistency, TaxitipError};
pub use feature::{FeatureRole, FeatureSpec, TargetSpec};
pub use input::{
    build_inputs, CategoricalEncoding, InputSlot, InputTensorMap, Placeholder, PlaceholderId,
    PlaceholderInfo,
};
pub use schema::{EmbeddingFeatureConfig, FeatureSchema, FeatureSchemaBuilder, SchemaConfig};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_reexports() {
        let _role = FeatureRole::Numerical;
        let _spec = FeatureSpec::onehot("payment_type");
        let _shape = Shape::scalar();
        let schema: FeatureSchema = FeatureSchema::taxi_tips();
        let inputs: InputTensorMap = build_inputs(&schema);
        assert_eq!(inputs.len(), schema.num_features());

        let _err: Result<()> = Ok(());
    }

    #[test]
    fn test_integration_workflow() {
        // 1. Load a custom schema from its config form
        let json = r#"{
            "numerical_features": ["fare"],
            "embedding_categorical_features": [
                {"name": "pickup_grid", "encoding_width": 3}
            ],
            "onehot_categorical_features": ["payment_type"],
            "target": {"name": "tip_bin", "labels": ["tip<20%", "tip>=20%"]},
            "feature_order": ["payment_type", "fare", "pickup_grid"]
        }"#;
        let schema = FeatureSchema::from_json_str(json).unwrap();
        assert_eq!(schema.feature_names(), &["payment_type", "fare", "pickup_grid"]);

        // 2. Build inputs and bind them by name
        let inputs = build_inputs(&schema);
        assert_eq!(inputs.len(), 3);
        for name in schema.feature_names() {
            let placeholder = inputs.get(name).unwrap();
            let role = schema.role_of(name).unwrap();
            assert_eq!(placeholder.dtype().is_integer(), role.is_categorical());
        }

        // 3. Map labels to class indices
        let target = schema.target_spec();
        assert_eq!(target.label_index("tip<20%"), Some(0));
        assert_eq!(target.label_index("tip>=20%"), Some(1));

        // 4. A schema breaking role disjointness never gets built
        let bad = json.replace("\"fare\"]", "\"payment_type\"]");
        let err = FeatureSchema::from_json_str(&bad).unwrap_err();
        assert!(matches!(
            err,
            TaxitipError::SchemaInconsistency(SchemaInconsistency::DuplicateFeature { .. })
        ));
    }
}
