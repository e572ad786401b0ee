//! Symbolic model inputs built from a [`FeatureSchema`].
//!
//! [`build_inputs`] creates one scalar placeholder per input feature:
//! numerical features become [`Placeholder::Numeric`] (`float32`), embedding
//! and one-hot features become [`Placeholder::CategoricalIndex`] (`int64`).
//! The result is an [`InputTensorMap`] keyed by feature name, which the model
//! assembly stage binds to input columns by name.
//!
//! # Example
//!
//! ```
//! use taxitip_core::dtype::DType;
//! use taxitip_core::input::build_inputs;
//! use taxitip_core::schema::FeatureSchema;
//!
//! let schema = FeatureSchema::taxi_tips();
//! let inputs = build_inputs(&schema);
//!
//! assert_eq!(inputs.len(), 11);
//! assert_eq!(inputs.get("trip_miles").unwrap().dtype(), DType::F32);
//! assert_eq!(inputs.get("payment_type").unwrap().dtype(), DType::I64);
//! assert!(inputs.get("tip_bin").is_none());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::debug;

use crate::dtype::{DType, Shape};
use crate::schema::FeatureSchema;

static NEXT_PLACEHOLDER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a placeholder.
///
/// Two builds over the same schema yield structurally equal maps whose
/// placeholders have different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PlaceholderId(u64);

impl PlaceholderId {
    fn next() -> Self {
        PlaceholderId(NEXT_PLACEHOLDER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input_{}", self.0)
    }
}

/// How a categorical id is expanded downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CategoricalEncoding {
    /// Looked up in an embedding table of the given width.
    Embedding {
        /// Encoding width (embedding size or bucket count).
        width: usize,
    },
    /// Expanded to an indicator vector.
    OneHot,
}

/// Name, identity and per-example shape shared by every placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSlot {
    id: PlaceholderId,
    name: String,
    shape: Shape,
}

impl InputSlot {
    fn scalar(name: &str) -> Self {
        Self {
            id: PlaceholderId::next(),
            name: name.to_string(),
            shape: Shape::scalar(),
        }
    }
}

/// A named, typed slot for one input column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// A real-valued scalar per example.
    Numeric(InputSlot),
    /// A raw category id per example.
    CategoricalIndex {
        /// Name, identity and shape.
        slot: InputSlot,
        /// The downstream encoding of the id.
        encoding: CategoricalEncoding,
    },
}

impl Placeholder {
    fn slot(&self) -> &InputSlot {
        match self {
            Placeholder::Numeric(slot) => slot,
            Placeholder::CategoricalIndex { slot, .. } => slot,
        }
    }

    /// Returns the feature name this placeholder binds to.
    #[inline]
    pub fn name(&self) -> &str {
        &self.slot().name
    }

    /// Returns the placeholder identity.
    #[inline]
    pub fn id(&self) -> PlaceholderId {
        self.slot().id
    }

    /// Returns the per-example shape; always scalar for built inputs.
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.slot().shape
    }

    /// Returns the element type.
    pub fn dtype(&self) -> DType {
        match self {
            Placeholder::Numeric(_) => DType::F32,
            Placeholder::CategoricalIndex { .. } => DType::I64,
        }
    }

    /// Returns the categorical encoding, or `None` for numeric inputs.
    pub fn encoding(&self) -> Option<CategoricalEncoding> {
        match self {
            Placeholder::Numeric(_) => None,
            Placeholder::CategoricalIndex { encoding, .. } => Some(*encoding),
        }
    }

    /// Returns whether this is a numeric input.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        self.dtype().is_float()
    }

    /// Compares everything except identity.
    pub fn same_structure(&self, other: &Placeholder) -> bool {
        self.name() == other.name()
            && self.dtype() == other.dtype()
            && self.shape() == other.shape()
            && self.encoding() == other.encoding()
    }

    /// Returns a serializable description of this placeholder.
    pub fn describe(&self) -> PlaceholderInfo {
        PlaceholderInfo {
            name: self.name().to_string(),
            kind: if self.is_numeric() {
                "numeric"
            } else {
                "categorical_index"
            },
            dtype: self.dtype(),
            shape: self.shape().as_slice().to_vec(),
            encoding: self.encoding(),
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Placeholder shape={}, dtype={}, name={}",
            self.shape(),
            self.dtype(),
            self.name()
        )?;
        match self.encoding() {
            Some(CategoricalEncoding::Embedding { width }) => write!(f, ", embedding={}>", width),
            Some(CategoricalEncoding::OneHot) => write!(f, ", onehot>"),
            None => write!(f, ">"),
        }
    }
}

/// Serializable view of a [`Placeholder`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceholderInfo {
    /// Feature name.
    pub name: String,
    /// `numeric` or `categorical_index`.
    pub kind: &'static str,
    /// Element type.
    pub dtype: DType,
    /// Per-example dimensions (empty for scalars).
    pub shape: Vec<usize>,
    /// Categorical encoding, absent for numeric inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<CategoricalEncoding>,
}

/// Ordered map from feature name to placeholder.
#[derive(Debug, Clone, Default)]
pub struct InputTensorMap {
    entries: Vec<Placeholder>,
    index: HashMap<String, usize>,
}

impl InputTensorMap {
    fn insert(&mut self, placeholder: Placeholder) {
        // Names are unique in a validated schema.
        debug_assert!(!self.index.contains_key(placeholder.name()));
        self.index
            .insert(placeholder.name().to_string(), self.entries.len());
        self.entries.push(placeholder);
    }

    /// Returns the number of placeholders.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the placeholder for `name`.
    pub fn get(&self, name: &str) -> Option<&Placeholder> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Returns whether `name` has a placeholder.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterates over feature names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Placeholder::name)
    }

    /// Iterates over placeholders in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Placeholder> {
        self.entries.iter()
    }

    /// Iterates over numeric placeholders.
    pub fn numeric(&self) -> impl Iterator<Item = &Placeholder> {
        self.entries.iter().filter(|p| p.is_numeric())
    }

    /// Iterates over categorical placeholders.
    pub fn categorical(&self) -> impl Iterator<Item = &Placeholder> {
        self.entries.iter().filter(|p| p.dtype().is_integer())
    }

    /// Returns whether both maps have the same keys, in the same order, with
    /// the same per-key type, shape and encoding. Identities are ignored.
    pub fn structurally_eq(&self, other: &InputTensorMap) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|(a, b)| a.same_structure(b))
    }
}

impl<'a> IntoIterator for &'a InputTensorMap {
    type Item = &'a Placeholder;
    type IntoIter = std::slice::Iter<'a, Placeholder>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for InputTensorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, placeholder) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{}': {}", placeholder.name(), placeholder)?;
        }
        write!(f, "}}")
    }
}

/// Builds one scalar placeholder per input feature of `schema`.
///
/// Entries are ordered numerical, then embedding, then one-hot. The target
/// column gets no entry. Every call creates fresh placeholder identities.
pub fn build_inputs(schema: &FeatureSchema) -> InputTensorMap {
    let mut inputs = InputTensorMap {
        entries: Vec::with_capacity(schema.num_features()),
        index: HashMap::with_capacity(schema.num_features()),
    };

    for name in schema.numerical_features() {
        inputs.insert(Placeholder::Numeric(InputSlot::scalar(name)));
    }
    for (name, width) in schema.embedding_categorical_features() {
        inputs.insert(Placeholder::CategoricalIndex {
            slot: InputSlot::scalar(name),
            encoding: CategoricalEncoding::Embedding { width: *width },
        });
    }
    for name in schema.onehot_categorical_features() {
        inputs.insert(Placeholder::CategoricalIndex {
            slot: InputSlot::scalar(name),
            encoding: CategoricalEncoding::OneHot,
        });
    }

    debug!(
        inputs = inputs.len(),
        numeric = schema.numerical_features().len(),
        "Built model inputs"
    );
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::TargetSpec;
    use std::collections::HashSet;

    #[test]
    fn test_taxi_inputs() {
        let schema = FeatureSchema::taxi_tips();
        let inputs = build_inputs(&schema);

        assert_eq!(inputs.len(), 11);
        assert_eq!(inputs.numeric().count(), 3);
        assert_eq!(inputs.categorical().count(), 8);

        for name in ["trip_seconds", "trip_miles", "euclidean"] {
            let p = inputs.get(name).unwrap();
            assert_eq!(p.dtype(), DType::F32);
            assert!(p.is_numeric());
            assert!(p.encoding().is_none());
        }
        for name in [
            "trip_month",
            "trip_day",
            "trip_hour",
            "pickup_grid",
            "dropoff_grid",
            "loc_cross",
            "payment_type",
            "trip_day_of_week",
        ] {
            assert_eq!(inputs.get(name).unwrap().dtype(), DType::I64, "{name}");
        }
        assert!(!inputs.contains("tip_bin"));
    }

    #[test]
    fn test_count_matches_role_tables() {
        let schema = FeatureSchema::builder()
            .numerical("x")
            .numerical("y")
            .embedding("e", 16)
            .target(TargetSpec::new("label", ["no", "yes"]))
            .build()
            .unwrap();
        let inputs = build_inputs(&schema);
        assert_eq!(
            inputs.len(),
            schema.numerical_features().len()
                + schema.embedding_categorical_features().len()
                + schema.onehot_categorical_features().len()
        );
    }

    #[test]
    fn test_insertion_order_and_names() {
        let inputs = build_inputs(&FeatureSchema::taxi_tips());
        let keys: Vec<&str> = inputs.keys().collect();
        assert_eq!(
            keys,
            vec![
                "trip_seconds",
                "trip_miles",
                "euclidean",
                "trip_month",
                "trip_day",
                "trip_hour",
                "pickup_grid",
                "dropoff_grid",
                "loc_cross",
                "payment_type",
                "trip_day_of_week",
            ]
        );
        for (name, placeholder) in keys.iter().zip(&inputs) {
            assert_eq!(*name, placeholder.name());
            assert!(placeholder.shape().is_scalar());
        }
    }

    #[test]
    fn test_encodings() {
        let inputs = build_inputs(&FeatureSchema::taxi_tips());
        assert_eq!(
            inputs.get("loc_cross").unwrap().encoding(),
            Some(CategoricalEncoding::Embedding { width: 10 })
        );
        assert_eq!(
            inputs.get("payment_type").unwrap().encoding(),
            Some(CategoricalEncoding::OneHot)
        );
    }

    #[test]
    fn test_structurally_equal_but_distinct() {
        let schema = FeatureSchema::taxi_tips();
        let first = build_inputs(&schema);
        let second = build_inputs(&schema);

        assert!(first.structurally_eq(&second));

        let first_ids: HashSet<PlaceholderId> = first.iter().map(Placeholder::id).collect();
        assert_eq!(first_ids.len(), first.len());
        assert!(second.iter().all(|p| !first_ids.contains(&p.id())));
    }

    #[test]
    fn test_structural_difference() {
        let taxi = build_inputs(&FeatureSchema::taxi_tips());
        let other = FeatureSchema::builder()
            .numerical("trip_seconds")
            .target(TargetSpec::new("tip_bin", ["a", "b"]))
            .build()
            .unwrap();
        assert!(!taxi.structurally_eq(&build_inputs(&other)));
    }

    #[test]
    fn test_display() {
        let inputs = build_inputs(&FeatureSchema::taxi_tips());
        let p = inputs.get("trip_miles").unwrap();
        assert_eq!(
            p.to_string(),
            "<Placeholder shape=(None,), dtype=float32, name=trip_miles>"
        );
        let p = inputs.get("trip_day").unwrap();
        assert_eq!(
            p.to_string(),
            "<Placeholder shape=(None,), dtype=int64, name=trip_day, embedding=4>"
        );

        let rendered = inputs.to_string();
        assert!(rendered.starts_with("{'trip_seconds': <Placeholder"));
        assert!(rendered.ends_with("name=trip_day_of_week, onehot>}"));
    }

    #[test]
    fn test_describe_serializes() {
        let inputs = build_inputs(&FeatureSchema::taxi_tips());
        let info = inputs.get("loc_cross").unwrap().describe();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "loc_cross",
                "kind": "categorical_index",
                "dtype": "i64",
                "shape": [],
                "encoding": {"type": "embedding", "width": 10}
            })
        );

        let info = inputs.get("euclidean").unwrap().describe();
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("encoding").is_none());
    }

    #[test]
    fn test_build_from_threads() {
        let schema = FeatureSchema::taxi_tips();
        let reference = build_inputs(&schema);
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| build_inputs(&schema))).collect();
            for handle in handles {
                assert!(handle.join().unwrap().structurally_eq(&reference));
            }
        });
    }
}
