//! Element types and per-example shapes for model input placeholders.
//!
//! Placeholders never carry a batch dimension: the batch size is decided when
//! data is bound at execution time, so a [`Shape`] only describes the
//! per-example dimensions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Data types a placeholder can hold.
///
/// # Examples
///
/// ```
/// use taxitip_core::dtype::DType;
///
/// let dtype = DType::F32;
/// assert!(dtype.is_float());
/// assert_eq!(dtype.name(), "float32");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// 32-bit floating point, used for numerical features.
    F32,
    /// 64-bit signed integer, used for categorical ids.
    I64,
}

impl DType {
    /// Returns a human-readable name for this data type.
    pub fn name(&self) -> &'static str {
        match self {
            DType::F32 => "float32",
            DType::I64 => "int64",
        }
    }

    /// Returns whether this is a floating-point type.
    pub fn is_float(&self) -> bool {
        matches!(self, DType::F32)
    }

    /// Returns whether this is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(self, DType::I64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-example dimensions of a placeholder.
///
/// # Examples
///
/// ```
/// use taxitip_core::dtype::Shape;
///
/// let shape = Shape::scalar();
/// assert!(shape.is_scalar());
/// assert_eq!(shape.to_string(), "(None,)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a scalar shape: one value per example.
    pub fn scalar() -> Self {
        Self { dims: Vec::new() }
    }

    /// Returns whether this is a scalar shape.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Returns the dimensions as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.dims
    }
}

impl fmt::Display for Shape {
    /// Renders with the dynamic batch dimension first, e.g. `(None, 4)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_scalar() {
            return write!(f, "(None,)");
        }
        write!(f, "(None,")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i == 0 {
                write!(f, " {}", d)?;
            } else {
                write!(f, ", {}", d)?;
            }
        }
        write!(f, ")")
    }
}
