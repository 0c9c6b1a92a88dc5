//! Measured values.
//!
//! A measurement either produced a value or failed with a message. The two
//! outcomes are variants of one enum so that "both set" and "neither set"
//! cannot be represented.

use std::fmt;

use alloy_primitives::{I256, U256};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::integer::Integer;

/// A single measured scalar.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scalar {
    /// Integer from either a signed or an unsigned ledger value.
    Int(Integer),
    /// Text, including rendered addresses and byte strings.
    Text(String),
    /// Boolean flag.
    Bool(bool),
}

impl Scalar {
    /// Integer scalar from a machine integer.
    pub fn int(value: i64) -> Self {
        Self::Int(Integer::from(value))
    }

    /// Integer scalar from an unsigned 256-bit ledger value.
    pub fn uint(value: U256) -> Self {
        Self::Int(Integer::from(value))
    }

    /// Integer scalar from a signed 256-bit ledger value.
    pub fn sint(value: I256) -> Self {
        Self::Int(Integer::from(value))
    }

    /// Text scalar.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Name of the scalar type, used in transition descriptions.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Text(_) => "string",
            Self::Bool(_) => "boolean",
        }
    }

    /// The integer, if this is a numeric scalar.
    pub fn as_int(&self) -> Option<Integer> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Outcome of evaluating one measurement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasuredValue {
    /// A single scalar.
    Value(Scalar),
    /// A homogeneous array of scalars.
    Array(Vec<Scalar>),
    /// The calculation failed with this message.
    Error(String),
}

impl MeasuredValue {
    /// Build an array value, rejecting mixed element types.
    pub fn array(items: Vec<Scalar>) -> Result<Self, TypeError> {
        if let Some(first) = items.first() {
            if let Some(other) = items
                .iter()
                .find(|s| s.type_name() != first.type_name())
            {
                return Err(TypeError::MixedArray {
                    first: first.type_name(),
                    other: other.type_name(),
                });
            }
        }
        Ok(Self::Array(items))
    }

    /// Error value from any displayable failure.
    pub fn error(message: impl fmt::Display) -> Self {
        Self::Error(message.to_string())
    }

    /// Returns `true` if the calculation failed.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The error message, if the calculation failed.
    pub fn as_error(&self) -> Option<&str> {
        match self {
            Self::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Returns `true` for array values.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }
}

impl From<Scalar> for MeasuredValue {
    fn from(scalar: Scalar) -> Self {
        Self::Value(scalar)
    }
}

impl fmt::Display for MeasuredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(s) => write!(f, "{s}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}
