//! Measurements for Ledger Lens.
//!
//! A measurement is a named, typed read taken against one graph node, or
//! against a pair of nodes for relational measurements such as
//! `balanceOf(other)`. The [`MeasurementRegistry`] binds
//! [`MeasurementTemplate`]s to nodes through [`NodeSelector`]s and evaluates
//! all of them into a [`MeasurementSet`].
//!
//! # Key Types
//!
//! - [`Calculation`] - How a value is obtained
//! - [`MeasurementRegistry`] - Registration and deterministic evaluation
//! - [`MeasurementSet`] - Immutable result of one evaluation
//! - [`FormatRule`] / [`Formatting`] - Display scaling for integer values

pub mod calculation;
pub mod error;
pub mod format;
pub mod registry;
pub mod set;
pub mod template;
pub mod value;

pub use calculation::{Calculation, FnCalculation, NativeBalance, RelationalViewCall, ViewCall};
pub use error::{MeasureError, MeasureResult};
pub use format::{FormatRule, Formatting};
pub use registry::{register_token_defaults, MeasurementRegistry};
pub use set::{ActionSummary, Measurement, MeasurementSet, NodeMeasurements};
pub use template::{MeasurementTemplate, NodeSelector};
pub use value::to_measured;
