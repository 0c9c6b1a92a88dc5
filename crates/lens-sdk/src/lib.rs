//! High-level SDK for Ledger Lens.
//!
//! Ties the pipeline together: load a [`RunConfig`], discover the graph,
//! measure it, run the configured actions, diff every post-action state
//! against the base state, and persist the result with a [`ReportWriter`].

pub mod config;
pub mod error;
pub mod inspection;
pub mod render;
pub mod report;

pub use config::RunConfig;
pub use error::{SdkError, SdkResult};
pub use inspection::Inspection;
pub use report::{load_set, slug, ActionOutcome, ReportWriter, RunReport};

// Re-export key types
pub use lens_diff::{DataTable, NodeDelta, TableDifference};
pub use lens_graph::{GraphContext, Link, Node};
pub use lens_measure::{FormatRule, MeasurementRegistry, MeasurementSet};
pub use lens_sequence::{ActionReport, ActionSpec};
pub use lens_types::{MeasuredValue, NodeKey, Scalar};
