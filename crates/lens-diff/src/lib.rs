//! Differential comparison for Ledger Lens.
//!
//! Two independent engines live here:
//!
//! - [`diff_sets`] compares a measurement set taken before an action with
//!   the one taken after it. Sets are matched by position and must have the
//!   same shape; domain differences (changed numbers, new errors, changed
//!   types) become [`Delta`] entries, equal measurements produce nothing.
//! - [`diff_tables`] compares two [`DataTable`]s whose schemas may differ,
//!   aligning rows by their key fields when both tables agree on them.
//!
//! Tables round-trip through a CSV text encoding ([`table_codec`]).

pub mod delta;
pub mod error;
pub mod table;
pub mod table_codec;
pub mod table_diff;

pub use delta::{diff_sets, Delta, DeltaPayload, ElementDelta, NodeDelta};
pub use error::{DiffError, DiffResult, TableError, TableResult};
pub use table::DataTable;
pub use table_diff::{diff_tables, Side, TableDifference};
