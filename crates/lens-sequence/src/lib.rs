//! Action sequencing for Ledger Lens.
//!
//! Runs configured state-changing actions one at a time against a forked
//! ledger. Every action starts from the same captured base state: after an
//! action and its post-action measurement the ledger is rewound, except
//! after the last action, whose effects are left in place.
//!
//! # Key Types
//!
//! - [`Snapshotter`] - Capture and restore of the base state
//! - [`ActionInvoker`] - One configured action
//! - [`ActionRunner`] - Drives the sequence and collects [`ActionReport`]s

pub mod action;
pub mod error;
pub mod runner;
pub mod snapshot;

pub use action::{ActionInvoker, ActionSpec, ContractAction, Invocation};
pub use error::{SequenceError, SequenceResult};
pub use runner::{ActionReport, ActionRunner, MeasureState, RegistryState};
pub use snapshot::Snapshotter;
