//! Ledger provider boundary for Ledger Lens.
//!
//! The inspection pipeline never talks to a node directly. Everything it
//! needs from the ledger goes through the [`LedgerProvider`] trait:
//! - code and balance lookups used to classify addresses
//! - read-only contract calls used for link discovery and measurements
//! - transaction submission and receipts used by the action runner
//! - log and block queries used for implementation history and timestamps
//! - fork snapshot / revert used to isolate actions from one another
//!
//! [`InMemoryChain`] implements the trait for tests, local demos, and
//! embedding.

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{LedgerError, LedgerResult};
pub use memory::{ContractState, InMemoryChain};
pub use traits::LedgerProvider;
pub use types::{LogEntry, LogFilter, SnapshotId, TxReceipt};
