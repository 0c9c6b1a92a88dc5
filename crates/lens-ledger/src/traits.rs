use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::Function;
use alloy_primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;

use crate::error::LedgerResult;
use crate::types::{LogEntry, LogFilter, SnapshotId, TxReceipt};

/// Boundary to a live or forked ledger.
///
/// Implementations own transport concerns (endpoints, retries, timeouts).
/// A timeout surfaces as an error from the individual call, never as a hang
/// visible to the caller.
#[async_trait]
pub trait LedgerProvider: Send + Sync {
    /// Deployed bytecode at `address` (empty for code-less accounts).
    async fn code(&self, address: Address) -> LedgerResult<Bytes>;

    /// Native balance of `address`.
    async fn balance(&self, address: Address) -> LedgerResult<U256>;

    /// Execute a read-only call and return the decoded outputs.
    async fn call(
        &self,
        address: Address,
        function: &Function,
        args: &[DynSolValue],
    ) -> LedgerResult<Vec<DynSolValue>>;

    /// Submit a state-changing transaction.
    async fn send(
        &self,
        address: Address,
        function: &Function,
        args: &[DynSolValue],
    ) -> LedgerResult<TxHash>;

    /// Wait for a submitted transaction to be included and return its receipt.
    async fn receipt(&self, tx: TxHash) -> LedgerResult<TxReceipt>;

    /// Logs matching `filter`, oldest first.
    async fn logs(&self, filter: &LogFilter) -> LedgerResult<Vec<LogEntry>>;

    /// Unix timestamp of `block`.
    async fn block_timestamp(&self, block: u64) -> LedgerResult<u64>;

    /// Capture the whole ledger state.
    async fn snapshot(&self) -> LedgerResult<SnapshotId>;

    /// Rewind to a captured state. The snapshot (and every later one) is
    /// consumed by the revert.
    async fn revert_to(&self, id: &SnapshotId) -> LedgerResult<()>;
}
