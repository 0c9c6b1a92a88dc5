use std::sync::Arc;

use lens_ledger::{LedgerProvider, SnapshotId};
use tracing::debug;

use crate::error::{SequenceError, SequenceResult};

/// Holds the base-state snapshot of a sequence.
///
/// Reverting consumes the snapshot it restores, so every restore captures
/// a fresh one of the same state.
pub struct Snapshotter {
    provider: Arc<dyn LedgerProvider>,
    current: Option<SnapshotId>,
}

impl Snapshotter {
    pub fn new(provider: Arc<dyn LedgerProvider>) -> Self {
        Self {
            provider,
            current: None,
        }
    }

    /// Capture the current ledger state as the base state.
    pub async fn capture(&mut self) -> SequenceResult<&SnapshotId> {
        let id = self
            .provider
            .snapshot()
            .await
            .map_err(SequenceError::Snapshot)?;
        debug!(snapshot = %id, "captured base state");
        Ok(&*self.current.insert(id))
    }

    /// Rewind to the base state and capture it again.
    pub async fn restore(&mut self) -> SequenceResult<()> {
        let id = self.current.take().ok_or(SequenceError::NoSnapshot)?;
        self.provider
            .revert_to(&id)
            .await
            .map_err(SequenceError::Restore)?;
        debug!(snapshot = %id, "restored base state");
        self.capture().await?;
        Ok(())
    }

    pub fn current(&self) -> Option<&SnapshotId> {
        self.current.as_ref()
    }
}
