use std::fmt;

use alloy_primitives::{Address, Bytes, TxHash, B256};
use serde::{Deserialize, Serialize};

/// Opaque handle returned by a fork snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotId(pub String);

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Receipt of an included transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    pub success: bool,
}

/// Log query restricted to one emitting contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogFilter {
    pub address: Address,
    /// Event signature hash; `None` matches every event.
    pub topic0: Option<B256>,
    pub from_block: u64,
}

impl LogFilter {
    /// All events of one signature emitted by `address` since genesis.
    pub fn event(address: Address, topic0: B256) -> Self {
        Self {
            address,
            topic0: Some(topic0),
            from_block: 0,
        }
    }

    /// Returns `true` if the log satisfies this filter.
    pub fn matches(&self, log: &LogEntry) -> bool {
        log.address == self.address
            && log.block_number >= self.from_block
            && self
                .topic0
                .map_or(true, |t| log.topics.first() == Some(&t))
    }
}

/// An emitted event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: u64,
}
