use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::Function;
use alloy_primitives::{keccak256, Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use lens_types::NodeKey;
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::traits::LedgerProvider;
use crate::types::{LogEntry, LogFilter, SnapshotId, TxReceipt};

const GENESIS_TIMESTAMP: u64 = 1_700_000_000;
const BLOCK_TIME: u64 = 12;
const DEFAULT_GAS: u64 = 50_000;

type Handler = Arc<dyn Fn(&mut ContractState<'_>, &[DynSolValue]) -> Result<(), String> + Send + Sync>;

/// In-memory forked ledger for tests, local demos, and embedding.
///
/// Contracts are modelled as a table of read responses keyed by function
/// name (plus rendered arguments for parameterized reads). State-changing
/// functions are closures that edit that table. Snapshots clone the whole
/// state and follow dev-chain semantics: reverting to a snapshot consumes it
/// together with every snapshot taken after it.
pub struct InMemoryChain {
    inner: RwLock<ChainState>,
    snapshots: RwLock<Vec<(SnapshotId, ChainState)>>,
    handlers: RwLock<HashMap<(Address, String), (Handler, u64)>>,
    next_snapshot: RwLock<u64>,
    fail_snapshots: RwLock<bool>,
}

#[derive(Clone, Default)]
struct ChainState {
    accounts: HashMap<Address, Account>,
    logs: Vec<LogEntry>,
    receipts: HashMap<TxHash, TxReceipt>,
    block_number: u64,
    tx_count: u64,
}

#[derive(Clone, Default)]
struct Account {
    code: Bytes,
    balance: U256,
    reads: BTreeMap<String, Result<Vec<DynSolValue>, String>>,
}

/// Mutable view of one contract's read table, handed to state-changing
/// function handlers.
pub struct ContractState<'a> {
    reads: &'a mut BTreeMap<String, Result<Vec<DynSolValue>, String>>,
}

impl ContractState<'_> {
    /// Replace the outputs returned by a zero-argument read.
    pub fn set(&mut self, function: &str, outputs: Vec<DynSolValue>) {
        self.reads.insert(function.to_string(), Ok(outputs));
    }

    /// Replace the outputs returned by a parameterized read.
    pub fn set_with_args(&mut self, function: &str, args: &[DynSolValue], outputs: Vec<DynSolValue>) {
        self.reads.insert(read_key(function, args), Ok(outputs));
    }

    /// Current outputs of a zero-argument read.
    pub fn get(&self, function: &str) -> Option<&[DynSolValue]> {
        self.reads
            .get(function)
            .and_then(|r| r.as_ref().ok())
            .map(Vec::as_slice)
    }

    /// Current outputs of a parameterized read.
    pub fn get_with_args(&self, function: &str, args: &[DynSolValue]) -> Option<&[DynSolValue]> {
        self.reads
            .get(&read_key(function, args))
            .and_then(|r| r.as_ref().ok())
            .map(Vec::as_slice)
    }
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ChainState {
                block_number: 1,
                ..ChainState::default()
            }),
            snapshots: RwLock::new(Vec::new()),
            handlers: RwLock::new(HashMap::new()),
            next_snapshot: RwLock::new(1),
            fail_snapshots: RwLock::new(false),
        }
    }

    /// Give `address` non-empty bytecode so it classifies as a contract.
    pub fn deploy(&self, address: Address) {
        let mut state = self.inner.write().expect("lock poisoned");
        state.accounts.entry(address).or_default().code = Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]);
    }

    /// Set the native balance of `address`.
    pub fn fund(&self, address: Address, amount: U256) {
        let mut state = self.inner.write().expect("lock poisoned");
        state.accounts.entry(address).or_default().balance = amount;
    }

    /// Set the outputs of a zero-argument read on `address`.
    pub fn set_read(&self, address: Address, function: &str, outputs: Vec<DynSolValue>) {
        self.edit(address, |c| c.set(function, outputs));
    }

    /// Set the outputs of a parameterized read on `address`.
    pub fn set_read_with_args(
        &self,
        address: Address,
        function: &str,
        args: &[DynSolValue],
        outputs: Vec<DynSolValue>,
    ) {
        self.edit(address, |c| c.set_with_args(function, args, outputs));
    }

    /// Make a zero-argument read on `address` revert with `reason`.
    pub fn set_revert(&self, address: Address, function: &str, reason: &str) {
        let mut state = self.inner.write().expect("lock poisoned");
        state
            .accounts
            .entry(address)
            .or_default()
            .reads
            .insert(function.to_string(), Err(reason.to_string()));
    }

    /// Register a state-changing function. Returning `Err` reverts the
    /// transaction without applying any edits.
    pub fn on_send<F>(&self, address: Address, function: &str, gas_used: u64, handler: F)
    where
        F: Fn(&mut ContractState<'_>, &[DynSolValue]) -> Result<(), String> + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        self.handlers
            .write()
            .expect("lock poisoned")
            .insert((address, function.to_string()), (handler, gas_used));
    }

    /// Append an event log at the current block.
    pub fn push_log(&self, mut log: LogEntry) {
        let mut state = self.inner.write().expect("lock poisoned");
        log.block_number = state.block_number;
        state.logs.push(log);
        state.block_number += 1;
    }

    /// Make every subsequent snapshot/revert fail.
    pub fn fail_snapshots(&self, fail: bool) {
        *self.fail_snapshots.write().expect("lock poisoned") = fail;
    }

    /// Number of live snapshots.
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.read().expect("lock poisoned").len()
    }

    /// Current outputs of a zero-argument read, for assertions.
    pub fn read(&self, address: Address, function: &str) -> Option<Vec<DynSolValue>> {
        let state = self.inner.read().expect("lock poisoned");
        state
            .accounts
            .get(&address)
            .and_then(|a| a.reads.get(function))
            .and_then(|r| r.clone().ok())
    }

    fn edit(&self, address: Address, f: impl FnOnce(&mut ContractState<'_>)) {
        let mut state = self.inner.write().expect("lock poisoned");
        let account = state.accounts.entry(address).or_default();
        f(&mut ContractState {
            reads: &mut account.reads,
        });
    }

    fn check_snapshots_enabled(&self) -> LedgerResult<()> {
        if *self.fail_snapshots.read().expect("lock poisoned") {
            return Err(LedgerError::Snapshot("snapshots disabled on this chain".into()));
        }
        Ok(())
    }
}

impl Default for InMemoryChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerProvider for InMemoryChain {
    async fn code(&self, address: Address) -> LedgerResult<Bytes> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state
            .accounts
            .get(&address)
            .map(|a| a.code.clone())
            .unwrap_or_default())
    }

    async fn balance(&self, address: Address) -> LedgerResult<U256> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state
            .accounts
            .get(&address)
            .map(|a| a.balance)
            .unwrap_or_default())
    }

    async fn call(
        &self,
        address: Address,
        function: &Function,
        args: &[DynSolValue],
    ) -> LedgerResult<Vec<DynSolValue>> {
        let state = self.inner.read().expect("lock poisoned");
        let account = state
            .accounts
            .get(&address)
            .filter(|a| !a.code.is_empty())
            .ok_or_else(|| LedgerError::Decode(format!("no contract at {address}")))?;
        match account.reads.get(&read_key(&function.name, args)) {
            Some(Ok(outputs)) => Ok(outputs.clone()),
            Some(Err(reason)) => Err(LedgerError::Reverted(reason.clone())),
            None => Err(LedgerError::Reverted(format!(
                "function {} not implemented",
                function.name
            ))),
        }
    }

    async fn send(
        &self,
        address: Address,
        function: &Function,
        args: &[DynSolValue],
    ) -> LedgerResult<TxHash> {
        let (handler, gas_used) = self
            .handlers
            .read()
            .expect("lock poisoned")
            .get(&(address, function.name.clone()))
            .cloned()
            .ok_or_else(|| {
                LedgerError::Reverted("function selector was not recognized".into())
            })?;

        let mut state = self.inner.write().expect("lock poisoned");
        let account = state.accounts.entry(address).or_default();
        let mut staged = account.reads.clone();
        handler(&mut ContractState { reads: &mut staged }, args).map_err(LedgerError::Reverted)?;
        account.reads = staged;

        state.tx_count += 1;
        state.block_number += 1;
        let tx_hash = keccak256(format!("in-memory-tx:{}", state.tx_count));
        let receipt = TxReceipt {
            tx_hash,
            block_number: state.block_number,
            gas_used: if gas_used == 0 { DEFAULT_GAS } else { gas_used },
            success: true,
        };
        state.receipts.insert(tx_hash, receipt);
        debug!(%address, function = %function.name, %tx_hash, "applied transaction");
        Ok(tx_hash)
    }

    async fn receipt(&self, tx: TxHash) -> LedgerResult<TxReceipt> {
        let state = self.inner.read().expect("lock poisoned");
        state
            .receipts
            .get(&tx)
            .cloned()
            .ok_or(LedgerError::UnknownTransaction(tx))
    }

    async fn logs(&self, filter: &LogFilter) -> LedgerResult<Vec<LogEntry>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state
            .logs
            .iter()
            .filter(|log| filter.matches(log))
            .cloned()
            .collect())
    }

    async fn block_timestamp(&self, block: u64) -> LedgerResult<u64> {
        Ok(GENESIS_TIMESTAMP + block * BLOCK_TIME)
    }

    async fn snapshot(&self) -> LedgerResult<SnapshotId> {
        self.check_snapshots_enabled()?;
        let mut counter = self.next_snapshot.write().expect("lock poisoned");
        let id = SnapshotId(format!("0x{:x}", *counter));
        *counter += 1;
        let state = self.inner.read().expect("lock poisoned").clone();
        self.snapshots
            .write()
            .expect("lock poisoned")
            .push((id.clone(), state));
        debug!(snapshot = %id, "captured ledger snapshot");
        Ok(id)
    }

    async fn revert_to(&self, id: &SnapshotId) -> LedgerResult<()> {
        self.check_snapshots_enabled()?;
        let mut snapshots = self.snapshots.write().expect("lock poisoned");
        let position = snapshots
            .iter()
            .position(|(sid, _)| sid == id)
            .ok_or_else(|| LedgerError::UnknownSnapshot(id.clone()))?;
        let (_, state) = snapshots.swap_remove(position);
        snapshots.truncate(position);
        *self.inner.write().expect("lock poisoned") = state;
        debug!(snapshot = %id, "reverted ledger to snapshot");
        Ok(())
    }
}

/// Key of a read-table entry: the bare function name for zero-argument
/// reads, `name(arg,...)` otherwise.
fn read_key(function: &str, args: &[DynSolValue]) -> String {
    if args.is_empty() {
        return function.to_string();
    }
    let rendered: Vec<String> = args.iter().map(render_arg).collect();
    format!("{function}({})", rendered.join(","))
}

fn render_arg(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Address(a) => NodeKey::from_address(*a).to_string(),
        DynSolValue::Uint(v, _) => v.to_string(),
        DynSolValue::Int(v, _) => v.to_string(),
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::String(s) => s.clone(),
        other => format!("{other:?}"),
    }
}
