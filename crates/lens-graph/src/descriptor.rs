use std::fmt;
use std::sync::Arc;

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::{Function, JsonAbi, StateMutability};
use alloy_primitives::Address;
use lens_ledger::LedgerProvider;

use crate::error::{GraphError, GraphResult};

/// Read access to one contract through its ABI.
#[derive(Clone)]
pub struct ContractDescriptor {
    address: Address,
    abi: Arc<JsonAbi>,
    provider: Arc<dyn LedgerProvider>,
}

/// A zero-argument `view`/`pure` function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadFunction {
    pub name: String,
    pub outputs: Vec<OutputSlot>,
}

/// One declared output of a [`ReadFunction`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputSlot {
    /// Declared name; empty when the ABI leaves it unnamed.
    pub name: String,
    /// Solidity type, e.g. `address` or `address[]`.
    pub ty: String,
}

impl OutputSlot {
    /// Returns `true` for `address` outputs and arrays of them, nested or not.
    pub fn holds_addresses(&self) -> bool {
        self.ty == "address" || (self.ty.starts_with("address[") && self.ty.ends_with(']'))
    }
}

impl ReadFunction {
    /// Returns `true` if any output can carry an address.
    pub fn returns_addresses(&self) -> bool {
        self.outputs.iter().any(OutputSlot::holds_addresses)
    }
}

impl ContractDescriptor {
    pub fn new(address: Address, abi: Arc<JsonAbi>, provider: Arc<dyn LedgerProvider>) -> Self {
        Self {
            address,
            abi,
            provider,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Zero-input `view`/`pure` functions, ordered by name.
    pub fn read_functions(&self) -> Vec<ReadFunction> {
        self.abi
            .functions()
            .filter(|f| is_zero_arg_read(f))
            .map(|f| ReadFunction {
                name: f.name.clone(),
                outputs: f
                    .outputs
                    .iter()
                    .map(|p| OutputSlot {
                        name: p.name.clone(),
                        ty: p.ty.clone(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Invoke a zero-argument read function by name.
    pub async fn call(&self, name: &str) -> GraphResult<Vec<DynSolValue>> {
        let function = self
            .abi
            .function(name)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.is_empty()))
            .ok_or_else(|| GraphError::UnknownFunction(name.to_string()))?;
        Ok(self.provider.call(self.address, function, &[]).await?)
    }
}

impl fmt::Debug for ContractDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractDescriptor")
            .field("address", &self.address)
            .field("functions", &self.abi.functions.len())
            .finish()
    }
}

fn is_zero_arg_read(function: &Function) -> bool {
    function.inputs.is_empty()
        && matches!(
            function.state_mutability,
            StateMutability::View | StateMutability::Pure
        )
}
