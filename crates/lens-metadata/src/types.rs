use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

use crate::error::{MetadataError, MetadataResult};

/// Verified source information for a contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Verified contract name.
    pub contract_name: String,
    /// Published ABI.
    pub abi: JsonAbi,
    /// Implementation the contract delegates to, when it is a proxy.
    pub implementation: Option<Address>,
}

impl SourceInfo {
    /// Source info for a contract that is not a proxy.
    pub fn new(contract_name: impl Into<String>, abi: JsonAbi) -> Self {
        Self {
            contract_name: contract_name.into(),
            abi,
            implementation: None,
        }
    }

    /// Mark this contract as a proxy for `implementation`.
    pub fn with_implementation(mut self, implementation: Address) -> Self {
        self.implementation = Some(implementation);
        self
    }

    /// Build from the raw text fields returned by an explorer.
    ///
    /// The implementation field is treated as absent when it is empty.
    pub fn from_explorer_fields(
        address: Address,
        contract_name: &str,
        abi_json: &str,
        implementation: &str,
    ) -> MetadataResult<Self> {
        let abi: JsonAbi =
            serde_json::from_str(abi_json).map_err(|e| MetadataError::InvalidAbi {
                address,
                reason: e.to_string(),
            })?;
        let implementation = match implementation.trim() {
            "" => None,
            text => Some(text.parse::<Address>().map_err(|e| MetadataError::Backend {
                address,
                reason: format!("bad implementation address {text:?}: {e}"),
            })?),
        };
        Ok(Self {
            contract_name: contract_name.to_string(),
            abi,
            implementation,
        })
    }

    /// Returns `true` if this contract delegates to an implementation.
    pub fn is_proxy(&self) -> bool {
        self.implementation.is_some()
    }
}

/// Deployment information for a contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationInfo {
    pub creator: Address,
    pub tx_hash: TxHash,
}
