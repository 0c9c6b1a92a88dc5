//! Node and link types of the discovered graph.
//!
//! A [`Node`] is one ledger address. Contract nodes carry the metadata found
//! for them and the outgoing [`LinkTarget`]s discovered by probing their read
//! functions. The [`Link`] type is the flattened `(from, to, name)` edge view
//! used by reports and diagrams.

use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, TxHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lens_types::{NodeKey, NodeKind};

/// A discovered ledger address.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identity of the node.
    pub address: NodeKey,
    /// Classification.
    pub kind: NodeKind,
    /// Label shown in reports. For proxies this is the proxy's own name.
    pub display_name: String,
    /// Name of the contract whose interface the node exposes: the
    /// implementation's name for proxies, the contract's own name otherwise.
    pub contract_name: Option<String>,
    /// ERC20-style metadata, when the contract answers `name()` and `symbol()`.
    pub token: Option<TokenInfo>,
    /// Implementations behind a proxy, most recent first.
    pub implementations: Vec<Implementation>,
    /// Outgoing links in discovery order.
    pub links: Vec<LinkTarget>,
    /// Deployment information, when known.
    pub creation: Option<Creation>,
    /// Recorded but not traversed further.
    pub stopper: bool,
    /// Interface used for link discovery and measurements.
    #[serde(skip)]
    pub abi: Option<JsonAbi>,
}

impl Node {
    fn bare(address: NodeKey, kind: NodeKind, display_name: String) -> Self {
        Self {
            address,
            kind,
            display_name,
            contract_name: None,
            token: None,
            implementations: Vec::new(),
            links: Vec::new(),
            creation: None,
            stopper: false,
            abi: None,
        }
    }

    /// Node for text that is not a well-formed address.
    pub fn invalid(address: NodeKey) -> Self {
        let label = address.as_str().to_string();
        Self::bare(address, NodeKind::Invalid, label)
    }

    /// Node for a code-less account.
    pub fn simple(address: NodeKey) -> Self {
        let label = address.short();
        Self::bare(address, NodeKind::SimpleAddress, label)
    }

    /// Contract node without metadata.
    pub fn contract(address: NodeKey) -> Self {
        let label = address.short();
        Self::bare(address, NodeKind::Contract, label)
    }

    /// Returns `true` for contract nodes.
    pub fn is_contract(&self) -> bool {
        self.kind == NodeKind::Contract
    }

    /// Returns `true` if the node sits in front of an implementation.
    pub fn is_proxy(&self) -> bool {
        !self.implementations.is_empty()
    }

    /// Class used to select measurements: the interface's contract name,
    /// falling back to the display name.
    pub fn class_name(&self) -> &str {
        self.contract_name.as_deref().unwrap_or(&self.display_name)
    }

    /// Returns `true` if `label` names this node (display name, contract
    /// name, token symbol, or address).
    pub fn answers_to(&self, label: &str) -> bool {
        self.display_name == label
            || self.contract_name.as_deref() == Some(label)
            || self.token.as_ref().is_some_and(|t| t.symbol == label)
            || self.address == NodeKey::new(label)
    }

    /// Parsed address, for nodes that have one.
    pub fn ledger_address(&self) -> Option<Address> {
        self.address.address()
    }

    /// Outgoing edges of this node as flattened links.
    pub fn outgoing(&self) -> impl Iterator<Item = Link> + '_ {
        self.links.iter().map(move |l| Link {
            from: self.address.clone(),
            to: l.to.clone(),
            name: l.name.clone(),
        })
    }
}

/// An outgoing link stored on its source node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkTarget {
    /// Target address.
    pub to: NodeKey,
    /// Originating read function, e.g. `owner`, `tokens[2]`,
    /// `getReserves.token0`.
    pub name: String,
}

/// A directed, named edge of the graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub from: NodeKey,
    pub to: NodeKey,
    pub name: String,
}

impl Link {
    /// Returns `true` if the link points back at its source.
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// ERC20-style token metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub name: String,
}

/// One implementation behind a proxy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    pub address: NodeKey,
    pub name: String,
}

/// Deployment information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creation {
    pub creator: NodeKey,
    pub tx_hash: TxHash,
    /// Timestamp of the creation block, when it could be looked up.
    pub timestamp: Option<DateTime<Utc>>,
}
