use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{keccak256, Address, B256};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use lens_ledger::{LedgerProvider, LogFilter};
use lens_metadata::{MetadataResolver, SourceInfo};
use lens_types::NodeKey;
use tracing::{debug, info, warn};

use crate::context::GraphContext;
use crate::descriptor::{ContractDescriptor, ReadFunction};
use crate::error::GraphResult;
use crate::node::{Creation, Implementation, LinkTarget, Node, TokenInfo};

const UPGRADED_EVENT: &str = "Upgraded(address)";

/// Counters for one discovery run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiscoveryStats {
    /// Nodes created by this run.
    pub visited: usize,
    /// Of which contracts.
    pub contracts: usize,
    /// Links emitted by this run.
    pub links: usize,
    /// Link probes that reverted or failed to decode.
    pub failed_probes: usize,
}

/// Breadth-first discovery of the entity graph.
pub struct GraphBuilder {
    provider: Arc<dyn LedgerProvider>,
    resolver: Arc<dyn MetadataResolver>,
}

impl GraphBuilder {
    pub fn new(provider: Arc<dyn LedgerProvider>, resolver: Arc<dyn MetadataResolver>) -> Self {
        Self { provider, resolver }
    }

    /// Discover every node reachable from `seeds` into `ctx`.
    ///
    /// Nodes already present in `ctx` count as visited, so running discovery
    /// twice over the same context only adds what is new. Addresses in
    /// `stop_list` are recorded with their links but not traversed through.
    /// Metadata failures abort the run; failed link probes do not.
    pub async fn discover(
        &self,
        ctx: &mut GraphContext,
        seeds: &[NodeKey],
        stop_list: &[NodeKey],
    ) -> GraphResult<DiscoveryStats> {
        let stoppers: HashSet<&NodeKey> = stop_list.iter().collect();
        let mut visited: HashSet<NodeKey> = ctx.nodes().map(|n| n.address.clone()).collect();
        let mut queue: VecDeque<NodeKey> = seeds.iter().cloned().collect();
        let mut stats = DiscoveryStats::default();

        info!(seeds = seeds.len(), stoppers = stop_list.len(), "starting graph discovery");

        while let Some(key) = queue.pop_front() {
            if !visited.insert(key.clone()) {
                continue;
            }

            let stopper = stoppers.contains(&key);
            let node = self.visit(key.clone(), stopper, &mut stats).await?;
            debug!(
                address = %node.address,
                kind = %node.kind,
                name = %node.display_name,
                links = node.links.len(),
                stopper,
                "visited node"
            );

            stats.visited += 1;
            stats.links += node.links.len();
            if node.is_contract() {
                stats.contracts += 1;
            }

            if !stopper {
                for link in &node.links {
                    if link.to.is_zero() || link.to == key || visited.contains(&link.to) {
                        continue;
                    }
                    queue.push_back(link.to.clone());
                }
            }
            ctx.insert(node);
        }

        info!(
            visited = stats.visited,
            contracts = stats.contracts,
            links = stats.links,
            failed_probes = stats.failed_probes,
            "graph discovery finished"
        );
        Ok(stats)
    }

    async fn visit(
        &self,
        key: NodeKey,
        stopper: bool,
        stats: &mut DiscoveryStats,
    ) -> GraphResult<Node> {
        let address = match key.parse() {
            Ok(address) => address,
            Err(e) => {
                debug!(address = %key, error = %e, "invalid address");
                return Ok(Node::invalid(key));
            }
        };

        if self.provider.code(address).await?.is_empty() {
            let mut node = Node::simple(key);
            node.stopper = stopper;
            return Ok(node);
        }

        let mut node = Node::contract(key);
        node.stopper = stopper;

        if let Some(source) = self.resolver.source_info(address).await? {
            node.display_name = source.contract_name.clone();
            node.contract_name = Some(source.contract_name.clone());
            node.abi = Some(source.abi.clone());
            if let Some(current) = source.implementation {
                self.resolve_proxy(&mut node, address, current, &source).await?;
            }
        }

        node.token = self.probe_token(address).await;
        node.creation = self.creation(address).await?;

        if let Some(abi) = node.abi.clone() {
            let descriptor = ContractDescriptor::new(address, Arc::new(abi), self.provider.clone());
            node.links = self.probe_links(&descriptor, stats).await;
        }
        Ok(node)
    }

    /// Swap in the implementation's interface while keeping the proxy's name.
    async fn resolve_proxy(
        &self,
        node: &mut Node,
        proxy: Address,
        current: Address,
        proxy_source: &SourceInfo,
    ) -> GraphResult<()> {
        let name = match self.resolver.source_info(current).await? {
            Some(implementation) => {
                node.abi = Some(merge_abi(&implementation.abi, &proxy_source.abi));
                implementation.contract_name
            }
            None => NodeKey::from_address(current).short(),
        };
        node.contract_name = Some(name.clone());

        let mut implementations = vec![Implementation {
            address: NodeKey::from_address(current),
            name,
        }];
        for previous in self.upgrade_history(proxy).await {
            let key = NodeKey::from_address(previous);
            if implementations.iter().any(|i| i.address == key) {
                continue;
            }
            let name = self
                .resolver
                .source_info(previous)
                .await?
                .map(|s| s.contract_name)
                .unwrap_or_else(|| key.short());
            implementations.push(Implementation { address: key, name });
        }
        node.implementations = implementations;
        Ok(())
    }

    /// Implementations named by `Upgraded(address)` events, newest first.
    async fn upgrade_history(&self, proxy: Address) -> Vec<Address> {
        let filter = LogFilter::event(proxy, keccak256(UPGRADED_EVENT));
        match self.provider.logs(&filter).await {
            Ok(logs) => logs
                .iter()
                .rev()
                .filter_map(|log| {
                    log.topics
                        .get(1)
                        .map(|topic| Address::from_word(*topic))
                        .or_else(|| {
                            (log.data.len() >= 32)
                                .then(|| Address::from_word(B256::from_slice(&log.data[..32])))
                        })
                })
                .collect(),
            Err(e) => {
                warn!(%proxy, error = %e, "failed to read upgrade history");
                Vec::new()
            }
        }
    }

    async fn probe_token(&self, address: Address) -> Option<TokenInfo> {
        let name = self.read_string(address, "function name() view returns (string)").await?;
        let symbol = self.read_string(address, "function symbol() view returns (string)").await?;
        Some(TokenInfo { symbol, name })
    }

    async fn read_string(&self, address: Address, signature: &str) -> Option<String> {
        let function = Function::parse(signature).ok()?;
        match self.provider.call(address, &function, &[]).await.ok()?.first() {
            Some(DynSolValue::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    async fn creation(&self, address: Address) -> GraphResult<Option<Creation>> {
        let Some(info) = self.resolver.creation_info(address).await? else {
            return Ok(None);
        };
        let timestamp = match self.creation_time(info.tx_hash).await {
            Ok(ts) => ts,
            Err(e) => {
                debug!(%address, error = %e, "creation timestamp unavailable");
                None
            }
        };
        Ok(Some(Creation {
            creator: NodeKey::from_address(info.creator),
            tx_hash: info.tx_hash,
            timestamp,
        }))
    }

    async fn creation_time(
        &self,
        tx: alloy_primitives::TxHash,
    ) -> lens_ledger::LedgerResult<Option<DateTime<Utc>>> {
        let receipt = self.provider.receipt(tx).await?;
        let seconds = self.provider.block_timestamp(receipt.block_number).await?;
        Ok(i64::try_from(seconds)
            .ok()
            .and_then(|s| DateTime::from_timestamp(s, 0)))
    }

    async fn probe_links(
        &self,
        descriptor: &ContractDescriptor,
        stats: &mut DiscoveryStats,
    ) -> Vec<LinkTarget> {
        let candidates: Vec<ReadFunction> = descriptor
            .read_functions()
            .into_iter()
            .filter(ReadFunction::returns_addresses)
            .collect();
        let results = join_all(candidates.iter().map(|f| descriptor.call(&f.name))).await;

        let mut links = Vec::new();
        for (function, result) in candidates.iter().zip(results) {
            match result {
                Ok(values) => links.extend(link_targets(function, &values)),
                Err(e) => {
                    stats.failed_probes += 1;
                    warn!(
                        address = %descriptor.address(),
                        function = %function.name,
                        error = %e,
                        "link probe failed"
                    );
                }
            }
        }
        links
    }
}

/// Implementation interface plus any function only the proxy declares.
fn merge_abi(implementation: &JsonAbi, proxy: &JsonAbi) -> JsonAbi {
    let mut merged = implementation.clone();
    for (name, overloads) in &proxy.functions {
        merged
            .functions
            .entry(name.clone())
            .or_insert_with(|| overloads.clone());
    }
    merged
}

/// Name the links carried by one function's decoded outputs.
///
/// Single-output functions produce `fn` or `fn[i]`; multi-output functions
/// qualify with the output name (or its position when unnamed), as in
/// `fn.out` and `fn.out[i]`. Nested arrays index every level, as in
/// `fn[i][j]`.
fn link_targets(function: &ReadFunction, values: &[DynSolValue]) -> Vec<LinkTarget> {
    let multi = function.outputs.len() > 1;
    let mut links = Vec::new();
    for (i, (slot, value)) in function.outputs.iter().zip(values).enumerate() {
        if !slot.holds_addresses() {
            continue;
        }
        let base = if !multi {
            function.name.clone()
        } else if slot.name.is_empty() {
            format!("{}.{}", function.name, i)
        } else {
            format!("{}.{}", function.name, slot.name)
        };
        collect_addresses(value, base, &mut links);
    }
    links
}

fn collect_addresses(value: &DynSolValue, name: String, links: &mut Vec<LinkTarget>) {
    match value {
        DynSolValue::Address(address) => links.push(LinkTarget {
            to: NodeKey::from_address(*address),
            name,
        }),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            for (j, item) in items.iter().enumerate() {
                collect_addresses(item, format!("{name}[{j}]"), links);
            }
        }
        _ => {}
    }
}
