use std::collections::BTreeMap;

use lens_types::NodeKey;

use crate::node::{Link, Node};

/// Caller-owned store of discovered nodes.
///
/// Nodes are kept keyed by address and remember the order in which they were
/// first visited. Measurement and reporting iterate them sorted by label.
#[derive(Clone, Debug, Default)]
pub struct GraphContext {
    nodes: BTreeMap<NodeKey, Node>,
    order: Vec<NodeKey>,
}

impl GraphContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. An existing node with the same address is replaced and
    /// keeps its original discovery position.
    pub fn insert(&mut self, node: Node) {
        let key = node.address.clone();
        if self.nodes.insert(key.clone(), node).is_none() {
            self.order.push(key);
        }
    }

    /// Look up a node by address.
    pub fn get(&self, key: &NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Returns `true` if the address has been visited.
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if nothing has been discovered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|k| self.nodes.get(k))
    }

    /// Every link, grouped by source node in discovery order.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.nodes().flat_map(Node::outgoing)
    }

    /// Nodes sorted by display name, ties broken by address.
    pub fn sorted_by_label(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.values().collect();
        nodes.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.address.cmp(&b.address))
        });
        nodes
    }

    /// Find a node by label.
    ///
    /// Display names win over contract names, which win over token symbols;
    /// an address always matches its own node.
    pub fn find(&self, label: &str) -> Option<&Node> {
        let sorted = self.sorted_by_label();
        sorted
            .iter()
            .find(|n| n.display_name == label)
            .or_else(|| sorted.iter().find(|n| n.contract_name.as_deref() == Some(label)))
            .or_else(|| {
                sorted
                    .iter()
                    .find(|n| n.token.as_ref().is_some_and(|t| t.symbol == label))
            })
            .copied()
            .or_else(|| self.get(&NodeKey::new(label)))
    }
}
