use serde::{Deserialize, Serialize};

use lens_types::{MeasuredValue, NodeKey};

/// One evaluated measurement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Other node of a relational measurement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeKey>,
    pub outcome: MeasuredValue,
}

impl Measurement {
    /// Display name: `name` or `name(target)` for relational measurements.
    pub fn label(&self) -> String {
        match &self.target {
            Some(target) => format!("{}({})", self.name, target.short()),
            None => self.name.clone(),
        }
    }
}

/// Measurements of one node, in registration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMeasurements {
    pub address: NodeKey,
    /// Display name of the node.
    pub name: String,
    /// Class the measurements were selected by.
    pub contract_label: String,
    pub measurements: Vec<Measurement>,
}

/// Outcome of the action that produced a post-action measurement set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSummary {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    /// Value returned by a read-only action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned: Option<MeasuredValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of one registry evaluation, ordered by node label.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementSet {
    pub nodes: Vec<NodeMeasurements>,
    /// Set on post-action sets; never compared when diffing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ActionSummary>,
}

impl MeasurementSet {
    pub fn new(nodes: Vec<NodeMeasurements>) -> Self {
        Self {
            nodes,
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: ActionSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of measurements that produced a value.
    pub fn successes(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|n| &n.measurements)
            .filter(|m| !m.outcome.is_error())
            .count()
    }

    /// Look up a measurement by node, name and relational target.
    pub fn find(&self, address: &NodeKey, name: &str, target: Option<&NodeKey>) -> Option<&Measurement> {
        self.nodes
            .iter()
            .find(|n| &n.address == address)?
            .measurements
            .iter()
            .find(|m| m.name == name && m.target.as_ref() == target)
    }
}
