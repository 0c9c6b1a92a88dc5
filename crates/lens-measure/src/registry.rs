use std::sync::Arc;

use lens_graph::{GraphContext, Node};
use lens_ledger::LedgerProvider;
use lens_types::MeasuredValue;
use tracing::{debug, info};

use crate::calculation::{RelationalViewCall, ViewCall};
use crate::error::MeasureResult;
use crate::set::{Measurement, MeasurementSet, NodeMeasurements};
use crate::template::{MeasurementTemplate, NodeSelector};

/// Templates bound to node selectors, evaluated in a fixed order.
pub struct MeasurementRegistry {
    provider: Arc<dyn LedgerProvider>,
    entries: Vec<(NodeSelector, MeasurementTemplate)>,
}

impl MeasurementRegistry {
    pub fn new(provider: Arc<dyn LedgerProvider>) -> Self {
        Self {
            provider,
            entries: Vec::new(),
        }
    }

    /// Bind a template to the nodes `selector` matches. Registration order
    /// is evaluation order.
    pub fn register(&mut self, selector: NodeSelector, template: MeasurementTemplate) {
        debug!(%selector, name = %template.name, relational = template.relational, "registered measurement");
        self.entries.push((selector, template));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluate every template against the nodes of `ctx`.
    ///
    /// Nodes are visited sorted by label. Each node gets its plain
    /// measurements first, then each relational measurement against every
    /// other discovered node, again sorted by label. Invalid targets have no
    /// ledger address, so their relational measurements hold an error. A
    /// failing calculation is stored as an error value; evaluation always
    /// completes.
    pub async fn evaluate_all(&self, ctx: &GraphContext) -> MeasurementSet {
        let nodes = ctx.sorted_by_label();
        let mut result = Vec::with_capacity(nodes.len());

        for node in &nodes {
            let templates: Vec<&MeasurementTemplate> = self
                .entries
                .iter()
                .filter(|(selector, _)| selector.matches(node))
                .map(|(_, template)| template)
                .collect();
            if templates.is_empty() {
                continue;
            }

            let mut measurements = Vec::new();
            for template in templates.iter().filter(|t| !t.relational) {
                let outcome = self.run(template, node, None).await;
                measurements.push(Measurement {
                    name: template.name.clone(),
                    ty: template.ty.clone(),
                    target: None,
                    outcome,
                });
            }
            for template in templates.iter().filter(|t| t.relational) {
                for other in nodes.iter().filter(|o| o.address != node.address) {
                    let outcome = self.run(template, node, Some(*other)).await;
                    measurements.push(Measurement {
                        name: template.name.clone(),
                        ty: template.ty.clone(),
                        target: Some(other.address.clone()),
                        outcome,
                    });
                }
            }

            result.push(NodeMeasurements {
                address: node.address.clone(),
                name: node.display_name.clone(),
                contract_label: node.class_name().to_string(),
                measurements,
            });
        }

        let set = MeasurementSet::new(result);
        info!(
            nodes = set.len(),
            measurements = set.nodes.iter().map(|n| n.measurements.len()).sum::<usize>(),
            successes = set.successes(),
            "evaluated measurements"
        );
        set
    }

    async fn run(&self, template: &MeasurementTemplate, node: &Node, other: Option<&Node>) -> MeasuredValue {
        match template
            .calculation
            .evaluate(self.provider.as_ref(), node, other)
            .await
        {
            Ok(value) => value,
            Err(e) => {
                debug!(
                    node = %node.address,
                    measurement = %template.name,
                    error = %e,
                    "measurement failed"
                );
                MeasuredValue::error(e)
            }
        }
    }
}

/// Register `totalSupply` and relational `balanceOf` for every token node.
pub fn register_token_defaults(registry: &mut MeasurementRegistry) -> MeasureResult<()> {
    registry.register(
        NodeSelector::Token,
        MeasurementTemplate::new(
            "totalSupply",
            "uint256",
            ViewCall::with_signature("function totalSupply() view returns (uint256)")?,
        ),
    );
    registry.register(
        NodeSelector::Token,
        MeasurementTemplate::new(
            "balanceOf",
            "uint256",
            RelationalViewCall::with_signature("function balanceOf(address) view returns (uint256)")?,
        )
        .relational(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::{FnCalculation, NativeBalance};
    use crate::error::MeasureError;
    use alloy_dyn_abi::DynSolValue;
    use alloy_primitives::{Address, U256};
    use lens_graph::TokenInfo;
    use lens_ledger::InMemoryChain;
    use lens_types::{NodeKey, Scalar};

    fn addr(b: u8) -> Address {
        Address::repeat_byte(b)
    }

    fn node(b: u8, name: &str) -> Node {
        let mut node = Node::contract(NodeKey::from_address(addr(b)));
        node.display_name = name.into();
        node
    }

    fn fixture() -> (Arc<InMemoryChain>, GraphContext) {
        let chain = Arc::new(InMemoryChain::new());
        let mut ctx = GraphContext::new();
        let mut token = node(1, "Token");
        token.token = Some(TokenInfo {
            symbol: "TKN".into(),
            name: "Token".into(),
        });
        chain.deploy(addr(1));
        ctx.insert(token);
        ctx.insert(node(2, "Alice"));
        ctx.insert(node(3, "Bob"));
        ctx.insert(Node::invalid(NodeKey::new("garbage")));
        (chain, ctx)
    }

    #[tokio::test]
    async fn order_is_sorted_and_relational_skips_self() {
        let (chain, ctx) = fixture();
        chain.set_read(addr(1), "totalSupply", vec![DynSolValue::Uint(U256::from(30), 256)]);
        for (holder, amount) in [(2u8, 10u64), (3, 20)] {
            chain.set_read_with_args(
                addr(1),
                "balanceOf",
                &[DynSolValue::Address(addr(holder))],
                vec![DynSolValue::Uint(U256::from(amount), 256)],
            );
        }

        let mut registry = MeasurementRegistry::new(chain);
        register_token_defaults(&mut registry).unwrap();
        registry.register(
            NodeSelector::Any,
            MeasurementTemplate::new("ether", "uint256", NativeBalance),
        );
        let set = registry.evaluate_all(&ctx).await;

        let names: Vec<&str> = set.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Token"]);

        let token = &set.nodes[2];
        let labels: Vec<String> = token.measurements.iter().map(|m| m.name.clone()).collect();
        assert_eq!(
            labels,
            vec!["totalSupply", "ether", "balanceOf", "balanceOf", "balanceOf"]
        );
        assert_eq!(token.measurements[2].target, Some(NodeKey::from_address(addr(2))));
        assert_eq!(token.measurements[2].outcome, MeasuredValue::Value(Scalar::int(10)));
        assert_eq!(token.measurements[3].outcome, MeasuredValue::Value(Scalar::int(20)));
    }

    #[tokio::test]
    async fn invalid_targets_get_error_outcomes() {
        let (chain, ctx) = fixture();
        let mut registry = MeasurementRegistry::new(chain);
        register_token_defaults(&mut registry).unwrap();
        let set = registry.evaluate_all(&ctx).await;

        let token = set.nodes.iter().find(|n| n.name == "Token").unwrap();
        let garbage = token
            .measurements
            .iter()
            .find(|m| m.target == Some(NodeKey::new("garbage")))
            .unwrap();
        assert_eq!(garbage.name, "balanceOf");
        assert!(garbage.outcome.is_error());
    }

    #[tokio::test]
    async fn unlimited_supply_is_measured() {
        let (chain, ctx) = fixture();
        chain.set_read(addr(1), "totalSupply", vec![DynSolValue::Uint(U256::MAX, 256)]);
        let mut registry = MeasurementRegistry::new(chain);
        register_token_defaults(&mut registry).unwrap();
        let set = registry.evaluate_all(&ctx).await;

        let token = set.nodes.iter().find(|n| n.name == "Token").unwrap();
        assert_eq!(token.measurements[0].name, "totalSupply");
        assert_eq!(
            token.measurements[0].outcome,
            MeasuredValue::Value(Scalar::uint(U256::MAX))
        );
    }

    #[tokio::test]
    async fn failures_are_captured_per_measurement() {
        let (chain, ctx) = fixture();
        let mut registry = MeasurementRegistry::new(chain);
        registry.register(
            NodeSelector::Class("Alice".into()),
            MeasurementTemplate::new(
                "fails",
                "uint256",
                FnCalculation::new(|_, _| Err(MeasureError::Custom("boom".into()))),
            ),
        );
        registry.register(
            NodeSelector::Class("Alice".into()),
            MeasurementTemplate::new(
                "works",
                "bool",
                FnCalculation::new(|_, _| Ok(MeasuredValue::Value(Scalar::Bool(true)))),
            ),
        );

        let set = registry.evaluate_all(&ctx).await;
        assert_eq!(set.len(), 1);
        let alice = &set.nodes[0];
        assert_eq!(alice.measurements[0].outcome, MeasuredValue::error("boom"));
        assert_eq!(alice.measurements[1].outcome, MeasuredValue::Value(Scalar::Bool(true)));
        assert_eq!(set.successes(), 1);
    }

    #[tokio::test]
    async fn evaluation_is_repeatable() {
        let (chain, ctx) = fixture();
        let mut registry = MeasurementRegistry::new(chain);
        register_token_defaults(&mut registry).unwrap();
        let first = registry.evaluate_all(&ctx).await;
        let second = registry.evaluate_all(&ctx).await;
        assert_eq!(first, second);
    }
}
