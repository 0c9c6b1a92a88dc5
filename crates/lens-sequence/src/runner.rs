use std::sync::Arc;

use async_trait::async_trait;
use lens_graph::GraphContext;
use lens_ledger::LedgerProvider;
use lens_measure::{ActionSummary, MeasurementRegistry, MeasurementSet};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::action::{ActionInvoker, Invocation};
use crate::error::SequenceResult;
use crate::snapshot::Snapshotter;

/// Produces the measurement set of the current ledger state.
#[async_trait]
pub trait MeasureState: Send + Sync {
    async fn measure(&self) -> MeasurementSet;
}

/// Measures a graph with a registry.
pub struct RegistryState<'a> {
    pub registry: &'a MeasurementRegistry,
    pub ctx: &'a GraphContext,
}

#[async_trait]
impl MeasureState for RegistryState<'_> {
    async fn measure(&self) -> MeasurementSet {
        self.registry.evaluate_all(self.ctx).await
    }
}

/// Outcome of one action and the state measured after it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReport {
    pub summary: ActionSummary,
    /// Post-action measurements; carries the same summary.
    pub after: MeasurementSet,
}

impl ActionReport {
    pub fn label(&self) -> &str {
        &self.summary.label
    }

    pub fn error(&self) -> Option<&str> {
        self.summary.error.as_deref()
    }
}

/// Runs actions against a common base state.
pub struct ActionRunner {
    provider: Arc<dyn LedgerProvider>,
}

impl ActionRunner {
    pub fn new(provider: Arc<dyn LedgerProvider>) -> Self {
        Self { provider }
    }

    /// Run `actions` in order, measuring after each.
    ///
    /// The base state is captured once. After every action except the last
    /// the ledger is restored to it. Invocation failures are recorded on the
    /// report; snapshot and restore failures abort the sequence.
    pub async fn run_sequence(
        &self,
        measure: &dyn MeasureState,
        actions: &[Box<dyn ActionInvoker>],
    ) -> SequenceResult<Vec<ActionReport>> {
        let mut snapshotter = Snapshotter::new(self.provider.clone());
        snapshotter.capture().await?;

        let mut reports = Vec::with_capacity(actions.len());
        for (i, action) in actions.iter().enumerate() {
            info!(label = action.label(), index = i, "running action");
            let summary = self.invoke(action.as_ref()).await;
            let after = measure.measure().await.with_summary(summary.clone());
            reports.push(ActionReport { summary, after });

            if i + 1 < actions.len() {
                snapshotter.restore().await?;
            }
        }
        Ok(reports)
    }

    async fn invoke(&self, action: &dyn ActionInvoker) -> ActionSummary {
        let mut summary = ActionSummary {
            label: action.label().to_string(),
            ..ActionSummary::default()
        };
        let result = match action.invoke(self.provider.as_ref()).await {
            Ok(Invocation::Submitted(tx)) => match self.provider.receipt(tx).await {
                Ok(receipt) if receipt.success => {
                    summary.gas_used = Some(receipt.gas_used);
                    Ok(())
                }
                Ok(receipt) => {
                    summary.gas_used = Some(receipt.gas_used);
                    Err(format!("transaction {tx} reverted"))
                }
                Err(e) => Err(e.to_string()),
            },
            Ok(Invocation::Returned(value)) => {
                summary.returned = Some(value);
                Ok(())
            }
            Err(e) => Err(e.to_string()),
        };
        match result {
            Ok(()) => info!(label = %summary.label, gas_used = ?summary.gas_used, "action completed"),
            Err(e) => {
                warn!(label = %summary.label, error = %e, "action failed");
                summary.error = Some(e);
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionSpec, ContractAction};
    use crate::error::SequenceError;
    use alloy_dyn_abi::DynSolValue;
    use alloy_json_abi::{Function, JsonAbi};
    use alloy_primitives::{Address, U256};
    use lens_graph::Node;
    use lens_ledger::InMemoryChain;
    use lens_measure::{MeasurementTemplate, NodeSelector, ViewCall};
    use lens_types::{MeasuredValue, NodeKey, Scalar};

    const COUNTER: u8 = 1;

    fn uint(v: u64) -> DynSolValue {
        DynSolValue::Uint(U256::from(v), 256)
    }

    fn count_of(state: &lens_ledger::ContractState<'_>) -> u64 {
        match state.get("count") {
            Some([DynSolValue::Uint(v, _)]) => v.to::<u64>(),
            _ => 0,
        }
    }

    /// A counter contract with `increment()`, `add(uint256)` and a
    /// reverting `fail()`.
    fn setup() -> (Arc<InMemoryChain>, GraphContext, MeasurementRegistry) {
        let chain = Arc::new(InMemoryChain::new());
        let a = Address::repeat_byte(COUNTER);
        chain.deploy(a);
        chain.set_read(a, "count", vec![uint(0)]);
        chain.on_send(a, "increment", 30_000, |c, _| {
            let next = count_of(c) + 1;
            c.set("count", vec![uint(next)]);
            Ok(())
        });
        chain.on_send(a, "add", 0, |c, args| {
            let by = match args {
                [DynSolValue::Uint(v, _)] => v.to::<u64>(),
                _ => return Err("bad args".into()),
            };
            let next = count_of(c) + by;
            c.set("count", vec![uint(next)]);
            Ok(())
        });
        chain.on_send(a, "fail", 0, |_, _| Err("always reverts".into()));

        let mut abi = JsonAbi::default();
        for signature in [
            "function count() view returns (uint256)",
            "function increment()",
            "function add(uint256 by)",
            "function fail()",
        ] {
            let f = Function::parse(signature).unwrap();
            abi.functions.entry(f.name.clone()).or_default().push(f);
        }
        let mut node = Node::contract(NodeKey::from_address(a));
        node.display_name = "Counter".into();
        node.abi = Some(abi);
        let mut ctx = GraphContext::new();
        ctx.insert(node);

        let mut registry = MeasurementRegistry::new(chain.clone());
        registry.register(
            NodeSelector::Class("Counter".into()),
            MeasurementTemplate::new("count", "uint256", ViewCall::new("count")),
        );
        (chain, ctx, registry)
    }

    fn action(ctx: &GraphContext, function: &str, args: &[&str]) -> Box<dyn ActionInvoker> {
        let spec = ActionSpec {
            contract: "Counter".into(),
            function: function.into(),
            label: None,
            args: args.iter().map(|s| s.to_string()).collect(),
        };
        Box::new(ContractAction::resolve(ctx, &spec).unwrap())
    }

    fn count_in(set: &MeasurementSet) -> MeasuredValue {
        set.nodes[0].measurements[0].outcome.clone()
    }

    #[tokio::test]
    async fn actions_start_from_the_same_base_state() {
        let (chain, ctx, registry) = setup();
        let state = RegistryState {
            registry: &registry,
            ctx: &ctx,
        };
        let actions = vec![action(&ctx, "increment", &[]), action(&ctx, "add", &["10"])];

        let reports = ActionRunner::new(chain.clone())
            .run_sequence(&state, &actions)
            .await
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(count_in(&reports[0].after), MeasuredValue::Value(Scalar::int(1)));
        // The increment was rolled back before `add` ran.
        assert_eq!(count_in(&reports[1].after), MeasuredValue::Value(Scalar::int(10)));
        // The last action's effect stays on the ledger.
        assert_eq!(chain.read(Address::repeat_byte(COUNTER), "count"), Some(vec![uint(10)]));

        assert_eq!(reports[0].summary.gas_used, Some(30_000));
        assert_eq!(reports[1].label(), "Counter.add");
        assert_eq!(reports[1].after.summary.as_ref(), Some(&reports[1].summary));
    }

    #[tokio::test]
    async fn failed_action_is_recorded_and_measured() {
        let (chain, ctx, registry) = setup();
        let state = RegistryState {
            registry: &registry,
            ctx: &ctx,
        };
        let actions = vec![action(&ctx, "fail", &[]), action(&ctx, "increment", &[])];

        let reports = ActionRunner::new(chain).run_sequence(&state, &actions).await.unwrap();

        assert!(reports[0].error().is_some_and(|e| e.contains("always reverts")));
        assert_eq!(reports[0].summary.gas_used, None);
        assert_eq!(count_in(&reports[0].after), MeasuredValue::Value(Scalar::int(0)));
        assert!(reports[1].error().is_none());
        assert_eq!(count_in(&reports[1].after), MeasuredValue::Value(Scalar::int(1)));
    }

    #[tokio::test]
    async fn read_only_action_records_returned_value() {
        let (chain, ctx, registry) = setup();
        let state = RegistryState {
            registry: &registry,
            ctx: &ctx,
        };
        let actions = vec![action(&ctx, "count", &[])];

        let reports = ActionRunner::new(chain).run_sequence(&state, &actions).await.unwrap();
        assert_eq!(
            reports[0].summary.returned,
            Some(MeasuredValue::Value(Scalar::int(0)))
        );
        assert_eq!(reports[0].summary.gas_used, None);
    }

    #[tokio::test]
    async fn snapshot_failure_aborts() {
        let (chain, ctx, registry) = setup();
        let state = RegistryState {
            registry: &registry,
            ctx: &ctx,
        };
        chain.fail_snapshots(true);
        let actions = vec![action(&ctx, "increment", &[])];

        let err = ActionRunner::new(chain.clone())
            .run_sequence(&state, &actions)
            .await
            .unwrap_err();
        assert!(matches!(err, SequenceError::Snapshot(_)));
        assert_eq!(chain.read(Address::repeat_byte(COUNTER), "count"), Some(vec![uint(0)]));
    }

    /// Measures, then breaks the chain's snapshot support.
    struct BreakSnapshotsAfterMeasuring<'a> {
        inner: RegistryState<'a>,
        chain: Arc<InMemoryChain>,
    }

    #[async_trait]
    impl MeasureState for BreakSnapshotsAfterMeasuring<'_> {
        async fn measure(&self) -> MeasurementSet {
            let set = self.inner.measure().await;
            self.chain.fail_snapshots(true);
            set
        }
    }

    #[tokio::test]
    async fn restore_failure_between_actions_aborts() {
        let (chain, ctx, registry) = setup();
        let state = BreakSnapshotsAfterMeasuring {
            inner: RegistryState {
                registry: &registry,
                ctx: &ctx,
            },
            chain: chain.clone(),
        };
        let actions = vec![action(&ctx, "increment", &[]), action(&ctx, "add", &["10"])];

        let err = ActionRunner::new(chain.clone())
            .run_sequence(&state, &actions)
            .await
            .unwrap_err();
        assert!(matches!(err, SequenceError::Restore(_)));
        // The second action never ran; the first one's effect is still live.
        assert_eq!(chain.read(Address::repeat_byte(COUNTER), "count"), Some(vec![uint(1)]));
    }
}
