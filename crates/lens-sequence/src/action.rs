use alloy_dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy_json_abi::{Function, StateMutability};
use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use lens_graph::GraphContext;
use lens_ledger::LedgerProvider;
use lens_measure::to_measured;
use lens_types::MeasuredValue;
use serde::{Deserialize, Serialize};

use crate::error::{SequenceError, SequenceResult};

/// What an action produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    /// A transaction was submitted; its receipt is still pending.
    Submitted(TxHash),
    /// A read-only call returned a value.
    Returned(MeasuredValue),
}

/// One step of an action sequence.
#[async_trait]
pub trait ActionInvoker: Send + Sync {
    /// Label the action is reported under.
    fn label(&self) -> &str;

    async fn invoke(&self, provider: &dyn LedgerProvider) -> SequenceResult<Invocation>;
}

/// Configured action, as read from a run configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Label of the target contract node.
    pub contract: String,
    pub function: String,
    /// User label; defaults to `contract.function`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Arguments in their textual form, coerced to the parameter types.
    #[serde(default)]
    pub args: Vec<String>,
}

impl ActionSpec {
    pub fn label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("{}.{}", self.contract, self.function))
    }
}

/// An [`ActionSpec`] resolved against a discovered graph.
#[derive(Clone, Debug)]
pub struct ContractAction {
    label: String,
    address: Address,
    function: Function,
    args: Vec<DynSolValue>,
}

impl ContractAction {
    /// Find the target node and function, and coerce the arguments.
    pub fn resolve(ctx: &GraphContext, spec: &ActionSpec) -> SequenceResult<Self> {
        let node = ctx
            .find(&spec.contract)
            .ok_or_else(|| SequenceError::UnknownContract(spec.contract.clone()))?;
        let address = node
            .ledger_address()
            .ok_or_else(|| SequenceError::UnknownContract(spec.contract.clone()))?;
        let unknown = || SequenceError::UnknownFunction {
            contract: spec.contract.clone(),
            function: spec.function.clone(),
            arity: spec.args.len(),
        };
        let function = node
            .abi
            .as_ref()
            .and_then(|abi| abi.function(&spec.function))
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == spec.args.len()))
            .cloned()
            .ok_or_else(unknown)?;

        let args = function
            .inputs
            .iter()
            .zip(&spec.args)
            .enumerate()
            .map(|(index, (param, text))| {
                let invalid = |reason: String| SequenceError::InvalidArgument {
                    function: function.name.clone(),
                    index,
                    reason,
                };
                let ty: DynSolType = param.resolve().map_err(|e| invalid(e.to_string()))?;
                ty.coerce_str(text).map_err(|e| invalid(e.to_string()))
            })
            .collect::<SequenceResult<Vec<_>>>()?;

        Ok(Self {
            label: spec.label(),
            address,
            function,
            args,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    fn is_read_only(&self) -> bool {
        matches!(
            self.function.state_mutability,
            StateMutability::View | StateMutability::Pure
        )
    }
}

#[async_trait]
impl ActionInvoker for ContractAction {
    fn label(&self) -> &str {
        &self.label
    }

    async fn invoke(&self, provider: &dyn LedgerProvider) -> SequenceResult<Invocation> {
        if self.is_read_only() {
            let outputs = provider.call(self.address, &self.function, &self.args).await?;
            return Ok(Invocation::Returned(to_measured(&outputs)?));
        }
        let tx = provider.send(self.address, &self.function, &self.args).await?;
        Ok(Invocation::Submitted(tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_json_abi::JsonAbi;
    use alloy_primitives::U256;
    use lens_graph::Node;
    use lens_ledger::InMemoryChain;
    use lens_types::{NodeKey, Scalar};

    fn ctx() -> GraphContext {
        let mut abi = JsonAbi::default();
        for signature in [
            "function deposit(uint256 amount, address to)",
            "function preview(uint256 amount) view returns (uint256)",
        ] {
            let f = Function::parse(signature).unwrap();
            abi.functions.entry(f.name.clone()).or_default().push(f);
        }
        let mut node = Node::contract(NodeKey::from_address(Address::repeat_byte(1)));
        node.display_name = "Vault".into();
        node.abi = Some(abi);
        let mut ctx = GraphContext::new();
        ctx.insert(node);
        ctx
    }

    fn spec(function: &str, args: &[&str]) -> ActionSpec {
        ActionSpec {
            contract: "Vault".into(),
            function: function.into(),
            label: None,
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn resolves_and_coerces_arguments() {
        let to = format!("0x{}", "22".repeat(20));
        let action = ContractAction::resolve(&ctx(), &spec("deposit", &["1000", to.as_str()])).unwrap();
        assert_eq!(action.label(), "Vault.deposit");
        assert_eq!(action.address(), Address::repeat_byte(1));
        assert_eq!(
            action.args,
            vec![
                DynSolValue::Uint(U256::from(1000), 256),
                DynSolValue::Address(Address::repeat_byte(0x22)),
            ]
        );
    }

    #[test]
    fn resolution_errors() {
        let ctx = ctx();
        let mut missing = spec("deposit", &["1"]);
        assert!(matches!(
            ContractAction::resolve(&ctx, &missing),
            Err(SequenceError::UnknownFunction { arity: 1, .. })
        ));
        missing.contract = "Pool".into();
        assert!(matches!(
            ContractAction::resolve(&ctx, &missing),
            Err(SequenceError::UnknownContract(_))
        ));
        assert!(matches!(
            ContractAction::resolve(&ctx, &spec("preview", &["lots"])),
            Err(SequenceError::InvalidArgument { index: 0, .. })
        ));
    }

    #[tokio::test]
    async fn read_only_actions_return_values() {
        let chain = InMemoryChain::new();
        let a = Address::repeat_byte(1);
        chain.deploy(a);
        chain.set_read_with_args(
            a,
            "preview",
            &[DynSolValue::Uint(U256::from(5), 256)],
            vec![DynSolValue::Uint(U256::from(4), 256)],
        );
        let action = ContractAction::resolve(&ctx(), &spec("preview", &["5"])).unwrap();
        assert_eq!(
            action.invoke(&chain).await.unwrap(),
            Invocation::Returned(MeasuredValue::Value(Scalar::int(4)))
        );
    }

    #[tokio::test]
    async fn state_changing_actions_submit() {
        let chain = InMemoryChain::new();
        chain.on_send(Address::repeat_byte(1), "deposit", 0, |_, _| Ok(()));
        let to = format!("0x{}", "22".repeat(20));
        let action = ContractAction::resolve(&ctx(), &spec("deposit", &["1", to.as_str()])).unwrap();
        assert!(matches!(action.invoke(&chain).await.unwrap(), Invocation::Submitted(_)));
    }
}
