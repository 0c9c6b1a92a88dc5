use std::fmt;

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::Function;
use alloy_primitives::Address;
use async_trait::async_trait;
use lens_graph::Node;
use lens_ledger::LedgerProvider;
use lens_types::{MeasuredValue, Scalar};

use crate::error::{MeasureError, MeasureResult};
use crate::value::to_measured;

/// How a measurement obtains its value.
///
/// `other` is set for relational measurements and names the node the
/// measurement is taken against.
#[async_trait]
pub trait Calculation: Send + Sync {
    async fn evaluate(
        &self,
        provider: &dyn LedgerProvider,
        node: &Node,
        other: Option<&Node>,
    ) -> MeasureResult<MeasuredValue>;
}

/// Zero-argument read function on the node.
///
/// The function is looked up in the node's interface first. A fallback
/// signature lets the read work on contracts without published metadata.
#[derive(Clone, Debug)]
pub struct ViewCall {
    function: String,
    fallback: Option<Function>,
}

impl ViewCall {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            fallback: None,
        }
    }

    /// Read declared by a human-readable signature such as
    /// `function totalSupply() view returns (uint256)`.
    pub fn with_signature(signature: &str) -> MeasureResult<Self> {
        let function = Function::parse(signature)
            .map_err(|e| MeasureError::Conversion(format!("bad signature {signature:?}: {e}")))?;
        Ok(Self {
            function: function.name.clone(),
            fallback: Some(function),
        })
    }
}

#[async_trait]
impl Calculation for ViewCall {
    async fn evaluate(
        &self,
        provider: &dyn LedgerProvider,
        node: &Node,
        _other: Option<&Node>,
    ) -> MeasureResult<MeasuredValue> {
        let function = lookup(node, &self.function, 0, self.fallback.as_ref())?;
        let outputs = provider.call(ledger_address(node)?, &function, &[]).await?;
        to_measured(&outputs)
    }
}

/// Single-argument read function called with the other node's address,
/// such as `balanceOf(other)`.
#[derive(Clone, Debug)]
pub struct RelationalViewCall {
    function: String,
    fallback: Option<Function>,
}

impl RelationalViewCall {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            fallback: None,
        }
    }

    pub fn with_signature(signature: &str) -> MeasureResult<Self> {
        let function = Function::parse(signature)
            .map_err(|e| MeasureError::Conversion(format!("bad signature {signature:?}: {e}")))?;
        Ok(Self {
            function: function.name.clone(),
            fallback: Some(function),
        })
    }
}

#[async_trait]
impl Calculation for RelationalViewCall {
    async fn evaluate(
        &self,
        provider: &dyn LedgerProvider,
        node: &Node,
        other: Option<&Node>,
    ) -> MeasureResult<MeasuredValue> {
        let other = other.ok_or_else(|| MeasureError::MissingTarget(self.function.clone()))?;
        let function = lookup(node, &self.function, 1, self.fallback.as_ref())?;
        let arg = DynSolValue::Address(ledger_address(other)?);
        let outputs = provider.call(ledger_address(node)?, &function, &[arg]).await?;
        to_measured(&outputs)
    }
}

/// Native-currency balance of the node.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeBalance;

#[async_trait]
impl Calculation for NativeBalance {
    async fn evaluate(
        &self,
        provider: &dyn LedgerProvider,
        node: &Node,
        _other: Option<&Node>,
    ) -> MeasureResult<MeasuredValue> {
        let balance = provider.balance(ledger_address(node)?).await?;
        Ok(MeasuredValue::Value(Scalar::uint(balance)))
    }
}

type CalcFn = dyn Fn(&Node, Option<&Node>) -> MeasureResult<MeasuredValue> + Send + Sync;

/// Calculation computed by a closure from node data alone.
pub struct FnCalculation {
    f: Box<CalcFn>,
}

impl FnCalculation {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Node, Option<&Node>) -> MeasureResult<MeasuredValue> + Send + Sync + 'static,
    {
        Self { f: Box::new(f) }
    }
}

impl fmt::Debug for FnCalculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnCalculation")
    }
}

#[async_trait]
impl Calculation for FnCalculation {
    async fn evaluate(
        &self,
        _provider: &dyn LedgerProvider,
        node: &Node,
        other: Option<&Node>,
    ) -> MeasureResult<MeasuredValue> {
        (self.f)(node, other)
    }
}

fn ledger_address(node: &Node) -> MeasureResult<Address> {
    node.ledger_address()
        .ok_or_else(|| MeasureError::NoAddress(node.address.clone()))
}

/// Find a read function with `arity` inputs in the node's interface.
fn lookup(
    node: &Node,
    name: &str,
    arity: usize,
    fallback: Option<&Function>,
) -> MeasureResult<Function> {
    node.abi
        .as_ref()
        .and_then(|abi| abi.function(name))
        .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arity))
        .or(fallback)
        .cloned()
        .ok_or_else(|| MeasureError::UnknownFunction {
            contract: node.display_name.clone(),
            function: name.to_string(),
        })
}
