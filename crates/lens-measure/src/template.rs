use std::fmt;
use std::sync::Arc;

use lens_graph::Node;
use lens_types::{NodeKey, NodeKind};

use crate::calculation::Calculation;

/// Which nodes a template applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeSelector {
    /// One node by address.
    Address(NodeKey),
    /// Nodes whose class (contract name, or display name without metadata)
    /// or display name equals the given label.
    Class(String),
    /// Every node of a kind.
    Kind(NodeKind),
    /// Nodes that answered the token probe.
    Token,
    /// Every valid node.
    Any,
}

impl NodeSelector {
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Self::Address(key) => &node.address == key,
            Self::Class(class) => node.class_name() == class || &node.display_name == class,
            Self::Kind(kind) => &node.kind == kind,
            Self::Token => node.token.is_some(),
            Self::Any => node.kind != NodeKind::Invalid,
        }
    }
}

impl fmt::Display for NodeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(key) => write!(f, "address {key}"),
            Self::Class(class) => write!(f, "class {class}"),
            Self::Kind(kind) => write!(f, "kind {kind}"),
            Self::Token => f.write_str("tokens"),
            Self::Any => f.write_str("any node"),
        }
    }
}

/// A named, typed measurement bound to a calculation.
#[derive(Clone)]
pub struct MeasurementTemplate {
    pub name: String,
    /// Declared value type, e.g. `uint256` or `address[]`; used to select
    /// format rules.
    pub ty: String,
    /// Evaluated once against every other node when set.
    pub relational: bool,
    pub calculation: Arc<dyn Calculation>,
}

impl MeasurementTemplate {
    pub fn new(
        name: impl Into<String>,
        ty: impl Into<String>,
        calculation: impl Calculation + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            relational: false,
            calculation: Arc::new(calculation),
        }
    }

    /// Evaluate against every other node.
    pub fn relational(mut self) -> Self {
        self.relational = true;
        self
    }

    /// Returns `true` if the declared type is an array type.
    pub fn is_array(&self) -> bool {
        self.ty.ends_with(']')
    }
}

impl fmt::Debug for MeasurementTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasurementTemplate")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("relational", &self.relational)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::NativeBalance;
    use alloy_primitives::Address;
    use lens_graph::TokenInfo;

    fn proxy() -> Node {
        let mut node = Node::contract(NodeKey::from_address(Address::repeat_byte(1)));
        node.display_name = "VaultProxy".into();
        node.contract_name = Some("Vault".into());
        node
    }

    #[test]
    fn selectors() {
        let node = proxy();
        assert!(NodeSelector::Class("Vault".into()).matches(&node));
        assert!(NodeSelector::Class("VaultProxy".into()).matches(&node));
        assert!(!NodeSelector::Class("Pool".into()).matches(&node));
        assert!(NodeSelector::Address(node.address.clone()).matches(&node));
        assert!(NodeSelector::Kind(NodeKind::Contract).matches(&node));
        assert!(!NodeSelector::Token.matches(&node));
        assert!(NodeSelector::Any.matches(&node));
        assert!(!NodeSelector::Any.matches(&Node::invalid(NodeKey::new("x"))));

        let mut token = proxy();
        token.token = Some(TokenInfo {
            symbol: "V".into(),
            name: "Vault Share".into(),
        });
        assert!(NodeSelector::Token.matches(&token));
    }

    #[test]
    fn template_builder() {
        let t = MeasurementTemplate::new("balance", "uint256", NativeBalance);
        assert!(!t.relational);
        assert!(!t.is_array());
        let t = MeasurementTemplate::new("holders", "address[]", NativeBalance).relational();
        assert!(t.relational);
        assert!(t.is_array());
    }
}
