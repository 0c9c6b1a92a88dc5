use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a discovered address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// The address has deployed code.
    Contract,
    /// An externally owned (or otherwise code-less) account.
    SimpleAddress,
    /// The input text is not a well-formed address.
    Invalid,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contract => write!(f, "contract"),
            Self::SimpleAddress => write!(f, "simpleAddress"),
            Self::Invalid => write!(f, "invalid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_serde_agree() {
        for kind in [NodeKind::Contract, NodeKind::SimpleAddress, NodeKind::Invalid] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }
}
