use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Case-normalized textual address identifying a node.
///
/// Keys are built from untrusted input (seed lists, configuration) as well as
/// from decoded call results, so a key is allowed to hold text that is not a
/// well-formed address. Such keys classify as invalid nodes during discovery.
/// Two keys are equal when their normalized text is equal, so
/// `0xAbC...` and `0xabc...` name the same node.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    /// Normalize arbitrary input text into a key.
    pub fn new(input: impl AsRef<str>) -> Self {
        Self(input.as_ref().trim().to_ascii_lowercase())
    }

    /// Key for a decoded address.
    pub fn from_address(address: Address) -> Self {
        Self(format!("0x{}", hex::encode(address.as_slice())))
    }

    /// Key for the null address.
    pub fn zero() -> Self {
        Self::from_address(Address::ZERO)
    }

    /// The normalized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the key into an address, explaining why when it is malformed.
    pub fn parse(&self) -> Result<Address, TypeError> {
        let invalid = |reason: String| TypeError::InvalidAddress {
            input: self.0.clone(),
            reason,
        };
        let digits = self
            .0
            .strip_prefix("0x")
            .ok_or_else(|| invalid("missing 0x prefix".into()))?;
        if digits.len() != 40 {
            return Err(invalid(format!("expected 40 hex digits, got {}", digits.len())));
        }
        let bytes = hex::decode(digits).map_err(|e| invalid(e.to_string()))?;
        Ok(Address::from_slice(&bytes))
    }

    /// The address, or `None` when the key is malformed.
    pub fn address(&self) -> Option<Address> {
        self.parse().ok()
    }

    /// Returns `true` for the null address.
    pub fn is_zero(&self) -> bool {
        self.address().is_some_and(|a| a == Address::ZERO)
    }

    /// Abbreviated form used as a label for contracts without metadata.
    pub fn short(&self) -> String {
        if self.address().is_some() {
            format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
        } else {
            self.0.clone()
        }
    }
}

impl From<Address> for NodeKey {
    fn from(address: Address) -> Self {
        Self::from_address(address)
    }
}

impl fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeKey({})", self.0)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
