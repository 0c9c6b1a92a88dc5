//! Foundation types for Ledger Lens.
//!
//! This crate provides the identity and value types shared by every other
//! Ledger Lens crate.
//!
//! # Key Types
//!
//! - [`NodeKey`] - Case-normalized address text identifying a graph node
//! - [`NodeKind`] - Classification of a discovered address
//! - [`Integer`] - Sign-magnitude integer covering `uint256` and `int256`
//! - [`Scalar`] - A single measured value (integer, text, or boolean)
//! - [`MeasuredValue`] - A scalar, a homogeneous array, or an error message

pub mod error;
pub mod integer;
pub mod key;
pub mod kind;
pub mod value;

pub use error::TypeError;
pub use integer::Integer;
pub use key::NodeKey;
pub use kind::NodeKind;
pub use value::{MeasuredValue, Scalar};

/// Re-exported so downstream crates agree on one address type.
pub use alloy_primitives::{Address, I256, U256};
