//! Entity graph discovery for Ledger Lens.
//!
//! Starting from seed addresses, [`GraphBuilder`] walks the ledger breadth
//! first. Every contract it meets is asked, through its zero-argument
//! read-only functions, which other addresses it points at; each answer
//! becomes a named [`Link`] and the target is queued for a visit.
//!
//! The discovered graph lives in a caller-owned [`GraphContext`]. Nodes are
//! created on first visit and are not modified once discovery finishes.

pub mod builder;
pub mod context;
pub mod descriptor;
pub mod diagram;
pub mod error;
pub mod node;

pub use builder::{DiscoveryStats, GraphBuilder};
pub use context::GraphContext;
pub use descriptor::{ContractDescriptor, OutputSlot, ReadFunction};
pub use diagram::render_mermaid;
pub use error::{GraphError, GraphResult};
pub use node::{Creation, Implementation, Link, LinkTarget, Node, TokenInfo};
