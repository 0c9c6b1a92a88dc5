//! Contract metadata resolution for Ledger Lens.
//!
//! Discovery needs, for every contract it visits, the verified contract name,
//! its ABI, the implementation it delegates to (for proxies) and who created
//! it. That information comes from a block-explorer style service behind the
//! [`MetadataResolver`] trait.
//!
//! # Caching
//!
//! Lookups are cached at two levels:
//!
//! - [`MetadataCache`] -- a persistent key/value cache keyed by request
//!   signature (`source:<address>`, `creation:<address>`).
//!   [`InMemoryMetadataCache`] and [`FileMetadataCache`] implement it.
//! - [`FetchCell`] -- one per address for the lifetime of a
//!   [`CachedResolver`], so an address is fetched at most once per process
//!   and a failure is remembered rather than retried.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod memory;
pub mod resolver;
pub mod traits;
pub mod types;

pub use cache::{FileMetadataCache, InMemoryMetadataCache};
pub use error::{MetadataError, MetadataResult};
pub use fetch::{FetchCell, FetchStatus};
pub use memory::StaticResolver;
pub use resolver::CachedResolver;
pub use traits::{MetadataCache, MetadataResolver};
pub use types::{CreationInfo, SourceInfo};
