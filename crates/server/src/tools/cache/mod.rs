//! Cache-region MCP tools.
//!
//! Direct inspection and maintenance of the three store regions, outside the
//! worker lifecycle.

pub mod list;
pub mod purge;

pub use list::{CacheListParams, list_impl};
pub use purge::{CachePurgeParams, purge_impl};
