//! Network client for shellkeep.
//!
//! Provides the production `Fetcher`: an HTTP client that returns every
//! resolved response as-is and only fails on transport errors.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig};
