//! # Crawl Primitives
//!
//! Hardcoded runtime constants for the crawler.
//!
//! These are compiled into the binary; configuration may narrow them but
//! never lift the hard limits.

/// Maximum depth bound accepted for a single crawl.
///
/// - Every crawl must be computationally bounded.
/// - Each depth is a full round trip to the remote service per frontier vertex.
pub const MAX_CRAWL_DEPTH: usize = 100;

/// Maximum length of a vertex name, in bytes.
///
/// Enforced on the start vertex of a crawl and on single lookups. Names
/// reported by the service are taken as they come.
pub const MAX_VERTEX_NAME_LENGTH: usize = 1024;

/// Default number of in-flight expansions per depth.
///
/// `0` means unbounded: one concurrent task per frontier vertex.
pub const DEFAULT_MAX_CONCURRENCY: usize = 0;
