//! # levelcrawl-core
//!
//! Level-synchronous breadth-first crawler over a graph whose adjacency lives
//! behind a remote lookup service - THE LOGIC.
//!
//! Given a start vertex and a depth bound, a crawl produces one frontier per
//! depth: the distinct vertices first reached at that distance.
//!
//! ## Architecture
//!
//! ```text
//! Crawler (orchestrator)
//!   ├── LevelStart(d): open frontier d+1
//!   ├── Fanout(d):     one expansion task per vertex of frontier d
//!   │     └── NeighborSource::fetch_neighbors
//!   │           └── VisitedSet::try_claim → LevelStore::append(d+1)
//!   └── Barrier(d):    drain every task of depth d
//! ```
//!
//! ## Architectural Constraints
//!
//! - No transport: the core talks to the graph only through [`NeighborSource`]
//! - No globals: visited set and level store are owned by one crawl
//! - A failed lookup never aborts sibling expansions

// =============================================================================
// MODULES
// =============================================================================

pub mod expansion;
pub mod levels;
pub mod orchestrator;
pub mod primitives;
pub mod source;
pub mod types;
pub mod visited;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CrawlError, ExpansionFailure, FailureCause, FetchError, Frontier, Vertex};

// =============================================================================
// RE-EXPORTS: Crawl Engine
// =============================================================================

pub use expansion::{ExpansionOutcome, expand};
pub use levels::LevelStore;
pub use orchestrator::{CrawlConfig, CrawlReport, Crawler, FailurePolicy};
pub use source::{MemorySource, NeighborSource};
pub use visited::VisitedSet;
