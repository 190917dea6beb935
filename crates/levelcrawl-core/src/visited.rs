//! # Visited Set
//!
//! Run-wide deduplication of discovered vertices.
//!
//! The only write operation is [`VisitedSet::try_claim`], an atomic
//! test-and-insert. There is deliberately no separate `insert`: a
//! contains-then-insert sequence would let two concurrent discoverers both
//! believe they were first.

use crate::Vertex;
use dashmap::DashSet;

/// Concurrency-safe set of vertices already discovered in one crawl.
#[derive(Debug, Default)]
pub struct VisitedSet {
    claimed: DashSet<Vertex>,
}

impl VisitedSet {
    /// Create an empty visited set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a vertex.
    ///
    /// Returns `true` if the caller is the first to see `vertex` (it is now
    /// recorded), `false` if it was already claimed.
    pub fn try_claim(&self, vertex: &Vertex) -> bool {
        // DashSet::insert takes the shard write lock for the whole
        // test-and-insert, so only one caller observes `true`.
        self.claimed.insert(vertex.clone())
    }

    /// Check whether a vertex has been claimed.
    ///
    /// Only meaningful once writers are quiescent (after a barrier).
    #[must_use]
    pub fn contains(&self, vertex: &Vertex) -> bool {
        self.claimed.contains(vertex)
    }

    /// Number of claimed vertices.
    #[must_use]
    pub fn claimed_count(&self) -> usize {
        self.claimed.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
