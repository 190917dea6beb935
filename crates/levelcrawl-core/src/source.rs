//! # Neighbor Sources
//!
//! The `NeighborSource` trait is the seam between the crawler and whatever
//! knows the graph's adjacency. The crawler never sees a transport; it only
//! asks for the ordered neighbors of one vertex at a time.
//!
//! A source is shared by every expansion task of a run, so implementations
//! must be safe for concurrent use. Connection state belongs behind that
//! guarantee (pooled clients), never in a handle that assumes one caller.

use crate::{FetchError, Vertex};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

// =============================================================================
// NEIGHBORSOURCE TRAIT
// =============================================================================

/// Lookup of a vertex's neighbors.
pub trait NeighborSource: Send + Sync + 'static {
    /// Fetch the neighbors of `vertex`, in the order the source reports them.
    fn fetch_neighbors(
        &self,
        vertex: &Vertex,
    ) -> impl Future<Output = Result<Vec<Vertex>, FetchError>> + Send;
}

// =============================================================================
// IN-MEMORY SOURCE
// =============================================================================

/// Adjacency held in memory.
///
/// Each vertex maps either to its neighbor list or to the failure its lookup
/// should produce. Vertices absent from the map have no neighbors.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    adjacency: HashMap<Vertex, Result<Vec<Vertex>, FetchError>>,
    delay: Option<Duration>,
}

impl MemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from `(vertex, neighbors)` pairs.
    #[must_use]
    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Vec<&'a str>)>,
    {
        let mut source = Self::new();
        for (vertex, neighbors) in edges {
            source = source.with_neighbors(vertex, neighbors);
        }
        source
    }

    /// Set the neighbors of `vertex`.
    #[must_use]
    pub fn with_neighbors(mut self, vertex: &str, neighbors: Vec<&str>) -> Self {
        self.adjacency.insert(
            Vertex::new(vertex),
            Ok(neighbors.into_iter().map(Vertex::new).collect()),
        );
        self
    }

    /// Make every lookup of `vertex` fail with `error`.
    #[must_use]
    pub fn with_failure(mut self, vertex: &str, error: FetchError) -> Self {
        self.adjacency.insert(Vertex::new(vertex), Err(error));
        self
    }

    /// Sleep for `delay` before answering each lookup.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn lookup(&self, vertex: &Vertex) -> Result<Vec<Vertex>, FetchError> {
        self.adjacency
            .get(vertex)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

impl NeighborSource for MemorySource {
    async fn fetch_neighbors(&self, vertex: &Vertex) -> Result<Vec<Vertex>, FetchError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.lookup(vertex)
    }
}

// =============================================================================
// TESTS
// =============================================================================
