//! # Level Store
//!
//! Ordered frontiers of one crawl, indexed by BFS depth.
//!
//! Exactly one frontier is open at a time: the last one. Opening a new
//! frontier closes the previous one, which from then on is read-only.
//! Expansion tasks append into the open frontier concurrently; the
//! orchestrator only reads closed frontiers.

use crate::visited::VisitedSet;
use crate::{CrawlError, Frontier, Vertex};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Concurrency-safe sequence of frontiers.
#[derive(Debug)]
pub struct LevelStore {
    frontiers: Mutex<Vec<Frontier>>,
}

impl LevelStore {
    /// Seed a store with frontier 0 = `[start]` and claim `start`.
    ///
    /// This is the only constructor, so seeding happens exactly once per run.
    pub fn seeded(start: Vertex, visited: &VisitedSet) -> Self {
        visited.try_claim(&start);
        Self {
            frontiers: Mutex::new(vec![vec![start]]),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Frontier>> {
        // A panicking appender cannot leave a half-written Vec behind, so the
        // data is still consistent after poisoning.
        self.frontiers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an empty frontier and return its index.
    ///
    /// The previously open frontier becomes closed.
    pub fn open_next_frontier(&self) -> usize {
        let mut frontiers = self.lock();
        frontiers.push(Vec::new());
        frontiers.len() - 1
    }

    /// Append a vertex to the open frontier at `index`.
    pub fn append(&self, index: usize, vertex: Vertex) -> Result<(), CrawlError> {
        let mut frontiers = self.lock();
        let open = frontiers.len() - 1;
        if index > open {
            return Err(CrawlError::UnknownFrontier(index));
        }
        if index < open {
            return Err(CrawlError::FrontierClosed(index));
        }
        frontiers[open].push(vertex);
        Ok(())
    }

    /// Read a closed frontier.
    pub fn frontier(&self, index: usize) -> Result<Frontier, CrawlError> {
        let frontiers = self.lock();
        let open = frontiers.len() - 1;
        match index {
            i if i > open => Err(CrawlError::UnknownFrontier(i)),
            i if i == open => Err(CrawlError::FrontierOpen(i)),
            i => Ok(frontiers[i].clone()),
        }
    }

    /// Number of frontiers opened so far, including frontier 0.
    #[must_use]
    pub fn depth_count(&self) -> usize {
        self.lock().len()
    }

    /// Copy every frontier, the open one included.
    ///
    /// Meant for the end of a run, once every appender has finished.
    pub fn snapshot(&self) -> Vec<Frontier> {
        self.lock().clone()
    }
}

// =============================================================================
// TESTS
// =============================================================================
