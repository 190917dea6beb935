//! # BFS Orchestrator
//!
//! Drives the level loop of one crawl.
//!
//! For each depth `d` in `0..depth_bound`:
//!
//! 1. **LevelStart**: open frontier `d + 1`, which closes frontier `d`.
//! 2. **Fanout**: spawn one expansion task per vertex of frontier `d`.
//! 3. **Barrier**: drain the depth's `JoinSet`; every task, failed or not,
//!    has terminated before frontier `d + 1` is read.
//!
//! The visited set and level store are created per call to
//! [`Crawler::crawl`] and handed to tasks as `Arc`s, so independent crawls
//! never share state.

use crate::expansion::{self, ExpansionOutcome};
use crate::levels::LevelStore;
use crate::primitives::{DEFAULT_MAX_CONCURRENCY, MAX_CRAWL_DEPTH, MAX_VERTEX_NAME_LENGTH};
use crate::source::NeighborSource;
use crate::visited::VisitedSet;
use crate::{CrawlError, ExpansionFailure, FailureCause, Frontier, Vertex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// What to do when every expansion of a non-empty depth fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep going; the next frontier is simply empty.
    #[default]
    Continue,
    /// Stop at the dead depth and return the remaining frontiers empty.
    AbortOnDeadDepth,
}

/// Orchestrator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum in-flight expansions per depth (`0` = one task per vertex).
    pub max_concurrency: usize,
    /// Policy for depths where every expansion failed.
    pub failure_policy: FailurePolicy,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            failure_policy: FailurePolicy::Continue,
        }
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// Result of one crawl.
///
/// `levels` always holds `depth_bound + 1` frontiers, even when the crawl ran
/// out of vertices or was aborted early.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlReport {
    /// Frontiers 0..=depth_bound.
    pub levels: Vec<Frontier>,
    /// Every expansion that produced no neighbors because it failed.
    pub failures: Vec<ExpansionFailure>,
    /// Depth at which the crawl stopped under [`FailurePolicy::AbortOnDeadDepth`].
    pub aborted_at: Option<usize>,
}

impl CrawlReport {
    /// Frontier at `depth`, empty if out of range.
    #[must_use]
    pub fn frontier(&self, depth: usize) -> &[Vertex] {
        self.levels.get(depth).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of vertices discovered, start vertex included.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    /// True when no expansion failed and the crawl was not aborted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.aborted_at.is_none()
    }
}

// =============================================================================
// CRAWLER
// =============================================================================

/// Level-synchronous BFS over a [`NeighborSource`].
#[derive(Debug)]
pub struct Crawler<S> {
    source: Arc<S>,
    config: CrawlConfig,
}

impl<S> Clone for Crawler<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            config: self.config.clone(),
        }
    }
}

impl<S: NeighborSource> Crawler<S> {
    /// Create a crawler with the default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, CrawlConfig::default())
    }

    /// Create a crawler with an explicit configuration.
    pub fn with_config(source: S, config: CrawlConfig) -> Self {
        Self {
            source: Arc::new(source),
            config,
        }
    }

    /// Crawl from `start` down to `depth_bound` levels.
    ///
    /// Per-vertex fetch failures never make this return `Err`; they are
    /// collected in [`CrawlReport::failures`]. `Err` is reserved for input
    /// rejected before the crawl begins.
    pub async fn crawl(
        &self,
        start: Vertex,
        depth_bound: usize,
    ) -> Result<CrawlReport, CrawlError> {
        validate_input(&start, depth_bound)?;

        tracing::info!(start = %start, depth_bound, "crawl starting");

        let visited = Arc::new(VisitedSet::new());
        let levels = Arc::new(LevelStore::seeded(start, &visited));
        let permits = (self.config.max_concurrency > 0)
            .then(|| Arc::new(Semaphore::new(self.config.max_concurrency)));

        let mut failures = Vec::new();
        let mut aborted_at = None;

        for depth in 0..depth_bound {
            // LevelStart(d)
            levels.open_next_frontier();
            let frontier = levels.frontier(depth)?;

            if frontier.is_empty() {
                tracing::debug!(depth, "frontier empty, nothing to expand");
                continue;
            }

            // Fanout(d) + Barrier(d)
            let launched = frontier.len();
            let span = tracing::info_span!("depth", depth, frontier = launched);
            let (claimed, level_failures) = self
                .expand_level(depth, frontier, &visited, &levels, permits.as_ref())
                .instrument(span)
                .await;

            tracing::info!(
                depth,
                expanded = launched,
                discovered = claimed,
                failed = level_failures.len(),
                "depth complete"
            );

            let dead = level_failures.len() == launched;
            failures.extend(level_failures);

            if dead && self.config.failure_policy == FailurePolicy::AbortOnDeadDepth {
                tracing::warn!(depth, "every expansion failed, aborting crawl");
                aborted_at = Some(depth);
                break;
            }
        }

        while levels.depth_count() <= depth_bound {
            levels.open_next_frontier();
        }

        let report = CrawlReport {
            levels: levels.snapshot(),
            failures,
            aborted_at,
        };

        tracing::info!(
            vertices = report.vertex_count(),
            visited = visited.claimed_count(),
            failures = report.failures.len(),
            "crawl finished"
        );
        Ok(report)
    }

    /// Spawn one task per frontier vertex and wait for all of them.
    ///
    /// Returns the number of vertices claimed into the next frontier and the
    /// failed expansions.
    async fn expand_level(
        &self,
        depth: usize,
        frontier: Frontier,
        visited: &Arc<VisitedSet>,
        levels: &Arc<LevelStore>,
        permits: Option<&Arc<Semaphore>>,
    ) -> (usize, Vec<ExpansionFailure>) {
        let mut tasks = JoinSet::new();
        let mut in_flight = HashMap::with_capacity(frontier.len());

        for vertex in frontier {
            let source = Arc::clone(&self.source);
            let visited = Arc::clone(visited);
            let levels = Arc::clone(levels);
            let permits = permits.cloned();
            let task_vertex = vertex.clone();

            let handle = tasks.spawn(
                run_task(source, task_vertex, depth, visited, levels, permits).in_current_span(),
            );
            in_flight.insert(handle.id(), vertex);
        }

        let mut claimed = 0;
        let mut failures = Vec::new();

        // Barrier: nothing below returns until the set is drained.
        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, result) = match joined {
                Ok((id, result)) => (id, result),
                Err(join_error) => (
                    join_error.id(),
                    Err(FailureCause::Aborted(join_error.to_string())),
                ),
            };
            let vertex = in_flight
                .remove(&id)
                .unwrap_or_else(|| Vertex::new(format!("<task {id}>")));

            match result {
                Ok(ExpansionOutcome { claimed: n, .. }) => claimed += n,
                Err(cause) => {
                    tracing::warn!(vertex = %vertex, depth, "expansion failed: {}", cause);
                    failures.push(ExpansionFailure {
                        vertex,
                        depth,
                        cause,
                    });
                }
            }
        }

        (claimed, failures)
    }
}

/// Body of one spawned expansion task.
///
/// Holds a permit for the whole expansion when fan-out is bounded.
async fn run_task<S: NeighborSource>(
    source: Arc<S>,
    vertex: Vertex,
    depth: usize,
    visited: Arc<VisitedSet>,
    levels: Arc<LevelStore>,
    permits: Option<Arc<Semaphore>>,
) -> Result<ExpansionOutcome, FailureCause> {
    let _permit = match permits {
        Some(semaphore) => Some(
            semaphore
                .acquire_owned()
                .await
                .map_err(|e| FailureCause::Aborted(e.to_string()))?,
        ),
        None => None,
    };
    expansion::expand(source.as_ref(), &vertex, depth, &visited, &levels).await
}

/// Reject input that cannot start a crawl.
fn validate_input(start: &Vertex, depth_bound: usize) -> Result<(), CrawlError> {
    if start.is_empty() {
        return Err(CrawlError::Usage("start vertex must not be empty".to_string()));
    }
    if start.as_str().len() > MAX_VERTEX_NAME_LENGTH {
        return Err(CrawlError::Usage(format!(
            "start vertex exceeds {} bytes",
            MAX_VERTEX_NAME_LENGTH
        )));
    }
    if depth_bound > MAX_CRAWL_DEPTH {
        return Err(CrawlError::Usage(format!(
            "depth {} exceeds maximum {}",
            depth_bound, MAX_CRAWL_DEPTH
        )));
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
