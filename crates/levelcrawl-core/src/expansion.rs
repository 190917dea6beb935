//! # Expansion Task
//!
//! The unit of concurrent work: expand one vertex of frontier `d` into
//! frontier `d + 1`.
//!
//! Tasks of the same depth never talk to each other. They only meet in the
//! visited set's atomic claim and the level store's synchronized append.

use crate::levels::LevelStore;
use crate::source::NeighborSource;
use crate::visited::VisitedSet;
use crate::{CrawlError, FailureCause, Vertex};

/// Counts produced by a successful expansion, for diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionOutcome {
    /// Neighbors the source reported.
    pub neighbors: usize,
    /// Neighbors this task claimed and appended to the next frontier.
    pub claimed: usize,
}

/// Expand `vertex` (a member of frontier `depth`) into frontier `depth + 1`.
///
/// A fetch failure is returned as-is; the vertex then contributes nothing.
/// There is no retry at this level.
pub async fn expand<S: NeighborSource>(
    source: &S,
    vertex: &Vertex,
    depth: usize,
    visited: &VisitedSet,
    levels: &LevelStore,
) -> Result<ExpansionOutcome, FailureCause> {
    tracing::debug!(vertex = %vertex, depth, "expanding");

    let neighbors = source.fetch_neighbors(vertex).await?;
    let mut outcome = ExpansionOutcome {
        neighbors: neighbors.len(),
        claimed: 0,
    };

    for neighbor in neighbors {
        if !visited.try_claim(&neighbor) {
            continue;
        }
        levels
            .append(depth + 1, neighbor)
            .map_err(|e| invariant_breach(vertex, &e))?;
        outcome.claimed += 1;
    }

    tracing::debug!(
        vertex = %vertex,
        depth,
        neighbors = outcome.neighbors,
        claimed = outcome.claimed,
        "expanded"
    );
    Ok(outcome)
}

/// A claimed vertex could not be appended: the orchestrator sequenced a
/// frontier incorrectly. Reported as an aborted task rather than a panic.
fn invariant_breach(vertex: &Vertex, error: &CrawlError) -> FailureCause {
    tracing::error!(vertex = %vertex, "append rejected: {}", error);
    FailureCause::Aborted(format!("append rejected: {error}"))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchError;
    use crate::source::MemorySource;

    #[tokio::test]
    async fn claims_only_unseen_neighbors() {
        let source = MemorySource::new().with_neighbors("A", vec!["B", "A", "C", "B"]);
        let visited = VisitedSet::new();
        let levels = LevelStore::seeded(Vertex::new("A"), &visited);
        levels.open_next_frontier();

        let outcome = expand(&source, &Vertex::new("A"), 0, &visited, &levels)
            .await
            .expect("expand");

        assert_eq!(outcome, ExpansionOutcome { neighbors: 4, claimed: 2 });
        let all = levels.snapshot();
        assert_eq!(all[1], vec![Vertex::new("B"), Vertex::new("C")]);
    }

    #[tokio::test]
    async fn fetch_failure_appends_nothing() {
        let source =
            MemorySource::new().with_failure("A", FetchError::Decode("not json".into()));
        let visited = VisitedSet::new();
        let levels = LevelStore::seeded(Vertex::new("A"), &visited);
        levels.open_next_frontier();

        let result = expand(&source, &Vertex::new("A"), 0, &visited, &levels).await;

        assert_eq!(
            result,
            Err(FailureCause::Fetch(FetchError::Decode("not json".into())))
        );
        assert!(levels.snapshot()[1].is_empty());
    }

    #[tokio::test]
    async fn append_into_closed_frontier_aborts_task() {
        let source = MemorySource::new().with_neighbors("A", vec!["B"]);
        let visited = VisitedSet::new();
        let levels = LevelStore::seeded(Vertex::new("A"), &visited);
        levels.open_next_frontier();
        levels.open_next_frontier();

        let result = expand(&source, &Vertex::new("A"), 0, &visited, &levels).await;
        assert!(matches!(result, Err(FailureCause::Aborted(_))));
    }
}
