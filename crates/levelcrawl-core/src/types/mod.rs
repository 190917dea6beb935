//! # Core Type Definitions
//!
//! This module contains all core types for the level-synchronous crawler:
//! - Vertex identifiers (`Vertex`) and frontiers (`Frontier`)
//! - Fetch failure taxonomy (`FetchError`)
//! - Run-level errors (`CrawlError`)
//! - Per-task failure records (`ExpansionFailure`, `FailureCause`)
//!
//! ## Ownership
//!
//! Vertices are plain owned strings. Nothing here is shared between runs;
//! every crawl builds its own containers from these types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// VERTEX
// =============================================================================

/// An opaque vertex name in the remote graph.
///
/// Vertices carry no attributes; two vertices are the same vertex exactly when
/// their names are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vertex(pub String);

impl Vertex {
    /// Create a new vertex from a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the vertex name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the vertex name is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Vertex {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Vertex {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Vertices first discovered at one BFS depth.
pub type Frontier = Vec<Vertex>;

// =============================================================================
// FETCH ERRORS
// =============================================================================

/// Failure of a single neighbor lookup.
///
/// Transport and decode failures are kept apart so callers can tell an
/// unreachable service from one that answered with garbage.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchError {
    /// The service could not be reached or answered with a non-success status.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response body did not have the expected structure.
    #[error("decode failure: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether this failure came from the transport layer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether this failure came from decoding the response body.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

// =============================================================================
// EXPANSION FAILURES
// =============================================================================

/// Why an expansion task produced no neighbors.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    /// The neighbor fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The task itself did not run to completion (panicked or was aborted).
    #[error("expansion task aborted: {0}")]
    Aborted(String),
}

/// A failed expansion, reported alongside the assembled frontiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionFailure {
    /// The vertex whose neighbors could not be expanded.
    pub vertex: Vertex,
    /// Depth of the frontier the vertex belonged to.
    pub depth: usize,
    /// What went wrong.
    pub cause: FailureCause,
}

impl fmt::Display for ExpansionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (depth {}): {}", self.vertex, self.depth, self.cause)
    }
}

// =============================================================================
// CRAWL ERRORS
// =============================================================================

/// Errors that stop a crawl or reject its input.
///
/// Per-vertex fetch failures are NOT crawl errors; they are collected as
/// [`ExpansionFailure`] records and the crawl continues.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The crawl input is malformed (empty start vertex, depth out of range).
    #[error("Usage error: {0}")]
    Usage(String),

    /// The configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A frontier index that was never opened.
    #[error("Unknown frontier: {0}")]
    UnknownFrontier(usize),

    /// A write to a frontier that is no longer the open one.
    #[error("Frontier {0} is closed")]
    FrontierClosed(usize),

    /// A read of the frontier that is still being written.
    #[error("Frontier {0} is still open")]
    FrontierOpen(usize),

    /// A single lookup issued outside of a crawl failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// =============================================================================
// TESTS
// =============================================================================
