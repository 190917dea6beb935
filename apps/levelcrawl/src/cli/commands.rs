//! # CLI Command Implementations
//!
//! Results go to stdout. Failure summaries and logs go to stderr.

use crate::client::HttpNeighborSource;
use crate::config::Settings;
use levelcrawl_core::{
    CrawlError, CrawlReport, Crawler, NeighborSource, Vertex, primitives::MAX_VERTEX_NAME_LENGTH,
};
use std::fmt::Write as _;
use std::time::{Duration, Instant};

// =============================================================================
// CRAWL COMMAND
// =============================================================================

/// Crawl from `start` down to `depth` and print every level.
pub async fn cmd_crawl(
    settings: &Settings,
    json_mode: bool,
    start: &str,
    depth: usize,
) -> Result<(), CrawlError> {
    let source = HttpNeighborSource::new(settings)?;
    tracing::info!(service = %source.base_url(), "Using neighbor service");

    let crawler = Crawler::with_config(source, settings.crawl_config());

    let begin = Instant::now();
    let report = crawler.crawl(Vertex::new(start), depth).await?;
    let elapsed = begin.elapsed();

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&crawl_json(&report, elapsed)).unwrap_or_default()
        );
        return Ok(());
    }

    print!("{}", render_levels(&report, elapsed));
    if !report.failures.is_empty() {
        eprint!("{}", render_failures(&report));
    }

    Ok(())
}

/// Text form of a crawl: `- name` per vertex, the level size after each
/// level, then the elapsed time.
pub fn render_levels(report: &CrawlReport, elapsed: Duration) -> String {
    let mut out = String::new();
    for frontier in &report.levels {
        for vertex in frontier {
            let _ = writeln!(out, "- {}", vertex);
        }
        let _ = writeln!(out, "{}", frontier.len());
    }
    let _ = writeln!(out, "Time to crawl: {}s", elapsed.as_secs_f64());
    out
}

/// Failure summary printed after a text-mode crawl.
pub fn render_failures(report: &CrawlReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} lookup(s) failed:", report.failures.len());
    for failure in &report.failures {
        let _ = writeln!(out, "  {}", failure);
    }
    if let Some(depth) = report.aborted_at {
        let _ = writeln!(out, "Crawl stopped: every lookup at depth {} failed", depth);
    }
    out
}

/// JSON form of a crawl.
pub fn crawl_json(report: &CrawlReport, elapsed: Duration) -> serde_json::Value {
    serde_json::json!({
        "levels": report.levels,
        "failures": report.failures,
        "aborted_at": report.aborted_at,
        "vertex_count": report.vertex_count(),
        "elapsed_ms": u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
    })
}

// =============================================================================
// NEIGHBORS COMMAND
// =============================================================================

/// Fetch and print the neighbors of one vertex.
pub async fn cmd_neighbors(
    settings: &Settings,
    json_mode: bool,
    vertex: &str,
) -> Result<(), CrawlError> {
    if vertex.is_empty() || vertex.len() > MAX_VERTEX_NAME_LENGTH {
        return Err(CrawlError::Usage(format!(
            "vertex name must be 1..={} bytes",
            MAX_VERTEX_NAME_LENGTH
        )));
    }

    let source = HttpNeighborSource::new(settings)?;
    let vertex = Vertex::new(vertex);
    let neighbors = source.fetch_neighbors(&vertex).await?;

    if json_mode {
        let output = serde_json::json!({
            "vertex": vertex,
            "neighbors": neighbors,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Neighbors of {} ({}):", vertex, neighbors.len());
    for neighbor in &neighbors {
        println!("- {}", neighbor);
    }

    Ok(())
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// Print the effective settings.
pub fn cmd_config(settings: &Settings) -> Result<(), CrawlError> {
    let text = serde_json::to_string_pretty(settings)
        .map_err(|e| CrawlError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use levelcrawl_core::{ExpansionFailure, FailureCause, FetchError};

    fn sample_report() -> CrawlReport {
        CrawlReport {
            levels: vec![
                vec![Vertex::new("A")],
                vec![Vertex::new("B"), Vertex::new("C")],
                vec![],
            ],
            failures: vec![ExpansionFailure {
                vertex: Vertex::new("B"),
                depth: 1,
                cause: FailureCause::Fetch(FetchError::Transport("HTTP 503".into())),
            }],
            aborted_at: None,
        }
    }

    #[test]
    fn text_output_lists_levels_then_sizes() {
        let text = render_levels(&sample_report(), Duration::from_millis(1500));
        assert_eq!(text, "- A\n1\n- B\n- C\n2\n0\nTime to crawl: 1.5s\n");
    }

    #[test]
    fn failure_summary_names_vertex_and_depth() {
        let text = render_failures(&sample_report());
        assert!(text.starts_with("1 lookup(s) failed:\n"));
        assert!(text.contains("B (depth 1)"));
        assert!(!text.contains("Crawl stopped"));
    }

    #[test]
    fn aborted_crawl_is_reported() {
        let report = CrawlReport {
            aborted_at: Some(1),
            ..sample_report()
        };
        assert!(render_failures(&report).contains("at depth 1 failed"));
    }

    #[test]
    fn json_output_shape() {
        let value = crawl_json(&sample_report(), Duration::from_millis(42));
        assert_eq!(value["levels"][1][0], "B");
        assert_eq!(value["levels"][2].as_array().map(Vec::len), Some(0));
        assert_eq!(value["failures"][0]["vertex"], "B");
        assert_eq!(value["failures"][0]["depth"], 1);
        assert_eq!(value["vertex_count"], 3);
        assert_eq!(value["elapsed_ms"], 42);
        assert!(value["aborted_at"].is_null());
    }

    #[test]
    fn config_command_prints_settings() {
        assert!(cmd_config(&Settings::default()).is_ok());
    }
}
