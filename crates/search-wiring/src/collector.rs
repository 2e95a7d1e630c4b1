//! Query collector.
//!
//! The collector is attached to connections in diagnostic mode and records
//! every request/response pair issued through them, for later inspection by a
//! profiling UI. It holds two states: empty, and accumulating once at least one
//! query was recorded. [`QueryCollector::reset`] returns it to empty, which a
//! long-running process does once per handled request.
//!
//! # Example
//!
//! ```rust
//! use helios_search_wiring::collector::QueryCollector;
//! use helios_search_wiring::query::{QueryRequest, QueryResponse};
//!
//! let collector = QueryCollector::new();
//! collector.add_query(QueryRequest::get("products/_search"), QueryResponse::new(Some(200), Some(10)));
//! collector.add_query(QueryRequest::get("products/_search"), QueryResponse::new(Some(500), Some(5)));
//!
//! assert_eq!(collector.query_count(), 2);
//! assert_eq!(collector.total_elapsed_time(), 10);
//! ```

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::trace;

use crate::query::{QueryRequest, QueryResponse};

/// Name under which profiling UIs list the collector.
pub const COLLECTOR_NAME: &str = "helios_search";

/// An immutable request/response pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRecord {
    request: QueryRequest,
    response: QueryResponse,
    recorded_at: DateTime<Utc>,
}

impl QueryRecord {
    /// Returns the request.
    pub fn request(&self) -> &QueryRequest {
        &self.request
    }

    /// Returns the response.
    pub fn response(&self) -> &QueryResponse {
        &self.response
    }

    /// Returns when the pair was recorded.
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Returns the time this record contributes to the total.
    ///
    /// Only successful responses with a reported elapsed time count.
    pub fn contributed_time(&self) -> u64 {
        if self.response.is_success() {
            self.response.elapsed.unwrap_or(0)
        } else {
            0
        }
    }
}

/// Serializable snapshot of the collector for profiling UIs.
#[derive(Debug, Clone, Serialize)]
pub struct CollectorReport {
    /// Collector name.
    pub name: &'static str,
    /// Number of recorded queries.
    pub query_count: usize,
    /// Summed elapsed time of successful queries, in milliseconds.
    pub total_elapsed_time: u64,
    /// Recorded queries in insertion order.
    pub queries: Vec<QueryRecord>,
}

/// Append-only log of queries with aggregate timing.
///
/// All operations are safe to call from several threads: writers are
/// serialized by an internal lock and readers get a consistent snapshot.
#[derive(Debug, Default)]
pub struct QueryCollector {
    queries: Mutex<Vec<QueryRecord>>,
}

impl QueryCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collector name.
    pub fn name(&self) -> &'static str {
        COLLECTOR_NAME
    }

    /// Records a request and its response. Never fails.
    pub fn add_query(&self, request: QueryRequest, response: QueryResponse) {
        trace!(
            method = %request.method,
            path = %request.path,
            status = ?response.status,
            elapsed = ?response.elapsed,
            "Recording query"
        );
        self.queries.lock().push(QueryRecord {
            request,
            response,
            recorded_at: Utc::now(),
        });
    }

    /// Returns the number of recorded queries.
    pub fn query_count(&self) -> usize {
        self.queries.lock().len()
    }

    /// Returns true when no query has been recorded since creation or reset.
    pub fn is_empty(&self) -> bool {
        self.queries.lock().is_empty()
    }

    /// Returns the recorded queries in insertion order.
    pub fn queries(&self) -> Vec<QueryRecord> {
        self.queries.lock().clone()
    }

    /// Sums the elapsed time of successful queries that report one.
    ///
    /// The sum saturates at `u64::MAX` instead of overflowing.
    pub fn total_elapsed_time(&self) -> u64 {
        total_time(&self.queries.lock())
    }

    /// Clears the log.
    pub fn reset(&self) {
        self.queries.lock().clear();
    }

    /// Returns a consistent snapshot of the whole collector.
    pub fn report(&self) -> CollectorReport {
        let queries = self.queries.lock().clone();
        CollectorReport {
            name: COLLECTOR_NAME,
            query_count: queries.len(),
            total_elapsed_time: total_time(&queries),
            queries,
        }
    }
}

/// Sums contributed times, saturating at `u64::MAX`.
fn total_time(records: &[QueryRecord]) -> u64 {
    records
        .iter()
        .map(QueryRecord::contributed_time)
        .fold(0u64, |total, time| total.saturating_add(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> QueryRequest {
        QueryRequest::get("products/item/_search")
    }

    #[test]
    fn test_total_elapsed_time_policy() {
        let collector = QueryCollector::new();
        collector.add_query(request(), QueryResponse::new(Some(200), Some(10)));
        collector.add_query(request(), QueryResponse::new(Some(500), Some(5)));
        collector.add_query(request(), QueryResponse::new(Some(200), None));

        assert_eq!(collector.query_count(), 3);
        assert_eq!(collector.total_elapsed_time(), 10);
    }

    #[test]
    fn test_total_elapsed_time_saturates() {
        let collector = QueryCollector::new();
        collector.add_query(request(), QueryResponse::new(Some(200), Some(u64::MAX)));
        collector.add_query(request(), QueryResponse::new(Some(200), Some(1)));

        assert_eq!(collector.total_elapsed_time(), u64::MAX);
        assert_eq!(collector.report().total_elapsed_time, u64::MAX);
    }

    #[test]
    fn test_missing_status_contributes_nothing() {
        let collector = QueryCollector::new();
        collector.add_query(request(), QueryResponse::new(None, Some(42)));

        assert_eq!(collector.query_count(), 1);
        assert_eq!(collector.total_elapsed_time(), 0);
    }

    #[test]
    fn test_reset_returns_to_empty() {
        let collector = QueryCollector::new();
        assert!(collector.is_empty());

        collector.add_query(request(), QueryResponse::new(Some(200), Some(1)));
        collector.add_query(request(), QueryResponse::new(Some(200), Some(1)));
        assert!(!collector.is_empty());

        collector.reset();
        assert_eq!(collector.query_count(), 0);
        assert_eq!(collector.total_elapsed_time(), 0);

        collector.add_query(request(), QueryResponse::new(Some(200), Some(1)));
        assert_eq!(collector.query_count(), 1);
    }

    #[test]
    fn test_queries_keep_insertion_order() {
        let collector = QueryCollector::new();
        for i in 0..5 {
            collector.add_query(
                QueryRequest::get(format!("index-{}/_search", i)),
                QueryResponse::from_body(200, json!({"took": i})),
            );
        }

        let paths: Vec<_> = collector
            .queries()
            .iter()
            .map(|q| q.request().path.clone())
            .collect();
        assert_eq!(
            paths,
            vec![
                "index-0/_search",
                "index-1/_search",
                "index-2/_search",
                "index-3/_search",
                "index-4/_search"
            ]
        );
        assert_eq!(collector.total_elapsed_time(), 10);
    }

    #[test]
    fn test_report_snapshot() {
        let collector = QueryCollector::new();
        collector.add_query(request(), QueryResponse::new(Some(200), Some(7)));

        let report = collector.report();
        assert_eq!(report.name, COLLECTOR_NAME);
        assert_eq!(report.query_count, 1);
        assert_eq!(report.total_elapsed_time, 7);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["queries"][0]["response"]["status"], 200);
        assert_eq!(json["queries"][0]["request"]["path"], "products/item/_search");
    }

    #[test]
    fn test_records_are_snapshots() {
        let collector = QueryCollector::new();
        collector.add_query(request(), QueryResponse::new(Some(200), Some(1)));

        let snapshot = collector.queries();
        collector.reset();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].contributed_time(), 1);
    }
}
