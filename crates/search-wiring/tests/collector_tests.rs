//! Integration tests for the query collector.

use std::sync::Arc;

use serde_json::json;

use helios_search_wiring::collector::{COLLECTOR_NAME, QueryCollector};
use helios_search_wiring::query::{QueryRequest, QueryResponse};

fn search(path: &str) -> QueryRequest {
    QueryRequest::post(path, json!({"query": {"match_all": {}}}))
}

/// Test that only successful responses with an elapsed time count.
#[test]
fn test_total_elapsed_time_policy() {
    let collector = QueryCollector::new();
    collector.add_query(search("a/_search"), QueryResponse::new(Some(200), Some(10)));
    collector.add_query(search("b/_search"), QueryResponse::new(Some(500), Some(5)));
    collector.add_query(search("c/_search"), QueryResponse::new(Some(200), None));

    assert_eq!(collector.query_count(), 3);
    assert_eq!(collector.total_elapsed_time(), 10);
}

/// Test that a response without status is recorded but never counted.
#[test]
fn test_missing_status_contributes_nothing() {
    let collector = QueryCollector::new();
    collector.add_query(search("a/_search"), QueryResponse::new(None, Some(42)));

    assert_eq!(collector.query_count(), 1);
    assert_eq!(collector.total_elapsed_time(), 0);
}

/// Test that huge elapsed times do not overflow the total.
#[test]
fn test_total_elapsed_time_does_not_overflow() {
    let collector = QueryCollector::new();
    collector.add_query(search("a/_search"), QueryResponse::new(Some(200), Some(u64::MAX)));
    collector.add_query(search("b/_search"), QueryResponse::new(Some(200), Some(1)));
    collector.add_query(search("c/_search"), QueryResponse::new(Some(500), Some(u64::MAX)));

    assert_eq!(collector.query_count(), 3);
    assert_eq!(collector.total_elapsed_time(), u64::MAX);
}

/// Test the elapsed time read from a backend body.
#[test]
fn test_elapsed_from_body() {
    let collector = QueryCollector::new();
    collector.add_query(
        search("a/_search"),
        QueryResponse::from_body(200, json!({"took": 7, "hits": {"total": 0}})),
    );
    collector.add_query(
        search("a/_search"),
        QueryResponse::from_body(200, json!({"hits": {"total": 0}})),
    );

    assert_eq!(collector.total_elapsed_time(), 7);
}

/// Test reset returning the collector to empty.
#[test]
fn test_reset_then_add() {
    let collector = QueryCollector::new();
    collector.add_query(search("a/_search"), QueryResponse::new(Some(200), Some(3)));
    collector.add_query(search("b/_search"), QueryResponse::new(Some(200), Some(4)));

    collector.reset();
    assert_eq!(collector.query_count(), 0);
    assert!(collector.is_empty());
    assert_eq!(collector.total_elapsed_time(), 0);

    collector.add_query(search("c/_search"), QueryResponse::new(Some(200), Some(5)));
    assert_eq!(collector.query_count(), 1);
    assert_eq!(collector.total_elapsed_time(), 5);
}

/// Test that queries are returned in insertion order.
#[test]
fn test_queries_keep_order() {
    let collector = QueryCollector::new();
    for path in ["a/_search", "b/_search", "c/_search"] {
        collector.add_query(search(path), QueryResponse::new(Some(200), Some(1)));
    }

    let paths: Vec<_> = collector
        .queries()
        .iter()
        .map(|record| record.request().path.clone())
        .collect();
    assert_eq!(paths, vec!["a/_search", "b/_search", "c/_search"]);
}

/// Test concurrent appends from several threads.
#[test]
fn test_concurrent_add_query() {
    let collector = Arc::new(QueryCollector::new());

    std::thread::scope(|scope| {
        for thread in 0..4 {
            let collector = &collector;
            scope.spawn(move || {
                for i in 0..25 {
                    collector.add_query(
                        search(&format!("t{}/_search/{}", thread, i)),
                        QueryResponse::new(Some(200), Some(2)),
                    );
                }
            });
        }
    });

    assert_eq!(collector.query_count(), 100);
    assert_eq!(collector.total_elapsed_time(), 200);
}

/// Test the serializable report.
#[test]
fn test_report() {
    let collector = QueryCollector::new();
    collector.add_query(search("a/_search"), QueryResponse::new(Some(200), Some(10)));
    collector.add_query(search("b/_search"), QueryResponse::new(Some(404), Some(1)));

    let report = collector.report();
    assert_eq!(report.name, COLLECTOR_NAME);
    assert_eq!(report.query_count, 2);
    assert_eq!(report.total_elapsed_time, 10);

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["name"], json!("helios_search"));
    assert_eq!(value["queries"].as_array().unwrap().len(), 2);
    assert_eq!(value["queries"][1]["response"]["status"], json!(404));
}
