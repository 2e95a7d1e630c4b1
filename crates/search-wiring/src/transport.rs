//! Search transport seam.
//!
//! The search protocol itself lives behind these traits. A connection
//! delegates index lookups and queries to its [`SearchTransport`]; the index
//! and type handles returned are opaque to the wiring layer.
//!
//! [`StaticTransport`] is an offline implementation that answers every query
//! with a fixed response. It is meant for dry runs and tests.

use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use crate::connection::ConnectionSettings;
use crate::error::{TransportError, TransportResult};
use crate::query::{QueryRequest, QueryResponse};

/// Backend operations a connection delegates to.
pub trait SearchTransport: Send + Sync + Debug {
    /// Returns the handle of an index on the endpoint.
    fn get_index(
        &self,
        settings: &ConnectionSettings,
        name: &str,
    ) -> TransportResult<Arc<dyn SearchIndex>>;

    /// Sends a request to the endpoint.
    fn query(
        &self,
        settings: &ConnectionSettings,
        request: &QueryRequest,
    ) -> TransportResult<QueryResponse>;
}

/// An index handle.
pub trait SearchIndex: Send + Sync + Debug {
    /// Returns the backend index name.
    fn name(&self) -> &str;

    /// Returns the handle of a document type in this index.
    fn get_type(&self, name: &str) -> TransportResult<Arc<dyn DocumentType>>;
}

/// A document type handle.
pub trait DocumentType: Send + Sync + Debug {
    /// Returns the backend name of the owning index.
    fn index_name(&self) -> &str;

    /// Returns the type name.
    fn name(&self) -> &str;
}

/// Offline transport with a fixed response.
#[derive(Debug)]
pub struct StaticTransport {
    response: QueryResponse,
    known_indexes: Option<HashSet<String>>,
    index_opens: AtomicUsize,
    type_opens: Arc<AtomicUsize>,
    queries: AtomicUsize,
}

impl StaticTransport {
    /// Creates a transport answering `200` with `took: 1`, knowing every index.
    pub fn new() -> Self {
        Self {
            response: QueryResponse::from_body(200, json!({"took": 1, "hits": {"hits": []}})),
            known_indexes: None,
            index_opens: AtomicUsize::new(0),
            type_opens: Arc::new(AtomicUsize::new(0)),
            queries: AtomicUsize::new(0),
        }
    }

    /// Sets the response returned for every query.
    pub fn with_response(mut self, response: QueryResponse) -> Self {
        self.response = response;
        self
    }

    /// Restricts the indexes the transport knows about.
    pub fn with_known_indexes<I, S>(mut self, indexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_indexes = Some(indexes.into_iter().map(Into::into).collect());
        self
    }

    /// Returns how many index handles were opened.
    pub fn index_opens(&self) -> usize {
        self.index_opens.load(Ordering::SeqCst)
    }

    /// Returns how many type handles were opened.
    pub fn type_opens(&self) -> usize {
        self.type_opens.load(Ordering::SeqCst)
    }

    /// Returns how many queries were answered.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Default for StaticTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchTransport for StaticTransport {
    fn get_index(
        &self,
        _settings: &ConnectionSettings,
        name: &str,
    ) -> TransportResult<Arc<dyn SearchIndex>> {
        if let Some(known) = &self.known_indexes {
            if !known.contains(name) {
                return Err(TransportError::IndexNotFound {
                    index: name.to_string(),
                });
            }
        }
        self.index_opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StaticIndex {
            name: name.to_string(),
            type_opens: Arc::clone(&self.type_opens),
        }))
    }

    fn query(
        &self,
        _settings: &ConnectionSettings,
        _request: &QueryRequest,
    ) -> TransportResult<QueryResponse> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

/// Index handle of [`StaticTransport`].
#[derive(Debug)]
pub struct StaticIndex {
    name: String,
    type_opens: Arc<AtomicUsize>,
}

impl SearchIndex for StaticIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_type(&self, name: &str) -> TransportResult<Arc<dyn DocumentType>> {
        self.type_opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StaticType::new(self.name.clone(), name)))
    }
}

/// Type handle of [`StaticTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticType {
    index_name: String,
    name: String,
}

impl StaticType {
    /// Creates a type handle.
    pub fn new(index_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            name: name.into(),
        }
    }
}

impl DocumentType for StaticType {
    fn index_name(&self) -> &str {
        &self.index_name
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_transport_counts_opens() {
        let transport = StaticTransport::new();
        let settings = ConnectionSettings::default();

        let index = transport.get_index(&settings, "products").unwrap();
        let doc_type = index.get_type("item").unwrap();

        assert_eq!(index.name(), "products");
        assert_eq!(doc_type.index_name(), "products");
        assert_eq!(doc_type.name(), "item");
        assert_eq!(transport.index_opens(), 1);
        assert_eq!(transport.type_opens(), 1);
    }

    #[test]
    fn test_static_transport_unknown_index() {
        let transport = StaticTransport::new().with_known_indexes(["products"]);
        let settings = ConnectionSettings::default();

        assert!(transport.get_index(&settings, "products").is_ok());
        let err = transport.get_index(&settings, "orders").unwrap_err();
        assert!(matches!(err, TransportError::IndexNotFound { ref index } if index == "orders"));
        assert_eq!(transport.index_opens(), 1);
    }

    #[test]
    fn test_static_transport_response() {
        let transport =
            StaticTransport::new().with_response(QueryResponse::new(Some(503), None));
        let response = transport
            .query(&ConnectionSettings::default(), &QueryRequest::get("_cluster/health"))
            .unwrap();

        assert_eq!(response.status, Some(503));
        assert_eq!(transport.query_count(), 1);
    }
}
