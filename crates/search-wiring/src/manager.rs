//! Document managers.

use std::fmt::Debug;
use std::sync::Arc;

use serde_json::Value;

use crate::events::EventHub;
use crate::transport::DocumentType;

/// Converts raw backend documents into application documents.
pub trait DataTransformer: Send + Sync + Debug {
    /// Transforms one document.
    fn transform(&self, document: Value) -> Value;
}

/// Entry point for working with the documents of one type.
///
/// A manager shares its type handle with any other manager bound to the same
/// type, and exclusively owns its event hub.
pub struct DocumentManager {
    name: String,
    document_type: Arc<dyn DocumentType>,
    events: EventHub,
    query_builder_class: Option<String>,
    data_transformer: Option<Arc<dyn DataTransformer>>,
}

impl Debug for DocumentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentManager")
            .field("name", &self.name)
            .field("document_type", &self.document_type)
            .field("query_builder_class", &self.query_builder_class)
            .field("has_data_transformer", &self.data_transformer.is_some())
            .finish_non_exhaustive()
    }
}

impl DocumentManager {
    /// Creates a manager.
    pub fn new(
        name: impl Into<String>,
        document_type: Arc<dyn DocumentType>,
        events: EventHub,
        query_builder_class: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            document_type,
            events,
            query_builder_class,
            data_transformer: None,
        }
    }

    /// Returns the manager name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type handle.
    pub fn document_type(&self) -> &Arc<dyn DocumentType> {
        &self.document_type
    }

    /// Returns the event hub.
    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Returns the query builder class identifier.
    pub fn query_builder_class(&self) -> Option<&str> {
        self.query_builder_class.as_deref()
    }

    /// Returns the data transformer.
    pub fn data_transformer(&self) -> Option<&Arc<dyn DataTransformer>> {
        self.data_transformer.as_ref()
    }

    /// Sets the data transformer.
    pub fn set_data_transformer(&mut self, transformer: Arc<dyn DataTransformer>) {
        self.data_transformer = Some(transformer);
    }

    /// Applies the data transformer, or returns the document unchanged.
    pub fn transform(&self, document: Value) -> Value {
        match &self.data_transformer {
            Some(transformer) => transformer.transform(document),
            None => document,
        }
    }
}
