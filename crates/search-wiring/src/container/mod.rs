//! Service registry with lazy, memoized instantiation.
//!
//! The wiring phases only talk to the [`ServiceRegistry`] trait: named
//! registration of [`Definition`]s plus a parameter bag. [`ServiceContainer`]
//! is the in-memory implementation. It resolves definitions on first use and
//! keeps the instance, so every identifier maps to exactly one instance no
//! matter how many threads resolve it concurrently.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use helios_search_wiring::collector::QueryCollector;
//! use helios_search_wiring::container::{Definition, Service, ServiceContainer, ServiceRegistry};
//!
//! let mut container = ServiceContainer::new();
//! container
//!     .set_definition(
//!         "app.collector",
//!         Definition::instance(Service::Collector(Arc::new(QueryCollector::new()))),
//!     )
//!     .unwrap();
//!
//! let collector = container.collector("app.collector").unwrap();
//! assert_eq!(collector.query_count(), 0);
//! ```

mod definition;
mod service;

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::{debug, warn};

use crate::collector::QueryCollector;
use crate::connection::Connection;
use crate::error::{ContainerError, ContainerResult};
use crate::events::EventHub;
use crate::manager::{DataTransformer, DocumentManager};
use crate::stopwatch::Stopwatch;
use crate::transport::{DocumentType, SearchIndex};

pub use definition::{
    Constructor, Definition, FactoryMethod, MethodCall, OnInvalid, Reference, ServiceKind,
};
pub use service::{FromService, Service};

/// Named registration and parameter lookup.
///
/// This is the seam to a host framework's dependency-injection container.
pub trait ServiceRegistry {
    /// Registers a definition. Fails if the identifier is already defined.
    fn set_definition(&mut self, id: &str, definition: Definition) -> ContainerResult<()>;

    /// Returns true if a definition exists for the identifier.
    fn has_definition(&self, id: &str) -> bool;

    /// Returns a parameter value.
    fn parameter(&self, key: &str) -> Option<&Value>;

    /// Sets a parameter value, replacing any previous one.
    fn set_parameter(&mut self, key: &str, value: Value);
}

struct Entry {
    definition: Definition,
    instance: OnceCell<Service>,
}

/// In-memory service registry.
///
/// Definitions are resolved on first [`get`](ServiceContainer::get) and the
/// instance is cached. Concurrent first resolutions of the same identifier
/// block on each other so the constructor runs at most once.
///
/// References are kind-checked against the registered definition before they
/// are resolved, and factories must produce the kind they are registered as.
/// Every dependency therefore points to a strictly lower level of the
/// hierarchy, so resolution cannot re-enter a service under construction.
#[derive(Default)]
pub struct ServiceContainer {
    entries: HashMap<String, Entry>,
    parameters: HashMap<String, Value>,
}

impl ServiceContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the definition registered for the identifier.
    pub fn definition(&self, id: &str) -> Option<&Definition> {
        self.entries.get(id).map(|e| &e.definition)
    }

    /// Returns all registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the identifiers of one kind, sorted.
    pub fn ids_of_kind(&self, kind: ServiceKind) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, e)| e.definition.kind() == kind)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the number of definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the service has already been constructed.
    pub fn is_initialized(&self, id: &str) -> bool {
        self.entries
            .get(id)
            .map(|e| e.instance.get().is_some())
            .unwrap_or(false)
    }

    /// Resolves a service, constructing it on first use.
    pub fn get(&self, id: &str) -> ContainerResult<Service> {
        let entry = self.entries.get(id).ok_or_else(|| ContainerError::NotFound {
            id: id.to_string(),
        })?;

        entry
            .instance
            .get_or_try_init(|| {
                debug!(service = %id, kind = %entry.definition.kind(), "Constructing service");
                self.build(id, &entry.definition)
            })
            .cloned()
    }

    /// Resolves a service as a typed handle.
    ///
    /// The registered kind is checked before anything is constructed.
    pub fn get_as<T: FromService>(&self, id: &str) -> ContainerResult<T> {
        let entry = self.entries.get(id).ok_or_else(|| ContainerError::NotFound {
            id: id.to_string(),
        })?;
        if entry.definition.kind() != T::KIND {
            return Err(ContainerError::KindMismatch {
                id: id.to_string(),
                expected: T::KIND,
                actual: entry.definition.kind(),
            });
        }

        let service = self.get(id)?;
        let actual = service.kind();
        T::from_service(service).ok_or_else(|| ContainerError::KindMismatch {
            id: id.to_string(),
            expected: T::KIND,
            actual,
        })
    }

    /// Resolves a connection.
    pub fn connection(&self, id: &str) -> ContainerResult<Arc<Connection>> {
        self.get_as(id)
    }

    /// Resolves an index handle.
    pub fn index(&self, id: &str) -> ContainerResult<Arc<dyn SearchIndex>> {
        self.get_as(id)
    }

    /// Resolves a document type handle.
    pub fn document_type(&self, id: &str) -> ContainerResult<Arc<dyn DocumentType>> {
        self.get_as(id)
    }

    /// Resolves a document manager.
    pub fn document_manager(&self, id: &str) -> ContainerResult<Arc<DocumentManager>> {
        self.get_as(id)
    }

    /// Resolves a query collector.
    pub fn collector(&self, id: &str) -> ContainerResult<Arc<QueryCollector>> {
        self.get_as(id)
    }

    /// Resolves a reference, honoring its missing-service behavior.
    fn resolve<T: FromService>(&self, reference: &Reference) -> ContainerResult<Option<T>> {
        if reference.on_invalid() == OnInvalid::Ignore && !self.entries.contains_key(reference.id())
        {
            return Ok(None);
        }
        self.get_as(reference.id()).map(Some)
    }

    fn require<T: FromService>(&self, reference: &Reference) -> ContainerResult<T> {
        self.get_as(reference.id())
    }

    fn build(&self, id: &str, definition: &Definition) -> ContainerResult<Service> {
        match definition.constructor() {
            Constructor::Instance(service) => {
                if let Some(call) = definition.calls().first() {
                    return Err(unsupported_call(id, definition.kind(), call));
                }
                Ok(service.clone())
            }

            Constructor::Connection {
                name,
                settings,
                transport,
            } => {
                let mut connection = Connection::new(name.clone(), settings.clone(), transport.clone());
                for call in definition.calls() {
                    match call {
                        MethodCall::SetStopwatch(reference) => {
                            match self.resolve::<Arc<Stopwatch>>(reference)? {
                                Some(stopwatch) => connection.set_stopwatch(stopwatch),
                                None => warn!(
                                    service = %id,
                                    reference = %reference.id(),
                                    "Stopwatch not registered, skipping timing"
                                ),
                            }
                        }
                        MethodCall::SetCollector(reference) => {
                            if let Some(collector) = self.resolve::<Arc<QueryCollector>>(reference)? {
                                connection.set_collector(collector);
                            }
                        }
                        other => return Err(unsupported_call(id, definition.kind(), other)),
                    }
                }
                Ok(Service::Connection(Arc::new(connection)))
            }

            Constructor::Factory {
                target,
                method,
                argument,
            } => {
                if method.produces() != definition.kind() {
                    return Err(ContainerError::Construction {
                        id: id.to_string(),
                        message: format!(
                            "{} produces {} services, not {}",
                            method.as_str(),
                            method.produces(),
                            definition.kind()
                        ),
                        source: None,
                    });
                }
                let service = match method {
                    FactoryMethod::GetIndex => {
                        let connection: Arc<Connection> = self.require(target)?;
                        connection
                            .get_index(argument)
                            .map(Service::Index)
                            .map_err(|e| ContainerError::construction(id, e))?
                    }
                    FactoryMethod::GetType => {
                        let index: Arc<dyn SearchIndex> = self.require(target)?;
                        index
                            .get_type(argument)
                            .map(Service::Type)
                            .map_err(|e| ContainerError::construction(id, e))?
                    }
                };
                if let Some(call) = definition.calls().first() {
                    return Err(unsupported_call(id, definition.kind(), call));
                }
                Ok(service)
            }

            Constructor::DocumentManager {
                name,
                document_type,
                query_builder,
            } => {
                let doc_type: Arc<dyn DocumentType> = self.require(document_type)?;
                let mut manager =
                    DocumentManager::new(name.clone(), doc_type, EventHub::new(), query_builder.clone());
                for call in definition.calls() {
                    match call {
                        MethodCall::SetDataTransformer(reference) => {
                            if let Some(transformer) =
                                self.resolve::<Arc<dyn DataTransformer>>(reference)?
                            {
                                manager.set_data_transformer(transformer);
                            }
                        }
                        other => return Err(unsupported_call(id, definition.kind(), other)),
                    }
                }
                Ok(Service::DocumentManager(Arc::new(manager)))
            }
        }
    }
}

fn unsupported_call(id: &str, kind: ServiceKind, call: &MethodCall) -> ContainerError {
    ContainerError::Construction {
        id: id.to_string(),
        message: format!("{} is not supported on a {} service", call.name(), kind),
        source: None,
    }
}

impl ServiceRegistry for ServiceContainer {
    fn set_definition(&mut self, id: &str, definition: Definition) -> ContainerResult<()> {
        if self.entries.contains_key(id) {
            return Err(ContainerError::AlreadyDefined { id: id.to_string() });
        }
        self.entries.insert(
            id.to_string(),
            Entry {
                definition,
                instance: OnceCell::new(),
            },
        );
        Ok(())
    }

    fn has_definition(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    fn parameter(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    fn set_parameter(&mut self, key: &str, value: Value) {
        self.parameters.insert(key.to_string(), value);
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("services", &self.ids())
            .field("parameters", &self.parameters.keys().collect::<Vec<_>>())
            .finish()
    }
}
