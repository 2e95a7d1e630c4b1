//! Configuration-driven wiring of the search service graph.
//!
//! Loading runs four phases, leaf-first. Each phase only consumes the name
//! table exported by the phase before it:
//!
//! 1. connections, one per client
//! 2. indexes, bound by factory to their connection, and for each index
//! 3. its types, bound by factory to the index, collected in a flat table
//! 4. document managers, bound to a type from that table
//!
//! All definitions are staged first and committed to the target registry
//! only once every phase succeeded. A failed load leaves the registry
//! untouched apart from the query collector, which is always registered.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use helios_search_wiring::config::WiringConfig;
//! use helios_search_wiring::container::ServiceContainer;
//! use helios_search_wiring::transport::StaticTransport;
//! use helios_search_wiring::wiring::SearchGraphLoader;
//!
//! let config = WiringConfig::from_json_str(r#"{
//!     "clients": { "main": {} },
//!     "indexes": { "products": { "client": "main", "types": { "item": {} } } },
//!     "document_managers": { "productManager": { "type": "products.item" } }
//! }"#).unwrap();
//!
//! let mut container = ServiceContainer::new();
//! let report = SearchGraphLoader::new(Arc::new(StaticTransport::new()))
//!     .load(&config, &mut container)
//!     .unwrap();
//!
//! assert_eq!(report.total(), 4);
//! let manager = container
//!     .document_manager("helios.search.document_manager.productManager")
//!     .unwrap();
//! assert_eq!(manager.document_type().name(), "item");
//! ```

mod connections;
mod indexes;
mod managers;
mod types;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::collector::QueryCollector;
use crate::config::WiringConfig;
use crate::container::{Definition, Service, ServiceKind, ServiceRegistry};
use crate::error::{ContainerError, ContainerResult, WiringResult};
use crate::transport::SearchTransport;

pub use connections::{ConnectionRegistry, ConnectionTable};
pub use indexes::IndexRegistry;
pub use managers::DocumentManagerRegistry;
pub use types::{TypeKey, TypeRegistry, TypeTable};

/// Registry parameter enabling diagnostic mode.
pub const DEBUG_PARAMETER: &str = "debug";

/// Identifier of the optional stopwatch service.
pub const STOPWATCH_ID: &str = "debug.stopwatch";

/// Deterministic service identifiers under a namespace.
///
/// Identifiers follow `<namespace>.<kind>.<name>`, and
/// `<namespace>.type.<index>.<type>` for document types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIds {
    namespace: String,
}

impl ServiceIds {
    /// Creates the identifier scheme for a namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Returns the namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the identifier of a connection.
    pub fn connection(&self, name: &str) -> String {
        self.id(ServiceKind::Connection, name)
    }

    /// Returns the identifier of an index.
    pub fn index(&self, name: &str) -> String {
        self.id(ServiceKind::Index, name)
    }

    /// Returns the identifier of a document type.
    pub fn document_type(&self, index: &str, name: &str) -> String {
        format!("{}{}.{}", self.type_prefix(), index, name)
    }

    /// Returns the identifier of a document manager.
    pub fn document_manager(&self, name: &str) -> String {
        self.id(ServiceKind::DocumentManager, name)
    }

    /// Returns the identifier of the query collector.
    pub fn collector(&self) -> String {
        format!("{}.{}", self.namespace, ServiceKind::Collector)
    }

    /// Returns the key of the published document manager map.
    pub fn document_managers_parameter(&self) -> String {
        format!("{}.document_managers", self.namespace)
    }

    /// Returns the prefix shared by all type identifiers.
    pub fn type_prefix(&self) -> String {
        format!("{}.{}.", self.namespace, ServiceKind::Type)
    }

    fn id(&self, kind: ServiceKind, name: &str) -> String {
        format!("{}.{}.{}", self.namespace, kind, name)
    }
}

/// Summary of a load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WiringReport {
    /// `(name, identifier)` of every connection.
    pub connections: Vec<(String, String)>,
    /// `(name, identifier)` of every index.
    pub indexes: Vec<(String, String)>,
    /// `(<index>.<type>, identifier)` of every type.
    pub types: Vec<(String, String)>,
    /// `(name, identifier)` of every document manager.
    pub document_managers: Vec<(String, String)>,
    /// Identifier of the query collector.
    pub collector: String,
    /// Whether connections were wired with diagnostics.
    pub diagnostics: bool,
    /// True when the configuration had nothing to wire.
    pub skipped: bool,
}

impl WiringReport {
    /// Returns the number of wired handles, the collector excluded.
    pub fn total(&self) -> usize {
        self.connections.len() + self.indexes.len() + self.types.len() + self.document_managers.len()
    }

    /// Returns true if no handle was wired.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Loads a [`WiringConfig`] into a [`ServiceRegistry`].
#[derive(Debug, Clone)]
pub struct SearchGraphLoader {
    transport: Arc<dyn SearchTransport>,
    diagnostics: Option<bool>,
}

impl SearchGraphLoader {
    /// Creates a loader whose connections delegate to `transport`.
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        Self {
            transport,
            diagnostics: None,
        }
    }

    /// Forces diagnostic mode on or off instead of reading the registry's
    /// `debug` parameter.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = Some(enabled);
        self
    }

    /// Wires the configuration into `registry`.
    ///
    /// The query collector is registered under `<namespace>.data_collector`
    /// unless already present. Without any index the load is a no-op. Any
    /// configuration error aborts the load before a single handle is
    /// registered.
    pub fn load<R: ServiceRegistry>(
        &self,
        config: &WiringConfig,
        registry: &mut R,
    ) -> WiringResult<WiringReport> {
        let ids = ServiceIds::new(config.namespace.as_str());
        let mut report = WiringReport {
            collector: ids.collector(),
            ..WiringReport::default()
        };

        if !registry.has_definition(&report.collector) {
            registry.set_definition(
                &report.collector,
                Definition::instance(Service::Collector(Arc::new(QueryCollector::new()))),
            )?;
        }

        if config.is_unused() {
            warn!(namespace = %ids.namespace(), "No indexes configured, skipping search wiring");
            report.skipped = true;
            return Ok(report);
        }

        config.validate()?;

        report.diagnostics = self.diagnostics.unwrap_or_else(|| {
            registry
                .parameter(DEBUG_PARAMETER)
                .and_then(Value::as_bool)
                .unwrap_or(false)
        });

        let mut staging = Staging::new(&*registry);

        let mut connections = ConnectionRegistry::new(ids.clone(), self.transport.clone());
        for (name, client) in config.clients.iter() {
            let id =
                connections.register_connection(&mut staging, name, client, report.diagnostics)?;
            report.connections.push((name.to_string(), id));
        }
        let connections = connections.into_table();

        let mut indexes = IndexRegistry::new(ids.clone());
        let mut types = TypeRegistry::new(ids.clone());
        for (name, index) in config.indexes.iter() {
            indexes.register_index(&mut staging, name, index, &connections, &mut types)?;
        }
        report.indexes = indexes.registered().to_vec();
        report.types = types.registered().to_vec();
        let types = types.into_table();

        let mut managers = DocumentManagerRegistry::new(ids.clone());
        for (name, manager) in config.document_managers.iter() {
            managers.register_document_manager(&mut staging, name, manager, &types)?;
        }
        managers.publish(&mut staging);
        report.document_managers = managers.registered().to_vec();

        staging.into_changes().commit(registry)?;

        info!(
            namespace = %ids.namespace(),
            connections = report.connections.len(),
            indexes = report.indexes.len(),
            types = report.types.len(),
            document_managers = report.document_managers.len(),
            diagnostics = report.diagnostics,
            "Search wiring loaded"
        );

        Ok(report)
    }
}

/// Registry overlay collecting definitions and parameters without touching
/// the target.
struct Staging<'a, R: ServiceRegistry> {
    target: &'a R,
    changes: Changes,
}

#[derive(Default)]
struct Changes {
    definitions: Vec<(String, Definition)>,
    defined: HashSet<String>,
    parameters: HashMap<String, Value>,
}

impl<'a, R: ServiceRegistry> Staging<'a, R> {
    fn new(target: &'a R) -> Self {
        Self {
            target,
            changes: Changes::default(),
        }
    }

    fn into_changes(self) -> Changes {
        self.changes
    }
}

impl<R: ServiceRegistry> ServiceRegistry for Staging<'_, R> {
    fn set_definition(&mut self, id: &str, definition: Definition) -> ContainerResult<()> {
        if self.has_definition(id) {
            return Err(ContainerError::AlreadyDefined { id: id.to_string() });
        }
        self.changes.defined.insert(id.to_string());
        self.changes.definitions.push((id.to_string(), definition));
        Ok(())
    }

    fn has_definition(&self, id: &str) -> bool {
        self.changes.defined.contains(id) || self.target.has_definition(id)
    }

    fn parameter(&self, key: &str) -> Option<&Value> {
        self.changes
            .parameters
            .get(key)
            .or_else(|| self.target.parameter(key))
    }

    fn set_parameter(&mut self, key: &str, value: Value) {
        self.changes.parameters.insert(key.to_string(), value);
    }
}

impl Changes {
    fn commit<R: ServiceRegistry>(self, registry: &mut R) -> ContainerResult<()> {
        for (id, definition) in self.definitions {
            registry.set_definition(&id, definition)?;
        }
        for (key, value) in self.parameters {
            debug!(parameter = %key, "Publishing parameter");
            registry.set_parameter(&key, value);
        }
        Ok(())
    }
}
