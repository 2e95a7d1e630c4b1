//! Declarative service definitions.
//!
//! A [`Definition`] describes how a service is built without building it: the
//! constructor (or the factory call on another service), and the setter calls
//! applied right after construction. This keeps the wired graph inspectable
//! before anything is instantiated.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::connection::ConnectionSettings;
use crate::transport::SearchTransport;

use super::service::Service;

/// The kind of a registered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// A backend connection.
    Connection,
    /// An index handle.
    Index,
    /// A document type handle.
    Type,
    /// A document manager.
    DocumentManager,
    /// The query collector.
    Collector,
    /// A stopwatch.
    Stopwatch,
    /// A document data transformer.
    DataTransformer,
}

impl ServiceKind {
    /// Returns the identifier segment used for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Connection => "connection",
            ServiceKind::Index => "index",
            ServiceKind::Type => "type",
            ServiceKind::DocumentManager => "document_manager",
            ServiceKind::Collector => "data_collector",
            ServiceKind::Stopwatch => "stopwatch",
            ServiceKind::DataTransformer => "data_transformer",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when a referenced service is not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnInvalid {
    /// Resolution fails.
    #[default]
    Error,
    /// The reference resolves to nothing and the dependent call is skipped.
    Ignore,
}

/// A reference to another service by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    id: String,
    on_invalid: OnInvalid,
}

impl Reference {
    /// Creates a required reference.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            on_invalid: OnInvalid::Error,
        }
    }

    /// Creates a reference that is ignored when the service is missing.
    pub fn optional(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            on_invalid: OnInvalid::Ignore,
        }
    }

    /// Returns the referenced identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the missing-service behavior.
    pub fn on_invalid(&self) -> OnInvalid {
        self.on_invalid
    }
}

/// A factory method invoked on a target service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryMethod {
    /// `Connection::get_index(name)`.
    GetIndex,
    /// `SearchIndex::get_type(name)`.
    GetType,
}

impl FactoryMethod {
    /// Returns the method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FactoryMethod::GetIndex => "get_index",
            FactoryMethod::GetType => "get_type",
        }
    }

    /// Returns the kind of service the method produces.
    pub fn produces(&self) -> ServiceKind {
        match self {
            FactoryMethod::GetIndex => ServiceKind::Index,
            FactoryMethod::GetType => ServiceKind::Type,
        }
    }
}

/// How the service instance is produced.
#[derive(Debug, Clone)]
pub enum Constructor {
    /// A connection built from settings. No I/O happens at construction.
    Connection {
        /// Connection name.
        name: String,
        /// Endpoint settings.
        settings: ConnectionSettings,
        /// Transport the connection delegates to.
        transport: Arc<dyn SearchTransport>,
    },

    /// The result of calling `method(argument)` on the `target` service.
    Factory {
        /// Service the method is called on.
        target: Reference,
        /// Method to call.
        method: FactoryMethod,
        /// Method argument.
        argument: String,
    },

    /// A document manager bound to a type, with a fresh event hub.
    DocumentManager {
        /// Manager name.
        name: String,
        /// Type handle the manager works on.
        document_type: Reference,
        /// Query builder class identifier, instantiated by the manager on use.
        query_builder: Option<String>,
    },

    /// An already constructed service.
    Instance(Service),
}

/// A setter call applied after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodCall {
    /// `Connection::set_stopwatch`.
    SetStopwatch(Reference),
    /// `Connection::set_collector`.
    SetCollector(Reference),
    /// `DocumentManager::set_data_transformer`.
    SetDataTransformer(Reference),
}

impl MethodCall {
    /// Returns the setter name.
    pub fn name(&self) -> &'static str {
        match self {
            MethodCall::SetStopwatch(_) => "set_stopwatch",
            MethodCall::SetCollector(_) => "set_collector",
            MethodCall::SetDataTransformer(_) => "set_data_transformer",
        }
    }

    /// Returns the reference passed to the setter.
    pub fn reference(&self) -> &Reference {
        match self {
            MethodCall::SetStopwatch(r)
            | MethodCall::SetCollector(r)
            | MethodCall::SetDataTransformer(r) => r,
        }
    }
}

/// A service definition: kind, constructor and post-construction calls.
#[derive(Debug, Clone)]
pub struct Definition {
    kind: ServiceKind,
    constructor: Constructor,
    calls: Vec<MethodCall>,
}

impl Definition {
    /// Defines a connection.
    pub fn connection(
        name: impl Into<String>,
        settings: ConnectionSettings,
        transport: Arc<dyn SearchTransport>,
    ) -> Self {
        Self {
            kind: ServiceKind::Connection,
            constructor: Constructor::Connection {
                name: name.into(),
                settings,
                transport,
            },
            calls: Vec::new(),
        }
    }

    /// Defines a service produced by a factory method on another service.
    pub fn factory(
        kind: ServiceKind,
        target: Reference,
        method: FactoryMethod,
        argument: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            constructor: Constructor::Factory {
                target,
                method,
                argument: argument.into(),
            },
            calls: Vec::new(),
        }
    }

    /// Defines a document manager.
    pub fn document_manager(
        name: impl Into<String>,
        document_type: Reference,
        query_builder: Option<String>,
    ) -> Self {
        Self {
            kind: ServiceKind::DocumentManager,
            constructor: Constructor::DocumentManager {
                name: name.into(),
                document_type,
                query_builder,
            },
            calls: Vec::new(),
        }
    }

    /// Defines an already constructed service.
    pub fn instance(service: Service) -> Self {
        Self {
            kind: service.kind(),
            constructor: Constructor::Instance(service),
            calls: Vec::new(),
        }
    }

    /// Appends a post-construction call.
    pub fn with_call(mut self, call: MethodCall) -> Self {
        self.calls.push(call);
        self
    }

    /// Returns the service kind.
    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    /// Returns the constructor.
    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    /// Returns the post-construction calls.
    pub fn calls(&self) -> &[MethodCall] {
        &self.calls
    }

    /// Returns the factory target and method when this is a factory binding.
    pub fn factory_binding(&self) -> Option<(&Reference, FactoryMethod, &str)> {
        match &self.constructor {
            Constructor::Factory {
                target,
                method,
                argument,
            } => Some((target, *method, argument.as_str())),
            _ => None,
        }
    }

    /// Returns true if the instance is only built on first resolution.
    pub fn is_lazy(&self) -> bool {
        !matches!(self.constructor, Constructor::Instance(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_behavior() {
        assert_eq!(Reference::new("a").on_invalid(), OnInvalid::Error);
        assert_eq!(Reference::optional("a").on_invalid(), OnInvalid::Ignore);
        assert_eq!(Reference::optional("debug.stopwatch").id(), "debug.stopwatch");
    }

    #[test]
    fn test_factory_binding() {
        let def = Definition::factory(
            ServiceKind::Index,
            Reference::new("helios.search.connection.main"),
            FactoryMethod::GetIndex,
            "products",
        );

        assert_eq!(def.kind(), ServiceKind::Index);
        assert!(def.is_lazy());
        let (target, method, argument) = def.factory_binding().unwrap();
        assert_eq!(target.id(), "helios.search.connection.main");
        assert_eq!(method, FactoryMethod::GetIndex);
        assert_eq!(argument, "products");
    }

    #[test]
    fn test_method_calls() {
        let def = Definition::document_manager("m", Reference::new("t"), None).with_call(
            MethodCall::SetDataTransformer(Reference::new("app.transformer")),
        );
        assert_eq!(def.calls().len(), 1);
        assert_eq!(def.calls()[0].name(), "set_data_transformer");
        assert_eq!(def.calls()[0].reference().id(), "app.transformer");
        assert!(def.factory_binding().is_none());
    }
}
