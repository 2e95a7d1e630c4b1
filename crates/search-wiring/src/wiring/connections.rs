//! Connection phase.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::ClientConfig;
use crate::connection::ConnectionSettings;
use crate::container::{Definition, MethodCall, Reference, ServiceRegistry};
use crate::error::WiringResult;
use crate::transport::SearchTransport;

use super::{STOPWATCH_ID, ServiceIds};

/// Connection identifiers by client name, exported to the index phase.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTable {
    ids: HashMap<String, String>,
}

impl ConnectionTable {
    /// Returns the connection identifier registered for a client name.
    pub fn get(&self, client: &str) -> Option<&str> {
        self.ids.get(client).map(String::as_str)
    }

    /// Returns the number of connections.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Registers one connection definition per configured client.
#[derive(Debug)]
pub struct ConnectionRegistry {
    ids: ServiceIds,
    transport: Arc<dyn SearchTransport>,
    table: ConnectionTable,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new(ids: ServiceIds, transport: Arc<dyn SearchTransport>) -> Self {
        Self {
            ids,
            transport,
            table: ConnectionTable::default(),
        }
    }

    /// Registers the connection for `name` and returns its identifier.
    ///
    /// No I/O happens here. With `diagnostics`, the connection gets the
    /// stopwatch (skipped when none is registered) and the query collector.
    pub fn register_connection<R: ServiceRegistry>(
        &mut self,
        registry: &mut R,
        name: &str,
        client: &ClientConfig,
        diagnostics: bool,
    ) -> WiringResult<String> {
        let id = self.ids.connection(name);

        let mut definition =
            Definition::connection(name, ConnectionSettings::from(client), self.transport.clone());
        if diagnostics {
            definition = definition
                .with_call(MethodCall::SetStopwatch(Reference::optional(STOPWATCH_ID)))
                .with_call(MethodCall::SetCollector(Reference::new(self.ids.collector())));
        }

        registry.set_definition(&id, definition)?;
        debug!(
            service = %id,
            host = %client.host,
            port = client.port,
            diagnostics,
            "Registered connection"
        );

        self.table.ids.insert(name.to_string(), id.clone());
        Ok(id)
    }

    /// Finishes the phase and returns the exported table.
    pub fn into_table(self) -> ConnectionTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Constructor, ServiceContainer};
    use crate::transport::StaticTransport;

    fn registry() -> ConnectionRegistry {
        ConnectionRegistry::new(
            ServiceIds::new("helios.search"),
            Arc::new(StaticTransport::new()),
        )
    }

    #[test]
    fn test_register_connection() {
        let mut container = ServiceContainer::new();
        let mut connections = registry();

        let id = connections
            .register_connection(
                &mut container,
                "main",
                &ClientConfig::new("es.internal", 9201).with_timeout(30),
                false,
            )
            .unwrap();

        assert_eq!(id, "helios.search.connection.main");
        let definition = container.definition(&id).unwrap();
        assert!(definition.calls().is_empty());
        match definition.constructor() {
            Constructor::Connection { name, settings, .. } => {
                assert_eq!(name, "main");
                assert_eq!(settings.host, "es.internal");
                assert_eq!(settings.port, 9201);
            }
            other => panic!("unexpected constructor: {:?}", other),
        }

        let table = connections.into_table();
        assert_eq!(table.get("main"), Some("helios.search.connection.main"));
        assert_eq!(table.get("other"), None);
    }

    #[test]
    fn test_diagnostics_add_calls() {
        let mut container = ServiceContainer::new();
        let mut connections = registry();

        let id = connections
            .register_connection(&mut container, "main", &ClientConfig::default(), true)
            .unwrap();

        let calls = container.definition(&id).unwrap().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], MethodCall::SetStopwatch(Reference::optional("debug.stopwatch")));
        assert_eq!(
            calls[1],
            MethodCall::SetCollector(Reference::new("helios.search.data_collector"))
        );
    }
}
