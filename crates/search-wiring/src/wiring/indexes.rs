//! Index phase.

use tracing::debug;

use crate::config::IndexConfig;
use crate::container::{Definition, FactoryMethod, Reference, ServiceKind, ServiceRegistry};
use crate::error::{ConfigError, WiringResult};

use super::ServiceIds;
use super::connections::ConnectionTable;
use super::types::TypeRegistry;

/// Registers one lazy index definition per configured index.
#[derive(Debug)]
pub struct IndexRegistry {
    ids: ServiceIds,
    registered: Vec<(String, String)>,
}

impl IndexRegistry {
    /// Creates an empty registry.
    pub fn new(ids: ServiceIds) -> Self {
        Self {
            ids,
            registered: Vec::new(),
        }
    }

    /// Registers `get_index(real_name)` on the owning connection, then every
    /// type of the index. Returns the index identifier.
    ///
    /// Fails with [`ConfigError::UnknownClient`] when the client was not
    /// registered by the connection phase.
    pub fn register_index<R: ServiceRegistry>(
        &mut self,
        registry: &mut R,
        name: &str,
        index: &IndexConfig,
        connections: &ConnectionTable,
        types: &mut TypeRegistry,
    ) -> WiringResult<String> {
        let connection_id =
            connections
                .get(&index.client)
                .ok_or_else(|| ConfigError::UnknownClient {
                    index: name.to_string(),
                    client: index.client.clone(),
                })?;

        let id = self.ids.index(name);
        let real_name = index.real_index_name(name);
        registry.set_definition(
            &id,
            Definition::factory(
                ServiceKind::Index,
                Reference::new(connection_id),
                FactoryMethod::GetIndex,
                real_name,
            ),
        )?;
        debug!(service = %id, connection = %connection_id, index_name = %real_name, "Registered index");

        for type_name in index.types.names() {
            types.register_type(registry, name, &id, type_name)?;
        }

        self.registered.push((name.to_string(), id.clone()));
        Ok(id)
    }

    /// Returns `(name, identifier)` pairs in registration order.
    pub fn registered(&self) -> &[(String, String)] {
        &self.registered
    }
}
