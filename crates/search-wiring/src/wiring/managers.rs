//! Document manager phase.

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::DocumentManagerConfig;
use crate::container::{Definition, MethodCall, Reference, ServiceRegistry};
use crate::error::WiringResult;

use super::ServiceIds;
use super::types::TypeTable;

/// Registers document managers and publishes their name map.
#[derive(Debug)]
pub struct DocumentManagerRegistry {
    ids: ServiceIds,
    registered: Vec<(String, String)>,
}

impl DocumentManagerRegistry {
    /// Creates an empty registry.
    pub fn new(ids: ServiceIds) -> Self {
        Self {
            ids,
            registered: Vec::new(),
        }
    }

    /// Registers the manager `name` bound to the type it references and
    /// returns its identifier.
    ///
    /// The query builder class identifier is stored, not instantiated. A data
    /// transformer is bound through a post-construction call.
    pub fn register_document_manager<R: ServiceRegistry>(
        &mut self,
        registry: &mut R,
        name: &str,
        manager: &DocumentManagerConfig,
        types: &TypeTable,
    ) -> WiringResult<String> {
        let type_id = types.resolve(name, &manager.type_ref, &self.ids)?;
        let id = self.ids.document_manager(name);

        let mut definition = Definition::document_manager(
            name,
            Reference::new(type_id),
            manager.query_builder().map(str::to_string),
        );
        if let Some(transformer) = manager.transformer() {
            definition =
                definition.with_call(MethodCall::SetDataTransformer(Reference::new(transformer)));
        }

        registry.set_definition(&id, definition)?;
        debug!(service = %id, document_type = %type_id, "Registered document manager");

        self.registered.push((name.to_string(), id.clone()));
        Ok(id)
    }

    /// Returns `(name, identifier)` pairs in registration order.
    pub fn registered(&self) -> &[(String, String)] {
        &self.registered
    }

    /// Returns the `{name: identifier}` map of registered managers.
    pub fn name_map(&self) -> Value {
        let map: Map<String, Value> = self
            .registered
            .iter()
            .map(|(name, id)| (name.clone(), Value::String(id.clone())))
            .collect();
        Value::Object(map)
    }

    /// Publishes the name map as the `<namespace>.document_managers`
    /// parameter. Nothing is published when no manager was registered.
    pub fn publish<R: ServiceRegistry>(&self, registry: &mut R) -> bool {
        if self.registered.is_empty() {
            return false;
        }
        registry.set_parameter(&self.ids.document_managers_parameter(), self.name_map());
        true
    }
}
