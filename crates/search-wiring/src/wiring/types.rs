//! Document type phase.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::container::{Definition, FactoryMethod, Reference, ServiceKind, ServiceRegistry};
use crate::error::{ConfigError, WiringResult};

use super::ServiceIds;

/// Composite key of a document type: owning index and type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeKey {
    /// Index configuration key.
    pub index: String,
    /// Type name.
    pub name: String,
}

impl TypeKey {
    /// Creates a key.
    pub fn new(index: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.index, self.name)
    }
}

/// Flat table of type identifiers across all indexes, keyed by
/// `<index>.<type>`.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    ids: HashMap<String, String>,
}

impl TypeTable {
    /// Returns the identifier registered for a composite key.
    pub fn get(&self, key: &TypeKey) -> Option<&str> {
        self.ids.get(&key.to_string()).map(String::as_str)
    }

    /// Resolves a manager's type reference.
    ///
    /// Both `<index>.<type>` and the full type identifier
    /// `<namespace>.type.<index>.<type>` are accepted.
    pub fn resolve(&self, manager: &str, reference: &str, ids: &ServiceIds) -> WiringResult<&str> {
        let composite = reference
            .strip_prefix(ids.type_prefix().as_str())
            .unwrap_or(reference);

        if !composite.contains('.') {
            return Err(ConfigError::InvalidTypeReference {
                manager: manager.to_string(),
                reference: reference.to_string(),
            }
            .into());
        }

        self.ids.get(composite).map(String::as_str).ok_or_else(|| {
            ConfigError::UnknownType {
                manager: manager.to_string(),
                type_key: reference.to_string(),
            }
            .into()
        })
    }

    /// Returns the number of types.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no type is registered.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Registers one lazy type definition per type declared under an index.
#[derive(Debug)]
pub struct TypeRegistry {
    ids: ServiceIds,
    table: TypeTable,
    registered: Vec<(String, String)>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new(ids: ServiceIds) -> Self {
        Self {
            ids,
            table: TypeTable::default(),
            registered: Vec::new(),
        }
    }

    /// Registers `get_type(type_name)` on the index `index_id` and returns the
    /// type identifier.
    pub fn register_type<R: ServiceRegistry>(
        &mut self,
        registry: &mut R,
        index_key: &str,
        index_id: &str,
        type_name: &str,
    ) -> WiringResult<String> {
        let key = TypeKey::new(index_key, type_name);
        let id = self.ids.document_type(index_key, type_name);

        registry.set_definition(
            &id,
            Definition::factory(
                ServiceKind::Type,
                Reference::new(index_id),
                FactoryMethod::GetType,
                type_name,
            ),
        )?;
        debug!(service = %id, index = %index_id, "Registered document type");

        self.table.ids.insert(key.to_string(), id.clone());
        self.registered.push((key.to_string(), id.clone()));
        Ok(id)
    }

    /// Returns `(composite key, identifier)` pairs in registration order.
    pub fn registered(&self) -> &[(String, String)] {
        &self.registered
    }

    /// Finishes the phase and returns the exported table.
    pub fn into_table(self) -> TypeTable {
        self.table
    }
}
