//! Declarative configuration for the search service graph.
//!
//! The configuration is a nested document with three groups:
//!
//! - `clients`: backend endpoints, one connection each
//! - `indexes`: indexes bound to a client, each with its document `types`
//! - `document_managers`: managers bound to an `<index>.<type>` reference
//!
//! # Example
//!
//! ```rust
//! use helios_search_wiring::config::WiringConfig;
//!
//! let config = WiringConfig::from_json_str(r#"{
//!     "clients": { "main": { "host": "localhost", "port": 9200, "timeout": 5 } },
//!     "indexes": { "products": { "client": "main", "types": { "item": {} } } },
//!     "document_managers": { "productManager": { "type": "products.item" } }
//! }"#).unwrap();
//!
//! assert_eq!(config.clients.len(), 1);
//! assert!(config.validate().is_ok());
//! ```

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ConfigError, ConfigResult};

/// Identifier prefix used when no namespace is configured.
pub const DEFAULT_NAMESPACE: &str = "helios.search";

/// A configuration group, used to locate offending entries in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSection {
    /// The `clients` group.
    Clients,
    /// The `indexes` group.
    Indexes,
    /// The `types` group nested inside an index.
    Types,
    /// The `document_managers` group.
    DocumentManagers,
}

impl ConfigSection {
    /// Returns the configuration key of the section.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigSection::Clients => "clients",
            ConfigSection::Indexes => "indexes",
            ConfigSection::Types => "types",
            ConfigSection::DocumentManagers => "document_managers",
        }
    }
}

impl fmt::Display for ConfigSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered, keyed configuration group.
///
/// Entries keep their document order, and repeated keys are preserved so that
/// [`Section::first_duplicate`] can report them instead of the last value
/// silently winning.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<T> {
    entries: Vec<(String, T)>,
}

impl<T> Section<T> {
    /// Creates an empty section.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry, keeping any earlier entry with the same key.
    pub fn push(&mut self, name: impl Into<String>, value: T) {
        self.entries.push((name.into(), value));
    }

    /// Appends an entry and returns the section.
    pub fn with(mut self, name: impl Into<String>, value: T) -> Self {
        self.push(name, value);
        self
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the section has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first entry with the given key.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Iterates entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Iterates keys in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Returns the first key that appears more than once.
    pub fn first_duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.names().find(|name| !seen.insert(*name))
    }
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for Section<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<T: Serialize> Serialize for Section<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct SectionVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for SectionVisitor<T> {
    type Value = Section<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of named entries")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, T>()? {
            entries.push((key, value));
        }
        Ok(Section { entries })
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Section::new())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Section<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SectionVisitor(PhantomData))
    }
}

/// Connection settings for one backend endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend host name (default: `"localhost"`).
    #[serde(default = "default_host")]
    pub host: String,

    /// Backend port (default: 9200).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds (default: 5).
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9200
}

fn default_timeout() -> u64 {
    5
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout: default_timeout(),
        }
    }
}

impl ClientConfig {
    /// Creates client settings for a host and port with the default timeout.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: default_timeout(),
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A document type declared under an index. Types carry no settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeConfig {}

/// An index bound to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Backend index name, when it differs from the configuration key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,

    /// Name of the owning client.
    pub client: String,

    /// Document types of the index.
    #[serde(default)]
    pub types: Section<TypeConfig>,
}

impl IndexConfig {
    /// Creates an index bound to `client` with no types.
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            index_name: None,
            client: client.into(),
            types: Section::new(),
        }
    }

    /// Sets the backend index name.
    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Adds a document type.
    pub fn with_type(mut self, name: impl Into<String>) -> Self {
        self.types.push(name, TypeConfig::default());
        self
    }

    /// Returns the backend index name: the override when set, else `key`.
    pub fn real_index_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.index_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(key)
    }
}

/// A document manager bound to a document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentManagerConfig {
    /// Type reference, `<index>.<type>`.
    #[serde(rename = "type")]
    pub type_ref: String,

    /// Class identifier of the query builder the manager instantiates on use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_builder_classname: Option<String>,

    /// Service identifier of the data transformer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_transformer: Option<String>,
}

impl DocumentManagerConfig {
    /// Creates a manager bound to `type_ref`.
    pub fn new(type_ref: impl Into<String>) -> Self {
        Self {
            type_ref: type_ref.into(),
            query_builder_classname: None,
            data_transformer: None,
        }
    }

    /// Sets the query builder class identifier.
    pub fn with_query_builder(mut self, classname: impl Into<String>) -> Self {
        self.query_builder_classname = Some(classname.into());
        self
    }

    /// Sets the data transformer service identifier.
    pub fn with_data_transformer(mut self, service_id: impl Into<String>) -> Self {
        self.data_transformer = Some(service_id.into());
        self
    }

    /// Returns the query builder class identifier, ignoring empty values.
    pub fn query_builder(&self) -> Option<&str> {
        self.query_builder_classname
            .as_deref()
            .filter(|s| !s.is_empty())
    }

    /// Returns the data transformer service identifier, ignoring empty values.
    pub fn transformer(&self) -> Option<&str> {
        self.data_transformer.as_deref().filter(|s| !s.is_empty())
    }
}

/// Complete wiring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WiringConfig {
    /// Identifier prefix of every registered service (default: `helios.search`).
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Backend endpoints.
    #[serde(default)]
    pub clients: Section<ClientConfig>,

    /// Indexes and their types.
    #[serde(default)]
    pub indexes: Section<IndexConfig>,

    /// Document managers.
    #[serde(default)]
    pub document_managers: Section<DocumentManagerConfig>,
}

impl Default for WiringConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            clients: Section::new(),
            indexes: Section::new(),
            document_managers: Section::new(),
        }
    }
}

impl WiringConfig {
    /// Creates an empty configuration with the default namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Converts an already parsed JSON value.
    ///
    /// A [`serde_json::Value`] object has already collapsed repeated keys,
    /// keeping the last one, so duplicate names cannot be detected here. Use
    /// [`from_json_str`](Self::from_json_str) or [`from_path`](Self::from_path)
    /// when duplicates must be rejected.
    pub fn from_value(value: serde_json::Value) -> ConfigResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Reads and parses a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&contents)
    }

    /// Sets the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Adds a client.
    pub fn with_client(mut self, name: impl Into<String>, client: ClientConfig) -> Self {
        self.clients.push(name, client);
        self
    }

    /// Adds an index.
    pub fn with_index(mut self, name: impl Into<String>, index: IndexConfig) -> Self {
        self.indexes.push(name, index);
        self
    }

    /// Adds a document manager.
    pub fn with_document_manager(
        mut self,
        name: impl Into<String>,
        manager: DocumentManagerConfig,
    ) -> Self {
        self.document_managers.push(name, manager);
        self
    }

    /// Returns true when there is nothing to wire.
    ///
    /// Wiring only happens when both clients and indexes are configured,
    /// except that indexes without any client are reported as dangling
    /// references by the loader.
    pub fn is_unused(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Checks entry-level problems: duplicate keys and unusable values.
    ///
    /// Cross-section references are resolved by the wiring phases.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(name) = self.clients.first_duplicate() {
            return Err(duplicate(ConfigSection::Clients, name));
        }
        if let Some(name) = self.indexes.first_duplicate() {
            return Err(duplicate(ConfigSection::Indexes, name));
        }
        if let Some(name) = self.document_managers.first_duplicate() {
            return Err(duplicate(ConfigSection::DocumentManagers, name));
        }

        for (name, client) in self.clients.iter() {
            if client.host.trim().is_empty() {
                return Err(invalid(ConfigSection::Clients, name, "host cannot be empty"));
            }
            if client.port == 0 {
                return Err(invalid(ConfigSection::Clients, name, "port cannot be 0"));
            }
        }

        for (name, index) in self.indexes.iter() {
            if let Some(type_name) = index.types.first_duplicate() {
                return Err(duplicate(
                    ConfigSection::Types,
                    format!("{}.{}", name, type_name),
                ));
            }
            if index.client.trim().is_empty() {
                return Err(invalid(ConfigSection::Indexes, name, "client cannot be empty"));
            }
        }

        Ok(())
    }
}

fn duplicate(section: ConfigSection, name: impl Into<String>) -> ConfigError {
    ConfigError::DuplicateName {
        section,
        name: name.into(),
    }
}

fn invalid(section: ConfigSection, name: &str, message: &str) -> ConfigError {
    ConfigError::InvalidEntry {
        section,
        name: name.to_string(),
        message: message.to_string(),
    }
}
