//! Error types for search wiring.
//!
//! Errors are split by the layer that raises them: configuration problems found
//! while planning the service graph, registry problems found while defining or
//! resolving services, and transport problems surfaced by the search backend.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::config::ConfigSection;
use crate::container::ServiceKind;

/// The primary error type returned by the wiring entry points.
#[derive(Error, Debug)]
pub enum WiringError {
    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Service registry errors
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// Search transport errors
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors found in the declarative configuration.
///
/// None of these are recoverable in-process: the configuration has to be
/// corrected and loaded again.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {message}")]
    Parse { message: String },

    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {message}")]
    Io { path: String, message: String },

    /// Two entries of the same section share a key.
    #[error("duplicate {section} entry: {name}")]
    DuplicateName {
        section: ConfigSection,
        name: String,
    },

    /// An index names a client that is not configured.
    #[error("index '{index}' references unknown client '{client}'")]
    UnknownClient { index: String, client: String },

    /// A document manager names a type that is not configured.
    #[error("document manager '{manager}' references unknown type '{type_key}'")]
    UnknownType { manager: String, type_key: String },

    /// A document manager type reference is not of the form `<index>.<type>`.
    #[error(
        "document manager '{manager}' has invalid type reference '{reference}', expected <index>.<type>"
    )]
    InvalidTypeReference { manager: String, reference: String },

    /// An entry carries an unusable value.
    #[error("invalid {section} entry '{name}': {message}")]
    InvalidEntry {
        section: ConfigSection,
        name: String,
        message: String,
    },
}

/// Errors raised by a service registry.
#[derive(Error, Debug)]
pub enum ContainerError {
    /// No definition exists for the identifier.
    #[error("service not found: {id}")]
    NotFound { id: String },

    /// A definition already exists for the identifier.
    #[error("service already defined: {id}")]
    AlreadyDefined { id: String },

    /// The service exists but is of another kind.
    #[error("service '{id}' has kind {actual}, expected {expected}")]
    KindMismatch {
        id: String,
        expected: ServiceKind,
        actual: ServiceKind,
    },

    /// The constructor or a factory of the service failed.
    #[error("failed to construct service '{id}': {message}")]
    Construction {
        id: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ContainerError {
    /// Wraps a transport failure raised while constructing `id`.
    pub fn construction(id: impl Into<String>, source: TransportError) -> Self {
        ContainerError::Construction {
            id: id.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

/// Errors surfaced by a search transport implementation.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The backend could not be reached.
    #[error("connection to {host}:{port} failed: {message}")]
    ConnectionFailed {
        host: String,
        port: u16,
        message: String,
    },

    /// The backend does not know the index.
    #[error("index not found: {index}")]
    IndexNotFound { index: String },

    /// The index does not know the document type.
    #[error("type not found: {index}/{doc_type}")]
    TypeNotFound { index: String, doc_type: String },

    /// The request exceeded the connection timeout.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Any other transport failure.
    #[error("transport error: {message}")]
    Internal { message: String },
}

/// Result type alias for wiring operations.
pub type WiringResult<T> = Result<T, WiringError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for registry operations.
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Result type alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for WiringError {
    fn from(err: serde_json::Error) -> Self {
        WiringError::Config(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::DuplicateName {
            section: ConfigSection::Indexes,
            name: "products".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate indexes entry: products");

        let err = ConfigError::UnknownType {
            manager: "productManager".to_string(),
            type_key: "products.missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "document manager 'productManager' references unknown type 'products.missing'"
        );
    }

    #[test]
    fn test_container_error_display() {
        let err = ContainerError::KindMismatch {
            id: "helios.search.index.products".to_string(),
            expected: ServiceKind::Connection,
            actual: ServiceKind::Index,
        };
        assert_eq!(
            err.to_string(),
            "service 'helios.search.index.products' has kind index, expected connection"
        );
    }

    #[test]
    fn test_construction_keeps_transport_source() {
        let err = ContainerError::construction(
            "helios.search.index.products",
            TransportError::IndexNotFound {
                index: "products".to_string(),
            },
        );
        assert!(err.to_string().contains("index not found: products"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_wiring_error_from_layers() {
        let err: WiringError = ConfigError::UnknownClient {
            index: "products".to_string(),
            client: "main".to_string(),
        }
        .into();
        assert!(matches!(err, WiringError::Config(_)));

        let err: WiringError = ContainerError::NotFound {
            id: "x".to_string(),
        }
        .into();
        assert!(matches!(err, WiringError::Container(_)));

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: WiringError = parse.into();
        assert!(matches!(err, WiringError::Config(ConfigError::Parse { .. })));
    }
}
