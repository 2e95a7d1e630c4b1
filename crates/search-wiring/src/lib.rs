//! Helios Search Wiring
//!
//! This crate assembles a search client hierarchy from declarative
//! configuration and records the queries issued through it.
//!
//! The hierarchy has four levels, each bound to the one before:
//!
//! ```text
//! connection  ->  index  ->  document type  ->  document manager
//! ```
//!
//! Connections are plain configuration objects. Index and type handles are
//! lazy factory bindings that are only resolved against the backend on first
//! use, and at most once. Document managers share their type handle and own
//! an event hub each.
//!
//! # Architecture
//!
//! - [`config`] - Configuration model, parsing and validation
//! - [`wiring`] - The loader and its connection, index, type and manager phases
//! - [`container`] - Service definitions, the registry seam and the in-memory container
//! - [`connection`] - Connections, instrumented with a stopwatch and collector in diagnostic mode
//! - [`collector`] - The query collector and its report
//! - [`transport`] - The search transport seam and an offline implementation
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use helios_search_wiring::config::WiringConfig;
//! use helios_search_wiring::container::ServiceContainer;
//! use helios_search_wiring::query::QueryRequest;
//! use helios_search_wiring::transport::StaticTransport;
//! use helios_search_wiring::wiring::SearchGraphLoader;
//! use serde_json::json;
//!
//! let config = WiringConfig::from_value(json!({
//!     "clients": { "main": { "host": "localhost", "port": 9200, "timeout": 5 } },
//!     "indexes": { "products": { "client": "main", "types": { "item": {} } } },
//!     "document_managers": { "productManager": { "type": "products.item" } }
//! })).unwrap();
//!
//! let mut container = ServiceContainer::new();
//! SearchGraphLoader::new(Arc::new(StaticTransport::new()))
//!     .with_diagnostics(true)
//!     .load(&config, &mut container)
//!     .unwrap();
//!
//! // Queries issued through a diagnostic connection are recorded
//! let connection = container.connection("helios.search.connection.main").unwrap();
//! connection.query(QueryRequest::get("products/_search")).unwrap();
//!
//! let collector = container.collector("helios.search.data_collector").unwrap();
//! assert_eq!(collector.query_count(), 1);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod collector;
pub mod config;
pub mod connection;
pub mod container;
pub mod error;
pub mod events;
pub mod manager;
pub mod query;
pub mod stopwatch;
pub mod transport;
pub mod wiring;

// Re-export commonly used types at crate root
pub use collector::QueryCollector;
pub use config::WiringConfig;
pub use container::{ServiceContainer, ServiceRegistry};
pub use error::{ConfigError, ContainerError, TransportError, WiringError, WiringResult};
pub use wiring::{SearchGraphLoader, ServiceIds, WiringReport};

/// Initializes logging with the given default level.
///
/// `RUST_LOG` takes precedence when set.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("helios_search_wiring={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
