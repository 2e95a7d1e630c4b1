//! Backend connections.
//!
//! A [`Connection`] is a configuration object, not an open socket: building
//! one performs no I/O. In diagnostic mode it carries a [`Stopwatch`] and a
//! [`QueryCollector`], and every query issued through it is timed and
//! recorded.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::collector::QueryCollector;
use crate::config::ClientConfig;
use crate::error::TransportResult;
use crate::query::{QueryRequest, QueryResponse};
use crate::stopwatch::Stopwatch;
use crate::transport::{SearchIndex, SearchTransport};

/// Stopwatch section name used for queries.
pub const QUERY_SECTION: &str = "search.query";

/// Endpoint settings of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSettings {
    /// Backend host name.
    pub host: String,
    /// Backend port.
    pub port: u16,
    /// Request timeout.
    pub timeout: Duration,
}

impl ConnectionSettings {
    /// Returns the base URL of the endpoint.
    pub fn url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        ClientConfig::default().into()
    }
}

impl From<&ClientConfig> for ConnectionSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            timeout: Duration::from_secs(config.timeout),
        }
    }
}

impl From<ClientConfig> for ConnectionSettings {
    fn from(config: ClientConfig) -> Self {
        (&config).into()
    }
}

/// A named backend connection.
#[derive(Debug)]
pub struct Connection {
    name: String,
    settings: ConnectionSettings,
    transport: Arc<dyn SearchTransport>,
    stopwatch: Option<Arc<Stopwatch>>,
    collector: Option<Arc<QueryCollector>>,
}

impl Connection {
    /// Creates a connection without diagnostics.
    pub fn new(
        name: impl Into<String>,
        settings: ConnectionSettings,
        transport: Arc<dyn SearchTransport>,
    ) -> Self {
        Self {
            name: name.into(),
            settings,
            transport,
            stopwatch: None,
            collector: None,
        }
    }

    /// Returns the connection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the endpoint settings.
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Returns the attached stopwatch.
    pub fn stopwatch(&self) -> Option<&Arc<Stopwatch>> {
        self.stopwatch.as_ref()
    }

    /// Attaches a stopwatch.
    pub fn set_stopwatch(&mut self, stopwatch: Arc<Stopwatch>) {
        self.stopwatch = Some(stopwatch);
    }

    /// Returns the attached collector.
    pub fn collector(&self) -> Option<&Arc<QueryCollector>> {
        self.collector.as_ref()
    }

    /// Attaches a collector.
    pub fn set_collector(&mut self, collector: Arc<QueryCollector>) {
        self.collector = Some(collector);
    }

    /// Returns the handle of an index on this connection.
    pub fn get_index(&self, name: &str) -> TransportResult<Arc<dyn SearchIndex>> {
        debug!(connection = %self.name, index = %name, "Opening index");
        self.transport.get_index(&self.settings, name)
    }

    /// Sends a request.
    ///
    /// The round-trip is timed when a stopwatch is attached, and the pair is
    /// recorded when a collector is attached. Transport failures are returned
    /// without being recorded.
    pub fn query(&self, mut request: QueryRequest) -> TransportResult<QueryResponse> {
        if request.connection.is_none() {
            request.connection = Some(self.name.clone());
        }

        let lap = self.stopwatch.as_ref().map(|s| s.start(QUERY_SECTION));
        let result = self.transport.query(&self.settings, &request);
        if let Some(lap) = lap {
            lap.stop();
        }

        let response = result?;
        if let Some(collector) = &self.collector {
            collector.add_query(request, response.clone());
        }
        Ok(response)
    }
}
