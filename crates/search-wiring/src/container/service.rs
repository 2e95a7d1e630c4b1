//! Resolved service instances.

use std::sync::Arc;

use crate::collector::QueryCollector;
use crate::connection::Connection;
use crate::manager::{DataTransformer, DocumentManager};
use crate::stopwatch::Stopwatch;
use crate::transport::{DocumentType, SearchIndex};

use super::definition::ServiceKind;

/// A resolved service. Cloning shares the underlying instance.
#[derive(Debug, Clone)]
pub enum Service {
    /// A backend connection.
    Connection(Arc<Connection>),
    /// An index handle.
    Index(Arc<dyn SearchIndex>),
    /// A document type handle.
    Type(Arc<dyn DocumentType>),
    /// A document manager.
    DocumentManager(Arc<DocumentManager>),
    /// The query collector.
    Collector(Arc<QueryCollector>),
    /// A stopwatch.
    Stopwatch(Arc<Stopwatch>),
    /// A document data transformer.
    DataTransformer(Arc<dyn DataTransformer>),
}

impl Service {
    /// Returns the kind of the service.
    pub fn kind(&self) -> ServiceKind {
        match self {
            Service::Connection(_) => ServiceKind::Connection,
            Service::Index(_) => ServiceKind::Index,
            Service::Type(_) => ServiceKind::Type,
            Service::DocumentManager(_) => ServiceKind::DocumentManager,
            Service::Collector(_) => ServiceKind::Collector,
            Service::Stopwatch(_) => ServiceKind::Stopwatch,
            Service::DataTransformer(_) => ServiceKind::DataTransformer,
        }
    }
}

/// Typed extraction of a [`Service`].
pub trait FromService: Sized {
    /// The kind this type is extracted from.
    const KIND: ServiceKind;

    /// Returns the typed handle, or `None` for another kind.
    fn from_service(service: Service) -> Option<Self>;
}

macro_rules! impl_from_service {
    ($ty:ty, $variant:ident, $kind:ident) => {
        impl FromService for $ty {
            const KIND: ServiceKind = ServiceKind::$kind;

            fn from_service(service: Service) -> Option<Self> {
                match service {
                    Service::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_from_service!(Arc<Connection>, Connection, Connection);
impl_from_service!(Arc<dyn SearchIndex>, Index, Index);
impl_from_service!(Arc<dyn DocumentType>, Type, Type);
impl_from_service!(Arc<DocumentManager>, DocumentManager, DocumentManager);
impl_from_service!(Arc<QueryCollector>, Collector, Collector);
impl_from_service!(Arc<Stopwatch>, Stopwatch, Stopwatch);
impl_from_service!(Arc<dyn DataTransformer>, DataTransformer, DataTransformer);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_service_matches_kind() {
        let service = Service::Collector(Arc::new(QueryCollector::new()));
        assert_eq!(service.kind(), ServiceKind::Collector);

        let collector = <Arc<QueryCollector>>::from_service(service.clone());
        assert!(collector.is_some());

        let stopwatch = <Arc<Stopwatch>>::from_service(service);
        assert!(stopwatch.is_none());
    }
}
