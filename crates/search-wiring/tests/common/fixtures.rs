//! Configuration fixtures.

use std::sync::Arc;

use serde_json::{Value, json};

use helios_search_wiring::config::WiringConfig;
use helios_search_wiring::container::ServiceContainer;
use helios_search_wiring::transport::StaticTransport;
use helios_search_wiring::wiring::{SearchGraphLoader, WiringReport};

/// The single client, index, type and manager configuration.
pub fn products_json() -> Value {
    json!({
        "clients": {
            "main": { "host": "localhost", "port": 9200, "timeout": 5 }
        },
        "indexes": {
            "products": { "client": "main", "types": { "item": {} } }
        },
        "document_managers": {
            "productManager": { "type": "products.item" }
        }
    })
}

/// A larger catalog: 2 clients, 3 indexes, 5 types and 3 managers.
pub fn catalog_json() -> Value {
    json!({
        "clients": {
            "main": { "host": "es-main.internal", "port": 9200, "timeout": 10 },
            "analytics": { "host": "es-analytics.internal", "port": 9201 }
        },
        "indexes": {
            "products": {
                "client": "main",
                "types": { "item": {}, "variant": {} }
            },
            "orders": {
                "index_name": "orders_v3",
                "client": "main",
                "types": { "order": {}, "line": {} }
            },
            "events": {
                "client": "analytics",
                "types": { "click": {} }
            }
        },
        "document_managers": {
            "productManager": {
                "type": "products.item",
                "query_builder_classname": "ProductQueryBuilder"
            },
            "variantManager": { "type": "products.variant" },
            "orderManager": {
                "type": "helios.search.type.orders.order",
                "data_transformer": "app.order_transformer"
            }
        }
    })
}

/// Parses a fixture.
pub fn config(value: Value) -> WiringConfig {
    WiringConfig::from_value(value).expect("fixture must parse")
}

/// A loader over a fresh offline transport, returned alongside it.
pub fn loader() -> (SearchGraphLoader, Arc<StaticTransport>) {
    let transport = Arc::new(StaticTransport::new());
    (SearchGraphLoader::new(transport.clone()), transport)
}

/// Loads a configuration into a fresh container.
pub fn load(value: Value) -> (ServiceContainer, WiringReport, Arc<StaticTransport>) {
    let (loader, transport) = loader();
    let mut container = ServiceContainer::new();
    let report = loader
        .load(&config(value), &mut container)
        .expect("fixture must load");
    (container, report, transport)
}
