//! Integration tests for wiring into a host-provided registry.
//!
//! The loader only depends on [`ServiceRegistry`], so a host framework can
//! receive the definitions and instantiate them its own way.

mod common;

use std::collections::{BTreeMap, HashMap};

use serde_json::{Value, json};

use common::*;
use helios_search_wiring::container::{
    Constructor, Definition, FactoryMethod, MethodCall, ServiceKind, ServiceRegistry,
};
use helios_search_wiring::error::{ContainerError, ContainerResult};

/// A registry that only records what it receives.
#[derive(Default)]
struct RecordingRegistry {
    definitions: BTreeMap<String, Definition>,
    parameters: HashMap<String, Value>,
}

impl ServiceRegistry for RecordingRegistry {
    fn set_definition(&mut self, id: &str, definition: Definition) -> ContainerResult<()> {
        if self.definitions.contains_key(id) {
            return Err(ContainerError::AlreadyDefined { id: id.to_string() });
        }
        self.definitions.insert(id.to_string(), definition);
        Ok(())
    }

    fn has_definition(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    fn parameter(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    fn set_parameter(&mut self, key: &str, value: Value) {
        self.parameters.insert(key.to_string(), value);
    }
}

/// Test the factory bindings handed to the host registry.
#[test]
fn test_factory_bindings() {
    let (loader, transport) = loader();
    let mut registry = RecordingRegistry::default();
    loader
        .load(&config(products_json()), &mut registry)
        .unwrap();

    let index = &registry.definitions["helios.search.index.products"];
    let (target, method, argument) = index.factory_binding().unwrap();
    assert_eq!(target.id(), "helios.search.connection.main");
    assert_eq!(method, FactoryMethod::GetIndex);
    assert_eq!(argument, "products");

    let doc_type = &registry.definitions["helios.search.type.products.item"];
    let (target, method, argument) = doc_type.factory_binding().unwrap();
    assert_eq!(target.id(), "helios.search.index.products");
    assert_eq!(method, FactoryMethod::GetType);
    assert_eq!(argument, "item");

    let manager = &registry.definitions["helios.search.document_manager.productManager"];
    assert_eq!(manager.kind(), ServiceKind::DocumentManager);
    match manager.constructor() {
        Constructor::DocumentManager { document_type, .. } => {
            assert_eq!(document_type.id(), "helios.search.type.products.item");
        }
        other => panic!("unexpected constructor: {:?}", other),
    }

    assert_eq!(
        registry.parameters["helios.search.document_managers"],
        json!({"productManager": "helios.search.document_manager.productManager"})
    );
    assert_eq!(transport.index_opens(), 0);
}

/// Test that the host's debug parameter drives diagnostics wiring.
#[test]
fn test_debug_parameter() {
    let (loader, _) = loader();
    let mut registry = RecordingRegistry::default();
    registry.set_parameter("debug", json!(true));

    loader
        .load(&config(products_json()), &mut registry)
        .unwrap();

    let calls = registry.definitions["helios.search.connection.main"].calls();
    let names: Vec<_> = calls.iter().map(MethodCall::name).collect();
    assert_eq!(names, vec!["set_stopwatch", "set_collector"]);
    assert_eq!(calls[1].reference().id(), "helios.search.data_collector");
}

/// Test that every definition except the collector is lazy.
#[test]
fn test_definitions_are_lazy() {
    let (loader, _) = loader();
    let mut registry = RecordingRegistry::default();
    loader
        .load(&config(catalog_json()), &mut registry)
        .unwrap();

    for (id, definition) in &registry.definitions {
        if definition.kind() == ServiceKind::Collector {
            assert!(!definition.is_lazy());
        } else {
            assert!(definition.is_lazy(), "{} should be lazy", id);
        }
    }
    assert_eq!(registry.definitions.len(), 2 + 3 + 5 + 3 + 1);
}
