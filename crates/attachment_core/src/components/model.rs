//! Entities built by the model, source and property factories.

use crate::components::factory::{FactoryError, FactoryResult, GenericFactory};
use crate::components::logger::ServiceLogger;
use rusqlite::{Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::rc::Rc;

/// Generic entity built by `model/factory`.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub obj_type: String,
    /// Metadata loaded for `obj_type`, an empty object when none exists.
    pub metadata: Value,
    pub data: Map<String, Value>,
}

impl Model {
    pub fn new(obj_type: impl Into<String>, metadata: Value) -> Self {
        Self {
            obj_type: obj_type.into(),
            metadata,
            data: Map::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Merges an object of values; non-object input is ignored.
    pub fn set_data(&mut self, data: &Value) {
        if let Some(object) = data.as_object() {
            for (key, value) in object {
                self.data.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Storage source bound to the `database` connection.
#[derive(Debug)]
pub struct DatabaseSource {
    pub ident: String,
    connection: Rc<Connection>,
}

impl DatabaseSource {
    pub fn new(ident: impl Into<String>, connection: Rc<Connection>) -> Self {
        Self {
            ident: ident.into(),
            connection,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Returns whether a table exists in the bound database.
    pub fn table_exists(&self, table: &str) -> rusqlite::Result<bool> {
        let found = self
            .connection
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1;",
                [table],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

/// Property definition built by `property/factory`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub property_type: String,
    /// Resolved class name, e.g. `Charcoal::Property::StringProperty`.
    pub class: String,
    pub label: Option<String>,
}

/// Property display built by `property/display/factory`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDisplay {
    pub display_type: String,
    pub class: String,
}

/// Turns raw rows into models of one type.
#[derive(Debug)]
pub struct CollectionLoader {
    logger: Rc<ServiceLogger>,
    factory: Rc<GenericFactory<Model>>,
}

impl CollectionLoader {
    pub fn new(logger: Rc<ServiceLogger>, factory: Rc<GenericFactory<Model>>) -> Self {
        Self { logger, factory }
    }

    pub fn factory(&self) -> &Rc<GenericFactory<Model>> {
        &self.factory
    }

    pub fn load(
        &self,
        obj_type: &str,
        rows: impl IntoIterator<Item = Value>,
    ) -> FactoryResult<Vec<Model>> {
        let mut models = Vec::new();
        for row in rows {
            if !row.is_object() {
                return Err(FactoryError::Build {
                    ident: obj_type.to_string(),
                    message: "collection rows must be objects".to_string(),
                });
            }
            let mut model = self.factory.create(obj_type)?;
            model.set_data(&row);
            models.push(model);
        }
        self.logger.debug(&format!(
            "event=collection_load module=components obj_type={obj_type} count={}",
            models.len()
        ));
        Ok(models)
    }
}
