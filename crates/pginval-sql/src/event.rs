//! Schema-affecting events produced by the AST path.

use serde::{Deserialize, Serialize};

/// Schema used whenever the SQL does not name one.
pub const DEFAULT_SCHEMA: &str = "public";

/// Kind of entity touched by a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Table,
    Function,
    Cron,
}

/// One detected schema-affecting operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub entity_type: EntityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
}

impl Event {
    /// A table event; `entity_name` mirrors the table name.
    pub fn table(schema: impl Into<String>, table: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            entity_type: EntityType::Table,
            schema: Some(schema.into()),
            entity_name: Some(table.clone()),
            table: Some(table),
        }
    }

    /// A function (or procedure) event.
    pub fn function(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            entity_type: EntityType::Function,
            schema: Some(schema.into()),
            table: None,
            entity_name: Some(name.into()),
        }
    }

    /// A `cron.schedule` / `cron.unschedule` call; `call` is the function name.
    pub fn cron(call: impl Into<String>) -> Self {
        Self {
            entity_type: EntityType::Cron,
            schema: None,
            table: None,
            entity_name: Some(call.into()),
        }
    }
}

/// An [`Event`] scoped to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationEvent {
    #[serde(flatten)]
    pub event: Event,
    pub project_ref: String,
}

impl InvalidationEvent {
    pub fn new(project_ref: impl Into<String>, event: Event) -> Self {
        Self {
            event,
            project_ref: project_ref.into(),
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.event.entity_type
    }
}
