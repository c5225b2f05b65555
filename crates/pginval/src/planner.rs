//! Maps entity events to cache invalidation actions.
//!
//! Planning is pure: each event appends its actions to the output in a fixed
//! order and nothing is deduplicated across events.
//!
//! | Event | Actions |
//! |---|---|
//! | table with schema | table list (views), table list (no views), single table if named, entity types |
//! | table without schema | all tables of the project (prefix), entity types |
//! | function | database functions (refetch active) |
//! | cron | cron jobs (prefix, refetch active) |

use serde::{Deserialize, Serialize};

use crate::keys::{self, QueryKey};
use pginval_sql::{EntityType, InvalidationEvent};

/// Which matching cache entries get refetched right away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefetchType {
    Active,
    All,
    Inactive,
}

/// Options passed to the cache for one invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refetch_type: Option<RefetchType>,
}

/// One cache invalidation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationAction {
    pub key: QueryKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refetch_type: Option<RefetchType>,
}

impl InvalidationAction {
    pub fn new(key: QueryKey) -> Self {
        Self {
            key,
            exact: None,
            refetch_type: None,
        }
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = Some(exact);
        self
    }

    pub fn refetch(mut self, refetch_type: RefetchType) -> Self {
        self.refetch_type = Some(refetch_type);
        self
    }

    pub fn options(&self) -> InvalidateOptions {
        InvalidateOptions {
            exact: self.exact,
            refetch_type: self.refetch_type,
        }
    }

    /// `true` if this action hits `candidate` (absent `exact` means prefix).
    pub fn matches(&self, candidate: &QueryKey) -> bool {
        self.key.matches(candidate, self.exact.unwrap_or(false))
    }
}

/// Plan the invalidations for `events`, preserving event order.
///
/// # Example
/// ```
/// use pginval::{plan_invalidations_from_events, Event, InvalidationEvent, RefetchType};
///
/// let actions = plan_invalidations_from_events(&[InvalidationEvent::new(
///     "proj",
///     Event::table("public", "users"),
/// )]);
/// assert_eq!(actions.len(), 4);
/// assert_eq!(actions[2].key.to_string(), r#"["proj", "tables", "public", "users"]"#);
/// assert_eq!(actions[2].refetch_type, Some(RefetchType::Active));
/// ```
pub fn plan_invalidations_from_events(events: &[InvalidationEvent]) -> Vec<InvalidationAction> {
    let mut actions = Vec::new();
    for event in events {
        plan_event(event, &mut actions);
    }
    actions
}

fn plan_event(event: &InvalidationEvent, actions: &mut Vec<InvalidationAction>) {
    let project = event.project_ref.as_str();
    match event.entity_type() {
        EntityType::Table => {
            match event.event.schema.as_deref().filter(|s| !s.is_empty()) {
                Some(schema) => {
                    actions.push(
                        InvalidationAction::new(keys::table_list(project, schema, true))
                            .exact(true),
                    );
                    actions.push(
                        InvalidationAction::new(keys::table_list(project, schema, false))
                            .exact(true),
                    );
                    if let Some(table) = event.event.table.as_deref() {
                        actions.push(
                            InvalidationAction::new(keys::table(project, schema, table))
                                .refetch(RefetchType::Active),
                        );
                    }
                }
                None => {
                    actions.push(InvalidationAction::new(keys::tables(project)).exact(false));
                }
            }
            actions.push(InvalidationAction::new(keys::entity_types(project)).exact(false));
        }
        EntityType::Function => {
            actions.push(
                InvalidationAction::new(keys::database_functions(project))
                    .refetch(RefetchType::Active),
            );
        }
        EntityType::Cron => {
            actions.push(
                InvalidationAction::new(keys::cron_jobs(project))
                    .exact(false)
                    .refetch(RefetchType::Active),
            );
        }
    }
}
