//! AST-based entity event extraction.
//!
//! Walks the top-level statements of a script and reports tables and functions
//! that were created or dropped, plus `cron.schedule` / `cron.unschedule`
//! calls. Parsing never fails the caller: a parse error becomes
//! [`ExtractOutcome::ParseFailed`] and a statement with an unexpected shape is
//! skipped.

use crate::ast::{DropObjectKind, RelationName, SqlParser, StatementNode};
use crate::error::{SqlError, SqlResult};
use crate::event::{DEFAULT_SCHEMA, Event, InvalidationEvent};
use crate::trace::{DEFAULT_MAX_LOGGED_SQL, truncate_sql};

/// Substrings that make a script worth handing to the parser.
pub const PARSE_TRIGGERS: [&str; 4] = ["create ", "drop ", "cron.schedule", "cron.unschedule"];

const CRON_SCHEMA: &str = "cron";
const CRON_CALLS: [&str; 2] = ["schedule", "unschedule"];

/// Cheap pre-check: `true` if the lower-cased SQL contains any of [`PARSE_TRIGGERS`].
pub fn needs_parse(sql: &str) -> bool {
    let lower = sql.to_lowercase();
    PARSE_TRIGGERS.iter().any(|t| lower.contains(t))
}

/// Result of running the extractor over a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// Parsing succeeded (or was skipped); may be empty.
    Events(Vec<InvalidationEvent>),
    /// The parser rejected the script; holds the parser's message.
    ParseFailed(String),
}

impl ExtractOutcome {
    /// Events found, or an empty slice on parse failure.
    pub fn events(&self) -> &[InvalidationEvent] {
        match self {
            ExtractOutcome::Events(events) => events,
            ExtractOutcome::ParseFailed(_) => &[],
        }
    }

    pub fn into_events(self) -> Vec<InvalidationEvent> {
        match self {
            ExtractOutcome::Events(events) => events,
            ExtractOutcome::ParseFailed(_) => Vec::new(),
        }
    }

    pub fn is_parse_failure(&self) -> bool {
        matches!(self, ExtractOutcome::ParseFailed(_))
    }
}

/// Turns parsed statements into [`InvalidationEvent`]s.
#[derive(Debug, Clone)]
pub struct EventExtractor<P> {
    parser: P,
    default_schema: String,
    prefilter: bool,
    max_logged_sql: Option<usize>,
}

impl<P: SqlParser> EventExtractor<P> {
    /// Create an extractor with the default schema `public` and the pre-filter on.
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            default_schema: DEFAULT_SCHEMA.to_string(),
            prefilter: true,
            max_logged_sql: Some(DEFAULT_MAX_LOGGED_SQL),
        }
    }

    /// Schema applied when the SQL does not name one.
    pub fn default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    /// Skip the parser for scripts that cannot produce events (see [`needs_parse`]).
    pub fn prefilter(mut self, enabled: bool) -> Self {
        self.prefilter = enabled;
        self
    }

    /// Truncate SQL in log events to `len` bytes.
    pub fn max_logged_sql(mut self, len: usize) -> Self {
        self.max_logged_sql = Some(len);
        self
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Parse `sql` and collect events scoped to `project_ref`.
    pub fn extract(&self, sql: &str, project_ref: &str) -> ExtractOutcome {
        if project_ref.is_empty() {
            tracing::warn!(target: "pginval.sql", "empty project ref; no events extracted");
            return ExtractOutcome::Events(Vec::new());
        }
        if self.prefilter && !needs_parse(sql) {
            return ExtractOutcome::Events(Vec::new());
        }

        let statements = match self.parser.parse(sql) {
            Ok(statements) => statements,
            Err(e) => {
                tracing::warn!(
                    target: "pginval.sql",
                    error = %e,
                    sql = %truncate_sql(sql, self.max_logged_sql),
                    "failed to parse SQL for event extraction",
                );
                let message = match e {
                    SqlError::Parse(message) => message,
                    other => other.to_string(),
                };
                return ExtractOutcome::ParseFailed(message);
            }
        };

        let mut events = Vec::new();
        for stmt in &statements {
            match self.statement_events(stmt) {
                Ok(found) => events.extend(
                    found
                        .into_iter()
                        .map(|event| InvalidationEvent::new(project_ref, event)),
                ),
                Err(e) => tracing::debug!(
                    target: "pginval.sql",
                    kind = stmt.kind_name(),
                    error = %e,
                    "skipping statement",
                ),
            }
        }
        ExtractOutcome::Events(events)
    }

    /// Events for a single statement.
    pub fn statement_events(&self, stmt: &StatementNode) -> SqlResult<Vec<Event>> {
        match stmt {
            StatementNode::CreateTable { relation } | StatementNode::CreateTableAs { relation } => {
                let relation = relation
                    .as_ref()
                    .ok_or_else(|| SqlError::unsupported("create table", "missing relation"))?;
                Ok(vec![self.table_event(relation)?])
            }
            StatementNode::CreateFunction { name } => Ok(vec![self.function_event(name)?]),
            StatementNode::Drop {
                object_kind,
                objects,
            } => match object_kind {
                DropObjectKind::Table => objects
                    .iter()
                    .map(|parts| -> SqlResult<Event> {
                        let (schema, table) = self.split_qualified("drop table", parts)?;
                        Ok(Event::table(schema, table))
                    })
                    .collect(),
                DropObjectKind::Function | DropObjectKind::Procedure => objects
                    .iter()
                    .map(|parts| self.function_event(parts))
                    .collect(),
                DropObjectKind::Other => {
                    tracing::debug!(target: "pginval.sql", "ignoring DROP of unsupported object kind");
                    Ok(Vec::new())
                }
            },
            StatementNode::Select { into, calls } => {
                // Only reached when the pre-filter admitted the script; a lone
                // `SELECT ... INTO` has no trigger and is never parsed.
                if let Some(relation) = into {
                    return Ok(vec![self.table_event(relation)?]);
                }
                Ok(cron_call(calls).map(Event::cron).into_iter().collect())
            }
            StatementNode::Other { kind } => {
                tracing::debug!(target: "pginval.sql", kind = %kind, "no event for statement kind");
                Ok(Vec::new())
            }
        }
    }

    fn table_event(&self, relation: &RelationName) -> SqlResult<Event> {
        if relation.name.is_empty() {
            return Err(SqlError::unsupported("relation", "empty relation name"));
        }
        let schema = relation.schema.as_deref().unwrap_or(self.default_schema.as_str());
        Ok(Event::table(schema, relation.name.as_str()))
    }

    fn function_event(&self, parts: &[String]) -> SqlResult<Event> {
        let (schema, name) = self.split_qualified("function", parts)?;
        Ok(Event::function(schema, name))
    }

    /// `[name]` -> (default, name); `[schema, .., name]` -> (schema, name).
    fn split_qualified<'a>(
        &'a self,
        kind: &'static str,
        parts: &'a [String],
    ) -> SqlResult<(&'a str, &'a str)> {
        match parts {
            [] => Err(SqlError::unsupported(kind, "empty qualified name")),
            [name] => Ok((self.default_schema.as_str(), name.as_str())),
            [schema, .., name] => Ok((schema.as_str(), name.as_str())),
        }
    }
}

/// First `cron.schedule` / `cron.unschedule` call, returning the function name.
fn cron_call(calls: &[Vec<String>]) -> Option<&str> {
    calls.iter().find_map(|parts| match parts.as_slice() {
        [schema, name] if schema == CRON_SCHEMA && CRON_CALLS.contains(&name.as_str()) => {
            Some(name.as_str())
        }
        _ => None,
    })
}

/// Extract events with libpg_query, logging and swallowing parse failures.
///
/// # Example
/// ```
/// use pginval_sql::{parse_sql_statements, EntityType};
///
/// let events = parse_sql_statements("CREATE TABLE users (id INT)", "proj");
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].entity_type(), EntityType::Table);
/// assert_eq!(events[0].event.schema.as_deref(), Some("public"));
/// ```
#[cfg(feature = "sql")]
pub fn parse_sql_statements(sql: &str, project_ref: &str) -> Vec<InvalidationEvent> {
    EventExtractor::new(crate::ast::PgQueryParser)
        .extract(sql, project_ref)
        .into_events()
}
