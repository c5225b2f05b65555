//! pginval-sql
//!
//! Detects which database entities a SQL script creates, mutates or alters.
//!
//! # Features
//!
//! - **Statement splitting**: Linear-time splitting that treats quoted identifiers,
//!   string literals and dollar-quoted bodies as opaque
//! - **Table events**: Regex-based telemetry classifier (`TableCreated`, `TableDataAdded`,
//!   `TableRlsEnabled`) with no parser dependency
//! - **Entity events**: AST-based detection of table/function creation and removal and
//!   `cron.schedule` calls, behind the [`SqlParser`] trait
//! - **libpg_query**: The `sql` feature provides [`PgQueryParser`] and [`parse_sql_statements`]
//!
//! # Example
//!
//! ```ignore
//! use pginval_sql::{get_table_events, parse_sql_statements, split_statements};
//!
//! assert_eq!(split_statements("SELECT 1; SELECT 2").len(), 2);
//!
//! let telemetry = get_table_events("INSERT INTO public.users (id) VALUES (1)");
//! assert_eq!(telemetry[0].table_name.as_deref(), Some("users"));
//!
//! let events = parse_sql_statements("DROP TABLE auth.sessions", "my-project");
//! assert_eq!(events[0].event.schema.as_deref(), Some("auth"));
//! ```

pub mod ast;
pub mod entity_events;
pub mod error;
pub mod event;
pub mod split;
pub mod table_events;
pub mod trace;

pub use ast::{DropObjectKind, RelationName, SqlParser, StatementNode};
pub use entity_events::{EventExtractor, ExtractOutcome, PARSE_TRIGGERS, needs_parse};
pub use error::{SqlError, SqlResult};
pub use event::{DEFAULT_SCHEMA, EntityType, Event, InvalidationEvent};
pub use split::{remove_comments, split_statements};
pub use table_events::{TableEventAction, TableEventDetails, get_table_events};
pub use trace::{DEFAULT_MAX_LOGGED_SQL, truncate_sql};

#[cfg(feature = "sql")]
pub use ast::PgQueryParser;

#[cfg(feature = "sql")]
pub use entity_events::parse_sql_statements;
