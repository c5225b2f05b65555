//! # pginval
//!
//! Granular query-cache invalidation for SQL typed into an interactive editor.
//!
//! ## Features
//!
//! - **Event extraction**: Tables and functions created or dropped and `cron.schedule`
//!   calls, via [`EventExtractor`] (re-exported from `pginval-sql`)
//! - **Planning**: [`plan_invalidations_from_events`] maps events to scoped cache keys
//!   (exact vs prefix, refetch active vs stale)
//! - **Application**: [`GranularInvalidator`] applies the plan to any [`QueryCache`]
//!   with all-settle semantics; individual failures are logged, never raised
//! - **Telemetry**: [`get_table_events`] classifies statements without a parser
//!
//! ## Example
//!
//! ```ignore
//! use pginval::{invalidate_data_granularly, LoggingCache};
//!
//! // After the editor ran the user's SQL:
//! let report = invalidate_data_granularly(LoggingCache::new(), sql, &project_ref).await;
//! tracing::debug!(succeeded = report.succeeded, failed = report.failed, "invalidated");
//! ```
//!
//! Plug in a real cache by implementing [`QueryCache`]:
//!
//! ```ignore
//! use pginval::{InvalidateOptions, InvalResult, QueryCache, QueryKey};
//!
//! struct MyCache;
//!
//! #[async_trait::async_trait]
//! impl QueryCache for MyCache {
//!     async fn invalidate(&self, key: &QueryKey, options: InvalidateOptions) -> InvalResult<()> {
//!         // forward to the client-side cache
//!         Ok(())
//!     }
//! }
//! ```

pub mod cache;
pub mod error;
pub mod invalidate;
pub mod keys;
pub mod planner;

pub use cache::{LoggingCache, QueryCache};
pub use error::{InvalError, InvalResult};
pub use invalidate::{
    GranularInvalidator, InvalidationReport, InvalidationStatus, apply_invalidations,
};
pub use keys::{KeySegment, QueryKey};
pub use planner::{
    InvalidateOptions, InvalidationAction, RefetchType, plan_invalidations_from_events,
};

#[cfg(feature = "sql")]
pub use invalidate::invalidate_data_granularly;

// Re-export the classifier crate for one-stop imports
pub use pginval_sql::{
    DEFAULT_SCHEMA, EntityType, Event, EventExtractor, ExtractOutcome, InvalidationEvent,
    SqlError, SqlParser, StatementNode, TableEventAction, TableEventDetails, get_table_events,
    remove_comments, split_statements,
};

#[cfg(feature = "sql")]
pub use pginval_sql::{PgQueryParser, parse_sql_statements};

pub use pginval_sql as sql;
