//! SQL-to-cache invalidation pipeline.
//!
//! [`GranularInvalidator`] runs extraction, planning and application for one
//! submitted script. The async entry points never fail: every problem degrades
//! to fewer invalidations and is described by the returned
//! [`InvalidationReport`].

use futures_util::future::join_all;
use serde::Serialize;

use crate::cache::QueryCache;
use crate::error::{InvalError, InvalResult};
use crate::planner::{InvalidationAction, plan_invalidations_from_events};
use pginval_sql::{
    DEFAULT_MAX_LOGGED_SQL, EventExtractor, ExtractOutcome, SqlError, SqlParser, truncate_sql,
};

/// How a pipeline run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum InvalidationStatus {
    /// Input rejected before parsing (empty SQL or project ref).
    Skipped(String),
    /// The parser rejected the script; nothing was invalidated.
    ParseFailed(String),
    /// Actions were planned and every one of them was attempted.
    Applied,
}

/// Outcome of one [`GranularInvalidator::invalidate`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationReport {
    #[serde(flatten)]
    pub status: InvalidationStatus,
    pub actions: Vec<InvalidationAction>,
    pub succeeded: usize,
    pub failed: usize,
}

impl InvalidationReport {
    fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: InvalidationStatus::Skipped(reason.into()),
            actions: Vec::new(),
            succeeded: 0,
            failed: 0,
        }
    }

    fn parse_failed(reason: String) -> Self {
        Self {
            status: InvalidationStatus::ParseFailed(reason),
            actions: Vec::new(),
            succeeded: 0,
            failed: 0,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self.status, InvalidationStatus::Applied)
    }

    /// Number of cache calls attempted.
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Wires an [`EventExtractor`] to a [`QueryCache`].
///
/// # Example
/// ```ignore
/// use pginval::{EventExtractor, GranularInvalidator, LoggingCache, PgQueryParser};
///
/// let invalidator = GranularInvalidator::new(EventExtractor::new(PgQueryParser), LoggingCache::new());
/// let report = invalidator.invalidate("DROP TABLE auth.sessions", "my-project").await;
/// assert_eq!(report.succeeded, 4);
/// ```
#[derive(Debug, Clone)]
pub struct GranularInvalidator<P, C> {
    extractor: EventExtractor<P>,
    cache: C,
    max_logged_sql: Option<usize>,
}

impl<P: SqlParser, C: QueryCache> GranularInvalidator<P, C> {
    pub fn new(extractor: EventExtractor<P>, cache: C) -> Self {
        Self {
            extractor,
            cache,
            max_logged_sql: Some(DEFAULT_MAX_LOGGED_SQL),
        }
    }

    /// Truncate SQL in log events to `len` bytes.
    pub fn max_logged_sql(mut self, len: usize) -> Self {
        self.max_logged_sql = Some(len);
        self
    }

    /// Log SQL untruncated.
    pub fn no_truncate(mut self) -> Self {
        self.max_logged_sql = None;
        self
    }

    pub fn extractor(&self) -> &EventExtractor<P> {
        &self.extractor
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Plan the actions for `sql` without touching the cache.
    ///
    /// Unlike [`invalidate`](Self::invalidate), this reports empty input and
    /// parse failures as errors.
    pub fn plan(&self, sql: &str, project_ref: &str) -> InvalResult<Vec<InvalidationAction>> {
        if let Some(reason) = empty_input(sql, project_ref) {
            return Err(InvalError::invalid_input(reason));
        }
        match self.extractor.extract(sql, project_ref) {
            ExtractOutcome::Events(events) => Ok(plan_invalidations_from_events(&events)),
            ExtractOutcome::ParseFailed(reason) => Err(SqlError::parse(reason).into()),
        }
    }

    /// Extract, plan and apply invalidations for `sql`.
    pub async fn invalidate(&self, sql: &str, project_ref: &str) -> InvalidationReport {
        if let Some(reason) = empty_input(sql, project_ref) {
            tracing::warn!(target: "pginval.invalidate", reason, "skipping cache invalidation");
            return InvalidationReport::skipped(reason);
        }

        let events = match self.extractor.extract(sql, project_ref) {
            ExtractOutcome::Events(events) => events,
            ExtractOutcome::ParseFailed(reason) => {
                // The extractor already warned with the parser error.
                tracing::debug!(
                    target: "pginval.invalidate",
                    error = %reason,
                    sql = %truncate_sql(sql, self.max_logged_sql),
                    "cache invalidation skipped: SQL could not be parsed",
                );
                return InvalidationReport::parse_failed(reason);
            }
        };

        let actions = plan_invalidations_from_events(&events);
        let (succeeded, failed) = apply_invalidations(&self.cache, &actions).await;

        tracing::debug!(
            target: "pginval.invalidate",
            project_ref,
            events = events.len(),
            actions = actions.len(),
            succeeded,
            failed,
            "cache invalidation finished",
        );

        InvalidationReport {
            status: InvalidationStatus::Applied,
            actions,
            succeeded,
            failed,
        }
    }
}

fn empty_input(sql: &str, project_ref: &str) -> Option<&'static str> {
    if sql.is_empty() {
        Some("empty SQL")
    } else if project_ref.is_empty() {
        Some("empty project ref")
    } else {
        None
    }
}

/// Issue every action concurrently and wait for all of them to settle.
///
/// Failures are logged and counted; they never cancel sibling calls. Returns
/// `(succeeded, failed)`.
pub async fn apply_invalidations<C: QueryCache + ?Sized>(
    cache: &C,
    actions: &[InvalidationAction],
) -> (usize, usize) {
    let results = join_all(
        actions
            .iter()
            .map(|action| cache.invalidate(&action.key, action.options())),
    )
    .await;

    let mut failed = 0;
    for (action, result) in actions.iter().zip(results) {
        if let Err(e) = result {
            failed += 1;
            tracing::warn!(
                target: "pginval.invalidate",
                key = %action.key,
                error = %e,
                "cache invalidation failed",
            );
        }
    }
    (actions.len() - failed, failed)
}

/// Run the full pipeline with libpg_query and the default options.
///
/// Fire-and-forget: the report is returned for callers that want it, but no
/// input can make this fail.
#[cfg(feature = "sql")]
pub async fn invalidate_data_granularly<C: QueryCache>(
    cache: C,
    sql: &str,
    project_ref: &str,
) -> InvalidationReport {
    GranularInvalidator::new(EventExtractor::new(pginval_sql::PgQueryParser), cache)
        .invalidate(sql, project_ref)
        .await
}
