//! Cache client seam.
//!
//! The invalidator only needs one capability from the client-side query cache:
//! invalidate every entry matching a key. Anything implementing [`QueryCache`]
//! can be driven by [`GranularInvalidator`](crate::GranularInvalidator).

use std::sync::Arc;

use tracing::Level;

use crate::error::InvalResult;
use crate::keys::QueryKey;
use crate::planner::InvalidateOptions;

/// A query cache that supports key-based invalidation.
#[async_trait::async_trait]
pub trait QueryCache: Sync {
    /// Invalidate entries matching `key`; with `exact` unset or `false`, every
    /// key nested under `key` matches too.
    async fn invalidate(&self, key: &QueryKey, options: InvalidateOptions) -> InvalResult<()>;
}

#[async_trait::async_trait]
impl<C: QueryCache + ?Sized> QueryCache for &C {
    async fn invalidate(&self, key: &QueryKey, options: InvalidateOptions) -> InvalResult<()> {
        (**self).invalidate(key, options).await
    }
}

#[async_trait::async_trait]
impl<C: QueryCache + Send + ?Sized> QueryCache for Arc<C> {
    async fn invalidate(&self, key: &QueryKey, options: InvalidateOptions) -> InvalResult<()> {
        (**self).invalidate(key, options).await
    }
}

/// Cache that only emits a tracing event per invalidation.
///
/// Used for dry runs and by the CLI `apply` command.
#[derive(Debug, Clone)]
pub struct LoggingCache {
    level: Level,
}

impl Default for LoggingCache {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }
}

#[async_trait::async_trait]
impl QueryCache for LoggingCache {
    async fn invalidate(&self, key: &QueryKey, options: InvalidateOptions) -> InvalResult<()> {
        let exact = options.exact.unwrap_or(false);
        let refetch = options.refetch_type.map(|r| format!("{r:?}").to_lowercase());
        let refetch = refetch.as_deref().unwrap_or("-");

        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        emit_at_level!(
            self.level,
            target: "pginval.cache",
            key = %key,
            exact,
            refetch,
            "invalidate"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;

    #[tokio::test]
    async fn test_logging_cache_never_fails() {
        let cache = LoggingCache::new().level(Level::DEBUG);
        let result = cache
            .invalidate(&keys::tables("p"), InvalidateOptions::default())
            .await;
        assert!(result.is_ok());

        let shared = Arc::new(LoggingCache::new());
        assert!(
            (&shared)
                .invalidate(&keys::cron_jobs("p"), InvalidateOptions::default())
                .await
                .is_ok()
        );
    }
}
