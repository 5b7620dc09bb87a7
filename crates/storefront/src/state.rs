//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::RepositoryError;
use crate::db::settings::{SettingsRepository, StoreRules};

/// How long store rules are served from memory before re-reading settings.
const RULES_TTL: Duration = Duration::from_secs(60);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    rules: Cache<(), StoreRules>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let rules = Cache::builder()
            .max_capacity(1)
            .time_to_live(RULES_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                rules,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Current store rules, cached for a minute.
    ///
    /// # Errors
    ///
    /// Returns the repository error if settings cannot be read.
    pub async fn store_rules(&self) -> Result<StoreRules, Arc<RepositoryError>> {
        self.inner
            .rules
            .try_get_with((), async {
                SettingsRepository::new(self.pool()).store_rules().await
            })
            .await
    }
}
