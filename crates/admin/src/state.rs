//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::models::CurrentAdmin;

/// How long a resolved admin session is trusted before re-checking roles.
const ADMIN_SESSION_TTL: Duration = Duration::from_secs(60);

/// Upper bound on cached admin sessions.
const ADMIN_SESSION_CAPACITY: u64 = 1_000;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    admin_sessions: Cache<String, CurrentAdmin>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let admin_sessions = Cache::builder()
            .max_capacity(ADMIN_SESSION_CAPACITY)
            .time_to_live(ADMIN_SESSION_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                admin_sessions,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Admin sessions keyed by token hash. Only positive lookups are cached.
    #[must_use]
    pub fn admin_sessions(&self) -> &Cache<String, CurrentAdmin> {
        &self.inner.admin_sessions
    }

    /// Drop every cached session so role changes apply immediately.
    pub fn forget_admin_sessions(&self) {
        self.inner.admin_sessions.invalidate_all();
    }
}
