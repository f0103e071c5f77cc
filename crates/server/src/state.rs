//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::DbPool;
use crate::gemini::GeminiClient;

/// Application state shared across all handlers.
///
/// Cloning is cheap; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: DbPool,
    gemini: GeminiClient,
}

impl AppState {
    /// Build application state from configuration and a connection pool.
    #[must_use]
    pub fn new(config: ServerConfig, pool: DbPool) -> Self {
        let gemini = GeminiClient::new(config.gemini());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                gemini,
            }),
        }
    }

    /// Server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Database connection pool.
    #[must_use]
    pub fn pool(&self) -> &DbPool {
        &self.inner.pool
    }

    /// Gemini API client.
    #[must_use]
    pub fn gemini(&self) -> &GeminiClient {
        &self.inner.gemini
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone_send_sync() {
        fn assert_clone<T: Clone + Send + Sync>() {}
        assert_clone::<AppState>();
    }
}
