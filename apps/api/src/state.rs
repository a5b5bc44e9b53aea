//! Shared application state.

use crate::auth::JwtManager;
use crate::config::ApiConfig;
use crate::notifier::Notifier;
use bazaar_db::Database;

/// State shared by every route handler, behind an `Arc`.
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub notifier: Notifier,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(db: Database, notifier: Notifier, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(
            config.jwt_secret.clone(),
            config.jwt_access_lifetime_secs,
            config.jwt_refresh_lifetime_secs,
        );

        AppState {
            db,
            jwt,
            notifier,
            config,
        }
    }
}
