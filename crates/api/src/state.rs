use std::sync::Arc;

use fibervision_mail::Mailer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: fibervision_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Outgoing account email (SMTP, or a logging stand-in).
    pub mailer: Arc<dyn Mailer>,
}
