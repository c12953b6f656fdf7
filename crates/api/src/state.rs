use std::sync::Arc;

use crate::background::reconciliation::ReconciliationService;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: advlink_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Outbound partner notification dispatcher.
    pub notifier: Arc<dyn advlink_events::Notifier>,
    /// Registry reconciliation service (manual trigger, status, scheduler).
    pub reconciliation: Arc<ReconciliationService>,
}
