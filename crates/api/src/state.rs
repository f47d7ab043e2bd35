use std::sync::Arc;

use meridian_messaging::Messenger;

use crate::config::ServerConfig;
use crate::engine::executor::ActionRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: meridian_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Outbound messaging collaborator.
    pub messenger: Arc<dyn Messenger>,
    /// Action handler registry for the automation engine.
    pub registry: Arc<ActionRegistry>,
}
