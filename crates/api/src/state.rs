use std::sync::Arc;

use agrisensa_core::knowledge::KnowledgeBase;
use agrisensa_core::models::ModelRegistry;

use crate::config::ServerConfig;
use crate::storage::DocumentStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything heavy sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: agrisensa_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Lazily loaded model artifacts.
    pub models: Arc<ModelRegistry>,
    /// Static agronomic reference documents.
    pub knowledge: Arc<KnowledgeBase>,
    /// Uploaded document storage.
    pub documents: Arc<DocumentStore>,
}
