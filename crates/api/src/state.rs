use std::sync::Arc;

use claimdesk_core::annotator::AnnotatorRoster;
use claimdesk_core::cursor::DatasetCursor;
use claimdesk_core::item::Dataset;
use claimdesk_store::AnnotationStore;

use crate::config::ServerConfig;
use crate::session_registry::SessionRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Items loaded once at startup; immutable afterwards.
    pub dataset: Arc<Dataset>,
    pub roster: Arc<AnnotatorRoster>,
    /// Primary record store plus optional mirror.
    pub store: Arc<AnnotationStore>,
    /// In-flight label sessions.
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn cursor(&self) -> DatasetCursor<'_> {
        DatasetCursor::new(&self.dataset, &self.roster)
    }
}
