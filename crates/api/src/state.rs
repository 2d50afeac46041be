use std::sync::Arc;

use formkit_core::store::{AccessControl, FormStore, Notifier};
use formkit_db::DbPool;
use formkit_events::EventBus;
use formkit_pipeline::{AutomationRunner, SessionRegistry, SubmissionPipeline};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FormStore>,
    pub access: Arc<dyn AccessControl>,
    /// Present when running on Postgres; reported by `/health`.
    pub pool: Option<DbPool>,
    pub config: Arc<ServerConfig>,
    pub event_bus: Arc<EventBus>,
    /// Live designer sessions, one per form.
    pub sessions: Arc<SessionRegistry>,
    pub pipeline: Arc<SubmissionPipeline>,
}

impl AppState {
    /// Wire the designer registry and submission pipeline around the given
    /// collaborators.
    pub fn new(
        store: Arc<dyn FormStore>,
        access: Arc<dyn AccessControl>,
        notifier: Arc<dyn Notifier>,
        pool: Option<DbPool>,
        config: ServerConfig,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let sessions = SessionRegistry::new(Arc::clone(&store), config.autosave);
        let runner = AutomationRunner::new(Arc::clone(&store), notifier, Arc::clone(&event_bus));
        let pipeline = SubmissionPipeline::new(Arc::clone(&store), runner, Arc::clone(&event_bus));
        Self {
            store,
            access,
            pool,
            config: Arc::new(config),
            event_bus,
            sessions: Arc::new(sessions),
            pipeline: Arc::new(pipeline),
        }
    }
}
