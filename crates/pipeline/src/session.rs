//! Live designer sessions.
//!
//! An [`EditingSession`] pairs a [`DesignerSession`] with its
//! [`AutosaveController`]. The [`SessionRegistry`] keeps at most one per
//! form; opening a form again tears the previous session down first.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use formkit_core::designer::{DesignerEvent, DesignerSession, DesignerSnapshot, EventOutcome};
use formkit_core::error::CoreError;
use formkit_core::form::FormDefinition;
use formkit_core::store::FormStore;
use formkit_core::types::DbId;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::autosave::{AutosaveConfig, AutosaveController, AutosaveStatus};

// ---------------------------------------------------------------------------
// EditingSession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub form_id: DbId,
    pub opened_by: DbId,
    pub opened_at: DateTime<Utc>,
    #[serde(flatten)]
    pub designer: DesignerSnapshot,
    pub autosave: AutosaveStatus,
}

pub struct EditingSession {
    form_id: DbId,
    opened_by: DbId,
    opened_at: DateTime<Utc>,
    designer: DesignerSession,
    autosave: AutosaveController,
}

impl EditingSession {
    /// Hydrate from the stored form. Nothing is scheduled for saving.
    pub fn open(
        form: &FormDefinition,
        user_id: DbId,
        store: Arc<dyn FormStore>,
        config: AutosaveConfig,
    ) -> Self {
        Self {
            form_id: form.id,
            opened_by: user_id,
            opened_at: Utc::now(),
            designer: DesignerSession::hydrate(form.content.clone()),
            autosave: AutosaveController::spawn(form.id, store, config),
        }
    }

    pub fn form_id(&self) -> DbId {
        self.form_id
    }

    pub fn designer(&self) -> &DesignerSession {
        &self.designer
    }

    /// Apply one designer event; a tree mutation schedules an auto-save of
    /// the whole tree.
    pub fn apply(&mut self, event: DesignerEvent) -> Result<EventOutcome, CoreError> {
        let name = event.name();
        let outcome = self.designer.apply(event)?;
        if outcome.mutated {
            self.autosave
                .schedule(outcome.revision, self.designer.tree().clone());
        }
        tracing::debug!(
            form_id = self.form_id,
            event = name,
            mutated = outcome.mutated,
            revision = outcome.revision,
            "Designer event applied"
        );
        Ok(outcome)
    }

    pub fn autosave_status(&self) -> AutosaveStatus {
        self.autosave.status()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            form_id: self.form_id,
            opened_by: self.opened_by,
            opened_at: self.opened_at,
            designer: self.designer.snapshot(),
            autosave: self.autosave.status(),
        }
    }

    pub async fn teardown(&mut self) {
        self.autosave.teardown().await;
        tracing::debug!(form_id = self.form_id, "Designer session closed");
    }
}

// ---------------------------------------------------------------------------
// SessionRegistry
// ---------------------------------------------------------------------------

pub type SharedSession = Arc<Mutex<EditingSession>>;

/// Live designer sessions keyed by form id.
pub struct SessionRegistry {
    store: Arc<dyn FormStore>,
    config: AutosaveConfig,
    sessions: Mutex<HashMap<DbId, SharedSession>>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn FormStore>, config: AutosaveConfig) -> Self {
        Self {
            store,
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Open a session for `form`, replacing (and tearing down) any session
    /// already open for it.
    pub async fn open(&self, form: &FormDefinition, user_id: DbId) -> SharedSession {
        let session = Arc::new(Mutex::new(EditingSession::open(
            form,
            user_id,
            Arc::clone(&self.store),
            self.config,
        )));
        let previous = self
            .sessions
            .lock()
            .await
            .insert(form.id, Arc::clone(&session));
        if let Some(previous) = previous {
            tracing::info!(form_id = form.id, user_id, "Replacing open designer session");
            previous.lock().await.teardown().await;
        }
        session
    }

    pub async fn get(&self, form_id: DbId) -> Option<SharedSession> {
        self.sessions.lock().await.get(&form_id).cloned()
    }

    /// Tear down the session for `form_id`. Returns `false` if none was open.
    pub async fn close(&self, form_id: DbId) -> bool {
        let removed = self.sessions.lock().await.remove(&form_id);
        match removed {
            Some(session) => {
                session.lock().await.teardown().await;
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Tear down every session; used at shutdown.
    pub async fn close_all(&self) {
        let drained: Vec<SharedSession> = self.sessions.lock().await.drain().map(|(_, s)| s).collect();
        for session in drained {
            session.lock().await.teardown().await;
        }
    }
}
