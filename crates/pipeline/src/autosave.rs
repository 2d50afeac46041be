//! Debounced auto-save for one designer session.
//!
//! Each mutation hands the controller the whole tree. A background task waits
//! until edits stop for `idle_delay` (or `max_wait` has passed since the first
//! unsaved edit) and then writes the latest tree once. Writes are full-tree
//! and last write wins; a failed write is reported on the status channel and
//! retried by the next edit, never automatically.
//!
//! Hydrating a session creates the controller without a pending tree, so no
//! write happens until the first real mutation. After [`teardown`] no write
//! is started.
//!
//! [`teardown`]: AutosaveController::teardown

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use formkit_core::designer::ElementTree;
use formkit_core::store::FormStore;
use formkit_core::types::DbId;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default quiet period before a pending tree is written.
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    pub idle_delay: Duration,
    /// Upper bound on how long continuous editing can postpone a write.
    pub max_wait: Option<Duration>,
}

impl AutosaveConfig {
    /// | Env Var                | Default |
    /// |------------------------|---------|
    /// | `AUTOSAVE_IDLE_MS`     | `1500`  |
    /// | `AUTOSAVE_MAX_WAIT_MS` | unset   |
    ///
    /// Unparseable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        let millis = |name: &str| -> Option<Duration> {
            let raw = std::env::var(name).ok()?;
            match raw.trim().parse::<u64>() {
                Ok(ms) => Some(Duration::from_millis(ms)),
                Err(e) => {
                    tracing::warn!(var = name, value = %raw, error = %e, "Ignoring invalid autosave setting");
                    None
                }
            }
        };
        Self {
            idle_delay: millis("AUTOSAVE_IDLE_MS").unwrap_or(DEFAULT_IDLE_DELAY),
            max_wait: millis("AUTOSAVE_MAX_WAIT_MS"),
        }
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            idle_delay: DEFAULT_IDLE_DELAY,
            max_wait: None,
        }
    }
}

/// What the user sees about persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum AutosaveStatus {
    /// Nothing edited since hydration.
    Idle,
    /// Edits waiting for the debounce window to close.
    Pending { revision: u64 },
    Saving { revision: u64 },
    Saved { revision: u64, at: DateTime<Utc> },
    Failed { revision: u64, error: String },
}

/// A tree waiting to be written.
#[derive(Debug, Clone)]
struct PendingSave {
    revision: u64,
    tree: ElementTree,
}

pub struct AutosaveController {
    form_id: DbId,
    pending: watch::Sender<Option<PendingSave>>,
    status: watch::Receiver<AutosaveStatus>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl AutosaveController {
    /// Spawn the debounce task for `form_id`. Must be called inside a Tokio
    /// runtime.
    pub fn spawn(form_id: DbId, store: Arc<dyn FormStore>, config: AutosaveConfig) -> Self {
        let (pending_tx, pending_rx) = watch::channel(None);
        let (status_tx, status_rx) = watch::channel(AutosaveStatus::Idle);
        let cancel = CancellationToken::new();

        let worker = DebounceWorker {
            form_id,
            store,
            config,
            pending: pending_rx,
            status: status_tx,
        };
        let task = tokio::spawn(worker.run(cancel.clone()));

        Self {
            form_id,
            pending: pending_tx,
            status: status_rx,
            cancel,
            task: Some(task),
        }
    }

    pub fn form_id(&self) -> DbId {
        self.form_id
    }

    /// Schedule `tree` for saving, superseding any tree not yet written.
    pub fn schedule(&self, revision: u64, tree: ElementTree) {
        if self.cancel.is_cancelled() {
            tracing::debug!(form_id = self.form_id, revision, "Autosave torn down, edit dropped");
            return;
        }
        self.pending.send_replace(Some(PendingSave { revision, tree }));
    }

    pub fn status(&self) -> AutosaveStatus {
        self.status.borrow().clone()
    }

    /// Receiver that observes every status change.
    pub fn watch_status(&self) -> watch::Receiver<AutosaveStatus> {
        self.status.clone()
    }

    /// Cancel the pending write and stop the task. Pending edits are
    /// discarded.
    pub async fn teardown(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(form_id = self.form_id, error = %e, "Autosave task panicked");
            }
        }
    }
}

impl Drop for AutosaveController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

struct DebounceWorker {
    form_id: DbId,
    store: Arc<dyn FormStore>,
    config: AutosaveConfig,
    pending: watch::Receiver<Option<PendingSave>>,
    status: watch::Sender<AutosaveStatus>,
}

impl DebounceWorker {
    async fn run(mut self, cancel: CancellationToken) {
        tracing::debug!(form_id = self.form_id, "Autosave started");

        loop {
            // Wait for the first unsaved edit.
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                changed = self.pending.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
            self.mark_pending();

            if !self.debounce(&cancel).await {
                break;
            }

            if cancel.is_cancelled() {
                break;
            }
            let Some(save) = self.pending.borrow_and_update().clone() else {
                continue;
            };
            self.write(save).await;
        }

        tracing::debug!(form_id = self.form_id, "Autosave stopped");
    }

    /// Wait until edits go quiet or `max_wait` expires. Returns `false` when
    /// the controller was torn down meanwhile.
    async fn debounce(&mut self, cancel: &CancellationToken) -> bool {
        let first_edit = Instant::now();
        let hard_deadline = self.config.max_wait.map(|max| first_edit + max);

        loop {
            let mut deadline = Instant::now() + self.config.idle_delay;
            if let Some(hard) = hard_deadline {
                deadline = deadline.min(hard);
            }

            let edited = tokio::select! {
                biased;
                _ = cancel.cancelled() => return false,
                changed = self.pending.changed() => changed.is_ok(),
                _ = tokio::time::sleep_until(deadline) => return true,
            };
            if !edited {
                return false;
            }
            self.mark_pending();
        }
    }

    fn mark_pending(&self) {
        let revision = self
            .pending
            .borrow()
            .as_ref()
            .map(|p| p.revision)
            .unwrap_or_default();
        self.status.send_replace(AutosaveStatus::Pending { revision });
    }

    async fn write(&self, save: PendingSave) {
        self.status.send_replace(AutosaveStatus::Saving {
            revision: save.revision,
        });
        match self.store.update_form_content(self.form_id, &save.tree).await {
            Ok(_) => {
                tracing::debug!(
                    form_id = self.form_id,
                    revision = save.revision,
                    elements = save.tree.len(),
                    "Autosave written"
                );
                self.status.send_replace(AutosaveStatus::Saved {
                    revision: save.revision,
                    at: Utc::now(),
                });
            }
            Err(e) => {
                tracing::warn!(
                    form_id = self.form_id,
                    revision = save.revision,
                    error = %e,
                    "Autosave failed"
                );
                self.status.send_replace(AutosaveStatus::Failed {
                    revision: save.revision,
                    error: e.to_string(),
                });
            }
        }
    }
}
