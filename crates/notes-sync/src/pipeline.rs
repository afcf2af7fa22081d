use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use notes_shared::{api::UpdateDocumentRequest, Document, DocumentId};

use crate::config::SyncConfig;
use crate::draft::DraftSnapshot;
use crate::scheduler::{Scheduler, TaskHandle};
use crate::sync::Synchronizer;

/// What [`EditPipeline::take`] found.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Flush {
    /// No edit since the last flush or navigation.
    Idle,
    /// The latest edit's server sync already fired.
    Sent,
    Unsynced(EditEvent),
}

/// One keystroke's worth of editor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditEvent {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
}

impl EditEvent {
    pub fn new(id: DocumentId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }

    pub fn to_request(&self) -> UpdateDocumentRequest {
        UpdateDocumentRequest {
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }
}

impl From<&Document> for EditEvent {
    fn from(document: &Document) -> Self {
        Self::new(document.id, document.title.clone(), document.content.clone())
    }
}

struct PendingEdit {
    edit: EditEvent,
    optimistic: TaskHandle,
    local_save: TaskHandle,
    server_sync: TaskHandle,
}

impl PendingEdit {
    /// Number of effects that were still waiting.
    fn cancel(&self) -> usize {
        [&self.optimistic, &self.local_save, &self.server_sync]
            .into_iter()
            .filter(|task| task.cancel())
            .count()
    }
}

/// Coalesces edit events into three debounced effects.
///
/// Each [`submit`](Self::submit) cancels whatever the previous edit still had
/// scheduled, so a burst of typing yields one optimistic update, one draft
/// save and one server write once the user pauses.
pub struct EditPipeline {
    sync: Arc<Synchronizer>,
    scheduler: Arc<dyn Scheduler>,
    config: SyncConfig,
    pending: Mutex<Option<PendingEdit>>,
}

impl EditPipeline {
    pub(crate) fn new(
        sync: Arc<Synchronizer>,
        scheduler: Arc<dyn Scheduler>,
        config: SyncConfig,
    ) -> Self {
        Self {
            sync,
            scheduler,
            config,
            pending: Mutex::new(None),
        }
    }

    pub fn submit(&self, edit: EditEvent) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            let superseded = previous.cancel();
            tracing::trace!(document_id = edit.id, superseded, "rescheduling edit effects");
        }

        let optimistic = {
            let (sync, edit) = (self.sync.clone(), edit.clone());
            self.scheduler.schedule(
                self.config.optimistic_delay,
                async move {
                    sync.apply_title(&edit);
                }
                .boxed(),
            )
        };

        let local_save = {
            let (sync, edit) = (self.sync.clone(), edit.clone());
            self.scheduler.schedule(
                self.config.local_save_delay,
                async move {
                    match sync.save_draft(&edit) {
                        Ok(true) => tracing::debug!(document_id = edit.id, "draft saved"),
                        Ok(false) => {}
                        Err(e) => {
                            tracing::warn!(document_id = edit.id, error = %e, "failed to save draft")
                        }
                    }
                }
                .boxed(),
            )
        };

        let server_sync = {
            let (sync, edit) = (self.sync.clone(), edit.clone());
            self.scheduler.schedule(
                self.config.server_sync_delay,
                async move {
                    if let Err(e) = sync.write_back(&edit).await {
                        tracing::error!(document_id = edit.id, error = %e, "failed to save document");
                    }
                }
                .boxed(),
            )
        };

        *pending = Some(PendingEdit {
            edit,
            optimistic,
            local_save,
            server_sync,
        });
    }

    /// Drop every effect that has not fired yet. Returns whether any was waiting.
    pub fn cancel(&self) -> bool {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match pending {
            Some(pending) => {
                let cancelled = pending.cancel();
                if cancelled > 0 {
                    tracing::debug!(document_id = pending.edit.id, cancelled, "discarded pending edit");
                }
                cancelled > 0
            }
            None => false,
        }
    }

    /// Cancel scheduled effects and hand back the latest edit if it has not
    /// been sent to the server yet.
    pub(crate) fn take(&self) -> Flush {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(pending) = pending else {
            return Flush::Idle;
        };
        pending.cancel();
        if pending.server_sync.has_fired() {
            Flush::Sent
        } else {
            Flush::Unsynced(pending.edit)
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|p| p.server_sync.is_pending())
    }
}
