use std::sync::Arc;

use notes_shared::{Document, DocumentId};

use crate::conflict::ConflictResolver;
use crate::draft::{LocalDraft, LocalDraftStore};
use crate::error::Result;
use crate::pipeline::EditEvent;
use crate::resource::AsyncResource;
use crate::state::{ApplicationState, StateStore};
use crate::transport::Transport;
use crate::tree;

/// Shared by the controller and the scheduled edit effects.
///
/// Reads go through [`StateStore::get_state`]; every write is a full state
/// computed inside [`StateStore::update`].
pub(crate) struct Synchronizer {
    pub(crate) store: Arc<StateStore>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) drafts: LocalDraftStore,
    resolver: ConflictResolver,
}

impl Synchronizer {
    pub(crate) fn new(
        store: Arc<StateStore>,
        transport: Arc<dyn Transport>,
        drafts: LocalDraftStore,
        resolver: ConflictResolver,
    ) -> Self {
        Self {
            store,
            transport,
            drafts,
            resolver,
        }
    }

    fn is_selected(&self, id: DocumentId) -> bool {
        self.store.get_state().selected_document_id == Some(id)
    }

    pub(crate) async fn fetch_documents(&self) {
        self.store.update(|state| ApplicationState {
            documents: state.documents.clone().revalidating(),
            ..state.clone()
        });

        let result = self.transport.fetch_document_tree().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "failed to load document list");
        }
        let documents = AsyncResource::from(result);

        self.store.update(|state| ApplicationState {
            documents,
            ..state.clone()
        });
    }

    /// Refetch `id` if it is still the selected document.
    pub(crate) async fn fetch_document(&self, id: DocumentId) {
        self.refetch(id, Drafts::Reconcile).await
    }

    async fn refetch(&self, id: DocumentId, drafts: Drafts) {
        let started = self.store.update(|state| {
            if state.selected_document_id != Some(id) {
                return state.clone();
            }
            ApplicationState {
                document: begin_document_load(state, id),
                ..state.clone()
            }
        });
        if !started && !self.is_selected(id) {
            tracing::debug!(document_id = id, "skipping refetch of unselected document");
            return;
        }
        self.load(id, drafts).await;
    }

    /// Fetch `id`, reconcile it with any local draft and publish the winner.
    ///
    /// The caller has already put the document resource into a loading state.
    pub(crate) async fn load_document(&self, id: DocumentId) {
        self.load(id, Drafts::Reconcile).await
    }

    async fn load(&self, id: DocumentId, drafts: Drafts) {
        let result = self.transport.fetch_document(id).await;
        if !self.is_selected(id) {
            tracing::debug!(document_id = id, "dropping response for deselected document");
            return;
        }

        let document = match result {
            Ok(server) => {
                let draft = match drafts {
                    Drafts::Reconcile => self.load_draft(id),
                    Drafts::Keep => None,
                };
                let resolution = self.resolver.resolve(server, draft).await;
                if resolution.discard_draft {
                    if let Err(e) = self.drafts.clear(id) {
                        tracing::warn!(document_id = id, error = %e, "failed to discard stale draft");
                    }
                }
                AsyncResource::ready(resolution.winner)
            }
            Err(e) => {
                tracing::warn!(document_id = id, error = %e, "failed to load document");
                AsyncResource::failed(e)
            }
        };

        // The confirmation prompt may have suspended us long enough for the
        // selection to move on.
        self.store.update(|state| {
            if state.selected_document_id != Some(id) {
                return state.clone();
            }
            ApplicationState {
                document,
                ..state.clone()
            }
        });
    }

    fn load_draft(&self, id: DocumentId) -> Option<LocalDraft> {
        self.drafts.load(id).unwrap_or_else(|e| {
            tracing::warn!(document_id = id, error = %e, "ignoring unreadable draft");
            None
        })
    }

    /// Optimistic effect: show the new title in the listing right away.
    pub(crate) fn apply_title(&self, edit: &EditEvent) -> bool {
        self.store.update(|state| ApplicationState {
            documents: state
                .documents
                .clone()
                .map_data(|documents| tree::set_title(documents, edit.id, &edit.title)),
            ..state.clone()
        })
    }

    /// Local-save effect: persist the edit if it differs from the open document.
    pub(crate) fn save_draft(&self, edit: &EditEvent) -> anyhow::Result<bool> {
        let state = self.store.get_state();
        let Some(open) = state.document.data.as_ref().filter(|d| d.id == edit.id) else {
            return Ok(false);
        };
        if open.title == edit.title && open.content == edit.content {
            return Ok(false);
        }
        self.drafts.save(edit.id, &edit.snapshot())?;
        Ok(true)
    }

    /// Server-sync effect: write the edit, drop its draft, refresh.
    ///
    /// A draft saved by a later edit while the write was in flight is left in
    /// place for that edit's own write-back.
    pub(crate) async fn write_back(&self, edit: &EditEvent) -> Result<Document> {
        let saved = self
            .transport
            .update_document(edit.id, &edit.to_request())
            .await?;
        tracing::info!(document_id = edit.id, "document saved");

        let cleared = self.clear_written_draft(edit);
        self.refetch(edit.id, Drafts::Keep).await;
        self.fetch_documents().await;
        cleared?;

        Ok(saved)
    }

    fn clear_written_draft(&self, edit: &EditEvent) -> anyhow::Result<()> {
        match self.drafts.load(edit.id)? {
            Some(draft) if draft.title != edit.title || draft.content != edit.content => {
                tracing::debug!(document_id = edit.id, "keeping draft of a newer edit");
                Ok(())
            }
            Some(_) => self.drafts.clear(edit.id),
            None => Ok(()),
        }
    }
}

/// Whether a document load settles the stored draft against the server copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drafts {
    Reconcile,
    /// Leave the draft alone; it belongs to an edit that has not synced yet.
    Keep,
}

/// Keep stale data while refreshing the open document; clear it when switching.
pub(crate) fn begin_document_load(
    state: &ApplicationState,
    id: DocumentId,
) -> AsyncResource<Document> {
    if state.document.data.as_ref().map(|d| d.id) == Some(id) {
        state.document.clone().revalidating()
    } else {
        AsyncResource::loading()
    }
}
