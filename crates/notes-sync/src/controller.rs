use std::sync::Arc;

use notes_shared::{Document, DocumentId};

use crate::config::SyncConfig;
use crate::conflict::{Confirm, ConflictResolver};
use crate::draft::LocalDraftStore;
use crate::error::{Result, SyncError};
use crate::pipeline::{EditEvent, EditPipeline, Flush};
use crate::resource::AsyncResource;
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::state::{ApplicationState, StateStore};
use crate::sync::{begin_document_load, Synchronizer};
use crate::transport::{document_path, parse_route, Navigator, Transport};

/// Entry point for the editor: routing, edits, saves, create and delete.
///
/// Fetch failures end up in the state as errored resources. Write failures
/// (create, delete, manual save) are returned to the caller.
pub struct SyncController {
    sync: Arc<Synchronizer>,
    pipeline: EditPipeline,
    navigator: Arc<dyn Navigator>,
    config: SyncConfig,
}

impl SyncController {
    pub fn new(
        transport: Arc<dyn Transport>,
        drafts: LocalDraftStore,
        confirm: Arc<dyn Confirm>,
        navigator: Arc<dyn Navigator>,
        config: SyncConfig,
    ) -> Self {
        let store = Arc::new(StateStore::default());
        let sync = Arc::new(Synchronizer::new(
            store,
            transport,
            drafts,
            ConflictResolver::new(confirm),
        ));
        let pipeline = EditPipeline::new(sync.clone(), Arc::new(TokioScheduler), config);

        Self {
            sync,
            pipeline,
            navigator,
            config,
        }
    }

    /// Run edit effects on a different scheduler.
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.pipeline.cancel();
        self.pipeline = EditPipeline::new(self.sync.clone(), scheduler, self.config);
        self
    }

    pub fn store(&self) -> Arc<StateStore> {
        self.sync.store.clone()
    }

    pub fn state(&self) -> ApplicationState {
        self.sync.store.get_state()
    }

    pub fn pipeline(&self) -> &EditPipeline {
        &self.pipeline
    }

    /// Apply the initial route and load the document listing.
    pub async fn start(&self, path: &str) {
        tracing::info!(path, "starting editor session");
        self.handle_route(path).await;
        self.sync.fetch_documents().await;
    }

    /// React to a route change coming from the navigation collaborator.
    ///
    /// Pending edit effects of the previous document are dropped without
    /// flushing: an edit that has not reached its local save is lost.
    pub async fn handle_route(&self, path: &str) {
        self.pipeline.cancel();

        let id = parse_route(path);
        let changed = self.sync.store.update(|state| {
            if state.selected_document_id == id {
                return state.clone();
            }
            let document = match id {
                Some(id) => begin_document_load(state, id),
                None => AsyncResource::idle(),
            };
            ApplicationState {
                selected_document_id: id,
                document,
                ..state.clone()
            }
        });

        if let (true, Some(id)) = (changed, id) {
            self.sync.load_document(id).await;
        }
    }

    pub async fn navigate(&self, path: &str) {
        self.navigator.push(path);
        self.handle_route(path).await;
    }

    async fn redirect(&self, path: &str) {
        self.navigator.replace(path);
        self.handle_route(path).await;
    }

    /// Feed one editor change into the debounce pipeline.
    pub fn edit(&self, edit: EditEvent) {
        self.pipeline.submit(edit);
    }

    pub fn cancel_pending(&self) -> bool {
        self.pipeline.cancel()
    }

    /// Write the latest editor content immediately.
    ///
    /// Uses the pending edit if there is one, otherwise the open document.
    /// Scheduled effects are cancelled so the write is not repeated. Returns
    /// `None` when the latest edit was already sent by its server sync.
    pub async fn save_now(&self) -> Result<Option<Document>> {
        let edit = match self.pipeline.take() {
            Flush::Unsynced(edit) => edit,
            Flush::Sent => {
                tracing::debug!("latest edit already sent, nothing to save");
                return Ok(None);
            }
            Flush::Idle => self
                .state()
                .open_document()
                .map(EditEvent::from)
                .ok_or_else(|| SyncError::Validation("no document is open".to_string()))?,
        };
        self.sync.write_back(&edit).await.map(Some)
    }

    pub async fn refresh(&self) {
        self.sync.fetch_documents().await;
    }

    /// Create a child of `parent` (or a root document) and open it.
    pub async fn create_document(&self, parent: Option<DocumentId>) -> Result<Document> {
        let created = self.sync.transport.create_document(parent).await?;
        tracing::info!(document_id = created.id, ?parent, "document created");

        self.sync.fetch_documents().await;
        self.navigate(&document_path(created.id)).await;
        Ok(created)
    }

    /// Delete `id` and move to its parent, or to the root.
    pub async fn delete_document(&self, id: Option<DocumentId>) -> Result<Option<DocumentId>> {
        let id = id
            .filter(|id| *id > 0)
            .ok_or_else(|| SyncError::Validation("a document id is required to delete".to_string()))?;

        let parent = self.sync.transport.delete_document(id).await?;
        tracing::info!(document_id = id, ?parent, "document deleted");

        if let Err(e) = self.sync.drafts.clear(id) {
            tracing::warn!(document_id = id, error = %e, "failed to remove draft of deleted document");
        }

        let target = parent.map(document_path).unwrap_or_else(|| "/".to_string());
        self.redirect(&target).await;
        self.sync.fetch_documents().await;
        Ok(parent)
    }
}
