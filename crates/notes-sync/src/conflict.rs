use std::sync::Arc;

use async_trait::async_trait;
use notes_shared::Document;

use crate::draft::LocalDraft;

pub const RESTORE_DRAFT_PROMPT: &str =
    "A newer copy of this document was saved locally. Restore it?";

/// Asks the user a yes/no question.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Always gives the same answer.
#[async_trait]
impl Confirm for bool {
    async fn confirm(&self, _message: &str) -> bool {
        *self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub winner: Document,
    pub used_local: bool,
    /// The draft lost and should be removed from local storage.
    pub discard_draft: bool,
}

/// Decides between a freshly fetched server document and a local draft.
#[derive(Clone)]
pub struct ConflictResolver {
    confirm: Arc<dyn Confirm>,
}

impl ConflictResolver {
    pub fn new(confirm: Arc<dyn Confirm>) -> Self {
        Self { confirm }
    }

    pub async fn resolve(&self, server: Document, draft: Option<LocalDraft>) -> Resolution {
        let Some(draft) = draft else {
            return Resolution {
                winner: server,
                used_local: false,
                discard_draft: false,
            };
        };

        if draft.id == server.id && is_newer(&draft, &server) {
            if self.confirm.confirm(RESTORE_DRAFT_PROMPT).await {
                tracing::info!(document_id = server.id, "restoring local draft");
                let winner = Document {
                    title: draft.title,
                    content: draft.content,
                    ..server
                };
                return Resolution {
                    winner,
                    used_local: true,
                    discard_draft: false,
                };
            }
            tracing::debug!(document_id = server.id, "local draft declined, keeping it");
            return Resolution {
                winner: server,
                used_local: false,
                discard_draft: false,
            };
        }

        tracing::debug!(document_id = server.id, "local draft is stale");
        Resolution {
            winner: server,
            used_local: false,
            discard_draft: true,
        }
    }
}

/// Drafts win only when strictly newer than a known server timestamp.
fn is_newer(draft: &LocalDraft, server: &Document) -> bool {
    server
        .updated_at
        .is_some_and(|updated_at| draft.local_save_date > updated_at)
}
