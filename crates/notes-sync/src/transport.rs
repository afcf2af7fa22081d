use async_trait::async_trait;
use notes_shared::{api::UpdateDocumentRequest, Document, DocumentId};

use crate::error::TransportError;

/// Remote document store.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch_document_tree(&self) -> Result<Vec<Document>, TransportError>;

    async fn fetch_document(&self, id: DocumentId) -> Result<Document, TransportError>;

    async fn create_document(&self, parent: Option<DocumentId>) -> Result<Document, TransportError>;

    async fn update_document(
        &self,
        id: DocumentId,
        update: &UpdateDocumentRequest,
    ) -> Result<Document, TransportError>;

    /// Deletes the document and reports its parent. Whether children go with
    /// it is up to the server.
    async fn delete_document(&self, id: DocumentId) -> Result<Option<DocumentId>, TransportError>;
}

/// Browser-style history the controller records navigation in.
pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
    fn replace(&self, path: &str);
}

pub fn document_path(id: DocumentId) -> String {
    format!("/documents/{id}")
}

/// Extract the selected document id from a route path.
///
/// The id is the second path segment (`/documents/5`); a missing or
/// non-numeric segment selects nothing.
pub fn parse_route(path: &str) -> Option<DocumentId> {
    path.trim_start_matches('/')
        .split('/')
        .nth(1)
        .and_then(|segment| segment.parse().ok())
}
