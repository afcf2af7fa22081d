use serde::{Deserialize, Serialize};

use crate::DocumentId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub parent: Option<DocumentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: DocumentId,
}

/// Body returned by `DELETE /documents/:id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteDocumentResponse {
    #[serde(default)]
    pub parent: Option<ParentRef>,
}

impl DeleteDocumentResponse {
    pub fn parent_id(&self) -> Option<DocumentId> {
        self.parent.as_ref().map(|p| p.id)
    }
}
