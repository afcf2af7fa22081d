//! Edits on the nested document listing.

use notes_shared::{Document, DocumentId};

/// Replace the title of the node with `id`, wherever it sits in the tree.
///
/// Takes the tree by value; every other node is moved through untouched.
/// An id that is no longer present leaves the tree as it was.
pub fn set_title(mut tree: Vec<Document>, id: DocumentId, title: &str) -> Vec<Document> {
    if !rename(&mut tree, id, title) {
        tracing::debug!(document_id = id, "title change for a document not in the tree");
    }
    tree
}

fn rename(nodes: &mut [Document], id: DocumentId, title: &str) -> bool {
    for node in nodes {
        if node.id == id {
            if node.title != title {
                node.title = title.to_string();
            }
            return true;
        }
        if rename(&mut node.documents, id, title) {
            return true;
        }
    }
    false
}

/// Depth-first lookup.
pub fn find(tree: &[Document], id: DocumentId) -> Option<&Document> {
    tree.iter().find_map(|node| {
        if node.id == id {
            Some(node)
        } else {
            find(&node.documents, id)
        }
    })
}
