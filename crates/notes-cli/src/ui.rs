use std::fmt::Write;

use notes_shared::{Document, DocumentId};
use notes_sync::{DocumentListView, EditorView, LoadingView, ResourceState, StateStore};

/// Print the sidebar, editor and indicator whenever their views change.
pub fn attach(store: &StateStore) {
    store.subscribe(|view: &DocumentListView| println!("{}", render_sidebar(view)));
    store.subscribe(|view: &EditorView| println!("{}", render_editor(view)));
    store.subscribe(|view: &LoadingView| {
        if view.0 {
            println!("[syncing...]");
        }
    });
}

pub fn render_sidebar(view: &DocumentListView) -> String {
    let mut out = String::from("== Documents ==\n");
    match view.documents.state() {
        ResourceState::Idle => {}
        ResourceState::Loading(None) => out.push_str("  Loading documents...\n"),
        ResourceState::Loading(Some(documents)) | ResourceState::Ready(documents) => {
            if documents.is_empty() {
                out.push_str("  (no documents, `new` creates one)\n");
            }
            render_tree(&mut out, documents, view.selected_document_id, 1);
        }
        ResourceState::Error(e) => {
            let _ = writeln!(out, "  {}", e);
        }
    }
    out
}

fn render_tree(out: &mut String, documents: &[Document], selected: Option<DocumentId>, depth: usize) {
    for document in documents {
        let marker = if Some(document.id) == selected { '>' } else { ' ' };
        let title = if document.title.is_empty() {
            "Untitled"
        } else {
            document.title.as_str()
        };
        let _ = writeln!(out, "{}{} {} (#{})", "  ".repeat(depth), marker, title, document.id);
        render_tree(out, &document.documents, selected, depth + 1);
    }
}

pub fn render_editor(view: &EditorView) -> String {
    match view.document.state() {
        ResourceState::Idle => "== No document open ==".to_string(),
        ResourceState::Loading(_) => "== Loading document... ==".to_string(),
        ResourceState::Error(e) => format!("== Could not load document: {} ==", e),
        ResourceState::Ready(document) => {
            let mut out = format!("== {} (#{}) ==\n", document.title, document.id);
            if let Some(updated_at) = document.updated_at {
                let _ = writeln!(out, "last saved {}", updated_at.format("%Y-%m-%d %H:%M:%S"));
            }
            out.push_str(&document.content);
            out
        }
    }
}
