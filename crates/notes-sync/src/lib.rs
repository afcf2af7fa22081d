//! Synchronization core of the notes editor.
//!
//! Keeps the document tree consistent between the server, locally persisted
//! drafts and the in-memory editing state. Every state change goes through
//! [`StateStore`], which diffs the previous and next [`ApplicationState`] and
//! notifies only the views whose projection changed.

pub mod config;
pub mod conflict;
pub mod controller;
pub mod draft;
pub mod error;
pub mod pipeline;
pub mod resource;
pub mod scheduler;
pub mod state;
mod sync;
pub mod transport;
pub mod tree;

pub use config::SyncConfig;
pub use conflict::{Confirm, ConflictResolver, Resolution};
pub use controller::SyncController;
pub use draft::{draft_key, DraftSnapshot, KeyValueStore, LocalDraft, LocalDraftStore, MemoryStore};
pub use error::{SyncError, TransportError};
pub use pipeline::{EditEvent, EditPipeline};
pub use resource::{AsyncResource, ResourceState};
pub use scheduler::{Scheduler, TaskHandle, TokioScheduler};
pub use state::{ApplicationState, DocumentListView, EditorView, LoadingView, Observer, StateStore, View};
pub use transport::{document_path, parse_route, Navigator, Transport};

pub use notes_shared::{Document, DocumentId};
