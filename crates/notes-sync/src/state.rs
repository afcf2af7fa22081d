use std::sync::{Mutex, PoisonError, RwLock};

use notes_shared::{Document, DocumentId};

use crate::resource::AsyncResource;

/// Everything the editor shows. Replaced wholesale on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationState {
    pub selected_document_id: Option<DocumentId>,
    pub documents: AsyncResource<Vec<Document>>,
    pub document: AsyncResource<Document>,
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self {
            selected_document_id: None,
            documents: AsyncResource::loading(),
            document: AsyncResource::idle(),
        }
    }
}

impl ApplicationState {
    pub fn is_loading(&self) -> bool {
        self.documents.is_loading || self.document.is_loading
    }

    /// The open document, when it is loaded and matches the selection.
    pub fn open_document(&self) -> Option<&Document> {
        let document = self.document.data.as_ref()?;
        (Some(document.id) == self.selected_document_id).then_some(document)
    }
}

/// The slice of [`ApplicationState`] one downstream observer depends on.
pub trait View: PartialEq + Send + Sync + 'static {
    fn project(state: &ApplicationState) -> Self;
}

/// Receives a view whenever its projection changes.
pub trait Observer<V: View>: Send + Sync {
    fn on_change(&self, view: &V);
}

impl<V: View, F> Observer<V> for F
where
    F: Fn(&V) + Send + Sync,
{
    fn on_change(&self, view: &V) {
        self(view)
    }
}

/// Sidebar: selection and the document listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentListView {
    pub selected_document_id: Option<DocumentId>,
    pub documents: AsyncResource<Vec<Document>>,
}

impl View for DocumentListView {
    fn project(state: &ApplicationState) -> Self {
        Self {
            selected_document_id: state.selected_document_id,
            documents: state.documents.clone(),
        }
    }
}

/// Editor: the open document, plus the selection so it knows when to clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView {
    pub selected_document_id: Option<DocumentId>,
    pub document: AsyncResource<Document>,
}

impl View for EditorView {
    fn project(state: &ApplicationState) -> Self {
        Self {
            selected_document_id: state.selected_document_id,
            document: state.document.clone(),
        }
    }
}

/// Status indicator: whether anything is loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingView(pub bool);

impl View for LoadingView {
    fn project(state: &ApplicationState) -> Self {
        Self(state.is_loading())
    }
}

type Listener = Box<dyn Fn(&ApplicationState, &ApplicationState) + Send + Sync>;

/// Single owner of the current [`ApplicationState`].
///
/// All writers go through [`StateStore::publish`] or [`StateStore::update`];
/// a structurally equal state is dropped without notifying anyone.
///
/// Updates are serialized from compute through notification, so observers see
/// views in publish order and the last view delivered matches the final state.
/// Observers may read the store but must not write to it.
pub struct StateStore {
    publishing: Mutex<()>,
    state: Mutex<ApplicationState>,
    listeners: RwLock<Vec<Listener>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(ApplicationState::default())
    }
}

impl StateStore {
    pub fn new(initial: ApplicationState) -> Self {
        Self {
            publishing: Mutex::new(()),
            state: Mutex::new(initial),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn get_state(&self) -> ApplicationState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Register an observer for view `V`. It is not called until `V` changes.
    pub fn subscribe<V, O>(&self, observer: O)
    where
        V: View,
        O: Observer<V> + 'static,
    {
        let listener: Listener = Box::new(move |previous: &ApplicationState, next: &ApplicationState| {
            let after = V::project(next);
            if V::project(previous) != after {
                observer.on_change(&after);
            }
        });
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Replace the state with `next`. Returns whether anything changed.
    pub fn publish(&self, next: ApplicationState) -> bool {
        self.update(|_| next)
    }

    /// Compute the next state from the current one under the store lock.
    pub fn update(&self, f: impl FnOnce(&ApplicationState) -> ApplicationState) -> bool {
        let _publishing = self.publishing.lock().unwrap_or_else(PoisonError::into_inner);
        let (previous, next) = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let next = f(&state);
            if next == *state {
                return false;
            }
            (std::mem::replace(&mut *state, next.clone()), next)
        };

        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener(&previous, &next);
        }
        true
    }
}
