#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use notes_shared::api::UpdateDocumentRequest;
use notes_sync::{
    Confirm, Document, DocumentId, KeyValueStore, LocalDraftStore, MemoryStore, Navigator,
    SyncConfig, SyncController, Transport, TransportError,
};
use serde_json::Value;
use tokio::sync::Notify;

pub fn server_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchTree,
    Fetch(DocumentId),
    Create(Option<DocumentId>),
    Update(DocumentId, UpdateDocumentRequest),
    Delete(DocumentId),
}

/// In-memory server with a flat table of documents.
pub struct FakeTransport {
    documents: Mutex<BTreeMap<DocumentId, Document>>,
    calls: Mutex<Vec<Call>>,
    latency: Mutex<HashMap<DocumentId, Duration>>,
    update_gate: Mutex<Option<Arc<Notify>>>,
    fail_fetches: AtomicBool,
    fail_writes: AtomicBool,
    next_id: AtomicI64,
}

impl FakeTransport {
    /// 1 "Inbox" ─┬─ 3 "Projects" ── 4 "Rust"
    ///            └─ 5 "Five"
    /// 7 "Seven"
    pub fn seeded() -> Self {
        let transport = Self {
            documents: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            latency: Mutex::new(HashMap::new()),
            update_gate: Mutex::new(None),
            fail_fetches: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            next_id: AtomicI64::new(100),
        };
        transport.insert(1, None, "Inbox", "");
        transport.insert(3, Some(1), "Projects", "");
        transport.insert(4, Some(3), "Rust", "ownership");
        transport.insert(5, Some(1), "Five", "A");
        transport.insert(7, None, "Seven", "seven");
        transport
    }

    pub fn insert(&self, id: DocumentId, parent: Option<DocumentId>, title: &str, content: &str) {
        let mut doc = Document::new(id, title)
            .with_content(content)
            .updated(server_time());
        doc.parent = parent;
        doc.created_at = Some(server_time());
        self.documents.lock().unwrap().insert(id, doc);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(DocumentId, UpdateDocumentRequest)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Update(id, req) => Some((id, req)),
                _ => None,
            })
            .collect()
    }

    pub fn fetches_of(&self, id: DocumentId) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == Call::Fetch(id))
            .count()
    }

    pub fn document(&self, id: DocumentId) -> Option<Document> {
        self.documents.lock().unwrap().get(&id).cloned()
    }

    pub fn set_latency(&self, id: DocumentId, latency: Duration) {
        self.latency.lock().unwrap().insert(id, latency);
    }

    /// Block updates until the returned handle is notified.
    pub fn hold_updates(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.update_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn children_of(table: &BTreeMap<DocumentId, Document>, parent: Option<DocumentId>) -> Vec<Document> {
        table
            .values()
            .filter(|doc| doc.parent == parent)
            .map(|doc| {
                Document::new(doc.id, doc.title.clone())
                    .with_children(Self::children_of(table, Some(doc.id)))
            })
            .collect()
    }

    fn network_down() -> TransportError {
        TransportError::Network("connection refused".to_string())
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch_document_tree(&self) -> Result<Vec<Document>, TransportError> {
        self.record(Call::FetchTree);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(Self::network_down());
        }
        let table = self.documents.lock().unwrap();
        Ok(Self::children_of(&table, None))
    }

    async fn fetch_document(&self, id: DocumentId) -> Result<Document, TransportError> {
        self.record(Call::Fetch(id));
        let latency = self.latency.lock().unwrap().get(&id).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(Self::network_down());
        }
        let table = self.documents.lock().unwrap();
        let doc = table.get(&id).cloned().ok_or(TransportError::NotFound)?;
        Ok(doc.with_children(Self::children_of(&table, Some(id))))
    }

    async fn create_document(&self, parent: Option<DocumentId>) -> Result<Document, TransportError> {
        self.record(Call::Create(parent));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TransportError::Server("500 Internal Server Error".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.insert(id, parent, "", "");
        Ok(self.document(id).unwrap())
    }

    async fn update_document(
        &self,
        id: DocumentId,
        update: &UpdateDocumentRequest,
    ) -> Result<Document, TransportError> {
        self.record(Call::Update(id, update.clone()));
        let gate = self.update_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::network_down());
        }
        let mut table = self.documents.lock().unwrap();
        let doc = table.get_mut(&id).ok_or(TransportError::NotFound)?;
        doc.title = update.title.clone();
        doc.content = update.content.clone();
        doc.updated_at = Some(Utc::now());
        Ok(doc.clone())
    }

    async fn delete_document(&self, id: DocumentId) -> Result<Option<DocumentId>, TransportError> {
        self.record(Call::Delete(id));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::network_down());
        }
        let mut table = self.documents.lock().unwrap();
        let doc = table.remove(&id).ok_or(TransportError::NotFound)?;
        Ok(doc.parent)
    }
}

/// Key/value store that counts writes.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    pub sets: AtomicUsize,
    pub removes: AtomicUsize,
}

impl CountingStore {
    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: Value) -> anyhow::Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key)
    }
}

pub struct ScriptedConfirm {
    answer: AtomicBool,
    asked: AtomicUsize,
}

impl ScriptedConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer: AtomicBool::new(answer),
            asked: AtomicUsize::new(0),
        }
    }

    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Confirm for ScriptedConfirm {
    async fn confirm(&self, _message: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nav {
    Push(String),
    Replace(String),
}

#[derive(Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Nav>>,
}

impl RecordingNavigator {
    pub fn history(&self) -> Vec<Nav> {
        self.history.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, path: &str) {
        self.history.lock().unwrap().push(Nav::Push(path.to_string()));
    }

    fn replace(&self, path: &str) {
        self.history.lock().unwrap().push(Nav::Replace(path.to_string()));
    }
}

pub struct Harness {
    pub controller: SyncController,
    pub transport: Arc<FakeTransport>,
    pub store: Arc<CountingStore>,
    pub drafts: LocalDraftStore,
    pub confirm: Arc<ScriptedConfirm>,
    pub navigator: Arc<RecordingNavigator>,
}

pub fn harness() -> Harness {
    harness_with(true)
}

pub fn harness_with(restore_drafts: bool) -> Harness {
    let transport = Arc::new(FakeTransport::seeded());
    let store = Arc::new(CountingStore::default());
    let drafts = LocalDraftStore::new(store.clone());
    let confirm = Arc::new(ScriptedConfirm::new(restore_drafts));
    let navigator = Arc::new(RecordingNavigator::default());

    let controller = SyncController::new(
        transport.clone(),
        drafts.clone(),
        confirm.clone(),
        navigator.clone(),
        SyncConfig::default(),
    );

    Harness {
        controller,
        transport,
        store,
        drafts,
        confirm,
        navigator,
    }
}
