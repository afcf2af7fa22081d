mod common;

use std::time::Duration;

use common::{harness, Call, Nav};
use notes_sync::{ResourceState, SyncError, TransportError};
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn start_at_root_loads_listing_only() {
    let h = harness();
    assert!(h.controller.state().documents.is_loading);

    h.controller.start("/").await;

    let state = h.controller.state();
    assert_eq!(state.selected_document_id, None);
    assert_eq!(state.document.state(), ResourceState::Idle);
    let listing = state.documents.data.expect("listing loaded");
    assert_eq!(listing.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1, 7]);
    assert_eq!(listing[0].documents.len(), 2);
    assert_eq!(h.transport.calls(), vec![Call::FetchTree]);
}

#[tokio::test(start_paused = true)]
async fn start_on_document_route_opens_it() {
    let h = harness();
    h.controller.start("/documents/4").await;

    let state = h.controller.state();
    assert_eq!(state.selected_document_id, Some(4));
    let doc = state.open_document().expect("document open");
    assert_eq!(doc.title, "Rust");
    assert_eq!(doc.content, "ownership");
    assert!(!state.is_loading());
}

#[tokio::test(start_paused = true)]
async fn fetch_failures_become_error_resources() {
    let h = harness();
    h.transport.fail_fetches(true);

    h.controller.start("/documents/5").await;

    let state = h.controller.state();
    assert!(matches!(
        state.document.state(),
        ResourceState::Error(TransportError::Network(_))
    ));
    assert!(matches!(state.documents.state(), ResourceState::Error(_)));
    assert!(!state.is_loading());
}

#[tokio::test(start_paused = true)]
async fn missing_document_is_not_found() {
    let h = harness();
    h.controller.start("/documents/999").await;

    assert_eq!(
        h.controller.state().document.error,
        Some(TransportError::NotFound)
    );
}

#[tokio::test(start_paused = true)]
async fn same_route_does_not_refetch() {
    let h = harness();
    h.controller.start("/documents/5").await;

    h.controller.handle_route("/documents/5").await;

    assert_eq!(h.transport.fetches_of(5), 1);
}

#[tokio::test(start_paused = true)]
async fn deselecting_resets_the_document() {
    let h = harness();
    h.controller.start("/documents/5").await;

    h.controller.navigate("/").await;

    let state = h.controller.state();
    assert_eq!(state.selected_document_id, None);
    assert_eq!(state.document.state(), ResourceState::Idle);
    assert_eq!(h.navigator.history(), vec![Nav::Push("/".into())]);
}

#[tokio::test(start_paused = true)]
async fn switching_documents_clears_stale_data_while_loading() {
    let h = harness();
    h.controller.start("/documents/5").await;
    h.transport.set_latency(7, Duration::from_millis(500));

    let switch = h.controller.handle_route("/documents/7");
    let observe = async {
        sleep(Duration::from_millis(100)).await;
        h.controller.state()
    };
    let ((), midway) = tokio::join!(switch, observe);

    assert_eq!(midway.selected_document_id, Some(7));
    assert_eq!(midway.document.state(), ResourceState::Loading(None));
    assert_eq!(h.controller.state().open_document().unwrap().id, 7);
}

#[tokio::test(start_paused = true)]
async fn late_response_for_previous_selection_is_dropped() {
    let h = harness();
    h.controller.start("/").await;
    h.transport.set_latency(5, Duration::from_secs(1));

    let slow = h.controller.handle_route("/documents/5");
    let fast = async {
        sleep(Duration::from_millis(10)).await;
        h.controller.handle_route("/documents/7").await;
    };
    tokio::join!(slow, fast);

    let state = h.controller.state();
    assert_eq!(state.selected_document_id, Some(7));
    assert_eq!(state.document.data.unwrap().id, 7);
    assert_eq!(h.transport.fetches_of(5), 1);
}

#[tokio::test(start_paused = true)]
async fn create_refreshes_listing_and_opens_new_document() {
    let h = harness();
    h.controller.start("/").await;

    let created = h.controller.create_document(Some(1)).await.unwrap();

    assert_eq!(h.navigator.history(), vec![Nav::Push(format!("/documents/{}", created.id))]);
    let state = h.controller.state();
    assert_eq!(state.selected_document_id, Some(created.id));
    let inbox = &state.documents.data.unwrap()[0];
    assert!(inbox.documents.iter().any(|d| d.id == created.id));
}

#[tokio::test(start_paused = true)]
async fn failed_create_does_not_navigate() {
    let h = harness();
    h.controller.start("/").await;
    h.transport.fail_writes(true);

    let err = h.controller.create_document(None).await.unwrap_err();

    assert!(matches!(err, SyncError::Transport(TransportError::Server(_))));
    assert!(h.navigator.history().is_empty());
    assert_eq!(h.controller.state().selected_document_id, None);
}

#[tokio::test(start_paused = true)]
async fn delete_without_id_is_rejected_before_transport() {
    let h = harness();

    let err = h.controller.delete_document(None).await.unwrap_err();

    assert!(matches!(err, SyncError::Validation(_)));
    assert!(h.transport.calls().is_empty());
    assert!(h.navigator.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn delete_moves_to_parent() {
    let h = harness();
    h.controller.start("/documents/4").await;

    let parent = h.controller.delete_document(Some(4)).await.unwrap();

    assert_eq!(parent, Some(3));
    assert_eq!(h.navigator.history(), vec![Nav::Replace("/documents/3".into())]);
    let state = h.controller.state();
    assert_eq!(state.selected_document_id, Some(3));
    assert!(notes_sync::tree::find(&state.documents.data.unwrap(), 4).is_none());
}

#[tokio::test(start_paused = true)]
async fn delete_root_document_moves_home() {
    let h = harness();
    h.controller.start("/documents/7").await;

    assert_eq!(h.controller.delete_document(Some(7)).await.unwrap(), None);

    assert_eq!(h.navigator.history(), vec![Nav::Replace("/".into())]);
    assert_eq!(h.controller.state().selected_document_id, None);
}

#[tokio::test(start_paused = true)]
async fn failed_delete_keeps_selection() {
    let h = harness();
    h.controller.start("/documents/5").await;
    h.transport.fail_writes(true);

    assert!(h.controller.delete_document(Some(5)).await.is_err());
    assert!(h.navigator.history().is_empty());
    assert_eq!(h.controller.state().selected_document_id, Some(5));
}
