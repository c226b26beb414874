mod common;

use common::*;
use redraft_core::document::DocumentKind;
use redraft_core::session::{PendingState, SuggestionEvent, SuggestionStatus};
use redraft_infrastructure::{TomlDocumentRepository, TomlSessionRepository};
use redraft_application::EditingUseCase;
use redraft_core::config::EngineConfig;
use std::sync::Arc;
use tempfile::TempDir;

async fn proposed(app: &EditingUseCase) -> (String, String, String) {
    let doc = app
        .create_document(DocumentKind::AnalysisSummary, GUARD_TEXT)
        .await
        .unwrap();
    let session_id = app.create_session(&doc.id).await.unwrap();
    let suggestion = app
        .send_message(&session_id, "mobility")
        .await
        .unwrap()
        .edit_suggestion
        .unwrap();
    (doc.id, session_id, suggestion.id)
}

#[tokio::test]
async fn test_apply_twice_returns_stored_outcome() {
    let app = use_case(ScriptedGenerator::new(vec![Ok(guard_reply())]));
    let (doc_id, _, suggestion_id) = proposed(&app).await;
    let gateway = app.gateway();

    let first = gateway.apply(&suggestion_id).await.unwrap();
    let second = gateway.apply(&suggestion_id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.version.version_number, 2);
    assert_eq!(app.list_versions(&doc_id).await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_apply_from_two_surfaces_writes_once() {
    let app = use_case(ScriptedGenerator::new(vec![Ok(guard_reply())]));
    let (doc_id, _, suggestion_id) = proposed(&app).await;

    let modal = app.gateway();
    let panel = app.gateway();
    let (a, b) = tokio::join!(modal.apply(&suggestion_id), panel.apply(&suggestion_id));

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(app.list_versions(&doc_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_reject_then_apply_conflicts() {
    let app = use_case(ScriptedGenerator::new(vec![Ok(guard_reply())]));
    let (doc_id, _, suggestion_id) = proposed(&app).await;
    let gateway = app.gateway();

    let ack = gateway.reject(&suggestion_id).await.unwrap();
    assert_eq!(gateway.reject(&suggestion_id).await.unwrap(), ack);

    assert!(gateway.apply(&suggestion_id).await.unwrap_err().is_conflict());
    assert_eq!(app.list_versions(&doc_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_gateway_recognises_accept_made_elsewhere() {
    let app = use_case(ScriptedGenerator::new(vec![Ok(guard_reply())]));
    let (doc_id, session_id, suggestion_id) = proposed(&app).await;

    app.accept_suggestion(&session_id, &suggestion_id)
        .await
        .unwrap();

    let gateway = app.gateway();
    let outcome = gateway.apply(&suggestion_id).await.unwrap();
    assert_eq!(outcome.version.version_number, 2);
    assert!(gateway.reject(&suggestion_id).await.unwrap_err().is_conflict());
    assert_eq!(app.list_versions(&doc_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_recovered_outcome_reports_document_at_accepted_version() {
    let app = use_case(ScriptedGenerator::new(vec![Ok(guard_reply())]));
    let (doc_id, session_id, suggestion_id) = proposed(&app).await;

    app.accept_suggestion(&session_id, &suggestion_id)
        .await
        .unwrap();
    app.save_manual_edit(&doc_id, "Rewritten by hand.", "")
        .await
        .unwrap();

    let outcome = app.gateway().apply(&suggestion_id).await.unwrap();
    assert_eq!(outcome.version.version_number, 2);
    assert_eq!(outcome.document.current_version_number, 2);
    assert_eq!(outcome.document.current_text, GUARD_REVISION);
    assert_eq!(
        app.get_document(&doc_id).await.unwrap().current_version_number,
        3
    );
}

#[tokio::test]
async fn test_closing_session_drops_cached_outcomes() {
    let app = use_case(ScriptedGenerator::new(vec![Ok(guard_reply())]));
    let (doc_id, session_id, suggestion_id) = proposed(&app).await;
    let gateway = app.gateway();

    gateway.apply(&suggestion_id).await.unwrap();
    app.close_session(&session_id).await.unwrap();

    assert!(gateway.apply(&suggestion_id).await.unwrap_err().is_not_found());
    assert_eq!(app.list_versions(&doc_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_gateway_recognises_reject_made_elsewhere() {
    let app = use_case(ScriptedGenerator::new(vec![Ok(guard_reply())]));
    let (_, session_id, suggestion_id) = proposed(&app).await;

    let ack = app
        .reject_suggestion(&session_id, &suggestion_id)
        .await
        .unwrap();

    assert_eq!(app.gateway().reject(&suggestion_id).await.unwrap(), ack);
}

#[tokio::test]
async fn test_unknown_suggestion() {
    let app = use_case(ScriptedGenerator::new(vec![]));
    assert!(app.gateway().apply("nope").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_surfaces_observe_the_same_pending_state() {
    let app = use_case(ScriptedGenerator::new(vec![Ok(guard_reply())]));
    let doc = app
        .create_document(DocumentKind::AnalysisSummary, GUARD_TEXT)
        .await
        .unwrap();
    let session_id = app.create_session(&doc.id).await.unwrap();
    let gateway = app.gateway();

    let mut modal = gateway.subscribe(&session_id);
    let mut panel = gateway.subscribe(&session_id);
    let mut events = gateway.events();
    assert_eq!(*modal.borrow(), PendingState::Idle);

    let suggestion = app
        .send_message(&session_id, "mobility")
        .await
        .unwrap()
        .edit_suggestion
        .unwrap();

    modal.changed().await.unwrap();
    assert_eq!(modal.borrow_and_update().pending().unwrap().id, suggestion.id);
    panel.changed().await.unwrap();
    assert!(panel.borrow_and_update().pending().is_some());

    gateway.apply(&suggestion.id).await.unwrap();

    panel.changed().await.unwrap();
    assert_eq!(
        *panel.borrow_and_update(),
        PendingState::Applied {
            suggestion_id: suggestion.id.clone(),
            version_number: 2,
        }
    );
    assert!(modal.borrow().pending().is_none());

    assert!(matches!(
        events.recv().await.unwrap(),
        SuggestionEvent::Proposed { .. }
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        SuggestionEvent::Applied { version_number: 2, .. }
    ));

    app.close_session(&session_id).await.unwrap();
    assert!(matches!(
        events.recv().await.unwrap(),
        SuggestionEvent::Cleared { .. }
    ));
    assert_eq!(*panel.borrow(), PendingState::Cleared);
}

#[tokio::test]
async fn test_pending_suggestion_survives_restart_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let open = |generator: Arc<ScriptedGenerator>| {
        EditingUseCase::new(
            Arc::new(TomlDocumentRepository::new(temp_dir.path().join("documents")).unwrap()),
            Arc::new(TomlSessionRepository::new(temp_dir.path().join("sessions")).unwrap()),
            generator,
            EngineConfig::default(),
        )
    };

    let (doc_id, session_id, suggestion_id) =
        proposed(&open(ScriptedGenerator::new(vec![Ok(guard_reply())]))).await;

    let reopened = open(ScriptedGenerator::new(vec![]));
    let pending = reopened.pending_suggestion(&session_id).await.unwrap().unwrap();
    assert_eq!(pending.id, suggestion_id);
    assert_eq!(
        *reopened.gateway().subscribe(&session_id).borrow(),
        PendingState::Pending {
            suggestion: pending.clone()
        }
    );

    let outcome = reopened.gateway().apply(&suggestion_id).await.unwrap();
    assert_eq!(outcome.document.current_text, GUARD_REVISION);

    let session = reopened.get_session(&session_id).await.unwrap();
    assert_eq!(
        session.find_suggestion(&suggestion_id).unwrap().status,
        SuggestionStatus::Accepted
    );
    assert_eq!(reopened.list_versions(&doc_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_apply_by_id_alone_after_restart() {
    let temp_dir = TempDir::new().unwrap();
    let open = |generator: Arc<ScriptedGenerator>| {
        EditingUseCase::new(
            Arc::new(TomlDocumentRepository::new(temp_dir.path().join("documents")).unwrap()),
            Arc::new(TomlSessionRepository::new(temp_dir.path().join("sessions")).unwrap()),
            generator,
            EngineConfig::default(),
        )
    };

    let (doc_id, session_id, suggestion_id) =
        proposed(&open(ScriptedGenerator::new(vec![Ok(guard_reply())]))).await;

    // Nothing has loaded the session in this instance.
    let reopened = open(ScriptedGenerator::new(vec![]));
    let outcome = reopened.gateway().apply(&suggestion_id).await.unwrap();

    assert_eq!(outcome.version.version_number, 2);
    assert_eq!(outcome.document.current_text, GUARD_REVISION);
    assert!(reopened.pending_suggestion(&session_id).await.unwrap().is_none());
    assert_eq!(reopened.list_versions(&doc_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_suggestion_of_closed_session_is_not_found_after_restart() {
    let temp_dir = TempDir::new().unwrap();
    let open = |generator: Arc<ScriptedGenerator>| {
        EditingUseCase::new(
            Arc::new(TomlDocumentRepository::new(temp_dir.path().join("documents")).unwrap()),
            Arc::new(TomlSessionRepository::new(temp_dir.path().join("sessions")).unwrap()),
            generator,
            EngineConfig::default(),
        )
    };

    let first = open(ScriptedGenerator::new(vec![Ok(guard_reply())]));
    let (_, session_id, suggestion_id) = proposed(&first).await;
    first.close_session(&session_id).await.unwrap();

    let reopened = open(ScriptedGenerator::new(vec![]));
    assert!(
        reopened
            .gateway()
            .apply(&suggestion_id)
            .await
            .unwrap_err()
            .is_not_found()
    );
}
