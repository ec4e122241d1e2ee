//! Relay Gateway Integration Tests
//!
//! Drives the gateway with a recording adapter and real shell scripts.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use script_relay::services::remote::{IncomingUpdate, RemoteError};
use script_relay::RelayGateway;
use script_relay_core::{ChatAction, ChatTarget, ReplyOptions};

use super::support::{config, text_from, wait_until, write_script, RecordingAdapter, Sent};

type Fixture = (tempfile::TempDir, Arc<RecordingAdapter>, Arc<RelayGateway>);

fn gateway(script_body: &str, allowed: &[&str]) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), script_body);
    let adapter = Arc::new(RecordingAdapter::new());
    let gateway = Arc::new(RelayGateway::new(config(script, allowed), adapter.clone()));
    (dir, adapter, gateway)
}

// ============================================================================
// Replies
// ============================================================================

#[tokio::test]
async fn test_start_replies_with_prompt_and_keyboard() {
    let (_dir, adapter, gateway) = gateway("echo hi", &["alice"]);

    assert!(gateway.handle_update(text_from(10, "alice", "/start")).await);

    assert_eq!(
        adapter.sent(),
        vec![
            Sent::Action {
                chat: ChatTarget(10),
                action: ChatAction::Typing,
            },
            Sent::Text {
                chat: ChatTarget(10),
                text: "Input your command:".into(),
                options: ReplyOptions::standard(),
            },
        ]
    );
}

#[tokio::test]
async fn test_showcode_replies_with_script_source() {
    let (_dir, adapter, gateway) = gateway("echo from-the-camera", &["alice"]);

    assert!(gateway.handle_update(text_from(10, "alice", "/showcode")).await);

    assert_eq!(
        adapter.texts(),
        vec![(ChatTarget(10), "#!/bin/sh\necho from-the-camera\n".to_string())]
    );
}

#[tokio::test]
async fn test_showcode_missing_script_reports_error() {
    let adapter = Arc::new(RecordingAdapter::new());
    let gateway = RelayGateway::new(
        config("/nonexistent/relay/capture.sh".into(), &["alice"]),
        adapter.clone(),
    );

    gateway.handle_update(text_from(10, "alice", "/showcode")).await;

    let texts = adapter.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].1.starts_with("Error: "));
}

#[tokio::test]
async fn test_unknown_text_echoes_input() {
    let (_dir, adapter, gateway) = gateway("echo hi", &["alice"]);

    gateway.handle_update(text_from(10, "alice", "hello")).await;
    gateway.handle_update(text_from(10, "alice", "")).await;

    assert_eq!(
        adapter.texts(),
        vec![
            (ChatTarget(10), "hello: Unknown command.".to_string()),
            (ChatTarget(10), "Unknown command.".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_non_text_message_treated_as_empty() {
    let (_dir, adapter, gateway) = gateway("echo hi", &["alice"]);

    let mut update = text_from(10, "alice", "");
    update.text = None;
    gateway.handle_update(update).await;

    assert_eq!(adapter.texts(), vec![(ChatTarget(10), "Unknown command.".to_string())]);
}

// ============================================================================
// Access control
// ============================================================================

#[tokio::test]
async fn test_unlisted_sender_gets_no_reply() {
    let (_dir, adapter, gateway) = gateway("echo hi", &["alice"]);

    assert!(!gateway.handle_update(text_from(10, "mallory", "/start")).await);
    assert!(!gateway.handle_update(text_from(10, "mallory", "/execute")).await);

    assert!(adapter.sent().is_empty());
    assert_eq!(gateway.pending_executions(), 0);
}

#[tokio::test]
async fn test_sender_without_username_is_dropped() {
    let (_dir, adapter, gateway) = gateway("echo hi", &["alice"]);

    let update = IncomingUpdate::text(ChatTarget(10), None, "/start");
    assert!(!gateway.handle_update(update).await);

    assert!(adapter.sent().is_empty());
}

#[tokio::test]
async fn test_identity_match_is_case_sensitive() {
    let (_dir, adapter, gateway) = gateway("echo hi", &["alice"]);

    assert!(!gateway.handle_update(text_from(10, "Alice", "/start")).await);
    assert!(adapter.sent().is_empty());
}

// ============================================================================
// Execution
// ============================================================================

#[tokio::test]
async fn test_execute_sends_photo_for_jpeg_output() {
    let (_dir, adapter, gateway) = gateway(r"printf '\377\330\377\340\000\020JFIF\000'", &["alice"]);
    let worker = gateway.spawn_worker().unwrap();

    assert!(gateway.handle_update(text_from(10, "alice", "/execute")).await);
    wait_until(|| !adapter.deliveries().is_empty()).await;

    let sent = adapter.sent();
    assert!(sent.contains(&Sent::Action {
        chat: ChatTarget(10),
        action: ChatAction::UploadPhoto,
    }));
    match &adapter.deliveries()[0] {
        Sent::Photo {
            chat,
            mime,
            bytes,
            options,
        } => {
            assert_eq!(*chat, ChatTarget(10));
            assert_eq!(mime, "image/jpeg");
            assert_eq!(&bytes[..3], b"\xFF\xD8\xFF");
            assert_eq!(*options, ReplyOptions::standard());
        }
        other => panic!("expected photo, got {:?}", other),
    }

    gateway.cancel_token().cancel();
    worker.await.unwrap();
}

#[tokio::test]
async fn test_execute_sends_video_for_mp4_output() {
    let (_dir, adapter, gateway) = gateway(r"printf '\000\000\000\030ftypmp42\000\000\000\000mp42isom'", &["alice"]);
    let worker = gateway.spawn_worker().unwrap();

    gateway.handle_update(text_from(10, "alice", "/execute")).await;
    wait_until(|| !adapter.deliveries().is_empty()).await;

    match &adapter.deliveries()[0] {
        Sent::Video {
            chat,
            mime,
            options,
            ..
        } => {
            assert_eq!(*chat, ChatTarget(10));
            assert_eq!(mime, "video/mp4");
            assert_eq!(*options, ReplyOptions::standard());
        }
        other => panic!("expected video, got {:?}", other),
    }

    gateway.cancel_token().cancel();
    worker.await.unwrap();
}

#[tokio::test]
async fn test_execute_sends_text_output_with_keyboard() {
    let (_dir, adapter, gateway) = gateway("echo 'temperature: 21C'", &["alice"]);
    let worker = gateway.spawn_worker().unwrap();

    gateway.handle_update(text_from(10, "alice", "/execute")).await;
    wait_until(|| !adapter.deliveries().is_empty()).await;

    assert_eq!(
        adapter.deliveries(),
        vec![Sent::Text {
            chat: ChatTarget(10),
            text: "temperature: 21C\n".into(),
            options: ReplyOptions::standard(),
        }]
    );

    gateway.cancel_token().cancel();
    worker.await.unwrap();
}

#[tokio::test]
async fn test_execute_failure_reports_exit_status_and_output() {
    let (_dir, adapter, gateway) = gateway("echo 'camera busy' >&2; exit 2", &["alice"]);
    let worker = gateway.spawn_worker().unwrap();

    gateway.handle_update(text_from(10, "alice", "/execute")).await;
    wait_until(|| !adapter.deliveries().is_empty()).await;

    assert_eq!(
        adapter.texts(),
        vec![(
            ChatTarget(10),
            "Error running script: exit status 2 (camera busy\n)".to_string()
        )]
    );

    gateway.cancel_token().cancel();
    worker.await.unwrap();
}

#[tokio::test]
async fn test_stderr_before_image_is_sent_as_text() {
    // A warning printed ahead of the image bytes hides the image signature
    let (_dir, adapter, gateway) = gateway(
        r"printf 'warning: slow camera\n' >&2; printf '\377\330\377\340\000\020JFIF\000'",
        &["alice"],
    );
    let worker = gateway.spawn_worker().unwrap();

    gateway.handle_update(text_from(10, "alice", "/execute")).await;
    wait_until(|| !adapter.deliveries().is_empty()).await;

    match &adapter.deliveries()[0] {
        Sent::Text { text, .. } => assert!(text.starts_with("warning: slow camera\n")),
        other => panic!("expected text, got {:?}", other),
    }

    gateway.cancel_token().cancel();
    worker.await.unwrap();
}

#[tokio::test]
async fn test_rejected_photo_falls_back_to_text() {
    let (_dir, adapter, gateway) = gateway(r"printf '\211PNG\r\n\032\n\000\000\000\rIHDR'", &["alice"]);
    adapter.fail_media.store(true, Ordering::SeqCst);
    let worker = gateway.spawn_worker().unwrap();

    gateway.handle_update(text_from(10, "alice", "/execute")).await;
    wait_until(|| !adapter.deliveries().is_empty()).await;

    assert_eq!(
        adapter.texts(),
        vec![(ChatTarget(10), "Failed to send photo: file is too big".to_string())]
    );

    gateway.cancel_token().cancel();
    worker.await.unwrap();
}

#[tokio::test]
async fn test_requests_run_in_arrival_order() {
    let (_dir, adapter, gateway) = gateway("echo done", &["alice", "bob", "carol"]);

    // Queue everything before the worker exists so ordering is decided by the queue alone
    gateway.handle_update(text_from(1, "alice", "/execute")).await;
    gateway.handle_update(text_from(2, "bob", "/execute")).await;
    gateway.handle_update(text_from(3, "carol", "/execute")).await;
    assert_eq!(gateway.pending_executions(), 3);

    let worker = gateway.spawn_worker().unwrap();
    wait_until(|| adapter.deliveries().len() == 3).await;

    let chats: Vec<ChatTarget> = adapter.texts().into_iter().map(|(chat, _)| chat).collect();
    assert_eq!(chats, vec![ChatTarget(1), ChatTarget(2), ChatTarget(3)]);

    gateway.cancel_token().cancel();
    worker.await.unwrap();
}

#[tokio::test]
async fn test_full_queue_blocks_sender_and_registry() {
    let (_dir, adapter, gateway) = gateway("echo done", &["alice"]);

    for _ in 0..4 {
        gateway.handle_update(text_from(1, "alice", "/execute")).await;
    }
    assert_eq!(gateway.pending_executions(), 4);

    let blocked = {
        let gateway = gateway.clone();
        tokio::spawn(async move { gateway.handle_update(text_from(1, "alice", "/execute")).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!blocked.is_finished());

    // The fifth update holds the registry lock while it waits for room
    assert!(
        tokio::time::timeout(Duration::from_millis(50), gateway.registry().lock())
            .await
            .is_err()
    );

    let worker = gateway.spawn_worker().unwrap();
    assert!(blocked.await.unwrap());
    wait_until(|| adapter.deliveries().len() == 5).await;

    gateway.cancel_token().cancel();
    worker.await.unwrap();
}

#[tokio::test]
async fn test_spawn_worker_only_once() {
    let (_dir, _adapter, gateway) = gateway("echo done", &["alice"]);

    let worker = gateway.spawn_worker();
    assert!(worker.is_some());
    assert!(gateway.spawn_worker().is_none());

    gateway.cancel_token().cancel();
    worker.unwrap().await.unwrap();
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_run_fails_when_bot_info_fails() {
    let (_dir, adapter, gateway) = gateway("echo hi", &["alice"]);
    adapter.fail_bot_info.store(true, Ordering::SeqCst);

    let err = gateway.run().await.unwrap_err();
    assert!(matches!(err, RemoteError::StartupFailed(_)));
    assert_eq!(
        err.to_string(),
        "Startup failed: Failed to get info of the bot: Unauthorized"
    );
    assert!(!adapter.is_started());
}

#[tokio::test]
async fn test_run_fails_when_webhook_cannot_be_deleted() {
    let (_dir, adapter, gateway) = gateway("echo hi", &["alice"]);
    adapter.fail_webhook.store(true, Ordering::SeqCst);

    let err = gateway.run().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Startup failed: Failed to delete webhook: Bad Gateway"
    );
    assert!(!adapter.is_started());
}

#[tokio::test]
async fn test_run_handles_updates_until_cancelled() {
    let (_dir, adapter, gateway) = gateway("echo snapshot", &["alice"]);

    let running = {
        let gateway = gateway.clone();
        tokio::spawn(async move { gateway.run().await })
    };
    wait_until(|| adapter.is_started()).await;

    adapter.inject(text_from(7, "alice", "/start")).await;
    adapter.inject(text_from(7, "alice", "/execute")).await;
    wait_until(|| adapter.texts().len() == 2).await;

    assert_eq!(
        adapter.texts(),
        vec![
            (ChatTarget(7), "Input your command:".to_string()),
            (ChatTarget(7), "snapshot\n".to_string()),
        ]
    );

    gateway.cancel_token().cancel();
    running.await.unwrap().unwrap();
    assert!(adapter.stopped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_run_start_failure_stops_worker() {
    let (_dir, adapter, gateway) = gateway("echo hi", &["alice"]);
    adapter.fail_start.store(true, Ordering::SeqCst);

    let err = tokio::time::timeout(Duration::from_secs(5), gateway.run())
        .await
        .expect("run should return once start fails")
        .unwrap_err();
    assert_eq!(err.to_string(), "Startup failed: polling refused");
    assert!(gateway.cancel_token().is_cancelled());
}

#[tokio::test]
async fn test_run_ends_when_update_stream_closes() {
    let (_dir, adapter, gateway) = gateway("echo hi", &["alice"]);

    let running = {
        let gateway = gateway.clone();
        tokio::spawn(async move { gateway.run().await })
    };
    wait_until(|| adapter.is_started()).await;

    adapter.disconnect();

    tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("run should end without cancellation")
        .unwrap()
        .unwrap();
    assert!(adapter.stopped.load(Ordering::SeqCst));
}
