//! E2E: push payloads, notification display, and click routing.

use outpost_e2e_tests::{chat_config, shell_urls, ScriptedBackend};
use outpost_worker::push::Permission;
use outpost_worker::{ClickOutcome, ServiceWorker};

fn make_active() -> ServiceWorker {
    let mut backend = ScriptedBackend::serving_shell(&shell_urls());
    let mut worker = ServiceWorker::from_json(&chat_config("v1")).unwrap();
    worker.handle_install(&mut backend).unwrap();
    worker.handle_activate().unwrap();
    worker
}

#[test]
fn test_push_payload_becomes_a_notification() {
    let mut worker = make_active();

    let id = worker
        .handle_push(Some(
            b"{\"title\":\"Masha\",\"body\":\"sent you a photo\",\"url\":\"/girls/7\",\"girl_id\":7}",
        ))
        .unwrap();

    let intent = worker.notifications().get(id).unwrap();
    assert_eq!(intent.title, "Masha");
    assert_eq!(intent.body, "sent you a photo");
    assert_eq!(intent.url, "/girls/7");
    assert_eq!(intent.correlation, Some(serde_json::json!(7)));
}

#[test]
fn test_empty_push_shows_the_configured_defaults() {
    let mut worker = make_active();

    let id = worker.handle_push(None).unwrap();

    let intent = worker.notifications().get(id).unwrap();
    assert_eq!(intent.title, "New message");
    assert_eq!(intent.body, "You have a new message");
    assert_eq!(intent.url, "/");
    assert_eq!(intent.icon, "/icons/icon-192.png");
}

#[test]
fn test_malformed_push_still_notifies_with_defaults() {
    let mut worker = make_active();

    let id = worker.handle_push(Some(b"\x00\x01 not json")).unwrap();

    let intent = worker.notifications().get(id).unwrap();
    assert_eq!(intent.title, "New message");
    assert_eq!(intent.correlation, None);
}

#[test]
fn test_click_prefers_an_already_open_page() {
    let mut worker = make_active();
    worker.clients_mut().register("/chat");
    let girls = worker.clients_mut().register("/girls/7");

    let id = worker.handle_push(Some(b"{\"url\":\"/girls/7\"}")).unwrap();
    let outcome = worker.handle_notification_click(id, None);

    assert_eq!(outcome, ClickOutcome::FocusedExisting(girls));
    assert_eq!(worker.clients().len(), 2, "no extra window may open");
    assert!(worker.clients().get(girls).unwrap().focused);
    assert!(worker.notifications().is_empty(), "click closes it");
}

#[test]
fn test_click_opens_a_window_when_nothing_matches() {
    let mut worker = make_active();
    worker.clients_mut().register("/chat");

    let id = worker.handle_push(Some(b"{\"url\":\"/girls/7\"}")).unwrap();
    let outcome = worker.handle_notification_click(id, Some("open"));

    let ClickOutcome::OpenedWindow(opened) = outcome else {
        panic!("expected a new window, got {:?}", outcome);
    };
    let client = worker.clients().get(opened).unwrap();
    assert_eq!(client.url, "/girls/7");
    assert!(client.focused);
    assert!(client.controlled);
}

#[test]
fn test_unknown_action_buttons_only_dismiss() {
    let mut worker = make_active();
    worker.clients_mut().register("/chat");

    let id = worker.handle_push(None).unwrap();
    let outcome = worker.handle_notification_click(id, Some("mute"));

    assert_eq!(outcome, ClickOutcome::Dismissed);
    assert_eq!(worker.clients().len(), 1);
    assert!(worker.notifications().is_empty());
}

#[test]
fn test_click_on_a_closed_notification_is_a_no_op() {
    let mut worker = make_active();
    let id = worker.handle_push(None).unwrap();
    worker.handle_notification_click(id, None);

    let outcome = worker.handle_notification_click(id, None);

    assert_eq!(outcome, ClickOutcome::Dismissed);
}

#[test]
fn test_denied_permission_suppresses_notifications() {
    let mut worker = make_active();
    worker.notifications_mut().set_permission(Permission::Denied);

    assert_eq!(worker.handle_push(Some(b"{\"title\":\"Masha\"}")), None);
    assert!(worker.notifications().is_empty());
}
