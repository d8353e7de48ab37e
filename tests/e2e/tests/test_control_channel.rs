//! E2E: the page-to-worker control channel.

use outpost_e2e_tests::{chat_config, shell_urls, ScriptedBackend};
use outpost_worker::{
    CacheSizeReply, ControlMessage, ReplyPort, Request, ServiceWorker, WorkerError, WorkerPhase,
};

fn make_active() -> (ServiceWorker, ScriptedBackend) {
    let mut backend = ScriptedBackend::serving_shell(&shell_urls())
        .serve_ok("/api/girls", b"{\"girls\":[1,2,3]}");
    let mut worker = ServiceWorker::from_json(&chat_config("v1")).unwrap();
    worker.handle_install(&mut backend).unwrap();
    worker.handle_activate().unwrap();
    (worker, backend)
}

fn queried_size(worker: &mut ServiceWorker) -> u64 {
    let mut port = ReplyPort::new();
    worker
        .handle_message(b"{\"type\":\"GET_CACHE_SIZE\"}", Some(&mut port))
        .unwrap();
    let reply: CacheSizeReply = serde_json::from_slice(&port.sent()[0]).unwrap();
    reply.size
}

#[test]
fn test_cache_size_query_reports_cached_bytes() {
    let (mut worker, mut backend) = make_active();

    let shell_bytes = worker.store().total_body_bytes() as u64;
    assert!(shell_bytes > 0, "install left the shell in cache");
    assert_eq!(queried_size(&mut worker), shell_bytes);

    worker.handle_fetch(&mut backend, &Request::get("/api/girls"));
    assert!(
        queried_size(&mut worker) > shell_bytes,
        "network-first keeps a copy, and the query sees it"
    );
}

#[test]
fn test_clear_cache_drops_every_partition() {
    let (mut worker, _backend) = make_active();
    assert!(!worker.store().partition_names().is_empty());

    let message = worker
        .handle_message(b"{\"type\":\"CLEAR_CACHE\"}", None)
        .unwrap();

    assert_eq!(message, ControlMessage::ClearCache);
    assert!(worker.store().partition_names().is_empty());
    assert_eq!(queried_size(&mut worker), 0);
}

#[test]
fn test_skip_waiting_is_idempotent_once_active() {
    let (mut worker, _backend) = make_active();

    let message = worker
        .handle_message(b"{\"type\":\"SKIP_WAITING\"}", None)
        .unwrap();

    assert_eq!(message, ControlMessage::SkipWaiting);
    assert_eq!(worker.phase(), WorkerPhase::Active);
}

#[test]
fn test_unknown_message_kind_is_rejected_by_name() {
    let (mut worker, _backend) = make_active();

    let err = worker
        .handle_message(b"{\"type\":\"SELF_DESTRUCT\"}", None)
        .unwrap_err();

    let WorkerError::UnrecognizedMessage(detail) = err else {
        panic!("expected an unrecognized-message error, got {:?}", err);
    };
    assert!(detail.contains("SELF_DESTRUCT"), "detail: {}", detail);
    assert_eq!(worker.phase(), WorkerPhase::Active, "nothing changed");
    assert!(!worker.store().partition_names().is_empty());
}

#[test]
fn test_messages_without_a_type_tag_are_rejected() {
    let (mut worker, _backend) = make_active();

    let missing_tag = worker.handle_message(b"{\"op\":\"SKIP_WAITING\"}", None);
    assert!(matches!(
        missing_tag,
        Err(WorkerError::UnrecognizedMessage(_))
    ));

    let not_json = worker.handle_message(b"ping", None);
    assert!(matches!(not_json, Err(WorkerError::UnrecognizedMessage(_))));
}

#[test]
fn test_size_query_without_a_port_is_an_error() {
    let (mut worker, _backend) = make_active();

    let err = worker
        .handle_message(b"{\"type\":\"GET_CACHE_SIZE\"}", None)
        .unwrap_err();

    assert_eq!(err, WorkerError::MissingReplyPort);
}
