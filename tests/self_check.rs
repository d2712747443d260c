//! Integration tests for the self-check runner

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Router, routing::get};
use selfcheck::SelfCheckConfig;
use selfcheck::health::{
    self, CheckError, CheckValue, FnCheck, RunnerState, SelfCheck, SelfCheckRunner, checks::*,
};
use serde_json::Value;

fn ok_check(name: &'static str) -> FnCheck<impl Fn() -> std::future::Ready<health::CheckResult>> {
    FnCheck::new(name, || std::future::ready(Ok(CheckValue::ok("OK"))))
}

fn throwing_check(
    name: &'static str,
    message: &'static str,
) -> FnCheck<impl Fn() -> std::future::Ready<health::CheckResult>> {
    FnCheck::new(name, move || {
        std::future::ready(Err(CheckError::Transport(message.to_string())))
    })
}

async fn spawn_ping_server(body: &'static str) -> String {
    let app = Router::new().route("/api/ping", get(move || async move { body }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_startup_scenario_summary_and_errors() {
    let mut runner = SelfCheckRunner::new()
        .add_check(StorageCheck::new(MemoryStore::new(), "selfcheck"))
        .add_check(throwing_check("Network", "ConnectionRefused"))
        .add_check(JsonRoundTripCheck::new());

    let report = runner.run_all().await;

    assert_eq!(
        report.status_line(),
        "Storage: OK, Network: ERROR - ConnectionRefused, JSON: OK"
    );
    assert_eq!(report.errors, vec!["Network: ERROR - ConnectionRefused".to_string()]);
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_throwing_check_does_not_abort_run() {
    let mut runner = SelfCheckRunner::new()
        .add_check(throwing_check("A", "boom"))
        .add_check(ok_check("B"));

    let report = runner.run_all().await;

    assert_eq!(report.summary, vec!["A: ERROR - boom".to_string(), "B: OK".to_string()]);
    assert_eq!(report.total(), 2);
}

#[tokio::test]
async fn test_summary_entry_has_no_extra_punctuation() {
    let mut runner = SelfCheckRunner::new().add_check(ok_check("C"));
    let report = runner.run_all().await;
    assert_eq!(report.summary, vec!["C: OK".to_string()]);
    assert_eq!(report.status_line(), "C: OK");
}

#[tokio::test]
async fn test_order_preserved_and_checks_run_sequentially() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let timed = |name: &'static str, delay_ms: u64| {
        let log = Arc::clone(&log);
        FnCheck::new(name, move || {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(format!("start {name}"));
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                log.lock().unwrap().push(format!("end {name}"));
                Ok(CheckValue::ok(format!("{delay_ms}ms")))
            }
        })
    };

    let mut runner = SelfCheckRunner::new()
        .add_check(timed("Slow", 40))
        .add_check(timed("Instant", 0))
        .add_check(timed("Medium", 15));

    let report = runner.run_all().await;

    assert_eq!(report.status_line(), "Slow: 40ms, Instant: 0ms, Medium: 15ms");
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "start Slow",
            "end Slow",
            "start Instant",
            "end Instant",
            "start Medium",
            "end Medium"
        ]
    );
}

#[tokio::test]
async fn test_error_list_matches_errored_verdicts_only() {
    let mut runner = SelfCheckRunner::new()
        .add_check(ok_check("One"))
        .add_check(throwing_check("Two", "first"))
        .add_check(FnCheck::new("Three", || async { Ok(CheckValue::failed("No message")) }))
        .add_check(throwing_check("Four", "second"))
        .add_check(ok_check("Five"));

    let report = runner.run_all().await;

    let expected: Vec<String> = report
        .outcomes
        .iter()
        .filter_map(|o| o.error_entry())
        .collect();
    assert_eq!(report.errors, expected);
    assert_eq!(
        report.errors,
        vec!["Two: ERROR - first".to_string(), "Four: ERROR - second".to_string()]
    );
    assert_eq!((report.passed(), report.failed(), report.errored()), (2, 1, 2));
}

#[tokio::test]
async fn test_manual_fault_when_idle_appends_one_entry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = {
        let calls = Arc::clone(&calls);
        FnCheck::new("Counted", move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(CheckValue::ok("OK")))
        })
    };

    let mut runner = SelfCheckRunner::new().add_check(counted);
    let before = runner.run_all().await;

    runner.trigger_manual_fault();
    let after = runner.report();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(after.summary, before.summary);
    assert_eq!(after.errors.len(), before.errors.len() + 1);
    let entry = after.errors.last().unwrap();
    assert!(entry.starts_with("Test error: "), "{entry}");
    assert_eq!(runner.state(), RunnerState::Idle);
}

#[tokio::test]
async fn test_manual_fault_during_run_is_kept() {
    let mut runner = SelfCheckRunner::new();
    let trigger = runner.fault_trigger();

    runner.register_checks(vec![
        Box::new(throwing_check("Before", "early")),
        Box::new(FnCheck::new("Faulting", move || {
            trigger.trigger();
            std::future::ready(Ok(CheckValue::ok("OK")))
        })),
        Box::new(ok_check("After")),
    ]);

    let report = runner.run_all().await;

    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.errors[0], "Before: ERROR - early");
    assert!(report.errors[1].starts_with("Test error: "));
    assert_eq!(report.status_line(), "Before: ERROR - early, Faulting: OK, After: OK");
}

#[tokio::test]
async fn test_snapshots_are_published_after_each_check() {
    let mut runner = SelfCheckRunner::new();
    let updates = runner.subscribe();
    let states = runner.subscribe_state();

    runner.register_checks(vec![
        Box::new(ok_check("First")),
        Box::new(FnCheck::new("Observer", move || {
            let seen = updates.borrow().summary.clone();
            let state = *states.borrow();
            std::future::ready(Ok(CheckValue::ok(format!("{} seen, {:?}", seen.join("|"), state))))
        })),
    ]);

    let mut receiver = runner.subscribe();
    let report = runner.run_all().await;

    assert_eq!(report.summary[1], "Observer: First: OK seen, Running");
    assert!(receiver.has_changed().unwrap());
    assert!(receiver.borrow_and_update().is_finished());
    assert_eq!(runner.state(), RunnerState::Idle);
}

#[tokio::test]
async fn test_corrupting_codec_reports_failure_text() {
    struct CorruptingCodec;

    impl JsonCodec for CorruptingCodec {
        fn encode(&self, _value: &Value) -> Result<String, CheckError> {
            Ok(r#"{"test":"tampered"}"#.to_string())
        }

        fn decode(&self, text: &str) -> Result<Value, CheckError> {
            SerdeJsonCodec.decode(text)
        }
    }

    let mut runner = SelfCheckRunner::new()
        .add_check(JsonRoundTripCheck::new())
        .add_check(JsonRoundTripCheck::with_codec(CorruptingCodec));

    let report = runner.run_all().await;

    assert_eq!(report.summary[0], "JSON: OK");
    assert!(report.outcomes[1].verdict.is_failed());
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn test_http_transport_against_live_server() {
    let base_url = spawn_ping_server(r#"{"message":"pong"}"#).await;
    let check = NetworkCheck::new(
        HttpTransport::new(base_url, Duration::from_secs(2)).unwrap(),
        "/api/ping",
    );
    assert_eq!(check.run().await.unwrap(), CheckValue::ok("OK"));
}

#[tokio::test]
async fn test_http_transport_without_message() {
    let base_url = spawn_ping_server(r#"{"ok":true}"#).await;
    let check = NetworkCheck::new(
        HttpTransport::new(base_url, Duration::from_secs(2)).unwrap(),
        "/api/ping",
    );
    assert_eq!(check.run().await.unwrap(), CheckValue::failed("No message"));
}

#[tokio::test]
async fn test_refused_connection_is_described_not_raised() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpTransport::new(format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let mut runner = SelfCheckRunner::new().add_check(NetworkCheck::new(transport, "/api/ping"));
    let report = runner.run_all().await;

    assert!(report.outcomes[0].verdict.is_failed());
    assert!(report.summary[0].starts_with("Network: Error: "), "{}", report.summary[0]);
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn test_default_checks_from_config() {
    let base_url = spawn_ping_server(r#"{"message":"pong"}"#).await;
    let store_dir = tempfile::tempdir().unwrap();

    let mut config = SelfCheckConfig::default();
    config.network.base_url = base_url;
    config.storage.dir = Some(store_dir.path().to_path_buf());
    config.runner.include_build_info = true;

    let report = health::run_startup_checks(&config).await.unwrap();

    assert_eq!(
        report.outcomes.iter().map(|o| o.name.as_str()).collect::<Vec<_>>(),
        vec!["Storage", "Network", "JSON", "Build Info"]
    );
    assert!(report.is_healthy(), "{}", health::format_report(&report));
    assert!(report.status_line().starts_with("Storage: OK, Network: OK, JSON: OK, Build Info: "));
}

#[tokio::test]
async fn test_default_checks_skip_build_info_when_disabled() {
    let config = SelfCheckConfig::default();
    let checks = health::default_checks(&config).unwrap();
    let names: Vec<&str> = checks.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["Storage", "Network", "JSON"]);
}
