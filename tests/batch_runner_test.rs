mod common;

use common::{classifier, flow, records, FakeHost};
use lanca_cc::models::correction::EMPTY_STATUS_PLACEHOLDER;
use lanca_cc::services::StatusLogWriter;
use lanca_cc::workflow::correction_flow::j1bnfe;
use lanca_cc::workflow::ERROR_STATUS_PREFIX;
use lanca_cc::{BatchRunner, ConnectError, Outcome, Progress, RunState, SessionLocator, Settle};

fn runner(host: &FakeHost) -> BatchRunner<common::FakeLocator> {
    BatchRunner::new(host.locator(), flow(), classifier(), Settle::immediate())
}

#[tokio::test]
async fn test_every_record_gets_a_status_in_input_order() {
    let host = FakeHost::new();
    let mut runner = runner(&host);
    let mut batch = records(&["66693215", "66693216", "66693217"]);

    let result = runner.run_batch("lote", &mut batch, |_| {}).await;

    assert!(!result.is_fatal());
    assert!(batch.iter().all(|r| !r.status.is_empty()));
    let documents: Vec<&str> = result
        .entries
        .iter()
        .map(|e| e.record.document.as_str())
        .collect();
    assert_eq!(documents, vec!["66693215", "66693216", "66693217"]);
    assert_eq!(result.summary.total, 3);
    assert_eq!(result.summary.success, 3);
    assert_eq!(runner.state(), RunState::Completed);
}

#[tokio::test]
async fn test_one_failing_record_does_not_abort_the_batch() {
    let host = FakeHost::new();
    host.fail_document("66693216", j1bnfe::RESULT_GRID);
    let mut runner = runner(&host);
    let mut batch = records(&["66693215", "66693216", "66693217"]);

    let result = runner.run_batch("lote", &mut batch, |_| {}).await;

    assert_eq!(result.entries.len(), 3);
    assert!(batch[1].status.starts_with(ERROR_STATUS_PREFIX));
    assert!(batch[1].status.contains("controle não encontrado"));
    assert_eq!(result.entries[1].outcome, Outcome::Error);
    assert_eq!(batch[2].status, "Documento 66693217 alterado com êxito");
    assert_eq!(result.summary.success, 2);
    assert_eq!(result.summary.error, 1);

    assert_eq!(host.connects.get(), 1);
    assert_eq!(host.disconnects.get(), 1);
}

#[tokio::test]
async fn test_disconnect_once_even_when_every_record_fails() {
    let host = FakeHost::new();
    for doc in ["1", "2", "3", "4"] {
        host.fail_document(doc, j1bnfe::DOCNUM_FIELD);
    }
    let mut runner = runner(&host);
    let mut batch = records(&["1", "2", "3", "4"]);

    let result = runner.run_batch("lote", &mut batch, |_| {}).await;

    assert_eq!(result.summary.error, 4);
    assert_eq!(host.connects.get(), 1);
    assert_eq!(host.disconnects.get(), 1);
}

#[tokio::test]
async fn test_connect_failure_leaves_records_untouched() {
    let host = FakeHost::new();
    host.refuse_connect();
    let mut runner = runner(&host);
    let mut batch = records(&["1", "2"]);
    batch[0].status = "anterior".to_string();
    let before = batch.clone();
    let mut progress_calls = 0;

    let result = runner
        .run_batch("lote", &mut batch, |_| progress_calls += 1)
        .await;

    assert!(matches!(
        result.fatal,
        Some(ConnectError::HostUnavailable { .. })
    ));
    assert!(result.entries.is_empty());
    assert_eq!(result.summary.total, 0);
    assert_eq!(batch, before);
    assert_eq!(progress_calls, 0);
    assert_eq!(runner.state(), RunState::Failed);
    assert_eq!(host.connects.get(), 1);
    assert_eq!(host.disconnects.get(), 0);
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn test_empty_batch_still_connects_and_disconnects() {
    let host = FakeHost::new();
    let mut runner = runner(&host);
    let mut batch = Vec::new();

    let result = runner.run_batch("vazio", &mut batch, |_| {}).await;

    assert!(!result.is_fatal());
    assert_eq!(result.summary.total, 0);
    assert_eq!(result.summary.success, 0);
    assert_eq!(result.summary.error, 0);
    assert_eq!(host.connects.get(), 1);
    assert_eq!(host.disconnects.get(), 1);
    assert_eq!(runner.state(), RunState::Completed);
}

#[tokio::test]
async fn test_progress_is_monotonic_and_ends_at_total() {
    let host = FakeHost::new();
    let mut runner = runner(&host);
    let mut batch = records(&["1", "2", "3"]);
    let mut seen: Vec<Progress> = Vec::new();

    runner
        .run_batch("lote", &mut batch, |p| seen.push(p))
        .await;

    let done: Vec<usize> = seen.iter().map(|p| p.done).collect();
    assert_eq!(done, vec![1, 2, 3]);
    assert!(seen.iter().all(|p| p.total == 3));
    assert!(seen.windows(2).all(|w| w[0].fraction() <= w[1].fraction()));
    assert_eq!(seen.last().map(|p| p.fraction()), Some(1.0));
}

#[tokio::test]
async fn test_status_log_line_is_written_before_progress_is_reported() {
    let path = std::env::temp_dir().join(format!("lanca_cc_runner_log_{}.txt", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let host = FakeHost::new();
    let mut runner =
        runner(&host).with_status_log(StatusLogWriter::with_path(path.to_string_lossy().to_string()));
    let mut batch = records(&["1", "2", "3"]);
    let mut lines_at_progress = Vec::new();

    runner
        .run_batch("lote", &mut batch, |p| {
            let content = std::fs::read_to_string(&path).unwrap_or_default();
            lines_at_progress.push((p.done, content.lines().count()));
        })
        .await;

    assert_eq!(lines_at_progress, vec![(1, 1), (2, 2), (3, 3)]);
}

#[tokio::test]
async fn test_blank_status_bar_is_recorded_as_placeholder() {
    let host = FakeHost::new();
    host.status_for("1", "");
    host.status_for("2", "processado");
    let mut runner = runner(&host);
    let mut batch = records(&["1", "2"]);

    let result = runner.run_batch("lote", &mut batch, |_| {}).await;

    assert_eq!(batch[0].status, EMPTY_STATUS_PLACEHOLDER);
    assert_eq!(batch[1].status, "processado");
    assert_eq!(result.entries[0].outcome, Outcome::Unknown);
    assert_eq!(result.entries[1].outcome, Outcome::Unknown);
    assert_eq!(result.summary.unknown, 2);
}

#[tokio::test]
async fn test_runner_reconnects_for_each_batch() {
    let host = FakeHost::new();
    let mut runner = runner(&host);

    let mut first = records(&["1"]);
    let mut second = records(&["2", "3"]);
    runner.run_batch("a", &mut first, |_| {}).await;
    runner.run_batch("b", &mut second, |_| {}).await;

    assert_eq!(host.connects.get(), 2);
    assert_eq!(host.disconnects.get(), 2);
    assert_eq!(runner.locator().host_connects(), 2);
}

#[tokio::test]
async fn test_host_panic_only_fails_that_record() {
    let host = FakeHost::new();
    host.panic_on_document("2");
    let mut runner = runner(&host);
    let mut batch = records(&["1", "2", "3"]);

    let result = runner.run_batch("lote", &mut batch, |_| {}).await;

    assert!(batch.iter().all(|r| !r.status.is_empty()));
    assert_eq!(batch[0].status, "Documento 1 alterado com êxito");
    assert!(batch[1].status.starts_with(ERROR_STATUS_PREFIX));
    assert!(batch[1].status.contains("SAP GUI 崩溃"));
    assert_eq!(batch[2].status, "Documento 3 alterado com êxito");
    assert_eq!(result.summary.success, 2);
    assert_eq!(result.summary.error, 1);
    assert_eq!(runner.state(), RunState::Completed);
    assert_eq!(host.connects.get(), 1);
    assert_eq!(host.disconnects.get(), 1);
}

#[test]
fn test_disconnecting_twice_releases_once() {
    let host = FakeHost::new();
    let mut locator = host.locator();
    let mut handle = locator.connect().unwrap();

    locator.disconnect(&mut handle);
    locator.disconnect(&mut handle);

    assert!(!handle.is_bound());
    assert_eq!(host.connects.get(), 1);
    assert_eq!(host.disconnects.get(), 1);
}
