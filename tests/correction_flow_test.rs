mod common;

use common::{flow, FakeHost};
use lanca_cc::infrastructure::controls;
use lanca_cc::workflow::correction_flow::j1bnfe;
use lanca_cc::workflow::ERROR_STATUS_PREFIX;
use lanca_cc::{CorrectionRecord, RecordCtx};

fn ctx(document: &str) -> RecordCtx {
    RecordCtx::new("lote".to_string(), 1, 1, document.to_string())
}

#[tokio::test]
async fn test_flow_issues_the_fixed_step_sequence() {
    let host = FakeHost::new();
    let session = host.session();
    let record = CorrectionRecord::new("66693215", "AJUSTE DE VALORES");

    let status = flow().run(&session, &record, &ctx("66693215")).await;

    assert_eq!(status, "Documento 66693215 alterado com êxito");
    let expected = vec![
        format!("set_text {} = /N J1BNFE", controls::COMMAND_FIELD),
        format!("send_vkey {} 0", controls::MAIN_WINDOW),
        format!("set_text {} = 66693215", j1bnfe::DOCNUM_FIELD),
        format!("set_text {} = ", j1bnfe::DATE_FIELD),
        format!("set_text {} = 1000", j1bnfe::COMPANY_FIELD),
        format!("send_vkey {} 8", controls::MAIN_WINDOW),
        format!("set_current_cell_column {} = ", j1bnfe::RESULT_GRID),
        format!("select_rows {} = 0", j1bnfe::RESULT_GRID),
        format!("select {}", j1bnfe::CORRECTION_MENU),
        format!("set_text {} = AJUSTE DE VALORES", j1bnfe::TEXT_EDITOR),
        format!("set_selection_indexes {} 17 17", j1bnfe::TEXT_EDITOR),
        format!("press {}", j1bnfe::CONFIRM_BUTTON),
        format!("get_text {}", controls::STATUS_BAR),
    ];
    assert_eq!(host.calls(), expected);
}

#[tokio::test]
async fn test_cursor_position_counts_characters_not_bytes() {
    let host = FakeHost::new();
    let session = host.session();
    let record = CorrectionRecord::new("1", "CORREÇÃO");

    flow().run(&session, &record, &ctx("1")).await;

    let expected = format!("set_selection_indexes {} 8 8", j1bnfe::TEXT_EDITOR);
    assert!(host.calls().contains(&expected));
}

#[tokio::test]
async fn test_failed_step_becomes_error_status_and_stops_sequence() {
    let host = FakeHost::new();
    host.fail_document("66693216", j1bnfe::CORRECTION_MENU);
    let session = host.session();
    let record = CorrectionRecord::new("66693216", "texto");

    let status = flow().run(&session, &record, &ctx("66693216")).await;

    assert!(status.starts_with(ERROR_STATUS_PREFIX));
    assert!(status.contains("controle não encontrado"));
    assert!(status.contains(j1bnfe::CORRECTION_MENU));

    let calls = host.calls();
    assert_eq!(
        calls.last().map(String::as_str),
        Some(format!("select {}", j1bnfe::CORRECTION_MENU).as_str())
    );
    assert!(!calls.iter().any(|c| c.starts_with("press")));
}

#[tokio::test]
async fn test_flow_keeps_no_state_between_records() {
    let host = FakeHost::new();
    host.fail_document("2", j1bnfe::RESULT_GRID);
    let session = host.session();
    let flow = flow();

    let first = flow
        .run(&session, &CorrectionRecord::new("2", "a"), &ctx("2"))
        .await;
    let second = flow
        .run(&session, &CorrectionRecord::new("3", "b"), &ctx("3"))
        .await;

    assert!(first.starts_with(ERROR_STATUS_PREFIX));
    assert_eq!(second, "Documento 3 alterado com êxito");
}

#[tokio::test]
async fn test_host_panic_becomes_error_status() {
    let host = FakeHost::new();
    host.panic_on_document("7");
    let session = host.session();

    let status = flow()
        .run(&session, &CorrectionRecord::new("7", "texto"), &ctx("7"))
        .await;

    assert_eq!(status, format!("{}SAP GUI 崩溃", ERROR_STATUS_PREFIX));
    let calls = host.calls();
    assert_eq!(
        calls.last().map(String::as_str),
        Some(format!("set_current_cell_column {} = ", j1bnfe::RESULT_GRID).as_str())
    );
    assert!(!calls.iter().any(|c| c.starts_with("select ")));
}
