#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use lanca_cc::error::{ConnectError, StepError};
use lanca_cc::infrastructure::{controls, GuiSession, SessionHandle, SessionLocator, Settle, VKey};
use lanca_cc::services::status_classifier::{DEFAULT_ERROR_TERMS, DEFAULT_SUCCESS_TERMS};
use lanca_cc::workflow::correction_flow::j1bnfe;
use lanca_cc::{Config, CorrectionFlow, CorrectionRecord, StatusClassifier};

/// 模拟的 SAP GUI，所有会话和定位器共享同一份记录
#[derive(Clone, Default)]
pub struct FakeHost {
    calls: Rc<RefCell<Vec<String>>>,
    failures: Rc<RefCell<HashMap<String, String>>>,
    statuses: Rc<RefCell<HashMap<String, String>>>,
    panic_on: Rc<RefCell<Option<String>>>,
    refuse_connect: Rc<Cell<bool>>,
    pub connects: Rc<Cell<usize>>,
    pub disconnects: Rc<Cell<usize>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// 处理该凭证时，对指定控件的操作失败
    pub fn fail_document(&self, document: &str, control: &str) {
        self.failures
            .borrow_mut()
            .insert(document.to_string(), control.to_string());
    }

    /// 处理该凭证后状态栏显示的文字
    pub fn status_for(&self, document: &str, text: &str) {
        self.statuses
            .borrow_mut()
            .insert(document.to_string(), text.to_string());
    }

    /// 处理该凭证时宿主崩溃（panic）
    pub fn panic_on_document(&self, document: &str) {
        *self.panic_on.borrow_mut() = Some(document.to_string());
    }

    pub fn refuse_connect(&self) {
        self.refuse_connect.set(true);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn session(&self) -> FakeSession {
        FakeSession {
            host: self.clone(),
            current_document: RefCell::new(String::new()),
        }
    }

    pub fn locator(&self) -> FakeLocator {
        FakeLocator { host: self.clone() }
    }
}

pub struct FakeSession {
    host: FakeHost,
    current_document: RefCell<String>,
}

impl FakeSession {
    fn record(&self, id: &str, action: &'static str, call: String) -> Result<(), StepError> {
        self.host.calls.borrow_mut().push(call);
        let current = self.current_document.borrow().clone();
        if self.host.panic_on.borrow().as_deref() == Some(current.as_str()) && id == j1bnfe::RESULT_GRID {
            panic!("SAP GUI 崩溃");
        }
        match self.host.failures.borrow().get(&current) {
            Some(control) if control == id => {
                Err(StepError::new(id, action, "controle não encontrado"))
            }
            _ => Ok(()),
        }
    }
}

impl GuiSession for FakeSession {
    fn set_text(&self, id: &str, text: &str) -> Result<(), StepError> {
        if id == j1bnfe::DOCNUM_FIELD {
            *self.current_document.borrow_mut() = text.to_string();
        }
        self.record(id, "Text", format!("set_text {} = {}", id, text))
    }

    fn get_text(&self, id: &str) -> Result<String, StepError> {
        self.record(id, "Text", format!("get_text {}", id))?;
        if id != controls::STATUS_BAR {
            return Ok(String::new());
        }
        let current = self.current_document.borrow().clone();
        Ok(self
            .host
            .statuses
            .borrow()
            .get(&current)
            .cloned()
            .unwrap_or_else(|| format!("Documento {} alterado com êxito", current)))
    }

    fn send_vkey(&self, id: &str, key: VKey) -> Result<(), StepError> {
        self.record(id, "sendVKey", format!("send_vkey {} {}", id, key.code()))
    }

    fn press(&self, id: &str) -> Result<(), StepError> {
        self.record(id, "press", format!("press {}", id))
    }

    fn select(&self, id: &str) -> Result<(), StepError> {
        self.record(id, "select", format!("select {}", id))
    }

    fn set_current_cell_column(&self, id: &str, column: &str) -> Result<(), StepError> {
        self.record(
            id,
            "currentCellColumn",
            format!("set_current_cell_column {} = {}", id, column),
        )
    }

    fn select_rows(&self, id: &str, rows: &str) -> Result<(), StepError> {
        self.record(id, "selectedRows", format!("select_rows {} = {}", id, rows))
    }

    fn set_selection_indexes(&self, id: &str, start: usize, end: usize) -> Result<(), StepError> {
        self.record(
            id,
            "setSelectionIndexes",
            format!("set_selection_indexes {} {} {}", id, start, end),
        )
    }
}

pub struct FakeLocator {
    host: FakeHost,
}

impl FakeLocator {
    pub fn host_connects(&self) -> usize {
        self.host.connects.get()
    }
}

impl SessionLocator for FakeLocator {
    type Session = FakeSession;

    fn connect(&mut self) -> Result<SessionHandle<FakeSession>, ConnectError> {
        self.host.connects.set(self.host.connects.get() + 1);
        if self.host.refuse_connect.get() {
            return Err(ConnectError::HostUnavailable {
                name: "SAPGUI".to_string(),
                message: "objeto não registrado".to_string(),
            });
        }
        Ok(SessionHandle::bound(self.host.session()))
    }

    fn disconnect(&mut self, handle: &mut SessionHandle<FakeSession>) {
        if handle.release().is_some() {
            self.host.disconnects.set(self.host.disconnects.get() + 1);
        }
    }
}

/// 不做任何等待的配置
pub fn instant_config() -> Config {
    Config {
        settle_interval_ms: 0,
        busy_timeout_ms: 0,
        busy_poll_ms: 0,
        ..Config::default()
    }
}

pub fn flow() -> CorrectionFlow {
    CorrectionFlow::new(&instant_config()).with_settle(Settle::immediate())
}

pub fn classifier() -> StatusClassifier {
    StatusClassifier::new(&DEFAULT_SUCCESS_TERMS, &DEFAULT_ERROR_TERMS).unwrap()
}

pub fn records(documents: &[&str]) -> Vec<CorrectionRecord> {
    documents
        .iter()
        .map(|d| CorrectionRecord::new(*d, format!("CORREÇÃO {}", d)))
        .collect()
}
