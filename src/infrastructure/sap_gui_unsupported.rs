//! 非 Windows 平台上的 SAP GUI 定位器
//!
//! SAP GUI Scripting 只通过 Windows COM 暴露，这里的定位器总是连接失败。

use crate::error::{ConnectError, StepError};
use crate::infrastructure::gui_session::{GuiSession, VKey};
use crate::infrastructure::session_locator::{SessionHandle, SessionLocator};

/// 不可能构造出来的会话
#[derive(Debug)]
pub enum SapGuiSession {}

impl GuiSession for SapGuiSession {
    fn set_text(&self, _id: &str, _text: &str) -> Result<(), StepError> {
        match *self {}
    }

    fn get_text(&self, _id: &str) -> Result<String, StepError> {
        match *self {}
    }

    fn send_vkey(&self, _id: &str, _key: VKey) -> Result<(), StepError> {
        match *self {}
    }

    fn press(&self, _id: &str) -> Result<(), StepError> {
        match *self {}
    }

    fn select(&self, _id: &str) -> Result<(), StepError> {
        match *self {}
    }

    fn set_current_cell_column(&self, _id: &str, _column: &str) -> Result<(), StepError> {
        match *self {}
    }

    fn select_rows(&self, _id: &str, _rows: &str) -> Result<(), StepError> {
        match *self {}
    }

    fn set_selection_indexes(&self, _id: &str, _start: usize, _end: usize) -> Result<(), StepError> {
        match *self {}
    }
}

pub struct SapGuiLocator {
    host_name: String,
}

impl SapGuiLocator {
    pub fn new(host_name: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
        }
    }
}

impl SessionLocator for SapGuiLocator {
    type Session = SapGuiSession;

    fn connect(&mut self) -> Result<SessionHandle<SapGuiSession>, ConnectError> {
        Err(ConnectError::HostUnavailable {
            name: self.host_name.clone(),
            message: "SAP GUI Scripting 只能在 Windows 上使用".to_string(),
        })
    }

    fn disconnect(&mut self, handle: &mut SessionHandle<SapGuiSession>) {
        handle.release();
    }
}
