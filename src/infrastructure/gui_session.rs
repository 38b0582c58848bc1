//! 脚本会话能力接口 - 基础设施层
//!
//! SAP GUI 把界面暴露成一棵可按路径寻址的控件树。上层只依赖这里列出的
//! 几个操作，真实宿主和测试替身都实现同一个 trait。

use crate::error::StepError;

/// 与具体事务无关的通用控件路径
pub mod controls {
    /// 主窗口
    pub const MAIN_WINDOW: &str = "wnd[0]";
    /// 主窗口工具栏里的命令栏（OK-Code）
    pub const COMMAND_FIELD: &str = "wnd[0]/tbar[0]/okcd";
    /// 主窗口状态栏第一格
    pub const STATUS_BAR: &str = "wnd[0]/sbar/pane[0]";
}

/// 发送给窗口的虚拟按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VKey {
    /// 回车
    Enter,
    /// F8，执行查询
    Execute,
}

impl VKey {
    /// SAP GUI `sendVKey` 使用的键码
    pub fn code(self) -> i32 {
        match self {
            VKey::Enter => 0,
            VKey::Execute => 8,
        }
    }
}

/// 一个已绑定的脚本会话
///
/// 每个调用都是阻塞的，控件不存在或界面状态不对时返回 [`StepError`]。
pub trait GuiSession {
    /// 写控件的 `Text` 属性
    fn set_text(&self, id: &str, text: &str) -> Result<(), StepError>;

    /// 读控件的 `Text` 属性
    fn get_text(&self, id: &str) -> Result<String, StepError>;

    /// 向窗口发送虚拟键（回车、F8 等）
    fn send_vkey(&self, id: &str, key: VKey) -> Result<(), StepError>;

    /// 按下按钮
    fn press(&self, id: &str) -> Result<(), StepError>;

    /// 选中菜单项等可选择的控件
    fn select(&self, id: &str) -> Result<(), StepError>;

    /// 设置表格控件的当前列
    fn set_current_cell_column(&self, id: &str, column: &str) -> Result<(), StepError>;

    /// 设置表格控件的选中行（逗号分隔的行号）
    fn select_rows(&self, id: &str, rows: &str) -> Result<(), StepError>;

    /// 设置文本编辑器的选区
    fn set_selection_indexes(&self, id: &str, start: usize, end: usize) -> Result<(), StepError>;

    /// 会话是否仍在处理上一个请求
    ///
    /// 不能报告繁忙状态的宿主保持默认实现，等待退化为固定延时。
    fn is_busy(&self) -> Result<bool, StepError> {
        Ok(false)
    }

    /// 在命令栏输入事务码并回车
    fn issue_command(&self, command: &str) -> Result<(), StepError> {
        self.set_text(controls::COMMAND_FIELD, command)?;
        self.send_vkey(controls::MAIN_WINDOW, VKey::Enter)
    }
}
