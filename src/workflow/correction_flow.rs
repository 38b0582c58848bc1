//! 更正函录入流程 - 流程层
//!
//! 核心职责：定义"一条更正记录"在 J1BNFE 中的完整录入顺序
//!
//! 流程顺序（每一步都是下一步的前提）：
//! 1. 命令栏输入事务码并回车 → 等待
//! 2. 填凭证号、清空日期、填公司代码 → F8 查询 → 等待
//! 3. 选中结果表第一行 → 菜单打开更正函 → 等待
//! 4. 弹窗编辑器写入更正内容，光标移到末尾 → 确认 → 等待
//! 5. 读取主窗口状态栏

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::StepError;
use crate::infrastructure::gui_session::{controls, GuiSession, VKey};
use crate::infrastructure::settle::Settle;
use crate::models::correction::CorrectionRecord;
use crate::utils::logging::truncate_text;
use crate::workflow::record_ctx::RecordCtx;

/// 失败记录的状态前缀
pub const ERROR_STATUS_PREFIX: &str = "Erro: ";

/// J1BNFE 事务里用到的控件路径
pub mod j1bnfe {
    /// 查询条件：凭证号
    pub const DOCNUM_FIELD: &str = "wnd[0]/usr/txtDOCNUM-LOW";
    /// 查询条件：日期
    pub const DATE_FIELD: &str = "wnd[0]/usr/ctxtDATE0-LOW";
    /// 查询条件：公司代码
    pub const COMPANY_FIELD: &str = "wnd[0]/usr/ctxtBUKRS-LOW";
    /// 查询结果表
    pub const RESULT_GRID: &str = "wnd[0]/usr/cntlNFE_CONTAINER/shellcont/shell";
    /// 菜单：更正函
    pub const CORRECTION_MENU: &str = "wnd[0]/mbar/menu[4]/menu[0]/menu[0]";
    /// 更正函弹窗里的文本编辑器
    pub const TEXT_EDITOR: &str = "wnd[1]/usr/cntlTEXTEDITOR1/shellcont/shell";
    /// 更正函弹窗的确认按钮
    pub const CONFIRM_BUTTON: &str = "wnd[1]/tbar[0]/btn[0]";
}

/// 更正函录入流程
///
/// - 不持有会话，每次调用由编排层传入
/// - 两次调用之间不保留任何状态
/// - 任何一步失败都不向外传播，而是变成带 `Erro: ` 前缀的状态文本
pub struct CorrectionFlow {
    transaction_code: String,
    company_code: String,
    settle: Settle,
    verbose_logging: bool,
}

impl CorrectionFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            transaction_code: config.transaction_code.clone(),
            company_code: config.company_code.clone(),
            settle: Settle::from_config(config),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 使用指定的等待策略（测试替身不需要真实等待）
    pub fn with_settle(mut self, settle: Settle) -> Self {
        self.settle = settle;
        self
    }

    /// 录入一条更正函，返回状态栏文字
    ///
    /// 部分完成的流程不会重试或续做，记录直接标为失败。
    /// 宿主调用中的 panic 也在这里收住，只影响当前记录。
    pub async fn run<S: GuiSession + ?Sized>(
        &self,
        session: &S,
        record: &CorrectionRecord,
        ctx: &RecordCtx,
    ) -> String {
        if self.verbose_logging {
            debug!(
                "{} 更正内容: {}",
                ctx,
                truncate_text(&record.correction_text, 80)
            );
        }

        match AssertUnwindSafe(self.try_run(session, record))
            .catch_unwind()
            .await
        {
            Ok(Ok(status)) => {
                info!("{} 状态栏: {}", ctx, status);
                status
            }
            Ok(Err(e)) => {
                warn!("{} ❌ 录入失败: {}", ctx, e);
                format!("{}{}", ERROR_STATUS_PREFIX, e)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("{} 💥 录入中断: {}", ctx, message);
                format!("{}{}", ERROR_STATUS_PREFIX, message)
            }
        }
    }

    async fn try_run<S: GuiSession + ?Sized>(
        &self,
        session: &S,
        record: &CorrectionRecord,
    ) -> Result<String, StepError> {
        // 进入事务
        session.issue_command(&self.transaction_code)?;
        self.settle.wait(session).await?;

        // 查询条件
        session.set_text(j1bnfe::DOCNUM_FIELD, &record.document)?;
        session.set_text(j1bnfe::DATE_FIELD, "")?;
        session.set_text(j1bnfe::COMPANY_FIELD, &self.company_code)?;

        // 执行查询
        session.send_vkey(controls::MAIN_WINDOW, VKey::Execute)?;
        self.settle.wait(session).await?;

        // 选中唯一的结果行
        session.set_current_cell_column(j1bnfe::RESULT_GRID, "")?;
        session.select_rows(j1bnfe::RESULT_GRID, "0")?;

        // 打开更正函弹窗
        session.select(j1bnfe::CORRECTION_MENU)?;
        self.settle.wait(session).await?;

        // 写入更正内容，光标放到末尾
        let text = &record.correction_text;
        let end = text.chars().count();
        session.set_text(j1bnfe::TEXT_EDITOR, text)?;
        session.set_selection_indexes(j1bnfe::TEXT_EDITOR, end, end)?;

        // 确认
        session.press(j1bnfe::CONFIRM_BUTTON)?;
        self.settle.wait(session).await?;

        session.get_text(controls::STATUS_BAR)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "未知的宿主错误".to_string()
    }
}
