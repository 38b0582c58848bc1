//! 单批次执行器 - 编排层
//!
//! ## 职责
//!
//! 驱动一批更正记录从连接到完成的整个过程，保证记录之间互相隔离。
//!
//! ## 状态机
//!
//! ```text
//! Idle → Connecting → Connected → Processing(i) → Completed
//!             ↓
//!           Failed（连接失败，不修改任何记录）
//! ```
//!
//! ## 核心保证
//!
//! 1. **逐条隔离**：单条失败只会变成该记录的 `Erro: ...` 状态，循环继续
//! 2. **状态非空**：每条记录结束时都恰好有一个非空状态
//! 3. **资源释放**：每次成功连接恰好断开一次，包括 panic 展开
//! 4. **单次运行**：`run_batch` 需要 `&mut self`，同一执行器不会并发两批

use tracing::{debug, error, info, warn};

use crate::error::ConnectError;
use crate::infrastructure::session_locator::{HeldSession, SessionLocator};
use crate::infrastructure::settle::Settle;
use crate::models::correction::{BatchEntry, BatchResult, CorrectionRecord, Progress};
use crate::services::{StatusClassifier, StatusLogWriter};
use crate::workflow::{CorrectionFlow, RecordCtx};

/// 批次运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Connecting,
    Connected,
    /// 正在处理第 i 条（从 0 开始）
    Processing(usize),
    Completed,
    Failed,
}

/// 单批次执行器，独占定位器和它绑定的会话
pub struct BatchRunner<L: SessionLocator> {
    locator: L,
    flow: CorrectionFlow,
    classifier: StatusClassifier,
    settle: Settle,
    status_log: Option<StatusLogWriter>,
    state: RunState,
}

impl<L: SessionLocator> BatchRunner<L> {
    pub fn new(locator: L, flow: CorrectionFlow, classifier: StatusClassifier, settle: Settle) -> Self {
        Self {
            locator,
            flow,
            classifier,
            settle,
            status_log: None,
            state: RunState::Idle,
        }
    }

    /// 每条记录写完状态后立即追加到运行日志
    pub fn with_status_log(mut self, writer: StatusLogWriter) -> Self {
        self.status_log = Some(writer);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// 处理一批记录
    ///
    /// # 参数
    /// - `batch_name`: 批次名称（仅用于日志）
    /// - `records`: 按输入顺序排列的记录，状态会被原地写入
    /// - `on_progress`: 每写完一条状态（以及状态日志）调用一次
    ///
    /// # 返回
    /// 连接失败时返回带 `fatal` 的空结果，记录保持原样
    pub async fn run_batch(
        &mut self,
        batch_name: &str,
        records: &mut [CorrectionRecord],
        mut on_progress: impl FnMut(Progress),
    ) -> BatchResult {
        let total = records.len();

        self.state = RunState::Connecting;
        info!("🔌 正在连接 SAP...");
        let held = match HeldSession::acquire(&mut self.locator) {
            Ok(held) => held,
            Err(e) => {
                self.state = RunState::Failed;
                error!("❌ 连接 SAP 失败: {}", e);
                return BatchResult::connect_failed(e);
            }
        };
        let Some(session) = held.session() else {
            self.state = RunState::Failed;
            return BatchResult::connect_failed(ConnectError::NoSession {
                message: "会话句柄已被释放".to_string(),
            });
        };

        self.state = RunState::Connected;
        info!("✅ 已连接 SAP，开始处理 {} 条记录", total);

        let mut entries = Vec::with_capacity(total);
        for (index, record) in records.iter_mut().enumerate() {
            self.state = RunState::Processing(index);
            let ctx = RecordCtx::new(
                batch_name.to_string(),
                index + 1,
                total,
                record.document.clone(),
            );
            info!("\n{} {}", ctx, "─".repeat(30));

            // 流程内部已经兜住所有步骤错误
            let raw_status = self.flow.run(session, record, &ctx).await;
            record.set_status(raw_status);
            let step = self.classifier.step_outcome(record.status.clone());
            debug!("{} 分类: {}", ctx, step.outcome);

            // 日志写不进去不影响录入结果
            if let Some(writer) = &self.status_log {
                if let Err(e) = writer.write(batch_name, record, step.outcome).await {
                    warn!("{} 写入状态日志失败: {}", ctx, e);
                }
            }

            entries.push(BatchEntry {
                record: record.clone(),
                outcome: step.outcome,
            });
            on_progress(Progress {
                done: index + 1,
                total,
            });

            self.settle.pause().await;
        }

        drop(held);
        self.state = RunState::Completed;

        let result = BatchResult::completed(entries);
        info!(
            "批次 {} 统计: 成功 {}, 错误 {}, 总计 {}",
            batch_name, result.summary.success, result.summary.error, result.summary.total
        );
        result
    }
}
