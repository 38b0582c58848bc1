//! # Lança CC
//!
//! 通过 SAP GUI Scripting 批量录入 J1BNFE 更正函（Carta de Correção）的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（SAP 会话），只暴露能力
//! - `GuiSession` - 按路径操作控件的能力接口
//! - `SessionLocator` / `HeldSession` - 连接、作用域内持有、断开
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 只处理单条记录
//! - `StatusClassifier` - 状态栏文本分类
//! - `StatusLogWriter` - 追加状态日志
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条更正函"的完整录入流程
//! - `RecordCtx` - 上下文封装（批次 + 记录序号）
//! - `CorrectionFlow` - 固定的 12 步界面操作
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_runner` - 单批次状态机，逐条隔离
//! - `orchestrator/batch_processor` - 多批次处理器，加载与输出
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ConnectError, StepError};
pub use infrastructure::{GuiSession, HeldSession, SessionHandle, SessionLocator, Settle, VKey};
pub use models::{BatchResult, BatchSummary, CorrectionBatch, CorrectionRecord, Outcome, Progress};
pub use orchestrator::{App, BatchRunner, RunState};
pub use services::StatusClassifier;
pub use workflow::{CorrectionFlow, RecordCtx};
