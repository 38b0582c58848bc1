//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批次调度和资源管理，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 多批次处理器
//! - 管理应用生命周期（初始化、运行）
//! - 加载批次文件（Vec<CorrectionBatch>）
//! - 写结果文件和状态日志
//! - 输出全局统计信息
//!
//! ### `batch_runner` - 单批次执行器
//! - 连接 / 断开 SAP 会话（作用域守卫）
//! - 遍历单个批次的记录（Vec<CorrectionRecord>）
//! - 写入状态、分类、报告进度
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Batch>)
//!     ↓
//! batch_runner (处理 Vec<CorrectionRecord>)
//!     ↓
//! workflow::CorrectionFlow (处理单条记录)
//!     ↓
//! services (能力层：classifier / status log)
//!     ↓
//! infrastructure (基础设施：GuiSession / SessionLocator)
//! ```

pub mod batch_processor;
pub mod batch_runner;

// 重新导出主要类型
pub use batch_processor::App;
pub use batch_runner::{BatchRunner, RunState};
