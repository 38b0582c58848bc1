//! 更正函（Carta de Correção）数据模型

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConnectError;

/// 状态栏没有返回任何文字时写入的占位状态
pub const EMPTY_STATUS_PLACEHOLDER: &str = "Sem mensagem na barra de status";

/// 一条待录入的更正记录
///
/// 身份由它在批次中的位置决定；每次处理只写一次 `status`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    /// 凭证号（统一为文本）
    pub document: String,
    /// 更正内容
    pub correction_text: String,
    /// 处理结果（初始为空）
    #[serde(default)]
    pub status: String,
}

impl CorrectionRecord {
    pub fn new(document: impl Into<String>, correction_text: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            correction_text: correction_text.into(),
            status: String::new(),
        }
    }

    /// 写入处理结果，空文本替换为占位状态
    pub fn set_status(&mut self, status: impl Into<String>) {
        let status = status.into();
        self.status = if status.trim().is_empty() {
            EMPTY_STATUS_PLACEHOLDER.to_string()
        } else {
            status
        };
    }

    pub fn clear_status(&mut self) {
        self.status.clear();
    }
}

/// 一个批次文件加载后的内容
#[derive(Debug, Clone, Default)]
pub struct CorrectionBatch {
    /// 批次名称（文件中未给出时使用文件名）
    pub name: String,
    pub records: Vec<CorrectionRecord>,
    /// 来源文件路径
    pub file_path: Option<String>,
}

/// 状态分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Error,
    Unknown,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Success => "成功",
            Outcome::Error => "错误",
            Outcome::Unknown => "未知",
        };
        write!(f, "{}", label)
    }
}

/// 一次录入流程返回的状态栏文字及其分类
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub raw_text: String,
    pub outcome: Outcome,
}

/// 批次结果中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub record: CorrectionRecord,
    pub outcome: Outcome,
}

/// 汇总统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub error: usize,
    pub unknown: usize,
}

impl BatchSummary {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a Outcome>) -> Self {
        outcomes
            .into_iter()
            .fold(Self::default(), |mut summary, outcome| {
                summary.total += 1;
                match outcome {
                    Outcome::Success => summary.success += 1,
                    Outcome::Error => summary.error += 1,
                    Outcome::Unknown => summary.unknown += 1,
                }
                summary
            })
    }
}

/// 一次批处理的最终结果，完成后只读
#[derive(Debug, Default)]
pub struct BatchResult {
    /// 与输入顺序一致
    pub entries: Vec<BatchEntry>,
    pub summary: BatchSummary,
    /// 连接失败时设置，此时没有任何记录被修改
    pub fatal: Option<ConnectError>,
}

impl BatchResult {
    pub fn completed(entries: Vec<BatchEntry>) -> Self {
        let summary = BatchSummary::from_outcomes(entries.iter().map(|e| &e.outcome));
        Self {
            entries,
            summary,
            fatal: None,
        }
    }

    pub fn connect_failed(err: ConnectError) -> Self {
        Self {
            fatal: Some(err),
            ..Self::default()
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal.is_some()
    }
}

/// 处理进度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    /// 完成比例，空批次视为已完成
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.done as f64 / self.total as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.done >= self.total
    }
}
