//! 记录处理上下文
//!
//! 封装"我正在处理哪个批次的第几条记录"这一信息

use std::fmt::Display;

/// 记录处理上下文
#[derive(Debug, Clone)]
pub struct RecordCtx {
    /// 批次名称
    pub batch_name: String,

    /// 记录在批次中的索引（从1开始）
    pub record_index: usize,

    /// 批次记录总数
    pub total: usize,

    /// 凭证号
    pub document: String,
}

impl RecordCtx {
    pub fn new(batch_name: String, record_index: usize, total: usize, document: String) -> Self {
        Self {
            batch_name,
            record_index,
            total,
            document,
        }
    }
}

impl Display for RecordCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[批次 {} 记录 {}/{} 凭证 {}]",
            self.batch_name, self.record_index, self.total, self.document
        )
    }
}
