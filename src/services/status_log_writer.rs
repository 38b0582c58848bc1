//! 状态日志写入服务 - 业务能力层
//!
//! 只负责把单条记录的处理结果追加到运行日志，不关心流程

use crate::error::{AppError, AppResult};
use crate::models::correction::{CorrectionRecord, Outcome};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 状态日志写入服务
///
/// 职责：
/// - 每处理完一条记录立即追加一行，进程中途退出时已处理的记录仍留在日志里
/// - 不出现 Vec<CorrectionRecord>
#[derive(Debug, Clone)]
pub struct StatusLogWriter {
    log_file_path: String,
}

impl StatusLogWriter {
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            log_file_path: path.into(),
        }
    }

    /// 追加一条记录的状态
    ///
    /// # 参数
    /// - `batch_name`: 批次名称
    /// - `record`: 已写入状态的记录
    /// - `outcome`: 分类结果
    pub async fn write(
        &self,
        batch_name: &str,
        record: &CorrectionRecord,
        outcome: Outcome,
    ) -> AppResult<()> {
        debug!(
            "写入状态: 批次 {} | 凭证 {} | {}",
            batch_name, record.document, outcome
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)
            .await
            .map_err(|e| AppError::file_write_failed(&self.log_file_path, e))?;

        let line = format!(
            "[{}] 批次 {} | 凭证 {} | {} | {}\n",
            chrono::Local::now().format("%H:%M:%S"),
            batch_name,
            record.document,
            outcome,
            record.status.replace('\n', " ")
        );

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| AppError::file_write_failed(&self.log_file_path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_appends_one_line_per_record() {
        let path = std::env::temp_dir().join(format!("lanca_cc_status_{}.txt", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let writer = StatusLogWriter::with_path(path.to_string_lossy().to_string());

        let mut record = CorrectionRecord::new("66693215", "texto");
        record.set_status("Documento alterado com êxito");
        writer.write("lote", &record, Outcome::Success).await.unwrap();

        record.set_status("Erro: linha 1\nlinha 2");
        writer.write("lote", &record, Outcome::Error).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("凭证 66693215 | 成功 | Documento alterado com êxito"));
        assert!(lines[1].ends_with("错误 | Erro: linha 1 linha 2"));
    }
}
