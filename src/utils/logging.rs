/// 日志工具模块
///
/// 提供日志初始化、日志文件和统计输出的辅助函数
use std::fs;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::{AppError, AppResult};
use crate::models::correction::BatchSummary;

/// 初始化 tracing 输出
///
/// 设置了 `RUST_LOG` 时以它为准，否则按 `verbose` 选择 debug / info。
/// 重复调用不会报错（测试里会多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\n更正函处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header).map_err(|e| AppError::file_write_failed(log_file_path, e))
}

/// 记录程序启动信息
///
/// # 参数
/// - `host_name`: 脚本宿主名称
/// - `transaction`: 事务码
pub fn log_startup(host_name: &str, transaction: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - SAP 更正函批量录入");
    info!("🔌 脚本宿主: {} | 事务: {}", host_name, transaction);
    info!("{}", "=".repeat(60));
}

/// 记录批次加载信息
pub fn log_batches_loaded(total_batches: usize, total_records: usize) {
    info!("✓ 找到 {} 个待处理的批次，共 {} 条记录", total_batches, total_records);
    info!("💡 批次逐个处理，每批单独连接和断开 SAP\n");
}

/// 记录批次开始信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `total_batches`: 批次总数
/// - `name`: 批次名称
/// - `records`: 本批记录数
pub fn log_batch_start(batch_num: usize, total_batches: usize, name: &str, records: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批: {}", batch_num, total_batches, name);
    info!("📄 本批记录: {} 条", records);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(name: &str, summary: &BatchSummary) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 批次 {} 完成: 成功 {}/{}, 错误 {}, 未知 {}",
        name, summary.success, summary.total, summary.error, summary.unknown
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `summary`: 所有批次的汇总
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(summary: &BatchSummary, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📝 总计处理: {}", summary.total);
    info!("✅ 成功: {}", summary.success);
    info!("❌ 错误: {}", summary.error);
    info!("❔ 未知: {}", summary.unknown);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
