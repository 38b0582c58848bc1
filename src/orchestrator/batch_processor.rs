//! 多批次处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批次文件的加载、逐批执行和结果输出。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、初始化日志文件、构建状态分类器
//! 2. **批量加载**：扫描并加载所有待处理的批次（`Vec<CorrectionBatch>`）
//! 3. **逐批执行**：委托 `BatchRunner`，一次只运行一批
//! 4. **结果输出**：写结果文件、追加状态日志
//! 5. **全局统计**：汇总所有批次的处理结果
//!
//! ## 设计特点
//!
//! - **严格串行**：SAP GUI 同一时刻只有一个界面状态，同一个 `App` 上的多次运行排队执行
//! - **连接失败即停止**：报告一次错误，后续批次不再处理

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{SapGuiLocator, SessionLocator, Settle};
use crate::models::{self, BatchSummary, CorrectionBatch};
use crate::orchestrator::batch_runner::BatchRunner;
use crate::services::{StatusClassifier, StatusLogWriter};
use crate::utils::logging::{
    init_log_file, log_batch_complete, log_batch_start, log_batches_loaded, log_startup,
    print_final_stats,
};
use crate::workflow::CorrectionFlow;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    classifier: StatusClassifier,
    log_writer: StatusLogWriter,
    /// 运行期间持有，保证同一时刻只有一次运行在操作宿主
    run_lock: Mutex<()>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;

        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config.host_name, &config.transaction_code);

        let classifier = StatusClassifier::from_config(&config)?;
        let log_writer = StatusLogWriter::with_path(config.output_log_file.clone());

        Ok(Self {
            config,
            classifier,
            log_writer,
            run_lock: Mutex::new(()),
        })
    }

    /// 处理输入目录中的所有批次
    pub async fn run(&self) -> AppResult<BatchSummary> {
        info!("\n📁 正在扫描待处理的批次...");
        let batches = models::load_all_batches(&self.config.input_folder).await?;
        self.process_batches(SapGuiLocator::new(&self.config.host_name), batches)
            .await
    }

    /// 只处理指定的一个批次文件
    pub async fn run_file(&self, path: &Path) -> AppResult<BatchSummary> {
        let batch = models::load_batch(path).await?;
        self.process_batches(SapGuiLocator::new(&self.config.host_name), vec![batch])
            .await
    }

    /// 用给定的定位器逐批处理
    ///
    /// 已有运行在进行时，等它结束后再开始。
    pub async fn process_batches<L: SessionLocator>(
        &self,
        locator: L,
        batches: Vec<CorrectionBatch>,
    ) -> AppResult<BatchSummary> {
        let _run_guard = match self.run_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("⏳ 已有批次正在处理，等待其结束后再开始");
                self.run_lock.lock().await
            }
        };

        if batches.is_empty() {
            warn!("⚠️ 没有找到待处理的批次文件，程序结束");
            return Ok(BatchSummary::default());
        }

        let total_batches = batches.len();
        let total_records = batches.iter().map(|b| b.records.len()).sum();
        log_batches_loaded(total_batches, total_records);

        let mut runner = BatchRunner::new(
            locator,
            CorrectionFlow::new(&self.config),
            self.classifier.clone(),
            Settle::from_config(&self.config),
        )
        .with_status_log(self.log_writer.clone());

        let mut totals = BatchSummary::default();
        for (idx, mut batch) in batches.into_iter().enumerate() {
            log_batch_start(idx + 1, total_batches, &batch.name, batch.records.len());

            let mut result = runner
                .run_batch(&batch.name, &mut batch.records, |progress| {
                    info!(
                        "⏳ 进度 {}/{} ({:.0}%)",
                        progress.done,
                        progress.total,
                        progress.fraction() * 100.0
                    );
                })
                .await;

            if let Some(err) = result.fatal.take() {
                error!("❌ 连接 SAP 失败，请确认 SAP GUI 已打开并登录");
                return Err(err.into());
            }

            let path = models::write_result(&batch, &result, &self.config.output_folder).await?;
            info!("📥 结果已保存: {}", path.display());

            log_batch_complete(&batch.name, &result.summary);

            totals.total += result.summary.total;
            totals.success += result.summary.success;
            totals.error += result.summary.error;
            totals.unknown += result.summary.unknown;
        }

        print_final_stats(&totals, &self.config.output_log_file);

        Ok(totals)
    }
}
