use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lanca_cc::models::{clear_statuses, load_batch, save_batch, write_template};
use lanca_cc::utils::logging;
use lanca_cc::{App, Config};
use tracing::info;

#[derive(Parser)]
#[command(name = "lanca-cc")]
#[command(version, about = "通过 SAP GUI Scripting 批量录入 J1BNFE 更正函")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 处理批次（默认处理输入目录中的全部 TOML 文件）
    Process {
        /// 只处理这一个批次文件
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// 清空批次文件中的所有状态
    Clear { file: PathBuf },
    /// 生成示例批次文件
    Template {
        #[arg(default_value = "template_carta_correcao.toml")]
        path: PathBuf,
    },
}

// SAP GUI 的 COM 对象只能在创建它的线程上使用
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::from_env();
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    match cli.command.unwrap_or(Commands::Process { file: None }) {
        Commands::Process { file } => {
            let app = App::initialize(config)?;
            match file {
                Some(path) => app.run_file(&path).await?,
                None => app.run().await?,
            };
        }
        Commands::Clear { file } => {
            let mut batch = load_batch(&file)
                .await
                .with_context(|| format!("无法加载批次: {}", file.display()))?;
            clear_statuses(&mut batch.records);
            save_batch(&batch, &file).await?;
            info!("✅ 已清空 {} 条记录的状态: {}", batch.records.len(), file.display());
        }
        Commands::Template { path } => {
            write_template(&path).await?;
            info!("📥 模板已生成: {}", path.display());
        }
    }

    Ok(())
}
