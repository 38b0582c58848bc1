use std::time::Duration;

use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// SAP GUI 在运行对象表中注册的名称
    pub host_name: String,
    /// 进入事务时写入命令栏的内容
    pub transaction_code: String,
    /// 查询条件中固定的公司代码
    pub company_code: String,
    /// 每次界面操作后的固定等待（毫秒）
    pub settle_interval_ms: u64,
    /// 会话繁忙时最多再等待多久（毫秒）
    pub busy_timeout_ms: u64,
    /// 繁忙轮询间隔（毫秒）
    pub busy_poll_ms: u64,
    /// 待处理批次（TOML）所在目录
    pub input_folder: String,
    /// 处理结果输出目录
    pub output_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 状态分类词表 ---
    pub success_terms: Vec<String>,
    pub error_terms: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host_name: "SAPGUI".to_string(),
            transaction_code: "/N J1BNFE".to_string(),
            company_code: "1000".to_string(),
            settle_interval_ms: 500,
            busy_timeout_ms: 10_000,
            busy_poll_ms: 100,
            input_folder: "input_toml".to_string(),
            output_folder: "output".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            success_terms: vec!["sucesso".to_string(), "êxito".to_string()],
            error_terms: vec!["erro".to_string(), "falha".to_string()],
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            host_name: std::env::var("SAP_HOST_NAME").unwrap_or(default.host_name),
            transaction_code: std::env::var("SAP_TRANSACTION").unwrap_or(default.transaction_code),
            company_code: std::env::var("SAP_COMPANY_CODE").unwrap_or(default.company_code),
            settle_interval_ms: std::env::var("SETTLE_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.settle_interval_ms),
            busy_timeout_ms: std::env::var("BUSY_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.busy_timeout_ms),
            busy_poll_ms: std::env::var("BUSY_POLL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.busy_poll_ms),
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(default.input_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            success_terms: std::env::var("SUCCESS_TERMS").ok().map(|v| split_terms(&v)).unwrap_or(default.success_terms),
            error_terms: std::env::var("ERROR_TERMS").ok().map(|v| split_terms(&v)).unwrap_or(default.error_terms),
        }
    }

    /// 检查运行一批之前必须具备的配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (var_name, value) in [
            ("SAP_HOST_NAME", &self.host_name),
            ("SAP_TRANSACTION", &self.transaction_code),
            ("SAP_COMPANY_CODE", &self.company_code),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyValue {
                    var_name: var_name.to_string(),
                });
            }
        }
        for (var_name, terms) in [
            ("SUCCESS_TERMS", &self.success_terms),
            ("ERROR_TERMS", &self.error_terms),
        ] {
            if terms.is_empty() {
                return Err(ConfigError::EmptyTerms {
                    var_name: var_name.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_interval_ms)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn busy_poll(&self) -> Duration {
        Duration::from_millis(self.busy_poll_ms)
    }
}

/// 解析逗号分隔的关键词列表，忽略空项
fn split_terms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
