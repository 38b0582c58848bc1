use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 连接 SAP 脚本宿主失败（整批致命）
    #[error("连接错误: {0}")]
    Connect(#[from] ConnectError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 状态分类词表无法编译
    #[error("状态分类器错误: {0}")]
    Classifier(#[from] regex::Error),
}

/// 连接 SAP GUI 脚本宿主时的错误
///
/// 连接只尝试一次，任何失败都会让整批停止，且不修改任何记录。
#[derive(Debug, Error)]
pub enum ConnectError {
    /// 找不到正在运行的脚本宿主（SAP GUI 未打开或未登录）
    #[error("脚本宿主 '{name}' 不可用: {message}")]
    HostUnavailable { name: String, message: String },
    /// 宿主对象存在，但没有暴露脚本引擎
    #[error("'{name}' 返回的对象不是脚本引擎")]
    NotScriptingEngine { name: String },
    /// 脚本引擎下没有任何连接
    #[error("脚本引擎没有可用的连接: {message}")]
    NoConnection { message: String },
    /// 连接下没有任何会话
    #[error("连接没有可用的会话: {message}")]
    NoSession { message: String },
    /// 底层 COM 调用失败
    #[error("COM 调用失败 (HRESULT 0x{hresult:08X}): {message}")]
    Com { hresult: u32, message: String },
}

/// 单个界面控件操作失败
///
/// 不区分失败原因（控件不存在、弹出了其他对话框等），统一记录为该记录的状态。
#[derive(Debug, Clone, Error)]
#[error("{message} ({action} {control})")]
pub struct StepError {
    pub control: String,
    pub action: &'static str,
    pub message: String,
}

impl StepError {
    pub fn new(
        control: impl Into<String>,
        action: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            control: control.into(),
            action,
            message: message.into(),
        }
    }
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// TOML 序列化失败
    #[error("TOML序列化失败: {0}")]
    TomlSerializeFailed(#[from] toml::ser::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必填配置项为空
    #[error("配置项 {var_name} 不能为空")]
    EmptyValue { var_name: String },
    /// 分类词表为空，所有状态都会归为未知
    #[error("{var_name} 至少需要一个关键词")]
    EmptyTerms { var_name: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
