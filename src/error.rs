//! 应用程序错误类型
//!
//! 错误分级策略：
//! - 数据错误（Data）：输入数据形状不合法，直接终止整个运行
//! - 遍历错误（Traversal）：软错误，只影响当前策略 / 分区 / 受访者
//! - 持久化错误（Persistence）：软错误，记录后继续
//! - 浏览器 / 配置错误：初始化阶段的硬错误

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入数据错误（硬错误，终止整个运行）
    #[error("数据错误: {0}")]
    Data(#[from] DataError),

    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),

    /// 遍历过程错误（软错误，按作用域吸收）
    #[error("遍历错误: {0}")]
    Traversal(#[from] TraversalError),

    /// 产物持久化错误（软错误，记录后继续）
    #[error("持久化错误: {0}")]
    Persistence(#[from] PersistenceError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 输入数据错误
///
/// 对应受访者数据的基本形状检查，任何一条失败都会终止整个批次。
#[derive(Debug, Error)]
pub enum DataError {
    /// 记录缺少 id 字段
    #[error("第 {index} 条受访者记录缺少 id 字段")]
    MissingId { index: usize },

    /// answers 不是字符串到字符串的映射
    #[error("受访者 {id} 的 answers 不是字符串键值对")]
    AnswersNotStringMap { id: String },

    /// 顶层结构不合法
    #[error("受访者文件顶层结构不合法: {reason}")]
    BadShape { reason: String },

    /// 不支持的文件格式
    #[error("不支持的受访者文件格式: {path}")]
    UnsupportedFormat { path: String },

    /// 读取文件失败
    #[error("读取受访者文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },

    /// 解析失败
    #[error("解析受访者文件失败 ({path}): {reason}")]
    ParseFailed { path: String, reason: String },
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 启动无头浏览器失败
    #[error("启动无头浏览器失败: {source}")]
    LaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 遍历过程错误
///
/// 全部是软错误：单个策略超时只触发降级，推进按钮失效只放弃当前
/// 受访者，墙钟超时也只放弃当前受访者。
#[derive(Debug, Error)]
pub enum TraversalError {
    /// 元素查找超时
    #[error("元素查找超时 ({what}, 预算 {timeout_ms}ms)")]
    ElementNotFound { what: String, timeout_ms: u64 },

    /// 推进按钮缺失或被禁用
    #[error("分区 {section} 推进按钮不可用 (已尝试 {attempts} 次)")]
    AdvanceBlocked { section: String, attempts: usize },

    /// 单个受访者墙钟预算耗尽
    #[error("受访者 {respondent_id} 墙钟预算耗尽 ({budget_secs}s)")]
    WallClockExceeded {
        respondent_id: u64,
        budget_secs: u64,
    },
}

/// 产物持久化错误
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// 写入文件失败
    #[error("写入产物失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        source: std::io::Error,
    },

    /// 解析配置文件失败
    #[error("解析配置文件失败 ({path}): {source}")]
    FileParseFailed {
        path: String,
        source: toml::de::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建导航错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建推进按钮失效错误
    pub fn advance_blocked(section: impl Into<String>, attempts: usize) -> Self {
        AppError::Traversal(TraversalError::AdvanceBlocked {
            section: section.into(),
            attempts,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
