//! 程序配置
//!
//! 配置来源优先级：环境变量 > TOML 配置文件 > 默认值。
//! 配置文件路径由 `SURVEY_CONFIG` 环境变量指定，缺省时跳过文件层。

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 问卷入口 URL（整个运行期间固定不变）
    pub target_url: String,
    /// 浏览器调试端口（0 表示自行启动无头浏览器）
    pub browser_debug_port: u16,
    /// 视口宽度
    pub viewport_width: u32,
    /// 视口高度
    pub viewport_height: u32,
    /// 单次等待元素 / 策略探测的超时（毫秒）
    pub step_timeout_ms: u64,
    /// 策略探测的轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 卡片推进后的固定沉降延迟（毫秒），给客户端重渲染留时间
    pub settle_delay_ms: u64,
    /// 推进按钮的最大尝试次数
    pub advance_max_attempts: usize,
    /// 单个受访者的墙钟预算（秒）
    pub respondent_budget_secs: u64,
    /// 完成标记的语言集合
    pub completion_locales: Vec<String>,
    /// 完成检测的 URL 结构兜底：地址中出现该应答标识 token 即视为完成
    pub completion_url_token: String,
    /// 本次运行处理的受访者数量（0 表示全部）
    pub batch_size: usize,
    /// 受访者起始偏移
    pub start_offset: usize,
    /// 人口统计分区的题目数
    pub demographics_question_count: usize,
    /// 领导力分区的题目数
    pub leadership_question_count: usize,
    /// 受访者数据文件
    pub respondents_file: String,
    /// 产物输出目录（日志 / 截图 / 页面快照）
    pub artifacts_dir: String,
    /// 运行摘要文件
    pub run_summary_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: "https://ankieta.example.org/survey/start".to_string(),
            browser_debug_port: 0,
            viewport_width: 1366,
            viewport_height: 900,
            step_timeout_ms: 3000,
            poll_interval_ms: 200,
            settle_delay_ms: 600,
            advance_max_attempts: 3,
            respondent_budget_secs: 300,
            completion_locales: vec!["pl".to_string(), "en".to_string()],
            completion_url_token: "responseId".to_string(),
            batch_size: 0,
            start_offset: 0,
            demographics_question_count: 4,
            leadership_question_count: 3,
            respondents_file: "respondents.json".to_string(),
            artifacts_dir: "artifacts".to_string(),
            run_summary_file: "run_summary.txt".to_string(),
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件的可选字段镜像
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    target_url: Option<String>,
    browser_debug_port: Option<u16>,
    viewport_width: Option<u32>,
    viewport_height: Option<u32>,
    step_timeout_ms: Option<u64>,
    poll_interval_ms: Option<u64>,
    settle_delay_ms: Option<u64>,
    advance_max_attempts: Option<usize>,
    respondent_budget_secs: Option<u64>,
    completion_locales: Option<Vec<String>>,
    completion_url_token: Option<String>,
    batch_size: Option<usize>,
    start_offset: Option<usize>,
    demographics_question_count: Option<usize>,
    leadership_question_count: Option<usize>,
    respondents_file: Option<String>,
    artifacts_dir: Option<String>,
    run_summary_file: Option<String>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 从环境变量加载配置（必要时先套用 `SURVEY_CONFIG` 指定的配置文件）
    pub fn from_env() -> Self {
        let base = match std::env::var("SURVEY_CONFIG") {
            Ok(path) => match Self::from_toml_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("⚠️ 配置文件加载失败，退回默认值: {}", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };
        Self {
            target_url: std::env::var("TARGET_URL").unwrap_or(base.target_url),
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(base.browser_debug_port),
            viewport_width: std::env::var("VIEWPORT_WIDTH").ok().and_then(|v| v.parse().ok()).unwrap_or(base.viewport_width),
            viewport_height: std::env::var("VIEWPORT_HEIGHT").ok().and_then(|v| v.parse().ok()).unwrap_or(base.viewport_height),
            step_timeout_ms: std::env::var("STEP_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.step_timeout_ms),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.poll_interval_ms),
            settle_delay_ms: std::env::var("SETTLE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.settle_delay_ms),
            advance_max_attempts: std::env::var("ADVANCE_MAX_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.advance_max_attempts),
            respondent_budget_secs: std::env::var("RESPONDENT_BUDGET_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.respondent_budget_secs),
            completion_locales: std::env::var("COMPLETION_LOCALES").ok().map(|v| v.split(',').map(|s| s.trim().to_string()).collect()).unwrap_or(base.completion_locales),
            completion_url_token: std::env::var("COMPLETION_URL_TOKEN").unwrap_or(base.completion_url_token),
            batch_size: std::env::var("BATCH_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(base.batch_size),
            start_offset: std::env::var("START_OFFSET").ok().and_then(|v| v.parse().ok()).unwrap_or(base.start_offset),
            demographics_question_count: std::env::var("DEMOGRAPHICS_QUESTION_COUNT").ok().and_then(|v| v.parse().ok()).unwrap_or(base.demographics_question_count),
            leadership_question_count: std::env::var("LEADERSHIP_QUESTION_COUNT").ok().and_then(|v| v.parse().ok()).unwrap_or(base.leadership_question_count),
            respondents_file: std::env::var("RESPONDENTS_FILE").unwrap_or(base.respondents_file),
            artifacts_dir: std::env::var("ARTIFACTS_DIR").unwrap_or(base.artifacts_dir),
            run_summary_file: std::env::var("RUN_SUMMARY_FILE").unwrap_or(base.run_summary_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(base.verbose_logging),
        }
    }

    /// 从 TOML 配置文件加载（缺失字段用默认值补齐）
    pub fn from_toml_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.to_string(),
            source,
        })?;
        let file: FileConfig = toml::from_str(&content).map_err(|source| ConfigError::FileParseFailed {
            path: path.to_string(),
            source,
        })?;
        let default = Self::default();
        Ok(Self {
            target_url: file.target_url.unwrap_or(default.target_url),
            browser_debug_port: file.browser_debug_port.unwrap_or(default.browser_debug_port),
            viewport_width: file.viewport_width.unwrap_or(default.viewport_width),
            viewport_height: file.viewport_height.unwrap_or(default.viewport_height),
            step_timeout_ms: file.step_timeout_ms.unwrap_or(default.step_timeout_ms),
            poll_interval_ms: file.poll_interval_ms.unwrap_or(default.poll_interval_ms),
            settle_delay_ms: file.settle_delay_ms.unwrap_or(default.settle_delay_ms),
            advance_max_attempts: file.advance_max_attempts.unwrap_or(default.advance_max_attempts),
            respondent_budget_secs: file.respondent_budget_secs.unwrap_or(default.respondent_budget_secs),
            completion_locales: file.completion_locales.unwrap_or(default.completion_locales),
            completion_url_token: file.completion_url_token.unwrap_or(default.completion_url_token),
            batch_size: file.batch_size.unwrap_or(default.batch_size),
            start_offset: file.start_offset.unwrap_or(default.start_offset),
            demographics_question_count: file.demographics_question_count.unwrap_or(default.demographics_question_count),
            leadership_question_count: file.leadership_question_count.unwrap_or(default.leadership_question_count),
            respondents_file: file.respondents_file.unwrap_or(default.respondents_file),
            artifacts_dir: file.artifacts_dir.unwrap_or(default.artifacts_dir),
            run_summary_file: file.run_summary_file.unwrap_or(default.run_summary_file),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sequential_and_bounded() {
        let config = Config::default();
        assert!(config.step_timeout_ms > 0);
        assert!(config.respondent_budget_secs > 0);
        assert!(config.advance_max_attempts >= 1);
        assert_eq!(config.completion_locales, vec!["pl", "en"]);
    }

    #[test]
    fn toml_overlay_keeps_defaults_for_missing_fields() {
        let file: FileConfig = toml::from_str("step_timeout_ms = 1500").unwrap();
        assert_eq!(file.step_timeout_ms, Some(1500));
        assert!(file.target_url.is_none());
    }
}
