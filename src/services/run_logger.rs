//! 运行日志沉淀 - 业务能力层
//!
//! 作为产物汇（sink）：结构化日志、截图、页面快照、摘要行。
//! 核心流程不依赖它的任何返回值；持久化失败记一条 warn 后继续，
//! 绝不中断受访者的遍历。

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{AppResult, PersistenceError};
use crate::infrastructure::JsExecutor;
use crate::models::{RunOutcome, SurveyLogEntry};

/// 运行日志沉淀服务
pub struct RunLogger {
    artifacts_dir: PathBuf,
    summary_file: PathBuf,
}

impl RunLogger {
    /// 创建沉淀服务并准备目录结构
    pub fn new(artifacts_dir: &str, summary_file: &str) -> Self {
        let logger = Self {
            artifacts_dir: PathBuf::from(artifacts_dir),
            summary_file: PathBuf::from(summary_file),
        };
        if let Err(e) = logger.ensure_dirs() {
            warn!("⚠️ 产物目录准备失败: {}", e);
        }
        logger
    }

    fn ensure_dirs(&self) -> AppResult<()> {
        for sub in ["logs", "screens", "pages"] {
            let dir = self.artifacts_dir.join(sub);
            fs::create_dir_all(&dir).map_err(|source| PersistenceError::WriteFailed {
                path: dir.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// 初始化摘要文件（写入带时间戳的表头）
    pub fn init_summary(&self) {
        let header = format!(
            "{}\n问卷批量提交摘要 - {}\n{}\n\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );
        if let Err(e) = fs::write(&self.summary_file, header) {
            warn!("⚠️ 摘要文件初始化失败: {}", e);
        }
    }

    /// 持久化单个受访者的结构化日志
    pub fn persist_entry(&self, entry: &SurveyLogEntry) {
        let path = self
            .artifacts_dir
            .join("logs")
            .join(format!("respondent_{}.json", entry.respondent_id));
        match serde_json::to_string_pretty(entry) {
            Ok(json) => self.write_file(&path, json.as_bytes()),
            Err(e) => warn!("⚠️ 日志序列化失败 (受访者 {}): {}", entry.respondent_id, e),
        }
    }

    /// 采集并保存当前页面的整页截图
    pub async fn screenshot(&self, exec: &JsExecutor, respondent_id: u64, step: &str) {
        match exec.screenshot_png().await {
            Ok(bytes) => {
                let path = self
                    .artifacts_dir
                    .join("screens")
                    .join(format!("{}_{}.png", respondent_id, step));
                self.write_file(&path, &bytes);
            }
            Err(e) => warn!("⚠️ 截图失败 (受访者 {} 步骤 {}): {}", respondent_id, step, e),
        }
    }

    /// 保存当前页面的原始 HTML 快照（诊断回放用）
    pub async fn snapshot_html(&self, exec: &JsExecutor, respondent_id: u64, step: &str) {
        match exec.page_html().await {
            Ok(html) => {
                let path = self
                    .artifacts_dir
                    .join("pages")
                    .join(format!("{}_{}.html", respondent_id, step));
                self.write_file(&path, html.as_bytes());
            }
            Err(e) => warn!(
                "⚠️ 页面快照失败 (受访者 {} 步骤 {}): {}",
                respondent_id, step, e
            ),
        }
    }

    /// 追加一条受访者摘要行
    pub fn append_summary(&self, respondent_id: u64, outcome: RunOutcome, final_location: &str) {
        let line = format!(
            "受访者 {} | {} | {}\n",
            respondent_id,
            outcome.label(),
            final_location
        );
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.summary_file)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        if let Err(e) = result {
            warn!("⚠️ 摘要行写入失败 (受访者 {}): {}", respondent_id, e);
        }
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) {
        match fs::write(path, bytes) {
            Ok(_) => debug!("产物已写入: {}", path.display()),
            Err(e) => warn!("⚠️ 产物写入失败 ({}): {}", path.display(), e),
        }
    }
}
