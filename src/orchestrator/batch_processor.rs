//! 批量处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：连接或启动浏览器、创建 JsExecutor
//! 2. **批量加载**：读取受访者集合并按偏移 / 批量大小取窗口
//! 3. **顺序处理**：同一个页面被所有受访者复用，严格一次一位 ——
//!    遍历会改写共享的页面状态（当前分区 / 当前卡片），不允许交错
//! 4. **全局统计**：汇总 completed / partial / aborted
//!
//! 数据形状错误是唯一会终止整个运行的错误；其余一律落到
//! 受访者级结论里，批次总会跑完。

use anyhow::Result;
use chromiumoxide::Browser;
use tracing::{info, warn};

use crate::browser;
use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::models::{load_respondents, Respondent, RunOutcome};
use crate::orchestrator::respondent_processor;
use crate::services::{AdvanceControl, AnswerResolver, CompletionDetector, RunLogger};
use crate::workflow::CarouselDriver;

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    executor: JsExecutor,
}

impl App {
    /// 初始化应用
    ///
    /// 调试端口非 0 时连接已运行的浏览器，否则自行启动无头实例。
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let (browser, page) = if config.browser_debug_port > 0 {
            browser::connect_to_browser_and_page(
                config.browser_debug_port,
                Some(&config.target_url),
            )
            .await?
        } else {
            browser::launch_headless_browser(
                &config.target_url,
                config.viewport_width,
                config.viewport_height,
            )
            .await?
        };

        let executor = JsExecutor::new(page);

        Ok(Self {
            config,
            _browser: browser,
            executor,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let run_logger = RunLogger::new(&self.config.artifacts_dir, &self.config.run_summary_file);
        run_logger.init_summary();

        // 加载受访者（形状错误在这里直接终止整个运行）
        info!("\n📁 正在加载受访者数据...");
        let all_respondents = load_respondents(&self.config.respondents_file).await?;

        let batch = batch_window(
            &all_respondents,
            self.config.start_offset,
            self.config.batch_size,
        );
        if batch.is_empty() {
            warn!("⚠️ 批次窗口为空，程序结束");
            return Ok(());
        }
        log_batch_window(all_respondents.len(), batch.len(), self.config.start_offset);

        // 能力只构建一次，所有受访者复用
        let resolver = AnswerResolver::new(&self.config);
        let advance = AdvanceControl::new(&self.config);
        let carousel = CarouselDriver::new(&self.config);
        let detector = CompletionDetector::new(&self.config);

        let mut stats = ProcessingStats {
            total: batch.len(),
            ..Default::default()
        };

        // 页面由当前受访者独占，到达终态后才轮到下一位
        for (idx, respondent) in batch.iter().enumerate() {
            let outcome = respondent_processor::process_respondent(
                &self.executor,
                respondent,
                idx + 1,
                batch.len(),
                &self.config,
                &resolver,
                &advance,
                &carousel,
                &detector,
                &run_logger,
            )
            .await;

            match outcome {
                RunOutcome::Completed | RunOutcome::CompletedEarly => stats.completed += 1,
                RunOutcome::Partial => stats.partial += 1,
                RunOutcome::Aborted => stats.aborted += 1,
            }
        }

        print_final_stats(&stats, &self.config);
        Ok(())
    }
}

/// 按起始偏移和批量大小截取处理窗口（batch_size 为 0 表示取到末尾）
fn batch_window(all: &[Respondent], start_offset: usize, batch_size: usize) -> &[Respondent] {
    let start = start_offset.min(all.len());
    let end = if batch_size == 0 {
        all.len()
    } else {
        (start + batch_size).min(all.len())
    };
    &all[start..end]
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    completed: usize,
    partial: usize,
    aborted: usize,
    total: usize,
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 问卷批量提交模式");
    info!("🎯 目标问卷: {}", config.target_url);
    info!(
        "⏱️ 单步超时 {}ms / 受访者预算 {}s",
        config.step_timeout_ms, config.respondent_budget_secs
    );
    info!("{}", "=".repeat(60));
}

fn log_batch_window(total: usize, window: usize, offset: usize) {
    info!("✓ 共 {} 位受访者，本次处理 {} 位 (偏移 {})", total, window, offset);
    info!("💡 严格顺序处理，页面由当前受访者独占\n");
}

fn print_final_stats(stats: &ProcessingStats, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 完成: {}/{}", stats.completed, stats.total);
    info!("🟡 部分: {}", stats.partial);
    info!("❌ 放弃: {}", stats.aborted);
    info!("{}", "=".repeat(60));
    info!("\n摘要已保存至: {}", config.run_summary_file);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn respondents(n: u64) -> Vec<Respondent> {
        (1..=n)
            .map(|id| Respondent {
                id,
                profile: String::new(),
                answers: vec![],
            })
            .collect()
    }

    #[test]
    fn window_zero_batch_size_takes_rest() {
        let all = respondents(5);
        let window = batch_window(&all, 2, 0);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].id, 3);
    }

    #[test]
    fn window_is_clamped_to_available_range() {
        let all = respondents(3);
        assert_eq!(batch_window(&all, 1, 10).len(), 2);
        assert!(batch_window(&all, 9, 2).is_empty());
    }
}
