//! 单个受访者处理器 - 编排层
//!
//! 负责一位受访者的完整生命周期：导航到问卷入口、构建遍历
//! 上下文、在墙钟预算内驱动状态机、沉淀日志与摘要。
//! 墙钟超时只放弃当前受访者，部分进度照常落盘。

use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::TraversalError;
use crate::infrastructure::JsExecutor;
use crate::models::{Respondent, RunOutcome, SurveyLogEntry};
use crate::services::{AdvanceControl, AnswerResolver, CompletionDetector, RunLogger};
use crate::workflow::{CarouselDriver, SectionRouter, TraversalCtx};

/// 处理单个受访者
///
/// 永不向上抛错：任何失败都归纳为一个 `RunOutcome` 并落盘。
#[allow(clippy::too_many_arguments)]
pub async fn process_respondent(
    exec: &JsExecutor,
    respondent: &Respondent,
    respondent_index: usize,
    total: usize,
    config: &Config,
    resolver: &AnswerResolver,
    advance: &AdvanceControl,
    carousel: &CarouselDriver,
    detector: &CompletionDetector,
    run_logger: &RunLogger,
) -> RunOutcome {
    log_respondent_start(respondent, respondent_index, total);

    // 每位受访者都从固定的问卷入口重新开始
    if let Err(e) = exec.goto(&config.target_url).await {
        error!(
            "[受访者 {}] ❌ 导航到问卷入口失败: {}",
            respondent.id, e
        );
        // 没走出任何分区也要留下结构化日志，每位受访者一份
        let entry = SurveyLogEntry {
            respondent_id: respondent.id,
            profile: respondent.profile.clone(),
            steps: vec![],
            completed: false,
            early_terminal: false,
            final_location: String::new(),
        };
        run_logger.persist_entry(&entry);
        run_logger.append_summary(respondent.id, RunOutcome::Aborted, "");
        return RunOutcome::Aborted;
    }
    sleep(Duration::from_millis(config.settle_delay_ms)).await;

    let router = SectionRouter::new(config, resolver, advance, carousel, detector, run_logger);
    let mut ctx = TraversalCtx::new(respondent, respondent_index);
    let budget = Duration::from_secs(config.respondent_budget_secs);

    let (entry, outcome) = match timeout(budget, router.traverse(exec, respondent, &mut ctx)).await
    {
        Ok(entry) => {
            let outcome = entry.run_outcome();
            (entry, outcome)
        }
        Err(_) => {
            let reason = TraversalError::WallClockExceeded {
                respondent_id: respondent.id,
                budget_secs: config.respondent_budget_secs,
            };
            warn!("[受访者 {}] ⚠️ {}", respondent.id, reason);

            // 超时的遍历被丢弃，但上下文里已累积的进度仍然落盘
            let entry = SurveyLogEntry {
                respondent_id: respondent.id,
                profile: respondent.profile.clone(),
                steps: std::mem::take(&mut ctx.steps),
                completed: false,
                early_terminal: false,
                final_location: exec.current_url().await,
            };
            (entry, RunOutcome::Aborted)
        }
    };

    run_logger.persist_entry(&entry);
    run_logger.append_summary(respondent.id, outcome, &entry.final_location);

    log_respondent_complete(respondent, &entry, outcome);
    outcome
}

// ========== 日志辅助函数 ==========

fn log_respondent_start(respondent: &Respondent, index: usize, total: usize) {
    info!("\n[受访者 {}] {}", respondent.id, "─".repeat(30));
    info!(
        "[受访者 {}] 开始处理 ({}/{}), 画像: {}, 答案数: {}",
        respondent.id,
        index,
        total,
        respondent.profile,
        respondent.answer_count()
    );
}

fn log_respondent_complete(respondent: &Respondent, entry: &SurveyLogEntry, outcome: RunOutcome) {
    info!(
        "[受访者 {}] 结论: {} | 分区 {} 个 | 尝试 {} 题 | 终点: {}",
        respondent.id,
        outcome.label(),
        entry.steps.len(),
        entry.attempted_answers(),
        entry.final_location
    );
}
