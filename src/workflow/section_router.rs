//! 分区路由 - 流程层
//!
//! 单个受访者的状态机：按静态分区序列依次调度对应处理器，
//! 每次分区切换后做一次完成检测。状态只向前推进，从不回头。
//!
//! 失败语义：
//! - 单题未命中：记 miss，继续下一题
//! - 推进失效：放弃当前受访者，记录已走到的位置
//! - 提前命中终态证据：视为成功的提前终局（与正常终局区分记录）
//! - 走到完成页但无标记命中：记 `completed: false`，不抛错

use tracing::{error, info, warn};

use crate::infrastructure::JsExecutor;
use crate::models::{
    section_plan, AppliedAnswer, Respondent, Section, SectionKind, SectionOutcome, SectionStatus,
    SurveyLogEntry,
};
use crate::services::{AdvanceControl, AnswerResolver, CompletionDetector, RunLogger};
use crate::workflow::carousel::CarouselDriver;
use crate::workflow::traversal_ctx::TraversalCtx;

/// 分区路由器
///
/// 不持有资源（page），只依赖业务能力；分区序列在构造时固定。
pub struct SectionRouter<'a> {
    resolver: &'a AnswerResolver,
    advance: &'a AdvanceControl,
    carousel: &'a CarouselDriver,
    detector: &'a CompletionDetector,
    run_logger: &'a RunLogger,
    plan: Vec<Section>,
    verbose_logging: bool,
}

impl<'a> SectionRouter<'a> {
    /// 创建路由器
    pub fn new(
        config: &crate::config::Config,
        resolver: &'a AnswerResolver,
        advance: &'a AdvanceControl,
        carousel: &'a CarouselDriver,
        detector: &'a CompletionDetector,
        run_logger: &'a RunLogger,
    ) -> Self {
        Self {
            resolver,
            advance,
            carousel,
            detector,
            run_logger,
            plan: section_plan(config),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 分区序列（测试与日志用）
    pub fn plan(&self) -> &[Section] {
        &self.plan
    }

    /// 驱动一个受访者走完整个状态机
    ///
    /// 所有软错误在内部吸收，始终产出一份日志条目；
    /// 进度随走随写入 `ctx.steps`，墙钟超时时调用方仍能拿到部分进度。
    pub async fn traverse(
        &self,
        exec: &JsExecutor,
        respondent: &Respondent,
        ctx: &mut TraversalCtx,
    ) -> SurveyLogEntry {
        let mut completed = false;
        let mut early_terminal = false;

        for (index, section) in self.plan.iter().enumerate() {
            ctx.section_index = index;
            ctx.card_index = 0;

            // 分区间完成检测：在到达完成页之前命中即为提前终局
            if index > 0 && section.kind != SectionKind::Completion {
                if self.detector.is_complete(exec).await {
                    info!("{} 🏁 提前命中终态证据 (分区 {})", ctx, section.label);
                    completed = true;
                    early_terminal = true;
                    break;
                }
            }

            let proceed = match section.kind {
                SectionKind::Completion => {
                    self.handle_completion(exec, ctx, section, &mut completed)
                        .await
                }
                SectionKind::Carousel => self.handle_carousel(exec, respondent, ctx, section).await,
                SectionKind::Consent | SectionKind::Demographics | SectionKind::Leadership => {
                    self.handle_form_page(exec, respondent, ctx, section).await
                }
            };

            self.run_logger
                .screenshot(exec, ctx.respondent_id, section.label)
                .await;

            if !proceed {
                // HTML 快照是失败诊断产物，确认完成的终局不留
                if !completed {
                    self.run_logger
                        .snapshot_html(exec, ctx.respondent_id, section.label)
                        .await;
                }
                break;
            }
        }

        if ctx.answer_cursor < respondent.answer_count() {
            warn!(
                "{} ⚠️ 有 {} 个答案键未被消费",
                ctx,
                respondent.answer_count() - ctx.answer_cursor
            );
        }

        let final_location = exec.current_url().await;
        SurveyLogEntry {
            respondent_id: respondent.id,
            profile: respondent.profile.clone(),
            steps: std::mem::take(&mut ctx.steps),
            completed,
            early_terminal,
            final_location,
        }
    }

    /// 表单类分区（同意书 / 人口统计 / 领导力）：逐题应用后整页推进
    async fn handle_form_page(
        &self,
        exec: &JsExecutor,
        respondent: &Respondent,
        ctx: &mut TraversalCtx,
        section: &Section,
    ) -> bool {
        info!("{} 📋 处理分区: {}", ctx, section.label);

        let answers = respondent
            .answers_slice(ctx.answer_cursor, section.question_count)
            .to_vec();
        ctx.answer_cursor += answers.len();

        let mut applied = Vec::with_capacity(answers.len());
        for (key, value) in &answers {
            let attempt = self.resolver.apply(exec, value).await;
            match &attempt {
                Some(hit) => {
                    info!("{} ✓ 题目 {} 已应用 (策略: {})", ctx, key, hit.strategy_name);
                    if self.verbose_logging {
                        if let Some(descriptor) = &hit.matched_descriptor {
                            info!("{}   命中元素: {}", ctx, descriptor);
                        }
                    }
                }
                None => warn!("{} ⚠️ 题目 {} 所有策略未命中: {}", ctx, key, value),
            }
            applied.push(AppliedAnswer {
                question_key: key.clone(),
                value: value.clone(),
                strategy: attempt.as_ref().map(|a| a.strategy_name.clone()),
                matched_descriptor: attempt.and_then(|a| a.matched_descriptor),
            });
        }

        match self.advance.advance(exec, section.label).await {
            Ok(()) => {
                ctx.steps.push(SectionOutcome {
                    section: section.label.to_string(),
                    kind: section.kind,
                    status: SectionStatus::Done,
                    answers: applied,
                    carousel: None,
                });
                true
            }
            Err(e) => {
                error!("{} ❌ 分区 {} 推进失败: {}", ctx, section.label, e);
                ctx.steps.push(SectionOutcome {
                    section: section.label.to_string(),
                    kind: section.kind,
                    status: SectionStatus::Aborted,
                    answers: applied,
                    carousel: None,
                });
                false
            }
        }
    }

    /// 轮播分区：委托轮播驱动；最后一张卡的推进即离开本分区
    async fn handle_carousel(
        &self,
        exec: &JsExecutor,
        respondent: &Respondent,
        ctx: &mut TraversalCtx,
        section: &Section,
    ) -> bool {
        info!(
            "{} 🎠 处理轮播分区: {} (预期 {} 张卡片)",
            ctx,
            section.label,
            section.expected_card_count.unwrap_or(0)
        );

        let answers = respondent
            .answers_slice(ctx.answer_cursor, section.question_count)
            .to_vec();
        ctx.answer_cursor += answers.len();

        let outcome = self
            .carousel
            .run(exec, self.resolver, self.advance, ctx, section, &answers)
            .await;

        if outcome.completed {
            ctx.steps.push(SectionOutcome {
                section: section.label.to_string(),
                kind: section.kind,
                status: SectionStatus::Done,
                answers: vec![],
                carousel: Some(outcome),
            });
            return true;
        }

        // 提前终止：尝试一次有界的整页推进，失败则放弃当前受访者
        warn!(
            "{} ⚠️ 轮播 {} 不完整 ({}/{})",
            ctx,
            section.label,
            outcome.cards_processed,
            section.expected_card_count.unwrap_or(0)
        );
        match self.advance.advance(exec, section.label).await {
            Ok(()) => {
                ctx.steps.push(SectionOutcome {
                    section: section.label.to_string(),
                    kind: section.kind,
                    status: SectionStatus::Incomplete,
                    answers: vec![],
                    carousel: Some(outcome),
                });
                true
            }
            Err(e) => {
                error!("{} ❌ 轮播 {} 推进失败: {}", ctx, section.label, e);
                ctx.steps.push(SectionOutcome {
                    section: section.label.to_string(),
                    kind: section.kind,
                    status: SectionStatus::Aborted,
                    answers: vec![],
                    carousel: Some(outcome),
                });
                false
            }
        }
    }

    /// 完成页：只做终态确认，不再推进
    async fn handle_completion(
        &self,
        exec: &JsExecutor,
        ctx: &mut TraversalCtx,
        section: &Section,
        completed: &mut bool,
    ) -> bool {
        *completed = self.detector.is_complete(exec).await;
        if *completed {
            info!("{} ✅ 完成标记已确认", ctx);
        } else {
            // 启发式局限：可能真完成了但标记没命中，只降级记录
            warn!("{} ⚠️ 到达完成页但未命中任何完成标记", ctx);
        }
        ctx.steps.push(SectionOutcome {
            section: section.label.to_string(),
            kind: section.kind,
            status: SectionStatus::Done,
            answers: vec![],
            carousel: None,
        });
        false
    }
}
