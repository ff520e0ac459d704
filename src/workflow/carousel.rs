//! 轮播驱动 - 流程层
//!
//! 轮播分区在同一页面内逐卡片出题：读提示 → 应用答案 → 推进。
//! 迭代次数受预期卡片数硬性封顶；推进前发现控件被禁用则提前
//! 终止并报告不完整结果。驱动自身不重试卡片（重试只存在于
//! 答案应用器的策略链内部），答案没应用上的卡片照样推过去。

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::models::{CarouselCard, CarouselOutcome, Section};
use crate::services::{AdvanceControl, AnswerResolver};
use crate::utils::logging::truncate_text;
use crate::workflow::traversal_ctx::TraversalCtx;

/// 轮播驱动
pub struct CarouselDriver {
    /// 推进后的固定沉降延迟，给客户端重渲染留时间（时间余量，不是正确性保证）
    settle_delay: Duration,
}

impl CarouselDriver {
    /// 创建轮播驱动
    pub fn new(config: &Config) -> Self {
        Self {
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        }
    }

    /// 处理一个轮播分区
    ///
    /// `answers` 是本分区按卡片顺序分配到的答案切片；
    /// 数量不足时剩余卡片按"无答案"记录并继续推进。
    pub async fn run(
        &self,
        exec: &JsExecutor,
        resolver: &AnswerResolver,
        advance: &AdvanceControl,
        ctx: &mut TraversalCtx,
        section: &Section,
        answers: &[(String, String)],
    ) -> CarouselOutcome {
        let expected = section.expected_card_count.unwrap_or(0);
        let mut cards = Vec::with_capacity(expected);

        for card_number in 1..=expected {
            ctx.card_index = card_number;

            // 读取当前卡片提示（尽力而为，缺失按 unknown 记录）
            let prompt = self.read_prompt(exec).await;
            match &prompt {
                Some(text) => info!(
                    "{} 卡片 {}/{}: {}",
                    ctx,
                    card_number,
                    expected,
                    truncate_text(text, 60)
                ),
                None => info!("{} 卡片 {}/{}: (提示未读到)", ctx, card_number, expected),
            }

            // 应用本卡答案
            let card = match answers.get(card_number - 1) {
                Some((key, value)) => {
                    let attempt = resolver.apply(exec, value).await;
                    match &attempt {
                        Some(hit) => info!(
                            "{} ✓ 题目 {} 已应用 (策略: {})",
                            ctx, key, hit.strategy_name
                        ),
                        None => warn!("{} ⚠️ 题目 {} 所有策略未命中: {}", ctx, key, value),
                    }
                    CarouselCard {
                        index: card_number,
                        prompt_text: prompt,
                        chosen_answer: value.clone(),
                        strategy: attempt.map(|a| a.strategy_name),
                    }
                }
                None => {
                    warn!("{} ⚠️ 卡片 {} 没有分配到答案", ctx, card_number);
                    CarouselCard {
                        index: card_number,
                        prompt_text: prompt,
                        chosen_answer: String::new(),
                        strategy: None,
                    }
                }
            };
            cards.push(card);

            // 推进前检查禁用：禁用即提前终止，当前卡计入已处理
            if advance.is_disabled(exec).await {
                warn!(
                    "{} ⚠️ 推进控件被禁用，提前终止于卡片 {}/{}",
                    ctx, card_number, expected
                );
                return CarouselOutcome {
                    completed: false,
                    cards_processed: card_number,
                    cards,
                };
            }

            // 最后一张卡的推进同时就是离开本分区的页面切换
            if !advance.click_once(exec).await {
                warn!("{} ⚠️ 卡片 {} 推进点击未生效", ctx, card_number);
            }
            sleep(self.settle_delay).await;
        }

        CarouselOutcome {
            completed: true,
            cards_processed: expected,
            cards,
        }
    }

    /// 读取当前可见卡片的提示文本
    async fn read_prompt(&self, exec: &JsExecutor) -> Option<String> {
        const PROMPT_JS: &str = r#"(() => {
const visible = el => !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);
const selectors = [
    '.question-text', '.card .prompt', '[data-role="question"]',
    'legend', 'h2', 'h3'];
for (const s of selectors) {
    const el = Array.from(document.querySelectorAll(s)).find(visible);
    if (el) {
        const text = el.textContent.trim();
        if (text) return text;
    }
}
return null;
}})()"#;

        match exec.eval_as::<Option<String>>(PROMPT_JS).await {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!("卡片提示读取失败: {}", e);
                None
            }
        }
    }
}
