//! 推进控件 - 业务能力层
//!
//! 定位并点击"下一页 / 下一卡片"控件。轮播驱动和分区路由共用：
//! 前者只做单次探测和单次点击，后者用有界重试推进整页。

use std::time::Duration;

use serde::Deserialize;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::JsExecutor;

/// 推进控件的当前状态
#[derive(Debug, Deserialize)]
pub struct AdvanceState {
    /// 是否定位到控件
    pub found: bool,
    /// 控件是否被禁用（disabled 属性或 aria-disabled）
    pub disabled: bool,
    /// 是否在本次探测中完成了点击
    #[serde(default)]
    pub clicked: bool,
    /// 控件描述符
    pub descriptor: Option<String>,
}

/// 推进控件
pub struct AdvanceControl {
    step_timeout: Duration,
    poll_interval: Duration,
    max_attempts: usize,
}

impl AdvanceControl {
    /// 创建推进控件能力
    pub fn new(config: &Config) -> Self {
        Self {
            step_timeout: Duration::from_millis(config.step_timeout_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.advance_max_attempts.max(1),
        }
    }

    /// 生成探测脚本
    ///
    /// 候选集合：#NextButton、提交类按钮、文本命中推进词表的按钮。
    /// `do_click` 为真且控件可用时顺带点击。
    fn probe_js(do_click: bool) -> String {
        format!(
            r##"(() => {{
const visible = el => !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);
const words = ['Dalej', 'Kontynuuj', 'Wyślij', 'Next', 'Continue', 'Submit', '→', '>>'];
const candidates = Array.from(document.querySelectorAll(
    "#NextButton, input[type='submit'], button[type='submit'], button"));
const hit = candidates.find(el => visible(el) && (
    el.id === 'NextButton' ||
    el.type === 'submit' ||
    words.includes((el.value || el.textContent || '').trim())));
if (!hit) return {{ found: false, disabled: false, clicked: false, descriptor: null }};
const disabled = !!hit.disabled || hit.getAttribute('aria-disabled') === 'true';
let clicked = false;
if ({do_click} && !disabled) {{ hit.click(); clicked = true; }}
const descriptor = hit.tagName.toLowerCase() + (hit.id ? '#' + hit.id : '');
return {{ found: true, disabled: disabled, clicked: clicked, descriptor: descriptor }};
}})()"##
        )
    }

    /// 单次探测（不点击）
    pub async fn probe(&self, exec: &JsExecutor) -> AdvanceState {
        match exec.eval_as(Self::probe_js(false)).await {
            Ok(state) => state,
            Err(e) => {
                warn!("推进控件探测失败: {}", e);
                AdvanceState {
                    found: false,
                    disabled: false,
                    clicked: false,
                    descriptor: None,
                }
            }
        }
    }

    /// 控件当前是否被禁用（轮播提前终止判定用；探测失败按未禁用处理）
    pub async fn is_disabled(&self, exec: &JsExecutor) -> bool {
        let state = self.probe(exec).await;
        state.found && state.disabled
    }

    /// 单次点击尝试（控件缺失或禁用时返回 false）
    pub async fn click_once(&self, exec: &JsExecutor) -> bool {
        match exec.eval_as::<AdvanceState>(Self::probe_js(true)).await {
            Ok(state) => state.clicked,
            Err(e) => {
                warn!("推进点击失败: {}", e);
                false
            }
        }
    }

    /// 有界推进：在每次尝试的超时预算内轮询等待控件可用并点击
    ///
    /// 尝试次数耗尽返回 `AdvanceBlocked`，由调用方放弃当前受访者。
    pub async fn advance(&self, exec: &JsExecutor, section_label: &str) -> AppResult<()> {
        for attempt in 1..=self.max_attempts {
            let deadline = Instant::now() + self.step_timeout;

            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }

                let clicked = match timeout(
                    remaining,
                    exec.eval_as::<AdvanceState>(Self::probe_js(true)),
                )
                .await
                {
                    Ok(Ok(state)) => state.clicked,
                    Ok(Err(e)) => {
                        warn!("推进尝试 {} 失败: {}", attempt, e);
                        false
                    }
                    Err(_) => false,
                };

                if clicked {
                    debug!("分区 {} 第 {} 次尝试推进成功", section_label, attempt);
                    return Ok(());
                }

                sleep(self.poll_interval).await;
            }
        }

        Err(AppError::advance_blocked(section_label, self.max_attempts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_js_click_flag_is_injected() {
        assert!(AdvanceControl::probe_js(true).contains("if (true && !disabled)"));
        assert!(AdvanceControl::probe_js(false).contains("if (false && !disabled)"));
    }

    #[test]
    fn advance_words_cover_source_and_fallback_locale() {
        let js = AdvanceControl::probe_js(false);
        assert!(js.contains("'Dalej'"));
        assert!(js.contains("'Next'"));
    }

    #[test]
    fn max_attempts_is_at_least_one() {
        let mut config = Config::default();
        config.advance_max_attempts = 0;
        let control = AdvanceControl::new(&config);
        assert_eq!(control.max_attempts, 1);
    }
}
