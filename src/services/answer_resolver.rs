//! 答案应用器 - 业务能力层
//!
//! 目标页面的 DOM 形态不稳定，同一道题可能渲染成单选、下拉、
//! 自由文本或纯文本可点元素。这里不做任何页面类型判断，而是
//! 按固定优先级逐个尝试一条多态策略链，首个成功者即胜出：
//!
//! 1. `exact-label-bound-input` — label\[for\] 精确文本绑定的单选/复选
//! 2. `input-associated-label` — 任意单选/复选，其关联 label 文本精确相等
//! 3. `free-text-fill` — 第一个可见的文本输入框，直接填入
//! 4. `dropdown-exact-option` — 选项文本精确匹配的下拉框
//! 5. `visible-text-click` — 任意可见元素文本精确相等，点击（已知兜底歧义）
//!
//! 相等判定一律是去除首尾空白后的精确字符串比较，没有模糊匹配。
//! 每个策略的探测有独立超时预算："候选未出现"在预算内轮询重试，
//! "候选存在但交互失败"立即降级到下一条策略。

use std::time::Duration;

use serde::Deserialize;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::TraversalError;
use crate::infrastructure::JsExecutor;
use crate::models::StrategyAttemptResult;

/// 单次策略探测在页面侧的结果
#[derive(Debug, Deserialize)]
struct ProbeOutcome {
    /// 是否定位到候选元素
    found: bool,
    /// 是否完成交互（幂等：已处于目标状态也算完成）
    applied: bool,
    /// 命中元素描述符
    descriptor: Option<String>,
}

/// 单条 DOM 交互策略
///
/// 策略只描述"怎么在页面里试一次"，重试与降级由解析器统一控制。
pub trait AnswerStrategy: Send + Sync {
    /// 策略名（写入运行日志）
    fn name(&self) -> &'static str;

    /// 生成一次性探测脚本，返回 `{found, applied, descriptor}`
    fn probe_js(&self, value: &str) -> String;
}

/// 把目标值包装成 JS 字符串字面量并套上 IIFE 外壳
fn wrap_probe(value: &str, body: &str) -> String {
    let value_lit =
        serde_json::to_string(value).unwrap_or_else(|_| String::from("\"\""));
    format!(
        "(() => {{\nconst want = {}.trim();\n{}\n}})()",
        value_lit, body
    )
}

const VISIBLE_HELPER: &str =
    "const visible = el => !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);";

/// 策略 1：label\[for\] 显式绑定
struct ExactLabelBoundInput;

impl AnswerStrategy for ExactLabelBoundInput {
    fn name(&self) -> &'static str {
        "exact-label-bound-input"
    }

    fn probe_js(&self, value: &str) -> String {
        wrap_probe(
            value,
            r#"
const labels = Array.from(document.querySelectorAll('label[for]'));
const hit = labels.find(l => l.textContent.trim() === want);
if (!hit) return { found: false, applied: false, descriptor: null };
const input = document.getElementById(hit.htmlFor);
if (!input || (input.type !== 'radio' && input.type !== 'checkbox'))
    return { found: false, applied: false, descriptor: null };
if (!input.checked) input.click();
return { found: true, applied: input.checked, descriptor: 'label[for="' + hit.htmlFor + '"]' };
"#,
        )
    }
}

/// 策略 2：从输入出发反查关联 label
struct InputAssociatedLabel;

impl AnswerStrategy for InputAssociatedLabel {
    fn name(&self) -> &'static str {
        "input-associated-label"
    }

    fn probe_js(&self, value: &str) -> String {
        wrap_probe(
            value,
            r#"
const inputs = Array.from(document.querySelectorAll("input[type='radio'], input[type='checkbox']"));
for (const input of inputs) {
    const labels = input.labels ? Array.from(input.labels) : [];
    if (labels.some(l => l.textContent.trim() === want)) {
        if (!input.checked) input.click();
        const descriptor = input.type + (input.id ? '#' + input.id : '');
        return { found: true, applied: input.checked, descriptor: descriptor };
    }
}
return { found: false, applied: false, descriptor: null };
"#,
        )
    }
}

/// 策略 3：第一个可见文本输入框
///
/// 约定：当前题目的答案槽就是页面上第一个可见文本框。
/// 通过原型上的原生 value setter 写入，保证框架渲染的输入框
/// 也能观察到这次修改。
struct FreeTextFill;

impl AnswerStrategy for FreeTextFill {
    fn name(&self) -> &'static str {
        "free-text-fill"
    }

    fn probe_js(&self, value: &str) -> String {
        wrap_probe(
            value,
            &format!(
                r#"{VISIBLE_HELPER}
const fields = Array.from(document.querySelectorAll(
    "input[type='text'], input[type='number'], input:not([type]), textarea")).filter(visible);
if (fields.length === 0) return {{ found: false, applied: false, descriptor: null }};
const field = fields[0];
const descriptor = field.tagName.toLowerCase() + (field.id ? '#' + field.id : '');
if (field.value === want) return {{ found: true, applied: true, descriptor: descriptor }};
const proto = field.tagName === 'TEXTAREA'
    ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
setter.call(field, want);
field.dispatchEvent(new Event('input', {{ bubbles: true }}));
field.dispatchEvent(new Event('change', {{ bubbles: true }}));
return {{ found: true, applied: field.value === want, descriptor: descriptor }};
"#
            ),
        )
    }
}

/// 策略 4：下拉框精确选项
struct DropdownExactOption;

impl AnswerStrategy for DropdownExactOption {
    fn name(&self) -> &'static str {
        "dropdown-exact-option"
    }

    fn probe_js(&self, value: &str) -> String {
        wrap_probe(
            value,
            r#"
for (const sel of Array.from(document.querySelectorAll('select'))) {
    const opt = Array.from(sel.options).find(o => o.textContent.trim() === want);
    if (opt) {
        if (sel.value !== opt.value) {
            sel.value = opt.value;
            sel.dispatchEvent(new Event('change', { bubbles: true }));
        }
        const descriptor = 'select' + (sel.id ? '#' + sel.id : '');
        return { found: true, applied: sel.value === opt.value, descriptor: descriptor };
    }
}
return { found: false, applied: false, descriptor: null };
"#,
        )
    }
}

/// 策略 5：可见文本元素点击（兜底）
///
/// 取最内层的匹配节点。同文本的无关元素可能被误点，
/// 这是继承下来的已知歧义，不在这里解决。
struct VisibleTextClick;

impl AnswerStrategy for VisibleTextClick {
    fn name(&self) -> &'static str {
        "visible-text-click"
    }

    fn probe_js(&self, value: &str) -> String {
        wrap_probe(
            value,
            &format!(
                r#"{VISIBLE_HELPER}
const matches = Array.from(document.body.querySelectorAll('*'))
    .filter(el => visible(el) && el.textContent.trim() === want);
if (matches.length === 0) return {{ found: false, applied: false, descriptor: null }};
const target = matches[matches.length - 1];
try {{ target.click(); }} catch (e) {{
    return {{ found: true, applied: false, descriptor: null }};
}}
return {{ found: true, applied: true, descriptor: target.tagName.toLowerCase() }};
"#
            ),
        )
    }
}

/// 答案应用器
///
/// 持有固定顺序的策略链；`apply` 每题调用一次。
pub struct AnswerResolver {
    strategies: Vec<Box<dyn AnswerStrategy>>,
    step_timeout: Duration,
    poll_interval: Duration,
}

impl AnswerResolver {
    /// 创建新的答案应用器（策略顺序固定，不接受外部重排）
    pub fn new(config: &Config) -> Self {
        Self {
            strategies: vec![
                Box::new(ExactLabelBoundInput),
                Box::new(InputAssociatedLabel),
                Box::new(FreeTextFill),
                Box::new(DropdownExactOption),
                Box::new(VisibleTextClick),
            ],
            step_timeout: Duration::from_millis(config.step_timeout_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    /// 策略名列表（按尝试顺序）
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// 对当前页面应用一个目标值
    ///
    /// 按固定顺序尝试策略链，返回首个成功的尝试记录；
    /// 全部落空返回 None，由调用方记一次 miss 并继续下一题。
    /// 所有底层错误在这里吸收，不向上传播。
    pub async fn apply(
        &self,
        exec: &JsExecutor,
        value: &str,
    ) -> Option<StrategyAttemptResult> {
        for strategy in &self.strategies {
            let js = strategy.probe_js(value);
            let deadline = Instant::now() + self.step_timeout;

            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    // 预算耗尽仍未出现候选：降级到下一条策略
                    let miss = TraversalError::ElementNotFound {
                        what: strategy.name().to_string(),
                        timeout_ms: self.step_timeout.as_millis() as u64,
                    };
                    debug!("{}", miss);
                    break;
                }

                let outcome: ProbeOutcome =
                    match timeout(remaining, exec.eval_as(js.clone())).await {
                        Ok(Ok(outcome)) => outcome,
                        Ok(Err(e)) => {
                            warn!("策略 {} 探测脚本失败: {}", strategy.name(), e);
                            break;
                        }
                        Err(_) => break,
                    };

                if outcome.applied {
                    return Some(StrategyAttemptResult {
                        strategy_name: strategy.name().to_string(),
                        succeeded: true,
                        matched_descriptor: outcome.descriptor,
                    });
                }
                if outcome.found {
                    // 候选存在但交互失败：结构性落空，立即降级
                    debug!("策略 {} 定位到候选但交互失败", strategy.name());
                    break;
                }

                sleep(self.poll_interval).await;
            }
        }

        None
    }
}
