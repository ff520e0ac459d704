//! 完成检测 - 业务能力层
//!
//! 终态证据有两类：
//! 1. 文本标记：按语言配置的完成短语。扫描 `document.body.textContent`
//!    而不是 innerText，保证视觉隐藏的标记也能命中
//! 2. 结构兜底：当前地址中出现应答标识 token
//!
//! 这是尽力而为的启发式：漏报只会被记为"未确认完成"，不会抛错。

use phf::phf_map;
use tracing::{debug, warn};

use crate::config::Config;
use crate::infrastructure::JsExecutor;

/// 语言 → 完成短语集合
///
/// 波兰语是目标问卷的源语言，英语是兜底语言。
/// 未预期语言下的行为未定义，只能靠结构兜底。
static COMPLETION_MARKERS: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "pl" => &[
        "Dziękujemy za wypełnienie ankiety",
        "Twoje odpowiedzi zostały zapisane",
        "Ankieta została zakończona",
    ],
    "en" => &[
        "Thank you for completing the survey",
        "Your response has been recorded",
        "The survey is now complete",
    ],
};

/// 完成检测器
pub struct CompletionDetector {
    markers: Vec<&'static str>,
    url_token: String,
}

impl CompletionDetector {
    /// 按配置的语言集合创建检测器
    pub fn new(config: &Config) -> Self {
        Self {
            markers: markers_for_locales(&config.completion_locales),
            url_token: config.completion_url_token.clone(),
        }
    }

    /// 当前页面是否呈现终态证据
    ///
    /// 任一标记命中即为真。底层错误按"无证据"吸收。
    pub async fn is_complete(&self, exec: &JsExecutor) -> bool {
        if self.text_marker_present(exec).await {
            return true;
        }

        // 结构兜底：地址里出现应答标识 token
        if !self.url_token.is_empty() {
            let url = exec.current_url().await;
            if url.contains(&self.url_token) {
                debug!("完成检测: URL token 命中 ({})", url);
                return true;
            }
        }

        false
    }

    async fn text_marker_present(&self, exec: &JsExecutor) -> bool {
        if self.markers.is_empty() {
            return false;
        }

        let markers_lit = match serde_json::to_string(&self.markers) {
            Ok(lit) => lit,
            Err(_) => return false,
        };
        let js = format!(
            r#"(() => {{
const markers = {};
const text = (document.body && document.body.textContent) || '';
return markers.some(m => text.includes(m));
}})()"#,
            markers_lit
        );

        match exec.eval_as::<bool>(js).await {
            Ok(hit) => {
                if hit {
                    debug!("完成检测: 文本标记命中");
                }
                hit
            }
            Err(e) => {
                warn!("完成检测脚本失败: {}", e);
                false
            }
        }
    }
}

/// 汇总配置语言的标记短语（未知语言产出空集并告警）
fn markers_for_locales(locales: &[String]) -> Vec<&'static str> {
    let mut markers = Vec::new();
    for locale in locales {
        match COMPLETION_MARKERS.get(locale.as_str()) {
            Some(phrases) => markers.extend_from_slice(phrases),
            None => warn!("⚠️ 未收录的完成标记语言: {}", locale),
        }
    }
    markers
}
