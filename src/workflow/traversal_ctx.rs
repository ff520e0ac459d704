//! 遍历上下文
//!
//! 把原本散落的"当前走到哪"计数收拢成一个显式对象：
//! 当前分区、当前卡片、答案游标、已累积的分区结果。
//! 没有任何全局可变状态，所有处理器都通过它读写进度。

use std::fmt::Display;

use crate::models::{Respondent, SectionOutcome};

/// 单个受访者遍历的显式状态
#[derive(Debug)]
pub struct TraversalCtx {
    /// 受访者标识
    pub respondent_id: u64,
    /// 受访者在批次中的序号（仅用于日志显示，从 1 开始）
    pub respondent_index: usize,
    /// 画像标签
    pub profile: String,
    /// 当前分区下标（从 0 开始）
    pub section_index: usize,
    /// 当前卡片序号（轮播分区内，从 1 开始；非轮播时为 0）
    pub card_index: usize,
    /// 答案消费游标：下一个待尝试的答案键位置
    pub answer_cursor: usize,
    /// 按顺序累积的分区结果
    pub steps: Vec<SectionOutcome>,
}

impl TraversalCtx {
    /// 为一次遍历创建全新上下文
    pub fn new(respondent: &Respondent, respondent_index: usize) -> Self {
        Self {
            respondent_id: respondent.id,
            respondent_index,
            profile: respondent.profile.clone(),
            section_index: 0,
            card_index: 0,
            answer_cursor: 0,
            steps: Vec::new(),
        }
    }
}

impl Display for TraversalCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[受访者 #{} 分区#{} 卡片#{}]",
            self.respondent_id, self.section_index, self.card_index
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ctx_starts_at_zero() {
        let respondent = Respondent {
            id: 11,
            profile: "wicedyrektor".to_string(),
            answers: vec![("1".to_string(), "TAK".to_string())],
        };
        let ctx = TraversalCtx::new(&respondent, 3);
        assert_eq!(ctx.respondent_id, 11);
        assert_eq!(ctx.answer_cursor, 0);
        assert!(ctx.steps.is_empty());
        assert_eq!(format!("{}", ctx), "[受访者 #11 分区#0 卡片#0]");
    }
}
