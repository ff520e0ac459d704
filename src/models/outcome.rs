//! 遍历结果记录
//!
//! 这些类型只进运行日志，不参与控制流判断本身；
//! 每个受访者最终汇总成一份 `SurveyLogEntry`。

use serde::Serialize;

use crate::models::section::SectionKind;

/// 单次策略尝试的结果
#[derive(Debug, Clone, Serialize)]
pub struct StrategyAttemptResult {
    /// 策略名称
    pub strategy_name: String,
    /// 是否成功应用
    pub succeeded: bool,
    /// 命中元素的描述符（用于诊断回放）
    pub matched_descriptor: Option<String>,
}

/// 单个题目的应用结果
#[derive(Debug, Clone, Serialize)]
pub struct AppliedAnswer {
    /// 题目键
    pub question_key: String,
    /// 目标答案文本
    pub value: String,
    /// 成功时的策略名（None 表示所有策略都未命中）
    pub strategy: Option<String>,
    /// 命中元素描述符
    pub matched_descriptor: Option<String>,
}

/// 轮播卡片记录（瞬态，仅存在于分区处理期间）
#[derive(Debug, Clone, Serialize)]
pub struct CarouselCard {
    /// 卡片序号（从 1 开始）
    pub index: usize,
    /// 卡片提示文本（读取失败时为 None，按 unknown 记录）
    pub prompt_text: Option<String>,
    /// 选定答案
    pub chosen_answer: String,
    /// 成功时的策略名
    pub strategy: Option<String>,
}

/// 轮播分区的处理结果
#[derive(Debug, Clone, Serialize)]
pub struct CarouselOutcome {
    /// 是否处理完全部预期卡片
    pub completed: bool,
    /// 实际处理的卡片数（不会超过预期数）
    pub cards_processed: usize,
    /// 逐卡片记录
    pub cards: Vec<CarouselCard>,
}

/// 分区处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SectionStatus {
    /// 处理完成并成功推进
    Done,
    /// 部分完成（例如轮播提前终止）
    Incomplete,
    /// 推进失败，受访者被放弃
    Aborted,
}

/// 单个分区的结果记录
#[derive(Debug, Clone, Serialize)]
pub struct SectionOutcome {
    /// 分区标签
    pub section: String,
    /// 分区类型
    pub kind: SectionKind,
    /// 处理状态
    pub status: SectionStatus,
    /// 表单类分区的逐题记录
    pub answers: Vec<AppliedAnswer>,
    /// 轮播分区的卡片结果
    pub carousel: Option<CarouselOutcome>,
}

/// 单个受访者的完整遍历日志
#[derive(Debug, Clone, Serialize)]
pub struct SurveyLogEntry {
    /// 受访者标识
    pub respondent_id: u64,
    /// 画像标签
    pub profile: String,
    /// 按顺序记录的分区结果
    pub steps: Vec<SectionOutcome>,
    /// 是否确认完成
    pub completed: bool,
    /// 是否在到达完成页之前命中了提前终态证据
    pub early_terminal: bool,
    /// 终态时的页面地址
    pub final_location: String,
}

/// 受访者级别的运行结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    /// 正常走到完成页并确认完成
    Completed,
    /// 在完成页之前命中提前终态证据
    CompletedEarly,
    /// 遍历走完但未确认完成（启发式局限或部分缺口）
    Partial,
    /// 中途放弃（推进失效或墙钟超时）
    Aborted,
}

impl RunOutcome {
    /// 摘要行用的短标签
    pub fn label(self) -> &'static str {
        match self {
            RunOutcome::Completed => "completed",
            RunOutcome::CompletedEarly => "completed-early",
            RunOutcome::Partial => "partial",
            RunOutcome::Aborted => "aborted",
        }
    }
}

impl SurveyLogEntry {
    /// 由日志条目归纳受访者级结论
    pub fn run_outcome(&self) -> RunOutcome {
        if self.completed {
            if self.early_terminal {
                RunOutcome::CompletedEarly
            } else {
                RunOutcome::Completed
            }
        } else if self
            .steps
            .iter()
            .any(|s| s.status == SectionStatus::Aborted)
        {
            RunOutcome::Aborted
        } else {
            RunOutcome::Partial
        }
    }

    /// 全部策略尝试总数（含未命中）
    pub fn attempted_answers(&self) -> usize {
        self.steps
            .iter()
            .map(|s| {
                s.answers.len()
                    + s.carousel
                        .as_ref()
                        .map(|c| c.cards.len())
                        .unwrap_or(0)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(completed: bool, early: bool, statuses: Vec<SectionStatus>) -> SurveyLogEntry {
        SurveyLogEntry {
            respondent_id: 7,
            profile: "nauczyciel".to_string(),
            steps: statuses
                .into_iter()
                .map(|status| SectionOutcome {
                    section: "consent".to_string(),
                    kind: SectionKind::Consent,
                    status,
                    answers: vec![],
                    carousel: None,
                })
                .collect(),
            completed,
            early_terminal: early,
            final_location: String::new(),
        }
    }

    #[test]
    fn outcome_completed_vs_early() {
        assert_eq!(
            entry(true, false, vec![SectionStatus::Done]).run_outcome(),
            RunOutcome::Completed
        );
        assert_eq!(
            entry(true, true, vec![SectionStatus::Done]).run_outcome(),
            RunOutcome::CompletedEarly
        );
    }

    #[test]
    fn outcome_aborted_wins_over_partial() {
        assert_eq!(
            entry(false, false, vec![SectionStatus::Done, SectionStatus::Aborted]).run_outcome(),
            RunOutcome::Aborted
        );
        assert_eq!(
            entry(false, false, vec![SectionStatus::Done]).run_outcome(),
            RunOutcome::Partial
        );
    }

    #[test]
    fn missing_marker_after_completion_is_partial_not_error() {
        // 走到完成页但没有任何标记命中：只降级为 partial
        let e = entry(false, false, vec![SectionStatus::Done, SectionStatus::Done]);
        assert_eq!(e.run_outcome(), RunOutcome::Partial);
    }

    #[test]
    fn attempted_answers_counts_cards_and_form_answers() {
        let mut e = entry(false, false, vec![SectionStatus::Done]);
        e.steps[0].answers.push(AppliedAnswer {
            question_key: "1".to_string(),
            value: "TAK".to_string(),
            strategy: None,
            matched_descriptor: None,
        });
        e.steps[0].carousel = Some(CarouselOutcome {
            completed: false,
            cards_processed: 2,
            cards: vec![
                CarouselCard {
                    index: 1,
                    prompt_text: None,
                    chosen_answer: "3".to_string(),
                    strategy: Some("visible-text-click".to_string()),
                },
                CarouselCard {
                    index: 2,
                    prompt_text: Some("Pytanie".to_string()),
                    chosen_answer: "4".to_string(),
                    strategy: None,
                },
            ],
        });
        assert_eq!(e.attempted_answers(), 3);
    }
}
