//! 问卷分区模型
//!
//! 分区顺序是静态的，运行期间不会重排：
//! 同意书 → 人口统计 → 轮播A(5) → 领导力 → 轮播B(18) → 轮播C(24) → 完成页

use serde::Serialize;

use crate::config::Config;

/// 分区类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SectionKind {
    /// 知情同意页
    Consent,
    /// 人口统计页
    Demographics,
    /// 轮播分区（单页内逐卡片出题）
    Carousel,
    /// 领导力量表页
    Leadership,
    /// 完成页（终态）
    Completion,
}

/// 问卷分区
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    /// 分区类型
    pub kind: SectionKind,
    /// 分区标签（用于日志和产物命名）
    pub label: &'static str,
    /// 本分区消费的答案键数量
    pub question_count: usize,
    /// 轮播分区的预期卡片数（非轮播为 None）
    pub expected_card_count: Option<usize>,
}

impl Section {
    fn plain(kind: SectionKind, label: &'static str, question_count: usize) -> Self {
        Self {
            kind,
            label,
            question_count,
            expected_card_count: None,
        }
    }

    fn carousel(label: &'static str, card_count: usize) -> Self {
        Self {
            kind: SectionKind::Carousel,
            label,
            question_count: card_count,
            expected_card_count: Some(card_count),
        }
    }
}

/// 构建静态分区序列
///
/// 人口统计和领导力分区的题目数来自配置（不同问卷配置会有差异），
/// 三个轮播分区的卡片数是目标问卷的固定结构。
pub fn section_plan(config: &Config) -> Vec<Section> {
    vec![
        Section::plain(SectionKind::Consent, "consent", 1),
        Section::plain(
            SectionKind::Demographics,
            "demographics",
            config.demographics_question_count,
        ),
        Section::carousel("carousel-a", 5),
        Section::plain(
            SectionKind::Leadership,
            "leadership",
            config.leadership_question_count,
        ),
        Section::carousel("carousel-b", 18),
        Section::carousel("carousel-c", 24),
        Section::plain(SectionKind::Completion, "completion", 0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_order_is_fixed() {
        let plan = section_plan(&Config::default());
        let kinds: Vec<SectionKind> = plan.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Consent,
                SectionKind::Demographics,
                SectionKind::Carousel,
                SectionKind::Leadership,
                SectionKind::Carousel,
                SectionKind::Carousel,
                SectionKind::Completion,
            ]
        );
    }

    #[test]
    fn carousel_card_counts_match_target_structure() {
        let plan = section_plan(&Config::default());
        let counts: Vec<usize> = plan
            .iter()
            .filter_map(|s| s.expected_card_count)
            .collect();
        assert_eq!(counts, vec![5, 18, 24]);
    }

    #[test]
    fn completion_is_terminal_and_consumes_no_answers() {
        let plan = section_plan(&Config::default());
        let last = plan.last().unwrap();
        assert_eq!(last.kind, SectionKind::Completion);
        assert_eq!(last.question_count, 0);
    }
}
