//! 受访者模型
//!
//! 一个受访者实例驱动恰好一次问卷遍历，加载后不可变。

use serde::Serialize;

/// 受访者
///
/// - `answers` 是有序的 (题目键, 答案文本) 列表，顺序在加载阶段确定：
///   全部键为数字时按数值升序，否则保持来源顺序
#[derive(Debug, Clone, Serialize)]
pub struct Respondent {
    /// 受访者标识
    pub id: u64,
    /// 描述性画像标签（仅用于日志）
    pub profile: String,
    /// 有序答案列表
    pub answers: Vec<(String, String)>,
}

impl Respondent {
    /// 答案总数
    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }

    /// 从游标位置取出一个分区的答案切片
    ///
    /// 超出范围时返回能取到的部分（可能为空），调用方据此记录缺口。
    pub fn answers_slice(&self, cursor: usize, count: usize) -> &[(String, String)] {
        let start = cursor.min(self.answers.len());
        let end = (cursor + count).min(self.answers.len());
        &self.answers[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Respondent {
        Respondent {
            id: 1,
            profile: "dyrektor".to_string(),
            answers: vec![
                ("1".to_string(), "TAK".to_string()),
                ("2".to_string(), "Kobieta".to_string()),
                ("3".to_string(), "45".to_string()),
            ],
        }
    }

    #[test]
    fn slice_within_range() {
        let r = sample();
        let s = r.answers_slice(1, 2);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].1, "Kobieta");
    }

    #[test]
    fn slice_past_end_is_truncated_not_panicking() {
        let r = sample();
        assert_eq!(r.answers_slice(2, 10).len(), 1);
        assert!(r.answers_slice(5, 3).is_empty());
    }
}
