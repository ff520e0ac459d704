//! 受访者数据加载器
//!
//! 纯转换：文件内容 → `Vec<Respondent>`，不触碰浏览器。
//! 形状检查失败是硬错误，会终止整个批次（其余错误一律软化）。
//!
//! 键顺序保证：题目键全部为数字串时按数值升序排列，否则保持来源顺序。

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tokio::fs;
use tracing::info;

use crate::error::{AppResult, DataError};
use crate::models::respondent::Respondent;

fn numeric_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+$").expect("静态正则必然合法"))
}

/// 从文件加载受访者集合（按扩展名分派 JSON / TOML）
pub async fn load_respondents(path: &str) -> AppResult<Vec<Respondent>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| DataError::ReadFailed {
            path: path.to_string(),
            source,
        })?;

    let respondents = match Path::new(path).extension().and_then(|s| s.to_str()) {
        Some("json") => parse_respondents_json(&content, path)?,
        Some("toml") => parse_respondents_toml(&content, path)?,
        _ => {
            return Err(DataError::UnsupportedFormat {
                path: path.to_string(),
            }
            .into())
        }
    };

    info!("✓ 已加载 {} 位受访者: {}", respondents.len(), path);
    Ok(respondents)
}

/// 解析 JSON 形式的受访者集合
///
/// 预期形状：`{ "respondents": [ { "id": 1, "profile": "...", "answers": { "1": "TAK" } } ] }`
pub fn parse_respondents_json(content: &str, path: &str) -> AppResult<Vec<Respondent>> {
    let root: serde_json::Value =
        serde_json::from_str(content).map_err(|e| DataError::ParseFailed {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

    let records = root
        .get("respondents")
        .and_then(|v| v.as_array())
        .ok_or_else(|| DataError::BadShape {
            reason: "缺少 respondents 数组".to_string(),
        })?;

    let mut respondents = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let id = record
            .get("id")
            .and_then(|v| v.as_u64())
            .ok_or(DataError::MissingId { index })?;

        let profile = record
            .get("profile")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let answers_obj = record
            .get("answers")
            .and_then(|v| v.as_object())
            .ok_or_else(|| DataError::AnswersNotStringMap { id: id.to_string() })?;

        let mut answers = Vec::with_capacity(answers_obj.len());
        for (key, value) in answers_obj {
            let text = value
                .as_str()
                .ok_or_else(|| DataError::AnswersNotStringMap { id: id.to_string() })?;
            answers.push((key.clone(), text.to_string()));
        }

        respondents.push(Respondent {
            id,
            profile,
            answers: order_answers(answers),
        });
    }

    Ok(respondents)
}

/// 解析 TOML 形式的受访者集合（与 JSON 共用校验路径）
pub fn parse_respondents_toml(content: &str, path: &str) -> AppResult<Vec<Respondent>> {
    let root: toml::Value = toml::from_str(content).map_err(|e| DataError::ParseFailed {
        path: path.to_string(),
        reason: e.to_string(),
    })?;

    let records = root
        .get("respondents")
        .and_then(|v| v.as_array())
        .ok_or_else(|| DataError::BadShape {
            reason: "缺少 [[respondents]] 表".to_string(),
        })?;

    let mut respondents = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let id = record
            .get("id")
            .and_then(|v| v.as_integer())
            .and_then(|v| u64::try_from(v).ok())
            .ok_or(DataError::MissingId { index })?;

        let profile = record
            .get("profile")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let answers_table = record
            .get("answers")
            .and_then(|v| v.as_table())
            .ok_or_else(|| DataError::AnswersNotStringMap { id: id.to_string() })?;

        let mut answers = Vec::with_capacity(answers_table.len());
        for (key, value) in answers_table {
            let text = value
                .as_str()
                .ok_or_else(|| DataError::AnswersNotStringMap { id: id.to_string() })?;
            answers.push((key.clone(), text.to_string()));
        }

        respondents.push(Respondent {
            id,
            profile,
            answers: order_answers(answers),
        });
    }

    Ok(respondents)
}

/// 排序答案键
///
/// 全部键为数字串 → 按数值升序；否则保持传入顺序。
fn order_answers(mut answers: Vec<(String, String)>) -> Vec<(String, String)> {
    let all_numeric = answers
        .iter()
        .all(|(key, _)| numeric_key_re().is_match(key));
    if all_numeric {
        answers.sort_by_key(|(key, _)| key.parse::<u64>().unwrap_or(u64::MAX));
    }
    answers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn numeric_keys_sorted_by_value_not_lexicographically() {
        let json = r#"{ "respondents": [
            { "id": 1, "profile": "dyrektor",
              "answers": { "10": "c", "2": "b", "1": "a" } }
        ] }"#;
        let respondents = parse_respondents_json(json, "test.json").unwrap();
        let keys: Vec<&str> = respondents[0].answers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["1", "2", "10"]);
    }

    #[test]
    fn non_numeric_keys_keep_source_order() {
        let json = r#"{ "respondents": [
            { "id": 2, "answers": { "wiek": "45", "plec": "K", "11": "x" } }
        ] }"#;
        let respondents = parse_respondents_json(json, "test.json").unwrap();
        let keys: Vec<&str> = respondents[0].answers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["wiek", "plec", "11"]);
    }

    #[test]
    fn missing_id_is_malformed_data() {
        let json = r#"{ "respondents": [ { "profile": "x", "answers": {} } ] }"#;
        let err = parse_respondents_json(json, "test.json").unwrap_err();
        assert!(matches!(
            err,
            AppError::Data(DataError::MissingId { index: 0 })
        ));
    }

    #[test]
    fn non_string_answer_is_malformed_data() {
        let json = r#"{ "respondents": [ { "id": 3, "answers": { "1": 42 } } ] }"#;
        let err = parse_respondents_json(json, "test.json").unwrap_err();
        assert!(matches!(
            err,
            AppError::Data(DataError::AnswersNotStringMap { .. })
        ));
    }

    #[test]
    fn missing_respondents_array_is_bad_shape() {
        let err = parse_respondents_json(r#"{ "x": 1 }"#, "test.json").unwrap_err();
        assert!(matches!(err, AppError::Data(DataError::BadShape { .. })));
    }

    #[test]
    fn toml_records_share_the_validation_path() {
        let toml_src = r#"
            [[respondents]]
            id = 5
            profile = "nauczyciel"
            [respondents.answers]
            "2" = "NIE"
            "1" = "TAK"
        "#;
        let respondents = parse_respondents_toml(toml_src, "test.toml").unwrap();
        assert_eq!(respondents[0].id, 5);
        assert_eq!(respondents[0].answers[0], ("1".to_string(), "TAK".to_string()));
    }
}
