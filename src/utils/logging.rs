//! 日志工具模块

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_text("TAK", 60), "TAK");
    }

    #[test]
    fn long_text_is_truncated_on_char_boundary() {
        let text = "Dziękujemy za wypełnienie ankiety";
        let truncated = truncate_text(text, 10);
        assert_eq!(truncated.chars().count(), 13); // 10 + "..."
        assert!(truncated.ends_with("..."));
    }
}
