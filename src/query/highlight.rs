//! 关键词高亮

use regex::RegexBuilder;

const HIGHLIGHT_OPEN: &str = "<mark class=\"search-highlight\">";
const HIGHLIGHT_CLOSE: &str = "</mark>";

/// 用 `<mark>` 包裹文本中出现的关键词（忽略大小写，长词优先）
///
/// 所有关键词合并为一个交替正则一次替换，已插入的标签不会被再次匹配。
pub fn highlight_matches(text: &str, keywords: &[String]) -> String {
    let mut sorted: Vec<&str> = keywords
        .iter()
        .map(String::as_str)
        .filter(|k| !k.trim().is_empty())
        .collect();
    if sorted.is_empty() {
        return text.to_string();
    }
    sorted.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    sorted.dedup();

    let pattern = sorted
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");

    match RegexBuilder::new(&format!("({pattern})"))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re
            .replace_all(text, format!("{HIGHLIGHT_OPEN}${{1}}{HIGHLIGHT_CLOSE}").as_str())
            .into_owned(),
        Err(err) => {
            log::warn!("构建高亮正则失败: {}", err);
            text.to_string()
        }
    }
}
