//! 默认模糊匹配函数
//!
//! 匹配器只接受 `Fn(keyword, text) -> bool`，这里提供几种常用实现。
//! 拼音匹配让 `gz` 或 `gongzuo` 可以命中“工作”。

use pinyin::ToPinyin;

/// 忽略大小写的子串匹配
pub fn contains_ignore_case(query: &str, text: &str) -> bool {
    text.to_lowercase().contains(&query.to_lowercase())
}

/// 忽略大小写的字符子序列匹配（`"cbh"` 命中 `"clipboard history"`）
pub fn subsequence_match(query: &str, text: &str) -> bool {
    let text = text.to_lowercase();
    let mut text_chars = text.chars();
    query
        .to_lowercase()
        .chars()
        .all(|q| text_chars.by_ref().any(|t| t == q))
}

/// 汉字转拼音首字母，其余字符转小写保留
pub fn to_pinyin_initials(text: &str) -> String {
    text.chars()
        .flat_map(|c| match c.to_pinyin() {
            Some(py) => py.plain().chars().next().into_iter().collect::<Vec<_>>(),
            None => c.to_lowercase().collect(),
        })
        .collect()
}

/// 汉字转完整拼音（无声调、无分隔），其余字符转小写保留
pub fn to_pinyin_full(text: &str) -> String {
    text.chars()
        .flat_map(|c| match c.to_pinyin() {
            Some(py) => py.plain().chars().collect::<Vec<_>>(),
            None => c.to_lowercase().collect(),
        })
        .collect()
}

/// 子串匹配，另外允许用拼音首字母或完整拼音命中汉字
pub fn pinyin_match(query: &str, text: &str) -> bool {
    if contains_ignore_case(query, text) {
        return true;
    }
    let query = query.to_lowercase();
    if query.is_empty() || !query.is_ascii() {
        return false;
    }
    to_pinyin_initials(text).contains(&query) || to_pinyin_full(text).contains(&query)
}
