//! 查询匹配
//!
//! 依次检查类型、标签、关键词，任一不满足立即返回 `false`。
//! 大小写与模糊程度完全由注入的匹配函数决定，这里只负责
//! 为 HTML 条目准备去标签后的搜索文本。

use crate::markup::html_to_search_text;
use crate::models::{ContentType, HistoryItem};

use super::parser::ParsedQuery;

/// 条目用于关键词匹配的文本
pub fn searchable_text(item: &HistoryItem) -> String {
    match item.content_type {
        ContentType::Html if item.content.trim().is_empty() => {
            html_to_search_text(item.html.as_deref().unwrap_or_default())
        }
        ContentType::Html => html_to_search_text(&item.content),
        _ => item.content.clone(),
    }
}

/// 判断条目是否匹配解析后的查询；无效查询匹配所有条目
pub fn matches_query<F>(item: &HistoryItem, query: &ParsedQuery, fuzzy: F) -> bool
where
    F: Fn(&str, &str) -> bool,
{
    if !query.is_valid {
        return true;
    }

    if !query.types.is_empty() && !query.types.contains(&item.content_type) {
        return false;
    }

    if !query.tags.is_empty() {
        let has_matching_tag = query.tags.iter().any(|tag| {
            item.tags
                .iter()
                .any(|item_tag| item_tag.to_lowercase() == tag.to_lowercase())
        });
        if !has_matching_tag {
            return false;
        }
    }

    if !query.keywords.is_empty() {
        let search_text = searchable_text(item);
        let path_text = item
            .file_paths
            .as_ref()
            .filter(|paths| !paths.is_empty())
            .map(|paths| paths.join(" "));

        let all_keywords_match = query.keywords.iter().all(|keyword| {
            fuzzy(keyword, &search_text)
                || path_text
                    .as_deref()
                    .is_some_and(|paths| fuzzy(keyword, paths))
        });
        if !all_keywords_match {
            return false;
        }
    }

    true
}
