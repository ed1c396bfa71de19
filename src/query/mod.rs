//! 搜索模块
//!
//! - `parser`: 查询字符串 → [`ParsedQuery`]
//! - `matcher`: 用 [`ParsedQuery`] 判断单条历史是否命中
//! - `fuzzy`: 默认的关键词匹配函数
//! - `recent`: 最近搜索记录
//! - `highlight`: 关键词高亮
//!
//! [`SmartSearch`] 组合以上部分，保存当前查询并在每次变化时发布解析结果。

pub mod fuzzy;
pub mod highlight;
pub mod matcher;
pub mod parser;
pub mod recent;

use std::path::Path;

use tokio::sync::watch;

pub use fuzzy::{contains_ignore_case, pinyin_match, subsequence_match};
pub use highlight::highlight_matches;
pub use matcher::{matches_query, searchable_text};
pub use parser::{ParsedQuery, parse_query, resolve_type_alias, validate_alias_table};
pub use recent::RecentSearches;

use crate::models::ContentType;

/// 智能搜索状态
pub struct SmartSearch {
    query: String,
    parsed: watch::Sender<ParsedQuery>,
    recent: RecentSearches,
}

impl SmartSearch {
    pub fn new(recent: RecentSearches) -> Self {
        let (parsed, _rx) = watch::channel(ParsedQuery::default());
        Self {
            query: String::new(),
            parsed,
            recent,
        }
    }

    /// 最近搜索记录持久化到数据目录
    pub fn with_data_dir(data_dir: &Path) -> Self {
        Self::new(RecentSearches::load(data_dir))
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn parsed(&self) -> ParsedQuery {
        self.parsed.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ParsedQuery> {
        self.parsed.subscribe()
    }

    pub fn recent_searches(&self) -> &[String] {
        self.recent.entries()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.parsed.send_replace(parse_query(&self.query));
    }

    /// 执行搜索：更新查询并记入最近搜索
    pub fn execute_search(&mut self, query: impl Into<String>) -> ParsedQuery {
        self.set_query(query);
        let trimmed = self.query.trim().to_string();
        self.recent.add(&trimmed);
        self.parsed()
    }

    pub fn clear_search(&mut self) {
        self.set_query(String::new());
    }

    pub fn add_tag_to_search(&mut self, tag: &str) {
        self.append_directive(tag);
    }

    pub fn add_type_to_search(&mut self, content_type: ContentType) {
        self.append_directive(content_type.as_str());
    }

    pub fn remove_history(&mut self, query: &str) {
        self.recent.remove(query);
    }

    pub fn clear_history(&mut self) {
        self.recent.clear();
    }

    fn append_directive(&mut self, value: &str) {
        let directive = format!("@{value}");
        if self.query.split_whitespace().any(|token| token == directive) {
            return;
        }
        let next = if self.query.trim().is_empty() {
            directive
        } else {
            format!("{} {}", self.query.trim_end(), directive)
        };
        self.set_query(next);
    }
}

impl Default for SmartSearch {
    fn default() -> Self {
        Self::new(RecentSearches::in_memory())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_query_publishes_parsed_result() {
        let mut search = SmartSearch::default();
        let rx = search.subscribe();
        search.set_query("hello @work");
        let parsed = rx.borrow().clone();
        assert_eq!(parsed.keywords, vec!["hello"]);
        assert_eq!(parsed.tags, vec!["work"]);
    }

    #[test]
    fn directives_are_appended_once() {
        let mut search = SmartSearch::default();
        search.set_query("report");
        search.add_tag_to_search("work");
        search.add_tag_to_search("work");
        search.add_type_to_search(ContentType::Image);
        assert_eq!(search.query(), "report @work @image");
        assert_eq!(search.parsed().types, vec![ContentType::Image]);
    }

    #[test]
    fn directive_on_empty_query_has_no_leading_space() {
        let mut search = SmartSearch::default();
        search.add_type_to_search(ContentType::Html);
        assert_eq!(search.query(), "@html");
    }

    #[test]
    fn execute_search_records_recent() {
        let mut search = SmartSearch::default();
        search.execute_search(" first ");
        search.execute_search("second");
        assert_eq!(search.recent_searches(), ["second", "first"]);
        search.remove_history("first");
        assert_eq!(search.recent_searches(), ["second"]);
    }

    #[test]
    fn clear_search_resets_parsed_query() {
        let mut search = SmartSearch::default();
        search.set_query("@text");
        search.clear_search();
        assert_eq!(search.query(), "");
        assert!(!search.parsed().is_valid);
    }
}
