//! 搜索查询解析
//!
//! 支持的语法：
//! - `关键词`：空白分隔的普通词
//! - `@类型`：按内容类型过滤（`@text`、`@html`、`@图片`、`@文件` ……）
//! - `@标签名`：不是已知类型别名的 `@` 指令都视为标签过滤
//!
//! 指令先按位置从后往前删除（避免前面的偏移失效），剩余文本再切分为关键词。

use std::collections::HashMap;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::AppError;
use crate::models::ContentType;

use ContentType::{File, Files, Folder, Html, Image, Rtf, Text};

/// 类型别名表：别名（已规范化为小写） → 内容类型集合
const TYPE_ALIASES: &[(&str, &[ContentType])] = &[
    ("text", &[Text, Html, Rtf]),
    ("文本", &[Text, Html, Rtf]),
    ("文字", &[Text, Html, Rtf]),
    ("html", &[Html]),
    ("rtf", &[Rtf]),
    ("image", &[Image]),
    ("图片", &[Image]),
    ("照片", &[Image]),
    ("file", &[File, Files, Folder]),
    ("文件", &[File, Files, Folder]),
    ("folder", &[Folder]),
    ("文件夹", &[Folder]),
];

static ALIAS_TABLE: Lazy<HashMap<&'static str, &'static [ContentType]>> =
    Lazy::new(|| TYPE_ALIASES.iter().copied().collect());

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@([^\s@]+)").unwrap());

/// 校验别名表：键已规范化、无重复、展开集合非空。启动时调用一次。
pub fn validate_alias_table() -> Result<usize, AppError> {
    check_aliases(TYPE_ALIASES)?;
    Ok(ALIAS_TABLE.len())
}

fn check_aliases(table: &[(&str, &[ContentType])]) -> Result<(), AppError> {
    let mut seen = HashMap::new();
    for (alias, types) in table {
        if alias.is_empty() || alias.to_lowercase() != *alias {
            return Err(AppError::AliasTable(format!("未规范化的别名: '{alias}'")));
        }
        if types.is_empty() {
            return Err(AppError::AliasTable(format!("别名 '{alias}' 没有对应类型")));
        }
        if seen.insert(*alias, ()).is_some() {
            return Err(AppError::AliasTable(format!("重复的别名: '{alias}'")));
        }
    }
    Ok(())
}

/// 查找类型别名：先按小写匹配，再按原样匹配
pub fn resolve_type_alias(value: &str) -> Option<&'static [ContentType]> {
    ALIAS_TABLE
        .get(value.to_lowercase().as_str())
        .or_else(|| ALIAS_TABLE.get(value))
        .copied()
}

/// 搜索查询解析结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedQuery {
    /// 去除 `@` 指令后的关键词
    pub keywords: Vec<String>,
    /// 标签过滤（去重，区分大小写）
    pub tags: Vec<String>,
    /// 类型过滤（别名展开后去重）
    pub types: Vec<ContentType>,
    /// 去除首尾空白后的原始查询
    pub raw: String,
    pub is_valid: bool,
}

fn push_unique<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if !values.contains(&value) {
        values.push(value);
    }
}

/// 解析搜索查询字符串
pub fn parse_query(query: &str) -> ParsedQuery {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return ParsedQuery::default();
    }

    let mut tags = Vec::new();
    let mut types = Vec::new();
    let mut directive_spans: Vec<Range<usize>> = Vec::new();

    for caps in DIRECTIVE.captures_iter(trimmed) {
        let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        directive_spans.push(whole.range());

        match resolve_type_alias(value.as_str()) {
            Some(expanded) => {
                for ty in expanded {
                    push_unique(&mut types, *ty);
                }
            }
            None => push_unique(&mut tags, value.as_str().to_string()),
        }
    }

    let mut remaining = trimmed.to_string();
    for span in directive_spans.into_iter().rev() {
        remaining.replace_range(span, "");
    }

    let keywords: Vec<String> = remaining.split_whitespace().map(str::to_string).collect();
    let is_valid = !keywords.is_empty() || !tags.is_empty() || !types.is_empty();

    ParsedQuery {
        keywords,
        tags,
        types,
        raw: trimmed.to_string(),
        is_valid,
    }
}
