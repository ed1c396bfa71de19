//! 标记去除工具
//!
//! 写回纯文本、粘贴队列合并、搜索匹配都需要把 HTML / RTF 还原为纯文本。
//! 正则通过 `once_cell::sync::Lazy` 在首次调用时编译，后续零成本复用。

use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// RTF 头部表（字体表、颜色表、样式表、`{\*...}` 扩展组），支持一层嵌套
static RTF_HEADER_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\\(?:fonttbl|colortbl|stylesheet|info|\*)[^{}]*(?:\{[^{}]*\}[^{}]*)*\}").unwrap()
});

static RTF_PARAGRAPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\par\b ?").unwrap());

static RTF_HEX_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\'[0-9a-fA-F]{2}").unwrap());

static RTF_CONTROL_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[a-zA-Z]+-?\d* ?").unwrap());

/// 删除所有 HTML 标签，不做空白处理
pub fn strip_html(html: &str) -> String {
    HTML_TAG.replace_all(html, "").into_owned()
}

/// 用于搜索的 HTML 文本：标签替换为空格，连续空白折叠为一个空格
pub fn html_to_search_text(html: &str) -> String {
    let spaced = HTML_TAG.replace_all(html, " ");
    WHITESPACE_RUN.replace_all(&spaced, " ").trim().to_string()
}

/// 去除 RTF 控制字与分组，保留正文；非 RTF 文本原样返回
pub fn strip_rtf(rtf: &str) -> String {
    if !rtf.trim_start().starts_with("{\\rtf") {
        return rtf.to_string();
    }
    let body = RTF_HEADER_GROUP.replace_all(rtf, "");
    let body = RTF_PARAGRAPH.replace_all(&body, "\n");
    let body = RTF_HEX_ESCAPE.replace_all(&body, "");
    let body = RTF_CONTROL_WORD.replace_all(&body, "");
    body.replace(['{', '}'], "").trim().to_string()
}
