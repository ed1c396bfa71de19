//! 数据模型模块
//!
//! 捕获事件 → 分类结果 → 存储条目 三层模型：
//!
//! - [`CapturedClipboardEvent`]：系统剪贴板每次变化时产生的瞬时快照
//! - [`ClassifiedItem`]：分类器输出，交给外部存储持久化
//! - [`HistoryItem`]：外部存储返回的历史条目（带 ID、时间、标签）

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 剪贴板内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// 纯文本
    Text,
    /// HTML 格式
    Html,
    /// 富文本 (RTF)
    Rtf,
    /// 图片
    Image,
    /// 单个文件
    File,
    /// 单个文件夹
    Folder,
    /// 多个文件/文件夹
    Files,
}

impl ContentType {
    pub const ALL: [ContentType; 7] = [
        ContentType::Text,
        ContentType::Html,
        ContentType::Rtf,
        ContentType::Image,
        ContentType::File,
        ContentType::Folder,
        ContentType::Files,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Html => "html",
            ContentType::Rtf => "rtf",
            ContentType::Image => "image",
            ContentType::File => "file",
            ContentType::Folder => "folder",
            ContentType::Files => "files",
        }
    }

    /// 文件类条目（file / folder / files）携带 `file_paths`
    pub fn is_file_like(self) -> bool {
        matches!(self, ContentType::File | ContentType::Folder | ContentType::Files)
    }

    /// 带标记的文本类型，强制纯文本时需要去除标记
    pub fn has_markup(self) -> bool {
        matches!(self, ContentType::Html | ContentType::Rtf)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 剪贴板元数据，字段是否有意义由 `ContentType` 决定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardMetadata {
    // 图片
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    // 单个文件 / 文件夹
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,

    // 多个文件
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<u32>,
}

// ============================================================================
// 捕获事件
// ============================================================================

/// 系统剪贴板中的图片（已由系统绑定层落盘）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedImage {
    /// 图片引用：文件路径或 `data:` URL
    pub reference: String,
    pub width: u32,
    pub height: u32,
    /// 编码格式，如 `png`
    pub format: String,
}

/// HTML 负载，附带可选的纯文本伴随内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedHtml {
    pub html: String,
    pub text: Option<String>,
}

/// 一次系统剪贴板变化的原始快照
///
/// 一次通知中可能同时出现多种格式（例如浏览器复制同时放入文本和图片），
/// 由分类器按 文件 > 图片 > HTML > 文本 的优先级只取一种。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedClipboardEvent {
    pub files: Option<Vec<String>>,
    pub image: Option<CapturedImage>,
    pub html: Option<CapturedHtml>,
    pub text: Option<String>,
}

impl CapturedClipboardEvent {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn from_html(html: impl Into<String>, text: Option<String>) -> Self {
        Self {
            html: Some(CapturedHtml {
                html: html.into(),
                text,
            }),
            ..Self::default()
        }
    }

    pub fn from_image(image: CapturedImage) -> Self {
        Self {
            image: Some(image),
            ..Self::default()
        }
    }

    pub fn from_files(files: Vec<String>) -> Self {
        Self {
            files: Some(files),
            ..Self::default()
        }
    }
}

// ============================================================================
// 分类结果 & 历史条目
// ============================================================================

/// 分类器输出，交给外部存储持久化
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedItem {
    pub content_type: ContentType,
    /// 文本内容、换行拼接的路径，或图片引用
    pub content: String,
    /// 原始 HTML（仅 html 类型）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ClipboardMetadata>,
    /// 该变化是否由本应用写回触发
    pub is_internal_copy: bool,
    /// 自动收藏（由设置 `auto_favorite` 决定）
    #[serde(default)]
    pub is_favorite: bool,
    /// 内容 SHA-256（十六进制），存储层据此去重
    pub content_hash: String,
}

/// 剪贴板历史记录项（由外部存储返回）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: i64,
    pub content_type: ContentType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ClipboardMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub content_hash: String,
}

impl HistoryItem {
    /// 由分类结果构造存储条目，供存储实现复用
    pub fn from_classified(id: i64, item: ClassifiedItem, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            content_type: item.content_type,
            content: item.content,
            html: item.html,
            created_at,
            metadata: item.metadata,
            file_paths: item.file_paths,
            thumbnail_path: item.thumbnail_path,
            tags: Vec::new(),
            is_favorite: item.is_favorite,
            content_hash: item.content_hash,
        }
    }
}

// ============================================================================
// 存储请求
// ============================================================================

/// 获取历史记录的请求
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetHistoryRequest {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// 搜索请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: Option<usize>,
}

/// 清空历史请求（按条数 / 按天数 / 全部）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearHistoryRequest {
    /// 保留的条数（`None` 表示不按条数清理）
    pub keep_count: Option<usize>,
    /// 保留的天数（`None` 表示不按日期清理）
    pub keep_days: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_serializes_snake_case() {
        let json = serde_json::to_string(&ContentType::Files).expect("serialize");
        assert_eq!(json, "\"files\"");
        let parsed: ContentType = serde_json::from_str("\"folder\"").expect("deserialize");
        assert_eq!(parsed, ContentType::Folder);
    }

    #[test]
    fn as_str_matches_serde_name() {
        for ty in ContentType::ALL {
            let json = serde_json::to_string(&ty).expect("serialize");
            assert_eq!(json, format!("\"{}\"", ty.as_str()));
        }
    }

    #[test]
    fn history_item_tolerates_missing_optional_fields() {
        let json = r#"{
            "id": 7,
            "content_type": "text",
            "content": "hello",
            "created_at": "2024-01-01T00:00:00Z"
        }"#;
        let item: HistoryItem = serde_json::from_str(json).expect("deserialize");
        assert_eq!(item.id, 7);
        assert!(item.tags.is_empty());
        assert!(!item.is_favorite);
        assert!(item.file_paths.is_none());
    }

    #[test]
    fn metadata_skips_empty_fields() {
        let meta = ClipboardMetadata {
            item_count: Some(3),
            ..ClipboardMetadata::default()
        };
        let json = serde_json::to_string(&meta).expect("serialize");
        assert_eq!(json, r#"{"item_count":3}"#);
    }
}
