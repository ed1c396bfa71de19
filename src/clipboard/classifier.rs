//! 内容分类器
//!
//! 将一次剪贴板快照映射为带类型与元数据的 [`ClassifiedItem`]。
//!
//! 优先级：文件列表 > 图片 > HTML > 纯文本。只分类优先级最高的非空负载，
//! 同一事件中其余负载直接丢弃。没有任何可识别负载时返回 `None`，
//! 上层据此跳过存储调用。

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::models::{CapturedClipboardEvent, ClassifiedItem, ClipboardMetadata, ContentType};

/// 使用磁盘元数据补全单文件大小
pub fn classify(event: &CapturedClipboardEvent) -> Option<ClassifiedItem> {
    classify_with(event, file_size_on_disk)
}

/// 分类入口，`file_size` 用于查询单个文件的大小（便于测试注入）
pub fn classify_with(
    event: &CapturedClipboardEvent,
    file_size: impl Fn(&Path) -> Option<u64>,
) -> Option<ClassifiedItem> {
    classify_payload(event, file_size).map(|mut item| {
        item.content_hash = content_hash(&item);
        item
    })
}

fn classify_payload(
    event: &CapturedClipboardEvent,
    file_size: impl Fn(&Path) -> Option<u64>,
) -> Option<ClassifiedItem> {
    if let Some(files) = event.files.as_deref().filter(|f| !f.is_empty()) {
        return Some(classify_files(files, file_size));
    }

    if let Some(image) = &event.image {
        return Some(ClassifiedItem {
            metadata: Some(ClipboardMetadata {
                width: Some(image.width),
                height: Some(image.height),
                format: Some(image.format.clone()),
                ..ClipboardMetadata::default()
            }),
            thumbnail_path: Some(image.reference.clone()),
            ..base_item(ContentType::Image, image.reference.clone())
        });
    }

    if let Some(html) = event.html.as_ref().filter(|h| !h.html.is_empty()) {
        return Some(ClassifiedItem {
            html: Some(html.html.clone()),
            ..base_item(ContentType::Html, html.text.clone().unwrap_or_default())
        });
    }

    if let Some(text) = event.text.as_deref().filter(|t| !t.trim().is_empty()) {
        return Some(base_item(ContentType::Text, text.to_string()));
    }

    None
}

fn base_item(content_type: ContentType, content: String) -> ClassifiedItem {
    ClassifiedItem {
        content_type,
        content,
        html: None,
        file_paths: None,
        thumbnail_path: None,
        metadata: None,
        is_internal_copy: false,
        is_favorite: false,
        content_hash: String::new(),
    }
}

/// 去重键：类型 + 主负载（HTML 取原始标记）的 SHA-256
pub fn content_hash(item: &ClassifiedItem) -> String {
    let payload = item.html.as_deref().unwrap_or(&item.content);
    let mut hasher = Sha256::new();
    hasher.update(item.content_type.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(payload.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 末段去掉结尾的 `.` 后仍含 `.` 即视为带扩展名（`.bashrc` 也算文件）
fn has_extension_marker(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().trim_end_matches('.').contains('.'))
        .unwrap_or(false)
}

fn classify_files(files: &[String], file_size: impl Fn(&Path) -> Option<u64>) -> ClassifiedItem {
    let content = files.join("\n");

    let (content_type, metadata) = match files {
        [single] => {
            let path = Path::new(single);
            let content_type = if has_extension_marker(path) {
                ContentType::File
            } else {
                ContentType::Folder
            };
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| single.clone());
            let size = match content_type {
                ContentType::File => file_size(path),
                _ => None,
            };
            (
                content_type,
                ClipboardMetadata {
                    file_name: Some(file_name),
                    file_size: size,
                    ..ClipboardMetadata::default()
                },
            )
        }
        many => (
            ContentType::Files,
            ClipboardMetadata {
                item_count: Some(u32::try_from(many.len()).unwrap_or(u32::MAX)),
                ..ClipboardMetadata::default()
            },
        ),
    };

    ClassifiedItem {
        file_paths: Some(files.to_vec()),
        metadata: Some(metadata),
        ..base_item(content_type, content)
    }
}

fn file_size_on_disk(path: &Path) -> Option<u64> {
    std::fs::metadata(path).ok().filter(|m| m.is_file()).map(|m| m.len())
}
