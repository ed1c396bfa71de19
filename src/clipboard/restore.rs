//! 写回调度
//!
//! 按条目类型把历史内容写回系统剪贴板。
//!
//! 写入前设置自写标志，使随后的系统变化通知被标记为内部写回。
//! 写锁从设置标志一直持有到系统写入完成，期间不会有其他写入插入；
//! 写入失败时守卫自动清除标志，错误原样上报，不重试。

use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use crate::error::AppError;
use crate::markup::{strip_html, strip_rtf};
use crate::models::{ContentType, HistoryItem};
use crate::settings::CoreSettings;

use super::SelfWriteFlag;
use super::binding::{ClipboardBinding, RgbaImage};
use super::image_store::load_image_reference;

/// 一次待执行的系统写入
#[derive(Debug, Clone, PartialEq, Eq)]
enum WriteRequest {
    Text(String),
    Html { html: String, alt_text: String },
    Image(RgbaImage),
    Files(Vec<String>),
}

impl WriteRequest {
    fn kind(&self) -> &'static str {
        match self {
            WriteRequest::Text(_) => "text",
            WriteRequest::Html { .. } => "html",
            WriteRequest::Image(_) => "image",
            WriteRequest::Files(_) => "files",
        }
    }
}

/// 条目 → 写入请求；`None` 表示无内容可写（不是错误）
fn plan_restore(item: &HistoryItem, plain_text: bool) -> Result<Option<WriteRequest>, AppError> {
    let html_source = || item.html.clone().unwrap_or_else(|| item.content.clone());

    if plain_text && item.content_type.has_markup() {
        let text = match item.content_type {
            ContentType::Html => strip_html(&html_source()),
            _ => strip_rtf(&item.content),
        };
        return Ok(Some(WriteRequest::Text(text)));
    }

    let request = match item.content_type {
        ContentType::Html => {
            let html = html_source();
            let alt_text = strip_html(&html);
            Some(WriteRequest::Html { html, alt_text })
        }
        ContentType::Image => {
            let reference = item
                .thumbnail_path
                .as_deref()
                .filter(|r| !r.trim().is_empty())
                .or(Some(item.content.as_str()).filter(|r| !r.trim().is_empty()));
            match reference {
                Some(reference) => Some(WriteRequest::Image(load_image_reference(reference)?)),
                None => {
                    log::debug!("🖼️ 图片条目 {} 没有图片引用，跳过写回", item.id);
                    None
                }
            }
        }
        ContentType::File | ContentType::Folder | ContentType::Files => {
            match item.file_paths.as_ref().filter(|paths| !paths.is_empty()) {
                Some(paths) => Some(WriteRequest::Files(paths.clone())),
                None => {
                    log::debug!("📁 文件条目 {} 没有路径，跳过写回", item.id);
                    None
                }
            }
        }
        ContentType::Text | ContentType::Rtf => Some(WriteRequest::Text(item.content.clone())),
    };
    Ok(request)
}

/// 历史条目写回系统剪贴板的唯一入口
pub struct RestoreDispatcher {
    binding: Arc<dyn ClipboardBinding>,
    flag: SelfWriteFlag,
    settings: watch::Receiver<CoreSettings>,
    write_lock: Mutex<()>,
}

impl RestoreDispatcher {
    pub fn new(
        binding: Arc<dyn ClipboardBinding>,
        flag: SelfWriteFlag,
        settings: watch::Receiver<CoreSettings>,
    ) -> Self {
        Self {
            binding,
            flag,
            settings,
            write_lock: Mutex::new(()),
        }
    }

    /// 写回一条历史记录
    ///
    /// `force_plain_text` 为 `None` 时使用设置中的 `copy_as_plain_text`。
    pub async fn restore(
        &self,
        item: &HistoryItem,
        force_plain_text: Option<bool>,
    ) -> Result<(), AppError> {
        let plain_text =
            force_plain_text.unwrap_or_else(|| self.settings.borrow().copy_as_plain_text);

        match plan_restore(item, plain_text)? {
            Some(request) => {
                log::info!(
                    "📋 写回历史条目 {} ({} -> {})",
                    item.id,
                    item.content_type,
                    request.kind()
                );
                self.dispatch(request).await
            }
            None => Ok(()),
        }
    }

    /// 直接写入纯文本（粘贴队列合并结果等）
    pub async fn write_plain_text(&self, text: impl Into<String>) -> Result<(), AppError> {
        self.dispatch(WriteRequest::Text(text.into())).await
    }

    async fn dispatch(&self, request: WriteRequest) -> Result<(), AppError> {
        let _lock = self.write_lock.lock().await;
        let guard = self.flag.arm();
        let kind = request.kind();

        let result = match request {
            WriteRequest::Text(text) => self.binding.write_text(text).await,
            WriteRequest::Html { html, alt_text } => self.binding.write_html(html, alt_text).await,
            WriteRequest::Image(image) => self.binding.write_image(image).await,
            WriteRequest::Files(paths) => self.binding.write_files(paths).await,
        };

        match result {
            Ok(()) => {
                guard.commit();
                Ok(())
            }
            Err(err) => {
                log::error!("❌ 写入剪贴板失败 ({}): {}", kind, err);
                Err(match err {
                    AppError::Write(_) => err,
                    other => AppError::Write(other.to_string()),
                })
            }
        }
    }
}
