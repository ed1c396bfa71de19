//! 系统剪贴板绑定端口
//!
//! 核心逻辑只依赖此 trait，不直接接触平台剪贴板：
//! - 监听注册/注销为同步调用，失败时由 Bridge 映射为 `AppError::Listener`
//! - 变化事件通过 `EventSender` 推送进单线程事件循环
//! - 写入为异步调用，实现方自行决定是否放到阻塞线程执行

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::models::CapturedClipboardEvent;

/// 绑定层向核心推送变化事件的通道
pub type EventSender = mpsc::UnboundedSender<CapturedClipboardEvent>;

/// 解码后的 RGBA 像素，供 `write_image` 使用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ClipboardBinding: Send + Sync {
    /// 注册系统变化通知，之后每次变化向 `events` 推送一次快照
    fn start_listening(&self, events: EventSender) -> Result<(), AppError>;

    /// 注销系统变化通知
    fn stop_listening(&self) -> Result<(), AppError>;

    async fn write_text(&self, text: String) -> Result<(), AppError>;

    /// 写入 HTML，`alt_text` 为纯文本回退
    async fn write_html(&self, html: String, alt_text: String) -> Result<(), AppError>;

    async fn write_image(&self, image: RgbaImage) -> Result<(), AppError>;

    async fn write_files(&self, paths: Vec<String>) -> Result<(), AppError>;
}
