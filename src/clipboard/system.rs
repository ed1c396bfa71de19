//! 系统剪贴板绑定
//!
//! # 设计思路
//!
//! - 监听：`clipboard-master` 在独立线程运行，每次变化读取一次快照
//!   （文件列表 + 图片 + HTML + 文本），通过通道送入核心事件循环。
//! - 文件列表：Windows 读取 CF_HDROP；其他平台把全部由 `file://` URI
//!   组成的文本视为文件列表（文件管理器复制时的常见形式）。
//! - 读取不到任何内容时也发送空快照，保证每个系统通知都会被
//!   Bridge 观察一次，自写标志不会残留。
//! - 写入：`arboard` 为阻塞调用，统一放到 `spawn_blocking` 执行。
//!   文件列表在 Windows 写为 CF_HDROP，其他平台写为换行分隔的路径文本。
//!
//! # 实现思路
//!
//! - 监听线程退出（非主动停止）时按指数退避重启：100ms 起，上限 5s。
//! - 停止监听只设置停止标志，`clipboard-master` 在下一次回调时返回 `Stop`。
//! - 捕获到的图片先落盘为 PNG，快照中只携带路径。

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, mpsc as std_mpsc};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use clipboard_master::{CallbackResult, ClipboardHandler, Master};

use crate::error::AppError;
use crate::models::{CapturedClipboardEvent, CapturedHtml, CapturedImage};

use super::binding::{ClipboardBinding, EventSender, RgbaImage};
use super::image_store::save_rgba_png;

const MONITOR_RESTART_BASE_DELAY_MS: u64 = 100;
const MONITOR_RESTART_MAX_DELAY_MS: u64 = 5_000;

fn compute_restart_backoff_ms(restart_attempt: u32) -> u64 {
    let exp = 1_u64 << restart_attempt.saturating_sub(1).min(6);
    MONITOR_RESTART_BASE_DELAY_MS
        .saturating_mul(exp)
        .min(MONITOR_RESTART_MAX_DELAY_MS)
}

fn capture_image(images_dir: &Path, clipboard: &mut arboard::Clipboard) -> Option<CapturedImage> {
    let image_data = clipboard.get_image().ok()?;
    let width = u32::try_from(image_data.width).ok()?;
    let height = u32::try_from(image_data.height).ok()?;
    match save_rgba_png(images_dir, width, height, image_data.bytes.into_owned()) {
        Ok(image) => Some(image),
        Err(err) => {
            log::warn!("保存剪贴板图片失败，忽略图片负载: {}", err);
            None
        }
    }
}

/// 整段文本的每个非空行都是 `file://` URI 时解析为本地路径列表
fn parse_uri_list(text: &str) -> Option<Vec<String>> {
    let mut paths = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !line.starts_with("file://") {
            return None;
        }
        let path = url::Url::parse(line).ok()?.to_file_path().ok()?;
        paths.push(path.to_string_lossy().to_string());
    }
    if paths.is_empty() { None } else { Some(paths) }
}

#[cfg(target_os = "windows")]
fn read_file_list() -> Option<Vec<String>> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use windows::Win32::System::DataExchange::{CloseClipboard, GetClipboardData, OpenClipboard};
    use windows::Win32::System::Ole::CF_HDROP;
    use windows::Win32::UI::Shell::{DragQueryFileW, HDROP};

    unsafe {
        if OpenClipboard(None).is_err() {
            return None;
        }

        let files = (|| -> Option<Vec<String>> {
            let handle = GetClipboardData(CF_HDROP.0 as u32).ok()?;
            let hdrop = HDROP(handle.0);
            let count = DragQueryFileW(hdrop, 0xFFFFFFFF, None);

            let mut files = Vec::with_capacity(count as usize);
            for i in 0..count {
                let len = DragQueryFileW(hdrop, i, None);
                if len == 0 {
                    continue;
                }

                let mut buf = vec![0u16; (len + 1) as usize];
                DragQueryFileW(hdrop, i, Some(&mut buf));
                if let Some(pos) = buf.iter().position(|&c| c == 0) {
                    buf.truncate(pos);
                }
                files.push(OsString::from_wide(&buf).to_string_lossy().to_string());
            }
            if files.is_empty() { None } else { Some(files) }
        })();

        let _ = CloseClipboard();
        if let Some(files) = &files {
            log::info!("📁 从剪贴板读取到 {} 个文件", files.len());
        }
        files
    }
}

#[cfg(not(target_os = "windows"))]
fn read_file_list() -> Option<Vec<String>> {
    None
}

#[cfg(target_os = "windows")]
fn write_file_list(paths: &[String]) -> Result<(), AppError> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    use windows::Win32::Foundation::{GlobalFree, HANDLE};
    use windows::Win32::System::DataExchange::{
        CloseClipboard, EmptyClipboard, OpenClipboard, SetClipboardData,
    };
    use windows::Win32::System::Memory::{GMEM_MOVEABLE, GlobalAlloc, GlobalLock, GlobalUnlock};
    use windows::Win32::System::Ole::CF_HDROP;
    use windows::Win32::UI::Shell::DROPFILES;

    let encoded_paths: Vec<Vec<u16>> = paths
        .iter()
        .map(|path| {
            OsStr::new(path)
                .encode_wide()
                .chain(std::iter::once(0))
                .collect::<Vec<u16>>()
        })
        .collect();

    unsafe {
        OpenClipboard(None).map_err(|e| AppError::Write(format!("打开剪贴板失败：{:?}", e)))?;

        EmptyClipboard().map_err(|e| {
            let _ = CloseClipboard();
            AppError::Write(format!("清空剪贴板失败：{:?}", e))
        })?;

        let mut size = std::mem::size_of::<DROPFILES>();
        size += encoded_paths
            .iter()
            .map(|wide| wide.len() * std::mem::size_of::<u16>())
            .sum::<usize>();
        size += std::mem::size_of::<u16>();

        let hglobal = GlobalAlloc(GMEM_MOVEABLE, size).map_err(|e| {
            let _ = CloseClipboard();
            AppError::Write(format!("分配内存失败：{:?}", e))
        })?;

        let ptr = GlobalLock(hglobal) as *mut u8;
        if ptr.is_null() {
            let _ = GlobalFree(Some(hglobal));
            let _ = CloseClipboard();
            return Err(AppError::Write("锁定内存失败".to_string()));
        }

        let drop_files = ptr as *mut DROPFILES;
        std::ptr::write_bytes(drop_files, 0, 1);
        (*drop_files).pFiles = std::mem::size_of::<DROPFILES>() as u32;
        (*drop_files).fWide = true.into();

        let mut file_ptr = ptr.add(std::mem::size_of::<DROPFILES>()) as *mut u16;
        for wide in &encoded_paths {
            std::ptr::copy_nonoverlapping(wide.as_ptr(), file_ptr, wide.len());
            file_ptr = file_ptr.add(wide.len());
        }
        *file_ptr = 0;

        let _ = GlobalUnlock(hglobal);

        if let Err(e) = SetClipboardData(CF_HDROP.0 as u32, Some(HANDLE(hglobal.0))) {
            let _ = GlobalFree(Some(hglobal));
            let _ = CloseClipboard();
            return Err(AppError::Write(format!("设置剪贴板数据失败：{:?}", e)));
        }

        let _ = CloseClipboard();
        log::info!("文件已复制到剪贴板：{} 个", paths.len());
        Ok(())
    }
}

/// 读取当前剪贴板快照；无法打开剪贴板时返回空快照
fn read_snapshot(images_dir: &Path) -> CapturedClipboardEvent {
    let mut clipboard = match arboard::Clipboard::new() {
        Ok(clipboard) => clipboard,
        Err(err) => {
            log::warn!("打开剪贴板失败: {}", err);
            return CapturedClipboardEvent::default();
        }
    };

    let text = clipboard.get_text().ok();
    let files = read_file_list().or_else(|| text.as_deref().and_then(parse_uri_list));
    let html = clipboard
        .get()
        .html()
        .ok()
        .filter(|html| !html.trim().is_empty())
        .map(|html| CapturedHtml {
            html,
            text: text.clone(),
        });

    CapturedClipboardEvent {
        files,
        image: capture_image(images_dir, &mut clipboard),
        html,
        text,
    }
}

/// `clipboard-master` 回调处理器
struct Handler {
    events: EventSender,
    images_dir: PathBuf,
    stop: Arc<AtomicBool>,
}

impl ClipboardHandler for Handler {
    fn on_clipboard_change(&mut self) -> CallbackResult {
        if self.stop.load(Ordering::SeqCst) {
            return CallbackResult::Stop;
        }

        let snapshot = read_snapshot(&self.images_dir);
        if self.events.send(snapshot).is_err() {
            log::warn!("📋 事件通道已关闭，停止监听");
            self.stop.store(true, Ordering::SeqCst);
            return CallbackResult::Stop;
        }
        CallbackResult::Next
    }

    fn on_clipboard_error(&mut self, error: std::io::Error) -> CallbackResult {
        log::error!("剪贴板错误：{}", error);
        CallbackResult::Next
    }
}

/// 基于 `arboard` + `clipboard-master` 的系统剪贴板实现
pub struct SystemClipboard {
    images_dir: PathBuf,
    active: Mutex<Option<Arc<AtomicBool>>>,
}

impl SystemClipboard {
    /// `images_dir` 为捕获图片的落盘目录
    pub fn new(images_dir: PathBuf) -> Self {
        Self {
            images_dir,
            active: Mutex::new(None),
        }
    }

    fn active(&self) -> MutexGuard<'_, Option<Arc<AtomicBool>>> {
        match self.active.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("剪贴板监听状态锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        }
    }

    fn spawn_monitor(
        &self,
        events: EventSender,
        stop: Arc<AtomicBool>,
    ) -> Result<(), AppError> {
        let (ready_tx, ready_rx) = std_mpsc::channel::<Result<(), String>>();
        let images_dir = self.images_dir.clone();

        thread::Builder::new()
            .name("clipboard-monitor".to_string())
            .spawn(move || {
                let mut ready_tx = Some(ready_tx);
                let mut restart_attempt: u32 = 0;
                loop {
                    let handler = Handler {
                        events: events.clone(),
                        images_dir: images_dir.clone(),
                        stop: Arc::clone(&stop),
                    };
                    match Master::new(handler) {
                        Ok(mut master) => {
                            if let Some(tx) = ready_tx.take() {
                                let _ = tx.send(Ok(()));
                            }
                            restart_attempt = 0;
                            log::info!("📋 剪贴板监听已启动");
                            if let Err(err) = master.run() {
                                log::warn!("📋 剪贴板监听异常退出: {}", err);
                            }
                        }
                        Err(err) => {
                            if let Some(tx) = ready_tx.take() {
                                let _ = tx.send(Err(err.to_string()));
                                return;
                            }
                            log::error!("📋 创建剪贴板监听失败: {}", err);
                        }
                    }

                    if stop.load(Ordering::SeqCst) {
                        log::info!("📋 剪贴板监听已停止");
                        return;
                    }

                    restart_attempt = restart_attempt.saturating_add(1);
                    let backoff_ms = compute_restart_backoff_ms(restart_attempt);
                    log::warn!(
                        "📋 剪贴板监听 {}ms 后重试（attempt={}）",
                        backoff_ms,
                        restart_attempt
                    );
                    thread::sleep(Duration::from_millis(backoff_ms));
                }
            })
            .map_err(|e| AppError::Listener(format!("创建监听线程失败: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(AppError::Listener(err)),
            Err(_) => Err(AppError::Listener("监听线程意外退出".to_string())),
        }
    }
}

async fn run_blocking<F>(op: &'static str, write: F) -> Result<(), AppError>
where
    F: FnOnce(&mut arboard::Clipboard) -> Result<(), arboard::Error> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| AppError::Write(e.to_string()))?;
        write(&mut clipboard).map_err(|e| AppError::Write(format!("{}: {}", op, e)))
    })
    .await
    .map_err(|e| AppError::Write(format!("写入任务异常: {}", e)))?
}

#[async_trait]
impl ClipboardBinding for SystemClipboard {
    fn start_listening(&self, events: EventSender) -> Result<(), AppError> {
        let mut active = self.active();
        if active.is_some() {
            return Ok(());
        }
        let stop = Arc::new(AtomicBool::new(false));
        self.spawn_monitor(events, Arc::clone(&stop))?;
        *active = Some(stop);
        Ok(())
    }

    fn stop_listening(&self) -> Result<(), AppError> {
        if let Some(stop) = self.active().take() {
            stop.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn write_text(&self, text: String) -> Result<(), AppError> {
        run_blocking("set_text", move |clipboard| clipboard.set_text(text)).await
    }

    async fn write_html(&self, html: String, alt_text: String) -> Result<(), AppError> {
        run_blocking("set_html", move |clipboard| {
            clipboard.set_html(html, Some(alt_text))
        })
        .await
    }

    async fn write_image(&self, image: RgbaImage) -> Result<(), AppError> {
        run_blocking("set_image", move |clipboard| {
            clipboard.set_image(arboard::ImageData {
                width: image.width as usize,
                height: image.height as usize,
                bytes: Cow::Owned(image.bytes),
            })
        })
        .await
    }

    #[cfg(target_os = "windows")]
    async fn write_files(&self, paths: Vec<String>) -> Result<(), AppError> {
        tokio::task::spawn_blocking(move || write_file_list(&paths))
            .await
            .map_err(|e| AppError::Write(format!("写入任务异常: {}", e)))?
    }

    /// 以换行分隔的路径文本写入
    #[cfg(not(target_os = "windows"))]
    async fn write_files(&self, paths: Vec<String>) -> Result<(), AppError> {
        let text = paths.join("\n");
        run_blocking("set_text", move |clipboard| clipboard.set_text(text)).await
    }
}
