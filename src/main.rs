//! # 剪贴板历史核心：命令行监听器
//!
//! 无界面运行：监听系统剪贴板，把每条分类结果以 JSON 行输出到标准输出，
//! Ctrl-C 退出。第一个参数为数据目录（默认当前目录下的 `clipboard-data`）。

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use clipboard_core::clipboard::{ClipboardBridge, SelfWriteFlag, SystemClipboard};
use clipboard_core::error::AppError;
use clipboard_core::history::{HistoryStore, HistoryView};
use clipboard_core::models::{
    ClassifiedItem, ClearHistoryRequest, GetHistoryRequest, HistoryItem, SearchRequest,
};
use clipboard_core::{query, settings, storage};

/// 只输出不保存的存储实现
struct JsonLinesStore {
    next_id: AtomicI64,
}

#[async_trait]
impl HistoryStore for JsonLinesStore {
    async fn persist(&self, item: &ClassifiedItem) -> Result<i64, AppError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = HistoryItem::from_classified(id, item.clone(), Utc::now());
        let line = serde_json::to_string(&record)
            .map_err(|e| AppError::Persistence(format!("序列化条目失败: {}", e)))?;
        println!("{}", line);
        Ok(id)
    }

    async fn query(&self, _request: GetHistoryRequest) -> Result<Vec<HistoryItem>, AppError> {
        Ok(Vec::new())
    }

    async fn search(&self, _request: SearchRequest) -> Result<Vec<HistoryItem>, AppError> {
        Ok(Vec::new())
    }

    async fn delete(&self, _id: i64) -> Result<(), AppError> {
        Ok(())
    }

    async fn clear(&self, _request: ClearHistoryRequest) -> Result<u64, AppError> {
        Ok(0)
    }

    async fn update_tags(&self, _id: i64, _tags: Vec<String>) -> Result<(), AppError> {
        Ok(())
    }

    async fn all_tags(&self) -> Result<Vec<String>, AppError> {
        Ok(Vec::new())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let aliases = query::validate_alias_table()?;
    log::info!("setup: 类型别名 {} 个", aliases);

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("clipboard-data"));
    let settings = settings::SettingsHandle::new(settings::load_settings(&data_dir)?);
    log::info!("setup: 设置已加载 ({})", data_dir.display());

    let images_dir = storage::images_dir(&data_dir, None)?;
    let binding = Arc::new(SystemClipboard::new(images_dir));
    let store = Arc::new(JsonLinesStore {
        next_id: AtomicI64::new(1),
    });
    let history = Arc::new(HistoryView::with_page_size(
        store,
        settings.current().history_page_size,
    ));

    let bridge = Arc::new(ClipboardBridge::new(
        binding,
        history,
        settings.subscribe(),
        SelfWriteFlag::new(),
    ));
    let _guard = bridge.start_scoped()?;

    tokio::select! {
        _ = bridge.run() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                log::warn!("监听 Ctrl-C 失败: {}", err);
            }
            log::info!("收到退出信号");
        }
    }
    Ok(())
}
