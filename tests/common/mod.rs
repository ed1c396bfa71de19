//! 集成测试共用的内存实现：假剪贴板绑定 + 内存历史存储

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use clipboard_core::clipboard::{
    ClipboardBinding, ClipboardBridge, EventSender, RestoreDispatcher, RgbaImage, SelfWriteFlag,
};
use clipboard_core::error::AppError;
use clipboard_core::history::{HistoryStore, HistoryView};
use clipboard_core::models::{
    CapturedClipboardEvent, ClassifiedItem, ClearHistoryRequest, ContentType, GetHistoryRequest,
    HistoryItem, SearchRequest,
};
use clipboard_core::query::contains_ignore_case;
use clipboard_core::settings::{CoreSettings, SettingsHandle};

/// 假绑定记录的一次写入
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Written {
    Text(String),
    Html { html: String, alt_text: String },
    Image { width: u32, height: u32 },
    Files(Vec<String>),
}

/// 内存剪贴板绑定
///
/// 监听中时，每次成功写入都会像系统一样回推一次变化通知。
#[derive(Default)]
pub struct FakeBinding {
    pub fail_start: AtomicBool,
    pub fail_write: AtomicBool,
    pub start_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
    pub writes: Mutex<Vec<Written>>,
    events: Mutex<Option<EventSender>>,
}

impl FakeBinding {
    pub fn writes(&self) -> Vec<Written> {
        self.writes.lock().expect("writes lock").clone()
    }

    fn record(&self, written: Written, echo: CapturedClipboardEvent) -> Result<(), AppError> {
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(AppError::Write("clipboard busy".to_string()));
        }
        self.writes.lock().expect("writes lock").push(written);
        if let Some(events) = self.events.lock().expect("events lock").as_ref() {
            let _ = events.send(echo);
        }
        Ok(())
    }
}

#[async_trait]
impl ClipboardBinding for FakeBinding {
    fn start_listening(&self, events: EventSender) -> Result<(), AppError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(AppError::Listener("registration refused".to_string()));
        }
        *self.events.lock().expect("events lock") = Some(events);
        Ok(())
    }

    fn stop_listening(&self) -> Result<(), AppError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        *self.events.lock().expect("events lock") = None;
        Ok(())
    }

    async fn write_text(&self, text: String) -> Result<(), AppError> {
        let echo = CapturedClipboardEvent::from_text(text.clone());
        self.record(Written::Text(text), echo)
    }

    async fn write_html(&self, html: String, alt_text: String) -> Result<(), AppError> {
        let echo = CapturedClipboardEvent::from_html(html.clone(), Some(alt_text.clone()));
        self.record(Written::Html { html, alt_text }, echo)
    }

    async fn write_image(&self, image: RgbaImage) -> Result<(), AppError> {
        self.record(
            Written::Image {
                width: image.width,
                height: image.height,
            },
            CapturedClipboardEvent::default(),
        )
    }

    async fn write_files(&self, paths: Vec<String>) -> Result<(), AppError> {
        let echo = CapturedClipboardEvent::from_files(paths.clone());
        self.record(Written::Files(paths), echo)
    }
}

/// 内存历史存储，最新条目在前
#[derive(Default)]
pub struct MemoryStore {
    pub fail_persist: AtomicBool,
    pub query_calls: AtomicUsize,
    pub persisted: Mutex<Vec<ClassifiedItem>>,
    items: Mutex<Vec<HistoryItem>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn persisted(&self) -> Vec<ClassifiedItem> {
        self.persisted.lock().expect("persisted lock").clone()
    }

    pub fn insert(&self, item: HistoryItem) {
        self.items.lock().expect("items lock").insert(0, item);
    }

    pub fn len(&self) -> usize {
        self.items.lock().expect("items lock").len()
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn persist(&self, item: &ClassifiedItem) -> Result<i64, AppError> {
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("store rejected write".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.persisted.lock().expect("persisted lock").push(item.clone());
        self.insert(HistoryItem::from_classified(id, item.clone(), Utc::now()));
        Ok(id)
    }

    async fn query(&self, request: GetHistoryRequest) -> Result<Vec<HistoryItem>, AppError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        let items = self.items.lock().expect("items lock");
        Ok(items
            .iter()
            .skip(request.offset.unwrap_or(0))
            .take(request.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn search(&self, request: SearchRequest) -> Result<Vec<HistoryItem>, AppError> {
        let items = self.items.lock().expect("items lock");
        Ok(items
            .iter()
            .filter(|item| contains_ignore_case(&request.query, &item.content))
            .take(request.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.items.lock().expect("items lock").retain(|item| item.id != id);
        Ok(())
    }

    async fn clear(&self, request: ClearHistoryRequest) -> Result<u64, AppError> {
        let mut items = self.items.lock().expect("items lock");
        let before = items.len();
        if let Some(keep) = request.keep_count {
            items.truncate(keep);
        }
        if let Some(days) = request.keep_days {
            let cutoff = Utc::now() - Duration::days(days);
            items.retain(|item| item.created_at >= cutoff);
        }
        if request.keep_count.is_none() && request.keep_days.is_none() {
            items.clear();
        }
        Ok((before - items.len()) as u64)
    }

    async fn update_tags(&self, id: i64, tags: Vec<String>) -> Result<(), AppError> {
        let mut items = self.items.lock().expect("items lock");
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| AppError::Persistence(format!("no item {id}")))?;
        item.tags = tags;
        Ok(())
    }

    async fn all_tags(&self) -> Result<Vec<String>, AppError> {
        let items = self.items.lock().expect("items lock");
        let mut tags: Vec<String> = items.iter().flat_map(|item| item.tags.clone()).collect();
        tags.dedup();
        Ok(tags)
    }
}

pub fn history_item(id: i64, content_type: ContentType, content: &str) -> HistoryItem {
    HistoryItem {
        id,
        content_type,
        content: content.to_string(),
        html: None,
        created_at: Utc::now(),
        metadata: None,
        file_paths: None,
        thumbnail_path: None,
        tags: Vec::new(),
        is_favorite: false,
        content_hash: String::new(),
    }
}

/// 组装好的一套核心组件
pub struct Harness {
    pub binding: Arc<FakeBinding>,
    pub store: Arc<MemoryStore>,
    pub history: Arc<HistoryView>,
    pub settings: SettingsHandle,
    pub flag: SelfWriteFlag,
    pub bridge: Arc<ClipboardBridge>,
    pub dispatcher: RestoreDispatcher,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(CoreSettings::default())
    }

    pub fn with_settings(settings: CoreSettings) -> Self {
        let binding = Arc::new(FakeBinding::default());
        let store = Arc::new(MemoryStore::default());
        let history = Arc::new(HistoryView::new(store.clone()));
        let settings = SettingsHandle::new(settings);
        let flag = SelfWriteFlag::new();
        let bridge = Arc::new(ClipboardBridge::new(
            binding.clone(),
            history.clone(),
            settings.subscribe(),
            flag.clone(),
        ));
        let dispatcher = RestoreDispatcher::new(binding.clone(), flag.clone(), settings.subscribe());
        Self {
            binding,
            store,
            history,
            settings,
            flag,
            bridge,
            dispatcher,
        }
    }

    /// 模拟一次外部应用的复制
    pub fn external_copy(&self, event: CapturedClipboardEvent) {
        self.bridge
            .event_sender()
            .send(event)
            .expect("bridge event channel open");
    }
}
