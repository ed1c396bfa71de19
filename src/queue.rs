//! 粘贴队列
//!
//! 用户依次选中多条历史记录，按加入顺序合并为一段纯文本后一次性写回。
//!
//! - 同一条目（按 ID）只会出现一次，重复加入为空操作
//! - 插入顺序即粘贴顺序，`move_entry` 调整顺序时保持其他条目相对次序
//! - 队列通常只有几十项，成员判断为线性查找
//!
//! 队列只响应用户操作，逐个处理，不存在并发修改路径。

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::clipboard::RestoreDispatcher;
use crate::error::AppError;
use crate::markup::strip_html;
use crate::models::{ContentType, HistoryItem};
use crate::settings::CoreSettings;

/// 合并时的分隔方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorMode {
    #[default]
    Newline,
    None,
    Custom,
}

impl SeparatorMode {
    fn separator<'a>(self, custom: &'a str) -> &'a str {
        match self {
            SeparatorMode::Newline => "\n",
            SeparatorMode::None => "",
            SeparatorMode::Custom => custom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasteQueueEntry {
    pub item: HistoryItem,
}

impl PasteQueueEntry {
    pub fn id(&self) -> i64 {
        self.item.id
    }

    /// 合并时使用的文本；HTML 去除标记
    fn rendered(&self) -> String {
        match self.item.content_type {
            ContentType::Html => {
                let source = match self.item.html.as_deref() {
                    Some(html) if self.item.content.is_empty() => html,
                    _ => self.item.content.as_str(),
                };
                strip_html(source)
            }
            _ => self.item.content.clone(),
        }
    }
}

/// 队列内容快照（供 UI 订阅）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueSnapshot {
    pub ids: Vec<i64>,
    pub count: usize,
}

pub struct PasteQueue {
    entries: Vec<PasteQueueEntry>,
    separator: SeparatorMode,
    custom_separator: String,
    auto_clear: bool,
    snapshot: watch::Sender<QueueSnapshot>,
}

impl PasteQueue {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(QueueSnapshot::default());
        Self {
            entries: Vec::new(),
            separator: SeparatorMode::default(),
            custom_separator: String::new(),
            auto_clear: false,
            snapshot,
        }
    }

    pub fn from_settings(settings: &CoreSettings) -> Self {
        let mut queue = Self::new();
        queue.apply_settings(settings);
        queue
    }

    /// 同步分隔方式与自动清空设置
    pub fn apply_settings(&mut self, settings: &CoreSettings) {
        self.separator = settings.paste_queue_separator;
        self.custom_separator = settings.paste_queue_custom_separator.clone();
        self.auto_clear = settings.paste_queue_auto_clear;
    }

    fn publish(&self) {
        self.snapshot.send_replace(self.snapshot());
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            ids: self.entries.iter().map(PasteQueueEntry::id).collect(),
            count: self.entries.len(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<QueueSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn entries(&self) -> &[PasteQueueEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_in_queue(&self, id: i64) -> bool {
        self.entries.iter().any(|entry| entry.id() == id)
    }

    /// 追加到队尾；已在队列中时为空操作
    pub fn add(&mut self, item: HistoryItem) {
        if self.is_in_queue(item.id) {
            return;
        }
        self.entries.push(PasteQueueEntry { item });
        self.publish();
    }

    pub fn remove(&mut self, id: i64) {
        if let Some(index) = self.entries.iter().position(|entry| entry.id() == id) {
            self.entries.remove(index);
            self.publish();
        }
    }

    /// 移动条目；任一下标越界时为空操作
    pub fn move_entry(&mut self, from: usize, to: usize) {
        if from >= self.entries.len() || to >= self.entries.len() || from == to {
            return;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.publish();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.publish();
    }

    /// 按指定分隔方式合并全部条目
    pub fn merge(&self, mode: SeparatorMode, custom_separator: &str) -> String {
        self.entries
            .iter()
            .map(PasteQueueEntry::rendered)
            .collect::<Vec<_>>()
            .join(mode.separator(custom_separator))
    }

    /// 按当前设置合并
    pub fn merged_content(&self) -> String {
        self.merge(self.separator, &self.custom_separator)
    }

    /// 合并后以纯文本写回剪贴板，返回写入的文本；队列为空时不写入
    pub async fn paste(
        &mut self,
        dispatcher: &RestoreDispatcher,
    ) -> Result<Option<String>, AppError> {
        if self.entries.is_empty() {
            return Ok(None);
        }
        let merged = self.merged_content();
        dispatcher.write_plain_text(merged.clone()).await?;
        log::info!("📋 已合并粘贴 {} 条记录", self.entries.len());

        if self.auto_clear {
            self.clear();
        }
        Ok(Some(merged))
    }
}

impl Default for PasteQueue {
    fn default() -> Self {
        Self::new()
    }
}
