//! 剪贴板事件桥
//!
//! # 设计思路
//!
//! 两态状态机：`Idle`（未监听）与 `Listening`（监听中）。
//! 系统绑定层把每次变化的快照推入通道，Bridge 在单一事件循环中逐个处理：
//!
//! 1. 读取并清除自写标志（每个事件恰好一次，即使快照无法分类）
//! 2. 外部变化时更新“最近一次外部复制”时间戳
//! 3. 分类；无法识别的快照直接丢弃，不调用存储
//! 4. 标记 `is_internal_copy` / 自动收藏后交给外部存储
//! 5. 持久化成功后刷新当前历史页
//!
//! 任何一步失败都不会改变监听状态。
//!
//! # 实现思路
//!
//! - 状态与时间戳通过 `watch` 通道暴露给 UI 层。
//! - `start` / `stop` 幂等；失败映射为 `AppError::Listener`，状态保持不变。
//! - `ListenerGuard` 在离开作用域时自动停止监听。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, mpsc, watch};

use crate::error::AppError;
use crate::history::HistoryView;
use crate::models::CapturedClipboardEvent;
use crate::settings::CoreSettings;

use super::SelfWriteFlag;
use super::binding::{ClipboardBinding, EventSender};
use super::classifier::classify;

/// 监听状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerStatus {
    Idle,
    Listening,
}

fn into_listener_error(err: AppError) -> AppError {
    match err {
        AppError::Listener(_) => err,
        other => AppError::Listener(other.to_string()),
    }
}

fn into_persistence_error(err: AppError) -> AppError {
    match err {
        AppError::Persistence(_) => err,
        other => AppError::Persistence(other.to_string()),
    }
}

pub struct ClipboardBridge {
    binding: Arc<dyn ClipboardBinding>,
    history: Arc<HistoryView>,
    settings: watch::Receiver<CoreSettings>,
    flag: SelfWriteFlag,
    status: watch::Sender<ListenerStatus>,
    last_external_copy: watch::Sender<Option<DateTime<Utc>>>,
    events_tx: EventSender,
    events_rx: Mutex<mpsc::UnboundedReceiver<CapturedClipboardEvent>>,
}

impl ClipboardBridge {
    pub fn new(
        binding: Arc<dyn ClipboardBinding>,
        history: Arc<HistoryView>,
        settings: watch::Receiver<CoreSettings>,
        flag: SelfWriteFlag,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (status, _) = watch::channel(ListenerStatus::Idle);
        let (last_external_copy, _) = watch::channel(None);
        Self {
            binding,
            history,
            settings,
            flag,
            status,
            last_external_copy,
            events_tx,
            events_rx: Mutex::new(events_rx),
        }
    }

    pub fn status(&self) -> ListenerStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ListenerStatus> {
        self.status.subscribe()
    }

    pub fn last_external_copy(&self) -> Option<DateTime<Utc>> {
        *self.last_external_copy.borrow()
    }

    pub fn subscribe_last_external_copy(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_external_copy.subscribe()
    }

    /// 事件入口，系统绑定层之外的来源（测试、跨窗口转发）也可直接推送快照
    pub fn event_sender(&self) -> EventSender {
        self.events_tx.clone()
    }

    /// Idle → Listening；已在监听时直接返回
    pub fn start(&self) -> Result<(), AppError> {
        if self.status() == ListenerStatus::Listening {
            return Ok(());
        }
        self.binding
            .start_listening(self.events_tx.clone())
            .map_err(|err| {
                log::error!("❌ 启动剪贴板监听失败: {}", err);
                into_listener_error(err)
            })?;
        self.status.send_replace(ListenerStatus::Listening);
        log::info!("📋 剪贴板监听: Idle -> Listening");
        Ok(())
    }

    /// Listening → Idle；未监听时为空操作
    pub fn stop(&self) -> Result<(), AppError> {
        if self.status() == ListenerStatus::Idle {
            return Ok(());
        }
        self.binding.stop_listening().map_err(|err| {
            log::error!("❌ 停止剪贴板监听失败: {}", err);
            into_listener_error(err)
        })?;
        self.status.send_replace(ListenerStatus::Idle);
        log::info!("📋 剪贴板监听: Listening -> Idle");
        Ok(())
    }

    /// 开始监听并返回作用域守卫，守卫释放时停止监听
    pub fn start_scoped(self: &Arc<Self>) -> Result<ListenerGuard, AppError> {
        self.start()?;
        Ok(ListenerGuard {
            bridge: Arc::clone(self),
        })
    }

    /// 处理一次剪贴板变化，返回存储分配的条目 ID；无法分类时返回 `None`
    pub async fn handle_event(
        &self,
        event: CapturedClipboardEvent,
    ) -> Result<Option<i64>, AppError> {
        let is_internal_copy = self.flag.take();
        if is_internal_copy {
            log::debug!("⏭️  本应用写回触发的剪贴板变化，标记为内部");
        } else {
            self.last_external_copy.send_replace(Some(Utc::now()));
        }

        let Some(mut item) = classify(&event) else {
            log::debug!("剪贴板变化没有可识别的内容，跳过");
            return Ok(None);
        };

        item.is_internal_copy = is_internal_copy;
        if !is_internal_copy && self.settings.borrow().auto_favorite {
            item.is_favorite = true;
        }

        let id = match self.history.persist(&item).await {
            Ok(id) => id,
            Err(err) => {
                log::error!("❌ 保存剪贴板条目失败 ({}): {}", item.content_type, err);
                return Err(into_persistence_error(err));
            }
        };
        log::debug!(
            "📥 已保存剪贴板条目 {} ({}, internal={})",
            id,
            item.content_type,
            is_internal_copy
        );

        if let Err(err) = self.history.refresh().await {
            log::warn!("刷新历史记录失败: {}", err);
        }
        Ok(Some(id))
    }

    async fn next_event(&self) -> Option<CapturedClipboardEvent> {
        self.events_rx.lock().await.recv().await
    }

    /// 事件循环：逐个处理快照，单个事件失败只记录日志
    pub async fn run(&self) {
        while let Some(event) = self.next_event().await {
            if let Err(err) = self.handle_event(event).await {
                log::warn!("剪贴板事件处理失败: {}", err);
            }
        }
    }

    /// 处理通道中已到达的全部事件，返回处理数量
    pub async fn process_pending(&self) -> usize {
        let mut pending = Vec::new();
        {
            let mut rx = self.events_rx.lock().await;
            while let Ok(event) = rx.try_recv() {
                pending.push(event);
            }
        }

        let count = pending.len();
        for event in pending {
            if let Err(err) = self.handle_event(event).await {
                log::warn!("剪贴板事件处理失败: {}", err);
            }
        }
        count
    }
}

/// 监听作用域守卫
pub struct ListenerGuard {
    bridge: Arc<ClipboardBridge>,
}

impl ListenerGuard {
    pub fn bridge(&self) -> &Arc<ClipboardBridge> {
        &self.bridge
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Err(err) = self.bridge.stop() {
            log::warn!("释放监听守卫时停止监听失败: {}", err);
        }
    }
}
