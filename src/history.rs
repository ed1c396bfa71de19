//! 历史记录模块
//!
//! # 设计思路
//!
//! 核心不决定历史如何持久化：[`HistoryStore`] 是外部存储的请求/响应端口，
//! 由宿主应用（SQLite、远程服务……）实现。
//!
//! [`HistoryView`] 持有“当前历史页”，所有变更操作（删除、清空、保留策略）
//! 在存储成功后统一刷新当前页，并通过 `watch` 通道通知 UI 层。
//! 存储失败时当前页保持不变。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::watch;

use crate::error::AppError;
use crate::models::{
    ClassifiedItem, ClearHistoryRequest, GetHistoryRequest, HistoryItem, SearchRequest,
};
use crate::query::{ParsedQuery, matches_query};
use crate::settings::CoreSettings;

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// 外部历史存储端口
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// 持久化一条分类结果，返回条目 ID
    async fn persist(&self, item: &ClassifiedItem) -> Result<i64, AppError>;

    /// 按时间倒序分页查询
    async fn query(&self, request: GetHistoryRequest) -> Result<Vec<HistoryItem>, AppError>;

    async fn search(&self, request: SearchRequest) -> Result<Vec<HistoryItem>, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// 按保留策略清理，返回删除条数
    async fn clear(&self, request: ClearHistoryRequest) -> Result<u64, AppError>;

    /// 整体替换条目的标签
    async fn update_tags(&self, id: i64, tags: Vec<String>) -> Result<(), AppError>;

    /// 全部历史中出现过的标签（去重）
    async fn all_tags(&self) -> Result<Vec<String>, AppError>;
}

/// 标签使用统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// 当前历史页及其变更操作
pub struct HistoryView {
    store: Arc<dyn HistoryStore>,
    page: watch::Sender<Vec<HistoryItem>>,
    last_request: Mutex<GetHistoryRequest>,
}

impl HistoryView {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self::with_page_size(store, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(store: Arc<dyn HistoryStore>, page_size: usize) -> Self {
        let (page, _rx) = watch::channel(Vec::new());
        Self {
            store,
            page,
            last_request: Mutex::new(GetHistoryRequest {
                limit: Some(page_size),
                offset: Some(0),
            }),
        }
    }

    fn last_request(&self) -> MutexGuard<'_, GetHistoryRequest> {
        match self.last_request.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("历史分页状态锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<HistoryItem>> {
        self.page.subscribe()
    }

    pub fn current(&self) -> Vec<HistoryItem> {
        self.page.borrow().clone()
    }

    pub(crate) async fn persist(&self, item: &ClassifiedItem) -> Result<i64, AppError> {
        self.store.persist(item).await
    }

    /// 查询并替换当前历史页，同时记住本次分页参数供后续刷新
    pub async fn load_history(&self, limit: usize, offset: usize) -> Result<(), AppError> {
        let request = GetHistoryRequest {
            limit: Some(limit),
            offset: Some(offset),
        };
        *self.last_request() = request;
        let items = self.store.query(request).await?;
        log::debug!("📜 已加载历史记录 {} 条 (offset={})", items.len(), offset);
        self.page.send_replace(items);
        Ok(())
    }

    /// 按最近一次分页参数重新查询
    pub async fn refresh(&self) -> Result<(), AppError> {
        let request = *self.last_request();
        let items = self.store.query(request).await?;
        self.page.send_replace(items);
        Ok(())
    }

    pub async fn search_history(&self, query: &str, limit: usize) -> Result<(), AppError> {
        let items = self
            .store
            .search(SearchRequest {
                query: query.to_string(),
                limit: Some(limit),
            })
            .await?;
        self.page.send_replace(items);
        Ok(())
    }

    pub async fn delete_item(&self, id: i64) -> Result<(), AppError> {
        self.store.delete(id).await?;
        self.refresh().await
    }

    pub async fn clear_history(
        &self,
        keep_count: Option<usize>,
        keep_days: Option<i64>,
    ) -> Result<u64, AppError> {
        let removed = self
            .store
            .clear(ClearHistoryRequest {
                keep_count,
                keep_days,
            })
            .await?;
        log::info!("🧹 已清理历史记录 {} 条", removed);
        self.refresh().await?;
        Ok(removed)
    }

    /// 更新标签后刷新当前页；标签去空白、去空、去重并保持首次出现顺序
    pub async fn update_tags(&self, id: i64, tags: Vec<String>) -> Result<(), AppError> {
        let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = tag.trim();
            if !tag.is_empty() && !normalized.iter().any(|t| t == tag) {
                normalized.push(tag.to_string());
            }
        }
        log::debug!("🏷️ 更新条目 {} 的标签: {:?}", id, normalized);
        self.store.update_tags(id, normalized).await?;
        self.refresh().await
    }

    /// 存储中的全部标签，按名称排序
    pub async fn all_tags(&self) -> Result<Vec<String>, AppError> {
        let mut tags = self.store.all_tags().await?;
        tags.sort();
        tags.dedup();
        Ok(tags)
    }

    /// 按设置执行保留策略：先按条数，再按天数（0 表示关闭）
    pub async fn apply_retention(&self, settings: &CoreSettings) -> Result<u64, AppError> {
        let mut removed = 0;
        if settings.max_history_count > 0 {
            removed += self
                .store
                .clear(ClearHistoryRequest {
                    keep_count: Some(settings.max_history_count),
                    keep_days: None,
                })
                .await?;
        }
        if settings.auto_cleanup_days > 0 {
            removed += self
                .store
                .clear(ClearHistoryRequest {
                    keep_count: None,
                    keep_days: Some(settings.auto_cleanup_days),
                })
                .await?;
        }
        if removed > 0 {
            log::info!("🧹 保留策略清理历史记录 {} 条", removed);
        }
        self.refresh().await?;
        Ok(removed)
    }

    /// 用解析后的查询过滤当前页
    pub fn filter<F>(&self, query: &ParsedQuery, fuzzy: F) -> Vec<HistoryItem>
    where
        F: Fn(&str, &str) -> bool,
    {
        self.page
            .borrow()
            .iter()
            .filter(|item| matches_query(item, query, &fuzzy))
            .cloned()
            .collect()
    }
}

/// 统计热门标签（按使用次数降序，次数相同按标签名排序）
pub fn popular_tags(items: &[HistoryItem], limit: usize) -> Vec<TagCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        for tag in &item.tags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut result: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    result.truncate(limit);
    result
}
