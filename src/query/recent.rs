//! 最近搜索记录
//!
//! 最新的查询排在最前，去重，最多保留 20 条。
//! 持久化为 JSON 文件，读写失败只记日志，不影响搜索本身。

use std::fs;
use std::path::{Path, PathBuf};

pub const MAX_RECENT_SEARCHES: usize = 20;
pub const RECENT_SEARCHES_FILE_NAME: &str = "search_history.json";

#[derive(Debug, Clone, Default)]
pub struct RecentSearches {
    entries: Vec<String>,
    path: Option<PathBuf>,
}

impl RecentSearches {
    /// 仅保存在内存中
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// 从数据目录加载，文件缺失或损坏时从空列表开始
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(RECENT_SEARCHES_FILE_NAME);
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str::<Vec<String>>(&content).unwrap_or_else(|err| {
                log::warn!("解析搜索历史失败，已忽略: {}", err);
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        Self {
            entries,
            path: Some(path),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn add(&mut self, query: &str) {
        if query.trim().is_empty() {
            return;
        }
        self.entries.retain(|q| q != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(MAX_RECENT_SEARCHES);
        self.save();
    }

    pub fn remove(&mut self, query: &str) {
        self.entries.retain(|q| q != query);
        self.save();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        if let Some(path) = &self.path {
            if let Err(err) = fs::remove_file(path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("删除搜索历史失败: {}", err);
                }
            }
        }
    }

    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let result = serde_json::to_string(&self.entries)
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(path, json).map_err(|e| e.to_string()));
        if let Err(err) = result {
            log::warn!("保存搜索历史失败: {}", err);
        }
    }
}
