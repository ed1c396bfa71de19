//! 核心设置
//!
//! # 设计思路
//!
//! 设置以 `settings.json` 的形式保存在调用方提供的数据目录中，
//! 核心只关心其中与捕获、写回、检索、粘贴队列相关的字段。
//!
//! 设置变化通过 `SettingsHandle`（`tokio::sync::watch`）广播：
//! 各组件在构造时拿到一个 `watch::Receiver`，使用时读取最新值，
//! 不再依赖全局可变状态。外部通知渠道可以直接把原始 JSON 交给
//! [`SettingsHandle::apply_settings_value`]，未知字段被忽略，缺失字段保持当前值。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::AppError;
use crate::queue::SeparatorMode;

const SETTINGS_FILE_NAME: &str = "settings.json";

/// 核心消费的设置项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreSettings {
    /// 最大历史记录条数（0 表示不限制）
    pub max_history_count: usize,
    /// 自动清理周期（天，0 表示不自动清理）
    pub auto_cleanup_days: i64,
    /// 写回时默认转为纯文本
    pub copy_as_plain_text: bool,
    /// 粘贴时默认转为纯文本
    pub paste_as_plain_text: bool,
    /// 外部复制的内容自动收藏
    pub auto_favorite: bool,
    /// 刷新历史页时的默认条数
    pub history_page_size: usize,
    pub paste_queue_separator: SeparatorMode,
    pub paste_queue_custom_separator: String,
    /// 合并粘贴后自动清空队列
    pub paste_queue_auto_clear: bool,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            max_history_count: 5000,
            auto_cleanup_days: 30,
            copy_as_plain_text: false,
            paste_as_plain_text: true,
            auto_favorite: false,
            history_page_size: 100,
            paste_queue_separator: SeparatorMode::Newline,
            paste_queue_custom_separator: String::new(),
            paste_queue_auto_clear: false,
        }
    }
}

fn settings_file_path(data_dir: &Path) -> Result<PathBuf, AppError> {
    fs::create_dir_all(data_dir)
        .map_err(|e| AppError::Settings(format!("创建应用数据目录失败: {}", e)))?;
    Ok(data_dir.join(SETTINGS_FILE_NAME))
}

/// 读取设置文件；文件不存在时返回默认设置
pub fn load_settings(data_dir: &Path) -> Result<CoreSettings, AppError> {
    let settings_path = settings_file_path(data_dir)?;
    if !settings_path.exists() {
        log::info!("设置文件不存在，使用默认设置: {}", settings_path.display());
        return Ok(CoreSettings::default());
    }

    let content = fs::read_to_string(&settings_path)?;
    serde_json::from_str::<CoreSettings>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))
}

pub fn save_settings(data_dir: &Path, settings: &CoreSettings) -> Result<(), AppError> {
    let settings_path = settings_file_path(data_dir)?;
    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;
    fs::write(settings_path, content)?;
    Ok(())
}

// ============================================================================
// 设置变化通知
// ============================================================================

/// 设置的单一持有者，变化通过 watch 通道广播给各组件
#[derive(Debug)]
pub struct SettingsHandle {
    tx: watch::Sender<CoreSettings>,
}

impl SettingsHandle {
    pub fn new(initial: CoreSettings) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> CoreSettings {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CoreSettings> {
        self.tx.subscribe()
    }

    /// 收到“设置已变更”通知时调用
    pub fn apply_settings_changed(&self, settings: CoreSettings) {
        log::info!("⚙️  设置已更新");
        log::debug!("⚙️  新设置: {:?}", settings);
        self.tx.send_replace(settings);
    }

    /// 接收原始 JSON 形式的设置广播，只覆盖出现的字段
    pub fn apply_settings_value(&self, value: &serde_json::Value) -> Result<(), AppError> {
        let incoming = value
            .as_object()
            .ok_or_else(|| AppError::Settings("设置广播不是 JSON 对象".to_string()))?;

        let mut merged = serde_json::to_value(self.current())
            .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;
        if let Some(target) = merged.as_object_mut() {
            for (key, val) in incoming {
                if target.contains_key(key) {
                    target.insert(key.clone(), val.clone());
                }
            }
        }

        let settings = serde_json::from_value::<CoreSettings>(merged)
            .map_err(|e| AppError::Settings(format!("解析设置广播失败: {}", e)))?;
        self.apply_settings_changed(settings);
        Ok(())
    }
}

impl Default for SettingsHandle {
    fn default() -> Self {
        Self::new(CoreSettings::default())
    }
}
