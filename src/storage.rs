//! 图片存储目录管理模块
//!
//! # 设计思路
//!
//! 系统绑定层捕获到图片时先落盘为 PNG，再把路径作为图片引用交给分类器。
//! 本模块统一管理该目录，支持用户自定义目录，并在目录不存在时自动创建。
//!
//! # 实现思路
//!
//! - 优先使用用户配置的自定义目录。
//! - 未设置时回退到数据目录下的 `images` 子目录。
//! - 所有可能失败的操作均返回 `Result`。

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::AppError;

/// 存储目录信息
#[derive(Debug, Clone, Serialize)]
pub struct StorageInfo {
    pub path: String,
    pub total_size: u64,
    pub file_count: u64,
}

/// 获取图片存储目录（不存在时创建）
pub fn images_dir(data_dir: &Path, custom_dir: Option<&str>) -> Result<PathBuf, AppError> {
    if let Some(dir) = custom_dir.filter(|d| !d.is_empty()) {
        let path = PathBuf::from(dir);
        if !path.exists() {
            fs::create_dir_all(&path).map_err(|e| {
                AppError::Storage(format!("创建自定义目录 '{}' 失败: {}", dir, e))
            })?;
        }
        return Ok(path);
    }

    let images_dir = data_dir.join("images");
    if !images_dir.exists() {
        fs::create_dir_all(&images_dir)
            .map_err(|e| AppError::Storage(format!("创建图片目录失败: {}", e)))?;
    }
    Ok(images_dir)
}

/// 获取图片存储目录信息（路径 + 占用大小 + 文件数）
pub fn images_dir_info(data_dir: &Path, custom_dir: Option<&str>) -> Result<StorageInfo, AppError> {
    let dir = images_dir(data_dir, custom_dir)?;
    let mut total_size: u64 = 0;
    let mut file_count: u64 = 0;

    if let Ok(entries) = fs::read_dir(&dir) {
        for entry in entries.flatten() {
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() {
                    total_size += metadata.len();
                    file_count += 1;
                }
            }
        }
    }

    Ok(StorageInfo {
        path: dir.to_string_lossy().to_string(),
        total_size,
        file_count,
    })
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn unique_temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock error")
            .as_nanos();
        std::env::temp_dir().join(format!("clipboard-core-storage-test-{nanos}"))
    }

    #[test]
    fn default_dir_is_created_under_data_dir() {
        let data_dir = unique_temp_dir();
        let dir = images_dir(&data_dir, None).expect("images dir");
        assert_eq!(dir, data_dir.join("images"));
        assert!(dir.exists());
        let _ = fs::remove_dir_all(data_dir);
    }

    #[test]
    fn custom_dir_wins_and_empty_custom_is_ignored() {
        let data_dir = unique_temp_dir();
        let custom = data_dir.join("custom");
        let custom_str = custom.to_string_lossy().to_string();

        let dir = images_dir(&data_dir, Some(&custom_str)).expect("custom dir");
        assert_eq!(dir, custom);
        assert!(custom.exists());

        let fallback = images_dir(&data_dir, Some("")).expect("fallback dir");
        assert_eq!(fallback, data_dir.join("images"));
        let _ = fs::remove_dir_all(data_dir);
    }

    #[test]
    fn info_counts_files() {
        let data_dir = unique_temp_dir();
        let dir = images_dir(&data_dir, None).expect("images dir");
        fs::write(dir.join("img_1.png"), [0u8; 10]).expect("write file");
        fs::write(dir.join("img_2.png"), [0u8; 5]).expect("write file");

        let info = images_dir_info(&data_dir, None).expect("info");
        assert_eq!(info.file_count, 2);
        assert_eq!(info.total_size, 15);
        let _ = fs::remove_dir_all(data_dir);
    }
}
