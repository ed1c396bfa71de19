//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，覆盖剪贴板核心对外暴露的全部失败场景：
//!
//! | 变体 | 场景 | 对状态的影响 |
//! |------|------|--------------|
//! | `Listener` | 系统剪贴板监听注册/注销失败 | 监听状态保持不变，调用方可重试 |
//! | `Write` | 写回系统剪贴板失败 | 不重试，不修改任何历史状态 |
//! | `Persistence` | 外部存储拒绝写入 | 当前历史页不刷新 |
//! | `AliasTable` | 内置类型别名表校验失败 | 启动中止 |
//! | `Image` / `Settings` / `Storage` / `Io` | 辅助链路失败 | 仅上报 |
//!
//! “内容无法识别”不是错误：分类器返回 `None`，事件被静默丢弃。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 实现 `Serialize` 将错误序列化为字符串，便于 UI 层直接展示。

use serde::Serialize;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 剪贴板监听注册或注销失败
    #[error("剪贴板监听失败: {0}")]
    Listener(String),

    /// 写回系统剪贴板失败
    #[error("剪贴板写入失败: {0}")]
    Write(String),

    /// 外部历史存储拒绝写入或查询
    #[error("历史存储错误: {0}")]
    Persistence(String),

    /// 图片编解码失败
    #[error("图片处理失败: {0}")]
    Image(String),

    /// 内置类型别名表不合法（未规范化、重复、空集合）
    #[error("类型别名表无效: {0}")]
    AliasTable(String),

    /// 设置读取/解析/保存失败
    #[error("设置错误: {0}")]
    Settings(String),

    /// 存储目录不可用
    #[error("存储目录不可用: {0}")]
    Storage(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
