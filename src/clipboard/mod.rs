//! 剪贴板管理模块
//!
//! # 设计思路
//!
//! 统一管理剪贴板相关的核心能力：
//! - **分类**：`classifier` 将原始快照映射为带类型的记录
//! - **监听**：`bridge` 管理监听生命周期，转发分类结果到外部存储
//! - **写回**：`restore` 按类型把历史条目写回系统剪贴板
//! - **自写标志 + RAII Guard**：区分“用户复制”和“本应用写回”，
//!   防止写回触发的变化被当作外部复制
//! - **平台实现**：`system` 基于 `arboard` + `clipboard-master`，
//!   `image_store` 负责捕获图片的落盘与读取
//!
//! # 实现思路
//!
//! - 自写标志使用 `Arc<AtomicBool>` + `SeqCst`，由构造时显式注入
//!   Dispatcher（唯一写入方）和 Bridge（唯一读取方），不再是全局静态量。
//! - Bridge 在每个观察到的事件上执行一次 `swap(false)`：读取并清除。
//! - `SelfWriteGuard` 在写入失败时自动清除标志，避免标志“粘住”
//!   后把下一次外部复制误标为内部。

pub mod binding;
pub mod bridge;
pub mod classifier;
pub mod image_store;
pub mod restore;
pub mod system;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub use binding::{ClipboardBinding, EventSender, RgbaImage};
pub use bridge::{ClipboardBridge, ListenerGuard, ListenerStatus};
pub use classifier::{classify, classify_with, content_hash};
pub use image_store::{load_image_reference, save_rgba_png};
pub use restore::RestoreDispatcher;
pub use system::SystemClipboard;

// ============================================================================
// 自写标志
// ============================================================================

/// “下一次变化由本应用写回触发”标志
#[derive(Debug, Clone, Default)]
pub struct SelfWriteFlag(Arc<AtomicBool>);

impl SelfWriteFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置标志并返回守卫，仅供 Restore Dispatcher 在写入前调用
    pub(crate) fn arm(&self) -> SelfWriteGuard<'_> {
        self.0.store(true, Ordering::SeqCst);
        log::debug!("🚫 已设置自写标志 - 下一次剪贴板变化将标记为内部写回");
        SelfWriteGuard {
            flag: self,
            committed: false,
        }
    }

    /// 读取并清除标志，每个观察到的事件调用且仅调用一次
    pub(crate) fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SelfWriteGuard: RAII 标志管理
// ============================================================================

/// 自写标志的 RAII 守卫
///
/// 写入成功后调用 [`commit`](Self::commit)，标志保留给监听器消费；
/// 未提交即离开作用域（写入失败或提前返回）时清除标志，
/// 因为系统不会为失败的写入产生变化通知。
pub(crate) struct SelfWriteGuard<'a> {
    flag: &'a SelfWriteFlag,
    committed: bool,
}

impl SelfWriteGuard<'_> {
    pub(crate) fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for SelfWriteGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.flag.0.store(false, Ordering::SeqCst);
            log::debug!("↩️  写入未完成，已清除自写标志");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SelfWriteFlag;

    #[test]
    fn take_reads_then_clears() {
        let flag = SelfWriteFlag::new();
        assert!(!flag.take());
        flag.arm().commit();
        assert!(flag.is_set());
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn uncommitted_guard_clears_flag() {
        let flag = SelfWriteFlag::new();
        {
            let _guard = flag.arm();
            assert!(flag.is_set());
        }
        assert!(!flag.is_set());
    }

    #[test]
    fn clones_share_state() {
        let writer = SelfWriteFlag::new();
        let reader = writer.clone();
        writer.arm().commit();
        assert!(reader.take());
        assert!(!writer.is_set());
    }
}
