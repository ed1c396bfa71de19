//! # 剪贴板历史核心：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              宿主应用（UI / 外部历史存储）                │
//! │                                                          │
//! │   HistoryStore 实现 ── 设置变更通知 ── watch 订阅        │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ Result<T, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            核心 (Rust)                           │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  ├─ models ───── 捕获事件 / 分类结果 / 历史条目           │
//! │  ├─ clipboard ── 分类 · 事件桥 · 写回 · 自写标志 (RAII)  │
//! │  │   └─ system         arboard + clipboard-master        │
//! │  ├─ history ──── 存储端口 + 当前历史页                    │
//! │  ├─ query ────── 查询解析 · 匹配 · 最近搜索 · 高亮        │
//! │  ├─ queue ────── 粘贴队列                                 │
//! │  ├─ settings ─── settings.json + watch 广播               │
//! │  └─ storage ──── 图片存储目录                             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`models`] | 内容类型、捕获快照、分类结果、历史条目与请求参数 |
//! | [`markup`] | HTML / RTF 标记去除 |
//! | [`clipboard`] | 内容分类、监听状态机、写回调度、系统剪贴板实现 |
//! | [`history`] | 外部存储端口、当前历史页、保留策略、热门标签 |
//! | [`query`] | `@` 指令查询解析、条目匹配、智能搜索状态 |
//! | [`queue`] | 粘贴队列的增删、排序与合并 |
//! | [`settings`] | 核心设置的读写与变更广播 |
//! | [`storage`] | 图片存储目录的获取与统计 |

pub mod error;
pub mod clipboard;
pub mod history;
pub mod markup;
pub mod models;
pub mod query;
pub mod queue;
pub mod settings;
pub mod storage;
