//! # Story Runtime
//!
//! 表格驱动的故事播放运行时库。
//!
//! ## 架构概述
//!
//! `story-runtime` 是纯逻辑核心，不做任何渲染或网络 IO。
//! 脚本是一张"订单表"：每行一条订单（台词、立绘、演出……），
//! 运行时按"连续组"为单位推进，演出动作经由
//! [`PresentationSurface`] 下发给宿主层：
//!
//! ```text
//! Host                               Runtime
//!   │                                   │
//!   │──── process_next() ─────────────►│
//!   │                                   │ 取连续组、分发 Handler
//!   │◄─── PresentationSurface 调用 ────│
//!   │         (返回 AnimationHandle)    │
//!   │                                   │
//!   │──── process_next()（演出中）────►│
//!   │                                   │ 快进整组
//! ```
//!
//! ## 核心类型
//!
//! - [`OrderData`]：一条订单的宽行数据
//! - [`OrderTable`]：场景的订单表与连续组提取
//! - [`StoryPlayer`]：播放器门面（推进、快进、分支、自动播放）
//! - [`PresentationSurface`]：宿主实现的演出接口
//! - [`AnimationHandle`]：可等待、可快进的演出句柄
//!
//! ## 使用示例
//!
//! ```ignore
//! use story_runtime::{StoryConfig, StoryPlayer};
//! use story_runtime::dataset::{SceneKey, TableCache};
//!
//! let cache = TableCache::new(data_source);
//! let table = cache.get_or_load(SceneKey { part_id: 1, chapter_id: 1, scene_id: 1 }).await?;
//!
//! let player = StoryPlayer::new(surface, StoryConfig::default());
//! player.play_scene((*table).clone())?;
//!
//! // 宿主输入循环：点击即推进
//! on_click(move || player.process_next());
//! ```
//!
//! ## 模块结构
//!
//! - [`order`]：订单数据模型
//! - [`table`]：订单表与连续组
//! - [`cursor`]：播放进度游标
//! - [`config`]：可调参数
//! - [`error`]：错误类型定义
//! - [`surface`]：演出接口与演出句柄
//! - [`handler`]：订单类型到执行逻辑的注册表
//! - [`runtime`]：执行器、自动播放与播放器
//! - [`dataset`]：表格数据的获取、转换与缓存

pub mod config;
pub mod cursor;
pub mod dataset;
pub mod error;
pub mod handler;
pub mod order;
pub mod runtime;
pub mod surface;
pub mod table;

// 重导出核心类型
pub use config::StoryConfig;
pub use cursor::ProgressCursor;
pub use error::{
    ConvertError, DataSourceError, OrderError, PlaybackError, StoryError, StoryResult,
    SurfaceError,
};
pub use handler::{
    HandlerRegistry, OrderContext, OrderHandler, SceneGate, StoryHooks, standard_registry,
};
pub use order::{
    BranchOption, CharacterPosition, EffectKind, FacialExpression, OrderData, OrderType,
    SequenceType,
};
pub use runtime::{AutoPlayController, OrderExecutor, PlayerPhase, StoryPlayer};
pub use surface::{
    AnimationHandle, CharacterView, ChoiceView, DialogueView, PresentationSurface, SurfaceResult,
};
pub use table::OrderTable;
