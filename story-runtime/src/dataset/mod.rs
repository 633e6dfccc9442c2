//! # Dataset 模块
//!
//! 表格数据的获取与转换。
//!
//! ## 设计说明
//!
//! - 数据来源抽象为 [`SceneDataSource`]：宿主可以接表格服务、
//!   本地文件或内存数据，runtime 只认"表头 + 行"的原始形状
//! - [`convert`] 把原始行转成 [`OrderData`](crate::order::OrderData)，
//!   按表头名定位列，缺列/空单元格一律取零值
//! - [`cache`] 按场景缓存转换结果，重复进入同一场景不重复转换

pub mod cache;
pub mod convert;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DataSourceError;

pub use cache::TableCache;
pub use convert::SceneDataConverter;

/// 场景的定位键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SceneKey {
    /// 部 ID
    pub part_id: i32,
    /// 章 ID
    pub chapter_id: i32,
    /// 场景 ID
    pub scene_id: i32,
}

/// 场景元数据
///
/// 除定位信息外还带舞台参数（立绘缩放、位置修正），
/// 在开始播放时整体交给演出接口。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StorySceneMeta {
    /// 定位键
    pub key: SceneKey,
    /// 场景名
    pub scene_name: String,
    /// 数据表中的单元格范围（出处标识）
    pub cell_range: String,
    /// 立绘整体缩放
    pub character_scale: f32,
    /// 立绘纵向位置修正
    pub position_correction: f32,
}

/// 一张原始数据表：表头行 + 数据行
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawSheet {
    /// 表头（列名）
    pub header: Vec<String>,
    /// 数据行
    pub rows: Vec<Vec<String>>,
}

/// 场景数据源
///
/// 实现方负责真正的 IO（网络表格、本地文件等），失败时构造
/// [`DataSourceError`] 向上传递。
#[async_trait]
pub trait SceneDataSource: Send + Sync {
    /// 获取一个场景的原始订单表
    async fn fetch_scene(&self, key: SceneKey) -> Result<RawSheet, DataSourceError>;

    /// 获取一个场景的元数据
    async fn fetch_meta(&self, key: SceneKey) -> Result<StorySceneMeta, DataSourceError>;
}
