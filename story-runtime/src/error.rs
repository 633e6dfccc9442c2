//! # Error 模块
//!
//! 定义 story-runtime 中使用的错误类型。
//!
//! ## 分层
//!
//! - [`ConvertError`]：表格数据转换阶段的错误
//! - [`OrderError`]：脚本编写错误（选项数据格式、未知演出编号等）
//! - [`PlaybackError`]：播放阶段的错误
//! - [`DataSourceError`] / [`SurfaceError`]：外部协作方报告的错误
//! - [`StoryError`]：统一错误类型

use thiserror::Error;

/// 表格数据转换错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// 表头尚未加载
    #[error("表头尚未加载，无法转换行数据")]
    HeaderNotLoaded,

    /// 表头为空
    #[error("表头行为空，无法构建列索引")]
    EmptyHeader,
}

/// 脚本编写错误
///
/// 这一类错误来自作者填写的表格内容本身，应当在制作期尽早暴露。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    /// 选项数据格式错误
    ///
    /// 选项的编码格式为 `"文本,目标序号,文本,目标序号,…"`，
    /// 字段数必须为偶数且不为零。
    #[error("选项数据格式错误：'{payload}' 不是 文本,目标序号 的交替排列")]
    MalformedChoicePayload { payload: String },

    /// 选项跳转目标无法解析为序号
    #[error("选项跳转目标 '{value}' 不是合法的订单序号")]
    InvalidBranchTarget { value: String },

    /// 未知的演出效果编号
    #[error("未知的演出效果编号：{id}")]
    UnknownEffectKind { id: i32 },
}

/// 播放错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// 脚本在 End 订单之前耗尽
    #[error("位置 {position} 之后没有可执行的订单（脚本缺少 End 订单？）")]
    ScriptExhausted { position: usize },

    /// 当前状态不允许此操作
    #[error("当前状态不允许此操作：{message}")]
    InvalidState { message: String },
}

/// 数据源错误
///
/// 由 [`SceneDataSource`](crate::dataset::SceneDataSource) 的实现方构造，
/// runtime 不解释其内容，只负责向上传递。
#[derive(Error, Debug, Clone, PartialEq)]
#[error("数据源错误: {message}")]
pub struct DataSourceError {
    /// 错误描述
    pub message: String,
}

impl DataSourceError {
    /// 创建数据源错误
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 演出接口错误
///
/// 由 [`PresentationSurface`](crate::surface::PresentationSurface) 的实现方构造，
/// 典型场景是素材加载失败。单条订单的演出失败不会中断播放（降级为 no-op）。
#[derive(Error, Debug, Clone, PartialEq)]
#[error("演出接口错误: {message}")]
pub struct SurfaceError {
    /// 错误描述
    pub message: String,
}

impl SurfaceError {
    /// 创建演出接口错误
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// story-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoryError {
    /// 数据转换错误
    #[error("数据转换错误: {0}")]
    Convert(#[from] ConvertError),

    /// 脚本编写错误
    #[error("脚本编写错误: {0}")]
    Order(#[from] OrderError),

    /// 播放错误
    #[error("播放错误: {0}")]
    Playback(#[from] PlaybackError),

    /// 数据源错误
    #[error(transparent)]
    Source(#[from] DataSourceError),

    /// 演出接口错误
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Result 类型别名
pub type StoryResult<T> = Result<T, StoryError>;
