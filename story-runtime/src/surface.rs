//! # Surface 模块
//!
//! 演出接口：runtime 与具体渲染宿主之间的唯一边界。
//!
//! ## 设计说明
//!
//! - runtime 不直接操作画面，所有演出动作经由 [`PresentationSurface`]
//!   下发，宿主层（终端、图形前端、测试桩）各自实现
//! - 有时长的演出动作返回 [`AnimationHandle`]：等待端与跳过端分离，
//!   执行器可以等它自然播完，也可以立即快进
//! - 跳过契约：`skip` 被调用后，`waiter` 必须在不依赖真实时间的前提下
//!   尽快完成。快进之后挂在 `waiter` 后面的收尾逻辑仍然会执行

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::dataset::StorySceneMeta;
use crate::error::SurfaceError;
use crate::order::{CharacterPosition, FacialExpression};

/// 演出接口的 Result 别名
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// 一次有时长演出的句柄
///
/// `waiter` 在演出自然结束或被快进后完成；`skip` 立即把演出推到终态。
/// 两端分离是为了让执行器能先统一快进一组演出，再集中等待收尾。
pub struct AnimationHandle {
    waiter: BoxFuture<'static, ()>,
    skip: Box<dyn FnOnce() + Send>,
}

impl AnimationHandle {
    /// 从等待端与跳过端构造
    pub fn new(
        waiter: impl Future<Output = ()> + Send + 'static,
        skip: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            waiter: waiter.boxed(),
            skip: Box::new(skip),
        }
    }

    /// 已完成的句柄（瞬时动作用）
    pub fn instant() -> Self {
        Self::new(async {}, || {})
    }

    /// 纯计时句柄：等待指定时长，可被跳过提前结束
    pub fn timed(duration: Duration) -> Self {
        let token = CancellationToken::new();
        let waiter_token = token.clone();
        Self::new(
            async move {
                tokio::select! {
                    _ = tokio::time::sleep(duration) => {}
                    _ = waiter_token.cancelled() => {}
                }
            },
            move || token.cancel(),
        )
    }

    /// 在原句柄的等待端之后追加收尾动作
    ///
    /// 收尾动作在演出完成（自然或快进）后执行，跳过端保持不变。
    /// 对应"演出结束回调"语义：快进不会吞掉回调。
    pub fn then(self, f: impl Future<Output = ()> + Send + 'static) -> Self {
        let Self { waiter, skip } = self;
        Self {
            waiter: async move {
                waiter.await;
                f.await;
            }
            .boxed(),
            skip,
        }
    }

    /// 拆分为等待端与跳过端
    pub fn into_parts(self) -> (BoxFuture<'static, ()>, Box<dyn FnOnce() + Send>) {
        (self.waiter, self.skip)
    }
}

impl std::fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationHandle").finish_non_exhaustive()
    }
}

/// 一行对白的演出参数
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueView {
    /// 说话者显示名（地之文为 `None`）
    pub speaker: Option<String>,
    /// 对白文本
    pub text: String,
    /// 逐字显示总时长
    pub reveal: Duration,
}

/// 一个角色立绘的演出参数
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterView {
    /// 立绘素材路径
    pub file_path: String,
    /// 槽位
    pub position: CharacterPosition,
    /// 表情差分
    pub facial_expression: FacialExpression,
    /// 入场/切换动画时长
    pub transition: Duration,
}

/// 选择分支的一个展示项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceView {
    /// 选项文本
    pub label: String,
}

/// 演出接口
///
/// 宿主层实现此 trait 把订单演出落到具体媒介上。所有方法都允许
/// 返回错误，单条订单的演出失败由执行器记录日志后继续。
#[async_trait]
pub trait PresentationSurface: Send + Sync {
    /// 按场景元数据准备舞台（立绘缩放、位置修正等）
    async fn prepare_scene(&self, meta: &StorySceneMeta) -> SurfaceResult<()>;

    /// 显示一行对白（逐字展开）
    async fn show_line(&self, view: DialogueView) -> SurfaceResult<AnimationHandle>;

    /// 清空对话框内容
    async fn clear_line(&self) -> SurfaceResult<()>;

    /// 显示/隐藏对话框
    async fn set_dialog_visible(&self, visible: bool) -> SurfaceResult<()>;

    /// 角色登场
    async fn character_enter(&self, view: CharacterView) -> SurfaceResult<AnimationHandle>;

    /// 切换已登场角色的立绘
    async fn character_change(&self, view: CharacterView) -> SurfaceResult<AnimationHandle>;

    /// 角色退场
    async fn character_exit(
        &self,
        position: CharacterPosition,
        transition: Duration,
    ) -> SurfaceResult<AnimationHandle>;

    /// 隐藏所有已登场角色
    async fn hide_all_characters(&self) -> SurfaceResult<()>;

    /// 切换背景
    async fn change_background(
        &self,
        file_path: &str,
        transition: Duration,
    ) -> SurfaceResult<AnimationHandle>;

    /// 显示蒸镜（全屏静态图）
    async fn show_steel(
        &self,
        file_path: &str,
        transition: Duration,
    ) -> SurfaceResult<AnimationHandle>;

    /// 隐藏蒸镜
    async fn hide_steel(&self) -> SurfaceResult<()>;

    /// 整体淡入
    async fn fade_in(&self, duration: Duration) -> SurfaceResult<AnimationHandle>;

    /// 整体淡出
    async fn fade_out(&self, duration: Duration) -> SurfaceResult<AnimationHandle>;

    /// 切换 BGM（交叉淡化由宿主实现）
    async fn play_bgm(&self, file_path: &str) -> SurfaceResult<()>;

    /// 停止 BGM（渐弱）
    async fn stop_bgm(&self, fade: Duration) -> SurfaceResult<AnimationHandle>;

    /// 播放一次性音效
    async fn play_se(&self, file_path: &str) -> SurfaceResult<()>;

    /// 画面闪光
    async fn flash(&self, color_hex: &str, duration: Duration) -> SurfaceResult<AnimationHandle>;

    /// 开关指定粒子效果
    async fn set_particle(&self, index: usize, enabled: bool) -> SurfaceResult<()>;

    /// 开关眩晕效果
    async fn set_dizziness(&self, enabled: bool) -> SurfaceResult<()>;

    /// 相机震动
    async fn camera_shake(&self, duration: Duration) -> SurfaceResult<AnimationHandle>;

    /// 展示选项并等待玩家选择，返回所选项的下标
    async fn show_choices(&self, options: &[ChoiceView]) -> SurfaceResult<usize>;
}
