//! # Handler 模块
//!
//! 订单类型到执行逻辑的映射。
//!
//! ## 设计说明
//!
//! - 注册表是显式构造的普通映射，没有任何自动发现机制。
//!   [`standard_registry`] 给出完整的默认装配，宿主层也可以
//!   自己组一张表做替换或裁剪
//! - 所有 Handler 走统一的异步契约 [`OrderHandler::execute`]：
//!   瞬时动作返回 [`AnimationHandle::instant`]，有时长动作返回
//!   可快进的句柄，需要阻塞推进的订单（如 Choice）直接在
//!   `execute` 内 await
//! - 查不到 Handler 不是错误：记一条 warn 日志后跳过该订单，
//!   数据先行于实现是表格驱动脚本的常态

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::config::StoryConfig;
use crate::error::StoryResult;
use crate::order::{OrderData, OrderType};
use crate::surface::{AnimationHandle, PresentationSurface};

mod audio;
mod character;
mod effect;
mod flow;
mod scene;
mod talk;

pub use audio::{ChangeBgmHandler, PlaySeHandler, StopBgmHandler};
pub use character::{CharacterChangeHandler, CharacterEntryHandler, CharacterExitHandler};
pub use effect::{CameraShakeHandler, EffectHandler};
pub use flow::{ChoiceHandler, EndHandler, StartHandler, WaitHandler};
pub use scene::{
    ChangeBackgroundHandler, FadeInHandler, FadeOutHandler, HideDialogHandler, HideSteelHandler,
    ShowDialogHandler, ShowSteelHandler,
};
pub use talk::TalkHandler;

/// 无参回调
pub type HookFn = Arc<dyn Fn() + Send + Sync>;
/// 带跳转目标的回调
pub type BranchFn = Arc<dyn Fn(usize) + Send + Sync>;

/// Handler 回连播放器的回调集合
///
/// Choice/End 这类订单需要反向影响播放进度（跳转、收束），
/// 通过回调而不是直接持有播放器，避免循环引用。
#[derive(Clone)]
pub struct StoryHooks {
    /// 进入选择分支前调用（暂停自动播放等）
    pub pause_for_choice: HookFn,
    /// 玩家选定选项后调用，参数为跳转目标订单序号
    pub branch: BranchFn,
    /// End 订单演出收尾后调用
    pub finish: HookFn,
}

impl StoryHooks {
    /// 全部为空操作的回调集合（测试与独立执行用）
    pub fn noop() -> Self {
        Self {
            pause_for_choice: Arc::new(|| {}),
            branch: Arc::new(|_| {}),
            finish: Arc::new(|| {}),
        }
    }
}

impl std::fmt::Debug for StoryHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryHooks").finish_non_exhaustive()
    }
}

/// 场景级作废闸门
///
/// 装载新场景时旧场景的令牌被取消。还停在旧场景里等宿主回应的
/// Handler（如 Choice）靠它解除阻塞并放弃回调，旧场景的跳转和
/// 收束不会作用到新场景上。
#[derive(Clone)]
pub struct SceneGate {
    current: Arc<Mutex<CancellationToken>>,
}

impl SceneGate {
    /// 新闸门，初始令牌未取消
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(CancellationToken::new())),
        }
    }

    /// 当前场景的令牌
    pub fn token(&self) -> CancellationToken {
        self.current.lock().unwrap().clone()
    }

    /// 作废当前场景，换上新令牌
    pub fn reset(&self) {
        let mut guard = self.current.lock().unwrap();
        guard.cancel();
        *guard = CancellationToken::new();
    }
}

impl Default for SceneGate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SceneGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneGate").finish_non_exhaustive()
    }
}

/// Handler 执行时可见的环境
#[derive(Clone)]
pub struct OrderContext {
    /// 演出接口
    pub surface: Arc<dyn PresentationSurface>,
    /// 播放配置
    pub config: StoryConfig,
    /// 回连播放器的回调
    pub hooks: StoryHooks,
    /// 所属场景的作废闸门
    pub gate: SceneGate,
}

impl std::fmt::Debug for OrderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// 单个订单类型的执行逻辑
#[async_trait]
pub trait OrderHandler: Send + Sync {
    /// 执行一条订单，返回演出句柄
    ///
    /// 返回 `Err` 表示这条订单无法开始演出（脚本数据错误或演出
    /// 接口失败），执行器会记录日志并继续同组的其余订单。
    async fn execute(&self, order: &OrderData, ctx: &OrderContext)
        -> StoryResult<AnimationHandle>;
}

/// 订单类型到 Handler 的注册表
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<OrderType, Arc<dyn OrderHandler>>,
}

impl HandlerRegistry {
    /// 空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个 Handler（同类型重复注册时后者覆盖前者）
    pub fn register(&mut self, order_type: OrderType, handler: Arc<dyn OrderHandler>) {
        self.handlers.insert(order_type, handler);
    }

    /// 查找订单类型对应的 Handler
    pub fn lookup(&self, order_type: OrderType) -> Option<&Arc<dyn OrderHandler>> {
        self.handlers.get(&order_type)
    }

    /// 已注册的 Handler 数量
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("len", &self.handlers.len())
            .finish()
    }
}

/// 构建标准注册表
///
/// 覆盖所有内建订单类型。`ChangeLighting` 是已知的例外：表格数据中
/// 存在该类型，但尚无对应演出实现，靠查表未命中策略自然跳过。
pub fn standard_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();

    registry.register(OrderType::Start, Arc::new(StartHandler));
    registry.register(OrderType::Talk, Arc::new(TalkHandler));
    registry.register(OrderType::Descriptive, Arc::new(TalkHandler));
    registry.register(OrderType::CharacterEntry, Arc::new(CharacterEntryHandler));
    registry.register(OrderType::CharacterChange, Arc::new(CharacterChangeHandler));
    registry.register(OrderType::CharacterExit, Arc::new(CharacterExitHandler));
    registry.register(
        OrderType::ChangeBackground,
        Arc::new(ChangeBackgroundHandler),
    );
    registry.register(OrderType::ChangeBgm, Arc::new(ChangeBgmHandler));
    registry.register(OrderType::StopBgm, Arc::new(StopBgmHandler));
    registry.register(OrderType::PlaySe, Arc::new(PlaySeHandler));
    registry.register(OrderType::ShowSteel, Arc::new(ShowSteelHandler));
    registry.register(OrderType::HideSteel, Arc::new(HideSteelHandler));
    registry.register(OrderType::ShowDialog, Arc::new(ShowDialogHandler));
    registry.register(OrderType::HideDialog, Arc::new(HideDialogHandler));
    registry.register(OrderType::Effect, Arc::new(EffectHandler::standard()));
    registry.register(OrderType::Wait, Arc::new(WaitHandler));
    registry.register(OrderType::Choice, Arc::new(ChoiceHandler));
    registry.register(OrderType::CameraShake, Arc::new(CameraShakeHandler));
    registry.register(OrderType::FadeIn, Arc::new(FadeInHandler));
    registry.register(OrderType::FadeOut, Arc::new(FadeOutHandler));
    registry.register(OrderType::End, Arc::new(EndHandler));

    registry
}

/// 把秒数转换为非负的 [`std::time::Duration`]
///
/// 表格中的时长字段允许为零（瞬时），负值按零处理。
pub(crate) fn secs(value: f32) -> std::time::Duration {
    std::time::Duration::from_secs_f32(value.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_coverage() {
        let registry = standard_registry();

        for order_type in [
            OrderType::Start,
            OrderType::Talk,
            OrderType::Descriptive,
            OrderType::CharacterEntry,
            OrderType::CharacterChange,
            OrderType::CharacterExit,
            OrderType::ChangeBackground,
            OrderType::ChangeBgm,
            OrderType::StopBgm,
            OrderType::PlaySe,
            OrderType::ShowSteel,
            OrderType::HideSteel,
            OrderType::ShowDialog,
            OrderType::HideDialog,
            OrderType::Effect,
            OrderType::Wait,
            OrderType::Choice,
            OrderType::CameraShake,
            OrderType::FadeIn,
            OrderType::FadeOut,
            OrderType::End,
        ] {
            assert!(
                registry.lookup(order_type).is_some(),
                "缺少 {order_type:?} 的 Handler"
            );
        }

        // ChangeLighting 刻意不注册，走未命中跳过策略
        assert!(registry.lookup(OrderType::ChangeLighting).is_none());
    }

    #[test]
    fn test_scene_gate_reset_invalidates_old_token() {
        let gate = SceneGate::new();
        let old = gate.token();
        assert!(!old.is_cancelled());

        gate.reset();
        assert!(old.is_cancelled());
        assert!(!gate.token().is_cancelled());
    }

    #[test]
    fn test_register_overrides() {
        let mut registry = HandlerRegistry::new();
        registry.register(OrderType::Wait, Arc::new(WaitHandler));
        registry.register(OrderType::Wait, Arc::new(StartHandler));
        assert_eq!(registry.len(), 1);
    }
}
