//! 特殊演出类订单：Effect 二级分发与相机震动。

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::{secs, OrderContext, OrderHandler};
use crate::error::StoryResult;
use crate::order::{EffectKind, OrderData};
use crate::surface::AnimationHandle;

/// Effect 订单 Handler
///
/// Effect 订单在 `speaker_id` 里携带演出编号，Handler 内部再按
/// [`EffectKind`] 查一张小注册表分发。编号无法解析是脚本数据错误，
/// 向上返回；已解析但未注册的演出按未命中策略跳过。
pub struct EffectHandler {
    routines: HashMap<EffectKind, Arc<dyn OrderHandler>>,
}

impl EffectHandler {
    /// 空的二级注册表
    pub fn new() -> Self {
        Self {
            routines: HashMap::new(),
        }
    }

    /// 注册一种演出
    pub fn register(&mut self, kind: EffectKind, routine: Arc<dyn OrderHandler>) {
        self.routines.insert(kind, routine);
    }

    /// 内建演出的完整装配
    pub fn standard() -> Self {
        let mut handler = Self::new();
        handler.register(EffectKind::Flash, Arc::new(FlashRoutine));
        handler.register(
            EffectKind::PlayParticle,
            Arc::new(ParticleRoutine { enabled: true }),
        );
        handler.register(
            EffectKind::StopParticle,
            Arc::new(ParticleRoutine { enabled: false }),
        );
        handler.register(EffectKind::Dizziness, Arc::new(DizzinessRoutine));
        handler
    }
}

impl Default for EffectHandler {
    fn default() -> Self {
        Self::standard()
    }
}

#[async_trait]
impl OrderHandler for EffectHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        let kind = order.effect_kind()?;

        match self.routines.get(&kind) {
            Some(routine) => routine.execute(order, ctx).await,
            None => {
                warn!(target: "story::handler", ?kind, "未注册的演出效果，跳过");
                Ok(AnimationHandle::instant())
            }
        }
    }
}

/// 画面闪光
///
/// 颜色十六进制串复用 `override_display_name` 字段。
struct FlashRoutine;

#[async_trait]
impl OrderHandler for FlashRoutine {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        Ok(ctx
            .surface
            .flash(&order.override_display_name, secs(order.duration))
            .await?)
    }
}

/// 粒子效果开关
///
/// 粒子槽位编号复用 `override_text_speed` 字段（从 1 开始），
/// 转为从 0 开始的下标传给宿主。
struct ParticleRoutine {
    enabled: bool,
}

#[async_trait]
impl OrderHandler for ParticleRoutine {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        let index = (order.override_text_speed as i32 - 1).max(0) as usize;
        ctx.surface.set_particle(index, self.enabled).await?;
        Ok(AnimationHandle::instant())
    }
}

/// 眩晕效果开关
///
/// `override_text_speed == 1` 表示开启，其余值关闭。
struct DizzinessRoutine;

#[async_trait]
impl OrderHandler for DizzinessRoutine {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        let enabled = order.override_text_speed as i32 == 1;
        ctx.surface.set_dizziness(enabled).await?;
        Ok(AnimationHandle::instant())
    }
}

/// 相机震动 Handler
pub struct CameraShakeHandler;

#[async_trait]
impl OrderHandler for CameraShakeHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        Ok(ctx.surface.camera_shake(secs(order.duration)).await?)
    }
}
