//! 音频类订单：BGM 切换/停止、一次性音效。

use async_trait::async_trait;

use super::{secs, OrderContext, OrderHandler};
use crate::error::StoryResult;
use crate::order::OrderData;
use crate::surface::AnimationHandle;

/// BGM 切换 Handler
pub struct ChangeBgmHandler;

#[async_trait]
impl OrderHandler for ChangeBgmHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        ctx.surface.play_bgm(&order.file_path).await?;
        Ok(AnimationHandle::instant())
    }
}

/// BGM 停止 Handler（渐弱）
pub struct StopBgmHandler;

#[async_trait]
impl OrderHandler for StopBgmHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        Ok(ctx.surface.stop_bgm(secs(order.duration)).await?)
    }
}

/// 音效播放 Handler
pub struct PlaySeHandler;

#[async_trait]
impl OrderHandler for PlaySeHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        ctx.surface.play_se(&order.file_path).await?;
        Ok(AnimationHandle::instant())
    }
}
