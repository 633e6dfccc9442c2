//! 场景类订单：背景、蒸镜、对话框显隐、整体淡入淡出。

use async_trait::async_trait;

use super::{secs, OrderContext, OrderHandler};
use crate::error::StoryResult;
use crate::order::OrderData;
use crate::surface::AnimationHandle;

/// 背景切换 Handler
pub struct ChangeBackgroundHandler;

#[async_trait]
impl OrderHandler for ChangeBackgroundHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        Ok(ctx
            .surface
            .change_background(&order.file_path, secs(order.duration))
            .await?)
    }
}

/// 显示蒸镜 Handler
pub struct ShowSteelHandler;

#[async_trait]
impl OrderHandler for ShowSteelHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        Ok(ctx
            .surface
            .show_steel(&order.file_path, secs(order.duration))
            .await?)
    }
}

/// 隐藏蒸镜 Handler
pub struct HideSteelHandler;

#[async_trait]
impl OrderHandler for HideSteelHandler {
    async fn execute(
        &self,
        _order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        ctx.surface.hide_steel().await?;
        Ok(AnimationHandle::instant())
    }
}

/// 显示对话框 Handler
pub struct ShowDialogHandler;

#[async_trait]
impl OrderHandler for ShowDialogHandler {
    async fn execute(
        &self,
        _order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        ctx.surface.set_dialog_visible(true).await?;
        Ok(AnimationHandle::instant())
    }
}

/// 隐藏对话框 Handler
pub struct HideDialogHandler;

#[async_trait]
impl OrderHandler for HideDialogHandler {
    async fn execute(
        &self,
        _order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        ctx.surface.set_dialog_visible(false).await?;
        Ok(AnimationHandle::instant())
    }
}

/// 整体淡入 Handler
pub struct FadeInHandler;

#[async_trait]
impl OrderHandler for FadeInHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        Ok(ctx.surface.fade_in(secs(order.duration)).await?)
    }
}

/// 整体淡出 Handler
pub struct FadeOutHandler;

#[async_trait]
impl OrderHandler for FadeOutHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        Ok(ctx.surface.fade_out(secs(order.duration)).await?)
    }
}
