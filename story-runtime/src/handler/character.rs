//! 角色立绘类订单：登场、切换、退场。

use async_trait::async_trait;

use super::{secs, OrderContext, OrderHandler};
use crate::error::StoryResult;
use crate::order::OrderData;
use crate::surface::{AnimationHandle, CharacterView};

fn view_for(order: &OrderData) -> CharacterView {
    CharacterView {
        file_path: order.file_path.clone(),
        position: order.position,
        facial_expression: order.facial_expression,
        transition: secs(order.duration),
    }
}

/// 角色登场 Handler
pub struct CharacterEntryHandler;

#[async_trait]
impl OrderHandler for CharacterEntryHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        Ok(ctx.surface.character_enter(view_for(order)).await?)
    }
}

/// 角色立绘切换 Handler
pub struct CharacterChangeHandler;

#[async_trait]
impl OrderHandler for CharacterChangeHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        Ok(ctx.surface.character_change(view_for(order)).await?)
    }
}

/// 角色退场 Handler
pub struct CharacterExitHandler;

#[async_trait]
impl OrderHandler for CharacterExitHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        Ok(ctx
            .surface
            .character_exit(order.position, secs(order.duration))
            .await?)
    }
}
