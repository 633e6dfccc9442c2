//! 流程类订单：Start / Wait / Choice / End。

use async_trait::async_trait;
use tracing::{debug, info};

use super::{secs, OrderContext, OrderHandler};
use crate::error::{StoryResult, SurfaceError};
use crate::order::OrderData;
use crate::surface::{AnimationHandle, ChoiceView};

/// Start 订单 Handler：场景整体淡入
pub struct StartHandler;

#[async_trait]
impl OrderHandler for StartHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        Ok(ctx.surface.fade_in(secs(order.duration)).await?)
    }
}

/// Wait 订单 Handler：纯计时，可被快进
pub struct WaitHandler;

#[async_trait]
impl OrderHandler for WaitHandler {
    async fn execute(
        &self,
        order: &OrderData,
        _ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        Ok(AnimationHandle::timed(secs(order.duration)))
    }
}

/// Choice 订单 Handler
///
/// 执行顺序是固定的：先解析选项（脚本数据错误在展示前暴露），
/// 再通知播放器暂停推进，然后才把选项交给宿主等待玩家选择。
pub struct ChoiceHandler;

#[async_trait]
impl OrderHandler for ChoiceHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        let options = order.choice_options()?;
        let gate = ctx.gate.token();

        (ctx.hooks.pause_for_choice)();

        let views: Vec<ChoiceView> = options
            .iter()
            .map(|option| ChoiceView {
                label: option.label.clone(),
            })
            .collect();

        // 等待宿主期间场景可能被卸载，作废时放弃选择，不回调跳转
        let selected = tokio::select! {
            selected = ctx.surface.show_choices(&views) => selected?,
            _ = gate.cancelled() => {
                debug!(target: "story::handler", "场景已卸载，放弃选择等待");
                return Ok(AnimationHandle::instant());
            }
        };
        let Some(option) = options.get(selected) else {
            return Err(SurfaceError::new(format!(
                "宿主返回了越界的选项下标 {selected}（共 {} 项）",
                options.len()
            ))
            .into());
        };

        info!(
            target: "story::handler",
            label = %option.label,
            target_index = option.target_index,
            "选择分支"
        );
        (ctx.hooks.branch)(option.target_index);

        Ok(AnimationHandle::instant())
    }
}

/// End 订单 Handler
///
/// 淡出后收拾舞台（立绘、蒸镜、对话框内容），最后触发结束回调。
/// 收尾动作挂在演出句柄的等待端之后，快进也不会跳过它们。
pub struct EndHandler;

#[async_trait]
impl OrderHandler for EndHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        let fade = ctx.surface.fade_out(secs(order.duration)).await?;

        let surface = ctx.surface.clone();
        let finish = ctx.hooks.finish.clone();
        let gate = ctx.gate.token();
        Ok(fade.then(async move {
            // 场景被作废时不再动舞台，也不收束新场景
            if gate.is_cancelled() {
                return;
            }
            if let Err(e) = surface.hide_all_characters().await {
                tracing::warn!(target: "story::handler", error = %e, "收尾隐藏立绘失败");
            }
            if let Err(e) = surface.hide_steel().await {
                tracing::warn!(target: "story::handler", error = %e, "收尾隐藏蒸镜失败");
            }
            if let Err(e) = surface.clear_line().await {
                tracing::warn!(target: "story::handler", error = %e, "收尾清空对话框失败");
            }
            finish();
        }))
    }
}
