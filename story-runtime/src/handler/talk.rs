//! 文本类订单：Talk / Descriptive。

use async_trait::async_trait;
use std::time::Duration;

use super::{OrderContext, OrderHandler};
use crate::error::StoryResult;
use crate::order::{OrderData, OrderType};
use crate::surface::{AnimationHandle, DialogueView};

/// 对白 Handler
///
/// 同时承担 `Talk`（带说话者）与 `Descriptive`（地之文）两种订单：
/// 两者的差别只在是否展示说话者名。
pub struct TalkHandler;

impl TalkHandler {
    fn view_for(order: &OrderData, default_text_speed: f32) -> DialogueView {
        let speaker = if order.order_type == OrderType::Descriptive {
            None
        } else {
            // 覆盖名优先，否则交给宿主按 speaker_id 解析显示名
            order
                .display_name()
                .map(str::to_string)
                .or_else(|| Some(format!("#{}", order.speaker_id)))
        };

        DialogueView {
            speaker,
            text: order.dialog_text.clone(),
            reveal: Duration::from_secs_f32(order.reveal_duration(default_text_speed).max(0.0)),
        }
    }
}

#[async_trait]
impl OrderHandler for TalkHandler {
    async fn execute(
        &self,
        order: &OrderData,
        ctx: &OrderContext,
    ) -> StoryResult<AnimationHandle> {
        let view = Self::view_for(order, ctx.config.text_speed);
        Ok(ctx.surface.show_line(view).await?)
    }
}
