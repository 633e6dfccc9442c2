//! # Config 模块
//!
//! 播放相关的可调参数。
//!
//! ## 设计说明
//!
//! 自动播放间隔、文字速度这类常量属于产品调参而非核心逻辑，
//! 通过构造参数注入而不是硬编码。默认值仅作为合理起点。

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 播放配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryConfig {
    /// 自动播放的等待间隔
    pub auto_play_interval: Duration,

    /// 逐字显示的单字时长（秒）
    ///
    /// 订单自身的 `override_text_speed` 非零时优先。
    pub text_speed: f32,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            auto_play_interval: Duration::from_secs(3),
            text_speed: 0.05,
        }
    }
}
