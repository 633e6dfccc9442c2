//! # Cursor 模块
//!
//! 播放进度游标：保存当前指令位置，支持推进/跳转/重置。
//!
//! ## 设计说明
//!
//! 游标本身不做边界校验——边界由 [`OrderTable`](crate::table::OrderTable)
//! 的查找侧兜底。这使游标可以短暂地指向表尾之后（刚消费完最后一组时）
//! 而不报错。

use serde::{Deserialize, Serialize};

/// 播放进度游标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressCursor {
    position: usize,
}

impl ProgressCursor {
    /// 创建指向开头的游标
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前位置
    pub fn position(&self) -> usize {
        self.position
    }

    /// 重置到开头
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// 向前推进 `n` 条
    pub fn advance_by(&mut self, n: usize) {
        self.position += n;
    }

    /// 跳转到指定位置
    pub fn jump_to(&mut self, index: usize) {
        self.position = index;
    }
}
