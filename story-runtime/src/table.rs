//! # Table 模块
//!
//! 单个场景的订单序列，提供按位置查找与"连续组"提取。
//!
//! ## 设计说明
//!
//! - 每个场景加载时构建一次，之后只读共享
//! - 越界访问返回 `None`/空序列而不是错误：游标允许短暂指向
//!   表尾之后（刚消费完最后一组时），由查找侧自然兜底

use serde::{Deserialize, Serialize};

use crate::order::{OrderData, SequenceType};

/// 一个场景的订单表
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderTable {
    orders: Vec<OrderData>,
}

impl OrderTable {
    /// 从订单列表构建
    pub fn new(orders: Vec<OrderData>) -> Self {
        Self { orders }
    }

    /// 获取指定位置的订单（越界返回 `None`）
    pub fn get(&self, index: usize) -> Option<&OrderData> {
        self.orders.get(index)
    }

    /// 从指定位置提取连续组
    ///
    /// 从 `index`（含）向后收集，直到遇到下一条 `Append` 订单（不含）
    /// 或表尾为止。组的成员资格只看后继订单的序列标记，首条订单
    /// 自己的标记不影响分组。`index` 越界时返回空列表。
    pub fn continuous_group_from(&self, index: usize) -> Vec<OrderData> {
        let mut group = Vec::new();

        let Some(first) = self.get(index) else {
            return group;
        };
        group.push(first.clone());

        for order in &self.orders[index + 1..] {
            if order.sequence == SequenceType::Append {
                break;
            }
            group.push(order.clone());
        }

        group
    }

    /// 订单总数
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
