//! 订单处理上下文
//!
//! 封装"我正在处理批次中的第几笔订单"这一信息

use std::fmt::Display;

/// 订单处理上下文
#[derive(Debug, Clone)]
pub struct OrderCtx {
    /// 订单在批次中的序号（从1开始，仅用于日志显示）
    pub order_index: usize,

    /// 批次订单总数
    pub total: usize,

    /// 货号
    pub tracking_number: String,
}

impl OrderCtx {
    pub fn new(order_index: usize, total: usize, tracking_number: impl Into<String>) -> Self {
        Self {
            order_index,
            total,
            tracking_number: tracking_number.into(),
        }
    }
}

impl Display for OrderCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[订单 {}/{} 货号#{}]",
            self.order_index, self.total, self.tracking_number
        )
    }
}
