//! 订单存储接口
//!
//! 本模块只读写订单的一小部分字段：货号、生命周期状态、状态文本、最后查询时间。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::StoreError;
use crate::models::{LifecycleStatus, OrderRef};

/// 单笔订单的回写内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderUpdate {
    /// 状态文本（显示用）
    pub status_info: String,
    pub last_checked: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// 只在需要变更生命周期时出现
    #[serde(rename = "order_status", skip_serializing_if = "Option::is_none")]
    pub lifecycle_status: Option<LifecycleStatus>,
}

/// 外部订单存储
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// 已出货且货号非空的订单
    async fn pending_orders(&self) -> Result<Vec<OrderRef>, StoreError>;

    /// 更新单笔订单，只触及这一行
    async fn update_order(&self, tracking_number: &str, update: &OrderUpdate) -> Result<(), StoreError>;
}
