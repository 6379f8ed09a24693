//! 状态回写服务 - 业务能力层
//!
//! 只负责"把一个查询结果写回一笔订单"，不关心批量和并发。
//!
//! 规则：
//! - 写入状态文本和最新查询时间
//! - 只有 `Delivered` 会把生命周期改为 delivered，且不可回退
//! - 传输失败的结果不写入，避免覆盖上一次真实读数

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::clients::{OrderStore, OrderUpdate};
use crate::models::{LifecycleStatus, OrderRef, StatusOutcome};

/// 单笔回写结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub updated: bool,
    pub error: Option<String>,
}

/// 根据查询结果构造回写内容；传输失败时返回 `None`
pub fn build_update(outcome: &StatusOutcome, now: DateTime<Utc>) -> Option<OrderUpdate> {
    if outcome.is_failure() {
        return None;
    }
    Some(OrderUpdate {
        status_info: outcome.status_text(),
        last_checked: now,
        updated_at: now,
        lifecycle_status: outcome.is_delivered().then_some(LifecycleStatus::Delivered),
    })
}

/// 状态回写服务
#[derive(Clone)]
pub struct ReconcileWriter {
    store: Arc<dyn OrderStore>,
}

impl ReconcileWriter {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// 回写一笔订单；存储失败只影响本笔
    pub async fn apply(&self, order: &OrderRef, outcome: &StatusOutcome) -> ApplyResult {
        let Some(update) = build_update(outcome, Utc::now()) else {
            debug!("{} 查询失败，不回写: {:?}", order, outcome);
            return ApplyResult {
                updated: false,
                error: outcome.failure_reason(),
            };
        };

        if update.lifecycle_status.is_some() && !order.lifecycle_status.is_delivered() {
            info!("订单 {} 已送达，更新状态为 delivered", order.tracking_number());
        }

        match self.store.update_order(order.tracking_number(), &update).await {
            Ok(()) => ApplyResult {
                updated: true,
                error: None,
            },
            Err(e) => {
                warn!("更新订单 {} 失败：{}", order.tracking_number(), e);
                ApplyResult {
                    updated: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
