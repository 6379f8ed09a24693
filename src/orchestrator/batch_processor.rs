//! 批量订单处理器 - 编排层
//!
//! ## 职责
//!
//! 把一批订单交给 `OrderFlow`，控制同时在途的查询数量，汇总结果。
//!
//! ## 设计特点
//!
//! - **并发上限**：Semaphore 名额只覆盖承运商查询，回写前释放
//! - **故障隔离**：单笔订单出错（包括 panic）只记为 `QueryFailed`
//! - **一单一条**：结果按输入顺序重组，每笔订单恰好一条
//! - **不重试**：带验证码重试由调用方发起新的批次

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::models::{BatchEntry, BatchResult, OrderRef, StatusOutcome};
use crate::workflow::{OrderCtx, OrderFlow};

/// 批量订单处理器
pub struct BatchProcessor {
    flow: OrderFlow,
    max_concurrent: usize,
}

impl BatchProcessor {
    pub fn new(flow: OrderFlow, max_concurrent: usize) -> Self {
        Self {
            flow,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// 处理一批订单，所有订单都有终态后才返回
    pub async fn run(&self, orders: Vec<OrderRef>, captcha_code: Option<String>) -> BatchResult {
        let total = orders.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let captcha_code: Option<Arc<str>> = captcha_code
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .map(Arc::from);

        info!("\n{}", "=".repeat(60));
        info!("📦 开始查询 {} 笔订单 (并发上限 {})", total, self.max_concurrent);
        info!("{}", "=".repeat(60));

        // 所有订单一次性调度，由 Semaphore 控制实际并发
        let handles: Vec<_> = orders
            .iter()
            .cloned()
            .enumerate()
            .map(|(idx, order)| {
                let ctx = OrderCtx::new(idx + 1, total, order.tracking_number());
                let flow = self.flow.clone();
                let semaphore = semaphore.clone();
                let captcha_code = captcha_code.clone();

                tokio::spawn(async move {
                    let outcome = match semaphore.acquire_owned().await {
                        Ok(permit) => {
                            let outcome = flow.lookup(&ctx, captcha_code.as_deref()).await;
                            drop(permit);
                            outcome
                        }
                        Err(e) => StatusOutcome::QueryFailed(format!("并发控制异常: {}", e)),
                    };
                    flow.reconcile(&ctx, order, outcome).await
                })
            })
            .collect();

        // join_all 保持输入顺序
        let entries = join_all(handles)
            .await
            .into_iter()
            .zip(orders)
            .enumerate()
            .map(|(idx, (joined, order))| match joined {
                Ok(entry) => entry,
                Err(e) => {
                    error!("[订单 {}/{}] 任务执行失败: {}", idx + 1, total, e);
                    let reason = format!("查詢異常: {}", e);
                    let outcome = StatusOutcome::QueryFailed(reason.clone());
                    BatchEntry {
                        status_text: outcome.status_text(),
                        order,
                        outcome,
                        updated: false,
                        error: Some(reason),
                    }
                }
            })
            .collect();

        let result = BatchResult::new(entries);
        let summary = result.summary();
        info!("\n{}", "─".repeat(60));
        info!(
            "✓ 批次完成: 回写 {}/{}，需要验证码 {}，失败 {}",
            summary.updated_count, summary.total_count, summary.needs_captcha, summary.failed
        );
        info!("{}", "─".repeat(60));
        result
    }
}
