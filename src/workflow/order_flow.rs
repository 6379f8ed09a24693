//! 订单处理流程 - 流程层
//!
//! 核心职责：定义"一笔订单"的处理流程
//!
//! 流程顺序：
//! 1. 查询承运商（GET → 验证码检查 → POST）
//! 2. 分类结果
//! 3. 回写订单
//!
//! 查询和回写拆成两步，编排层在两步之间释放并发名额。

use tracing::{info, warn};

use crate::models::{BatchEntry, OrderRef, StatusOutcome};
use crate::services::{classify_result, CarrierSession, ReconcileWriter};
use crate::workflow::order_ctx::OrderCtx;

/// 订单处理流程
///
/// - 不持有任何共享可变状态
/// - 只依赖业务能力（services）
#[derive(Clone)]
pub struct OrderFlow {
    session: CarrierSession,
    writer: ReconcileWriter,
}

impl OrderFlow {
    pub fn new(session: CarrierSession, writer: ReconcileWriter) -> Self {
        Self { session, writer }
    }

    /// 查询并分类，不写存储
    pub async fn lookup(&self, ctx: &OrderCtx, captcha_code: Option<&str>) -> StatusOutcome {
        info!("{} 🔍 查询物流状态...", ctx);
        let result = self.session.query(&ctx.tracking_number, captcha_code).await;
        let outcome = classify_result(&result);

        match &result {
            Err(e) => warn!("{} ❌ 查询 7-11 失败：{}", ctx, e),
            Ok(_) => info!("{} ✓ 结果: {}", ctx, outcome.status_text()),
        }
        outcome
    }

    /// 回写一笔订单并生成批次条目
    pub async fn reconcile(&self, ctx: &OrderCtx, order: OrderRef, outcome: StatusOutcome) -> BatchEntry {
        let applied = self.writer.apply(&order, &outcome).await;
        if applied.updated {
            info!("{} 📝 已回写", ctx);
        }
        BatchEntry {
            status_text: outcome.status_text(),
            order,
            outcome,
            updated: applied.updated,
            error: applied.error,
        }
    }
}
