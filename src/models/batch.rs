use serde::Serialize;

use crate::models::{OrderRef, StatusOutcome};

/// 单笔订单在批次中的结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub order: OrderRef,
    pub outcome: StatusOutcome,
    /// 写回订单的显示文本
    pub status_text: String,
    /// 是否成功写回存储
    pub updated: bool,
    /// 查询失败或写回失败的原因
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 订单结果归类，用于汇总统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryCategory {
    Succeeded,
    NeedsCaptcha,
    Failed,
}

impl BatchEntry {
    pub fn category(&self) -> EntryCategory {
        if self.error.is_some() || self.outcome.is_failure() {
            EntryCategory::Failed
        } else if self.outcome == StatusOutcome::NeedsCaptcha {
            EntryCategory::NeedsCaptcha
        } else {
            EntryCategory::Succeeded
        }
    }
}

/// 失败订单的错误记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderError {
    pub tracking_number: String,
    pub message: String,
}

/// 一次批量同步的结果，条目顺序与输入订单一致
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    pub entries: Vec<BatchEntry>,
}

/// 汇总统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total_count: usize,
    pub updated_count: usize,
    pub succeeded: usize,
    pub needs_captcha: usize,
    pub failed: usize,
}

impl BatchResult {
    pub fn new(entries: Vec<BatchEntry>) -> Self {
        Self { entries }
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total_count: self.entries.len(),
            ..Default::default()
        };
        for entry in &self.entries {
            if entry.updated {
                summary.updated_count += 1;
            }
            match entry.category() {
                EntryCategory::Succeeded => summary.succeeded += 1,
                EntryCategory::NeedsCaptcha => summary.needs_captcha += 1,
                EntryCategory::Failed => summary.failed += 1,
            }
        }
        summary
    }

    /// 每笔失败订单一条错误
    pub fn errors(&self) -> Vec<OrderError> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let message = entry
                    .error
                    .clone()
                    .or_else(|| entry.outcome.failure_reason())?;
                Some(OrderError {
                    tracking_number: entry.order.tracking_number().to_string(),
                    message,
                })
            })
            .collect()
    }

    pub fn into_report(self) -> BatchReport {
        let summary = self.summary();
        let errors = self.errors();
        BatchReport {
            updated_count: summary.updated_count,
            total_count: summary.total_count,
            succeeded: summary.succeeded,
            needs_captcha: summary.needs_captcha,
            failed: summary.failed,
            errors,
            details: self.entries,
        }
    }
}

/// 返回给调用方（运营操作 / 定时任务）的报告
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub updated_count: usize,
    pub total_count: usize,
    pub succeeded: usize,
    pub needs_captcha: usize,
    pub failed: usize,
    pub details: Vec<BatchEntry>,
    pub errors: Vec<OrderError>,
}
