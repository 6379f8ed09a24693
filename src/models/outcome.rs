//! 查询结果分类
//!
//! 一次查询只产生一个 `StatusOutcome`，由回写服务立即消费，
//! 存储中只保留它的中文显示文本。

use serde::Serialize;

use crate::error::QueryError;

/// 自由文本结果的最大字符数
pub const MAX_TEXT_CHARS: usize = 500;

/// 物流状态分类（封闭集合）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum StatusOutcome {
    /// 已送达门市 / 已到店 / 可取货
    Delivered,
    /// 配送中
    InTransit,
    /// 需要人工输入验证码（包括验证码错误）
    NeedsCaptcha,
    /// 查无资料
    NoData,
    /// 系统忙碌中
    Busy,
    /// 请求超时
    Timeout,
    /// HTTP 403
    AccessDenied,
    /// HTTP 404
    NotFound,
    /// 无法归类的页面文本（最多 500 字）
    Unclassified(String),
    /// 其他失败
    QueryFailed(String),
}

impl StatusOutcome {
    /// 构造无法归类的结果，超过上限时截断
    pub fn unclassified(text: &str) -> Self {
        StatusOutcome::Unclassified(truncate_chars(text, MAX_TEXT_CHARS))
    }

    /// 写回订单的中文状态文本
    pub fn status_text(&self) -> String {
        match self {
            StatusOutcome::Delivered => "已送達門市".to_string(),
            StatusOutcome::InTransit => "配送中".to_string(),
            StatusOutcome::NeedsCaptcha => "需要驗證碼".to_string(),
            StatusOutcome::NoData => "查無資料".to_string(),
            StatusOutcome::Busy => "系統忙碌中，請稍後再試".to_string(),
            StatusOutcome::Timeout => "查詢逾時".to_string(),
            StatusOutcome::AccessDenied => "訪問被拒絕".to_string(),
            StatusOutcome::NotFound => "查無此貨號".to_string(),
            StatusOutcome::Unclassified(text) => text.clone(),
            StatusOutcome::QueryFailed(_) => "查詢失敗".to_string(),
        }
    }

    /// 传输层失败：结果不反映包裹状态
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StatusOutcome::Timeout
                | StatusOutcome::AccessDenied
                | StatusOutcome::NotFound
                | StatusOutcome::QueryFailed(_)
        )
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, StatusOutcome::Delivered)
    }

    /// 失败原因（仅失败结果有）
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            StatusOutcome::QueryFailed(reason) => Some(reason.clone()),
            other if other.is_failure() => Some(other.status_text()),
            _ => None,
        }
    }
}

impl From<&QueryError> for StatusOutcome {
    fn from(err: &QueryError) -> Self {
        match err {
            QueryError::Timeout => StatusOutcome::Timeout,
            QueryError::AccessDenied => StatusOutcome::AccessDenied,
            QueryError::NotFound => StatusOutcome::NotFound,
            other => StatusOutcome::QueryFailed(other.to_string()),
        }
    }
}

/// 按字符截断，不会切开多字节字符
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
