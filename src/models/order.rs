use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TrackingError;

/// 订单生命周期状态（只关心本模块会读写的两个值）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LifecycleStatus {
    /// 已出货，等待查询
    Shipped,
    /// 已送达（终态，不可回退）
    Delivered,
    /// 其他状态，原样保留
    Other(String),
}

impl LifecycleStatus {
    pub fn as_str(&self) -> &str {
        match self {
            LifecycleStatus::Shipped => "shipped",
            LifecycleStatus::Delivered => "delivered",
            LifecycleStatus::Other(s) => s,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, LifecycleStatus::Delivered)
    }
}

impl From<String> for LifecycleStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "shipped" => LifecycleStatus::Shipped,
            "delivered" => LifecycleStatus::Delivered,
            _ => LifecycleStatus::Other(value),
        }
    }
}

impl From<LifecycleStatus> for String {
    fn from(value: LifecycleStatus) -> Self {
        match value {
            LifecycleStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 订单在本模块中的投影：货号 + 生命周期状态
///
/// 货号同时是承运商查询键和订单存储中的主键。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRef {
    tracking_number: String,
    pub lifecycle_status: LifecycleStatus,
}

impl OrderRef {
    /// 创建订单投影；空白货号会被拒绝
    pub fn new(
        tracking_number: impl Into<String>,
        lifecycle_status: LifecycleStatus,
    ) -> Result<Self, TrackingError> {
        let tracking_number = normalize_tracking_number(&tracking_number.into())?;
        Ok(Self {
            tracking_number,
            lifecycle_status,
        })
    }

    /// 已出货的订单
    pub fn shipped(tracking_number: impl Into<String>) -> Result<Self, TrackingError> {
        Self::new(tracking_number, LifecycleStatus::Shipped)
    }

    pub fn tracking_number(&self) -> &str {
        &self.tracking_number
    }
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[货号 {} | {}]", self.tracking_number, self.lifecycle_status)
    }
}

/// 去掉首尾空白；为空时报错
pub fn normalize_tracking_number(raw: &str) -> Result<String, TrackingError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(TrackingError::Empty)
    } else {
        Ok(trimmed.to_string())
    }
}
