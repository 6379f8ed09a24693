//! 内存订单存储
//!
//! 行为与 Supabase 存储一致，用于测试和本地演练；可以注入失败。

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::clients::order_store::{OrderStore, OrderUpdate};
use crate::error::StoreError;
use crate::models::{LifecycleStatus, OrderRef};

/// 内存中的订单行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOrder {
    pub lifecycle_status: LifecycleStatus,
    pub status_info: Option<String>,
    pub last_checked: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<BTreeMap<String, StoredOrder>>,
    failing_updates: Mutex<HashSet<String>>,
    fail_listing: AtomicBool,
    update_calls: AtomicUsize,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, tracking_number: &str, lifecycle_status: LifecycleStatus) {
        self.orders.lock().await.insert(
            tracking_number.to_string(),
            StoredOrder {
                lifecycle_status,
                status_info: None,
                last_checked: None,
            },
        );
    }

    pub async fn get(&self, tracking_number: &str) -> Option<StoredOrder> {
        self.orders.lock().await.get(tracking_number).cloned()
    }

    /// 让指定订单的回写失败
    pub async fn fail_updates_for(&self, tracking_number: &str) {
        self.failing_updates
            .lock()
            .await
            .insert(tracking_number.to_string());
    }

    /// 让拉取待查列表失败
    pub fn fail_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn pending_orders(&self) -> Result<Vec<OrderRef>, StoreError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(StoreError::Status {
                endpoint: "memory://orders".to_string(),
                code: 503,
                body: "listing disabled".to_string(),
            });
        }
        let orders = self.orders.lock().await;
        Ok(orders
            .iter()
            .filter(|(_, row)| row.lifecycle_status == LifecycleStatus::Shipped)
            .filter_map(|(no, row)| OrderRef::new(no.clone(), row.lifecycle_status.clone()).ok())
            .collect())
    }

    async fn update_order(&self, tracking_number: &str, update: &OrderUpdate) -> Result<(), StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_updates.lock().await.contains(tracking_number) {
            return Err(StoreError::Status {
                endpoint: format!("memory://orders/{}", tracking_number),
                code: 500,
                body: "update rejected".to_string(),
            });
        }
        let mut orders = self.orders.lock().await;
        let row = orders
            .get_mut(tracking_number)
            .ok_or_else(|| StoreError::UnknownOrder(tracking_number.to_string()))?;
        row.status_info = Some(update.status_info.clone());
        row.last_checked = Some(update.last_checked);
        if let Some(status) = &update.lifecycle_status {
            row.lifecycle_status = status.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pending_lists_only_shipped() {
        let store = MemoryOrderStore::new();
        store.insert("F2", LifecycleStatus::Shipped).await;
        store.insert("F1", LifecycleStatus::Shipped).await;
        store.insert("F3", LifecycleStatus::Delivered).await;

        let pending = store.pending_orders().await.unwrap();
        let ids: Vec<_> = pending.iter().map(|o| o.tracking_number()).collect();
        assert_eq!(ids, vec!["F1", "F2"]);
    }

    #[tokio::test]
    async fn test_update_unknown_order_fails() {
        let store = MemoryOrderStore::new();
        let now = Utc::now();
        let update = OrderUpdate {
            status_info: "配送中".into(),
            last_checked: now,
            updated_at: now,
            lifecycle_status: None,
        };
        assert!(matches!(
            store.update_order("NOPE", &update).await,
            Err(StoreError::UnknownOrder(_))
        ));
        assert_eq!(store.update_calls(), 1);
    }
}
