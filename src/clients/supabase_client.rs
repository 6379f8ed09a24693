/// Supabase 订单存储客户端
///
/// 通过 PostgREST 接口读写 `orders` 表
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::clients::order_store::{OrderStore, OrderUpdate};
use crate::config::Config;
use crate::error::{ConfigError, StoreError};
use crate::models::{LifecycleStatus, OrderRef};

/// 订单表中本模块关心的列
#[derive(Debug, Deserialize)]
struct OrderRow {
    shopify_order_id: Option<String>,
    order_status: Option<String>,
}

/// Supabase 订单存储客户端
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
}

impl SupabaseClient {
    /// 创建新的存储客户端
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        if config.store_url.trim().is_empty() {
            return Err(ConfigError::Missing("store_url"));
        }
        if config.store_api_key.trim().is_empty() {
            return Err(ConfigError::Missing("store_api_key"));
        }

        let invalid_key = |e: reqwest::header::InvalidHeaderValue| ConfigError::Invalid {
            field: "store_api_key",
            reason: e.to_string(),
        };
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(&config.store_api_key).map_err(invalid_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.store_api_key)).map_err(invalid_key)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ConfigError::Invalid {
                field: "store_url",
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.store_url.trim_end_matches('/').to_string(),
        })
    }

    fn orders_endpoint(&self) -> String {
        format!("{}/rest/v1/orders", self.base_url)
    }

    /// 非 2xx 时读出响应体作为错误信息
    async fn check_status(endpoint: &str, response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            endpoint: endpoint.to_string(),
            code: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl OrderStore for SupabaseClient {
    async fn pending_orders(&self) -> Result<Vec<OrderRef>, StoreError> {
        let endpoint = self.orders_endpoint();
        let response = self
            .http
            .get(&endpoint)
            .query(&[
                ("select", "shopify_order_id,order_status"),
                ("order_status", "eq.shipped"),
                ("shopify_order_id", "not.is.null"),
            ])
            .send()
            .await
            .map_err(|source| StoreError::Request {
                endpoint: endpoint.clone(),
                source,
            })?;
        let response = Self::check_status(&endpoint, response).await?;
        let body = response.text().await.map_err(|source| StoreError::Request {
            endpoint: endpoint.clone(),
            source,
        })?;
        let rows: Vec<OrderRow> = serde_json::from_str(&body).map_err(|e| StoreError::Decode {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        })?;
        debug!("存储返回 {} 行订单", rows.len());

        let orders = rows
            .into_iter()
            .filter_map(|row| {
                let status = LifecycleStatus::from(row.order_status.unwrap_or_default());
                match OrderRef::new(row.shopify_order_id.unwrap_or_default(), status) {
                    Ok(order) => Some(order),
                    Err(e) => {
                        warn!("跳过货号无效的订单: {}", e);
                        None
                    }
                }
            })
            .collect();
        Ok(orders)
    }

    async fn update_order(&self, tracking_number: &str, update: &OrderUpdate) -> Result<(), StoreError> {
        let endpoint = self.orders_endpoint();
        let response = self
            .http
            .patch(&endpoint)
            .query(&[("shopify_order_id", format!("eq.{}", tracking_number))])
            .header("Prefer", "return=minimal")
            .json(update)
            .send()
            .await
            .map_err(|source| StoreError::Request {
                endpoint: endpoint.clone(),
                source,
            })?;
        Self::check_status(&endpoint, response).await?;
        debug!("订单 {} 已回写: {}", tracking_number, update.status_info);
        Ok(())
    }
}
