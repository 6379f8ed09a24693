//! HTTP 传输 - 基础设施层
//!
//! 只暴露"发 GET / 发表单 POST"的能力，不认识货号、不解析页面。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use tracing::debug;

use crate::config::Config;
use crate::error::QueryError;

/// 一次查询独享的 HTTP 会话（独立 cookie）
#[async_trait]
pub trait CarrierExchange: Send + Sync {
    /// GET 页面，返回 HTML
    async fn get(&self, url: &str) -> Result<String, QueryError>;

    /// 以 `application/x-www-form-urlencoded` 提交表单，返回 HTML
    async fn post_form(
        &self,
        url: &str,
        referer: &str,
        form: &[(String, String)],
    ) -> Result<String, QueryError>;
}

/// 传输工厂：每次查询打开一个全新的会话，会话之间不共享任何状态
pub trait CarrierTransport: Send + Sync {
    fn open(&self) -> Result<Box<dyn CarrierExchange>, QueryError>;
}

/// 基于 reqwest 的传输实现
pub struct ReqwestTransport {
    user_agent: String,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: config.request_timeout(),
        }
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-TW,zh;q=0.9,en;q=0.8"),
        );
        headers.insert("dnt", HeaderValue::from_static("1"));
        headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));
        headers
    }
}

impl CarrierTransport for ReqwestTransport {
    fn open(&self) -> Result<Box<dyn CarrierExchange>, QueryError> {
        let client = reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .default_headers(Self::default_headers())
            .cookie_store(true)
            .timeout(self.timeout)
            .build()
            .map_err(|e| QueryError::Network(e.to_string()))?;
        Ok(Box::new(ReqwestExchange { client }))
    }
}

struct ReqwestExchange {
    client: reqwest::Client,
}

impl ReqwestExchange {
    async fn read_body(response: reqwest::Response) -> Result<String, QueryError> {
        let status = response.status().as_u16();
        debug!("承运商回应状态: {}", status);
        if let Some(err) = QueryError::from_status(status) {
            return Err(err);
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl CarrierExchange for ReqwestExchange {
    async fn get(&self, url: &str) -> Result<String, QueryError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::read_body(response).await
    }

    async fn post_form(
        &self,
        url: &str,
        referer: &str,
        form: &[(String, String)],
    ) -> Result<String, QueryError> {
        debug!("POST {} ({} 个字段)", url, form.len());
        let response = self
            .client
            .post(url)
            .header(REFERER, referer)
            .form(form)
            .send()
            .await?;
        Self::read_body(response).await
    }
}
