//! 承运商查询会话 - 业务能力层
//!
//! 一次查询 = 一个全新会话：
//! 1. GET 查询页，取隐藏令牌并检查验证码
//! 2. 需要验证码却没有提供时立即返回，不发 POST
//! 3. 固定等待后 POST 货号 + 令牌 + 验证码
//!
//! 会话状态（cookie、令牌）只在本次查询内存活，不同订单之间不共享。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::QueryError;
use crate::infrastructure::CarrierTransport;
use crate::services::captcha_gate::{CaptchaChallenge, CaptchaGate, CaptchaProbe};
use crate::services::form_tokens::FormTokens;
use crate::utils::logging::truncate_text;

/// 一次查询的原始结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawResponse {
    /// POST 后的结果页
    Page(String),
    /// GET 阶段就需要验证码，未发 POST
    CaptchaRequired(CaptchaChallenge),
}

/// 承运商查询会话
#[derive(Clone)]
pub struct CarrierSession {
    transport: Arc<dyn CarrierTransport>,
    gate: CaptchaGate,
    search_url: String,
    step_timeout: Duration,
    pre_post_delay: Duration,
}

impl CarrierSession {
    pub fn new(config: &Config, transport: Arc<dyn CarrierTransport>) -> Self {
        Self {
            transport,
            gate: CaptchaGate::new(config.carrier_base_url.clone()),
            search_url: config.search_url(),
            step_timeout: config.request_timeout(),
            pre_post_delay: config.pre_post_delay(),
        }
    }

    /// 查询一个货号
    ///
    /// # 参数
    /// - `tracking_number`: 货号
    /// - `captcha_code`: 人工输入的验证码，空串视为未提供
    pub async fn query(
        &self,
        tracking_number: &str,
        captcha_code: Option<&str>,
    ) -> Result<RawResponse, QueryError> {
        let captcha_code = captcha_code.map(str::trim).filter(|c| !c.is_empty());
        debug!("开始查询 7-11 货号: {}", tracking_number);

        let exchange = self.transport.open()?;
        let home = self.step(exchange.get(&self.search_url)).await?;

        if let Some(challenge) = self.gate.detect(&home) {
            if captcha_code.is_none() {
                info!("[货号 {}] 检测到验证码要求，但未提供验证码", tracking_number);
                return Ok(RawResponse::CaptchaRequired(challenge));
            }
        }

        let tokens = FormTokens::extract(&home);
        let form = tokens.search_form(tracking_number, captcha_code);

        // 等待一下避免请求过快
        sleep(self.pre_post_delay).await;

        let page = self
            .step(exchange.post_form(&self.search_url, &self.search_url, &form))
            .await?;
        debug!(
            "[货号 {}] 结果页: {}",
            tracking_number,
            truncate_text(&page, 200)
        );

        Ok(RawResponse::Page(page))
    }

    /// 只做 GET，探测当前是否需要验证码
    pub async fn probe_captcha(&self) -> Result<CaptchaProbe, QueryError> {
        let exchange = self.transport.open()?;
        let home = self.step(exchange.get(&self.search_url)).await?;
        let probe = CaptchaProbe::from(self.gate.detect(&home));
        info!("是否需要验证码: {}", probe.required);
        Ok(probe)
    }

    /// 单步请求加时限
    async fn step<F>(&self, request: F) -> Result<String, QueryError>
    where
        F: Future<Output = Result<String, QueryError>>,
    {
        timeout(self.step_timeout, request)
            .await
            .map_err(|_| QueryError::Timeout)?
    }
}
