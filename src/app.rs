//! 应用入口
//!
//! 对外暴露三个操作：
//! - `run_batch`：同步所有已出货订单
//! - `single_lookup`：单笔查询，不写存储
//! - `get_captcha_challenge`：只做 GET，查看是否需要验证码

use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::{OrderStore, SupabaseClient};
use crate::config::Config;
use crate::error::{AppResult, ConfigError};
use crate::infrastructure::{CarrierTransport, ReqwestTransport};
use crate::models::{normalize_tracking_number, BatchReport, StatusOutcome};
use crate::orchestrator::BatchProcessor;
use crate::services::{classify_result, CaptchaProbe, CarrierSession, ReconcileWriter};
use crate::utils::logging::{log_orders_loaded, log_startup, print_final_stats};
use crate::workflow::OrderFlow;

/// 应用主结构
pub struct App {
    config: Config,
    session: CarrierSession,
    store: Option<Arc<dyn OrderStore>>,
}

impl App {
    /// 使用真实的 HTTP 传输和 Supabase 存储初始化
    ///
    /// 未配置存储时仍可做单笔查询和验证码探测。
    pub fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;
        log_startup(&config);

        let transport: Arc<dyn CarrierTransport> = Arc::new(ReqwestTransport::new(&config));
        let store: Option<Arc<dyn OrderStore>> = if config.has_store() {
            Some(Arc::new(SupabaseClient::new(&config)?))
        } else {
            warn!("⚠️ 未配置订单存储，只能做单笔查询");
            None
        };
        Ok(Self::with_parts(config, transport, store))
    }

    /// 注入传输和存储（测试、演练用）
    pub fn with_parts(
        config: Config,
        transport: Arc<dyn CarrierTransport>,
        store: Option<Arc<dyn OrderStore>>,
    ) -> Self {
        let session = CarrierSession::new(&config, transport);
        Self {
            config,
            session,
            store,
        }
    }

    /// 同步所有已出货订单
    ///
    /// 只有拉取待查列表失败会让整个操作失败；单笔订单的错误记录在报告里。
    pub async fn run_batch(&self, captcha_code: Option<String>) -> AppResult<BatchReport> {
        let store = self
            .store
            .clone()
            .ok_or(ConfigError::Missing("store_url"))?;

        info!("\n📁 正在拉取待查询的订单...");
        let orders = store.pending_orders().await?;
        if orders.is_empty() {
            warn!("⚠️ 没有需要查询的订单");
            return Ok(BatchReport::default());
        }

        let with_captcha = captcha_code.as_deref().is_some_and(|c| !c.trim().is_empty());
        log_orders_loaded(orders.len(), self.config.max_concurrent_queries, with_captcha);

        let flow = OrderFlow::new(self.session.clone(), ReconcileWriter::new(store));
        let processor = BatchProcessor::new(flow, self.config.max_concurrent_queries);
        let result = processor.run(orders, captcha_code).await;

        let summary = result.summary();
        let report = result.into_report();
        print_final_stats(&summary, &report.errors);
        Ok(report)
    }

    /// 单笔查询（不带验证码、不写存储），用于人工抽查
    pub async fn single_lookup(&self, tracking_number: &str) -> AppResult<StatusOutcome> {
        let tracking_number = normalize_tracking_number(tracking_number)?;
        let result = self.session.query(&tracking_number, None).await;
        let outcome = classify_result(&result);
        info!("货号 {} 查询结果: {}", tracking_number, outcome.status_text());
        Ok(outcome)
    }

    /// 探测验证码；需要时返回图片地址和配对令牌
    pub async fn get_captcha_challenge(&self) -> AppResult<CaptchaProbe> {
        Ok(self.session.probe_captcha().await?)
    }
}
