//! # Shipment Sync
//!
//! 7-ELEVEN 交货便物流状态同步引擎
//!
//! 承运商没有公开 API，只能模拟浏览器走一遍 e-tracking 查询页：
//! GET 取 ASP.NET 隐藏令牌 → （必要时由人工提供验证码）→ POST 查询，
//! 再把页面文本归类为固定的状态集合，回写订单。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - HTTP 传输，每次查询一个独立会话
//!
//! ### ② 业务能力层（Services）
//! - `CarrierSession` - 两步查询协议
//! - `CaptchaGate` - 验证码检测
//! - `status_classifier` - 有序规则表分类
//! - `ReconcileWriter` - 单笔回写，送达状态不可回退
//!
//! ### ③ 流程层（Workflow）
//! - `OrderFlow` - 一笔订单：查询 → 分类 → 回写
//!
//! ### ④ 编排层（Orchestration）
//! - `BatchProcessor` - Semaphore 限流的批量处理
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{MemoryOrderStore, OrderStore, OrderUpdate, SupabaseClient};
pub use config::Config;
pub use error::{AppError, AppResult, QueryError, StoreError};
pub use infrastructure::{CarrierExchange, CarrierTransport, ReqwestTransport};
pub use models::{BatchReport, BatchResult, LifecycleStatus, OrderRef, StatusOutcome};
pub use orchestrator::BatchProcessor;
pub use services::{CaptchaChallenge, CaptchaProbe, CarrierSession, RawResponse};
pub use workflow::{OrderCtx, OrderFlow};
