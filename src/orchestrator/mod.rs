//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和并发调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! app::App (RunBatch / SingleLookup / GetCaptchaChallenge)
//!     ↓
//! batch_processor (处理 Vec<OrderRef>，Semaphore 限流)
//!     ↓
//! workflow::OrderFlow (处理单笔订单：查询 → 分类 → 回写)
//!     ↓
//! services (能力层：session / captcha / classifier / writer)
//!     ↓
//! infrastructure (基础设施：HTTP 传输)
//! ```
//!
//! ## 设计原则
//!
//! 1. **向下依赖**：编排层 → workflow → services → infrastructure
//! 2. **无业务逻辑**：只做调度和统计，不做状态判断

pub mod batch_processor;

pub use batch_processor::BatchProcessor;
