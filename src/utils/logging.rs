/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{BatchSummary, OrderError};

/// 初始化 tracing 订阅器
///
/// 优先使用 `RUST_LOG`；未设置时默认 `info`，`verbose` 时为 `debug`。
/// 重复调用不会报错（测试里会多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚚 7-11 物流状态同步 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📊 最大并发查询数: {}", config.max_concurrent_queries);
    info!("⏱️ 单步超时: {} 秒", config.request_timeout_secs);
    info!("{}", "=".repeat(60));
}

/// 记录待查订单加载信息
///
/// # 参数
/// - `total`: 订单总数
/// - `max_concurrent`: 最大并发数
/// - `with_captcha`: 是否带了验证码
pub fn log_orders_loaded(total: usize, max_concurrent: usize, with_captcha: bool) {
    info!("✓ 找到 {} 笔待查询的订单", total);
    info!("📋 同时最多查询 {} 笔", max_concurrent);
    if with_captcha {
        info!("🔑 使用提供的验证码进行查询");
    }
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &BatchSummary, errors: &[OrderError]) {
    info!("\n{}", "=".repeat(60));
    info!("📊 同步完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功更新: {}/{}", summary.updated_count, summary.total_count);
    info!("📦 查询成功: {}", summary.succeeded);
    info!("🔑 需要验证码: {}", summary.needs_captcha);
    info!("❌ 失败: {}", summary.failed);
    for err in errors {
        warn!("  - 货号 {}: {}", err.tracking_number, err.message);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
