use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shipment_sync::utils::logging;
use shipment_sync::{App, Config};

#[derive(Parser)]
#[command(name = "shipment_sync")]
#[command(about = "7-ELEVEN 物流状态同步")]
struct Cli {
    /// TOML 配置文件（不指定时只读环境变量）
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// 以 JSON 输出结果
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 同步所有已出货订单的物流状态
    Sync {
        /// 人工识别的验证码
        #[arg(long)]
        captcha: Option<String>,
    },
    /// 查询单个货号，不写回订单
    Lookup { tracking_number: String },
    /// 查看当前是否需要验证码
    Captcha,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("无法加载配置文件 {}", path.display()))?,
        None => Config::from_env().context("环境变量配置无效")?,
    };

    // 初始化日志
    logging::init(config.verbose_logging);

    let app = App::initialize(config)?;

    match cli.command {
        Commands::Sync { captcha } => {
            let report = app.run_batch(captcha).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "成功更新 {}/{} 笔订单",
                    report.updated_count, report.total_count
                );
            }
        }
        Commands::Lookup { tracking_number } => {
            let outcome = app.single_lookup(&tracking_number).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}: {}", tracking_number.trim(), outcome.status_text());
            }
        }
        Commands::Captcha => {
            let probe = app.get_captcha_challenge().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&probe)?);
            } else if let Some(challenge) = &probe.challenge {
                println!("需要验证码，请查看图片并输入验证码: {}", challenge.image_url);
            } else {
                println!("当前不需要验证码");
            }
        }
    }

    Ok(())
}
