use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 承运商 e-tracking 根地址
    pub carrier_base_url: String,
    /// 查询页路径（GET 取表单，POST 提交查询）
    pub search_path: String,
    /// 单步请求超时（秒）
    pub request_timeout_secs: u64,
    /// POST 前的固定等待（毫秒），降低请求突发
    pub pre_post_delay_ms: u64,
    /// 同时在途的查询数量上限
    pub max_concurrent_queries: usize,
    /// 模拟浏览器的 User-Agent
    pub user_agent: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 订单存储（Supabase）配置 ---
    pub store_url: String,
    pub store_api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            carrier_base_url: "https://eservice.7-11.com.tw/e-tracking".to_string(),
            search_path: "search.aspx".to_string(),
            request_timeout_secs: 15,
            pre_post_delay_ms: 1000,
            max_concurrent_queries: 5,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            verbose_logging: false,
            store_url: String::new(),
            store_api_key: String::new(),
        }
    }
}

impl Config {
    /// 默认值 + 环境变量覆盖
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// 读取 TOML 配置文件，再用环境变量覆盖
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content).map_err(|source| {
            ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            }
        })?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// 用变量覆盖配置；设置了但解析失败的值报错，不静默忽略
    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(v) = lookup("CARRIER_BASE_URL") {
            self.carrier_base_url = v;
        }
        if let Some(v) = parse_var(&lookup, "CARRIER_TIMEOUT_SECS")? {
            self.request_timeout_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "PRE_POST_DELAY_MS")? {
            self.pre_post_delay_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_CONCURRENT_QUERIES")? {
            self.max_concurrent_queries = v;
        }
        if let Some(v) = parse_flag(&lookup, "VERBOSE_LOGGING")? {
            self.verbose_logging = v;
        }
        if let Some(v) = first_var(&lookup, &["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"]) {
            self.store_url = v;
        }
        if let Some(v) = first_var(&lookup, &["SUPABASE_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"]) {
            self.store_api_key = v;
        }
        Ok(())
    }

    /// 校验会影响抓取行为的数值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_queries == 0 {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_queries",
                reason: "必须至少为 1".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                reason: "必须大于 0".to_string(),
            });
        }
        if self.carrier_base_url.trim().is_empty() {
            return Err(ConfigError::Missing("carrier_base_url"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn pre_post_delay(&self) -> Duration {
        Duration::from_millis(self.pre_post_delay_ms)
    }

    /// 查询页完整地址
    pub fn search_url(&self) -> String {
        format!(
            "{}/{}",
            self.carrier_base_url.trim_end_matches('/'),
            self.search_path.trim_start_matches('/')
        )
    }

    /// 是否配置了订单存储
    pub fn has_store(&self) -> bool {
        !self.store_url.trim().is_empty() && !self.store_api_key.trim().is_empty()
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    raw.trim().parse().map(Some).map_err(|e| ConfigError::Invalid {
        field: name,
        reason: format!("无法解析 {:?}: {}", raw, e),
    })
}

/// 布尔开关，接受 true/false/1/0/yes/no/on/off
fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::Invalid {
            field: name,
            reason: format!("不是布尔值: {:?}", raw),
        }),
    }
}

fn first_var(lookup: &impl Fn(&str) -> Option<String>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| lookup(name).filter(|v| !v.trim().is_empty()))
}
