use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 承运商查询错误（仅在单笔查询 / 验证码探测等非批量入口上抛出）
    #[error("物流查询错误: {0}")]
    Query(#[from] QueryError),
    /// 订单存储错误
    #[error("订单存储错误: {0}")]
    Store(#[from] StoreError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 输入校验错误
    #[error("输入错误: {0}")]
    Input(#[from] TrackingError),
}

/// 承运商网站请求错误
///
/// 只描述传输层失败；页面内容异常不是错误，由分类器降级为 `Unclassified`。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// 单步请求超过时限
    #[error("请求超时")]
    Timeout,
    /// HTTP 403
    #[error("访问被拒绝 (HTTP 403)")]
    AccessDenied,
    /// HTTP 404
    #[error("查询页不存在 (HTTP 404)")]
    NotFound,
    /// 其他非 2xx 状态码
    #[error("承运商返回异常状态码: {0}")]
    HttpStatus(u16),
    /// 连接失败、读取失败等网络错误
    #[error("网络错误: {0}")]
    Network(String),
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return QueryError::Timeout;
        }
        match err.status().map(|s| s.as_u16()) {
            Some(403) => QueryError::AccessDenied,
            Some(404) => QueryError::NotFound,
            Some(code) => QueryError::HttpStatus(code),
            None => QueryError::Network(err.to_string()),
        }
    }
}

impl QueryError {
    /// 按 HTTP 状态码归类；2xx 返回 `None`
    pub fn from_status(code: u16) -> Option<Self> {
        match code {
            200..=299 => None,
            403 => Some(QueryError::AccessDenied),
            404 => Some(QueryError::NotFound),
            other => Some(QueryError::HttpStatus(other)),
        }
    }
}

/// 订单存储错误，作用域限定在单条记录（拉取待查列表除外）
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("存储请求失败 ({endpoint}): {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("存储返回错误响应 ({endpoint}): HTTP {code} {body}")]
    Status {
        endpoint: String,
        code: u16,
        body: String,
    },
    #[error("存储响应解析失败 ({endpoint}): {message}")]
    Decode { endpoint: String, message: String },
    /// 内存存储中找不到订单
    #[error("订单不存在: {0}")]
    UnknownOrder(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("配置项 {field} 无效: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("缺少配置项 {0}")]
    Missing(&'static str),
}

/// 货号校验错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackingError {
    #[error("请提供货号")]
    Empty,
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
