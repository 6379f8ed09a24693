#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use shipment_sync::{CarrierExchange, CarrierTransport, Config, LifecycleStatus, MemoryOrderStore, QueryError};

pub const HOME: &str = r#"<html><body><form action="./search.aspx">
    <input type="hidden" name="__VIEWSTATE" id="__VIEWSTATE" value="VS-HOME" />
    <input type="hidden" name="__VIEWSTATEGENERATOR" value="3E7313DB" />
    <input name="txtProductNum" type="text" /></form></body></html>"#;

pub const HOME_WITH_CAPTCHA: &str = r#"<html><body><form action="./search.aspx">
    <input type="hidden" name="__VIEWSTATE" id="__VIEWSTATE" value="VS-CAPTCHA" />
    <img id="imgCaptcha" src="ValidateImage.aspx?captcha=1" />
    <input name="tbChkCode" type="text" /></form></body></html>"#;

pub fn result_page(body: &str) -> String {
    format!("<html><head><title>貨態查詢</title></head><body>{}</body></html>", body)
}

/// POST 阶段的预设结果
#[derive(Clone)]
pub enum Scripted {
    Page(String),
    Error(QueryError),
    /// 永不返回，靠会话超时结束
    Hang,
    Panic,
}

#[derive(Default)]
pub struct CarrierStats {
    pub gets: AtomicUsize,
    pub posts: Mutex<Vec<Vec<(String, String)>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl CarrierStats {
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    /// 指定货号被 POST 的次数
    pub fn posts_for(&self, tracking_number: &str) -> usize {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .filter(|form| field(form, "txtProductNum") == Some(tracking_number))
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

pub fn field<'a>(form: &'a [(String, String)], name: &str) -> Option<&'a str> {
    form.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
}

/// 可编排的假承运商；每个会话从打开到释放计为一次在途查询
pub struct FakeCarrier {
    home: String,
    scripts: HashMap<String, Scripted>,
    latency: Duration,
    pub stats: Arc<CarrierStats>,
}

impl FakeCarrier {
    pub fn new(home: &str) -> Self {
        Self {
            home: home.to_string(),
            scripts: HashMap::new(),
            latency: Duration::ZERO,
            stats: Arc::new(CarrierStats::default()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn script(mut self, tracking_number: &str, scripted: Scripted) -> Self {
        self.scripts.insert(tracking_number.to_string(), scripted);
        self
    }

    pub fn page(self, tracking_number: &str, body: &str) -> Self {
        self.script(tracking_number, Scripted::Page(result_page(body)))
    }
}

impl CarrierTransport for FakeCarrier {
    fn open(&self) -> Result<Box<dyn CarrierExchange>, QueryError> {
        let now = self.stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Ok(Box::new(FakeExchange {
            home: self.home.clone(),
            scripts: self.scripts.clone(),
            latency: self.latency,
            stats: self.stats.clone(),
        }))
    }
}

struct FakeExchange {
    home: String,
    scripts: HashMap<String, Scripted>,
    latency: Duration,
    stats: Arc<CarrierStats>,
}

impl Drop for FakeExchange {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CarrierExchange for FakeExchange {
    async fn get(&self, _url: &str) -> Result<String, QueryError> {
        self.stats.gets.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        Ok(self.home.clone())
    }

    async fn post_form(
        &self,
        _url: &str,
        _referer: &str,
        form: &[(String, String)],
    ) -> Result<String, QueryError> {
        self.stats.posts.lock().unwrap().push(form.to_vec());
        tokio::time::sleep(self.latency).await;

        let tracking_number = field(form, "txtProductNum").unwrap_or_default();
        match self.scripts.get(tracking_number) {
            Some(Scripted::Page(page)) => Ok(page.clone()),
            Some(Scripted::Error(err)) => Err(err.clone()),
            Some(Scripted::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
            Some(Scripted::Panic) => panic!("carrier script panic for {}", tracking_number),
            None => Ok(result_page("查無資料")),
        }
    }
}

pub fn test_config(max_concurrent: usize) -> Config {
    Config {
        carrier_base_url: "http://carrier.test/e-tracking".to_string(),
        request_timeout_secs: 1,
        pre_post_delay_ms: 0,
        max_concurrent_queries: max_concurrent,
        ..Config::default()
    }
}

pub async fn store_with(orders: &[&str]) -> Arc<MemoryOrderStore> {
    let store = Arc::new(MemoryOrderStore::new());
    for no in orders {
        store.insert(no, LifecycleStatus::Shipped).await;
    }
    store
}
