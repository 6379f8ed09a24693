//! 物流状态分类 - 业务能力层
//!
//! 把承运商回应归入 `StatusOutcome`。规则按顺序评估，第一条命中即返回：
//!
//! | # | 条件 | 结果 |
//! |---|------|------|
//! | 1 | `#resultTable` 有文本 | `Unclassified(文本)` |
//! | 2 | 系統忙碌中 | `Busy` |
//! | 3 | 查無資料 | `NoData` |
//! | 4 | 驗證碼錯誤 | `NeedsCaptcha` |
//! | 5 | 验证码图片再次出现 | `NeedsCaptcha` |
//! | 6 | 已送達 / 已到店 / 可取貨 | `Delivered` |
//! | 7 | 配送中 / 運輸中 / 處理中 | `InTransit` |
//!
//! 都不命中时：有文本为 `Unclassified`，无文本为 `NoData`。
//! 送达规则必须排在配送规则之前：送达页面里常常也带着"處理中"字样。

use crate::error::QueryError;
use crate::models::StatusOutcome;
use crate::services::captcha_gate::has_captcha_marker;
use crate::services::carrier_session::RawResponse;
use crate::utils::html;

/// 结构化结果容器的 id
pub const RESULT_CONTAINER_ID: &str = "resultTable";

/// 分类用的页面视图，每个页面只解析一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    /// `#resultTable` 的文本（不存在时为 None）
    pub container_text: Option<String>,
    /// 整页可见文本
    pub text: String,
    /// 是否出现验证码图片
    pub has_captcha: bool,
}

impl PageView {
    pub fn parse(page: &str) -> Self {
        Self {
            container_text: html::element_text_by_id(page, RESULT_CONTAINER_ID),
            text: html::page_text(page),
            has_captcha: has_captcha_marker(page),
        }
    }
}

/// 规则条件
#[derive(Debug)]
pub enum Matcher {
    /// 结果容器有非空文本
    ResultContainer,
    /// 整页文本包含任一短语
    AnyPhrase(&'static [&'static str]),
    /// 验证码图片
    CaptchaImage,
}

impl Matcher {
    fn matches(&self, page: &PageView) -> bool {
        match self {
            Matcher::ResultContainer => page
                .container_text
                .as_deref()
                .is_some_and(|text| !text.is_empty()),
            Matcher::AnyPhrase(phrases) => phrases.iter().any(|p| page.text.contains(p)),
            Matcher::CaptchaImage => page.has_captcha,
        }
    }
}

/// 规则结果
#[derive(Debug)]
pub enum Verdict {
    /// 原样返回结果容器文本
    ContainerText,
    Fixed(StatusOutcome),
}

/// 一条分类规则
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pub matcher: Matcher,
    pub verdict: Verdict,
}

impl Rule {
    fn apply(&self, page: &PageView) -> Option<StatusOutcome> {
        if !self.matcher.matches(page) {
            return None;
        }
        Some(match &self.verdict {
            Verdict::ContainerText => {
                StatusOutcome::unclassified(page.container_text.as_deref().unwrap_or_default())
            }
            Verdict::Fixed(outcome) => outcome.clone(),
        })
    }
}

pub const BUSY_PHRASES: &[&str] = &["系統忙碌中"];
pub const NO_DATA_PHRASES: &[&str] = &["查無資料"];
pub const CAPTCHA_REJECTED_PHRASES: &[&str] = &["驗證碼錯誤"];
pub const DELIVERED_PHRASES: &[&str] = &["已送達", "已到店", "可取貨"];
pub const IN_TRANSIT_PHRASES: &[&str] = &["配送中", "運輸中", "處理中"];

/// 有序规则表，顺序即优先级
pub static RULES: &[Rule] = &[
    Rule {
        name: "result-container",
        matcher: Matcher::ResultContainer,
        verdict: Verdict::ContainerText,
    },
    Rule {
        name: "system-busy",
        matcher: Matcher::AnyPhrase(BUSY_PHRASES),
        verdict: Verdict::Fixed(StatusOutcome::Busy),
    },
    Rule {
        name: "no-data",
        matcher: Matcher::AnyPhrase(NO_DATA_PHRASES),
        verdict: Verdict::Fixed(StatusOutcome::NoData),
    },
    Rule {
        name: "captcha-rejected",
        matcher: Matcher::AnyPhrase(CAPTCHA_REJECTED_PHRASES),
        verdict: Verdict::Fixed(StatusOutcome::NeedsCaptcha),
    },
    Rule {
        name: "captcha-image",
        matcher: Matcher::CaptchaImage,
        verdict: Verdict::Fixed(StatusOutcome::NeedsCaptcha),
    },
    Rule {
        name: "delivered",
        matcher: Matcher::AnyPhrase(DELIVERED_PHRASES),
        verdict: Verdict::Fixed(StatusOutcome::Delivered),
    },
    Rule {
        name: "in-transit",
        matcher: Matcher::AnyPhrase(IN_TRANSIT_PHRASES),
        verdict: Verdict::Fixed(StatusOutcome::InTransit),
    },
];

/// 第一条命中的规则
pub fn first_match(page: &PageView) -> Option<(&'static Rule, StatusOutcome)> {
    RULES
        .iter()
        .find_map(|rule| rule.apply(page).map(|outcome| (rule, outcome)))
}

/// 对页面分类
pub fn classify_page(page: &str) -> StatusOutcome {
    let view = PageView::parse(page);
    match first_match(&view) {
        Some((_, outcome)) => outcome,
        None if view.text.is_empty() => StatusOutcome::NoData,
        None => StatusOutcome::unclassified(&view.text),
    }
}

/// 对原始回应分类，纯函数
pub fn classify(raw: &RawResponse) -> StatusOutcome {
    match raw {
        RawResponse::CaptchaRequired(_) => StatusOutcome::NeedsCaptcha,
        RawResponse::Page(page) => classify_page(page),
    }
}

/// 传输失败不进入文本分类
pub fn classify_result(result: &Result<RawResponse, QueryError>) -> StatusOutcome {
    match result {
        Ok(raw) => classify(raw),
        Err(err) => StatusOutcome::from(err),
    }
}
