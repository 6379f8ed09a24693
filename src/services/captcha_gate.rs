//! 验证码检测 - 业务能力层
//!
//! 只负责"页面上有没有验证码、验证码图片在哪"，不负责识别。
//! 验证码永远由人工提供。

use reqwest::Url;
use serde::Serialize;

use crate::services::form_tokens::FormTokens;
use crate::utils::html;

/// 验证码挑战
///
/// 提交验证码时必须带上产生它的那一对 view state，不能混用。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaChallenge {
    pub image_url: String,
    pub view_state: String,
    pub view_state_generator: String,
}

/// 验证码探测结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaProbe {
    pub required: bool,
    #[serde(flatten)]
    pub challenge: Option<CaptchaChallenge>,
}

impl From<Option<CaptchaChallenge>> for CaptchaProbe {
    fn from(challenge: Option<CaptchaChallenge>) -> Self {
        Self {
            required: challenge.is_some(),
            challenge,
        }
    }
}

/// 找到第一个 src 含 `captcha` 的图片；注释和脚本里的不算
fn captcha_image_src(page: &str) -> Option<String> {
    let live = html::live_markup(page);
    let src = html::open_tags(&live, "img")
        .filter_map(|tag| html::attr(tag, "src"))
        .find(|src| src.to_ascii_lowercase().contains("captcha"));
    src
}

/// 页面上是否出现验证码图片
pub fn has_captcha_marker(page: &str) -> bool {
    captcha_image_src(page).is_some()
}

/// 验证码检测服务
#[derive(Debug, Clone)]
pub struct CaptchaGate {
    base_url: String,
}

impl CaptchaGate {
    /// `base_url` 用于把相对的图片地址补全
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// 检测验证码，出现时一并取出图片地址和配对的令牌
    pub fn detect(&self, page: &str) -> Option<CaptchaChallenge> {
        let src = captcha_image_src(page)?;
        let tokens = FormTokens::extract(page);
        Some(CaptchaChallenge {
            image_url: self.resolve(&src),
            view_state_generator: tokens.view_state_generator().to_string(),
            view_state: tokens.view_state,
        })
    }

    fn resolve(&self, src: &str) -> String {
        let base = format!("{}/", self.base_url.trim_end_matches('/'));
        Url::parse(&base)
            .and_then(|base| base.join(src))
            .map(|url| url.to_string())
            .unwrap_or_else(|_| src.to_string())
    }
}
