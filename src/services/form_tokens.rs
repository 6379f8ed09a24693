//! ASP.NET 防篡改令牌
//!
//! 令牌从 GET 页面取出后作为不可变值传给 POST，原样回传。

use crate::utils::html;

/// 页面缺少 `__VIEWSTATEGENERATOR` 时使用的固定值（查询页的已知值）
pub const FALLBACK_VIEW_STATE_GENERATOR: &str = "3E7313DB";

/// 查询按钮的字段名和值
const SUBMIT_FIELD: (&str, &str) = ("aaa", "查詢");

/// 查询页隐藏字段
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormTokens {
    pub view_state: String,
    pub view_state_generator: Option<String>,
    pub event_validation: Option<String>,
}

impl FormTokens {
    /// 从查询页提取隐藏字段；缺失的 `__VIEWSTATE` 视为空串，注释掉的字段忽略
    pub fn extract(page: &str) -> Self {
        let mut tokens = FormTokens::default();
        let live = html::live_markup(page);
        for tag in html::open_tags(&live, "input") {
            let Some(name) = html::attr(tag, "name") else {
                continue;
            };
            let value = html::attr(tag, "value").unwrap_or_default();
            match name.as_str() {
                "__VIEWSTATE" => tokens.view_state = value,
                "__VIEWSTATEGENERATOR" => tokens.view_state_generator = Some(value),
                "__EVENTVALIDATION" => tokens.event_validation = Some(value),
                _ => {}
            }
        }
        tokens
    }

    pub fn view_state_generator(&self) -> &str {
        self.view_state_generator
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(FALLBACK_VIEW_STATE_GENERATOR)
    }

    /// 组装查询表单；验证码只在提供时附带
    pub fn search_form(&self, tracking_number: &str, captcha_code: Option<&str>) -> Vec<(String, String)> {
        let mut form = vec![
            ("__VIEWSTATE".to_string(), self.view_state.clone()),
            (
                "__VIEWSTATEGENERATOR".to_string(),
                self.view_state_generator().to_string(),
            ),
        ];
        if let Some(event_validation) = &self.event_validation {
            form.push(("__EVENTVALIDATION".to_string(), event_validation.clone()));
        }
        form.push(("txtProductNum".to_string(), tracking_number.to_string()));
        if let Some(code) = captcha_code {
            form.push(("tbChkCode".to_string(), code.to_string()));
        }
        form.push((SUBMIT_FIELD.0.to_string(), SUBMIT_FIELD.1.to_string()));
        form.push(("txtPage".to_string(), "1".to_string()));
        form
    }
}
