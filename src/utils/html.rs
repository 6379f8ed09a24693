//! HTML 文本工具
//!
//! 承运商页面是服务端渲染的 ASP.NET 页面，只需要：隐藏字段、
//! 验证码图片、结果容器和整页文本。用正则逐个标签处理即可。

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").expect("valid regex"));

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(/?)([a-zA-Z][a-zA-Z0-9]*)\b[^>]*?(/?)>").expect("valid regex")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid regex")
});

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->")
        .expect("valid regex")
});

static BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<body\b[^>]*>(.*?)(?:</body\s*>|\z)").expect("valid regex")
});

static HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<head\b[^>]*>.*?(?:</head\s*>|\z)").expect("valid regex"));

static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#([xX][0-9a-fA-F]+|[0-9]+);").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// 去掉注释和脚本/样式块，只留下会被浏览器渲染的标记
pub fn live_markup(html: &str) -> Cow<'_, str> {
    SCRIPT_OR_STYLE.replace_all(html, " ")
}

/// 遍历指定名称的开标签（大小写不敏感），返回整个标签文本
pub fn open_tags<'a>(html: &'a str, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    OPEN_TAG
        .captures_iter(html)
        .filter(move |cap| cap[1].eq_ignore_ascii_case(name))
        .filter_map(|cap| cap.get(0).map(|m| m.as_str()))
}

/// 读取标签属性值（已解码实体）
pub fn attr(tag: &str, name: &str) -> Option<String> {
    // 跳过标签名本身，避免 `<input` 被当作属性
    let body = tag
        .trim_start_matches('<')
        .trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    ATTRIBUTE.captures_iter(body).find_map(|cap| {
        if !cap[1].eq_ignore_ascii_case(name) {
            return None;
        }
        let raw = cap
            .get(2)
            .or_else(|| cap.get(3))
            .or_else(|| cap.get(4))
            .map(|m| m.as_str())
            .unwrap_or_default();
        Some(decode_entities(raw))
    })
}

/// 解码常见 HTML 实体
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let decoded = NUMERIC_ENTITY.replace_all(text, |cap: &regex::Captures<'_>| {
        let code = &cap[1];
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| cap[0].to_string())
    });
    decoded
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// 把一段 HTML 转为可见文本：去脚本/样式/注释/标签，解码实体，合并空白
pub fn html_to_text(fragment: &str) -> String {
    let without_scripts = SCRIPT_OR_STYLE.replace_all(fragment, " ");
    let without_tags = ANY_TAG.replace_all(&without_scripts, " ");
    let decoded = decode_entities(&without_tags);
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

/// 整页可见文本；有 `<body>` 时只取 body（允许缺少 `</body>`），否则去掉 `<head>`
pub fn page_text(html: &str) -> String {
    match BODY.captures(html).and_then(|cap| cap.get(1)) {
        Some(body) => html_to_text(body.as_str()),
        None => html_to_text(&HEAD.replace_all(html, " ")),
    }
}

/// 取指定 id 元素的内部 HTML，正确处理同名标签嵌套
pub fn element_inner_by_id<'a>(html: &'a str, id: &str) -> Option<&'a str> {
    let (name, open_end) = OPEN_TAG.captures_iter(html).find_map(|cap| {
        let whole = cap.get(0)?;
        let matches_id = attr(whole.as_str(), "id").is_some_and(|v| v == id);
        matches_id.then(|| (cap[1].to_string(), whole.end()))
    })?;

    let mut depth = 1usize;
    for cap in ANY_TAG.captures_iter(&html[open_end..]) {
        if !cap[2].eq_ignore_ascii_case(&name) || !cap[3].is_empty() {
            continue;
        }
        if cap[1].is_empty() {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                let close_start = open_end + cap.get(0)?.start();
                return Some(&html[open_end..close_start]);
            }
        }
    }
    // 未闭合：取到文档末尾
    Some(&html[open_end..])
}

/// 指定 id 元素的可见文本
pub fn element_text_by_id(html: &str, id: &str) -> Option<String> {
    element_inner_by_id(html, id).map(html_to_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_handles_quote_styles_and_order() {
        let tag = r#"<input value='abc&amp;def' type=hidden NAME="__VIEWSTATE">"#;
        assert_eq!(attr(tag, "name").as_deref(), Some("__VIEWSTATE"));
        assert_eq!(attr(tag, "value").as_deref(), Some("abc&def"));
        assert_eq!(attr(tag, "type").as_deref(), Some("hidden"));
        assert_eq!(attr(tag, "id"), None);
    }

    #[test]
    fn test_open_tags_case_insensitive() {
        let html = r#"<IMG src="a.png"><img src="b.png"><image src="c.png">"#;
        let srcs: Vec<_> = open_tags(html, "img").filter_map(|t| attr(t, "src")).collect();
        assert_eq!(srcs, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_page_text_strips_scripts_and_collapses_whitespace() {
        let html = r#"<html><head><title>貨態查詢</title></head>
            <body><script>var s = "處理中";</script>
            <div>包裹&nbsp;狀態：</div>
            <span>已到店</span></body></html>"#;
        assert_eq!(page_text(html), "包裹 狀態： 已到店");
    }

    #[test]
    fn test_page_text_without_closing_body() {
        let html = "<html><head><title>貨態查詢</title></head><body><p>請洽客服</p>";
        assert_eq!(page_text(html), "請洽客服");

        let headless = "<head><title>貨態查詢</title></head><p>請洽客服</p>";
        assert_eq!(page_text(headless), "請洽客服");
    }

    #[test]
    fn test_live_markup_drops_comments_and_scripts() {
        let html = r#"<!-- <img src="a.png"> --><script>var t = '<img src="b.png">';</script><img src="c.png">"#;
        let live = live_markup(html);
        let srcs: Vec<_> = open_tags(&live, "img").filter_map(|t| attr(t, "src")).collect();
        assert_eq!(srcs, vec!["c.png"]);
    }

    #[test]
    fn test_decode_numeric_entities() {
        assert_eq!(decode_entities("&#37197;&#x9001;"), "配送");
        assert_eq!(decode_entities("a &amp;lt; b"), "a &lt; b");
    }

    #[test]
    fn test_element_text_by_id_with_nested_tables() {
        let html = r#"<table id="resultTable"><tr><td><table><tr><td>內層</td></tr></table></td>
            <td>外層</td></tr></table><p>之後</p>"#;
        assert_eq!(element_text_by_id(html, "resultTable").as_deref(), Some("內層 外層"));
        assert_eq!(element_text_by_id(html, "missing"), None);
    }

    #[test]
    fn test_element_text_empty_container() {
        let html = r#"<div id="resultTable">   </div>"#;
        assert_eq!(element_text_by_id(html, "resultTable").as_deref(), Some(""));
    }
}
