//! Markup that may be written to a response without further escaping.
//!
//! [`SafeHtml`] and [`SafeJs`] can only be built by escaping, by a sanitizing
//! [`MarkupEngine`], from compile-time literals, or by the renderers inside
//! this crate. There is no conversion from an arbitrary `String`.

use std::fmt;

use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;

use crate::markup::MarkupEngine;

/// HTML fragment that needs no further escaping
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SafeHtml(String);

impl SafeHtml {
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Escape `text` so it renders literally
    pub fn escape(text: &str) -> Self {
        Self(escape_html(text))
    }

    /// Wrap a literal that is part of the program text
    pub fn from_static(literal: &'static str) -> Self {
        Self(literal.to_string())
    }

    /// Run untrusted markup through the engine's sanitizer
    pub fn sanitize(raw: &str, engine: &dyn MarkupEngine) -> Self {
        Self(engine.sanitize(raw))
    }

    /// Output of an in-crate renderer or of the markup engine.
    pub(crate) fn trusted(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl IntoResponse for SafeHtml {
    fn into_response(self) -> Response {
        Html(self.0).into_response()
    }
}

/// JavaScript literal safe to embed inside a `<script>` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SafeJs(String);

impl SafeJs {
    /// Serialize `value` as a JSON literal that cannot close the script element
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        let raw = serde_json::to_string(value)?;
        let mut out = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                '<' => out.push_str("\\u003c"),
                '>' => out.push_str("\\u003e"),
                '&' => out.push_str("\\u0026"),
                '\u{2028}' => out.push_str("\\u2028"),
                '\u{2029}' => out.push_str("\\u2029"),
                c => out.push(c),
            }
        }
        Ok(Self(out))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SafeJs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape `& < > " '` for use in element content and quoted attributes
pub fn escape_html(raw: &str) -> String {
    html_escape::encode_quoted_attribute(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_neutralizes_markup() {
        let html = SafeHtml::escape(r#"<script>alert("x")</script>"#);
        assert!(!html.as_str().contains('<'));
        assert!(html.as_str().contains("&lt;script&gt;"));
    }

    #[test]
    fn test_safe_js_cannot_close_script() {
        let js = SafeJs::json("</script><b>&").unwrap();
        assert!(!js.as_str().contains('<'));
        assert!(!js.as_str().contains('&'));
        assert!(js.as_str().starts_with(r#""\u003c/script\u003e"#));
    }

    #[test]
    fn test_safe_js_object() {
        let js = SafeJs::json(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(js.to_string(), r#"{"a":1}"#);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let html = SafeHtml::from_static("<b>bold</b>");
        assert_eq!(serde_json::to_value(&html).unwrap(), "<b>bold</b>");
    }
}
