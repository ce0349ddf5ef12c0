//! Seam to the Markdown / commit-message rendering engine.
//!
//! The renderers in [`crate::render`] escape their input and hand it to a
//! [`MarkupEngine`]. [`BasicMarkup`] links issue references and expands
//! emoji shortcodes; a full Markdown engine plugs in behind the same trait.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::emoji;
use crate::safe::escape_html;
use crate::strings::url_join;

/// Symbol → value metadata used to resolve cross references
/// (`user`, `repo`, and for external trackers `format` / `style`)
pub type Metas = HashMap<String, String>;

/// Errors reported by a markup engine
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("Render failed: {0}")]
    Render(String),
    #[error("Invalid render metadata: {0}")]
    InvalidMetas(String),
}

/// Rendering and sanitizing engine for user content
///
/// Inputs to the `render_*` methods are already HTML-escaped. Outputs are
/// embedded into pages as-is, so implementations must not reintroduce
/// unescaped user content.
pub trait MarkupEngine: Send + Sync {
    /// Render a full commit message, linking references
    fn render_commit_message(
        &self,
        escaped: &str,
        url_prefix: &str,
        default_url: &str,
        metas: &Metas,
    ) -> Result<String, MarkupError>;

    /// Render a single subject line; plain text links to `default_url`
    fn render_commit_message_subject(
        &self,
        escaped: &str,
        url_prefix: &str,
        default_url: &str,
        metas: &Metas,
    ) -> Result<String, MarkupError>;

    /// Expand emoji only
    fn render_emoji(&self, escaped: &str) -> Result<String, MarkupError>;

    /// Sanitize raw, untrusted HTML
    fn sanitize(&self, raw: &str) -> String;
}

fn issue_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)(^|[\s(\[])#(\d+)\b").expect("valid issue pattern"))
}

enum Segment {
    Text(String),
    Link(String),
}

/// Issue-reference and emoji engine without Markdown support
#[derive(Debug, Clone, Default)]
pub struct BasicMarkup;

impl BasicMarkup {
    pub fn new() -> Self {
        Self
    }

    fn issue_url(&self, index: &str, url_prefix: &str, metas: &Metas) -> Result<String, MarkupError> {
        match metas.get("format") {
            Some(format) => {
                if !format.contains("{index}") {
                    return Err(MarkupError::InvalidMetas(format!(
                        "external tracker format has no {{index}}: {}",
                        format
                    )));
                }
                let user = metas.get("user").map(String::as_str).unwrap_or_default();
                let repo = metas.get("repo").map(String::as_str).unwrap_or_default();
                Ok(format
                    .replace("{user}", user)
                    .replace("{repo}", repo)
                    .replace("{index}", index))
            }
            None => Ok(url_join(url_prefix, &["issues", index])),
        }
    }

    fn segments(
        &self,
        escaped: &str,
        url_prefix: &str,
        metas: &Metas,
    ) -> Result<Vec<Segment>, MarkupError> {
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in issue_pattern().captures_iter(escaped) {
            let (Some(lead), Some(index)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            // Text before the reference, including its leading delimiter
            segments.push(Segment::Text(escaped[last..lead.end()].to_string()));
            let href = self.issue_url(index.as_str(), url_prefix, metas)?;
            segments.push(Segment::Link(format!(
                r#"<a href="{}" class="ref-issue">#{}</a>"#,
                escape_html(&href),
                index.as_str()
            )));
            last = index.end();
        }
        segments.push(Segment::Text(escaped[last..].to_string()));
        Ok(segments)
    }

    fn render(
        &self,
        escaped: &str,
        url_prefix: &str,
        default_url: &str,
        metas: &Metas,
    ) -> Result<String, MarkupError> {
        let mut out = String::with_capacity(escaped.len());
        for segment in self.segments(escaped, url_prefix, metas)? {
            match segment {
                Segment::Link(html) => out.push_str(&html),
                Segment::Text(text) if text.is_empty() => {}
                Segment::Text(text) => {
                    let text = emoji::replace_aliases_html(&text);
                    if default_url.is_empty() || text.trim().is_empty() {
                        out.push_str(&text);
                    } else {
                        out.push_str(&format!(
                            r#"<a href="{}" class="default-link">{}</a>"#,
                            escape_html(default_url),
                            text
                        ));
                    }
                }
            }
        }
        Ok(out)
    }
}

impl MarkupEngine for BasicMarkup {
    fn render_commit_message(
        &self,
        escaped: &str,
        url_prefix: &str,
        default_url: &str,
        metas: &Metas,
    ) -> Result<String, MarkupError> {
        escaped
            .split('\n')
            .map(|line| self.render(line, url_prefix, default_url, metas))
            .collect::<Result<Vec<_>, _>>()
            .map(|lines| lines.join("\n"))
    }

    fn render_commit_message_subject(
        &self,
        escaped: &str,
        url_prefix: &str,
        default_url: &str,
        metas: &Metas,
    ) -> Result<String, MarkupError> {
        let line = escaped.split('\n').next().unwrap_or_default();
        self.render(line, url_prefix, default_url, metas)
    }

    fn render_emoji(&self, escaped: &str) -> Result<String, MarkupError> {
        Ok(emoji::replace_aliases_html(escaped))
    }

    fn sanitize(&self, raw: &str) -> String {
        escape_html(raw)
    }
}
