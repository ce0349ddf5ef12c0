//! Commit message, note and emoji rendering.
//!
//! Every renderer escapes its input before the engine sees it. The plain
//! variants log engine failures and return empty HTML; the `try_` variants
//! hand the [`MarkupError`] back to the caller.

use tracing::error;

use crate::markup::{MarkupEngine, MarkupError, Metas};
use crate::safe::{escape_html, SafeHtml};

/// First line of a commit message, without surrounding whitespace
pub fn commit_subject(msg: &str) -> &str {
    let line = msg.trim_start();
    let line = match line.find('\n') {
        Some(end) if end > 0 => &line[..end],
        _ => line,
    };
    line.trim_end()
}

/// Everything after the first line, empty for single-line messages
pub fn commit_body(msg: &str) -> &str {
    let msg = msg.trim_end();
    match msg.find('\n') {
        Some(end) if end > 0 => msg[end + 1..].trim_start(),
        _ => "",
    }
}

pub fn is_multiline_commit_message(msg: &str) -> bool {
    msg.trim().contains('\n')
}

fn or_empty(what: &str, result: Result<SafeHtml, MarkupError>) -> SafeHtml {
    result.unwrap_or_else(|e| {
        error!("{} failed: {}", what, e);
        SafeHtml::empty()
    })
}

pub fn try_render_commit_message_link(
    engine: &dyn MarkupEngine,
    msg: &str,
    url_prefix: &str,
    url_default: &str,
    metas: &Metas,
) -> Result<SafeHtml, MarkupError> {
    if msg.trim().is_empty() {
        return Ok(SafeHtml::empty());
    }
    let full = engine.render_commit_message(&escape_html(msg), url_prefix, url_default, metas)?;
    let first = full.trim().split('\n').next().unwrap_or_default();
    Ok(SafeHtml::trusted(first.to_string()))
}

/// First line of the rendered message, plain text linked to `url_default`
pub fn render_commit_message_link(
    engine: &dyn MarkupEngine,
    msg: &str,
    url_prefix: &str,
    url_default: &str,
    metas: &Metas,
) -> SafeHtml {
    or_empty(
        "render commit message",
        try_render_commit_message_link(engine, msg, url_prefix, url_default, metas),
    )
}

/// First line of the rendered message, references linked
pub fn render_commit_message(
    engine: &dyn MarkupEngine,
    msg: &str,
    url_prefix: &str,
    metas: &Metas,
) -> SafeHtml {
    render_commit_message_link(engine, msg, url_prefix, "", metas)
}

pub fn try_render_commit_message_link_subject(
    engine: &dyn MarkupEngine,
    msg: &str,
    url_prefix: &str,
    url_default: &str,
    metas: &Metas,
) -> Result<SafeHtml, MarkupError> {
    let subject = commit_subject(msg);
    if subject.is_empty() {
        return Ok(SafeHtml::empty());
    }
    engine
        .render_commit_message_subject(&escape_html(subject), url_prefix, url_default, metas)
        .map(SafeHtml::trusted)
}

pub fn render_commit_message_link_subject(
    engine: &dyn MarkupEngine,
    msg: &str,
    url_prefix: &str,
    url_default: &str,
    metas: &Metas,
) -> SafeHtml {
    or_empty(
        "render commit subject",
        try_render_commit_message_link_subject(engine, msg, url_prefix, url_default, metas),
    )
}

pub fn try_render_commit_body(
    engine: &dyn MarkupEngine,
    msg: &str,
    url_prefix: &str,
    metas: &Metas,
) -> Result<SafeHtml, MarkupError> {
    let body = commit_body(msg);
    if body.is_empty() {
        return Ok(SafeHtml::empty());
    }
    engine
        .render_commit_message(&escape_html(body), url_prefix, "", metas)
        .map(SafeHtml::trusted)
}

pub fn render_commit_body(
    engine: &dyn MarkupEngine,
    msg: &str,
    url_prefix: &str,
    metas: &Metas,
) -> SafeHtml {
    or_empty(
        "render commit body",
        try_render_commit_body(engine, msg, url_prefix, metas),
    )
}

pub fn try_render_note(
    engine: &dyn MarkupEngine,
    note: &str,
    url_prefix: &str,
    metas: &Metas,
) -> Result<SafeHtml, MarkupError> {
    if note.trim().is_empty() {
        return Ok(SafeHtml::empty());
    }
    engine
        .render_commit_message(&escape_html(note), url_prefix, "", metas)
        .map(SafeHtml::trusted)
}

/// Full rendering of a git note attached to a commit
pub fn render_note(engine: &dyn MarkupEngine, note: &str, url_prefix: &str, metas: &Metas) -> SafeHtml {
    or_empty("render note", try_render_note(engine, note, url_prefix, metas))
}

pub fn try_render_emoji(engine: &dyn MarkupEngine, text: &str) -> Result<SafeHtml, MarkupError> {
    if text.trim().is_empty() {
        return Ok(SafeHtml::empty());
    }
    engine.render_emoji(&escape_html(text)).map(SafeHtml::trusted)
}

pub fn render_emoji(engine: &dyn MarkupEngine, text: &str) -> SafeHtml {
    or_empty("render emoji", try_render_emoji(engine, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::BasicMarkup;

    struct FailingEngine;

    impl MarkupEngine for FailingEngine {
        fn render_commit_message(&self, _: &str, _: &str, _: &str, _: &Metas) -> Result<String, MarkupError> {
            Err(MarkupError::Render("boom".into()))
        }

        fn render_commit_message_subject(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: &Metas,
        ) -> Result<String, MarkupError> {
            Err(MarkupError::Render("boom".into()))
        }

        fn render_emoji(&self, _: &str) -> Result<String, MarkupError> {
            Err(MarkupError::Render("boom".into()))
        }

        fn sanitize(&self, raw: &str) -> String {
            escape_html(raw)
        }
    }

    #[test]
    fn test_subject_and_body_split() {
        let msg = "  Fix parser\n\n  Handles empty input.\nSecond line.  \n";
        assert_eq!(commit_subject(msg), "Fix parser");
        assert_eq!(commit_body(msg), "Handles empty input.\nSecond line.");
        assert_eq!(commit_subject("single"), "single");
        assert_eq!(commit_body("single"), "");
    }

    #[test]
    fn test_split_reconstructs_message() {
        for msg in ["subject\nbody", "  a\nb\nc  ", "title\nmore text\n"] {
            let rebuilt = format!("{}\n{}", commit_subject(msg), commit_body(msg));
            assert_eq!(rebuilt, msg.trim());
        }
    }

    #[test]
    fn test_multiline_detection() {
        assert!(is_multiline_commit_message("a\nb"));
        assert!(!is_multiline_commit_message("a\n"));
        assert!(!is_multiline_commit_message("\n  a  \n"));
    }

    #[test]
    fn test_empty_input_renders_nothing() {
        let engine = FailingEngine;
        let metas = Metas::new();
        for input in ["", "   ", "\n\t\n"] {
            assert!(render_commit_message(&engine, input, "/o/r", &metas).is_empty());
            assert!(try_render_commit_message_link_subject(&engine, input, "/o/r", "", &metas)
                .unwrap()
                .is_empty());
            assert!(try_render_commit_body(&engine, input, "/o/r", &metas).unwrap().is_empty());
            assert!(try_render_note(&engine, input, "/o/r", &metas).unwrap().is_empty());
            assert!(try_render_emoji(&engine, input).unwrap().is_empty());
        }
    }

    #[test]
    fn test_engine_failure_is_swallowed() {
        let engine = FailingEngine;
        let metas = Metas::new();
        assert!(render_commit_message(&engine, "fix #1", "/o/r", &metas).is_empty());
        assert!(render_note(&engine, "note", "/o/r", &metas).is_empty());
        assert!(render_emoji(&engine, ":+1:").is_empty());
        assert!(try_render_note(&engine, "note", "/o/r", &metas).is_err());
    }

    #[test]
    fn test_input_is_escaped_before_rendering() {
        let html = render_commit_message(&BasicMarkup::new(), "<script>x</script>", "/o/r", &Metas::new());
        assert_eq!(html.as_str(), "&lt;script&gt;x&lt;/script&gt;");
    }

    #[test]
    fn test_commit_message_is_first_line() {
        let html = render_commit_message(&BasicMarkup::new(), "fix #4\n\nlong body", "/o/r", &Metas::new());
        assert_eq!(
            html.as_str(),
            r#"fix <a href="/o/r/issues/4" class="ref-issue">#4</a>"#
        );
    }

    #[test]
    fn test_body_renders_remaining_lines() {
        let html = render_commit_body(&BasicMarkup::new(), "subject\n\nsee #2", "/o/r", &Metas::new());
        assert_eq!(
            html.as_str(),
            r#"see <a href="/o/r/issues/2" class="ref-issue">#2</a>"#
        );
    }
}
