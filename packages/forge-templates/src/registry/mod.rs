//! Name → helper registries installed into the template engine.
//!
//! Two registries are built once from a [`RenderState`]: the HTML registry
//! used by pages and mail bodies, and the smaller text registry used by mail
//! subjects. Both are immutable after construction and can be installed into
//! any number of [`Tera`] instances.

mod args;
mod builtins;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tera::{Tera, Value};
use tracing::debug;

use crate::error::{Result, TemplateError};
use crate::state::RenderState;

pub(crate) use args::Args;

type HelperFn = dyn Fn(&Args) -> tera::Result<Value> + Send + Sync;

/// A template helper callable as `Name(arg=value, ...)`
#[derive(Clone)]
pub struct Helper {
    func: Arc<HelperFn>,
    safe: bool,
}

impl Helper {
    /// Helper whose output is auto-escaped by the engine
    pub fn plain<F>(func: F) -> Self
    where
        F: Fn(&Args) -> tera::Result<Value> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            safe: false,
        }
    }

    /// Helper returning [`SafeHtml`](crate::SafeHtml) text, written without escaping
    pub(crate) fn html<F>(func: F) -> Self
    where
        F: Fn(&Args) -> tera::Result<Value> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            safe: true,
        }
    }

    /// Helper returning a value fixed at registry construction
    pub fn constant(value: Value) -> Self {
        Self::plain(move |_| Ok(value.clone()))
    }

    pub fn call(&self, args: &Args) -> tera::Result<Value> {
        (self.func)(args)
    }

    pub fn is_safe(&self) -> bool {
        self.safe
    }
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Helper").field("safe", &self.safe).finish()
    }
}

impl tera::Function for Helper {
    fn call(&self, args: &Args) -> tera::Result<Value> {
        (self.func)(args)
    }

    fn is_safe(&self) -> bool {
        self.safe
    }
}

/// Functions provided by tera itself
const ENGINE_FUNCTIONS: &[&str] = &["range", "now", "throw", "get_random", "get_env"];

/// Words that may directly precede `(` in an expression without being a call
const EXPRESSION_KEYWORDS: &[&str] = &["and", "or", "not", "in", "is", "if", "elif", "for", "set", "set_global"];

fn tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{\{(.*?)\}\}|\{%-?(.*?)-?%\}").expect("valid tag pattern"))
}

fn string_literal_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""[^"]*"|'[^']*'|`[^`]*`"#).expect("valid literal pattern"))
}

fn call_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("valid call pattern"))
}

fn ends_with_word(text: &str, word: &str) -> bool {
    text.strip_suffix(word)
        .map(|rest| !rest.ends_with(|c: char| c.is_alphanumeric() || c == '_'))
        .unwrap_or(false)
}

/// Function names called in a template source, excluding filters, tests
/// and macro calls
pub fn called_functions(source: &str) -> Vec<String> {
    let mut names = Vec::new();
    for tag in tag_pattern().captures_iter(source) {
        let Some(body) = tag.get(1).or_else(|| tag.get(2)) else {
            continue;
        };
        let body = string_literal_pattern().replace_all(body.as_str(), "\"\"");
        let trimmed = body.trim_start();
        if trimmed.starts_with("macro ") || trimmed.starts_with("import ") {
            continue;
        }
        for call in call_pattern().captures_iter(&body) {
            let (Some(whole), Some(name)) = (call.get(0), call.get(1)) else {
                continue;
            };
            let before = body[..whole.start()].trim_end();
            let is_filter = before.ends_with('|');
            let is_macro = before.ends_with("::");
            let is_test = ends_with_word(before, "is")
                || (ends_with_word(before, "not")
                    && ends_with_word(before[..before.len() - 3].trim_end(), "is"));
            if is_filter || is_macro || is_test || EXPRESSION_KEYWORDS.contains(&name.as_str()) {
                continue;
            }
            names.push(name.as_str().to_string());
        }
    }
    names
}

/// Immutable set of named helpers
#[derive(Debug, Clone, Default)]
pub struct FuncRegistry {
    helpers: BTreeMap<&'static str, Helper>,
}

impl FuncRegistry {
    /// Registry for HTML pages and mail bodies
    pub fn html(state: &RenderState) -> Self {
        Self::from_entries(builtins::html_helpers(state))
    }

    /// Registry for plain-text output such as mail subjects
    pub fn text(state: &RenderState) -> Self {
        Self::from_entries(builtins::text_helpers(state))
    }

    fn from_entries(entries: Vec<(&'static str, Helper)>) -> Self {
        Self {
            helpers: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Helper> {
        self.helpers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.helpers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }

    /// Register every helper as a tera function
    pub fn install(&self, tera: &mut Tera) {
        for (name, helper) in &self.helpers {
            tera.register_function(name, helper.clone());
        }
        debug!("installed {} template helpers", self.helpers.len());
    }

    /// Check that every function `source` calls is registered here or
    /// provided by the engine
    pub fn verify(&self, template: &str, source: &str) -> Result<()> {
        let mut seen = HashSet::new();
        for name in called_functions(source) {
            if !seen.insert(name.clone()) {
                continue;
            }
            if self.contains(&name) || ENGINE_FUNCTIONS.contains(&name.as_str()) {
                continue;
            }
            return Err(TemplateError::MissingHelper {
                template: template.to_string(),
                name,
            });
        }
        Ok(())
    }

    /// [`verify`](Self::verify) over several `(name, source)` pairs
    pub fn verify_all<'a, I>(&self, templates: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        templates
            .into_iter()
            .try_for_each(|(name, source)| self.verify(name, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use serde_json::json;

    fn state() -> RenderState {
        RenderState::with_defaults(UiConfig::default())
    }

    #[test]
    fn test_called_functions_skips_filters_tests_and_macros() {
        let source = r#"
            {% import "macros.html" as m %}
            {% macro field(label) %}{{ label }}{% endmacro field %}
            {{ AppName() }} {{ name | truncate(length=3) }}
            {% if count is divisibleby(3) and not (a or b) %}{{ m::field(label=Tr(lang=lang, key="x")) }}{% endif %}
            {{ "Fake(" ~ svg(icon="octicon-repo") }}
            {% for i in range(end=3) %}{% endfor %}
        "#;
        let names = called_functions(source);
        assert_eq!(names, vec!["AppName", "Tr", "svg", "range"]);
    }

    #[test]
    fn test_verify_reports_missing_helper() {
        let registry = FuncRegistry::html(&state());
        assert!(registry.verify("ok.html", "{{ AppName() }} {{ now() }}").is_ok());

        let err = registry.verify("page.html", "{{ NoSuchHelper(x=1) }}").unwrap_err();
        match err {
            TemplateError::MissingHelper { template, name } => {
                assert_eq!(template, "page.html");
                assert_eq!(name, "NoSuchHelper");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_text_registry_is_subset_of_html() {
        let state = state();
        let html = FuncRegistry::html(&state);
        let text = FuncRegistry::text(&state);
        assert!(!text.is_empty());
        assert!(text.len() < html.len());
        for name in text.names() {
            assert!(html.contains(name), "{} missing from html registry", name);
        }
        assert!(!text.contains("Safe"));
        assert!(!text.contains("svg"));
    }

    #[test]
    fn test_install_and_render() {
        let registry = FuncRegistry::html(&state());
        let mut tera = Tera::default();
        registry.install(&mut tera);
        tera.add_raw_template("t.html", r#"{{ FileSize(size=1536) }}|{{ svg(icon="octicon-lock") }}"#)
            .unwrap();

        let out = tera.render("t.html", &tera::Context::new()).unwrap();
        assert!(out.starts_with("1.5 KiB|<svg"));
    }

    #[test]
    fn test_plain_helpers_are_escaped() {
        let registry = FuncRegistry::html(&state());
        let mut tera = Tera::default();
        registry.install(&mut tera);
        tera.add_raw_template("t.html", "{{ Escape(raw=v) }}|{{ Printf(format=\"%s\", args=[v]) }}")
            .unwrap();

        let mut ctx = tera::Context::new();
        ctx.insert("v", "<b>");
        let out = tera.render("t.html", &ctx).unwrap();
        assert!(!out.contains("<b>"));
    }

    #[test]
    fn test_helper_call() {
        let helper = Helper::constant(json!(42));
        assert_eq!(helper.call(&Args::new()).unwrap(), json!(42));
        assert!(!helper.is_safe());
    }
}
