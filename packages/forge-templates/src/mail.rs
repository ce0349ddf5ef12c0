use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tera::{Context, Tera};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, TemplateError};
use crate::registry::FuncRegistry;
use crate::safe::SafeHtml;
use crate::state::RenderState;

pub const MAIL_TEMPLATE_EXTENSION: &str = "tmpl";

fn subject_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"(?m)^-{3,}[\s]*$").expect("valid separator regex"))
}

/// Split a mail template at its first separator line.
///
/// Content without a separator is all body with an empty subject.
pub fn split_subject_body(content: &str) -> (&str, &str) {
    match subject_separator().find(content) {
        Some(m) => (&content[..m.start()], &content[m.end()..]),
        None => ("", content),
    }
}

/// Mail templates, each compiled into a plain-text subject and an HTML body
pub struct MailTemplates {
    subjects: Tera,
    bodies: Tera,
    subject_helpers: FuncRegistry,
    body_helpers: FuncRegistry,
}

impl MailTemplates {
    pub fn new(state: &RenderState) -> Self {
        let subject_helpers = FuncRegistry::text(state);
        let body_helpers = FuncRegistry::html(state);

        let mut subjects = Tera::default();
        subjects.autoescape_on(vec![]);
        subject_helpers.install(&mut subjects);

        let mut bodies = Tera::default();
        // Names carry no extension, so escape everything
        bodies.autoescape_on(vec![""]);
        body_helpers.install(&mut bodies);

        Self {
            subjects,
            bodies,
            subject_helpers,
            body_helpers,
        }
    }

    /// Load every `*.tmpl` under `dir`, named by relative path without extension
    pub fn load_dir(dir: &Path, state: &RenderState) -> Result<Self> {
        let mut templates = Self::new(state);
        let mut loaded = 0;
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(MAIL_TEMPLATE_EXTENSION)
            {
                continue;
            }
            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };
            let name = relative
                .with_extension("")
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            let content = std::fs::read_to_string(path)?;
            templates.add_raw(&name, &content);
            loaded += 1;
        }
        info!("Loaded {} mail templates from {}", loaded, dir.display());
        Ok(templates)
    }

    /// Compile one template; a part that fails to parse is logged and skipped
    pub fn add_raw(&mut self, name: &str, content: &str) {
        let (subject, body) = split_subject_body(content);

        let parsed = self
            .subject_helpers
            .verify(name, subject)
            .and_then(|_| Ok(self.subjects.add_raw_template(name, subject)?));
        if let Err(e) = parsed {
            warn!("Failed to parse template [{}/subject]: {}", name, e);
        }

        let parsed = self
            .body_helpers
            .verify(name, body)
            .and_then(|_| Ok(self.bodies.add_raw_template(name, body)?));
        if let Err(e) = parsed {
            warn!("Failed to parse template [{}/body]: {}", name, e);
        }
        debug!("mail template {} added", name);
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.bodies.get_template_names().any(|n| n == name)
    }

    /// Render the subject line and body of a mail
    pub fn render(&self, name: &str, context: &Context) -> Result<(String, SafeHtml)> {
        let has_subject = self.subjects.get_template_names().any(|n| n == name);
        if !has_subject || !self.has_template(name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }
        let subject = self.subjects.render(name, context)?;
        let body = self.bodies.render(name, context)?;
        Ok((single_line(&subject), SafeHtml::trusted(body)))
    }
}

/// Collapse a rendered subject onto one line
fn single_line(subject: &str) -> String {
    subject.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;

    fn state() -> RenderState {
        RenderState::with_defaults(UiConfig::default())
    }

    #[test]
    fn test_split_at_first_separator() {
        let (subject, body) = split_subject_body("Hello\n---\nBody\n----\nmore");
        assert_eq!(subject, "Hello\n");
        assert_eq!(body, "\nBody\n----\nmore");
    }

    #[test]
    fn test_split_without_separator() {
        let (subject, body) = split_subject_body("only body");
        assert_eq!(subject, "");
        assert_eq!(body, "only body");
    }

    #[test]
    fn test_separator_allows_trailing_space() {
        let (subject, body) = split_subject_body("S\n-----  \nB");
        assert_eq!(subject, "S\n");
        assert_eq!(body, "\nB");
    }

    #[test]
    fn test_render_escapes_body_but_not_subject() {
        let mut mail = MailTemplates::new(&state());
        mail.add_raw("greet", "Hi {{ who }}\n---\n<p>{{ who }}</p>");
        let mut context = Context::new();
        context.insert("who", "<Ann & Bo>");
        let (subject, body) = mail.render("greet", &context).unwrap();
        assert_eq!(subject, "Hi <Ann & Bo>");
        assert!(body.as_str().contains("&lt;Ann &amp; Bo&gt;"));
    }

    #[test]
    fn test_broken_part_is_skipped() {
        let mut mail = MailTemplates::new(&state());
        mail.add_raw("broken", "{{ unclosed\n---\nbody");
        assert!(mail.has_template("broken"));
        let err = mail.render("broken", &Context::new()).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(_)));
    }

    #[test]
    fn test_html_only_helper_rejected_in_subject() {
        let mut mail = MailTemplates::new(&state());
        mail.add_raw("icon", "{{ svg(icon=\"octicon-repo\") }}\n---\nbody");
        assert!(mail.render("icon", &Context::new()).is_err());
    }

    #[test]
    fn test_load_dir_names_by_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("repo");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("ping.tmpl"), "Ping {{ AppName() }}\n---\npong").unwrap();
        std::fs::write(nested.join("notes.txt"), "ignored").unwrap();

        let mail = MailTemplates::load_dir(dir.path(), &state()).unwrap();
        assert!(mail.has_template("repo/ping"));
        assert!(!mail.has_template("repo/notes"));
        let (subject, body) = mail.render("repo/ping", &Context::new()).unwrap();
        assert_eq!(subject, format!("Ping {}", UiConfig::default().app_name));
        assert_eq!(body.as_str().trim(), "pong");
    }
}
