use serde::Serialize;
use tera::{Context, Tera};
use tracing::{debug, info};

use crate::error::{Result, TemplateError};
use crate::org::{OrgHeaderPage, OrgHeaderView};
use crate::registry::FuncRegistry;
use crate::safe::SafeHtml;
use crate::settings::{RepoSettingsPage, RepoSettingsView};
use crate::state::RenderState;

pub const REPO_SETTINGS_TEMPLATE: &str = "repo/settings/options.html";
pub const ORG_HEADER_TEMPLATE: &str = "org/header.html";
pub const ALERT_TEMPLATE: &str = "base/alert.html";

/// Templates compiled into the binary
pub const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    (ALERT_TEMPLATE, include_str!("../templates/base/alert.html")),
    (
        REPO_SETTINGS_TEMPLATE,
        include_str!("../templates/repo/settings/options.html"),
    ),
    (ORG_HEADER_TEMPLATE, include_str!("../templates/org/header.html")),
];

/// One-shot messages shown at the top of a page
#[derive(Debug, Clone, Default, Serialize)]
pub struct Flash {
    pub error: Option<String>,
    pub success: Option<String>,
    pub info: Option<String>,
    pub warning: Option<String>,
}

/// Page renderer over the embedded templates
pub struct TemplateRenderer {
    tera: Tera,
    registry: FuncRegistry,
}

impl TemplateRenderer {
    /// Compile the embedded templates and install the HTML helpers
    ///
    /// Fails when a template calls a helper that is not registered.
    pub fn new(state: &RenderState) -> Result<Self> {
        let registry = FuncRegistry::html(state);
        registry.verify_all(EMBEDDED_TEMPLATES.iter().copied())?;

        let mut tera = Tera::default();
        registry.install(&mut tera);
        tera.add_raw_templates(EMBEDDED_TEMPLATES.iter().copied())?;

        info!(
            "Template renderer ready: {} templates, {} helpers",
            EMBEDDED_TEMPLATES.len(),
            registry.len()
        );
        Ok(Self { tera, registry })
    }

    pub fn registry(&self) -> &FuncRegistry {
        &self.registry
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render any embedded template with a caller-built context
    pub fn render_html(&self, name: &str, context: &Context) -> Result<SafeHtml> {
        if !self.has_template(name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }
        debug!("rendering {}", name);
        let html = self.tera.render(name, context)?;
        Ok(SafeHtml::trusted(html))
    }

    pub fn render_repo_settings(
        &self,
        view: &RepoSettingsView,
        lang: &str,
        flash: Option<&Flash>,
    ) -> Result<SafeHtml> {
        let page = RepoSettingsPage::project(view);
        let mut context = Context::new();
        context.insert("page", &page);
        context.insert("lang", lang);
        context.insert("flash", &flash);
        self.render_html(REPO_SETTINGS_TEMPLATE, &context)
    }

    pub fn render_org_header(&self, view: &OrgHeaderView, lang: &str) -> Result<SafeHtml> {
        let page = OrgHeaderPage::project(view);
        let mut context = Context::new();
        context.insert("page", &page);
        context.insert("lang", lang);
        self.render_html(ORG_HEADER_TEMPLATE, &context)
    }
}
