use std::sync::Arc;

use crate::config::UiConfig;
use crate::i18n::{Catalog, Translator};
use crate::markup::{BasicMarkup, MarkupEngine};
use crate::strings::md5_hex;
use crate::svg::SvgTable;

/// Collaborators the template helpers read from, shared by every render
#[derive(Clone)]
pub struct RenderState {
    pub config: Arc<UiConfig>,
    pub markup: Arc<dyn MarkupEngine>,
    pub translator: Arc<dyn Translator>,
    pub svg: Arc<SvgTable>,
}

impl RenderState {
    pub fn new(
        config: UiConfig,
        markup: Arc<dyn MarkupEngine>,
        translator: Arc<dyn Translator>,
        svg: SvgTable,
    ) -> Self {
        Self {
            config: Arc::new(config),
            markup,
            translator,
            svg: Arc::new(svg),
        }
    }

    /// State with the bundled markup engine, icons and an empty catalog
    pub fn with_defaults(config: UiConfig) -> Self {
        Self::new(
            config,
            Arc::new(BasicMarkup::new()),
            Arc::new(Catalog::new()),
            SvgTable::builtin(),
        )
    }

    /// Avatar URL for an email address
    ///
    /// Falls back to the bundled default avatar when gravatar is disabled or
    /// the address is empty.
    pub fn avatar_link(&self, email: &str) -> String {
        let email = email.trim();
        if email.is_empty() || self.config.disable_gravatar {
            return format!("{}/img/avatar_default.png", self.config.app_sub_url);
        }
        format!(
            "{}{}?d=identicon",
            self.config.gravatar_source,
            md5_hex(&email.to_lowercase())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_link() {
        let state = RenderState::with_defaults(UiConfig::default());
        assert_eq!(
            state.avatar_link(" User@Example.com "),
            format!(
                "https://secure.gravatar.com/avatar/{}?d=identicon",
                md5_hex("user@example.com")
            )
        );
        assert_eq!(state.avatar_link(""), "/img/avatar_default.png");
    }

    #[test]
    fn test_avatar_link_without_gravatar() {
        let mut config = UiConfig::default();
        config.disable_gravatar = true;
        config.app_sub_url = "/forge".to_string();
        let state = RenderState::with_defaults(config);
        assert_eq!(state.avatar_link("a@b.c"), "/forge/img/avatar_default.png");
    }
}
