use std::env;
use std::time::Duration;

use serde::Serialize;

/// Notification polling timings surfaced to the frontend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub min_timeout: Duration,
    pub timeout_step: Duration,
    pub max_timeout: Duration,
    pub event_source_update_time: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            min_timeout: Duration::from_secs(10),
            timeout_step: Duration::from_secs(10),
            max_timeout: Duration::from_secs(60),
            event_source_update_time: Duration::from_secs(10),
        }
    }
}

/// Millisecond view of [`NotificationConfig`] handed to templates
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationSettings {
    pub min_timeout: u64,
    pub timeout_step: u64,
    pub max_timeout: u64,
    pub event_source_update_time: u64,
}

impl From<&NotificationConfig> for NotificationSettings {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            min_timeout: config.min_timeout.as_millis() as u64,
            timeout_step: config.timeout_step.as_millis() as u64,
            max_timeout: config.max_timeout.as_millis() as u64,
            event_source_update_time: config.event_source_update_time.as_millis() as u64,
        }
    }
}

/// Presentation configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct UiConfig {
    /// Display name of the instance
    pub app_name: String,
    /// Public root URL, always ending with `/`
    pub app_url: String,
    /// Path component of `app_url` without trailing slash (e.g. `/forge`)
    pub app_sub_url: String,
    /// Prefix for static assets; defaults to `app_sub_url`
    pub static_url_prefix: String,
    pub app_version: String,
    pub app_built_with: String,
    pub domain: String,
    pub disable_gravatar: bool,
    /// Base URL of the avatar service used when gravatar is enabled
    pub gravatar_source: String,
    pub default_show_full_name: bool,
    pub show_footer_template_load_time: bool,
    /// Reactions offered on issues and comments
    pub reactions: Vec<String>,
    pub default_theme: String,
    pub theme_color_meta_tag: String,
    pub meta_author: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub use_service_worker: bool,
    pub disable_git_hooks: bool,
    pub disable_webhooks: bool,
    pub import_local_paths: bool,
    pub ssh_disabled: bool,
    pub oauth2_enabled: bool,
    pub disable_2fa: bool,
    pub notification: NotificationConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            app_name: "Forge: Git with a cup of tea".to_string(),
            app_url: "http://localhost:3000/".to_string(),
            app_sub_url: String::new(),
            static_url_prefix: String::new(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            app_built_with: String::new(),
            domain: "localhost".to_string(),
            disable_gravatar: false,
            gravatar_source: "https://secure.gravatar.com/avatar/".to_string(),
            default_show_full_name: false,
            show_footer_template_load_time: true,
            reactions: default_reactions(),
            default_theme: "forge".to_string(),
            theme_color_meta_tag: "#6cc644".to_string(),
            meta_author: "Forge".to_string(),
            meta_description: "A painless self-hosted Git service".to_string(),
            meta_keywords: "git,self-hosted,forge".to_string(),
            use_service_worker: true,
            disable_git_hooks: true,
            disable_webhooks: false,
            import_local_paths: false,
            ssh_disabled: false,
            oauth2_enabled: true,
            disable_2fa: false,
            notification: NotificationConfig::default(),
        }
    }
}

fn default_reactions() -> Vec<String> {
    ["+1", "-1", "laugh", "hooray", "confused", "heart", "rocket", "eyes"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn env_bool(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: bool) -> bool {
    lookup(name)
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(default)
}

fn env_string(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    lookup(name).unwrap_or_else(|| default.to_string())
}

fn env_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match lookup(name) {
        Some(v) => v
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidValue(format!("{} must be milliseconds", name))),
        None => Ok(default),
    }
}

impl UiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from any `FORGE_*` variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = &lookup;
        let defaults = Self::default();

        let mut app_url = env_string(lookup, "FORGE_APP_URL", &defaults.app_url);
        if !app_url.ends_with('/') {
            app_url.push('/');
        }
        let parsed = url::Url::parse(&app_url)
            .map_err(|e| ConfigError::InvalidAppUrl(format!("{}: {}", app_url, e)))?;

        // Sub-URL is the path of the root URL without its trailing slash
        let app_sub_url = parsed.path().trim_end_matches('/').to_string();
        let static_url_prefix = env_string(lookup, "FORGE_STATIC_URL_PREFIX", &app_sub_url)
            .trim_end_matches('/')
            .to_string();
        let domain = lookup("FORGE_DOMAIN")
            .or_else(|| parsed.host_str().map(|h| h.to_string()))
            .unwrap_or(defaults.domain);

        let notification = NotificationConfig {
            min_timeout: env_millis(
                lookup,
                "FORGE_NOTIFICATION_MIN_TIMEOUT_MS",
                defaults.notification.min_timeout,
            )?,
            timeout_step: env_millis(
                lookup,
                "FORGE_NOTIFICATION_TIMEOUT_STEP_MS",
                defaults.notification.timeout_step,
            )?,
            max_timeout: env_millis(
                lookup,
                "FORGE_NOTIFICATION_MAX_TIMEOUT_MS",
                defaults.notification.max_timeout,
            )?,
            event_source_update_time: env_millis(
                lookup,
                "FORGE_EVENT_SOURCE_UPDATE_TIME_MS",
                defaults.notification.event_source_update_time,
            )?,
        };
        if notification.min_timeout > notification.max_timeout {
            return Err(ConfigError::InvalidValue(
                "notification min timeout exceeds max timeout".to_string(),
            ));
        }

        Ok(Self {
            app_name: env_string(lookup, "FORGE_APP_NAME", &defaults.app_name),
            app_url,
            app_sub_url,
            static_url_prefix,
            app_version: env_string(lookup, "FORGE_APP_VERSION", &defaults.app_version),
            app_built_with: env_string(lookup, "FORGE_APP_BUILT_WITH", &defaults.app_built_with),
            domain,
            disable_gravatar: env_bool(lookup, "FORGE_DISABLE_GRAVATAR", defaults.disable_gravatar),
            gravatar_source: env_string(lookup, "FORGE_GRAVATAR_SOURCE", &defaults.gravatar_source),
            default_show_full_name: env_bool(
                lookup,
                "FORGE_DEFAULT_SHOW_FULL_NAME",
                defaults.default_show_full_name,
            ),
            show_footer_template_load_time: env_bool(
                lookup,
                "FORGE_SHOW_FOOTER_TEMPLATE_LOAD_TIME",
                defaults.show_footer_template_load_time,
            ),
            reactions: lookup("FORGE_REACTIONS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.reactions),
            default_theme: env_string(lookup, "FORGE_DEFAULT_THEME", &defaults.default_theme),
            theme_color_meta_tag: env_string(
                lookup,
                "FORGE_THEME_COLOR_META_TAG",
                &defaults.theme_color_meta_tag,
            ),
            meta_author: env_string(lookup, "FORGE_META_AUTHOR", &defaults.meta_author),
            meta_description: env_string(
                lookup,
                "FORGE_META_DESCRIPTION",
                &defaults.meta_description,
            ),
            meta_keywords: env_string(lookup, "FORGE_META_KEYWORDS", &defaults.meta_keywords),
            use_service_worker: env_bool(
                lookup,
                "FORGE_USE_SERVICE_WORKER",
                defaults.use_service_worker,
            ),
            disable_git_hooks: env_bool(
                lookup,
                "FORGE_DISABLE_GIT_HOOKS",
                defaults.disable_git_hooks,
            ),
            disable_webhooks: env_bool(lookup, "FORGE_DISABLE_WEBHOOKS", defaults.disable_webhooks),
            import_local_paths: env_bool(
                lookup,
                "FORGE_IMPORT_LOCAL_PATHS",
                defaults.import_local_paths,
            ),
            ssh_disabled: env_bool(lookup, "FORGE_SSH_DISABLED", defaults.ssh_disabled),
            oauth2_enabled: env_bool(lookup, "FORGE_OAUTH2_ENABLED", defaults.oauth2_enabled),
            disable_2fa: env_bool(lookup, "FORGE_DISABLE_2FA", defaults.disable_2fa),
            notification,
        })
    }

    /// Whether the instance is served over TLS
    pub fn use_https(&self) -> bool {
        self.app_url.starts_with("https")
    }

    pub fn notification_settings(&self) -> NotificationSettings {
        NotificationSettings::from(&self.notification)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid application URL: {0}")]
    InvalidAppUrl(String),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_use_https() {
        let mut config = UiConfig::default();
        assert!(!config.use_https());
        config.app_url = "https://forge.example.com/".to_string();
        assert!(config.use_https());
    }

    #[test]
    fn test_notification_settings_in_millis() {
        let config = UiConfig::default();
        let settings = config.notification_settings();
        assert_eq!(settings.min_timeout, 10_000);
        assert_eq!(settings.max_timeout, 60_000);

        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["EventSourceUpdateTime"], 10_000);
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let config = UiConfig::from_lookup(lookup_from(&[
            ("FORGE_APP_URL", "https://forge.example.com/git"),
            ("FORGE_REACTIONS", "+1, heart,,rocket"),
        ]))
        .unwrap();
        assert_eq!(config.app_url, "https://forge.example.com/git/");
        assert_eq!(config.app_sub_url, "/git");
        assert_eq!(config.static_url_prefix, "/git");
        assert_eq!(config.domain, "forge.example.com");
        assert_eq!(config.reactions, vec!["+1", "heart", "rocket"]);
        assert!(config.use_https());
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = UiConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.app_url, UiConfig::default().app_url);
        assert_eq!(config.domain, "localhost");
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let result = UiConfig::from_lookup(lookup_from(&[(
            "FORGE_NOTIFICATION_MIN_TIMEOUT_MS",
            "soon",
        )]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));

        let result = UiConfig::from_lookup(lookup_from(&[
            ("FORGE_NOTIFICATION_MIN_TIMEOUT_MS", "90000"),
            ("FORGE_NOTIFICATION_MAX_TIMEOUT_MS", "1000"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_default_reactions() {
        let config = UiConfig::default();
        assert_eq!(config.reactions.len(), 8);
        assert!(config.reactions.contains(&"heart".to_string()));
    }
}
