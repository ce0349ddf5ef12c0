//! Template helpers and server-rendered pages for a self-hosted Git forge.
//!
//! Pages are rendered with tera. Every helper a template may call lives in a
//! [`FuncRegistry`]; the HTML registry backs pages and mail bodies, the text
//! registry backs mail subjects.

pub mod commits;
pub mod config;
pub mod emoji;
pub mod error;
pub mod format;
pub mod i18n;
pub mod icons;
pub mod mail;
pub mod markup;
pub mod mirror;
pub mod org;
pub mod registry;
pub mod render;
pub mod renderer;
pub mod safe;
pub mod settings;
pub mod state;
pub mod strings;
pub mod svg;
pub mod timeutil;

pub use config::UiConfig;
pub use error::{Result, TemplateError};
pub use i18n::{Catalog, Translator};
pub use mail::MailTemplates;
pub use markup::{BasicMarkup, MarkupEngine};
pub use mirror::MirrorConfig;
pub use org::{OrgHeaderPage, OrgHeaderView};
pub use registry::{FuncRegistry, Helper};
pub use renderer::{Flash, TemplateRenderer};
pub use safe::{SafeHtml, SafeJs};
pub use settings::{RepoSettingsPage, RepoSettingsView};
pub use state::RenderState;
