//! Repository settings view model and its page projection.
//!
//! Controllers hand over a [`RepoSettingsView`] snapshot. Every visibility
//! decision the settings page makes is computed here by
//! [`RepoSettingsPage::project`], so the template only projects fields.

use serde::{Deserialize, Serialize};

use crate::mirror::MirrorConfig;

/// How the repository wiki is provided
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WikiUnit {
    #[default]
    Internal,
    External { url: String },
    Disabled,
}

/// Numbering style of an external issue tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerStyle {
    #[default]
    Numeric,
    Alphanumeric,
}

/// How issues are tracked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum IssueTracker {
    Internal {
        #[serde(default)]
        enable_time_tracking: bool,
        #[serde(default)]
        allow_only_contributors_to_track_time: bool,
        #[serde(default)]
        enable_dependencies: bool,
    },
    External {
        url: String,
        /// URL template with `{user}`, `{repo}` and `{index}`
        format: String,
        #[serde(default)]
        style: TrackerStyle,
    },
    Disabled,
}

impl Default for IssueTracker {
    fn default() -> Self {
        Self::Internal {
            enable_time_tracking: true,
            allow_only_contributors_to_track_time: true,
            enable_dependencies: true,
        }
    }
}

/// Merge styles and options of the pull request unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequestPolicy {
    pub ignore_whitespace_conflicts: bool,
    pub allow_merge_commits: bool,
    pub allow_rebase: bool,
    pub allow_rebase_merge: bool,
    pub allow_squash: bool,
}

impl Default for PullRequestPolicy {
    fn default() -> Self {
        Self {
            ignore_whitespace_conflicts: false,
            allow_merge_commits: true,
            allow_rebase: true,
            allow_rebase_merge: true,
            allow_squash: true,
        }
    }
}

/// Which signatures count as trusted on this repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustModel {
    #[default]
    Default,
    Collaborator,
    Committer,
    CollaboratorCommitter,
}

impl TrustModel {
    pub const ALL: [TrustModel; 4] = [
        TrustModel::Default,
        TrustModel::Collaborator,
        TrustModel::Committer,
        TrustModel::CollaboratorCommitter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Collaborator => "collaborator",
            Self::Committer => "committer",
            Self::CollaboratorCommitter => "collaboratorcommitter",
        }
    }

    /// Translation key of the option label
    pub fn label_key(&self) -> &'static str {
        match self {
            Self::Default => "repo.settings.trust_model.default",
            Self::Collaborator => "repo.settings.trust_model.collaborator",
            Self::Committer => "repo.settings.trust_model.committer",
            Self::CollaboratorCommitter => "repo.settings.trust_model.collaboratorcommitter",
        }
    }
}

/// What the viewing user may do with the repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub is_owner: bool,
    pub is_admin: bool,
}

/// Repository data the settings page is rendered from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoSettingsView {
    pub owner_name: String,
    pub name: String,
    pub description: String,
    pub website: String,
    /// Repository size in bytes
    pub size: u64,
    pub is_private: bool,
    /// Instance policy forcing every repository private
    pub force_private: bool,
    pub mirror: Option<MirrorConfig>,
    pub wiki: WikiUnit,
    pub issues: IssueTracker,
    /// `None` when the pull request unit is disabled
    pub pull_requests: Option<PullRequestPolicy>,
    pub trust_model: TrustModel,
    pub is_archived: bool,
    pub is_fork: bool,
    pub is_empty: bool,
    /// Recipient of a pending ownership transfer
    pub transfer_pending_to: Option<String>,
    pub capabilities: Capabilities,
}

/// One radio button of the trust model group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustModelOption {
    pub value: &'static str,
    pub label_key: &'static str,
    pub checked: bool,
}

/// Settings page with every conditional block resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoSettingsPage {
    pub owner_name: String,
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub website: String,
    pub size: u64,
    pub is_private: bool,
    /// Forms are read-only while the repository is archived
    pub read_only: bool,

    pub show_visibility_toggle: bool,
    pub visibility_locked: bool,

    pub show_mirror: bool,
    pub mirror: Option<MirrorConfig>,

    pub wiki_mode: &'static str,
    pub show_external_wiki: bool,
    pub external_wiki_url: String,

    pub tracker_mode: &'static str,
    pub show_internal_tracker: bool,
    pub show_external_tracker: bool,
    pub enable_time_tracking: bool,
    pub allow_only_contributors_to_track_time: bool,
    pub enable_dependencies: bool,
    pub external_tracker_url: String,
    pub external_tracker_format: String,
    pub external_tracker_style: TrackerStyle,

    pub pulls_enabled: bool,
    pub show_pull_settings: bool,
    pub pull_requests: PullRequestPolicy,

    pub trust_model_options: Vec<TrustModelOption>,

    pub show_danger_zone: bool,
    pub can_convert_mirror: bool,
    pub can_transfer: bool,
    pub can_cancel_transfer: bool,
    pub transfer_pending_to: String,
    pub can_delete_wiki: bool,
    pub can_archive: bool,
    pub can_unarchive: bool,
    pub can_delete: bool,
}

impl RepoSettingsPage {
    pub fn project(view: &RepoSettingsView) -> Self {
        let caps = view.capabilities;
        let danger = caps.is_owner || caps.is_admin;
        let is_mirror = view.mirror.is_some();
        let read_only = view.is_archived;
        let visibility_locked = view.force_private && !caps.is_admin;

        let (wiki_mode, external_wiki_url) = match &view.wiki {
            WikiUnit::Internal => ("internal", String::new()),
            WikiUnit::External { url } => ("external", url.clone()),
            WikiUnit::Disabled => ("disabled", String::new()),
        };

        let mut page = Self {
            owner_name: view.owner_name.clone(),
            name: view.name.clone(),
            full_name: format!("{}/{}", view.owner_name, view.name),
            description: view.description.clone(),
            website: view.website.clone(),
            size: view.size,
            is_private: view.is_private || view.force_private,
            read_only,
            show_visibility_toggle: !read_only,
            visibility_locked,
            show_mirror: is_mirror,
            mirror: view.mirror.clone(),
            wiki_mode,
            show_external_wiki: wiki_mode == "external",
            external_wiki_url,
            tracker_mode: "disabled",
            show_internal_tracker: false,
            show_external_tracker: false,
            enable_time_tracking: false,
            allow_only_contributors_to_track_time: false,
            enable_dependencies: false,
            external_tracker_url: String::new(),
            external_tracker_format: String::new(),
            external_tracker_style: TrackerStyle::default(),
            pulls_enabled: view.pull_requests.is_some(),
            show_pull_settings: !is_mirror && !view.is_empty && !read_only,
            pull_requests: view.pull_requests.clone().unwrap_or_default(),
            trust_model_options: TrustModel::ALL
                .iter()
                .map(|model| TrustModelOption {
                    value: model.as_str(),
                    label_key: model.label_key(),
                    checked: *model == view.trust_model,
                })
                .collect(),
            show_danger_zone: danger,
            can_convert_mirror: danger && is_mirror && !read_only,
            can_transfer: danger && view.transfer_pending_to.is_none(),
            can_cancel_transfer: danger && view.transfer_pending_to.is_some(),
            transfer_pending_to: view.transfer_pending_to.clone().unwrap_or_default(),
            can_delete_wiki: danger && wiki_mode == "internal",
            can_archive: danger && !view.is_archived,
            can_unarchive: danger && view.is_archived,
            can_delete: danger,
        };

        match &view.issues {
            IssueTracker::Internal {
                enable_time_tracking,
                allow_only_contributors_to_track_time,
                enable_dependencies,
            } => {
                page.tracker_mode = "internal";
                page.show_internal_tracker = true;
                page.enable_time_tracking = *enable_time_tracking;
                page.allow_only_contributors_to_track_time =
                    *enable_time_tracking && *allow_only_contributors_to_track_time;
                page.enable_dependencies = *enable_dependencies;
            }
            IssueTracker::External { url, format, style } => {
                page.tracker_mode = "external";
                page.show_external_tracker = true;
                page.external_tracker_url = url.clone();
                page.external_tracker_format = format.clone();
                page.external_tracker_style = *style;
            }
            IssueTracker::Disabled => {}
        }

        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner_view() -> RepoSettingsView {
        RepoSettingsView {
            owner_name: "org".into(),
            name: "repo".into(),
            capabilities: Capabilities {
                is_owner: true,
                is_admin: false,
            },
            pull_requests: Some(PullRequestPolicy::default()),
            ..Default::default()
        }
    }

    #[test]
    fn test_mirror_section_only_for_mirrors() {
        let page = RepoSettingsPage::project(&owner_view());
        assert!(!page.show_mirror);
        assert!(!page.can_convert_mirror);
        assert!(page.show_pull_settings);

        let mut view = owner_view();
        view.mirror = Some(MirrorConfig::new("https://example.com/upstream.git"));
        let page = RepoSettingsPage::project(&view);
        assert!(page.show_mirror);
        assert!(page.can_convert_mirror);
        assert!(!page.show_pull_settings);
    }

    #[test]
    fn test_external_tracker_fields_only_when_selected() {
        let mut view = owner_view();
        let page = RepoSettingsPage::project(&view);
        assert!(!page.show_external_tracker);
        assert!(page.show_internal_tracker);

        view.issues = IssueTracker::External {
            url: "https://tracker.example.com".into(),
            format: "https://tracker.example.com/{user}/{repo}/{index}".into(),
            style: TrackerStyle::Alphanumeric,
        };
        let page = RepoSettingsPage::project(&view);
        assert!(page.show_external_tracker);
        assert!(!page.show_internal_tracker);
        assert_eq!(page.tracker_mode, "external");
        assert_eq!(page.external_tracker_style, TrackerStyle::Alphanumeric);
    }

    #[test]
    fn test_danger_zone_requires_owner_or_admin() {
        let mut view = owner_view();
        view.capabilities = Capabilities::default();
        let page = RepoSettingsPage::project(&view);
        assert!(!page.show_danger_zone);
        assert!(!page.can_delete);
        assert!(!page.can_transfer);
        assert!(!page.can_archive);

        view.capabilities.is_admin = true;
        let page = RepoSettingsPage::project(&view);
        assert!(page.show_danger_zone);
        assert!(page.can_delete);
    }

    #[test]
    fn test_archive_and_transfer_states() {
        let mut view = owner_view();
        view.is_archived = true;
        view.transfer_pending_to = Some("alice".into());
        let page = RepoSettingsPage::project(&view);
        assert!(page.read_only);
        assert!(!page.can_archive);
        assert!(page.can_unarchive);
        assert!(!page.can_transfer);
        assert!(page.can_cancel_transfer);
        assert_eq!(page.transfer_pending_to, "alice");
    }

    #[test]
    fn test_trust_model_options() {
        let mut view = owner_view();
        view.trust_model = TrustModel::Committer;
        let page = RepoSettingsPage::project(&view);
        let checked: Vec<&str> = page
            .trust_model_options
            .iter()
            .filter(|o| o.checked)
            .map(|o| o.value)
            .collect();
        assert_eq!(checked, vec!["committer"]);
        assert_eq!(page.trust_model_options.len(), 4);
    }

    #[test]
    fn test_forced_private_locks_visibility() {
        let mut view = owner_view();
        view.force_private = true;
        let page = RepoSettingsPage::project(&view);
        assert!(page.is_private);
        assert!(page.visibility_locked);

        view.capabilities.is_admin = true;
        assert!(!RepoSettingsPage::project(&view).visibility_locked);
    }

    #[test]
    fn test_view_deserializes_tagged_units() {
        let view: RepoSettingsView = serde_json::from_str(
            r#"{"owner_name": "org", "name": "repo",
                "wiki": {"mode": "external", "url": "https://wiki.example.com"},
                "issues": {"mode": "disabled"},
                "trust_model": "collaborator_committer"}"#,
        )
        .unwrap();
        let page = RepoSettingsPage::project(&view);
        assert!(page.show_external_wiki);
        assert_eq!(page.external_wiki_url, "https://wiki.example.com");
        assert_eq!(page.tracker_mode, "disabled");
        assert!(!page.pulls_enabled);
    }
}
