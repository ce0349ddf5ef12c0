use serde::{Deserialize, Serialize};

/// Who can see an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    /// Visible to signed-in users only
    Limited,
    Private,
}

impl Visibility {
    /// Translation key of the badge shown next to the name, if any
    pub fn badge_key(&self) -> Option<&'static str> {
        match self {
            Self::Public => None,
            Self::Limited => Some("org.settings.visibility.limited_shortname"),
            Self::Private => Some("org.settings.visibility.private_shortname"),
        }
    }
}

/// Organization data the page header is rendered from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgHeaderView {
    pub name: String,
    pub full_name: String,
    pub avatar_url: String,
    pub description: String,
    pub website: String,
    pub location: String,
    pub visibility: Visibility,
    pub num_members: i64,
    pub num_teams: i64,
    pub is_owner: bool,
    pub is_member: bool,
}

/// Organization header with its display decisions resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgHeaderPage {
    pub name: String,
    pub display_name: String,
    /// Login name shown beside a differing full name
    pub show_name: bool,
    pub avatar_url: String,
    pub description: String,
    pub website: String,
    pub location: String,
    pub visibility_badge_key: Option<&'static str>,
    pub num_members: i64,
    pub num_teams: i64,
    pub show_teams: bool,
    pub show_settings: bool,
}

impl OrgHeaderPage {
    pub fn project(view: &OrgHeaderView) -> Self {
        let full_name = view.full_name.trim();
        let display_name = if full_name.is_empty() {
            view.name.clone()
        } else {
            full_name.to_string()
        };
        Self {
            show_name: display_name != view.name,
            name: view.name.clone(),
            display_name,
            avatar_url: view.avatar_url.clone(),
            description: view.description.clone(),
            website: view.website.clone(),
            location: view.location.clone(),
            visibility_badge_key: view.visibility.badge_key(),
            num_members: view.num_members,
            num_teams: view.num_teams,
            show_teams: view.is_member || view.is_owner,
            show_settings: view.is_owner,
        }
    }
}
