use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

/// Decoration level of a commit in a commit list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitKind {
    /// Commit with user, signature and CI statuses attached
    SignCommitWithStatuses,
    /// Commit with user and signature verification
    SignCommit,
    /// Commit with its author resolved to a user
    UserCommit,
}

impl CommitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignCommitWithStatuses => "SignCommitWithStatuses",
            Self::SignCommit => "SignCommit",
            Self::UserCommit => "UserCommit",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "SignCommitWithStatuses" => Some(Self::SignCommitWithStatuses),
            "SignCommit" => Some(Self::SignCommit),
            "UserCommit" => Some(Self::UserCommit),
            _ => None,
        }
    }
}

/// Kind name of a commit value, read from its `kind` tag; empty when untagged
pub fn commit_type(commit: &Value) -> &'static str {
    commit
        .get("kind")
        .and_then(Value::as_str)
        .and_then(CommitKind::from_tag)
        .map(|k| k.as_str())
        .unwrap_or("")
}

/// One commit of a push, as stored in an action's content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PushCommit {
    pub sha1: String,
    pub message: String,
    pub author_email: String,
    pub author_name: String,
    pub committer_email: String,
    pub committer_name: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Commits of a push event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushCommits {
    #[serde(rename = "Len", default)]
    pub len: usize,
    #[serde(rename = "Commits", default)]
    pub commits: Vec<PushCommit>,
    #[serde(rename = "HeadCommit", default)]
    pub head_commit: Option<PushCommit>,
    #[serde(rename = "CompareURL", default)]
    pub compare_url: String,
}

/// Decode the commits stored in a push action's content
///
/// Malformed content is logged and yields an empty list.
pub fn action_content_to_commits(content: &str) -> PushCommits {
    if content.is_empty() {
        return PushCommits::default();
    }
    serde_json::from_str(content).unwrap_or_else(|e| {
        error!("failed to decode push commits: {}", e);
        PushCommits::default()
    })
}
