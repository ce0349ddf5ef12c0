//! Icon names for feed actions, tree entries and migration sources,
//! plus diff type labels.

use serde::{Deserialize, Serialize};

/// Icon shown for anything the lookups do not recognise
pub const DEFAULT_ACTION_ICON: &str = "question";

/// Fallback icon for migration sources without a dedicated logo
pub const DEFAULT_MIGRATION_ICON: &str = "fa-git-alt";

/// Kinds of activity-feed actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    CreateRepo,
    RenameRepo,
    StarRepo,
    WatchRepo,
    CommitRepo,
    CreateIssue,
    CreatePullRequest,
    TransferRepo,
    PushTag,
    CommentIssue,
    MergePullRequest,
    CloseIssue,
    ReopenIssue,
    ClosePullRequest,
    ReopenPullRequest,
    DeleteTag,
    DeleteBranch,
    MirrorSyncPush,
    MirrorSyncCreate,
    MirrorSyncDelete,
    ApprovePullRequest,
    RejectPullRequest,
    CommentPull,
    PublishRelease,
}

impl ActionType {
    pub const ALL: [ActionType; 24] = [
        ActionType::CreateRepo,
        ActionType::RenameRepo,
        ActionType::StarRepo,
        ActionType::WatchRepo,
        ActionType::CommitRepo,
        ActionType::CreateIssue,
        ActionType::CreatePullRequest,
        ActionType::TransferRepo,
        ActionType::PushTag,
        ActionType::CommentIssue,
        ActionType::MergePullRequest,
        ActionType::CloseIssue,
        ActionType::ReopenIssue,
        ActionType::ClosePullRequest,
        ActionType::ReopenPullRequest,
        ActionType::DeleteTag,
        ActionType::DeleteBranch,
        ActionType::MirrorSyncPush,
        ActionType::MirrorSyncCreate,
        ActionType::MirrorSyncDelete,
        ActionType::ApprovePullRequest,
        ActionType::RejectPullRequest,
        ActionType::CommentPull,
        ActionType::PublishRelease,
    ];

    /// Stored numeric code (1-based, in declaration order)
    pub fn code(self) -> i64 {
        Self::ALL
            .iter()
            .position(|&a| a == self)
            .map(|i| i as i64 + 1)
            .unwrap_or_default()
    }

    pub fn from_code(code: i64) -> Option<Self> {
        if code < 1 {
            return None;
        }
        Self::ALL.get(code as usize - 1).copied()
    }
}

/// Octicon name for a feed action
pub fn action_icon(action: ActionType) -> &'static str {
    match action {
        ActionType::CreateRepo | ActionType::TransferRepo => "repo",
        ActionType::CommitRepo
        | ActionType::PushTag
        | ActionType::DeleteTag
        | ActionType::DeleteBranch => "git-commit",
        ActionType::CreateIssue => "issue-opened",
        ActionType::CreatePullRequest => "git-pull-request",
        ActionType::CommentIssue | ActionType::CommentPull => "comment-discussion",
        ActionType::MergePullRequest => "git-merge",
        ActionType::CloseIssue | ActionType::ClosePullRequest => "issue-closed",
        ActionType::ReopenIssue | ActionType::ReopenPullRequest => "issue-reopened",
        ActionType::MirrorSyncPush | ActionType::MirrorSyncCreate | ActionType::MirrorSyncDelete => {
            "repo-clone"
        }
        ActionType::ApprovePullRequest => "check",
        ActionType::RejectPullRequest => "diff",
        ActionType::PublishRelease => "tag",
        ActionType::RenameRepo | ActionType::StarRepo | ActionType::WatchRepo => {
            DEFAULT_ACTION_ICON
        }
    }
}

/// [`action_icon`] for a stored numeric code; unknown codes get the default icon
pub fn action_icon_for_code(code: i64) -> &'static str {
    ActionType::from_code(code)
        .map(action_icon)
        .unwrap_or(DEFAULT_ACTION_ICON)
}

/// Font Awesome icon for the service an issue or comment was migrated from
pub fn migration_icon(hostname: &str) -> &'static str {
    match hostname {
        "github.com" => "fa-github",
        _ => DEFAULT_MIGRATION_ICON,
    }
}

/// Kind of a git tree entry as far as its icon is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
    Submodule,
    /// `target_is_dir` is `None` when the link target cannot be resolved
    Symlink { target_is_dir: Option<bool> },
}

pub fn entry_icon(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Symlink { target_is_dir: Some(true) } => "file-symlink-directory",
        EntryKind::Symlink { .. } => "file-symlink-file",
        EntryKind::Directory => "file-directory",
        EntryKind::Submodule => "file-submodule",
        EntryKind::File => "file",
    }
}

/// Change type of a file in a diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffType {
    Add,
    Modify,
    Del,
    Rename,
    Copy,
}

impl DiffType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Add),
            2 => Some(Self::Modify),
            3 => Some(Self::Del),
            4 => Some(Self::Rename),
            5 => Some(Self::Copy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Modify => "modify",
            Self::Del => "del",
            Self::Rename => "rename",
            Self::Copy => "copy",
        }
    }
}

/// Diff type name for a numeric code, empty when unknown
pub fn diff_type_to_str(code: i64) -> &'static str {
    DiffType::from_code(code).map(|t| t.as_str()).unwrap_or("")
}

/// Kind of a single line in a diff section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffLineType {
    Plain,
    Add,
    Del,
    Section,
}

impl DiffLineType {
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Self::Add,
            3 => Self::Del,
            4 => Self::Section,
            _ => Self::Plain,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Del => "del",
            Self::Section => "tag",
            Self::Plain => "same",
        }
    }
}

pub fn diff_line_type_to_str(code: i64) -> &'static str {
    DiffLineType::from_code(code).as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_codes_round_trip() {
        for action in ActionType::ALL {
            assert_eq!(ActionType::from_code(action.code()), Some(action));
        }
        assert_eq!(ActionType::CreateRepo.code(), 1);
        assert_eq!(ActionType::PublishRelease.code(), 24);
        assert_eq!(ActionType::from_code(0), None);
        assert_eq!(ActionType::from_code(25), None);
    }

    #[test]
    fn test_action_icon_is_total() {
        for action in ActionType::ALL {
            assert!(!action_icon(action).is_empty());
        }
        assert_eq!(action_icon(ActionType::MergePullRequest), "git-merge");
        assert_eq!(action_icon(ActionType::MirrorSyncDelete), "repo-clone");
        assert_eq!(action_icon(ActionType::StarRepo), DEFAULT_ACTION_ICON);
    }

    #[test]
    fn test_unknown_action_code() {
        assert_eq!(action_icon_for_code(5), "git-commit");
        assert_eq!(action_icon_for_code(-3), "question");
        assert_eq!(action_icon_for_code(999), "question");
    }

    #[test]
    fn test_migration_icon() {
        assert_eq!(migration_icon("github.com"), "fa-github");
        assert_eq!(migration_icon("gitlab.com"), "fa-git-alt");
        assert_eq!(migration_icon(""), "fa-git-alt");
    }

    #[test]
    fn test_entry_icon() {
        assert_eq!(entry_icon(EntryKind::File), "file");
        assert_eq!(entry_icon(EntryKind::Directory), "file-directory");
        assert_eq!(entry_icon(EntryKind::Submodule), "file-submodule");
        assert_eq!(
            entry_icon(EntryKind::Symlink { target_is_dir: Some(true) }),
            "file-symlink-directory"
        );
        assert_eq!(entry_icon(EntryKind::Symlink { target_is_dir: None }), "file-symlink-file");
    }

    #[test]
    fn test_diff_type_names() {
        assert_eq!(diff_type_to_str(1), "add");
        assert_eq!(diff_type_to_str(5), "copy");
        assert_eq!(diff_type_to_str(9), "");
        assert_eq!(diff_line_type_to_str(2), "add");
        assert_eq!(diff_line_type_to_str(4), "tag");
        assert_eq!(diff_line_type_to_str(1), "same");
    }

    #[test]
    fn test_action_type_serde() {
        let json = serde_json::to_string(&ActionType::MirrorSyncPush).unwrap();
        assert_eq!(json, "\"mirror_sync_push\"");
    }
}
