//! Flow configuration: the gitflow roles recorded in repository git config.
//!
//! Roles live under the `gitflow.` namespace:
//!
//! | Role | Key |
//! |---|---|
//! | production branch | `gitflow.branch.master` |
//! | development branch | `gitflow.branch.develop` |
//! | branch prefix per kind | `gitflow.prefix.<kind>` |
//! | version tag prefix | `gitflow.prefix.versiontag` |

mod config;

pub use config::FlowConfig;

use std::fmt;

/// The categories of short-lived branches gitflow manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Feature,
    Bugfix,
    Release,
    Hotfix,
    Support,
}

impl BranchKind {
    /// Every kind, in the order initialization records their prefixes.
    pub const ALL: [BranchKind; 5] = [
        BranchKind::Feature,
        BranchKind::Bugfix,
        BranchKind::Release,
        BranchKind::Hotfix,
        BranchKind::Support,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BranchKind::Feature => "feature",
            BranchKind::Bugfix => "bugfix",
            BranchKind::Release => "release",
            BranchKind::Hotfix => "hotfix",
            BranchKind::Support => "support",
        }
    }

    pub fn default_prefix(&self) -> &'static str {
        match self {
            BranchKind::Feature => "feature/",
            BranchKind::Bugfix => "bugfix/",
            BranchKind::Release => "release/",
            BranchKind::Hotfix => "hotfix/",
            BranchKind::Support => "support/",
        }
    }

    /// Long-lived branch new branches of this kind are cut from.
    pub fn base(&self) -> Role {
        match self {
            BranchKind::Feature | BranchKind::Bugfix | BranchKind::Release => Role::Development,
            BranchKind::Hotfix | BranchKind::Support => Role::Production,
        }
    }

    /// Whether finishing merges into production and tags the result.
    pub fn is_versioned(&self) -> bool {
        matches!(self, BranchKind::Release | BranchKind::Hotfix)
    }
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named entry of the flow configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Production,
    Development,
    Prefix(BranchKind),
    VersionTagPrefix,
}

impl Role {
    /// The git config key backing this role.
    pub fn key(&self) -> String {
        match self {
            Role::Production => "gitflow.branch.master".to_string(),
            Role::Development => "gitflow.branch.develop".to_string(),
            Role::Prefix(kind) => format!("gitflow.prefix.{}", kind.as_str()),
            Role::VersionTagPrefix => "gitflow.prefix.versiontag".to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Production => f.write_str("production branch"),
            Role::Development => f.write_str("development branch"),
            Role::Prefix(kind) => write!(f, "{} prefix", kind),
            Role::VersionTagPrefix => f.write_str("version tag prefix"),
        }
    }
}
