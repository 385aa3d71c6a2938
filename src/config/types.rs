//! Nested settings types and serde default functions.

use crate::flow::BranchKind;
use serde::{Deserialize, Serialize};

/// Default branch-name prefix for each kind, offered during initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prefixes {
    pub feature: String,
    pub bugfix: String,
    pub release: String,
    pub hotfix: String,
    pub support: String,
}

impl Default for Prefixes {
    fn default() -> Self {
        Self {
            feature: BranchKind::Feature.default_prefix().to_string(),
            bugfix: BranchKind::Bugfix.default_prefix().to_string(),
            release: BranchKind::Release.default_prefix().to_string(),
            hotfix: BranchKind::Hotfix.default_prefix().to_string(),
            support: BranchKind::Support.default_prefix().to_string(),
        }
    }
}

impl Prefixes {
    pub fn get(&self, kind: BranchKind) -> &str {
        match kind {
            BranchKind::Feature => &self.feature,
            BranchKind::Bugfix => &self.bugfix,
            BranchKind::Release => &self.release,
            BranchKind::Hotfix => &self.hotfix,
            BranchKind::Support => &self.support,
        }
    }
}

// Default value functions for serde
pub(crate) fn default_production() -> String {
    "master".to_string()
}
pub(crate) fn default_development() -> String {
    "develop".to_string()
}
pub(crate) fn default_remote() -> String {
    "origin".to_string()
}
pub(crate) fn default_true() -> bool {
    true
}
