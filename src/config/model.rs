//! Settings struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Operator preferences for gflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // =========================================================================
    // Initialization defaults
    // =========================================================================
    /// Production branch offered by `gflow init` (default: "master").
    #[serde(default = "default_production")]
    pub default_production: String,

    /// Development branch offered by `gflow init` (default: "develop").
    #[serde(default = "default_development")]
    pub default_development: String,

    /// Branch prefixes offered by `gflow init`.
    pub prefixes: Prefixes,

    /// Version tag prefix offered by `gflow init` (default: empty).
    pub version_tag_prefix: String,

    // =========================================================================
    // Remote policy
    // =========================================================================
    /// The primary remote (default: "origin").
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Whether finishing deletes the remote counterpart of the finished branch
    /// and, for releases and hotfixes, pushes the long-lived branches and tags.
    #[serde(default = "default_true")]
    pub delete_remote_branches: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_production: default_production(),
            default_development: default_development(),
            prefixes: Prefixes::default(),
            version_tag_prefix: String::new(),
            remote: default_remote(),
            delete_remote_branches: default_true(),
        }
    }
}
