//! Reading and writing flow roles through `git config`.

use super::{BranchKind, Role};
use crate::context::Repository;
use crate::error::{GflowError, Remedy, Result};
use crate::refs::BranchRef;

/// Exit code of `git config --get` when the key is not set.
const KEY_NOT_SET: i32 = 1;

/// Repository-scoped flow configuration.
#[derive(Debug, Clone, Copy)]
pub struct FlowConfig<'r> {
    repo: &'r Repository,
}

impl<'r> FlowConfig<'r> {
    pub fn new(repo: &'r Repository) -> Self {
        Self { repo }
    }

    /// The role's value. An explicitly empty value is `Some("")`, not `None`.
    pub fn get(&self, role: Role) -> Result<Option<String>> {
        let key = role.key();
        let output = self.repo.run(&["config", "--get", &key])?;
        match output.code {
            0 => Ok(Some(output.stdout)),
            KEY_NOT_SET => Ok(None),
            _ => self
                .repo
                .run_required(&["config", "--get", &key])
                .map(|output| Some(output.stdout)),
        }
    }

    pub fn set(&self, role: Role, value: &str) -> Result<()> {
        let key = role.key();
        self.repo.run_required(&["config", "--local", &key, value])?;
        tracing::debug!(key = %key, value, "flow config set");
        Ok(())
    }

    /// Gitflow is enabled once both long-lived branch roles are set.
    pub fn flow_enabled(&self) -> Result<bool> {
        Ok(self.non_empty(Role::Production)?.is_some()
            && self.non_empty(Role::Development)?.is_some())
    }

    /// Fail, offering to initialize, unless gitflow is enabled.
    pub fn require_flow_enabled(&self) -> Result<()> {
        if self.flow_enabled()? {
            Ok(())
        } else {
            Err(GflowError::with_remedy(
                "gitflow is not initialized in this repository.\n\n\
                 Run `gflow init` to choose the production and development branches.",
                Remedy::initialize(),
            ))
        }
    }

    pub fn production(&self) -> Result<BranchRef> {
        self.branch_role(Role::Production)
    }

    pub fn development(&self) -> Result<BranchRef> {
        self.branch_role(Role::Development)
    }

    /// Prefix for `kind`. Unset or empty prefixes fail before any name is composed.
    pub fn prefix(&self, kind: BranchKind) -> Result<String> {
        let role = Role::Prefix(kind);
        self.non_empty(role)?.ok_or_else(|| {
            GflowError::precondition(format!(
                "the {} is not configured ({}).\n\n\
                 Run `gflow init` to set it.",
                role,
                role.key()
            ))
        })
    }

    /// Version tag prefix; unset reads as empty.
    pub fn version_tag_prefix(&self) -> Result<String> {
        Ok(self.get(Role::VersionTagPrefix)?.unwrap_or_default())
    }

    fn non_empty(&self, role: Role) -> Result<Option<String>> {
        Ok(self.get(role)?.filter(|value| !value.is_empty()))
    }

    fn branch_role(&self, role: Role) -> Result<BranchRef> {
        self.require_flow_enabled()?;
        self.non_empty(role)?
            .map(BranchRef::new)
            .ok_or_else(|| GflowError::precondition(format!("the {} is not configured", role)))
    }
}
