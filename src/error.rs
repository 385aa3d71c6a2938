//! Error types for the gflow CLI.
//!
//! Uses thiserror for derive macros. Precondition failures may carry a
//! [`Remedy`]: a labelled action the dispatcher can offer to the operator
//! before re-running the command once.

use crate::exit_codes;
use thiserror::Error;

/// Something the dispatcher can do to repair a failed precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemedyAction {
    /// Bring `branch` up to date with its counterpart on `remote`.
    Pull { remote: String, branch: String },
    /// Check out `branch`.
    Checkout { branch: String },
    /// Run gitflow initialization.
    Initialize,
}

/// A remediation offered alongside a precondition failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remedy {
    /// Label shown to the operator (e.g. "Pull now").
    pub label: String,
    pub action: RemedyAction,
}

impl Remedy {
    pub fn pull(remote: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            label: "Pull now".to_string(),
            action: RemedyAction::Pull {
                remote: remote.into(),
                branch: branch.into(),
            },
        }
    }

    pub fn checkout(branch: impl Into<String>) -> Self {
        Self {
            label: "Checkout and continue".to_string(),
            action: RemedyAction::Checkout {
                branch: branch.into(),
            },
        }
    }

    pub fn initialize() -> Self {
        Self {
            label: "Enable now".to_string(),
            action: RemedyAction::Initialize,
        }
    }
}

/// Main error type for gflow operations.
#[derive(Error, Debug)]
pub enum GflowError {
    /// User provided invalid arguments.
    #[error("{0}")]
    UserError(String),

    /// The repository is not in a state the operation can start from.
    #[error("{message}")]
    Precondition {
        message: String,
        remedy: Option<Remedy>,
    },

    /// A required git command failed.
    #[error("Git operation failed: {0}")]
    GitError(String),

    /// Finishing stopped because merging `branch` into `target` conflicted.
    #[error(
        "merging '{branch}' into '{target}' produced conflicts.\n\n\
         Resolve the conflicts, commit the merge, and run finish again to complete the operation."
    )]
    Conflict { branch: String, target: String },

    /// A rebase failed and was aborted; the branch is back at its old tip.
    #[error("rebase of '{branch}' onto '{onto}' failed and was aborted: {detail}")]
    RebaseFailed {
        branch: String,
        onto: String,
        detail: String,
    },

    /// The operator declined a confirmation or left a required input blank.
    #[error("operation cancelled")]
    Cancelled,
}

impl GflowError {
    /// Precondition failure with no remediation.
    pub fn precondition(message: impl Into<String>) -> Self {
        GflowError::Precondition {
            message: message.into(),
            remedy: None,
        }
    }

    /// Precondition failure the operator can repair with `remedy`.
    pub fn with_remedy(message: impl Into<String>, remedy: Remedy) -> Self {
        GflowError::Precondition {
            message: message.into(),
            remedy: Some(remedy),
        }
    }

    pub fn remedy(&self) -> Option<&Remedy> {
        match self {
            GflowError::Precondition { remedy, .. } => remedy.as_ref(),
            _ => None,
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GflowError::UserError(_) => exit_codes::USER_ERROR,
            GflowError::Precondition { .. } => exit_codes::USER_ERROR,
            GflowError::GitError(_) => exit_codes::GIT_FAILURE,
            GflowError::Conflict { .. } => exit_codes::CONFLICT,
            GflowError::RebaseFailed { .. } => exit_codes::CONFLICT,
            GflowError::Cancelled => exit_codes::SUCCESS,
        }
    }
}

/// Result type alias for gflow operations.
pub type Result<T> = std::result::Result<T, GflowError>;
