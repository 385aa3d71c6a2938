//! User settings for gflow.
//!
//! Settings are a read-only configuration source loaded from YAML
//! (`<git-dir>/gflow/config.yaml` unless overridden). They supply defaults
//! for initialization and the remote/deletion policy used when finishing.
//! A missing file yields the defaults; unknown keys are ignored.

mod model;
mod operations;
pub mod types;


pub use model::Settings;
pub use operations::SETTINGS_PATH_ENV;
pub use types::Prefixes;
