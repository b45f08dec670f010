//! Layered configuration: built-in defaults, a YAML file, then command-line
//! overrides, validated once into an immutable [`CheckConfig`].

mod loader;
mod resolve;
mod types;

pub use loader::ConfigFile;
pub use resolve::{clone_url, resolve, validate};
pub use types::{
    AuthMethod, CheckConfig, DEFAULT_BRANCH, DEFAULT_CHECKSTYLE_JAR, DEFAULT_RESULTS_DIR,
    DEFAULT_WORKSPACE, Remote, RunMeta, Settings,
};
