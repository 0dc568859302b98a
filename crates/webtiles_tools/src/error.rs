//! Error types for the operator tools.

use thiserror::Error;
use webtiles_config::error::{ConfigError, ResolveError};

/// Result type for tool commands.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors reported by a tool command.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Loading or validating the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A game path could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The username is rejected by the server's nick pattern.
    #[error("'{0}' does not match nick_regex")]
    InvalidNickname(String),

    /// A `-D` argument was not `NAME=VALUE`.
    #[error("invalid definition '{0}': expected NAME=VALUE")]
    InvalidDefine(String),
}
