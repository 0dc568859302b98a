//! Config validation for operators.

use std::path::Path;

use webtiles_config::error::ConfigError;
use webtiles_config::loader::ConfigLoader;
use webtiles_config::paths::ResolvedGamePaths;
use webtiles_config::server::ServerConfig;

use crate::error::{Result, ToolError};

/// Parse a `NAME=VALUE` deployment variable definition.
///
/// The value may be empty or contain further `=` characters.
///
/// # Errors
///
/// Returns [`ToolError::InvalidDefine`] if there is no `=` or the name is
/// empty.
pub fn parse_define(arg: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(ToolError::InvalidDefine(arg.to_string())),
    }
}

/// Load and validate the config at `path`.
///
/// Every violation is logged before the error is returned. With
/// `check_files`, the TLS files must also be readable.
///
/// # Errors
///
/// Returns the loader's error, or the unreadable TLS files.
pub fn validate_config_file(
    path: &Path,
    defines: &[(String, String)],
    check_files: bool,
) -> Result<ServerConfig> {
    let loader = ConfigLoader::new().with_variables(defines.iter().cloned());

    let config = match loader.load_file(path) {
        Ok(config) => config,
        Err(e) => {
            if let Some(violations) = e.violations() {
                for violation in violations {
                    tracing::error!(field = violation.field(), "{violation}");
                }
            }
            return Err(e.into());
        }
    };

    if check_files {
        if let Some(tls) = &config.network.tls {
            tls.ensure_readable().map_err(ConfigError::from)?;
        }
    }

    Ok(config)
}

/// Resolve the paths of game `key` for `username`.
///
/// The username must match the server's nick pattern first, as it would
/// at login.
///
/// # Errors
///
/// Returns [`ToolError::InvalidNickname`] or the resolver's error.
pub fn resolve_game(
    config: &ServerConfig,
    key: &str,
    username: &str,
) -> Result<ResolvedGamePaths> {
    if !config.is_valid_nick(username) {
        return Err(ToolError::InvalidNickname(username.to_string()));
    }
    Ok(config.games.resolve(key, username)?)
}
