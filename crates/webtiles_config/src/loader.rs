//! Loading configuration sources.
//!
//! A source is decoded into [`ServerData`], then validated into an immutable
//! [`ServerConfig`]. Nothing else happens here: no sockets, no processes,
//! and the only file read is the one being loaded.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use ron::extensions::Extensions;

use crate::data::ServerData;
use crate::error::{ConfigError, Result};
use crate::interpolate::interpolate;
use crate::server::ServerConfig;
use crate::validate::validate;

/// Origin label used in errors for in-memory sources.
const STRING_ORIGIN: &str = "<string>";

/// Encoding of a configuration source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFormat {
    /// Rusty Object Notation, with implicit `Some` enabled.
    Ron,
    /// JSON.
    Json,
}

impl ConfigFormat {
    /// Pick a format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] for anything other than
    /// `.ron` or `.json`.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("ron") => Ok(Self::Ron),
            Some("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Decode `text` without validating it.
    fn decode(self, text: &str, origin: &str) -> Result<ServerData> {
        let decoded = match self {
            Self::Ron => ron::Options::default()
                .with_default_extension(Extensions::IMPLICIT_SOME)
                .from_str(text)
                .map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        };
        decoded.map_err(|message| ConfigError::Parse {
            format: self,
            origin: origin.to_string(),
            message,
        })
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ron => f.write_str("RON"),
            Self::Json => f.write_str("JSON"),
        }
    }
}

/// Loads configuration sources, substituting deployment variables first.
///
/// ```no_run
/// use webtiles_config::loader::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_variable("CHROOT_WEBDIR", "/webserver")
///     .load_file("config/webtiles.ron")?;
/// # Ok::<(), webtiles_config::error::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    variables: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a loader with no deployment variables.
    #[must_use]
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
        }
    }

    /// Set the value of `%%NAME%%`.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Set several deployment variables.
    pub fn with_variables<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.variables
            .extend(variables.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Deployment variables this loader substitutes.
    #[must_use]
    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    /// Substitute variables and decode, without validating.
    pub fn parse_str(&self, text: &str, format: ConfigFormat) -> Result<ServerData> {
        self.parse_with_origin(text, format, STRING_ORIGIN)
    }

    /// Load and validate an in-memory source.
    pub fn load_str(&self, text: &str, format: ConfigFormat) -> Result<ServerConfig> {
        let data = self.parse_str(text, format)?;
        Ok(validate(data)?)
    }

    /// Load and validate a file; the format follows its extension.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ServerConfig> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let origin = path.display().to_string();
        tracing::debug!("Loading {format} config from {origin}");
        let data = self.parse_with_origin(&text, format, &origin)?;
        let config = validate(data)?;

        tracing::info!(
            games = config.games.len(),
            listeners = config.network.listeners().count(),
            "Loaded config from {origin}"
        );
        Ok(config)
    }

    fn parse_with_origin(&self, text: &str, format: ConfigFormat, origin: &str) -> Result<ServerData> {
        let text = interpolate(text, &self.variables)?;
        format.decode(&text, origin)
    }
}

/// Load and validate an in-memory source with no deployment variables.
pub fn load_from_str(text: &str, format: ConfigFormat) -> Result<ServerConfig> {
    ConfigLoader::new().load_str(text, format)
}

/// Load and validate a file with no deployment variables.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<ServerConfig> {
    ConfigLoader::new().load_file(path)
}
