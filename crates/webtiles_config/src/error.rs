//! Error types for configuration loading, validation and path resolution.

use std::fmt;

use thiserror::Error;

use crate::loader::ConfigFormat;

/// Result type alias using [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level error returned when loading a configuration source.
///
/// Every variant is fatal to startup: a configuration that produces any of
/// these must not be used to bind sockets or launch games.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// Path to the file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The source is not well-formed for its format, or has the wrong shape.
    #[error("Failed to parse {format} config '{origin}': {message}")]
    Parse {
        /// Format the source was decoded as.
        format: ConfigFormat,
        /// File path, or `<string>` for in-memory sources.
        origin: String,
        /// Decoder error message (includes position when available).
        message: String,
    },

    /// File extension does not map to a supported format.
    #[error("Unsupported config file extension for '{0}' (expected .ron or .json)")]
    UnsupportedFormat(String),

    /// One or more `%%NAME%%` deployment variables had no value.
    #[error("Unknown deployment variable(s): {}", .0.join(", "))]
    UnknownVariable(Vec<String>),

    /// The source parsed but violates the schema rules.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

impl ConfigError {
    /// Collected validation violations, if this is a validation failure.
    #[must_use]
    pub fn violations(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

/// A single schema violation, naming the offending field path.
///
/// Field paths use dots for nesting and the game key for registry entries,
/// e.g. `games.dcss-git.crawl_binary` or `ssl_options.keyfile`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent or empty.
    #[error("Missing required field '{field}'")]
    MissingField {
        /// Field path.
        field: String,
    },

    /// A path field is malformed.
    #[error("Invalid path for '{field}': {reason}")]
    InvalidPath {
        /// Field path.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A game registry key occurs more than once.
    #[error("Duplicate game key '{0}'")]
    DuplicateKey(String),

    /// TLS is enabled but one of its three files is missing or empty.
    #[error("Inconsistent TLS configuration: '{field}' is missing or empty")]
    InconsistentTls {
        /// Field path of the missing TLS entry.
        field: String,
    },

    /// A numeric field is outside its allowed range.
    #[error("Value {value} for '{field}' is out of range (expected {expected})")]
    InvalidNumericRange {
        /// Field path.
        field: String,
        /// Value found in the source.
        value: i64,
        /// Human-readable allowed range.
        expected: String,
    },

    /// A value is present but unusable (bad pattern, bad template, unknown level).
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Field path.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ValidationError {
    /// The field path this violation refers to.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field }
            | Self::InvalidPath { field, .. }
            | Self::InconsistentTls { field }
            | Self::InvalidNumericRange { field, .. }
            | Self::InvalidValue { field, .. } => field,
            Self::DuplicateKey(_) => "games",
        }
    }
}

/// Every violation found in one validation pass, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Record a violation.
    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// True when no violations were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over violations in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// True if this exact violation was recorded.
    #[must_use]
    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }

    /// Violations naming `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.0.iter().filter(move |e| e.field() == field)
    }

    /// `Ok(value)` if nothing was recorded, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> std::result::Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} configuration error(s)", self.0.len())?;
        for (i, error) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Errors from resolving per-user path templates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A `%n` placeholder could not be substituted or survived substitution.
    #[error("Unresolved '%n' placeholder in '{field}'")]
    UnresolvedPlaceholder {
        /// Name of the template field.
        field: &'static str,
    },

    /// The username would escape its per-user directory.
    #[error("Username '{0}' cannot be used in a per-user path")]
    InvalidUsername(String),

    /// No game is registered under this key.
    #[error("Unknown game: {0}")]
    UnknownGame(String),
}
