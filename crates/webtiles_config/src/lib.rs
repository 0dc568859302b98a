//! # Webtiles Config
//!
//! Configuration schema, loader and validator for a webtiles game server.
//!
//! This crate **only** describes and checks configuration:
//! - No sockets are bound
//! - No game processes are spawned
//! - No files are touched except the one being loaded
//!
//! The serving process loads a [`ServerConfig`](server::ServerConfig) once at
//! startup, refuses to start if loading fails, and then passes the value by
//! reference to whatever needs it.
//!
//! ## Crate Structure
//!
//! - [`data`] - Serialized (RON/JSON) schema
//! - [`loader`] - Source decoding and deployment variables
//! - [`validate`] - Schema rules, collecting every violation
//! - [`server`] - Validated server configuration
//! - [`games`] - Game variants and the ordered game registry
//! - [`paths`] - Per-user `%n` path templates

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod data;
pub mod error;
pub mod games;
pub mod interpolate;
pub mod loader;
pub mod paths;
pub mod server;
pub mod validate;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{ConfigError, ResolveError, Result, ValidationError, ValidationErrors};
    pub use crate::games::{GameRegistry, GameVariantEntry};
    pub use crate::loader::{load_from_file, load_from_str, ConfigFormat, ConfigLoader};
    pub use crate::paths::{ResolvedGamePaths, UserTemplate};
    pub use crate::server::{BindPair, LogLevel, ServerConfig, TlsOptions};
}
