//! # Webtiles Operator Tools
//!
//! Command-line helpers for people running a webtiles server:
//! - Config validation with deployment variables
//! - Lobby game listing
//! - Per-user path resolution

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod report;
pub mod validate;
