//! Serialized configuration schema.
//!
//! These are the shapes decoded from RON or JSON sources. Every field that
//! the validator checks is kept loose here (optional strings, signed
//! integers) so that a bad value becomes a named violation instead of an
//! opaque decode error.
//!
//! **Note:** This module contains no IO and no validation - it only defines
//! data types. See [`crate::loader`] and [`crate::validate`].

mod game_data;
mod server_data;

pub use game_data::GameData;
pub use server_data::{BindPairData, LoggingData, ServerData, SmtpData, TlsData};
