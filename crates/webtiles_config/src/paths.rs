//! Per-user path templates and their resolution.
//!
//! A template is a path (or URL) that may contain `%n`, replaced by the
//! authenticated username. Resolution is literal substitution: nothing is
//! created on disk and nothing is checked for existence.

use std::fmt;
use std::path::PathBuf;

use crate::error::ResolveError;
use crate::games::GameVariantEntry;

/// Placeholder replaced by the username.
pub const USERNAME_PLACEHOLDER: &str = "%n";

/// A path or URL that may contain [`USERNAME_PLACEHOLDER`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserTemplate(String);

impl UserTemplate {
    /// Wrap a template string.
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// The raw template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the template varies per user.
    #[must_use]
    pub fn has_placeholder(&self) -> bool {
        self.0.contains(USERNAME_PLACEHOLDER)
    }

    /// Substitute `username` for every `%n`.
    ///
    /// `field` names the template in errors.
    pub fn resolve(&self, field: &'static str, username: &str) -> Result<String, ResolveError> {
        if !self.has_placeholder() {
            return Ok(self.0.clone());
        }
        if username.is_empty() {
            return Err(ResolveError::UnresolvedPlaceholder { field });
        }
        check_username(username)?;

        let resolved = self.0.replace(USERNAME_PLACEHOLDER, username);
        if resolved.contains(USERNAME_PLACEHOLDER) {
            return Err(ResolveError::UnresolvedPlaceholder { field });
        }
        Ok(resolved)
    }

    /// Like [`resolve`](Self::resolve), returning a path.
    pub fn resolve_path(&self, field: &'static str, username: &str) -> Result<PathBuf, ResolveError> {
        self.resolve(field, username).map(PathBuf::from)
    }
}

impl fmt::Display for UserTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reject names that would leave their per-user directory.
fn check_username(username: &str) -> Result<(), ResolveError> {
    let escapes = username == "."
        || username == ".."
        || username.contains(['/', '\\', '\0']);
    if escapes {
        return Err(ResolveError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

/// Describe why `template` is not a usable path template, if it is not.
///
/// Every `%` must start a `%n` placeholder; anything else is a leftover
/// deployment marker or a typo.
pub(crate) fn path_template_problem(template: &str) -> Option<String> {
    if template.is_empty() {
        return Some("path must not be empty".to_string());
    }
    if template.contains('\0') {
        return Some("path contains a NUL byte".to_string());
    }
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c == '%' {
            match chars.next() {
                Some('n') => {}
                Some(other) => return Some(format!("unknown placeholder '%{other}'")),
                None => return Some("dangling '%' at end of path".to_string()),
            }
        }
    }
    None
}

/// Every path of a game, resolved for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGamePaths {
    /// Username the paths were resolved for.
    pub username: String,
    /// rc file directory.
    pub rcfile_path: PathBuf,
    /// Macro file directory.
    pub macro_path: PathBuf,
    /// Morgue directory.
    pub morgue_path: PathBuf,
    /// In-progress marker directory.
    pub inprogress_path: PathBuf,
    /// ttyrec directory.
    pub ttyrec_path: PathBuf,
    /// Socket directory.
    pub socket_path: PathBuf,
    /// Web client directory.
    pub client_path: Option<PathBuf>,
    /// Public morgue URL.
    pub morgue_url: Option<String>,
}

impl ResolvedGamePaths {
    /// Named path fields in declaration order, for display.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, String)> + '_ {
        let required = [
            ("rcfile_path", &self.rcfile_path),
            ("macro_path", &self.macro_path),
            ("morgue_path", &self.morgue_path),
            ("inprogress_path", &self.inprogress_path),
            ("ttyrec_path", &self.ttyrec_path),
            ("socket_path", &self.socket_path),
        ]
        .into_iter()
        .map(|(name, path)| (name, path.display().to_string()));

        let client = self
            .client_path
            .iter()
            .map(|path| ("client_path", path.display().to_string()));
        let morgue_url = self.morgue_url.iter().map(|url| ("morgue_url", url.clone()));

        required.chain(client).chain(morgue_url)
    }
}

/// Resolve every template of `entry` for `username`.
///
/// The username is expected to have passed the server's nick pattern
/// already.
pub fn resolve_paths(
    entry: &GameVariantEntry,
    username: &str,
) -> Result<ResolvedGamePaths, ResolveError> {
    Ok(ResolvedGamePaths {
        username: username.to_string(),
        rcfile_path: entry.rcfile_path.resolve_path("rcfile_path", username)?,
        macro_path: entry.macro_path.resolve_path("macro_path", username)?,
        morgue_path: entry.morgue_path.resolve_path("morgue_path", username)?,
        inprogress_path: entry
            .inprogress_path
            .resolve_path("inprogress_path", username)?,
        ttyrec_path: entry.ttyrec_path.resolve_path("ttyrec_path", username)?,
        socket_path: entry.socket_path.resolve_path("socket_path", username)?,
        client_path: entry
            .client_path
            .as_ref()
            .map(|t| t.resolve_path("client_path", username))
            .transpose()?,
        morgue_url: entry
            .morgue_url
            .as_ref()
            .map(|t| t.resolve("morgue_url", username))
            .transpose()?,
    })
}
