//! Validated game variants and the ordered game registry.

use std::path::PathBuf;

use crate::error::{ResolveError, ValidationError};
use crate::paths::{resolve_paths, ResolvedGamePaths, UserTemplate};

/// One playable game configuration.
///
/// Built by the validator from [`GameData`](crate::data::GameData); every
/// required field is present and every path template is well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameVariantEntry {
    /// Display name shown in the lobby.
    pub name: String,
    /// Executable launched for this game.
    pub crawl_binary: PathBuf,
    /// rc file directory template.
    pub rcfile_path: UserTemplate,
    /// Macro file directory template.
    pub macro_path: UserTemplate,
    /// Morgue directory template.
    pub morgue_path: UserTemplate,
    /// In-progress marker directory template.
    pub inprogress_path: UserTemplate,
    /// ttyrec directory template.
    pub ttyrec_path: UserTemplate,
    /// Socket directory template.
    pub socket_path: UserTemplate,
    /// Web client directory template.
    pub client_path: Option<UserTemplate>,
    /// Public morgue URL template.
    pub morgue_url: Option<UserTemplate>,
    /// Launch flags appended after `pre_options`.
    pub options: Vec<String>,
    /// Launch flags placed first.
    pub pre_options: Vec<String>,
    /// Whether the game is told to emit JSON option updates.
    pub send_json_options: bool,
}

impl GameVariantEntry {
    /// Arguments passed to `crawl_binary`: `pre_options` then `options`.
    pub fn launch_arguments(&self) -> impl Iterator<Item = &str> {
        self.pre_options
            .iter()
            .chain(&self.options)
            .map(String::as_str)
    }

    /// Resolve every path template for `username`.
    pub fn resolve_for(&self, username: &str) -> Result<ResolvedGamePaths, ResolveError> {
        resolve_paths(self, username)
    }
}

/// Game variants keyed by a stable id, in declaration order.
///
/// Order only matters for presentation (the lobby lists games in this
/// order); lookups are by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameRegistry {
    entries: Vec<(String, GameVariantEntry)>,
}

impl GameRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a game.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for an empty key and
    /// [`ValidationError::DuplicateKey`] if the key is already registered.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        entry: GameVariantEntry,
    ) -> Result<(), ValidationError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ValidationError::MissingField {
                field: "games.<key>".to_string(),
            });
        }
        if self.contains(&key) {
            return Err(ValidationError::DuplicateKey(key));
        }
        self.entries.push((key, entry));
        Ok(())
    }

    /// Get a game by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&GameVariantEntry> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, entry)| entry)
    }

    /// Check if a key is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterate `(key, entry)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GameVariantEntry)> {
        self.entries.iter().map(|(k, entry)| (k.as_str(), entry))
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of registered games.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no games are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the paths of game `key` for `username`.
    pub fn resolve(&self, key: &str, username: &str) -> Result<ResolvedGamePaths, ResolveError> {
        self.get(key)
            .ok_or_else(|| ResolveError::UnknownGame(key.to_string()))?
            .resolve_for(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entry(name: &str) -> GameVariantEntry {
        GameVariantEntry {
            name: name.to_string(),
            crawl_binary: PathBuf::from("/bin/crawl-git-launcher.sh"),
            rcfile_path: UserTemplate::new("/rcfiles/crawl-git/"),
            macro_path: UserTemplate::new("/rcfiles/crawl-git/"),
            morgue_path: UserTemplate::new("/morgue/%n/"),
            inprogress_path: UserTemplate::new("/inprogress/crawl-git/"),
            ttyrec_path: UserTemplate::new("/ttyrec/%n/"),
            socket_path: UserTemplate::new("/webserver/sockets"),
            client_path: None,
            morgue_url: Some(UserTemplate::new("http://example.org/morgue/%n/")),
            options: vec!["-sprint".to_string()],
            pre_options: vec!["git".to_string()],
            send_json_options: true,
        }
    }

    #[test]
    fn test_registry_preserves_insertion_order() {
        let mut registry = GameRegistry::new();
        for key in ["tut-git", "dcss-git", "spr-git"] {
            registry.insert(key, create_test_entry(key)).unwrap();
        }

        let keys: Vec<_> = registry.keys().collect();
        assert_eq!(keys, ["tut-git", "dcss-git", "spr-git"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut registry = GameRegistry::new();
        registry
            .insert("dcss-git", create_test_entry("DCSS trunk"))
            .unwrap();

        let result = registry.insert("dcss-git", create_test_entry("Other"));
        assert_eq!(
            result,
            Err(ValidationError::DuplicateKey("dcss-git".to_string()))
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("dcss-git").unwrap().name, "DCSS trunk");
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut registry = GameRegistry::new();
        assert!(registry.insert("", create_test_entry("x")).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_launch_arguments_put_pre_options_first() {
        let entry = create_test_entry("Sprint trunk");
        let args: Vec<_> = entry.launch_arguments().collect();
        assert_eq!(args, ["git", "-sprint"]);
    }

    #[test]
    fn test_resolve_unknown_game() {
        let registry = GameRegistry::new();
        assert_eq!(
            registry.resolve("dcss-git", "abc"),
            Err(ResolveError::UnknownGame("dcss-git".to_string()))
        );
    }

    #[test]
    fn test_resolve_through_registry() {
        let mut registry = GameRegistry::new();
        registry
            .insert("dcss-git", create_test_entry("DCSS trunk"))
            .unwrap();

        let paths = registry.resolve("dcss-git", "abc").unwrap();
        assert_eq!(paths.morgue_path, PathBuf::from("/morgue/abc/"));
        assert_eq!(paths.socket_path, PathBuf::from("/webserver/sockets"));
        assert_eq!(
            paths.morgue_url.as_deref(),
            Some("http://example.org/morgue/abc/")
        );
    }
}
