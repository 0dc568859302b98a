//! Serialized form of one game variant.

use serde::{Deserialize, Serialize};

/// One playable game configuration as written in the source.
///
/// Path fields are templates: `%n` is replaced by the player's username
/// when a game is launched for them.
///
/// # Example RON
///
/// ```ron
/// ("dcss-git", (
///     name: "DCSS trunk",
///     crawl_binary: "/bin/crawl-git-launcher.sh",
///     send_json_options: true,
///     rcfile_path: "/rcfiles/crawl-git/",
///     morgue_path: "/morgue/%n/",
///     inprogress_path: "/inprogress/crawl-git/",
///     ttyrec_path: "/ttyrec/%n/",
///     socket_path: "/webserver/sockets",
///     options: ["-sprint"],
/// ))
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameData {
    /// Display name shown in the lobby.
    pub name: Option<String>,

    /// Executable launched for this game.
    pub crawl_binary: Option<String>,

    /// Directory holding per-user rc files.
    pub rcfile_path: Option<String>,

    /// Directory holding per-user macro files. Defaults to `rcfile_path`.
    pub macro_path: Option<String>,

    /// Where morgue files are written.
    pub morgue_path: Option<String>,

    /// Where in-progress markers are written.
    pub inprogress_path: Option<String>,

    /// Where terminal recordings are written.
    pub ttyrec_path: Option<String>,

    /// Directory for the game's unix socket.
    pub socket_path: Option<String>,

    /// Directory of the web client served for this game.
    pub client_path: Option<String>,

    /// Public URL of a player's morgue directory.
    pub morgue_url: Option<String>,

    /// Launch flags appended after `pre_options`.
    pub options: Vec<String>,

    /// Launch flags placed first on the command line.
    pub pre_options: Vec<String>,

    /// Whether the game is told to emit JSON option updates.
    pub send_json_options: bool,
}
