//! Serialized form of the top-level server configuration.

use serde::{Deserialize, Serialize};

use super::game_data::GameData;

/// An `(address, port)` pair as written in the source.
pub type BindPairData = (String, i64);

/// Top-level configuration document.
///
/// Omitted fields take the defaults from [`ServerData::default`], which
/// mirror a stock single-host deployment.
///
/// # Example RON
///
/// ```ron
/// (
///     bind_pairs: [("0.0.0.0", 8080)],
///     static_path: "/webserver/static",
///     template_path: "/webserver/templates/",
///     password_db: "/data/passwd.db3",
///     games: [
///         ("dcss-git", (name: "DCSS trunk", ...)),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerData {
    /// Listen on the plain (non-TLS) bind pairs.
    pub bind_nonsecure: bool,

    /// Plain listeners.
    pub bind_pairs: Vec<BindPairData>,

    /// TLS material. `None` disables TLS.
    pub ssl_options: Option<TlsData>,

    /// TLS listeners. When omitted, every plain address is paired with 443.
    pub ssl_bind_pairs: Option<Vec<BindPairData>>,

    /// Server log sink.
    pub logging: LoggingData,

    /// Static web assets directory.
    pub static_path: Option<String>,

    /// HTML template directory.
    pub template_path: Option<String>,

    /// Account database file.
    pub password_db: Option<String>,

    /// Directory for server-side unix sockets. `None` uses the temp dir.
    pub server_socket_path: Option<String>,

    /// Status file shared with a dgamelaunch installation.
    pub dgl_status_file: Option<String>,

    /// Milestone logs to tail for the lobby feed.
    pub milestone_files: Vec<String>,

    /// Program run to initialize a new player's files.
    pub init_player_program: Option<String>,

    /// Server name recorded in ttyrec metadata.
    pub server_id: String,

    /// Run alongside dgamelaunch.
    pub dgl_mode: bool,

    /// Disable caching of game data files.
    pub game_data_no_cache: bool,

    /// Watch socket directories for games not started by the server.
    pub watch_socket_dirs: bool,

    /// Disable caching of static files (development only).
    pub no_cache: bool,

    /// Seconds between status file refreshes.
    pub status_file_update_rate: i64,

    /// Terminal size `(columns, rows)` for recordings.
    pub recording_term_size: (i64, i64),

    /// Maximum concurrent client connections.
    pub max_connections: i64,

    /// Seconds before an unauthenticated connection is dropped.
    pub connection_timeout: i64,

    /// Seconds of inactivity before a player is disconnected.
    pub max_idle_time: i64,

    /// Seconds until stale HTTP connections are closed.
    pub http_connection_timeout: i64,

    /// Seconds between HUP and kill when stopping a game.
    pub kill_timeout: i64,

    /// Pattern every username must match.
    pub nick_regex: String,

    /// Longest accepted password.
    pub max_passwd_length: i64,

    /// crypt(3) algorithm id. `None` selects traditional DES.
    pub crypt_algorithm: Option<String>,

    /// Salt length used with `crypt_algorithm`.
    pub crypt_salt_length: i64,

    /// Days a "remember me" login token stays valid.
    pub login_token_lifetime: i64,

    /// Let users request password reset emails.
    pub allow_password_reset: bool,

    /// Public lobby URL, the base for password reset links.
    pub lobby_url: Option<String>,

    /// Outgoing mail settings for password reset.
    pub smtp: Option<SmtpData>,

    /// Player page URL with `%s` for the lowercased name.
    pub player_url: Option<String>,

    /// Log every visitor in as this user (development only).
    pub autologin: Option<String>,

    /// Numeric user id to drop to after binding.
    pub uid: Option<i64>,

    /// Numeric group id to drop to after binding.
    pub gid: Option<i64>,

    /// Process umask.
    pub umask: Option<i64>,

    /// Directory to chroot into after startup.
    pub chroot: Option<String>,

    /// Pid file path.
    pub pidfile: Option<String>,

    /// Detach from the session after startup.
    pub daemon: bool,

    /// Game registry, as ordered `(key, entry)` pairs.
    pub games: Vec<(String, GameData)>,
}

impl Default for ServerData {
    fn default() -> Self {
        Self {
            bind_nonsecure: true,
            bind_pairs: Vec::new(),
            ssl_options: None,
            ssl_bind_pairs: None,
            logging: LoggingData::default(),
            static_path: None,
            template_path: None,
            password_db: None,
            server_socket_path: None,
            dgl_status_file: None,
            milestone_files: Vec::new(),
            init_player_program: None,
            server_id: String::new(),
            dgl_mode: true,
            game_data_no_cache: false,
            watch_socket_dirs: false,
            no_cache: false,
            status_file_update_rate: 5,
            recording_term_size: (80, 24),
            max_connections: 500,
            connection_timeout: 600,
            max_idle_time: 5 * 60 * 60,
            http_connection_timeout: 600,
            kill_timeout: 10,
            nick_regex: r"^[a-zA-Z0-9]{3,20}$".to_string(),
            max_passwd_length: 20,
            crypt_algorithm: Some("6".to_string()),
            crypt_salt_length: 16,
            login_token_lifetime: 7,
            allow_password_reset: false,
            lobby_url: None,
            smtp: None,
            player_url: None,
            autologin: None,
            uid: None,
            gid: None,
            umask: None,
            chroot: None,
            pidfile: None,
            daemon: false,
            games: Vec::new(),
        }
    }
}

/// TLS file paths. All three are required once the section is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TlsData {
    /// Certificate chain file.
    pub certfile: Option<String>,
    /// Private key file.
    pub keyfile: Option<String>,
    /// CA bundle file.
    pub ca_certs: Option<String>,
}

/// Outgoing mail settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmtpData {
    /// Mail server host.
    pub host: String,
    /// Mail server port.
    pub port: i64,
    /// Connect with TLS.
    pub use_ssl: bool,
    /// Login name. `None` or empty disables authentication.
    pub user: Option<String>,
    /// Login password.
    pub password: Option<String>,
    /// Sender address for automated mail.
    pub from_addr: Option<String>,
}

impl Default for SmtpData {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 25,
            use_ssl: false,
            user: None,
            password: None,
            from_addr: None,
        }
    }
}

/// Server log sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingData {
    /// Log file. `None` logs to stderr.
    pub filename: Option<String>,
    /// Minimum level: `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
    /// Line format understood by the serving process.
    pub format: String,
}

impl Default for LoggingData {
    fn default() -> Self {
        Self {
            filename: None,
            level: "info".to_string(),
            format: "{timestamp} {level}: {message}".to_string(),
        }
    }
}
