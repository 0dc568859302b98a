//! Validated server configuration.
//!
//! A [`ServerConfig`] is built once at startup by the loader and then only
//! read. Share it with `&ServerConfig` or `Arc<ServerConfig>`; it is never
//! stored in a global.

use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use regex::Regex;

use crate::error::{ValidationError, ValidationErrors};
use crate::games::{GameRegistry, GameVariantEntry};

/// Complete configuration for one serving process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listeners and TLS.
    pub network: NetworkConfig,
    /// Uid/gid drop, chroot, daemonizing.
    pub process: ProcessOptions,
    /// Log sink.
    pub logging: LoggingConfig,
    /// Connection count and timeouts.
    pub limits: ConnectionLimits,
    /// Usernames, passwords and password reset.
    pub accounts: AccountPolicy,
    /// Server-wide file locations.
    pub paths: ServerPaths,
    /// Miscellaneous runtime switches.
    pub runtime: RuntimeOptions,
    /// Playable games, in lobby order.
    pub games: GameRegistry,
}

impl ServerConfig {
    /// Look up a game by key.
    #[must_use]
    pub fn game(&self, key: &str) -> Option<&GameVariantEntry> {
        self.games.get(key)
    }

    /// Whether `name` is an acceptable username.
    #[must_use]
    pub fn is_valid_nick(&self, name: &str) -> bool {
        self.accounts.nick_pattern.is_match(name)
    }

    /// Whether password reset mail is configured and enabled.
    #[must_use]
    pub fn allow_password_reset(&self) -> bool {
        self.accounts.password_reset.is_some()
    }

    /// Link to a player's page, if `player_url` is configured.
    ///
    /// The name is lowercased before substitution.
    #[must_use]
    pub fn player_page_url(&self, name: &str) -> Option<String> {
        self.accounts
            .player_url
            .as_ref()
            .map(|url| url.replace("%s", &name.to_lowercase()))
    }
}

/// An address and port to listen on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindPair {
    /// Host name or IP literal.
    pub address: String,
    /// TCP port.
    pub port: u16,
}

impl BindPair {
    /// Create a bind pair.
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

impl fmt::Display for BindPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.address.contains(':') {
            write!(f, "[{}]:{}", self.address, self.port)
        } else {
            write!(f, "{}:{}", self.address, self.port)
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Whether the plain listeners are used.
    pub bind_nonsecure: bool,
    /// Plain listeners.
    pub bind_pairs: Vec<BindPair>,
    /// TLS listeners.
    pub ssl_bind_pairs: Vec<BindPair>,
    /// TLS material; `None` when TLS is disabled.
    pub tls: Option<TlsOptions>,
}

impl NetworkConfig {
    /// Every listener the server should open, with whether it is TLS.
    pub fn listeners(&self) -> impl Iterator<Item = (&BindPair, bool)> {
        let plain = self
            .bind_pairs
            .iter()
            .filter(move |_| self.bind_nonsecure)
            .map(|pair| (pair, false));
        let secure = self
            .ssl_bind_pairs
            .iter()
            .filter(move |_| self.tls.is_some())
            .map(|pair| (pair, true));
        plain.chain(secure)
    }
}

/// Certificate, key and CA bundle for TLS termination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsOptions {
    /// Certificate chain file.
    pub certfile: PathBuf,
    /// Private key file.
    pub keyfile: PathBuf,
    /// CA bundle file.
    pub ca_certs: PathBuf,
}

impl TlsOptions {
    /// Check that all three files can be opened for reading.
    ///
    /// Loading never touches the filesystem; call this right before
    /// terminating TLS. Every unreadable file is reported.
    pub fn ensure_readable(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (field, path) in [
            ("ssl_options.certfile", &self.certfile),
            ("ssl_options.keyfile", &self.keyfile),
            ("ssl_options.ca_certs", &self.ca_certs),
        ] {
            if let Err(e) = File::open(path) {
                errors.push(ValidationError::InvalidPath {
                    field: field.to_string(),
                    reason: format!("cannot read '{}': {e}", path.display()),
                });
            }
        }
        errors.into_result(())
    }
}

/// Outgoing mail settings, present only when password reset is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    /// Mail server host.
    pub host: String,
    /// Mail server port.
    pub port: u16,
    /// Connect with TLS.
    pub use_ssl: bool,
    /// Login; `None` sends without authentication.
    pub credentials: Option<SmtpCredentials>,
    /// Sender address.
    pub from_addr: String,
}

/// SMTP login.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    /// Login name.
    pub user: String,
    /// Login password.
    pub password: String,
}

impl fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Password reset settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReset {
    /// Base URL for recovery links.
    pub lobby_url: String,
    /// Mail settings.
    pub smtp: SmtpSettings,
}

/// Process lifecycle settings applied by the serving process after it
/// binds its sockets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    /// User id to switch to.
    pub uid: Option<u32>,
    /// Group id to switch to.
    pub gid: Option<u32>,
    /// Process umask.
    pub umask: Option<u32>,
    /// Absolute directory to chroot into.
    pub chroot: Option<PathBuf>,
    /// Pid file.
    pub pidfile: Option<PathBuf>,
    /// Detach after startup.
    pub daemon: bool,
}

/// Log level of the serving process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Informational messages.
    Info,
    /// Debug output.
    Debug,
    /// Everything.
    Trace,
}

impl LogLevel {
    /// Matching `tracing` level.
    #[must_use]
    pub fn as_tracing_level(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" | "critical" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(format!(
                "unknown log level '{other}' (expected error, warn, info, debug or trace)"
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Log sink of the serving process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log file; `None` logs to stderr.
    pub filename: Option<PathBuf>,
    /// Minimum level.
    pub level: LogLevel,
    /// Line format.
    pub format: String,
}

/// Connection count and timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionLimits {
    /// Maximum concurrent connections (never zero).
    pub max_connections: u32,
    /// Unauthenticated connection timeout.
    pub connection_timeout: Duration,
    /// Idle player timeout.
    pub max_idle_time: Duration,
    /// Stale HTTP connection timeout.
    pub http_connection_timeout: Duration,
    /// Delay between HUP and kill when stopping a game.
    pub kill_timeout: Duration,
}

/// Compiled username pattern.
///
/// Compares equal by pattern text.
#[derive(Debug, Clone)]
pub struct NickPattern(Regex);

impl NickPattern {
    /// Compile a pattern.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    /// Whether `name` matches.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        self.0.is_match(name)
    }

    /// The pattern source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for NickPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for NickPattern {}

/// Account rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPolicy {
    /// Pattern usernames must match.
    pub nick_pattern: NickPattern,
    /// Longest accepted password.
    pub max_passwd_length: u32,
    /// crypt(3) algorithm id; `None` selects traditional DES.
    pub crypt_algorithm: Option<String>,
    /// Salt length for `crypt_algorithm`.
    pub crypt_salt_length: u32,
    /// Login token validity in days.
    pub login_token_lifetime_days: u32,
    /// Public lobby URL.
    pub lobby_url: Option<String>,
    /// Password reset, when enabled.
    pub password_reset: Option<PasswordReset>,
    /// Player page URL containing `%s`.
    pub player_url: Option<String>,
    /// Development auto-login user.
    pub autologin: Option<String>,
}

impl AccountPolicy {
    /// Login token validity.
    #[must_use]
    pub fn login_token_lifetime(&self) -> Duration {
        Duration::from_secs(u64::from(self.login_token_lifetime_days) * 24 * 60 * 60)
    }
}

/// Server-wide file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerPaths {
    /// Static web assets.
    pub static_path: PathBuf,
    /// HTML templates.
    pub template_path: PathBuf,
    /// Account database.
    pub password_db: PathBuf,
    /// Server-side socket directory; `None` uses the temp dir.
    pub server_socket_path: Option<PathBuf>,
    /// dgamelaunch status file.
    pub dgl_status_file: Option<PathBuf>,
    /// Milestone logs.
    pub milestone_files: Vec<PathBuf>,
    /// Player initialization program.
    pub init_player_program: Option<PathBuf>,
}

/// Terminal size used for recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    /// Columns.
    pub columns: u16,
    /// Rows.
    pub rows: u16,
}

/// Miscellaneous runtime switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Run alongside dgamelaunch.
    pub dgl_mode: bool,
    /// Server name recorded in ttyrec metadata.
    pub server_id: String,
    /// Disable caching of game data files.
    pub game_data_no_cache: bool,
    /// Watch socket dirs for games not started by the server.
    pub watch_socket_dirs: bool,
    /// Disable caching of static files.
    pub no_cache: bool,
    /// Status file refresh interval.
    pub status_file_update_rate: Duration,
    /// Recording terminal size.
    pub recording_term_size: TermSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_pair_display() {
        assert_eq!(BindPair::new("0.0.0.0", 8080).to_string(), "0.0.0.0:8080");
        assert_eq!(BindPair::new("::", 443).to_string(), "[::]:443");
    }

    #[test]
    fn test_listeners_respect_flags() {
        let mut network = NetworkConfig {
            bind_nonsecure: true,
            bind_pairs: vec![BindPair::new("0.0.0.0", 8080)],
            ssl_bind_pairs: vec![BindPair::new("0.0.0.0", 443)],
            tls: None,
        };
        let ports: Vec<_> = network.listeners().map(|(p, tls)| (p.port, tls)).collect();
        assert_eq!(ports, [(8080, false)]);

        network.bind_nonsecure = false;
        network.tls = Some(TlsOptions {
            certfile: PathBuf::from("/etc/ssl/server.crt"),
            keyfile: PathBuf::from("/etc/ssl/server.key"),
            ca_certs: PathBuf::from("/etc/ssl/cas.pem"),
        });
        let ports: Vec<_> = network.listeners().map(|(p, tls)| (p.port, tls)).collect();
        assert_eq!(ports, [(443, true)]);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("INFO".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!(LogLevel::Debug.as_tracing_level(), tracing::Level::DEBUG);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_nick_pattern_equality_by_source() {
        let a = NickPattern::new("^[a-z]+$").unwrap();
        let b = NickPattern::new("^[a-z]+$").unwrap();
        assert_eq!(a, b);
        assert!(a.is_match("abc"));
        assert!(!a.is_match("ABC"));
    }

    #[test]
    fn test_smtp_credentials_debug_hides_password() {
        let creds = SmtpCredentials {
            user: "mailer".to_string(),
            password: "hunter2".to_string(),
        };
        let text = format!("{creds:?}");
        assert!(text.contains("mailer"));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn test_ensure_readable_reports_missing_files() {
        let tls = TlsOptions {
            certfile: PathBuf::from("/nonexistent/webtiles/server.crt"),
            keyfile: PathBuf::from("/nonexistent/webtiles/server.key"),
            ca_certs: PathBuf::from("/nonexistent/webtiles/cas.pem"),
        };
        let errors = tls.ensure_readable().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.for_field("ssl_options.keyfile").count(), 1);
    }
}
