//! Schema validation: [`ServerData`] into [`ServerConfig`].
//!
//! Validation walks the whole document and records every violation before
//! failing, so one run reports everything that needs fixing. It is pure:
//! no file, socket or process is touched.

use std::path::PathBuf;
use std::time::Duration;

use crate::data::{BindPairData, GameData, LoggingData, ServerData, SmtpData, TlsData};
use crate::error::{ValidationError, ValidationErrors};
use crate::games::{GameRegistry, GameVariantEntry};
use crate::paths::{path_template_problem, UserTemplate};
use crate::server::{
    AccountPolicy, BindPair, ConnectionLimits, LogLevel, LoggingConfig, NetworkConfig,
    NickPattern, PasswordReset, ProcessOptions, RuntimeOptions, ServerConfig, ServerPaths,
    SmtpCredentials, SmtpSettings, TermSize, TlsOptions,
};

/// Port paired with every plain address when `ssl_bind_pairs` is omitted.
pub const DEFAULT_TLS_PORT: u16 = 443;

const MAX_PORT: i64 = u16::MAX as i64;
const MAX_U32: i64 = u32::MAX as i64;
const MAX_UMASK: i64 = 0o777;

impl TryFrom<ServerData> for ServerConfig {
    type Error = ValidationErrors;

    fn try_from(data: ServerData) -> Result<Self, Self::Error> {
        validate(data)
    }
}

/// Validate a decoded document.
///
/// # Errors
///
/// Returns every violation found, in document order.
pub fn validate(data: ServerData) -> Result<ServerConfig, ValidationErrors> {
    let ServerData {
        bind_nonsecure,
        bind_pairs,
        ssl_options,
        ssl_bind_pairs,
        logging,
        static_path,
        template_path,
        password_db,
        server_socket_path,
        dgl_status_file,
        milestone_files,
        init_player_program,
        server_id,
        dgl_mode,
        game_data_no_cache,
        watch_socket_dirs,
        no_cache,
        status_file_update_rate,
        recording_term_size,
        max_connections,
        connection_timeout,
        max_idle_time,
        http_connection_timeout,
        kill_timeout,
        nick_regex,
        max_passwd_length,
        crypt_algorithm,
        crypt_salt_length,
        login_token_lifetime,
        allow_password_reset,
        lobby_url,
        smtp,
        player_url,
        autologin,
        uid,
        gid,
        umask,
        chroot,
        pidfile,
        daemon,
        games,
    } = data;

    let mut c = Checker::new();

    let network = check_network(
        &mut c,
        bind_nonsecure,
        bind_pairs,
        ssl_options,
        ssl_bind_pairs,
    );

    let process = ProcessOptions {
        uid: uid.map(|v| c.number("uid", v, 0, MAX_U32)),
        gid: gid.map(|v| c.number("gid", v, 0, MAX_U32)),
        umask: umask.map(|v| c.number("umask", v, 0, MAX_UMASK)),
        chroot: check_chroot(&mut c, chroot),
        pidfile: c.optional_path("pidfile", pidfile),
        daemon,
    };

    let logging = check_logging(&mut c, logging);

    let limits = ConnectionLimits {
        max_connections: c.number("max_connections", max_connections, 1, MAX_U32),
        connection_timeout: c.seconds("connection_timeout", connection_timeout),
        max_idle_time: c.seconds("max_idle_time", max_idle_time),
        http_connection_timeout: c.seconds("http_connection_timeout", http_connection_timeout),
        kill_timeout: c.seconds("kill_timeout", kill_timeout),
    };

    let accounts = check_accounts(
        &mut c,
        AccountFields {
            nick_regex,
            max_passwd_length,
            crypt_algorithm,
            crypt_salt_length,
            login_token_lifetime,
            allow_password_reset,
            lobby_url,
            smtp,
            player_url,
            autologin,
        },
    );

    let paths = ServerPaths {
        static_path: c.required_path("static_path", static_path),
        template_path: c.required_path("template_path", template_path),
        password_db: c.required_path("password_db", password_db),
        server_socket_path: c.optional_path("server_socket_path", server_socket_path),
        dgl_status_file: c.optional_path("dgl_status_file", dgl_status_file),
        milestone_files: milestone_files
            .into_iter()
            .enumerate()
            .filter_map(|(i, file)| c.optional_path(&format!("milestone_files[{i}]"), Some(file)))
            .collect(),
        init_player_program: c.optional_path("init_player_program", init_player_program),
    };

    let runtime = RuntimeOptions {
        dgl_mode,
        server_id,
        game_data_no_cache,
        watch_socket_dirs,
        no_cache,
        status_file_update_rate: c.seconds("status_file_update_rate", status_file_update_rate),
        recording_term_size: TermSize {
            columns: c.number(
                "recording_term_size.columns",
                recording_term_size.0,
                1,
                MAX_PORT,
            ),
            rows: c.number("recording_term_size.rows", recording_term_size.1, 1, MAX_PORT),
        },
    };

    let games = check_games(&mut c, games);

    let config = accounts.map(|accounts| ServerConfig {
        network,
        process,
        logging,
        limits,
        accounts,
        paths,
        runtime,
        games,
    });

    c.finish(config)
}

/// Collects violations while converting fields.
///
/// Conversions that fail record a violation and hand back a placeholder
/// (zero, empty path) so the walk can continue. The partially built config
/// is discarded by [`Checker::finish`] whenever anything was recorded.
struct Checker {
    errors: ValidationErrors,
}

impl Checker {
    fn new() -> Self {
        Self {
            errors: ValidationErrors::new(),
        }
    }

    fn report(&mut self, error: ValidationError) {
        tracing::debug!("Config violation: {error}");
        self.errors.push(error);
    }

    fn missing(&mut self, field: impl Into<String>) {
        self.report(ValidationError::MissingField {
            field: field.into(),
        });
    }

    fn invalid(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.report(ValidationError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        });
    }

    fn invalid_path(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.report(ValidationError::InvalidPath {
            field: field.into(),
            reason: reason.into(),
        });
    }

    /// Range-checked integer conversion.
    fn number<T>(&mut self, field: &str, value: i64, min: i64, max: i64) -> T
    where
        T: TryFrom<i64> + Default,
    {
        let converted = if (min..=max).contains(&value) {
            T::try_from(value).ok()
        } else {
            None
        };
        match converted {
            Some(n) => n,
            None => {
                self.report(ValidationError::InvalidNumericRange {
                    field: field.to_string(),
                    value,
                    expected: format!("{min}..={max}"),
                });
                T::default()
            }
        }
    }

    fn seconds(&mut self, field: &str, value: i64) -> Duration {
        Duration::from_secs(self.number(field, value, 0, i64::MAX))
    }

    fn required_text(&mut self, field: &str, value: Option<String>) -> String {
        match value {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                self.missing(field);
                String::new()
            }
        }
    }

    fn required_path(&mut self, field: &str, value: Option<String>) -> PathBuf {
        match value {
            Some(path) if !path.trim().is_empty() => self.checked_path(field, path),
            _ => {
                self.missing(field);
                PathBuf::new()
            }
        }
    }

    fn optional_path(&mut self, field: &str, value: Option<String>) -> Option<PathBuf> {
        match value {
            Some(path) if path.trim().is_empty() => {
                self.invalid_path(field, "path must not be empty");
                None
            }
            Some(path) => Some(self.checked_path(field, path)),
            None => None,
        }
    }

    fn checked_path(&mut self, field: &str, path: String) -> PathBuf {
        if path.contains('\0') {
            self.invalid_path(field, "path contains a NUL byte");
        }
        PathBuf::from(path)
    }

    fn required_template(&mut self, field: &str, value: Option<String>) -> UserTemplate {
        match value {
            Some(template) if !template.trim().is_empty() => self.checked_template(field, template),
            _ => {
                self.missing(field);
                UserTemplate::new("")
            }
        }
    }

    fn optional_template(&mut self, field: &str, value: Option<String>) -> Option<UserTemplate> {
        value.map(|template| self.checked_template(field, template))
    }

    fn checked_template(&mut self, field: &str, template: String) -> UserTemplate {
        if let Some(problem) = path_template_problem(&template) {
            self.invalid_path(field, problem);
        }
        UserTemplate::new(template)
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, ValidationErrors> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(self.errors),
        }
    }
}

fn check_network(
    c: &mut Checker,
    bind_nonsecure: bool,
    bind_pairs: Vec<BindPairData>,
    ssl_options: Option<TlsData>,
    ssl_bind_pairs: Option<Vec<BindPairData>>,
) -> NetworkConfig {
    let bind_pairs = check_bind_pairs(c, "bind_pairs", bind_pairs);
    let tls = ssl_options.map(|tls| check_tls(c, tls));

    let ssl_bind_pairs = match ssl_bind_pairs {
        Some(pairs) => check_bind_pairs(c, "ssl_bind_pairs", pairs),
        None => {
            let mut derived: Vec<BindPair> = Vec::new();
            for pair in &bind_pairs {
                let secure = BindPair::new(pair.address.clone(), DEFAULT_TLS_PORT);
                if !derived.contains(&secure) {
                    derived.push(secure);
                }
            }
            derived
        }
    };

    if bind_nonsecure && bind_pairs.is_empty() {
        c.missing("bind_pairs");
    }
    if tls.is_some() && ssl_bind_pairs.is_empty() {
        c.missing("ssl_bind_pairs");
    }
    if !bind_nonsecure && tls.is_none() {
        c.invalid(
            "bind_nonsecure",
            "no listeners: plain listeners are disabled and ssl_options is not set",
        );
    }

    NetworkConfig {
        bind_nonsecure,
        bind_pairs,
        ssl_bind_pairs,
        tls,
    }
}

fn check_bind_pairs(c: &mut Checker, field: &str, pairs: Vec<BindPairData>) -> Vec<BindPair> {
    let mut checked: Vec<BindPair> = Vec::with_capacity(pairs.len());
    for (i, (address, port)) in pairs.into_iter().enumerate() {
        if address.trim().is_empty() {
            c.invalid(format!("{field}[{i}].address"), "address must not be empty");
        }
        let pair = BindPair::new(address, c.number(&format!("{field}[{i}].port"), port, 1, MAX_PORT));
        if checked.contains(&pair) {
            c.invalid(format!("{field}[{i}]"), format!("duplicate listener {pair}"));
        }
        checked.push(pair);
    }
    checked
}

fn check_tls(c: &mut Checker, tls: TlsData) -> TlsOptions {
    let mut field = |name: &str, value: Option<String>| -> PathBuf {
        let field = format!("ssl_options.{name}");
        match value {
            Some(path) if !path.trim().is_empty() => c.checked_path(&field, path),
            _ => {
                c.report(ValidationError::InconsistentTls { field });
                PathBuf::new()
            }
        }
    };

    TlsOptions {
        certfile: field("certfile", tls.certfile),
        keyfile: field("keyfile", tls.keyfile),
        ca_certs: field("ca_certs", tls.ca_certs),
    }
}

fn check_chroot(c: &mut Checker, chroot: Option<String>) -> Option<PathBuf> {
    let path = c.optional_path("chroot", chroot)?;
    if !path.is_absolute() {
        c.invalid_path(
            "chroot",
            format!("'{}' is not an absolute path", path.display()),
        );
    }
    Some(path)
}

fn check_logging(c: &mut Checker, logging: LoggingData) -> LoggingConfig {
    let level = match logging.level.parse::<LogLevel>() {
        Ok(level) => level,
        Err(reason) => {
            c.invalid("logging.level", reason);
            LogLevel::Info
        }
    };

    LoggingConfig {
        filename: c.optional_path("logging.filename", logging.filename),
        level,
        format: logging.format,
    }
}

struct AccountFields {
    nick_regex: String,
    max_passwd_length: i64,
    crypt_algorithm: Option<String>,
    crypt_salt_length: i64,
    login_token_lifetime: i64,
    allow_password_reset: bool,
    lobby_url: Option<String>,
    smtp: Option<SmtpData>,
    player_url: Option<String>,
    autologin: Option<String>,
}

/// Empty strings mean "not set" for optional text settings.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn check_accounts(c: &mut Checker, fields: AccountFields) -> Option<AccountPolicy> {
    let nick_pattern = match NickPattern::new(&fields.nick_regex) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            c.invalid("nick_regex", e.to_string());
            None
        }
    };

    let max_passwd_length = c.number("max_passwd_length", fields.max_passwd_length, 0, MAX_U32);
    let crypt_salt_length = c.number("crypt_salt_length", fields.crypt_salt_length, 0, MAX_U32);
    let login_token_lifetime_days =
        c.number("login_token_lifetime", fields.login_token_lifetime, 0, MAX_U32);

    let lobby_url = non_empty(fields.lobby_url);
    if let Some(url) = &lobby_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            c.invalid("lobby_url", format!("'{url}' is not an http(s) URL"));
        }
    }

    let password_reset = if fields.allow_password_reset {
        if lobby_url.is_none() {
            c.missing("lobby_url");
        }
        let smtp = match fields.smtp {
            Some(smtp) => Some(check_smtp(c, smtp)),
            None => {
                c.missing("smtp");
                None
            }
        };
        lobby_url
            .clone()
            .zip(smtp)
            .map(|(lobby_url, smtp)| PasswordReset { lobby_url, smtp })
    } else {
        if fields.smtp.is_some() {
            tracing::warn!("SMTP settings are ignored while allow_password_reset is false");
        }
        None
    };

    let player_url = non_empty(fields.player_url);
    if let Some(url) = &player_url {
        if !url.contains("%s") {
            c.invalid("player_url", "template must contain '%s' for the player name");
        }
    }

    let autologin = non_empty(fields.autologin);
    if let (Some(name), Some(pattern)) = (&autologin, &nick_pattern) {
        if !pattern.is_match(name) {
            c.invalid("autologin", format!("'{name}' does not match nick_regex"));
        }
        tracing::warn!("autologin is enabled: every visitor is logged in as '{name}'");
    }

    Some(AccountPolicy {
        nick_pattern: nick_pattern?,
        max_passwd_length,
        crypt_algorithm: non_empty(fields.crypt_algorithm),
        crypt_salt_length,
        login_token_lifetime_days,
        lobby_url,
        password_reset,
        player_url,
        autologin,
    })
}

fn check_smtp(c: &mut Checker, smtp: SmtpData) -> SmtpSettings {
    let host = c.required_text("smtp.host", Some(smtp.host));
    let port = c.number("smtp.port", smtp.port, 1, MAX_PORT);
    let from_addr = c.required_text("smtp.from_addr", smtp.from_addr);

    let credentials = match (non_empty(smtp.user), smtp.password) {
        (Some(user), Some(password)) => Some(SmtpCredentials { user, password }),
        (Some(_), None) => {
            c.missing("smtp.password");
            None
        }
        (None, _) => None,
    };

    SmtpSettings {
        host,
        port,
        use_ssl: smtp.use_ssl,
        credentials,
        from_addr,
    }
}

fn check_games(c: &mut Checker, games: Vec<(String, GameData)>) -> GameRegistry {
    let mut registry = GameRegistry::new();
    for (index, (key, game)) in games.into_iter().enumerate() {
        if key.trim().is_empty() {
            c.missing(format!("games[{index}].key"));
            continue;
        }
        let entry = check_game(c, &key, game);
        if let Err(e) = registry.insert(key, entry) {
            c.report(e);
        }
    }

    if registry.is_empty() {
        tracing::warn!("No games configured; the lobby will be empty");
    }
    tracing::debug!(games = registry.len(), "Checked game registry");
    registry
}

fn check_game(c: &mut Checker, key: &str, game: GameData) -> GameVariantEntry {
    let field = |name: &str| format!("games.{key}.{name}");

    let name = c.required_text(&field("name"), game.name);
    let crawl_binary = c.required_path(&field("crawl_binary"), game.crawl_binary);
    let rcfile_path = c.required_template(&field("rcfile_path"), game.rcfile_path);
    let macro_path = c
        .optional_template(&field("macro_path"), game.macro_path)
        .unwrap_or_else(|| rcfile_path.clone());
    let morgue_path = c.required_template(&field("morgue_path"), game.morgue_path);
    let inprogress_path = c.required_template(&field("inprogress_path"), game.inprogress_path);
    let ttyrec_path = c.required_template(&field("ttyrec_path"), game.ttyrec_path);
    let socket_path = c.required_template(&field("socket_path"), game.socket_path);
    let client_path = c.optional_template(&field("client_path"), game.client_path);

    let morgue_url = match game.morgue_url {
        Some(url) if url.trim().is_empty() => {
            c.invalid(field("morgue_url"), "URL must not be empty");
            None
        }
        Some(url) => Some(UserTemplate::new(url)),
        None => None,
    };

    for (list, flags) in [("pre_options", &game.pre_options), ("options", &game.options)] {
        for (i, flag) in flags.iter().enumerate() {
            if flag.is_empty() {
                c.invalid(format!("games.{key}.{list}[{i}]"), "launch flag must not be empty");
            }
        }
    }

    GameVariantEntry {
        name,
        crawl_binary,
        rcfile_path,
        macro_path,
        morgue_path,
        inprogress_path,
        ttyrec_path,
        socket_path,
        client_path,
        morgue_url,
        options: game.options,
        pre_options: game.pre_options,
        send_json_options: game.send_json_options,
    }
}
