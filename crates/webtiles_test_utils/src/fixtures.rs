//! Test fixtures and helpers.
//!
//! Known-good configuration documents and schema values that tests mutate
//! into the specific broken shape they need.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use webtiles_config::data::{GameData, ServerData, SmtpData, TlsData};

/// Smallest document the loader accepts: one plain listener, one game.
pub const MINIMAL_RON: &str = r#"(
    bind_nonsecure: true,
    bind_pairs: [("0.0.0.0", 8080)],
    static_path: "/webserver/static",
    template_path: "/webserver/templates/",
    password_db: "/data/passwd.db3",
    games: [
        ("dcss-git", (
            name: "DCSS trunk",
            crawl_binary: "/bin/crawl-git-launcher.sh",
            send_json_options: true,
            rcfile_path: "/rcfiles/crawl-git/",
            morgue_path: "/morgue/%n/",
            inprogress_path: "/inprogress/crawl-git/",
            ttyrec_path: "/ttyrec/%n/",
            socket_path: "/webserver/sockets",
        )),
    ],
)"#;

/// A complete game entry whose morgue and ttyrec paths are per-user.
#[must_use]
pub fn game_data(name: &str, crawl_binary: &str) -> GameData {
    GameData {
        name: Some(name.to_string()),
        crawl_binary: Some(crawl_binary.to_string()),
        rcfile_path: Some("/rcfiles/crawl-git/".to_string()),
        macro_path: Some("/rcfiles/crawl-git/".to_string()),
        morgue_path: Some("/morgue/%n/".to_string()),
        inprogress_path: Some("/inprogress/crawl-git/".to_string()),
        ttyrec_path: Some("/ttyrec/%n/".to_string()),
        socket_path: Some("/webserver/sockets".to_string()),
        client_path: None,
        morgue_url: Some("http://crawl.example.org/morgue/%n/".to_string()),
        options: Vec::new(),
        pre_options: Vec::new(),
        send_json_options: true,
    }
}

/// Decoded equivalent of [`MINIMAL_RON`], with a morgue URL added.
#[must_use]
pub fn minimal_server_data() -> ServerData {
    ServerData {
        bind_nonsecure: true,
        bind_pairs: vec![("0.0.0.0".to_string(), 8080)],
        static_path: Some("/webserver/static".to_string()),
        template_path: Some("/webserver/templates/".to_string()),
        password_db: Some("/data/passwd.db3".to_string()),
        games: vec![(
            "dcss-git".to_string(),
            game_data("DCSS trunk", "/bin/crawl-git-launcher.sh"),
        )],
        ..ServerData::default()
    }
}

/// All three TLS files set.
#[must_use]
pub fn tls_data() -> TlsData {
    TlsData {
        certfile: Some("/etc/ssl/private/server.crt".to_string()),
        keyfile: Some("/etc/ssl/private/server.key".to_string()),
        ca_certs: Some("/etc/ssl/private/cas.pem".to_string()),
    }
}

/// SMTP settings complete enough for password reset.
#[must_use]
pub fn smtp_data() -> SmtpData {
    SmtpData {
        host: "smtp.example.org".to_string(),
        port: 587,
        use_ssl: true,
        user: Some("webtiles".to_string()),
        password: Some("change-me".to_string()),
        from_addr: Some("noreply@crawl.example.org".to_string()),
    }
}

/// Directory holding the shipped sample configurations.
#[must_use]
pub fn config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config")
}

/// Path of a shipped sample configuration.
#[must_use]
pub fn sample_config(name: &str) -> PathBuf {
    config_dir().join(name)
}

/// Deployment variables that complete `config/webtiles.ron`.
#[must_use]
pub fn template_variables() -> HashMap<String, String> {
    [
        ("CHROOT_WEBDIR", "/crawl/webserver"),
        ("CHROOT_LOGIN_DB", "/crawl/login/passwd.db3"),
        ("CHROOT_RCFILESDIR", "/crawl/rcfiles"),
        ("CHROOT_MORGUEDIR", "/crawl/morgue"),
        ("CHROOT_INPROGRESSDIR", "/crawl/inprogress"),
        ("CHROOT_TTYRECDIR", "/crawl/ttyrec"),
        ("CHROOT_CRAWL_BASEDIR", "/crawl/crawl-master"),
        ("CHROOT_CRAWL_GAMEDIR", "/crawl/crawl-master/crawl-git"),
        ("DGL_UID", "1000"),
        ("DGL_GID", "1000"),
        ("DGL_CHROOT", "/home/crawl/chroot"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Write `contents` to a temporary file ending in `.{extension}`.
///
/// The file is removed when the returned handle is dropped.
///
/// # Panics
///
/// Panics if the temporary file cannot be created or written.
#[must_use]
pub fn write_temp_config(contents: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("webtiles-")
        .suffix(&format!(".{extension}"))
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes())
        .expect("write temp config");
    file
}
