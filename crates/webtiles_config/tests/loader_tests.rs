//! Loader and validator tests against whole documents.
//!
//! Covers the shipped sample configs, the rejection scenarios operators
//! hit most often, and format equivalence.

use std::path::PathBuf;
use std::sync::Arc;

use webtiles_config::data::{ServerData, TlsData};
use webtiles_config::error::{ConfigError, ValidationError};
use webtiles_config::loader::{load_from_file, load_from_str, ConfigFormat, ConfigLoader};
use webtiles_config::server::{BindPair, LogLevel, ServerConfig};
use webtiles_config::validate::validate;
use webtiles_test_utils::fixtures::{
    game_data, minimal_server_data, sample_config, smtp_data, template_variables, tls_data,
    write_temp_config, MINIMAL_RON,
};

fn violations(data: ServerData) -> Vec<ValidationError> {
    validate(data)
        .expect_err("config should be rejected")
        .into_iter()
        .collect()
}

// ==========================================================================
// Sample configs
// ==========================================================================

#[test]
fn template_config_loads_with_deployment_variables() {
    let config = ConfigLoader::new()
        .with_variables(template_variables())
        .load_file(sample_config("webtiles.ron"))
        .unwrap();

    let keys: Vec<_> = config.games.keys().collect();
    assert_eq!(
        keys,
        ["dcss-0.24", "spr-0.24", "tut-0.24", "dcss-git", "spr-git", "tut-git"]
    );
    assert_eq!(config.process.uid, Some(1000));
    assert_eq!(
        config.process.chroot,
        Some(PathBuf::from("/home/crawl/chroot"))
    );
    assert_eq!(
        config.paths.static_path,
        PathBuf::from("/crawl/webserver/static")
    );
    assert_eq!(config.paths.milestone_files.len(), 6);
    assert!(config.network.tls.is_none());
    assert!(!config.allow_password_reset());
}

#[test]
fn template_config_without_variables_names_them() {
    let err = load_from_file(sample_config("webtiles.ron")).unwrap_err();
    match err {
        ConfigError::UnknownVariable(names) => {
            assert!(names.contains(&"CHROOT_WEBDIR".to_string()));
            assert!(names.contains(&"DGL_UID".to_string()));
        }
        other => panic!("expected UnknownVariable, got {other}"),
    }
}

#[test]
fn production_config_loads() {
    let config = load_from_file(sample_config("webtiles-production.ron")).unwrap();

    let tls = config.network.tls.as_ref().expect("TLS enabled");
    assert_eq!(tls.keyfile, PathBuf::from("/etc/ssl/private/crawl.example.org.key"));
    assert_eq!(config.network.listeners().count(), 4);
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert_eq!(config.process.umask, Some(0o077));

    let reset = config.accounts.password_reset.as_ref().expect("password reset");
    assert_eq!(reset.lobby_url, "https://crawl.example.org/");
    assert_eq!(reset.smtp.port, 587);
    assert!(reset.smtp.credentials.is_some());
}

// ==========================================================================
// Scenarios
// ==========================================================================

#[test]
fn loading_is_idempotent() {
    let first = load_from_str(MINIMAL_RON, ConfigFormat::Ron).unwrap();
    let second = load_from_str(MINIMAL_RON, ConfigFormat::Ron).unwrap();
    assert_eq!(first, second);
}

#[test]
fn plain_listener_without_tls_is_accepted() {
    let config = load_from_str(MINIMAL_RON, ConfigFormat::Ron).unwrap();
    assert!(config.network.bind_nonsecure);
    assert!(config.network.tls.is_none());
    assert_eq!(config.network.bind_pairs, [BindPair::new("0.0.0.0", 8080)]);

    let listeners: Vec<_> = config.network.listeners().collect();
    assert_eq!(listeners, [(&BindPair::new("0.0.0.0", 8080), false)]);
}

#[test]
fn zero_max_connections_is_rejected() {
    let mut data = minimal_server_data();
    data.max_connections = 0;

    let errors = violations(data);
    assert!(matches!(
        errors.as_slice(),
        [ValidationError::InvalidNumericRange { field, value: 0, .. }] if field == "max_connections"
    ));
}

#[test]
fn duplicate_game_key_is_rejected() {
    let mut data = minimal_server_data();
    data.games.push((
        "dcss-git".to_string(),
        game_data("DCSS trunk (copy)", "/bin/crawl-git-launcher.sh"),
    ));

    let errors = violations(data);
    assert_eq!(errors, [ValidationError::DuplicateKey("dcss-git".to_string())]);
}

#[test]
fn partial_tls_is_rejected() {
    let mut data = minimal_server_data();
    data.ssl_options = Some(TlsData {
        keyfile: None,
        ..tls_data()
    });

    let errors = violations(data);
    assert_eq!(
        errors,
        [ValidationError::InconsistentTls {
            field: "ssl_options.keyfile".to_string()
        }]
    );
}

#[test]
fn empty_tls_field_is_rejected() {
    let mut data = minimal_server_data();
    data.ssl_options = Some(TlsData {
        ca_certs: Some(String::new()),
        ..tls_data()
    });

    let errors = violations(data);
    assert!(errors.contains(&ValidationError::InconsistentTls {
        field: "ssl_options.ca_certs".to_string()
    }));
}

#[test]
fn complete_tls_derives_secure_listeners() {
    let mut data = minimal_server_data();
    data.ssl_options = Some(tls_data());

    let config = validate(data).unwrap();
    assert_eq!(
        config.network.ssl_bind_pairs,
        [BindPair::new("0.0.0.0", 443)]
    );
    assert_eq!(config.network.listeners().count(), 2);
}

#[test]
fn password_reset_without_lobby_url_is_rejected() {
    let mut data = minimal_server_data();
    data.allow_password_reset = true;
    data.smtp = Some(smtp_data());

    let errors = violations(data);
    assert_eq!(
        errors,
        [ValidationError::MissingField {
            field: "lobby_url".to_string()
        }]
    );
}

#[test]
fn smtp_is_inert_without_password_reset() {
    let mut data = minimal_server_data();
    data.smtp = Some(smtp_data());

    let config = validate(data).unwrap();
    assert!(!config.allow_password_reset());
    assert!(config.accounts.password_reset.is_none());
}

#[test]
fn negative_numbers_are_rejected() {
    let mut data = minimal_server_data();
    data.gid = Some(-5);
    data.kill_timeout = -1;
    data.max_passwd_length = -20;
    data.login_token_lifetime = -7;

    let fields: Vec<_> = violations(data)
        .iter()
        .map(|e| e.field().to_string())
        .collect();
    assert_eq!(
        fields,
        ["gid", "kill_timeout", "max_passwd_length", "login_token_lifetime"]
    );
}

#[test]
fn missing_crawl_binary_is_rejected() {
    let mut data = minimal_server_data();
    data.games[0].1.crawl_binary = Some(String::new());

    let errors = violations(data);
    assert_eq!(
        errors,
        [ValidationError::MissingField {
            field: "games.dcss-git.crawl_binary".to_string()
        }]
    );
}

// ==========================================================================
// Formats and files
// ==========================================================================

#[test]
fn json_and_ron_encodings_load_equal() {
    let data = minimal_server_data();
    let json = serde_json::to_string_pretty(&data).unwrap();
    let ron_text = ron::to_string(&data).unwrap();

    let from_json = load_from_str(&json, ConfigFormat::Json).unwrap();
    let from_ron = load_from_str(&ron_text, ConfigFormat::Ron).unwrap();
    assert_eq!(from_json, from_ron);
    assert_eq!(from_json, validate(data).unwrap());
}

#[test]
fn load_file_picks_format_from_extension() {
    let json = serde_json::to_string(&minimal_server_data()).unwrap();
    let file = write_temp_config(&json, "json");

    let config = load_from_file(file.path()).unwrap();
    assert!(config.game("dcss-git").is_some());
}

#[test]
fn parse_error_names_origin() {
    let file = write_temp_config("(bind_pairs: [", "ron");

    let err = load_from_file(file.path()).unwrap_err();
    match err {
        ConfigError::Parse { format, origin, .. } => {
            assert_eq!(format, ConfigFormat::Ron);
            assert_eq!(origin, file.path().display().to_string());
        }
        other => panic!("expected Parse, got {other}"),
    }
}

#[test]
fn config_can_be_shared_across_threads() {
    let config: Arc<ServerConfig> = Arc::new(load_from_str(MINIMAL_RON, ConfigFormat::Ron).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let config = Arc::clone(&config);
            std::thread::spawn(move || config.is_valid_nick("abc"))
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
