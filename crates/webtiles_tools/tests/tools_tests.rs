//! Operator tool commands against real config files.

use webtiles_config::error::{ConfigError, ResolveError, ValidationError};
use webtiles_test_utils::fixtures::{
    sample_config, template_variables, write_temp_config, MINIMAL_RON,
};
use webtiles_tools::error::ToolError;
use webtiles_tools::report;
use webtiles_tools::validate::{resolve_game, validate_config_file};

fn template_defines() -> Vec<(String, String)> {
    template_variables().into_iter().collect()
}

#[test]
fn validates_template_with_defines() {
    let config =
        validate_config_file(&sample_config("webtiles.ron"), &template_defines(), false).unwrap();
    assert_eq!(config.games.len(), 6);
}

#[test]
fn missing_define_fails() {
    let err = validate_config_file(&sample_config("webtiles.ron"), &[], false).unwrap_err();
    assert!(matches!(
        err,
        ToolError::Config(ConfigError::UnknownVariable(_))
    ));
}

#[test]
fn check_files_reports_unreadable_tls_files() {
    let err =
        validate_config_file(&sample_config("webtiles-production.ron"), &[], true).unwrap_err();
    let ToolError::Config(config_err) = err else {
        panic!("expected a config error");
    };
    let violations = config_err.violations().expect("violations");
    assert_eq!(violations.len(), 3);
    assert!(matches!(
        violations.for_field("ssl_options.keyfile").next(),
        Some(ValidationError::InvalidPath { .. })
    ));
}

#[test]
fn invalid_file_reports_every_violation() {
    let broken = MINIMAL_RON.replace("(\"0.0.0.0\", 8080)", "(\"0.0.0.0\", 0)");
    let broken = broken.replace("\"/data/passwd.db3\"", "\"\"");
    let file = write_temp_config(&broken, "ron");

    let err = validate_config_file(file.path(), &[], false).unwrap_err();
    let ToolError::Config(config_err) = err else {
        panic!("expected a config error");
    };
    assert_eq!(config_err.violations().map(|v| v.len()), Some(2));
}

#[test]
fn resolve_checks_nick_then_game() {
    let file = write_temp_config(MINIMAL_RON, "ron");
    let config = validate_config_file(file.path(), &[], false).unwrap();

    let paths = resolve_game(&config, "dcss-git", "alice").unwrap();
    assert_eq!(paths.morgue_path, std::path::PathBuf::from("/morgue/alice/"));

    assert!(matches!(
        resolve_game(&config, "dcss-git", "a"),
        Err(ToolError::InvalidNickname(_))
    ));
    assert!(matches!(
        resolve_game(&config, "zd-git", "alice"),
        Err(ToolError::Resolve(ResolveError::UnknownGame(_)))
    ));
}

#[test]
fn listing_matches_template_order() {
    let config =
        validate_config_file(&sample_config("webtiles.ron"), &template_defines(), false).unwrap();
    let listing = report::game_listing(&config.games);
    let keys: Vec<_> = listing
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(
        keys,
        ["dcss-0.24", "spr-0.24", "tut-0.24", "dcss-git", "spr-git", "tut-git"]
    );
}
