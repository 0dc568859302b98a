//! Plain-text reports printed by the tools.

use std::fmt::Write;

use webtiles_config::games::{GameRegistry, GameVariantEntry};
use webtiles_config::paths::ResolvedGamePaths;
use webtiles_config::server::ServerConfig;

/// One-paragraph overview of a validated config.
#[must_use]
pub fn config_summary(config: &ServerConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "listeners:");
    for (pair, secure) in config.network.listeners() {
        let scheme = if secure { "https" } else { "http" };
        let _ = writeln!(out, "  {scheme}://{pair}");
    }
    let _ = writeln!(out, "games: {}", config.games.len());
    let _ = writeln!(out, "max connections: {}", config.limits.max_connections);
    let _ = writeln!(out, "log level: {}", config.logging.level);
    let reset = if config.allow_password_reset() {
        "enabled"
    } else {
        "disabled"
    };
    let _ = writeln!(out, "password reset: {reset}");
    out
}

/// Games in lobby order, one per line: key, then display name.
#[must_use]
pub fn game_listing(games: &GameRegistry) -> String {
    let width = games.keys().map(str::len).max().unwrap_or(0);
    let mut out = String::new();
    for (key, entry) in games.iter() {
        let _ = writeln!(out, "{key:<width$}  {}", entry.name);
    }
    out
}

/// The command line a game is launched with.
#[must_use]
pub fn launch_command(entry: &GameVariantEntry) -> String {
    let mut command = entry.crawl_binary.display().to_string();
    for arg in entry.launch_arguments() {
        command.push(' ');
        command.push_str(arg);
    }
    command
}

/// Resolved paths of one game, one `field: value` per line.
#[must_use]
pub fn resolved_paths(key: &str, entry: &GameVariantEntry, paths: &ResolvedGamePaths) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{key} ({}) for {}", entry.name, paths.username);
    let _ = writeln!(out, "  command: {}", launch_command(entry));
    for (field, value) in paths.fields() {
        let _ = writeln!(out, "  {field}: {value}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use webtiles_config::loader::{load_from_str, ConfigFormat};

    const CONFIG: &str = r#"(
        bind_pairs: [("0.0.0.0", 8080)],
        static_path: "/webserver/static",
        template_path: "/webserver/templates/",
        password_db: "/data/passwd.db3",
        games: [
            ("dcss-git", (
                name: "DCSS trunk",
                crawl_binary: "/bin/crawl",
                pre_options: ["-dir", "/crawl"],
                rcfile_path: "/rcfiles/",
                morgue_path: "/morgue/%n/",
                inprogress_path: "/inprogress/",
                ttyrec_path: "/ttyrec/%n/",
                socket_path: "/sockets",
            )),
            ("spr", (
                name: "Sprint",
                crawl_binary: "/bin/crawl",
                options: ["-sprint"],
                rcfile_path: "/rcfiles/",
                morgue_path: "/morgue/%n/",
                inprogress_path: "/inprogress/",
                ttyrec_path: "/ttyrec/%n/",
                socket_path: "/sockets",
            )),
        ],
    )"#;

    fn create_test_config() -> ServerConfig {
        load_from_str(CONFIG, ConfigFormat::Ron).unwrap()
    }

    #[test]
    fn test_game_listing_keeps_order() {
        let listing = game_listing(&create_test_config().games);
        assert_eq!(listing, "dcss-git  DCSS trunk\nspr       Sprint\n");
    }

    #[test]
    fn test_launch_command() {
        let config = create_test_config();
        assert_eq!(
            launch_command(config.game("dcss-git").unwrap()),
            "/bin/crawl -dir /crawl"
        );
        assert_eq!(
            launch_command(config.game("spr").unwrap()),
            "/bin/crawl -sprint"
        );
    }

    #[test]
    fn test_resolved_paths_report() {
        let config = create_test_config();
        let entry = config.game("dcss-git").unwrap();
        let paths = entry.resolve_for("alice").unwrap();

        let report = resolved_paths("dcss-git", entry, &paths);
        assert!(report.starts_with("dcss-git (DCSS trunk) for alice\n"));
        assert!(report.contains("  morgue_path: /morgue/alice/\n"));
        assert!(report.contains("  ttyrec_path: /ttyrec/alice/\n"));
        assert!(!report.contains("client_path"));
    }

    #[test]
    fn test_config_summary() {
        let summary = config_summary(&create_test_config());
        assert!(summary.contains("  http://0.0.0.0:8080\n"));
        assert!(summary.contains("games: 2\n"));
        assert!(summary.contains("password reset: disabled\n"));
    }
}
