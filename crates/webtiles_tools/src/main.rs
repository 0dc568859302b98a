//! Webtiles server - operator tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use webtiles_tools::{report, validate};

#[derive(Parser)]
#[command(name = "webtiles-tools")]
#[command(about = "Operator tools for webtiles server configuration")]
struct Cli {
    /// Log loader and validator detail
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Deployment variable substituted for %%NAME%%
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE", global = true,
          value_parser = parse_define)]
    defines: Vec<(String, String)>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file
    Validate {
        /// Path to the config file
        #[arg(default_value = "config/webtiles.ron")]
        path: PathBuf,

        /// Also check that the TLS files are readable
        #[arg(long)]
        check_files: bool,
    },
    /// List games in lobby order
    Games {
        /// Path to the config file
        path: PathBuf,
    },
    /// Show a game's paths for one user
    Resolve {
        /// Path to the config file
        path: PathBuf,

        /// Game key
        #[arg(short, long)]
        game: String,

        /// Username
        #[arg(short, long)]
        user: String,
    },
}

fn parse_define(arg: &str) -> Result<(String, String), String> {
    validate::parse_define(arg).map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::debug!(defines = cli.defines.len(), "Starting");

    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> webtiles_tools::error::Result<()> {
    match cli.command {
        Commands::Validate { path, check_files } => {
            tracing::info!("Validating config: {}", path.display());
            let config = validate::validate_config_file(&path, &cli.defines, check_files)?;
            print!("{}", report::config_summary(&config));
            tracing::info!("Validation passed");
        }
        Commands::Games { path } => {
            let config = validate::validate_config_file(&path, &cli.defines, false)?;
            print!("{}", report::game_listing(&config.games));
        }
        Commands::Resolve { path, game, user } => {
            let config = validate::validate_config_file(&path, &cli.defines, false)?;
            let paths = validate::resolve_game(&config, &game, &user)?;
            if let Some(entry) = config.game(&game) {
                print!("{}", report::resolved_paths(&game, entry, &paths));
            }
        }
    }
    Ok(())
}
