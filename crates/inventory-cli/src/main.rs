//! labinv CLI - sign in to the lab inventory API and check what a role may open.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use inventory_config_and_utils::{init_logging, Config, Paths};
use tracing::debug;

/// labinv CLI - Session and access tooling for the lab inventory client.
#[derive(Parser)]
#[command(name = "labinv")]
#[command(about = "Lab inventory client: login, session status and route access")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// API base address; overrides LABINV_API_URL and the config file
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with email and password
    Login {
        /// Email address (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
        /// Path to continue at after login
        #[arg(long)]
        from: Option<String>,
        /// Switch accounts when already logged in
        #[arg(long)]
        force: bool,
    },

    /// Logout and clear the stored session
    Logout,

    /// Show the session state
    Status,

    /// Show the signed-in user
    Whoami,

    /// Check whether the current session may open a path
    Route {
        /// Target path, e.g. /assets/12
        path: String,
    },

    /// Show the navigation menu for the current role
    Nav,

    /// GET an API path with the stored credential
    Get {
        /// API path relative to the base address, e.g. /assets
        path: String,
    },
}

async fn run(cli: Cli, paths: Paths, config: Config) -> anyhow::Result<()> {
    let ctx = commands::connect(&paths, &config).await?;

    match cli.command {
        Commands::Login { email, from, force } => {
            commands::login(&ctx, email, from.as_deref(), force, &cli.format).await
        }
        Commands::Logout => commands::logout(&ctx, &cli.format).await,
        Commands::Status => commands::status(&ctx, &cli.format).await,
        Commands::Whoami => commands::whoami(&ctx, &cli.format).await,
        Commands::Route { path } => commands::route(&ctx, &path, &cli.format).await,
        Commands::Nav => commands::nav(&ctx, &cli.format).await,
        Commands::Get { path } => commands::get(&ctx, &path, &cli.format).await,
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<(Paths, Config)> {
    let paths = Paths::new()?;
    let mut config = Config::load(&paths)?;
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.validate()?;
    Ok((paths, config))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    let (paths, config) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            output::print_error(&format!("{:#}", e), &format);
            std::process::exit(1);
        }
    };

    // CLI doesn't need stderr output by default
    init_logging("cli", &config.log_level, &paths, false);
    debug!(api_url = %config.api_url, "Starting labinv");

    if let Err(e) = run(cli, paths, config).await {
        output::print_error(&format!("{:#}", e), &format);
        std::process::exit(1);
    }
}
