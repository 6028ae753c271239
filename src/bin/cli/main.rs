mod commands;
mod output;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use evento::client::{ClientError, EventoClient, TokenStore};
use evento::config;
use output::{OutputConfig, OutputFormat};
use tracing_subscriber::EnvFilter;

/// CLI for the Evento event booking service
#[derive(Parser, Debug)]
#[clap(name = "evento-cli", about = "CLI for the Evento event booking service")]
struct Cli {
    /// Server URL to connect to
    #[clap(long, env = "EVENTO_URL", global = true)]
    server_url: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs or counts)
    #[clap(short, long, global = true)]
    quiet: bool,

    /// File holding the signed-in session token
    #[clap(long, env = "EVENTO_TOKEN_FILE", global = true)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage users
    #[command(subcommand)]
    User(commands::user::UserCommands),
    /// Browse and manage events
    #[command(subcommand)]
    Event(commands::event::EventCommands),
    /// Book and manage tickets
    #[command(subcommand)]
    Booking(commands::booking::BookingCommands),
    /// Submit and manage enquiries
    #[command(subcommand)]
    Enquiry(commands::enquiry::EnquiryCommands),
    /// Sign up, sign in and out
    #[command(subcommand)]
    Auth(commands::auth::AuthCommands),
    /// Admin dashboard
    Admin(commands::admin::AdminArgs),
}

/// Resolves the server URL from CLI args, config file, or defaults
///
/// Precedence: CLI flag / env var > config file > default
fn resolve_server_url(cli_url: Option<String>) -> String {
    if let Some(url) = cli_url {
        return url;
    }

    let config_dir = config::get_config_dir_path();
    if let Some(ref dir) = config_dir {
        let config_path = dir.join("config.toml");
        if let Ok(update) = config::config_from_file(Some(config_path)) {
            if let Some(url) = update.server_url {
                return url;
            }
        }
    }

    "http://localhost:3000".to_string()
}

/// The token file from the flag, else `session.token` in the data directory
fn resolve_token_store(token_file: Option<PathBuf>) -> TokenStore {
    match token_file.or_else(|| config::get_data_dir_path().map(|dir| dir.join("session.token"))) {
        Some(path) => TokenStore::file(path),
        None => TokenStore::memory(),
    }
}

/// Message for a failed command
///
/// Data calls collapse failures into sentinels, so the command error alone
/// cannot say whether the server was reachable. A health check settles it.
async fn describe_failure(client: &EventoClient, err: &dyn std::error::Error) -> String {
    match client.health().await {
        Err(ClientError::Request(_)) => {
            format!("Could not connect to server at {}. Is evento running?", client.base_url())
        }
        _ => err.to_string(),
    }
}

#[tokio::main]
async fn main() {
    // Failed requests are logged by the client; keep that quiet unless asked for
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let server_url = resolve_server_url(cli.server_url);
    let client = EventoClient::new(server_url);
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::User(cmd) => commands::user::execute(&client, cmd, &output_config).await,
        Commands::Event(cmd) => commands::event::execute(&client, cmd, &output_config).await,
        Commands::Booking(cmd) => commands::booking::execute(&client, cmd, &output_config).await,
        Commands::Enquiry(cmd) => commands::enquiry::execute(&client, cmd, &output_config).await,
        Commands::Auth(cmd) => {
            let store = resolve_token_store(cli.token_file);
            commands::auth::execute(&client, store, cmd, &output_config).await
        }
        Commands::Admin(args) => commands::admin::execute(&client, args, &output_config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", describe_failure(&client, e.as_ref()).await);
        process::exit(1);
    }
}
