use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use evento::config::{self, CliArgs, Config, DataSource};
use evento::repo::Repositories;
use evento::{create_app, db, AppState};

/// Sets up stdout logging plus a daily rolling file in the data directory
///
/// The returned guard flushes the file writer and must live as long as the
/// server does.
fn init_logging(config: &Config, debug: bool) -> Option<WorkerGuard> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_writer, guard) = match config::get_data_dir_path() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir.join("logs"), "evento.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(config.log_json.then(|| fmt::layer().json()))
        .with((!config.log_json).then(|| fmt::layer()))
        .with(file_writer.map(|writer| fmt::layer().with_ansi(false).with_writer(writer)))
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args = CliArgs::parse();
    let debug = args.debug;
    let config = config::get_config(args).map_err(|e| anyhow!(e))?;

    let _guard = init_logging(&config, debug);
    info!(
        "Loaded configuration: database_url={}, data_source={}, session_ttl={}h",
        config.database_url, config.data_source, config.session_ttl_hours
    );

    // Credentials and sessions always live in SQLite, whichever store serves the listings
    let pool = Arc::new(db::init_pool(&config.database_url).context("Failed to open database")?);
    db::run_migrations(&pool)?;

    let repos = match config.data_source {
        DataSource::Sqlite => Repositories::sqlite(pool.clone()),
        DataSource::Sample => {
            info!("Serving in-memory sample data");
            Repositories::sample()
        }
    };

    let state = AppState::new(repos, pool, Arc::new(config.admin_credentials()), config.session_ttl());
    let app = create_app(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
