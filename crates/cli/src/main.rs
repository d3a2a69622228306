use std::sync::Arc;

use {
    clap::Parser,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {tally_config::TallyConfig, tally_ledger::RelayContext, tally_notion::NotionStore};

#[derive(Parser)]
#[command(name = "tally", about = "Tally — Telegram to Notion record relay")]
struct Cli {
    /// Path to a config file (skips the standard search).
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<TallyConfig> {
    let mut config = match &cli.config {
        Some(path) => tally_config::load_config(path)?,
        None => tally_config::discover_and_load(),
    };
    tally_config::apply_env_overrides(&mut config);
    config.ensure_complete()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "tally starting");

    let config = resolve_config(&cli)?;
    if config.telegram.allowed_users.is_empty() {
        warn!("telegram.allowed_users is empty, every sender will be denied");
    }

    let store = NotionStore::new(
        config.notion.token.clone(),
        config.notion.records_db.clone(),
        config.notion.relations_db.clone(),
        config.relation_property(),
    );
    let ctx = Arc::new(RelayContext::new(
        config.ledger.mode,
        config.telegram.allowed_users.clone(),
        Arc::new(store),
    ));

    // Prime the relation cache before the first message arrives.
    ctx.warm().await;

    let cancel = tally_telegram::start_polling(&config.telegram.token, Arc::clone(&ctx)).await?;

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    cancel.cancel();

    Ok(())
}
