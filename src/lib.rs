pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod services;

use clap::Parser;
pub use config::Config;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, QueryArgs};

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Query {
            filters,
            group,
            order_by,
            order_dir,
            user,
            page,
            page_size,
            json,
        } => {
            let args = QueryArgs {
                filters: filters.into(),
                group,
                order_by,
                order_dir,
                user,
                page,
                page_size,
                json,
            };
            cli::cmd_query(&config, args).await
        }

        Commands::Index {
            filters,
            group,
            order_by,
            order_dir,
            user,
        } => cli::cmd_index(&config, filters.into(), group, order_by, order_dir, user).await,

        Commands::MarkMissing { platform, fs_names } => {
            cli::cmd_mark_missing(&config, platform, &fs_names).await
        }

        Commands::Migrate => cli::cmd_migrate(&config).await,
    }
}
