//! Migration command handler

use crate::config::Config;

use super::open_store;

pub async fn cmd_migrate(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    store.ping().await?;
    println!("✓ Database is up to date: {}", config.general.database_path);
    Ok(())
}
