//! Missing-file recompute command handler

use crate::config::Config;
use crate::services::CatalogService;

use super::open_service;

pub async fn cmd_mark_missing(
    config: &Config,
    platform_id: i32,
    fs_names: &[String],
) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    service.get_platform(platform_id).await?;

    let changed = service.recompute_missing(platform_id, fs_names).await?;

    if changed.is_empty() {
        println!("No entries changed.");
        return Ok(());
    }

    println!("Flagged {} entries as missing:", changed.len());
    for entry in changed {
        println!("  {} (ID: {})", entry.fs_name, entry.id);
    }

    Ok(())
}
