//! Letter index command handler

use crate::catalog::EntryFilters;
use crate::config::Config;
use crate::domain::UserId;
use crate::models::entry::EntryQuery;
use crate::services::CatalogService;

use super::open_service;

pub async fn cmd_index(
    config: &Config,
    filters: EntryFilters,
    group: bool,
    order_by: Option<String>,
    order_dir: Option<String>,
    user: Option<i32>,
) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let query = EntryQuery {
        filters,
        group_by_meta_id: group,
        order_by,
        order_dir,
        user_id: user.map(UserId::new),
        page: None,
    };

    let index = service.char_index(&query).await?;
    if index.is_empty() {
        println!("No entries match.");
        return Ok(());
    }

    for offset in index {
        println!("{:>4}  {}", offset.letter, offset.position);
    }

    Ok(())
}
