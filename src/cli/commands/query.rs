//! Catalog query command handler

use crate::catalog::EntryFilters;
use crate::config::Config;
use crate::domain::UserId;
use crate::models::entry::{CatalogEntry, EntryQuery, Page};
use crate::services::CatalogService;

use super::open_service;

/// Everything `romshelf query` needs beyond the filter flags.
#[derive(Debug, Default)]
pub struct QueryArgs {
    pub filters: EntryFilters,
    pub group: bool,
    pub order_by: Option<String>,
    pub order_dir: Option<String>,
    pub user: Option<i32>,
    pub page: u64,
    pub page_size: Option<u64>,
    pub json: bool,
}

impl QueryArgs {
    fn to_query(&self, default_page_size: u64) -> EntryQuery {
        let limit = self.page_size.unwrap_or(default_page_size);
        EntryQuery {
            filters: self.filters.clone(),
            group_by_meta_id: self.group,
            order_by: self.order_by.clone(),
            order_dir: self.order_dir.clone(),
            user_id: self.user.map(UserId::new),
            page: Some(Page {
                offset: self.page.saturating_sub(1).saturating_mul(limit),
                limit,
            }),
        }
    }
}

pub async fn cmd_query(config: &Config, args: QueryArgs) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let query = args.to_query(config.catalog.page_size);
    let result = service.query_entries(&query).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.items.is_empty() {
        println!("No entries match.");
        return Ok(());
    }

    println!(
        "Entries {}-{} of {}",
        result.offset + 1,
        result.offset + result.items.len() as u64,
        result.total
    );
    println!("{:-<70}", "");

    for item in &result.items {
        print_entry(item);
    }

    Ok(())
}

fn print_entry(item: &CatalogEntry) {
    let marker = if item.entry.missing_from_fs { "!" } else { "•" };
    println!("{} {} [{}]", marker, item.entry.name, item.entry.fs_name);

    let mut details = vec![
        format!("ID: {}", item.entry.id),
        format!("Platform: {}", item.entry.platform_id),
        format!("Size: {}", item.fs_size_bytes),
    ];
    if !item.sibling_ids.is_empty() {
        details.push(format!("Siblings: {:?}", item.sibling_ids));
    }
    if item
        .user_state
        .as_ref()
        .is_some_and(|state| state.is_main_sibling == Some(true))
    {
        details.push("Main sibling".to_string());
    }
    println!("  {}", details.join(" | "));
}
