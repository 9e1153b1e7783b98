mod index;
mod mark_missing;
mod migrate;
mod query;

pub use index::cmd_index;
pub use mark_missing::cmd_mark_missing;
pub use migrate::cmd_migrate;
pub use query::{QueryArgs, cmd_query};

use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::SeaOrmCatalogService;

async fn open_store(config: &Config) -> anyhow::Result<Arc<Store>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    Ok(Arc::new(store))
}

async fn open_service(config: &Config) -> anyhow::Result<SeaOrmCatalogService> {
    let store = open_store(config).await?;
    Ok(SeaOrmCatalogService::new(store, config.catalog.clone()))
}
