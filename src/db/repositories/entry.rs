use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::Context;
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::catalog::QueryPlan;
use crate::catalog::siblings::{SIBLING_PROVIDERS, provider_ids};
use crate::constants::limits::SQL_BATCH_SIZE;
use crate::entities::{entries, entry_files, entry_metadata, entry_users, prelude::*};
use crate::models::entry::{EntryUpdate, NewEntry, fs_name_no_ext};

fn json_strings(values: &[String]) -> serde_json::Value {
    serde_json::Value::from(values.to_vec())
}

/// Writes `missing_from_fs` on `rows`, a bounded id list per statement.
async fn set_missing_flag(
    txn: &DatabaseTransaction,
    rows: &[entries::Model],
    missing: bool,
    updated_at: &str,
) -> anyhow::Result<()> {
    let ids: Vec<i32> = rows.iter().map(|e| e.id).collect();
    for chunk in ids.chunks(SQL_BATCH_SIZE) {
        Entries::update_many()
            .col_expr(entries::Column::MissingFromFs, Expr::value(missing))
            .col_expr(entries::Column::UpdatedAt, Expr::value(updated_at))
            .filter(entries::Column::Id.is_in(chunk.iter().copied()))
            .exec(txn)
            .await
            .context("Failed to update missing flags")?;
    }
    Ok(())
}

pub struct EntryRepository {
    conn: DatabaseConnection,
}

impl EntryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> anyhow::Result<Option<entries::Model>> {
        Entries::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query entry by ID")
    }

    pub async fn add(&self, input: &NewEntry) -> anyhow::Result<entries::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let active_model = entries::ActiveModel {
            platform_id: Set(input.platform_id),
            fs_name: Set(input.fs_name.clone()),
            fs_name_no_ext: Set(fs_name_no_ext(&input.fs_name)),
            name: Set(input.name.clone()),
            igdb_id: Set(input.igdb_id),
            moby_id: Set(input.moby_id),
            ss_id: Set(input.ss_id),
            ra_id: Set(input.ra_id),
            launchbox_id: Set(input.launchbox_id),
            hasheous_id: Set(input.hasheous_id),
            missing_from_fs: Set(false),
            regions: Set(input.regions.as_deref().map(json_strings)),
            languages: Set(input.languages.as_deref().map(json_strings)),
            hasheous_metadata: Set(input.hasheous_metadata.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert entry")?;

        info!(
            "Added entry {} ({}) on platform {}",
            model.id, model.fs_name, model.platform_id
        );
        Ok(model)
    }

    /// Entries of `platform_id` whose `fs_name` is one of `fs_names`, keyed
    /// by `fs_name`.
    pub async fn by_fs_names(
        &self,
        platform_id: i32,
        fs_names: &[String],
    ) -> anyhow::Result<HashMap<String, entries::Model>> {
        if fs_names.is_empty() {
            return Ok(HashMap::new());
        }

        let mut by_name = HashMap::with_capacity(fs_names.len());
        for chunk in fs_names.chunks(SQL_BATCH_SIZE) {
            let rows = Entries::find()
                .filter(entries::Column::PlatformId.eq(platform_id))
                .filter(entries::Column::FsName.is_in(chunk.iter().cloned()))
                .all(&self.conn)
                .await
                .context("Failed to query entries by filesystem name")?;
            by_name.extend(rows.into_iter().map(|e| (e.fs_name.clone(), e)));
        }

        Ok(by_name)
    }

    /// Applies a partial update. Returns `None` if the entry does not exist.
    pub async fn update(
        &self,
        id: i32,
        update: &EntryUpdate,
    ) -> anyhow::Result<Option<entries::Model>> {
        let txn = self.conn.begin().await?;

        if Entries::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(None);
        }

        let active_model = entries::ActiveModel {
            id: Set(id),
            name: update.name.clone().map_or(NotSet, Set),
            fs_name_no_ext: update
                .fs_name
                .as_deref()
                .map(fs_name_no_ext)
                .map_or(NotSet, Set),
            fs_name: update.fs_name.clone().map_or(NotSet, Set),
            igdb_id: update.igdb_id.map_or(NotSet, Set),
            moby_id: update.moby_id.map_or(NotSet, Set),
            ss_id: update.ss_id.map_or(NotSet, Set),
            ra_id: update.ra_id.map_or(NotSet, Set),
            launchbox_id: update.launchbox_id.map_or(NotSet, Set),
            hasheous_id: update.hasheous_id.map_or(NotSet, Set),
            regions: update
                .regions
                .as_ref()
                .map(|r| r.as_deref().map(json_strings))
                .map_or(NotSet, Set),
            languages: update
                .languages
                .as_ref()
                .map(|l| l.as_deref().map(json_strings))
                .map_or(NotSet, Set),
            hasheous_metadata: update.hasheous_metadata.clone().map_or(NotSet, Set),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active_model.update(&txn).await?;
        txn.commit().await?;

        info!("Updated entry {}", id);
        Ok(Some(model))
    }

    /// Deletes the entry together with its files, user rows and metadata.
    pub async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        let txn = self.conn.begin().await?;

        entry_files::Entity::delete_many()
            .filter(entry_files::Column::RomId.eq(id))
            .exec(&txn)
            .await?;
        entry_users::Entity::delete_many()
            .filter(entry_users::Column::RomId.eq(id))
            .exec(&txn)
            .await?;
        entry_metadata::Entity::delete_many()
            .filter(entry_metadata::Column::RomId.eq(id))
            .exec(&txn)
            .await?;

        let result = Entries::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Deleted entry {}", id);
        }
        Ok(removed)
    }

    /// Flags every entry of `platform_id` whose `fs_name` is absent from
    /// `present` and returns the ones that were not flagged before, ordered
    /// by `fs_name`.
    ///
    /// The listing is compared in memory, so its length is not bounded by
    /// the backend's bind-parameter limit.
    pub async fn mark_missing(
        &self,
        platform_id: i32,
        present: &[String],
    ) -> anyhow::Result<Vec<entries::Model>> {
        let present: HashSet<&str> = present.iter().map(String::as_str).collect();
        let txn = self.conn.begin().await?;

        let newly_missing: Vec<entries::Model> = Entries::find()
            .filter(entries::Column::PlatformId.eq(platform_id))
            .filter(entries::Column::MissingFromFs.eq(false))
            .order_by_asc(entries::Column::FsName)
            .all(&txn)
            .await
            .context("Failed to query entries absent from the filesystem")?
            .into_iter()
            .filter(|e| !present.contains(e.fs_name.as_str()))
            .collect();

        let updated_at = chrono::Utc::now().to_rfc3339();
        set_missing_flag(&txn, &newly_missing, true, &updated_at).await?;
        txn.commit().await?;

        if !newly_missing.is_empty() {
            info!(
                "Marked {} entries missing on platform {}",
                newly_missing.len(),
                platform_id
            );
        }

        Ok(newly_missing
            .into_iter()
            .map(|mut e| {
                e.missing_from_fs = true;
                e.updated_at.clone_from(&updated_at);
                e
            })
            .collect())
    }

    /// Unflags missing entries of `platform_id` whose `fs_name` is back in
    /// `present` and returns them.
    pub async fn clear_missing(
        &self,
        platform_id: i32,
        present: &[String],
    ) -> anyhow::Result<Vec<entries::Model>> {
        if present.is_empty() {
            return Ok(Vec::new());
        }

        let present: HashSet<&str> = present.iter().map(String::as_str).collect();
        let txn = self.conn.begin().await?;

        let restored: Vec<entries::Model> = Entries::find()
            .filter(entries::Column::PlatformId.eq(platform_id))
            .filter(entries::Column::MissingFromFs.eq(true))
            .order_by_asc(entries::Column::FsName)
            .all(&txn)
            .await
            .context("Failed to query restored entries")?
            .into_iter()
            .filter(|e| present.contains(e.fs_name.as_str()))
            .collect();

        let updated_at = chrono::Utc::now().to_rfc3339();
        set_missing_flag(&txn, &restored, false, &updated_at).await?;
        txn.commit().await?;

        Ok(restored
            .into_iter()
            .map(|mut e| {
                e.missing_from_fs = false;
                e.updated_at.clone_from(&updated_at);
                e
            })
            .collect())
    }

    /// Runs a compiled filter. Rows come back in id order.
    pub async fn find_filtered(&self, plan: QueryPlan) -> anyhow::Result<Vec<entries::Model>> {
        let rows = plan
            .apply(Entries::find())
            .order_by_asc(entries::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to run catalog query")?;

        debug!("Catalog filter matched {} entries", rows.len());
        Ok(rows)
    }

    /// Sibling ids for a batch of entries, looked up across the whole
    /// catalog in one query.
    pub async fn sibling_ids_for(
        &self,
        batch: &[entries::Model],
    ) -> anyhow::Result<HashMap<i32, Vec<i32>>> {
        let mut shares_provider = Condition::any();
        for (slot, column) in SIBLING_PROVIDERS.iter().enumerate() {
            let ids: Vec<i32> = batch
                .iter()
                .filter_map(|e| provider_ids(e)[slot])
                .collect();
            if !ids.is_empty() {
                shares_provider = shares_provider.add(column.is_in(ids));
            }
        }

        let mut pool: BTreeMap<i32, entries::Model> =
            batch.iter().map(|e| (e.id, e.clone())).collect();

        if !shares_provider.is_empty() {
            let platforms: Vec<i32> = batch.iter().map(|e| e.platform_id).collect();
            let candidates = Entries::find()
                .filter(entries::Column::PlatformId.is_in(platforms))
                .filter(shares_provider)
                .all(&self.conn)
                .await
                .context("Failed to query sibling candidates")?;
            pool.extend(candidates.into_iter().map(|e| (e.id, e)));
        }

        let pool: Vec<entries::Model> = pool.into_values().collect();
        let mut all = crate::catalog::sibling_map(&pool);
        Ok(batch
            .iter()
            .map(|e| (e.id, all.remove(&e.id).unwrap_or_default()))
            .collect())
    }
}
