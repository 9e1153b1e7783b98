use std::collections::HashMap;

use anyhow::Context;
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use crate::constants::limits::SQL_BATCH_SIZE;
use crate::entities::{entry_files, prelude::*};
use crate::models::entry::{FileUpdate, NewEntryFile};

pub struct EntryFileRepository {
    conn: DatabaseConnection,
}

impl EntryFileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> anyhow::Result<Option<entry_files::Model>> {
        EntryFiles::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query file by ID")
    }

    /// Inserts a file for `rom_id`. Returns `None` if the entry does not exist.
    pub async fn add(
        &self,
        rom_id: i32,
        file: &NewEntryFile,
    ) -> anyhow::Result<Option<entry_files::Model>> {
        let txn = self.conn.begin().await?;

        if Entries::find_by_id(rom_id).one(&txn).await?.is_none() {
            return Ok(None);
        }

        let model = entry_files::ActiveModel {
            rom_id: Set(rom_id),
            file_name: Set(file.file_name.clone()),
            file_path: Set(file.file_path.clone()),
            file_size_bytes: Set(file.file_size_bytes),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(Some(model))
    }

    /// Returns `None` if the file does not exist.
    pub async fn update(
        &self,
        id: i32,
        update: &FileUpdate,
    ) -> anyhow::Result<Option<entry_files::Model>> {
        let txn = self.conn.begin().await?;

        if EntryFiles::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(None);
        }

        let model = entry_files::ActiveModel {
            id: Set(id),
            file_name: update.file_name.clone().map_or(NotSet, Set),
            file_path: update.file_path.clone().map_or(NotSet, Set),
            file_size_bytes: update.file_size_bytes.map_or(NotSet, Set),
            ..Default::default()
        }
        .update(&txn)
        .await?;

        txn.commit().await?;
        Ok(Some(model))
    }

    /// Deletes every file of `rom_id` and returns what was removed.
    pub async fn purge(&self, rom_id: i32) -> anyhow::Result<Vec<entry_files::Model>> {
        let txn = self.conn.begin().await?;

        let purged = EntryFiles::find()
            .filter(entry_files::Column::RomId.eq(rom_id))
            .order_by_asc(entry_files::Column::Id)
            .all(&txn)
            .await
            .context("Failed to query files to purge")?;

        EntryFiles::delete_many()
            .filter(entry_files::Column::RomId.eq(rom_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        if !purged.is_empty() {
            info!("Purged {} files of entry {}", purged.len(), rom_id);
        }
        Ok(purged)
    }

    /// Files of a batch of entries, keyed by entry id, each list in id order.
    pub async fn for_entries(
        &self,
        rom_ids: &[i32],
    ) -> anyhow::Result<HashMap<i32, Vec<entry_files::Model>>> {
        if rom_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut by_entry: HashMap<i32, Vec<entry_files::Model>> = HashMap::new();
        for chunk in rom_ids.chunks(SQL_BATCH_SIZE) {
            let rows = EntryFiles::find()
                .filter(entry_files::Column::RomId.is_in(chunk.iter().copied()))
                .order_by_asc(entry_files::Column::Id)
                .all(&self.conn)
                .await
                .context("Failed to load entry files")?;
            for row in rows {
                by_entry.entry(row.rom_id).or_default().push(row);
            }
        }
        Ok(by_entry)
    }

    /// Total file size per entry. Entries without files are absent.
    pub async fn total_sizes(&self, rom_ids: &[i32]) -> anyhow::Result<HashMap<i32, i64>> {
        if rom_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let total: SimpleExpr = Func::cast_as(
            Func::sum(Expr::col((EntryFiles, entry_files::Column::FileSizeBytes))),
            Alias::new("BIGINT"),
        )
        .into();

        let mut sizes = HashMap::with_capacity(rom_ids.len());
        for chunk in rom_ids.chunks(SQL_BATCH_SIZE) {
            let rows: Vec<(i32, i64)> = EntryFiles::find()
                .select_only()
                .column(entry_files::Column::RomId)
                .column_as(total.clone(), "total_size")
                .filter(entry_files::Column::RomId.is_in(chunk.iter().copied()))
                .group_by(entry_files::Column::RomId)
                .into_tuple()
                .all(&self.conn)
                .await
                .context("Failed to sum entry file sizes")?;
            sizes.extend(rows);
        }

        Ok(sizes)
    }
}
