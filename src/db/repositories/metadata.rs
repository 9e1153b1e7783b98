use std::collections::HashMap;

use anyhow::Context;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

use crate::catalog::JsonDialect;
use crate::catalog::virtual_collection::{VirtualCollection, VirtualCollectionKind, build_all};
use crate::constants::limits::SQL_BATCH_SIZE;
use crate::entities::{entry_metadata, prelude::*};
use crate::models::entry::MetadataInput;

fn json_strings(values: &[String]) -> Option<serde_json::Value> {
    Some(serde_json::Value::from(values.to_vec()))
}

pub struct MetadataRepository {
    conn: DatabaseConnection,
}

impl MetadataRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts or replaces the metadata row of `rom_id`. Returns `None` if
    /// the entry does not exist.
    pub async fn upsert(
        &self,
        rom_id: i32,
        input: &MetadataInput,
    ) -> anyhow::Result<Option<entry_metadata::Model>> {
        let txn = self.conn.begin().await?;

        if Entries::find_by_id(rom_id).one(&txn).await?.is_none() {
            return Ok(None);
        }

        let active_model = entry_metadata::ActiveModel {
            rom_id: Set(rom_id),
            genres: Set(json_strings(&input.genres)),
            franchises: Set(json_strings(&input.franchises)),
            collections: Set(json_strings(&input.collections)),
            companies: Set(json_strings(&input.companies)),
            game_modes: Set(json_strings(&input.game_modes)),
            age_ratings: Set(json_strings(&input.age_ratings)),
            first_release_date: Set(input.first_release_date),
            average_rating: Set(input.average_rating),
        };

        EntryMetadata::insert(active_model)
            .on_conflict(
                OnConflict::column(entry_metadata::Column::RomId)
                    .update_columns([
                        entry_metadata::Column::Genres,
                        entry_metadata::Column::Franchises,
                        entry_metadata::Column::Collections,
                        entry_metadata::Column::Companies,
                        entry_metadata::Column::GameModes,
                        entry_metadata::Column::AgeRatings,
                        entry_metadata::Column::FirstReleaseDate,
                        entry_metadata::Column::AverageRating,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .context("Failed to upsert entry metadata")?;

        let model = EntryMetadata::find_by_id(rom_id).one(&txn).await?;
        txn.commit().await?;
        Ok(model)
    }

    pub async fn for_entries(
        &self,
        rom_ids: &[i32],
    ) -> anyhow::Result<HashMap<i32, entry_metadata::Model>> {
        if rom_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut by_entry = HashMap::with_capacity(rom_ids.len());
        for chunk in rom_ids.chunks(SQL_BATCH_SIZE) {
            let rows = EntryMetadata::find()
                .filter(entry_metadata::Column::RomId.is_in(chunk.iter().copied()))
                .all(&self.conn)
                .await
                .context("Failed to load entry metadata")?;
            by_entry.extend(rows.into_iter().map(|row| (row.rom_id, row)));
        }

        Ok(by_entry)
    }

    /// Ids of the entries whose metadata array for `kind` contains `name`.
    pub async fn virtual_collection_members(
        &self,
        dialect: JsonDialect,
        name: &str,
        kind: VirtualCollectionKind,
    ) -> anyhow::Result<Vec<i32>> {
        EntryMetadata::find()
            .select_only()
            .column(entry_metadata::Column::RomId)
            .filter(dialect.array_contains(kind.field().column(), name))
            .order_by_asc(entry_metadata::Column::RomId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to resolve virtual collection")
    }

    pub async fn virtual_collections(
        &self,
        kind: VirtualCollectionKind,
    ) -> anyhow::Result<Vec<VirtualCollection>> {
        let rows = EntryMetadata::find()
            .all(&self.conn)
            .await
            .context("Failed to load metadata for virtual collections")?;
        Ok(build_all(kind, &rows))
    }
}
