use std::collections::HashMap;

use anyhow::Context;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use crate::catalog::siblings::siblings_of;
use crate::constants::limits::SQL_BATCH_SIZE;
use crate::entities::{entries, entry_users, prelude::*};
use crate::models::entry::UserStateUpdate;

pub struct EntryUserRepository {
    conn: DatabaseConnection,
}

impl EntryUserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(
        &self,
        rom_id: i32,
        user_id: i32,
    ) -> anyhow::Result<Option<entry_users::Model>> {
        EntryUsers::find()
            .filter(entry_users::Column::RomId.eq(rom_id))
            .filter(entry_users::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query user state")
    }

    /// The user's rows for a batch of entries, keyed by entry id.
    pub async fn for_entries(
        &self,
        user_id: i32,
        rom_ids: &[i32],
    ) -> anyhow::Result<HashMap<i32, entry_users::Model>> {
        if rom_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut by_entry = HashMap::with_capacity(rom_ids.len());
        for chunk in rom_ids.chunks(SQL_BATCH_SIZE) {
            let rows = EntryUsers::find()
                .filter(entry_users::Column::UserId.eq(user_id))
                .filter(entry_users::Column::RomId.is_in(chunk.iter().copied()))
                .all(&self.conn)
                .await
                .context("Failed to load user states")?;
            by_entry.extend(rows.into_iter().map(|row| (row.rom_id, row)));
        }

        Ok(by_entry)
    }

    /// Creates or merges the user's row for an entry.
    ///
    /// When the update makes the entry the main sibling, every sibling row
    /// of the same user that is currently main is cleared in the same
    /// transaction. Returns `None` if the entry does not exist.
    pub async fn upsert(
        &self,
        rom_id: i32,
        user_id: i32,
        update: &UserStateUpdate,
    ) -> anyhow::Result<Option<entry_users::Model>> {
        let txn = self.conn.begin().await?;

        let Some(entry) = Entries::find_by_id(rom_id).one(&txn).await? else {
            return Ok(None);
        };

        let existing = EntryUsers::find()
            .filter(entry_users::Column::RomId.eq(rom_id))
            .filter(entry_users::Column::UserId.eq(user_id))
            .one(&txn)
            .await?;

        let now = chrono::Utc::now().to_rfc3339();
        let row = match existing {
            Some(current) => {
                let active_model = entry_users::ActiveModel {
                    id: Set(current.id),
                    status: update.status.clone().map_or(NotSet, Set),
                    now_playing: update.now_playing.map_or(NotSet, Set),
                    backlogged: update.backlogged.map_or(NotSet, Set),
                    hidden: update.hidden.map_or(NotSet, Set),
                    is_main_sibling: update.is_main_sibling.map_or(NotSet, Set),
                    last_played: update.last_played.clone().map_or(NotSet, Set),
                    rating: update.rating.map_or(NotSet, Set),
                    difficulty: update.difficulty.map_or(NotSet, Set),
                    completion: update.completion.map_or(NotSet, Set),
                    updated_at: Set(now),
                    ..Default::default()
                };
                active_model.update(&txn).await?
            }
            None => {
                let active_model = entry_users::ActiveModel {
                    rom_id: Set(rom_id),
                    user_id: Set(user_id),
                    status: Set(update.status.clone().flatten()),
                    now_playing: Set(update.now_playing.unwrap_or(false)),
                    backlogged: Set(update.backlogged.unwrap_or(false)),
                    hidden: Set(update.hidden.unwrap_or(false)),
                    is_main_sibling: Set(update.is_main_sibling.flatten()),
                    last_played: Set(update.last_played.clone().flatten()),
                    rating: Set(update.rating.flatten()),
                    difficulty: Set(update.difficulty.flatten()),
                    completion: Set(update.completion.flatten()),
                    updated_at: Set(now),
                    ..Default::default()
                };
                active_model.insert(&txn).await?
            }
        };

        if update.sets_main_sibling() {
            let cleared = Self::clear_sibling_mains(&txn, &entry, user_id).await?;
            if cleared > 0 {
                info!(
                    "Entry {} is now main sibling for user {}; cleared {} other(s)",
                    rom_id, user_id, cleared
                );
            }
        }

        txn.commit().await?;
        Ok(Some(row))
    }

    async fn clear_sibling_mains<C>(
        conn: &C,
        entry: &entries::Model,
        user_id: i32,
    ) -> anyhow::Result<u64>
    where
        C: sea_orm::ConnectionTrait,
    {
        let Some(condition) = siblings_of(entry) else {
            return Ok(0);
        };

        let sibling_ids: Vec<i32> = Entries::find()
            .select_only()
            .column(entries::Column::Id)
            .filter(condition)
            .into_tuple()
            .all(conn)
            .await
            .context("Failed to query siblings")?;

        if sibling_ids.is_empty() {
            return Ok(0);
        }

        let result = EntryUsers::update_many()
            .col_expr(entry_users::Column::IsMainSibling, Expr::value(false))
            .filter(entry_users::Column::UserId.eq(user_id))
            .filter(entry_users::Column::RomId.is_in(sibling_ids))
            .filter(entry_users::Column::IsMainSibling.eq(true))
            .exec(conn)
            .await?;

        Ok(result.rows_affected)
    }
}
