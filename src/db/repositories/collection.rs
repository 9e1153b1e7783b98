use anyhow::Context;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;

use crate::constants::FAVOURITES_COLLECTION;
use crate::entities::{collections, prelude::*};
use crate::models::entry::NewCollection;

pub struct CollectionRepository {
    conn: DatabaseConnection,
}

impl CollectionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, input: &NewCollection) -> anyhow::Result<collections::Model> {
        let model = collections::ActiveModel {
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            user_id: Set(input.user_id),
            is_public: Set(input.is_public),
            rom_ids: Set(serde_json::Value::from(input.rom_ids.clone())),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert collection")?;

        info!("Created collection {} ({})", model.id, model.name);
        Ok(model)
    }

    pub async fn get(&self, id: i32) -> anyhow::Result<Option<collections::Model>> {
        Collections::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query collection by ID")
    }

    /// The user's collection named "favourites", compared case-insensitively.
    pub async fn favourites_for(
        &self,
        user_id: i32,
    ) -> anyhow::Result<Option<collections::Model>> {
        let lower_name = Func::lower(Expr::col((Collections, collections::Column::Name)));

        Collections::find()
            .filter(collections::Column::UserId.eq(user_id))
            .filter(Expr::expr(lower_name).eq(FAVOURITES_COLLECTION))
            .one(&self.conn)
            .await
            .context("Failed to query favourites collection")
    }
}
