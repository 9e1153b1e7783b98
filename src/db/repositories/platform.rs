use anyhow::Context;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::info;

use crate::entities::{platforms, prelude::*};
use crate::models::entry::NewPlatform;

pub struct PlatformRepository {
    conn: DatabaseConnection,
}

impl PlatformRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, input: &NewPlatform) -> anyhow::Result<platforms::Model> {
        let model = platforms::ActiveModel {
            slug: Set(input.slug.clone()),
            name: Set(input.name.clone()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert platform")?;

        info!("Added platform {} ({})", model.id, model.slug);
        Ok(model)
    }

    pub async fn get(&self, id: i32) -> anyhow::Result<Option<platforms::Model>> {
        Platforms::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query platform by ID")
    }
}
