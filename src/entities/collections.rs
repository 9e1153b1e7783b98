use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "collections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[sea_orm(indexed)]
    pub user_id: Option<i32>,
    pub is_public: bool,
    /// JSON array of entry ids.
    #[sea_orm(column_type = "JsonBinary")]
    pub rom_ids: Json,
    pub created_at: String,
}

impl Model {
    /// Entry ids stored on the collection. Non-integer elements are skipped.
    #[must_use]
    pub fn entry_ids(&self) -> Vec<i32> {
        self.rom_ids
            .as_array()
            .map(|ids| {
                ids.iter()
                    .filter_map(serde_json::Value::as_i64)
                    .filter_map(|id| i32::try_from(id).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
