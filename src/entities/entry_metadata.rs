use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Provider-sourced descriptive fields, one row per entry.
///
/// The array columns hold JSON arrays of strings and are matched with
/// element containment, never substring search.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "entry_metadata")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub rom_id: i32,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub genres: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub franchises: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub collections: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub companies: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub game_modes: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub age_ratings: Option<Json>,
    pub first_release_date: Option<i64>,
    pub average_rating: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::entries::Entity",
        from = "Column::RomId",
        to = "super::entries::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Entries,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
