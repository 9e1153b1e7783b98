use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub platform_id: i32,
    pub fs_name: String,
    pub fs_name_no_ext: String,
    pub name: String,
    pub igdb_id: Option<i32>,
    pub moby_id: Option<i32>,
    pub ss_id: Option<i32>,
    pub ra_id: Option<i32>,
    pub launchbox_id: Option<i32>,
    pub hasheous_id: Option<i32>,
    pub missing_from_fs: bool,
    /// JSON array of region names.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub regions: Option<Json>,
    /// JSON array of language names.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub languages: Option<Json>,
    /// JSON object of per-database verification flags, e.g. `{"nointro_match": true}`.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub hasheous_metadata: Option<Json>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::platforms::Entity",
        from = "Column::PlatformId",
        to = "super::platforms::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Platforms,
    #[sea_orm(has_many = "super::entry_files::Entity")]
    EntryFiles,
    #[sea_orm(has_many = "super::entry_users::Entity")]
    EntryUsers,
    #[sea_orm(has_one = "super::entry_metadata::Entity")]
    EntryMetadata,
}

impl Related<super::platforms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Platforms.def()
    }
}

impl Related<super::entry_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntryFiles.def()
    }
}

impl Related<super::entry_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntryUsers.def()
    }
}

impl Related<super::entry_metadata::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntryMetadata.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
