use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Per-user state for an entry. Unique per (`rom_id`, `user_id`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "entry_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub rom_id: i32,
    #[sea_orm(indexed)]
    pub user_id: i32,
    pub status: Option<String>,
    pub now_playing: bool,
    pub backlogged: bool,
    pub hidden: bool,
    /// `None` means the user never made a choice for this sibling group.
    pub is_main_sibling: Option<bool>,
    pub last_played: Option<String>,
    pub rating: Option<i32>,
    pub difficulty: Option<i32>,
    pub completion: Option<i32>,
    pub updated_at: String,
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
