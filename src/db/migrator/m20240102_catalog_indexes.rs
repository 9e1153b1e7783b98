use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_entries_platform_fs_name")
                    .table(Entries::Table)
                    .col(Entries::PlatformId)
                    .col(Entries::FsName)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_entry_users_rom_user")
                    .table(EntryUsers::Table)
                    .col(EntryUsers::RomId)
                    .col(EntryUsers::UserId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_entry_files_rom_id")
                    .table(EntryFiles::Table)
                    .col(EntryFiles::RomId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_collections_user_id")
                    .table(Collections::Table)
                    .col(Collections::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table) in [
            ("idx_collections_user_id", Collections::Table.into_iden()),
            ("idx_entry_files_rom_id", EntryFiles::Table.into_iden()),
            ("idx_entry_users_rom_user", EntryUsers::Table.into_iden()),
            ("idx_entries_platform_fs_name", Entries::Table.into_iden()),
        ] {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Entries {
    Table,
    PlatformId,
    FsName,
}

#[derive(DeriveIden)]
enum EntryUsers {
    Table,
    RomId,
    UserId,
}

#[derive(DeriveIden)]
enum EntryFiles {
    Table,
    RomId,
}

#[derive(DeriveIden)]
enum Collections {
    Table,
    UserId,
}
