use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

use crate::catalog::virtual_collection::{VirtualCollection, VirtualCollectionKind};
use crate::catalog::{JsonDialect, QueryPlan};
use crate::entities::{collections, entries, entry_files, entry_metadata, entry_users, platforms};
use crate::models::entry::{
    EntryUpdate, FileUpdate, MetadataInput, NewCollection, NewEntry, NewEntryFile, NewPlatform,
    UserStateUpdate,
};

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let sqlite_path = db_url
            .strip_prefix("sqlite:")
            .filter(|path| !path.starts_with(":memory:"))
            .map(|path| path.trim_start_matches("//"))
            .map(|path| path.split('?').next().unwrap_or(path));

        if let Some(path_str) = sqlite_path {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// JSON predicate flavour of the connected backend.
    #[must_use]
    pub fn dialect(&self) -> JsonDialect {
        JsonDialect::for_backend(self.conn.get_database_backend())
    }

    fn entry_repo(&self) -> repositories::entry::EntryRepository {
        repositories::entry::EntryRepository::new(self.conn.clone())
    }

    fn entry_user_repo(&self) -> repositories::entry_user::EntryUserRepository {
        repositories::entry_user::EntryUserRepository::new(self.conn.clone())
    }

    fn entry_file_repo(&self) -> repositories::entry_file::EntryFileRepository {
        repositories::entry_file::EntryFileRepository::new(self.conn.clone())
    }

    fn collection_repo(&self) -> repositories::collection::CollectionRepository {
        repositories::collection::CollectionRepository::new(self.conn.clone())
    }

    fn platform_repo(&self) -> repositories::platform::PlatformRepository {
        repositories::platform::PlatformRepository::new(self.conn.clone())
    }

    fn metadata_repo(&self) -> repositories::metadata::MetadataRepository {
        repositories::metadata::MetadataRepository::new(self.conn.clone())
    }

    pub async fn get_entry(&self, id: i32) -> Result<Option<entries::Model>> {
        self.entry_repo().get(id).await
    }

    pub async fn add_entry(&self, input: &NewEntry) -> Result<entries::Model> {
        self.entry_repo().add(input).await
    }

    pub async fn get_entries_by_fs_name(
        &self,
        platform_id: i32,
        fs_names: &[String],
    ) -> Result<HashMap<String, entries::Model>> {
        self.entry_repo().by_fs_names(platform_id, fs_names).await
    }

    pub async fn update_entry(
        &self,
        id: i32,
        update: &EntryUpdate,
    ) -> Result<Option<entries::Model>> {
        self.entry_repo().update(id, update).await
    }

    pub async fn delete_entry(&self, id: i32) -> Result<bool> {
        self.entry_repo().delete(id).await
    }

    pub async fn mark_missing(
        &self,
        platform_id: i32,
        present: &[String],
    ) -> Result<Vec<entries::Model>> {
        self.entry_repo().mark_missing(platform_id, present).await
    }

    pub async fn clear_missing(
        &self,
        platform_id: i32,
        present: &[String],
    ) -> Result<Vec<entries::Model>> {
        self.entry_repo().clear_missing(platform_id, present).await
    }

    pub async fn find_entries(&self, plan: QueryPlan) -> Result<Vec<entries::Model>> {
        self.entry_repo().find_filtered(plan).await
    }

    pub async fn get_sibling_ids_for(
        &self,
        batch: &[entries::Model],
    ) -> Result<HashMap<i32, Vec<i32>>> {
        self.entry_repo().sibling_ids_for(batch).await
    }

    pub async fn get_user_state(
        &self,
        rom_id: i32,
        user_id: i32,
    ) -> Result<Option<entry_users::Model>> {
        self.entry_user_repo().get(rom_id, user_id).await
    }

    pub async fn get_user_states(
        &self,
        user_id: i32,
        rom_ids: &[i32],
    ) -> Result<HashMap<i32, entry_users::Model>> {
        self.entry_user_repo().for_entries(user_id, rom_ids).await
    }

    pub async fn upsert_user_state(
        &self,
        rom_id: i32,
        user_id: i32,
        update: &UserStateUpdate,
    ) -> Result<Option<entry_users::Model>> {
        self.entry_user_repo().upsert(rom_id, user_id, update).await
    }

    pub async fn get_file(&self, id: i32) -> Result<Option<entry_files::Model>> {
        self.entry_file_repo().get(id).await
    }

    pub async fn add_file(
        &self,
        rom_id: i32,
        file: &NewEntryFile,
    ) -> Result<Option<entry_files::Model>> {
        self.entry_file_repo().add(rom_id, file).await
    }

    pub async fn update_file(
        &self,
        id: i32,
        update: &FileUpdate,
    ) -> Result<Option<entry_files::Model>> {
        self.entry_file_repo().update(id, update).await
    }

    pub async fn purge_files(&self, rom_id: i32) -> Result<Vec<entry_files::Model>> {
        self.entry_file_repo().purge(rom_id).await
    }

    pub async fn get_files(
        &self,
        rom_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<entry_files::Model>>> {
        self.entry_file_repo().for_entries(rom_ids).await
    }

    pub async fn get_total_sizes(&self, rom_ids: &[i32]) -> Result<HashMap<i32, i64>> {
        self.entry_file_repo().total_sizes(rom_ids).await
    }

    pub async fn create_collection(&self, input: &NewCollection) -> Result<collections::Model> {
        self.collection_repo().create(input).await
    }

    pub async fn get_collection(&self, id: i32) -> Result<Option<collections::Model>> {
        self.collection_repo().get(id).await
    }

    pub async fn get_favourites(&self, user_id: i32) -> Result<Option<collections::Model>> {
        self.collection_repo().favourites_for(user_id).await
    }

    pub async fn add_platform(&self, input: &NewPlatform) -> Result<platforms::Model> {
        self.platform_repo().add(input).await
    }

    pub async fn get_platform(&self, id: i32) -> Result<Option<platforms::Model>> {
        self.platform_repo().get(id).await
    }

    pub async fn upsert_metadata(
        &self,
        rom_id: i32,
        input: &MetadataInput,
    ) -> Result<Option<entry_metadata::Model>> {
        self.metadata_repo().upsert(rom_id, input).await
    }

    pub async fn get_metadata(
        &self,
        rom_ids: &[i32],
    ) -> Result<HashMap<i32, entry_metadata::Model>> {
        self.metadata_repo().for_entries(rom_ids).await
    }

    pub async fn get_virtual_collection_members(
        &self,
        name: &str,
        kind: VirtualCollectionKind,
    ) -> Result<Vec<i32>> {
        self.metadata_repo()
            .virtual_collection_members(self.dialect(), name, kind)
            .await
    }

    pub async fn list_virtual_collections(
        &self,
        kind: VirtualCollectionKind,
    ) -> Result<Vec<VirtualCollection>> {
        self.metadata_repo().virtual_collections(kind).await
    }
}
