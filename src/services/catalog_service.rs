//! Domain service for catalog queries and mutations.
//!
//! Handlers and the CLI talk to [`CatalogService`]; nothing above this layer
//! touches the store directly.

use std::collections::HashMap;

use thiserror::Error;

use crate::catalog::{LetterOffset, VirtualCollection, VirtualCollectionKind};
use crate::domain::{EntryId, UserId};
use crate::entities::{collections, entries, entry_files, entry_metadata, entry_users, platforms};
use crate::models::entry::{
    CatalogEntry, EntryPage, EntryQuery, EntryUpdate, FileUpdate, MetadataInput, NewCollection,
    NewEntry, NewEntryFile, NewPlatform, Page, UserStateUpdate,
};

/// Domain errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CatalogError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Catalog operations exposed to callers.
///
/// # Examples
///
/// ```rust,ignore
/// use romshelf::models::entry::EntryQuery;
/// use romshelf::services::{CatalogError, CatalogService};
/// use std::sync::Arc;
///
/// async fn first_page(service: Arc<dyn CatalogService>) -> Result<(), CatalogError> {
///     let page = service.query_entries(&EntryQuery::default()).await?;
///     println!("{} of {}", page.items.len(), page.total);
///     Ok(())
/// }
/// ```
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// Filters, optionally groups by matched title, orders and pages the
    /// catalog. Items come back hydrated with files, the requesting user's
    /// state, metadata and sibling ids.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] on connection failures. Unknown
    /// sort keys and dangling collection ids are not errors.
    async fn query_entries(&self, query: &EntryQuery) -> Result<EntryPage, CatalogError>;

    /// Letter jump table over the full (unpaged) result of `query`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] on connection failures.
    async fn char_index(&self, query: &EntryQuery) -> Result<Vec<LetterOffset>, CatalogError>;

    /// One hydrated entry, with `user` state when given.
    ///
    /// # Errors
    ///
    /// - Returns [`CatalogError::NotFound`] if the entry does not exist
    /// - Returns [`CatalogError::Database`] on connection failures
    async fn get_entry(
        &self,
        id: EntryId,
        user: Option<UserId>,
    ) -> Result<CatalogEntry, CatalogError>;

    /// # Errors
    ///
    /// - Returns [`CatalogError::NotFound`] if the platform does not exist
    /// - Returns [`CatalogError::InvalidInput`] for an empty name or file name
    async fn add_entry(&self, input: &NewEntry) -> Result<entries::Model, CatalogError>;

    /// Entries of a platform keyed by `fs_name`; names without a row are
    /// absent from the map.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] on connection failures.
    async fn get_entries_by_fs_name(
        &self,
        platform_id: i32,
        fs_names: &[String],
    ) -> Result<HashMap<String, entries::Model>, CatalogError>;

    /// # Errors
    ///
    /// - Returns [`CatalogError::NotFound`] if the entry does not exist
    /// - Returns [`CatalogError::InvalidInput`] for an empty name or file name
    async fn update_entry(
        &self,
        id: EntryId,
        update: &EntryUpdate,
    ) -> Result<entries::Model, CatalogError>;

    /// Removes the entry with its files, user rows and metadata.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the entry does not exist.
    async fn delete_entry(&self, id: EntryId) -> Result<(), CatalogError>;

    /// Flags entries of `platform_id` whose `fs_name` is not in `present` and
    /// returns the ones that changed. Running it again with the same listing
    /// returns nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] on connection failures.
    async fn recompute_missing(
        &self,
        platform_id: i32,
        present: &[String],
    ) -> Result<Vec<entries::Model>, CatalogError>;

    /// Unflags missing entries of `platform_id` that are back in `present`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] on connection failures.
    async fn clear_missing(
        &self,
        platform_id: i32,
        present: &[String],
    ) -> Result<Vec<entries::Model>, CatalogError>;

    /// Creates or merges the user's row for an entry. Setting
    /// `is_main_sibling` to true clears it on the entry's siblings for the
    /// same user.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the entry does not exist.
    async fn upsert_user_state(
        &self,
        id: EntryId,
        user: UserId,
        update: &UserStateUpdate,
    ) -> Result<entry_users::Model, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] on connection failures.
    async fn get_user_state(
        &self,
        id: EntryId,
        user: UserId,
    ) -> Result<Option<entry_users::Model>, CatalogError>;

    /// # Errors
    ///
    /// - Returns [`CatalogError::NotFound`] if the entry does not exist
    /// - Returns [`CatalogError::InvalidInput`] for a negative size
    async fn add_file(
        &self,
        id: EntryId,
        file: &NewEntryFile,
    ) -> Result<entry_files::Model, CatalogError>;

    /// # Errors
    ///
    /// - Returns [`CatalogError::NotFound`] if the file does not exist
    /// - Returns [`CatalogError::InvalidInput`] for a negative size
    async fn update_file(
        &self,
        file_id: i32,
        update: &FileUpdate,
    ) -> Result<entry_files::Model, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the file does not exist.
    async fn get_file(&self, file_id: i32) -> Result<entry_files::Model, CatalogError>;

    /// Deletes every file of the entry and returns the removed rows.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the entry does not exist.
    async fn purge_files(&self, id: EntryId) -> Result<Vec<entry_files::Model>, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidInput`] for an empty name.
    async fn create_collection(
        &self,
        input: &NewCollection,
    ) -> Result<collections::Model, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the collection does not exist.
    async fn get_collection(&self, id: i32) -> Result<collections::Model, CatalogError>;

    /// The user's favourites collection, if they have one.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] on connection failures.
    async fn favourites_for(
        &self,
        user: UserId,
    ) -> Result<Option<collections::Model>, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidInput`] for an empty slug.
    async fn add_platform(&self, input: &NewPlatform) -> Result<platforms::Model, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the platform does not exist.
    async fn get_platform(&self, id: i32) -> Result<platforms::Model, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the entry does not exist.
    async fn upsert_metadata(
        &self,
        id: EntryId,
        input: &MetadataInput,
    ) -> Result<entry_metadata::Model, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] on connection failures.
    async fn list_virtual_collections(
        &self,
        kind: VirtualCollectionKind,
    ) -> Result<Vec<VirtualCollection>, CatalogError>;
}

/// Cuts the `page` window out of `rows`. Offsets past the end give an
/// empty slice.
#[must_use]
pub fn paginate<T>(rows: Vec<T>, page: Page) -> Vec<T> {
    let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
    rows.into_iter().skip(offset).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_window() {
        let rows: Vec<i32> = (0..10).collect();
        assert_eq!(paginate(rows.clone(), Page { offset: 2, limit: 3 }), vec![2, 3, 4]);
        assert_eq!(paginate(rows.clone(), Page { offset: 8, limit: 5 }), vec![8, 9]);
        assert!(paginate(rows, Page { offset: 20, limit: 5 }).is_empty());
    }

    #[test]
    fn catalog_error_display() {
        let err = CatalogError::not_found("Entry", EntryId::new(42));
        assert_eq!(err.to_string(), "Entry not found: 42");

        let err = CatalogError::invalid("file name cannot be empty");
        assert_eq!(err.to_string(), "Invalid input: file name cannot be empty");
    }

    #[test]
    fn catalog_error_from_anyhow_keeps_context() {
        let err: CatalogError = anyhow::anyhow!("disk I/O error")
            .context("Failed to query entry by ID")
            .into();
        assert_eq!(
            err.to_string(),
            "Database error: Failed to query entry by ID: disk I/O error"
        );
    }

    #[test]
    fn catalog_error_from_db_err() {
        let err: CatalogError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, CatalogError::Database(msg) if msg.contains("boom")));
    }
}
