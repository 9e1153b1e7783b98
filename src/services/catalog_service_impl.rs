//! `SeaORM` implementation of the `CatalogService` trait.
//!
//! A list query runs in four steps: collection memberships are resolved,
//! the filter compiles to one SQL statement, and the matched rows are
//! grouped, ordered and paged in memory. The page is then hydrated with
//! batched lookups.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::virtual_collection::decode_id;
use crate::catalog::{
    EntryFilters, LetterOffset, MainSiblingFlags, QueryPlan, ResolvedMemberships, SortContext,
    SortField, VirtualCollection, VirtualCollectionKind, collapse, compile, sort_entries,
};
use crate::config::CatalogConfig;
use crate::db::Store;
use crate::domain::{EntryId, SortOrder, UserId};
use crate::entities::{collections, entries, entry_files, entry_metadata, entry_users, platforms};
use crate::models::entry::{
    CatalogEntry, EntryPage, EntryQuery, EntryUpdate, FileUpdate, MetadataInput, NewCollection,
    NewEntry, NewEntryFile, NewPlatform, Page, UserStateUpdate,
};
use crate::services::catalog_service::{CatalogError, CatalogService, paginate};

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// SeaORM-based implementation of [`CatalogService`].
pub struct SeaOrmCatalogService {
    store: Arc<Store>,
    catalog: CatalogConfig,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Arc<Store>, catalog: CatalogConfig) -> Self {
        Self { store, catalog }
    }

    /// Looks up the entry ids behind the collection-style filters.
    async fn resolve_memberships(
        &self,
        filters: &EntryFilters,
        user: Option<i32>,
    ) -> Result<ResolvedMemberships, CatalogError> {
        let collection = match filters.collection_id {
            Some(id) => self
                .store
                .get_collection(id)
                .await?
                .map(|c| c.entry_ids()),
            None => None,
        };

        let virtual_collection = match non_empty(filters.virtual_collection_id.as_deref()) {
            Some(id) => match decode_id(id) {
                Ok((name, kind)) => {
                    let members = self
                        .store
                        .get_virtual_collection_members(&name, kind)
                        .await?;
                    (!members.is_empty()).then_some(members)
                }
                Err(e) => {
                    warn!("Ignoring virtual collection filter {id:?}: {e}");
                    None
                }
            },
            None => None,
        };

        let favourites = match (filters.favourite, user) {
            (Some(_), Some(user_id)) => self
                .store
                .get_favourites(user_id)
                .await?
                .map(|c| c.entry_ids()),
            _ => None,
        };

        Ok(ResolvedMemberships {
            collection,
            virtual_collection,
            favourites,
        })
    }

    /// The filtered, grouped and ordered result of `query`, before paging.
    async fn ordered_entries(
        &self,
        query: &EntryQuery,
    ) -> Result<Vec<entries::Model>, CatalogError> {
        let user = query.user_id.map(|u| u.value());

        let resolved = self.resolve_memberships(&query.filters, user).await?;
        let plan = compile(
            &query.filters,
            &resolved,
            QueryPlan::new(self.store.dialect(), user),
        );
        let mut rows = self.store.find_entries(plan).await?;

        let order_by = query
            .order_by
            .as_deref()
            .unwrap_or(&self.catalog.default_order_by);
        let order_dir = query
            .order_dir
            .as_deref()
            .unwrap_or(&self.catalog.default_order_dir);
        let field = SortField::resolve(Some(order_by), user.is_some());
        let order = SortOrder::parse(Some(order_dir));

        let needs_users = query.group_by_meta_id || matches!(field, SortField::User(_));
        let users = match user {
            Some(user_id) if needs_users => {
                let ids: Vec<i32> = rows.iter().map(|e| e.id).collect();
                self.store.get_user_states(user_id, &ids).await?
            }
            _ => HashMap::new(),
        };

        if query.group_by_meta_id {
            let matched = rows.len();
            let flags: MainSiblingFlags = users
                .iter()
                .map(|(id, state)| (*id, state.is_main_sibling))
                .collect();
            rows = collapse(rows, user.map(|_| &flags));
            debug!("Grouped {} entries into {} titles", matched, rows.len());
        }

        let ids: Vec<i32> = rows.iter().map(|e| e.id).collect();
        let metadata = match field {
            SortField::Metadata(_) => self.store.get_metadata(&ids).await?,
            _ => HashMap::new(),
        };
        let sizes = match field {
            SortField::Computed(_) => self.store.get_total_sizes(&ids).await?,
            _ => HashMap::new(),
        };

        let ctx = SortContext {
            users: &users,
            metadata: &metadata,
            sizes: &sizes,
        };
        debug!("Ordering {} entries by {} ({:?})", rows.len(), field.key(), order);
        Ok(sort_entries(rows, field, order, &ctx))
    }

    /// Attaches files, user state, metadata and sibling ids to `rows`,
    /// keeping their order.
    async fn hydrate(
        &self,
        rows: Vec<entries::Model>,
        user: Option<UserId>,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|e| e.id).collect();

        let (files, metadata, siblings, users) = tokio::join!(
            self.store.get_files(&ids),
            self.store.get_metadata(&ids),
            self.store.get_sibling_ids_for(&rows),
            async {
                match user {
                    Some(user) => self.store.get_user_states(user.value(), &ids).await,
                    None => Ok(HashMap::new()),
                }
            }
        );

        let mut files = files?;
        let mut metadata = metadata?;
        let mut siblings = siblings?;
        let mut users = users?;

        Ok(rows
            .into_iter()
            .map(|entry| {
                let files = files.remove(&entry.id).unwrap_or_default();
                let fs_size_bytes = files.iter().map(|f| f.file_size_bytes).sum();
                CatalogEntry {
                    files,
                    user_state: users.remove(&entry.id),
                    metadata: metadata.remove(&entry.id),
                    sibling_ids: siblings.remove(&entry.id).unwrap_or_default(),
                    fs_size_bytes,
                    entry,
                }
            })
            .collect())
    }

    async fn require_entry(&self, id: EntryId) -> Result<entries::Model, CatalogError> {
        self.store
            .get_entry(id.value())
            .await?
            .ok_or_else(|| CatalogError::not_found("Entry", id))
    }
}

fn check_file_size(size: Option<i64>) -> Result<(), CatalogError> {
    match size {
        Some(size) if size < 0 => Err(CatalogError::invalid(format!(
            "file size cannot be negative: {size}"
        ))),
        _ => Ok(()),
    }
}

fn check_not_blank(field: &str, value: Option<&str>) -> Result<(), CatalogError> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(CatalogError::invalid(format!("{field} cannot be empty")))
        }
        _ => Ok(()),
    }
}

#[async_trait::async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn query_entries(&self, query: &EntryQuery) -> Result<EntryPage, CatalogError> {
        let rows = self.ordered_entries(query).await?;
        let total = rows.len();

        let requested = query.page.unwrap_or(Page {
            offset: 0,
            limit: self.catalog.page_size,
        });
        let page = Page {
            offset: requested.offset,
            limit: self.catalog.clamp_limit(requested.limit),
        };

        let items = self.hydrate(paginate(rows, page), query.user_id).await?;

        Ok(EntryPage {
            total,
            offset: page.offset,
            items,
        })
    }

    async fn char_index(&self, query: &EntryQuery) -> Result<Vec<LetterOffset>, CatalogError> {
        let rows = self.ordered_entries(query).await?;
        Ok(crate::catalog::char_index(&rows))
    }

    async fn get_entry(
        &self,
        id: EntryId,
        user: Option<UserId>,
    ) -> Result<CatalogEntry, CatalogError> {
        let entry = self.require_entry(id).await?;
        self.hydrate(vec![entry], user)
            .await?
            .pop()
            .ok_or_else(|| CatalogError::not_found("Entry", id))
    }

    async fn add_entry(&self, input: &NewEntry) -> Result<entries::Model, CatalogError> {
        check_not_blank("fs_name", Some(input.fs_name.as_str()))?;
        check_not_blank("name", Some(input.name.as_str()))?;

        if self.store.get_platform(input.platform_id).await?.is_none() {
            return Err(CatalogError::not_found("Platform", input.platform_id));
        }

        Ok(self.store.add_entry(input).await?)
    }

    async fn get_entries_by_fs_name(
        &self,
        platform_id: i32,
        fs_names: &[String],
    ) -> Result<HashMap<String, entries::Model>, CatalogError> {
        Ok(self
            .store
            .get_entries_by_fs_name(platform_id, fs_names)
            .await?)
    }

    async fn update_entry(
        &self,
        id: EntryId,
        update: &EntryUpdate,
    ) -> Result<entries::Model, CatalogError> {
        check_not_blank("fs_name", update.fs_name.as_deref())?;
        check_not_blank("name", update.name.as_deref())?;

        self.store
            .update_entry(id.value(), update)
            .await?
            .ok_or_else(|| CatalogError::not_found("Entry", id))
    }

    async fn delete_entry(&self, id: EntryId) -> Result<(), CatalogError> {
        if self.store.delete_entry(id.value()).await? {
            Ok(())
        } else {
            Err(CatalogError::not_found("Entry", id))
        }
    }

    async fn recompute_missing(
        &self,
        platform_id: i32,
        present: &[String],
    ) -> Result<Vec<entries::Model>, CatalogError> {
        let changed = self.store.mark_missing(platform_id, present).await?;
        debug!(
            "Missing-file recompute on platform {}: {} present, {} newly missing",
            platform_id,
            present.len(),
            changed.len()
        );
        Ok(changed)
    }

    async fn clear_missing(
        &self,
        platform_id: i32,
        present: &[String],
    ) -> Result<Vec<entries::Model>, CatalogError> {
        let restored = self.store.clear_missing(platform_id, present).await?;
        if !restored.is_empty() {
            info!(
                "Restored {} entries on platform {}",
                restored.len(),
                platform_id
            );
        }
        Ok(restored)
    }

    async fn upsert_user_state(
        &self,
        id: EntryId,
        user: UserId,
        update: &UserStateUpdate,
    ) -> Result<entry_users::Model, CatalogError> {
        self.store
            .upsert_user_state(id.value(), user.value(), update)
            .await?
            .ok_or_else(|| CatalogError::not_found("Entry", id))
    }

    async fn get_user_state(
        &self,
        id: EntryId,
        user: UserId,
    ) -> Result<Option<entry_users::Model>, CatalogError> {
        Ok(self
            .store
            .get_user_state(id.value(), user.value())
            .await?)
    }

    async fn add_file(
        &self,
        id: EntryId,
        file: &NewEntryFile,
    ) -> Result<entry_files::Model, CatalogError> {
        check_file_size(Some(file.file_size_bytes))?;
        check_not_blank("file_name", Some(file.file_name.as_str()))?;

        self.store
            .add_file(id.value(), file)
            .await?
            .ok_or_else(|| CatalogError::not_found("Entry", id))
    }

    async fn update_file(
        &self,
        file_id: i32,
        update: &FileUpdate,
    ) -> Result<entry_files::Model, CatalogError> {
        check_file_size(update.file_size_bytes)?;
        check_not_blank("file_name", update.file_name.as_deref())?;

        self.store
            .update_file(file_id, update)
            .await?
            .ok_or_else(|| CatalogError::not_found("File", file_id))
    }

    async fn get_file(&self, file_id: i32) -> Result<entry_files::Model, CatalogError> {
        self.store
            .get_file(file_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("File", file_id))
    }

    async fn purge_files(&self, id: EntryId) -> Result<Vec<entry_files::Model>, CatalogError> {
        self.require_entry(id).await?;
        Ok(self.store.purge_files(id.value()).await?)
    }

    async fn create_collection(
        &self,
        input: &NewCollection,
    ) -> Result<collections::Model, CatalogError> {
        check_not_blank("collection name", Some(input.name.as_str()))?;
        Ok(self.store.create_collection(input).await?)
    }

    async fn get_collection(&self, id: i32) -> Result<collections::Model, CatalogError> {
        self.store
            .get_collection(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Collection", id))
    }

    async fn favourites_for(
        &self,
        user: UserId,
    ) -> Result<Option<collections::Model>, CatalogError> {
        Ok(self.store.get_favourites(user.value()).await?)
    }

    async fn add_platform(&self, input: &NewPlatform) -> Result<platforms::Model, CatalogError> {
        check_not_blank("platform slug", Some(input.slug.as_str()))?;
        Ok(self.store.add_platform(input).await?)
    }

    async fn get_platform(&self, id: i32) -> Result<platforms::Model, CatalogError> {
        self.store
            .get_platform(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Platform", id))
    }

    async fn upsert_metadata(
        &self,
        id: EntryId,
        input: &MetadataInput,
    ) -> Result<entry_metadata::Model, CatalogError> {
        self.store
            .upsert_metadata(id.value(), input)
            .await?
            .ok_or_else(|| CatalogError::not_found("Entry", id))
    }

    async fn list_virtual_collections(
        &self,
        kind: VirtualCollectionKind,
    ) -> Result<Vec<VirtualCollection>, CatalogError> {
        Ok(self.store.list_virtual_collections(kind).await?)
    }
}
