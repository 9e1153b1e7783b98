pub use super::collections::Entity as Collections;
pub use super::entries::Entity as Entries;
pub use super::entry_files::Entity as EntryFiles;
pub use super::entry_metadata::Entity as EntryMetadata;
pub use super::entry_users::Entity as EntryUsers;
pub use super::platforms::Entity as Platforms;
