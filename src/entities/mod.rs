pub mod prelude;

pub mod collections;
pub mod entries;
pub mod entry_files;
pub mod entry_metadata;
pub mod entry_users;
pub mod platforms;
