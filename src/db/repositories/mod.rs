pub mod collection;
pub mod entry;
pub mod entry_file;
pub mod entry_user;
pub mod metadata;
pub mod platform;
