//! CLI module - Command-line interface for Romshelf
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Args, Parser, Subcommand};

use crate::catalog::EntryFilters;

/// Romshelf - ROM library catalog
/// Query and maintain the catalog database from the command line
#[derive(Parser)]
#[command(name = "romshelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Filter, group, order and page the catalog
    #[command(alias = "q")]
    Query {
        #[command(flatten)]
        filters: FilterArgs,

        /// Collapse siblings into one entry per matched title
        #[arg(long)]
        group: bool,

        /// Sort key (name, fs_size_bytes, last_played, first_release_date, ...)
        #[arg(long)]
        order_by: Option<String>,

        /// asc or desc
        #[arg(long)]
        order_dir: Option<String>,

        /// Request on behalf of this user
        #[arg(long)]
        user: Option<i32>,

        /// 1-based page number
        #[arg(long, default_value = "1")]
        page: u64,

        /// Entries per page (defaults to catalog.page_size)
        #[arg(long)]
        page_size: Option<u64>,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the letter jump table of a query
    Index {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long)]
        group: bool,

        #[arg(long)]
        order_by: Option<String>,

        #[arg(long)]
        order_dir: Option<String>,

        #[arg(long)]
        user: Option<i32>,
    },

    /// Flag entries whose file is no longer on disk
    #[command(alias = "missing")]
    MarkMissing {
        /// Platform id
        #[arg(long)]
        platform: i32,

        /// Every file name currently present for the platform
        fs_names: Vec<String>,
    },

    /// Connect to the database and apply pending migrations
    Migrate,
}

/// Catalog filter flags shared by `query` and `index`.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub platform: Option<i32>,

    /// Stored collection id
    #[arg(long)]
    pub collection: Option<i32>,

    /// Virtual collection id (base64 of "name:type")
    #[arg(long)]
    pub virtual_collection: Option<String>,

    #[arg(long, short = 's')]
    pub search: Option<String>,

    #[arg(long)]
    pub matched: Option<bool>,

    #[arg(long)]
    pub favourite: Option<bool>,

    #[arg(long)]
    pub duplicate: Option<bool>,

    #[arg(long)]
    pub playable: Option<bool>,

    #[arg(long)]
    pub has_ra: Option<bool>,

    #[arg(long)]
    pub missing: Option<bool>,

    /// Only entries matched by at least one verification source
    #[arg(long)]
    pub verified: bool,

    #[arg(long)]
    pub genre: Option<String>,

    #[arg(long)]
    pub franchise: Option<String>,

    /// Metadata collection name (not a stored collection)
    #[arg(long)]
    pub meta_collection: Option<String>,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub age_rating: Option<String>,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub language: Option<String>,

    /// now_playing, backlogged, hidden or a stored status value
    #[arg(long)]
    pub status: Option<String>,
}

impl From<FilterArgs> for EntryFilters {
    fn from(args: FilterArgs) -> Self {
        Self {
            platform_id: args.platform,
            collection_id: args.collection,
            virtual_collection_id: args.virtual_collection,
            search_term: args.search,
            matched: args.matched,
            favourite: args.favourite,
            duplicate: args.duplicate,
            playable: args.playable,
            has_ra: args.has_ra,
            missing: args.missing,
            verified: args.verified.then_some(true),
            selected_genre: args.genre,
            selected_franchise: args.franchise,
            selected_collection: args.meta_collection,
            selected_company: args.company,
            selected_age_rating: args.age_rating,
            selected_region: args.region,
            selected_language: args.language,
            selected_status: args.status,
        }
    }
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_flags() {
        let cli = Cli::try_parse_from([
            "romshelf",
            "query",
            "--platform",
            "7",
            "--genre",
            "Action",
            "--favourite",
            "false",
            "--verified",
            "--group",
            "--order-by",
            "fs_size_bytes",
            "--order-dir",
            "desc",
        ])
        .unwrap();

        let Commands::Query {
            filters,
            group,
            order_by,
            order_dir,
            page,
            ..
        } = cli.command
        else {
            panic!("expected query");
        };

        assert!(group);
        assert_eq!(order_by.as_deref(), Some("fs_size_bytes"));
        assert_eq!(order_dir.as_deref(), Some("desc"));
        assert_eq!(page, 1);

        let filters = EntryFilters::from(filters);
        assert_eq!(filters.platform_id, Some(7));
        assert_eq!(filters.selected_genre.as_deref(), Some("Action"));
        assert_eq!(filters.favourite, Some(false));
        assert_eq!(filters.verified, Some(true));
        assert_eq!(filters.matched, None);
    }

    #[test]
    fn parses_mark_missing() {
        let cli =
            Cli::try_parse_from(["romshelf", "mark-missing", "--platform", "3", "a.zip", "b.zip"])
                .unwrap();

        let Commands::MarkMissing { platform, fs_names } = cli.command else {
            panic!("expected mark-missing");
        };
        assert_eq!(platform, 3);
        assert_eq!(fs_names, vec!["a.zip", "b.zip"]);
    }

    #[test]
    fn unset_verified_flag_does_not_filter() {
        let filters = EntryFilters::from(FilterArgs::default());
        assert_eq!(filters, EntryFilters::default());
    }
}
