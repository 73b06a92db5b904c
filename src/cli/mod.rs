//! CLI Module for linkbundle
//! Command-line access to the link collection: every command opens the
//! persisted state, applies one operation and lets the store save it.

pub mod commands;
pub mod tree;

use crate::config::Config;
use crate::models::StorageManager;
use crate::store::StateStore;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "linkbundle")]
#[command(version, about = "Organize links into categories, share bundles and plan activities")]
pub struct Cli {
    /// Directory holding the state file (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to an alternative config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show categories and their links as a tree
    #[command(alias = "ls")]
    List {
        /// Only show links in this category
        #[arg(short, long)]
        category: Option<String>,
        /// Only show highlighted links
        #[arg(long)]
        highlighted: bool,
        /// Match title, description or URL
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Add a link
    AddLink {
        title: String,
        url: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Category name (defaults to the first category)
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        highlight: bool,
        /// telegram, discord or x; detected from the URL when omitted
        #[arg(long)]
        platform: Option<String>,
    },

    /// Change fields of a link; omitted flags are left as they are
    EditLink {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Move to this category
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long, value_name = "BOOL")]
        highlighted: Option<bool>,
        #[arg(long, conflicts_with = "clear_platform")]
        platform: Option<String>,
        #[arg(long)]
        clear_platform: bool,
        #[arg(long, conflicts_with = "clear_order", allow_negative_numbers = true)]
        order: Option<i64>,
        #[arg(long)]
        clear_order: bool,
    },

    /// Delete a link and drop it from bundles and activities
    DeleteLink { id: String },

    /// Toggle the highlight flag of a link
    Highlight { id: String },

    /// Store a display order; links are numbered in the order given
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// List categories
    Categories,

    /// Add a category
    AddCategory {
        name: String,
        #[arg(long, default_value = "#6B7280")]
        color: String,
        #[arg(long)]
        icon: Option<String>,
    },

    /// Rename or recolor a category
    EditCategory {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long, conflicts_with = "clear_icon")]
        icon: Option<String>,
        #[arg(long)]
        clear_icon: bool,
    },

    /// Delete a category, moving its links to the fallback category
    DeleteCategory { id: String },

    /// List bundles
    Bundles,

    /// Create a bundle from existing links
    AddBundle {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        links: Vec<String>,
    },

    /// Rename a bundle or change its links
    EditBundle {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Append a link (repeatable)
        #[arg(long = "add", value_name = "LINK")]
        add: Vec<String>,
        /// Remove a link (repeatable)
        #[arg(long = "remove", value_name = "LINK")]
        remove: Vec<String>,
    },

    /// Delete a bundle (its links are kept)
    DeleteBundle { id: String },

    /// Print the share code and share URL of a bundle
    Share { id: String },

    /// Import the links of a shared bundle
    ImportShare {
        /// Share code or full share URL
        code: String,
        /// Also import links whose URL is already stored
        #[arg(long)]
        all: bool,
    },

    /// Show the contents of a share code without importing it
    Decode { code: String },

    /// Show scheduled activities grouped by day
    Schedule {
        /// Only show the next N open activities
        #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "5")]
        upcoming: Option<usize>,
    },

    /// Schedule an activity
    AddActivity {
        title: String,
        /// Date as YYYY-MM-DD
        date: String,
        /// Time as HH:MM
        #[arg(long)]
        time: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Attach a link (repeatable)
        #[arg(long = "link")]
        links: Vec<String>,
        #[arg(long)]
        color: Option<String>,
    },

    /// Change fields of a scheduled activity
    EditActivity {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// Time as HH:MM
        #[arg(long, conflicts_with = "clear_time")]
        time: Option<String>,
        #[arg(long)]
        clear_time: bool,
        /// Attach a link (repeatable)
        #[arg(long = "add", value_name = "LINK")]
        add: Vec<String>,
        /// Detach a link (repeatable)
        #[arg(long = "remove", value_name = "LINK")]
        remove: Vec<String>,
        #[arg(long, conflicts_with = "clear_color")]
        color: Option<String>,
        #[arg(long)]
        clear_color: bool,
    },

    /// Toggle an activity's completion
    Complete { id: String },

    /// Delete an activity
    DeleteActivity { id: String },

    /// Export all data to a file
    Export {
        path: Option<PathBuf>,
        #[arg(long)]
        yaml: bool,
    },

    /// Replace all data with the contents of an export file
    Import { path: PathBuf },

    /// Delete all data and restore the default categories
    Clear {
        #[arg(long)]
        yes: bool,
    },

    /// Show how much data is stored
    Stats,

    /// Copy the state file into the backups directory
    Backup,
}

/// Executes a parsed command against the persisted state
pub fn execute(command: Command, config: &Config) -> Result<()> {
    // Decoding needs no state
    if let Command::Decode { code } = &command {
        return commands::decode(code);
    }

    let storage = StorageManager::new(config).context("Failed to open data directory")?;
    debug!(path = %storage.state_file().display(), "Opening state");
    let mut store = StateStore::open(storage);
    if store.is_read_only() {
        println!(
            "{}  {} saved data could not be read; changes in this run will not be saved",
            tree::margin(),
            "warning:".bright_yellow()
        );
    }

    match command {
        Command::List {
            category,
            highlighted,
            search,
        } => commands::list(&store, category.as_deref(), highlighted, search.as_deref()),
        Command::AddLink {
            title,
            url,
            description,
            category,
            highlight,
            platform,
        } => commands::add_link(
            &mut store,
            commands::AddLinkArgs {
                title: &title,
                url: &url,
                description: description.as_deref(),
                category: category.as_deref(),
                highlight,
                platform: platform.as_deref(),
            },
        ),
        Command::EditLink {
            id,
            title,
            url,
            description,
            category,
            highlighted,
            platform,
            clear_platform,
            order,
            clear_order,
        } => commands::edit_link(
            &mut store,
            &id,
            commands::EditLinkArgs {
                title: title.as_deref(),
                url: url.as_deref(),
                description: description.as_deref(),
                category: category.as_deref(),
                highlighted,
                platform: platform.as_deref(),
                clear_platform,
                order,
                clear_order,
            },
        ),
        Command::DeleteLink { id } => commands::delete_link(&mut store, &id),
        Command::Highlight { id } => commands::toggle_highlight(&mut store, &id),
        Command::Reorder { ids } => commands::reorder(&mut store, &ids),
        Command::Categories => commands::categories(&store),
        Command::AddCategory { name, color, icon } => {
            commands::add_category(&mut store, &name, &color, icon.as_deref())
        }
        Command::EditCategory {
            id,
            name,
            color,
            icon,
            clear_icon,
        } => commands::edit_category(
            &mut store,
            &id,
            name.as_deref(),
            color.as_deref(),
            icon.as_deref(),
            clear_icon,
        ),
        Command::DeleteCategory { id } => commands::delete_category(&mut store, &id),
        Command::Bundles => commands::bundles(&store),
        Command::AddBundle {
            name,
            description,
            links,
        } => commands::add_bundle(&mut store, &name, description.as_deref(), &links),
        Command::EditBundle {
            id,
            name,
            description,
            add,
            remove,
        } => commands::edit_bundle(
            &mut store,
            &id,
            commands::EditBundleArgs {
                name: name.as_deref(),
                description: description.as_deref(),
                add: &add,
                remove: &remove,
            },
        ),
        Command::DeleteBundle { id } => commands::delete_bundle(&mut store, &id),
        Command::Share { id } => commands::share(&mut store, config, &id),
        Command::ImportShare { code, all } => commands::import_share(&mut store, &code, all),
        Command::Decode { .. } => Ok(()),
        Command::Schedule { upcoming } => commands::schedule(&store, upcoming),
        Command::AddActivity {
            title,
            date,
            time,
            description,
            links,
            color,
        } => commands::add_activity(
            &mut store,
            commands::AddActivityArgs {
                title: &title,
                date: &date,
                time: time.as_deref(),
                description: description.as_deref(),
                links: &links,
                color: color.as_deref(),
            },
        ),
        Command::EditActivity {
            id,
            title,
            description,
            date,
            time,
            clear_time,
            add,
            remove,
            color,
            clear_color,
        } => commands::edit_activity(
            &mut store,
            &id,
            commands::EditActivityArgs {
                title: title.as_deref(),
                description: description.as_deref(),
                date: date.as_deref(),
                time: time.as_deref(),
                clear_time,
                add: &add,
                remove: &remove,
                color: color.as_deref(),
                clear_color,
            },
        ),
        Command::Complete { id } => commands::complete(&mut store, &id),
        Command::DeleteActivity { id } => commands::delete_activity(&mut store, &id),
        Command::Export { path, yaml } => commands::export(&store, path.as_deref(), yaml),
        Command::Import { path } => commands::import(&mut store, &path),
        Command::Clear { yes } => commands::clear(&mut store, yes),
        Command::Stats => commands::stats(&store),
        Command::Backup => commands::backup(&store),
    }
}
