use crate::logging::{LogLevel, TracingFormat};
use appstore_core::model::{AppType, WatchPlatform};
use appstore_core::sources::SourceId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "appstore")]
#[command(about = "Browse watch app catalogs and resolve the locker, offline first")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'c',
        long,
        global = true,
        env = "APPSTORE_CONFIG",
        help = "Path to config.toml"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    #[arg(long, global = true, help = "Bypass the disk cache")]
    pub refresh: bool,

    #[arg(long, global = true, help = "Watch hardware family (aplite, basalt, chalk, ...)")]
    pub hardware: Option<WatchPlatform>,

    #[arg(long, global = true, help = "Print JSON instead of text")]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Manage catalog sources")]
    Sources {
        #[command(subcommand)]
        subcommand: SourceCommands,
    },
    #[command(about = "Fetch one application by store id")]
    App {
        id: String,
        #[arg(long, help = "Only ask this source")]
        source: Option<SourceId>,
    },
    #[command(about = "Fetch the home bundle of every source")]
    Home {
        #[arg(help = "apps or faces")]
        app_type: AppType,
        #[arg(long, help = "Include disabled sources")]
        all: bool,
    },
    #[command(about = "List store categories")]
    Categories {
        #[arg(help = "apps or faces")]
        app_type: AppType,
        #[arg(long, help = "Only ask this source")]
        source: Option<SourceId>,
    },
    #[command(about = "Search every enabled source")]
    Search {
        query: String,
        #[arg(long = "type", help = "Restrict to apps or faces")]
        app_type: Option<AppType>,
    },
    #[command(about = "Resolve the locker view from a locker file")]
    Locker {
        #[arg(help = "apps or faces")]
        app_type: AppType,
        #[arg(long, help = "JSON array of local locker entries")]
        locker: PathBuf,
        #[arg(long, help = "JSON array of account locker rows")]
        account: Option<PathBuf>,
        #[arg(long, short = 's', help = "Filter by title or developer")]
        search: Option<String>,
        #[arg(long, help = "Keep entries the watch cannot run")]
        show_incompatible: bool,
        #[arg(long, help = "Drop entries that only run scaled")]
        hide_scaled: bool,
        #[arg(long, help = "Add store search hits for --search")]
        store_search: bool,
    },
}

impl Commands {
    /// Name used in the command span
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sources { subcommand } => match subcommand {
                SourceCommands::List => "sources list",
                SourceCommands::Add { .. } => "sources add",
                SourceCommands::Enable { .. } => "sources enable",
                SourceCommands::Disable { .. } => "sources disable",
                SourceCommands::Remove { .. } => "sources remove",
            },
            Self::App { .. } => "app",
            Self::Home { .. } => "home",
            Self::Categories { .. } => "categories",
            Self::Search { .. } => "search",
            Self::Locker { .. } => "locker",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SourceCommands {
    #[command(about = "List configured sources")]
    List,
    // Sources without search credentials are dropped by the next reseed
    #[command(about = "Add a catalog source")]
    Add {
        #[arg(help = "Base URL, e.g. https://appstore-api.example.com/api")]
        url: String,
        title: String,
        #[arg(long)]
        search_app_id: String,
        #[arg(long)]
        search_api_key: String,
        #[arg(long)]
        search_index: String,
    },
    #[command(about = "Enable a source")]
    Enable { id: SourceId },
    #[command(about = "Disable a source")]
    Disable { id: SourceId },
    #[command(about = "Remove a source and its collections")]
    Remove { id: SourceId },
}
