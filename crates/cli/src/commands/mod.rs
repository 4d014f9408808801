pub mod catalog;
pub mod locker;
pub mod sources;

use crate::cli::{Cli, Commands};
use crate::errors::CliError;
use appstore_cache::DiskCache;
use appstore_catalog::{Aggregator, CatalogContext};
use appstore_core::model::WatchPlatform;
use appstore_core::sources::JsonFileStore;
use appstore_core::{Config, SourceRegistry};
use serde::Serialize;
use std::sync::Arc;

/// Flags shared by every command
#[derive(Debug, Clone, Copy)]
pub struct Globals {
    pub json: bool,
    pub use_cache: bool,
    pub hardware: Option<WatchPlatform>,
}

impl Globals {
    pub fn require_hardware(&self) -> miette::Result<WatchPlatform> {
        self.hardware.ok_or_else(|| {
            CliError::invalid_argument("--hardware", "pass the watch family, e.g. --hardware basalt")
                .into()
        })
    }
}

/// Registry, cache and aggregator built from configuration
pub struct Services {
    pub config: Config,
    pub registry: Arc<SourceRegistry>,
    pub aggregator: Arc<Aggregator>,
}

impl Services {
    /// Open the persisted sources, seeding defaults when needed
    pub async fn open(config: Config) -> miette::Result<Self> {
        let cache = DiskCache::new(config.resolve_cache_root()?).with_policies(config.cache_policies());
        let data_dir = config.data_dir();
        let store = Arc::new(JsonFileStore::open_in(&data_dir).await?);
        tracing::debug!(path = %store.path().display(), "opened source store");

        let registry = Arc::new(SourceRegistry::new(store.clone(), store).with_cache(cache.clone()));
        if registry.initialize().await? {
            tracing::info!("seeded default catalog sources");
        }

        let ctx = CatalogContext::from_config(&config, cache)?;
        let aggregator = Arc::new(Aggregator::new(Arc::clone(&registry), Arc::new(ctx)));
        Ok(Self {
            config,
            registry,
            aggregator,
        })
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> miette::Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|source| CliError::Output { source })?;
    println!("{text}");
    Ok(())
}

/// Run the parsed command
pub async fn execute(cli: Cli, config: Config) -> miette::Result<()> {
    let globals = Globals {
        json: cli.json,
        use_cache: !cli.refresh,
        hardware: cli.hardware,
    };
    let services = Services::open(config).await?;

    match cli.command {
        Commands::Sources { subcommand } => sources::execute(&services, globals, subcommand).await,
        Commands::App { id, source } => catalog::app(&services, globals, &id, source).await,
        Commands::Home { app_type, all } => catalog::home(&services, globals, app_type, all).await,
        Commands::Categories { app_type, source } => {
            catalog::categories(&services, globals, app_type, source).await
        }
        Commands::Search { query, app_type } => {
            catalog::search(&services, globals, &query, app_type).await
        }
        Commands::Locker {
            app_type,
            locker,
            account,
            search,
            show_incompatible,
            hide_scaled,
            store_search,
        } => {
            let args = locker::LockerArgs {
                app_type,
                locker,
                account,
                search: search.unwrap_or_default(),
                show_incompatible,
                show_scaled: !hide_scaled,
                store_search,
            };
            locker::execute(&services, globals, args).await
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    pub fn config(tmp: &TempDir) -> Config {
        Config {
            cache_dir: Some(tmp.path().join("cache")),
            data_dir: Some(tmp.path().join("data")),
            ..Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appstore_core::sources::PRIMARY_SOURCE_URL;

    #[tokio::test]
    async fn test_open_seeds_and_persists_sources() {
        let tmp = tempfile::TempDir::new().unwrap();
        let services = Services::open(test_support::config(&tmp)).await.unwrap();
        let sources = services.registry.list_all().await.unwrap();
        assert!(sources.iter().any(|s| s.url == PRIMARY_SOURCE_URL));
        assert!(tmp.path().join("data").join(JsonFileStore::FILE_NAME).is_file());

        // A second open keeps the seeded rows instead of reseeding
        let again = Services::open(test_support::config(&tmp)).await.unwrap();
        let ids: Vec<_> = again.registry.list_all().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, sources.iter().map(|s| s.id).collect::<Vec<_>>());
    }

    #[test]
    fn test_require_hardware() {
        let globals = Globals {
            json: false,
            use_cache: true,
            hardware: None,
        };
        assert!(globals.require_hardware().is_err());
        let globals = Globals {
            hardware: Some(WatchPlatform::Chalk),
            ..globals
        };
        assert_eq!(globals.require_hardware().unwrap(), WatchPlatform::Chalk);
    }
}
