use super::{Globals, Services, print_json};
use crate::cli::SourceCommands;
use appstore_core::SourceRegistry;
use appstore_core::sources::{CatalogSource, NewCatalogSource, SourceId};

pub async fn execute(
    services: &Services,
    globals: Globals,
    command: SourceCommands,
) -> miette::Result<()> {
    let registry = &services.registry;
    match command {
        SourceCommands::List => {
            let sources = registry.list_all().await?;
            if globals.json {
                print_json(&sources)
            } else {
                for source in &sources {
                    println!("{}", source_line(source));
                }
                Ok(())
            }
        }
        SourceCommands::Add {
            url,
            title,
            search_app_id,
            search_api_key,
            search_index,
        } => {
            let source = NewCatalogSource::new(url, title).with_search(
                search_app_id,
                search_api_key,
                search_index,
            );
            let id = registry.add(source).await?;
            tracing::info!(id, "added catalog source");
            println!("{id}");
            Ok(())
        }
        SourceCommands::Enable { id } => set_enabled(registry, id, true).await,
        SourceCommands::Disable { id } => set_enabled(registry, id, false).await,
        SourceCommands::Remove { id } => {
            require(registry, id).await?;
            registry.delete(id).await?;
            tracing::info!(id, "removed catalog source");
            Ok(())
        }
    }
}

async fn require(registry: &SourceRegistry, id: SourceId) -> miette::Result<CatalogSource> {
    registry
        .get(id)
        .await?
        .ok_or_else(|| appstore_core::Error::not_found("Source", id).into())
}

async fn set_enabled(registry: &SourceRegistry, id: SourceId, enabled: bool) -> miette::Result<()> {
    require(registry, id).await?;
    registry.set_enabled(id, enabled).await?;
    tracing::info!(id, enabled, "updated catalog source");
    Ok(())
}

fn source_line(source: &CatalogSource) -> String {
    let state = if source.enabled { "x" } else { " " };
    let search = if source.search_credentials().is_some() {
        ""
    } else {
        " (no search)"
    };
    format!("{:>3} [{state}] {}  {}{search}", source.id, source.title, source.url)
}
