use super::{Globals, Services, print_json};
use crate::errors::CliError;
use appstore_core::compat::resolve;
use appstore_core::model::{AppType, StoreApplication, StoreCategory, StoreSearchResult};
use appstore_core::sources::{CatalogSource, SourceId};
use serde_json::json;

fn app_line(app: &StoreApplication, globals: Globals, services: &Services) -> String {
    let version = app
        .latest_release
        .as_ref()
        .map_or("-", |release| release.version.as_str());
    let fit = globals.hardware.map_or(String::new(), |hardware| {
        let client = services.aggregator.context().client_platform();
        let result = resolve(app, hardware, client);
        let label = match (result.is_compatible, result.is_natively_compatible) {
            (false, _) => "incompatible",
            (true, true) => "native",
            (true, false) => "scaled",
        };
        format!("  [{label}]")
    });
    format!(
        "{:<26} {} by {} ({version}){fit}",
        app.id, app.title, app.author
    )
}

fn source_header(source: &CatalogSource) -> String {
    format!("== {} ({})", source.title, source.url)
}

pub async fn app(
    services: &Services,
    globals: Globals,
    id: &str,
    source_id: Option<SourceId>,
) -> miette::Result<()> {
    let found: Vec<(CatalogSource, StoreApplication)> = match source_id {
        Some(source_id) => {
            let source = services
                .registry
                .get(source_id)
                .await?
                .ok_or_else(|| appstore_core::Error::not_found("Source", source_id))?;
            services
                .aggregator
                .fetch_app(source_id, id, globals.hardware, globals.use_cache)
                .await
                .into_iter()
                .flat_map(|response| response.data)
                .map(|app| (source.clone(), app))
                .collect()
        }
        None => services
            .aggregator
            .fetch_across_sources(true, |client| async move {
                client.fetch_app(id, globals.hardware, globals.use_cache).await
            })
            .await
            .into_iter()
            .flat_map(|(source, response)| {
                response
                    .into_iter()
                    .flat_map(|r| r.data)
                    .map(move |app| (source.clone(), app))
            })
            .collect(),
    };

    if found.is_empty() {
        return Err(CliError::not_found(format!("app {id}")).into());
    }
    if globals.json {
        let value: Vec<_> = found
            .iter()
            .map(|(source, app)| json!({"source": source, "app": app}))
            .collect();
        return print_json(&value);
    }
    for (source, app) in &found {
        println!("{}", source_header(source));
        println!("{}", app_line(app, globals, services));
        if !app.description.is_empty() {
            println!("    {}", app.description);
        }
    }
    Ok(())
}

pub async fn home(
    services: &Services,
    globals: Globals,
    app_type: AppType,
    include_disabled: bool,
) -> miette::Result<()> {
    let homes = services
        .aggregator
        .fetch_home(app_type, globals.hardware, !include_disabled, globals.use_cache)
        .await;

    if globals.json {
        let value: Vec<_> = homes
            .iter()
            .map(|(source, home)| json!({"source": source, "home": home}))
            .collect();
        return print_json(&value);
    }
    for (source, home) in &homes {
        println!("{}", source_header(source));
        match home {
            Some(home) => {
                for app in &home.applications {
                    println!("  {}", app_line(app, globals, services));
                }
                let collections: Vec<_> = home.collections.iter().map(|c| c.slug.as_str()).collect();
                if !collections.is_empty() {
                    println!("  collections: {}", collections.join(", "));
                }
            }
            None => println!("  (unavailable)"),
        }
    }
    Ok(())
}

pub async fn categories(
    services: &Services,
    globals: Globals,
    app_type: AppType,
    source_id: Option<SourceId>,
) -> miette::Result<()> {
    let per_source: Vec<(CatalogSource, Vec<StoreCategory>)> = match source_id {
        Some(source_id) => {
            let source = services
                .registry
                .get(source_id)
                .await?
                .ok_or_else(|| appstore_core::Error::not_found("Source", source_id))?;
            let categories = services
                .aggregator
                .fetch_categories(app_type, source_id, globals.use_cache)
                .await;
            vec![(source, categories)]
        }
        None => services
            .aggregator
            .fetch_across_sources(true, |client| async move {
                Some(client.fetch_categories(app_type, globals.use_cache).await)
            })
            .await
            .into_iter()
            .map(|(source, categories)| (source, categories.unwrap_or_default()))
            .collect(),
    };

    if globals.json {
        let value: Vec<_> = per_source
            .iter()
            .map(|(source, categories)| json!({"source": source, "categories": categories}))
            .collect();
        return print_json(&value);
    }
    for (source, categories) in &per_source {
        println!("{}", source_header(source));
        for category in categories {
            println!("  {:<24} {}", category.slug, category.name);
        }
    }
    Ok(())
}

fn hit_line(hit: &StoreSearchResult) -> String {
    format!("{:<26} {} by {} [{}]", hit.id, hit.title, hit.author, hit.kind)
}

pub async fn search(
    services: &Services,
    globals: Globals,
    query: &str,
    app_type: Option<AppType>,
) -> miette::Result<()> {
    let results = services.aggregator.search(query, app_type).await;

    if globals.json {
        let value: Vec<_> = results
            .iter()
            .map(|(source, hits)| json!({"source": source, "hits": hits}))
            .collect();
        return print_json(&value);
    }
    for (source, hits) in &results {
        println!("{}", source_header(source));
        if hits.is_empty() {
            println!("  (no results)");
        }
        for hit in hits {
            println!("  {}", hit_line(hit));
        }
    }
    Ok(())
}
