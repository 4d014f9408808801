use super::{Globals, Services, print_json};
use appstore_core::model::AppType;
use appstore_locker::{
    LockerEntry, LockerQuery, LockerResolver, MemoryAccountLocker, MemoryLocker, Provenance,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct LockerArgs {
    pub app_type: AppType,
    pub locker: PathBuf,
    pub account: Option<PathBuf>,
    pub search: String,
    pub show_incompatible: bool,
    pub show_scaled: bool,
    pub store_search: bool,
}

/// Resolved entries and the uuids of the local locker
pub async fn resolve(
    services: &Services,
    globals: Globals,
    args: LockerArgs,
) -> miette::Result<(Vec<LockerEntry>, HashSet<Uuid>)> {
    let target = globals.require_hardware()?;
    let locker = MemoryLocker::from_json_file(&args.locker).await?;
    let mut resolver = LockerResolver::new(
        Arc::clone(&services.aggregator),
        Arc::new(locker),
        &services.config,
    )
    .with_cache(globals.use_cache);
    if let Some(path) = &args.account {
        let account = MemoryAccountLocker::from_json_file(path).await?;
        resolver = resolver.with_account_locker(Arc::new(account));
    }

    let query = LockerQuery::new(args.app_type, target)
        .with_search(args.search)
        .with_incompatible(args.show_incompatible)
        .with_scaled(args.show_scaled)
        .with_store_search(args.store_search);
    let entries = resolver.resolve_locker(&query).await;
    Ok((entries, resolver.collection_uuids().await))
}

fn entry_line(entry: &LockerEntry, collection: &HashSet<Uuid>) -> String {
    let origin = match entry.provenance {
        Provenance::Locker { sideloaded: true, .. } => "sideloaded",
        Provenance::Locker { .. } => "locker",
        Provenance::Store { .. } => "store",
        Provenance::System { .. } => "system",
    };
    let fit = if !entry.is_compatible() {
        "incompatible"
    } else if entry.is_natively_compatible() {
        "native"
    } else {
        "scaled"
    };
    let mut flags = Vec::new();
    if entry.is_synced() {
        flags.push("synced");
    }
    if !entry.in_collection(collection) {
        flags.push("not owned");
    }
    if !entry.show_on_main_screen() {
        flags.push("hidden");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" ({})", flags.join(", "))
    };
    format!(
        "{} [{origin}/{fit}] {} by {}{flags}",
        entry.uuid, entry.title, entry.developer_name
    )
}

pub async fn execute(services: &Services, globals: Globals, args: LockerArgs) -> miette::Result<()> {
    let (entries, collection) = resolve(services, globals, args).await?;
    if globals.json {
        return print_json(&entries);
    }
    for entry in &entries {
        println!("{}", entry_line(entry, &collection));
    }
    Ok(())
}
