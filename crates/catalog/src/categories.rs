//! Built-in category lists used when neither cache nor network has one

use appstore_core::model::{AppType, ImageMap, StoreCategory};
use indexmap::IndexMap;

const ICON_SIZE: &str = "88x88";

fn category(id: &str, name: &str, slug: &str, color: &str, icon: Option<&str>) -> StoreCategory {
    let icon: ImageMap = icon
        .map(|url| (ICON_SIZE.to_string(), Some(url.to_string())))
        .into_iter()
        .collect();
    let links: IndexMap<String, String> = [(
        "apps".to_string(),
        format!("/api/v1/apps/category/{slug}"),
    )]
    .into_iter()
    .collect();
    StoreCategory {
        application_ids: Vec::new(),
        color: color.into(),
        icon,
        id: id.into(),
        links,
        name: name.into(),
        slug: slug.into(),
    }
}

/// Default categories for `app_type`
#[must_use]
pub fn default_categories(app_type: AppType) -> Vec<StoreCategory> {
    match app_type {
        AppType::Watchface => vec![category(
            "528d3ef2dc7b5f580700000a",
            "Faces",
            "faces",
            "ffffff",
            None,
        )],
        AppType::Watchapp => vec![
            category(
                "5261a8fb3b773043d500000c",
                "Daily",
                "daily",
                "3db9e6",
                Some("https://assets2.rebble.io/88x88/0QTBuPgXR8GAOMW0fJaA"),
            ),
            category(
                "5261a8fb3b773043d500000f",
                "Tools & Utilities",
                "tools-and-utilities",
                "fdbf37",
                Some("https://assets2.rebble.io/88x88/Lhxn2MNYQruUOPNkreOs"),
            ),
            category(
                "5261a8fb3b773043d5000001",
                "Notifications",
                "notifications",
                "FF9000",
                Some("https://assets2.rebble.io/88x88/WLi53fwzS2CKqMOAytF7"),
            ),
            category(
                "5261a8fb3b773043d5000008",
                "Remotes",
                "remotes",
                "fc4b4b",
                Some("https://assets2.rebble.io/88x88/TpLgG0W6TT6Pt6Nm3t91"),
            ),
            category(
                "5261a8fb3b773043d5000004",
                "Health & Fitness",
                "health-and-fitness",
                "98D500",
                Some("https://assets2.rebble.io/88x88/xeW2tf3BSmWWBRyfmCZn"),
            ),
            category(
                "5261a8fb3b773043d5000012",
                "Games",
                "games",
                "b57ad3",
                Some("https://assets2.rebble.io/88x88/Xji7xwyYSzqR1ANNhTyi"),
            ),
        ],
    }
}
