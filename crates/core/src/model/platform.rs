//! App kinds, phone platforms and watch hardware families

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of catalog entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    /// A watchface
    Watchface,
    /// An interactive watch app
    Watchapp,
}

impl AppType {
    /// Every app type, apps first
    pub const ALL: [Self; 2] = [Self::Watchapp, Self::Watchface];

    /// Code used in payloads and search tags
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Watchface => "watchface",
            Self::Watchapp => "watchapp",
        }
    }

    /// Path segment used by store endpoints
    #[must_use]
    pub const fn store_path(self) -> &'static str {
        match self {
            Self::Watchface => "faces",
            Self::Watchapp => "apps",
        }
    }

    /// Parse a payload code (`watchface`, `watchapp`).
    #[must_use]
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "watchface" => Some(Self::Watchface),
            "watchapp" => Some(Self::Watchapp),
            _ => None,
        }
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for AppType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "watchface" | "face" | "faces" => Ok(Self::Watchface),
            "watchapp" | "app" | "apps" => Ok(Self::Watchapp),
            other => Err(Error::validation(format!("unknown app type: {other}"))),
        }
    }
}

/// Phone operating system running the client
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ClientPlatform {
    /// Android phone
    #[default]
    Android,
    /// iOS phone
    Ios,
}

impl ClientPlatform {
    /// Value of the `platform` query parameter
    #[must_use]
    pub const fn store_code(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }
}

impl fmt::Display for ClientPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.store_code())
    }
}

impl FromStr for ClientPlatform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            other => Err(Error::validation(format!("unknown client platform: {other}"))),
        }
    }
}

/// Watch hardware family.
///
/// Each family runs binaries built for a fixed set of app variants. Families
/// that scale foreign binaries ([`WatchPlatform::performs_scaling`]) can run
/// apps built for smaller screens, but those are not native.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchPlatform {
    /// Original black and white 144x168
    Aplite,
    /// Color 144x168
    Basalt,
    /// Round color 180x180
    Chalk,
    /// Black and white 144x168, newer SDK
    Diorite,
    /// Color 200x228
    Emery,
    /// Black and white 144x168, newest generation
    Flint,
    /// Round color 260x260
    Gabbro,
}

impl WatchPlatform {
    /// Every family
    pub const ALL: [Self; 7] = [
        Self::Aplite,
        Self::Basalt,
        Self::Chalk,
        Self::Diorite,
        Self::Emery,
        Self::Flint,
        Self::Gabbro,
    ];

    /// Codename used in query parameters and binary descriptors
    #[must_use]
    pub const fn codename(self) -> &'static str {
        match self {
            Self::Aplite => "aplite",
            Self::Basalt => "basalt",
            Self::Chalk => "chalk",
            Self::Diorite => "diorite",
            Self::Emery => "emery",
            Self::Flint => "flint",
            Self::Gabbro => "gabbro",
        }
    }

    /// Parse a codename (case-insensitive).
    #[must_use]
    pub fn from_codename(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.codename().eq_ignore_ascii_case(s))
    }

    /// App variants this family can run, its own variant included
    #[must_use]
    pub const fn compatible_variants(self) -> &'static [Self] {
        match self {
            Self::Aplite => &[Self::Aplite],
            Self::Basalt => &[Self::Aplite, Self::Basalt],
            Self::Chalk => &[Self::Chalk],
            Self::Diorite => &[Self::Aplite, Self::Diorite],
            Self::Emery => &[Self::Aplite, Self::Basalt, Self::Diorite, Self::Emery],
            Self::Flint => &[Self::Aplite, Self::Diorite, Self::Flint],
            Self::Gabbro => &[Self::Chalk, Self::Gabbro],
        }
    }

    /// Whether the family can run `variant` at all
    #[must_use]
    pub fn can_run(self, variant: Self) -> bool {
        self.compatible_variants().contains(&variant)
    }

    /// Whether the family scales binaries built for other families
    #[must_use]
    pub const fn performs_scaling(self) -> bool {
        matches!(self, Self::Emery | Self::Gabbro)
    }
}

impl fmt::Display for WatchPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codename())
    }
}

impl FromStr for WatchPlatform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_codename(s)
            .ok_or_else(|| Error::validation(format!("unknown watch platform: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_type_codes() {
        assert_eq!(AppType::Watchface.code(), "watchface");
        assert_eq!(AppType::Watchapp.store_path(), "apps");
        assert_eq!(AppType::Watchface.store_path(), "faces");
        assert_eq!(AppType::from_code("watchapp"), Some(AppType::Watchapp));
        assert_eq!(AppType::from_code("companion"), None);
    }

    #[test]
    fn app_type_parses_aliases() {
        assert_eq!("faces".parse::<AppType>().unwrap(), AppType::Watchface);
        assert_eq!("App".parse::<AppType>().unwrap(), AppType::Watchapp);
        assert!("widget".parse::<AppType>().is_err());
    }

    #[test]
    fn client_platform_round_trip() {
        assert_eq!("iOS".parse::<ClientPlatform>().unwrap(), ClientPlatform::Ios);
        assert_eq!(ClientPlatform::default().to_string(), "android");
    }

    #[test]
    fn every_family_runs_its_own_variant() {
        for platform in WatchPlatform::ALL {
            assert!(platform.can_run(platform), "{platform}");
        }
    }

    #[test]
    fn round_families_do_not_run_rectangular_apps() {
        assert!(!WatchPlatform::Chalk.can_run(WatchPlatform::Aplite));
        assert!(!WatchPlatform::Gabbro.can_run(WatchPlatform::Basalt));
        assert!(WatchPlatform::Gabbro.can_run(WatchPlatform::Chalk));
    }

    #[test]
    fn scaling_families() {
        let scaling: Vec<_> = WatchPlatform::ALL
            .into_iter()
            .filter(|p| p.performs_scaling())
            .collect();
        assert_eq!(scaling, vec![WatchPlatform::Emery, WatchPlatform::Gabbro]);
    }

    #[test]
    fn codename_parsing() {
        assert_eq!(WatchPlatform::from_codename("EMERY"), Some(WatchPlatform::Emery));
        assert_eq!("flint".parse::<WatchPlatform>().unwrap(), WatchPlatform::Flint);
        assert!("tintin".parse::<WatchPlatform>().is_err());
    }
}
