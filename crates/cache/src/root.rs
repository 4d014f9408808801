//! Cache root directory resolution

use crate::{Error, Result};
use dirs::cache_dir;
use std::path::{Path, PathBuf};

/// Environment variable overriding the cache root
pub const CACHE_DIR_ENV: &str = "APPSTORE_CACHE_DIR";

const APP_DIR: &str = "appstore";

/// Inputs for determining the cache root directory
#[derive(Debug, Clone, Default)]
pub(crate) struct RootInputs {
    pub(crate) explicit: Option<PathBuf>,
    pub(crate) env_override: Option<PathBuf>,
    pub(crate) xdg_cache_home: Option<PathBuf>,
    pub(crate) os_cache_dir: Option<PathBuf>,
    pub(crate) temp_dir: PathBuf,
}

pub(crate) fn cache_root_from_inputs(inputs: RootInputs) -> Result<PathBuf> {
    // First writable candidate wins
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(dir) = inputs.explicit.filter(|p| !p.as_os_str().is_empty()) {
        candidates.push(dir);
    }
    if let Some(dir) = inputs.env_override.filter(|p| !p.as_os_str().is_empty()) {
        candidates.push(dir);
    }
    if let Some(xdg) = inputs.xdg_cache_home {
        candidates.push(xdg.join(APP_DIR));
    }
    if let Some(os_cache) = inputs.os_cache_dir {
        candidates.push(os_cache.join(APP_DIR));
    }
    candidates.push(inputs.temp_dir.join(APP_DIR).join("cache"));

    for path in candidates {
        if path.exists() {
            if is_writable(&path) {
                return Ok(path);
            }
            tracing::debug!(path = %path.display(), "cache candidate not writable");
            continue;
        }
        if std::fs::create_dir_all(&path).is_ok() {
            return Ok(path);
        }
    }
    Err(Error::configuration(
        "Failed to determine a writable cache directory",
    ))
}

fn is_writable(path: &Path) -> bool {
    let probe = path.join(".write_probe");
    let writable = std::fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&probe)
        .is_ok();
    if writable {
        let _ = std::fs::remove_file(&probe);
    }
    writable
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

/// Resolve the cache root.
///
/// Order: `explicit`, then `APPSTORE_CACHE_DIR`, then
/// `$XDG_CACHE_HOME/appstore`, then the OS cache directory, then the
/// system temp directory.
pub fn resolve_cache_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let inputs = RootInputs {
        explicit: explicit.map(Path::to_path_buf),
        env_override: env_path(CACHE_DIR_ENV),
        xdg_cache_home: env_path("XDG_CACHE_HOME"),
        os_cache_dir: cache_dir(),
        temp_dir: std::env::temp_dir(),
    };
    cache_root_from_inputs(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_dir_wins() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("explicit");
        let inputs = RootInputs {
            explicit: Some(explicit.clone()),
            env_override: Some(tmp.path().join("env")),
            xdg_cache_home: Some(tmp.path().join("xdg")),
            os_cache_dir: None,
            temp_dir: tmp.path().to_path_buf(),
        };
        assert_eq!(cache_root_from_inputs(inputs).unwrap(), explicit);
        assert!(explicit.is_dir());
    }

    #[test]
    fn xdg_used_without_overrides() {
        let tmp = TempDir::new().unwrap();
        let inputs = RootInputs {
            xdg_cache_home: Some(tmp.path().join("xdg")),
            temp_dir: tmp.path().to_path_buf(),
            ..RootInputs::default()
        };
        assert_eq!(
            cache_root_from_inputs(inputs).unwrap(),
            tmp.path().join("xdg").join("appstore")
        );
    }

    #[test]
    fn empty_explicit_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let inputs = RootInputs {
            explicit: Some(PathBuf::new()),
            temp_dir: tmp.path().to_path_buf(),
            ..RootInputs::default()
        };
        assert_eq!(
            cache_root_from_inputs(inputs).unwrap(),
            tmp.path().join("appstore").join("cache")
        );
    }

    #[test]
    fn env_override_is_read() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("from-env");
        temp_env::with_var(CACHE_DIR_ENV, Some(dir.as_os_str()), || {
            assert_eq!(resolve_cache_root(None).unwrap(), dir);
        });
    }
}
