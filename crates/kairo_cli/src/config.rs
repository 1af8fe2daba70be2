//! Per-user paths for the `kairo` binary.
//!
//! # Responsibility
//! - Resolve the kairo home directory, database file, and log directory.
//!
//! # Invariants
//! - `KAIRO_HOME` wins over the platform home directory.
//! - An explicit database path (flag or `KAIRO_DB`) wins over `<home>/tasks.db`.

use anyhow::{anyhow, Result};
use directories::BaseDirs;
use std::path::{Path, PathBuf};

pub const HOME_ENV: &str = "KAIRO_HOME";
const HOME_DIR_NAME: &str = ".kairo";
const DB_FILE_NAME: &str = "tasks.db";
const LOG_DIR_NAME: &str = "logs";

/// Resolved filesystem locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub db: PathBuf,
    pub log_dir: PathBuf,
}

impl Paths {
    /// Resolves paths from the environment and an optional database override.
    pub fn resolve(db_override: Option<PathBuf>) -> Result<Self> {
        let home = match std::env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
            Some(value) => PathBuf::from(value),
            None => default_home()?,
        };
        Ok(Self::from_home(home, db_override))
    }

    pub fn from_home(home: impl AsRef<Path>, db_override: Option<PathBuf>) -> Self {
        let home = absolute(home.as_ref());
        Self {
            db: db_override.unwrap_or_else(|| home.join(DB_FILE_NAME)),
            log_dir: home.join(LOG_DIR_NAME),
        }
    }
}

fn default_home() -> Result<PathBuf> {
    let dirs = BaseDirs::new()
        .ok_or_else(|| anyhow!("cannot determine home directory; set {HOME_ENV}"))?;
    Ok(dirs.home_dir().join(HOME_DIR_NAME))
}

// Log directories must be absolute; a relative KAIRO_HOME is taken from the cwd.
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::Paths;
    use std::path::PathBuf;

    #[test]
    fn from_home_derives_db_and_log_locations() {
        let home = tempfile::tempdir().unwrap();

        let paths = Paths::from_home(home.path(), None);

        assert_eq!(paths.db, home.path().join("tasks.db"));
        assert_eq!(paths.log_dir, home.path().join("logs"));
    }

    #[test]
    fn explicit_db_path_overrides_default() {
        let home = tempfile::tempdir().unwrap();
        let custom = PathBuf::from("/tmp/elsewhere/custom.db");

        let paths = Paths::from_home(home.path(), Some(custom.clone()));

        assert_eq!(paths.db, custom);
        assert_eq!(paths.log_dir, home.path().join("logs"));
    }

    #[test]
    fn relative_home_is_made_absolute() {
        let paths = Paths::from_home("relative-kairo", None);

        assert!(paths.db.is_absolute());
        assert!(paths.log_dir.is_absolute());
    }
}
