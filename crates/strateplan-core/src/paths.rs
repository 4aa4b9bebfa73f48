//! Filesystem locations for config, logs, and the default database

use std::path::{Path, PathBuf};

/// Config directory name under the home directory
pub const CONFIG_DIR_NAME: &str = ".strateplan";

/// Environment variable that relocates the config directory
pub const HOME_ENV: &str = "STRATEPLAN_HOME";

/// Environment variable that overrides the database path
pub const DB_ENV: &str = "STRATEPLAN_DB";

/// Root config directory (`~/.strateplan` unless `STRATEPLAN_HOME` is set)
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    config_dir_for_home(&home)
}

/// Config directory for a given home directory
pub fn config_dir_for_home(home_dir: &Path) -> PathBuf {
    home_dir.join(CONFIG_DIR_NAME)
}

pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

pub fn log_file() -> PathBuf {
    logs_dir().join("strateplan.log")
}

/// Database used when neither flag, env, nor config name one
pub fn default_db_path() -> PathBuf {
    config_dir().join("strateplan.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_for_home() {
        let dir = config_dir_for_home(Path::new("/home/someone"));
        assert_eq!(dir, PathBuf::from("/home/someone/.strateplan"));
    }

    #[test]
    fn test_derived_paths_live_under_config_dir() {
        let root = config_dir();
        assert!(config_file().starts_with(&root));
        assert!(log_file().starts_with(logs_dir()));
        assert!(logs_dir().starts_with(&root));
        assert_eq!(default_db_path().file_name().unwrap(), "strateplan.db");
    }
}
