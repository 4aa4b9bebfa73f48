//! User configuration stored as TOML in the config directory

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::paths;
use crate::report::ReportFormat;

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database file; the default location is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    /// Format used by `report plan` when none is given
    pub default_format: ReportFormat,
}

impl Config {
    /// Load config from a path, falling back to defaults when it is absent
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save config to a specific path
    ///
    /// Writes a temp file next to the target and renames it over.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, toml::to_string_pretty(self)?)?;
        fs::rename(&temp_path, path)?;
        debug!("Config saved to {:?}", path);
        Ok(())
    }

    /// Database path to open
    ///
    /// Precedence: the `--db` flag, then `STRATEPLAN_DB`, then `db_path`
    /// from this config, then the default under the config directory.
    pub fn resolve_db_path(&self, flag: Option<&Path>) -> PathBuf {
        let env = std::env::var_os(paths::DB_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        self.resolve_with(flag, env, paths::default_db_path())
    }

    fn resolve_with(&self, flag: Option<&Path>, env: Option<PathBuf>, fallback: PathBuf) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or(env)
            .or_else(|| self.db_path.clone())
            .unwrap_or(fallback)
    }
}
